//! Reads the server-rendered item list into `Item`s.
//!
//! Markup contract:
//!
//! ```html
//! <div class="item" data-item-id="5" data-item-api-url="/api/items/5/">
//!   <a class="editable" data-name="title">Title</a>
//!   <span class="editable" data-name="url" data-type="url">http://…</span>
//!   <span class="editable-tags" data-name="tags" data-value="a,b">a, b</span>
//! </div>
//! ```
//!
//! `data-pk` and `data-url` on an editable element override the item id and
//! API URL for that field.

use crate::models::{FieldKind, FieldValue, Item, ItemField, ResourceId};
use leptos::logging::warn;
use wasm_bindgen::JsCast;

const ITEM_SELECTOR: &str = ".item";
const FIELD_SELECTOR: &str = ".editable, .editable-tags";

/// Attributes of one editable element, as found in the markup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RawField {
    pub classes: String,
    pub name: Option<String>,
    pub pk: Option<String>,
    pub url: Option<String>,
    pub data_type: Option<String>,
    pub data_value: Option<String>,
    pub text: String,
}

impl RawField {
    fn kind(&self) -> FieldKind {
        if self.classes.split_whitespace().any(|c| c == "editable-tags") {
            FieldKind::Tags
        } else if self.data_type.as_deref() == Some("url") || self.name.as_deref() == Some("url") {
            FieldKind::Url
        } else {
            FieldKind::Text
        }
    }

    fn value(&self, kind: FieldKind) -> FieldValue {
        let raw = self.data_value.as_deref().unwrap_or(&self.text);
        match kind {
            // Markup whitespace around rendered tags is layout, not content.
            FieldKind::Tags => FieldValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            FieldKind::Text | FieldKind::Url => FieldValue::Text(raw.trim().to_string()),
        }
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Builds an item from its attributes. Items without an id or API URL, and
/// fields without a name, are skipped.
pub(crate) fn item_from_parts(
    id: Option<String>,
    api_url: Option<String>,
    raw_fields: Vec<RawField>,
) -> Option<Item> {
    let id = ResourceId::new(non_blank(id)?.trim());
    let api_url = non_blank(api_url)?;

    let fields = raw_fields
        .into_iter()
        .filter_map(|raw| {
            let name = non_blank(raw.name.clone())?;
            let kind = raw.kind();
            Some(ItemField {
                value: raw.value(kind),
                resource_id: non_blank(raw.pk.clone())
                    .map(ResourceId::new)
                    .unwrap_or_else(|| id.clone()),
                endpoint: non_blank(raw.url.clone()).unwrap_or_else(|| api_url.clone()),
                name,
                kind,
            })
        })
        .collect();

    Some(Item {
        id,
        api_url,
        fields,
    })
}

fn elements(root: &web_sys::Element, selector: &str) -> Vec<web_sys::Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .collect()
}

fn raw_field(el: &web_sys::Element) -> RawField {
    RawField {
        classes: el.get_attribute("class").unwrap_or_default(),
        name: el.get_attribute("data-name"),
        pk: el.get_attribute("data-pk"),
        url: el.get_attribute("data-url"),
        data_type: el.get_attribute("data-type"),
        data_value: el.get_attribute("data-value"),
        text: el.text_content().unwrap_or_default(),
    }
}

/// Every well-formed `.item` under `root`, in document order.
pub(crate) fn read_items(root: &web_sys::Element) -> Vec<Item> {
    elements(root, ITEM_SELECTOR)
        .iter()
        .filter_map(|el| {
            let fields = elements(el, FIELD_SELECTOR).iter().map(raw_field).collect();
            let item = item_from_parts(
                el.get_attribute("data-item-id"),
                el.get_attribute("data-item-api-url"),
                fields,
            );
            if item.is_none() {
                warn!("dom: skipping .item without data-item-id / data-item-api-url");
            }
            item
        })
        .collect()
}

pub(crate) fn find_mount(selector: &str) -> Option<web_sys::HtmlElement> {
    web_sys::window()?
        .document()?
        .query_selector(selector)
        .ok()
        .flatten()?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(classes: &str, name: &str, text: &str) -> RawField {
        RawField {
            classes: classes.to_string(),
            name: Some(name.to_string()),
            text: text.to_string(),
            ..RawField::default()
        }
    }

    #[test]
    fn test_item_fields_inherit_item_id_and_url() {
        let item = item_from_parts(
            Some("5".to_string()),
            Some("/api/items/5/".to_string()),
            vec![
                raw("editable", "title", "  Some title \n"),
                raw("editable", "url", "http://example.com"),
                RawField {
                    data_value: Some("a,b c".to_string()),
                    ..raw("editable-tags", "tag_names", "a, b c")
                },
            ],
        )
        .expect("item");

        assert_eq!(item.id, ResourceId::new("5"));
        let title = item.field("title").expect("title");
        assert_eq!(title.kind, FieldKind::Text);
        assert_eq!(title.value, FieldValue::Text("Some title".to_string()));
        assert_eq!(title.endpoint, "/api/items/5/");
        assert_eq!(item.field("url").map(|f| f.kind), Some(FieldKind::Url));

        let tags = item.field("tag_names").expect("tags");
        assert_eq!(tags.kind, FieldKind::Tags);
        assert_eq!(tags.value, FieldValue::List(vec!["a".into(), "b c".into()]));
    }

    #[test]
    fn test_field_overrides() {
        let item = item_from_parts(
            Some("5".to_string()),
            Some("/api/items/5/".to_string()),
            vec![RawField {
                pk: Some("77".to_string()),
                url: Some("/api/other/77/".to_string()),
                data_type: Some("url".to_string()),
                ..raw("editable", "link", "x.org")
            }],
        )
        .expect("item");

        let f = &item.fields[0];
        assert_eq!(f.resource_id, ResourceId::new("77"));
        assert_eq!(f.endpoint, "/api/other/77/");
        assert_eq!(f.kind, FieldKind::Url);
    }

    #[test]
    fn test_incomplete_markup_is_skipped() {
        assert!(item_from_parts(None, Some("/api/items/5/".to_string()), vec![]).is_none());
        assert!(item_from_parts(Some("5".to_string()), Some(" ".to_string()), vec![]).is_none());

        let item = item_from_parts(
            Some("5".to_string()),
            Some("/api/items/5/".to_string()),
            vec![RawField {
                name: None,
                ..raw("editable", "", "orphan")
            }],
        )
        .expect("item");
        assert!(item.fields.is_empty());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_read_items_from_markup() {
        let doc = web_sys::window()
            .and_then(|w| w.document())
            .expect("document");
        let root = doc.create_element("div").expect("div");
        root.set_inner_html(
            r#"<div class="item" data-item-id="3" data-item-api-url="/api/items/3/">
                 <a class="editable" data-name="title">Hello</a>
                 <span class="editable-tags" data-name="tags" data-value="x,y">x, y</span>
               </div>
               <div class="item">no id</div>"#,
        );

        let items = read_items(&root);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].fields.len(), 2);
        assert_eq!(
            items[0].field("tags").map(|f| f.value.clone()),
            Some(FieldValue::List(vec!["x".into(), "y".into()]))
        );
    }
}
