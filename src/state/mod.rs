use crate::api::{ItemsApi, ReqwestTransport};
use crate::config::PageConfig;
use crate::confirm::ConfirmationBoard;
use crate::csrf::{CsrfTransport, Origin};
use crate::editable::{EditingConfig, FieldBoard, FieldKey};
use crate::models::{Item, ResourceId};
use crate::normalize::{TagInputOptions, TagSuggestions};
use leptos::prelude::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api: ItemsApi,
    pub config: PageConfig,

    /// Items in display order (newest first once the form adds some).
    pub items: RwSignal<Vec<Item>>,

    /// Inline-edit state for every field on the page.
    pub fields: RwSignal<FieldBoard>,

    /// Delete gesture state per item.
    pub deletions: RwSignal<ConfirmationBoard>,

    /// Items whose toolbox is open.
    pub active_items: RwSignal<Vec<ResourceId>>,

    /// Page-level notice (e.g. edits set aside when editing was switched off).
    pub notice: RwSignal<Option<String>>,

    pub tag_options: TagInputOptions,
}

impl AppState {
    pub fn new(config: PageConfig, items: Vec<Item>) -> Self {
        let origin = Origin::from_location().unwrap_or_else(|| Origin::new("http:", "localhost"));
        let transport = CsrfTransport::from_document(
            ReqwestTransport::for_location(),
            origin,
            &config.csrf_cookie_name,
            &config.csrf_header_name,
        );
        let api = ItemsApi::new(transport, config.items_endpoint.clone());
        Self::with_api(api, config, items)
    }

    pub fn with_api(api: ItemsApi, config: PageConfig, items: Vec<Item>) -> Self {
        let mut fields = FieldBoard::new(EditingConfig::default());
        let mut deletions = ConfirmationBoard::default();
        for item in &items {
            fields.register_item(item);
            deletions.register(item);
        }

        Self {
            api,
            config,
            items: RwSignal::new(items),
            fields: RwSignal::new(fields),
            deletions: RwSignal::new(deletions),
            active_items: RwSignal::new(Vec::new()),
            notice: RwSignal::new(None),
            tag_options: TagInputOptions::default(),
        }
    }

    /// Fresh suggestion list for one widget instance.
    pub fn tag_suggestions(&self) -> TagSuggestions {
        TagSuggestions::seed(&self.config.tags)
    }

    pub fn toggle_editing(&self) {
        let mut stashed: Vec<FieldKey> = Vec::new();
        self.fields.update(|b| stashed = b.toggle_enabled());
        self.notice.set(stashed_notice(&stashed));
    }

    pub fn add_item(&self, item: Item) {
        self.fields.update(|b| {
            b.register_item(&item);
        });
        self.deletions.update(|d| d.register(&item));
        self.items.update(|items| items.insert(0, item));
    }

    pub fn remove_item(&self, id: &ResourceId) {
        self.items.update(|items| items.retain(|i| &i.id != id));
        self.fields.update(|b| b.remove_resource(id));
        self.deletions.update(|d| d.forget(id));
        self.active_items.update(|a| a.retain(|x| x != id));
    }

    pub fn toggle_toolbox(&self, id: &ResourceId) {
        self.active_items.update(|a| {
            if let Some(pos) = a.iter().position(|x| x == id) {
                a.remove(pos);
            } else {
                a.push(id.clone());
            }
        });
    }
}

fn stashed_notice(stashed: &[FieldKey]) -> Option<String> {
    match stashed.len() {
        0 => None,
        1 => Some("An unsaved edit was set aside. Enable editing again to finish it.".to_string()),
        n => Some(format!(
            "{n} unsaved edits were set aside. Enable editing again to finish them."
        )),
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
