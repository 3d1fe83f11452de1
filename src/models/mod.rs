use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Server-side primary key of a resource, as the page hands it over.
///
/// Ids that are canonical integers go over the wire as JSON numbers, all
/// others as strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_integer(&self) -> Option<i64> {
        self.0
            .parse::<i64>()
            .ok()
            .filter(|n| n.to_string() == self.0)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_integer() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Str(s) => Self(s),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum FieldKind {
    Text,
    /// Text that gets an `http://` prefix on blur.
    Url,
    /// Multi-value list, always patched under the `tags` key.
    Tags,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub(crate) enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Value of `field` in a JSON response object, if the server echoed it.
    pub fn from_response(data: &serde_json::Value, field: &str) -> Option<Self> {
        match data.get(field)? {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(items) => Some(Self::List(
                items
                    .iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            serde_json::Value::Null => None,
            other => Some(Self::Text(other.to_string())),
        }
    }

    pub fn display_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(", "),
        }
    }

    pub fn as_list(&self) -> Vec<String> {
        match self {
            Self::Text(s) if s.is_empty() => Vec::new(),
            Self::Text(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
        }
    }
}

/// Single-field update: `{"id": <resource_id>, "<field_name>": <value>}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PatchRequest {
    resource_id: ResourceId,
    field_name: String,
    value: FieldValue,
}

impl PatchRequest {
    pub fn new(resource_id: ResourceId, field_name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            resource_id,
            field_name: field_name.into(),
            value,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

impl Serialize for PatchRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("id", &self.resource_id)?;
        map.serialize_entry(&self.field_name, &self.value)?;
        map.end()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ItemField {
    /// Attribute name as the page declares it (`data-name`).
    pub name: String,
    pub kind: FieldKind,
    pub resource_id: ResourceId,
    /// Where commits for this field are POSTed.
    pub endpoint: String,
    pub value: FieldValue,
}

/// One rendered link record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Item {
    pub id: ResourceId,
    pub api_url: String,
    pub fields: Vec<ItemField>,
}

impl Item {
    pub fn field(&self, name: &str) -> Option<&ItemField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn from_api(api: ApiItem, items_endpoint: &str) -> Self {
        let api_url = format!("{}/{}/", items_endpoint.trim_end_matches('/'), api.id);
        let field = |name: &str, kind: FieldKind, value: FieldValue| ItemField {
            name: name.to_string(),
            kind,
            resource_id: api.id.clone(),
            endpoint: api_url.clone(),
            value,
        };

        let fields = vec![
            field("title", FieldKind::Text, FieldValue::Text(api.title.clone())),
            field("url", FieldKind::Url, FieldValue::Text(api.url.clone())),
            field("tags", FieldKind::Tags, FieldValue::List(api.tags.clone())),
        ];

        Self {
            id: api.id,
            api_url,
            fields,
        }
    }
}

/// Item as the REST API serializes it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ApiItem {
    pub id: ResourceId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NewItem {
    pub url: String,
    pub tags: Vec<String>,
}
