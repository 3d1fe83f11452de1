pub(crate) mod tags;

use crate::api::ApiResult;
use crate::models::{FieldKind, FieldValue, Item, ItemField, PatchRequest, ResourceId};
use crate::normalize::{url_after_blur, TagDraft};
use leptos::logging::{log, warn};
use std::collections::BTreeMap;

/// Addresses a field independently of whatever element currently renders it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct FieldKey {
    pub resource_id: ResourceId,
    pub field_name: String,
}

impl FieldKey {
    pub fn new(resource_id: ResourceId, field_name: impl Into<String>) -> Self {
        Self {
            resource_id,
            field_name: field_name.into(),
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_id, self.field_name)
    }
}

/// Page-wide editing switch, pushed into every field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct EditingConfig {
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldMode {
    Display,
    Editing,
}

/// What the edit widget currently holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Draft {
    Text(String),
    Tags(TagDraft),
}

impl Draft {
    fn from_value(kind: FieldKind, value: &FieldValue) -> Self {
        match kind {
            FieldKind::Tags => Self::Tags(TagDraft::from_tokens(value.as_list())),
            FieldKind::Text | FieldKind::Url => Self::Text(value.display_text()),
        }
    }

    pub fn to_value(&self) -> FieldValue {
        match self {
            Self::Text(s) => FieldValue::Text(s.clone()),
            Self::Tags(t) => FieldValue::List(t.to_value()),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct EditableField {
    key: FieldKey,
    kind: FieldKind,
    endpoint: String,
    /// Last value the server confirmed (or the page rendered).
    value: FieldValue,
    mode: FieldMode,
    draft: Option<Draft>,
    /// Unsaved draft set aside when editing got switched off mid-edit.
    stashed: Option<Draft>,
    in_flight: bool,
    error: Option<String>,
    enabled: bool,
}

impl EditableField {
    pub fn new(field: &ItemField, config: EditingConfig) -> Self {
        Self {
            key: FieldKey::new(field.resource_id.clone(), field.name.clone()),
            kind: field.kind,
            endpoint: field.endpoint.clone(),
            value: field.value.clone(),
            mode: FieldMode::Display,
            draft: None,
            stashed: None,
            in_flight: false,
            error: None,
            enabled: config.enabled,
        }
    }

    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn draft_text(&self) -> Option<&str> {
        match self.draft.as_ref() {
            Some(Draft::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn has_stashed_draft(&self) -> bool {
        self.stashed.is_some()
    }

    pub fn is_editable(&self) -> bool {
        self.enabled && !self.in_flight
    }

    /// Name the patch is sent under.
    pub fn patch_field_name(&self) -> &str {
        match self.kind {
            FieldKind::Tags => tags::TAGS_FIELD,
            FieldKind::Text | FieldKind::Url => &self.key.field_name,
        }
    }

    /// Display -> Editing. No network effect. A stashed draft is restored.
    pub fn begin_edit(&mut self) -> bool {
        if !self.is_editable() || self.mode == FieldMode::Editing {
            return false;
        }
        let draft = self
            .stashed
            .take()
            .unwrap_or_else(|| Draft::from_value(self.kind, &self.value));
        self.draft = Some(draft);
        self.mode = FieldMode::Editing;
        self.error = None;
        true
    }

    pub fn set_text(&mut self, text: &str) {
        if self.in_flight {
            return;
        }
        if let Some(Draft::Text(s)) = self.draft.as_mut() {
            *s = text.to_string();
        }
    }

    /// URL fields get their scheme on blur; other text is left alone.
    pub fn blur_text(&mut self) {
        if self.kind != FieldKind::Url || self.in_flight {
            return;
        }
        if let Some(Draft::Text(s)) = self.draft.as_mut() {
            *s = url_after_blur(s);
        }
    }

    pub fn cancel_edit(&mut self) -> bool {
        if self.in_flight || self.mode != FieldMode::Editing {
            return false;
        }
        self.mode = FieldMode::Display;
        self.draft = None;
        self.error = None;
        true
    }

    /// Marks the field in flight and returns the patch to send.
    pub fn begin_commit(&mut self) -> Option<PatchRequest> {
        if self.mode != FieldMode::Editing || self.in_flight {
            return None;
        }
        let value = self.draft.as_ref()?.to_value();
        self.in_flight = true;
        self.error = None;
        Some(PatchRequest::new(
            self.key.resource_id.clone(),
            self.patch_field_name(),
            value,
        ))
    }

    /// Applies the server's answer to a commit started by `begin_commit`.
    ///
    /// Success shows the confirmed value (or what was sent when the server
    /// echoes nothing). Failure keeps the previous value and the attempted
    /// draft, and records the error.
    pub fn finish_commit(&mut self, patch: &PatchRequest, result: ApiResult<Option<FieldValue>>) {
        self.in_flight = false;
        match result {
            Ok(confirmed) => {
                self.value = confirmed.unwrap_or_else(|| patch.value().clone());
                self.mode = FieldMode::Display;
                self.draft = None;
                self.stashed = None;
                self.error = None;
            }
            Err(e) => {
                warn!("commit {} failed: {e}", self.key);
                if self.enabled {
                    self.mode = FieldMode::Editing;
                } else {
                    self.stashed = self.draft.take();
                    self.mode = FieldMode::Display;
                }
                self.error = Some(e.to_string());
            }
        }
    }

    /// Pushes new page configuration into the field.
    ///
    /// Returns `true` when switching editing off set aside an unsaved draft.
    pub fn apply_config(&mut self, config: EditingConfig) -> bool {
        self.enabled = config.enabled;
        if config.enabled || self.mode != FieldMode::Editing || self.in_flight {
            return false;
        }

        self.mode = FieldMode::Display;
        match self.draft.take() {
            Some(draft) if draft.to_value() != self.value => {
                self.stashed = Some(draft);
                true
            }
            _ => false,
        }
    }
}

/// Every editable field on the page, keyed by `FieldKey`.
#[derive(Clone, Debug, Default)]
pub(crate) struct FieldBoard {
    config: EditingConfig,
    fields: BTreeMap<FieldKey, EditableField>,
}

impl FieldBoard {
    pub fn new(config: EditingConfig) -> Self {
        Self {
            config,
            fields: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> EditingConfig {
        self.config
    }

    pub fn register_item(&mut self, item: &Item) -> Vec<FieldKey> {
        item.fields
            .iter()
            .map(|f| {
                let field = EditableField::new(f, self.config);
                let key = field.key().clone();
                self.fields.insert(key.clone(), field);
                key
            })
            .collect()
    }

    pub fn remove_resource(&mut self, id: &ResourceId) {
        self.fields.retain(|k, _| &k.resource_id != id);
    }

    pub fn get(&self, key: &FieldKey) -> Option<&EditableField> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &FieldKey) -> Option<&mut EditableField> {
        self.fields.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Applies `config` to every field; returns the keys whose unsaved
    /// drafts were set aside.
    pub fn set_config(&mut self, config: EditingConfig) -> Vec<FieldKey> {
        self.config = config;
        self.fields
            .values_mut()
            .filter_map(|f| f.apply_config(config).then(|| f.key().clone()))
            .collect()
    }

    pub fn toggle_enabled(&mut self) -> Vec<FieldKey> {
        let next = EditingConfig {
            enabled: !self.config.enabled,
        };
        log!("editing {}", if next.enabled { "enabled" } else { "disabled" });
        self.set_config(next)
    }

    pub fn begin_edit(&mut self, key: &FieldKey) -> bool {
        self.fields.get_mut(key).is_some_and(EditableField::begin_edit)
    }

    /// Returns the endpoint and patch for a commit, or `None` if the field
    /// is not in a committable state.
    pub fn begin_commit(&mut self, key: &FieldKey) -> Option<(String, PatchRequest)> {
        let field = self.fields.get_mut(key)?;
        let patch = field.begin_commit()?;
        Some((field.endpoint().to_string(), patch))
    }

    /// Routes a completion to its field. Returns `false` if the field is gone.
    pub fn finish_commit(
        &mut self,
        key: &FieldKey,
        patch: &PatchRequest,
        result: ApiResult<Option<FieldValue>>,
    ) -> bool {
        match self.fields.get_mut(key) {
            Some(field) => {
                field.finish_commit(patch, result);
                true
            }
            None => {
                warn!("dropping completion for {key}: field no longer on the page");
                false
            }
        }
    }
}
