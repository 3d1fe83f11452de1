use super::{Draft, EditableField};
use crate::models::FieldKind;
use crate::normalize::{TagDraft, TagInputOptions};

/// Tags are one list attribute on the server, whatever the element calls it.
pub(crate) const TAGS_FIELD: &str = "tags";

impl EditableField {
    fn tag_draft_mut(&mut self) -> Option<&mut TagDraft> {
        if self.kind != FieldKind::Tags || self.in_flight {
            return None;
        }
        match self.draft.as_mut() {
            Some(Draft::Tags(t)) => Some(t),
            _ => None,
        }
    }

    pub fn tag_draft(&self) -> Option<&TagDraft> {
        match self.draft.as_ref() {
            Some(Draft::Tags(t)) => Some(t),
            _ => None,
        }
    }

    pub fn type_tags(&mut self, input: &str, opts: &TagInputOptions) {
        if let Some(t) = self.tag_draft_mut() {
            t.set_pending(input, opts);
        }
    }

    pub fn pick_tag(&mut self, tag: &str) {
        if let Some(t) = self.tag_draft_mut() {
            t.add(tag);
        }
    }

    pub fn remove_tag(&mut self, index: usize) {
        if let Some(t) = self.tag_draft_mut() {
            t.remove(index);
        }
    }

    pub fn blur_tags(&mut self, opts: &TagInputOptions) {
        if let Some(t) = self.tag_draft_mut() {
            t.on_blur(opts);
        }
    }
}
