use crate::api::ApiResult;
use crate::models::{Item, ResourceId};
use leptos::logging::warn;
use std::collections::BTreeMap;

/// Where an item is in its delete gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConfirmState {
    Idle,
    /// Inline Yes/No prompt is showing.
    Prompting,
    /// Yes was chosen; DELETE is in flight.
    Deleting,
    /// Server confirmed; the view fades the item out.
    Removed,
}

#[derive(Clone, Debug)]
pub(crate) struct DeletableItem {
    item_id: ResourceId,
    api_url: String,
    state: ConfirmState,
    error: Option<String>,
}

impl DeletableItem {
    pub fn new(item_id: ResourceId, api_url: impl Into<String>) -> Self {
        Self {
            item_id,
            api_url: api_url.into(),
            state: ConfirmState::Idle,
            error: None,
        }
    }

    pub fn state(&self) -> ConfirmState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn request_confirmation(&mut self) -> bool {
        if self.state != ConfirmState::Idle {
            return false;
        }
        self.state = ConfirmState::Prompting;
        self.error = None;
        true
    }

    /// "No" or dismissal. Never touches the network.
    pub fn decline(&mut self) {
        if self.state == ConfirmState::Prompting {
            self.state = ConfirmState::Idle;
        }
    }

    /// "Yes": returns the URL to DELETE.
    pub fn confirm(&mut self) -> Option<String> {
        if self.state != ConfirmState::Prompting {
            return None;
        }
        self.state = ConfirmState::Deleting;
        Some(self.api_url.clone())
    }

    pub fn finish_delete(&mut self, result: ApiResult<()>) {
        if self.state != ConfirmState::Deleting {
            return;
        }
        match result {
            Ok(()) => self.state = ConfirmState::Removed,
            Err(e) => {
                warn!("delete {} failed: {e}", self.item_id);
                self.state = ConfirmState::Idle;
                self.error = Some(e.to_string());
            }
        }
    }
}

/// Per-item delete state. Items never share confirmation state.
#[derive(Clone, Debug, Default)]
pub(crate) struct ConfirmationBoard {
    items: BTreeMap<ResourceId, DeletableItem>,
}

impl ConfirmationBoard {
    pub fn register(&mut self, item: &Item) {
        self.items.insert(
            item.id.clone(),
            DeletableItem::new(item.id.clone(), item.api_url.clone()),
        );
    }

    pub fn get(&self, id: &ResourceId) -> Option<&DeletableItem> {
        self.items.get(id)
    }

    pub fn state(&self, id: &ResourceId) -> ConfirmState {
        self.items
            .get(id)
            .map(DeletableItem::state)
            .unwrap_or(ConfirmState::Idle)
    }

    /// Last delete failure for the item, if any.
    pub fn error(&self, id: &ResourceId) -> Option<String> {
        self.get(id)?.error().map(str::to_string)
    }

    pub fn request_confirmation(&mut self, id: &ResourceId) -> bool {
        self.items
            .get_mut(id)
            .is_some_and(DeletableItem::request_confirmation)
    }

    pub fn decline(&mut self, id: &ResourceId) {
        if let Some(item) = self.items.get_mut(id) {
            item.decline();
        }
    }

    /// Closes every open prompt (Escape).
    pub fn decline_all(&mut self) {
        self.items.values_mut().for_each(DeletableItem::decline);
    }

    pub fn confirm(&mut self, id: &ResourceId) -> Option<String> {
        self.items.get_mut(id)?.confirm()
    }

    pub fn finish_delete(&mut self, id: &ResourceId, result: ApiResult<()>) -> ConfirmState {
        match self.items.get_mut(id) {
            Some(item) => {
                item.finish_delete(result);
                item.state()
            }
            None => {
                warn!("dropping delete completion for {id}: item no longer on the page");
                ConfirmState::Idle
            }
        }
    }

    /// Drops a removed item once its fade-out is done.
    pub fn forget(&mut self, id: &ResourceId) {
        self.items.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::RecordingTransport;
    use crate::api::ItemsApi;
    use futures::executor::block_on;

    fn item(id: &str) -> Item {
        Item {
            id: ResourceId::new(id),
            api_url: format!("/api/items/{id}/"),
            fields: Vec::new(),
        }
    }

    fn board(ids: &[&str]) -> ConfirmationBoard {
        let mut b = ConfirmationBoard::default();
        for id in ids {
            b.register(&item(id));
        }
        b
    }

    fn run_delete(b: &mut ConfirmationBoard, api: &ItemsApi, id: &ResourceId) -> ConfirmState {
        let url = b.confirm(id).expect("prompt should be open");
        let result = block_on(api.delete_item(&url));
        b.finish_delete(id, result)
    }

    #[test]
    fn test_yes_with_success_removes_item() {
        let transport = RecordingTransport::ok(204, "");
        let api = ItemsApi::new(transport.clone(), "/api/items/");
        let id = ResourceId::new("1");
        let mut b = board(&["1"]);

        assert!(b.request_confirmation(&id));
        assert_eq!(b.state(&id), ConfirmState::Prompting);
        assert_eq!(run_delete(&mut b, &api, &id), ConfirmState::Removed);

        let req = transport.last_request();
        assert_eq!(req.method, reqwest::Method::DELETE);
        assert_eq!(req.url, "/api/items/1/");
    }

    #[test]
    fn test_yes_with_failure_keeps_item_and_reports() {
        let api = ItemsApi::new(RecordingTransport::ok(403, "CSRF failed"), "/api/items/");
        let id = ResourceId::new("1");
        let mut b = board(&["1"]);

        b.request_confirmation(&id);
        assert_eq!(run_delete(&mut b, &api, &id), ConfirmState::Idle);
        let error = b.get(&id).and_then(DeletableItem::error).expect("error surfaced");
        assert!(error.contains("403"));

        // A fresh prompt clears the previous error.
        assert!(b.request_confirmation(&id));
        assert!(b.get(&id).and_then(DeletableItem::error).is_none());
    }

    #[test]
    fn test_no_issues_zero_requests() {
        let transport = RecordingTransport::ok(204, "");
        let id = ResourceId::new("1");
        let mut b = board(&["1"]);

        b.request_confirmation(&id);
        b.decline(&id);
        assert_eq!(b.state(&id), ConfirmState::Idle);
        assert!(b.confirm(&id).is_none(), "yes after no must not delete");
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_confirm_requires_prompt() {
        let mut b = board(&["1"]);
        assert!(b.confirm(&ResourceId::new("1")).is_none());
        assert!(b.confirm(&ResourceId::new("missing")).is_none());
    }

    #[test]
    fn test_confirmations_are_independent() {
        let api = ItemsApi::new(RecordingTransport::ok(204, ""), "/api/items/");
        let (one, two) = (ResourceId::new("1"), ResourceId::new("2"));
        let mut b = board(&["1", "2"]);

        b.request_confirmation(&one);
        b.request_confirmation(&two);
        assert_eq!(run_delete(&mut b, &api, &one), ConfirmState::Removed);
        assert_eq!(b.state(&two), ConfirmState::Prompting);

        b.decline(&two);
        assert_eq!(b.state(&one), ConfirmState::Removed);
        assert_eq!(b.state(&two), ConfirmState::Idle);
    }

    #[test]
    fn test_no_second_prompt_while_deleting() {
        let id = ResourceId::new("1");
        let mut b = board(&["1"]);
        b.request_confirmation(&id);
        b.confirm(&id);
        assert!(!b.request_confirmation(&id));
        b.decline(&id);
        assert_eq!(b.state(&id), ConfirmState::Deleting);
    }

    #[test]
    fn test_failure_is_readable_by_item_id() {
        let api = ItemsApi::new(RecordingTransport::ok(500, "boom"), "/api/items/");
        let (one, two) = (ResourceId::new("1"), ResourceId::new("2"));
        let mut b = board(&["1", "2"]);

        b.request_confirmation(&one);
        run_delete(&mut b, &api, &one);
        assert!(b.error(&one).is_some_and(|e| e.contains("500")));
        assert!(b.error(&two).is_none());
        assert!(b.error(&ResourceId::new("missing")).is_none());
    }

    #[test]
    fn test_escape_closes_open_prompts_only() {
        let (one, two) = (ResourceId::new("1"), ResourceId::new("2"));
        let mut b = board(&["1", "2"]);
        b.request_confirmation(&one);
        b.request_confirmation(&two);
        b.confirm(&two);

        b.decline_all();
        assert_eq!(b.state(&one), ConfirmState::Idle);
        assert_eq!(b.state(&two), ConfirmState::Deleting);
    }

    #[test]
    fn test_forget_after_removal() {
        let id = ResourceId::new("1");
        let mut b = board(&["1"]);
        b.forget(&id);
        assert!(b.get(&id).is_none());
        assert_eq!(b.finish_delete(&id, Ok(())), ConfirmState::Idle);
    }
}
