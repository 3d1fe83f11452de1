use crate::models::{ApiItem, FieldValue, NewItem, PatchRequest};
use async_trait::async_trait;
use leptos::logging::warn;
use reqwest::{Method, StatusCode};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn network(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn http(status: StatusCode, body: &str, ctx: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("{ctx} ({status})")
        } else {
            format!("{ctx} ({status}): {body}")
        };
        Self {
            kind: ApiErrorKind::Http,
            message,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// A request as the controllers build it, before any transport-level
/// decoration (CSRF header, base URL resolution).
#[derive(Clone, Debug)]
pub(crate) struct HttpRequest {
    pub method: Method,
    /// As written by the page: relative, scheme-relative or absolute.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Header names compare case-insensitively; an existing value is replaced.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    fn into_success(self, ctx: &str) -> ApiResult<String> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(ApiError::http(self.status, &self.body, ctx))
        }
    }
}

/// The single seam every outgoing request goes through.
///
/// Transports report non-2xx statuses as responses; callers decide what a
/// failure is. Only I/O problems come back as `Err`.
#[async_trait(?Send)]
pub(crate) trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse>;
}

/// `fetch`-backed transport (reqwest's wasm client).
#[derive(Clone, Debug)]
pub(crate) struct ReqwestTransport {
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Relative URLs resolve against the page URL, as the browser does.
    pub fn for_location() -> Self {
        let base_url = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_else(|| "http://localhost/".to_string());
        Self::new(base_url)
    }

    pub(crate) fn resolve(&self, url: &str) -> ApiResult<reqwest::Url> {
        reqwest::Url::parse(&self.base_url)
            .and_then(|base| base.join(url))
            .map_err(ApiError::parse)
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let url = self.resolve(&request.url)?;
        let client = reqwest::Client::new();
        let mut req = client.request(request.method, url);
        for (name, value) in request.headers {
            req = req.header(name, value);
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();
        let body = res.text().await.map_err(ApiError::network)?;
        Ok(HttpResponse { status, body })
    }
}

/// Client for the items REST endpoints.
#[derive(Clone)]
pub(crate) struct ItemsApi {
    transport: Arc<dyn Transport>,
    items_endpoint: String,
}

impl ItemsApi {
    pub fn new(transport: impl Transport + 'static, items_endpoint: impl Into<String>) -> Self {
        Self {
            transport: Arc::new(transport),
            items_endpoint: items_endpoint.into(),
        }
    }

    pub fn items_endpoint(&self) -> &str {
        &self.items_endpoint
    }

    /// Sends a single-field update as a POST the server treats as PATCH.
    ///
    /// Returns the value the server reports for the patched attribute, or
    /// `None` when the response does not carry it.
    pub async fn patch_field(
        &self,
        endpoint: &str,
        patch: &PatchRequest,
    ) -> ApiResult<Option<FieldValue>> {
        let body = serde_json::to_string(patch).map_err(ApiError::parse)?;
        let req = HttpRequest::new(Method::POST, endpoint)
            .with_header("X-HTTP-Method-Override", "PATCH")
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json")
            .with_body(body);

        let text = self
            .transport
            .send(req)
            .await?
            .into_success("Saving the field failed")?;

        if text.trim().is_empty() {
            return Ok(None);
        }
        let data: serde_json::Value = serde_json::from_str(&text).map_err(ApiError::parse)?;
        Ok(FieldValue::from_response(&data, patch.field_name()))
    }

    pub async fn delete_item(&self, api_url: &str) -> ApiResult<()> {
        self.transport
            .send(HttpRequest::new(Method::DELETE, api_url))
            .await?
            .into_success("Deleting the item failed")
            .map(|_| ())
    }

    pub async fn create_item(&self, item: &NewItem) -> ApiResult<ApiItem> {
        let body = serde_json::to_string(item).map_err(ApiError::parse)?;
        let req = HttpRequest::new(Method::POST, self.items_endpoint.as_str())
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json")
            .with_body(body);

        let text = self
            .transport
            .send(req)
            .await?
            .into_success("Adding the link failed")?;

        serde_json::from_str(&text).map_err(|e| {
            warn!("create item: unexpected response body: {text}");
            ApiError::parse(e)
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::ResourceId;
    use futures::executor::block_on;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every request and replays canned outcomes; the last outcome
    /// repeats once the queue runs dry.
    #[derive(Clone)]
    pub(crate) struct RecordingTransport {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        outcomes: Arc<Mutex<VecDeque<ApiResult<HttpResponse>>>>,
    }

    impl RecordingTransport {
        pub fn with_outcomes(outcomes: Vec<ApiResult<HttpResponse>>) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                outcomes: Arc::new(Mutex::new(outcomes.into())),
            }
        }

        pub fn ok(status: u16, body: &str) -> Self {
            Self::with_outcomes(vec![Ok(response(status, body))])
        }

        pub fn offline() -> Self {
            Self::with_outcomes(vec![Err(ApiError::network("connection refused"))])
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().expect("lock").clone()
        }

        pub fn last_request(&self) -> HttpRequest {
            self.requests().pop().expect("a request should have been sent")
        }
    }

    pub(crate) fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.to_string(),
        }
    }

    #[async_trait(?Send)]
    impl Transport for RecordingTransport {
        async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
            self.requests.lock().expect("lock").push(request);
            let mut outcomes = self.outcomes.lock().expect("lock");
            if outcomes.len() > 1 {
                outcomes.pop_front().expect("non-empty")
            } else {
                outcomes
                    .front()
                    .cloned()
                    .unwrap_or_else(|| Ok(response(200, "")))
            }
        }
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut req = HttpRequest::new(Method::POST, "/x").with_header("x-csrftoken", "a");
        req.set_header("X-CSRFToken", "b");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("X-CSRFTOKEN"), Some("b"));
    }

    #[test]
    fn test_patch_field_request_shape() {
        let transport = RecordingTransport::ok(200, r#"{"id": 5, "title": "Server title"}"#);
        let api = ItemsApi::new(transport.clone(), "/api/items/");
        let patch = PatchRequest::new(
            ResourceId::new("5"),
            "title",
            FieldValue::Text("My title".to_string()),
        );

        let confirmed = block_on(api.patch_field("/api/items/5/", &patch)).expect("patch ok");
        assert_eq!(confirmed, Some(FieldValue::Text("Server title".to_string())));

        let req = transport.last_request();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "/api/items/5/");
        assert_eq!(req.header("X-HTTP-Method-Override"), Some("PATCH"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value =
            serde_json::from_str(req.body.as_deref().expect("body")).expect("json body");
        assert_eq!(body, serde_json::json!({"id": 5, "title": "My title"}));
    }

    #[test]
    fn test_patch_field_empty_response_echoes_nothing() {
        let api = ItemsApi::new(RecordingTransport::ok(204, ""), "/api/items/");
        let patch = PatchRequest::new(ResourceId::new("5"), "title", FieldValue::Text("t".into()));
        assert_eq!(block_on(api.patch_field("/api/items/5/", &patch)).expect("ok"), None);
    }

    #[test]
    fn test_patch_field_http_error() {
        let api = ItemsApi::new(RecordingTransport::ok(400, "{\"url\": [\"invalid\"]}"), "/api/items/");
        let patch = PatchRequest::new(ResourceId::new("5"), "url", FieldValue::Text("x".into()));
        let err = block_on(api.patch_field("/api/items/5/", &patch)).expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn test_delete_item_sends_bodyless_delete() {
        let transport = RecordingTransport::ok(204, "");
        let api = ItemsApi::new(transport.clone(), "/api/items/");
        block_on(api.delete_item("/api/items/7/")).expect("delete ok");

        let req = transport.last_request();
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.url, "/api/items/7/");
        assert!(req.body.is_none());
    }

    #[test]
    fn test_delete_item_network_failure() {
        let api = ItemsApi::new(RecordingTransport::offline(), "/api/items/");
        let err = block_on(api.delete_item("/api/items/7/")).expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Network);
    }

    #[test]
    fn test_create_item_posts_to_items_endpoint() {
        let transport = RecordingTransport::ok(
            201,
            r#"{"id": 9, "url": "http://example.com", "title": "Example", "tags": ["a"], "created": "2014-01-01T00:00:00Z"}"#,
        );
        let api = ItemsApi::new(transport.clone(), "/api/items/");
        let created = block_on(api.create_item(&NewItem {
            url: "http://example.com".to_string(),
            tags: vec!["a".to_string()],
        }))
        .expect("create ok");

        assert_eq!(created.id.as_str(), "9");
        assert_eq!(created.title, "Example");

        let req = transport.last_request();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "/api/items/");
        assert!(req.header("X-HTTP-Method-Override").is_none());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let t = ReqwestTransport::new("https://links.example.com");
        assert_eq!(
            t.resolve("/api/items/5/").expect("resolves").as_str(),
            "https://links.example.com/api/items/5/"
        );
        assert_eq!(
            t.resolve("//cdn.example.com/x").expect("resolves").as_str(),
            "https://cdn.example.com/x"
        );
        assert_eq!(
            t.resolve("http://other.example.com/y").expect("resolves").as_str(),
            "http://other.example.com/y"
        );
    }

    #[test]
    fn test_resolve_bare_path_against_page_directory() {
        let t = ReqwestTransport::new("https://links.example.com/admin/list/");
        assert_eq!(
            t.resolve("items/5/").expect("resolves").as_str(),
            "https://links.example.com/admin/list/items/5/"
        );
        assert_eq!(
            t.resolve("/api/items/5/").expect("resolves").as_str(),
            "https://links.example.com/api/items/5/"
        );
    }
}
