use crate::api::{ApiResult, HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use leptos::logging::warn;
use wasm_bindgen::JsCast;

pub(crate) const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
pub(crate) const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";

/// Looks up `name` in a `document.cookie` style string.
///
/// Entries are `;`-separated `key=value` pairs with optional whitespace. The
/// first matching value is percent-decoded; values that are not valid
/// percent-encoding are returned as-is.
pub(crate) fn get_token(cookies: &str, name: &str) -> Option<String> {
    if cookies.trim().is_empty() || name.is_empty() {
        return None;
    }

    cookies
        .split(';')
        .map(str::trim)
        .find_map(|entry| {
            entry
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .map(|raw| match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        })
}

/// GET, HEAD, OPTIONS and TRACE never carry the token.
pub(crate) fn is_safe_method(method: &str) -> bool {
    ["GET", "HEAD", "OPTIONS", "TRACE"]
        .iter()
        .any(|m| m.eq_ignore_ascii_case(method))
}

/// Scheme + host (+ port) of the page, as `window.location` reports them,
/// plus the page URL that relative request URLs resolve against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Origin {
    /// Including the trailing colon, e.g. `https:`.
    pub protocol: String,
    /// Host with optional port, e.g. `links.example.com:8000`.
    pub host: String,
    page_url: String,
}

impl Origin {
    pub fn new(protocol: impl Into<String>, host: impl Into<String>) -> Self {
        let (protocol, host) = (protocol.into(), host.into());
        let page_url = format!("{protocol}//{host}/");
        Self {
            protocol,
            host,
            page_url,
        }
    }

    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = page_url.into();
        self
    }

    pub fn from_location() -> Option<Self> {
        let location = web_sys::window()?.location();
        let protocol = location.protocol().ok()?;
        let host = location.host().ok()?;
        let href = location.href().ok()?;
        Some(Self::new(protocol, host).with_page_url(href))
    }

    fn scheme_relative(&self) -> String {
        format!("//{}", self.host)
    }

    fn full(&self) -> String {
        format!("{}{}", self.protocol, self.scheme_relative())
    }

    /// `url` resolved against the page URL with the WHATWG rules the browser
    /// and `ReqwestTransport` use (scheme case, `\` as `/`, surrounding
    /// whitespace).
    pub fn resolve(&self, url: &str) -> Option<reqwest::Url> {
        reqwest::Url::parse(&self.page_url).ok()?.join(url).ok()
    }

    pub fn is_same_origin(&self, url: &str) -> bool {
        match (self.resolve(url), reqwest::Url::parse(&self.full())) {
            (Some(target), Ok(page)) => target.origin() == page.origin(),
            _ => self.matches_literally(url),
        }
    }

    /// String rules for input the URL parser rejects.
    fn matches_literally(&self, url: &str) -> bool {
        let matches = |origin: &str| {
            url == origin
                || url
                    .strip_prefix(origin)
                    .is_some_and(|rest| rest.starts_with('/'))
        };

        matches(&self.full()) || matches(&self.scheme_relative()) || !looks_absolute(url)
    }
}

/// Absolute (`http:`/`https:`) or scheme-relative (`//`) URLs. Anything else
/// is a relative path and stays on the page's origin.
fn looks_absolute(url: &str) -> bool {
    url.starts_with("//") || url.starts_with("http:") || url.starts_with("https:")
}

pub(crate) fn document_cookies() -> String {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
        .and_then(|d| d.cookie().ok())
        .unwrap_or_default()
}

/// Attaches the CSRF token to unsafe same-origin requests before handing them
/// to the wrapped transport.
pub(crate) struct CsrfTransport<T> {
    inner: T,
    origin: Origin,
    header_name: String,
    token: Option<String>,
}

impl<T: Transport> CsrfTransport<T> {
    pub fn new(inner: T, origin: Origin, header_name: impl Into<String>, token: Option<String>) -> Self {
        if token.is_none() {
            warn!("csrf: no token cookie found; mutating requests will be sent without it");
        }
        Self {
            inner,
            origin,
            header_name: header_name.into(),
            token,
        }
    }

    /// Resolves the token from the live cookie jar once, at page start.
    pub fn from_document(inner: T, origin: Origin, cookie_name: &str, header_name: &str) -> Self {
        let token = get_token(&document_cookies(), cookie_name);
        Self::new(inner, origin, header_name, token)
    }

    /// Pins the request to its resolved URL, then adds the token if the
    /// request is unsafe and stays on the page's origin.
    pub(crate) fn authorize(&self, request: &mut HttpRequest) {
        if let Some(resolved) = self.origin.resolve(&request.url) {
            request.url = resolved.into();
        }
        if is_safe_method(request.method.as_str()) || !self.origin.is_same_origin(&request.url) {
            return;
        }
        if let Some(token) = &self.token {
            request.set_header(&self.header_name, token);
        }
    }
}

#[async_trait(?Send)]
impl<T: Transport> Transport for CsrfTransport<T> {
    async fn send(&self, mut request: HttpRequest) -> ApiResult<HttpResponse> {
        self.authorize(&mut request);
        self.inner.send(request).await
    }
}
