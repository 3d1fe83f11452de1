use crate::csrf::{DEFAULT_CSRF_COOKIE, DEFAULT_CSRF_HEADER};
use leptos::logging::warn;
use serde::{Deserialize, Serialize};

const PAGE_GLOBAL: &str = "PYPO";

/// Settings the server injects as `window.PYPO = {...}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct PageConfig {
    /// Tag vocabulary for suggestions.
    pub tags: Vec<String>,
    pub csrf_cookie_name: String,
    pub csrf_header_name: String,
    pub items_endpoint: String,
    pub mount_selector: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            csrf_cookie_name: DEFAULT_CSRF_COOKIE.to_string(),
            csrf_header_name: DEFAULT_CSRF_HEADER.to_string(),
            items_endpoint: "/api/items/".to_string(),
            mount_selector: "#item_list".to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<PageConfig>(json) {
            Ok(cfg) => cfg.with_fallbacks(),
            Err(e) => {
                warn!("config: ignoring window.{PAGE_GLOBAL} ({e}); using defaults");
                Self::default()
            }
        }
    }

    /// Reads `window.PYPO`; absent or malformed config yields the defaults.
    pub fn from_window() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let Some(raw) = window.get(PAGE_GLOBAL) else {
            return Self::default();
        };
        if raw.is_undefined() || !raw.is_object() {
            return Self::default();
        }

        match js_sys::JSON::stringify(&raw).ok().and_then(|s| s.as_string()) {
            Some(json) => Self::from_json(&json),
            None => Self::default(),
        }
    }

    /// Blank strings behave like missing keys.
    fn with_fallbacks(mut self) -> Self {
        let defaults = Self::default();
        for (value, fallback) in [
            (&mut self.csrf_cookie_name, defaults.csrf_cookie_name),
            (&mut self.csrf_header_name, defaults.csrf_header_name),
            (&mut self.items_endpoint, defaults.items_endpoint),
            (&mut self.mount_selector, defaults.mount_selector),
        ] {
            if value.trim().is_empty() {
                *value = fallback;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_only_config() {
        let cfg = PageConfig::from_json(r#"{"tags": ["rust", "wasm"]}"#);
        assert_eq!(cfg.tags, vec!["rust", "wasm"]);
        assert_eq!(cfg.csrf_cookie_name, "csrftoken");
        assert_eq!(cfg.csrf_header_name, "X-CSRFToken");
        assert_eq!(cfg.items_endpoint, "/api/items/");
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let cfg = PageConfig::from_json(
            r#"{"csrf_cookie_name": "tok", "items_endpoint": " ", "mount_selector": "main"}"#,
        );
        assert_eq!(cfg.csrf_cookie_name, "tok");
        assert_eq!(cfg.items_endpoint, "/api/items/");
        assert_eq!(cfg.mount_selector, "main");
    }

    #[test]
    fn test_malformed_config_falls_back() {
        assert_eq!(PageConfig::from_json("{\"tags\": 3}"), PageConfig::default());
        assert_eq!(PageConfig::from_json("not json"), PageConfig::default());
    }
}
