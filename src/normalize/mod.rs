//! Value rewrites applied before a value leaves the client.

/// Prefixes `http://` to a URL that has no `http(s)://` scheme.
///
/// Returns `None` when the value should stay as typed, including an empty or
/// whitespace-only field.
pub(crate) fn normalize_url(value: &str) -> Option<String> {
    if value.trim().is_empty() || has_http_scheme(value) {
        return None;
    }
    Some(format!("http://{value}"))
}

fn has_http_scheme(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Blur handler body: the value the field should hold after losing focus.
pub(crate) fn url_after_blur(value: &str) -> String {
    normalize_url(value).unwrap_or_else(|| value.to_string())
}

/// How a tag input tokenizes what the user types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TagInputOptions {
    pub separators: Vec<char>,
    /// Turn the pending token into a tag when the input loses focus.
    pub select_on_blur: bool,
    pub open_on_enter: bool,
}

impl Default for TagInputOptions {
    fn default() -> Self {
        Self {
            separators: vec![','],
            select_on_blur: false,
            open_on_enter: false,
        }
    }
}

impl TagInputOptions {
    fn is_separator(&self, c: char) -> bool {
        self.separators.contains(&c)
    }

    /// Splits `input` into complete tokens and the trailing partial token.
    ///
    /// Tokens are neither trimmed nor de-duplicated; empty ones are dropped.
    pub fn split<'a>(&self, input: &'a str) -> (Vec<&'a str>, &'a str) {
        let mut parts: Vec<&str> = input.split(|c| self.is_separator(c)).collect();
        let pending = parts.pop().unwrap_or_default();
        parts.retain(|p| !p.is_empty());
        (parts, pending)
    }
}

/// Tag widget state: accepted tokens plus what is still being typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TagDraft {
    pub tokens: Vec<String>,
    pub pending: String,
}

impl TagDraft {
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            pending: String::new(),
        }
    }

    /// Replaces the pending text with `input`, moving every completed token
    /// into `tokens`.
    pub fn set_pending(&mut self, input: &str, opts: &TagInputOptions) {
        let (complete, rest) = opts.split(input);
        self.tokens.extend(complete.into_iter().map(str::to_string));
        self.pending = rest.to_string();
    }

    pub fn accept_pending(&mut self) {
        if !self.pending.is_empty() {
            self.tokens.push(std::mem::take(&mut self.pending));
        }
    }

    pub fn on_blur(&mut self, opts: &TagInputOptions) {
        if opts.select_on_blur {
            self.accept_pending();
        }
    }

    pub fn add(&mut self, tag: &str) {
        self.tokens.push(tag.to_string());
        self.pending.clear();
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.tokens.len() {
            self.tokens.remove(index);
        }
    }

    /// Tokens to submit. Typed-but-unaccepted text is included so nothing the
    /// user entered is lost on commit.
    pub fn to_value(&self) -> Vec<String> {
        let mut out = self.tokens.clone();
        if !self.pending.is_empty() {
            out.push(self.pending.clone());
        }
        out
    }
}

/// Suggestion list for a tag widget, seeded once from the page vocabulary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TagSuggestions {
    vocabulary: Vec<String>,
}

impl TagSuggestions {
    pub fn seed(vocabulary: &[String]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary entries containing `query` (case-insensitive) that are not
    /// already chosen. An empty query lists everything not chosen.
    pub fn matching(&self, query: &str, chosen: &[String], limit: usize) -> Vec<String> {
        let q = query.to_lowercase();
        self.vocabulary
            .iter()
            .filter(|t| !chosen.contains(t))
            .filter(|t| q.is_empty() || t.to_lowercase().contains(&q))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_without_scheme_gets_http() {
        assert_eq!(normalize_url("example.com").as_deref(), Some("http://example.com"));
        assert_eq!(url_after_blur("example.com/a?b=c"), "http://example.com/a?b=c");
    }

    #[test]
    fn test_url_with_scheme_unchanged() {
        assert!(normalize_url("https://example.com").is_none());
        assert!(normalize_url("http://example.com").is_none());
        assert_eq!(url_after_blur("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_empty_url_left_empty() {
        assert!(normalize_url("").is_none());
        assert!(normalize_url("   ").is_none());
        assert_eq!(url_after_blur(""), "");
    }

    #[test]
    fn test_scheme_match_is_case_sensitive() {
        assert_eq!(normalize_url("HTTP://x.org").as_deref(), Some("http://HTTP://x.org"));
        assert_eq!(normalize_url("ftp://x.org").as_deref(), Some("http://ftp://x.org"));
    }

    #[test]
    fn test_blur_is_idempotent() {
        let once = url_after_blur("example.com");
        assert_eq!(url_after_blur(&once), once);
    }

    #[test]
    fn test_default_tag_options() {
        let opts = TagInputOptions::default();
        assert_eq!(opts.separators, vec![',']);
        assert!(!opts.select_on_blur);
        assert!(!opts.open_on_enter);
    }

    #[test]
    fn test_split_keeps_whitespace_and_duplicates() {
        let opts = TagInputOptions::default();
        let (done, pending) = opts.split("rust, wasm,rust,,par");
        assert_eq!(done, vec!["rust", " wasm", "rust"]);
        assert_eq!(pending, "par");
    }

    #[test]
    fn test_tag_draft_typing_and_blur() {
        let opts = TagInputOptions::default();
        let mut draft = TagDraft::from_tokens(vec!["a".to_string()]);
        draft.set_pending("b,c", &opts);
        assert_eq!(draft.tokens, vec!["a", "b"]);
        assert_eq!(draft.pending, "c");

        draft.on_blur(&opts);
        assert_eq!(draft.pending, "c", "select_on_blur is off");
        assert_eq!(draft.to_value(), vec!["a", "b", "c"]);

        let mut eager = draft.clone();
        eager.on_blur(&TagInputOptions {
            select_on_blur: true,
            ..TagInputOptions::default()
        });
        assert_eq!(eager.tokens, vec!["a", "b", "c"]);
        assert!(eager.pending.is_empty());
    }

    #[test]
    fn test_tag_draft_add_and_remove() {
        let mut draft = TagDraft::default();
        draft.pending = "ru".to_string();
        draft.add("rust");
        draft.add("rust");
        assert_eq!(draft.tokens, vec!["rust", "rust"]);
        assert!(draft.pending.is_empty());
        draft.remove(0);
        draft.remove(9);
        assert_eq!(draft.to_value(), vec!["rust"]);
    }

    #[test]
    fn test_suggestions_filter_and_exclude_chosen() {
        let vocab = vec!["Rust".to_string(), "wasm".to_string(), "trust".to_string()];
        let s = TagSuggestions::seed(&vocab);
        assert_eq!(s.len(), 3);
        assert_eq!(s.matching("rus", &[], 10), vec!["Rust", "trust"]);
        assert_eq!(s.matching("rus", &["Rust".to_string()], 10), vec!["trust"]);
        assert_eq!(s.matching("", &[], 2), vec!["Rust", "wasm"]);
    }
}
