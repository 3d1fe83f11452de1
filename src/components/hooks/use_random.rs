use std::sync::atomic::{AtomicUsize, Ordering};

const PREFIX: &str = "linklist"; // Must NOT contain "/" or "-"

static COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Page-unique element id, e.g. for tying a prompt to its `aria-labelledby`.
pub fn use_random_id_for(element: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{element}_{PREFIX}_{n}")
}
