use crate::storage::{load_raw_from_storage, save_json_to_storage, READS_KEY};
use serde::Serialize;
use std::collections::BTreeSet;

/// Ids of the items this browser has already opened.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ReadState {
    ids: BTreeSet<String>,
}

impl ReadState {
    /// Missing or unreadable data degrades to "nothing read yet".
    ///
    /// Older pages stored numeric ids as JSON numbers; those are kept as their
    /// decimal text.
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Self::default();
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("ignoring unreadable read-state: {e}");
                return Self::default();
            }
        };

        let ids = values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        Self { ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_unread(&self, id: &str) -> bool {
        !self.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Item id behind a title link.
///
/// `/view/<id>[/...][?...][#...]` yields `<id>`; any other href is used whole.
pub fn item_id_from_href(href: &str) -> String {
    href.strip_prefix("/view/")
        .map(|rest| {
            let end = rest.find(&['/', '?', '#'][..]).unwrap_or(rest.len());
            &rest[..end]
        })
        .filter(|id| !id.is_empty())
        .unwrap_or(href)
        .to_string()
}

/// Loads read-state once per page view and records the viewed item.
#[derive(Clone, Debug, Default)]
pub struct ReadTracker {
    state: ReadState,
}

impl ReadTracker {
    pub fn new(state: ReadState) -> Self {
        Self { state }
    }

    pub fn load() -> Self {
        let raw = load_raw_from_storage(READS_KEY);
        Self::new(ReadState::decode(raw.as_deref()))
    }

    pub fn state(&self) -> &ReadState {
        &self.state
    }

    /// Items of a listing that have not been opened, in listing order.
    pub fn unread<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        ids.into_iter().filter(|id| self.state.is_unread(id)).collect()
    }

    /// Marks `id` read. Returns `false` for blank ids.
    pub fn record_view(&mut self, id: &str) -> bool {
        if id.trim().is_empty() {
            return false;
        }
        self.state.insert(id);
        true
    }

    /// Writes unconditionally; repeating the write is harmless.
    pub fn persist(&self) {
        save_json_to_storage(READS_KEY, &self.state);
    }
}


// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::storage::remove_from_storage;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_read_tracker_storage_roundtrip() {
        remove_from_storage(READS_KEY);
        let mut t = ReadTracker::load();
        assert!(t.state().is_empty());

        t.record_view("q1");
        t.persist();
        t.persist();

        let reloaded = ReadTracker::load();
        assert!(reloaded.state().contains("q1"));
        assert_eq!(reloaded.state().len(), 1);
        remove_from_storage(READS_KEY);
    }

    #[wasm_bindgen_test]
    fn test_corrupt_storage_degrades_to_empty() {
        crate::storage::save_json_to_storage(READS_KEY, &"not an array");
        assert!(ReadTracker::load().state().is_empty());
        remove_from_storage(READS_KEY);
    }
}
