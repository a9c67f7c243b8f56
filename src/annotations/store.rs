use crate::models::{Annotation, AnnotationId};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
struct Entry {
    seq: u64,
    annotation: Annotation,
}

/// In-memory annotations keyed by line index.
///
/// Entries on one line keep their arrival order (a sequence number assigned on
/// every append). The store never renders; callers drive the renderer.
#[derive(Clone, Debug, Default)]
pub struct AnnotationStore {
    lines: BTreeMap<usize, Vec<Entry>>,
    next_seq: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current contents.
    pub fn seed(&mut self, records: impl IntoIterator<Item = Annotation>) {
        self.lines.clear();
        self.next_seq = 0;
        for r in records {
            self.add(r);
        }
    }

    /// Appends without a duplicate check; callers must not add a server id twice.
    pub fn add(&mut self, annotation: Annotation) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.lines
            .entry(annotation.line_index)
            .or_default()
            .push(Entry { seq, annotation });
        seq
    }

    /// Absent ids are a no-op.
    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let line = self.find_line(id)?;
        let entries = self.lines.get_mut(&line)?;
        let pos = entries.iter().position(|e| &e.annotation.id == id)?;
        let removed = entries.remove(pos).annotation;
        if entries.is_empty() {
            self.lines.remove(&line);
        }
        Some(removed)
    }

    fn find_line(&self, id: &AnnotationId) -> Option<usize> {
        self.lines
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| &e.annotation.id == id))
            .map(|(line, _)| *line)
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.lines
            .values()
            .flatten()
            .map(|e| &e.annotation)
            .find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.get(id).is_some()
    }

    /// Annotations on `line` in arrival order.
    pub fn on_line(&self, line: usize) -> impl Iterator<Item = &Annotation> {
        self.lines
            .get(&line)
            .into_iter()
            .flatten()
            .map(|e| &e.annotation)
    }

    /// All annotations, by line then arrival.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.lines.values().flatten().map(|e| &e.annotation)
    }

    pub fn len(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[cfg(test)]
    fn seq_of(&self, id: &AnnotationId) -> Option<u64> {
        self.lines
            .values()
            .flatten()
            .find(|e| &e.annotation.id == id)
            .map(|e| e.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(id: &str, line: usize, author: &str) -> Annotation {
        Annotation {
            id: AnnotationId::new(id),
            line_index: line,
            author_handle: author.to_string(),
        }
    }

    #[test]
    fn test_seed_replaces_contents() {
        let mut store = AnnotationStore::new();
        store.add(ann("old", 0, "a"));
        store.seed(vec![ann("1", 2, "a"), ann("2", 5, "b")]);
        assert_eq!(store.len(), 2);
        assert!(!store.contains(&AnnotationId::new("old")));
    }

    #[test]
    fn test_on_line_keeps_arrival_order() {
        let mut store = AnnotationStore::new();
        store.add(ann("b", 3, "x"));
        store.add(ann("a", 3, "y"));
        store.add(ann("c", 1, "z"));
        let ids: Vec<&str> = store.on_line(3).map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(store.seq_of(&AnnotationId::new("b")) < store.seq_of(&AnnotationId::new("a")));
    }

    #[test]
    fn test_remove_only_target() {
        let mut store = AnnotationStore::new();
        store.seed(vec![ann("1", 4, "a"), ann("2", 4, "b"), ann("3", 4, "c")]);
        let removed = store.remove(&AnnotationId::new("2")).expect("present");
        assert_eq!(removed.author_handle, "b");
        let ids: Vec<&str> = store.on_line(4).map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = AnnotationStore::new();
        store.add(ann("1", 0, "a"));
        assert!(store.remove(&AnnotationId::new("nope")).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_last_on_line_clears_line() {
        let mut store = AnnotationStore::new();
        store.add(ann("1", 0, "a"));
        store.remove(&AnnotationId::new("1"));
        assert!(store.is_empty());
        assert_eq!(store.on_line(0).count(), 0);
    }
}
