use super::line_index::Line;
use crate::models::{Annotation, AnnotationId};
use std::collections::{BTreeMap, HashMap};

/// The seam between marker bookkeeping and whatever actually draws markers.
///
/// The browser implementation lives in `crate::dom`; tests use a recording fake.
pub trait MarkerSurface {
    type Line;
    type Marker;

    /// Insert a marker for `annotation` on `line`, right after `after` or, when
    /// `after` is `None`, right after the line's primary marker slot.
    fn insert_marker(
        &mut self,
        line: &Self::Line,
        after: Option<&Self::Marker>,
        annotation: &Annotation,
        owned: bool,
    ) -> Option<Self::Marker>;

    fn remove_marker(&mut self, marker: Self::Marker);

    /// Selected-row emphasis while the primary marker is hovered.
    fn highlight_line(&mut self, line: &Self::Line, on: bool);
}

/// Tracks which marker belongs to which annotation and keeps per-line order.
pub struct MarkerRenderer<S: MarkerSurface> {
    surface: S,
    by_line: BTreeMap<usize, Vec<(AnnotationId, S::Marker)>>,
    line_of: HashMap<AnnotationId, usize>,
}

impl<S: MarkerSurface> MarkerRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            by_line: BTreeMap::new(),
            line_of: HashMap::new(),
        }
    }

    /// Returns `false` when a marker for this id is already attached.
    pub fn attach(&mut self, annotation: &Annotation, line: &Line<S::Line>, owned: bool) -> bool {
        if self.line_of.contains_key(&annotation.id) {
            log::warn!("marker for smell {} already attached", annotation.id);
            return false;
        }

        let markers = self.by_line.entry(line.index).or_default();
        let after = markers.last().map(|(_, m)| m);
        let Some(marker) = self
            .surface
            .insert_marker(&line.element, after, annotation, owned)
        else {
            log::warn!("could not draw marker for smell {}", annotation.id);
            if markers.is_empty() {
                self.by_line.remove(&line.index);
            }
            return false;
        };
        markers.push((annotation.id.clone(), marker));
        self.line_of.insert(annotation.id.clone(), line.index);
        true
    }

    /// Safe to call for ids that were never attached.
    pub fn detach(&mut self, id: &AnnotationId) -> bool {
        let Some(line) = self.line_of.remove(id) else {
            return false;
        };
        let Some(markers) = self.by_line.get_mut(&line) else {
            return false;
        };
        let Some(pos) = markers.iter().position(|(mid, _)| mid == id) else {
            return false;
        };
        let (_, marker) = markers.remove(pos);
        if markers.is_empty() {
            self.by_line.remove(&line);
        }
        self.surface.remove_marker(marker);
        true
    }

    pub fn hover(&mut self, line: &Line<S::Line>, on: bool) {
        self.surface.highlight_line(&line.element, on);
    }

    pub fn is_attached(&self, id: &AnnotationId) -> bool {
        self.line_of.contains_key(id)
    }

    pub fn line_of(&self, id: &AnnotationId) -> Option<usize> {
        self.line_of.get(id).copied()
    }

    /// Attached ids on `line`, in display order.
    pub fn markers_on(&self, line: usize) -> Vec<AnnotationId> {
        self.by_line
            .get(&line)
            .map(|ms| ms.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSurface;
    use super::*;

    fn ann(id: &str, line: usize, author: &str) -> Annotation {
        Annotation {
            id: AnnotationId::new(id),
            line_index: line,
            author_handle: author.to_string(),
        }
    }

    fn line(index: usize) -> Line<usize> {
        Line {
            index,
            element: index,
        }
    }

    #[test]
    fn test_attach_preserves_insertion_order() {
        let mut r = MarkerRenderer::new(FakeSurface::default());
        assert!(r.attach(&ann("1", 2, "a"), &line(2), false));
        assert!(r.attach(&ann("2", 2, "b"), &line(2), true));
        assert!(r.attach(&ann("3", 2, "c"), &line(2), false));
        assert_eq!(r.surface().labels_on(2), vec!["a", "b", "c"]);
        assert_eq!(
            r.markers_on(2),
            vec![AnnotationId::new("1"), AnnotationId::new("2"), AnnotationId::new("3")]
        );
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let mut r = MarkerRenderer::new(FakeSurface::default());
        assert!(r.attach(&ann("1", 0, "a"), &line(0), false));
        assert!(!r.attach(&ann("1", 0, "a"), &line(0), false));
        assert_eq!(r.surface().all().len(), 1);
    }

    #[test]
    fn test_detach_middle_marker() {
        let mut r = MarkerRenderer::new(FakeSurface::default());
        r.attach(&ann("1", 1, "a"), &line(1), false);
        r.attach(&ann("2", 1, "b"), &line(1), false);
        r.attach(&ann("3", 1, "c"), &line(1), false);
        assert!(r.detach(&AnnotationId::new("2")));
        assert_eq!(r.surface().labels_on(1), vec!["a", "c"]);
        // New markers still go after the last remaining one.
        r.attach(&ann("4", 1, "d"), &line(1), true);
        assert_eq!(r.surface().labels_on(1), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_detach_unknown_is_noop() {
        let mut r = MarkerRenderer::new(FakeSurface::default());
        assert!(!r.detach(&AnnotationId::new("ghost")));
    }

    #[test]
    fn test_hover_highlights_and_clears() {
        let mut r = MarkerRenderer::new(FakeSurface::default());
        r.hover(&line(5), true);
        assert_eq!(r.surface().highlighted, Some(5));
        r.hover(&line(5), false);
        assert_eq!(r.surface().highlighted, None);
    }
}
