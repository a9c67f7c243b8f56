use super::line_index::{LineIndex, ResolveError};
use super::render::{MarkerRenderer, MarkerSurface};
use super::store::AnnotationStore;
use crate::api::{ApiError, ApiResult};
use crate::dialog::ConfirmDialog;
use crate::models::{Annotation, AnnotationId, CreatedSmell, Viewer};

/// Why a click on a primary marker did not turn into a request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CreateBlocked {
    #[error("sign in to mark smells")]
    NeedsAuth,
    #[error("this listing is not bound to an item")]
    NoItem,
    #[error(transparent)]
    UnknownLine(#[from] ResolveError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateRequest {
    pub item_id: String,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RemoveTarget {
    pub id: AnnotationId,
    /// Page scroll offset when the dialog was opened.
    pub scroll_y: f64,
}

/// Annotation flows for one listing: seeding, create, remove.
///
/// Request issuance is left to the caller: `begin_*`/`confirm_*` decide whether
/// a request should go out, `complete_*` reconciles its outcome into the store
/// and the renderer. Nothing is mutated on failure.
pub struct AnnotationClient<S: MarkerSurface> {
    item_id: Option<String>,
    viewer: Viewer,
    lines: LineIndex<S::Line>,
    store: AnnotationStore,
    renderer: MarkerRenderer<S>,
    remove_dialog: ConfirmDialog<RemoveTarget>,
}

impl<S: MarkerSurface> AnnotationClient<S> {
    pub fn new(
        item_id: Option<String>,
        viewer: Viewer,
        lines: LineIndex<S::Line>,
        surface: S,
    ) -> Self {
        Self {
            item_id: item_id.filter(|id| !id.trim().is_empty()),
            viewer,
            lines,
            store: AnnotationStore::new(),
            renderer: MarkerRenderer::new(surface),
            remove_dialog: ConfirmDialog::new(),
        }
    }

    /// Loads the initial payload. Records pointing outside the listing are
    /// dropped with a warning. Returns how many markers were attached.
    pub fn seed(&mut self, records: impl IntoIterator<Item = Annotation>) -> usize {
        let valid: Vec<Annotation> = records
            .into_iter()
            .filter(|a| match self.lines.resolve(a.line_index) {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("dropping smell {}: {}", a.id, e);
                    false
                }
            })
            .collect();

        self.store.seed(valid);

        let mut attached = 0;
        for a in self.store.iter() {
            let Ok(line) = self.lines.resolve(a.line_index) else {
                continue;
            };
            if self.renderer.attach(a, line, self.viewer.owns(a)) {
                attached += 1;
            }
        }
        attached
    }

    pub fn begin_create(&self, line: usize) -> Result<CreateRequest, CreateBlocked> {
        if self.viewer.is_anonymous() {
            return Err(CreateBlocked::NeedsAuth);
        }
        let item_id = self.item_id.clone().ok_or(CreateBlocked::NoItem)?;
        self.lines.resolve(line)?;
        Ok(CreateRequest { item_id, line })
    }

    pub fn complete_create(
        &mut self,
        req: &CreateRequest,
        result: ApiResult<CreatedSmell>,
    ) -> ApiResult<Annotation> {
        let created = result?;
        let author = self
            .viewer
            .handle()
            .ok_or_else(|| ApiError::rejected("not signed in"))?
            .to_string();
        let line = self
            .lines
            .resolve(req.line)
            .map_err(|e| ApiError::rejected(e.to_string()))?;

        let annotation = Annotation {
            id: created.id,
            line_index: req.line,
            author_handle: author,
        };

        if self.store.contains(&annotation.id) {
            log::warn!("smell {} already known, not adding again", annotation.id);
            return Ok(annotation);
        }

        self.store.add(annotation.clone());
        self.renderer.attach(&annotation, line, true);
        Ok(annotation)
    }

    /// Binds the remove dialog to `id`. Only owned, known annotations qualify.
    pub fn open_remove(&mut self, id: &AnnotationId, scroll_y: f64) -> bool {
        match self.store.get(id) {
            Some(a) if self.viewer.owns(a) => {
                self.remove_dialog.bind(RemoveTarget {
                    id: id.clone(),
                    scroll_y,
                });
                true
            }
            _ => false,
        }
    }

    pub fn dismiss_remove(&mut self) {
        self.remove_dialog.dismiss();
    }

    pub fn confirm_remove(&mut self) -> Option<RemoveTarget> {
        self.remove_dialog.confirm()
    }

    /// On success returns the scroll offset to restore.
    pub fn complete_remove(&mut self, target: &RemoveTarget, result: ApiResult<()>) -> ApiResult<f64> {
        if let Err(e) = result {
            self.remove_dialog.finish(target, false);
            return Err(e);
        }
        self.store.remove(&target.id);
        self.renderer.detach(&target.id);
        self.remove_dialog.finish(target, true);
        Ok(target.scroll_y)
    }

    pub fn hover(&mut self, line: usize, on: bool) {
        if let Ok(line) = self.lines.resolve(line) {
            self.renderer.hover(line, on);
        }
    }

    pub fn lines(&self) -> &LineIndex<S::Line> {
        &self.lines
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn renderer(&self) -> &MarkerRenderer<S> {
        &self.renderer
    }

    pub fn remove_target(&self) -> Option<&RemoveTarget> {
        self.remove_dialog.target()
    }
}

#[cfg(test)]
mod tests {
    use super::super::render::fake::FakeSurface;
    use super::*;
    use crate::api::ApiErrorKind;

    fn ann(id: &str, line: usize, author: &str) -> Annotation {
        Annotation {
            id: AnnotationId::new(id),
            line_index: line,
            author_handle: author.to_string(),
        }
    }

    fn client(viewer: Option<&str>, lines: usize) -> AnnotationClient<FakeSurface> {
        AnnotationClient::new(
            Some("code-1".to_string()),
            Viewer::new(viewer.map(str::to_string)),
            LineIndex::build(0..lines),
            FakeSurface::default(),
        )
    }

    fn created(id: &str) -> ApiResult<CreatedSmell> {
        Ok(CreatedSmell {
            id: AnnotationId::new(id),
        })
    }

    fn server_error(msg: &str) -> ApiError {
        ApiError::http(500, msg.to_string())
    }

    #[test]
    fn test_seed_attaches_each_record_to_its_line_only() {
        let mut c = client(Some("me"), 10);
        let n = c.seed(vec![ann("1", 0, "a"), ann("2", 4, "b"), ann("3", 4, "me")]);
        assert_eq!(n, 3);
        let surface = c.renderer().surface();
        for m in surface.all() {
            let expected = c.store().get(&m.id).expect("stored").line_index;
            assert_eq!(m.line, expected);
        }
        assert_eq!(surface.labels_on(4), vec!["b", "me"]);
        assert!(surface.labels_on(1).is_empty());
    }

    #[test]
    fn test_seed_drops_out_of_bounds_records() {
        let mut c = client(Some("me"), 3);
        let n = c.seed(vec![ann("1", 2, "a"), ann("2", 3, "b"), ann("3", 99, "c")]);
        assert_eq!(n, 1);
        assert_eq!(c.store().len(), 1);
        assert!(!c.renderer().is_attached(&AnnotationId::new("2")));
        assert!(!c.renderer().is_attached(&AnnotationId::new("3")));
    }

    #[test]
    fn test_seed_marks_ownership() {
        let mut c = client(Some("me"), 2);
        c.seed(vec![ann("1", 0, "me"), ann("2", 0, "other")]);
        let owned: Vec<bool> = c.renderer().surface().all().iter().map(|m| m.owned).collect();
        assert_eq!(owned, vec![true, false]);
    }

    #[test]
    fn test_anonymous_create_is_blocked() {
        let c = client(None, 5);
        assert_eq!(c.begin_create(1), Err(CreateBlocked::NeedsAuth));
    }

    #[test]
    fn test_create_without_item_is_blocked() {
        let c: AnnotationClient<FakeSurface> = AnnotationClient::new(
            None,
            Viewer::new(Some("me".to_string())),
            LineIndex::build(0..3),
            FakeSurface::default(),
        );
        assert_eq!(c.begin_create(0), Err(CreateBlocked::NoItem));
    }

    #[test]
    fn test_create_out_of_bounds_is_blocked() {
        let c = client(Some("me"), 2);
        assert!(matches!(c.begin_create(2), Err(CreateBlocked::UnknownLine(_))));
    }

    #[test]
    fn test_successful_create_adds_one_owned_marker_after_existing() {
        let mut c = client(Some("viewer"), 6);
        c.seed(vec![ann("1", 3, "x"), ann("2", 3, "y")]);
        let req = c.begin_create(3).expect("allowed");
        assert_eq!(req.item_id, "code-1");

        let a = c.complete_create(&req, created("9")).expect("created");
        assert_eq!(a.author_handle, "viewer");
        assert_eq!(c.store().len(), 3);
        assert_eq!(
            c.store().on_line(3).filter(|a| a.author_handle == "viewer").count(),
            1
        );

        let surface = c.renderer().surface();
        assert_eq!(surface.labels_on(3), vec!["x", "y", "viewer"]);
        let new_marker = surface.rows[&3].last().expect("marker");
        assert!(new_marker.owned);
    }

    #[test]
    fn test_failed_create_changes_nothing() {
        let mut c = client(Some("viewer"), 4);
        let req = c.begin_create(1).expect("allowed");
        let err = c
            .complete_create(&req, Err(server_error("already smelled")))
            .expect_err("should fail");
        assert_eq!(err.to_string(), "already smelled");
        assert!(c.store().is_empty());
        assert!(c.renderer().surface().all().is_empty());
    }

    #[test]
    fn test_duplicate_create_response_is_not_added_twice() {
        let mut c = client(Some("viewer"), 4);
        let req = c.begin_create(1).expect("allowed");
        c.complete_create(&req, created("5")).expect("created");
        c.complete_create(&req, created("5")).expect("created");
        assert_eq!(c.store().len(), 1);
        assert_eq!(c.renderer().surface().all().len(), 1);
    }

    #[test]
    fn test_rapid_creates_on_same_line_render_in_arrival_order() {
        let mut c = client(Some("viewer"), 4);
        let r1 = c.begin_create(2).expect("allowed");
        let r2 = c.begin_create(2).expect("allowed");
        c.complete_create(&r2, created("b")).expect("created");
        c.complete_create(&r1, created("a")).expect("created");
        assert_eq!(
            c.renderer().markers_on(2),
            vec![AnnotationId::new("b"), AnnotationId::new("a")]
        );
    }

    #[test]
    fn test_remove_detaches_only_target() {
        let mut c = client(Some("me"), 3);
        c.seed(vec![ann("1", 1, "me"), ann("2", 1, "me"), ann("3", 1, "you")]);
        assert!(c.open_remove(&AnnotationId::new("2"), 120.0));
        let target = c.confirm_remove().expect("bound");
        let scroll = c.complete_remove(&target, Ok(())).expect("removed");
        assert_eq!(scroll, 120.0);
        assert!(!c.store().contains(&AnnotationId::new("2")));
        assert!(!c.renderer().is_attached(&AnnotationId::new("2")));
        assert_eq!(c.renderer().surface().labels_on(1), vec!["me", "you"]);
        assert!(c.remove_target().is_none());
    }

    #[test]
    fn test_reopened_dialog_removes_latest_target_only() {
        let mut c = client(Some("me"), 3);
        c.seed(vec![ann("A", 0, "me"), ann("B", 2, "me")]);

        assert!(c.open_remove(&AnnotationId::new("A"), 0.0));
        c.dismiss_remove();
        assert!(c.open_remove(&AnnotationId::new("B"), 0.0));
        let target = c.confirm_remove().expect("bound");
        assert_eq!(target.id, AnnotationId::new("B"));
        c.complete_remove(&target, Ok(())).expect("removed");

        assert!(c.store().contains(&AnnotationId::new("A")));
        assert!(c.renderer().is_attached(&AnnotationId::new("A")));
        assert!(!c.store().contains(&AnnotationId::new("B")));
    }

    #[test]
    fn test_confirm_twice_issues_one_request() {
        let mut c = client(Some("me"), 1);
        c.seed(vec![ann("A", 0, "me")]);
        c.open_remove(&AnnotationId::new("A"), 0.0);
        assert!(c.confirm_remove().is_some());
        assert!(c.confirm_remove().is_none());
    }

    #[test]
    fn test_cannot_open_remove_for_foreign_or_unknown_marker() {
        let mut c = client(Some("me"), 2);
        c.seed(vec![ann("A", 0, "you")]);
        assert!(!c.open_remove(&AnnotationId::new("A"), 0.0));
        assert!(!c.open_remove(&AnnotationId::new("Z"), 0.0));
        assert!(c.confirm_remove().is_none());
    }

    #[test]
    fn test_failed_remove_keeps_annotation() {
        let mut c = client(Some("me"), 2);
        c.seed(vec![ann("A", 1, "me")]);
        c.open_remove(&AnnotationId::new("A"), 0.0);
        let target = c.confirm_remove().expect("bound");
        let err = c
            .complete_remove(&target, Err(server_error("nope")))
            .expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert!(c.store().contains(&AnnotationId::new("A")));
        assert!(c.renderer().is_attached(&AnnotationId::new("A")));
        // Dialog still bound; the viewer may confirm again.
        assert!(c.confirm_remove().is_some());
    }

    #[test]
    fn test_hover_outside_listing_is_ignored() {
        let mut c = client(Some("me"), 2);
        c.hover(1, true);
        assert_eq!(c.renderer().surface().highlighted, Some(1));
        c.hover(7, true);
        assert_eq!(c.renderer().surface().highlighted, Some(1));
        c.hover(1, false);
        assert_eq!(c.renderer().surface().highlighted, None);
    }
}
