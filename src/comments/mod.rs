use crate::api::{ApiError, ApiResult};
use crate::dialog::ConfirmDialog;
use crate::models::PreviewResponse;

/// Comment preview pane. Refreshes only happen while it is open.
#[derive(Clone, Debug, Default)]
pub struct PreviewPane {
    open: bool,
}

impl PreviewPane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new open state; opening should trigger an immediate refresh.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Rendered HTML from a preview response, or the message to surface.
pub fn preview_html(result: ApiResult<PreviewResponse>) -> ApiResult<String> {
    let resp = result?;
    if resp.result != "ok" {
        let msg = resp
            .error
            .unwrap_or_else(|| format!("preview failed: {}", resp.result));
        return Err(ApiError::rejected(msg));
    }
    Ok(resp.html.unwrap_or_default())
}

/// Comment-removal dialog, one target comment at a time.
pub type CommentRemoval = ConfirmDialog<String>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    fn resp(json: &str) -> ApiResult<PreviewResponse> {
        Ok(serde_json::from_str(json).expect("fixture should parse"))
    }

    #[test]
    fn test_preview_pane_toggles() {
        let mut p = PreviewPane::new();
        assert!(p.toggle());
        assert!(p.is_open());
        assert!(!p.toggle());
    }

    #[test]
    fn test_preview_ok() {
        let html = preview_html(resp(r#"{"result":"ok","html":"<p>hi</p>"}"#)).expect("ok");
        assert_eq!(html, "<p>hi</p>");
    }

    #[test]
    fn test_preview_error_surfaces_server_message() {
        let e = preview_html(resp(r#"{"result":"ng","error":"too long"}"#)).expect_err("ng");
        assert_eq!(e.kind, ApiErrorKind::Rejected);
        assert_eq!(e.to_string(), "too long");
    }

    #[test]
    fn test_preview_transport_error_passes_through() {
        let e = preview_html(Err(ApiError::http(502, "bad gateway".to_string()))).expect_err("err");
        assert_eq!(e.to_string(), "bad gateway");
    }

    #[test]
    fn test_comment_removal_acts_on_latest_binding() {
        let mut d = CommentRemoval::new();
        d.bind("c1".to_string());
        d.bind("c2".to_string());
        assert_eq!(d.confirm().as_deref(), Some("c2"));
    }
}
