use crate::models::Viewer;

/// Per-form "already submitted" flag, alive for the page view.
#[derive(Clone, Debug, Default)]
pub struct SubmissionGuard {
    submitted: bool,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` for the first submission only.
    pub fn try_submit(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        self.submitted = true;
        true
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("sign in required")]
pub struct AuthRequired;

/// Local policy check for registration-gated actions.
pub fn require_signed_in(viewer: &Viewer) -> Result<&str, AuthRequired> {
    viewer.handle().ok_or(AuthRequired)
}
