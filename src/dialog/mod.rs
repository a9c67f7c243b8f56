/// State behind a shared confirmation dialog.
///
/// The dialog holds at most one target. Binding a new target replaces the
/// previous one, so a confirmation always acts on the most recently opened
/// item. While a confirmed request is in flight, further confirmations are
/// ignored.
#[derive(Clone, Debug)]
pub struct ConfirmDialog<T> {
    target: Option<T>,
    in_flight: bool,
}

impl<T> Default for ConfirmDialog<T> {
    fn default() -> Self {
        Self {
            target: None,
            in_flight: false,
        }
    }
}

impl<T: Clone + PartialEq> ConfirmDialog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, target: T) {
        self.target = Some(target);
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// The dialog was dismissed without confirming.
    pub fn dismiss(&mut self) {
        if !self.in_flight {
            self.target = None;
        }
    }

    /// Returns the target to act on, or `None` if nothing is bound or a
    /// request for this dialog is still running.
    pub fn confirm(&mut self) -> Option<T> {
        if self.in_flight {
            return None;
        }
        let target = self.target.clone()?;
        self.in_flight = true;
        Some(target)
    }

    /// Request for `target` finished. On success the binding is cleared unless
    /// it was displaced by a newer target in the meantime.
    pub fn finish(&mut self, target: &T, succeeded: bool) {
        self.in_flight = false;
        if succeeded && self.target.as_ref() == Some(target) {
            self.target = None;
        }
    }
}
