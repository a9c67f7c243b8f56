use strum::{AsRefStr, Display};

/// How long the floating control stays up after it is first shown.
pub const AUTO_HIDE_MS: i32 = 5_000;

const CONTROL_TOP_OFFSET: f64 = 30.0;
const CONTROL_RIGHT_INSET: f64 = 50.0;

/// Whether annotation markers are shown on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum MarkerDisplay {
    Visible,
    Hidden,
}

impl MarkerDisplay {
    pub fn flipped(self) -> Self {
        match self {
            Self::Visible => Self::Hidden,
            Self::Hidden => Self::Visible,
        }
    }
}

/// Visibility of the floating control itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ControlPhase {
    Hidden,
    Shown,
    /// Shown, with the auto-hide timer pending.
    Fading,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleLabels {
    /// Shown while markers are visible ("clicking hides them").
    pub hide: String,
    /// Shown while markers are hidden.
    pub show: String,
}

impl Default for ToggleLabels {
    fn default() -> Self {
        Self {
            hide: "ウンコを非表示".to_string(),
            show: "ウンコを表示".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
}

/// Top-left corner for the control, anchored above the listing's right edge.
pub fn control_position(listing: Rect, control_width: f64) -> (f64, f64) {
    let top = listing.top - CONTROL_TOP_OFFSET;
    let left = listing.left + listing.width - control_width - CONTROL_RIGHT_INSET;
    (top, left.max(listing.left))
}

/// State of the marker visibility toggle and its auto-fading control.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityToggle {
    display: MarkerDisplay,
    phase: ControlPhase,
    labels: ToggleLabels,
}

impl Default for VisibilityToggle {
    fn default() -> Self {
        Self::new(ToggleLabels::default())
    }
}

impl VisibilityToggle {
    pub fn new(labels: ToggleLabels) -> Self {
        Self {
            display: MarkerDisplay::Visible,
            phase: ControlPhase::Hidden,
            labels,
        }
    }

    pub fn markers_visible(&self) -> bool {
        self.display == MarkerDisplay::Visible
    }

    pub fn phase(&self) -> ControlPhase {
        self.phase
    }

    pub fn control_visible(&self) -> bool {
        self.phase != ControlPhase::Hidden
    }

    /// The pointer entered a listing. Returns `true` when the caller must arm
    /// the auto-hide timer; at most one timer is ever pending.
    pub fn on_hover(&mut self) -> bool {
        if self.phase == ControlPhase::Hidden {
            self.phase = ControlPhase::Shown;
        }
        if self.phase == ControlPhase::Shown {
            self.phase = ControlPhase::Fading;
            return true;
        }
        false
    }

    pub fn on_timer_elapsed(&mut self) {
        if self.phase == ControlPhase::Fading {
            self.phase = ControlPhase::Hidden;
        }
    }

    /// Flips marker display for the whole page.
    pub fn toggle(&mut self) -> MarkerDisplay {
        self.display = self.display.flipped();
        self.display
    }

    /// Describes what clicking will do next.
    pub fn label(&self) -> &str {
        match self.display {
            MarkerDisplay::Visible => &self.labels.hide,
            MarkerDisplay::Hidden => &self.labels.show,
        }
    }
}
