//! Per-line "smell" annotations on a rendered code listing.
//!
//! - [`LineIndex`]: stable 0-based line positions for one listing
//! - [`AnnotationStore`]: annotation records keyed by line
//! - [`MarkerRenderer`]: marker bookkeeping over a [`MarkerSurface`]
//! - [`AnnotationClient`]: create/remove flows tying the three together

mod client;
mod line_index;
mod render;
mod store;

pub use client::{AnnotationClient, CreateBlocked, CreateRequest, RemoveTarget};
pub use line_index::{Line, LineIndex, ResolveError};
pub use render::{MarkerRenderer, MarkerSurface};
pub use store::AnnotationStore;
