//! Client-side behavior for the code-browsing pages: per-line smell markers,
//! marker visibility, read tracking and the small bits of form/dialog wiring
//! around them.

pub mod annotations;
pub mod api;
pub mod comments;
pub mod config;
pub mod dialog;
pub mod forms;
pub mod models;
pub mod pager;
pub mod reads;
pub mod visibility;

mod dom;
mod page;
mod storage;

pub use page::PageBehavior;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    page::boot();
}
