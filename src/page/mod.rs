mod listing;
mod wiring;

use crate::api::ApiClient;
use crate::config::PageConfig;
use crate::dom;
use crate::visibility::{MarkerDisplay, VisibilityToggle};
use leptos::prelude::*;
use listing::{wire_listings, wire_remove_confirmation, ListingEnv};
use std::cell::RefCell;
use std::rc::Rc;

/// Floating button that shows or hides every marker on the page.
#[component]
fn VisibilityControl(
    toggle: RwSignal<VisibilityToggle>,
    position: RwSignal<(f64, f64)>,
) -> impl IntoView {
    let on_click = move |_| {
        if let Some(display) = toggle.try_update(|t| t.toggle()) {
            dom::apply_marker_visibility(display == MarkerDisplay::Visible);
        }
    };

    view! {
        <div
            class="unko-toggle-button"
            class:hide=move || !toggle.with(|t| t.control_visible())
            data-phase=move || toggle.with(|t| t.phase().as_ref().to_string())
            style:position="absolute"
            style:top=move || format!("{}px", position.get().0)
            style:left=move || format!("{}px", position.get().1)
            on:click=on_click
        >
            {move || toggle.with(|t| t.label().to_string())}
        </div>
    }
}

/// Wires the page's behavior onto the server-rendered DOM and renders the
/// marker visibility control.
#[component]
pub fn PageBehavior() -> impl IntoView {
    let config = PageConfig::from_window();
    let api = ApiClient::new(config.api_url.clone());
    let toggle = RwSignal::new(VisibilityToggle::default());
    let position = RwSignal::new((0.0, 0.0));

    let env = ListingEnv {
        api: api.clone(),
        viewer: config.viewer.clone(),
        item_id: config.item_id.clone(),
        toggle,
        control_pos: position,
        remove_owner: Rc::new(RefCell::new(None)),
    };

    dom::pretty_print();
    let wired = wire_listings(&env, Some(config.initial_annotations()));
    log::info!("wired {wired} listings");
    wire_remove_confirmation(&env);

    wiring::wire_forms(&config.viewer);
    wiring::wire_comments(&api);
    wiring::wire_pager(&env);
    wiring::track_reads(config.item_id.as_deref());
    wiring::wire_sidebar();

    view! { <VisibilityControl toggle=toggle position=position /> }
}

/// Mounts [`PageBehavior`] at the end of `<body>`.
pub fn boot() {
    let Some(body) = dom::document().and_then(|d| d.body()) else {
        log::warn!("no <body>; page behavior not installed");
        return;
    };
    leptos::mount::mount_to(body, PageBehavior).forget();
}
