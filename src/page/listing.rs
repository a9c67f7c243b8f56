use crate::annotations::{AnnotationClient, CreateBlocked, LineIndex};
use crate::api::ApiClient;
use crate::dom::{self, BusyCursor, DomMarkerSurface, LINE_SELECTOR, MARKER_CLASS, PRIMARY_CLASS};
use crate::models::{Annotation, AnnotationId, Viewer};
use crate::visibility::{control_position, VisibilityToggle, AUTO_HIDE_MS};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type DomClient = AnnotationClient<DomMarkerSurface>;
pub(crate) type SharedClient = Rc<RefCell<DomClient>>;

const REMOVE_MODAL: &str = "modal-remove-smell";
const NEEDS_AUTH_MODAL: &str = "needs-auth-modal";

/// Page-wide pieces every listing shares.
#[derive(Clone)]
pub(crate) struct ListingEnv {
    pub api: ApiClient,
    pub viewer: Viewer,
    pub item_id: Option<String>,
    pub toggle: RwSignal<VisibilityToggle>,
    pub control_pos: RwSignal<(f64, f64)>,
    /// Client whose remove dialog is currently bound. The confirmation button
    /// is shared, so there is exactly one of these at a time.
    pub remove_owner: Rc<RefCell<Option<SharedClient>>>,
}

/// Index, prepare and wire every listing on the page not seen before.
///
/// `seed` goes to the first listing of the item being viewed.
pub(crate) fn wire_listings(env: &ListingEnv, mut seed: Option<Vec<Annotation>>) -> usize {
    let mut wired = 0;
    for listing in dom::query_all(".prettyprint") {
        let elements = dom::query_all_in(&listing, LINE_SELECTOR);
        let visible = env.toggle.with_untracked(|t| t.markers_visible());
        if !dom::prepare_listing(&listing, &elements, visible) {
            continue;
        }

        let in_view = listing.closest(".view").ok().flatten().is_some();
        let item_id = if in_view { env.item_id.clone() } else { None };
        let mut client = AnnotationClient::new(
            item_id,
            env.viewer.clone(),
            LineIndex::build(elements),
            DomMarkerSurface::new(env.toggle),
        );

        if in_view {
            if let Some(records) = seed.take() {
                let attached = client.seed(records);
                log::info!("attached {attached} smell markers");
            }
        }

        let client = Rc::new(RefCell::new(client));
        wire_listing(env, &listing, client, in_view);
        wired += 1;
    }
    wired
}

fn line_of(client: &SharedClient, target: &web_sys::Element) -> Option<usize> {
    let li = target.closest("li").ok().flatten()?;
    client.borrow().lines().position_of(&li)
}

fn wire_listing(env: &ListingEnv, listing: &web_sys::Element, client: SharedClient, in_view: bool) {
    let hover = |on: bool| {
        let client = client.clone();
        move |ev: web_sys::Event| {
            let Some(target) = dom::event_element(&ev) else {
                return;
            };
            if !dom::has_class(&target, PRIMARY_CLASS) {
                return;
            }
            if let Some(line) = line_of(&client, &target) {
                client.borrow_mut().hover(line, on);
            }
        }
    };
    dom::listen(listing, "mouseover", hover(true));
    dom::listen(listing, "mouseout", hover(false));

    if in_view {
        let toggle = env.toggle;
        let control_pos = env.control_pos;
        let el = listing.clone();
        dom::listen(listing, "mouseover", move |_| {
            show_toggle_control(toggle, control_pos, &el);
        });
    }

    let env = env.clone();
    dom::listen(listing, "click", move |ev| {
        let Some(target) = dom::event_element(&ev) else {
            return;
        };
        if dom::has_class(&target, PRIMARY_CLASS) {
            if let Some(line) = line_of(&client, &target) {
                request_create(&env, &client, line);
            }
        } else if dom::has_class(&target, MARKER_CLASS) && target.has_attribute("data-owned") {
            if let Some(id) = target.get_attribute("data-smell_id") {
                open_remove(&env, &client, AnnotationId::new(id));
            }
        }
    });
}

fn show_toggle_control(
    toggle: RwSignal<VisibilityToggle>,
    control_pos: RwSignal<(f64, f64)>,
    listing: &web_sys::Element,
) {
    let control_width = dom::query_all(".unko-toggle-button")
        .first()
        .map(|c| c.get_bounding_client_rect().width())
        .unwrap_or(0.0);
    control_pos.set(control_position(dom::page_rect(listing), control_width));

    let arm = toggle.try_update(|t| t.on_hover()).unwrap_or(false);
    if arm {
        dom::set_timeout(
            move || toggle.update(|t| t.on_timer_elapsed()),
            AUTO_HIDE_MS,
        );
    }
}

fn request_create(env: &ListingEnv, client: &SharedClient, line: usize) {
    let req = match client.borrow().begin_create(line) {
        Ok(req) => req,
        Err(CreateBlocked::NeedsAuth) => {
            dom::show_modal(NEEDS_AUTH_MODAL);
            return;
        }
        Err(e) => {
            log::debug!("ignoring smell click on line {line}: {e}");
            return;
        }
    };

    let busy = BusyCursor::engage();
    let api = env.api.clone();
    let client = client.clone();
    spawn_local(async move {
        let result = api.create_smell(&req.item_id, req.line).await;
        drop(busy);
        let outcome = client.borrow_mut().complete_create(&req, result);
        match outcome {
            Ok(a) => log::debug!("smell {} added on line {}", a.id, a.line_index),
            Err(e) => {
                log::error!("create smell failed: {e}");
                dom::alert(&e.to_string());
            }
        }
    });
}

fn open_remove(env: &ListingEnv, client: &SharedClient, id: AnnotationId) {
    if !client.borrow_mut().open_remove(&id, dom::scroll_y()) {
        return;
    }

    let previous = env.remove_owner.borrow_mut().replace(client.clone());
    if let Some(prev) = previous {
        if !Rc::ptr_eq(&prev, client) {
            prev.borrow_mut().dismiss_remove();
        }
    }
    dom::show_modal(REMOVE_MODAL);
}

/// The confirmation button of the shared remove dialog. Bound once.
pub(crate) fn wire_remove_confirmation(env: &ListingEnv) {
    let env = env.clone();
    dom::listen_id("remove-smell", "click", move |_| {
        let Some(client) = env.remove_owner.borrow().clone() else {
            return;
        };
        let Some(target) = client.borrow_mut().confirm_remove() else {
            return;
        };

        let api = env.api.clone();
        spawn_local(async move {
            let result = api.remove_smell(&target.id).await;
            let outcome = client.borrow_mut().complete_remove(&target, result);
            match outcome {
                Ok(scroll_y) => {
                    dom::hide_modal(REMOVE_MODAL);
                    dom::scroll_to(scroll_y);
                }
                Err(e) => {
                    log::error!("remove smell {} failed: {e}", target.id);
                    dom::alert(&e.to_string());
                }
            }
        });
    });
}
