use super::listing::{wire_listings, ListingEnv};
use crate::api::ApiClient;
use crate::comments::{preview_html, CommentRemoval, PreviewPane};
use crate::dom;
use crate::forms::{require_signed_in, SubmissionGuard};
use crate::models::Viewer;
use crate::pager::Pager;
use crate::reads::{item_id_from_href, ReadTracker};
use crate::storage::storage_available;
use leptos::task::spawn_local;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use wasm_bindgen::JsCast;

/// First submission of the form goes through, later ones are swallowed.
fn guard_form(id: &str) {
    let guard = Rc::new(RefCell::new(SubmissionGuard::new()));
    dom::listen_id(id, "submit", move |ev| {
        if !guard.borrow_mut().try_submit() {
            ev.prevent_default();
        }
    });
}

pub(crate) fn wire_forms(viewer: &Viewer) {
    guard_form("comment-form");
    guard_form("code-register-form");

    for link in dom::query_all(".register-link") {
        let viewer = viewer.clone();
        dom::listen(&link, "click", move |ev| {
            if require_signed_in(&viewer).is_err() {
                ev.prevent_default();
                dom::show_modal("needs-auth-modal");
            }
        });
    }

    dom::listen_id("comment", "focus", |_| dom::set_display_id("comment-action", true));
    dom::listen_id("remove-code-button", "click", |_| dom::show_modal("modal-remove-code"));
    dom::listen_id("remove-code", "click", |_| dom::submit_form("remove-code-form"));
    dom::listen_id("signout", "click", |_| dom::submit_form("signout-form"));

    for icon in dom::query_all(".rss-icon") {
        dom::listen(&icon, "click", |ev| {
            ev.prevent_default();
            dom::show_modal("modal-rss");
            if let Some(feed) = dom::by_id("rss-feed")
                .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
            {
                feed.select();
            }
        });
    }
}

fn refresh_preview(api: &ApiClient) {
    let comment = dom::by_id("comment")
        .and_then(|el| el.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        .map(|t| t.value())
        .unwrap_or_default();
    let api = api.clone();
    spawn_local(async move {
        match preview_html(api.comment_preview(&comment).await) {
            Ok(html) => {
                if let Some(div) = dom::by_id("preview-div") {
                    div.set_inner_html(&html);
                }
            }
            Err(e) => {
                log::error!("comment preview failed: {e}");
                dom::alert(&e.to_string());
            }
        }
    });
}

pub(crate) fn wire_comments(api: &ApiClient) {
    let pane = Rc::new(RefCell::new(PreviewPane::new()));

    {
        let pane = pane.clone();
        let api = api.clone();
        dom::listen_id("preview", "click", move |_| {
            let open = pane.borrow_mut().toggle();
            dom::set_display_id("preview-div", open);
            if open {
                refresh_preview(&api);
            }
        });
    }
    {
        let api = api.clone();
        dom::listen_id("comment", "change", move |_| {
            if pane.borrow().is_open() {
                refresh_preview(&api);
            }
        });
    }

    let removal = Rc::new(RefCell::new(CommentRemoval::new()));
    for button in dom::query_all(".remove-comment-button") {
        let removal = removal.clone();
        let el = button.clone();
        dom::listen(&button, "click", move |_| {
            let Some(id) = el.get_attribute("data-comment_id") else {
                return;
            };
            removal.borrow_mut().bind(id);
            dom::show_modal("modal-remove-comment");
        });
    }

    let api = api.clone();
    dom::listen_id("remove-comment", "click", move |_| {
        let Some(comment_id) = removal.borrow_mut().confirm() else {
            return;
        };
        let api = api.clone();
        let removal = removal.clone();
        spawn_local(async move {
            let result = api.remove_comment(&comment_id).await;
            removal.borrow_mut().finish(&comment_id, result.is_ok());
            match result {
                Ok(()) => {
                    dom::set_display_id(&format!("comment-{comment_id}"), false);
                    dom::hide_modal("modal-remove-comment");
                }
                Err(e) => {
                    log::error!("remove comment {comment_id} failed: {e}");
                    dom::alert(&e.to_string());
                }
            }
        });
    });
}

pub(crate) fn wire_pager(env: &ListingEnv) {
    let Some(button) = dom::by_id("more-code") else {
        return;
    };
    let kind = dom::by_id("type")
        .and_then(|el| el.get_attribute("data-value"))
        .unwrap_or_default();
    let page = button
        .get_attribute("data-page")
        .and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(1);
    let pager = Rc::new(RefCell::new(Pager::new(kind, page)));

    let env = env.clone();
    let el = button.clone();
    dom::listen(&button, "click", move |_| {
        let Some(req) = pager.borrow_mut().next_request() else {
            return;
        };
        let env = env.clone();
        let pager = pager.clone();
        let button = el.clone();
        spawn_local(async move {
            let result = env.api.more_code(&req).await;
            let outcome = pager.borrow_mut().complete(result);
            let codes = match outcome {
                Ok(codes) => codes,
                Err(e) => {
                    log::error!("loading more codes failed: {e}");
                    dom::alert(&e.to_string());
                    return;
                }
            };

            let (page, exhausted) = {
                let p = pager.borrow();
                (p.page(), p.is_exhausted())
            };
            let _ = button.set_attribute("data-page", &page.to_string());
            if exhausted {
                dom::set_display(&button, false);
            }

            for code in &codes {
                if let Err(e) = dom::append_code_from_template(code) {
                    log::warn!("could not render code entry: {e:?}");
                }
            }
            dom::pretty_print();
            let wired = wire_listings(&env, None);
            log::debug!("page {page}: {} codes, {wired} new listings", codes.len());
        });
    });
}

/// Sidebar entries whose `data-url_match` pattern matches the current path.
pub(crate) fn wire_sidebar() {
    let path = dom::current_path();
    for li in dom::query_all(".sidebar-nav li") {
        let Some(pattern) = li.get_attribute("data-url_match").filter(|p| !p.is_empty()) else {
            continue;
        };
        let matched = match dom::try_regexp(&pattern) {
            Ok(re) => re.test(&path),
            Err(e) => {
                log::warn!("bad sidebar pattern {pattern:?}: {e:?}");
                continue;
            }
        };
        let classes = li.class_list();
        let _ = if matched {
            classes.add_1("active")
        } else {
            classes.remove_1("active")
        };
    }
}

/// Flags unopened items and records the one being viewed.
pub(crate) fn track_reads(item_id: Option<&str>) {
    if !storage_available() {
        return;
    }
    let mut tracker = ReadTracker::load();

    let links: Vec<(web_sys::Element, String)> = dom::query_all("a.title")
        .into_iter()
        .filter_map(|link| {
            let id = item_id_from_href(&link.get_attribute("href")?);
            Some((link, id))
        })
        .collect();
    let unread: HashSet<&str> = tracker
        .unread(links.iter().map(|(_, id)| id.as_str()))
        .into_iter()
        .collect();
    for (link, id) in &links {
        if unread.contains(id.as_str()) {
            dom::mark_unread(link);
        }
    }

    if let Some(id) = item_id {
        if tracker.record_view(id) {
            tracker.persist();
        }
    }
}
