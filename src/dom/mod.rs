//! Browser glue: element lookup, listeners, page-provided jQuery plugins and
//! the DOM-backed marker surface.

use crate::annotations::MarkerSurface;
use crate::models::Annotation;
use crate::visibility::{Rect, VisibilityToggle};
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub(crate) const LINE_SELECTOR: &str = "li.L0,li.L1,li.L2,li.L3,li.L4,li.L5,li.L6,li.L7,li.L8,li.L9";
pub(crate) const MARKER_CLASS: &str = "unkode-icon";
pub(crate) const PRIMARY_CLASS: &str = "nuclear-icon";
const PRIMARY_TITLE: &str = "臭ったらクリック!";
const UNREAD_TITLE: &str = "未読ウンコード";
const WIRED_ATTR: &str = "data-smell-wired";

#[wasm_bindgen]
extern "C" {
    type JQuery;

    #[wasm_bindgen(catch, js_name = jQuery)]
    fn jquery(selector: &str) -> Result<JQuery, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn modal(this: &JQuery, action: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn tmpl(this: &JQuery, data: &JsValue) -> Result<JQuery, JsValue>;

    #[wasm_bindgen(method, catch, js_name = appendTo)]
    fn append_to(this: &JQuery, target: &str) -> Result<JQuery, JsValue>;

    #[wasm_bindgen(catch, js_name = prettyPrint)]
    fn pretty_print_js() -> Result<(), JsValue>;
}

pub(crate) fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

pub(crate) fn by_id(id: &str) -> Option<web_sys::Element> {
    document()?.get_element_by_id(id)
}

pub(crate) fn query_all_in(root: &web_sys::Element, selector: &str) -> Vec<web_sys::Element> {
    root.query_selector_all(selector)
        .map(|list| collect_elements(&list))
        .unwrap_or_default()
}

pub(crate) fn query_all(selector: &str) -> Vec<web_sys::Element> {
    document()
        .and_then(|d| d.query_selector_all(selector).ok())
        .map(|list| collect_elements(&list))
        .unwrap_or_default()
}

fn collect_elements(list: &web_sys::NodeList) -> Vec<web_sys::Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<web_sys::Element>().ok())
        .collect()
}

pub(crate) fn event_element(ev: &web_sys::Event) -> Option<web_sys::Element> {
    ev.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok())
}

pub(crate) fn has_class(el: &web_sys::Element, class: &str) -> bool {
    el.class_list().contains(class)
}

/// Attach a long-lived listener. The closure lives as long as the page.
pub(crate) fn listen(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) {
    let cb = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref()) {
        log::warn!("could not listen for {event}: {e:?}");
    }
    cb.forget();
}

pub(crate) fn listen_id(id: &str, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    if let Some(el) = by_id(id) {
        listen(&el, event, handler);
    }
}

pub(crate) fn set_display(el: &web_sys::Element, visible: bool) {
    if let Some(el) = el.dyn_ref::<web_sys::HtmlElement>() {
        let _ = el
            .style()
            .set_property("display", if visible { "" } else { "none" });
    }
}

pub(crate) fn set_display_id(id: &str, visible: bool) {
    if let Some(el) = by_id(id) {
        set_display(&el, visible);
    }
}

pub(crate) fn alert(message: &str) {
    let _ = window().alert_with_message(message);
}

pub(crate) fn show_modal(id: &str) {
    modal_action(id, &JsValue::UNDEFINED);
}

pub(crate) fn hide_modal(id: &str) {
    modal_action(id, &JsValue::from_str("hide"));
}

fn modal_action(id: &str, action: &JsValue) {
    let result = jquery(&format!("#{id}")).and_then(|el| el.modal(action));
    if let Err(e) = result {
        log::warn!("modal #{id} unavailable: {e:?}");
    }
}

/// Re-run the page's syntax highlighter (it produces the `li.L*` lines).
pub(crate) fn pretty_print() {
    if let Err(e) = pretty_print_js() {
        log::debug!("prettyPrint unavailable: {e:?}");
    }
}

/// Render one code entry through the page's `#tmpl-code` template into `#codes`.
pub(crate) fn append_code_from_template(code: &serde_json::Value) -> Result<(), JsValue> {
    let json = serde_json::to_string(code).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let data = js_sys::JSON::parse(&json)?;
    jquery("#tmpl-code")?.tmpl(&data)?.append_to("#codes")?;
    Ok(())
}

pub(crate) fn submit_form(id: &str) {
    if let Some(form) = by_id(id).and_then(|el| el.dyn_into::<web_sys::HtmlFormElement>().ok()) {
        let _ = form.submit();
    }
}

pub(crate) fn scroll_y() -> f64 {
    window().scroll_y().unwrap_or(0.0)
}

pub(crate) fn scroll_to(y: f64) {
    window().scroll_to_with_x_and_y(window().scroll_x().unwrap_or(0.0), y);
}

pub(crate) fn current_path() -> String {
    window().location().pathname().unwrap_or_default()
}

/// Document-relative box of `el`.
pub(crate) fn page_rect(el: &web_sys::Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect {
        top: r.top() + scroll_y(),
        left: r.left() + window().scroll_x().unwrap_or(0.0),
        width: r.width(),
    }
}

pub(crate) fn set_timeout(f: impl FnOnce() + 'static, ms: i32) {
    let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
        Closure::once_into_js(f).as_ref().unchecked_ref(),
        ms,
    );
}

/// `new RegExp(pattern)` that reports a bad pattern instead of throwing.
pub(crate) fn try_regexp(pattern: &str) -> Result<js_sys::RegExp, JsValue> {
    let ctor: js_sys::Function =
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("RegExp"))?.dyn_into()?;
    let args = js_sys::Array::of1(&JsValue::from_str(pattern));
    js_sys::Reflect::construct(&ctor, &args)?.dyn_into()
}

/// Shows every `.unkode-icon` (primary slots included) or hides them all.
pub(crate) fn apply_marker_visibility(visible: bool) {
    for el in query_all(&format!(".{MARKER_CLASS}")) {
        set_display(&el, visible);
    }
}

fn primary_slot_html(visible: bool) -> String {
    let style = if visible { "" } else { r#" style="display: none""# };
    format!(
        r#"<span class="right"><div class="{MARKER_CLASS} {PRIMARY_CLASS}" title="{PRIMARY_TITLE}"{style}></div></span><br clear="all"/>"#
    )
}

/// Appends the primary marker slot to each line of a listing, once.
///
/// Slots start hidden when `visible` is false, matching markers already on
/// the page. Returns `false` if the listing had already been prepared.
pub(crate) fn prepare_listing(
    listing: &web_sys::Element,
    lines: &[web_sys::Element],
    visible: bool,
) -> bool {
    if listing.has_attribute(WIRED_ATTR) {
        return false;
    }
    let _ = listing.set_attribute(WIRED_ATTR, "1");

    let slot = primary_slot_html(visible);
    for line in lines {
        if let Err(e) = line.insert_adjacent_html("beforeend", &slot) {
            log::warn!("could not add primary marker: {e:?}");
        }
    }
    true
}

/// Leading `*` for an item the viewer has not opened.
pub(crate) fn mark_unread(link: &web_sys::Element) {
    let Some(parent) = link.parent_element() else {
        return;
    };
    let Some(doc) = document() else {
        return;
    };
    let Ok(span) = doc.create_element("span") else {
        return;
    };
    span.set_class_name("unread");
    let _ = span.set_attribute("title", UNREAD_TITLE);
    span.set_text_content(Some("*"));
    let first: Option<web_sys::Node> = parent.first_element_child().map(Into::into);
    let _ = parent.insert_before(&span, first.as_ref());
}

/// Body cursor switched to `wait` until dropped.
pub(crate) struct BusyCursor {
    body: Option<web_sys::HtmlElement>,
    previous: String,
}

impl BusyCursor {
    pub(crate) fn engage() -> Self {
        let body = document().and_then(|d| d.body());
        let previous = body
            .as_ref()
            .and_then(|b| b.style().get_property_value("cursor").ok())
            .unwrap_or_default();
        if let Some(b) = &body {
            let _ = b.style().set_property("cursor", "wait");
        }
        Self { body, previous }
    }
}

impl Drop for BusyCursor {
    fn drop(&mut self) {
        if let Some(b) = &self.body {
            let _ = b.style().set_property("cursor", &self.previous);
        }
    }
}

/// Markers as `div.unkode-icon` elements placed after the line's primary slot.
pub(crate) struct DomMarkerSurface {
    toggle: RwSignal<VisibilityToggle>,
}

impl DomMarkerSurface {
    pub(crate) fn new(toggle: RwSignal<VisibilityToggle>) -> Self {
        Self { toggle }
    }
}

impl MarkerSurface for DomMarkerSurface {
    type Line = web_sys::Element;
    type Marker = web_sys::Element;

    fn insert_marker(
        &mut self,
        line: &web_sys::Element,
        after: Option<&web_sys::Element>,
        annotation: &Annotation,
        owned: bool,
    ) -> Option<web_sys::Element> {
        let anchor = match after {
            Some(prev) => prev.clone(),
            None => line.query_selector(&format!(".{PRIMARY_CLASS}")).ok().flatten()?,
        };

        let marker = line.owner_document()?.create_element("div").ok()?;
        marker.set_class_name(MARKER_CLASS);
        let _ = marker.set_attribute("data-smell_id", annotation.id.as_str());
        let _ = marker.set_attribute("data-screen_name", &annotation.author_handle);
        let _ = marker.set_attribute("title", &annotation.author_handle);
        if owned {
            let _ = marker.set_attribute("data-owned", "1");
            if let Some(el) = marker.dyn_ref::<web_sys::HtmlElement>() {
                let _ = el.style().set_property("cursor", "pointer");
            }
        }
        if !self.toggle.with_untracked(|t| t.markers_visible()) {
            set_display(&marker, false);
        }

        anchor.after_with_node_1(&marker).ok()?;
        Some(marker)
    }

    fn remove_marker(&mut self, marker: web_sys::Element) {
        marker.remove();
    }

    fn highlight_line(&mut self, line: &web_sys::Element, on: bool) {
        let classes = line.class_list();
        let _ = if on {
            classes.add_1("selected-row")
        } else {
            classes.remove_1("selected-row")
        };
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn listing_with_lines(n: usize) -> (web_sys::Element, Vec<web_sys::Element>) {
        let doc = document().expect("document");
        let listing = doc.create_element("ol").expect("ol");
        let lines = (0..n)
            .map(|i| {
                let li = doc.create_element("li").expect("li");
                li.set_class_name(&format!("L{i}"));
                let _ = listing.append_child(&li);
                li
            })
            .collect();
        (listing, lines)
    }

    #[wasm_bindgen_test]
    fn test_prepare_listing_hides_slots_while_markers_hidden() {
        let (listing, lines) = listing_with_lines(2);
        assert!(prepare_listing(&listing, &lines, false));

        let slots = query_all_in(&listing, &format!(".{PRIMARY_CLASS}"));
        assert_eq!(slots.len(), 2);
        for slot in slots {
            let el = slot.dyn_into::<web_sys::HtmlElement>().expect("html element");
            assert_eq!(el.style().get_property_value("display").ok().as_deref(), Some("none"));
        }
    }

    #[wasm_bindgen_test]
    fn test_try_regexp_reports_bad_pattern() {
        assert!(try_regexp("(").is_err());
        let re = try_regexp("^/view/").expect("valid pattern");
        assert!(re.test("/view/12"));
        assert!(!re.test("/about"));
    }

    #[wasm_bindgen_test]
    fn test_prepare_listing_runs_once() {
        let (listing, lines) = listing_with_lines(1);
        assert!(prepare_listing(&listing, &lines, true));
        assert!(!prepare_listing(&listing, &lines, true));
        assert_eq!(query_all_in(&listing, &format!(".{PRIMARY_CLASS}")).len(), 1);
    }
}
