use crate::models::{parse_smell_payload, Annotation, Viewer};
use wasm_bindgen::JsValue;

/// Everything the hosting page hands us at load.
#[derive(Clone, Debug, Default)]
pub struct PageConfig {
    pub api_url: String,
    pub viewer: Viewer,
    /// Raw initial annotation payload (`smell_json`), if the page has one.
    pub smell_json: Option<String>,
    /// Id of the item being viewed (`#code-info[data-id]`).
    pub item_id: Option<String>,
}

fn global_string(target: &JsValue, key: &str) -> Option<String> {
    js_sys::Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
}

fn env_api_url(window: &web_sys::Window) -> Option<String> {
    let env = window.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }
    // Both `API_URL` and `api_url` are accepted.
    let env: JsValue = env.into();
    global_string(&env, "API_URL").or_else(|| global_string(&env, "api_url"))
}

pub(crate) fn pick_api_url(env_url: Option<String>, origin: Option<String>) -> String {
    env_url
        .or(origin)
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_default()
}

impl PageConfig {
    pub fn from_window() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let global: JsValue = window.clone().into();

        let api_url = pick_api_url(env_api_url(&window), window.location().origin().ok());
        let viewer = Viewer::new(global_string(&global, "screen_name"));
        let smell_json = global_string(&global, "smell_json");
        let item_id = window
            .document()
            .and_then(|d| d.get_element_by_id("code-info"))
            .and_then(|el| el.get_attribute("data-id"))
            .filter(|id| !id.trim().is_empty());

        Self {
            api_url,
            viewer,
            smell_json,
            item_id,
        }
    }

    /// Decoded initial annotations. A missing or broken payload leaves the
    /// annotation features inert.
    pub fn initial_annotations(&self) -> Vec<Annotation> {
        let Some(raw) = self.smell_json.as_deref() else {
            return Vec::new();
        };
        match parse_smell_payload(raw) {
            Ok(records) => records.into_iter().map(Annotation::from).collect(),
            Err(e) => {
                log::warn!("ignoring unreadable smell payload: {e}");
                Vec::new()
            }
        }
    }
}
