use serde::Serialize;

/// Read-tracking set, a JSON array of item ids.
pub(crate) const READS_KEY: &str = "reads";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn storage_available() -> bool {
    local_storage().is_some()
}

pub(crate) fn load_raw_from_storage(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("could not encode {key}: {e}");
            return;
        }
    };
    if let Some(storage) = local_storage() {
        if let Err(e) = storage.set_item(key, &json) {
            log::warn!("could not persist {key}: {e:?}");
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}
