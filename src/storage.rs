use laser_core::{KeyValueStore, StoreError};
use web_sys as web;

/// `window.localStorage` as a key-value backend. Quota and privacy-mode
/// failures surface as [`StoreError`]s.
pub struct LocalStorageStore {
    storage: web::Storage,
}

fn js_reason(e: wasm_bindgen::JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

impl LocalStorageStore {
    pub fn new() -> Result<Self, StoreError> {
        let window = web::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(js_reason(e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(js_reason(e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                reason: js_reason(e),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                reason: js_reason(e),
            })
    }
}
