#![cfg(target_arch = "wasm32")]
use anyhow::Context;
use glam::Vec3;
use laser_core::factory::LaserFactory;
use laser_core::{BehaviorConfig, BehaviorKind, Camera, ConfigStore, FrameClock, Pointer, Resolver};
use wasm_bindgen::prelude::*;

mod bridge;
mod constants;
mod storage;
mod wire;

use bridge::JsScene;
use constants::STORAGE_NAMESPACE;
use storage::LocalStorageStore;

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn vec3(values: &[f32]) -> Result<Vec3, JsValue> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(JsValue::from_str("expected [x, y, z]")),
    }
}

fn pointer_json(pointer: Option<Pointer>) -> Option<String> {
    pointer.and_then(|p| serde_json::to_string(&p).ok())
}

fn open_store() -> anyhow::Result<ConfigStore<LocalStorageStore>> {
    let backend = LocalStorageStore::new().context("opening localStorage")?;
    Ok(ConfigStore::open(backend, STORAGE_NAMESPACE))
}

fn seed_from_host() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("laser-web loaded");
    Ok(())
}

/// Everything a page needs: the resolver over localStorage, the JS scene
/// bridge and the unsaved test bench. Call `tick` from requestAnimationFrame.
#[wasm_bindgen]
pub struct LaserShow {
    resolver: Resolver<LocalStorageStore>,
    scene: JsScene,
    factory: LaserFactory,
    clock: FrameClock,
}

#[wasm_bindgen]
impl LaserShow {
    #[wasm_bindgen(constructor)]
    pub fn new(host: JsValue) -> Result<LaserShow, JsValue> {
        let scene = JsScene::new(host)?;
        let store = open_store().map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
        Ok(LaserShow {
            resolver: Resolver::new(store, seed_from_host()),
            scene,
            factory: LaserFactory::new(),
            clock: FrameClock::new(),
        })
    }

    /// Resolve what to run. Returns the tier that won: `scene_default`,
    /// `default` or `fallback`.
    pub fn startup(&mut self) -> String {
        let resolution = self.resolver.startup(&mut self.scene);
        log::info!("startup resolved to {resolution:?}");
        match resolution {
            laser_core::Resolution::SceneDefault(_) => "scene_default",
            laser_core::Resolution::Default(_) => "default",
            laser_core::Resolution::Fallback => "fallback",
        }
        .to_string()
    }

    pub fn tick(&mut self) {
        let (dt, elapsed) = self.clock.tick();
        self.resolver.tick(dt, elapsed, &mut self.scene);
    }

    #[wasm_bindgen(js_name = setCamera)]
    pub fn set_camera(&mut self, eye: &[f32], target: &[f32], aspect: f32, fovy_radians: f32) -> Result<(), JsValue> {
        let camera = Camera {
            eye: vec3(eye)?,
            target: vec3(target)?,
            aspect,
            fovy_radians,
            ..Camera::default()
        };
        self.scene.set_camera(Some(camera));
        Ok(())
    }

    /// `triangles` is a flat world-space triangle list, nine floats per face.
    #[wasm_bindgen(js_name = setModel)]
    pub fn set_model(&mut self, center: &[f32], triangles: &[f32]) -> Result<(), JsValue> {
        let model = wire::model_from_triangles(vec3(center)?, triangles);
        log::info!("model set: {} faces", model.faces.len());
        self.scene.set_model(Some(model));
        Ok(())
    }

    #[wasm_bindgen(js_name = clearModel)]
    pub fn clear_model(&mut self) {
        self.scene.set_model(None);
    }

    #[wasm_bindgen(js_name = setControlsTarget)]
    pub fn set_controls_target(&mut self, target: &[f32]) -> Result<(), JsValue> {
        self.scene.set_controls_target(vec3(target)?);
        Ok(())
    }

    /// `kind` overrides the type tag in `json` when given.
    #[wasm_bindgen(js_name = saveBehavior)]
    pub fn save_behavior(&mut self, name: &str, json: &str, kind: Option<String>) -> Result<bool, JsValue> {
        let config = BehaviorConfig::from_json(json).map_err(to_js)?;
        let kind = kind
            .map(|k| k.parse::<BehaviorKind>())
            .transpose()
            .map_err(|e| JsValue::from_str(&e))?;
        Ok(self.resolver.save_behavior(name, &config, kind))
    }

    #[wasm_bindgen(js_name = loadBehavior)]
    pub fn load_behavior(&mut self, name: &str) -> bool {
        self.resolver.load_behavior(name, &mut self.scene)
    }

    #[wasm_bindgen(js_name = deleteBehavior)]
    pub fn delete_behavior(&mut self, name: &str) -> bool {
        self.resolver.delete_behavior(name)
    }

    #[wasm_bindgen(js_name = listBehaviors)]
    pub fn list_behaviors(&self) -> Vec<String> {
        self.resolver.list_behaviors()
    }

    #[wasm_bindgen(js_name = saveBank)]
    pub fn save_bank(&mut self, name: &str, members: Vec<String>) -> bool {
        self.resolver.save_bank(name, &members)
    }

    #[wasm_bindgen(js_name = loadBank)]
    pub fn load_bank(&mut self, name: &str) -> bool {
        self.resolver.load_bank(name, &mut self.scene)
    }

    #[wasm_bindgen(js_name = bankMembers)]
    pub fn bank_members(&self, name: &str) -> Option<Vec<String>> {
        self.resolver.bank_members(name)
    }

    #[wasm_bindgen(js_name = deleteBank)]
    pub fn delete_bank(&mut self, name: &str) -> bool {
        self.resolver.delete_bank(name)
    }

    #[wasm_bindgen(js_name = listBanks)]
    pub fn list_banks(&self) -> Vec<String> {
        self.resolver.list_banks()
    }

    #[wasm_bindgen(js_name = setDefaultBehavior)]
    pub fn set_default_behavior(&mut self, name: &str) -> bool {
        self.resolver.set_default(&Pointer::behavior(name))
    }

    #[wasm_bindgen(js_name = setDefaultBank)]
    pub fn set_default_bank(&mut self, name: &str) -> bool {
        self.resolver.set_default(&Pointer::bank(name))
    }

    /// `{"kind": "behavior"|"bank", "name": ...}` or `undefined`.
    #[wasm_bindgen(js_name = getDefault)]
    pub fn get_default(&self) -> Option<String> {
        pointer_json(self.resolver.get_default())
    }

    #[wasm_bindgen(js_name = clearDefault)]
    pub fn clear_default(&mut self) -> bool {
        self.resolver.clear_default()
    }

    #[wasm_bindgen(js_name = getSceneDefault)]
    pub fn get_scene_default(&self) -> Option<String> {
        pointer_json(self.resolver.get_scene_default())
    }

    #[wasm_bindgen(js_name = clearSceneDefault)]
    pub fn clear_scene_default(&mut self) -> bool {
        self.resolver.clear_scene_default()
    }

    #[wasm_bindgen(js_name = setHelperVisibility)]
    pub fn set_helper_visibility(&mut self, visible: bool) -> bool {
        self.resolver.set_helper_visibility(visible, &mut self.scene)
    }

    #[wasm_bindgen(js_name = helperVisibility)]
    pub fn helper_visibility(&self) -> bool {
        self.resolver.helper_visibility()
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&mut self) {
        self.factory.clear_tests();
        self.resolver.clear_all(&mut self.scene);
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        let stamp: String = js_sys::Date::new_0().to_iso_string().into();
        self.resolver.export_json(&stamp).map_err(to_js)
    }

    /// Returns `[behaviors, banks]` imported.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, text: &str) -> Result<Vec<u32>, JsValue> {
        let (behaviors, banks) = self.resolver.import_json(text).map_err(to_js)?;
        Ok(vec![behaviors as u32, banks as u32])
    }

    #[wasm_bindgen(js_name = quickTest)]
    pub fn quick_test(&mut self, preset: &str) -> Result<(), JsValue> {
        self.factory
            .quick_test(&mut self.resolver, &mut self.scene, preset)
            .map_err(to_js)
    }

    /// Run a partial config, filled in with the standard values, unsaved.
    #[wasm_bindgen(js_name = testConfig)]
    pub fn test_config(&mut self, name: &str, overrides: &str) -> Result<(), JsValue> {
        let overrides = BehaviorConfig::from_json(overrides).map_err(to_js)?;
        self.factory
            .create(&mut self.resolver, &mut self.scene, &overrides, name);
        Ok(())
    }

    #[wasm_bindgen(js_name = saveTest)]
    pub fn save_test(&mut self, test: Option<String>, save_as: Option<String>) -> bool {
        self.factory
            .save(&mut self.resolver, test.as_deref(), save_as.as_deref())
    }

    #[wasm_bindgen(js_name = listTests)]
    pub fn list_tests(&self) -> Vec<String> {
        self.factory.list_tests().into_iter().map(String::from).collect()
    }

    #[wasm_bindgen(js_name = quickPresets)]
    pub fn quick_presets() -> Vec<String> {
        laser_core::factory::QUICK_PRESETS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
