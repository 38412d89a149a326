use crate::constants::*;
use crate::wire;
use glam::Vec3;
use js_sys::{Float32Array, Function, Reflect};
use laser_core::{Beam, BeamId, Camera, RayHit, Scene, SceneError, TargetModel};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn host_fn(host: &JsValue, name: &str) -> Result<Function, JsValue> {
    Reflect::get(host, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("scene host is missing `{name}()`")))
}

/// [`Scene`] backed by a JS object that owns the real renderer.
///
/// Camera, model and orbit focus are pushed in from JS whenever they change;
/// beam edits and raycasts are forwarded as calls.
pub struct JsScene {
    host: JsValue,
    add_beam: Function,
    update_beam: Function,
    remove_beam: Function,
    raycast: Function,
    set_helpers: Function,
    camera: Option<Camera>,
    model: Option<TargetModel>,
    controls_target: Vec3,
}

impl JsScene {
    pub fn new(host: JsValue) -> Result<Self, JsValue> {
        Ok(Self {
            add_beam: host_fn(&host, HOST_ADD_BEAM)?,
            update_beam: host_fn(&host, HOST_UPDATE_BEAM)?,
            remove_beam: host_fn(&host, HOST_REMOVE_BEAM)?,
            raycast: host_fn(&host, HOST_RAYCAST)?,
            set_helpers: host_fn(&host, HOST_SET_HELPERS)?,
            host,
            camera: None,
            model: None,
            controls_target: Vec3::ZERO,
        })
    }

    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }

    pub fn set_model(&mut self, model: Option<TargetModel>) {
        self.model = model;
    }

    pub fn set_controls_target(&mut self, target: Vec3) {
        self.controls_target = target;
    }

    fn beam_args(beam: &Beam) -> (JsValue, JsValue) {
        let floats = wire::beam_floats(beam);
        (
            JsValue::from_f64(beam.id().0 as f64),
            Float32Array::from(floats.as_slice()).into(),
        )
    }
}

impl Scene for JsScene {
    fn add_beam(&mut self, beam: &Beam) {
        let (id, verts) = Self::beam_args(beam);
        if let Err(e) = self.add_beam.call2(&self.host, &id, &verts) {
            log::warn!("addBeam({}) failed: {:?}", beam.id(), e);
        }
    }

    fn update_beam(&mut self, beam: &Beam) {
        let (id, verts) = Self::beam_args(beam);
        let visible = JsValue::from_bool(beam.is_visible());
        if let Err(e) = self.update_beam.call3(&self.host, &id, &verts, &visible) {
            log::warn!("updateBeam({}) failed: {:?}", beam.id(), e);
        }
    }

    fn remove_beam(&mut self, id: BeamId) {
        if let Err(e) = self
            .remove_beam
            .call1(&self.host, &JsValue::from_f64(id.0 as f64))
        {
            log::warn!("removeBeam({id}) failed: {:?}", e);
        }
    }

    fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    fn model(&self) -> Option<&TargetModel> {
        self.model.as_ref()
    }

    fn controls_target(&self) -> Vec3 {
        self.controls_target
    }

    fn raycast(&self, origin: Vec3, direction: Vec3) -> Result<Vec<RayHit>, SceneError> {
        let args = js_sys::Array::of2(
            &Float32Array::from(origin.to_array().as_slice()).into(),
            &Float32Array::from(direction.to_array().as_slice()).into(),
        );
        let out = self
            .raycast
            .apply(&self.host, &args)
            .map_err(|e| SceneError::Raycast(format!("{e:?}")))?;
        if out.is_undefined() || out.is_null() {
            return Ok(Vec::new());
        }
        let packed = out
            .dyn_into::<Float32Array>()
            .map_err(|_| SceneError::Raycast("raycast must return a Float32Array".into()))?;
        Ok(wire::unpack_hits(&packed.to_vec()))
    }

    fn set_helpers_visible(&mut self, visible: bool) {
        if let Err(e) = self
            .set_helpers
            .call1(&self.host, &JsValue::from_bool(visible))
        {
            log::warn!("setHelpersVisible failed: {:?}", e);
        }
    }
}
