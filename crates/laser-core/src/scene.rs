//! The scene collaborator the behaviors draw into.
//!
//! Rendering, asset loading and orbit controls live outside this crate. They
//! are reached only through [`Scene`], which frontends implement (a JS bridge
//! on the web, [`crate::headless::HeadlessScene`] natively and in tests).

use crate::beam::{Beam, BeamId};
use crate::error::SceneError;
pub use crate::geometry::RayHit;
use glam::{Mat3, Mat4, Quat, Vec3};

/// The viewer's perspective camera, right-handed, as the frontend last reported it.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 15.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: std::f32::consts::FRAC_PI_4,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// World to eye space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// World-space orientation of the camera.
    pub fn orientation(&self) -> Quat {
        let view_rot = Mat3::from_mat4(self.view_matrix());
        Quat::from_mat3(&view_rot.transpose()).normalize()
    }

    /// Map a normalized-device point back into world space. `ndc.z == 0` is
    /// the near plane for glam's `[0, 1]` depth range.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        let inv = (self.projection_matrix() * self.view_matrix()).inverse();
        inv.project_point3(ndc)
    }

    /// The four near-plane corners: top-left, top-right, bottom-left, bottom-right.
    pub fn near_plane_corners(&self) -> [Vec3; 4] {
        [(-1.0, 1.0), (1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)]
            .map(|(x, y)| self.unproject(Vec3::new(x, y, 0.0)))
    }
}

/// One triangle of the target model in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    pub vertices: [Vec3; 3],
    pub normal: Vec3,
}

impl Face {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            vertices: [a, b, c],
            normal,
        }
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    /// Stand-in face at the origin, facing up.
    pub fn fallback() -> Self {
        Self {
            vertices: [
                Vec3::new(-0.5, 0.0, -0.5),
                Vec3::new(0.5, 0.0, -0.5),
                Vec3::new(0.0, 0.0, 0.5),
            ],
            normal: Vec3::Y,
        }
    }
}

/// World-space geometry of the model the lasers bounce off.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetModel {
    pub center: Vec3,
    pub faces: Vec<Face>,
}

impl TargetModel {
    pub fn new(center: Vec3, faces: Vec<Face>) -> Self {
        Self { center, faces }
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.faces.iter().flat_map(|f| f.vertices)
    }
}

/// Everything the core needs from the outside world.
///
/// The model and camera are optional: asset loading is asynchronous and a
/// behavior may be initialized before either exists.
pub trait Scene {
    fn add_beam(&mut self, beam: &Beam);
    fn update_beam(&mut self, beam: &Beam);
    fn remove_beam(&mut self, id: BeamId);

    fn camera(&self) -> Option<&Camera>;
    fn model(&self) -> Option<&TargetModel>;
    /// Focus point of the orbit controls; the random-origin sphere is centered here.
    fn controls_target(&self) -> Vec3;

    /// Hits along the ray, nearest first when the implementation can manage it.
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Result<Vec<RayHit>, SceneError>;

    fn set_helpers_visible(&mut self, visible: bool);
}
