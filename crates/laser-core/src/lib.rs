pub mod beam;
pub mod behavior;
pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod headless;
pub mod mesh;
pub mod registry;
pub mod resolver;
pub mod scene;
pub mod store;

pub use beam::{Beam, BeamId, Color, LineVertex};
pub use behavior::{Behavior, StillnessTracker};
pub use clock::FrameClock;
pub use config::{keys, BehaviorConfig, BehaviorKind, LaserParams, ParamValue};
pub use engine::{Engine, Stage};
pub use error::{BehaviorError, ConfigError, SceneError, StoreError};
pub use factory::LaserFactory;
pub use geometry::{compute_bounce_path, BeamPath, RayHit};
pub use headless::HeadlessScene;
pub use resolver::{Resolution, Resolver};
pub use scene::{Camera, Face, Scene, TargetModel};
pub use store::{ConfigStore, KeyValueStore, MemoryStore, Pointer, PointerKind, Tier};
