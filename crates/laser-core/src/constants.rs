use glam::Vec3;

// Shared laser tuning constants used by the behaviors, the store and both frontends.

// Geometry
pub const BOUNCE_EPSILON: f32 = 0.001; // re-origin offset after a reflection
pub const DEFAULT_MAX_BOUNCES: u32 = 3;
pub const DEFAULT_MAX_LENGTH: f32 = 20.0; // length of an unterminated segment

// Random-origin sphere
pub const DEFAULT_ORIGIN_SPHERE_RADIUS: f32 = 10.0;
pub const DEFAULT_LASER_COUNT: u32 = 4;
pub const MAX_CONFIG_COUNT: u32 = 1024; // cap on any count read from a config

// Jump timing (seconds the camera must stay still before origins re-randomize)
pub const DEFAULT_STILLNESS_LIMIT: f32 = 0.083_333_336;
pub const WIREFRAME_STILLNESS_LIMIT: f32 = 0.5;

// Camera movement that counts as "significant" and resets the stillness timer
pub const CAMERA_POSITION_THRESHOLD: f32 = 0.1; // world units
pub const CAMERA_ROTATION_THRESHOLD_DEG: f32 = 15.0;

// Pulse
pub const DEFAULT_PULSE_FREQUENCY: f32 = 0.5; // Hz
pub const DEFAULT_MIN_BRIGHTNESS: f32 = 0.3;
pub const DEFAULT_MAX_BRIGHTNESS: f32 = 2.5;

// Palette
pub const RED: u32 = 0xff0000;
pub const GREEN: u32 = 0x00ff00;
pub const BLUE: u32 = 0x0000ff;
pub const YELLOW: u32 = 0xffff00;
pub const PURPLE: u32 = 0x8000ff;
pub const TEAL: u32 = 0x008080;

/// Color of the built-in behavior activated when nothing else resolves.
pub const FALLBACK_COLOR: u32 = RED;

// Corner array timeline
pub const CORNER_STATIC_DURATION: f32 = 1.0;
pub const CORNER_SPREAD_DURATION: f32 = 3.0;
pub const CORNER_LASERS_PER_CORNER: u32 = 8;
pub const CORNER_SPREAD_DISTANCE: f32 = 3.0; // max tangent offset at full spread
pub const CORNER_ORIGIN_ADVANCE: f32 = 2.0; // how far spread origins slide toward the hit

/// Screen-corner stand-ins used while no camera is available.
pub const FALLBACK_CORNERS: [[f32; 3]; 4] = [
    [-10.0, 10.0, -10.0],
    [10.0, 10.0, -10.0],
    [-10.0, -10.0, -10.0],
    [10.0, -10.0, -10.0],
];

// Frame loop
pub const MAX_FRAME_DT: f32 = 0.1; // clamp for long stalls (tab switches, breakpoints)

// Persistence
pub const DEFAULT_NAMESPACE: &str = "laser";

#[inline]
pub fn fallback_corners() -> [Vec3; 4] {
    FALLBACK_CORNERS.map(Vec3::from_array)
}
