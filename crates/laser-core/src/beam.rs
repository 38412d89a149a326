use crate::geometry::BeamPath;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle the engine assigns to every beam it hands to the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeamId(pub u64);

impl fmt::Display for BeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "beam#{}", self.0)
    }
}

/// 24-bit RGB color stored as `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    #[inline]
    pub const fn hex(self) -> u32 {
        self.0 & 0x00ff_ffff
    }

    /// Linear-ish `[0, 1]` channels, no gamma applied.
    pub fn rgb(self) -> [f32; 3] {
        let h = self.hex();
        [
            ((h >> 16) & 0xff) as f32 / 255.0,
            ((h >> 8) & 0xff) as f32 / 255.0,
            (h & 0xff) as f32 / 255.0,
        ]
    }

    /// Channels multiplied by `brightness`. Values above 1 are intentional:
    /// the renderer blooms them.
    pub fn scaled(self, brightness: f32) -> [f32; 3] {
        self.rgb().map(|c| c * brightness)
    }

    /// Accepts `0xff8000`, `#ff8000` or a bare hex string.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        let digits = t
            .strip_prefix("0x")
            .or_else(|| t.strip_prefix("0X"))
            .or_else(|| t.strip_prefix('#'))
            .unwrap_or(t);
        u32::from_str_radix(digits, 16).ok().map(Color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.hex())
    }
}

/// Vertex layout handed to renderers that upload beams as line strips.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// One drawable light polyline with a color and a brightness scalar.
#[derive(Clone, Debug)]
pub struct Beam {
    id: BeamId,
    path: BeamPath,
    color: Color,
    brightness: f32,
    visible: bool,
}

impl Beam {
    pub(crate) fn new(id: BeamId, color: Color) -> Self {
        Self {
            id,
            path: BeamPath::new(),
            color,
            brightness: 1.0,
            visible: true,
        }
    }

    #[inline]
    pub fn id(&self) -> BeamId {
        self.id
    }

    pub fn set_path<I: IntoIterator<Item = Vec3>>(&mut self, points: I) {
        self.path.clear();
        self.path.extend(points);
    }

    /// Straight two-point segment.
    pub fn set_segment(&mut self, start: Vec3, end: Vec3) {
        self.set_path([start, end]);
    }

    pub fn set_tint(&mut self, color: Color, brightness: f32) {
        self.color = color;
        self.brightness = brightness;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[inline]
    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Line-strip vertices with the tint baked in.
    pub fn vertices(&self) -> Vec<LineVertex> {
        let [r, g, b] = self.color.scaled(self.brightness);
        self.path
            .iter()
            .map(|p| LineVertex {
                position: p.to_array(),
                color: [r, g, b, 1.0],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parse_accepts_common_spellings() {
        assert_eq!(Color::parse("0x0080ff"), Some(Color(0x0080ff)));
        assert_eq!(Color::parse("#ff0000"), Some(Color(0xff0000)));
        assert_eq!(Color::parse("00ff00"), Some(Color(0x00ff00)));
        assert_eq!(Color::parse("nope"), None);
    }

    #[test]
    fn vertices_carry_scaled_tint() {
        let mut beam = Beam::new(BeamId(1), Color(0xff0000));
        beam.set_segment(Vec3::ZERO, Vec3::X);
        beam.set_tint(Color(0xff0000), 2.0);
        let verts = beam.vertices();
        assert_eq!(verts.len(), 2);
        assert_eq!(verts[0].color, [2.0, 0.0, 0.0, 1.0]);
        let floats: &[f32] = bytemuck::cast_slice(&verts);
        assert_eq!(floats.len(), 14);
    }
}
