//! Behavior configurations: the flat parameter maps users save and load.
//!
//! The JSON shape is kept deliberately loose (`{"laserColor": 255,
//! "MAX_BOUNCES": 5, "_behaviorType": "default"}`) so hand-edited exports
//! import cleanly; typed access goes through [`LaserParams`].

use crate::beam::Color;
use crate::constants::*;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parameter names as they appear in saved configurations.
pub mod keys {
    pub const LASER_COLOR: &str = "laserColor";
    pub const LASER_COUNT: &str = "laserCount";
    pub const MAX_BOUNCES: &str = "MAX_BOUNCES";
    pub const ORIGIN_SPHERE_RADIUS: &str = "ORIGIN_SPHERE_RADIUS";
    pub const STILLNESS_LIMIT: &str = "STILLNESS_LIMIT";
    pub const BASE_PULSE_FREQUENCY: &str = "BASE_PULSE_FREQUENCY";
    pub const MIN_BRIGHTNESS: &str = "MIN_BRIGHTNESS";
    pub const MAX_BRIGHTNESS: &str = "MAX_BRIGHTNESS";
    pub const MAX_LENGTH: &str = "MAX_LENGTH";

    pub const STATIC_DURATION: &str = "STATIC_DURATION";
    pub const SPREAD_DURATION: &str = "SPREAD_DURATION";
    pub const LASERS_PER_CORNER: &str = "LASERS_PER_CORNER";
    pub const SPREAD_DISTANCE: &str = "SPREAD_DISTANCE";
}

/// The closed set of behavior algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "wireframe")]
    Wireframe,
    #[serde(rename = "array_1", alias = "corner_array")]
    CornerArray,
    #[serde(rename = "start")]
    Start,
}

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 4] = [
        BehaviorKind::Default,
        BehaviorKind::Wireframe,
        BehaviorKind::CornerArray,
        BehaviorKind::Start,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            BehaviorKind::Default => "default",
            BehaviorKind::Wireframe => "wireframe",
            BehaviorKind::CornerArray => "array_1",
            BehaviorKind::Start => "start",
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for BehaviorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(BehaviorKind::Default),
            "wireframe" => Ok(BehaviorKind::Wireframe),
            "array_1" | "corner_array" => Ok(BehaviorKind::CornerArray),
            "start" => Ok(BehaviorKind::Start),
            other => Err(format!("unknown behavior type `{other}`")),
        }
    }
}

/// One parameter value. Colors may be numbers or hex strings. Anything else
/// a hand-edited config carries is kept as raw JSON so it survives a save.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

// Whole numbers go out as integers so `5` does not come back as `5.0`.
impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            ParamValue::Number(n) => serializer.serialize_f64(*n),
            ParamValue::Flag(b) => serializer.serialize_bool(*b),
            ParamValue::Text(t) => serializer.serialize_str(t),
            ParamValue::Other(v) => v.serialize(serializer),
        }
    }
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            ParamValue::Text(t) => t.trim().parse::<f64>().ok(),
            ParamValue::Other(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Number(n) if n.is_finite() && *n >= 0.0 => Some(Color(*n as u32)),
            ParamValue::Text(t) => Color::parse(t),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Number(v as f64)
    }
}

/// A saved (or about to be saved) behavior configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    #[serde(
        rename = "_behaviorType",
        alias = "behaviorType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub behavior_type: Option<BehaviorKind>,
    #[serde(flatten)]
    pub params: BTreeMap<String, ParamValue>,
}

impl BehaviorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_color(self, hex: u32) -> Self {
        self.with(keys::LASER_COLOR, hex)
    }

    pub fn of_kind(mut self, kind: BehaviorKind) -> Self {
        self.behavior_type = Some(kind);
        self
    }

    /// The algorithm this config targets; untagged configs are `default`.
    pub fn kind(&self) -> BehaviorKind {
        self.behavior_type.unwrap_or(BehaviorKind::Default)
    }

    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.params.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(ParamValue::as_f64)
    }

    pub fn color(&self) -> Option<Color> {
        self.params.get(keys::LASER_COLOR).and_then(ParamValue::as_color)
    }

    /// `self` with every parameter of `overrides` applied on top. The type tag
    /// of `overrides` wins when present.
    pub fn merged(&self, overrides: &BehaviorConfig) -> BehaviorConfig {
        let mut out = self.clone();
        out.params
            .extend(overrides.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        if overrides.behavior_type.is_some() {
            out.behavior_type = overrides.behavior_type;
        }
        out
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Whole count from a config number, capped at [`MAX_CONFIG_COUNT`].
pub fn clamp_count(key: &str, value: f64) -> u32 {
    if value > MAX_CONFIG_COUNT as f64 {
        log::warn!("{key} = {value} is too large, capping at {MAX_CONFIG_COUNT}");
        MAX_CONFIG_COUNT
    } else {
        value as u32
    }
}

/// Typed view of the parameters shared by every laser variant.
#[derive(Clone, Debug, PartialEq)]
pub struct LaserParams {
    pub color: Color,
    pub laser_count: u32,
    pub max_bounces: u32,
    pub origin_sphere_radius: f32,
    pub stillness_limit: f32,
    pub pulse_frequency: f32,
    pub min_brightness: f32,
    pub max_brightness: f32,
    pub max_length: f32,
}

impl Default for LaserParams {
    fn default() -> Self {
        Self {
            color: Color(RED),
            laser_count: DEFAULT_LASER_COUNT,
            max_bounces: DEFAULT_MAX_BOUNCES,
            origin_sphere_radius: DEFAULT_ORIGIN_SPHERE_RADIUS,
            stillness_limit: DEFAULT_STILLNESS_LIMIT,
            pulse_frequency: DEFAULT_PULSE_FREQUENCY,
            min_brightness: DEFAULT_MIN_BRIGHTNESS,
            max_brightness: DEFAULT_MAX_BRIGHTNESS,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl LaserParams {
    /// Overlay the values present in `config` onto `base`. A present key
    /// always wins, zero included; values that make no sense keep the base.
    pub fn resolve(config: &BehaviorConfig, base: LaserParams) -> Self {
        let count = |key: &str, fallback: u32| {
            config
                .get_f64(key)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| clamp_count(key, v))
                .unwrap_or(fallback)
        };
        let real = |key: &str, fallback: f32| {
            config
                .get_f64(key)
                .filter(|v| v.is_finite())
                .map(|v| v as f32)
                .unwrap_or(fallback)
        };
        let positive = |key: &str, fallback: f32| {
            let v = real(key, fallback);
            if v > 0.0 {
                v
            } else {
                log::warn!("{key} must be positive, keeping {fallback}");
                fallback
            }
        };

        Self {
            color: config.color().unwrap_or(base.color),
            laser_count: count(keys::LASER_COUNT, base.laser_count),
            max_bounces: count(keys::MAX_BOUNCES, base.max_bounces),
            origin_sphere_radius: real(keys::ORIGIN_SPHERE_RADIUS, base.origin_sphere_radius),
            stillness_limit: real(keys::STILLNESS_LIMIT, base.stillness_limit),
            pulse_frequency: real(keys::BASE_PULSE_FREQUENCY, base.pulse_frequency),
            min_brightness: real(keys::MIN_BRIGHTNESS, base.min_brightness),
            max_brightness: real(keys::MAX_BRIGHTNESS, base.max_brightness),
            max_length: positive(keys::MAX_LENGTH, base.max_length),
        }
    }
}
