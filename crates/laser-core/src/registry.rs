//! Behavior factory and the built-in named configurations.
//!
//! The set of algorithms is closed ([`BehaviorKind`]); adding one means a new
//! variant plus a match arm in [`create`]. Named setups such as `blue_bounce`
//! are plain parameterizations of those algorithms.

use crate::behavior::{
    Behavior, CornerArrayBehavior, DefaultBehavior, StartBehavior, WireframeBehavior,
};
use crate::config::{keys, BehaviorConfig, BehaviorKind};
use crate::constants::*;

/// Build a behavior of `kind` named `name` from `config`.
pub fn create(kind: BehaviorKind, name: &str, config: &BehaviorConfig, seed: u64) -> Box<dyn Behavior> {
    match kind {
        BehaviorKind::Default => Box::new(DefaultBehavior::new(name, config.clone(), seed)),
        BehaviorKind::Wireframe => Box::new(WireframeBehavior::new(name, config.clone(), seed)),
        BehaviorKind::CornerArray => Box::new(CornerArrayBehavior::new(name, config)),
        BehaviorKind::Start => Box::new(StartBehavior::new(name, config)),
    }
}

/// Build whatever `config` was saved for; untagged configs are `default`.
pub fn from_config(name: &str, config: &BehaviorConfig, seed: u64) -> Box<dyn Behavior> {
    create(config.kind(), name, config, seed)
}

/// Names accepted by [`preset`].
pub const PRESET_NAMES: [&str; 9] = [
    "red_default",
    "green_lasers",
    "blue_bounce",
    "yellow_wide",
    "fast_purple",
    "calm_teal",
    "start",
    "array_1",
    "wireframe",
];

/// Saved into an empty store on first run.
pub const SEEDED_NAMES: [&str; 7] = [
    "red_default",
    "green_lasers",
    "blue_bounce",
    "yellow_wide",
    "start",
    "array_1",
    "wireframe",
];

/// Built-in named configuration.
pub fn preset(name: &str) -> Option<BehaviorConfig> {
    let default = || BehaviorConfig::new().of_kind(BehaviorKind::Default);
    let cfg = match name {
        "red_default" => default().with_color(RED),
        "green_lasers" => default().with_color(GREEN),
        "blue_bounce" => default().with_color(BLUE).with(keys::MAX_BOUNCES, 5u32),
        "yellow_wide" => default()
            .with_color(YELLOW)
            .with(keys::ORIGIN_SPHERE_RADIUS, 15.0),
        "fast_purple" => default()
            .with_color(PURPLE)
            .with(keys::LASER_COUNT, 6u32)
            .with(keys::MAX_BOUNCES, 4u32)
            .with(keys::ORIGIN_SPHERE_RADIUS, 12.0)
            .with(keys::STILLNESS_LIMIT, 0.04)
            .with(keys::BASE_PULSE_FREQUENCY, 1.2)
            .with(keys::MIN_BRIGHTNESS, 0.4)
            .with(keys::MAX_BRIGHTNESS, 3.0)
            .with(keys::MAX_LENGTH, 25.0),
        "calm_teal" => default()
            .with_color(TEAL)
            .with(keys::LASER_COUNT, 3u32)
            .with(keys::MAX_BOUNCES, 2u32)
            .with(keys::ORIGIN_SPHERE_RADIUS, 8.0)
            .with(keys::STILLNESS_LIMIT, 0.25)
            .with(keys::BASE_PULSE_FREQUENCY, 0.3)
            .with(keys::MIN_BRIGHTNESS, 0.6)
            .with(keys::MAX_BRIGHTNESS, 1.2)
            .with(keys::MAX_LENGTH, 15.0),
        "start" => BehaviorConfig::new()
            .with_color(BLUE)
            .of_kind(BehaviorKind::Start),
        "array_1" => BehaviorConfig::new()
            .with_color(BLUE)
            .of_kind(BehaviorKind::CornerArray),
        "wireframe" => BehaviorConfig::new()
            .with_color(GREEN)
            .of_kind(BehaviorKind::Wireframe),
        _ => return None,
    };
    Some(cfg)
}

/// Name and config of the behavior activated when nothing else resolves.
pub fn fallback() -> (&'static str, BehaviorConfig) {
    (
        "fallback",
        BehaviorConfig::new()
            .with_color(FALLBACK_COLOR)
            .of_kind(BehaviorKind::Default),
    )
}
