//! Quick experiments: run an unsaved `default` configuration, tweak it, and
//! save it once it looks right.

use crate::config::{keys, BehaviorConfig, BehaviorKind, ParamValue};
use crate::constants::*;
use crate::error::ConfigError;
use crate::resolver::Resolver;
use crate::scene::Scene;
use crate::store::KeyValueStore;
use std::collections::BTreeMap;

/// Named colors accepted wherever a color name is.
pub const PALETTE: [(&str, u32); 15] = [
    ("red", 0xff0000),
    ("green", 0x00ff00),
    ("blue", 0x0000ff),
    ("cyan", 0x00ffff),
    ("magenta", 0xff00ff),
    ("yellow", 0xffff00),
    ("white", 0xffffff),
    ("orange", 0xff8000),
    ("purple", 0x8000ff),
    ("pink", 0xff0080),
    ("lime", 0x80ff00),
    ("teal", 0x008080),
    ("navy", 0x000080),
    ("gold", 0xffd700),
    ("silver", 0xc0c0c0),
];

pub const QUICK_PRESETS: [&str; 15] = [
    "fast",
    "slow",
    "ultra_fast",
    "rainbow",
    "fire",
    "ice",
    "bouncy",
    "no_bounce",
    "wide",
    "tight",
    "pulse_fast",
    "pulse_slow",
    "bright",
    "chaos",
    "zen",
];

pub fn named_color(name: &str) -> Option<u32> {
    PALETTE
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, hex)| *hex)
}

/// Palette name of `hex`, or `"custom"`.
pub fn color_name(hex: u32) -> &'static str {
    PALETTE
        .iter()
        .find(|(_, h)| *h == hex)
        .map(|(n, _)| *n)
        .unwrap_or("custom")
}

/// Overrides of a quick-test preset, on top of the standard values.
pub fn quick_preset(name: &str) -> Option<BehaviorConfig> {
    let color = |n: &str| named_color(n).unwrap_or(FALLBACK_COLOR);
    let cfg = BehaviorConfig::new();
    let cfg = match name {
        "fast" => cfg.with(keys::STILLNESS_LIMIT, 0.05),
        "slow" => cfg.with(keys::STILLNESS_LIMIT, 0.3),
        "ultra_fast" => cfg.with(keys::STILLNESS_LIMIT, 0.025),
        "rainbow" => cfg.with_color(color("cyan")).with(keys::MAX_BOUNCES, 7u32),
        "fire" => cfg
            .with_color(color("orange"))
            .with(keys::MAX_BRIGHTNESS, 3.0),
        "ice" => cfg.with_color(color("cyan")).with(keys::MIN_BRIGHTNESS, 0.8),
        "bouncy" => cfg.with(keys::MAX_BOUNCES, 10u32).with_color(color("green")),
        "no_bounce" => cfg.with(keys::MAX_BOUNCES, 1u32).with_color(color("red")),
        "wide" => cfg
            .with(keys::ORIGIN_SPHERE_RADIUS, 25.0)
            .with_color(color("purple")),
        "tight" => cfg
            .with(keys::ORIGIN_SPHERE_RADIUS, 3.0)
            .with_color(color("yellow")),
        "pulse_fast" => cfg
            .with(keys::BASE_PULSE_FREQUENCY, 2.0)
            .with_color(color("magenta")),
        "pulse_slow" => cfg
            .with(keys::BASE_PULSE_FREQUENCY, 0.1)
            .with_color(color("blue")),
        "bright" => cfg
            .with(keys::MAX_BRIGHTNESS, 4.0)
            .with(keys::MIN_BRIGHTNESS, 1.0)
            .with_color(color("white")),
        "chaos" => cfg
            .with(keys::MAX_BOUNCES, 8u32)
            .with(keys::ORIGIN_SPHERE_RADIUS, 20.0)
            .with(keys::BASE_PULSE_FREQUENCY, 1.5)
            .with_color(color("pink"))
            .with(keys::STILLNESS_LIMIT, 0.06),
        "zen" => cfg
            .with(keys::MAX_BOUNCES, 2u32)
            .with(keys::ORIGIN_SPHERE_RADIUS, 8.0)
            .with(keys::BASE_PULSE_FREQUENCY, 0.3)
            .with_color(color("teal"))
            .with(keys::STILLNESS_LIMIT, 0.4)
            .with(keys::MIN_BRIGHTNESS, 0.5)
            .with(keys::MAX_BRIGHTNESS, 1.5),
        _ => return None,
    };
    Some(cfg)
}

/// Every standard `default` parameter filled in, then `overrides` on top.
pub fn create(overrides: &BehaviorConfig) -> BehaviorConfig {
    BehaviorConfig::new()
        .of_kind(BehaviorKind::Default)
        .with_color(RED)
        .with(keys::LASER_COUNT, DEFAULT_LASER_COUNT)
        .with(keys::MAX_BOUNCES, DEFAULT_MAX_BOUNCES)
        .with(keys::ORIGIN_SPHERE_RADIUS, DEFAULT_ORIGIN_SPHERE_RADIUS as f64)
        .with(keys::STILLNESS_LIMIT, DEFAULT_STILLNESS_LIMIT as f64)
        .with(keys::BASE_PULSE_FREQUENCY, DEFAULT_PULSE_FREQUENCY as f64)
        .with(keys::MIN_BRIGHTNESS, DEFAULT_MIN_BRIGHTNESS as f64)
        .with(keys::MAX_BRIGHTNESS, DEFAULT_MAX_BRIGHTNESS as f64)
        .with(keys::MAX_LENGTH, DEFAULT_MAX_LENGTH as f64)
        .merged(overrides)
}

/// One differing parameter between two test configs.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamDiff {
    pub key: String,
    pub left: Option<ParamValue>,
    pub right: Option<ParamValue>,
}

/// Unsaved test configurations and the one currently running.
#[derive(Debug, Default)]
pub struct LaserFactory {
    tests: BTreeMap<String, BehaviorConfig>,
    active: Option<String>,
}

impl LaserFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `config` as a `default` behavior called `name`, replacing whatever
    /// is active. Nothing is saved and no pointer moves.
    pub fn test<S: KeyValueStore>(
        &mut self,
        resolver: &mut Resolver<S>,
        scene: &mut dyn Scene,
        config: &BehaviorConfig,
        name: &str,
    ) {
        let mut config = config.clone();
        config.behavior_type = Some(BehaviorKind::Default);
        resolver.activate(name, &config, scene);
        log::info!("testing `{name}`");
        self.tests.insert(name.to_string(), config);
        self.active = Some(name.to_string());
    }

    /// [`LaserFactory::test`] with one of [`QUICK_PRESETS`], named after it.
    pub fn quick_test<S: KeyValueStore>(
        &mut self,
        resolver: &mut Resolver<S>,
        scene: &mut dyn Scene,
        preset: &str,
    ) -> Result<(), ConfigError> {
        let config = quick_preset(preset).ok_or_else(|| ConfigError::UnknownPreset(preset.to_string()))?;
        self.test(resolver, scene, &config, preset);
        Ok(())
    }

    /// Fill in the standard values around `overrides` and test the result.
    pub fn create<S: KeyValueStore>(
        &mut self,
        resolver: &mut Resolver<S>,
        scene: &mut dyn Scene,
        overrides: &BehaviorConfig,
        name: &str,
    ) {
        let config = create(overrides);
        self.test(resolver, scene, &config, name);
    }

    /// Persist test `test` (the active one when `None`) as `save_as`
    /// (the test's own name when `None`).
    pub fn save<S: KeyValueStore>(
        &self,
        resolver: &mut Resolver<S>,
        test: Option<&str>,
        save_as: Option<&str>,
    ) -> bool {
        let Some(test_name) = test.or(self.active.as_deref()) else {
            log::warn!("no test to save");
            return false;
        };
        let Some(config) = self.tests.get(test_name) else {
            log::warn!("no test configuration `{test_name}`");
            return false;
        };
        resolver.save_behavior(save_as.unwrap_or(test_name), config, Some(BehaviorKind::Default))
    }

    pub fn list_tests(&self) -> Vec<&str> {
        self.tests.keys().map(String::as_str).collect()
    }

    pub fn active_test(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn test_config(&self, name: &str) -> Option<&BehaviorConfig> {
        self.tests.get(name)
    }

    /// Parameters that differ between two tests, or `None` if either is unknown.
    pub fn compare(&self, left: &str, right: &str) -> Option<Vec<ParamDiff>> {
        let (a, b) = (self.tests.get(left)?, self.tests.get(right)?);
        let mut keys: Vec<&String> = a.params.keys().chain(b.params.keys()).collect();
        keys.sort();
        keys.dedup();
        Some(
            keys.into_iter()
                .filter(|k| a.params.get(*k) != b.params.get(*k))
                .map(|k| ParamDiff {
                    key: k.clone(),
                    left: a.params.get(k).cloned(),
                    right: b.params.get(k).cloned(),
                })
                .collect(),
        )
    }

    pub fn clear_tests(&mut self) {
        self.tests.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_lookup_is_case_insensitive() {
        assert_eq!(named_color("Gold"), Some(0xffd700));
        assert_eq!(named_color("mauve"), None);
        assert_eq!(color_name(0x000080), "navy");
        assert_eq!(color_name(0x123456), "custom");
    }

    #[test]
    fn every_quick_preset_exists() {
        for name in QUICK_PRESETS {
            assert!(quick_preset(name).is_some(), "{name}");
        }
    }

    #[test]
    fn create_keeps_overrides() {
        let cfg = create(&BehaviorConfig::new().with(keys::MAX_BOUNCES, 9u32));
        assert_eq!(cfg.get_f64(keys::MAX_BOUNCES), Some(9.0));
        assert_eq!(cfg.get_f64(keys::MAX_LENGTH), Some(DEFAULT_MAX_LENGTH as f64));
        assert_eq!(cfg.kind(), BehaviorKind::Default);
    }
}
