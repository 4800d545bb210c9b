//! Game settings and tuning
//!
//! Everything a level-1 run starts from lives here. Hosts may load it from
//! JSON; the simulation only ever reads it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::Difficulty;

/// Device class, derived from the viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeviceProfile {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceProfile {
    pub fn from_viewport_width(width: f32, breakpoint: f32) -> Self {
        if width < breakpoint {
            DeviceProfile::Mobile
        } else {
            DeviceProfile::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceProfile::Desktop => "Desktop",
            DeviceProfile::Mobile => "Mobile",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" => Some(DeviceProfile::Desktop),
            "mobile" | "touch" => Some(DeviceProfile::Mobile),
            _ => None,
        }
    }
}

/// Bearing change-rate thresholds for danger cues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatThresholds {
    /// Rates below this are critical
    pub critical: f32,
    /// Rates below this (and not critical) call for caution
    pub caution: f32,
    /// Weight of the previous rate in exponential smoothing
    pub smoothing: f32,
}

impl Default for ThreatThresholds {
    fn default() -> Self {
        Self {
            critical: CRITICAL_RATE,
            caution: CAUTION_RATE,
            smoothing: RATE_SMOOTHING,
        }
    }
}

/// Player speeds for the current difficulty and device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSpeeds {
    pub base: f32,
    pub min: f32,
    pub lateral: f32,
}

/// Game settings/tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub starting_lives: u8,
    /// Difficulty at level 1
    pub difficulty: Difficulty,
    pub threat: ThreatThresholds,
    /// Last level that shows danger colouring on cue lines
    pub cue_max_level: u32,
    /// Dash/gap lengths for cue lines
    pub dash_pattern: [f32; 2],

    // === Field layout ===
    /// Desktop: top row offset as a fraction of band height
    pub desktop_row_offset: f32,
    /// Mobile: minimum top margin as a fraction of playfield height
    pub mobile_top_margin: f32,

    // === Device scaling ===
    pub mobile_breakpoint: f32,
    pub mobile_speed_multiplier: f32,
    pub brake_factor: f32,
    pub mobile_lateral_factor: f32,

    // === Touch drag ===
    pub drag_dead_zone: f32,
    pub drag_boost_threshold: f32,
    pub drag_boost_divisor: f32,
    /// Largest nudge a single drag can add
    pub drag_boost_cap: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            difficulty: Difficulty::default(),
            threat: ThreatThresholds::default(),
            cue_max_level: CUE_MAX_LEVEL,
            dash_pattern: DASH_PATTERN,

            desktop_row_offset: 0.3,
            mobile_top_margin: 0.1,

            mobile_breakpoint: MOBILE_BREAKPOINT,
            mobile_speed_multiplier: MOBILE_SPEED_MULTIPLIER,
            brake_factor: BRAKE_FACTOR,
            mobile_lateral_factor: MOBILE_LATERAL_FACTOR,

            drag_dead_zone: 5.0,
            drag_boost_threshold: 40.0,
            drag_boost_divisor: 50.0,
            drag_boost_cap: 2.0,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Reject tunings the simulation cannot honour
    pub fn validate(&self) -> Result<(), SettingsError> {
        let d = &self.difficulty;
        if self.starting_lives == 0 {
            return Err(SettingsError::invalid("starting_lives", "must be at least 1"));
        }
        if d.row_count == 0 {
            return Err(SettingsError::invalid("difficulty.row_count", "must be at least 1"));
        }
        if d.obstacles_per_row_min == 0 || d.obstacles_per_row_min > d.obstacles_per_row_max {
            return Err(SettingsError::invalid(
                "difficulty.obstacles_per_row_min",
                format!(
                    "need 1 <= min <= max, got {}..={}",
                    d.obstacles_per_row_min, d.obstacles_per_row_max
                ),
            ));
        }
        if !d.obstacle_speed_min.is_finite()
            || !d.obstacle_speed_max.is_finite()
            || d.obstacle_speed_min < 0.0
            || d.obstacle_speed_min > d.obstacle_speed_max
        {
            return Err(SettingsError::invalid(
                "difficulty.obstacle_speed_min",
                format!(
                    "need 0 <= min <= max, got {}..={}",
                    d.obstacle_speed_min, d.obstacle_speed_max
                ),
            ));
        }
        for (field, value) in [
            ("difficulty.obstacle_radius", d.obstacle_radius),
            ("difficulty.player_radius", d.player_radius),
            ("difficulty.player_base_speed", d.player_base_speed),
            ("mobile_speed_multiplier", self.mobile_speed_multiplier),
            ("drag_boost_divisor", self.drag_boost_divisor),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(SettingsError::invalid(field, format!("must be positive, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.brake_factor) {
            return Err(SettingsError::invalid("brake_factor", "must be within 0..=1"));
        }
        if !(0.0..1.0).contains(&self.threat.smoothing) {
            return Err(SettingsError::invalid("threat.smoothing", "must be within 0..1"));
        }
        if self.threat.critical > self.threat.caution {
            return Err(SettingsError::invalid(
                "threat.critical",
                "critical threshold must not exceed caution threshold",
            ));
        }
        Ok(())
    }

    pub fn profile_for_viewport(&self, viewport_width: f32) -> DeviceProfile {
        DeviceProfile::from_viewport_width(viewport_width, self.mobile_breakpoint)
    }

    /// Vertical shift applied to every row so the topmost one stays visible
    pub fn row_offset(&self, profile: DeviceProfile, band_height: f32, height: f32) -> f32 {
        let offset = match profile {
            DeviceProfile::Mobile => band_height - height * self.mobile_top_margin,
            DeviceProfile::Desktop => band_height * self.desktop_row_offset,
        };
        offset.max(0.0)
    }

    /// Log the tuning a run starts from
    pub fn log_params(&self, profile: DeviceProfile) {
        let d = &self.difficulty;
        log::debug!(
            "Params: rows={} per_row={}..={} obstacle_speed={}..={} obstacle_radius={} player_radius={} player_speed={} lives={} profile={}",
            d.row_count,
            d.obstacles_per_row_min,
            d.obstacles_per_row_max,
            d.obstacle_speed_min,
            d.obstacle_speed_max,
            d.obstacle_radius,
            d.player_radius,
            d.player_base_speed,
            self.starting_lives,
            profile.as_str(),
        );
    }
}

/// Player speeds for a difficulty on a device
///
/// The single place where device scaling is applied; every spawn, respawn,
/// level advance and resize goes through here.
pub fn derive_speeds(settings: &Settings, difficulty: &Difficulty, profile: DeviceProfile) -> PlayerSpeeds {
    let speed = difficulty.player_base_speed;
    let multiplier = match profile {
        DeviceProfile::Mobile => settings.mobile_speed_multiplier,
        DeviceProfile::Desktop => 1.0,
    };
    let lateral = match profile {
        DeviceProfile::Mobile => speed * settings.mobile_lateral_factor * multiplier,
        DeviceProfile::Desktop => speed,
    };
    PlayerSpeeds {
        base: speed * multiplier,
        min: speed * settings.brake_factor * multiplier,
        lateral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let settings = Settings::from_json(r#"{ "starting_lives": 5, "difficulty": { "row_count": 7 } }"#).unwrap();
        assert_eq!(settings.starting_lives, 5);
        assert_eq!(settings.difficulty.row_count, 7);
        assert_eq!(settings.difficulty.obstacles_per_row_min, OBSTACLES_PER_ROW_MIN);
        assert_eq!(settings.cue_max_level, CUE_MAX_LEVEL);
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let err = Settings::from_json(
            r#"{ "difficulty": { "obstacles_per_row_min": 6, "obstacles_per_row_max": 3 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "difficulty.obstacles_per_row_min", .. }));

        let err = Settings::from_json(r#"{ "starting_lives": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "starting_lives", .. }));

        let err = Settings::from_json(r#"{ "threat": { "critical": 0.01, "caution": 0.001 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "threat.critical", .. }));
    }

    #[test]
    fn test_non_finite_speed_range_rejected() {
        for (min, max) in [(f32::NAN, 3.0), (1.0, f32::NAN), (1.0, f32::INFINITY)] {
            let mut settings = Settings::default();
            settings.difficulty.obstacle_speed_min = min;
            settings.difficulty.obstacle_speed_max = max;
            let err = settings.validate().unwrap_err();
            assert!(matches!(err, SettingsError::Invalid { field: "difficulty.obstacle_speed_min", .. }));
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Settings::from_json("{ nope"), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load_from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_profile_from_viewport() {
        let settings = Settings::default();
        assert_eq!(settings.profile_for_viewport(500.0), DeviceProfile::Mobile);
        assert_eq!(settings.profile_for_viewport(768.0), DeviceProfile::Desktop);
        assert_eq!(DeviceProfile::from_str("MOBILE"), Some(DeviceProfile::Mobile));
        assert_eq!(DeviceProfile::from_str("tablet"), None);
    }

    #[test]
    fn test_derive_speeds() {
        let settings = Settings::default();
        let d = Difficulty::default();

        let desktop = derive_speeds(&settings, &d, DeviceProfile::Desktop);
        assert_eq!(desktop.base, PLAYER_SPEED);
        assert!((desktop.min - PLAYER_SPEED * 0.3).abs() < 1e-6);
        assert_eq!(desktop.lateral, PLAYER_SPEED);

        let mobile = derive_speeds(&settings, &d, DeviceProfile::Mobile);
        assert!((mobile.base - PLAYER_SPEED * 1.5).abs() < 1e-6);
        assert!((mobile.min - PLAYER_SPEED * 0.3 * 1.5).abs() < 1e-6);
        assert!((mobile.lateral - PLAYER_SPEED * 0.6 * 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_row_offset() {
        let settings = Settings::default();
        assert!((settings.row_offset(DeviceProfile::Desktop, 100.0, 700.0) - 30.0).abs() < 1e-4);
        assert!((settings.row_offset(DeviceProfile::Mobile, 100.0, 700.0) - 30.0).abs() < 1e-4);
        // Never pushes rows downward
        assert_eq!(settings.row_offset(DeviceProfile::Mobile, 50.0, 700.0), 0.0);
    }
}
