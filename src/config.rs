use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AppError, AppResult};
use crate::models::{ActivitySubtype, RaceType};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub geofence: GeofenceConfig,
    #[serde(default)]
    pub eligibility: EligibilityConfig,
    #[serde(default)]
    pub prizes: PrizeConfig,
    #[serde(default)]
    pub races: RaceConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

/// What `validate_route` answers for a polyline that decodes to no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRoutePolicy {
    #[default]
    Reject,
    Accept,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeofenceConfig {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    /// Roughly how many interior points of a route get checked.
    pub samples_per_route: usize,
    pub empty_route_policy: EmptyRoutePolicy,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        // Great Britain and Northern Ireland
        Self {
            min_lat: 49.8,
            max_lat: 60.9,
            min_lng: -8.2,
            max_lng: 1.8,
            samples_per_route: 10,
            empty_route_policy: EmptyRoutePolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub fastest_1km_min_m: f64,
    pub fastest_5km_min_m: f64,
    pub fastest_10km_min_m: f64,
    pub allowed_activities: Vec<ActivitySubtype>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            fastest_1km_min_m: 1_000.0,
            fastest_5km_min_m: 5_000.0,
            fastest_10km_min_m: 10_000.0,
            allowed_activities: vec![ActivitySubtype::Canoe, ActivitySubtype::Kayak],
        }
    }
}

/// Prize tiers are shares of the net pool, the platform fee is a share of the gross pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrizeConfig {
    pub first: Decimal,
    pub second: Decimal,
    pub third: Decimal,
    pub platform_fee: Decimal,
}

impl Default for PrizeConfig {
    fn default() -> Self {
        Self {
            first: dec!(0.75),
            second: dec!(0.20),
            third: dec!(0.05),
            platform_fee: dec!(0.01),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub entry_deadline_hours: i64,
    pub daily_fee: Decimal,
    pub weekly_fee: Decimal,
    pub monthly_fee: Decimal,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            entry_deadline_hours: 3,
            daily_fee: dec!(2.00),
            weekly_fee: dec!(5.00),
            monthly_fee: dec!(10.00),
        }
    }
}

impl RaceConfig {
    pub fn entry_deadline_lead(&self) -> chrono::Duration {
        chrono::Duration::hours(self.entry_deadline_hours)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub review_threshold: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            review_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub max_plausible_speed_ms: f64,
    pub min_route_points: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_plausible_speed_ms: 10.0,
            min_route_points: 2,
        }
    }
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config file at {config_path}, using defaults");
                Config::default()
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Cannot read config file {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables win over the file, whether or not it exists.
    pub fn apply_env_overrides(&mut self) {
        fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|v| v.parse::<T>().ok())
        }

        if let Some(v) = get_env_parse("GEOFENCE_MIN_LAT") {
            self.geofence.min_lat = v;
        }
        if let Some(v) = get_env_parse("GEOFENCE_MAX_LAT") {
            self.geofence.max_lat = v;
        }
        if let Some(v) = get_env_parse("GEOFENCE_MIN_LNG") {
            self.geofence.min_lng = v;
        }
        if let Some(v) = get_env_parse("GEOFENCE_MAX_LNG") {
            self.geofence.max_lng = v;
        }
        if let Some(v) = get_env_parse("PRIZE_PLATFORM_FEE") {
            self.prizes.platform_fee = v;
        }
        if let Some(v) = get_env_parse("ENTRY_DEADLINE_HOURS") {
            self.races.entry_deadline_hours = v;
        }
        if let Some(v) = get_env_parse("REVIEW_THRESHOLD") {
            self.moderation.review_threshold = v;
        }
        if let Some(v) = get_env_parse("MAX_PLAUSIBLE_SPEED_MS") {
            self.import.max_plausible_speed_ms = v;
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        let g = &self.geofence;
        if !(g.min_lat < g.max_lat) || !(g.min_lng < g.max_lng) {
            return Err(AppError::ConfigError(
                "Geofence bounds must satisfy min < max on both axes".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&g.min_lat) || !(-90.0..=90.0).contains(&g.max_lat) {
            return Err(AppError::ConfigError("Geofence latitude out of range".into()));
        }
        if g.samples_per_route == 0 {
            return Err(AppError::ConfigError(
                "samples_per_route must be at least 1".into(),
            ));
        }

        let p = &self.prizes;
        if p.first + p.second + p.third != Decimal::ONE {
            return Err(AppError::ConfigError(format!(
                "Prize tiers must sum to 1, got {}",
                p.first + p.second + p.third
            )));
        }
        if [p.first, p.second, p.third].iter().any(|s| s.is_sign_negative()) {
            return Err(AppError::ConfigError("Prize tiers must not be negative".into()));
        }
        if p.platform_fee.is_sign_negative() || p.platform_fee >= Decimal::ONE {
            return Err(AppError::ConfigError(
                "Platform fee must be within [0, 1)".into(),
            ));
        }

        let r = &self.races;
        if r.entry_deadline_hours < 0 {
            return Err(AppError::ConfigError(
                "entry_deadline_hours must not be negative".into(),
            ));
        }
        if [r.daily_fee, r.weekly_fee, r.monthly_fee]
            .iter()
            .any(|f| f.is_sign_negative())
        {
            return Err(AppError::ConfigError("Entry fees must not be negative".into()));
        }

        let e = &self.eligibility;
        if !(0.0 <= e.fastest_1km_min_m
            && e.fastest_1km_min_m <= e.fastest_5km_min_m
            && e.fastest_5km_min_m <= e.fastest_10km_min_m)
        {
            return Err(AppError::ConfigError(
                "Minimum distances must be ordered 1km <= 5km <= 10km".into(),
            ));
        }
        // Scoring needs the full sub-distance, so a minimum may be raised but not lowered.
        for (race_type, min_m) in [
            (RaceType::Fastest1Km, e.fastest_1km_min_m),
            (RaceType::Fastest5Km, e.fastest_5km_min_m),
            (RaceType::Fastest10Km, e.fastest_10km_min_m),
        ] {
            if let Some(target_m) = race_type.target_distance_m()
                && min_m < target_m
            {
                return Err(AppError::ConfigError(format!(
                    "Minimum distance for {race_type} is {min_m}m, below the scored {target_m}m"
                )));
            }
        }

        if self.import.max_plausible_speed_ms <= 0.0 {
            return Err(AppError::ConfigError(
                "max_plausible_speed_ms must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.geofence.min_lat, 49.8);
        assert_eq!(config.races.entry_deadline_hours, 3);
        assert_eq!(config.prizes.platform_fee, dec!(0.01));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [geofence]
            max_lat = 61.0
            empty_route_policy = "accept"

            [prizes]
            first = "0.70"
            second = "0.20"
            third = "0.10"
            "#,
        )
        .unwrap();
        assert_eq!(config.geofence.max_lat, 61.0);
        assert_eq!(config.geofence.min_lat, 49.8);
        assert_eq!(config.geofence.empty_route_policy, EmptyRoutePolicy::Accept);
        assert_eq!(config.prizes.first, dec!(0.70));
        assert_eq!(config.prizes.platform_fee, dec!(0.01));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tiers_must_sum_to_one() {
        let mut config = Config::default();
        config.prizes.third = dec!(0.10);
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = Config::default();
        config.geofence.min_lng = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unordered_minimum_distances_rejected() {
        let mut config = Config::default();
        config.eligibility.fastest_5km_min_m = 20_000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimum_below_scored_distance_rejected() {
        let mut config = Config::default();
        config.eligibility.fastest_5km_min_m = 4_000.0;
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));

        config.eligibility.fastest_5km_min_m = 6_000.0;
        assert!(config.validate().is_ok());
    }
}
