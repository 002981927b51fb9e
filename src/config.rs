//! Tunables for the effect layer. Defaults reproduce the shipped page.

#[cfg(feature = "serde_json")]
use crate::error::FxError;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FxConfig {
    /// Pixels inserted once at start so the field looks pre-populated.
    pub ambient_seed_count: usize,
    pub ambient_interval_ms: u32,
    /// Hard lifetime of interval-spawned pixels (not tied to animationend).
    pub ambient_ttl_ms: u32,
    /// Scroll delta (px) that must be exceeded before sparkles appear.
    pub scroll_threshold_px: f64,
    pub scroll_burst_count: usize,
    pub scroll_sparkle_ttl_ms: u32,
    /// Gap between `puff` and the follow-up `hit` in quiet mode.
    pub hit_delay_ms: u32,
    pub quiet_revert_ms: u32,
    pub alert_revert_ms: u32,
    pub hit_revert_ms: u32,
    /// Length of the page-wide `explosionShake` animation.
    pub shake_ms: u32,
    /// Hover/click blips through Web Audio.
    pub sound_enabled: bool,
    pub log_level: String,
    /// Fixed seed for reproducible particle layouts; entropy when `None`.
    pub rng_seed: Option<u64>,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            ambient_seed_count: 30,
            ambient_interval_ms: 2000,
            ambient_ttl_ms: 12_000,
            scroll_threshold_px: 50.0,
            scroll_burst_count: 3,
            scroll_sparkle_ttl_ms: 1000,
            hit_delay_ms: 100,
            quiet_revert_ms: 800,
            alert_revert_ms: 600,
            hit_revert_ms: 600,
            shake_ms: 500,
            sound_enabled: true,
            log_level: "info".to_string(),
            rng_seed: None,
        }
    }
}

impl FxConfig {
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, FxError> {
        serde_json::from_str(json).map_err(|e| FxError::Config(e.to_string()))
    }

    /// Parsed `log_level`; unknown names fall back to `Info`.
    pub fn level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    pub(crate) fn rng(&self) -> fastrand::Rng {
        match self.rng_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_timings() {
        let cfg = FxConfig::default();
        assert_eq!(cfg.ambient_seed_count, 30);
        assert_eq!(cfg.ambient_interval_ms, 2000);
        assert_eq!(cfg.ambient_ttl_ms, 12_000);
        assert_eq!(cfg.hit_delay_ms, 100);
        assert!(cfg.sound_enabled);
        assert_eq!(cfg.level(), log::Level::Info);
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let cfg = FxConfig { log_level: "chatty".into(), ..FxConfig::default() };
        assert_eq!(cfg.level(), log::Level::Info);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_other_defaults() {
        let json = r#"{"scroll_burst_count": 5, "log_level": "debug"}"#;
        let cfg = FxConfig::from_json(json).unwrap();
        assert_eq!(cfg.scroll_burst_count, 5);
        assert_eq!(cfg.level(), log::Level::Debug);
        assert_eq!(cfg.ambient_ttl_ms, 12_000);
        assert!(cfg.sound_enabled);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn sound_can_be_switched_off() {
        let cfg = FxConfig::from_json(r#"{"sound_enabled": false}"#).unwrap();
        assert!(!cfg.sound_enabled);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn malformed_json_is_a_config_error() {
        let err = FxConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, FxError::Config(_)));
    }
}
