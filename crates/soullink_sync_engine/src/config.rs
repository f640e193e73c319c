//! Configuration for the sync engine and the vitals link.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the save-data record holding the shared inventory.
pub const DEFAULT_RECORD_NAME: &str = "soullink_shared_inventory";

/// Timing and persistence settings for inventory sync.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Minimum interval between accepted captures from the same client.
    pub debounce: Duration,
    /// How often (in ticks) the backstop scan runs.
    pub scan_interval_ticks: u64,
    /// How often (in ticks) a dirty state is saved.
    pub save_interval_ticks: u64,
    /// Ticks to wait after a container closes before syncing that client.
    pub container_close_delay_ticks: u32,
    /// Save-data record name.
    pub record_name: String,
}

impl SyncConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            debounce: Duration::from_millis(150),
            scan_interval_ticks: 10,
            save_interval_ticks: 200,
            container_close_delay_ticks: 5,
            record_name: DEFAULT_RECORD_NAME.to_string(),
        }
    }

    /// Sets the debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the backstop scan interval.
    pub fn with_scan_interval(mut self, ticks: u64) -> Self {
        self.scan_interval_ticks = ticks;
        self
    }

    /// Sets the periodic save interval.
    pub fn with_save_interval(mut self, ticks: u64) -> Self {
        self.save_interval_ticks = ticks;
        self
    }

    /// Sets the post-container-close delay.
    pub fn with_container_close_delay(mut self, ticks: u32) -> Self {
        self.container_close_delay_ticks = ticks;
        self
    }

    /// Sets the save-data record name.
    pub fn with_record_name(mut self, name: impl Into<String>) -> Self {
        self.record_name = name.into();
        self
    }

    /// Checks that the tick intervals are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] for a zero scan or save interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval("scan_interval_ticks"));
        }
        if self.save_interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval("save_interval_ticks"));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Feature toggles and multipliers, as an operator would set them.
///
/// Deserializes from a partial document: every missing field takes its
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Minimum number of connected players for vitals linking to activate.
    pub min_players_for_link: u32,
    /// Notify players when a link event reaches them.
    pub show_link_messages: bool,
    /// Ignore damage caused by a player whose own damage is being linked.
    pub prevent_pvp_loop: bool,

    /// Link damage between players.
    pub link_damage: bool,
    /// Multiplier for linked damage.
    pub damage_multiplier: f64,
    /// Kill every linked player when one dies.
    pub share_death: bool,

    /// Link healing between players.
    pub link_healing: bool,
    /// Multiplier for linked healing.
    pub healing_multiplier: f64,

    /// Link knockback between players.
    pub link_knockback: bool,
    /// Multiplier for linked knockback.
    pub knockback_multiplier: f64,

    /// Link food level between players.
    pub link_hunger: bool,
    /// Link saturation between players.
    pub link_saturation: bool,
    /// Multiplier for linked hunger changes.
    pub hunger_multiplier: f64,

    /// Share one inventory between all players.
    pub link_inventory: bool,
    /// Restore the shared inventory after a player respawns.
    pub keep_inventory_on_death: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            min_players_for_link: 2,
            show_link_messages: false,
            prevent_pvp_loop: true,
            link_damage: true,
            damage_multiplier: 1.0,
            share_death: false,
            link_healing: true,
            healing_multiplier: 1.0,
            link_knockback: true,
            knockback_multiplier: 1.0,
            link_hunger: true,
            link_saturation: true,
            hunger_multiplier: 1.0,
            link_inventory: true,
            keep_inventory_on_death: true,
        }
    }
}

impl LinkConfig {
    /// Checks every numeric setting against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::OutOfRange`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "min_players_for_link",
            f64::from(self.min_players_for_link),
            1.0,
            100.0,
        )?;
        check_range("damage_multiplier", self.damage_multiplier, 0.0, 10.0)?;
        check_range("healing_multiplier", self.healing_multiplier, 0.0, 10.0)?;
        check_range("knockback_multiplier", self.knockback_multiplier, 0.0, 5.0)?;
        check_range("hunger_multiplier", self.hunger_multiplier, 0.0, 10.0)?;
        Ok(())
    }

    /// Disables every vitals feature, leaving inventory settings alone.
    #[must_use]
    pub fn without_vitals(mut self) -> Self {
        self.link_damage = false;
        self.link_healing = false;
        self.link_knockback = false;
        self.link_hunger = false;
        self.link_saturation = false;
        self.share_death = false;
        self
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    // NaN fails both comparisons, so test for containment.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_config_builder() {
        let config = SyncConfig::new()
            .with_debounce(Duration::from_millis(50))
            .with_scan_interval(1)
            .with_save_interval(20)
            .with_container_close_delay(0)
            .with_record_name("test_inventory");

        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.scan_interval_ticks, 1);
        assert_eq!(config.save_interval_ticks, 20);
        assert_eq!(config.container_close_delay_ticks, 0);
        assert_eq!(config.record_name, "test_inventory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sync_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(150));
        assert_eq!(config.save_interval_ticks, 200);
        assert_eq!(config.record_name, DEFAULT_RECORD_NAME);
    }

    #[test]
    fn zero_intervals_rejected() {
        let config = SyncConfig::new().with_scan_interval(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval("scan_interval_ticks"))
        );
    }

    #[test]
    fn link_config_partial_json() {
        let config: LinkConfig =
            serde_json::from_str(r#"{ "link_damage": false, "damage_multiplier": 2.5 }"#).unwrap();
        assert!(!config.link_damage);
        assert_eq!(config.damage_multiplier, 2.5);
        assert!(config.link_inventory);
        assert_eq!(config.min_players_for_link, 2);
    }

    #[test]
    fn link_config_range_checks() {
        assert!(LinkConfig::default().validate().is_ok());

        let config = LinkConfig {
            knockback_multiplier: 6.0,
            ..LinkConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "knockback_multiplier",
                ..
            })
        ));

        let config = LinkConfig {
            hunger_multiplier: f64::NAN,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LinkConfig {
            min_players_for_link: 0,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn without_vitals_keeps_inventory() {
        let config = LinkConfig::default().without_vitals();
        assert!(!config.link_damage);
        assert!(!config.link_hunger);
        assert!(config.link_inventory);
    }
}
