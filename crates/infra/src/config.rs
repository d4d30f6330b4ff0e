//! Service configuration.

use serde::Deserialize;

use bloomshop_catalog::CourierCommissionPolicy;

pub const ENV_COURIER_COMMISSION: &str = "BLOOMSHOP_COURIER_COMMISSION";
pub const ENV_MAX_CONFLICT_RETRIES: &str = "BLOOMSHOP_MAX_CONFLICT_RETRIES";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub courier_commission: CourierCommissionPolicy,
    /// Re-runs of a mutating operation after a concurrency conflict.
    pub max_conflict_retries: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            courier_commission: CourierCommissionPolicy::default(),
            max_conflict_retries: 3,
        }
    }
}

impl ShopConfig {
    /// Read configuration from the process environment.
    ///
    /// Unset variables keep their default; unparsable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_COURIER_COMMISSION) {
            match raw.trim() {
                "per_line_item" => config.courier_commission = CourierCommissionPolicy::PerLineItem,
                "legacy_first_rate" => {
                    config.courier_commission = CourierCommissionPolicy::LegacyFirstRate
                }
                other => tracing::warn!(
                    variable = ENV_COURIER_COMMISSION,
                    value = other,
                    "unknown courier commission policy, using per_line_item"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_CONFLICT_RETRIES) {
            match raw.trim().parse::<u32>() {
                Ok(n) => config.max_conflict_retries = n,
                Err(e) => tracing::warn!(
                    variable = ENV_MAX_CONFLICT_RETRIES,
                    value = %raw,
                    error = %e,
                    "invalid retry count, using default"
                ),
            }
        }

        config
    }
}
