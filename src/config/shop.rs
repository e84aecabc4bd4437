//! Shop session configuration.

use serde::{Deserialize, Serialize};

fn default_staff() -> usize {
    num_cpus::get().max(1)
}

/// Configuration for one shop session.
///
/// All bounds are fixed for the lifetime of the session: `customers` bounds
/// the order queue, `pigments` sizes the rack, and `request_arity` caps how
/// many tint slots a single order may carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Number of customer threads expected this session. Also the order
    /// queue capacity.
    pub customers: usize,
    /// Number of independently lockable pigments on the rack.
    pub pigments: usize,
    /// Maximum number of tint slots per order.
    pub request_arity: usize,
    /// Number of staff (fulfillment worker) threads.
    #[serde(default = "default_staff")]
    pub staff: usize,
}

impl ShopConfig {
    /// Create a configuration with the given bounds and a CPU-count default
    /// for the staff pool.
    #[must_use]
    pub fn new(customers: usize, pigments: usize, request_arity: usize) -> Self {
        Self {
            customers,
            pigments,
            request_arity,
            staff: default_staff(),
        }
    }

    /// Set the staff thread count.
    #[must_use]
    pub fn with_staff(mut self, staff: usize) -> Self {
        self.staff = staff;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first field that is out of range.
    pub fn validate(&self) -> Result<(), String> {
        if self.customers == 0 {
            return Err("customers must be greater than 0".into());
        }
        if self.pigments == 0 {
            return Err("pigments must be greater than 0".into());
        }
        if self.request_arity == 0 {
            return Err("request_arity must be greater than 0".into());
        }
        if self.staff == 0 {
            return Err("staff must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns a message describing the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_bounds() {
        assert!(ShopConfig::new(0, 3, 2).validate().is_err());
        assert!(ShopConfig::new(4, 0, 2).validate().is_err());
        assert!(ShopConfig::new(4, 3, 0).validate().is_err());
        assert!(ShopConfig::new(4, 3, 2).with_staff(0).validate().is_err());
        assert!(ShopConfig::new(4, 3, 2).validate().is_ok());
    }

    #[test]
    fn test_staff_defaults_to_cpu_count() {
        let cfg = ShopConfig::new(2, 2, 2);
        assert!(cfg.staff >= 1);
    }
}
