//! Generator configuration.
//!
//! Every knob of the generator lives here and is passed in explicitly.
//! The struct deserializes from the `[generator]` section of the TOML
//! config; missing fields fall back to the defaults below.

use crate::catalog;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use storefront_error::{Error, Result};

/// Row counts, value ranges and the historical window for one generation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of stores. Defaults to 20.
    pub stores: usize,

    /// Number of products. Bounded by the unique-name catalog. Defaults to 100.
    pub products: usize,

    /// Number of sale events. Defaults to 10000.
    pub sales: usize,

    /// Number of feedback events. Defaults to 500.
    pub feedback: usize,

    /// Length of the trailing window in days. Defaults to 90.
    pub history_days: u32,

    /// Last day (inclusive) of the window.
    ///
    /// When unset the current UTC date is used, so two runs with the same
    /// seed on the same day produce the same database.
    pub end_date: Option<NaiveDate>,

    /// Seed for the random source. `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Lowest product price. Defaults to 5.00.
    pub price_min: f64,

    /// Highest product price. Defaults to 500.00.
    pub price_max: f64,

    /// Fewest units in one sale. Defaults to 1.
    pub units_min: u32,

    /// Most units in one sale. Defaults to 10.
    pub units_max: u32,

    /// Highest stock level for an in-stock inventory row. Defaults to 500.
    pub max_stock: u32,

    /// Probability that an inventory row is out of stock. Defaults to 0.2.
    pub out_of_stock_rate: f64,

    /// Half-width of the multiplicative revenue noise.
    ///
    /// Revenue is `units * price * (1 + u)` with `u` uniform in
    /// `[-price_noise, +price_noise]`. Defaults to 0.0 (exact revenue).
    pub price_noise: f64,

    /// Relative weights of feedback polarities.
    pub polarity_weights: PolarityWeights,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            stores: 20,
            products: 100,
            sales: 10_000,
            feedback: 500,
            history_days: 90,
            end_date: None,
            seed: None,
            price_min: 5.0,
            price_max: 500.0,
            units_min: 1,
            units_max: 10,
            max_stock: 500,
            out_of_stock_rate: 0.2,
            price_noise: 0.0,
            polarity_weights: PolarityWeights::default(),
        }
    }
}

/// Relative weights for positive / neutral / negative feedback.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PolarityWeights {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl Default for PolarityWeights {
    fn default() -> Self {
        Self {
            positive: 0.55,
            neutral: 0.15,
            negative: 0.30,
        }
    }
}

impl PolarityWeights {
    pub fn as_array(&self) -> [f64; 3] {
        [self.positive, self.neutral, self.negative]
    }
}

/// Longest history a dataset may span (about a century)
pub const MAX_HISTORY_DAYS: u32 = 36_500;

/// Half-open time window `[start, end)` for generated timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    /// Window of `days` whole days ending after `last_day`, or `None` when
    /// either bound falls outside the calendar.
    pub fn ending_on(last_day: NaiveDate, days: u32) -> Option<Self> {
        let end = last_day
            .and_time(NaiveTime::default())
            .checked_add_signed(Duration::days(1))?;
        let start = end.checked_sub_signed(Duration::days(i64::from(days)))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts < self.end
    }

    pub fn span_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

impl GeneratorConfig {
    /// Resolve the generation window (today's UTC date if `end_date` is unset).
    pub fn window(&self) -> Result<Window> {
        let last_day = self.end_date.unwrap_or_else(|| Utc::now().date_naive());
        Window::ending_on(last_day, self.history_days).ok_or_else(|| {
            Error::config_invalid(format!(
                "{} days ending {} fall outside the calendar",
                self.history_days, last_day
            ))
            .with_operation("generator::window")
        })
    }

    /// Reject configurations that cannot produce a consistent dataset.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::config_invalid(msg).with_operation("generator::validate"));

        if self.sales > 0 && (self.stores == 0 || self.products == 0) {
            return invalid(format!(
                "{} sales need at least one store and one product (stores={}, products={})",
                self.sales, self.stores, self.products
            ));
        }
        if self.feedback > 0 && self.stores == 0 {
            return invalid(format!("{} feedback records need at least one store", self.feedback));
        }
        let capacity = catalog::product_name_capacity();
        if self.products > capacity {
            return invalid(format!(
                "{} products requested but only {} unique product names exist",
                self.products, capacity
            ));
        }
        if self.history_days == 0 || self.history_days > MAX_HISTORY_DAYS {
            return invalid(format!(
                "history_days {} outside 1..={}",
                self.history_days, MAX_HISTORY_DAYS
            ));
        }
        if !(self.price_min > 0.0 && self.price_min <= self.price_max) {
            return invalid(format!(
                "price range {}..{} is empty or non-positive",
                self.price_min, self.price_max
            ));
        }
        if self.units_min == 0 || self.units_min > self.units_max {
            return invalid(format!(
                "units range {}..={} must be non-empty and start at 1 or more",
                self.units_min, self.units_max
            ));
        }
        if !(0.0..=1.0).contains(&self.out_of_stock_rate) {
            return invalid(format!("out_of_stock_rate {} outside [0, 1]", self.out_of_stock_rate));
        }
        if !(0.0..1.0).contains(&self.price_noise) {
            return invalid(format!("price_noise {} outside [0, 1)", self.price_noise));
        }
        let weights = self.polarity_weights.as_array();
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) || weights.iter().sum::<f64>() <= 0.0 {
            return invalid("polarity weights must be non-negative with a positive sum".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_error::ErrorKind;

    #[test]
    fn test_default_is_valid() {
        GeneratorConfig::default().validate().unwrap();
    }

    #[test]
    fn test_sales_without_products_rejected() {
        let config = GeneratorConfig {
            products: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.message().contains("product"));
    }

    #[test]
    fn test_empty_dimensions_allowed_without_facts() {
        let config = GeneratorConfig {
            stores: 0,
            products: 0,
            sales: 0,
            feedback: 0,
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_too_many_products_rejected() {
        let config = GeneratorConfig {
            products: catalog::product_name_capacity() + 1,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_bad_ranges_rejected() {
        let units = GeneratorConfig {
            units_min: 5,
            units_max: 2,
            ..Default::default()
        };
        assert!(units.validate().is_err());

        let noise = GeneratorConfig {
            price_noise: 1.5,
            ..Default::default()
        };
        assert!(noise.validate().is_err());

        let weights = GeneratorConfig {
            polarity_weights: PolarityWeights {
                positive: 0.0,
                neutral: 0.0,
                negative: 0.0,
            },
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_window_bounds() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let window = Window::ending_on(day, 90).unwrap();
        assert_eq!(window.end.to_string(), "2024-04-01 00:00:00");
        assert_eq!(window.span_seconds(), 90 * 86_400);
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_history_days_bounded() {
        let config = GeneratorConfig {
            history_days: 100_000_000,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.message().contains("history_days"));

        let err = config.window().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let config = GeneratorConfig {
            history_days: MAX_HISTORY_DAYS,
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            ..Default::default()
        };
        config.validate().unwrap();
        assert_eq!(config.window().unwrap().span_seconds(), i64::from(MAX_HISTORY_DAYS) * 86_400);
    }

    #[test]
    fn test_last_calendar_day_has_no_window() {
        assert!(Window::ending_on(NaiveDate::MAX, 1).is_none());
        let config = GeneratorConfig {
            end_date: Some(NaiveDate::MAX),
            ..Default::default()
        };
        assert_eq!(config.window().unwrap_err().kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GeneratorConfig = toml::from_str(
            r#"
            stores = 5
            seed = 7
            end_date = "2024-06-30"

            [polarity_weights]
            negative = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.stores, 5);
        assert_eq!(config.products, 100);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(config.polarity_weights.negative, 0.9);
        assert_eq!(config.polarity_weights.positive, 0.55);
    }
}
