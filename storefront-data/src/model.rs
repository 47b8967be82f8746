//! Row types for the five retail tables.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// A store (dimension row)
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub id: String,
    pub location: String,
    pub region: String,
}

/// A product (dimension row)
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// Current stock of one product at one store
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub store_id: String,
    pub product_id: String,
    pub stock_level: u32,
    pub last_restock: NaiveDate,
}

/// One sale event.
///
/// `product_name` and `price` are denormalized copies of the product row
/// at the time of sale.
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub transaction_id: String,
    pub timestamp: NaiveDateTime,
    pub store_id: String,
    pub product_id: String,
    pub product_name: String,
    pub units_sold: u32,
    pub price: f64,
    pub total_revenue: f64,
}

/// Sentiment polarity of a feedback comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

impl Polarity {
    pub const ALL: [Polarity; 3] = [Polarity::Positive, Polarity::Neutral, Polarity::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Neutral => "neutral",
            Polarity::Negative => "negative",
        }
    }

    /// Half-open score band `[low, high)` for this polarity.
    ///
    /// Positive is closed at 1.0.
    pub fn score_band(&self) -> (f64, f64) {
        match self {
            Polarity::Negative => (0.0, 0.4),
            Polarity::Neutral => (0.4, 0.6),
            Polarity::Positive => (0.6, 1.0),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One customer feedback event
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub feedback_id: String,
    pub timestamp: NaiveDateTime,
    pub store_id: String,
    pub comment: String,
    pub sentiment: f64,
    pub polarity: Polarity,
}

/// The complete generated population, dimensions first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub stores: Vec<Store>,
    pub products: Vec<Product>,
    pub inventory: Vec<InventoryRow>,
    pub sales: Vec<Sale>,
    pub feedback: Vec<Feedback>,
}

impl Dataset {
    /// Row counts per table, in write order
    pub fn row_counts(&self) -> [(&'static str, usize); 5] {
        [
            ("stores", self.stores.len()),
            ("products", self.products.len()),
            ("inventory", self.inventory.len()),
            ("sales_data", self.sales.len()),
            ("customer_feedback", self.feedback.len()),
        ]
    }

    pub fn total_revenue(&self) -> f64 {
        self.sales.iter().map(|s| s.total_revenue).sum()
    }
}

/// Dimension rows loaded back from an existing database
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub stores: Vec<Store>,
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty() || self.products.is_empty()
    }
}

/// Round to whole cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
