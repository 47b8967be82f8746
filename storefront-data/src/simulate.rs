//! Live sales simulator.
//!
//! Draws sales against the catalog of an existing database. The caller
//! owns the clock and the connection; this type only produces rows and
//! delays.

use crate::generator::random_uuid;
use crate::model::{round_cents, Catalog, Sale};
use chrono::NaiveDateTime;
use rand::Rng;
use std::time::Duration;
use storefront_error::{Error, Result};

/// Units per simulated sale
pub const LIVE_UNITS: std::ops::RangeInclusive<u32> = 1..=5;

pub struct LiveSimulator<R: Rng> {
    catalog: Catalog,
    rng: R,
    produced: u64,
}

impl<R: Rng> LiveSimulator<R> {
    pub fn new(catalog: Catalog, rng: R) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::invalid_argument("simulator needs at least one store and one product")
                .with_operation("simulate::new"));
        }
        Ok(Self {
            catalog,
            rng,
            produced: 0,
        })
    }

    /// Draw the next sale, stamped `at`.
    pub fn next_sale(&mut self, at: NaiveDateTime) -> Sale {
        let store = &self.catalog.stores[self.rng.gen_range(0..self.catalog.stores.len())];
        let product = &self.catalog.products[self.rng.gen_range(0..self.catalog.products.len())];
        let units_sold = self.rng.gen_range(LIVE_UNITS);
        let transaction_id = random_uuid(&mut self.rng);
        self.produced += 1;

        Sale {
            transaction_id,
            timestamp: at,
            store_id: store.id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            units_sold,
            price: product.price,
            total_revenue: round_cents(f64::from(units_sold) * product.price),
        }
    }

    /// Jittered delay, uniform in `[interval / 2, interval * 1.5]`.
    pub fn next_delay(&mut self, interval: Duration) -> Duration {
        if interval.is_zero() {
            return interval;
        }
        let base = interval.as_secs_f64();
        Duration::try_from_secs_f64(self.rng.gen_range(base * 0.5..=base * 1.5)).unwrap_or(Duration::MAX)
    }

    pub fn produced(&self) -> u64 {
        self.produced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Product, Store};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use storefront_error::ErrorKind;

    fn catalog() -> Catalog {
        Catalog {
            stores: vec![Store {
                id: "STORE10".into(),
                location: "Omaha".into(),
                region: "Midwest".into(),
            }],
            products: vec![
                Product {
                    id: "PROD100".into(),
                    name: "Equate-Shampoo".into(),
                    category: "Health".into(),
                    price: 4.99,
                },
                Product {
                    id: "PROD101".into(),
                    name: "onn.-Mouse".into(),
                    category: "Electronics".into(),
                    price: 19.5,
                },
            ],
        }
    }

    #[test]
    fn test_next_sale_references_catalog() {
        let mut sim = LiveSimulator::new(catalog(), StdRng::seed_from_u64(3)).unwrap();
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        for _ in 0..50 {
            let sale = sim.next_sale(at);
            assert_eq!(sale.store_id, "STORE10");
            assert!(sale.product_id == "PROD100" || sale.product_id == "PROD101");
            assert!(LIVE_UNITS.contains(&sale.units_sold));
            assert_eq!(sale.total_revenue, round_cents(f64::from(sale.units_sold) * sale.price));
            assert_eq!(sale.timestamp, at);
        }
        assert_eq!(sim.produced(), 50);
    }

    #[test]
    fn test_next_delay_jitter_bounds() {
        let mut sim = LiveSimulator::new(catalog(), StdRng::seed_from_u64(8)).unwrap();
        let interval = Duration::from_secs(2);
        for _ in 0..100 {
            let delay = sim.next_delay(interval);
            assert!(delay >= Duration::from_secs(1) && delay <= Duration::from_secs(3));
        }
        assert_eq!(sim.next_delay(Duration::ZERO), Duration::ZERO);
        assert!(sim.next_delay(Duration::MAX) >= Duration::MAX / 2);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = LiveSimulator::new(Catalog::default(), StdRng::seed_from_u64(1))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
