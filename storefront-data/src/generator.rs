//! Dataset generation.
//!
//! Dimensions are generated before facts, and every fact row draws its
//! references from the already-generated dimension rows, so integrity holds
//! by construction. [`Dataset::verify_integrity`] re-checks it before a
//! dataset is written.

use crate::catalog;
use crate::config::{GeneratorConfig, Window};
use crate::model::{round_cents, Dataset, Feedback, InventoryRow, Polarity, Product, Sale, Store};
use chrono::{Duration, NaiveDateTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::collections::HashSet;
use storefront_error::{Error, Result};
use tracing::{debug, info};

impl Dataset {
    /// Generate a dataset, seeding the RNG from `config.seed` when present.
    pub fn generate(config: &GeneratorConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        config.validate()?;
        let window = config.window()?;
        Self::generate_with_rng(config, window, &mut rng)
    }

    /// Generate a dataset inside `window` from the given random source.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        config: &GeneratorConfig,
        window: Window,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;

        info!(
            stores = config.stores,
            products = config.products,
            sales = config.sales,
            feedback = config.feedback,
            start = %window.start,
            end = %window.end,
            "generating dataset"
        );

        let stores = generate_stores(config, rng);
        let products = generate_products(config, rng);
        debug!(stores = stores.len(), products = products.len(), "dimensions ready");

        let inventory = generate_inventory(config, window, &stores, &products, rng);
        let sales = generate_sales(config, window, &stores, &products, rng)?;
        let feedback = generate_feedback(config, window, &stores, rng)?;

        let dataset = Self {
            stores,
            products,
            inventory,
            sales,
            feedback,
        };
        dataset.verify_integrity()?;
        Ok(dataset)
    }

    /// Check every fact row against the dimension rows.
    ///
    /// Inventory must hold exactly one row per (store, product) pair.
    pub fn verify_integrity(&self) -> Result<()> {
        let op = "generator::verify_integrity";
        let store_ids: HashSet<&str> = self.stores.iter().map(|s| s.id.as_str()).collect();
        let product_ids: HashSet<&str> = self.products.iter().map(|p| p.id.as_str()).collect();

        if store_ids.len() != self.stores.len() {
            return Err(Error::integrity_violation("stores", "duplicate StoreID").with_operation(op));
        }
        if product_ids.len() != self.products.len() {
            return Err(Error::integrity_violation("products", "duplicate ProductID").with_operation(op));
        }

        let mut pairs = HashSet::with_capacity(self.inventory.len());
        for row in &self.inventory {
            if !store_ids.contains(row.store_id.as_str()) {
                return Err(Error::integrity_violation("inventory", &row.store_id).with_operation(op));
            }
            if !product_ids.contains(row.product_id.as_str()) {
                return Err(Error::integrity_violation("inventory", &row.product_id).with_operation(op));
            }
            if !pairs.insert((row.store_id.as_str(), row.product_id.as_str())) {
                return Err(Error::integrity_violation(
                    "inventory",
                    format!("duplicate pair {}/{}", row.store_id, row.product_id),
                )
                .with_operation(op));
            }
        }
        let expected = self.stores.len() * self.products.len();
        if pairs.len() != expected {
            return Err(Error::integrity_violation(
                "inventory",
                format!("{} of {} store/product pairs", pairs.len(), expected),
            )
            .with_operation(op));
        }

        for sale in &self.sales {
            if !store_ids.contains(sale.store_id.as_str()) {
                return Err(Error::integrity_violation("sales_data", &sale.store_id).with_operation(op));
            }
            if !product_ids.contains(sale.product_id.as_str()) {
                return Err(Error::integrity_violation("sales_data", &sale.product_id).with_operation(op));
            }
        }

        for feedback in &self.feedback {
            if !store_ids.contains(feedback.store_id.as_str()) {
                return Err(
                    Error::integrity_violation("customer_feedback", &feedback.store_id).with_operation(op),
                );
            }
        }

        Ok(())
    }
}

fn generate_stores<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Vec<Store> {
    (0..config.stores)
        .map(|i| {
            let (city, region) = catalog::random_city(rng);
            Store {
                id: format!("STORE{}", 10 + i),
                location: city.to_string(),
                region: region.to_string(),
            }
        })
        .collect()
}

fn generate_products<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Vec<Product> {
    let mut names = HashSet::with_capacity(config.products);
    let mut products = Vec::with_capacity(config.products);

    // validate() bounds products by the catalog capacity, so this terminates
    while products.len() < config.products {
        let (category, name) = catalog::random_product(rng);
        if !names.insert(name.clone()) {
            continue;
        }
        products.push(Product {
            id: format!("PROD{}", 100 + products.len()),
            name,
            category: category.to_string(),
            price: round_cents(rng.gen_range(config.price_min..=config.price_max)),
        });
    }
    products
}

fn generate_inventory<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    window: Window,
    stores: &[Store],
    products: &[Product],
    rng: &mut R,
) -> Vec<InventoryRow> {
    let mut rows = Vec::with_capacity(stores.len() * products.len());
    for product in products {
        for store in stores {
            let stock_level = if config.max_stock == 0 || rng.gen_bool(config.out_of_stock_rate) {
                0
            } else {
                rng.gen_range(1..=config.max_stock)
            };
            rows.push(InventoryRow {
                store_id: store.id.clone(),
                product_id: product.id.clone(),
                stock_level,
                last_restock: random_timestamp(window, rng).date(),
            });
        }
    }
    rows
}

fn generate_sales<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    window: Window,
    stores: &[Store],
    products: &[Product],
    rng: &mut R,
) -> Result<Vec<Sale>> {
    let mut sales = Vec::with_capacity(config.sales);
    for _ in 0..config.sales {
        let store = stores
            .choose(rng)
            .ok_or_else(|| Error::integrity_violation("sales_data", "any store"))?;
        let product = products
            .choose(rng)
            .ok_or_else(|| Error::integrity_violation("sales_data", "any product"))?;
        let units_sold = rng.gen_range(config.units_min..=config.units_max);
        let noise = if config.price_noise > 0.0 {
            rng.gen_range(-config.price_noise..=config.price_noise)
        } else {
            0.0
        };

        sales.push(Sale {
            transaction_id: random_uuid(rng),
            timestamp: random_timestamp(window, rng),
            store_id: store.id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            units_sold,
            price: product.price,
            total_revenue: round_cents(f64::from(units_sold) * product.price * (1.0 + noise)),
        });
    }
    Ok(sales)
}

fn generate_feedback<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    window: Window,
    stores: &[Store],
    rng: &mut R,
) -> Result<Vec<Feedback>> {
    if config.feedback == 0 {
        return Ok(Vec::new());
    }

    let weights = WeightedIndex::new(config.polarity_weights.as_array()).map_err(|e| {
        Error::config_invalid(format!("bad polarity weights: {}", e))
            .with_operation("generator::feedback")
    })?;

    let mut rows = Vec::with_capacity(config.feedback);
    for _ in 0..config.feedback {
        let store = stores
            .choose(rng)
            .ok_or_else(|| Error::integrity_violation("customer_feedback", "any store"))?;
        let polarity = Polarity::ALL[weights.sample(rng)];
        rows.push(Feedback {
            feedback_id: random_uuid(rng),
            timestamp: random_timestamp(window, rng),
            store_id: store.id.clone(),
            comment: catalog::feedback_comment(rng, polarity, &store.location),
            sentiment: sentiment_score(polarity, rng),
            polarity,
        });
    }
    Ok(rows)
}

/// Score uniform in the polarity's band, rounded to cents without leaving it.
fn sentiment_score<R: Rng + ?Sized>(polarity: Polarity, rng: &mut R) -> f64 {
    let (low, high) = polarity.score_band();
    match polarity {
        Polarity::Positive => round_cents(rng.gen_range(low..=high)),
        _ => round_cents(rng.gen_range(low..high)).min(high - 0.01),
    }
}

/// Uniform second-resolution timestamp in `[window.start, window.end)`
pub(crate) fn random_timestamp<R: Rng + ?Sized>(window: Window, rng: &mut R) -> NaiveDateTime {
    window.start + Duration::seconds(rng.gen_range(0..window.span_seconds()))
}

/// UUID drawn from the generator's RNG, so seeded runs reproduce identifiers
pub(crate) fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}
