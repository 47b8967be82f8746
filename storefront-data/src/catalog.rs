//! Curated value pools for the generator.
//!
//! Product names are `brand-item` (or `brand-size-item` for electronics),
//! which caps the number of distinct products the generator can produce.

use crate::model::Polarity;
use rand::seq::SliceRandom;
use rand::Rng;

pub const BRANDS: &[&str] = &[
    "Great-Value",
    "Marketside",
    "Mainstays",
    "onn.",
    "Equate",
    "George",
    "Time-and-Tru",
];

pub const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Groceries",
        &["Milk", "Organic-Bananas", "Chicken-Breast", "Eggs", "Cereal", "Coffee", "Bread"],
    ),
    (
        "Electronics",
        &["4K-TV", "Wireless-Headphones", "Laptop", "Smartphone", "Webcam", "Mouse"],
    ),
    (
        "Home-Goods",
        &["Bath-Towel-Set", "Dinnerware", "Vacuum", "Air-Freshener", "Laundry-Detergent"],
    ),
    ("Apparel", &["Mens-T-Shirt", "Womens-Jeans", "Socks-6-Pack", "Hoodie"]),
    ("Health", &["Ibuprofen", "Toothpaste", "Body-Wash", "Shampoo"]),
];

pub const SCREEN_SIZES: &[&str] = &["15-inch", "50-inch", "65-inch"];

/// City and region for store locations.
pub const CITIES: &[(&str, &str)] = &[
    ("Bentonville", "South"),
    ("Little Rock", "South"),
    ("Dallas", "South"),
    ("Houston", "South"),
    ("Austin", "South"),
    ("Atlanta", "South"),
    ("Nashville", "South"),
    ("Miami", "South"),
    ("Charlotte", "South"),
    ("Chicago", "Midwest"),
    ("Columbus", "Midwest"),
    ("Indianapolis", "Midwest"),
    ("Milwaukee", "Midwest"),
    ("Kansas City", "Midwest"),
    ("Omaha", "Midwest"),
    ("Minneapolis", "Midwest"),
    ("Detroit", "Midwest"),
    ("Phoenix", "West"),
    ("Denver", "West"),
    ("Las Vegas", "West"),
    ("Sacramento", "West"),
    ("Portland", "West"),
    ("Seattle", "West"),
    ("Salt Lake City", "West"),
    ("Albuquerque", "West"),
    ("Boston", "Northeast"),
    ("Philadelphia", "Northeast"),
    ("Pittsburgh", "Northeast"),
    ("Buffalo", "Northeast"),
    ("Hartford", "Northeast"),
    ("Newark", "Northeast"),
    ("Providence", "Northeast"),
];

const POSITIVE_WORDS: &[&str] = &["love", "enjoy", "appreciate", "like", "value"];
const POSITIVE_PRAISE: &[&str] = &["excellent", "great", "fast", "amazing", "friendly"];
const NEUTRAL_WORDS: &[&str] = &["okay", "average", "fine", "as expected", "a bit busy"];
const NEGATIVE_WORDS: &[&str] = &["bad", "slow", "disappointing", "broken", "poor", "terrible"];

/// Number of distinct product names the catalog can produce.
pub fn product_name_capacity() -> usize {
    CATEGORIES
        .iter()
        .map(|(category, items)| {
            let variants = if *category == "Electronics" {
                SCREEN_SIZES.len()
            } else {
                1
            };
            items.len() * variants * BRANDS.len()
        })
        .sum()
}

/// Draw a `(category, name)` pair. Names may repeat; the generator dedups.
pub fn random_product<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, String) {
    let idx = rng.gen_range(0..CATEGORIES.len());
    let (category, items) = CATEGORIES[idx];
    let item = items[rng.gen_range(0..items.len())];
    let brand = BRANDS[rng.gen_range(0..BRANDS.len())];

    let name = if category == "Electronics" {
        let size = SCREEN_SIZES[rng.gen_range(0..SCREEN_SIZES.len())];
        format!("{}-{}-{}", brand, size, item)
    } else {
        format!("{}-{}", brand, item)
    };
    (category, name)
}

/// Draw a city and its region.
pub fn random_city<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, &'static str) {
    CITIES[rng.gen_range(0..CITIES.len())]
}

/// Render a feedback comment of the given polarity about a store's city.
pub fn feedback_comment<R: Rng + ?Sized>(rng: &mut R, polarity: Polarity, city: &str) -> String {
    match polarity {
        Polarity::Positive => format!(
            "I {} the service at the {} store. The staff was {} and very helpful.",
            pick(rng, POSITIVE_WORDS),
            city,
            pick(rng, POSITIVE_PRAISE)
        ),
        Polarity::Neutral => format!(
            "Shopping at the {} store was {}. Found most of what I needed.",
            city,
            pick(rng, NEUTRAL_WORDS)
        ),
        Polarity::Negative => format!(
            "The product I bought was {}. The checkout process at the {} store was too {}.",
            pick(rng, NEGATIVE_WORDS),
            city,
            pick(rng, NEGATIVE_WORDS)
        ),
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}
