//! Sample dataset generator
//!
//! Builds the Global Retail Sales fact table in memory from a fixed seed, so
//! every run (and every test) sees the identical dataset. Measures keep the
//! fact-record invariants: revenue = quantity × unit_price, profit =
//! revenue − cost, profit_margin = 100 × profit / revenue (0 when revenue
//! is 0).

use crate::table::Table;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const SEED: u64 = 42;

const REGIONS: &[(&str, &[&str])] = &[
    ("North America", &["United States", "Canada", "Mexico"]),
    ("Europe", &["Germany", "France", "United Kingdom", "Spain", "Italy"]),
    ("Asia Pacific", &["Japan", "Australia", "China", "India", "South Korea"]),
    ("Latin America", &["Brazil", "Argentina", "Colombia", "Chile"]),
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("Electronics", &["Laptops", "Smartphones", "Tablets", "Accessories", "Audio"]),
    ("Furniture", &["Chairs", "Desks", "Shelving", "Cabinets", "Lighting"]),
    ("Office Supplies", &["Paper", "Pens", "Notebooks", "Binders", "Organizers"]),
    ("Clothing", &["Shirts", "Pants", "Shoes", "Jackets", "Accessories"]),
];

const SEGMENTS: &[&str] = &["Consumer", "Corporate", "Home Office", "Small Business"];

const MONTH_NAMES: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn price_range(subcategory: &str) -> (f64, f64) {
    match subcategory {
        "Laptops" => (800.0, 2500.0),
        "Smartphones" => (400.0, 1200.0),
        "Tablets" => (300.0, 900.0),
        "Audio" => (50.0, 500.0),
        "Chairs" => (100.0, 800.0),
        "Desks" => (150.0, 1200.0),
        "Shelving" => (80.0, 400.0),
        "Cabinets" => (200.0, 900.0),
        "Lighting" => (30.0, 300.0),
        "Paper" => (5.0, 50.0),
        "Pens" => (5.0, 30.0),
        "Notebooks" => (5.0, 40.0),
        "Binders" => (5.0, 25.0),
        "Organizers" => (10.0, 60.0),
        "Shirts" => (20.0, 120.0),
        "Pants" => (30.0, 150.0),
        "Shoes" => (50.0, 300.0),
        "Jackets" => (60.0, 400.0),
        "Accessories" => (10.0, 150.0),
        _ => (10.0, 200.0),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Generate `rows` transactions with the default seed.
pub fn generate(rows: usize) -> Table {
    generate_seeded(rows, SEED)
}

/// Generate `rows` transactions from an explicit seed.
pub fn generate_seeded(rows: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut order_ids = Vec::with_capacity(rows);
    let mut order_dates = Vec::with_capacity(rows);
    let mut years = Vec::with_capacity(rows);
    let mut quarters = Vec::with_capacity(rows);
    let mut months = Vec::with_capacity(rows);
    let mut month_names = Vec::with_capacity(rows);
    let mut regions = Vec::with_capacity(rows);
    let mut countries = Vec::with_capacity(rows);
    let mut categories = Vec::with_capacity(rows);
    let mut subcategories = Vec::with_capacity(rows);
    let mut segments = Vec::with_capacity(rows);
    let mut quantities = Vec::with_capacity(rows);
    let mut unit_prices = Vec::with_capacity(rows);
    let mut revenues = Vec::with_capacity(rows);
    let mut costs = Vec::with_capacity(rows);
    let mut profits = Vec::with_capacity(rows);
    let mut margins = Vec::with_capacity(rows);

    for i in 0..rows {
        let year: i64 = rng.gen_range(2022..=2024);
        let month: i64 = rng.gen_range(1..=12);
        let day: i64 = rng.gen_range(1..=28);
        let (region, region_countries) = REGIONS[rng.gen_range(0..REGIONS.len())];
        let country = region_countries[rng.gen_range(0..region_countries.len())];
        let (category, subs) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let subcategory = subs[rng.gen_range(0..subs.len())];
        let segment = SEGMENTS[rng.gen_range(0..SEGMENTS.len())];

        let quantity: i64 = rng.gen_range(1..=20);
        let (low, high) = price_range(subcategory);
        let unit_price = round2(rng.gen_range(low..high));
        let revenue = round2(quantity as f64 * unit_price);
        let cost = round2(revenue * rng.gen_range(0.45..0.75));
        let profit = round2(revenue - cost);
        let margin = if revenue == 0.0 {
            0.0
        } else {
            round2(100.0 * profit / revenue)
        };

        order_ids.push(format!("ORD-{:05}", i + 1));
        order_dates.push(format!("{:04}-{:02}-{:02}", year, month, day));
        years.push(year);
        quarters.push(format!("Q{}", (month - 1) / 3 + 1));
        months.push(month);
        month_names.push(MONTH_NAMES[(month - 1) as usize].to_string());
        regions.push(region.to_string());
        countries.push(country.to_string());
        categories.push(category.to_string());
        subcategories.push(subcategory.to_string());
        segments.push(segment.to_string());
        quantities.push(quantity);
        unit_prices.push(unit_price);
        revenues.push(revenue);
        costs.push(cost);
        profits.push(profit);
        margins.push(margin);
    }

    Table::new(vec![
        ("order_id".to_string(), Arc::new(StringArray::from(order_ids)) as ArrayRef),
        ("order_date".to_string(), Arc::new(StringArray::from(order_dates)) as ArrayRef),
        ("year".to_string(), Arc::new(Int64Array::from(years)) as ArrayRef),
        ("quarter".to_string(), Arc::new(StringArray::from(quarters)) as ArrayRef),
        ("month".to_string(), Arc::new(Int64Array::from(months)) as ArrayRef),
        ("month_name".to_string(), Arc::new(StringArray::from(month_names)) as ArrayRef),
        ("region".to_string(), Arc::new(StringArray::from(regions)) as ArrayRef),
        ("country".to_string(), Arc::new(StringArray::from(countries)) as ArrayRef),
        ("category".to_string(), Arc::new(StringArray::from(categories)) as ArrayRef),
        ("subcategory".to_string(), Arc::new(StringArray::from(subcategories)) as ArrayRef),
        ("customer_segment".to_string(), Arc::new(StringArray::from(segments)) as ArrayRef),
        ("quantity".to_string(), Arc::new(Int64Array::from(quantities)) as ArrayRef),
        ("unit_price".to_string(), Arc::new(Float64Array::from(unit_prices)) as ArrayRef),
        ("revenue".to_string(), Arc::new(Float64Array::from(revenues)) as ArrayRef),
        ("cost".to_string(), Arc::new(Float64Array::from(costs)) as ArrayRef),
        ("profit".to_string(), Arc::new(Float64Array::from(profits)) as ArrayRef),
        ("profit_margin".to_string(), Arc::new(Float64Array::from(margins)) as ArrayRef),
    ])
}
