//! Catalog seeding command.
//!
//! Inserts a handful of sample products for local development.

use rust_decimal::Decimal;
use tracing::info;

use super::{CommandError, connect};

struct SeedProduct {
    title: &'static str,
    price_cents: i64,
    image_url: &'static str,
    category: &'static str,
    on_sale: bool,
}

const SAMPLE_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        title: "Handwoven Tote Bag",
        price_cents: 3499,
        image_url: "/images/tote-bag.jpg",
        category: "accessories",
        on_sale: false,
    },
    SeedProduct {
        title: "Ceramic Espresso Cup",
        price_cents: 1250,
        image_url: "/images/espresso-cup.jpg",
        category: "kitchen",
        on_sale: true,
    },
    SeedProduct {
        title: "Olive Wood Cutting Board",
        price_cents: 4800,
        image_url: "/images/cutting-board.jpg",
        category: "kitchen",
        on_sale: false,
    },
    SeedProduct {
        title: "Linen Table Runner",
        price_cents: 2999,
        image_url: "/images/table-runner.jpg",
        category: "home",
        on_sale: false,
    },
    SeedProduct {
        title: "Beeswax Candle Set",
        price_cents: 1899,
        image_url: "/images/candle-set.jpg",
        category: "home",
        on_sale: true,
    },
];

/// Seed the catalog with sample products.
///
/// # Arguments
///
/// * `skip_existing` - Skip seeding when the products table is not empty
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run(skip_existing: bool) -> Result<(), CommandError> {
    info!("Connecting to storefront database...");
    let pool = connect().await?;

    if skip_existing {
        let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM products")
            .fetch_one(&pool)
            .await?;
        if count > 0 {
            info!(count, "Products already present, skipping seed");
            return Ok(());
        }
    }

    for product in SAMPLE_PRODUCTS {
        sqlx::query(
            r"
            INSERT INTO products (title, price, image_url, category, on_sale)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product.title)
        .bind(Decimal::new(product.price_cents, 2))
        .bind(product.image_url)
        .bind(product.category)
        .bind(product.on_sale)
        .execute(&pool)
        .await?;
    }

    info!(inserted = SAMPLE_PRODUCTS.len(), "Seeding complete!");
    Ok(())
}
