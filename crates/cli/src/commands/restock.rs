//! One-off restock sweep.

use online_shopping_api::db::ProductRepository;
use online_shopping_api::models::RestockReport;
use online_shopping_api::models::product::RestockRequest;

/// Restock every product below the threshold.
///
/// Unset arguments fall back to `SHOP_RESTOCK_LOW_LEVEL` and
/// `SHOP_RESTOCK_AMOUNT`.
///
/// # Errors
///
/// Returns an error if the arguments are out of range or the update fails.
pub async fn run(
    low_level: Option<i32>,
    amount: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, pool) = super::connect().await?;

    let restock = RestockRequest {
        low_level,
        restock_amount: amount,
    }
    .validate(config.restock)
    .map_err(|e| e.summary())?;

    let restocked = ProductRepository::new(&pool).restock(restock).await?;
    let report = RestockReport::new(restocked);

    tracing::info!(
        low_level = restock.low_level,
        amount = restock.amount,
        "{}",
        report.message
    );
    for product in &report.products {
        tracing::info!(
            product_id = %product.product_id,
            stock_level = product.stock_level,
            "Restocked"
        );
    }

    Ok(())
}
