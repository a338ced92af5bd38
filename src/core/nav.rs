//! NAV based revaluation of fund-like investments.

use crate::core::error::PriceUnavailable;
use crate::core::models::Investment;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

/// Source of per-unit prices for a scheme.
///
/// Errors mean "no price"; callers skip the record rather than fail.
#[async_trait]
pub trait NavProvider: Send + Sync {
    async fn latest_price(&self, scheme_code: &str) -> Result<f64>;
    async fn price_on_date(&self, scheme_code: &str, date: NaiveDate) -> Result<f64>;
}

/// Units bought for `invested` at `price_at_purchase`, or 0 when the price
/// cannot be used.
pub fn compute_units(invested: f64, price_at_purchase: f64) -> f64 {
    if price_at_purchase > 0.0 && price_at_purchase.is_finite() {
        invested / price_at_purchase
    } else {
        0.0
    }
}

pub fn compute_current_value(units: f64, latest_price: f64) -> f64 {
    units * latest_price
}

fn unavailable(scheme_code: &str, reason: impl ToString) -> PriceUnavailable {
    PriceUnavailable {
        scheme_code: scheme_code.to_string(),
        reason: reason.to_string(),
    }
}

/// Revalues one investment at the latest NAV.
///
/// When no units are recorded they are derived from the NAV on the purchase
/// date first. On any failed lookup the caller keeps the original record.
pub async fn refresh_one(
    investment: &Investment,
    provider: &(dyn NavProvider + Send + Sync),
) -> Result<Investment, PriceUnavailable> {
    let scheme_code = investment
        .scheme_code()
        .ok_or_else(|| unavailable("", format!("{} has no scheme code", investment.name)))?;

    let units = match investment.held_units() {
        Some(units) => units,
        None => {
            let purchased = NaiveDate::parse_from_str(&investment.date, "%Y-%m-%d")
                .map_err(|e| {
                    unavailable(
                        scheme_code,
                        format!("purchase date '{}' is not usable: {e}", investment.date),
                    )
                })?;
            let price = provider
                .price_on_date(scheme_code, purchased)
                .await
                .map_err(|e| unavailable(scheme_code, e))?;
            let units = compute_units(investment.invested, price);
            if units <= 0.0 {
                return Err(unavailable(
                    scheme_code,
                    format!("cannot derive units from NAV {price} on {purchased}"),
                ));
            }
            debug!("Derived {units:.4} units for {scheme_code} from NAV {price} on {purchased}");
            units
        }
    };

    let latest = provider
        .latest_price(scheme_code)
        .await
        .map_err(|e| unavailable(scheme_code, e))?;

    let mut refreshed = investment.clone();
    refreshed.units = Some(units);
    refreshed.current = compute_current_value(units, latest);
    debug!(
        "Refreshed {} ({scheme_code}): {} -> {}",
        investment.name, investment.current, refreshed.current
    );
    Ok(refreshed)
}
