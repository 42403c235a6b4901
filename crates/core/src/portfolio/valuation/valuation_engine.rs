//! Point-in-time portfolio reconstruction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::assets::{Asset, TransactionType};
use crate::portfolio::holdings::calculate_portfolio;
use crate::portfolio::valuation::simulated_price::simulated_price;
use crate::portfolio::valuation::valuation_model::{PortfolioSnapshot, PositionSnapshot};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Reconstruct the portfolio as of `instant`.
///
/// Share counts and cost basis are folded from ledger rows dated on or
/// before `instant` with the weighted-average sell rule: each sell
/// scales the remaining basis by the unsold fraction. This differs on
/// purpose from the live holdings calculator, whose gross-average rule
/// never discounts the basis on a sell.
///
/// Prices at `instant` come from the deterministic simulation anchored
/// to each asset's current price and the portfolio's present-day
/// return, so `instant == now` reproduces current prices exactly.
pub fn snapshot_at(
    assets: &[Asset],
    instant: DateTime<Utc>,
    now: DateTime<Utc>,
) -> PortfolioSnapshot {
    let cutoff = instant.date_naive();
    let days_back = ((now - instant).num_seconds().max(0) as f64) / 86_400.0;

    // Today's realized return drives the simulated trend.
    let overall_gain = calculate_portfolio(assets).total_gain_loss_percentage;

    let mut snapshot = PortfolioSnapshot::empty(cutoff);

    for asset in assets {
        let (shares, basis) = fold_until(asset, cutoff);
        if shares <= Decimal::ZERO {
            continue;
        }

        let price = simulated_price(
            &asset.symbol,
            asset.category,
            asset.current_price,
            overall_gain,
            days_back,
        );
        let value = shares * price;

        snapshot.total_value += value;
        snapshot.total_investment += basis;
        snapshot.positions.push(PositionSnapshot {
            asset_id: asset.id.clone(),
            shares,
            value,
        });
    }

    snapshot.gain_loss_percentage = if snapshot.total_investment > Decimal::ZERO {
        (snapshot.total_value - snapshot.total_investment) / snapshot.total_investment * HUNDRED
    } else {
        Decimal::ZERO
    };

    snapshot
}

/// The `instant == now` snapshot, priced at genuine current prices.
pub fn snapshot_now(assets: &[Asset], now: DateTime<Utc>) -> PortfolioSnapshot {
    snapshot_at(assets, now, now)
}

/// Weighted-average fold of one ledger up to and including `cutoff`:
/// shares and remaining cost basis.
fn fold_until(asset: &Asset, cutoff: chrono::NaiveDate) -> (Decimal, Decimal) {
    let mut shares = Decimal::ZERO;
    let mut basis = Decimal::ZERO;

    for tx in asset.sorted_transactions() {
        if tx.date > cutoff {
            break;
        }
        match tx.kind {
            TransactionType::Buy => {
                shares += tx.amount;
                basis += tx.amount * tx.price;
            }
            TransactionType::Sell if shares > Decimal::ZERO => {
                let sell_ratio = (tx.amount / shares).min(Decimal::ONE);
                shares = (shares - tx.amount).max(Decimal::ZERO);
                basis *= Decimal::ONE - sell_ratio;
            }
            TransactionType::Sell => {}
        }
    }

    (shares, basis)
}
