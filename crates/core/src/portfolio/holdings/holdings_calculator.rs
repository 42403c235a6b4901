//! Holdings calculation.
//!
//! The position shown next to an asset in real time. The cost rule here
//! is the gross average: the average buy price is total purchase cost
//! over total shares ever bought, and selling does not move it. The
//! historical valuation engine deliberately uses a different
//! (weighted-average) rule; see `portfolio::valuation`.

use rust_decimal::Decimal;

use crate::assets::{Asset, TransactionType};
use crate::errors::ValidationError;
use crate::portfolio::holdings::holdings_model::{Holding, PortfolioTotals};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Fold one asset's ledger into its live holding.
pub fn calculate_holding(asset: &Asset) -> Holding {
    let mut total_shares = Decimal::ZERO;
    let mut total_bought = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    for tx in &asset.transactions {
        match tx.kind {
            TransactionType::Buy => {
                total_shares += tx.amount;
                total_bought += tx.amount;
                total_cost += tx.amount * tx.price;
            }
            TransactionType::Sell => {
                total_shares -= tx.amount;
            }
        }
    }

    // Oversold ledgers happen with imported data; clamp rather than
    // report a short position this engine does not model.
    total_shares = total_shares.max(Decimal::ZERO);

    let average_buy_price = if total_bought > Decimal::ZERO {
        total_cost / total_bought
    } else {
        Decimal::ZERO
    };

    let current_value = total_shares * asset.current_price;
    let remaining_cost_basis = total_shares * average_buy_price;
    let gain_loss = current_value - remaining_cost_basis;
    let gain_loss_percentage = if remaining_cost_basis > Decimal::ZERO {
        gain_loss / remaining_cost_basis * HUNDRED
    } else {
        Decimal::ZERO
    };

    Holding {
        asset_id: asset.id.clone(),
        symbol: asset.symbol.clone(),
        total_shares,
        average_buy_price,
        current_value,
        gain_loss,
        gain_loss_percentage,
    }
}

/// Aggregate every asset's holding into portfolio totals.
pub fn calculate_portfolio(assets: &[Asset]) -> PortfolioTotals {
    let mut totals = PortfolioTotals::zero();

    for asset in assets {
        let holding = calculate_holding(asset);
        totals.total_value += holding.current_value;
        totals.total_investment += holding.total_shares * holding.average_buy_price;
        totals.total_gain_loss += holding.gain_loss;
    }

    totals.total_gain_loss_percentage = if totals.total_investment > Decimal::ZERO {
        totals.total_gain_loss / totals.total_investment * HUNDRED
    } else {
        Decimal::ZERO
    };

    totals
}

/// Check a prospective sell against the shares currently held. The
/// ledger itself is untouched either way.
pub fn validate_sell(asset: &Asset, amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }

    let available = asset.shares_held();
    if amount > available {
        return Err(ValidationError::InsufficientShares {
            requested: amount,
            available,
        });
    }

    Ok(())
}
