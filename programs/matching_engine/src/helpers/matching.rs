use crate::errors::EngineError;
use crate::state::{FillEvent, UserAccount};
use anchor_lang::prelude::*;

#[derive(Debug, Default)]
pub struct MatchResult {
    /// Base lots the taker traded
    pub filled_base_lots: i64,
    /// Sum of |base * price| over all fills
    pub quote_volume: i64,
    pub fills: Vec<FillEvent>,
}

/// Matches a taker against the open orders of `makers`, in the order given.
///
/// There is no price check: every active maker order on the opposite side
/// trades at its own price until `max_base_lots` is exhausted. A bid buys
/// base and pays quote, an ask does the reverse, and the maker takes the
/// other side of each fill.
pub fn match_orders(
    taker: &mut UserAccount,
    makers: &mut [UserAccount],
    max_base_lots: i64,
    side_is_bid: bool,
) -> Result<MatchResult> {
    let mut result = MatchResult::default();
    let mut remaining_base_lots = max_base_lots;

    for maker in makers.iter_mut() {
        if remaining_base_lots <= 0 {
            break;
        }

        for index in 0..maker.open_orders.len() {
            if remaining_base_lots <= 0 {
                break;
            }
            let order = maker.open_orders[index];
            if !order.is_active || order.side_is_bid == side_is_bid {
                continue;
            }

            let trade_base = remaining_base_lots.min(order.base_lots);
            if trade_base <= 0 {
                continue;
            }
            let quote_change = trade_base
                .checked_mul(order.price_lots)
                .ok_or(EngineError::MathError)?;

            let (taker_base, taker_quote) = if side_is_bid {
                (trade_base, quote_change.checked_neg().ok_or(EngineError::MathError)?)
            } else {
                (-trade_base, quote_change)
            };
            taker.settle(taker_base, taker_quote)?;
            maker.settle(
                -taker_base,
                taker_quote.checked_neg().ok_or(EngineError::MathError)?,
            )?;
            maker.open_orders[index].fill(trade_base);

            result.quote_volume = result
                .quote_volume
                .checked_add(quote_change.checked_abs().ok_or(EngineError::MathError)?)
                .ok_or(EngineError::MathError)?;
            result.filled_base_lots += trade_base;
            remaining_base_lots -= trade_base;

            result.fills.push(FillEvent {
                maker: maker.owner,
                taker: taker.owner,
                price_lots: order.price_lots,
                base_lots: trade_base,
            });
        }
    }

    Ok(result)
}
