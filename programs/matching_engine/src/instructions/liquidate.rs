use crate::errors::EngineError;
use crate::state::*;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct LiquidateArgs {
    pub max_liq_amount: u64,
}

// The oracle is any OraclePrice account, whichever market it belongs to, and
// the liqee's health is never checked.
#[derive(Accounts)]
pub struct Liquidate<'info> {
    pub market: Account<'info, Market>,

    #[account(mut)]
    pub liqor: Account<'info, UserAccount>,

    #[account(mut)]
    pub liqee: Account<'info, UserAccount>,

    pub oracle: Account<'info, OraclePrice>,
}

pub fn liquidate(ctx: Context<Liquidate>, args: LiquidateArgs) -> Result<()> {
    let price = ctx.accounts.oracle.price;
    let base = i64::try_from(args.max_liq_amount).map_err(|_| EngineError::MathError)?;
    let quote_change = base.checked_mul(price).ok_or(EngineError::MathError)?;
    let neg_base = base.checked_neg().ok_or(EngineError::MathError)?;
    let neg_quote = quote_change.checked_neg().ok_or(EngineError::MathError)?;

    ctx.accounts.liqor.settle(base, neg_quote)?;
    ctx.accounts.liqee.settle(neg_base, quote_change)?;

    msg!(
        "liquidated {} base at {} from {}",
        args.max_liq_amount,
        price,
        ctx.accounts.liqee.owner
    );
    Ok(())
}
