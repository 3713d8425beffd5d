use crate::state::*;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CancelOrderArgs {
    pub order_id: u128,
}

// The owner does not sign; anyone may cancel anyone's orders.
#[derive(Accounts)]
pub struct CancelOrder<'info> {
    pub market: Account<'info, Market>,

    #[account(mut)]
    pub user_account: Account<'info, UserAccount>,
}

pub fn cancel_order(ctx: Context<CancelOrder>, args: CancelOrderArgs) -> Result<()> {
    let cancelled = ctx.accounts.user_account.cancel_order(args.order_id);
    if cancelled == 0 {
        msg!("order {} not found", args.order_id);
    }
    Ok(())
}
