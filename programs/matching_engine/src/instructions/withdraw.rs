use crate::errors::EngineError;
use crate::state::*;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct WithdrawArgs {
    pub amount: u64,
}

// No signature and no balance check; the position may go negative.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    pub market: Account<'info, Market>,

    #[account(mut)]
    pub user_account: Account<'info, UserAccount>,

    /// CHECK: only logged, nothing is transferred.
    pub recipient: UncheckedAccount<'info>,
}

pub fn withdraw(ctx: Context<Withdraw>, args: WithdrawArgs) -> Result<()> {
    let amount = i64::try_from(args.amount).map_err(|_| EngineError::MathError)?;
    let user_account = &mut ctx.accounts.user_account;
    user_account.settle(0, amount.checked_neg().ok_or(EngineError::MathError)?)?;
    user_account.last_update_ts = Clock::get()?.unix_timestamp;
    msg!(
        "withdraw {} from {} to {}",
        args.amount,
        user_account.owner,
        ctx.accounts.recipient.key()
    );
    Ok(())
}
