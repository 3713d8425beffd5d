use crate::state::*;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct SetLockSecondsArgs {
    pub new_lock: i64,
}

// No admin or signer: whoever pays the fee can rewrite the lock period.
#[derive(Accounts)]
pub struct SetLockSeconds<'info> {
    #[account(mut)]
    pub pool: Account<'info, Pool>,
}

pub fn set_lock_seconds(ctx: Context<SetLockSeconds>, args: SetLockSecondsArgs) -> Result<()> {
    ctx.accounts.pool.lock_seconds = args.new_lock;
    Ok(())
}
