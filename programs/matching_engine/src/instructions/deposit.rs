use crate::errors::EngineError;
use crate::state::*;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct DepositArgs {
    pub amount: u64,
}

// Credits the position without moving any tokens.
#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: the owner does not sign.
    pub owner: UncheckedAccount<'info>,

    pub market: Account<'info, Market>,

    #[account(
        init_if_needed,
        payer = payer,
        space = UserAccount::INIT_SPACE + 8,
        seeds = [USER_ACCOUNT_SEED, market.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub user_account: Account<'info, UserAccount>,

    pub system_program: Program<'info, System>,
}

pub fn deposit(ctx: Context<Deposit>, args: DepositArgs) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user_account = &mut ctx.accounts.user_account;
    if !user_account.is_initialized() {
        user_account.bump = ctx.bumps.user_account;
        user_account.owner = ctx.accounts.owner.key();
        user_account.market = ctx.accounts.market.key();
    }

    let amount = i64::try_from(args.amount).map_err(|_| EngineError::MathError)?;
    user_account.settle(0, amount)?;
    user_account.last_update_ts = now;
    Ok(())
}
