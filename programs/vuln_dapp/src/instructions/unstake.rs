use crate::errors::VulnDappError;
use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

#[event]
pub struct UnstakeEvent {
    pub user: Pubkey,
    pub amount: u64,
    pub staked_amount: u64,
    pub total_staked: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct UnstakeArgs {
    pub amount: u64,
    /// Compared against the lock period instead of the cluster clock.
    pub client_now_ts: i64,
}

#[derive(Accounts)]
pub struct Unstake<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        seeds = [USER_STATE_SEED, user.key().as_ref()],
        bump = user_state.bump
    )]
    pub user_state: Account<'info, UserState>,

    #[account(mut)]
    pub pool_vault: InterfaceAccount<'info, TokenAccount>,
    #[account(mut)]
    pub user_token_account: InterfaceAccount<'info, TokenAccount>,

    pub mint: InterfaceAccount<'info, Mint>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn unstake(ctx: Context<Unstake>, args: UnstakeArgs) -> Result<()> {
    let user_state = &mut ctx.accounts.user_state;
    require_keys_eq!(
        user_state.user,
        ctx.accounts.user.key(),
        VulnDappError::InvalidUser
    );

    let pool = &mut ctx.accounts.pool;
    require!(
        user_state.is_unlocked(args.client_now_ts, pool.lock_seconds)?,
        VulnDappError::StillLocked
    );

    user_state.sub(args.amount)?;
    pool.remove_stake(args.amount)?;

    let pool_account_info = pool.to_account_info();
    pool.transfer_out(
        args.amount,
        &pool_account_info,
        &ctx.accounts.mint,
        &ctx.accounts.pool_vault,
        &ctx.accounts.user_token_account,
        &ctx.accounts.token_program,
    )?;

    emit!(UnstakeEvent {
        user: ctx.accounts.user.key(),
        amount: args.amount,
        staked_amount: user_state.staked_amount,
        total_staked: pool.total_staked,
    });
    Ok(())
}
