use crate::errors::VulnDappError;
use crate::state::*;
use anchor_lang::prelude::*;

#[event]
pub struct TreasuryWithdrawEvent {
    pub recipient: Pubkey,
    pub amount: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct WithdrawSolFromTreasuryArgs {
    pub amount: u64,
}

// Any caller, any recipient.
#[derive(Accounts)]
pub struct WithdrawSolFromTreasury<'info> {
    #[account(
        mut,
        seeds = [TREASURY_SEED],
        bump = treasury.bump
    )]
    pub treasury: Account<'info, Treasury>,

    /// CHECK: any account can receive the lamports.
    #[account(mut)]
    pub recipient: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn withdraw_sol_from_treasury(
    ctx: Context<WithdrawSolFromTreasury>,
    args: WithdrawSolFromTreasuryArgs,
) -> Result<()> {
    // Program-owned account: lamports are moved directly.
    require_gte!(
        ctx.accounts.treasury.get_lamports(),
        args.amount,
        VulnDappError::MathOverflow
    );
    ctx.accounts.treasury.sub_lamports(args.amount)?;
    ctx.accounts.recipient.add_lamports(args.amount)?;

    emit!(TreasuryWithdrawEvent {
        recipient: ctx.accounts.recipient.key(),
        amount: args.amount,
    });
    Ok(())
}
