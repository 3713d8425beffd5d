#![allow(unexpected_cfgs)]
use anchor_lang::prelude::*;

mod errors;
mod instructions;
pub mod state;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;


pub use errors::VulnDappError;
pub use instructions::*;

declare_id!("DAppkaapQDkTWwEvPdEoW4C7HcRYATeQHtkNREkhNYLG");

/// Staking pool, escrow and treasury with deliberately missing checks.
/// Every handler documents which guard it leaves out.
#[program]
pub mod vuln_dapp {
    use super::*;

    pub fn initialize_pool(ctx: Context<InitializePool>, args: InitializePoolArgs) -> Result<()> {
        instructions::initialize_pool(ctx, args)
    }

    pub fn set_lock_seconds(ctx: Context<SetLockSeconds>, args: SetLockSecondsArgs) -> Result<()> {
        instructions::set_lock_seconds(ctx, args)
    }

    pub fn stake(ctx: Context<Stake>, args: StakeArgs) -> Result<()> {
        instructions::stake(ctx, args)
    }

    pub fn unstake(ctx: Context<Unstake>, args: UnstakeArgs) -> Result<()> {
        instructions::unstake(ctx, args)
    }

    pub fn emergency_drain(ctx: Context<EmergencyDrain>) -> Result<()> {
        instructions::emergency_drain(ctx)
    }

    pub fn create_escrow(ctx: Context<CreateEscrow>, args: CreateEscrowArgs) -> Result<()> {
        instructions::create_escrow(ctx, args)
    }

    pub fn cancel_escrow(ctx: Context<CancelEscrow>) -> Result<()> {
        instructions::cancel_escrow(ctx)
    }

    pub fn initialize_treasury(ctx: Context<InitializeTreasury>) -> Result<()> {
        instructions::initialize_treasury(ctx)
    }

    pub fn withdraw_sol_from_treasury(
        ctx: Context<WithdrawSolFromTreasury>,
        args: WithdrawSolFromTreasuryArgs,
    ) -> Result<()> {
        instructions::withdraw_sol_from_treasury(ctx, args)
    }
}
