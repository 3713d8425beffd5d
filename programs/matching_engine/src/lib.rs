#![allow(unexpected_cfgs)]
use anchor_lang::prelude::*;

mod errors;
pub mod helpers;
mod instructions;
pub mod state;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;


pub use errors::EngineError;
pub use instructions::*;

declare_id!("ENGnTW8tUPiTanGQHPcHBWXthax3ZiZr3oivNQx8TUM9");

#[program]
pub mod matching_engine {
    use super::*;

    pub fn initialize_market(
        ctx: Context<InitializeMarket>,
        args: InitializeMarketArgs,
    ) -> Result<()> {
        instructions::initialize_market(ctx, args)
    }

    pub fn deposit(ctx: Context<Deposit>, args: DepositArgs) -> Result<()> {
        instructions::deposit(ctx, args)
    }

    pub fn withdraw(ctx: Context<Withdraw>, args: WithdrawArgs) -> Result<()> {
        instructions::withdraw(ctx, args)
    }

    pub fn place_order<'info>(
        ctx: Context<'_, '_, 'info, 'info, PlaceOrder<'info>>,
        args: PlaceOrderArgs,
    ) -> Result<()> {
        instructions::place_order(ctx, args)
    }

    pub fn cancel_order(ctx: Context<CancelOrder>, args: CancelOrderArgs) -> Result<()> {
        instructions::cancel_order(ctx, args)
    }

    pub fn update_oracle(ctx: Context<UpdateOracle>, args: UpdateOracleArgs) -> Result<()> {
        instructions::update_oracle(ctx, args)
    }

    pub fn liquidate(ctx: Context<Liquidate>, args: LiquidateArgs) -> Result<()> {
        instructions::liquidate(ctx, args)
    }
}
