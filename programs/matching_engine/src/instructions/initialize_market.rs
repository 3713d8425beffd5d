use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeMarketArgs {
    pub fee_bps: u16,
}

// Safe to call again on a live market: the fee, the oracle and the active
// flag are overwritten by whoever calls.
#[derive(Accounts)]
pub struct InitializeMarket<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: only used as a seed and recorded as admin on creation.
    pub admin: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = payer,
        space = Market::INIT_SPACE + 8,
        seeds = [MARKET_SEED, admin.key().as_ref()],
        bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        init_if_needed,
        payer = payer,
        space = EventQueue::INIT_SPACE + 8,
        seeds = [EVENT_QUEUE_SEED, market.key().as_ref()],
        bump
    )]
    pub event_queue: Account<'info, EventQueue>,

    /// CHECK: any account is accepted as the oracle.
    pub oracle: UncheckedAccount<'info>,

    pub base_mint: InterfaceAccount<'info, Mint>,
    pub quote_mint: InterfaceAccount<'info, Mint>,
    pub system_program: Program<'info, System>,
}

pub fn initialize_market(ctx: Context<InitializeMarket>, args: InitializeMarketArgs) -> Result<()> {
    let market = &mut ctx.accounts.market;
    if !market.is_initialized() {
        market.bump = ctx.bumps.market;
        market.admin = ctx.accounts.admin.key();
        market.base_mint = ctx.accounts.base_mint.key();
        market.quote_mint = ctx.accounts.quote_mint.key();
    } else {
        msg!("reinitializing market {}", market.key());
    }
    market.fee_bps = args.fee_bps;
    market.oracle = ctx.accounts.oracle.key();
    market.is_active = true;

    let event_queue = &mut ctx.accounts.event_queue;
    if event_queue.capacity == 0 {
        event_queue.init(EVENT_QUEUE_CAPACITY);
    }
    Ok(())
}
