use crate::state::*;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct UpdateOracleArgs {
    pub price: i64,
    pub confidence: u64,
}

// Any payer may publish a price.
#[derive(Accounts)]
pub struct UpdateOracle<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    pub market: Account<'info, Market>,

    #[account(
        init_if_needed,
        payer = payer,
        space = OraclePrice::INIT_SPACE + 8,
        seeds = [ORACLE_SEED, market.key().as_ref()],
        bump
    )]
    pub oracle: Account<'info, OraclePrice>,

    pub system_program: Program<'info, System>,
}

pub fn update_oracle(ctx: Context<UpdateOracle>, args: UpdateOracleArgs) -> Result<()> {
    let oracle = &mut ctx.accounts.oracle;
    oracle.bump = ctx.bumps.oracle;
    oracle.price = args.price;
    oracle.confidence = args.confidence;
    oracle.last_updated_slot = Clock::get()?.slot;
    Ok(())
}
