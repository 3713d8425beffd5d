use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

#[event]
pub struct EscrowCreatedEvent {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub expires_at: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CreateEscrowArgs {
    pub amount: u64,
    pub expires_at_client_ts: i64,
}

#[derive(Accounts)]
pub struct CreateEscrow<'info> {
    #[account(mut)]
    pub maker: Signer<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = maker,
        space = Escrow::INIT_SPACE + 8,
        seeds = [ESCROW_SEED, mint.key().as_ref()],
        bump
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(
        init,
        payer = maker,
        associated_token::mint = mint,
        associated_token::authority = escrow,
        associated_token::token_program = token_program
    )]
    pub escrow_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub maker_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn create_escrow(ctx: Context<CreateEscrow>, args: CreateEscrowArgs) -> Result<()> {
    ctx.accounts.escrow.set_inner(Escrow {
        bump: ctx.bumps.escrow,
        maker: ctx.accounts.maker.key(),
        mint: ctx.accounts.mint.key(),
        amount: args.amount,
        expires_at: args.expires_at_client_ts,
    });

    let cpi_accounts = TransferChecked {
        mint: ctx.accounts.mint.to_account_info(),
        from: ctx.accounts.maker_token_account.to_account_info(),
        to: ctx.accounts.escrow_vault.to_account_info(),
        authority: ctx.accounts.maker.to_account_info(),
    };
    let cpi_context = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    transfer_checked(cpi_context, args.amount, ctx.accounts.mint.decimals)?;

    emit!(EscrowCreatedEvent {
        escrow: ctx.accounts.escrow.key(),
        maker: ctx.accounts.maker.key(),
        mint: ctx.accounts.mint.key(),
        amount: args.amount,
        expires_at: args.expires_at_client_ts,
    });
    Ok(())
}
