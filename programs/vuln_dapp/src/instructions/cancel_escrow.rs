use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

#[event]
pub struct EscrowCancelledEvent {
    pub escrow: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
}

// Neither the maker nor the expiry is checked and the recipient is free.
#[derive(Accounts)]
pub struct CancelEscrow<'info> {
    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.mint.as_ref()],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(mut)]
    pub escrow_vault: InterfaceAccount<'info, TokenAccount>,
    #[account(mut)]
    pub recipient: InterfaceAccount<'info, TokenAccount>,

    pub mint: InterfaceAccount<'info, Mint>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn cancel_escrow(ctx: Context<CancelEscrow>) -> Result<()> {
    let amount = ctx.accounts.escrow_vault.amount;
    let escrow = &ctx.accounts.escrow;
    let escrow_account_info = escrow.to_account_info();
    escrow.transfer_out(
        amount,
        &escrow_account_info,
        &ctx.accounts.mint,
        &ctx.accounts.escrow_vault,
        &ctx.accounts.recipient,
        &ctx.accounts.token_program,
    )?;

    emit!(EscrowCancelledEvent {
        escrow: escrow.key(),
        recipient: ctx.accounts.recipient.key(),
        amount,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::TestRunner;
    use solana_sdk::signature::{Keypair, Signer};

    #[test]
    fn test_cancel_escrow_by_stranger() {
        let mut runner = TestRunner::new();
        let maker = Keypair::new();
        let attacker = Keypair::new();
        runner.airdrop(&maker.pubkey(), 10_000_000_000);
        runner.airdrop(&attacker.pubkey(), 1_000_000_000);
        let mint = runner.create_mint(&maker, 6);
        let maker_ata = runner.create_associated_token_account(&maker, mint, &maker.pubkey());
        runner.mint_to(&maker, &mint, maker_ata, 1_000);
        runner
            .create_escrow(&maker, maker_ata, mint, 750, i64::MAX)
            .unwrap();
        let attacker_ata =
            runner.create_associated_token_account(&attacker, mint, &attacker.pubkey());

        runner.cancel_escrow(&attacker, attacker_ata, mint).unwrap();

        assert_eq!(runner.token_balance(&attacker_ata), 750);
        assert_eq!(runner.token_balance(&runner.escrow_vault(&mint)), 0);
        // the escrow account stays open with its original record
        assert_eq!(runner.get_escrow_data(&runner.escrow_address(&mint)).amount, 750);
    }

    #[test]
    fn test_cancel_escrow_by_maker() {
        let mut runner = TestRunner::new();
        let maker = Keypair::new();
        runner.airdrop(&maker.pubkey(), 10_000_000_000);
        let mint = runner.create_mint(&maker, 6);
        let maker_ata = runner.create_associated_token_account(&maker, mint, &maker.pubkey());
        runner.mint_to(&maker, &mint, maker_ata, 1_000);
        runner.create_escrow(&maker, maker_ata, mint, 400, 0).unwrap();

        runner.cancel_escrow(&maker, maker_ata, mint).unwrap();
        assert_eq!(runner.token_balance(&maker_ata), 1_000);
    }
}
