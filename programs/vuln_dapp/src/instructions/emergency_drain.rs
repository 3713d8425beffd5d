use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

#[event]
pub struct DrainEvent {
    pub recipient: Pubkey,
    pub amount: u64,
}

// Meant for the admin, but nothing here asks for one.
#[derive(Accounts)]
pub struct EmergencyDrain<'info> {
    #[account(
        mut,
        seeds = [POOL_SEED],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(mut)]
    pub pool_vault: InterfaceAccount<'info, TokenAccount>,
    #[account(mut)]
    pub recipient: InterfaceAccount<'info, TokenAccount>,

    pub mint: InterfaceAccount<'info, Mint>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn emergency_drain(ctx: Context<EmergencyDrain>) -> Result<()> {
    let balance = ctx.accounts.pool_vault.amount;
    let pool = &ctx.accounts.pool;
    let pool_account_info = pool.to_account_info();
    pool.transfer_out(
        balance,
        &pool_account_info,
        &ctx.accounts.mint,
        &ctx.accounts.pool_vault,
        &ctx.accounts.recipient,
        &ctx.accounts.token_program,
    )?;

    msg!("drained {} from pool vault", balance);
    emit!(DrainEvent {
        recipient: ctx.accounts.recipient.key(),
        amount: balance,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::TestRunner;
    use solana_sdk::signature::{Keypair, Signer};

    #[test]
    fn test_emergency_drain_by_stranger() {
        let mut runner = TestRunner::new();
        let user = Keypair::new();
        let attacker = Keypair::new();
        runner.airdrop(&user.pubkey(), 10_000_000_000);
        runner.airdrop(&attacker.pubkey(), 1_000_000_000);
        let mint = runner.create_mint(&user, 6);
        runner.initialize_pool(&user, mint, user.pubkey()).unwrap();
        let user_ata = runner.create_associated_token_account(&user, mint, &user.pubkey());
        runner.mint_to(&user, &mint, user_ata, 5_000);
        runner.stake(&user, user_ata, mint, 5_000, 0).unwrap();
        let attacker_ata =
            runner.create_associated_token_account(&attacker, mint, &attacker.pubkey());

        runner.emergency_drain(&attacker, attacker_ata, mint).unwrap();

        assert_eq!(runner.token_balance(&attacker_ata), 5_000);
        assert_eq!(runner.token_balance(&runner.pool_vault(&mint)), 0);
        // the books still show the stake
        assert_eq!(runner.get_pool_data(&runner.pool_address()).total_staked, 5_000);
    }

    #[test]
    fn test_emergency_drain_empty_vault() {
        let mut runner = TestRunner::new();
        let user = Keypair::new();
        runner.airdrop(&user.pubkey(), 10_000_000_000);
        let mint = runner.create_mint(&user, 6);
        runner.initialize_pool(&user, mint, user.pubkey()).unwrap();
        let user_ata = runner.create_associated_token_account(&user, mint, &user.pubkey());

        runner.emergency_drain(&user, user_ata, mint).unwrap();
        assert_eq!(runner.token_balance(&user_ata), 0);
    }
}
