use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

#[event]
pub struct StakeEvent {
    pub user: Pubkey,
    pub amount: u64,
    pub staked_amount: u64,
    pub total_staked: u64,
    pub client_now_ts: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct StakeArgs {
    pub amount: u64,
    /// Recorded as the stake time instead of the cluster clock.
    pub client_now_ts: i64,
}

#[derive(Accounts)]
pub struct Stake<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub pool: Account<'info, Pool>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserState::INIT_SPACE + 8,
        seeds = [USER_STATE_SEED, user.key().as_ref()],
        bump
    )]
    pub user_state: Account<'info, UserState>,

    // Neither token account is tied to the pool or to the user.
    #[account(mut)]
    pub pool_vault: InterfaceAccount<'info, TokenAccount>,
    #[account(mut)]
    pub user_token_account: InterfaceAccount<'info, TokenAccount>,

    pub mint: InterfaceAccount<'info, Mint>,
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn stake(ctx: Context<Stake>, args: StakeArgs) -> Result<()> {
    let cpi_accounts = TransferChecked {
        mint: ctx.accounts.mint.to_account_info(),
        from: ctx.accounts.user_token_account.to_account_info(),
        to: ctx.accounts.pool_vault.to_account_info(),
        authority: ctx.accounts.user.to_account_info(),
    };
    let cpi_context = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    transfer_checked(cpi_context, args.amount, ctx.accounts.mint.decimals)?;

    let user_state = &mut ctx.accounts.user_state;
    if user_state.staked_amount == 0 {
        user_state.user = ctx.accounts.user.key();
    }
    user_state.add(args.amount, args.client_now_ts)?;
    user_state.bump = ctx.bumps.user_state;

    let pool = &mut ctx.accounts.pool;
    pool.add_stake(args.amount)?;

    emit!(StakeEvent {
        user: ctx.accounts.user.key(),
        amount: args.amount,
        staked_amount: user_state.staked_amount,
        total_staked: pool.total_staked,
        client_now_ts: args.client_now_ts,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{assert_fails_with, TestRunner};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::{Keypair, Signer};
    use test_case::test_case;

    // TokenError::InsufficientFunds
    const TOKEN_INSUFFICIENT_FUNDS: &str = "Custom(1)";

    fn setup_test() -> (TestRunner, Keypair, Pubkey, Pubkey) {
        let mut runner = TestRunner::new();
        let user = Keypair::new();
        runner.airdrop(&user.pubkey(), 10_000_000_000);
        let mint = runner.create_mint(&user, 6);
        runner.initialize_pool(&user, mint, user.pubkey()).unwrap();
        let user_ata = runner.create_associated_token_account(&user, mint, &user.pubkey());
        runner.mint_to(&user, &mint, user_ata, 1_000_000);
        (runner, user, mint, user_ata)
    }

    #[test_case(1, None)]
    #[test_case(500_000, None)]
    #[test_case(1_000_000, None)]
    #[test_case(1_000_001, Some(TOKEN_INSUFFICIENT_FUNDS))]
    fn test_stake(amount: u64, expected_error: Option<&str>) {
        let (mut runner, user, mint, user_ata) = setup_test();

        let result = runner.stake(&user, user_ata, mint, amount, 1_700_000_000);

        if let Some(expected) = expected_error {
            assert_fails_with(result, expected);
        } else {
            result.unwrap();
            let pool = runner.get_pool_data(&runner.pool_address());
            assert_eq!(pool.total_staked, amount);
            let user_state = runner.get_user_state(&runner.user_state_address(&user.pubkey()));
            assert_eq!(user_state.user.to_bytes(), user.pubkey().to_bytes());
            assert_eq!(user_state.staked_amount, amount);
            assert_eq!(user_state.last_stake_ts, 1_700_000_000);
            assert_eq!(runner.token_balance(&runner.pool_vault(&mint)), amount);
            assert_eq!(runner.token_balance(&user_ata), 1_000_000 - amount);
        }
    }

    #[test]
    fn test_stake_twice_accumulates_and_overwrites_timestamp() {
        let (mut runner, user, mint, user_ata) = setup_test();

        runner.stake(&user, user_ata, mint, 100, 10).unwrap();
        runner.stake(&user, user_ata, mint, 200, 5).unwrap();

        let user_state = runner.get_user_state(&runner.user_state_address(&user.pubkey()));
        assert_eq!(user_state.staked_amount, 300);
        // an older client timestamp is accepted as is
        assert_eq!(user_state.last_stake_ts, 5);
        assert_eq!(runner.get_pool_data(&runner.pool_address()).total_staked, 300);
    }

    #[test]
    fn test_stake_into_foreign_vault() {
        let (mut runner, user, mint, user_ata) = setup_test();
        let stranger = Keypair::new();
        runner.airdrop(&stranger.pubkey(), 1_000_000_000);
        let stranger_ata = runner.create_associated_token_account(&user, mint, &stranger.pubkey());

        // the vault is not checked: the tokens land in the stranger's account
        // while the pool still books the stake
        runner
            .stake_with_vault(&user, user_ata, stranger_ata, mint, 400, 0)
            .unwrap();

        assert_eq!(runner.token_balance(&stranger_ata), 400);
        assert_eq!(runner.token_balance(&runner.pool_vault(&mint)), 0);
        assert_eq!(runner.get_pool_data(&runner.pool_address()).total_staked, 400);
    }
}
