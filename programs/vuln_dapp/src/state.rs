use crate::errors::VulnDappError;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

pub const POOL_SEED: &[u8] = b"pool";
pub const USER_STATE_SEED: &[u8] = b"user_state";
pub const ESCROW_SEED: &[u8] = b"escrow";
pub const TREASURY_SEED: &[u8] = b"treasury";

pub const DEFAULT_LOCK_SECONDS: i64 = 60;

// The pool lives at a single fixed address, so every user of the program
// shares one vault authority.
#[account]
#[derive(Default, InitSpace)]
pub struct Pool {
    /// Bump seed
    pub bump: u8,
    /// Admin recorded at initialization, never enforced
    pub admin: Pubkey,
    /// Mint of the staked token
    pub mint: Pubkey,
    /// Sum of all user stakes including decimals
    pub total_staked: u64,
    /// Minimum time between stake and unstake
    pub lock_seconds: i64,
}

impl Pool {
    pub fn new(bump: u8, admin: Pubkey, mint: Pubkey) -> Self {
        Self {
            bump,
            admin,
            mint,
            total_staked: 0,
            lock_seconds: DEFAULT_LOCK_SECONDS,
        }
    }

    pub fn add_stake(&mut self, amount: u64) -> Result<()> {
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(VulnDappError::MathOverflow)?;
        Ok(())
    }

    pub fn remove_stake(&mut self, amount: u64) -> Result<()> {
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(VulnDappError::MathOverflow)?;
        Ok(())
    }

    /// Moves tokens out of the pool vault, signing as the pool PDA.
    pub fn transfer_out<'info>(
        &self,
        amount: u64,
        pool_account_info: &AccountInfo<'info>,
        mint: &InterfaceAccount<'info, Mint>,
        pool_vault: &InterfaceAccount<'info, TokenAccount>,
        to: &InterfaceAccount<'info, TokenAccount>,
        token_program: &Interface<'info, TokenInterface>,
    ) -> Result<()> {
        let cpi_accounts = TransferChecked {
            mint: mint.to_account_info(),
            from: pool_vault.to_account_info(),
            to: to.to_account_info(),
            authority: pool_account_info.clone(),
        };
        let signer_seeds: &[&[&[u8]]] = &[&[POOL_SEED, &[self.bump]]];
        let cpi_context = CpiContext::new(token_program.to_account_info(), cpi_accounts)
            .with_signer(signer_seeds);
        transfer_checked(cpi_context, amount, mint.decimals)
    }
}

#[account]
#[derive(Default, InitSpace)]
pub struct UserState {
    pub bump: u8,
    pub user: Pubkey,
    pub staked_amount: u64,
    /// Timestamp supplied by the client on the last stake
    pub last_stake_ts: i64,
}

impl UserState {
    pub fn add(&mut self, amount: u64, client_now_ts: i64) -> Result<()> {
        self.staked_amount = self
            .staked_amount
            .checked_add(amount)
            .ok_or(VulnDappError::MathOverflow)?;
        self.last_stake_ts = client_now_ts;
        Ok(())
    }

    pub fn sub(&mut self, amount: u64) -> Result<()> {
        require_gte!(
            self.staked_amount,
            amount,
            VulnDappError::InsufficientStake
        );
        self.staked_amount -= amount;
        Ok(())
    }

    pub fn seconds_since_stake(&self, client_now_ts: i64) -> Result<i64> {
        client_now_ts
            .checked_sub(self.last_stake_ts)
            .ok_or(VulnDappError::MathOverflow.into())
    }

    pub fn is_unlocked(&self, client_now_ts: i64, lock_seconds: i64) -> Result<bool> {
        Ok(self.seconds_since_stake(client_now_ts)? >= lock_seconds)
    }
}

// One escrow per mint; a second maker for the same mint collides with the first.
#[account]
#[derive(Default, InitSpace)]
pub struct Escrow {
    pub bump: u8,
    pub maker: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    /// Expiry supplied by the client, never checked
    pub expires_at: i64,
}

impl Escrow {
    pub fn transfer_out<'info>(
        &self,
        amount: u64,
        escrow_account_info: &AccountInfo<'info>,
        mint: &InterfaceAccount<'info, Mint>,
        escrow_vault: &InterfaceAccount<'info, TokenAccount>,
        to: &InterfaceAccount<'info, TokenAccount>,
        token_program: &Interface<'info, TokenInterface>,
    ) -> Result<()> {
        let cpi_accounts = TransferChecked {
            mint: mint.to_account_info(),
            from: escrow_vault.to_account_info(),
            to: to.to_account_info(),
            authority: escrow_account_info.clone(),
        };
        let signer_seeds: &[&[&[u8]]] = &[&[ESCROW_SEED, self.mint.as_ref(), &[self.bump]]];
        let cpi_context = CpiContext::new(token_program.to_account_info(), cpi_accounts)
            .with_signer(signer_seeds);
        transfer_checked(cpi_context, amount, mint.decimals)
    }
}

#[account]
#[derive(Default, InitSpace)]
pub struct Treasury {
    pub bump: u8,
}
