use super::compute_metrics::send_and_record;
use crate::instructions::{
    CreateEscrowArgs, InitializePoolArgs, SetLockSecondsArgs, StakeArgs, UnstakeArgs,
    WithdrawSolFromTreasuryArgs,
};
use crate::state as dapp_state;
use anchor_lang::prelude::AccountDeserialize;
use anchor_lang::solana_program::program_pack::Pack;
use litesvm::LiteSVM;
use litesvm_token::{CreateAssociatedTokenAccount, CreateMint, MintTo};
use solana_sdk::clock::Clock;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::path::PathBuf;

const PROGRAM_NAME: &str = "vuln_dapp";

#[derive(Debug)]
pub struct TransactionError {
    pub message: String,
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Transaction failed: {}", self.message)
    }
}

impl std::error::Error for TransactionError {}

/// Asserts that `result` failed and that the failure mentions `expected`: an
/// error name, a custom error code or a fragment of the program logs.
pub fn assert_fails_with<T: std::fmt::Debug>(
    result: std::result::Result<T, TransactionError>,
    expected: &str,
) {
    let error_message = result.expect_err("Transaction should fail").message;
    assert!(
        error_message.contains(expected),
        "Expected {} error, got: {}",
        expected,
        error_message
    );
}

/// Directory holding the compiled programs. `SBF_OUT_DIR` wins over the
/// workspace `target/deploy`.
pub fn deploy_dir() -> PathBuf {
    std::env::var_os("SBF_OUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/deploy"))
}

/// Reads a workspace program binary by its crate name.
fn read_program(name: &str) -> Vec<u8> {
    let path = deploy_dir().join(format!("{}.so", name));
    std::fs::read(&path).unwrap_or_else(|e| {
        panic!(
            "failed to read {} ({}), run `anchor build` first",
            path.display(),
            e
        )
    })
}

fn to_anchor(key: &Pubkey) -> anchor_lang::prelude::Pubkey {
    anchor_lang::prelude::Pubkey::from(key.to_bytes())
}

fn to_sdk(key: &anchor_lang::prelude::Pubkey) -> Pubkey {
    Pubkey::from(key.to_bytes())
}

fn token_program_id() -> Pubkey {
    to_sdk(&anchor_spl::token::spl_token::ID)
}

fn associated_token_program_id() -> Pubkey {
    to_sdk(&anchor_spl::associated_token::ID)
}

pub struct TestRunner {
    pub svm: LiteSVM,
    pub program_id: Pubkey,
}

impl TestRunner {
    pub fn new() -> Self {
        let mut svm = LiteSVM::new();

        let program_id = to_sdk(&crate::ID);
        svm.add_program(program_id, &read_program(PROGRAM_NAME))
            .unwrap();

        Self { svm, program_id }
    }

    pub fn airdrop(&mut self, receiver: &Pubkey, amount: u64) {
        self.svm.airdrop(receiver, amount).unwrap();
    }

    pub fn expire_blockhash(&mut self) {
        self.svm.expire_blockhash();
    }

    pub fn set_system_clock(&mut self, timestamp: i64) {
        let mut clock = self.svm.get_sysvar::<Clock>();
        clock.unix_timestamp = timestamp;
        self.svm.set_sysvar::<Clock>(&clock);
    }

    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.svm
            .get_account(address)
            .map(|account| account.lamports)
            .unwrap_or(0)
    }

    pub fn create_mint(&mut self, payer: &Keypair, decimals: u8) -> Pubkey {
        CreateMint::new(&mut self.svm, payer)
            .authority(&payer.pubkey())
            .decimals(decimals)
            .send()
            .unwrap()
    }

    pub fn create_associated_token_account(
        &mut self,
        payer: &Keypair,
        mint: Pubkey,
        owner: &Pubkey,
    ) -> Pubkey {
        CreateAssociatedTokenAccount::new(&mut self.svm, payer, &mint)
            .owner(owner)
            .send()
            .unwrap()
    }

    /// Mints `amount` into `ata`; `authority` must be the mint authority.
    pub fn mint_to(&mut self, authority: &Keypair, mint: &Pubkey, ata: Pubkey, amount: u64) {
        MintTo::new(&mut self.svm, authority, mint, &ata, amount)
            .owner(authority)
            .send()
            .unwrap();
    }

    pub fn token_balance(&self, token_account: &Pubkey) -> u64 {
        let account = self
            .svm
            .get_account(token_account)
            .expect("Token account should exist");
        anchor_spl::token::spl_token::state::Account::unpack(&account.data)
            .expect("Should unpack token account")
            .amount
    }

    pub fn associated_token_address(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        to_sdk(&anchor_spl::associated_token::get_associated_token_address(
            &to_anchor(owner),
            &to_anchor(mint),
        ))
    }

    pub fn pool_address(&self) -> Pubkey {
        Pubkey::find_program_address(&[dapp_state::POOL_SEED], &self.program_id).0
    }

    pub fn pool_vault(&self, mint: &Pubkey) -> Pubkey {
        self.associated_token_address(&self.pool_address(), mint)
    }

    pub fn user_state_address(&self, user: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[dapp_state::USER_STATE_SEED, user.as_ref()],
            &self.program_id,
        )
        .0
    }

    pub fn escrow_address(&self, mint: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[dapp_state::ESCROW_SEED, mint.as_ref()], &self.program_id)
            .0
    }

    pub fn escrow_vault(&self, mint: &Pubkey) -> Pubkey {
        self.associated_token_address(&self.escrow_address(mint), mint)
    }

    pub fn treasury_address(&self) -> Pubkey {
        Pubkey::find_program_address(&[dapp_state::TREASURY_SEED], &self.program_id).0
    }

    fn get_account_data<T: AccountDeserialize>(&self, address: &Pubkey) -> T {
        let account = self
            .svm
            .get_account(address)
            .expect("Program account should exist");
        T::try_deserialize(&mut account.data.as_slice()).expect("Should deserialize account")
    }

    pub fn get_pool_data(&self, pool: &Pubkey) -> dapp_state::Pool {
        self.get_account_data(pool)
    }

    pub fn get_user_state(&self, user_state: &Pubkey) -> dapp_state::UserState {
        self.get_account_data(user_state)
    }

    pub fn get_escrow_data(&self, escrow: &Pubkey) -> dapp_state::Escrow {
        self.get_account_data(escrow)
    }

    pub fn send_instruction<T>(
        &mut self,
        instruction_name: &str,
        accounts: Vec<AccountMeta>,
        args: T,
        signers: &[&Keypair],
    ) -> std::result::Result<(), TransactionError>
    where
        T: anchor_lang::AnchorSerialize,
    {
        // Anchor instruction discriminator: first 8 bytes of sha256("global:<name>")
        fn get_discriminator(instruction_name: &str) -> [u8; 8] {
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(format!("global:{}", instruction_name));
            let result = hasher.finalize();
            let mut discriminator = [0u8; 8];
            discriminator.copy_from_slice(&result[..8]);
            discriminator
        }

        let mut data = Vec::new();
        data.extend_from_slice(&get_discriminator(instruction_name));
        args.serialize(&mut data).map_err(|err| TransactionError {
            message: format!("could not serialize args: {}", err),
        })?;

        let instruction = Instruction {
            program_id: self.program_id,
            accounts,
            data,
        };

        let tx = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&signers[0].pubkey()),
            signers,
            self.svm.latest_blockhash(),
        );

        send_and_record(&mut self.svm, tx, instruction_name).map_err(|err| TransactionError {
            message: format!("{:?}", err),
        })?;
        Ok(())
    }

    pub fn initialize_pool(
        &mut self,
        payer: &Keypair,
        mint: Pubkey,
        admin: Pubkey,
    ) -> std::result::Result<Pubkey, TransactionError> {
        let pool = self.pool_address();
        let accounts = vec![
            AccountMeta::new(payer.pubkey(), true),
            AccountMeta::new(pool, false),
            AccountMeta::new(self.pool_vault(&mint), false),
            AccountMeta::new_readonly(mint, false),
            AccountMeta::new_readonly(token_program_id(), false),
            AccountMeta::new_readonly(associated_token_program_id(), false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::ID, false),
        ];
        let args = InitializePoolArgs {
            admin: to_anchor(&admin),
        };

        self.send_instruction("initialize_pool", accounts, args, &[payer])?;
        Ok(pool)
    }

    /// `fee_payer` is only the transaction fee payer; the instruction itself takes no signer.
    pub fn set_lock_seconds(
        &mut self,
        fee_payer: &Keypair,
        new_lock: i64,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![AccountMeta::new(self.pool_address(), false)];
        let args = SetLockSecondsArgs { new_lock };

        self.send_instruction("set_lock_seconds", accounts, args, &[fee_payer])
    }

    pub fn stake(
        &mut self,
        user: &Keypair,
        user_token_account: Pubkey,
        mint: Pubkey,
        amount: u64,
        client_now_ts: i64,
    ) -> std::result::Result<(), TransactionError> {
        let pool_vault = self.pool_vault(&mint);
        self.stake_with_vault(user, user_token_account, pool_vault, mint, amount, client_now_ts)
    }

    /// Stake with an arbitrary destination in place of the pool vault.
    pub fn stake_with_vault(
        &mut self,
        user: &Keypair,
        user_token_account: Pubkey,
        pool_vault: Pubkey,
        mint: Pubkey,
        amount: u64,
        client_now_ts: i64,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new(user.pubkey(), true),
            AccountMeta::new(self.pool_address(), false),
            AccountMeta::new(self.user_state_address(&user.pubkey()), false),
            AccountMeta::new(pool_vault, false),
            AccountMeta::new(user_token_account, false),
            AccountMeta::new_readonly(mint, false),
            AccountMeta::new_readonly(token_program_id(), false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::ID, false),
        ];
        let args = StakeArgs {
            amount,
            client_now_ts,
        };

        self.send_instruction("stake", accounts, args, &[user])
    }

    pub fn unstake(
        &mut self,
        user: &Keypair,
        user_token_account: Pubkey,
        mint: Pubkey,
        amount: u64,
        client_now_ts: i64,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new(user.pubkey(), true),
            AccountMeta::new(self.pool_address(), false),
            AccountMeta::new(self.user_state_address(&user.pubkey()), false),
            AccountMeta::new(self.pool_vault(&mint), false),
            AccountMeta::new(user_token_account, false),
            AccountMeta::new_readonly(mint, false),
            AccountMeta::new_readonly(token_program_id(), false),
        ];
        let args = UnstakeArgs {
            amount,
            client_now_ts,
        };

        self.send_instruction("unstake", accounts, args, &[user])
    }

    pub fn emergency_drain(
        &mut self,
        fee_payer: &Keypair,
        recipient: Pubkey,
        mint: Pubkey,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new(self.pool_address(), false),
            AccountMeta::new(self.pool_vault(&mint), false),
            AccountMeta::new(recipient, false),
            AccountMeta::new_readonly(mint, false),
            AccountMeta::new_readonly(token_program_id(), false),
        ];

        self.send_instruction("emergency_drain", accounts, (), &[fee_payer])
    }

    pub fn create_escrow(
        &mut self,
        maker: &Keypair,
        maker_token_account: Pubkey,
        mint: Pubkey,
        amount: u64,
        expires_at_client_ts: i64,
    ) -> std::result::Result<Pubkey, TransactionError> {
        let escrow = self.escrow_address(&mint);
        let accounts = vec![
            AccountMeta::new(maker.pubkey(), true),
            AccountMeta::new_readonly(mint, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new(self.escrow_vault(&mint), false),
            AccountMeta::new(maker_token_account, false),
            AccountMeta::new_readonly(token_program_id(), false),
            AccountMeta::new_readonly(associated_token_program_id(), false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::ID, false),
        ];
        let args = CreateEscrowArgs {
            amount,
            expires_at_client_ts,
        };

        self.send_instruction("create_escrow", accounts, args, &[maker])?;
        Ok(escrow)
    }

    pub fn cancel_escrow(
        &mut self,
        fee_payer: &Keypair,
        recipient: Pubkey,
        mint: Pubkey,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new(self.escrow_address(&mint), false),
            AccountMeta::new(self.escrow_vault(&mint), false),
            AccountMeta::new(recipient, false),
            AccountMeta::new_readonly(mint, false),
            AccountMeta::new_readonly(token_program_id(), false),
        ];

        self.send_instruction("cancel_escrow", accounts, (), &[fee_payer])
    }

    pub fn initialize_treasury(
        &mut self,
        payer: &Keypair,
    ) -> std::result::Result<Pubkey, TransactionError> {
        let treasury = self.treasury_address();
        let accounts = vec![
            AccountMeta::new(payer.pubkey(), true),
            AccountMeta::new(treasury, false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::ID, false),
        ];

        self.send_instruction("initialize_treasury", accounts, (), &[payer])?;
        Ok(treasury)
    }

    pub fn withdraw_sol_from_treasury(
        &mut self,
        fee_payer: &Keypair,
        recipient: Pubkey,
        amount: u64,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new(self.treasury_address(), false),
            AccountMeta::new(recipient, false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::ID, false),
        ];
        let args = WithdrawSolFromTreasuryArgs { amount };

        self.send_instruction("withdraw_sol_from_treasury", accounts, args, &[fee_payer])
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}
