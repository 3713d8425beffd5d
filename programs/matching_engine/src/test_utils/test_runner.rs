use super::compute_metrics::send_and_record;
use crate::instructions::{
    CancelOrderArgs, DepositArgs, InitializeMarketArgs, LiquidateArgs, PlaceOrderArgs,
    UpdateOracleArgs, WithdrawArgs,
};
use crate::state as engine_state;
use anchor_lang::prelude::AccountDeserialize;
use litesvm::LiteSVM;
use litesvm_token::CreateMint;
use solana_sdk::clock::Clock;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::path::PathBuf;

const PROGRAM_NAME: &str = "matching_engine";

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

fn to_sdk(key: &anchor_lang::prelude::Pubkey) -> Pubkey {
    Pubkey::from(key.to_bytes())
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

    pub fn warp_to_slot(&mut self, slot: u64) {
        self.svm.warp_to_slot(slot);
    }

    /// Creates a base and a quote mint with `payer` as authority.
    pub fn create_mints(&mut self, payer: &Keypair) -> (Pubkey, Pubkey) {
        let base_mint = CreateMint::new(&mut self.svm, payer)
            .authority(&payer.pubkey())
            .decimals(9)
            .send()
            .unwrap();
        let quote_mint = CreateMint::new(&mut self.svm, payer)
            .authority(&payer.pubkey())
            .decimals(6)
            .send()
            .unwrap();
        (base_mint, quote_mint)
    }

    pub fn market_address(&self, admin: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[engine_state::MARKET_SEED, admin.as_ref()],
            &self.program_id,
        )
        .0
    }

    pub fn event_queue_address(&self, market: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[engine_state::EVENT_QUEUE_SEED, market.as_ref()],
            &self.program_id,
        )
        .0
    }

    pub fn user_account_address(&self, market: &Pubkey, owner: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[engine_state::USER_ACCOUNT_SEED, market.as_ref(), owner.as_ref()],
            &self.program_id,
        )
        .0
    }

    pub fn oracle_address(&self, market: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[engine_state::ORACLE_SEED, market.as_ref()],
            &self.program_id,
        )
        .0
    }

    fn get_account_data<T: AccountDeserialize>(&self, address: &Pubkey) -> T {
        let account = self
            .svm
            .get_account(address)
            .expect("Program account should exist");
        T::try_deserialize(&mut account.data.as_slice()).expect("Should deserialize account")
    }

    pub fn get_market(&self, market: &Pubkey) -> engine_state::Market {
        self.get_account_data(market)
    }

    pub fn get_user_account(&self, user_account: &Pubkey) -> engine_state::UserAccount {
        self.get_account_data(user_account)
    }

    pub fn get_event_queue(&self, event_queue: &Pubkey) -> engine_state::EventQueue {
        self.get_account_data(event_queue)
    }

    pub fn get_oracle_price(&self, oracle: &Pubkey) -> engine_state::OraclePrice {
        self.get_account_data(oracle)
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

    pub fn initialize_market(
        &mut self,
        payer: &Keypair,
        admin: Pubkey,
        oracle: Pubkey,
        base_mint: Pubkey,
        quote_mint: Pubkey,
        fee_bps: u16,
    ) -> std::result::Result<Pubkey, TransactionError> {
        let market = self.market_address(&admin);
        let accounts = vec![
            AccountMeta::new(payer.pubkey(), true),
            AccountMeta::new_readonly(admin, false),
            AccountMeta::new(market, false),
            AccountMeta::new(self.event_queue_address(&market), false),
            AccountMeta::new_readonly(oracle, false),
            AccountMeta::new_readonly(base_mint, false),
            AccountMeta::new_readonly(quote_mint, false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::ID, false),
        ];
        let args = InitializeMarketArgs { fee_bps };

        self.send_instruction("initialize_market", accounts, args, &[payer])?;
        Ok(market)
    }

    /// Fresh mints and a market administered by `payer`, with its oracle PDA named as oracle.
    pub fn create_market(&mut self, payer: &Keypair) -> Pubkey {
        let (base_mint, quote_mint) = self.create_mints(payer);
        let market = self.market_address(&payer.pubkey());
        let oracle = self.oracle_address(&market);
        self.initialize_market(payer, payer.pubkey(), oracle, base_mint, quote_mint, 10)
            .unwrap()
    }

    /// `payer` funds the user account on first use; `owner` never signs.
    pub fn deposit(
        &mut self,
        payer: &Keypair,
        owner: Pubkey,
        market: Pubkey,
        amount: u64,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new(payer.pubkey(), true),
            AccountMeta::new_readonly(owner, false),
            AccountMeta::new_readonly(market, false),
            AccountMeta::new(self.user_account_address(&market, &owner), false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::ID, false),
        ];
        let args = DepositArgs { amount };

        self.send_instruction("deposit", accounts, args, &[payer])
    }

    /// Creates an empty user account for `owner` and returns its address.
    pub fn open_user_account(&mut self, payer: &Keypair, market: Pubkey, owner: Pubkey) -> Pubkey {
        self.deposit(payer, owner, market, 0).unwrap();
        self.user_account_address(&market, &owner)
    }

    pub fn withdraw(
        &mut self,
        fee_payer: &Keypair,
        market: Pubkey,
        owner: Pubkey,
        recipient: Pubkey,
        amount: u64,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new_readonly(market, false),
            AccountMeta::new(self.user_account_address(&market, &owner), false),
            AccountMeta::new_readonly(recipient, false),
        ];
        let args = WithdrawArgs { amount };

        self.send_instruction("withdraw", accounts, args, &[fee_payer])
    }

    /// `makers` are user account addresses passed as remaining accounts.
    #[allow(clippy::too_many_arguments)]
    pub fn place_order(
        &mut self,
        fee_payer: &Keypair,
        market: Pubkey,
        user_account: Pubkey,
        makers: &[Pubkey],
        price_lots: i64,
        max_base_lots: i64,
        side_is_bid: bool,
    ) -> std::result::Result<(), TransactionError> {
        let mut accounts = vec![
            AccountMeta::new_readonly(market, false),
            AccountMeta::new(user_account, false),
            AccountMeta::new(self.event_queue_address(&market), false),
        ];
        accounts.extend(makers.iter().map(|maker| AccountMeta::new(*maker, false)));
        let args = PlaceOrderArgs {
            price_lots,
            max_base_lots,
            side_is_bid,
        };

        self.send_instruction("place_order", accounts, args, &[fee_payer])
    }

    pub fn cancel_order(
        &mut self,
        fee_payer: &Keypair,
        market: Pubkey,
        user_account: Pubkey,
        order_id: u128,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new_readonly(market, false),
            AccountMeta::new(user_account, false),
        ];
        let args = CancelOrderArgs { order_id };

        self.send_instruction("cancel_order", accounts, args, &[fee_payer])
    }

    pub fn update_oracle(
        &mut self,
        payer: &Keypair,
        market: Pubkey,
        price: i64,
        confidence: u64,
    ) -> std::result::Result<Pubkey, TransactionError> {
        let oracle = self.oracle_address(&market);
        let accounts = vec![
            AccountMeta::new(payer.pubkey(), true),
            AccountMeta::new_readonly(market, false),
            AccountMeta::new(oracle, false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::ID, false),
        ];
        let args = UpdateOracleArgs { price, confidence };

        self.send_instruction("update_oracle", accounts, args, &[payer])?;
        Ok(oracle)
    }

    pub fn liquidate(
        &mut self,
        fee_payer: &Keypair,
        market: Pubkey,
        liqor: Pubkey,
        liqee: Pubkey,
        oracle: Pubkey,
        max_liq_amount: u64,
    ) -> std::result::Result<(), TransactionError> {
        let accounts = vec![
            AccountMeta::new_readonly(market, false),
            AccountMeta::new(liqor, false),
            AccountMeta::new(liqee, false),
            AccountMeta::new_readonly(oracle, false),
        ];
        let args = LiquidateArgs { max_liq_amount };

        self.send_instruction("liquidate", accounts, args, &[fee_payer])
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}
