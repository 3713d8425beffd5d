use crate::errors::EngineError;
use crate::helpers::match_orders;
use crate::state::*;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct PlaceOrderArgs {
    pub price_lots: i64,
    pub max_base_lots: i64,
    pub side_is_bid: bool,
}

// Maker user accounts are passed as writable remaining accounts. Neither the
// taker nor any maker signs. Each user account takes part at most once.
#[derive(Accounts)]
pub struct PlaceOrder<'info> {
    pub market: Account<'info, Market>,

    #[account(mut)]
    pub user_account: Account<'info, UserAccount>,

    #[account(
        mut,
        seeds = [EVENT_QUEUE_SEED, market.key().as_ref()],
        bump
    )]
    pub event_queue: Account<'info, EventQueue>,
}

pub fn place_order<'info>(
    ctx: Context<'_, '_, 'info, 'info, PlaceOrder<'info>>,
    args: PlaceOrderArgs,
) -> Result<()> {
    require!(ctx.accounts.market.is_active, EngineError::MarketInactive);
    require!(args.max_base_lots > 0, EngineError::InvalidOrderSize);

    let mut seen_keys = vec![ctx.accounts.user_account.key()];
    let mut maker_accounts = Vec::with_capacity(ctx.remaining_accounts.len());
    for info in ctx.remaining_accounts.iter() {
        if seen_keys.contains(info.key) {
            msg!("skipping repeated user account {}", info.key());
            continue;
        }
        seen_keys.push(info.key());
        maker_accounts.push(Account::<UserAccount>::try_from(info)?);
    }
    let mut makers: Vec<UserAccount> = maker_accounts
        .iter()
        .map(|account| (**account).clone())
        .collect();

    let taker = &mut ctx.accounts.user_account;
    let result = match_orders(taker, &mut makers, args.max_base_lots, args.side_is_bid)?;

    let remaining_base_lots = args.max_base_lots - result.filled_base_lots;
    if remaining_base_lots > 0 {
        let order_id = taker.rest_order(args.price_lots, remaining_base_lots, args.side_is_bid)?;
        msg!("order {} rests with {} base lots", order_id, remaining_base_lots);
    }
    taker.last_update_ts = Clock::get()?.unix_timestamp;

    for (account, maker) in maker_accounts.iter_mut().zip(makers) {
        account.set_inner(maker);
        account.exit(&crate::ID)?;
    }

    let event_queue = &mut ctx.accounts.event_queue;
    for fill in result.fills {
        event_queue.push(fill);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{assert_fails_with, TestRunner};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::{Keypair, Signer};
    use test_case::test_case;

    fn setup_test() -> (TestRunner, Keypair, Pubkey) {
        let mut runner = TestRunner::new();
        let payer = Keypair::new();
        runner.airdrop(&payer.pubkey(), 10_000_000_000);
        let market = runner.create_market(&payer);
        (runner, payer, market)
    }

    #[test_case(0 ; "zero")]
    #[test_case(-5 ; "negative")]
    fn test_place_order_invalid_size(max_base_lots: i64) {
        let (mut runner, payer, market) = setup_test();
        let owner = Keypair::new().pubkey();
        let user = runner.open_user_account(&payer, market, owner);

        let result = runner.place_order(&payer, market, user, &[], 100, max_base_lots, true);
        assert_fails_with(result, "InvalidOrderSize");
    }

    #[test]
    fn test_place_order_rests_without_makers() {
        let (mut runner, payer, market) = setup_test();
        let owner = Keypair::new().pubkey();
        let user = runner.open_user_account(&payer, market, owner);

        runner
            .place_order(&payer, market, user, &[], 100, 5, true)
            .unwrap();

        let user_data = runner.get_user_account(&user);
        let orders: Vec<_> = user_data.active_orders().collect();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, 1);
        assert_eq!(orders[0].price_lots, 100);
        assert_eq!(orders[0].base_lots, 5);
        assert!(orders[0].side_is_bid);
        assert_eq!(user_data.base_position, 0);
    }

    #[test]
    fn test_place_order_fills_against_maker() {
        let (mut runner, payer, market) = setup_test();
        let maker = runner.open_user_account(&payer, market, Keypair::new().pubkey());
        let taker = runner.open_user_account(&payer, market, Keypair::new().pubkey());

        // maker offers 10 lots at 50
        runner
            .place_order(&payer, market, maker, &[], 50, 10, false)
            .unwrap();
        runner
            .place_order(&payer, market, taker, &[maker], 55, 4, true)
            .unwrap();

        let taker_data = runner.get_user_account(&taker);
        assert_eq!(taker_data.base_position, 4);
        assert_eq!(taker_data.quote_position, -200);
        assert_eq!(taker_data.active_orders().count(), 0);

        let maker_data = runner.get_user_account(&maker);
        assert_eq!(maker_data.base_position, -4);
        assert_eq!(maker_data.quote_position, 200);
        assert_eq!(maker_data.open_orders[0].base_lots, 6);

        let queue = runner.get_event_queue(&runner.event_queue_address(&market));
        assert_eq!(queue.len(), 1);
        let fill = queue.iter().next().unwrap();
        assert_eq!(fill.maker, maker_data.owner);
        assert_eq!(fill.taker, taker_data.owner);
        assert_eq!(fill.price_lots, 50);
        assert_eq!(fill.base_lots, 4);
    }

    #[test]
    fn test_place_order_partial_fill_rests_remainder() {
        let (mut runner, payer, market) = setup_test();
        let maker = runner.open_user_account(&payer, market, Keypair::new().pubkey());
        let taker = runner.open_user_account(&payer, market, Keypair::new().pubkey());

        runner
            .place_order(&payer, market, maker, &[], 20, 3, true)
            .unwrap();
        runner
            .place_order(&payer, market, taker, &[maker], 25, 8, false)
            .unwrap();

        let maker_data = runner.get_user_account(&maker);
        assert_eq!(maker_data.active_orders().count(), 0);
        assert_eq!(maker_data.base_position, 3);

        let taker_data = runner.get_user_account(&taker);
        assert_eq!(taker_data.base_position, -3);
        assert_eq!(taker_data.quote_position, 60);
        let resting: Vec<_> = taker_data.active_orders().collect();
        assert_eq!(resting.len(), 1);
        assert_eq!(resting[0].base_lots, 5);
        assert!(!resting[0].side_is_bid);
    }

    #[test]
    fn test_place_order_ignores_price() {
        let (mut runner, payer, market) = setup_test();
        let maker = runner.open_user_account(&payer, market, Keypair::new().pubkey());
        let taker = runner.open_user_account(&payer, market, Keypair::new().pubkey());

        runner
            .place_order(&payer, market, maker, &[], 1_000, 2, false)
            .unwrap();
        // a bid at 1 still lifts an ask at 1000
        runner
            .place_order(&payer, market, taker, &[maker], 1, 2, true)
            .unwrap();

        let taker_data = runner.get_user_account(&taker);
        assert_eq!(taker_data.quote_position, -2_000);
    }

    #[test]
    fn test_place_order_taker_passed_as_maker_is_skipped() {
        let (mut runner, payer, market) = setup_test();
        let user = runner.open_user_account(&payer, market, Keypair::new().pubkey());

        runner
            .place_order(&payer, market, user, &[], 10, 3, false)
            .unwrap();
        runner
            .place_order(&payer, market, user, &[user], 10, 3, true)
            .unwrap();

        let user_data = runner.get_user_account(&user);
        assert_eq!(user_data.base_position, 0);
        assert_eq!(user_data.active_orders().count(), 2);
    }

    #[test]
    fn test_place_order_open_orders_full() {
        let (mut runner, payer, market) = setup_test();
        let user = runner.open_user_account(&payer, market, Keypair::new().pubkey());

        for price in 0..8 {
            runner
                .place_order(&payer, market, user, &[], 100 + price, 1, true)
                .unwrap();
        }
        let result = runner.place_order(&payer, market, user, &[], 200, 1, true);
        assert_fails_with(result, "OpenOrdersFull");
    }

    #[test]
    fn test_place_order_repeated_maker_fills_once() {
        let (mut runner, payer, market) = setup_test();
        let maker = runner.open_user_account(&payer, market, Keypair::new().pubkey());
        let taker = runner.open_user_account(&payer, market, Keypair::new().pubkey());

        runner
            .place_order(&payer, market, maker, &[], 50, 10, false)
            .unwrap();
        runner
            .place_order(&payer, market, taker, &[maker, maker], 50, 20, true)
            .unwrap();

        let maker_data = runner.get_user_account(&maker);
        let taker_data = runner.get_user_account(&taker);
        assert_eq!(taker_data.base_position, 10);
        assert_eq!(taker_data.base_position, -maker_data.base_position);
        assert_eq!(taker_data.quote_position, -maker_data.quote_position);
        assert_eq!(maker_data.quote_position, 500);
        assert_eq!(maker_data.active_orders().count(), 0);

        // the unmatched half rests on the taker
        let resting: Vec<_> = taker_data.active_orders().collect();
        assert_eq!(resting.len(), 1);
        assert_eq!(resting[0].base_lots, 10);

        let queue = runner.get_event_queue(&runner.event_queue_address(&market));
        assert_eq!(queue.len(), 1);
    }
}
