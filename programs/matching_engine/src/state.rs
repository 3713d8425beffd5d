use crate::errors::EngineError;
use anchor_lang::prelude::*;

pub const MARKET_SEED: &[u8] = b"market";
pub const USER_ACCOUNT_SEED: &[u8] = b"user_account";
pub const EVENT_QUEUE_SEED: &[u8] = b"event_queue";
pub const ORACLE_SEED: &[u8] = b"oracle";

pub const MAX_OPEN_ORDERS: usize = 8;
pub const EVENT_QUEUE_CAPACITY: u64 = 64;

#[account]
#[derive(Default, InitSpace)]
pub struct Market {
    /// Bump seed
    pub bump: u8,
    pub admin: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    /// Oracle named at the last (re)initialization, not enforced on reads
    pub oracle: Pubkey,
    pub fee_bps: u16,
    pub is_active: bool,
}

impl Market {
    /// A created market always names a base mint, and no mint lives at the
    /// default address.
    pub fn is_initialized(&self) -> bool {
        self.base_mint != Pubkey::default()
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, InitSpace)]
pub struct Order {
    pub id: u128,
    pub price_lots: i64,
    pub base_lots: i64,
    pub side_is_bid: bool,
    pub is_active: bool,
}

impl Order {
    /// Takes `base_lots` off the order, deactivating it once nothing is left.
    pub fn fill(&mut self, base_lots: i64) {
        self.base_lots -= base_lots;
        if self.base_lots == 0 {
            self.is_active = false;
        }
    }
}

/// Positions and resting orders of one owner on one market.
#[account]
#[derive(Default, InitSpace)]
pub struct UserAccount {
    pub bump: u8,
    pub owner: Pubkey,
    pub market: Pubkey,
    pub base_position: i64,
    pub quote_position: i64,
    pub last_update_ts: i64,
    /// Last order id handed out
    pub order_sequence: u64,
    pub open_orders: [Order; MAX_OPEN_ORDERS],
}

impl UserAccount {
    /// `market` is a program account, so it is never the default address.
    pub fn is_initialized(&self) -> bool {
        self.market != Pubkey::default()
    }

    pub fn settle(&mut self, base_delta: i64, quote_delta: i64) -> Result<()> {
        self.base_position = self
            .base_position
            .checked_add(base_delta)
            .ok_or(EngineError::MathError)?;
        self.quote_position = self
            .quote_position
            .checked_add(quote_delta)
            .ok_or(EngineError::MathError)?;
        Ok(())
    }

    /// Puts an order in the first free slot and returns its id.
    pub fn rest_order(&mut self, price_lots: i64, base_lots: i64, side_is_bid: bool) -> Result<u128> {
        let id = self
            .order_sequence
            .checked_add(1)
            .ok_or(EngineError::MathError)?;
        let slot = self
            .open_orders
            .iter_mut()
            .find(|order| !order.is_active)
            .ok_or(EngineError::OpenOrdersFull)?;
        *slot = Order {
            id: id as u128,
            price_lots,
            base_lots,
            side_is_bid,
            is_active: true,
        };
        self.order_sequence = id;
        Ok(id as u128)
    }

    /// Deactivates every order carrying `order_id`, returning how many matched.
    pub fn cancel_order(&mut self, order_id: u128) -> usize {
        let mut cancelled = 0;
        for order in self.open_orders.iter_mut().filter(|order| order.id == order_id) {
            order.is_active = false;
            order.base_lots = 0;
            cancelled += 1;
        }
        cancelled
    }

    pub fn active_orders(&self) -> impl Iterator<Item = &Order> {
        self.open_orders.iter().filter(|order| order.is_active)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, InitSpace)]
pub struct FillEvent {
    pub maker: Pubkey,
    pub taker: Pubkey,
    pub price_lots: i64,
    pub base_lots: i64,
}

// Ring buffer over `events`: slots are appended until the capacity is
// reached and overwritten afterwards, the oldest entry sits at `head`.
#[account]
#[derive(Default, InitSpace)]
pub struct EventQueue {
    pub head: u64,
    pub tail: u64,
    pub capacity: u64,
    #[max_len(64)] // EVENT_QUEUE_CAPACITY
    pub events: Vec<FillEvent>,
}

impl EventQueue {
    pub fn init(&mut self, capacity: u64) {
        self.head = 0;
        self.tail = 0;
        self.capacity = capacity;
        self.events.clear();
    }

    /// Drops the event while the queue has no capacity.
    pub fn push(&mut self, event: FillEvent) {
        if self.capacity == 0 {
            return;
        }
        let index = (self.tail % self.capacity) as usize;
        if index < self.events.len() {
            self.events[index] = event;
        } else {
            self.events.push(event);
        }
        self.tail = self.tail.wrapping_add(1);
        if self.tail.wrapping_sub(self.head) > self.capacity {
            self.head = self.head.wrapping_add(1);
        }
    }

    pub fn len(&self) -> u64 {
        self.tail.wrapping_sub(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &FillEvent> {
        (self.head..self.tail).map(move |seq| &self.events[(seq % self.capacity) as usize])
    }
}

#[account]
#[derive(Default, InitSpace)]
pub struct OraclePrice {
    pub bump: u8,
    pub price: i64,
    pub confidence: u64,
    pub last_updated_slot: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn fill(base_lots: i64) -> FillEvent {
        FillEvent {
            base_lots,
            ..FillEvent::default()
        }
    }

    #[test]
    fn test_event_queue_grows_until_capacity() {
        let mut queue = EventQueue::default();
        queue.init(4);
        for i in 0..3 {
            queue.push(fill(i));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.events.len(), 3);
        assert_eq!(queue.head, 0);
        let lots: Vec<i64> = queue.iter().map(|event| event.base_lots).collect();
        assert_eq!(lots, vec![0, 1, 2]);
    }

    #[test]
    fn test_event_queue_overwrites_oldest() {
        let mut queue = EventQueue::default();
        queue.init(4);
        for i in 0..6 {
            queue.push(fill(i));
        }
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.events.len(), 4);
        assert_eq!(queue.head, 2);
        assert_eq!(queue.tail, 6);
        let lots: Vec<i64> = queue.iter().map(|event| event.base_lots).collect();
        assert_eq!(lots, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_event_queue_without_capacity_drops_events() {
        let mut queue = EventQueue::default();
        queue.push(fill(1));
        assert!(queue.is_empty());
        assert!(queue.events.is_empty());
        assert_eq!(queue.iter().count(), 0);
    }

    #[test]
    fn test_is_initialized_ignores_default_keys() {
        let market = Market {
            base_mint: Pubkey::new_unique(),
            ..Market::default()
        };
        assert!(market.is_initialized());
        assert!(!Market::default().is_initialized());

        let user = UserAccount {
            market: Pubkey::new_unique(),
            ..UserAccount::default()
        };
        assert!(user.is_initialized());
        assert!(!UserAccount::default().is_initialized());
    }

    #[test]
    fn test_rest_order_assigns_increasing_ids() {
        let mut user = UserAccount::default();
        assert_eq!(user.rest_order(100, 5, true).unwrap(), 1);
        assert_eq!(user.rest_order(101, 6, false).unwrap(), 2);
        assert_eq!(user.active_orders().count(), 2);
        assert_eq!(user.order_sequence, 2);
    }

    #[test]
    fn test_rest_order_full_book() {
        let mut user = UserAccount::default();
        for _ in 0..MAX_OPEN_ORDERS {
            user.rest_order(100, 1, true).unwrap();
        }
        assert_eq!(
            user.rest_order(100, 1, true).unwrap_err(),
            Error::from(EngineError::OpenOrdersFull)
        );
        // a cancelled slot is reused
        assert_eq!(user.cancel_order(3), 1);
        assert_eq!(user.rest_order(100, 1, true).unwrap(), 9);
        assert_eq!(user.open_orders[2].id, 9);
    }

    #[test]
    fn test_cancel_unknown_order_is_noop() {
        let mut user = UserAccount::default();
        user.rest_order(100, 5, true).unwrap();
        assert_eq!(user.cancel_order(42), 0);
        assert_eq!(user.active_orders().count(), 1);
    }

    #[test]
    fn test_settle_overflow() {
        let mut user = UserAccount::default();
        user.settle(i64::MAX, 0).unwrap();
        assert_eq!(user.settle(1, 0).unwrap_err(), Error::from(EngineError::MathError));
        user.settle(0, i64::MIN).unwrap();
        assert_eq!(user.settle(0, -1).unwrap_err(), Error::from(EngineError::MathError));
    }

    #[test]
    fn test_order_fill_deactivates_at_zero() {
        let mut order = Order {
            id: 1,
            price_lots: 10,
            base_lots: 5,
            side_is_bid: false,
            is_active: true,
        };
        order.fill(3);
        assert!(order.is_active);
        order.fill(2);
        assert!(!order.is_active);
    }
}
