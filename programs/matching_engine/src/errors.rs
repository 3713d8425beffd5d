use anchor_lang::prelude::*;

#[error_code]
pub enum EngineError {
    #[msg("Math operation overflowed or underflowed")]
    MathError,
    #[msg("Market is inactive")]
    MarketInactive,
    #[msg("Order size must be positive")]
    InvalidOrderSize,
    #[msg("No free open order slot")]
    OpenOrdersFull,
}
