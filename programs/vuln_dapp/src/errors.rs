use anchor_lang::prelude::*;

#[error_code]
pub enum VulnDappError {
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Invalid user for this position")]
    InvalidUser,
    #[msg("Position still locked")]
    StillLocked,
    #[msg("Insufficient staked amount")]
    InsufficientStake,
}
