mod cancel_escrow;
mod create_escrow;
mod emergency_drain;
mod initialize_pool;
mod initialize_treasury;
mod set_lock_seconds;
mod stake;
mod unstake;
mod withdraw_sol_from_treasury;

pub use cancel_escrow::*;
pub use create_escrow::*;
pub use emergency_drain::*;
pub use initialize_pool::*;
pub use initialize_treasury::*;
pub use set_lock_seconds::*;
pub use stake::*;
pub use unstake::*;
pub use withdraw_sol_from_treasury::*;

// Setup metrics collection for all tests.
#[cfg(test)]
mod tests {
    use crate::test_utils::{init_metrics, print_metrics_report};

    #[ctor::ctor]
    fn init() {
        init_metrics();
    }

    #[ctor::dtor]
    fn cleanup() {
        print_metrics_report();
    }
}
