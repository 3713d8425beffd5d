mod cancel_order;
mod deposit;
mod initialize_market;
mod liquidate;
mod place_order;
mod update_oracle;
mod withdraw;

pub use cancel_order::*;
pub use deposit::*;
pub use initialize_market::*;
pub use liquidate::*;
pub use place_order::*;
pub use update_oracle::*;
pub use withdraw::*;
