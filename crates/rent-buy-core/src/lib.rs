pub mod assumptions;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "cash_flow")]
pub mod cash_flow;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

pub use error::RentBuyError;
pub use types::*;

/// Standard result type for all rent-buy operations
pub type RentBuyResult<T> = Result<T, RentBuyError>;
