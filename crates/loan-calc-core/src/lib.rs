pub mod error;
pub mod repayment;
pub mod time_value;
pub mod types;

#[cfg(feature = "offset")]
pub mod offset;

#[cfg(feature = "consolidation")]
pub mod consolidation;

#[cfg(feature = "stamp_duty")]
pub mod stamp_duty;

#[cfg(feature = "equity")]
pub mod equity;

pub use error::LoanCalcError;
pub use types::*;

/// Standard result type for all loan-calc operations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
