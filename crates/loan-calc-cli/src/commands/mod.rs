pub mod consolidation;
pub mod equity;
pub mod offset;
pub mod repayment;
pub mod stamp_duty;
