pub mod statistics;
pub mod withdrawal;
