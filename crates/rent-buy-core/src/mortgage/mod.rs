pub mod amortization;
pub mod arm;
