pub mod monte_carlo;
pub mod mortgage;
pub mod scenario;

use clap::ValueEnum;
use rent_buy_core::time_value::RateConvention;

/// Annual-to-monthly rate conversion, as accepted on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ConventionArg {
    /// annual / 12
    #[default]
    Simple,
    /// (1 + annual)^(1/12) - 1
    Effective,
}

impl From<ConventionArg> for RateConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::Simple => RateConvention::Simple,
            ConventionArg::Effective => RateConvention::Effective,
        }
    }
}
