//! Two-asset (stock/cash) random-walk portfolio with one scheduled lump-sum
//! withdrawal, typically the down payment on a home.
//!
//! Monthly gross returns are `1 + Normal(mean/12, vol/sqrt(12))`. Returns
//! are drawn in a fixed order (stock before the withdrawal, cash before,
//! stock after, cash after; simulation-major within each block) from a
//! seeded `StdRng`, so a seed reproduces every path bit for bit.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::time::Instant;
use tracing::{debug, info};

use super::statistics::{
    median_sorted, percentile_sorted, sort_values, summarize_distribution, DistributionSummary,
};
use crate::error::RentBuyError;
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::RentBuyResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Configuration of one Monte Carlo run.
///
/// Missing fields fall back to [`MonteCarloInput::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloInput {
    pub years: u32,
    pub num_simulations: u32,
    pub stock_start: f64,
    pub cash_start: f64,
    /// Year at whose start the withdrawal happens (0 = immediately).
    pub withdraw_year: u32,
    pub withdraw_stock: f64,
    pub withdraw_cash: f64,
    /// Annual expected return of the stock sleeve.
    pub stock_mean: f64,
    /// Annual volatility of the stock sleeve.
    pub stock_vol: f64,
    pub cash_mean: f64,
    pub cash_vol: f64,
    pub monthly_stock_contribution: f64,
    pub monthly_cash_contribution: f64,
    pub seed: u64,
}

impl Default for MonteCarloInput {
    fn default() -> Self {
        Self {
            years: 30,
            num_simulations: 1_000,
            stock_start: 600_000.0,
            cash_start: 600_000.0,
            withdraw_year: 5,
            withdraw_stock: 200_000.0,
            withdraw_cash: 100_000.0,
            stock_mean: 0.065,
            stock_vol: 0.18,
            cash_mean: 0.03,
            cash_vol: 0.005,
            monthly_stock_contribution: 0.0,
            monthly_cash_contribution: 0.0,
            seed: 42,
        }
    }
}

impl MonteCarloInput {
    pub fn n_months(&self) -> u32 {
        self.years * 12
    }

    pub fn withdraw_month(&self) -> u32 {
        self.withdraw_year * 12
    }

    fn validate(&self) -> RentBuyResult<()> {
        if self.num_simulations == 0 {
            return Err(RentBuyError::invalid("num_simulations", "Must be at least 1"));
        }
        for (field, value) in [
            ("stock_start", self.stock_start),
            ("cash_start", self.cash_start),
            ("withdraw_stock", self.withdraw_stock),
            ("withdraw_cash", self.withdraw_cash),
            ("stock_mean", self.stock_mean),
            ("stock_vol", self.stock_vol),
            ("cash_mean", self.cash_mean),
            ("cash_vol", self.cash_vol),
            ("monthly_stock_contribution", self.monthly_stock_contribution),
            ("monthly_cash_contribution", self.monthly_cash_contribution),
        ] {
            if !value.is_finite() {
                return Err(RentBuyError::invalid(field, "Must be a finite number"));
            }
        }
        for (field, vol) in [("stock_vol", self.stock_vol), ("cash_vol", self.cash_vol)] {
            if vol < 0.0 {
                return Err(RentBuyError::invalid(field, "Volatility must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Terminal-wealth distribution plus withdrawal facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalSummary {
    #[serde(flatten)]
    pub distribution: DistributionSummary,
    /// Share of simulations ending below the combined starting balance.
    pub probability_below_start: f64,
    pub total_withdrawn: f64,
}

/// Output of a run. Matrices are indexed `[simulation][month]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloOutput {
    pub n_months: u32,
    /// Month index at which the withdrawal is applied.
    pub withdraw_month: u32,
    pub total_paths: Vec<Vec<f64>>,
    pub stock_paths: Vec<Vec<f64>>,
    pub cash_paths: Vec<Vec<f64>>,
    pub median_path: Vec<f64>,
    pub p10_path: Vec<f64>,
    pub p90_path: Vec<f64>,
    /// Total wealth at the end of the horizon, one entry per simulation.
    pub final_values: Vec<f64>,
    pub summary: TerminalSummary,
}

impl MonteCarloOutput {
    /// Drop the per-simulation matrices, keeping the aggregates.
    pub fn without_paths(self) -> Self {
        Self {
            total_paths: Vec::new(),
            stock_paths: Vec::new(),
            cash_paths: Vec::new(),
            ..self
        }
    }
}

/// Parameters of one asset sleeve.
struct Sleeve {
    name: &'static str,
    start: f64,
    contribution: f64,
    withdrawal: f64,
    monthly_mean: f64,
    monthly_vol: f64,
}

impl Sleeve {
    fn new(
        name: &'static str,
        start: f64,
        contribution: f64,
        withdrawal: f64,
        annual_mean: f64,
        annual_vol: f64,
    ) -> Self {
        Self {
            name,
            start,
            contribution,
            withdrawal,
            monthly_mean: annual_mean / 12.0,
            monthly_vol: annual_vol / 12f64.sqrt(),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation helpers
// ---------------------------------------------------------------------------

/// Gross monthly returns for every (simulation, month) cell.
fn draw_returns(
    rng: &mut StdRng,
    standard_normal: &Normal,
    sleeve: &Sleeve,
    n_sims: usize,
    months: usize,
) -> Vec<Vec<f64>> {
    let mut returns = Vec::with_capacity(n_sims);
    for _ in 0..n_sims {
        let mut row = Vec::with_capacity(months);
        for _ in 0..months {
            let z: f64 = rng.sample(standard_normal);
            row.push(1.0 + (sleeve.monthly_mean + sleeve.monthly_vol * z));
        }
        returns.push(row);
    }
    returns
}

/// Compound each simulation from its own starting balance.
///
/// The first month grows the start and then adds the contribution; later
/// months add the contribution before growing.
fn grow(starts: &[f64], returns: &[Vec<f64>], contribution: f64) -> Vec<Vec<f64>> {
    starts
        .iter()
        .zip(returns)
        .map(|(&start, row)| {
            let mut path = Vec::with_capacity(row.len());
            let mut balance = start;
            for (t, gross) in row.iter().enumerate() {
                balance = if t == 0 {
                    start * gross + contribution
                } else {
                    (balance + contribution) * gross
                };
                path.push(balance);
            }
            path
        })
        .collect()
}

/// Balance at the end of each pre-withdrawal path, or the start when the
/// segment is empty.
fn boundary_balances(paths: &[Vec<f64>], start: f64) -> Vec<f64> {
    paths
        .iter()
        .map(|p| p.last().copied().unwrap_or(start))
        .collect()
}

fn concat(pre: Vec<Vec<f64>>, post: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    pre.into_iter()
        .zip(post)
        .map(|(mut head, tail)| {
            head.extend(tail);
            head
        })
        .collect()
}

/// Median, 10th and 90th percentile of every month across simulations.
fn cross_sections(paths: &[Vec<f64>], months: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut median = Vec::with_capacity(months);
    let mut p10 = Vec::with_capacity(months);
    let mut p90 = Vec::with_capacity(months);
    let mut column = Vec::with_capacity(paths.len());
    for t in 0..months {
        column.clear();
        column.extend(paths.iter().map(|p| p[t]));
        sort_values(&mut column);
        median.push(median_sorted(&column));
        p10.push(percentile_sorted(&column, 10.0));
        p90.push(percentile_sorted(&column, 90.0));
    }
    (median, p10, p90)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate the portfolio around the scheduled withdrawal.
///
/// A withdrawal at or after the horizon leaves an empty post-withdrawal
/// segment; one strictly after the horizon never happens and is reported as a
/// warning. Withdrawals larger than a sleeve's balance floor it at zero.
pub fn run_withdrawal_simulation(
    input: &MonteCarloInput,
) -> RentBuyResult<ComputationOutput<MonteCarloOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    input.validate()?;

    let n_sims = input.num_simulations as usize;
    let n_months = input.n_months();
    let withdraw_month = input.withdraw_month();
    let pre_len = withdraw_month.min(n_months) as usize;
    let post_len = n_months as usize - pre_len;
    let withdrawal_applies = withdraw_month <= n_months;

    if !withdrawal_applies {
        warnings.push(format!(
            "Withdrawal year {} is beyond the {}-year horizon; no withdrawal applied",
            input.withdraw_year, input.years
        ));
    } else if post_len == 0 && pre_len > 0 {
        warnings.push(format!(
            "Withdrawal at the end of the {}-year horizon is counted in total_withdrawn but terminal values are pre-withdrawal balances",
            input.years
        ));
    }

    debug!(
        simulations = n_sims,
        n_months,
        withdraw_month,
        seed = input.seed,
        "running withdrawal Monte Carlo"
    );

    let stock = Sleeve::new(
        "stock",
        input.stock_start,
        input.monthly_stock_contribution,
        input.withdraw_stock,
        input.stock_mean,
        input.stock_vol,
    );
    let cash = Sleeve::new(
        "cash",
        input.cash_start,
        input.monthly_cash_contribution,
        input.withdraw_cash,
        input.cash_mean,
        input.cash_vol,
    );

    let standard_normal = Normal::new(0.0, 1.0).map_err(|e| RentBuyError::InvalidInput {
        field: "distribution".into(),
        reason: format!("Invalid Normal parameters: {e}"),
    })?;
    let mut rng = StdRng::seed_from_u64(input.seed);

    // Pre-withdrawal
    let stock_returns_pre = draw_returns(&mut rng, &standard_normal, &stock, n_sims, pre_len);
    let cash_returns_pre = draw_returns(&mut rng, &standard_normal, &cash, n_sims, pre_len);
    let stock_pre = grow(&vec![stock.start; n_sims], &stock_returns_pre, stock.contribution);
    let cash_pre = grow(&vec![cash.start; n_sims], &cash_returns_pre, cash.contribution);

    // Withdrawal, floored at zero per sleeve
    let mut after = Vec::with_capacity(2);
    for (sleeve, pre) in [(&stock, &stock_pre), (&cash, &cash_pre)] {
        let at_withdrawal = boundary_balances(pre, sleeve.start);
        if !withdrawal_applies {
            after.push(at_withdrawal);
            continue;
        }
        let short = at_withdrawal
            .iter()
            .filter(|&&b| b < sleeve.withdrawal)
            .count();
        if short > 0 {
            warnings.push(format!(
                "Withdrawal from {} exceeded the balance in {short} of {n_sims} simulations; floored at zero",
                sleeve.name
            ));
        }
        after.push(
            at_withdrawal
                .into_iter()
                .map(|b| (b - sleeve.withdrawal).max(0.0))
                .collect(),
        );
    }
    let cash_after = after.pop().unwrap_or_default();
    let stock_after = after.pop().unwrap_or_default();

    // Post-withdrawal
    let stock_returns_post = draw_returns(&mut rng, &standard_normal, &stock, n_sims, post_len);
    let cash_returns_post = draw_returns(&mut rng, &standard_normal, &cash, n_sims, post_len);
    let stock_post = grow(&stock_after, &stock_returns_post, stock.contribution);
    let cash_post = grow(&cash_after, &cash_returns_post, cash.contribution);

    let stock_paths = concat(stock_pre, stock_post);
    let cash_paths = concat(cash_pre, cash_post);
    let total_paths: Vec<Vec<f64>> = stock_paths
        .iter()
        .zip(&cash_paths)
        .map(|(s, c)| s.iter().zip(c).map(|(a, b)| a + b).collect())
        .collect();

    let (median_path, p10_path, p90_path) = cross_sections(&total_paths, n_months as usize);

    let final_values: Vec<f64> = total_paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            p.last()
                .copied()
                .unwrap_or(stock_after[i] + cash_after[i])
        })
        .collect();

    let distribution = summarize_distribution(&final_values).ok_or_else(|| {
        RentBuyError::InsufficientData("No simulated terminal values".into())
    })?;
    let starting_total = input.stock_start + input.cash_start;
    let below_start = final_values.iter().filter(|&&v| v < starting_total).count();
    let total_withdrawn = if withdrawal_applies {
        input.withdraw_stock + input.withdraw_cash
    } else {
        0.0
    };

    info!(
        median_terminal = distribution.median,
        simulations = n_sims,
        "withdrawal Monte Carlo complete"
    );

    let output = MonteCarloOutput {
        n_months,
        withdraw_month,
        total_paths,
        stock_paths,
        cash_paths,
        median_path,
        p10_path,
        p90_path,
        final_values,
        summary: TerminalSummary {
            distribution,
            probability_below_start: below_start as f64 / n_sims as f64,
            total_withdrawn,
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Two-asset Monte Carlo with scheduled withdrawal",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: u64 = 42;

    fn small_input() -> MonteCarloInput {
        MonteCarloInput {
            years: 10,
            num_simulations: 200,
            withdraw_year: 3,
            seed: SEED,
            ..MonteCarloInput::default()
        }
    }

    /// Zero volatility makes every path the deterministic recurrence.
    fn deterministic() -> MonteCarloInput {
        MonteCarloInput {
            years: 2,
            num_simulations: 3,
            stock_start: 1000.0,
            cash_start: 500.0,
            withdraw_year: 1,
            withdraw_stock: 100.0,
            withdraw_cash: 50.0,
            stock_mean: 0.12,
            stock_vol: 0.0,
            cash_mean: 0.0,
            cash_vol: 0.0,
            monthly_stock_contribution: 10.0,
            monthly_cash_contribution: 0.0,
            seed: SEED,
        }
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let a = run_withdrawal_simulation(&small_input()).unwrap().result;
        let b = run_withdrawal_simulation(&small_input()).unwrap().result;
        assert_eq!(a.final_values, b.final_values);
        assert_eq!(a.total_paths, b.total_paths);
    }

    #[test]
    fn test_different_seed_differs() {
        let a = run_withdrawal_simulation(&small_input()).unwrap().result;
        let mut other = small_input();
        other.seed = 7;
        let b = run_withdrawal_simulation(&other).unwrap().result;
        assert_ne!(a.final_values, b.final_values);
    }

    #[test]
    fn test_shapes() {
        let out = run_withdrawal_simulation(&small_input()).unwrap().result;
        assert_eq!(out.total_paths.len(), 200);
        assert!(out.total_paths.iter().all(|p| p.len() == 120));
        assert_eq!(out.median_path.len(), 120);
        assert_eq!(out.final_values.len(), 200);
        assert_eq!(out.withdraw_month, 36);
        for (i, p) in out.total_paths.iter().enumerate() {
            assert_eq!(p[119], out.final_values[i]);
            assert_eq!(p[50], out.stock_paths[i][50] + out.cash_paths[i][50]);
        }
    }

    #[test]
    fn test_deterministic_recurrence() {
        let out = run_withdrawal_simulation(&deterministic()).unwrap().result;
        let g = 1.0 + 0.12 / 12.0;
        let s = &out.stock_paths[0];
        assert_eq!(s[0], 1000.0 * g + 10.0);
        assert_eq!(s[1], (s[0] + 10.0) * g);
        // First post-withdrawal month grows the net balance, then contributes.
        assert_eq!(s[12], (s[11] - 100.0) * g + 10.0);
        assert_eq!(out.stock_paths[2], *s);
        let c = &out.cash_paths[0];
        assert_eq!(c[11], 500.0);
        assert_eq!(c[12], 450.0);
        assert_eq!(out.summary.total_withdrawn, 150.0);
    }

    #[test]
    fn test_withdraw_year_zero_hits_starting_balances() {
        let input = MonteCarloInput {
            withdraw_year: 0,
            ..deterministic()
        };
        let out = run_withdrawal_simulation(&input).unwrap().result;
        assert_eq!(out.withdraw_month, 0);
        assert_eq!(out.stock_paths[0].len(), 24);
        assert_eq!(out.stock_paths[0][0], 900.0 * (1.0 + 0.12 / 12.0) + 10.0);
        assert_eq!(out.cash_paths[0][0], 450.0);
    }

    #[test]
    fn test_withdrawal_floored_at_zero() {
        let input = MonteCarloInput {
            withdraw_stock: 1_000_000.0,
            withdraw_cash: 1_000_000.0,
            ..small_input()
        };
        let out = run_withdrawal_simulation(&input).unwrap();
        let m = out.result.withdraw_month as usize;
        for i in 0..out.result.stock_paths.len() {
            // Month m is the first after the withdrawal: 0 * r + 0 contribution.
            assert_eq!(out.result.stock_paths[i][m], 0.0);
            assert_eq!(out.result.cash_paths[i][m], 0.0);
            assert!(out.result.total_paths[i].iter().all(|v| *v >= 0.0));
        }
        assert!(out.warnings.iter().any(|w| w.contains("floored at zero")));
    }

    #[test]
    fn test_withdrawal_beyond_horizon_never_applied() {
        let input = MonteCarloInput {
            withdraw_year: 5,
            ..deterministic()
        };
        let out = run_withdrawal_simulation(&input).unwrap();
        assert_eq!(out.result.stock_paths[0].len(), 24);
        assert_eq!(out.result.cash_paths[0][23], 500.0);
        assert_eq!(out.result.summary.total_withdrawn, 0.0);
        assert!(out.warnings.iter().any(|w| w.contains("beyond")));
    }

    #[test]
    fn test_withdrawal_at_horizon_leaves_empty_tail() {
        let input = MonteCarloInput {
            withdraw_year: 2,
            ..deterministic()
        };
        let out = run_withdrawal_simulation(&input).unwrap();
        assert_eq!(out.result.stock_paths[0].len(), 24);
        assert_eq!(out.result.final_values[0], out.result.total_paths[0][23]);
        assert_eq!(out.result.summary.total_withdrawn, 150.0);
        assert!(out.warnings.iter().any(|w| w.contains("pre-withdrawal balances")));
    }

    #[test]
    fn test_zero_horizon_with_immediate_withdrawal_has_no_tail_warning() {
        let input = MonteCarloInput {
            years: 0,
            withdraw_year: 0,
            ..deterministic()
        };
        let out = run_withdrawal_simulation(&input).unwrap();
        assert!(out.warnings.iter().all(|w| !w.contains("pre-withdrawal")));
    }

    #[test]
    fn test_zero_horizon() {
        let input = MonteCarloInput {
            years: 0,
            withdraw_year: 0,
            ..deterministic()
        };
        let out = run_withdrawal_simulation(&input).unwrap().result;
        assert!(out.total_paths.iter().all(|p| p.is_empty()));
        assert!(out.median_path.is_empty());
        assert_eq!(out.final_values, vec![1350.0; 3]);
    }

    #[test]
    fn test_median_path_is_cross_sectional_median() {
        let out = run_withdrawal_simulation(&small_input()).unwrap().result;
        let mut column: Vec<f64> = out.total_paths.iter().map(|p| p[60]).collect();
        sort_values(&mut column);
        assert_eq!(out.median_path[60], (column[99] + column[100]) / 2.0);
        assert!(out.p10_path[60] <= out.median_path[60]);
        assert!(out.median_path[60] <= out.p90_path[60]);
    }

    #[test]
    fn test_negative_volatility_rejected() {
        let input = MonteCarloInput {
            stock_vol: -0.1,
            ..small_input()
        };
        assert!(run_withdrawal_simulation(&input).is_err());
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let input = MonteCarloInput {
            cash_mean: f64::NAN,
            ..small_input()
        };
        assert!(run_withdrawal_simulation(&input).is_err());
        let input = MonteCarloInput {
            stock_start: f64::INFINITY,
            ..small_input()
        };
        assert!(run_withdrawal_simulation(&input).is_err());
    }

    #[test]
    fn test_zero_simulations_rejected() {
        let input = MonteCarloInput {
            num_simulations: 0,
            ..small_input()
        };
        assert!(run_withdrawal_simulation(&input).is_err());
    }

    #[test]
    fn test_without_paths_keeps_aggregates() {
        let out = run_withdrawal_simulation(&small_input()).unwrap().result;
        let median = out.median_path.clone();
        let slim = out.without_paths();
        assert!(slim.total_paths.is_empty());
        assert_eq!(slim.median_path, median);
        assert_eq!(slim.final_values.len(), 200);
    }
}
