//! Equity statistics calculator.

use rust_decimal::Decimal;

use super::constants::{HUNDRED, TRADING_DAYS};
use super::math::{mean, population_std_dev, sqrt_decimal};
use super::types::{DrawdownMetrics, EquityStats};
use crate::backtest::trade::{Trade, TradeOutcome};

/// Computes [`EquityStats`] from an ordered list of resolved trades.
#[derive(Debug, Clone, Copy)]
pub struct EquityAnalyzer {
    initial_balance: Decimal,
}

impl EquityAnalyzer {
    /// Create an analyzer anchored at `initial_balance`.
    #[must_use]
    pub const fn new(initial_balance: Decimal) -> Self {
        Self { initial_balance }
    }

    /// Equity curve for `trades`, starting at the initial balance.
    #[must_use]
    pub fn equity_curve(&self, trades: &[Trade]) -> Vec<Decimal> {
        generate_equity_curve(trades, self.initial_balance)
    }

    /// Calculate all statistics.
    #[must_use]
    pub fn calculate(&self, trades: &[Trade]) -> EquityStats {
        let curve = self.equity_curve(trades);
        let final_balance = curve.last().copied().unwrap_or(self.initial_balance);
        let total_pnl = final_balance - self.initial_balance;

        let percent_gain = if self.initial_balance > Decimal::ZERO {
            total_pnl / self.initial_balance * HUNDRED
        } else {
            Decimal::ZERO
        };

        let tally = TradeTally::from_trades(trades);
        let total_trades = trades.len();
        let count = Decimal::from(total_trades as u64);

        let win_rate = ratio_pct(tally.winning, total_trades);

        let avg_win = if tally.winning > 0 {
            tally.gross_profit / Decimal::from(tally.winning as u64)
        } else {
            Decimal::ZERO
        };
        let avg_loss = if tally.losing > 0 {
            tally.gross_loss / Decimal::from(tally.losing as u64)
        } else {
            Decimal::ZERO
        };

        // Break-even trades count in the denominator.
        let (avg_r_multiple, avg_pnl_per_trade) = if total_trades > 0 {
            let r_sum: Decimal = trades.iter().map(Trade::r_multiple).sum();
            (r_sum / count, total_pnl / count)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        let streaks = Streaks::from_trades(trades);
        let drawdown = drawdown_metrics(&curve);

        EquityStats {
            initial_balance: self.initial_balance,
            final_balance,
            total_pnl,
            percent_gain,
            win_rate,
            total_trades,
            winning_trades: tally.winning,
            losing_trades: tally.losing,
            max_drawdown: drawdown.max_drawdown,
            max_drawdown_percent: drawdown.max_drawdown_percent,
            drawdown_duration: drawdown.max_duration,
            sharpe_ratio: sharpe_ratio(&curve),
            profit_factor: profit_factor(tally.gross_profit, tally.gross_loss),
            longest_win_streak: streaks.longest_win,
            longest_loss_streak: streaks.longest_loss,
            current_streak: streaks.current,
            avg_win,
            avg_loss,
            largest_win: tally.largest_win,
            largest_loss: tally.largest_loss,
            avg_r_multiple,
            expectancy: avg_r_multiple,
            avg_pnl_per_trade,
        }
    }
}

/// Start-anchored running balance, one point per trade.
#[must_use]
pub fn generate_equity_curve(trades: &[Trade], initial_balance: Decimal) -> Vec<Decimal> {
    let mut curve = Vec::with_capacity(trades.len() + 1);
    let mut balance = initial_balance;
    curve.push(balance);

    for trade in trades {
        balance += trade.pnl();
        curve.push(balance);
    }

    curve
}

/// Maximum drawdown and longest drawdown duration.
///
/// A new peak needs a strictly greater balance and resets the duration.
/// Magnitude and duration are tracked independently.
#[must_use]
pub fn drawdown_metrics(curve: &[Decimal]) -> DrawdownMetrics {
    let Some((&first, rest)) = curve.split_first() else {
        return DrawdownMetrics::default();
    };

    let mut metrics = DrawdownMetrics::default();
    let mut peak = first;
    let mut duration = 0usize;

    for &balance in rest {
        if balance > peak {
            peak = balance;
            duration = 0;
            continue;
        }

        duration += 1;
        metrics.max_duration = metrics.max_duration.max(duration);

        let drawdown = peak - balance;
        if drawdown > metrics.max_drawdown {
            metrics.max_drawdown = drawdown;
            metrics.max_drawdown_percent = if peak > Decimal::ZERO {
                drawdown / peak * HUNDRED
            } else {
                Decimal::ZERO
            };
        }
    }

    metrics
}

/// Annualized Sharpe ratio of per-step curve returns.
///
/// Treats one trade as one trading day (sqrt(252) scaling). Returns 0 for
/// curves with fewer than two points or returns with no spread.
#[must_use]
pub fn sharpe_ratio(curve: &[Decimal]) -> Decimal {
    if curve.len() < 2 {
        return Decimal::ZERO;
    }

    let returns: Vec<Decimal> = curve
        .windows(2)
        .map(|pair| {
            if pair[0] > Decimal::ZERO {
                (pair[1] - pair[0]) / pair[0]
            } else {
                Decimal::ZERO
            }
        })
        .collect();

    let (Some(avg), Some(std)) = (mean(&returns), population_std_dev(&returns)) else {
        return Decimal::ZERO;
    };
    if std.is_zero() {
        return Decimal::ZERO;
    }

    let annualization = sqrt_decimal(TRADING_DAYS).unwrap_or(Decimal::ZERO);
    avg / std * annualization
}

/// Gross profit over gross loss, 0 when nothing was lost.
#[must_use]
pub fn profit_factor(gross_profit: Decimal, gross_loss: Decimal) -> Decimal {
    if gross_loss > Decimal::ZERO {
        gross_profit / gross_loss
    } else {
        Decimal::ZERO
    }
}

fn ratio_pct(part: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part as u64) / Decimal::from(total as u64) * HUNDRED
}

#[derive(Debug, Default)]
struct TradeTally {
    winning: usize,
    losing: usize,
    gross_profit: Decimal,
    gross_loss: Decimal,
    largest_win: Decimal,
    largest_loss: Decimal,
}

impl TradeTally {
    fn from_trades(trades: &[Trade]) -> Self {
        let mut tally = Self::default();

        for trade in trades {
            let pnl = trade.pnl();
            if trade.outcome().is_win() {
                tally.winning += 1;
                tally.gross_profit += pnl;
                tally.largest_win = tally.largest_win.max(pnl);
            } else if trade.outcome().is_loss() {
                tally.losing += 1;
                tally.gross_loss += pnl.abs();
                tally.largest_loss = tally.largest_loss.max(pnl.abs());
            }
        }

        tally
    }
}

#[derive(Debug, Default)]
struct Streaks {
    longest_win: usize,
    longest_loss: usize,
    current: i64,
}

impl Streaks {
    fn from_trades(trades: &[Trade]) -> Self {
        let mut streaks = Self::default();
        let mut wins = 0usize;
        let mut losses = 0usize;

        for trade in trades {
            match trade.outcome() {
                TradeOutcome::WinAtTp1 | TradeOutcome::WinAtTp2 => {
                    wins += 1;
                    losses = 0;
                    streaks.longest_win = streaks.longest_win.max(wins);
                }
                TradeOutcome::LossAtSl => {
                    losses += 1;
                    wins = 0;
                    streaks.longest_loss = streaks.longest_loss.max(losses);
                }
                TradeOutcome::BreakEven | TradeOutcome::Pending => {
                    wins = 0;
                    losses = 0;
                }
            }
        }

        streaks.current = if wins > 0 {
            i64::try_from(wins).unwrap_or(i64::MAX)
        } else if losses > 0 {
            -i64::try_from(losses).unwrap_or(i64::MAX)
        } else {
            0
        };

        streaks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::trade::test_support::make_trade;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    /// Chain trades so each one sizes off the previous balance.
    fn chain(outcomes: &[TradeOutcome]) -> Vec<Trade> {
        let mut balance = dec!(10000);
        outcomes
            .iter()
            .enumerate()
            .map(|(i, outcome)| {
                let trade = make_trade(i, *outcome, balance, dec!(2));
                balance = trade.balance_after;
                trade
            })
            .collect()
    }

    use TradeOutcome::{BreakEven, LossAtSl as L, WinAtTp1 as W};

    #[test]
    fn test_equity_curve_is_anchored() {
        let trades = chain(&[W, L]);
        let curve = generate_equity_curve(&trades, dec!(10000));

        // +2% then -1% of 10200
        assert_eq!(curve, vec![dec!(10000), dec!(10200), dec!(10098)]);
        assert_eq!(curve.len(), trades.len() + 1);
    }

    #[test]
    fn test_empty_trades() {
        let stats = EquityAnalyzer::new(dec!(10000)).calculate(&[]);

        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.final_balance, dec!(10000));
        assert_eq!(stats.win_rate, Decimal::ZERO);
        assert_eq!(stats.sharpe_ratio, Decimal::ZERO);
        assert_eq!(stats.expectancy, Decimal::ZERO);
        assert_eq!(stats.avg_pnl_per_trade, Decimal::ZERO);
    }

    #[test]
    fn test_counts_and_profit_factor() {
        let trades = chain(&[W, W, L, BreakEven]);
        let stats = EquityAnalyzer::new(dec!(10000)).calculate(&trades);

        // 200 + 204 won, 104.04 lost
        assert_eq!(stats.total_trades, 4);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 1);
        assert_eq!(stats.win_rate, dec!(50));
        assert_eq!(stats.avg_win, dec!(202));
        assert_eq!(stats.avg_loss, dec!(104.04));
        assert_eq!(stats.largest_win, dec!(204));
        assert_eq!(stats.largest_loss, dec!(104.04));
        assert_eq!(stats.profit_factor, dec!(404) / dec!(104.04));
        assert_eq!(stats.final_balance, dec!(10299.96));
    }

    #[test]
    fn test_profit_factor_zero_without_losses() {
        let trades = chain(&[W, W, BreakEven]);
        let stats = EquityAnalyzer::new(dec!(10000)).calculate(&trades);

        assert_eq!(stats.losing_trades, 0);
        assert_eq!(stats.profit_factor, Decimal::ZERO);
        assert_eq!(profit_factor(dec!(500), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_expectancy_divides_by_all_trades() {
        // R: +2, -1, 0, 0 -> 1 / 4
        let trades = chain(&[W, L, BreakEven, BreakEven]);
        let stats = EquityAnalyzer::new(dec!(10000)).calculate(&trades);

        assert_eq!(stats.avg_r_multiple, dec!(0.25));
        assert_eq!(stats.expectancy, dec!(0.25));
        assert_eq!(stats.avg_pnl_per_trade, stats.total_pnl / dec!(4));
    }

    #[test]
    fn test_expectancy_is_in_r_not_money() {
        // +200 then -102 from 10000: R is +2 and -1
        let trades = chain(&[W, L]);
        let stats = EquityAnalyzer::new(dec!(10000)).calculate(&trades);

        assert_eq!(stats.expectancy, dec!(0.5));
        assert_eq!(stats.expectancy, stats.avg_r_multiple);
        assert_eq!(stats.avg_pnl_per_trade, dec!(49));
    }

    #[test]
    fn test_streaks() {
        // W W W L L W L W W
        let trades = chain(&[W, W, W, L, L, W, L, W, W]);
        let stats = EquityAnalyzer::new(dec!(10000)).calculate(&trades);

        assert_eq!(stats.longest_win_streak, 3);
        assert_eq!(stats.longest_loss_streak, 2);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_current_streak_sign() {
        let losing = EquityAnalyzer::new(dec!(10000)).calculate(&chain(&[W, L, L, L]));
        assert_eq!(losing.current_streak, -3);

        let flat = EquityAnalyzer::new(dec!(10000)).calculate(&chain(&[W, W, BreakEven]));
        assert_eq!(flat.current_streak, 0);
        assert_eq!(flat.longest_win_streak, 2);
    }

    #[test]
    fn test_drawdown_magnitude_and_duration_are_independent() {
        // Long shallow dip, then a short deep one
        let curve = [
            dec!(100),
            dec!(99),
            dec!(98),
            dec!(99),
            dec!(98),
            dec!(120),
            dec!(90),
            dec!(121),
        ];
        let dd = drawdown_metrics(&curve);

        assert_eq!(dd.max_drawdown, dec!(30));
        assert_eq!(dd.max_drawdown_percent, dec!(25));
        assert_eq!(dd.max_duration, 4);
    }

    #[test]
    fn test_equal_balance_is_not_a_new_peak() {
        let dd = drawdown_metrics(&[dec!(100), dec!(100), dec!(100)]);

        assert_eq!(dd.max_drawdown, Decimal::ZERO);
        assert_eq!(dd.max_duration, 2);
    }

    #[test]
    fn test_sharpe() {
        assert_eq!(sharpe_ratio(&[dec!(100)]), Decimal::ZERO);
        // Constant returns have no spread
        assert_eq!(
            sharpe_ratio(&[dec!(100), dec!(110), dec!(121)]),
            Decimal::ZERO
        );

        // Returns +10% and -10%: mean 0
        let flat = sharpe_ratio(&[dec!(100), dec!(110), dec!(99)]);
        assert!(flat.abs() < dec!(0.000001));

        // Returns +20% and 0%: mean 0.1, sigma 0.1 -> sqrt(252)
        let positive = sharpe_ratio(&[dec!(100), dec!(120), dec!(120)]);
        assert!((positive - dec!(15.874507)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_sharpe_skips_non_positive_base() {
        // Step from 0 counts as a zero return
        let sharpe = sharpe_ratio(&[dec!(0), dec!(100), dec!(120)]);
        assert!(sharpe > Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_non_decreasing_curve_has_no_drawdown(
            steps in prop::collection::vec(0i64..1_000, 0..40)
        ) {
            let mut balance = dec!(1000);
            let mut curve = vec![balance];
            for step in steps {
                balance += Decimal::from(step);
                curve.push(balance);
            }
            prop_assert_eq!(drawdown_metrics(&curve).max_drawdown, Decimal::ZERO);
        }

        #[test]
        fn prop_drawdown_bounded_by_range(
            steps in prop::collection::vec(-500i64..500, 1..40)
        ) {
            let mut balance = dec!(100000);
            let mut curve = vec![balance];
            for step in steps {
                balance += Decimal::from(step);
                curve.push(balance);
            }
            let Some(max) = curve.iter().max().copied() else {
                panic!("curve is non-empty");
            };
            let Some(min) = curve.iter().min().copied() else {
                panic!("curve is non-empty");
            };
            prop_assert!(drawdown_metrics(&curve).max_drawdown <= max - min);
        }
    }
}
