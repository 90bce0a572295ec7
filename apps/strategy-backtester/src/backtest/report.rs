//! Text, Markdown and CSV renderers for backtest output.
//!
//! Renderers return strings; writing them anywhere is up to the caller.

use std::fmt::{Display, Write};

use super::metrics::{EquityStats, format_money, format_pct, format_ratio};
use super::parallel::BatchResult;
use super::trade::Trade;

/// Sectioned plain-text report for one run.
#[must_use]
pub fn format_stats_report(stats: &EquityStats) -> String {
    let mut out = String::from("=== Backtest Report ===\n");

    section(&mut out, "Account");
    field(&mut out, "Initial balance:", format_money(stats.initial_balance));
    field(&mut out, "Final balance:", format_money(stats.final_balance));
    field(
        &mut out,
        "Net P&L:",
        format!(
            "{} ({})",
            format_money(stats.total_pnl),
            format_pct(stats.percent_gain)
        ),
    );

    section(&mut out, "Trades");
    field(&mut out, "Total trades:", stats.total_trades);
    field(&mut out, "Winning trades:", stats.winning_trades);
    field(&mut out, "Losing trades:", stats.losing_trades);
    field(&mut out, "Win rate:", format_pct(stats.win_rate));
    field(&mut out, "Average win:", format_money(stats.avg_win));
    field(&mut out, "Average loss:", format_money(stats.avg_loss));
    field(&mut out, "Largest win:", format_money(stats.largest_win));
    field(&mut out, "Largest loss:", format_money(stats.largest_loss));
    field(&mut out, "Expectancy (R):", format_ratio(stats.expectancy));
    field(&mut out, "Average P&L per trade:", format_money(stats.avg_pnl_per_trade));
    field(&mut out, "Average R-multiple:", format_ratio(stats.avg_r_multiple));

    section(&mut out, "Risk");
    field(
        &mut out,
        "Max drawdown:",
        format!(
            "{} ({})",
            format_money(stats.max_drawdown),
            format_pct(stats.max_drawdown_percent)
        ),
    );
    field(
        &mut out,
        "Drawdown duration:",
        format!("{} trades", stats.drawdown_duration),
    );
    field(&mut out, "Sharpe ratio:", format_ratio(stats.sharpe_ratio));
    field(&mut out, "Profit factor:", format_ratio(stats.profit_factor));
    field(&mut out, "Longest win streak:", stats.longest_win_streak);
    field(&mut out, "Longest loss streak:", stats.longest_loss_streak);
    field(
        &mut out,
        "Current streak:",
        format!("{:+}", stats.current_streak),
    );

    out
}

fn section(out: &mut String, title: &str) {
    let _ = write!(out, "\n{title}\n");
}

fn field(out: &mut String, label: &str, value: impl Display) {
    let _ = writeln!(out, "  {label:<24}{value}");
}

/// Markdown summary of a batch: one table row per successful strategy in
/// submission order, then aggregates and excluded strategies.
#[must_use]
pub fn format_batch_summary(batch: &BatchResult) -> String {
    let mut out = String::from("# Batch Backtest Summary\n\n");

    out.push_str(
        "| Strategy | Trades | Win Rate | Profit Factor | Net Profit | Max Drawdown | Final Balance |\n",
    );
    out.push_str("|---|---:|---:|---:|---:|---:|---:|\n");
    for (name, result) in batch.iter_in_order() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            name,
            result.total_trades,
            format_pct(result.win_rate),
            format_ratio(result.profit_factor),
            format_money(result.net_profit),
            format_pct(result.max_drawdown_percent()),
            format_money(result.final_balance()),
        );
    }

    let aggregates = &batch.aggregates;
    let _ = writeln!(out, "\n## Aggregates\n");
    let _ = writeln!(
        out,
        "- Strategies: {} submitted, {} succeeded, {} excluded",
        batch.submitted(),
        batch.results.len(),
        batch.excluded_count()
    );
    let _ = writeln!(
        out,
        "- Average win rate: {}",
        format_pct(aggregates.average_win_rate)
    );
    let _ = writeln!(
        out,
        "- Average profit factor: {}",
        format_ratio(aggregates.average_profit_factor)
    );
    let _ = writeln!(
        out,
        "- Average max drawdown: {}",
        format_pct(aggregates.average_max_drawdown)
    );
    let _ = writeln!(
        out,
        "- Best strategy: {}",
        aggregates.best_strategy.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "- Worst strategy: {}",
        aggregates.worst_strategy.as_deref().unwrap_or("-")
    );

    if !batch.failures.is_empty() {
        let _ = writeln!(out, "\n## Excluded strategies\n");
        for failure in &batch.failures {
            let _ = writeln!(out, "- `{}`: {}", failure.name, failure.error);
        }
    }

    out
}

/// Export a batch to pretty JSON.
#[must_use]
pub fn batch_to_json(batch: &BatchResult) -> String {
    serde_json::to_string_pretty(batch).unwrap_or_default()
}

/// Export trades to CSV format.
#[must_use]
pub fn trades_to_csv(trades: &[Trade]) -> String {
    let mut csv = String::from(
        "sequence,direction,entry_time,entry_price,exit_time,exit_price,stop_loss,take_profit,position_size,outcome,exit_reason,pnl,r_multiple,balance_after\n",
    );

    for trade in trades {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{:?},{:?},{},{},{}",
            trade.sequence,
            trade.direction,
            trade.entry_time,
            trade.entry_price,
            trade.exit_time,
            trade.exit_price,
            trade.sizing.stop_loss_price,
            trade.sizing.take_profit_price,
            trade.sizing.position_size,
            trade.outcome(),
            trade.exit_reason,
            trade.pnl(),
            trade.r_multiple(),
            trade.balance_after,
        );
    }

    csv
}
