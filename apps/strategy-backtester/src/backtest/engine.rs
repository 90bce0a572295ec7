//! Single-strategy simulation engine.
//!
//! Walks a candle series once, opening at most one position at a time and
//! resolving it against later candles:
//!
//! `Idle -> Scanning -> (Positioned -> Resolving)* -> Done`

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::candle::{Candle, validate_series};
use super::config::{BacktestConfig, StrategyType};
use super::error::SimulationError;
use super::position::OpenPosition;
use super::result::BacktestResult;
use super::trade::{ExitFill, Trade};
use super::triggers::{TriggerType, evaluate_triggers};
use crate::risk::sizing::{PositionDirection, StopSpec, TargetSpec, TradeParameters, TradeSizer};
use crate::risk::{RiskStrategy, risk_percent};

/// Fewest candles that still leave one signal candle and one candle after it.
pub const MIN_CANDLES: usize = 3;

/// Simulation state.
#[derive(Debug)]
enum RunState {
    Idle,
    Scanning { cursor: usize },
    Positioned(OpenPosition),
    Resolving { position: OpenPosition, exit: ExitFill },
    Done,
}

/// Running account state of one simulation.
#[derive(Debug)]
struct RunLedger {
    balance: Decimal,
    peak: Decimal,
    trades: Vec<Trade>,
    equity_curve: Vec<Decimal>,
    drawdown_curve: Vec<Decimal>,
    wins: usize,
    skipped_entries: usize,
    no_edge_entries: usize,
}

impl RunLedger {
    fn new(initial_balance: Decimal) -> Self {
        Self {
            balance: initial_balance,
            peak: initial_balance,
            trades: Vec::new(),
            equity_curve: vec![initial_balance],
            drawdown_curve: vec![Decimal::ZERO],
            wins: 0,
            skipped_entries: 0,
            no_edge_entries: 0,
        }
    }

    /// Win rate so far, as a fraction.
    fn win_rate(&self) -> Decimal {
        if self.trades.is_empty() {
            return Decimal::ZERO;
        }
        Decimal::from(self.wins as u64) / Decimal::from(self.trades.len() as u64)
    }

    fn book(&mut self, trade: Trade) {
        self.balance = trade.balance_after;
        if trade.outcome().is_win() {
            self.wins += 1;
        }
        if self.balance > self.peak {
            self.peak = self.balance;
        }

        let drawdown = if self.peak > Decimal::ZERO {
            (self.peak - self.balance) / self.peak * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        self.equity_curve.push(self.balance);
        self.drawdown_curve.push(drawdown);
        self.trades.push(trade);
    }
}

/// Runs one strategy configuration over one candle series.
#[derive(Debug, Clone)]
pub struct Backtester {
    config: BacktestConfig,
    sizer: TradeSizer,
}

impl Backtester {
    /// Create a backtester for `config`.
    #[must_use]
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            sizer: TradeSizer::default(),
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Simulate the whole series.
    ///
    /// Fails only on an invalid config or an unusable series; entries that
    /// cannot be sized are skipped and counted.
    pub fn run(&self, candles: &[Candle]) -> Result<BacktestResult, SimulationError> {
        self.config.validate()?;
        validate_series(candles, MIN_CANDLES)?;

        let mut ledger = RunLedger::new(self.config.initial_balance);
        let mut state = RunState::Idle;

        loop {
            state = match state {
                RunState::Idle => RunState::Scanning { cursor: 1 },
                RunState::Scanning { cursor } => match self.find_entry(candles, cursor, &mut ledger)
                {
                    Some(position) => RunState::Positioned(position),
                    None => RunState::Done,
                },
                RunState::Positioned(position) => match self.find_exit(candles, &position) {
                    Some(exit) => RunState::Resolving { position, exit },
                    None => {
                        debug!(
                            entry_index = position.entry_index,
                            direction = %position.direction,
                            "Series ended before resolution, discarding pending trade"
                        );
                        RunState::Done
                    }
                },
                RunState::Resolving { position, exit } => {
                    let cursor = exit.index() + 1 + self.config.cooldown_candles;
                    let trade = position.close(ledger.trades.len(), exit);

                    debug!(
                        trade_index = trade.sequence,
                        entry_index = trade.entry_index,
                        exit_index = trade.exit_index,
                        outcome = ?trade.outcome(),
                        pnl = %trade.pnl(),
                        "Trade resolved"
                    );

                    ledger.book(trade);
                    RunState::Scanning { cursor }
                }
                RunState::Done => break,
            };
        }

        let result = BacktestResult::new(
            self.config.initial_balance,
            ledger.trades,
            ledger.equity_curve,
            ledger.drawdown_curve,
            ledger.skipped_entries,
        )
        .with_no_edge_entries(ledger.no_edge_entries);

        info!(
            candles = candles.len(),
            trades = result.total_trades,
            win_rate = %result.win_rate,
            net_profit = %result.net_profit,
            skipped_entries = result.skipped_entries,
            no_edge_entries = result.no_edge_entries,
            "Backtest run complete"
        );

        Ok(result)
    }

    /// Scan from `cursor` for the next entry that sizes successfully.
    ///
    /// Only candles with at least one candle after them are considered.
    fn find_entry(
        &self,
        candles: &[Candle],
        cursor: usize,
        ledger: &mut RunLedger,
    ) -> Option<OpenPosition> {
        let last_signal = candles.len().checked_sub(2)?;

        for index in cursor.max(1)..=last_signal {
            let Some(direction) = detect_signal(&candles[index - 1], &candles[index]) else {
                continue;
            };
            if !self.direction_enabled(direction) {
                continue;
            }

            let parameters = self.trade_parameters(candles, index, direction, ledger);
            if parameters.risk_percent.is_zero() {
                // Kelly sees no edge at the running win rate
                ledger.no_edge_entries += 1;
                debug!(
                    entry_index = index,
                    direction = %direction,
                    win_rate = %ledger.win_rate(),
                    "Entry skipped, risk strategy allows no risk"
                );
                continue;
            }

            match self.sizer.size(&parameters) {
                Ok(sizing) => {
                    debug!(
                        entry_index = index,
                        direction = %direction,
                        entry = %parameters.entry_price,
                        stop = %sizing.stop_loss_price,
                        target = %sizing.take_profit_price,
                        size = %sizing.position_size,
                        "Position opened"
                    );
                    return Some(OpenPosition::open(
                        index,
                        &candles[index],
                        parameters,
                        sizing,
                        ledger.balance,
                    ));
                }
                Err(error) => {
                    ledger.skipped_entries += 1;
                    debug!(
                        entry_index = index,
                        direction = %direction,
                        error = %error,
                        "Entry skipped, trade could not be sized"
                    );
                }
            }
        }

        None
    }

    /// First exit after entry, or `None` when the series ends first.
    fn find_exit(&self, candles: &[Candle], position: &OpenPosition) -> Option<ExitFill> {
        for (index, candle) in candles.iter().enumerate().skip(position.entry_index + 1) {
            let trigger = evaluate_triggers(
                position.direction,
                position.stop_loss,
                position.take_profit,
                candle,
                self.config.same_bar_priority,
            );

            if let (Some(selected), Some(price)) = (trigger.selected(), trigger.fill_price()) {
                return Some(match selected {
                    TriggerType::Stop => ExitFill::stop(index, candle, price),
                    TriggerType::Target => ExitFill::target(index, candle, price),
                });
            }

            if position.candles_held(index) >= self.config.horizon_candles {
                return Some(ExitFill::horizon(
                    index,
                    candle,
                    position.direction,
                    position.entry_price,
                ));
            }
        }

        None
    }

    const fn direction_enabled(&self, direction: PositionDirection) -> bool {
        match direction {
            PositionDirection::Long => self.config.long_enabled,
            PositionDirection::Short => self.config.short_enabled,
        }
    }

    fn trade_parameters(
        &self,
        candles: &[Candle],
        index: usize,
        direction: PositionDirection,
        ledger: &RunLedger,
    ) -> TradeParameters {
        let entry = candles[index].close;
        let (stop, target) = self.place_levels(candles, index, direction, entry);

        let balance = match self.config.risk_strategy {
            RiskStrategy::Fixed => self.config.initial_balance,
            RiskStrategy::Compounding | RiskStrategy::KellyCriterion => ledger.balance,
        };
        let risk = risk_percent(
            self.config.risk_strategy,
            self.config.risk_per_trade,
            ledger.win_rate(),
            self.config.risk_reward_ratio,
        );

        TradeParameters {
            instrument: self.config.instrument,
            lot_size: self.config.lot_size,
            fee_percent: self.config.commission,
            spread_pips: self.config.slippage,
            ..TradeParameters::new(
                balance,
                risk,
                entry,
                direction,
                StopSpec::Price(stop),
                TargetSpec::Price(target),
            )
        }
    }

    /// Stop and target prices for an entry at `candles[index]`.
    fn place_levels(
        &self,
        candles: &[Candle],
        index: usize,
        direction: PositionDirection,
        entry: Decimal,
    ) -> (Decimal, Decimal) {
        match self.config.strategy_type {
            StrategyType::FixedRr => {
                let pip = self.config.instrument.pip_size();
                (
                    direction.toward_loss(entry, self.config.stop_loss_pips * pip),
                    direction.toward_profit(entry, self.config.take_profit_pips * pip),
                )
            }
            StrategyType::StructureBased => {
                let window = &candles[index.saturating_sub(self.config.structure_lookback)..index];
                let stop = match direction {
                    PositionDirection::Long => window.iter().map(|c| c.low).fold(entry, Decimal::min),
                    PositionDirection::Short => {
                        window.iter().map(|c| c.high).fold(entry, Decimal::max)
                    }
                };
                let distance = (entry - stop).abs();
                (
                    stop,
                    direction.toward_profit(entry, distance * self.config.risk_reward_ratio),
                )
            }
            StrategyType::DynamicTarget => {
                let distance = entry * self.config.fallback_stop_pct / Decimal::ONE_HUNDRED;
                (
                    direction.toward_loss(entry, distance),
                    direction.toward_profit(entry, distance),
                )
            }
        }
    }
}

/// Entry signal at `current`: a bullish candle closing above the previous
/// close goes long, the mirror image goes short.
#[must_use]
pub fn detect_signal(previous: &Candle, current: &Candle) -> Option<PositionDirection> {
    if current.close > previous.close && current.is_bullish() {
        Some(PositionDirection::Long)
    } else if current.close < previous.close && current.is_bearish() {
        Some(PositionDirection::Short)
    } else {
        None
    }
}

/// Run a single backtest.
pub fn run_single(
    config: &BacktestConfig,
    candles: &[Candle],
) -> Result<BacktestResult, SimulationError> {
    Backtester::new(config.clone()).run(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::config::SameBarPriority;
    use crate::backtest::error::DataError;
    use crate::backtest::trade::test_support::{at, rising_series};
    use crate::backtest::trade::{ExitReason, TradeOutcome};
    use rust_decimal_macros::dec;

    fn candle(minute: i64, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle::new(at(minute), open, high, low, close)
    }

    fn long_only() -> BacktestConfig {
        BacktestConfig {
            short_enabled: false,
            ..Default::default()
        }
    }

    fn short_only() -> BacktestConfig {
        BacktestConfig {
            long_enabled: false,
            ..Default::default()
        }
    }

    fn run_ok(config: &BacktestConfig, candles: &[Candle]) -> BacktestResult {
        match run_single(config, candles) {
            Ok(result) => result,
            Err(e) => panic!("run should succeed: {e}"),
        }
    }

    /// Five candles with strictly falling closes, each bearish.
    fn falling_series() -> Vec<Candle> {
        vec![
            candle(0, dec!(1.1005), dec!(1.1006), dec!(1.0998), dec!(1.1000)),
            candle(1, dec!(1.1000), dec!(1.1001), dec!(1.0988), dec!(1.0990)),
            candle(2, dec!(1.0990), dec!(1.0992), dec!(1.0978), dec!(1.0980)),
            candle(3, dec!(1.0980), dec!(1.0982), dec!(1.0965), dec!(1.0968)),
            candle(4, dec!(1.0968), dec!(1.0970), dec!(1.0955), dec!(1.0960)),
        ]
    }

    #[test]
    fn test_detect_signal() {
        let prev = candle(0, dec!(1.10), dec!(1.12), dec!(1.09), dec!(1.10));
        let up = candle(1, dec!(1.10), dec!(1.13), dec!(1.09), dec!(1.12));
        let down = candle(1, dec!(1.10), dec!(1.11), dec!(1.07), dec!(1.08));
        let doji = candle(1, dec!(1.12), dec!(1.13), dec!(1.09), dec!(1.12));

        assert_eq!(detect_signal(&prev, &up), Some(PositionDirection::Long));
        assert_eq!(detect_signal(&prev, &down), Some(PositionDirection::Short));
        assert_eq!(detect_signal(&prev, &doji), None);
    }

    #[test]
    fn test_rising_series_single_win() {
        let result = match run_single(&long_only(), &rising_series()) {
            Ok(r) => r,
            Err(e) => panic!("run should succeed: {e}"),
        };

        assert_eq!(result.total_trades, 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_index, 1);
        assert_eq!(trade.entry_price, dec!(1.1010));
        assert_eq!(trade.sizing.take_profit_price, dec!(1.1030));
        assert_eq!(trade.exit_index, 3);
        assert_eq!(trade.outcome(), TradeOutcome::WinAtTp1);
        assert_eq!(trade.sizing.reward_amount, dec!(200));
        assert_eq!(result.final_balance(), dec!(10200));
        assert_eq!(result.equity_curve, vec![dec!(10000), dec!(10200)]);
        assert_eq!(result.drawdown_curve, vec![Decimal::ZERO, Decimal::ZERO]);
    }

    #[test]
    fn test_empty_series_fails() {
        let err = run_single(&BacktestConfig::default(), &[]);
        assert_eq!(err, Err(SimulationError::Data(DataError::Empty)));
    }

    #[test]
    fn test_invalid_config_fails() {
        let config = BacktestConfig {
            initial_balance: dec!(-5),
            ..Default::default()
        };
        assert!(matches!(
            run_single(&config, &rising_series()),
            Err(SimulationError::InvalidConfig {
                field: "initial_balance",
                ..
            })
        ));
    }

    #[test]
    fn test_same_bar_priority() {
        // Entry at 1.1010; candle 2 spans both 1.1000 stop and 1.1030 target
        let mut candles = rising_series();
        candles[2] = candle(2, dec!(1.1010), dec!(1.1040), dec!(1.0990), dec!(1.1020));

        let Ok(stop_first) = run_single(&long_only(), &candles) else {
            panic!("run should succeed");
        };
        assert_eq!(stop_first.trades[0].outcome(), TradeOutcome::LossAtSl);
        assert_eq!(stop_first.final_balance(), dec!(9900));
        assert_eq!(stop_first.drawdown_curve[1], dec!(1));

        let config = BacktestConfig {
            same_bar_priority: SameBarPriority::TargetFirst,
            ..long_only()
        };
        let Ok(target_first) = run_single(&config, &candles) else {
            panic!("run should succeed");
        };
        assert_eq!(target_first.trades[0].outcome(), TradeOutcome::WinAtTp1);
    }

    #[test]
    fn test_pending_trade_discarded() {
        // Small moves never reach a 10 pip stop or 20 pip target
        let candles = vec![
            candle(0, dec!(1.1000), dec!(1.1002), dec!(1.0999), dec!(1.1000)),
            candle(1, dec!(1.1000), dec!(1.1003), dec!(1.0999), dec!(1.1002)),
            candle(2, dec!(1.1002), dec!(1.1004), dec!(1.1001), dec!(1.1003)),
            candle(3, dec!(1.1003), dec!(1.1005), dec!(1.1001), dec!(1.1002)),
        ];

        let Ok(result) = run_single(&long_only(), &candles) else {
            panic!("run should succeed");
        };
        assert_eq!(result.total_trades, 0);
        assert_eq!(result.final_balance(), dec!(10000));
        assert_eq!(result.equity_curve.len(), 1);
    }

    #[test]
    fn test_horizon_close() {
        let candles = vec![
            candle(0, dec!(1.1000), dec!(1.1002), dec!(1.0999), dec!(1.1000)),
            candle(1, dec!(1.1000), dec!(1.1003), dec!(1.0999), dec!(1.1002)),
            candle(2, dec!(1.1002), dec!(1.1004), dec!(1.1001), dec!(1.1001)),
            candle(3, dec!(1.1001), dec!(1.1006), dec!(1.1000), dec!(1.1005)),
            candle(4, dec!(1.1005), dec!(1.1006), dec!(1.1003), dec!(1.1004)),
        ];
        let config = BacktestConfig {
            horizon_candles: 2,
            ..long_only()
        };

        let Ok(result) = run_single(&config, &candles) else {
            panic!("run should succeed");
        };
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::Horizon);
        assert_eq!(trade.exit_index, 3);
        assert_eq!(trade.exit_price, dec!(1.1005));
        // Closed above the 1.1002 entry
        assert_eq!(trade.outcome(), TradeOutcome::WinAtTp1);
    }

    #[test]
    fn test_cooldown_spaces_entries() {
        let mut candles = Vec::new();
        let mut close = dec!(1.1000);
        for minute in 0..20 {
            let open = close;
            close += dec!(0.0015);
            candles.push(candle(minute, open, close + dec!(0.0010), open, close));
        }

        let config = BacktestConfig {
            cooldown_candles: 3,
            ..long_only()
        };
        let Ok(result) = run_single(&config, &candles) else {
            panic!("run should succeed");
        };

        assert!(result.total_trades >= 2);
        for pair in result.trades.windows(2) {
            assert!(pair[1].entry_index > pair[0].exit_index + 3);
        }
    }

    #[test]
    fn test_structure_based_stop_at_swing() {
        let candles = vec![
            candle(0, dec!(1.1000), dec!(1.1005), dec!(1.0970), dec!(1.1000)),
            candle(1, dec!(1.1000), dec!(1.1012), dec!(1.0990), dec!(1.1010)),
            candle(2, dec!(1.1010), dec!(1.1095), dec!(1.1005), dec!(1.1090)),
        ];
        let config = BacktestConfig {
            strategy_type: StrategyType::StructureBased,
            ..long_only()
        };

        let Ok(result) = run_single(&config, &candles) else {
            panic!("run should succeed");
        };
        let trade = &result.trades[0];
        // Swing low 1.0970, 40 pip stop, 2R target
        assert_eq!(trade.sizing.stop_loss_price, dec!(1.0970));
        assert_eq!(trade.sizing.take_profit_price, dec!(1.1090));
        assert_eq!(trade.sizing.stop_pips, dec!(40));
    }

    #[test]
    fn test_dynamic_target_uses_percent_of_price() {
        let candles = vec![
            candle(0, dec!(99), dec!(100), dec!(98), dec!(100)),
            candle(1, dec!(100), dec!(101), dec!(99), dec!(100.5)),
            candle(2, dec!(100.5), dec!(110), dec!(100), dec!(108)),
        ];
        let config = BacktestConfig {
            strategy_type: StrategyType::DynamicTarget,
            instrument: crate::risk::sizing::Instrument::Indices,
            ..long_only()
        };

        let Ok(result) = run_single(&config, &candles) else {
            panic!("run should succeed");
        };
        let trade = &result.trades[0];
        // 1% of 100.5
        assert_eq!(trade.sizing.stop_loss_price, dec!(99.495));
        assert_eq!(trade.sizing.take_profit_price, dec!(101.505));
        assert_eq!(trade.outcome(), TradeOutcome::WinAtTp1);
    }

    #[test]
    fn test_unsizeable_entries_are_skipped() {
        // A 12000 pip stop puts the stop price below zero
        let config = BacktestConfig {
            stop_loss_pips: dec!(12000),
            ..long_only()
        };

        let Ok(result) = run_single(&config, &rising_series()) else {
            panic!("sizing errors must not abort the run");
        };
        assert_eq!(result.total_trades, 0);
        assert_eq!(result.skipped_entries, 3);
    }

    #[test]
    fn test_fixed_risk_sizes_off_initial_balance() {
        let mut candles = rising_series();
        // Second leg: another rise after the cool-down
        for minute in 5..12 {
            let base = dec!(1.1040) + Decimal::from(minute - 4) * dec!(0.0012);
            candles.push(candle(
                minute,
                base - dec!(0.0010),
                base + dec!(0.0025),
                base - dec!(0.0011),
                base,
            ));
        }
        let config = BacktestConfig {
            risk_strategy: RiskStrategy::Fixed,
            cooldown_candles: 0,
            ..long_only()
        };

        let Ok(result) = run_single(&config, &candles) else {
            panic!("run should succeed");
        };
        assert!(result.total_trades >= 2);
        for trade in &result.trades {
            assert_eq!(trade.sizing.risk_amount, dec!(100));
        }
    }

    #[test]
    fn test_falling_series_short_win() {
        let result = run_ok(&short_only(), &falling_series());

        assert_eq!(result.total_trades, 1);
        let trade = &result.trades[0];
        assert_eq!(trade.direction, PositionDirection::Short);
        assert_eq!(trade.entry_index, 1);
        assert_eq!(trade.entry_price, dec!(1.0990));
        assert_eq!(trade.sizing.stop_loss_price, dec!(1.1000));
        assert_eq!(trade.sizing.take_profit_price, dec!(1.0970));
        assert_eq!(trade.exit_index, 3);
        assert_eq!(trade.exit_price, dec!(1.0970));
        assert_eq!(trade.outcome(), TradeOutcome::WinAtTp1);
        assert_eq!(result.final_balance(), dec!(10200));
    }

    #[test]
    fn test_falling_series_ignored_when_shorts_disabled() {
        let result = run_ok(&long_only(), &falling_series());

        assert_eq!(result.total_trades, 0);
        assert_eq!(result.skipped_entries, 0);
    }

    #[test]
    fn test_short_horizon_close_below_entry_wins() {
        let candles = vec![
            candle(0, dec!(1.1002), dec!(1.1003), dec!(1.0999), dec!(1.1000)),
            candle(1, dec!(1.1000), dec!(1.1001), dec!(1.0997), dec!(1.0998)),
            candle(2, dec!(1.0998), dec!(1.1000), dec!(1.0996), dec!(1.0999)),
            candle(3, dec!(1.0999), dec!(1.1002), dec!(1.0995), dec!(1.0996)),
            candle(4, dec!(1.0996), dec!(1.0997), dec!(1.0994), dec!(1.0995)),
        ];
        let config = BacktestConfig {
            horizon_candles: 2,
            ..short_only()
        };

        let result = run_ok(&config, &candles);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::Horizon);
        assert_eq!(trade.exit_index, 3);
        assert_eq!(trade.exit_price, dec!(1.0996));
        assert_eq!(trade.outcome(), TradeOutcome::WinAtTp1);
    }

    #[test]
    fn test_structure_based_short_stop_at_swing_high() {
        let candles = vec![
            candle(0, dec!(1.1000), dec!(1.1040), dec!(1.0995), dec!(1.1000)),
            candle(1, dec!(1.1000), dec!(1.1010), dec!(1.0988), dec!(1.0990)),
            candle(2, dec!(1.0990), dec!(1.0995), dec!(1.0880), dec!(1.0885)),
        ];
        let config = BacktestConfig {
            strategy_type: StrategyType::StructureBased,
            ..short_only()
        };

        let result = run_ok(&config, &candles);
        let trade = &result.trades[0];
        // Swing high 1.1040, 50 pip stop, 2R target below entry
        assert_eq!(trade.sizing.stop_loss_price, dec!(1.1040));
        assert_eq!(trade.sizing.take_profit_price, dec!(1.0890));
        assert_eq!(trade.sizing.stop_pips, dec!(50));
        assert_eq!(trade.outcome(), TradeOutcome::WinAtTp1);
    }

    #[test]
    fn test_dynamic_target_short_mirrors_levels() {
        let candles = vec![
            candle(0, dec!(101), dec!(102), dec!(99), dec!(100)),
            candle(1, dec!(100), dec!(101), dec!(99), dec!(99.5)),
            candle(2, dec!(99.5), dec!(100), dec!(90), dec!(92)),
        ];
        let config = BacktestConfig {
            strategy_type: StrategyType::DynamicTarget,
            instrument: crate::risk::sizing::Instrument::Indices,
            ..short_only()
        };

        let result = run_ok(&config, &candles);
        let trade = &result.trades[0];
        // 1% of 99.5, stop above and target below
        assert_eq!(trade.sizing.stop_loss_price, dec!(100.495));
        assert_eq!(trade.sizing.take_profit_price, dec!(98.505));
        assert_eq!(trade.outcome(), TradeOutcome::WinAtTp1);
    }

    /// Long entries at 1, 3, 5, 7 and 8 with no cool-down: win, loss, loss.
    fn kelly_series() -> Vec<Candle> {
        vec![
            candle(0, dec!(1.1000), dec!(1.1002), dec!(1.0999), dec!(1.1000)),
            candle(1, dec!(1.1000), dec!(1.1012), dec!(1.0999), dec!(1.1010)),
            candle(2, dec!(1.1010), dec!(1.1035), dec!(1.1005), dec!(1.1030)),
            candle(3, dec!(1.1030), dec!(1.1042), dec!(1.1029), dec!(1.1040)),
            candle(4, dec!(1.1040), dec!(1.1041), dec!(1.1025), dec!(1.1028)),
            candle(5, dec!(1.1028), dec!(1.1040), dec!(1.1027), dec!(1.1038)),
            candle(6, dec!(1.1038), dec!(1.1039), dec!(1.1020), dec!(1.1022)),
            candle(7, dec!(1.1022), dec!(1.1034), dec!(1.1021), dec!(1.1032)),
            candle(8, dec!(1.1032), dec!(1.1045), dec!(1.1031), dec!(1.1044)),
            candle(9, dec!(1.1044), dec!(1.1046), dec!(1.1040), dec!(1.1045)),
        ]
    }

    #[test]
    fn test_kelly_risk_follows_running_win_rate() {
        let config = BacktestConfig {
            risk_strategy: RiskStrategy::KellyCriterion,
            risk_per_trade: dec!(20),
            cooldown_candles: 0,
            ..long_only()
        };

        let result = run_ok(&config, &kelly_series());

        let outcomes: Vec<_> = result.trades.iter().map(Trade::outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                TradeOutcome::WinAtTp1,
                TradeOutcome::LossAtSl,
                TradeOutcome::LossAtSl
            ]
        );
        let risks: Vec<_> = result.trades.iter().map(|t| t.sizing.risk_amount).collect();
        // No history, then a 100% win rate: both fall back to 20%.
        // At 50% and 2R, half Kelly is 12.5% of 11200.
        assert_eq!(risks, vec![dec!(2000), dec!(2800), dec!(1400)]);
        assert_eq!(result.final_balance(), dec!(9800));

        // One win in three at 2R has no edge, so the last two signals are passed over
        assert_eq!(result.no_edge_entries, 2);
        assert_eq!(result.skipped_entries, 0);
    }

    #[test]
    fn test_kelly_without_wins_keeps_default_risk() {
        let candles = vec![
            candle(0, dec!(1.1000), dec!(1.1002), dec!(1.0999), dec!(1.1000)),
            candle(1, dec!(1.1000), dec!(1.1012), dec!(1.0999), dec!(1.1010)),
            candle(2, dec!(1.1010), dec!(1.1011), dec!(1.0995), dec!(1.0998)),
            candle(3, dec!(1.0998), dec!(1.1010), dec!(1.0997), dec!(1.1008)),
            candle(4, dec!(1.1008), dec!(1.1009), dec!(1.0990), dec!(1.0992)),
            candle(5, dec!(1.0992), dec!(1.0995), dec!(1.0990), dec!(1.0993)),
        ];
        let config = BacktestConfig {
            risk_strategy: RiskStrategy::KellyCriterion,
            cooldown_candles: 0,
            ..long_only()
        };

        let result = run_ok(&config, &candles);

        assert_eq!(result.losing_trades, 2);
        let risks: Vec<_> = result.trades.iter().map(|t| t.sizing.risk_amount).collect();
        // A 0% win rate gives no edge estimate, so the default 1% applies
        assert_eq!(risks, vec![dec!(100), dec!(99)]);
        assert_eq!(result.no_edge_entries, 0);
    }
}
