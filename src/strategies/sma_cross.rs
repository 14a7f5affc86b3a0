// src/strategies/sma_cross.rs
use crate::types::{BarSeries, Signal, SignalKind};
use anyhow::{ensure, Result};

/// SMA crossover detector. Pure function over a bar series: no I/O, no
/// state, deterministic for identical inputs. Rounding is the caller's
/// business; the values returned here are raw means.
#[derive(Debug, Clone, Copy)]
pub struct SmaCrossover {
    fast_period: usize,
    slow_period: usize,
}

impl Default for SmaCrossover {
    fn default() -> Self {
        Self {
            fast_period: 9,
            slow_period: 21,
        }
    }
}

impl SmaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self> {
        ensure!(fast_period > 0, "fast period must be positive");
        ensure!(
            fast_period < slow_period,
            "fast period ({fast_period}) must be shorter than slow period ({slow_period})"
        );
        Ok(Self {
            fast_period,
            slow_period,
        })
    }

    /// Mean of the last `period` values, 0.0 when there are not enough.
    fn sma(closes: &[f64], period: usize) -> f64 {
        if period == 0 || closes.len() < period {
            return 0.0;
        }
        let window = &closes[closes.len() - period..];
        window.iter().sum::<f64>() / period as f64
    }

    /// Detect a crossover on the most recent bar.
    ///
    /// Fewer than `slow_period` bars means insufficient history: Hold with
    /// both SMA values exactly 0.0, not an error. Buy/Sell require at least
    /// `slow_period + 1` bars, because only a change in relative ordering
    /// between the one-bar-lagged window and the current window fires —
    /// equality on the current bars alone never does.
    pub fn detect(&self, series: &BarSeries) -> Signal {
        if series.len() < self.slow_period {
            return Signal::hold();
        }

        let closes: Vec<f64> = series.bars.iter().map(|b| b.close).collect();
        let sma_fast = Self::sma(&closes, self.fast_period);
        let sma_slow = Self::sma(&closes, self.slow_period);

        if closes.len() >= self.slow_period + 1 {
            let lagged = &closes[..closes.len() - 1];
            let prev_fast = Self::sma(lagged, self.fast_period);
            let prev_slow = Self::sma(lagged, self.slow_period);

            if prev_fast <= prev_slow && sma_fast > sma_slow {
                return Signal {
                    kind: SignalKind::Buy,
                    sma_fast,
                    sma_slow,
                };
            }
            if prev_fast >= prev_slow && sma_fast < sma_slow {
                return Signal {
                    kind: SignalKind::Sell,
                    sma_fast,
                    sma_slow,
                };
            }
        }

        Signal {
            kind: SignalKind::Hold,
            sma_fast,
            sma_slow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bar;

    fn series(closes: &[f64]) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: 60_000 * i as i64,
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect();
        BarSeries {
            symbol: "BTCUSDT".to_string(),
            interval: "60".to_string(),
            bars,
        }
    }

    #[test]
    fn short_series_holds_with_zero_smas() {
        let detector = SmaCrossover::default();
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let signal = detector.detect(&series(&closes));
        assert_eq!(signal.kind, SignalKind::Hold);
        assert_eq!(signal.sma_fast, 0.0);
        assert_eq!(signal.sma_slow, 0.0);
    }

    #[test]
    fn flat_series_holds_with_equal_smas() {
        let detector = SmaCrossover::default();
        let closes = vec![42.5; 40];
        let signal = detector.detect(&series(&closes));
        assert_eq!(signal.kind, SignalKind::Hold);
        assert_eq!(signal.sma_fast, 42.5);
        assert_eq!(signal.sma_slow, 42.5);
    }

    #[test]
    fn exactly_slow_period_bars_cannot_fire() {
        // 21 bars is enough to compute SMAs but not the lagged pair.
        let detector = SmaCrossover::default();
        let mut closes = vec![9.0; 20];
        closes.push(100.0);
        let signal = detector.detect(&series(&closes));
        assert_eq!(signal.kind, SignalKind::Hold);
        assert!(signal.sma_fast > signal.sma_slow);
    }

    #[test]
    fn crossover_fires_buy_exactly_once() {
        // Nine 10s, twenty-one 9s: fast sits on/below slow the whole way
        // down, then a 12 prints and the fast mean crosses up through it.
        let detector = SmaCrossover::default();
        let mut closes = vec![10.0; 9];
        closes.extend(std::iter::repeat(9.0).take(21));

        let before = detector.detect(&series(&closes));
        assert_eq!(before.kind, SignalKind::Hold);

        closes.push(12.0);
        let after = detector.detect(&series(&closes));
        assert_eq!(after.kind, SignalKind::Buy);
        assert!((after.sma_fast - 84.0 / 9.0).abs() < 1e-12);
        assert!((after.sma_slow - 192.0 / 21.0).abs() < 1e-12);
    }

    #[test]
    fn crossover_is_antisymmetric_under_price_inversion() {
        let mut closes = vec![10.0; 9];
        closes.extend(std::iter::repeat(9.0).take(21));
        closes.push(12.0);
        let inverted: Vec<f64> = closes.iter().map(|c| 20.0 - c).collect();

        let detector = SmaCrossover::default();
        let up = detector.detect(&series(&closes));
        let down = detector.detect(&series(&inverted));
        assert_eq!(up.kind, SignalKind::Buy);
        assert_eq!(down.kind, SignalKind::Sell);
        // SMA(20 - c) == 20 - SMA(c), exactly, for these representable values.
        assert_eq!(down.sma_fast, 20.0 - up.sma_fast);
    }

    #[test]
    fn detection_is_idempotent() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.37).sin()).collect();
        let s = series(&closes);
        let detector = SmaCrossover::default();
        let first = detector.detect(&s);
        let second = detector.detect(&s);
        assert_eq!(first, second);
        assert_eq!(first.sma_fast.to_bits(), second.sma_fast.to_bits());
        assert_eq!(first.sma_slow.to_bits(), second.sma_slow.to_bits());
    }

    #[test]
    fn equality_in_both_windows_holds() {
        // Converging to equal SMAs without an ordering change must not fire.
        let closes = vec![5.0; 30];
        let signal = SmaCrossover::default().detect(&series(&closes));
        assert_eq!(signal.kind, SignalKind::Hold);
    }

    #[test]
    fn construction_rejects_bad_windows() {
        assert!(SmaCrossover::new(0, 21).is_err());
        assert!(SmaCrossover::new(21, 21).is_err());
        assert!(SmaCrossover::new(22, 21).is_err());
        assert!(SmaCrossover::new(9, 21).is_ok());
    }
}
