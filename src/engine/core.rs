use rayon::prelude::*;

use crate::config::{AnalysisConfig, NOTIFY};
use crate::data::timeseries::TimeSeriesCollection;
use crate::indicators::IndicatorSeries;
use crate::models::timeseries::OhlcvTimeSeries;
use crate::notify::format::{render_body, render_title};
use crate::signal::classifier::{SignalClassification, SignalClassifier};
use crate::signal::error::EvalError;
use crate::utils::time_utils::local_now_as_timestamp_ms;

use super::ledger::{AlertKey, AlertLedger, SeriesKey};

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;

/// One alert that survived classification and the ledger, ready to deliver.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub key: AlertKey,
    pub title: String,
    pub body: String,
}

/// What a scan did, for logging and exit status.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub alerts: Vec<AlertEvent>,
    pub evaluated: usize,
    pub skipped: usize,
    pub suppressed: usize,
}

pub struct SentryEngine {
    config: AnalysisConfig,
    classifier: SignalClassifier,
    ledger: AlertLedger,
}

impl SentryEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        let classifier = SignalClassifier::new(config.clone());
        Self {
            config,
            classifier,
            ledger: AlertLedger::new(NOTIFY.alerting.cooldown_secs),
        }
    }

    /// Evaluate every series in the collection and return the alerts that
    /// should be delivered now.
    pub fn scan(&mut self, collection: &TimeSeriesCollection) -> ScanOutcome {
        self.scan_at(collection, local_now_as_timestamp_ms())
    }

    /// Clock-injected variant of `scan`.
    pub fn scan_at(&mut self, collection: &TimeSeriesCollection, now_ms: i64) -> ScanOutcome {
        // Pure, independent evaluations fan out across cores; the ledger
        // pass below stays sequential.
        let evaluations: Vec<(&OhlcvTimeSeries, Result<Option<SignalClassification>, EvalError>)> =
            collection
                .series_data
                .par_iter()
                .map(|series| (series, self.evaluate_series(series)))
                .collect();

        let mut outcome = ScanOutcome::default();

        for (series, evaluation) in evaluations {
            let series_key = SeriesKey {
                pair: series.pair_interval.name().to_string(),
                interval_ms: series.pair_interval.interval_ms,
                exchange: series.exchange.clone(),
            };

            match evaluation {
                Err(e) => {
                    // One broken series never aborts the rest of the scan
                    log::warn!("{}: skipped ({})", series.pair_interval, e);
                    outcome.skipped += 1;
                }
                Ok(None) => {
                    #[cfg(debug_assertions)]
                    if DEBUG_FLAGS.print_scan_details {
                        log::info!("{}: no signal", series.pair_interval);
                    }
                    self.ledger.clear(&series_key);
                    outcome.evaluated += 1;
                }
                Ok(Some(signal)) => {
                    outcome.evaluated += 1;
                    let key = AlertKey {
                        series: series_key,
                        category: signal.category,
                        direction: signal.direction,
                    };

                    if self.ledger.observe(Some(key.clone()), now_ms) {
                        log::info!(
                            "{}: {} ({})",
                            series.pair_interval,
                            signal.category,
                            signal.action
                        );
                        outcome.alerts.push(AlertEvent {
                            key,
                            title: render_title(series),
                            body: render_body(&signal),
                        });
                    } else {
                        #[cfg(debug_assertions)]
                        if DEBUG_FLAGS.print_ledger_events {
                            log::info!(
                                "{}: {} suppressed by ledger",
                                series.pair_interval,
                                signal.category
                            );
                        }
                        outcome.suppressed += 1;
                    }
                }
            }
        }

        outcome
    }

    fn evaluate_series(
        &self,
        series: &OhlcvTimeSeries,
    ) -> Result<Option<SignalClassification>, EvalError> {
        let n = series.klines();
        if n < self.config.min_candles_for_analysis {
            return Err(EvalError::InsufficientData {
                need: self.config.min_candles_for_analysis,
                got: n,
            });
        }

        let indicators = IndicatorSeries::compute(series, &self.config)?;
        self.classifier.classify_series(series, &indicators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;
    use crate::domain::pair_interval::PairInterval;
    use crate::signal::classifier::SignalCategory;
    use crate::utils::TimeUtils;

    /// A series engineered so the final bar completes a bullish OBV
    /// crossover: a long stretch of selling drives OBV (and its MA) down,
    /// then two heavy buying bars snap OBV back above the MA.
    fn crossover_series(pair: &str) -> OhlcvTimeSeries {
        let mut closes: Vec<f64> = Vec::new();
        let mut volumes: Vec<f64> = Vec::new();

        // Downtrend: OBV sinks steadily below its own (lagging) MA
        for i in 0..70 {
            closes.push(200.0 - i as f64);
            volumes.push(10.0);
        }
        // Reversal begins but OBV stays under the MA for one more bar, then a
        // heavy-volume bar snaps it across
        closes.push(135.0);
        volumes.push(100.0);
        closes.push(140.0);
        volumes.push(900.0);

        let n = closes.len();
        OhlcvTimeSeries {
            pair_interval: PairInterval::new(pair, TimeUtils::MS_IN_30_MIN),
            exchange: "binance".to_string(),
            first_kline_timestamp_ms: 0,
            open_prices: closes.iter().map(|c| c - 0.5).collect(),
            high_prices: closes.iter().map(|c| c + 1.5).collect(),
            low_prices: closes.iter().map(|c| c - 1.5).collect(),
            close_prices: closes,
            base_asset_volumes: volumes,
            quote_asset_volumes: vec![1000.0; n],
            pct_gaps: 0.0,
        }
    }

    fn short_series(pair: &str) -> OhlcvTimeSeries {
        let mut s = crossover_series(pair);
        s.open_prices.truncate(3);
        s.high_prices.truncate(3);
        s.low_prices.truncate(3);
        s.close_prices.truncate(3);
        s.base_asset_volumes.truncate(3);
        s.quote_asset_volumes.truncate(3);
        s
    }

    fn collection(series: Vec<OhlcvTimeSeries>) -> TimeSeriesCollection {
        TimeSeriesCollection {
            name: "test".to_string(),
            version: 1.0,
            series_data: series,
        }
    }

    #[test]
    fn crossover_series_produces_one_alert() {
        let mut engine = SentryEngine::new(ANALYSIS.clone());
        let outcome = engine.scan_at(&collection(vec![crossover_series("BTCUSDT")]), 0);

        assert_eq!(outcome.evaluated, 1);
        assert_eq!(outcome.alerts.len(), 1);
        let alert = &outcome.alerts[0];
        assert!(matches!(
            alert.key.category,
            SignalCategory::Crossover | SignalCategory::HighConfirmation
        ));
        assert!(alert.title.contains("BTCUSDT 30m"));
    }

    #[test]
    fn short_series_is_skipped_not_fatal() {
        let mut engine = SentryEngine::new(ANALYSIS.clone());
        let outcome = engine.scan_at(
            &collection(vec![short_series("DOGEUSDT"), crossover_series("BTCUSDT")]),
            0,
        );

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.evaluated, 1);
        assert_eq!(outcome.alerts.len(), 1);
    }

    #[test]
    fn repeat_scan_is_deduplicated() {
        let mut engine = SentryEngine::new(ANALYSIS.clone());
        let data = collection(vec![crossover_series("BTCUSDT")]);

        let first = engine.scan_at(&data, 0);
        assert_eq!(first.alerts.len(), 1);

        // Same data again: same state, edge-trigger holds it back
        let second = engine.scan_at(&data, 60_000);
        assert!(second.alerts.is_empty());
        assert_eq!(second.suppressed, 1);
    }

    #[test]
    fn scans_are_idempotent_in_classification() {
        let data = collection(vec![crossover_series("ETHUSDT")]);
        let mut engine_a = SentryEngine::new(ANALYSIS.clone());
        let mut engine_b = SentryEngine::new(ANALYSIS.clone());

        let a = engine_a.scan_at(&data, 0);
        let b = engine_b.scan_at(&data, 0);
        assert_eq!(a.alerts.len(), b.alerts.len());
        assert_eq!(a.alerts[0].body, b.alerts[0].body);
    }
}
