//! Alert text rendering.
//!
//! Output is plain text with `*bold*` / `_italic_` markers; the delivery
//! channel decides how (or whether) to render them.

use crate::models::timeseries::OhlcvTimeSeries;
use crate::signal::classifier::{
    CrossDirection, SignalCategory, SignalClassification, TradeAction,
};

pub fn render_title(series: &OhlcvTimeSeries) -> String {
    format!(
        "[🎯 ALERT - {} @ {}]",
        series.pair_interval.label(),
        series.exchange
    )
}

pub fn render_body(signal: &SignalClassification) -> String {
    let mut lines: Vec<String> = Vec::new();

    match signal.category {
        SignalCategory::HighConfirmation => {
            let arrow = direction_arrow(signal.direction);
            lines.push(format!(
                "{arrow} *High-confirmation {}!* OBV crossover with a strong trend behind it.",
                signal.action
            ));
        }
        SignalCategory::Crossover => match signal.direction {
            Some(CrossDirection::Bullish) => {
                lines.push("🚀 *Bullish Crossover* (cross up)! Possible trend reversal.".into());
            }
            _ => {
                lines.push("📉 *Bearish Crossover* (cross down)! Possible trend reversal.".into());
            }
        },
        SignalCategory::PatternReversal => {
            // Pattern-only alerts always carry a pattern hit
            if let Some(hit) = &signal.pattern {
                let location = hit
                    .level
                    .map(|level| {
                        format!(" near {} {} at {:.4}", level.kind, level.name, level.price)
                    })
                    .unwrap_or_default();
                lines.push(format!(
                    "🕯️ *{}*{}. No crossover yet, watch this level.",
                    hit.pattern, location
                ));
            }
        }
        SignalCategory::PreCross => {
            let side = match signal.direction {
                Some(CrossDirection::Bullish) => "Bullish",
                _ => "Bearish",
            };
            let distance = signal
                .distance_pct
                .map(|d| format!("{:.2}%", d * 100.0))
                .unwrap_or_else(|| "?".into());
            lines.push(format!(
                "⚠️ _Pre-Cross ({side})!_ OBV is only {distance} away from its MA. Get ready for a crossing!"
            ));
        }
    }

    lines.push(format!(
        "OBV {:.0} vs MA {:.0}",
        signal.obv, signal.obv_ma
    ));

    if let Some(adx) = signal.adx {
        lines.push(format!("ADX {:.1}", adx));
    }

    if signal.category != SignalCategory::PatternReversal {
        if let Some(hit) = &signal.pattern {
            lines.push(format!("Pattern: {}", hit.pattern));
        }
    }

    if let Some(plan) = &signal.plan {
        if signal.action != TradeAction::Advisory {
            lines.push(format!(
                "Entry {:.4} | SL *{:.4}* | TP *{:.4}*",
                plan.entry, plan.stop_loss, plan.take_profit
            ));
        }
    }

    lines.join("\n")
}

fn direction_arrow(direction: Option<CrossDirection>) -> &'static str {
    match direction {
        Some(CrossDirection::Bullish) => "🚀",
        _ => "📉",
    }
}
