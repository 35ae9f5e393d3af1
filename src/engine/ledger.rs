//! Edge-triggered alert deduplication.
//!
//! A classification only notifies when its series *transitions* into that
//! state; holding the same state across consecutive scans stays silent. A
//! cool-down floor additionally mutes rapid flapping of the same key.
//!
//! The ledger lives in memory for the process lifetime: a one-shot run
//! starts empty (every detection fires once), watch mode keeps it across
//! polls, which is where the dedup earns its keep.

use std::collections::HashMap;

use crate::signal::classifier::{CrossDirection, SignalCategory};

/// Identity of one series being watched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub pair: String,
    pub interval_ms: i64,
    pub exchange: String,
}

/// Identity of one alert state: which series, which category, which way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub series: SeriesKey,
    pub category: SignalCategory,
    pub direction: Option<CrossDirection>,
}

pub struct AlertLedger {
    cooldown_secs: i64,
    /// Last alerted state per series (the edge detector)
    current: HashMap<SeriesKey, AlertKey>,
    /// When each alert key last actually fired (the cool-down)
    last_fired_ms: HashMap<AlertKey, i64>,
}

impl AlertLedger {
    pub fn new(cooldown_secs: i64) -> Self {
        Self {
            cooldown_secs,
            current: HashMap::new(),
            last_fired_ms: HashMap::new(),
        }
    }

    /// Record this scan's outcome for one series and decide whether to
    /// notify. `None` clears the series state so the next detection is a
    /// fresh transition.
    pub fn observe(&mut self, outcome: Option<AlertKey>, now_ms: i64) -> bool {
        let Some(key) = outcome else {
            return false;
        };
        let series = key.series.clone();

        // Level hold: same state as last scan, nothing new to say
        if self.current.get(&series) == Some(&key) {
            return false;
        }

        // State transition. Record it either way; the cool-down only decides
        // whether this particular transition is worth a notification.
        self.current.insert(series, key.clone());

        let cooled_down = self
            .last_fired_ms
            .get(&key)
            .is_none_or(|fired| (now_ms - fired) / 1000 >= self.cooldown_secs);
        if cooled_down {
            self.last_fired_ms.insert(key, now_ms);
        }
        cooled_down
    }

    /// Clear the recorded state for a series (e.g. when its scan produced no
    /// classification this time).
    pub fn clear(&mut self, series: &SeriesKey) {
        self.current.remove(series);
    }

    pub fn tracked_series(&self) -> usize {
        self.current.len()
    }
}
