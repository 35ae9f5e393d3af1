//! Notification delivery configuration.

/// Configuration for the Pushbullet client
pub struct PushbulletConfig {
    /// Pushes endpoint (v2 API)
    pub pushes_url: &'static str,
    /// Environment variable holding the access token
    pub token_env: &'static str,
    pub timeout_ms: u64,
}

/// Settings for the alert ledger (edge-trigger / dedup)
pub struct AlertingConfig {
    /// Minimum seconds between repeats of the same alert key, even after a
    /// state transition
    pub cooldown_secs: i64,
}

/// The Master Notification Configuration
pub struct NotifyConfig {
    pub pushbullet: PushbulletConfig,
    pub alerting: AlertingConfig,
}

pub const NOTIFY: NotifyConfig = NotifyConfig {
    pushbullet: PushbulletConfig {
        pushes_url: "https://api.pushbullet.com/v2/pushes",
        token_env: "PUSHBULLET_TOKEN",
        timeout_ms: 5000,
    },
    alerting: AlertingConfig {
        // One candle of the smallest configured interval
        cooldown_secs: 1800,
    },
};
