//! Pushbullet delivery over the v2 pushes endpoint.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::config::NOTIFY;
use crate::notify::Notifier;

pub struct PushbulletNotifier {
    client: reqwest::Client,
    token: String,
}

impl PushbulletNotifier {
    /// Build from the configured token environment variable; None when the
    /// token is absent or empty (the channel is simply not configured).
    pub fn from_env() -> Option<Self> {
        let token = std::env::var(NOTIFY.pushbullet.token_env).ok()?;
        if token.trim().is_empty() {
            return None;
        }
        Some(Self::with_token(token))
    }

    pub fn with_token(token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(NOTIFY.pushbullet.timeout_ms))
            .build()
            .expect("reqwest client construction only fails on invalid TLS config");
        Self { client, token }
    }
}

#[async_trait]
impl Notifier for PushbulletNotifier {
    fn signature(&self) -> &'static str {
        "Pushbullet"
    }

    async fn send(&self, title: &str, body: &str) -> Result<()> {
        let note = json!({
            "type": "note",
            "title": title,
            "body": body,
        });

        let response = self
            .client
            .post(NOTIFY.pushbullet.pushes_url)
            .header("Access-Token", &self.token)
            .json(&note)
            .send()
            .await
            .context("Pushbullet request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("Pushbullet rejected the push: {} {}", status, detail);
        }
        Ok(())
    }
}
