// Outbound notification delivery
pub mod format;
pub mod pushbullet;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use pushbullet::PushbulletNotifier;

/// A delivery channel for one alert. Implementations receive plain text with
/// `*bold*` / `_italic_` markers and are responsible for rendering them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, title: &str, body: &str) -> Result<()>;

    /// A unique identifier for this channel (so logs show which one
    /// delivered).
    fn signature(&self) -> &'static str;
}

/// Writes alerts to the log. Always succeeds; the terminal fallback.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn signature(&self) -> &'static str {
        "Log"
    }

    async fn send(&self, title: &str, body: &str) -> Result<()> {
        log::info!("{} {}", title, body);
        Ok(())
    }
}

/// Channels in preference order: Pushbullet when a token is configured, the
/// log sink always.
pub fn build_notifier_chain() -> Vec<Box<dyn Notifier>> {
    let mut chain: Vec<Box<dyn Notifier>> = Vec::new();
    match PushbulletNotifier::from_env() {
        Some(pushbullet) => chain.push(Box::new(pushbullet)),
        None => {
            log::info!("No Pushbullet token configured; alerts go to the log only.");
        }
    }
    chain.push(Box::new(LogNotifier));
    chain
}

/// Try each channel in order; first success wins.
pub async fn send_with_fallback(
    notifiers: &[Box<dyn Notifier>],
    title: &str,
    body: &str,
) -> Result<&'static str> {
    for notifier in notifiers {
        match notifier.send(title, body).await {
            Ok(()) => return Ok(notifier.signature()),
            Err(e) => {
                log::warn!("Notifier {} failed: {:#}", notifier.signature(), e);
                // Continue to the next channel
            }
        }
    }
    Err(anyhow!("Every notification channel failed"))
}
