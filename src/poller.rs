//! The fetch → validate → notify loop.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::BotError;
use crate::practicum::PracticumClient;
use crate::status::HomeworkEntry;
use crate::telegram::TelegramNotifier;

/// Owns the timestamp cursor and drives the iteration cycle. Sole writer of
/// the cursor; iterations are strictly sequential.
pub struct Poller {
    practicum: PracticumClient,
    notifier: TelegramNotifier,
    poll_interval: Duration,
    from_date: u64,
}

impl Poller {
    /// The first fetch starts from the current time: the bot announces
    /// transitions from startup onward rather than replaying history.
    pub fn new(config: &Config, practicum: PracticumClient, notifier: TelegramNotifier) -> Self {
        Self {
            practicum,
            notifier,
            poll_interval: config.poll_interval,
            from_date: now_unix(),
        }
    }

    /// Runs forever.
    ///
    /// One iteration is one fallible unit. Any failure is logged, reported
    /// to the chat best-effort, and followed by the same fixed sleep as a
    /// success; the cursor only moves on a fully successful iteration.
    pub async fn run(mut self) {
        info!(
            "Polling every {}s starting from {}",
            self.poll_interval.as_secs(),
            self.from_date
        );

        loop {
            if let Err(e) = self.poll_once().await {
                error!("Poll iteration failed: {}", e);
                self.report_failure(&e).await;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn poll_once(&mut self) -> Result<(), BotError> {
        let response = self.practicum.fetch(self.from_date).await?;

        if response.homeworks.is_empty() {
            debug!("No new homework statuses (from_date={})", self.from_date);
        }

        for raw in &response.homeworks {
            let entry = HomeworkEntry::from_value(raw)?;
            let message = entry.status_change_message()?;
            info!(
                "Status of \"{}\" changed to {}",
                entry.homework_name, entry.status
            );
            self.notifier.notify_best_effort(&message).await;
        }

        self.from_date = next_cursor(self.from_date, response.current_date);
        Ok(())
    }

    /// Best-effort failure report to the recipient. A failure of the report
    /// itself is logged and contained here.
    async fn report_failure(&self, error: &BotError) {
        let message = format!("Сбой в работе программы: {error}");
        if let Err(e) = self.notifier.send_message(&message).await {
            error!("Could not report the failure to the chat: {}", e);
        }
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Watermark rule: advance to the server-acknowledged timestamp when one is
/// present, keep the previous cursor otherwise, never move backwards.
fn next_cursor(current: u64, watermark: Option<u64>) -> u64 {
    match watermark {
        Some(acknowledged) => acknowledged.max(current),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_advances_to_watermark() {
        assert_eq!(next_cursor(100, Some(250)), 250);
    }

    #[test]
    fn test_cursor_unchanged_without_watermark() {
        assert_eq!(next_cursor(100, None), 100);
    }

    #[test]
    fn test_cursor_never_decreases() {
        assert_eq!(next_cursor(300, Some(250)), 300);
    }

    #[test]
    fn test_cursor_is_stable_on_equal_watermark() {
        // Re-fetching the same window is idempotent
        assert_eq!(next_cursor(300, Some(300)), 300);
    }

    #[test]
    fn test_initial_cursor_is_wall_clock() {
        // 2023-01-01, far enough in the past to be safe on any build host
        assert!(now_unix() > 1_672_531_200);
    }
}
