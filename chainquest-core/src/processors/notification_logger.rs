//! NotificationLogger processor.
//!
//! Drains the notification channel and writes one structured log line per
//! notification. It is the only consumer the server runs; anything that
//! needs to react to state changes subscribes the same way.

use std::convert::Infallible;

use kanau::processor::Processor;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::events::{Notification, NotificationReceiver};

pub struct NotificationLogger {
    notifications: NotificationReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl Processor<Notification> for NotificationLogger {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, notification: Notification) -> Result<(), Infallible> {
        match notification {
            Notification::CharacterEvolved {
                character_id,
                owner,
                from_level,
                to_level,
                evolution_name,
            } => info!(
                character_id = %character_id,
                owner = %owner,
                from_level,
                to_level,
                evolution_name = %evolution_name,
                "Character evolved"
            ),
            Notification::RewardGranted {
                recipient,
                tokens,
                items,
                cause_event_id,
            } => info!(
                recipient = %recipient,
                tokens,
                items = items.len(),
                cause_event_id = %cause_event_id,
                "Reward granted"
            ),
            Notification::AchievementUnlocked {
                player,
                achievement,
            } => info!(player = %player, achievement = %achievement, "Achievement unlocked"),
            Notification::QuestUnlocked { player, quest_id } => {
                info!(player = %player, quest_id = %quest_id, "Quest unlocked")
            }
            Notification::TournamentCreated {
                tournament_id,
                tournament_type,
            } => info!(
                tournament_id = %tournament_id,
                tournament_type = %tournament_type,
                "Tournament opened"
            ),
            Notification::TournamentAdvanced {
                tournament_id,
                round,
            } => info!(tournament_id = %tournament_id, round, "Tournament advanced"),
            Notification::TournamentCompleted {
                tournament_id,
                winners,
            } => info!(
                tournament_id = %tournament_id,
                winners = ?winners,
                "Tournament finished"
            ),
            Notification::LeaderboardUpdated { players } => {
                info!(players = ?players, "Leaderboard updated")
            }
        }
        Ok(())
    }
}

impl NotificationLogger {
    pub fn new(notifications: NotificationReceiver, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            notifications,
            shutdown_rx,
        }
    }

    /// Run until shutdown is signalled or every sender is gone.
    pub async fn run(mut self) {
        info!("NotificationLogger started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("NotificationLogger received shutdown signal");
                        break;
                    }
                }

                received = self.notifications.recv() => match received {
                    Ok(notification) => {
                        let Ok(()) = self.process(notification).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "NotificationLogger lagged behind");
                    }
                    Err(RecvError::Closed) => {
                        info!("Notification channel closed");
                        break;
                    }
                },
            }
        }

        info!("NotificationLogger shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::notification_channel;

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let (tx, rx) = notification_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(NotificationLogger::new(rx, shutdown_rx).run());

        tx.send(Notification::QuestUnlocked {
            player: "0xa".to_string(),
            quest_id: "play_first_game".to_string(),
        })
        .unwrap();
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stops_when_senders_are_dropped() {
        let (tx, rx) = notification_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(NotificationLogger::new(rx, shutdown_rx).run());
        drop(tx);
        handle.await.unwrap();
    }
}
