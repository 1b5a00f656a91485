//! Timed work sessions paid in silver.
//!
//! Sessions are never expired in the background: a `working` session past
//! its finish time is flipped to `finished` by the next collect.

use super::GameEngine;
use crate::game::{
    errors::{GameError, GameResult},
    models::{
        Currency, CurrencyDeltas, Player, WorkPayout, WorkSession, WorkStatus, WorkStatusReport,
    },
    rules,
};
use chrono::{DateTime, Utc};

impl GameEngine {
    /// Start a work session
    ///
    /// # Errors
    ///
    /// * `GameError::AlreadyWorking` - A session is running (carried in the error)
    /// * `GameError::CooldownAfterCollect` - Collected too recently
    pub async fn start_work(&self, player_id: &str) -> GameResult<WorkSession> {
        let result = self.try_start_work(player_id).await;
        self.finish("start_work", player_id, result)
    }

    async fn try_start_work(&self, player_id: &str) -> GameResult<WorkSession> {
        let mut tx = self.store.begin().await?;
        let player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let now = self.now();

        if let Some(session) = tx.lock_active_session(&player.id).await? {
            return Err(GameError::AlreadyWorking {
                session: Box::new(session),
            });
        }

        let cooldown_left = self.post_collect_cooldown(&player, now)?;
        if cooldown_left > 0 {
            return Err(GameError::CooldownAfterCollect {
                remaining_secs: cooldown_left,
            });
        }

        let finish_at = self.deadline(now, self.config.work_duration())?;
        let session = tx.insert_session(&player.id, now, finish_at).await?;
        tx.commit().await?;

        log::info!(
            "Player {} started work session {} (finishes {})",
            player.id,
            session.id,
            session.finish_at
        );
        Ok(session)
    }

    /// Collect the latest work session
    ///
    /// # Returns
    ///
    /// * `GameResult<WorkPayout>` - Base reward, streak bonus and new silver balance
    ///
    /// # Errors
    ///
    /// * `GameError::NoSession` - Never worked
    /// * `GameError::NoFinishedSession` - Latest session was cancelled
    /// * `GameError::StillWorking` - Finish time not reached
    /// * `GameError::AlreadyCollected` - Latest session already paid
    pub async fn collect_work(&self, player_id: &str) -> GameResult<WorkPayout> {
        let result = self.try_collect_work(player_id).await;
        self.finish("collect_work", player_id, result)
    }

    async fn try_collect_work(&self, player_id: &str) -> GameResult<WorkPayout> {
        let mut tx = self.store.begin().await?;
        let mut player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let now = self.now();

        let mut session = tx
            .lock_latest_session(&player.id)
            .await?
            .ok_or(GameError::NoSession)?;

        match session.status {
            WorkStatus::Cancelled => return Err(GameError::NoFinishedSession),
            WorkStatus::Collected => {
                return Err(GameError::AlreadyCollected {
                    remaining_secs: self.post_collect_cooldown(&player, now)?,
                });
            }
            WorkStatus::Working if now < session.finish_at => {
                return Err(GameError::StillWorking {
                    remaining_secs: rules::remaining_secs(session.finish_at, now),
                });
            }
            WorkStatus::Working => {
                session.status = WorkStatus::Finished;
                tx.update_session(&session).await?;
                log::debug!("Work session {} finished", session.id);
            }
            WorkStatus::Finished => {}
        }

        let streak = rules::next_streak(
            player.work_streak,
            player.last_work_collected_at,
            now,
            self.config.work_streak_window(),
            self.config.work_streak_cap_days,
        );
        let base_reward = self.config.work_reward_silver;
        let bonus = rules::work_bonus(
            self.config.work_streak_bonus_per_day,
            streak,
            self.config.work_bonus_cap(),
        );
        let total_reward = base_reward.saturating_add(bonus);

        let balance = self.credit(
            &mut player,
            &CurrencyDeltas::single(Currency::Silver, total_reward),
        );
        player.work_streak = streak;
        player.last_work_collected_at = Some(now);
        tx.save_player(&player).await?;

        session.status = WorkStatus::Collected;
        session.collected_at = Some(now);
        tx.update_session(&session).await?;
        tx.commit().await?;

        log::info!(
            "Player {} collected work session {}: {} silver (streak {})",
            player.id,
            session.id,
            total_reward,
            streak
        );

        Ok(WorkPayout {
            session_id: session.id,
            base_reward,
            bonus,
            total_reward,
            new_silver: balance.silver,
            streak,
        })
    }

    /// Abandon the running session without reward or cooldown
    ///
    /// # Errors
    ///
    /// * `GameError::NoSession` - Nothing is running
    pub async fn cancel_work(&self, player_id: &str) -> GameResult<WorkSession> {
        let result = self.try_cancel_work(player_id).await;
        self.finish("cancel_work", player_id, result)
    }

    async fn try_cancel_work(&self, player_id: &str) -> GameResult<WorkSession> {
        let mut tx = self.store.begin().await?;
        let player = self.load_or_create_player(tx.as_mut(), player_id).await?;

        let mut session = tx
            .lock_active_session(&player.id)
            .await?
            .ok_or(GameError::NoSession)?;
        session.status = WorkStatus::Cancelled;
        tx.update_session(&session).await?;
        tx.commit().await?;

        log::info!("Player {} cancelled work session {}", player.id, session.id);
        Ok(session)
    }

    /// Latest session with time left and post-collect cooldown
    pub async fn work_status(&self, player_id: &str) -> GameResult<WorkStatusReport> {
        let result = self.try_work_status(player_id).await;
        self.finish("work_status", player_id, result)
    }

    async fn try_work_status(&self, player_id: &str) -> GameResult<WorkStatusReport> {
        let mut tx = self.store.begin().await?;
        let player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let now = self.now();

        let session = tx.lock_latest_session(&player.id).await?;
        tx.commit().await?;

        let remaining_secs = match &session {
            Some(s) if s.status == WorkStatus::Working => rules::remaining_secs(s.finish_at, now),
            _ => 0,
        };

        Ok(WorkStatusReport {
            session,
            remaining_secs,
            cooldown_secs: self.post_collect_cooldown(&player, now)?,
        })
    }

    fn post_collect_cooldown(&self, player: &Player, now: DateTime<Utc>) -> GameResult<i64> {
        match player.last_work_collected_at {
            Some(at) => {
                let ready_at = self.deadline(at, self.config.work_cooldown_after_collect())?;
                Ok(rules::remaining_secs(ready_at, now))
            }
            None => Ok(0),
        }
    }
}
