use chainquest_sdk::objects::quest::{DailyQuest, QuestReward};
use time::macros::time;
use time::{Duration, OffsetDateTime};

use super::RuleError;
use super::tables::{QUEST_TEMPLATES, QuestExpiry, QuestTemplate, quest_template};

/// A completed quest's fixed reward, plus what it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestEvaluation {
    pub template: &'static QuestTemplate,
    pub reward: QuestReward,
    pub unlocks: &'static [&'static str],
}

pub fn evaluate_quest_completion(quest_id: &str) -> Result<QuestEvaluation, RuleError> {
    let template =
        quest_template(quest_id).ok_or_else(|| RuleError::UnknownQuest(quest_id.to_string()))?;
    Ok(QuestEvaluation {
        template,
        reward: template.reward,
        unlocks: template.unlocks,
    })
}

/// Next UTC midnight after `now`.
pub fn end_of_day(now: OffsetDateTime) -> OffsetDateTime {
    let now = now.to_offset(time::UtcOffset::UTC);
    let tomorrow = now.date().next_day().unwrap_or(now.date());
    tomorrow.midnight().assume_utc()
}

/// The coming Sunday at 23:59:59.999 UTC. On a Sunday this is the Sunday a
/// week later.
pub fn end_of_week(now: OffsetDateTime) -> OffsetDateTime {
    let now = now.to_offset(time::UtcOffset::UTC);
    let days = 7 - i64::from(now.weekday().number_days_from_sunday());
    let sunday = now
        .date()
        .checked_add(Duration::days(days))
        .unwrap_or(now.date());
    sunday.with_time(time!(23:59:59.999)).assume_utc()
}

/// Quests offered to a player of `player_level` at `now`, progress zeroed.
pub fn daily_quests(player_level: u32, now: OffsetDateTime) -> Vec<DailyQuest> {
    QUEST_TEMPLATES
        .iter()
        .filter_map(|template| {
            let offer = template.offer?;
            (player_level >= offer.min_level).then(|| DailyQuest {
                id: template.id.to_string(),
                name: template.name.to_string(),
                description: template.description.to_string(),
                reward: template.reward,
                kind: template.kind,
                progress: 0,
                target: offer.target,
                expires_at: match offer.expiry {
                    QuestExpiry::EndOfDay => end_of_day(now),
                    QuestExpiry::EndOfWeek => end_of_week(now),
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_known_quest_reward_is_verbatim() {
        let evaluation = evaluate_quest_completion("win_3_battles").unwrap();
        assert_eq!(
            evaluation.reward,
            QuestReward {
                tokens: 300,
                xp: 150
            }
        );
        assert!(evaluation.unlocks.is_empty());
    }

    #[test]
    fn test_mint_character_unlocks_first_game() {
        let evaluation = evaluate_quest_completion("mint_character").unwrap();
        assert_eq!(evaluation.unlocks, &["play_first_game"]);
    }

    #[test]
    fn test_unknown_quest() {
        assert_eq!(
            evaluate_quest_completion("slay_dragon"),
            Err(RuleError::UnknownQuest("slay_dragon".to_string()))
        );
    }

    #[test]
    fn test_end_of_day() {
        let now = datetime!(2026-03-04 15:30 UTC);
        assert_eq!(end_of_day(now), datetime!(2026-03-05 0:00 UTC));
    }

    #[test]
    fn test_end_of_week_midweek_and_sunday() {
        // 2026-03-04 is a Wednesday.
        assert_eq!(
            end_of_week(datetime!(2026-03-04 10:00 UTC)),
            datetime!(2026-03-08 23:59:59.999 UTC)
        );
        assert_eq!(
            end_of_week(datetime!(2026-03-08 10:00 UTC)),
            datetime!(2026-03-15 23:59:59.999 UTC)
        );
    }

    #[test]
    fn test_weekly_quest_requires_level_three() {
        let now = datetime!(2026-03-04 10:00 UTC);
        let ids = |level| {
            daily_quests(level, now)
                .into_iter()
                .map(|q| q.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(2), vec!["daily_login", "play_5_games"]);
        assert_eq!(ids(3), vec!["daily_login", "play_5_games", "win_3_battles"]);
    }

    #[test]
    fn test_offered_quests_start_at_zero_progress() {
        let quests = daily_quests(5, datetime!(2026-03-04 10:00 UTC));
        assert!(quests.iter().all(|q| q.progress == 0));
        assert_eq!(quests[1].target, 5);
        assert_eq!(quests[2].expires_at, datetime!(2026-03-08 23:59:59.999 UTC));
    }
}
