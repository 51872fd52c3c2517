use std::collections::BTreeMap;

use chainquest_sdk::objects::tournament::PrizeShare;
use rand::Rng;
use time::OffsetDateTime;

use super::tables::PRIZE_SPLIT_BPS;
use crate::entities::tournament::RegisteredPlayer;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Split `total_prize` over `winners` in finishing order.
///
/// Each paid place gets `floor(total * pct)`. Winners past the last paid
/// place are omitted. The rounding remainder stays undistributed.
pub fn evaluate_prize_distribution(winners: &[String], total_prize: u64) -> Vec<PrizeShare> {
    winners
        .iter()
        .zip(PRIZE_SPLIT_BPS)
        .enumerate()
        .map(|(i, (recipient, bps))| PrizeShare {
            recipient: recipient.clone(),
            place: i as u32 + 1,
            amount: (u128::from(total_prize) * u128::from(bps) / 10_000) as u64,
        })
        .collect()
}

pub fn undistributed(total_prize: u64, shares: &[PrizeShare]) -> u64 {
    let paid: u64 = shares.iter().map(|s| s.amount).sum();
    total_prize.saturating_sub(paid)
}

/// Battles needed to close a round of `participants` players.
pub fn round_quota(participants: usize) -> usize {
    (participants / 2).max(1)
}

fn stat_total(stats: &BTreeMap<String, u64>) -> u64 {
    stats.values().fold(0u64, |acc, v| acc.saturating_add(*v))
}

/// The candidate on another chain whose stat total is closest to `stats`.
/// Ties go to the earliest candidate.
pub fn find_best_match<'a>(
    chain: &str,
    stats: &BTreeMap<String, u64>,
    candidates: impl IntoIterator<Item = &'a RegisteredPlayer>,
) -> Option<&'a RegisteredPlayer> {
    let total = stat_total(stats);
    candidates
        .into_iter()
        .filter(|c| c.chain != chain)
        .fold(None::<(&'a RegisteredPlayer, u64)>, |best, candidate| {
            let distance = stat_total(&candidate.stats).abs_diff(total);
            match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((candidate, distance)),
            }
        })
        .map(|(player, _)| player)
}

/// `tournament_<unix_ms>_<9 base36 chars>`.
pub fn generate_tournament_id(now: OffsetDateTime, rng: &mut impl Rng) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let suffix: String = (0..9)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("tournament_{millis}_{suffix}")
}
