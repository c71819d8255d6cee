//! Trix scoring: category deltas, round deltas, match totals and the
//! per-round count ceilings

use chrono::Utc;
use std::collections::BTreeMap;

use super::category::{Category, CategoryEntry, HandMode};
use super::ids::{generate_id, PlayerId};
use super::match_state::Match;
use super::round::{Round, RoundDraft, RoundEntries};
use crate::error::{Result, TrixError};

/// Points for one category entry of one player. Saturates at the `i32`
/// bounds for counts no real hand can reach.
pub fn calculate_category_delta(
    entry: &CategoryEntry,
    category: Category,
    hand_mode: HandMode,
    doubling_enabled: bool,
) -> i32 {
    if entry.count == 0 {
        return 0;
    }

    let magnitude = i64::from(entry.count) * i64::from(category.point_value());

    // Doubled flag is ignored for diamonds and collections
    let doubling = if doubling_enabled && entry.doubled && category.is_doublable() {
        2
    } else {
        1
    };

    let delta = magnitude * i64::from(hand_mode.sign()) * doubling;
    i32::try_from(delta).unwrap_or(if delta < 0 { i32::MIN } else { i32::MAX })
}

/// Sum of the category deltas for one player; 0 if the player has no entries
pub fn calculate_player_round_delta<R: RoundEntries + ?Sized>(
    round: &R,
    player_id: &PlayerId,
    hand_mode: HandMode,
    doubling_enabled: bool,
) -> i32 {
    let Some(entries) = round.per_player().get(player_id) else {
        return 0;
    };

    Category::ALL
        .iter()
        .map(|c| calculate_category_delta(entries.get(*c), *c, hand_mode, doubling_enabled))
        .fold(0, i32::saturating_add)
}

/// Delta for every player present in the round
pub fn calculate_round_deltas<R: RoundEntries + ?Sized>(
    round: &R,
    hand_mode: HandMode,
    doubling_enabled: bool,
) -> BTreeMap<PlayerId, i32> {
    round
        .per_player()
        .keys()
        .map(|id| {
            let delta = calculate_player_round_delta(round, id, hand_mode, doubling_enabled);
            (id.clone(), delta)
        })
        .collect()
}

/// Running total for a player over all rounds of the match, in round order.
///
/// Uses each round's cached delta when present and recomputes otherwise.
pub fn calculate_player_total(m: &Match, player_id: &PlayerId) -> i32 {
    m.rounds
        .iter()
        .map(|round| match round.delta_for(player_id) {
            Some(delta) => delta,
            None => calculate_player_round_delta(
                round,
                player_id,
                round.hand_mode(),
                m.doubling_enabled,
            ),
        })
        .fold(0, i32::saturating_add)
}

/// Totals for every player of the match
pub fn calculate_all_player_totals(m: &Match) -> BTreeMap<PlayerId, i32> {
    m.players
        .iter()
        .map(|p| (p.id.clone(), calculate_player_total(m, &p.id)))
        .collect()
}

/// Count taken in `category` across all players. Saturates at `u32::MAX`,
/// which is above every category maximum.
pub fn get_category_total_count<R: RoundEntries + ?Sized>(round: &R, category: Category) -> u32 {
    round
        .per_player()
        .values()
        .map(|entries| entries.get(category).count)
        .fold(0, u32::saturating_add)
}

pub fn is_category_at_max<R: RoundEntries + ?Sized>(round: &R, category: Category) -> bool {
    get_category_total_count(round, category) >= category.max_count()
}

/// Would raising `player_id`'s count from `current_count` by one push the
/// cross-player total for `category` past its maximum?
pub fn would_exceed_max<R: RoundEntries + ?Sized>(
    round: &R,
    category: Category,
    player_id: &PlayerId,
    current_count: u32,
) -> bool {
    let total = get_category_total_count(round, category);
    let player_count = round
        .per_player()
        .get(player_id)
        .map(|e| e.get(category).count)
        .unwrap_or(0);

    let new_total = total
        .saturating_sub(player_count)
        .saturating_add(current_count)
        .saturating_add(1);
    new_total > category.max_count()
}

/// True if any category was not played to its full count
pub fn is_round_partial<R: RoundEntries + ?Sized>(round: &R) -> bool {
    Category::ALL
        .iter()
        .any(|c| get_category_total_count(round, *c) < c.max_count())
}

/// Reject rounds whose cross-player totals exceed a category maximum
pub fn validate_round_data<R: RoundEntries + ?Sized>(round: &R) -> Result<()> {
    for category in Category::ALL {
        let total = get_category_total_count(round, category);
        let max = category.max_count();
        if total > max {
            return Err(TrixError::CategoryExceedsMax {
                category,
                total,
                max,
            });
        }
    }
    Ok(())
}

/// Build the saved round from a draft, attaching the cached deltas and the
/// partial flag. This is the only place those fields are produced.
pub fn prepare_round_for_save(draft: &RoundDraft, hand_mode: HandMode, doubling_enabled: bool) -> Round {
    let computed = calculate_round_deltas(draft, hand_mode, doubling_enabled);
    let partial = is_round_partial(draft);

    Round::scored(
        draft,
        hand_mode,
        draft.id.clone().unwrap_or_else(generate_id),
        draft.created_at.unwrap_or_else(Utc::now),
        computed,
        partial,
    )
}

pub fn get_default_round_draft(player_ids: &[PlayerId]) -> RoundDraft {
    RoundDraft::for_players(player_ids)
}

/// True iff every count is zero; doubled flags do not matter
pub fn is_round_draft_empty<R: RoundEntries + ?Sized>(round: &R) -> bool {
    round.per_player().values().all(|e| e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayerEntries;

    fn seats() -> Vec<PlayerId> {
        (0..4).map(PlayerId::from_seat).collect()
    }

    fn entry(count: u32, doubled: bool) -> CategoryEntry {
        CategoryEntry::new(count, doubled)
    }

    /// A complete hand: every category played to its maximum
    fn full_draft() -> RoundDraft {
        let ids = seats();
        let mut draft = get_default_round_draft(&ids);
        draft.entries_mut(&ids[0]).king = entry(1, false);
        draft.entries_mut(&ids[1]).queens = entry(4, false);
        draft.entries_mut(&ids[2]).diamonds = entry(13, false);
        draft.entries_mut(&ids[3]).collections = entry(13, false);
        draft
    }

    #[test]
    fn test_category_delta_zero_count() {
        assert_eq!(calculate_category_delta(&entry(0, true), Category::King, HandMode::Plus, true), 0);
    }

    #[test]
    fn test_category_delta_king_doubling() {
        assert_eq!(calculate_category_delta(&entry(1, true), Category::King, HandMode::Plus, true), 150);
        assert_eq!(calculate_category_delta(&entry(1, true), Category::King, HandMode::Plus, false), 75);
        assert_eq!(calculate_category_delta(&entry(1, false), Category::King, HandMode::Plus, true), 75);
    }

    #[test]
    fn test_category_delta_doubling_ignored_for_diamonds() {
        assert_eq!(calculate_category_delta(&entry(2, true), Category::Diamonds, HandMode::Plus, true), 20);
        assert_eq!(calculate_category_delta(&entry(3, true), Category::Collections, HandMode::Minus, true), -45);
    }

    #[test]
    fn test_category_delta_per_unit() {
        assert_eq!(calculate_category_delta(&entry(3, false), Category::Queens, HandMode::Minus, false), -75);
        assert_eq!(calculate_category_delta(&entry(3, true), Category::Queens, HandMode::Minus, true), -150);
    }

    #[test]
    fn test_plus_and_minus_are_negatives() {
        for category in Category::ALL {
            for count in 0..=category.max_count() {
                for doubled in [false, true] {
                    for doubling_enabled in [false, true] {
                        let e = entry(count, doubled);
                        let plus = calculate_category_delta(&e, category, HandMode::Plus, doubling_enabled);
                        let minus = calculate_category_delta(&e, category, HandMode::Minus, doubling_enabled);
                        assert_eq!(plus, -minus, "{} x{} doubled={}", category, count, doubled);
                    }
                }
            }
        }
    }

    #[test]
    fn test_player_round_delta() {
        let ids = seats();
        let mut draft = get_default_round_draft(&ids);
        *draft.entries_mut(&ids[0]) = PlayerEntries {
            king: entry(1, true),
            queens: entry(2, false),
            diamonds: entry(3, true),
            collections: entry(4, false),
        };

        // 150 + 50 + 30 + 60
        assert_eq!(calculate_player_round_delta(&draft, &ids[0], HandMode::Plus, true), 290);
        assert_eq!(calculate_player_round_delta(&draft, &ids[0], HandMode::Minus, false), -215);
        assert_eq!(calculate_player_round_delta(&draft, &PlayerId::from("ghost"), HandMode::Plus, true), 0);
    }

    #[test]
    fn test_round_deltas_match_player_deltas() {
        let draft = full_draft();
        let deltas = calculate_round_deltas(&draft, HandMode::Minus, true);
        assert_eq!(deltas.len(), 4);
        for (id, delta) in &deltas {
            assert_eq!(*delta, calculate_player_round_delta(&draft, id, HandMode::Minus, true));
        }
        assert_eq!(deltas[&PlayerId::from_seat(2)], -130);
    }

    #[test]
    fn test_partial_detection() {
        let mut draft = full_draft();
        assert!(!is_round_partial(&draft));

        draft.entries_mut(&PlayerId::from_seat(1)).queens = entry(3, false);
        assert!(is_round_partial(&draft));

        assert!(is_round_partial(&get_default_round_draft(&seats())));
    }

    #[test]
    fn test_would_exceed_max_for_king() {
        let ids = seats();
        let mut draft = get_default_round_draft(&ids);
        assert!(!would_exceed_max(&draft, Category::King, &ids[0], 0));
        assert!(!is_category_at_max(&draft, Category::King));

        draft.entries_mut(&ids[0]).king = entry(1, false);
        assert!(is_category_at_max(&draft, Category::King));
        for (seat, id) in ids.iter().enumerate() {
            let current = if seat == 0 { 1 } else { 0 };
            assert!(would_exceed_max(&draft, Category::King, id, current));
        }
    }

    #[test]
    fn test_would_exceed_max_excludes_own_count() {
        let ids = seats();
        let mut draft = get_default_round_draft(&ids);
        draft.entries_mut(&ids[0]).queens = entry(2, false);
        draft.entries_mut(&ids[1]).queens = entry(1, false);

        // player 1 re-entering from 1 to 2 gives a total of 4
        assert!(!would_exceed_max(&draft, Category::Queens, &ids[1], 1));
        assert!(would_exceed_max(&draft, Category::Queens, &ids[1], 2));
    }

    #[test]
    fn test_validate_round_data() {
        assert!(validate_round_data(&full_draft()).is_ok());

        let ids = seats();
        let mut draft = get_default_round_draft(&ids);
        draft.entries_mut(&ids[0]).diamonds = entry(10, false);
        draft.entries_mut(&ids[1]).diamonds = entry(4, false);

        let err = validate_round_data(&draft).unwrap_err();
        assert!(matches!(
            err,
            TrixError::CategoryExceedsMax { category: Category::Diamonds, total: 14, max: 13 }
        ));
        assert!(err.to_string().contains("diamonds"));
    }

    #[test]
    fn test_prepare_round_for_save() {
        let mut draft = full_draft();
        draft.kingdom_number = Some(2);

        let round = prepare_round_for_save(&draft, HandMode::Plus, false);
        assert_eq!(round.hand_mode(), HandMode::Plus);
        assert_eq!(round.kingdom_number, Some(2));
        assert!(!round.is_partial());
        assert_eq!(round.delta_for(&PlayerId::from_seat(0)), Some(75));
        assert_eq!(round.delta_for(&PlayerId::from_seat(3)), Some(195));
        assert!(!round.id.is_empty());
    }

    #[test]
    fn test_prepare_keeps_draft_identity() {
        let mut draft = full_draft();
        draft.id = Some("existing".to_string());
        let created = Utc::now() - chrono::Duration::hours(1);
        draft.created_at = Some(created);

        let round = prepare_round_for_save(&draft, HandMode::Minus, false);
        assert_eq!(round.id, "existing");
        assert_eq!(round.created_at, created);
    }

    #[test]
    fn test_draft_emptiness_ignores_doubled() {
        let ids = seats();
        let mut draft = get_default_round_draft(&ids);
        draft.entries_mut(&ids[0]).king = entry(0, true);
        assert!(is_round_draft_empty(&draft));

        draft.entries_mut(&ids[3]).collections = entry(1, false);
        assert!(!is_round_draft_empty(&draft));
    }

    #[test]
    fn test_player_total_prefers_cache_and_recomputes_legacy() {
        let mut m = Match::new(&["A", "B", "C", "D"], true);
        let ids: Vec<PlayerId> = m.players.iter().map(|p| p.id.clone()).collect();

        let mut draft = get_default_round_draft(&ids);
        draft.entries_mut(&ids[0]).king = entry(1, true);
        m.rounds.push(prepare_round_for_save(&draft, HandMode::Plus, true));

        // a stored round without cached deltas
        let legacy: Round = serde_json::from_str(
            r#"{"id":"old","createdAt":"2024-01-01T00:00:00Z","handMode":"MINUS",
                "perPlayer":{"player_0":{"queens":{"count":2,"doubled":true}}}}"#,
        )
        .unwrap();
        m.rounds.push(legacy);

        assert_eq!(calculate_player_total(&m, &ids[0]), 150 - 100);
        assert_eq!(calculate_player_total(&m, &ids[1]), 0);

        let totals = calculate_all_player_totals(&m);
        assert_eq!(totals.len(), 4);
        assert_eq!(totals[&ids[0]], 50);
    }

    #[test]
    fn test_category_delta_saturates_for_huge_counts() {
        let huge = entry(u32::MAX, true);
        assert_eq!(calculate_category_delta(&huge, Category::King, HandMode::Plus, true), i32::MAX);
        assert_eq!(calculate_category_delta(&huge, Category::King, HandMode::Minus, true), i32::MIN);
        assert_eq!(
            calculate_category_delta(&entry(30_000_000, false), Category::King, HandMode::Minus, false),
            i32::MIN
        );
    }

    #[test]
    fn test_category_total_saturates_and_fails_validation() {
        let ids = seats();
        let mut draft = get_default_round_draft(&ids);
        draft.entries_mut(&ids[0]).diamonds = entry(1, false);
        draft.entries_mut(&ids[1]).diamonds = entry(u32::MAX, false);

        assert_eq!(get_category_total_count(&draft, Category::Diamonds), u32::MAX);
        assert!(is_category_at_max(&draft, Category::Diamonds));
        assert!(would_exceed_max(&draft, Category::Diamonds, &ids[2], 0));
        assert!(matches!(
            validate_round_data(&draft),
            Err(TrixError::CategoryExceedsMax { category: Category::Diamonds, total: u32::MAX, max: 13 })
        ));
    }

    #[test]
    fn test_player_total_with_oversized_legacy_round() {
        let mut m = Match::new(&["A", "B", "C", "D"], false);
        let legacy: Round = serde_json::from_str(
            r#"{"id":"old","createdAt":"2024-01-01T00:00:00Z","handMode":"MINUS",
                "perPlayer":{"player_0":{"king":{"count":30000000}}}}"#,
        )
        .unwrap();
        m.rounds.push(legacy.clone());
        m.rounds.push(legacy);

        let p0 = PlayerId::from_seat(0);
        assert_eq!(calculate_player_total(&m, &p0), i32::MIN);
        assert_eq!(calculate_all_player_totals(&m)[&p0], i32::MIN);
    }
}
