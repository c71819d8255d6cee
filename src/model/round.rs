use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::{Category, HandMode, PlayerEntries};
use super::ids::PlayerId;

/// Anything holding per-player category entries: a draft or a saved round
pub trait RoundEntries {
    fn per_player(&self) -> &BTreeMap<PlayerId, PlayerEntries>;
}

/// Unsaved hand data while a hand is being entered or edited
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoundDraft {
    /// Set when the draft edits an existing round
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub kingdom_number: Option<u8>,
    pub per_player: BTreeMap<PlayerId, PlayerEntries>,
}

impl RoundDraft {
    /// Draft with every category zeroed and undoubled for each player
    pub fn for_players<'a, I>(player_ids: I) -> Self
    where
        I: IntoIterator<Item = &'a PlayerId>,
    {
        let per_player = player_ids
            .into_iter()
            .map(|id| (id.clone(), PlayerEntries::default()))
            .collect();

        Self {
            per_player,
            ..Self::default()
        }
    }

    /// Draft that edits `round`, keeping its identity and placement
    pub fn from_round(round: &Round) -> Self {
        Self {
            id: Some(round.id.clone()),
            created_at: Some(round.created_at),
            kingdom_number: round.kingdom_number,
            per_player: round.per_player.clone(),
        }
    }

    /// Zero all entries, keeping the player set and round identity
    pub fn reset(&mut self) {
        for entries in self.per_player.values_mut() {
            *entries = PlayerEntries::default();
        }
    }

    pub fn entries_mut(&mut self, player_id: &PlayerId) -> &mut PlayerEntries {
        self.per_player.entry(player_id.clone()).or_default()
    }
}

impl RoundEntries for RoundDraft {
    fn per_player(&self) -> &BTreeMap<PlayerId, PlayerEntries> {
        &self.per_player
    }
}

/// A saved hand
///
/// `computed` and `partial` are derived from the entries and the hand mode.
/// They are only produced by `prepare_round_for_save` (or read back from
/// storage), so the entries and hand mode are not mutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kingdom_number: Option<u8>,
    hand_mode: HandMode,
    #[serde(default)]
    per_player: BTreeMap<PlayerId, PlayerEntries>,
    #[serde(default)]
    computed: BTreeMap<PlayerId, i32>,
    #[serde(default)]
    partial: bool,
}

impl Round {
    pub(crate) fn scored(
        draft: &RoundDraft,
        hand_mode: HandMode,
        id: String,
        created_at: DateTime<Utc>,
        computed: BTreeMap<PlayerId, i32>,
        partial: bool,
    ) -> Self {
        Self {
            id,
            created_at,
            kingdom_number: draft.kingdom_number,
            hand_mode,
            per_player: draft.per_player.clone(),
            computed,
            partial,
        }
    }

    pub fn hand_mode(&self) -> HandMode {
        self.hand_mode
    }

    /// Cached per-player deltas
    pub fn computed(&self) -> &BTreeMap<PlayerId, i32> {
        &self.computed
    }

    /// Cached delta for one player, if present
    pub fn delta_for(&self, player_id: &PlayerId) -> Option<i32> {
        self.computed.get(player_id).copied()
    }

    /// True when at least one category was not played to its maximum
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn entries(&self, player_id: &PlayerId) -> Option<&PlayerEntries> {
        self.per_player.get(player_id)
    }

    /// Label shown in round lists, e.g. "Kingdom 2 - PLUS"
    pub fn label(&self, index: usize) -> String {
        match self.kingdom_number {
            Some(k) => format!("Kingdom {} - {}", k, self.hand_mode),
            None => format!("Round {}", index + 1),
        }
    }

    pub fn category_count(&self, category: Category) -> u32 {
        self.per_player.values().map(|e| e.get(category).count).sum()
    }
}

impl RoundEntries for Round {
    fn per_player(&self) -> &BTreeMap<PlayerId, PlayerEntries> {
        &self.per_player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CategoryEntry;

    fn seats() -> Vec<PlayerId> {
        (0..4).map(PlayerId::from_seat).collect()
    }

    #[test]
    fn test_draft_for_players() {
        let draft = RoundDraft::for_players(&seats());
        assert_eq!(draft.per_player.len(), 4);
        assert!(draft.id.is_none());
        assert!(draft.per_player.values().all(|e| e.is_empty()));
    }

    #[test]
    fn test_draft_reset_keeps_identity() {
        let mut draft = RoundDraft::for_players(&seats());
        draft.id = Some("r1".to_string());
        draft.kingdom_number = Some(2);
        draft.entries_mut(&PlayerId::from_seat(1)).diamonds = CategoryEntry::new(5, false);

        draft.reset();

        assert_eq!(draft.id.as_deref(), Some("r1"));
        assert_eq!(draft.kingdom_number, Some(2));
        assert!(draft.per_player.values().all(|e| e.is_empty()));
    }

    #[test]
    fn test_round_label() {
        let mut draft = RoundDraft::for_players(&seats());
        let round = Round::scored(&draft, HandMode::Plus, "a".into(), Utc::now(), BTreeMap::new(), true);
        assert_eq!(round.label(2), "Round 3");

        draft.kingdom_number = Some(3);
        let round = Round::scored(&draft, HandMode::Minus, "b".into(), Utc::now(), BTreeMap::new(), true);
        assert_eq!(round.label(0), "Kingdom 3 - MINUS");
    }

    #[test]
    fn test_round_deserializes_camel_case() {
        let json = r#"{
            "id": "r1",
            "createdAt": "2024-01-01T10:00:00Z",
            "kingdomNumber": 1,
            "handMode": "PLUS",
            "perPlayer": {"player_0": {"king": {"count": 1, "doubled": true}}},
            "computed": {"player_0": 150},
            "partial": true
        }"#;
        let round: Round = serde_json::from_str(json).unwrap();
        assert_eq!(round.hand_mode(), HandMode::Plus);
        assert_eq!(round.delta_for(&PlayerId::from_seat(0)), Some(150));
        assert_eq!(round.category_count(Category::King), 1);
        assert!(round.is_partial());
    }
}
