//! Score sheet export: one row per round plus a totals row.

pub mod csv;
pub mod xlsx;

pub use self::csv::{write_score_sheet_csv, write_score_sheet_csv_to};
pub use self::xlsx::write_score_sheet_xlsx;

use crate::model::{calculate_all_player_totals, calculate_player_round_delta, HandMode, Match};

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub label: String,
    pub kingdom: Option<u8>,
    pub hand_mode: HandMode,
    pub partial: bool,
    pub deltas: Vec<i32>,
}

/// Tabular view of a match, players in seat order
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSheet {
    pub players: Vec<String>,
    pub rows: Vec<SheetRow>,
    pub totals: Vec<i32>,
}

impl ScoreSheet {
    pub fn from_match(m: &Match) -> Self {
        let rows = m
            .rounds
            .iter()
            .enumerate()
            .map(|(index, round)| SheetRow {
                label: round.label(index),
                kingdom: round.kingdom_number,
                hand_mode: round.hand_mode(),
                partial: round.is_partial(),
                deltas: m
                    .players
                    .iter()
                    .map(|p| {
                        round.delta_for(&p.id).unwrap_or_else(|| {
                            calculate_player_round_delta(round, &p.id, round.hand_mode(), m.doubling_enabled)
                        })
                    })
                    .collect(),
            })
            .collect();

        let totals = calculate_all_player_totals(m);

        Self {
            players: m.players.iter().map(|p| p.name.clone()).collect(),
            rows,
            totals: m
                .players
                .iter()
                .map(|p| totals.get(&p.id).copied().unwrap_or(0))
                .collect(),
        }
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = ["#", "Round", "Kingdom", "Mode", "Partial"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        headers.extend(self.players.iter().cloned());
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{prepare_round_for_save, CategoryEntry, PlayerId, RoundDraft};

    pub(crate) fn sample_match() -> Match {
        let mut m = Match::new(&["Sami", "Lina", "Omar", "Rana"], false);
        let mut draft = RoundDraft::for_players(&m.player_ids());
        draft.kingdom_number = Some(1);
        draft.entries_mut(&PlayerId::from_seat(1)).queens = CategoryEntry::new(2, false);
        m.rounds.push(prepare_round_for_save(&draft, HandMode::Minus, false));

        draft.reset();
        draft.entries_mut(&PlayerId::from_seat(1)).diamonds = CategoryEntry::new(3, false);
        m.rounds.push(prepare_round_for_save(&draft, HandMode::Plus, false));
        m
    }

    #[test]
    fn test_sheet_from_match() {
        let sheet = ScoreSheet::from_match(&sample_match());
        assert_eq!(sheet.headers().len(), 9);
        assert_eq!(sheet.headers()[5], "Sami");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].label, "Kingdom 1 - MINUS");
        assert_eq!(sheet.rows[0].deltas, vec![0, -50, 0, 0]);
        assert!(sheet.rows[1].partial);
        assert_eq!(sheet.totals, vec![0, -20, 0, 0]);
    }
}
