use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::HandMode;
use super::ids::{generate_id, PlayerId};
use super::round::Round;

pub const PLAYER_COUNT: usize = 4;
pub const KINGDOM_COUNT: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

/// Completion flags of one kingdom. Both only ever go from false to true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kingdom {
    pub played_plus: bool,
    pub played_minus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KingdomStatus {
    NotStarted,
    PlusDone,
    MinusDone,
    BothDone,
}

impl Kingdom {
    pub fn status(&self) -> KingdomStatus {
        match (self.played_plus, self.played_minus) {
            (false, false) => KingdomStatus::NotStarted,
            (true, false) => KingdomStatus::PlusDone,
            (false, true) => KingdomStatus::MinusDone,
            (true, true) => KingdomStatus::BothDone,
        }
    }

    pub fn is_played(&self, mode: HandMode) -> bool {
        match mode {
            HandMode::Plus => self.played_plus,
            HandMode::Minus => self.played_minus,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.played_plus && self.played_minus
    }
}

impl fmt::Display for KingdomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KingdomStatus::NotStarted => write!(f, "PLUS and MINUS available"),
            KingdomStatus::PlusDone => write!(f, "MINUS remaining"),
            KingdomStatus::MinusDone => write!(f, "PLUS remaining"),
            KingdomStatus::BothDone => write!(f, "complete"),
        }
    }
}

/// A four-player match of four kingdoms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub doubling_enabled: bool,
    pub players: Vec<Player>,
    /// 1-4; stays at 4 once the last kingdom is complete
    pub current_kingdom: u8,
    pub kingdoms: [Kingdom; KINGDOM_COUNT as usize],
    #[serde(default)]
    pub rounds: Vec<Round>,
}

impl Match {
    /// New match at kingdom 1. Blank names become "Player N"; missing seats
    /// are filled the same way.
    pub fn new<S: AsRef<str>>(names: &[S], doubling_enabled: bool) -> Self {
        let players = (0..PLAYER_COUNT)
            .map(|seat| {
                let name = names
                    .get(seat)
                    .map(|n| n.as_ref().trim())
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .unwrap_or_else(|| format!("Player {}", seat + 1));
                Player {
                    id: PlayerId::from_seat(seat),
                    name,
                }
            })
            .collect();

        Self {
            id: generate_id(),
            created_at: Utc::now(),
            doubling_enabled,
            players,
            current_kingdom: 1,
            kingdoms: [Kingdom::default(); KINGDOM_COUNT as usize],
            rounds: Vec::new(),
        }
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    /// Kingdom at the current pointer, if the pointer is in range
    pub fn current(&self) -> Option<&Kingdom> {
        kingdom_index(self.current_kingdom).and_then(|i| self.kingdoms.get(i))
    }

    pub fn round(&self, round_id: &str) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }
}

fn kingdom_index(kingdom: u8) -> Option<usize> {
    if (1..=KINGDOM_COUNT).contains(&kingdom) {
        Some(kingdom as usize - 1)
    } else {
        None
    }
}

/// Hand modes still playable in the current kingdom, PLUS first
pub fn get_available_hand_modes(m: &Match) -> Vec<HandMode> {
    let Some(kingdom) = m.current() else {
        return Vec::new();
    };

    HandMode::ALL
        .into_iter()
        .filter(|mode| !kingdom.is_played(*mode))
        .collect()
}

/// Record `mode` as played in the current kingdom and advance to the next
/// kingdom once both modes are done. The pointer never passes 4.
///
/// Marking an already played mode is not rejected; the flag just stays set.
pub fn mark_hand_as_played(m: &mut Match, mode: HandMode) {
    let Some(index) = kingdom_index(m.current_kingdom) else {
        log::warn!("Kingdom pointer {} out of range in match {}", m.current_kingdom, m.id);
        return;
    };

    let kingdom = &mut m.kingdoms[index];
    if kingdom.is_played(mode) {
        log::warn!("{} already played in kingdom {} of match {}", mode, m.current_kingdom, m.id);
    }

    match mode {
        HandMode::Plus => kingdom.played_plus = true,
        HandMode::Minus => kingdom.played_minus = true,
    }

    if kingdom.is_complete() && m.current_kingdom < KINGDOM_COUNT {
        m.current_kingdom += 1;
        log::debug!("Match {} advanced to kingdom {}", m.id, m.current_kingdom);
    }
}

/// All four kingdoms have both hands played
pub fn is_game_finished(m: &Match) -> bool {
    m.current_kingdom > KINGDOM_COUNT
        || (m.current_kingdom == KINGDOM_COUNT
            && m.kingdoms[KINGDOM_COUNT as usize - 1].is_complete())
}
