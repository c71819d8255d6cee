//! Match persistence.
//!
//! Every mutating call reads the whole state blob, changes it and writes it
//! back. There is one writer, so no locking.

pub mod backend;
pub mod migrate;

pub use backend::{AppState, JsonFileBackend, MemoryBackend, StateBackend};

use crate::error::Result;
use crate::model::{self, HandMode, Match, Round};

pub struct MatchStore<B: StateBackend> {
    backend: B,
}

impl MatchStore<JsonFileBackend> {
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(JsonFileBackend::new(path))
    }
}

impl MatchStore<MemoryBackend> {
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: StateBackend> MatchStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply `f` to the loaded state and persist the result
    fn modify<T>(&mut self, f: impl FnOnce(&mut AppState) -> T) -> Result<T> {
        let mut state = self.backend.load()?;
        let out = f(&mut state);
        self.backend.save(&state)?;
        Ok(out)
    }

    /// Create a match and make it the active one
    pub fn create<S: AsRef<str>>(&mut self, names: &[S], doubling_enabled: bool) -> Result<Match> {
        let m = Match::new(names, doubling_enabled);
        let created = m.clone();
        self.modify(|state| {
            state.active_match_id = Some(m.id.clone());
            state.matches.push(m);
        })?;
        log::info!("Created match {}", created.id);
        Ok(created)
    }

    pub fn get(&self, match_id: &str) -> Result<Option<Match>> {
        Ok(self.backend.load()?.find(match_id).cloned())
    }

    pub fn all(&self) -> Result<Vec<Match>> {
        Ok(self.backend.load()?.matches)
    }

    /// Replace a stored match. Returns false if it is not stored.
    pub fn update(&mut self, m: &Match) -> Result<bool> {
        let mut state = self.backend.load()?;
        let Some(slot) = state.find_mut(&m.id) else {
            log::warn!("Update of unknown match {}", m.id);
            return Ok(false);
        };
        *slot = m.clone();
        self.backend.save(&state)?;
        Ok(true)
    }

    pub fn delete(&mut self, match_id: &str) -> Result<()> {
        self.modify(|state| {
            state.matches.retain(|m| m.id != match_id);
            if state.active_match_id.as_deref() == Some(match_id) {
                state.active_match_id = None;
            }
        })?;
        log::info!("Deleted match {}", match_id);
        Ok(())
    }

    /// New match with the same players and doubling setting, no rounds
    pub fn duplicate(&mut self, match_id: &str) -> Result<Option<Match>> {
        let Some(source) = self.get(match_id)? else {
            return Ok(None);
        };
        let names: Vec<&str> = source.players.iter().map(|p| p.name.as_str()).collect();
        self.create(&names, source.doubling_enabled).map(Some)
    }

    pub fn get_active(&self) -> Result<Option<Match>> {
        let state = self.backend.load()?;
        Ok(state
            .active_match_id
            .as_deref()
            .and_then(|id| state.find(id))
            .cloned())
    }

    /// Point the active match at `match_id`. Returns false if it is unknown.
    pub fn set_active(&mut self, match_id: &str) -> Result<bool> {
        let mut state = self.backend.load()?;
        if state.find(match_id).is_none() {
            return Ok(false);
        }
        state.active_match_id = Some(match_id.to_string());
        self.backend.save(&state)?;
        Ok(true)
    }

    pub fn clear_active(&mut self) -> Result<()> {
        self.modify(|state| state.active_match_id = None)
    }

    /// Append a round to a match
    pub fn add_round(&mut self, match_id: &str, round: Round) -> Result<bool> {
        self.with_match(match_id, |m| {
            log::debug!("Adding round {} to match {}", round.id, m.id);
            m.rounds.push(round);
            true
        })
    }

    /// Replace the round with the same id
    pub fn update_round(&mut self, match_id: &str, round: Round) -> Result<bool> {
        self.with_match(match_id, |m| match m.rounds.iter_mut().find(|r| r.id == round.id) {
            Some(slot) => {
                *slot = round;
                true
            }
            None => false,
        })
    }

    /// Remove a round. Kingdom flags and the kingdom pointer are left as they are.
    pub fn delete_round(&mut self, match_id: &str, round_id: &str) -> Result<bool> {
        self.with_match(match_id, |m| {
            let before = m.rounds.len();
            m.rounds.retain(|r| r.id != round_id);
            m.rounds.len() != before
        })
    }

    /// Mark a hand mode played for the match's current kingdom
    pub fn mark_hand_as_played(&mut self, match_id: &str, mode: HandMode) -> Result<bool> {
        self.with_match(match_id, |m| {
            model::mark_hand_as_played(m, mode);
            true
        })
    }

    /// Run `f` on a stored match and persist only when it reports a change
    fn with_match(&mut self, match_id: &str, f: impl FnOnce(&mut Match) -> bool) -> Result<bool> {
        let mut state = self.backend.load()?;
        let Some(m) = state.find_mut(match_id) else {
            log::warn!("Match {} not found", match_id);
            return Ok(false);
        };
        if !f(m) {
            return Ok(false);
        }
        self.backend.save(&state)?;
        Ok(true)
    }
}
