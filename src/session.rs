//! The front end's working context: the open match, the hand being entered
//! or edited, and the store behind them.

use std::collections::BTreeMap;

use crate::error::{Result, TrixError};
use crate::model::{
    calculate_all_player_totals, get_available_hand_modes, get_category_total_count,
    is_game_finished, is_round_draft_empty, prepare_round_for_save, validate_round_data,
    would_exceed_max, Category, HandMode, Match, PlayerEntries, PlayerId, Round, RoundDraft,
};
use crate::store::{MatchStore, StateBackend};

pub struct Session<B: StateBackend> {
    store: MatchStore<B>,
    current: Option<Match>,
    draft: Option<RoundDraft>,
    editing_round_id: Option<String>,
    hand_mode: Option<HandMode>,
}

impl<B: StateBackend> Session<B> {
    pub fn new(store: MatchStore<B>) -> Self {
        Self {
            store,
            current: None,
            draft: None,
            editing_round_id: None,
            hand_mode: None,
        }
    }

    pub fn store(&self) -> &MatchStore<B> {
        &self.store
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current.as_ref()
    }

    fn require_match(&self) -> Result<&Match> {
        self.current.as_ref().ok_or(TrixError::NoActiveMatch)
    }

    pub fn draft(&self) -> Option<&RoundDraft> {
        self.draft.as_ref()
    }

    pub fn hand_mode(&self) -> Option<HandMode> {
        self.hand_mode
    }

    pub fn editing_round_id(&self) -> Option<&str> {
        self.editing_round_id.as_deref()
    }

    /// Pick up the stored active match, if any
    pub fn resume(&mut self) -> Result<Option<&Match>> {
        self.clear_draft();
        self.current = self.store.get_active()?;
        Ok(self.current.as_ref())
    }

    pub fn start_match<S: AsRef<str>>(&mut self, names: &[S], doubling_enabled: bool) -> Result<&Match> {
        self.clear_draft();
        let m = self.store.create(names, doubling_enabled)?;
        Ok(&*self.current.insert(m))
    }

    pub fn open(&mut self, match_id: &str) -> Result<&Match> {
        if !self.store.set_active(match_id)? {
            return Err(TrixError::MatchNotFound(match_id.to_string()));
        }
        self.clear_draft();
        self.current = self.store.get(match_id)?;
        self.require_match()
    }

    /// Close the match; it stays saved but is no longer active
    pub fn leave(&mut self) -> Result<()> {
        self.store.clear_active()?;
        self.current = None;
        self.clear_draft();
        Ok(())
    }

    /// Start a fresh match with the current players and settings
    pub fn duplicate(&mut self) -> Result<&Match> {
        let id = self.require_match()?.id.clone();
        let copy = self
            .store
            .duplicate(&id)?
            .ok_or(TrixError::MatchNotFound(id))?;
        self.clear_draft();
        Ok(&*self.current.insert(copy))
    }

    pub fn delete_match(&mut self) -> Result<()> {
        let id = self.require_match()?.id.clone();
        self.store.delete(&id)?;
        self.store.clear_active()?;
        self.current = None;
        self.clear_draft();
        Ok(())
    }

    pub fn available_modes(&self) -> Vec<HandMode> {
        self.current
            .as_ref()
            .map(get_available_hand_modes)
            .unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.current.as_ref().is_some_and(is_game_finished)
    }

    pub fn totals(&self) -> BTreeMap<PlayerId, i32> {
        self.current
            .as_ref()
            .map(calculate_all_player_totals)
            .unwrap_or_default()
    }

    /// Open a blank hand in the current kingdom. Without an explicit mode the
    /// only remaining one is used.
    pub fn begin_hand(&mut self, mode: Option<HandMode>) -> Result<HandMode> {
        let m = self.require_match()?;
        if is_game_finished(m) {
            return Err(TrixError::GameFinished);
        }

        let available = get_available_hand_modes(m);
        let mode = match (mode, available.as_slice()) {
            (Some(mode), modes) if modes.contains(&mode) => mode,
            (Some(mode), _) => return Err(TrixError::HandModeUnavailable(mode)),
            (None, [only]) => *only,
            (None, _) => return Err(TrixError::HandModeRequired),
        };

        let mut draft = RoundDraft::for_players(&m.player_ids());
        draft.kingdom_number = Some(m.current_kingdom);
        log::debug!("Starting kingdom {} {} hand", m.current_kingdom, mode);

        self.draft = Some(draft);
        self.editing_round_id = None;
        self.hand_mode = Some(mode);
        Ok(mode)
    }

    /// Load a saved round into the draft for editing
    pub fn begin_edit(&mut self, round_id: &str) -> Result<HandMode> {
        let round = self
            .require_match()?
            .round(round_id)
            .ok_or_else(|| TrixError::RoundNotFound(round_id.to_string()))?;

        let mode = round.hand_mode();
        self.draft = Some(RoundDraft::from_round(round));
        self.editing_round_id = Some(round_id.to_string());
        self.hand_mode = Some(mode);
        Ok(mode)
    }

    fn draft_entries(&mut self, player_id: &PlayerId) -> Result<&mut PlayerEntries> {
        if self.require_match()?.player(player_id).is_none() {
            return Err(TrixError::UnknownPlayer(player_id.to_string()));
        }
        let draft = self.draft.as_mut().ok_or(TrixError::NoDraft)?;
        Ok(draft.entries_mut(player_id))
    }

    /// Add one to a player's count. Returns false, changing nothing, when the
    /// category is already at its maximum across players.
    pub fn increment(&mut self, player_id: &PlayerId, category: Category) -> Result<bool> {
        let current = self.draft_entries(player_id)?.get(category).count;
        let draft = self.draft.as_ref().ok_or(TrixError::NoDraft)?;
        if would_exceed_max(draft, category, player_id, current) {
            return Ok(false);
        }
        self.draft_entries(player_id)?.get_mut(category).count += 1;
        Ok(true)
    }

    pub fn decrement(&mut self, player_id: &PlayerId, category: Category) -> Result<()> {
        let entry = self.draft_entries(player_id)?.get_mut(category);
        entry.count = entry.count.saturating_sub(1);
        Ok(())
    }

    /// Flip the doubled flag. Only king and queens in a doubling match can be
    /// doubled; returns false otherwise.
    pub fn toggle_doubled(&mut self, player_id: &PlayerId, category: Category) -> Result<bool> {
        if !self.doubling_allowed(category)? {
            return Ok(false);
        }
        let entry = self.draft_entries(player_id)?.get_mut(category);
        entry.doubled = !entry.doubled;
        Ok(true)
    }

    fn doubling_allowed(&self, category: Category) -> Result<bool> {
        Ok(self.require_match()?.doubling_enabled && category.is_doublable())
    }

    /// Replace a player's entries in the draft, enforcing the category maxima
    pub fn set_entries(&mut self, player_id: &PlayerId, entries: &PlayerEntries) -> Result<()> {
        let draft = self.draft.as_ref().ok_or(TrixError::NoDraft)?;
        let own = draft.per_player.get(player_id).copied().unwrap_or_default();

        for category in Category::ALL {
            let total = get_category_total_count(draft, category)
                .saturating_sub(own.get(category).count)
                .saturating_add(entries.get(category).count);
            if total > category.max_count() {
                return Err(TrixError::CategoryExceedsMax {
                    category,
                    total,
                    max: category.max_count(),
                });
            }
        }

        let mut accepted = *entries;
        for category in Category::ALL {
            if accepted.get(category).doubled && !self.doubling_allowed(category)? {
                log::warn!("Ignoring doubled {} for {}", category, player_id);
                accepted.get_mut(category).doubled = false;
            }
        }

        *self.draft_entries(player_id)? = accepted;
        Ok(())
    }

    pub fn reset_draft(&mut self) -> Result<()> {
        self.draft.as_mut().ok_or(TrixError::NoDraft)?.reset();
        Ok(())
    }

    /// True when there is no draft or nothing has been counted yet
    pub fn is_draft_empty(&self) -> bool {
        self.draft.as_ref().map_or(true, is_round_draft_empty)
    }

    pub fn discard(&mut self) {
        self.clear_draft();
    }

    fn clear_draft(&mut self) {
        self.draft = None;
        self.editing_round_id = None;
        self.hand_mode = None;
    }

    /// Validate and store the draft. A new hand is appended and marks its mode
    /// played; an edited round is replaced keeping its kingdom and mode.
    pub fn save_hand(&mut self) -> Result<Round> {
        let m = self.require_match()?;
        let draft = self.draft.as_ref().ok_or(TrixError::NoDraft)?;

        let mode = match &self.editing_round_id {
            Some(id) => m
                .round(id)
                .map(Round::hand_mode)
                .or(self.hand_mode)
                .ok_or_else(|| TrixError::RoundNotFound(id.clone()))?,
            None => self.hand_mode.ok_or(TrixError::HandModeRequired)?,
        };

        validate_round_data(draft)?;
        let round = prepare_round_for_save(draft, mode, m.doubling_enabled);
        let match_id = m.id.clone();

        if self.editing_round_id.is_some() {
            if !self.store.update_round(&match_id, round.clone())? {
                return Err(TrixError::RoundNotFound(round.id));
            }
            log::info!("Updated round {} in match {}", round.id, match_id);
        } else {
            if !self.store.add_round(&match_id, round.clone())? {
                return Err(TrixError::MatchNotFound(match_id));
            }
            self.store.mark_hand_as_played(&match_id, mode)?;
            log::info!("Saved {} hand {} in match {}", mode, round.id, match_id);
        }

        self.current = self.store.get(&match_id)?;
        self.clear_draft();
        Ok(round)
    }

    pub fn delete_round(&mut self, round_id: &str) -> Result<()> {
        let match_id = self.require_match()?.id.clone();
        if !self.store.delete_round(&match_id, round_id)? {
            return Err(TrixError::RoundNotFound(round_id.to_string()));
        }
        self.current = self.store.get(&match_id)?;
        Ok(())
    }
}
