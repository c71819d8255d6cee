pub mod category;
pub mod ids;
pub mod match_state;
pub mod round;
pub mod scoring;

pub use category::{Category, CategoryEntry, HandMode, PlayerEntries};
pub use ids::{generate_id, PlayerId};
pub use match_state::{
    get_available_hand_modes, is_game_finished, mark_hand_as_played, Kingdom, KingdomStatus, Match,
    Player, KINGDOM_COUNT, PLAYER_COUNT,
};
pub use round::{Round, RoundDraft, RoundEntries};
pub use scoring::{
    calculate_all_player_totals, calculate_category_delta, calculate_player_round_delta,
    calculate_player_total, calculate_round_deltas, get_category_total_count,
    get_default_round_draft, is_category_at_max, is_round_draft_empty, is_round_partial,
    prepare_round_for_save, validate_round_data, would_exceed_max,
};
