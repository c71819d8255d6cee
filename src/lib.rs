pub mod error;
pub mod export;
pub mod model;
pub mod notation;
pub mod session;
pub mod store;

pub use error::{Result, TrixError};
pub use model::*;
pub use session::Session;
pub use store::{AppState, JsonFileBackend, MatchStore, MemoryBackend, StateBackend};
