//! Economy game state: models, rules, errors and the transactional engine.
//!
//! Dispatchers call [`GameEngine`] methods and turn the returned
//! [`GameResult`] into an [`Outcome`] for rendering.

pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod outcome;
pub mod rules;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig, HuntPolicy, StarterKit, TargetSelection};
pub use engine::{DEMO_PLAYER_ID, GameEngine};
pub use errors::{GameError, GameResult, ReasonCode};
pub use outcome::Outcome;
