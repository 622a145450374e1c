//! Heaven's Eve: gameplay layer
//!
//! Architecture:
//!   engine/  - seam to the host engine: frame time, input, host commands, audio output
//!   game/    - the session, mission controllers, minigames and UI services
//!   replay   - scripted input for headless runs

pub mod engine;
pub mod game;
pub mod replay;

pub use game::Session;
