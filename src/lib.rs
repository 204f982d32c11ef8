pub mod app_core;
pub mod config;
pub mod input;
pub mod renderer;
pub mod runtime;

pub use app_core::{GameSession, SessionError};
pub use config::{ConfigError, Settings};
pub use input::PointerRouter;
pub use runtime::{AudioCue, GameEvent, SessionHooks};

