pub mod config;
pub mod error;
pub mod events;
pub mod telemetry;
pub mod types;

pub use config::AssistantConfig;
pub use error::{Result, VoxError};
pub use events::AssistantEvent;
pub use types::*;
