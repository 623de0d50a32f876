pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod image;
pub mod presets;
pub mod secret;
pub mod session;

// Re-export common types
pub use error::{StylingError, StylingStage, VogueError};
pub use event::{Notice, WorkflowEvent};
pub use gateway::StylingGateway;
pub use image::ImagePayload;
pub use session::{LoadingLabel, Session, SessionPhase, TryOnMode};
