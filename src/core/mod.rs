pub mod cache;
pub mod config;
pub mod error;
pub mod logging;

pub use cache::{ArtifactSlot, SlotState};
pub use config::{ArtifactConfig, LoadMode, ServiceConfig};
pub use error::{Result, SentimentError};
pub use logging::init_logging;
