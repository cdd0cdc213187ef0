pub mod config;
pub mod error;
pub mod heuristic;
pub mod history;
pub mod models;
pub mod prompt;
pub mod search;
pub mod sectionizer;
pub mod server;
pub mod service;
pub mod synth;
pub mod transport;

pub use crate::error::{HeartrestError, Result};
pub use crate::models::StructuredReply;
pub use crate::service::{ChatOutcome, ChatService};
