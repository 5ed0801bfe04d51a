pub mod clarify;
pub mod instruction;
pub mod response_parser;
pub mod retry;
pub mod service;

pub use crate::domain::model::{ImprovementRequest, ImprovementResult};
pub use crate::domain::ports::{CompletionClient, Improve};
pub use crate::utils::error::Result;
