//! External model boundary

pub mod client;
pub mod prompt;

pub use client::{ChatMessage, ModelClient};
pub use prompt::{system_prompt, SAMPLE_QUERIES};
