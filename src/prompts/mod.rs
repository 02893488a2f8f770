//! Prompt template management

pub mod embedded;
mod loader;

pub use loader::PromptLoader;
