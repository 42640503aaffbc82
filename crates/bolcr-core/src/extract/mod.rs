//! BOL field extraction module.

mod llm;
mod parser;
pub mod rules;
pub mod validate;

pub use llm::LlmParser;
pub use parser::{RecordParser, RuleParser};
