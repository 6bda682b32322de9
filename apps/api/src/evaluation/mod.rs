pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod suggestions;
