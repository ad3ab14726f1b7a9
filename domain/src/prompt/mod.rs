//! Prompt domain
//!
//! Questions and prompts for the plan gate, the agent session, and the review gate.

mod template;

pub use template::PromptTemplate;
