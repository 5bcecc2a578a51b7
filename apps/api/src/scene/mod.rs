// Scene design: turns a free-text scenario description (plus optional reference
// material) into a structured training scene via one non-streaming LLM call.

pub mod handlers;
pub mod prompts;
pub mod synthesizer;
