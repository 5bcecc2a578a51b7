// Course generation: streams a full training dialogue (or a revision of one)
// from the LLM to the browser as server-sent events.

pub mod handlers;
pub mod prompts;
pub mod relay;
