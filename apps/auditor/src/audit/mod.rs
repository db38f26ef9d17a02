// IDVS audit: input collection, evaluation, orchestration and presentation.
// All model calls go through llm_client; no direct Gemini HTTP calls here.

pub mod evaluator;
pub mod handlers;
pub mod input;
pub mod models;
pub mod presenter;
pub mod prompts;
pub mod session;
pub mod validation;
