// C-SSRS severity assessment pipeline.
// Implements: prompt building, JSON extraction, schema validation, batch driver.
// All inference calls go through llm_client, never through reqwest directly.

pub mod extract;
pub mod prompts;
pub mod scorer;
pub mod validation;
