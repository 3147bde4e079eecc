// Résumé submission: validation, the upload → render → analyze pipeline,
// and its HTTP handlers. Collaborators are injected; nothing here talks to
// S3, Redis or the LLM directly.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod status;
pub mod validation;

#[cfg(test)]
pub mod testing;
