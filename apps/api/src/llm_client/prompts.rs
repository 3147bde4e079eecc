// Cross-cutting prompt fragments. Each service that needs LLM calls defines
// its own prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps feedback tied to what is actually in the attached document.
pub const EVIDENCE_INSTRUCTION: &str = "\
    CRITICAL: Every tip must refer to content that actually appears in the attached resume, \
    or to something clearly missing from it. Do NOT invent employers, dates, skills or metrics.";
