// Shared system prompts.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file only holds the personas reused across services.

/// Persona for questions about companies and industries.
pub const COMPANY_ANALYST_SYSTEM: &str =
    "You are a helpful assistant that provides information about companies and industries.";

/// Persona for drafting outreach copy.
pub const EMAIL_WRITER_SYSTEM: &str = "You are a professional email writer, \
    crafting personalized outreach emails for business collaborations.";
