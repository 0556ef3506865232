pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Returns the trimmed model id, or the default model when the id is blank.
pub fn resolve_model_id(configured: &str) -> String {
    let trimmed = configured.trim();
    if trimmed.is_empty() {
        DEFAULT_OPENAI_MODEL.to_string()
    } else {
        trimmed.to_string()
    }
}
