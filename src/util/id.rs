use uuid::Uuid;

/// Generates a new opaque identifier made of `prefix` and
/// 32 lowercase hex characters from a random UUID.
///
/// Users are prefixed with `u`, projects with `p` and
/// messages with `m`.
#[must_use]
pub fn generate(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

/// Returns the given identifier if present and not blank,
/// otherwise generates a new one with [`generate`].
#[must_use]
pub fn or_generate(id: Option<String>, prefix: &str) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id,
        _ => generate(prefix),
    }
}
