//! Field id generation.
//!
//! Ids are derived from labels. Generation is pluggable through [`IdGenerator`] so that
//! callers embedding the engine can substitute their own scheme.

/// Produces a fresh field id for a label, avoiding ids already taken.
pub trait IdGenerator {
    fn generate(&self, label: &str, is_taken: &dyn Fn(&str) -> bool) -> String;
}

/// Lowercase, underscore-separated slug of the label with a numeric suffix on collision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugIdGenerator;

impl IdGenerator for SlugIdGenerator {
    fn generate(&self, label: &str, is_taken: &dyn Fn(&str) -> bool) -> String {
        let mut base = slugify(label);
        if base.is_empty() {
            base = "field".to_string();
        }
        if !is_taken(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !is_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Convert a display label to an id-safe slug.
pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
