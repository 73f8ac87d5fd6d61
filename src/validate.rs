//! Sequence input validation.
//!
//! Every sequence typed into a draft goes through [`normalize_sequence`]
//! before any request is built:
//!
//! ```text
//! "at cg\n"  ->  "ATCG"
//! ```
//!
//! Whitespace anywhere is dropped, letters are upper-cased, and the result
//! must be a non-empty string over `-`, `A`, `T`, `C`, `G`.

use thiserror::Error;

/// Errors raised locally, before any request reaches the service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Sequence cannot be empty.")]
    Empty,

    #[error("Only A, T, C, G are allowed.")]
    InvalidAlphabet { offending: char },
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Returns true for the characters accepted in a stored sequence.
fn is_allowed(c: char) -> bool {
    matches!(c, '-' | 'A' | 'T' | 'C' | 'G')
}

/// Normalizes raw user input and checks it against the DNA alphabet.
pub fn normalize_sequence(raw: &str) -> ValidationResult<String> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();

    if normalized.is_empty() {
        return Err(ValidationError::Empty);
    }

    if let Some(offending) = normalized.chars().find(|&c| !is_allowed(c)) {
        return Err(ValidationError::InvalidAlphabet { offending });
    }

    Ok(normalized)
}
