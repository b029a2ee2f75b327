//! Short code generation.
//!
//! Candidates are drawn from the URL-safe base64 alphabet (`A-Z a-z 0-9 - _`).
//! Generation never consults the store; uniqueness is decided by the
//! conditional insert that follows.

use base64::alphabet;

/// Default number of characters in a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Produces short code candidates.
///
/// Calls are independent and side-effect free, so implementations can be
/// shared across tasks.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random fixed-length codes backed by the OS entropy source.
#[derive(Debug, Clone, Copy)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        generate_code(self.length)
    }
}

/// Generates a random code of `length` URL-safe characters.
///
/// Each random byte is reduced modulo 64, which is unbiased because 256 is a
/// multiple of the alphabet size.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
/// ```
pub fn generate_code(length: usize) -> String {
    let symbols = alphabet::URL_SAFE.as_str().as_bytes();
    let mut buffer = vec![0u8; length];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    buffer
        .iter()
        .map(|b| symbols[(*b as usize) % symbols.len()] as char)
        .collect()
}
