/// One-time verification codes
///
/// Codes are six decimal digits drawn uniformly from `100000..=999999`.
///
/// # Example
///
/// ```
/// use jobboard_shared::registration::otp::{CodeGenerator, RandomCodeGenerator};
///
/// let code = RandomCodeGenerator.generate();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_digit()));
/// ```

use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Number of digits in a verification code
pub const CODE_LENGTH: usize = 6;

/// Smallest code that can be issued
pub const CODE_MIN: u32 = 100_000;

/// Largest code that can be issued
pub const CODE_MAX: u32 = 999_999;

/// Produces verification codes
pub trait CodeGenerator: Send + Sync {
    /// Returns a fresh code
    fn generate(&self) -> String;
}

/// Uniform random codes from the thread-local CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let value = rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX);
        format!("{:0width$}", value, width = CODE_LENGTH)
    }
}

/// Hands out a fixed sequence of codes, then falls back to random ones
///
/// Used by tests and demos that need to know the issued code up front.
#[derive(Debug, Default)]
pub struct SequenceCodeGenerator {
    queue: Mutex<VecDeque<String>>,
}

impl SequenceCodeGenerator {
    /// Creates a generator that yields `codes` in order
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }
}

impl CodeGenerator for SequenceCodeGenerator {
    fn generate(&self) -> String {
        let next = self
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        next.unwrap_or_else(|| RandomCodeGenerator.generate())
    }
}

/// Checks that a string has the shape of an issued code
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
