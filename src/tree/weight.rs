//! Content weight measurement

use crate::error::ApiError;
use crate::types::Weight;
use tiktoken_rs::CoreBPE;

/// Maps raw file bytes to a non-negative weight. Must be pure.
pub trait SizeMeasurer: Send + Sync {
    fn measure(&self, content: &[u8]) -> Weight;
}

/// Token count using the `cl100k_base` encoding
pub struct TokenMeasurer {
    bpe: CoreBPE,
}

impl TokenMeasurer {
    pub fn new() -> Result<Self, ApiError> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| ApiError::ConfigError(format!("Tokenizer error: {}", e)))?;
        Ok(Self { bpe })
    }
}

impl SizeMeasurer for TokenMeasurer {
    fn measure(&self, content: &[u8]) -> Weight {
        let text = String::from_utf8_lossy(content);
        self.bpe.encode_ordinary(&text).len() as Weight
    }
}

/// Byte length; useful when a tokenizer is not wanted
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteMeasurer;

impl SizeMeasurer for ByteMeasurer {
    fn measure(&self, content: &[u8]) -> Weight {
        content.len() as Weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_measurer_counts_tokens() {
        let measurer = TokenMeasurer::new().unwrap();
        let count = measurer.measure(b"Hello world");
        assert!(count > 0);
        assert!(count < 10);
        assert_eq!(measurer.measure(b""), 0);
    }

    #[test]
    fn test_token_measurer_is_deterministic() {
        let measurer = TokenMeasurer::new().unwrap();
        let content = b"package main\n\nfunc main() {}";
        assert_eq!(measurer.measure(content), measurer.measure(content));
    }

    #[test]
    fn test_byte_measurer() {
        assert_eq!(ByteMeasurer.measure(b"abc"), 3);
    }
}
