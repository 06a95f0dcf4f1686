//! Text-quality predicate used by the dedup gate.

/// Decides whether extracted text is too low-value to keep.
pub trait TextQuality: Send + Sync {
    /// True when the text should be skipped (e.g., empty or
    /// boilerplate-only).
    fn is_low_value(&self, text: &str) -> bool;
}

/// Default predicate: whitespace-only text, or text shorter than a
/// minimum character count, is low-value.
#[derive(Debug, Clone, Copy)]
pub struct MinLengthQuality {
    min_chars: usize,
}

impl MinLengthQuality {
    /// Require at least `min_chars` non-whitespace-trimmed characters.
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl Default for MinLengthQuality {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TextQuality for MinLengthQuality {
    fn is_low_value(&self, text: &str) -> bool {
        text.trim().chars().count() < self.min_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rejects_only_blank() {
        let quality = MinLengthQuality::default();
        assert!(quality.is_low_value(""));
        assert!(quality.is_low_value("   \n\t"));
        assert!(!quality.is_low_value("x"));
    }

    #[test]
    fn test_min_length_threshold() {
        let quality = MinLengthQuality::new(10);
        assert!(quality.is_low_value("too short"));
        assert!(!quality.is_low_value("long enough text"));
    }
}
