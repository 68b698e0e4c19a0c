//! Token accounting with a labelled fallback.
//!
//! When a tokenizer is known for the configured model the count is exact;
//! otherwise a whitespace word count stands in and the result says so.
//! Counting never fails, so token accounting can never sink a transform.

use tracing::debug;

/// How a [`TokenCount`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMethod {
    /// Counted with the model's tokenizer.
    Exact,
    /// Whitespace word count, reported with an `(approximate)` marker.
    Approximate,
}

/// A token count plus the method that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCount {
    pub count: usize,
    pub method: CountMethod,
}

impl TokenCount {
    pub fn zero() -> Self {
        Self {
            count: 0,
            method: CountMethod::Exact,
        }
    }

    pub fn is_approximate(&self) -> bool {
        self.method == CountMethod::Approximate
    }

    /// Combine two counts; the result is approximate if either side is.
    pub fn merge(self, other: TokenCount) -> Self {
        Self {
            count: self.count + other.count,
            method: if self.is_approximate() || other.is_approximate() {
                CountMethod::Approximate
            } else {
                CountMethod::Exact
            },
        }
    }
}

impl std::fmt::Display for TokenCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.method {
            CountMethod::Exact => write!(f, "{}", self.count),
            CountMethod::Approximate => write!(f, "{} (approximate)", self.count),
        }
    }
}

/// Count the tokens `text` occupies for `model`.
pub fn count_tokens(model: &str, text: &str) -> TokenCount {
    match tiktoken_rs::get_bpe_from_model(model) {
        Ok(bpe) => TokenCount {
            count: bpe.encode_with_special_tokens(text).len(),
            method: CountMethod::Exact,
        },
        Err(_) => {
            debug!(model = %model, "no tokenizer known for model, using word count");
            TokenCount {
                count: text.split_whitespace().count(),
                method: CountMethod::Approximate,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_counts_exactly() {
        let count = count_tokens("gpt-4", "hello world");
        assert_eq!(count.method, CountMethod::Exact);
        assert!(count.count > 0);
    }

    #[test]
    fn unknown_model_falls_back_to_word_count() {
        let count = count_tokens(
            "meta-llama/Llama-3.3-70B-Instruct",
            "three words here\nand two\tmore",
        );
        assert_eq!(count.method, CountMethod::Approximate);
        assert_eq!(count.count, 6);
    }

    #[test]
    fn empty_text_counts_zero() {
        let count = count_tokens("meta-llama/Llama-3.3-70B-Instruct", "");
        assert_eq!(count.count, 0);
    }

    #[test]
    fn display_marks_approximate_counts() {
        let exact = TokenCount {
            count: 1523,
            method: CountMethod::Exact,
        };
        let approx = TokenCount {
            count: 412,
            method: CountMethod::Approximate,
        };
        assert_eq!(exact.to_string(), "1523");
        assert_eq!(approx.to_string(), "412 (approximate)");
    }

    #[test]
    fn merge_accumulates_and_taints() {
        let a = TokenCount {
            count: 10,
            method: CountMethod::Exact,
        };
        let b = TokenCount {
            count: 5,
            method: CountMethod::Approximate,
        };
        let merged = TokenCount::zero().merge(a).merge(b);
        assert_eq!(merged.count, 15);
        assert!(merged.is_approximate());

        let exact = TokenCount::zero().merge(a).merge(a);
        assert_eq!(exact.count, 20);
        assert!(!exact.is_approximate());
    }
}
