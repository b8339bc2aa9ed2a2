//! [`TokenBlock`] and [`Expression`]: the parenthesis-nesting-as-integer
//! representation propositional expressions are built from.

use crate::token::TokenEffect;
use std::fmt;

/// A maximal run of tokens at one parenthesis depth.
///
/// `priority` is the nesting depth: `A + (B | C)` becomes two blocks,
/// `{priority: 0, tokens: [A, +]}` and `{priority: 1, tokens: [B, |, C]}`.
/// This is a plain record rather than a `Vec` subclass — `spec.md`'s design
/// notes call the source's container-inheritance approach out explicitly as
/// something to flatten into ordinary composition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenBlock {
    pub priority: u32,
    pub tokens: Vec<TokenEffect>,
}

impl TokenBlock {
    pub fn new(priority: u32) -> Self {
        TokenBlock {
            priority,
            tokens: Vec::new(),
        }
    }

    pub fn with_tokens(priority: u32, tokens: Vec<TokenEffect>) -> Self {
        TokenBlock { priority, tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn push(&mut self, token: TokenEffect) {
        self.tokens.push(token);
    }

    /// A copy of this block's tokens reassigned to `new_priority`.
    pub fn with_priority(&self, new_priority: u32) -> Self {
        TokenBlock {
            priority: new_priority,
            tokens: self.tokens.clone(),
        }
    }

    /// Copies the half-open range `[start, end)`, clamped to this block's
    /// length, into a new block at `new_priority`.
    pub fn extract_range(&self, start: usize, end: usize, new_priority: u32) -> Self {
        let end = end.min(self.tokens.len());
        let tokens = if start >= end {
            Vec::new()
        } else {
            self.tokens[start..end].to_vec()
        };
        TokenBlock {
            priority: new_priority,
            tokens,
        }
    }

    pub fn has_operator(&self, op: TokenEffect) -> bool {
        self.tokens.iter().any(|&t| t == op)
    }

    pub fn has_any_operator(&self, ops: &[TokenEffect]) -> bool {
        self.tokens.iter().any(|t| ops.contains(t))
    }

    pub fn append_tokens(&mut self, other: &TokenBlock) {
        self.tokens.extend_from_slice(&other.tokens);
    }
}

impl fmt::Display for TokenBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[priority={}, size={}]: ", self.priority, self.tokens.len())?;
        for (i, tok) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match tok {
                TokenEffect::Symbol(s) => write!(f, "'{s}'")?,
                op => write!(f, "op({op})")?,
            }
        }
        Ok(())
    }
}

/// One side of a rule: an ordered sequence of [`TokenBlock`]s. Priorities
/// are non-negative and net to zero across the whole sequence; within a
/// block, operators and operands interleave left-to-right.
pub type Expression = Vec<TokenBlock>;

/// Index of the block with the greatest `priority` (first such block wins
/// ties), i.e. the innermost parenthesised group — the next one `eval`
/// reduces.
pub fn highest_priority_index(expr: &Expression) -> Option<usize> {
    expr.iter()
        .enumerate()
        .max_by_key(|(_, b)| b.priority)
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    fn sym(c: char) -> TokenEffect {
        TokenEffect::Symbol(Symbol::new(c).unwrap())
    }

    #[test]
    fn highest_priority_picks_innermost_block() {
        let expr = vec![
            TokenBlock::with_tokens(0, vec![sym('A'), TokenEffect::And]),
            TokenBlock::with_tokens(1, vec![sym('B'), TokenEffect::Or, sym('C')]),
        ];
        assert_eq!(highest_priority_index(&expr), Some(1));
    }

    #[test]
    fn extract_range_clamps_to_length() {
        let block = TokenBlock::with_tokens(0, vec![sym('A'), TokenEffect::And, sym('B')]);
        let extracted = block.extract_range(1, 100, 1);
        assert_eq!(extracted.tokens, vec![TokenEffect::And, sym('B')]);
        assert_eq!(extracted.priority, 1);
    }

    #[test]
    fn has_any_operator_checks_membership() {
        let block = TokenBlock::with_tokens(0, vec![sym('A'), TokenEffect::Xor, sym('B')]);
        assert!(block.has_any_operator(&[TokenEffect::And, TokenEffect::Xor]));
        assert!(!block.has_any_operator(&[TokenEffect::And, TokenEffect::Or]));
    }
}
