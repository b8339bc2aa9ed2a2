//! Worklist-driven rewriter: [`deduce_basics`] turns one arbitrary-shape
//! [`LogicRule`] into a set of [`BasicRule`]s via equivalence splitting,
//! De Morgan negation-pushing, AND-splitting, and OR/XOR elimination.

use crate::block::{Expression, TokenBlock};
use crate::rule::{BasicRule, LogicRule, LogicRuleId};
use crate::token::{Arrow, TokenEffect};
use std::collections::{BTreeSet, VecDeque};

/// `A <=> B` becomes `A => B` and `B => A`; anything else passes through
/// unchanged.
fn expand_equivalence(rule: &LogicRule) -> Vec<LogicRule> {
    match rule.arrow {
        Arrow::Iff => vec![
            LogicRule::new(rule.lhs.clone(), Arrow::Implies, rule.rhs.clone()),
            LogicRule::new(rule.rhs.clone(), Arrow::Implies, rule.lhs.clone()),
        ],
        Arrow::Implies => vec![rule.clone()],
    }
}

fn has_or_xor(rhs: &Expression) -> bool {
    rhs.iter()
        .any(|b| b.has_any_operator(&[TokenEffect::Or, TokenEffect::Xor]))
}

/// True when a block ends with `!` and the next block is strictly deeper —
/// i.e. a negation immediately in front of a parenthesised group.
fn has_negated_parentheses(rhs: &Expression) -> bool {
    for (i, block) in rhs.iter().enumerate() {
        if block.tokens.last() == Some(&TokenEffect::Not) {
            if let Some(next) = rhs.get(i + 1) {
                if next.priority > block.priority {
                    return true;
                }
            }
        }
    }
    false
}

fn needs_parentheses_for_negation(blocks: &[TokenBlock]) -> bool {
    match blocks.len() {
        0 => false,
        1 => blocks[0].has_any_operator(&[TokenEffect::And, TokenEffect::Or, TokenEffect::Xor]),
        _ => true,
    }
}

/// Builds the negation of `blocks`: `!(blocks)`, collapsing `!!X` to `X`
/// and omitting redundant parentheses around a lone literal.
fn negate_blocks(blocks: &[TokenBlock]) -> Expression {
    if blocks.iter().all(TokenBlock::is_empty) {
        return Vec::new();
    }

    if blocks.len() == 1 && blocks[0].tokens.first() == Some(&TokenEffect::Not) {
        let simplified = blocks[0].extract_range(1, blocks[0].len(), blocks[0].priority);
        return if simplified.is_empty() { Vec::new() } else { vec![simplified] };
    }

    let mut negated = Vec::new();
    if needs_parentheses_for_negation(blocks) {
        negated.push(TokenBlock::with_tokens(0, vec![TokenEffect::Not]));
        let min_priority = blocks.iter().filter(|b| !b.is_empty()).map(|b| b.priority).min().unwrap_or(0);
        for block in blocks.iter().filter(|b| !b.is_empty()) {
            negated.push(block.with_priority(block.priority - min_priority + 1));
        }
    } else {
        let mut neg_block = TokenBlock::with_tokens(0, vec![TokenEffect::Not]);
        for block in blocks.iter().filter(|b| !b.is_empty()) {
            neg_block.append_tokens(block);
        }
        if !neg_block.is_empty() {
            negated.push(neg_block);
        }
    }
    negated
}

fn parenthesize_blocks(blocks: &mut Expression) {
    for block in blocks.iter_mut() {
        if !block.is_empty() {
            *block = block.with_priority(block.priority + 1);
        }
    }
}

/// Appends `¬(to_negate)` to `lhs` as a new conjunct, preserving existing
/// grouping and cancelling double negation (`spec.md` §4.1 edge cases).
fn append_negated_to_lhs(lhs: &mut Expression, to_negate: &[TokenBlock]) {
    let negated = negate_blocks(to_negate);
    if negated.is_empty() {
        return;
    }

    let lhs_simple = lhs.len() == 1 && !lhs[0].has_any_operator(&[TokenEffect::And, TokenEffect::Or, TokenEffect::Xor]);
    if !lhs.is_empty() && !lhs_simple {
        parenthesize_blocks(lhs);
    }

    let mut and_block = TokenBlock::with_tokens(0, vec![TokenEffect::And]);
    if lhs_simple {
        lhs[0].append_tokens(&and_block);
    }

    if negated[0].priority == 0 {
        if lhs_simple {
            lhs[0].append_tokens(&negated[0]);
        } else {
            and_block.append_tokens(&negated[0]);
            lhs.push(and_block);
        }
        lhs.extend(negated.into_iter().skip(1));
    } else {
        if !lhs_simple {
            lhs.push(and_block);
        }
        lhs.extend(negated);
    }
}

/// Pushes a `!` in front of a parenthesised group inward, flipping `+`/`|`
/// (XOR stays XOR) and cancelling any double negation found inside.
fn apply_de_morgan(rule: &LogicRule) -> Vec<LogicRule> {
    let mut neg_block_index = None;
    let mut neg_token_index = 0;
    for (i, block) in rule.rhs.iter().enumerate() {
        if block.tokens.last() == Some(&TokenEffect::Not) {
            if let Some(next) = rule.rhs.get(i + 1) {
                if next.priority > block.priority {
                    neg_block_index = Some(i);
                    neg_token_index = block.len() - 1;
                    break;
                }
            }
        }
    }

    let Some(neg_block_index) = neg_block_index else {
        return vec![rule.clone()];
    };

    let neg_block = &rule.rhs[neg_block_index];
    let base_priority = neg_block.priority;

    let mut negated_expr = Vec::new();
    for block in &rule.rhs[neg_block_index + 1..] {
        if block.priority > base_priority {
            negated_expr.push(block.clone());
        } else {
            break;
        }
    }

    let mut transformed_rhs: Expression = rule.rhs[..neg_block_index].to_vec();

    if neg_token_index > 0 {
        let prefix = neg_block.extract_range(0, neg_token_index, base_priority);
        if !prefix.is_empty() {
            transformed_rhs.push(prefix);
        }
    }

    let all_tokens: Vec<TokenEffect> = negated_expr.iter().flat_map(|b| b.tokens.iter().copied()).collect();

    let mut transformed_tokens = Vec::new();
    let mut i = 0;
    while i < all_tokens.len() {
        match all_tokens[i] {
            TokenEffect::And => transformed_tokens.push(TokenEffect::Or),
            TokenEffect::Or => transformed_tokens.push(TokenEffect::And),
            TokenEffect::Xor => transformed_tokens.push(TokenEffect::Xor),
            TokenEffect::Symbol(_) => {
                transformed_tokens.push(TokenEffect::Not);
                transformed_tokens.push(all_tokens[i]);
            }
            TokenEffect::Not => {
                // Double negation inside the parenthesised group cancels.
                if let Some(next) = all_tokens.get(i + 1) {
                    if next.is_symbol() {
                        transformed_tokens.push(*next);
                        i += 1;
                    }
                }
            }
        }
        i += 1;
    }

    if !transformed_tokens.is_empty() {
        transformed_rhs.push(TokenBlock::with_tokens(0, transformed_tokens));
    }

    let end_index = neg_block_index + 1 + negated_expr.len();
    transformed_rhs.extend(rule.rhs[end_index..].iter().cloned());

    vec![LogicRule::new(rule.lhs.clone(), rule.arrow, transformed_rhs)]
}

fn operator_priority(op: TokenEffect) -> i32 {
    match op {
        TokenEffect::Xor => 0,
        TokenEffect::Or => 1,
        TokenEffect::And => 2,
        _ => 3,
    }
}

/// `[A, |, B, +, C]` at priority 0 becomes `[A, |]` at priority 0 and
/// `[B, +, C]` at priority 1 — splitting mixed-operator blocks so each
/// surviving block contains exactly one operator kind, weakest operator
/// (lowest precedence) peeled off first.
fn normalize_blocks_by_operator_priority(blocks: &[TokenBlock]) -> Expression {
    let mut result = Vec::new();
    for block in blocks {
        if block.is_empty() {
            continue;
        }
        if block.len() <= 1 {
            result.push(block.clone());
            continue;
        }

        let operators_in_block: BTreeSet<TokenEffect> = block
            .tokens
            .iter()
            .copied()
            .filter(|t| matches!(t, TokenEffect::And | TokenEffect::Or | TokenEffect::Xor))
            .collect();
        if operators_in_block.len() <= 1 {
            result.push(block.clone());
            continue;
        }

        let (split_index, split_operator) = block
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| matches!(t, TokenEffect::And | TokenEffect::Or | TokenEffect::Xor))
            .min_by_key(|(_, t)| operator_priority(**t))
            .map(|(i, t)| (i, *t))
            .expect("operators_in_block.len() > 1 implies at least one operator token");
        let _ = split_operator;

        let left_part = block.extract_range(0, split_index, block.priority);
        if !left_part.is_empty() {
            result.push(left_part);
        }
        result.push(TokenBlock::with_tokens(block.priority, vec![block.tokens[split_index]]));

        let right_part = block.extract_range(split_index + 1, block.len(), block.priority + 1);
        if !right_part.is_empty() {
            result.extend(normalize_blocks_by_operator_priority(std::slice::from_ref(&right_part)));
        }
    }
    result
}

/// `A => B + C` becomes `A => B` and `A => C`.
fn split_by_and_at_lowest_priority(rule: &LogicRule, min_priority: u32) -> Vec<LogicRule> {
    let mut splits = Vec::new();
    let mut sub_expressions: Vec<Expression> = Vec::new();
    let mut current_sub: Expression = Vec::new();

    for block in &rule.rhs {
        if block.priority == min_priority {
            let mut current_tokens = Vec::new();
            for &tk in &block.tokens {
                if tk == TokenEffect::And {
                    if !current_tokens.is_empty() {
                        current_sub.push(TokenBlock::with_tokens(min_priority, std::mem::take(&mut current_tokens)));
                    }
                    if !current_sub.is_empty() {
                        sub_expressions.push(std::mem::take(&mut current_sub));
                    }
                } else {
                    current_tokens.push(tk);
                }
            }
            if !current_tokens.is_empty() {
                current_sub.push(TokenBlock::with_tokens(min_priority, current_tokens));
            }
        } else {
            current_sub.push(block.clone());
        }
    }
    if !current_sub.is_empty() {
        sub_expressions.push(current_sub);
    }

    for sub_rhs in sub_expressions {
        if !sub_rhs.is_empty() {
            splits.push(LogicRule::new(rule.lhs.clone(), Arrow::Implies, sub_rhs));
        }
    }
    splits
}

/// `A => L | R` becomes `A ∧ ¬L ⇒ R` and `A ∧ ¬R ⇒ L`.
fn expand_or_operator(rule: &LogicRule, block_index: usize, token_index: usize) -> Vec<LogicRule> {
    let block = &rule.rhs[block_index];

    let mut left_rhs: Expression = rule.rhs[..block_index].to_vec();
    let left_block = block.extract_range(0, token_index, block.priority);
    if !left_block.is_empty() {
        left_rhs.push(left_block);
    }

    let right_block = block.extract_range(token_index + 1, block.len(), block.priority);
    let mut right_rhs = Vec::new();
    if !right_block.is_empty() {
        right_rhs.push(right_block);
    }
    right_rhs.extend(rule.rhs[block_index + 1..].iter().cloned());

    let mut lhs_1 = rule.lhs.clone();
    if !left_rhs.is_empty() {
        append_negated_to_lhs(&mut lhs_1, &left_rhs);
    }
    let mut lhs_2 = rule.lhs.clone();
    if !right_rhs.is_empty() {
        append_negated_to_lhs(&mut lhs_2, &right_rhs);
    }

    vec![
        LogicRule::new(lhs_1, Arrow::Implies, right_rhs),
        LogicRule::new(lhs_2, Arrow::Implies, left_rhs),
    ]
}

/// `A => L ^ R` becomes `A ∧ ¬L ⇒ R`, `A ∧ ¬R ⇒ L`, and the constraint
/// `A => ¬(L ∧ R)` (re-expanded by De Morgan on its next worklist pop).
fn expand_xor_operator(rule: &LogicRule, block_index: usize, token_index: usize) -> Vec<LogicRule> {
    let block = &rule.rhs[block_index];

    let mut left_rhs: Expression = rule.rhs[..block_index].to_vec();
    let left_block = block.extract_range(0, token_index, block.priority);
    if !left_block.is_empty() {
        left_rhs.push(left_block);
    }

    let right_block = block.extract_range(token_index + 1, block.len(), block.priority);
    let mut right_rhs = Vec::new();
    if !right_block.is_empty() {
        right_rhs.push(right_block.clone());
    }
    right_rhs.extend(rule.rhs[block_index + 1..].iter().cloned());

    let mut lhs_1 = rule.lhs.clone();
    if !left_rhs.is_empty() {
        append_negated_to_lhs(&mut lhs_1, &left_rhs);
    }
    let mut lhs_2 = rule.lhs.clone();
    if !right_block.is_empty() {
        append_negated_to_lhs(&mut lhs_2, &right_rhs);
    }

    let mut constraint_rhs: Expression = left_rhs.clone();
    constraint_rhs.push(TokenBlock::with_tokens(block.priority, vec![TokenEffect::And]));
    constraint_rhs.extend(right_rhs.clone());
    let negated_constraint = negate_blocks(&constraint_rhs);

    vec![
        LogicRule::new(lhs_1, Arrow::Implies, right_rhs),
        LogicRule::new(lhs_2, Arrow::Implies, left_rhs),
        LogicRule::new(rule.lhs.clone(), Arrow::Implies, negated_constraint),
    ]
}

/// Normalizes mixed-operator blocks, then dispatches to AND-splitting or
/// OR/XOR elimination for whichever connective remains at the lowest
/// priority level.
fn expand_rhs(rule: &LogicRule) -> Vec<LogicRule> {
    let normalized_rhs = normalize_blocks_by_operator_priority(&rule.rhs);
    let normalized_rule = LogicRule::new(rule.lhs.clone(), rule.arrow, normalized_rhs);

    let min_priority = normalized_rule.rhs.iter().map(|b| b.priority).min().unwrap_or(0);

    let has_and_at_lowest = normalized_rule
        .rhs
        .iter()
        .filter(|b| b.priority == min_priority)
        .any(|b| b.has_operator(TokenEffect::And));
    if has_and_at_lowest {
        return split_by_and_at_lowest_priority(&normalized_rule, min_priority);
    }

    for (i, block) in normalized_rule.rhs.iter().enumerate() {
        for (j, &tk) in block.tokens.iter().enumerate() {
            if tk == TokenEffect::Or {
                return expand_or_operator(&normalized_rule, i, j);
            }
            if tk == TokenEffect::Xor {
                return expand_xor_operator(&normalized_rule, i, j);
            }
        }
    }
    vec![normalized_rule]
}

fn extract_basic_rules(rule: &LogicRule, origin: Option<LogicRuleId>, basics: &mut Vec<BasicRule>) {
    let mut processed = BTreeSet::new();
    for block in &rule.rhs {
        for (i, &tk) in block.tokens.iter().enumerate() {
            if let TokenEffect::Symbol(symbol) = tk {
                let is_negated = i > 0 && block.tokens[i - 1] == TokenEffect::Not;
                if processed.insert((symbol, is_negated)) {
                    basics.push(BasicRule::new(rule.lhs.clone(), symbol, is_negated, origin));
                }
            }
        }
    }
}

/// Converts `rule` (identified by `rule_id` in the caller's arena) into a
/// set of basic rules whose conjunction is logically equivalent to it.
///
/// `rule_id` becomes `BasicRule::origin` for every produced basic rule,
/// except when exactly one is produced — `spec.md` §4.1 suppresses the
/// cosmetic "deduced from itself" origin in that case.
pub fn deduce_basics(rule: &LogicRule, rule_id: LogicRuleId) -> Vec<BasicRule> {
    let mut basics = Vec::new();
    let mut worklist: VecDeque<LogicRule> = expand_equivalence(rule).into_iter().collect();

    while let Some(current) = worklist.pop_front() {
        if has_negated_parentheses(&current.rhs) {
            worklist.extend(apply_de_morgan(&current));
            continue;
        }
        if !has_or_xor(&current.rhs) {
            extract_basic_rules(&current, Some(rule_id), &mut basics);
        } else {
            worklist.extend(expand_rhs(&current));
        }
    }

    if basics.len() == 1 {
        basics[0].origin = None;
    }
    basics
}
