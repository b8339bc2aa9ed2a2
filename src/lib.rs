//! A backward-chaining expert system over propositional logic.
//!
//! Rules of the form `LHS => RHS` or `LHS <=> RHS` are normalized into
//! single-symbol-head basic rules, combined into a global truth table, and
//! resolved query-by-query into a three-valued (true/false/ambiguous)
//! conclusion with an optional reasoning trace.

pub mod block;
pub mod config;
pub mod error;
pub mod eval;
pub mod interactive;
pub mod normalize;
pub mod parser;
pub mod resolver;
pub mod rule;
pub mod symbol;
pub mod token;
pub mod trace;
pub mod truth_table;

pub use error::{ExpertError, ExpertResult};
pub use symbol::{Symbol, TriValue};

use resolver::Resolver;
use rule::{BasicRule, LogicRuleId};
use std::collections::{BTreeMap, BTreeSet};
use truth_table::TruthTable;

/// A parsed and normalized program, ready to resolve: every [`LogicRule`]
/// reduced to its [`BasicRule`]s, and the global truth table those basic
/// rules imply.
///
/// [`LogicRule`]: rule::LogicRule
pub struct Program {
    pub basic_rules: Vec<BasicRule>,
    pub initial_facts: BTreeSet<Symbol>,
    pub queries: BTreeSet<Symbol>,
    pub truth_table: TruthTable,
}

/// The alphabet size, and the default for `resolver.max_symbols`.
pub const DEFAULT_MAX_SYMBOLS: usize = 26;

impl Program {
    /// Parses `text`, normalizes every rule into basic rules, and conjoins
    /// their truth tables. Returns [`ExpertError::ContradictoryRuleBase`]
    /// if the combined table has no valid state. Equivalent to
    /// [`Program::build_with_limit`] with the default alphabet-size ceiling.
    pub fn build(text: &str) -> ExpertResult<Program> {
        Program::build_with_limit(text, DEFAULT_MAX_SYMBOLS)
    }

    /// As [`Program::build`], but rejects any program whose distinct-symbol
    /// count exceeds `max_symbols` with [`ExpertError::Syntax`] rather than
    /// silently accepting it (`config.resolver.max_symbols`).
    pub fn build_with_limit(text: &str, max_symbols: usize) -> ExpertResult<Program> {
        let parsed = parser::parse_source(text)?;

        let mut symbols: BTreeSet<Symbol> = parsed.initial_facts.iter().copied().collect();
        symbols.extend(parsed.queries.iter().copied());
        for rule in &parsed.rules {
            symbols.extend(rule.lhs.iter().flat_map(|b| b.tokens.iter().filter_map(|t| t.as_symbol())));
            symbols.extend(rule.rhs.iter().flat_map(|b| b.tokens.iter().filter_map(|t| t.as_symbol())));
        }
        if symbols.len() > max_symbols {
            return Err(ExpertError::Syntax(format!(
                "program uses {} distinct symbols, exceeding the configured limit of {max_symbols}",
                symbols.len()
            )));
        }

        let mut basic_rules = Vec::new();
        for (idx, rule) in parsed.rules.iter().enumerate() {
            let id: LogicRuleId = idx;
            basic_rules.extend(normalize::deduce_basics(rule, id));
        }

        let tables: Vec<TruthTable> = basic_rules
            .iter()
            .map(TruthTable::from_basic_rule)
            .collect::<ExpertResult<Vec<_>>>()?;
        let truth_table = TruthTable::conjunction_all(&tables);

        if !truth_table.variables.is_empty() && !truth_table.has_valid_state() {
            return Err(ExpertError::ContradictoryRuleBase);
        }

        Ok(Program {
            basic_rules,
            initial_facts: parsed.initial_facts,
            queries: parsed.queries,
            truth_table,
        })
    }
}

/// Prints query answers per `spec.md` §6: one `<sym> = <value>` line per
/// query by default, or the full reasoning trace under `--explain`.
pub fn print_answers(answers: &BTreeMap<Symbol, TriValue>, resolver: &Resolver, queries: &BTreeSet<Symbol>, explain: bool) {
    if explain {
        if let Some(reasoning) = resolver.reasoning() {
            if let Some(header) = reasoning.initial_facts_header() {
                println!("{header}");
            }
            for &q in queries {
                if let Some(&value) = answers.get(&q) {
                    print!("{}", reasoning.render(q, value));
                }
            }
            return;
        }
    }
    for &q in queries {
        if let Some(&value) = answers.get(&q) {
            println!("{q} = {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_rejects_a_contradictory_rule_base() {
        // A <=> !A expands to A => !A and !A => A; the first forces A
        // false, the second forces A true, so their conjunction has no
        // valid state at all regardless of any initial facts.
        let err = Program::build("A <=> !A\n=\n?\n").unwrap_err();
        assert!(matches!(err, ExpertError::ContradictoryRuleBase));
    }

    #[test]
    fn build_accepts_modus_ponens() {
        let program = Program::build("A => B\n= A\n? B\n").unwrap();
        assert_eq!(program.basic_rules.len(), 1);
        assert!(program.initial_facts.contains(&Symbol::new('A').unwrap()));
    }

    #[test]
    fn build_with_limit_rejects_too_many_distinct_symbols() {
        let err = Program::build_with_limit("A => B\n= A\n? B\n", 1).unwrap_err();
        assert!(matches!(err, ExpertError::Syntax(_)));
    }

    #[test]
    fn build_with_limit_accepts_within_budget() {
        let program = Program::build_with_limit("A => B\n= A\n? B\n", 2).unwrap();
        assert_eq!(program.basic_rules.len(), 1);
    }
}
