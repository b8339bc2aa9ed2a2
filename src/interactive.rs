//! Interactive prompt loop (`--interactive`): repeatedly reads a new
//! initial-fact line, re-resolves against it, and prints the result —
//! without re-parsing or re-deriving any rules.

use crate::error::ExpertResult;
use crate::resolver::Resolver;
use crate::symbol::Symbol;
use crate::truth_table::TruthTable;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::BTreeSet;

/// Parses one interactive facts line: whitespace-free uppercase letters, a
/// lone space meaning "all false". Returns `None` on an invalid character
/// (caller reprompts) rather than erroring, matching `spec.md` §7's
/// non-fatal interactive policy.
fn parse_interactive_facts(line: &str) -> Option<BTreeSet<Symbol>> {
    let mut facts = BTreeSet::new();
    for c in line.chars() {
        if c.is_whitespace() {
            continue;
        }
        facts.insert(Symbol::new(c)?);
    }
    Some(facts)
}

/// Runs the prompt loop: `Initial facts = `, blank line to exit, a lone
/// space for all-false. `explain` controls whether a reasoning trace is
/// printed alongside each query's answer.
pub fn run(resolver: &mut Resolver, queries: &BTreeSet<Symbol>, truth_table: &TruthTable, explain: bool) -> ExpertResult<()> {
    println!("Interactive mode: enter new initial facts (e.g. AB). Empty line to exit. Space for all false.");
    let mut rl = DefaultEditor::new().map_err(|e| crate::error::ExpertError::Usage(e.to_string()))?;

    loop {
        match rl.readline("Initial facts = ") {
            Ok(line) => {
                if line.is_empty() {
                    break;
                }
                let Some(new_facts) = parse_interactive_facts(&line) else {
                    eprintln!("Invalid character in facts.");
                    continue;
                };
                let _ = rl.add_history_entry(line.as_str());

                resolver.change_facts(new_facts);
                match resolver.resolve(queries, truth_table) {
                    Ok(answers) => crate::print_answers(&answers, resolver, queries, explain),
                    Err(crate::error::ExpertError::IncompatibleInitialFacts) => {
                        eprintln!("No valid states with the given initial facts. Please try again.");
                    }
                    Err(err) => return Err(err),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(_) => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_means_all_false() {
        assert_eq!(parse_interactive_facts("").unwrap(), BTreeSet::new());
    }

    #[test]
    fn lone_space_also_means_all_false() {
        assert_eq!(parse_interactive_facts("   ").unwrap(), BTreeSet::new());
    }

    #[test]
    fn invalid_character_returns_none() {
        assert!(parse_interactive_facts("a").is_none());
    }

    #[test]
    fn parses_a_set_of_letters() {
        let facts = parse_interactive_facts("AB").unwrap();
        assert_eq!(facts.len(), 2);
    }
}
