//! Input file parsing: tokenizing logic lines into [`LogicRule`]s and
//! collecting the initial-facts and query lines.

use crate::block::{Expression, TokenBlock};
use crate::error::{ExpertError, ExpertResult};
use crate::rule::LogicRule;
use crate::symbol::Symbol;
use crate::token::{Arrow, TokenEffect};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Everything recovered from one input file: the rule arena, the initial
/// facts, and the queries.
#[derive(Debug, Clone, Default)]
pub struct ParsedProgram {
    pub rules: Vec<LogicRule>,
    pub initial_facts: BTreeSet<Symbol>,
    pub queries: BTreeSet<Symbol>,
}

/// Strips a trailing `#` comment (the `#` itself and everything after).
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Parses an `=`/`?` line's letters, rejecting anything but whitespace and
/// uppercase letters.
fn parse_letters(line: &str, kind: &str) -> ExpertResult<BTreeSet<Symbol>> {
    let mut set = BTreeSet::new();
    for c in line.chars().skip(1) {
        if c.is_whitespace() {
            continue;
        }
        let symbol = Symbol::new(c).ok_or_else(|| ExpertError::Syntax(format!("invalid character in {kind} line: {c:?}")))?;
        set.insert(symbol);
    }
    Ok(set)
}

/// Tokenizes one logic line into `lhs`, `arrow`, `rhs`, following
/// `spec.md` §6's grammar: whitespace is insignificant, `(`/`)` raise or
/// lower the nesting priority, and `=>`/`<=>` mark the arrow.
fn parse_classic(line: &str) -> ExpertResult<LogicRule> {
    let mut side: Vec<TokenBlock> = vec![TokenBlock::new(0)];
    let mut arrow: Option<Arrow> = None;
    let mut rhs: Vec<TokenBlock> = Vec::new();
    let mut priority: u32 = 0;
    let mut buffer = String::new();

    for c in line.chars() {
        if c.is_whitespace() {
            buffer.clear();
            continue;
        }
        buffer.push(c);
        match buffer.as_str() {
            "(" => {
                priority += 1;
                active_side(&arrow, &mut side, &mut rhs).push(TokenBlock::new(priority));
                buffer.clear();
            }
            ")" => {
                if priority == 0 {
                    return Err(ExpertError::Syntax("unbalanced ')' in logic line".to_string()));
                }
                priority -= 1;
                active_side(&arrow, &mut side, &mut rhs).push(TokenBlock::new(priority));
                buffer.clear();
            }
            "!" => {
                push_token(active_side(&arrow, &mut side, &mut rhs), TokenEffect::Not);
                buffer.clear();
            }
            "+" => {
                push_token(active_side(&arrow, &mut side, &mut rhs), TokenEffect::And);
                buffer.clear();
            }
            "|" => {
                push_token(active_side(&arrow, &mut side, &mut rhs), TokenEffect::Or);
                buffer.clear();
            }
            "^" => {
                push_token(active_side(&arrow, &mut side, &mut rhs), TokenEffect::Xor);
                buffer.clear();
            }
            "=>" => {
                if arrow.is_some() {
                    return Err(ExpertError::Syntax("more than one arrow in a logic line".to_string()));
                }
                arrow = Some(Arrow::Implies);
                rhs.push(TokenBlock::new(priority));
                buffer.clear();
            }
            "<=>" => {
                if arrow.is_some() {
                    return Err(ExpertError::Syntax("more than one arrow in a logic line".to_string()));
                }
                arrow = Some(Arrow::Iff);
                rhs.push(TokenBlock::new(priority));
                buffer.clear();
            }
            // A lone "=" or "<" might be the start of "=>"/"<=>"; wait for
            // the next character before deciding it is invalid.
            "=" | "<" => {}
            _ => {
                if buffer.len() == 1 {
                    let c = buffer.chars().next().unwrap();
                    let symbol = Symbol::new(c).ok_or_else(|| ExpertError::Syntax(format!("unexpected token: {c:?}")))?;
                    push_token(active_side(&arrow, &mut side, &mut rhs), TokenEffect::Symbol(symbol));
                    buffer.clear();
                } else if buffer.len() >= 3 {
                    return Err(ExpertError::Syntax(format!("Input file format does not manage: {buffer:?} token")));
                }
            }
        }
    }

    if priority != 0 {
        return Err(ExpertError::Syntax("unbalanced '(' in logic line".to_string()));
    }
    let arrow = arrow.ok_or_else(|| ExpertError::Syntax("logic line missing '=>' or '<=>'".to_string()))?;
    if rhs.is_empty() || side.iter().all(TokenBlock::is_empty) {
        return Err(ExpertError::Syntax("logic line missing a side".to_string()));
    }
    Ok(LogicRule::new(side, arrow, rhs))
}

/// Whichever side of the arrow is currently being accumulated.
fn active_side<'a>(arrow: &Option<Arrow>, lhs: &'a mut Vec<TokenBlock>, rhs: &'a mut Vec<TokenBlock>) -> &'a mut Vec<TokenBlock> {
    if arrow.is_none() {
        lhs
    } else {
        rhs
    }
}

fn push_token(blocks: &mut Vec<TokenBlock>, token: TokenEffect) {
    if blocks.is_empty() {
        blocks.push(TokenBlock::new(0));
    }
    blocks.last_mut().unwrap().push(token);
}

/// Parses a whole input file's text per `spec.md` §6/§4.7.
pub fn parse_source(text: &str) -> ExpertResult<ParsedProgram> {
    let mut program = ParsedProgram::default();

    for raw_line in text.lines() {
        let line = strip_comment(raw_line);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if line.starts_with('=') {
            program.initial_facts.extend(parse_letters(line, "initial facts")?);
        } else if line.starts_with('?') {
            program.queries.extend(parse_letters(line, "queries")?);
        } else {
            program.rules.push(parse_classic(line)?);
        }
    }

    Ok(program)
}

/// Reads `path` and parses it, wrapping any I/O failure as
/// [`ExpertError::Io`].
pub fn parse_file(path: &Path) -> ExpertResult<ParsedProgram> {
    let text = fs::read_to_string(path)?;
    parse_source(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(c: char) -> Symbol {
        Symbol::new(c).unwrap()
    }

    #[test]
    fn parses_a_simple_implication() {
        let program = parse_source("A => B\n= A\n? B\n").unwrap();
        assert_eq!(program.rules.len(), 1);
        assert_eq!(program.rules[0].arrow, Arrow::Implies);
        assert!(program.initial_facts.contains(&sym('A')));
        assert!(program.queries.contains(&sym('B')));
    }

    #[test]
    fn strips_comments_and_blank_lines() {
        let program = parse_source("# a comment\n\nA => B # trailing\n= A # only A\n? B\n").unwrap();
        assert_eq!(program.rules.len(), 1);
        assert_eq!(program.initial_facts.len(), 1);
    }

    #[test]
    fn empty_initial_facts_line_means_all_false() {
        let program = parse_source("A => B\n=\n? B\n").unwrap();
        assert!(program.initial_facts.is_empty());
    }

    #[test]
    fn lowercase_letter_is_a_syntax_error() {
        let err = parse_source("a => B\n").unwrap_err();
        assert!(matches!(err, ExpertError::Syntax(_)));
    }

    #[test]
    fn multi_arrow_lines_are_unioned() {
        let program = parse_source("A => B\n= A\n= B\n? B\n? C\n").unwrap();
        assert_eq!(program.initial_facts.len(), 2);
        assert_eq!(program.queries.len(), 2);
    }

    #[test]
    fn parenthesised_rhs_gets_nested_priority() {
        let program = parse_source("A => !(B + C)\n").unwrap();
        let rhs = &program.rules[0].rhs;
        assert!(rhs.iter().any(|b| b.priority > 0));
    }

    #[test]
    fn unknown_long_token_is_a_syntax_error() {
        let err = parse_source("A ==> B\n").unwrap_err();
        assert!(matches!(err, ExpertError::Syntax(_)));
    }
}
