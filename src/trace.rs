//! Reasoning trace: per-query explanation log collected while resolving.

use crate::rule::BasicRule;
use crate::symbol::{Symbol, TriValue};
use std::fmt;

/// Why a basic rule did or did not contribute to a conclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStatus {
    FiredTrue,
    FiredFalse,
    NotFired,
    AmbiguousCycle,
    AmbiguousDepends,
}

/// One entry in the reasoning log.
#[derive(Debug, Clone)]
pub enum TraceEvent {
    /// `q` was given directly as an initial fact.
    InitialFact { symbol: Symbol },
    /// `memo` already held a value for `symbol` when it was asked for again.
    MemoHit { symbol: Symbol, value: TriValue },
    /// A basic rule with head `symbol` was evaluated against the current
    /// assignment.
    RuleEvaluation {
        symbol: Symbol,
        rule: BasicRule,
        status: RuleStatus,
    },
    /// `prove` returned its final value for `symbol`.
    ProveResult { symbol: Symbol, value: TriValue },
    /// The truth-table clamp changed (or confirmed) a conclusion.
    TruthTableClamp {
        symbol: Symbol,
        before: TriValue,
        after: TriValue,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::InitialFact { symbol } => write!(f, "Initial fact: {symbol} is given as true"),
            TraceEvent::MemoHit { symbol, value } => write!(f, "Already resolved: {symbol} = {value}"),
            TraceEvent::RuleEvaluation { symbol, rule, status } => match status {
                RuleStatus::FiredTrue | RuleStatus::FiredFalse => {
                    let verdict = if *status == RuleStatus::FiredTrue { "true" } else { "false" };
                    write!(f, "Rule: {rule} shows {symbol} {verdict}")?;
                    if let Some(origin) = rule.origin {
                        write!(f, " (deduced from rule #{origin})")?;
                    }
                    Ok(())
                }
                RuleStatus::NotFired => write!(f, "Rule: {rule} did not fire"),
                RuleStatus::AmbiguousCycle => write!(f, "Rule: {rule} is ambiguous (cycle)"),
                RuleStatus::AmbiguousDepends => write!(f, "Rule: {rule} depends on an ambiguous symbol"),
            },
            TraceEvent::ProveResult { symbol, value } => write!(f, "{symbol} is {value}"),
            TraceEvent::TruthTableClamp { symbol, before, after } => {
                write!(f, "Truth table narrows {symbol} from {before} to {after}")
            }
        }
    }
}

/// The full trace accumulated across one call to
/// [`crate::resolver::Resolver::resolve`], grouped per query.
#[derive(Debug, Clone, Default)]
pub struct Reasoning {
    initial_facts: Vec<Symbol>,
    /// Per-query trace, in the order each query's `prove` evaluated rules.
    per_query: Vec<(Symbol, Vec<TraceEvent>)>,
}

impl Reasoning {
    pub fn new() -> Self {
        Reasoning::default()
    }

    pub fn record_initial_fact(&mut self, symbol: Symbol) {
        self.initial_facts.push(symbol);
    }

    /// Starts a fresh per-query trace buffer for `symbol`.
    pub fn begin_query(&mut self, symbol: Symbol) {
        self.per_query.push((symbol, Vec::new()));
    }

    fn current_mut(&mut self) -> &mut Vec<TraceEvent> {
        &mut self
            .per_query
            .last_mut()
            .expect("begin_query must be called before recording trace events")
            .1
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.current_mut().push(event);
    }

    pub fn record_clamp(&mut self, symbol: Symbol, before: TriValue, after: TriValue) {
        if before != after {
            self.record(TraceEvent::TruthTableClamp { symbol, before, after });
        }
    }

    /// Renders the explanation for one query: the header (once), every
    /// rule considered in evaluation order, any clamp event, then the
    /// conclusion.
    pub fn render(&self, symbol: Symbol, result: TriValue) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Reasoning for {symbol} ===\n"));

        let events = self.per_query.iter().find(|(s, _)| *s == symbol).map(|(_, e)| e.as_slice()).unwrap_or(&[]);

        if events.is_empty() {
            out.push_str(&format!("No assertion proves {symbol}, false by default.\n"));
        } else {
            for event in events {
                out.push_str(&format!("  {event}\n"));
            }
        }
        out.push_str(&format!("Conclusion: {symbol} is {result}\n"));
        out
    }

    pub fn initial_facts_header(&self) -> Option<String> {
        if self.initial_facts.is_empty() {
            return None;
        }
        let listed: Vec<String> = self.initial_facts.iter().map(ToString::to_string).collect();
        Some(format!("Initial facts: {}", listed.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    #[test]
    fn render_falls_back_to_default_false_message_with_no_events() {
        let mut reasoning = Reasoning::new();
        let b = Symbol::new('B').unwrap();
        reasoning.begin_query(b);
        let rendered = reasoning.render(b, TriValue::False);
        assert!(rendered.contains("false by default"));
        assert!(rendered.contains("Conclusion: B is false"));
    }

    #[test]
    fn initial_facts_header_lists_facts_in_recorded_order() {
        let mut reasoning = Reasoning::new();
        reasoning.record_initial_fact(Symbol::new('A').unwrap());
        reasoning.record_initial_fact(Symbol::new('B').unwrap());
        assert_eq!(reasoning.initial_facts_header().unwrap(), "Initial facts: A, B");
    }
}
