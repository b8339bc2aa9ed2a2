//! Backward-chaining resolver: a recursive, memoized, tri-valued SLD-style
//! solver over the basic rules produced by [`crate::normalize`].

use crate::error::{ExpertError, ExpertResult};
use crate::eval::eval_tri;
use crate::rule::BasicRule;
use crate::symbol::{Symbol, TriValue};
use crate::trace::{Reasoning, RuleStatus, TraceEvent};
use crate::truth_table::TruthTable;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Drives one resolution pass over a fixed set of basic rules. Per
/// `spec.md` §5, resolver state (`memo`/`visiting`) is scoped to a single
/// pass and reset before the next; the basic rules themselves are
/// borrowed, never owned.
pub struct Resolver<'a> {
    basic_rules: &'a [BasicRule],
    initial_facts: BTreeSet<Symbol>,
    memo: HashMap<Symbol, TriValue>,
    visiting: HashMap<Symbol, bool>,
    trace: Option<Reasoning>,
    cycle_hit: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(basic_rules: &'a [BasicRule], initial_facts: BTreeSet<Symbol>) -> Self {
        Resolver {
            basic_rules,
            initial_facts,
            memo: HashMap::new(),
            visiting: HashMap::new(),
            trace: None,
            cycle_hit: false,
        }
    }

    /// Enables trace collection (`--explain`). Must be called before
    /// [`Resolver::resolve`] for the trace to capture anything.
    pub fn with_tracing(mut self) -> Self {
        self.trace = Some(Reasoning::new());
        self
    }

    pub fn reasoning(&self) -> Option<&Reasoning> {
        self.trace.as_ref()
    }

    fn reset_pass(&mut self) {
        self.memo.clear();
        self.visiting.clear();
        self.cycle_hit = false;
    }

    /// §5 "Interactive mode": swap in a new initial-fact set and reset all
    /// transient resolver state, without re-deriving any rules.
    pub fn change_facts(&mut self, new_facts: BTreeSet<Symbol>) {
        self.initial_facts = new_facts;
        self.reset_pass();
        self.trace = self.trace.take().map(|_| Reasoning::new());
    }

    /// `prove(q, negated_context)`: §4.4's recursive tri-valued proof,
    /// memoized and guarded against cycles via `visiting`.
    pub fn prove(&mut self, q: Symbol, negated_context: bool) -> ExpertResult<TriValue> {
        if let Some(&value) = self.memo.get(&q) {
            debug!(symbol = %q, value = %value, "memo_hit");
            if let Some(trace) = &mut self.trace {
                trace.record(TraceEvent::MemoHit { symbol: q, value });
            }
            return Ok(value);
        }

        if self.initial_facts.contains(&q) {
            if let Some(trace) = &mut self.trace {
                trace.record(TraceEvent::InitialFact { symbol: q });
            }
            self.memo.insert(q, TriValue::True);
            return Ok(TriValue::True);
        }

        if let Some(&entry_context) = self.visiting.get(&q) {
            // Same-sign self-reference: negation as failure. Cross-sign:
            // genuinely indeterminate (spec.md §4.4 rationale).
            self.cycle_hit = true;
            if entry_context == negated_context {
                debug!(symbol = %q, "cycle_same_sign_negation_as_failure");
                return Ok(TriValue::False);
            }
            debug!(symbol = %q, "cycle_cross_sign_ambiguous");
            return Ok(TriValue::Ambiguous);
        }
        self.visiting.insert(q, negated_context);

        let mut definite_true = false;
        let mut definite_false = false;
        let mut possible_true = false;
        let mut possible_false = false;

        for idx in 0..self.basic_rules.len() {
            if self.basic_rules[idx].rhs_symbol != q {
                continue;
            }
            let rule = self.basic_rules[idx].clone();
            self.cycle_hit = false;
            let lhs_result = eval_tri(&rule.lhs, negated_context, &mut |s, ctx| self.prove(s, ctx))?;
            let hit_cycle = self.cycle_hit;

            let status = match lhs_result {
                TriValue::True => {
                    if rule.rhs_negated {
                        definite_false = true;
                    } else {
                        definite_true = true;
                    }
                    if rule.rhs_negated {
                        RuleStatus::FiredFalse
                    } else {
                        RuleStatus::FiredTrue
                    }
                }
                TriValue::Ambiguous => {
                    // §4.4 step 4: an ambiguous LHS leaves the head's truth
                    // undetermined in either direction, so both possibles are
                    // recorded regardless of which sign this rule's RHS is.
                    possible_true = true;
                    possible_false = true;
                    if hit_cycle {
                        RuleStatus::AmbiguousCycle
                    } else {
                        RuleStatus::AmbiguousDepends
                    }
                }
                TriValue::False => RuleStatus::NotFired,
            };

            if let Some(trace) = &mut self.trace {
                if status != RuleStatus::NotFired {
                    trace.record(TraceEvent::RuleEvaluation { symbol: q, rule, status });
                }
            }
        }

        self.visiting.remove(&q);

        let result = if definite_true && definite_false {
            TriValue::Ambiguous
        } else if definite_true {
            TriValue::True
        } else if definite_false {
            TriValue::False
        } else if possible_true || possible_false {
            TriValue::Ambiguous
        } else {
            TriValue::False
        };

        if let Some(trace) = &mut self.trace {
            trace.record(TraceEvent::ProveResult { symbol: q, value: result });
        }
        self.memo.insert(q, result);
        Ok(result)
    }

    /// Top-level contract: proves every query against `table`, clamping
    /// ambiguous conclusions using the global truth table filtered by
    /// initial facts and the isolated base results.
    ///
    /// Returns `ExpertError::IncompatibleInitialFacts` if `table` has a
    /// valid state before filtering but none survive the initial facts.
    pub fn resolve(&mut self, queries: &BTreeSet<Symbol>, table: &TruthTable) -> ExpertResult<BTreeMap<Symbol, TriValue>> {
        if let Some(trace) = &mut self.trace {
            for &fact in &self.initial_facts {
                trace.record_initial_fact(fact);
            }
        }

        let mut universe: BTreeSet<Symbol> = queries.clone();
        universe.extend(table.variables.iter().copied());

        // computeBaseResults (Resolver.cpp): a silent pass over the whole
        // universe, used only to filter the truth table. Tracing is
        // suspended so it doesn't pollute the per-query trace below.
        let suspended_trace = self.trace.take();
        let mut base_results = BTreeMap::new();
        for &symbol in &universe {
            self.reset_pass();
            let value = self.prove(symbol, false)?;
            base_results.insert(symbol, value);
        }
        self.trace = suspended_trace;

        let had_valid_state_before_filtering = table.has_valid_state() || table.variables.is_empty();
        let filtered = if table.variables.is_empty() {
            None
        } else {
            Some(table.filter_by_results(&self.initial_facts, &base_results))
        };

        if let Some(filtered) = &filtered {
            if had_valid_state_before_filtering && table.has_valid_state() && !filtered.has_valid_state() {
                return Err(ExpertError::IncompatibleInitialFacts);
            }
        }

        let mut answers = BTreeMap::new();
        for &q in queries {
            let span = tracing::info_span!("resolve_query", query = %q);
            let _enter = span.enter();

            self.reset_pass();
            if let Some(trace) = &mut self.trace {
                trace.begin_query(q);
            }
            let base = self.prove(q, false)?;
            let value = match &filtered {
                Some(t) => t.clamp(q, base),
                None => base,
            };
            if value != base {
                debug!(symbol = %q, before = %base, after = %value, "truth_table_clamp");
            }
            if let Some(trace) = &mut self.trace {
                trace.record_clamp(q, base, value);
            }
            answers.insert(q, value);
        }

        Ok(answers)
    }
}
