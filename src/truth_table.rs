//! Truth-table engine: materializes the satisfying assignments of a basic
//! rule, conjoins many such tables, and uses the result to detect
//! contradictions and tighten ambiguous resolver conclusions.

use crate::error::ExpertResult;
use crate::eval::eval;
use crate::rule::BasicRule;
use crate::symbol::{Symbol, TriValue};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A total assignment over some subset of symbols.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VariableState {
    pub values: BTreeMap<Symbol, bool>,
}

impl VariableState {
    pub fn new() -> Self {
        VariableState::default()
    }

    pub fn from_map(values: BTreeMap<Symbol, bool>) -> Self {
        VariableState { values }
    }

    /// True when `self` and `other` agree on every symbol they share.
    pub fn is_compatible_with(&self, other: &VariableState) -> bool {
        self.values.iter().all(|(s, v)| other.values.get(s).map_or(true, |ov| ov == v))
    }

    /// Union of both assignments; `other` wins on overlap (only ever called
    /// on already-compatible pairs, so this never discards information).
    pub fn merge(&self, other: &VariableState) -> VariableState {
        let mut values = self.values.clone();
        values.extend(other.values.iter().map(|(&s, &v)| (s, v)));
        VariableState { values }
    }
}

impl fmt::Display for VariableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (s, v)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{s}={}", if *v { "T" } else { "F" })?;
        }
        write!(f, "}}")
    }
}

/// A set of variables and every total assignment over them that satisfies
/// the rule(s) the table represents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TruthTable {
    pub variables: BTreeSet<Symbol>,
    pub valid_states: BTreeSet<VariableState>,
}

impl TruthTable {
    pub fn new() -> Self {
        TruthTable::default()
    }

    /// Enumerates all `2^n` assignments over `vars(rule.lhs) ∪
    /// {rule.rhs_symbol}` and keeps those satisfying
    /// `lhs_value ⇒ (rhs_negated XOR rhs_value)`.
    pub fn from_basic_rule(rule: &BasicRule) -> ExpertResult<TruthTable> {
        let mut variables: BTreeSet<Symbol> = rule
            .lhs
            .iter()
            .flat_map(|b| b.tokens.iter().filter_map(|t| t.as_symbol()))
            .collect();
        variables.insert(rule.rhs_symbol);

        let var_list: Vec<Symbol> = variables.iter().copied().collect();
        let num_vars = var_list.len();
        let num_combinations = 1usize << num_vars;

        let mut valid_states = BTreeSet::new();
        for i in 0..num_combinations {
            let mut values = BTreeMap::new();
            for (j, &var) in var_list.iter().enumerate() {
                values.insert(var, (i >> j) & 1 == 1);
            }
            let lhs_val = eval(&rule.lhs, &values)?;
            let rhs_raw = values[&rule.rhs_symbol];
            let rhs_val = if rule.rhs_negated { !rhs_raw } else { rhs_raw };

            if !lhs_val || rhs_val {
                valid_states.insert(VariableState::from_map(values));
            }
        }

        Ok(TruthTable { variables, valid_states })
    }

    /// Retains only the states compatible with `known`.
    pub fn filter_by_facts(&self, known: &BTreeMap<Symbol, bool>) -> TruthTable {
        let known_state = VariableState::from_map(known.clone());
        let valid_states = self
            .valid_states
            .iter()
            .filter(|state| state.is_compatible_with(&known_state))
            .cloned()
            .collect();
        TruthTable {
            variables: self.variables.clone(),
            valid_states,
        }
    }

    /// Treats initial facts as known-true and definite (`TRUE`/`FALSE`)
    /// base results as known, ignoring `AMBIGUOUS`, then filters by them.
    pub fn filter_by_results(&self, initial_facts: &BTreeSet<Symbol>, base_results: &BTreeMap<Symbol, TriValue>) -> TruthTable {
        let mut known = BTreeMap::new();
        for &fact in initial_facts {
            known.insert(fact, true);
        }
        for (&symbol, &value) in base_results {
            match value {
                TriValue::True => {
                    known.insert(symbol, true);
                }
                TriValue::False => {
                    known.insert(symbol, false);
                }
                TriValue::Ambiguous => {}
            }
        }
        self.filter_by_facts(&known)
    }

    /// Joins `t1` and `t2`: the variable union, restricted to merged states
    /// where shared variables agree.
    pub fn conjunction(t1: &TruthTable, t2: &TruthTable) -> TruthTable {
        let mut variables = t1.variables.clone();
        variables.extend(t2.variables.iter().copied());

        let mut valid_states = BTreeSet::new();
        for s1 in &t1.valid_states {
            for s2 in &t2.valid_states {
                if s1.is_compatible_with(s2) {
                    valid_states.insert(s1.merge(s2));
                }
            }
        }
        TruthTable { variables, valid_states }
    }

    /// Folds `conjunction` over `tables`, bailing out as soon as the
    /// running result has no valid state left.
    pub fn conjunction_all(tables: &[TruthTable]) -> TruthTable {
        let mut iter = tables.iter();
        let Some(first) = iter.next() else {
            return TruthTable::new();
        };
        let mut result = first.clone();
        for table in iter {
            result = TruthTable::conjunction(&result, table);
            if !result.has_valid_state() {
                break;
            }
        }
        result
    }

    fn possible_values(&self, var: Symbol) -> BTreeSet<bool> {
        self.valid_states.iter().filter_map(|s| s.values.get(&var).copied()).collect()
    }

    pub fn must_be_true(&self, var: Symbol) -> bool {
        let possible = self.possible_values(var);
        possible.len() == 1 && possible.contains(&true)
    }

    pub fn must_be_false(&self, var: Symbol) -> bool {
        let possible = self.possible_values(var);
        possible.len() == 1 && possible.contains(&false)
    }

    /// Narrows `current` to a definite value when every valid state agrees
    /// on `var`; otherwise leaves `current` untouched.
    pub fn clamp(&self, var: Symbol, current: TriValue) -> TriValue {
        if self.must_be_true(var) {
            TriValue::True
        } else if self.must_be_false(var) {
            TriValue::False
        } else {
            current
        }
    }

    /// Non-empty `valid_states`; an empty table with non-empty `variables`
    /// denotes a contradiction.
    pub fn has_valid_state(&self) -> bool {
        !self.valid_states.is_empty()
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variables.is_empty() {
            return writeln!(f, "Empty truth table");
        }
        for var in &self.variables {
            write!(f, "{var} | ")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(self.variables.len() * 4))?;
        if self.valid_states.is_empty() {
            return writeln!(f, "(No valid states - contradiction!)");
        }
        for state in &self.valid_states {
            for var in &self.variables {
                match state.values.get(var) {
                    Some(true) => write!(f, "T | ")?,
                    Some(false) => write!(f, "F | ")?,
                    None => write!(f, "? | ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "\nTotal valid states: {}", self.valid_states.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TokenBlock;
    use crate::token::TokenEffect;

    fn sym(c: char) -> Symbol {
        Symbol::new(c).unwrap()
    }
    fn tok(c: char) -> TokenEffect {
        TokenEffect::Symbol(sym(c))
    }

    #[test]
    fn from_basic_rule_keeps_only_satisfying_assignments() {
        // A => B: forbids A=true,B=false; keeps the other three combinations.
        let lhs = vec![TokenBlock::with_tokens(0, vec![tok('A')])];
        let rule = BasicRule::new(lhs, sym('B'), false, None);
        let table = TruthTable::from_basic_rule(&rule).unwrap();
        assert_eq!(table.valid_states.len(), 3);
        let forbidden = VariableState::from_map(BTreeMap::from([(sym('A'), true), (sym('B'), false)]));
        assert!(!table.valid_states.contains(&forbidden));
    }

    #[test]
    fn conjunction_is_commutative() {
        let lhs = vec![TokenBlock::with_tokens(0, vec![tok('A')])];
        let t1 = TruthTable::from_basic_rule(&BasicRule::new(lhs.clone(), sym('B'), false, None)).unwrap();
        let t2 = TruthTable::from_basic_rule(&BasicRule::new(lhs, sym('C'), false, None)).unwrap();
        assert_eq!(
            TruthTable::conjunction(&t1, &t2).valid_states,
            TruthTable::conjunction(&t2, &t1).valid_states
        );
    }

    #[test]
    fn contradictory_rules_yield_empty_conjunction() {
        // A => B  and  A => !B, conjoined: the A=true row has no surviving B.
        let lhs = vec![TokenBlock::with_tokens(0, vec![tok('A')])];
        let t1 = TruthTable::from_basic_rule(&BasicRule::new(lhs.clone(), sym('B'), false, None)).unwrap();
        let t2 = TruthTable::from_basic_rule(&BasicRule::new(lhs, sym('B'), true, None)).unwrap();
        let joined = TruthTable::conjunction(&t1, &t2);
        // Only A=false survives, since A=true forces both B=true and B=false.
        assert!(joined.valid_states.iter().all(|s| s.values[&sym('A')] == false));
        assert!(joined.must_be_false(sym('A')));
    }

    #[test]
    fn clamp_returns_current_when_both_values_possible() {
        let lhs = vec![TokenBlock::with_tokens(0, vec![tok('A')])];
        let table = TruthTable::from_basic_rule(&BasicRule::new(lhs, sym('B'), false, None)).unwrap();
        assert_eq!(table.clamp(sym('A'), TriValue::Ambiguous), TriValue::Ambiguous);
    }
}
