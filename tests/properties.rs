//! Property-based checks over the truth-table/resolver machinery, using
//! proptest the way the teacher repo's `tests/property_arithmetic.rs` does:
//! small generators over the domain, invariants that must hold for every
//! generated case.

use expert_system::block::TokenBlock;
use expert_system::normalize::deduce_basics;
use expert_system::resolver::Resolver;
use expert_system::rule::{BasicRule, LogicRule};
use expert_system::symbol::{Symbol, TriValue};
use expert_system::token::{Arrow, TokenEffect};
use expert_system::truth_table::{TruthTable, VariableState};
use expert_system::Program;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn sym(c: char) -> Symbol {
    Symbol::new(c).unwrap()
}

fn letters() -> impl Strategy<Value = char> {
    prop::sample::select(('A'..='F').collect::<Vec<_>>())
}

proptest! {
    /// Any symbol listed as an initial fact is provable as True no matter
    /// what rules exist alongside it (spec.md §4.4: initial facts are a
    /// fixpoint of `prove`).
    #[test]
    fn initial_facts_are_always_fixpoints(facts in prop::collection::btree_set(letters(), 0..6)) {
        let facts: BTreeSet<Symbol> = facts.into_iter().map(sym).collect();
        let rules: Vec<BasicRule> = Vec::new();
        let mut resolver = Resolver::new(&rules, facts.clone());
        for &f in &facts {
            prop_assert_eq!(resolver.prove(f, false).unwrap(), TriValue::True);
        }
    }

    /// Conjoining two truth tables is commutative: swapping the order of
    /// the two source rules never changes the resulting valid-state set.
    #[test]
    fn truth_table_conjunction_is_commutative(a in letters(), b in letters(), c in letters()) {
        prop_assume!(a != b && b != c && a != c);
        let lhs_a = vec![expert_system::block::TokenBlock::with_tokens(
            0,
            vec![expert_system::token::TokenEffect::Symbol(sym(a))],
        )];
        let lhs_b = vec![expert_system::block::TokenBlock::with_tokens(
            0,
            vec![expert_system::token::TokenEffect::Symbol(sym(b))],
        )];
        let t1 = TruthTable::from_basic_rule(&BasicRule::new(lhs_a, sym(b), false, None)).unwrap();
        let t2 = TruthTable::from_basic_rule(&BasicRule::new(lhs_b, sym(c), false, None)).unwrap();
        prop_assert_eq!(
            TruthTable::conjunction(&t1, &t2).valid_states,
            TruthTable::conjunction(&t2, &t1).valid_states
        );
    }

    /// A cyclic rule base over disjoint symbol pairs never panics or
    /// diverges: `prove` always terminates with some tri-value.
    #[test]
    fn cyclic_rule_bases_never_diverge(a in letters(), b in letters()) {
        prop_assume!(a != b);
        let lhs_a = vec![expert_system::block::TokenBlock::with_tokens(
            0,
            vec![expert_system::token::TokenEffect::Symbol(sym(a))],
        )];
        let lhs_b = vec![expert_system::block::TokenBlock::with_tokens(
            0,
            vec![expert_system::token::TokenEffect::Symbol(sym(b))],
        )];
        let rules = vec![
            BasicRule::new(lhs_a, sym(b), false, None),
            BasicRule::new(lhs_b, sym(a), false, None),
        ];
        let mut resolver = Resolver::new(&rules, BTreeSet::new());
        let _ = resolver.prove(sym(a), false).unwrap();
    }

    /// `A <=> B` parsed and resolved must answer the same way whichever
    /// side is given as the initial fact and queried back (idempotence of
    /// equivalence under round-tripping through the full pipeline).
    #[test]
    fn equivalence_is_symmetric(a in letters(), b in letters()) {
        prop_assume!(a != b);
        let source = format!("{a} <=> {b}\n= {a}\n? {b}\n");
        let program = Program::build(&source).unwrap();
        let mut resolver = Resolver::new(&program.basic_rules, program.initial_facts.clone());
        let answers = resolver.resolve(&program.queries, &program.truth_table).unwrap();
        prop_assert_eq!(answers[&sym(b)], TriValue::True);

        let source_rev = format!("{a} <=> {b}\n= {b}\n? {a}\n");
        let program_rev = Program::build(&source_rev).unwrap();
        let mut resolver_rev = Resolver::new(&program_rev.basic_rules, program_rev.initial_facts.clone());
        let answers_rev = resolver_rev.resolve(&program_rev.queries, &program_rev.truth_table).unwrap();
        prop_assert_eq!(answers_rev[&sym(a)], TriValue::True);
    }

    /// Clamping a base result against a truth table can only ever replace
    /// an Ambiguous conclusion with a definite one, never overturn an
    /// already-definite True/False base result with the opposite value.
    #[test]
    fn clamping_never_contradicts_a_definite_base_result(forced in any::<bool>()) {
        let mut table = TruthTable::new();
        table.variables.insert(sym('A'));
        let mut state = expert_system::truth_table::VariableState::new();
        state.values.insert(sym('A'), forced);
        table.valid_states.insert(state);

        let base = if forced { TriValue::True } else { TriValue::False };
        let clamped = table.clamp(sym('A'), base);
        prop_assert_eq!(clamped, base);
    }

    /// `deduce_basics(A <=> B)` deduces the same set of basic rules (up to
    /// origin, which is cosmetically suppressed differently in each case)
    /// as the union of `deduce_basics(A => B)` and `deduce_basics(B => A)`
    /// (spec.md §8, idempotence of equivalence).
    #[test]
    fn equivalence_deduction_matches_union_of_both_directions(a in letters(), b in letters()) {
        prop_assume!(a != b);

        let sym_expr = |c: char| vec![TokenBlock::with_tokens(0, vec![TokenEffect::Symbol(sym(c))])];
        let basic_key = |rule: &BasicRule| format!("{:?}|{}|{}", rule.lhs, rule.rhs_symbol, rule.rhs_negated);

        let rule_iff = LogicRule::new(sym_expr(a), Arrow::Iff, sym_expr(b));
        let combined: BTreeSet<String> = deduce_basics(&rule_iff, 0).iter().map(basic_key).collect();

        let rule_fwd = LogicRule::new(sym_expr(a), Arrow::Implies, sym_expr(b));
        let rule_bwd = LogicRule::new(sym_expr(b), Arrow::Implies, sym_expr(a));
        let mut separate: BTreeSet<String> = deduce_basics(&rule_fwd, 0).iter().map(basic_key).collect();
        separate.extend(deduce_basics(&rule_bwd, 0).iter().map(basic_key));

        prop_assert_eq!(combined, separate);
    }

    /// A randomly sampled satisfying assignment of a basic rule is always
    /// in `from_basic_rule(rule).valid_states`, and the corresponding
    /// falsifying assignment (same LHS, opposite RHS) never is (spec.md §8,
    /// truth-table completeness).
    #[test]
    fn truth_table_contains_satisfying_excludes_falsifying(a in letters(), b in letters(), negate_rhs in any::<bool>()) {
        prop_assume!(a != b);

        let lhs = vec![TokenBlock::with_tokens(0, vec![TokenEffect::Symbol(sym(a))])];
        let rule = BasicRule::new(lhs, sym(b), negate_rhs, None);
        let table = TruthTable::from_basic_rule(&rule).unwrap();

        // With the LHS forced true, the rule demands rhs_raw == !negate_rhs.
        let satisfying = VariableState::from_map(BTreeMap::from([(sym(a), true), (sym(b), !negate_rhs)]));
        let falsifying = VariableState::from_map(BTreeMap::from([(sym(a), true), (sym(b), negate_rhs)]));

        prop_assert!(table.valid_states.contains(&satisfying));
        prop_assert!(!table.valid_states.contains(&falsifying));
    }
}
