//! Block-priority reduction shared by the two-valued evaluator (§4.2) and
//! the tri-valued evaluator (§4.5): repeatedly execute the innermost
//! (highest-priority) block and splice its result into the block that
//! encloses it.

use crate::block::Expression;
use crate::error::{ExpertError, ExpertResult};
use crate::symbol::{Symbol, TriValue};
use crate::token::TokenEffect;
use std::collections::BTreeMap;

/// The four Kleene/boolean connectives, implemented once for `bool` and
/// once for [`TriValue`] so the reduction engine below is written exactly
/// once.
pub trait Logic: Copy {
    fn not(self) -> Self;
    fn and(self, other: Self) -> Self;
    fn or(self, other: Self) -> Self;
    fn xor(self, other: Self) -> Self;
}

impl Logic for bool {
    fn not(self) -> bool {
        !self
    }
    fn and(self, other: bool) -> bool {
        self && other
    }
    fn or(self, other: bool) -> bool {
        self || other
    }
    fn xor(self, other: bool) -> bool {
        self != other
    }
}

impl Logic for TriValue {
    fn not(self) -> TriValue {
        TriValue::not(self)
    }
    fn and(self, other: TriValue) -> TriValue {
        TriValue::and(self, other)
    }
    fn or(self, other: TriValue) -> TriValue {
        TriValue::or(self, other)
    }
    fn xor(self, other: TriValue) -> TriValue {
        TriValue::xor(self, other)
    }
}

/// One cell inside a block being reduced: an as-yet-unresolved symbol, an
/// operator awaiting operands, or an already-computed value (either an
/// operator's result or a spliced-in sub-block result).
#[derive(Clone, Copy)]
enum Item<V> {
    Sym(Symbol),
    Op(TokenEffect),
    Val(V),
}

fn arity_error(msg: &str) -> ExpertError {
    ExpertError::Arity(msg.to_string())
}

/// Resolves an `Item` to a value, looking up bare symbols through
/// `resolve` under the supplied context.
fn resolve_item<V: Logic>(item: Item<V>, context: bool, resolve: &mut impl FnMut(Symbol, bool) -> ExpertResult<V>) -> ExpertResult<V> {
    match item {
        Item::Val(v) => Ok(v),
        Item::Sym(s) => resolve(s, context),
        Item::Op(op) => Err(arity_error(&format!("operator {op} has no var attached"))),
    }
}

fn execute_not<V: Logic>(items: &mut Vec<Item<V>>, context: bool, resolve: &mut impl FnMut(Symbol, bool) -> ExpertResult<V>) -> ExpertResult<()> {
    let mut i = 0;
    while i < items.len() {
        if matches!(items[i], Item::Op(TokenEffect::Not)) {
            if i + 1 == items.len() {
                return Err(arity_error("operator ! has no var attached"));
            }
            let operand = items[i + 1];
            let value = resolve_item(operand, !context, resolve)?.not();
            items[i + 1] = Item::Val(value);
            items.remove(i);
            if i > 0 {
                i -= 1;
            }
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn execute_binary<V: Logic>(
    items: &mut Vec<Item<V>>,
    op_target: TokenEffect,
    context: bool,
    resolve: &mut impl FnMut(Symbol, bool) -> ExpertResult<V>,
    combine: impl Fn(V, V) -> V,
) -> ExpertResult<()> {
    let mut i = 0;
    while i < items.len() {
        if matches!(items[i], Item::Op(op) if op == op_target) {
            if i == 0 || i + 1 == items.len() {
                return Err(arity_error(&format!("operator {op_target} has no var attached")));
            }
            let left = resolve_item(items[i - 1], context, resolve)?;
            let right = resolve_item(items[i + 1], context, resolve)?;
            let value = combine(left, right);
            items[i] = Item::Val(value);
            items.remove(i + 1);
            items.remove(i - 1);
            if i > 0 {
                i -= 1;
            }
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Reduces one block (single priority level) to a single value, executing
/// `!` first, then `^`, `|`, `+` — the order the original resolver and
/// token-block reducer both use consistently. After §4.1 normalization a
/// block never mixes operator kinds, so the relative order among `^`/`|`/`+`
/// never actually matters; only `!` running first is load-bearing.
fn execute_block<V: Logic>(items: &mut Vec<Item<V>>, context: bool, resolve: &mut impl FnMut(Symbol, bool) -> ExpertResult<V>) -> ExpertResult<V> {
    if items.is_empty() {
        return Err(arity_error("empty block"));
    }
    execute_not(items, context, resolve)?;
    execute_binary(items, TokenEffect::Xor, context, resolve, V::xor)?;
    execute_binary(items, TokenEffect::Or, context, resolve, V::or)?;
    execute_binary(items, TokenEffect::And, context, resolve, V::and)?;
    if items.len() != 1 {
        return Err(arity_error("reduction did not converge"));
    }
    resolve_item(items[0], context, resolve)
}

/// Reduces a whole expression (possibly several blocks at different
/// priorities) to one value: repeatedly execute the highest-priority
/// block and splice its result into the neighboring block that encloses
/// it, until one block remains.
fn reduce_expression<V: Logic>(expr: &Expression, context: bool, resolve: &mut impl FnMut(Symbol, bool) -> ExpertResult<V>) -> ExpertResult<V> {
    if expr.is_empty() {
        return Err(arity_error("empty expression"));
    }

    let mut blocks: Vec<(u32, Vec<Item<V>>)> = expr
        .iter()
        .map(|b| {
            let items = b
                .tokens
                .iter()
                .map(|t| match *t {
                    TokenEffect::Symbol(s) => Item::Sym(s),
                    op => Item::Op(op),
                })
                .collect();
            (b.priority, items)
        })
        .collect();

    loop {
        let max_priority = blocks.iter().map(|(p, _)| *p).max().unwrap_or(0);
        let mut i = 0;
        while i < blocks.len() {
            if blocks[i].0 == max_priority {
                let value = execute_block(&mut blocks[i].1, context, resolve)?;
                if i != 0 {
                    blocks[i - 1].1.push(Item::Val(value));
                    blocks.remove(i);
                    continue;
                } else if blocks.len() > 1 {
                    blocks[1].1.insert(0, Item::Val(value));
                    blocks.remove(0);
                    continue;
                } else {
                    blocks[i].0 = 0;
                    blocks[i].1 = vec![Item::Val(value)];
                }
            }
            i += 1;
        }
        if blocks.len() == 1 {
            if blocks[0].1.len() > 1 {
                return execute_block(&mut blocks[0].1, context, resolve);
            }
            return resolve_item(blocks[0].1[0], context, resolve);
        }
    }
}

/// Two-valued evaluation of `expr` under a total `assignment`. Symbols
/// absent from `assignment` default to `false`, per `spec.md` §4.2.
pub fn eval(expr: &Expression, assignment: &BTreeMap<Symbol, bool>) -> ExpertResult<bool> {
    let mut resolve = |s: Symbol, _context: bool| Ok(assignment.get(&s).copied().unwrap_or(false));
    reduce_expression(expr, false, &mut resolve)
}

/// Tri-valued evaluation of `expr`, resolving each symbol through `prove`
/// under the given `negated_context`. `prove` is the caller's closure into
/// the resolver (`crate::resolver::Resolver::prove`), kept generic (and
/// fallible, since `prove` can bubble up an `ExpertError::Arity`) so this
/// module stays free of any dependency on the resolver's memo state.
pub fn eval_tri(expr: &Expression, negated_context: bool, prove: &mut impl FnMut(Symbol, bool) -> ExpertResult<TriValue>) -> ExpertResult<TriValue> {
    reduce_expression(expr, negated_context, prove)
}
