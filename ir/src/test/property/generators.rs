//! Strategies for symbolic integer expressions.

use once_cell::sync::Lazy;
use proptest::prelude::*;

use crate::prim::{PrimExpr, SymVar};

/// Fixed pool of symbolic variables shared by every generated expression.
pub static SYM_VARS: Lazy<[SymVar; 3]> = Lazy::new(|| [SymVar::new("n"), SymVar::new("m"), SymVar::new("k")]);

pub fn arb_leaf() -> impl Strategy<Value = PrimExpr> {
    prop_oneof![
        (-20i64..=20).prop_map(PrimExpr::Int),
        (0usize..3).prop_map(|i| PrimExpr::Var(SYM_VARS[i].clone())),
    ]
}

/// Expressions built from `+`, `-` and `*` only; the prover is complete on these.
pub fn arb_linear_expr() -> impl Strategy<Value = PrimExpr> {
    arb_leaf().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a + b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a - b),
            (inner.clone(), inner).prop_map(|(a, b)| a * b),
        ]
    })
}

/// Variable-free expressions using every operator.
pub fn arb_const_expr() -> impl Strategy<Value = PrimExpr> {
    (-50i64..=50).prop_map(PrimExpr::Int).prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a + b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a - b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a * b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.min(b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.max(b)),
            (inner.clone(), prop_oneof![-7i64..=-1, 1i64..=7]).prop_map(|(a, b)| a.floordiv(b)),
            (inner, prop_oneof![-7i64..=-1, 1i64..=7]).prop_map(|(a, b)| a.floormod(b)),
        ]
    })
}
