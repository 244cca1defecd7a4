//! Strategies for small dataflow graphs and patterns over them.

use std::sync::Arc;

use dfpat_dtype::test::generators::scalar_dtype;
use dfpat_ir::{ConstValue, DType, Expr};
use proptest::prelude::*;

use crate::pattern::*;

pub fn arb_leaf() -> impl Strategy<Value = Arc<Expr>> {
    prop_oneof![
        prop::sample::select(&["x", "y", "z"][..]).prop_map(Expr::var),
        (scalar_dtype(), -8i64..=8)
            .prop_map(|(scalar, v)| Expr::constant(DType::Scalar(scalar), Vec::<usize>::new(), [ConstValue::Int(v)])),
        Just(()).prop_map(|_| Expr::extern_func("cblas_gemm")),
    ]
}

pub fn arb_expr() -> impl Strategy<Value = Arc<Expr>> {
    arb_leaf().prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::call_op("add", vec![a, b])),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::call_op("multiply", vec![a, b])),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::call_op("subtract", vec![a, b])),
            inner.clone().prop_map(|a| Expr::call_op("nn.relu", vec![a])),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Expr::tuple),
            (inner.clone(), inner, any::<bool>())
                .prop_map(|(a, b, second)| Expr::tuple_get_item(Expr::tuple(vec![a, b]), usize::from(second))),
        ]
    })
}

/// Patterns that never look at types or shapes.
pub fn arb_structural_pattern() -> impl Strategy<Value = DFPattern> {
    let leaf = prop_oneof![
        Just(()).prop_map(|_| wildcard()),
        Just(()).prop_map(|_| is_const()),
        Just(()).prop_map(|_| is_var("")),
        Just(()).prop_map(|_| is_extern("")),
        Just(()).prop_map(|_| is_tuple_any()),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (prop::sample::select(&["add", "multiply", "subtract"][..]), inner.clone(), inner.clone())
                .prop_map(|(op, a, b)| is_op(op).call(vec![a, b])),
            inner.clone().prop_map(|a| is_op("nn.relu").call(vec![a])),
            Just(()).prop_map(|_| is_op("add").call_any()),
            (inner.clone(), -1i64..=1).prop_map(|(t, i)| is_tuple_get_item(t, i)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a | b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a & b),
            inner.prop_map(|a| !a),
        ]
    })
}
