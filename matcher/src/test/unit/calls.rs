use std::sync::Arc;

use dfpat_ir::Expr;
use test_case::test_case;

use crate::config::MatchConfig;
use crate::pattern::*;
use crate::{DFPatternMatcher, match_pattern};

fn var_call(op: &str) -> (Arc<Expr>, Arc<Expr>, Arc<Expr>) {
    let x = Expr::var("x");
    let c = Expr::scalar(2.0f32);
    (x.clone(), c.clone(), Expr::call_op(op, vec![x, c]))
}

#[test_case("add", true)]
#[test_case("multiply", true)]
#[test_case("subtract", false)]
#[test_case("divide", false)]
fn test_commutative_retry(op: &str, commutes: bool) {
    let (_, _, call) = var_call(op);
    let swapped = is_op(op).call(vec![is_const(), is_var("x")]);
    assert_eq!(match_pattern(&swapped, &call), commutes);
    assert!(match_pattern(&is_op(op).call(vec![is_var("x"), is_const()]), &call));
}

#[test]
fn test_commutative_retry_binds_swapped() {
    let (x, c, call) = var_call("add");
    let lhs = is_const();
    let rhs = wildcard();
    let mut matcher = DFPatternMatcher::new();
    assert!(matcher.matches(&is_op("add").call(vec![lhs.clone(), rhs.clone()]), &call));
    assert_eq!(matcher.state().get(&lhs).map(|e| e.id), Some(c.id));
    assert_eq!(matcher.state().get(&rhs).map(|e| e.id), Some(x.id));
}

#[test]
fn test_commutative_disabled() {
    let (_, _, call) = var_call("add");
    let swapped = is_op("add").call(vec![is_const(), is_var("x")]);
    let config = MatchConfig::builder().commutative(false).build();
    assert!(!DFPatternMatcher::new().with_config(config).matches(&swapped, &call));
}

#[test]
fn test_arity_and_any_args() {
    let (_, _, call) = var_call("add");
    assert!(match_pattern(&is_op("add").call_any(), &call));
    assert!(!match_pattern(&is_op("add").call(vec![wildcard()]), &call));
    assert!(!match_pattern(&is_op("multiply").call_any(), &call));
    assert!(!match_pattern(&is_op("add").call_any(), &Expr::var("x")));
}

#[test]
fn test_callee_pattern() {
    let gemm = Expr::call(Expr::extern_func("cblas_gemm"), vec![Expr::var("a"), Expr::var("b")]);
    assert!(match_pattern(&is_extern("cblas_gemm").call(vec![wildcard(), wildcard()]), &gemm));
    assert!(match_pattern(&wildcard().call_any(), &gemm));
    assert!(!match_pattern(&is_op("nn.dense").call_any(), &gemm));
}

/// `divide(multiply(A, B), C)` and `multiply(divide(p, r), q)` compute the same value.
#[test]
fn test_divide_over_multiply() {
    let (p, q, r) = (Expr::var("p"), Expr::var("q"), Expr::var("r"));
    let expr = Expr::call_op("multiply", vec![Expr::call_op("divide", vec![p.clone(), r.clone()]), q.clone()]);

    let (a, b, c) = (wildcard(), wildcard(), wildcard());
    let product = is_op("multiply").call(vec![a.clone(), b.clone()]);
    let pattern = is_op("divide").call(vec![product.clone(), c.clone()]);

    let mut matcher = DFPatternMatcher::new();
    assert!(matcher.matches(&pattern, &expr));
    let bound = |p: &DFPattern| matcher.state().get(p).map(|e| e.id);
    assert_eq!(bound(&a), Some(p.id));
    assert_eq!(bound(&b), Some(q.id));
    assert_eq!(bound(&c), Some(r.id));
    // Only the re-associated copies were matched, never the inner product itself.
    assert!(matcher.state().contains(&pattern));
    assert!(!matcher.state().contains(&product));
}

#[test]
fn test_divide_over_multiply_second_operand() {
    let (p, q, r) = (Expr::var("p"), Expr::var("q"), Expr::var("r"));
    let expr = Expr::call_op("multiply", vec![q, Expr::call_op("divide", vec![p, r])]);
    let pattern =
        is_op("divide").call(vec![is_op("multiply").call(vec![is_var("p"), is_var("q")]), is_var("r")]);
    assert!(match_pattern(&pattern, &expr));
}

#[test]
fn test_multiply_over_divide() {
    let (p, q, r) = (Expr::var("p"), Expr::var("q"), Expr::var("r"));
    // (p * q) / r
    let expr = Expr::call_op("divide", vec![Expr::call_op("multiply", vec![p, q]), r]);
    // (p / r) * q
    let pattern = is_op("multiply").call(vec![is_op("divide").call(vec![is_var("p"), is_var("r")]), is_var("q")]);
    assert!(match_pattern(&pattern, &expr));

    // q * (p / r)
    let pattern = is_op("multiply").call(vec![is_var("q"), is_op("divide").call(vec![is_var("p"), is_var("r")])]);
    assert!(match_pattern(&pattern, &expr));
}

#[test]
fn test_reassociation_needs_matching_operands() {
    let (p, q, r) = (Expr::var("p"), Expr::var("q"), Expr::var("r"));
    let expr = Expr::call_op("multiply", vec![Expr::call_op("divide", vec![p, r]), q]);
    let pattern =
        is_op("divide").call(vec![is_op("multiply").call(vec![is_var("p"), is_var("q")]), is_var("zzz")]);
    let mut matcher = DFPatternMatcher::new();
    assert!(!matcher.matches(&pattern, &expr));
    assert!(matcher.state().is_empty());

    // Plain multiply without a divide operand is not re-associated.
    let plain = Expr::call_op("multiply", vec![Expr::var("p"), Expr::var("q")]);
    let pattern = is_op("divide").call(vec![is_op("multiply").call(vec![wildcard(), wildcard()]), wildcard()]);
    assert!(!match_pattern(&pattern, &plain));
}

#[test]
fn test_associative_disabled() {
    let (p, q, r) = (Expr::var("p"), Expr::var("q"), Expr::var("r"));
    let expr = Expr::call_op("multiply", vec![Expr::call_op("divide", vec![p, r]), q]);
    let pattern = is_op("divide").call(vec![is_op("multiply").call(vec![wildcard(), wildcard()]), wildcard()]);

    assert!(match_pattern(&pattern, &expr));
    let config = MatchConfig::builder().associative(false).build();
    assert!(!DFPatternMatcher::new().with_config(config).matches(&pattern, &expr));
}

#[test]
fn test_callee_pattern_reused_across_calls() {
    let (a, b, c) = (Expr::var("a"), Expr::var("b"), Expr::var("c"));
    let expr = Expr::call_op("add", vec![Expr::call_op("add", vec![a, b]), c]);
    let add = is_op("add");
    let pattern = add.call(vec![add.call(vec![wildcard(), wildcard()]), wildcard()]);

    let mut matcher = DFPatternMatcher::new();
    assert!(matcher.matches(&pattern, &expr));
    assert_eq!(matcher.state().get(&add).map(|e| e.id), Some(Expr::op("add").id));

    // The shared callee still refuses a call to a different operator.
    let inner = Expr::call_op("multiply", vec![Expr::var("a"), Expr::var("b")]);
    let mixed = Expr::call_op("add", vec![inner, Expr::var("c")]);
    assert!(!match_pattern(&pattern, &mixed));
}
