use test_case::test_case;

use crate::arith::{Analyzer, ArithAnalyzer};
use crate::error::Error;
use crate::prim::{PrimExpr, SymVar};

fn n() -> (SymVar, PrimExpr) {
    let var = SymVar::new("n");
    let expr = PrimExpr::from(&var);
    (var, expr)
}

#[test]
fn test_linear_identities() {
    let (_, n) = n();
    let analyzer = ArithAnalyzer::new();
    assert!(analyzer.can_prove_equal(&(n.clone() * 4), &(n.clone() * 2 + n.clone() * 2)));
    assert!(analyzer.can_prove_equal(&(n.clone() + 3 - 3), &n));
    assert!(!analyzer.can_prove_equal(&(n.clone() * 2), &(n.clone() + 2)));
}

#[test]
fn test_distinct_vars_with_same_name() {
    let a = PrimExpr::from(SymVar::new("n"));
    let b = PrimExpr::from(SymVar::new("n"));
    assert!(!ArithAnalyzer::new().can_prove_equal(&a, &b));
}

#[test_case(PrimExpr::from(7).floordiv(2), 3; "floordiv positive")]
#[test_case(PrimExpr::from(-7).floordiv(2), -4; "floordiv rounds down")]
#[test_case(PrimExpr::from(-7).floormod(2), 1; "floormod sign follows divisor")]
#[test_case(PrimExpr::from(7).floormod(-2), -1; "floormod negative divisor")]
#[test_case(PrimExpr::from(3).min(9), 3; "min")]
#[test_case(PrimExpr::from(3).max(9), 9; "max")]
fn test_constant_folding(expr: PrimExpr, expected: i64) {
    assert_eq!(ArithAnalyzer::new().const_value(&expr), Some(expected));
}

#[test_case(PrimExpr::from(i64::MAX) + 1, PrimExpr::from(i64::MIN); "add wraps")]
#[test_case(PrimExpr::from(i64::MIN) - 1, PrimExpr::from(i64::MAX); "sub wraps")]
#[test_case(PrimExpr::from(i64::MAX) * 2, PrimExpr::from(-2); "mul wraps")]
#[test_case(PrimExpr::from(i64::MIN).floordiv(-1), PrimExpr::from(i64::MIN); "floordiv wraps")]
fn test_overflow_is_not_provable(lhs: PrimExpr, rhs: PrimExpr) {
    let analyzer = ArithAnalyzer::new();
    assert!(!analyzer.can_prove_equal(&lhs, &rhs));
    assert!(!analyzer.can_prove_equal(&lhs, &lhs));
    assert_eq!(analyzer.const_value(&lhs), None);
}

#[test]
fn test_extreme_constants_without_overflow() {
    let (_, n) = n();
    let analyzer = ArithAnalyzer::new();
    let min = PrimExpr::from(i64::MIN);
    assert!(analyzer.can_prove_equal(&min, &PrimExpr::from(i64::MIN)));
    assert!(analyzer.can_prove_equal(&(n.clone() + i64::MAX), &(PrimExpr::from(i64::MAX) + n.clone())));
    assert_eq!(analyzer.const_value(&(PrimExpr::from(i64::MAX) - 1 + 1)), Some(i64::MAX));
    assert_eq!(analyzer.const_value(&min.floormod(-1)), None);
}

#[test]
fn test_opaque_terms_compare_by_normal_form() {
    let (_, n) = n();
    let analyzer = ArithAnalyzer::new();
    let a = (n.clone() + 1).floordiv(n.clone());
    let b = (PrimExpr::from(1) + n.clone()).floordiv(n.clone() * 1);
    assert!(analyzer.can_prove_equal(&a, &b));
    assert!(!analyzer.can_prove_equal(&a, &(n.clone() + 1)));
}

#[test]
fn test_trivial_division() {
    let (_, n) = n();
    let analyzer = ArithAnalyzer::new();
    assert!(analyzer.can_prove_equal(&n.clone().floordiv(1), &n));
    assert_eq!(analyzer.const_value(&n.clone().floormod(1)), Some(0));
    assert!(analyzer.can_prove_equal(&n.clone().min(n.clone()), &n));
}

#[test]
fn test_bound_variables() {
    let (var, n) = n();
    let m = SymVar::new("m");
    let mut analyzer = ArithAnalyzer::new();
    analyzer.bind(&var, 16).unwrap();
    analyzer.bind(&m, n.clone() * 2).unwrap();

    assert_eq!(analyzer.const_value(&PrimExpr::from(&m)), Some(32));
    assert_eq!(analyzer.bound_value(&m), Some(PrimExpr::from(16) * 2));
    assert!(analyzer.can_prove_equal(&n, &PrimExpr::from(16)));
    assert_eq!(analyzer.bound_value(&SymVar::new("k")), None);
}

#[test]
fn test_cyclic_binding_rejected() {
    let (var, n) = n();
    let m = SymVar::new("m");
    let mut analyzer = ArithAnalyzer::new();
    analyzer.bind(&m, n.clone() + 1).unwrap();

    let err = analyzer.bind(&var, PrimExpr::from(&m) * 2).unwrap_err();
    assert!(matches!(err, Error::CyclicBinding { .. }));
    assert!(matches!(analyzer.bind(&var, n + 1), Err(Error::CyclicBinding { .. })));
}

#[test]
fn test_shapes_equal() {
    let (_, n) = n();
    let analyzer = ArithAnalyzer::new();
    let a = [n.clone() * 2, PrimExpr::from(3)];
    let b = [n.clone() + n.clone(), PrimExpr::from(1) + 2];
    assert!(analyzer.shapes_equal(&a, &b));
    assert!(!analyzer.shapes_equal(&a, &b[..1]));
}
