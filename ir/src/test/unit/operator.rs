use std::sync::Arc;

use test_case::test_case;

use crate::Expr;
use crate::operator::{OpPattern, Operator, TOP_PATTERN};
use crate::types::RetValue;

#[test_case("add", true)]
#[test_case("multiply", true)]
#[test_case("subtract", false)]
#[test_case("divide", false)]
#[test_case("nn.relu", false)]
fn test_commutative(name: &str, expected: bool) {
    assert_eq!(Operator::get(name).unwrap().is_commutative(), expected);
}

#[test]
fn test_operators_are_interned() {
    let a = Operator::get("nn.conv2d").unwrap();
    let b = Operator::get("nn.conv2d").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.num_inputs(), Some(2));
}

#[test]
fn test_register_is_idempotent() {
    let first = Operator::register("test.custom_op", Some(3));
    let second = Operator::register("test.custom_op", None);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.num_inputs(), Some(3));
}

#[test]
fn test_builtin_op_pattern() {
    assert!(Operator::has_attr_map(TOP_PATTERN));
    let relu = Operator::get("nn.relu").unwrap();
    assert!(matches!(relu.get_attr(TOP_PATTERN), Some(RetValue::Int(v)) if v == OpPattern::ElemWise as i64));
}

#[test]
fn test_attr_maps() {
    assert!(!Operator::has_attr_map("test.NeverSet"));

    let op = Operator::register("test.attr_holder", Some(1));
    op.set_attr("test.FLayout", "NHWC");
    assert!(Operator::has_attr_map("test.FLayout"));
    assert!(matches!(op.get_attr("test.FLayout"), Some(RetValue::Str(s)) if s == "NHWC"));

    // The map exists, but other operators have no entry in it.
    assert!(Operator::get("add").unwrap().get_attr("test.FLayout").is_none());
}

#[test]
fn test_op_expressions_are_interned() {
    let a = Expr::op("multiply");
    let b = Expr::op("multiply");
    assert!(Arc::ptr_eq(&a, &b));
    assert_ne!(a.id, Expr::op("add").id);

    let call = Expr::call_op("multiply", vec![Expr::var("x"), Expr::var("y")]);
    assert_eq!(call.children()[0].id, a.id);
}
