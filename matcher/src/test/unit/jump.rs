use std::sync::Arc;

use dfpat_ir::Expr;

use crate::config::MatchConfig;
use crate::pattern::*;
use crate::{DFPatternMatcher, VarBindings, match_pattern, match_with_bindings};

fn bind(bindings: &mut VarBindings, var: &Arc<Expr>, value: Arc<Expr>) {
    bindings.insert(var.as_var().unwrap().id, value);
}

#[test]
fn test_constant_through_binding() {
    let lv = Expr::var("lv0");
    let mut bindings = VarBindings::new();
    bind(&mut bindings, &lv, Expr::scalar(3i64));

    assert!(!match_pattern(&is_const(), &lv));
    assert!(match_with_bindings(&is_const(), &lv, &bindings));
}

#[test]
fn test_call_through_binding() {
    let x = Expr::var("x");
    let lv = Expr::var("lv0");
    let value = Expr::call_op("nn.relu", vec![x.clone()]);
    let mut bindings = VarBindings::new();
    bind(&mut bindings, &lv, value);

    let arg = is_var("x");
    let pattern = is_op("nn.relu").call(vec![arg.clone()]);
    let mut matcher = DFPatternMatcher::new().with_bindings(&bindings);
    assert!(matcher.matches(&pattern, &lv));
    // The call pattern binds the variable it was reached through.
    assert_eq!(matcher.state().get(&pattern).map(|e| e.id), Some(lv.id));
    assert_eq!(matcher.state().get(&arg).map(|e| e.id), Some(x.id));
}

#[test]
fn test_jump_is_one_hop() {
    let lv0 = Expr::var("lv0");
    let lv1 = Expr::var("lv1");
    let mut bindings = VarBindings::new();
    bind(&mut bindings, &lv0, lv1.clone());
    bind(&mut bindings, &lv1, Expr::scalar(1i64));

    assert!(match_with_bindings(&is_const(), &lv1, &bindings));
    assert!(!match_with_bindings(&is_const(), &lv0, &bindings));
}

#[test]
fn test_var_pattern_does_not_jump() {
    let lv = Expr::var("lv0");
    let mut bindings = VarBindings::new();
    bind(&mut bindings, &lv, Expr::var("x"));

    assert!(match_with_bindings(&is_var("lv0"), &lv, &bindings));
    assert!(!match_with_bindings(&is_var("x"), &lv, &bindings));
}

#[test]
fn test_unbound_var_stays() {
    let lv = Expr::var("lv0");
    let bindings = VarBindings::new();
    assert!(!match_with_bindings(&is_const(), &lv, &bindings));
    assert!(match_with_bindings(&is_var("lv0"), &lv, &bindings));
}

#[test]
fn test_expr_pattern_through_binding() {
    let x = Expr::var("x");
    let lv = Expr::var("lv0");
    let value = Expr::call_op("exp", vec![x.clone()]);
    let mut bindings = VarBindings::new();
    bind(&mut bindings, &lv, value);

    let pattern = is_expr(Expr::call_op("exp", vec![x]));
    assert!(!match_pattern(&pattern, &lv));
    assert!(match_with_bindings(&pattern, &lv, &bindings));
}

#[test]
fn test_tuple_fields_jump_independently() {
    let a = Expr::var("a");
    let b = Expr::var("b");
    let mut bindings = VarBindings::new();
    bind(&mut bindings, &a, Expr::scalar(1.0f32));
    bind(&mut bindings, &b, Expr::call_op("nn.relu", vec![Expr::var("x")]));

    let pattern = is_tuple(vec![is_const(), is_op("nn.relu").call_any()]);
    assert!(match_with_bindings(&pattern, &Expr::tuple(vec![a, b]), &bindings));
}

#[test]
fn test_combinators_pass_raw_expression() {
    let lv = Expr::var("lv0");
    let mut bindings = VarBindings::new();
    bind(&mut bindings, &lv, Expr::scalar(1i64));

    // Both operands see the variable; each decides for itself whether to jump.
    assert!(match_with_bindings(&(is_var("lv0") & is_const()), &lv, &bindings));
    assert!(!match_with_bindings(&!is_const(), &lv, &bindings));
}

#[test]
#[should_panic(expected = "no variable bindings")]
fn test_auto_jump_without_bindings() {
    let config = MatchConfig::builder().auto_jump(true).build();
    DFPatternMatcher::new().with_config(config).matches(&is_const(), &Expr::var("x"));
}
