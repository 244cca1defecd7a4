use dfpat_ir::Expr;

use crate::pattern::*;
use crate::state::MatchState;
use crate::{DFPatternMatcher, VarBindings, extract_matched_expr};

#[test]
fn test_failed_match_leaves_no_bindings() {
    let x = Expr::var("x");
    let expr = Expr::call_op("add", vec![x.clone(), Expr::call_op("exp", vec![x])]);
    // The first argument matches before the second fails.
    let pattern = is_op("add").call(vec![is_var("x"), is_op("log").call_any()]);

    let mut matcher = DFPatternMatcher::new();
    assert!(!matcher.matches(&pattern, &expr));
    assert!(matcher.state().is_empty());
}

#[test]
fn test_failed_alternative_rolled_back() {
    let x = Expr::var("x");
    let expr = Expr::call_op("nn.relu", vec![x.clone()]);
    let left_arg = is_const();
    let right_arg = wildcard();
    let pattern = is_op("nn.relu").call(vec![left_arg.clone()]) | is_op("nn.relu").call(vec![right_arg.clone()]);

    let mut matcher = DFPatternMatcher::new();
    assert!(matcher.matches(&pattern, &expr));
    assert!(!matcher.state().contains(&left_arg));
    assert_eq!(matcher.state().get(&right_arg).map(|e| e.id), Some(x.id));
}

#[test]
fn test_repeated_match_is_stable() {
    let x = Expr::var("x");
    let expr = Expr::call_op("multiply", vec![Expr::scalar(2i64), x.clone()]);
    let var = is_var("x");
    let pattern = is_op("multiply").call(vec![var.clone(), is_const()]);

    let mut matcher = DFPatternMatcher::new();
    assert!(matcher.matches(&pattern, &expr));
    let first: Vec<(u64, u64)> = matcher.state().iter().map(|(p, e)| (p.id(), e.id)).collect();
    assert!(matcher.matches(&pattern, &expr));
    let second: Vec<(u64, u64)> = matcher.state().iter().map(|(p, e)| (p.id(), e.id)).collect();
    assert_eq!(first, second);

    // A failure in between wipes the table but does not poison the next match.
    assert!(!matcher.matches(&pattern, &Expr::var("y")));
    assert!(matcher.state().is_empty());
    assert!(matcher.matches(&pattern, &expr));
    assert_eq!(matcher.state().get(&var).map(|e| e.id), Some(x.id));
}

#[test]
fn test_commit_order_is_post_order() {
    let x = Expr::var("x");
    let relu = Expr::call_op("nn.relu", vec![x.clone()]);
    let arg = is_var("x");
    let op = is_op("nn.relu");
    let pattern = op.call(vec![arg.clone()]);

    let mut matcher = DFPatternMatcher::new();
    assert!(matcher.matches(&pattern, &relu));
    let order: Vec<u64> = matcher.state().iter().map(|(p, _)| p.id()).collect();
    assert_eq!(order, vec![op.id(), arg.id(), pattern.id()]);
    assert_eq!(matcher.state().len(), 3);
}

#[test]
fn test_extract_matched_expr() {
    let x = Expr::var("x");
    let c = Expr::scalar(1.0f32);
    let expr = Expr::call_op("add", vec![x.clone(), c.clone()]);
    let lhs = is_var("x");
    let rhs = is_const();
    let pattern = is_op("add").call(vec![lhs.clone(), rhs.clone()]);

    let bound = extract_matched_expr(&pattern, &expr, None).unwrap();
    assert_eq!(bound[&lhs].id, x.id);
    assert_eq!(bound[&rhs].id, c.id);
    assert_eq!(bound[&pattern].id, expr.id);

    assert!(extract_matched_expr(&pattern, &x, None).is_none());
}

#[test]
fn test_extract_with_bindings() {
    let lv = Expr::var("lv0");
    let value = Expr::scalar(4i64);
    let mut bindings = VarBindings::new();
    bindings.insert(lv.as_var().unwrap().id, value);

    let pattern = is_const();
    let bound = extract_matched_expr(&pattern, &lv, Some(&bindings)).unwrap();
    assert_eq!(bound[&pattern].id, lv.id);
}

#[test]
fn test_path_pattern_binds_many() {
    let conv = Expr::call_op("nn.conv2d", vec![Expr::var("x"), Expr::var("w")]);
    let r1 = Expr::call_op("nn.relu", vec![conv.clone()]);
    let r2 = Expr::call_op("nn.relu", vec![conv.clone()]);
    let out = Expr::call_op("add", vec![r1.clone(), r2.clone()]);
    let path = is_op("nn.relu").call_any();
    let pattern = dominates(is_op("nn.conv2d").call_any(), path.clone(), is_op("add").call_any());

    let mut matcher = DFPatternMatcher::new();
    assert!(matcher.matches(&pattern, &out));
    let ids: Vec<u64> = matcher.state().get_all(&path).iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![r1.id, r2.id]);
    assert_eq!(matcher.state().get(&path).map(|e| e.id), Some(r1.id));
}

#[test]
fn test_empty_state() {
    let state = MatchState::new();
    assert!(state.is_empty());
    assert_eq!(state.len(), 0);
    assert!(state.get(&wildcard()).is_none());
    assert!(state.get_all(&wildcard()).is_empty());
}

#[test]
fn test_rollback_keeps_earlier_bindings() {
    let (a, b, c) = (Expr::var("a"), Expr::var("b"), Expr::var("c"));
    let pattern = wildcard();
    let other = is_const();

    let mut state = MatchState::new();
    state.commit(&pattern, &a);
    let watermark = state.watermark();
    state.commit(&pattern, &b);
    state.commit(&other, &c);
    assert_eq!(state.get_all(&pattern).len(), 2);

    state.rollback(watermark);
    let ids: Vec<u64> = state.get_all(&pattern).iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![a.id]);
    assert!(!state.contains(&other));
    assert_eq!(state.len(), 1);
    assert_eq!(state.iter().count(), state.len());
    assert!(state.iter().all(|(p, e)| state.get_all(p).iter().any(|bound| bound.id == e.id)));

    state.rollback(0);
    assert!(state.is_empty());
    assert!(!state.contains(&pattern));
}
