//! Backtracking pattern matcher.
//!
//! The matcher visits a pattern and an expression together, one rule per
//! pattern variant. Every successful visit is committed to the [`MatchState`];
//! a failed visit rolls back everything committed since it started, so a
//! failed alternative never leaves bindings behind.
//!
//! With memoization on (the default), a pattern that is already bound only
//! matches the very expression node it is bound to. Dominator paths switch
//! memoization off so one path pattern can match many nodes.

use std::collections::HashSet;
use std::sync::Arc;

use dfpat_ir::{
    Analyzer, ArithAnalyzer, DictAttrs, Expr, ExprKind, Object, Operator, RetValue, StructuralEq, infer_type,
    shape_of, structural_equal,
};
use tracing::{debug, trace};

use crate::VarBindings;
use crate::config::MatchConfig;
use crate::graph::{DependencyGraph, NodeId};
use crate::pattern::{DFPattern, PatternKind};
use crate::state::MatchState;

/// Reusable matcher with an inspectable binding table.
///
/// ```rust
/// # use dfpat_matcher::{DFPatternMatcher, pattern::{is_op, wildcard}};
/// # use dfpat_ir::Expr;
/// let lhs = wildcard();
/// let pattern = is_op("add").call(vec![lhs.clone(), wildcard()]);
///
/// let x = Expr::var("x");
/// let expr = Expr::call_op("add", vec![x.clone(), Expr::scalar(1i64)]);
///
/// let mut matcher = DFPatternMatcher::new();
/// assert!(matcher.matches(&pattern, &expr));
/// assert_eq!(matcher.state().get(&lhs).map(|e| e.id), Some(x.id));
/// ```
#[derive(derive_more::Debug)]
pub struct DFPatternMatcher<'a> {
    state: MatchState,
    memoize: bool,
    graph: Option<DependencyGraph>,
    graph_root: Option<Arc<Expr>>,
    var_to_value: Option<&'a VarBindings>,
    #[debug(skip)]
    analyzer: Box<dyn Analyzer + 'a>,
    config: MatchConfig,
}

impl Default for DFPatternMatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DFPatternMatcher<'a> {
    pub fn new() -> Self {
        Self {
            state: MatchState::new(),
            memoize: true,
            graph: None,
            graph_root: None,
            var_to_value: None,
            analyzer: Box::new(ArithAnalyzer::new()),
            config: MatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Follow variables through `bindings`; switches auto-jump on.
    pub fn with_bindings(mut self, bindings: &'a VarBindings) -> Self {
        self.var_to_value = Some(bindings);
        self.config = self.config.with_auto_jump();
        self
    }

    pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'a) -> Self {
        self.analyzer = Box::new(analyzer);
        self
    }

    /// Build the dependency graph from `root` instead of from the matched expression.
    ///
    /// Needed when the expression being matched is a sub-expression of a larger
    /// program whose other consumers decide dominance.
    pub fn with_graph_root(mut self, root: Arc<Expr>) -> Self {
        self.graph_root = Some(root);
        self.graph = None;
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Bindings of the last match (partial after a failed one is empty).
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn into_state(self) -> MatchState {
        self.state
    }

    /// Dependency graph of the last match that needed one.
    pub fn graph(&self) -> Option<&DependencyGraph> {
        self.graph.as_ref()
    }

    /// Match `pattern` against `expr`, starting from an empty binding table.
    #[tracing::instrument(skip_all, fields(pattern = pattern.id(), expr = expr.id))]
    pub fn matches(&mut self, pattern: &DFPattern, expr: &Arc<Expr>) -> bool {
        if self.config.auto_jump && self.var_to_value.is_none() {
            panic!("auto-jump is enabled but the matcher has no variable bindings");
        }
        self.state.clear();
        self.memoize = true;
        if pattern.contains_dominator() {
            self.ensure_graph(expr);
        }

        let matched = self.visit(pattern, expr);
        debug!(matched, bindings = self.state.len(), "match finished");
        matched
    }

    fn ensure_graph(&mut self, expr: &Arc<Expr>) {
        let root = self.graph_root.clone().unwrap_or_else(|| expr.clone());
        if self.graph.as_ref().and_then(|g| g.root()).is_some_and(|r| r.id == root.id) {
            return;
        }
        self.graph = Some(DependencyGraph::new(&root));
    }

    fn dependency_graph(&self) -> &DependencyGraph {
        match &self.graph {
            Some(graph) => graph,
            None => panic!("dominator pattern visited without a dependency graph"),
        }
    }

    /// Value bound to `expr` if it is a variable and auto-jump is on.
    fn jump(&self, expr: &Arc<Expr>) -> Arc<Expr> {
        if !self.config.auto_jump {
            return expr.clone();
        }
        let Some(var) = expr.as_var() else {
            return expr.clone();
        };
        let Some(bindings) = self.var_to_value else {
            panic!("auto-jump is enabled but the matcher has no variable bindings");
        };
        match bindings.get(&var.id) {
            Some(value) => {
                trace!(var = %var.name_hint, value = value.id, "auto-jump");
                value.clone()
            }
            None => expr.clone(),
        }
    }

    fn visit(&mut self, pattern: &DFPattern, expr: &Arc<Expr>) -> bool {
        if self.memoize
            && let Some(bound) = self.state.get(pattern)
        {
            return bound.id == expr.id;
        }

        let watermark = self.state.watermark();
        let matched = self.dispatch(pattern, expr);
        trace!(pattern = pattern.id(), expr = expr.id, matched, "visit");
        if matched {
            // A negation binds nothing: it matched because its operand did not.
            if !matches!(pattern.kind(), PatternKind::Not(_)) {
                self.state.commit(pattern, expr);
            }
        } else {
            self.state.rollback(watermark);
        }
        matched
    }

    fn visit_all(&mut self, patterns: &[DFPattern], exprs: &[Arc<Expr>]) -> bool {
        patterns.len() == exprs.len() && patterns.iter().zip(exprs).all(|(p, e)| self.visit(p, e))
    }

    fn dispatch(&mut self, pattern: &DFPattern, expr: &Arc<Expr>) -> bool {
        match pattern.kind() {
            PatternKind::Wildcard => true,
            PatternKind::Or(lhs, rhs) => self.visit(lhs, expr) || self.visit(rhs, expr),
            PatternKind::And(lhs, rhs) => self.visit(lhs, expr) && self.visit(rhs, expr),
            PatternKind::Not(inner) => !self.visit(inner, expr),
            PatternKind::Constant => matches!(self.jump(expr).kind(), ExprKind::Constant(_)),
            PatternKind::Var { name } => expr.as_var().is_some_and(|v| name.is_empty() || v.name_hint == *name),
            PatternKind::ExternFunc { name } => matches!(
                self.jump(expr).kind(),
                ExprKind::ExternFunc { global_symbol } if name.is_empty() || global_symbol == name
            ),
            PatternKind::Expr(target) => self.match_expr_equals(target, expr),
            PatternKind::Tuple { fields } => {
                let expr = self.jump(expr);
                let ExprKind::Tuple(exprs) = expr.kind() else { return false };
                match fields {
                    Some(fields) => self.visit_all(fields, exprs),
                    None => true,
                }
            }
            PatternKind::TupleGetItem { tuple, index } => {
                let expr = self.jump(expr);
                let ExprKind::TupleGetItem { tuple: inner, index: actual } = expr.kind() else { return false };
                index.is_none_or(|i| i == *actual) && self.visit(tuple, inner)
            }
            PatternKind::Function { params, body } => {
                let expr = self.jump(expr);
                let ExprKind::Function { params: actual, body: actual_body, .. } = expr.kind() else {
                    return false;
                };
                if let Some(params) = params
                    && !self.visit_all(params, actual)
                {
                    return false;
                }
                self.visit(body, actual_body)
            }
            PatternKind::If { cond, then_branch, else_branch } => {
                let expr = self.jump(expr);
                let ExprKind::If { cond: c, then_branch: t, else_branch: e } = expr.kind() else { return false };
                self.visit(cond, c) && self.visit(then_branch, t) && self.visit(else_branch, e)
            }
            PatternKind::Call { op, args } => {
                let expr = self.jump(expr);
                self.match_call(pattern, op, args.as_deref(), &expr)
            }
            PatternKind::Attr { pattern: inner, attrs } => {
                self.visit(inner, expr) && match_attrs(attrs, &self.jump(expr))
            }
            PatternKind::Type { ty, pattern: inner } => {
                infer_type(expr).is_some_and(|actual| actual.structural_eq(ty)) && self.visit(inner, expr)
            }
            PatternKind::Shape { shape, pattern: inner } => {
                let provable = shape_of(expr)
                    .is_some_and(|actual| actual.dims().is_some_and(|dims| self.analyzer.shapes_equal(shape, dims)));
                provable && self.visit(inner, expr)
            }
            PatternKind::DataType { dtype, pattern: inner } => {
                infer_type(expr).and_then(|t| t.dtype()) == Some(*dtype) && self.visit(inner, expr)
            }
            PatternKind::PrimArr(dims) => match self.jump(expr).kind() {
                ExprKind::ShapeExpr(actual) => self.analyzer.shapes_equal(dims, actual),
                _ => false,
            },
            PatternKind::RuntimeDepShape => shape_of(expr).is_some_and(|s| s.is_runtime_dep()),
            PatternKind::Dominator { child, path, parent } => self.match_dominator(child, path, parent, expr),
        }
    }

    fn match_expr_equals(&self, target: &Arc<Expr>, expr: &Arc<Expr>) -> bool {
        if structural_equal(target, expr) {
            return true;
        }
        let jumped = self.jump(expr);
        jumped.id != expr.id && structural_equal(target, &jumped)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn match_call(
        &mut self,
        pattern: &DFPattern,
        op_pattern: &DFPattern,
        arg_patterns: Option<&[DFPattern]>,
        expr: &Arc<Expr>,
    ) -> bool {
        let ExprKind::Call { op, args, .. } = expr.kind() else { return false };

        let watermark = self.state.watermark();
        if self.visit(op_pattern, op) {
            let watermark = self.state.watermark();
            if self.match_args(arg_patterns, args, watermark) {
                return true;
            }
            if self.config.commutative
                && let Some(arg_patterns) = arg_patterns
                && is_commutative_pattern(op_pattern)
            {
                let reversed: Vec<DFPattern> = arg_patterns.iter().rev().cloned().collect();
                trace!(pattern = pattern.id(), "retrying with swapped arguments");
                return self.match_args(Some(&reversed), args, watermark);
            }
            return false;
        }

        self.state.rollback(watermark);
        self.config.associative && self.match_reassociated(pattern, expr, args, watermark)
    }

    /// Positional argument match; an absent pattern list accepts any arguments.
    fn match_args(&mut self, patterns: Option<&[DFPattern]>, args: &[Arc<Expr>], watermark: usize) -> bool {
        let matched = match patterns {
            Some(patterns) => self.visit_all(patterns, args),
            None => true,
        };
        if !matched {
            self.state.rollback(watermark);
        }
        matched
    }

    /// Re-associate `divide`/`multiply` when the callee itself did not match.
    ///
    /// - `divide(multiply(a, b), c)` against `multiply(x, y)` where `x` or `y`
    ///   divides: try `multiply(b, divide(a, c))`, then `multiply(a, divide(b, c))`.
    /// - `multiply(.., divide(a, b), ..)` against `divide(x, y)` where `x` or `y`
    ///   multiplies: try `divide(multiply(a, other), b)` for the first divide operand.
    fn match_reassociated(
        &mut self,
        pattern: &DFPattern,
        expr: &Arc<Expr>,
        args: &[Arc<Expr>],
        watermark: usize,
    ) -> bool {
        let PatternKind::Call { op: op_pattern, args: Some(pattern_args) } = pattern.kind() else {
            return false;
        };
        if pattern_args.len() != 2 || args.len() != 2 {
            return false;
        }

        if pattern.called_op_name() == Some("divide")
            && pattern_args[0].called_op_name() == Some("multiply")
            && let PatternKind::Call { op: mul_op, args: Some(mul_args) } = pattern_args[0].kind()
            && mul_args.len() == 2
            && expr.is_call_to("multiply")
            && (args[0].is_call_to("divide") || args[1].is_call_to("divide"))
        {
            for arg_id in 0..2 {
                let div = op_pattern.call(vec![mul_args[arg_id].clone(), pattern_args[1].clone()]);
                let mul = mul_op.call(vec![mul_args[1 - arg_id].clone(), div]);
                debug!(rewrite = %mul, "trying divide-over-multiply re-association");
                if self.visit(&mul, expr) {
                    return true;
                }
                self.state.rollback(watermark);
            }
            return false;
        }

        if pattern.called_op_name() == Some("multiply") {
            for arg_id in 0..2 {
                if pattern_args[arg_id].called_op_name() == Some("divide")
                    && let PatternKind::Call { op: div_op, args: Some(div_args) } = pattern_args[arg_id].kind()
                    && div_args.len() == 2
                    && expr.is_call_to("divide")
                    && (args[0].is_call_to("multiply") || args[1].is_call_to("multiply"))
                {
                    let mul = op_pattern.call(vec![div_args[0].clone(), pattern_args[1 - arg_id].clone()]);
                    let div = div_op.call(vec![mul, div_args[1].clone()]);
                    debug!(rewrite = %div, "trying multiply-over-divide re-association");
                    return self.visit(&div, expr);
                }
            }
        }

        false
    }

    // ========================================================================
    // Dominators
    // ========================================================================

    fn match_dominator(&mut self, child: &DFPattern, path: &DFPattern, parent: &DFPattern, expr: &Arc<Expr>) -> bool {
        let saved = self.memoize;
        let matched = if self.visit(child, expr) {
            let path_ok = self.matches_path(path, parent, expr);
            self.memoize = true;
            path_ok && self.dominates_parent(parent, expr)
        } else {
            false
        };
        self.memoize = saved;
        debug!(expr = expr.id, matched, "dominator pattern");
        matched
    }

    /// Every input of `expr` (except a callee) either matches `parent`, or
    /// matches `path` and recursively satisfies the same condition.
    fn matches_path(&mut self, path: &DFPattern, parent: &DFPattern, expr: &Arc<Expr>) -> bool {
        let graph = self.dependency_graph();
        let inputs: Vec<Arc<Expr>> = graph
            .expect_node(expr)
            .inputs
            .iter()
            .map(|&id| graph.node(id).expr.clone())
            .filter(|input| !DependencyGraph::is_callee_of(input, expr))
            .collect();

        for input in &inputs {
            self.memoize = true;
            if self.visit(parent, input) {
                continue;
            }
            self.memoize = false;
            if !self.visit(path, input) || !self.matches_path(path, parent, input) {
                return false;
            }
        }
        true
    }

    /// Whether a node in the post-dominator subtree under `expr` matches `parent`.
    fn dominates_parent(&mut self, parent: &DFPattern, expr: &Arc<Expr>) -> bool {
        let graph = self.dependency_graph();
        let Some(start) = graph.node_id(expr) else {
            panic!("expression {expr} (id {}) is not part of the dependency graph", expr.id);
        };

        let mut stack: Vec<NodeId> = vec![start];
        let mut visited: HashSet<NodeId> = HashSet::new();
        while let Some(current) = stack.pop() {
            let graph = self.dependency_graph();
            let children: Vec<(NodeId, Arc<Expr>)> = graph
                .node(current)
                .dominator_children
                .iter()
                .map(|&id| (id, graph.node(id).expr.clone()))
                .collect();
            for (id, candidate) in children {
                if !visited.insert(id) {
                    continue;
                }
                if self.visit(parent, &candidate) {
                    return true;
                }
                stack.push(id);
            }
        }
        false
    }
}

fn is_commutative_pattern(op_pattern: &DFPattern) -> bool {
    match op_pattern.kind() {
        PatternKind::Expr(op) => op.as_operator().is_some_and(|op| op.is_commutative()),
        _ => false,
    }
}

/// Every attribute in `attrs` is present on `expr` with an equal value.
///
/// Operator references read operator attribute maps, calls read their
/// attribute record, and functions read their attribute dictionary.
fn match_attrs(attrs: &DictAttrs, expr: &Arc<Expr>) -> bool {
    match expr.kind() {
        ExprKind::Op(op) => attrs.iter().all(|(name, value)| {
            Operator::has_attr_map(name) && op.get_attr(name).is_some_and(|actual| match_ret_value(value, &actual))
        }),
        ExprKind::Call { attrs: call_attrs, .. } => attrs.iter().all(|(name, value)| {
            call_attrs.as_ref().and_then(|a| a.get_attr(name)).is_some_and(|actual| match_ret_value(value, actual))
        }),
        ExprKind::Function { attrs: func_attrs, .. } => {
            attrs.iter().all(|(name, value)| func_attrs.get(name).is_some_and(|actual| value.structural_eq(actual)))
        }
        _ => false,
    }
}

/// Compare a pattern literal against a runtime attribute value.
///
/// Strings compare by content, treating string immediates and string
/// objects alike. A data type compares by canonical name against a string
/// literal.
///
/// # Panics
///
/// If a data type is compared against a non-string literal, or the runtime
/// value is null or a raw handle.
pub fn match_ret_value(lhs: &Object, rhs: &RetValue) -> bool {
    match rhs {
        RetValue::Int(value) => matches!(lhs, Object::IntImm(v) if v == value),
        RetValue::Float(value) => matches!(lhs, Object::FloatImm(v) if v == value),
        RetValue::Str(value) => lhs.as_str() == Some(value.as_str()),
        RetValue::DataType(dtype) => match lhs.as_str() {
            Some(name) => dtype.to_string() == name,
            None => panic!("unsupported literal {lhs} for data type attribute {dtype}"),
        },
        RetValue::Object(object) => match object.as_str() {
            Some(value) => lhs.as_str() == Some(value),
            None => lhs.structural_eq(object),
        },
        RetValue::Null | RetValue::Handle(_) => {
            panic!("unsupported attribute value kind {} in pattern comparison", rhs.kind())
        }
    }
}
