//! Dataflow pattern matching.
//!
//! Match a [`DFPattern`] against a `dfpat-ir` expression and read back which
//! sub-expression each pattern node bound to. Calls to `add` and `multiply`
//! also match with their arguments swapped; `divide`/`multiply` chains match
//! across one re-association; dominator patterns query the post-dominator
//! tree of the surrounding program.
//!
//! # Module Organization
//!
//! - [`pattern`] - Pattern nodes and constructors
//! - [`matcher`] - The backtracking matcher
//! - [`state`] - Binding table with watermark rollback
//! - [`graph`] - Dependency graph and post-dominator tree
//! - [`config`] - Matcher switches
//! - [`error`] - Error types and result handling

use std::collections::HashMap;
use std::sync::Arc;

use dfpat_ir::{Expr, VarId};

pub mod config;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod pattern;
pub mod state;


pub use config::MatchConfig;
pub use error::{Error, Result};
pub use graph::{DependencyGraph, GraphNode, NodeId};
pub use matcher::{DFPatternMatcher, match_ret_value};
pub use pattern::{DFPattern, PatternKind};
pub use state::MatchState;

/// Value each variable was most recently bound to.
pub type VarBindings = HashMap<VarId, Arc<Expr>>;

/// Match `pattern` against `expr` without variable substitution.
pub fn match_pattern(pattern: &DFPattern, expr: &Arc<Expr>) -> bool {
    DFPatternMatcher::new().matches(pattern, expr)
}

/// Match `pattern` against `expr`, following variables to their values in `bindings`.
pub fn match_with_bindings(pattern: &DFPattern, expr: &Arc<Expr>, bindings: &VarBindings) -> bool {
    DFPatternMatcher::new().with_bindings(bindings).matches(pattern, expr)
}

/// Match and return the expression each pattern node bound to.
pub fn extract_matched_expr(
    pattern: &DFPattern,
    expr: &Arc<Expr>,
    bindings: Option<&VarBindings>,
) -> Option<HashMap<DFPattern, Arc<Expr>>> {
    let mut matcher = DFPatternMatcher::new();
    if let Some(bindings) = bindings {
        matcher = matcher.with_bindings(bindings);
    }
    if !matcher.matches(pattern, expr) {
        return None;
    }
    let state = matcher.into_state();
    let mut out = HashMap::with_capacity(state.len());
    for (p, e) in state.iter() {
        out.entry(p.clone()).or_insert_with(|| e.clone());
    }
    Some(out)
}
