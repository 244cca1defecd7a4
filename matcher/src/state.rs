//! Rollback-capable binding table.

use std::collections::HashMap;
use std::sync::Arc;

use dfpat_ir::Expr;
use smallvec::SmallVec;
use tracing::trace;

use crate::pattern::DFPattern;

/// Bindings from pattern nodes to the expressions they matched.
///
/// Every successful pattern visit appends one `(pattern, expr)` entry to a
/// commit log. Rolling back to a watermark undoes exactly the entries
/// committed after it; bindings made earlier survive even when the same
/// pattern was bound again afterwards.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    memo: HashMap<DFPattern, SmallVec<[Arc<Expr>; 1]>>,
    log: Vec<(DFPattern, Arc<Expr>)>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expression bound to `pattern`, if it is committed.
    pub fn get(&self, pattern: &DFPattern) -> Option<&Arc<Expr>> {
        self.memo.get(pattern).and_then(|bound| bound.first())
    }

    /// Every expression bound to `pattern`, oldest first.
    ///
    /// More than one only for patterns matched while memoization was off
    /// (dominator paths).
    pub fn get_all(&self, pattern: &DFPattern) -> &[Arc<Expr>] {
        self.memo.get(pattern).map_or(&[], |bound| bound.as_slice())
    }

    pub fn contains(&self, pattern: &DFPattern) -> bool {
        self.memo.contains_key(pattern)
    }

    /// Committed bindings in commit order.
    pub fn iter(&self) -> impl Iterator<Item = (&DFPattern, &Arc<Expr>)> {
        self.log.iter().map(|(p, e)| (p, e))
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub(crate) fn watermark(&self) -> usize {
        self.log.len()
    }

    pub(crate) fn commit(&mut self, pattern: &DFPattern, expr: &Arc<Expr>) {
        self.memo.entry(pattern.clone()).or_default().push(expr.clone());
        self.log.push((pattern.clone(), expr.clone()));
    }

    /// Undo every commit made after `watermark`.
    pub(crate) fn rollback(&mut self, watermark: usize) {
        if watermark >= self.log.len() {
            return;
        }
        trace!(watermark, dropped = self.log.len() - watermark, "rollback");
        for (pattern, _) in self.log.drain(watermark..).rev() {
            let Some(bound) = self.memo.get_mut(&pattern) else {
                panic!("commit log names pattern {} with no binding", pattern.id());
            };
            bound.pop();
            if bound.is_empty() {
                self.memo.remove(&pattern);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.memo.clear();
        self.log.clear();
    }
}
