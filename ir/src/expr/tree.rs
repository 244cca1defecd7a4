//! ASCII tree rendering of expression graphs.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::io;
use std::rc::Rc;
use std::sync::Arc;

use ptree::{Style, TreeItem};

use crate::{Expr, ExprKind};

/// Compact renderer: a node reached a second time prints as `[id] -> (see above)`.
#[derive(Clone)]
pub struct ExprTreeCompact {
    expr: Arc<Expr>,
    visited: Rc<RefCell<HashSet<u64>>>,
    is_backref: Cell<bool>,
}

impl ExprTreeCompact {
    pub fn new(expr: &Arc<Expr>) -> Self {
        Self { expr: expr.clone(), visited: Rc::new(RefCell::new(HashSet::new())), is_backref: Cell::new(false) }
    }

    fn from_child(expr: Arc<Expr>, visited: Rc<RefCell<HashSet<u64>>>) -> Self {
        Self { expr, visited, is_backref: Cell::new(false) }
    }
}

impl TreeItem for ExprTreeCompact {
    type Child = ExprTreeCompact;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        if !self.visited.borrow_mut().insert(self.expr.id) {
            self.is_backref.set(true);
            return write!(f, "[{}] -> (see above)", self.expr.id);
        }
        write!(f, "{}", format_node(&self.expr))
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        if self.is_backref.get() {
            return Cow::Borrowed(&[]);
        }
        let children =
            self.expr.children().into_iter().map(|c| ExprTreeCompact::from_child(c.clone(), self.visited.clone()));
        Cow::Owned(children.collect())
    }
}

/// Full renderer: shared nodes are expanded at every occurrence.
#[derive(Clone)]
pub struct ExprTreeFull {
    expr: Arc<Expr>,
}

impl ExprTreeFull {
    pub fn new(expr: &Arc<Expr>) -> Self {
        Self { expr: expr.clone() }
    }
}

impl TreeItem for ExprTreeFull {
    type Child = ExprTreeFull;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        write!(f, "{}", format_node(&self.expr))
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Owned(self.expr.children().into_iter().map(|c| ExprTreeFull { expr: c.clone() }).collect())
    }
}

/// `[id] KIND : type shape=[...]`
fn format_node(expr: &Expr) -> String {
    let kind = match expr.kind() {
        ExprKind::Constant(c) if c.data.len() == 1 => format!("CONST({})", c.data[0]),
        ExprKind::Constant(c) => format!("CONST(len={})", c.data.len()),
        ExprKind::Var(v) => format!("VAR('{}', {})", v.name_hint, v.id),
        ExprKind::ExternFunc { global_symbol } => format!("EXTERN('{global_symbol}')"),
        ExprKind::Op(op) => format!("OP({})", op.name()),
        ExprKind::Call { attrs: Some(attrs), .. } => format!("CALL({})", attrs.type_key()),
        ExprKind::Call { .. } => "CALL".to_string(),
        ExprKind::Tuple(fields) => format!("TUPLE(len={})", fields.len()),
        ExprKind::TupleGetItem { index, .. } => format!("GET_ITEM({index})"),
        ExprKind::Function { params, .. } => format!("FUNCTION(params={})", params.len()),
        ExprKind::If { .. } => "IF".to_string(),
        ExprKind::ShapeExpr(dims) => format!("SHAPE(ndim={})", dims.len()),
    };

    let ty = expr.checked_type().map(|t| format!(" : {t}")).unwrap_or_default();
    let shape = expr.shape_annotation().map(|s| format!(" shape={s}")).unwrap_or_default();
    format!("[{}] {kind}{ty}{shape}", expr.id)
}

fn write_to_string<T: TreeItem>(tree: &T, expr: &Expr) -> String {
    let mut buf = Vec::new();
    // Writing into memory only fails if a node's Display impl does.
    match ptree::write_tree(tree, &mut buf) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{expr}"),
    }
}

/// Render an expression graph as a compact ASCII tree.
pub fn render_tree_compact(expr: &Arc<Expr>) -> String {
    write_to_string(&ExprTreeCompact::new(expr), expr)
}

/// Render an expression graph as a full ASCII tree.
pub fn render_tree_full(expr: &Arc<Expr>) -> String {
    write_to_string(&ExprTreeFull::new(expr), expr)
}
