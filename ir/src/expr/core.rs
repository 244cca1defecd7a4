//! Core expression struct and fundamental operations.
//!
//! Expressions form a DAG: children are shared through `Arc`, and a sub-expression
//! reached along two paths is one node, not two copies. Identity is the stable
//! `id`, assigned at construction; two structurally equal expressions built
//! separately have different ids and are different nodes.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dfpat_dtype::DType;
use smallvec::SmallVec;

use crate::attrs::{Attrs, DictAttrs};
use crate::operator::Operator;
use crate::prim::PrimExpr;
use crate::shape::ShapeInfo;
use crate::ty::Type;
use crate::types::ConstValue;

static EXPR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);
static VAR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_expr_id() -> u64 {
    EXPR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn next_var_id() -> VarId {
    VarId(VAR_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Wrapper for `Arc<Expr>` that hashes and compares by node identity.
#[derive(Clone)]
pub struct ExprKey(pub Arc<Expr>);

impl fmt::Debug for ExprKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprKey(id={})", self.0.id)
    }
}

impl PartialEq for ExprKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ExprKey {}

impl Hash for ExprKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

/// Identity of a variable.
///
/// Re-annotating a variable (new type or shape) builds a new node that keeps
/// the same `VarId`: both nodes denote the same variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u64);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Var {
    pub id: VarId,
    pub name_hint: String,
}

/// Dense constant tensor (rank 0 for scalars).
#[derive(Debug, Clone)]
pub struct Constant {
    pub dtype: DType,
    pub shape: SmallVec<[usize; 4]>,
    /// Row-major elements; `shape.iter().product()` of them.
    pub data: Arc<[ConstValue]>,
}

/// Expression variants.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Constant(Constant),
    Var(Var),
    /// Reference to a function implemented outside the IR (by symbol name).
    ExternFunc { global_symbol: String },
    /// Reference to a registered primitive operator.
    Op(Arc<Operator>),
    Call { op: Arc<Expr>, args: Vec<Arc<Expr>>, attrs: Option<Attrs> },
    Tuple(Vec<Arc<Expr>>),
    TupleGetItem { tuple: Arc<Expr>, index: usize },
    Function { params: Vec<Arc<Expr>>, body: Arc<Expr>, attrs: DictAttrs },
    If { cond: Arc<Expr>, then_branch: Arc<Expr>, else_branch: Arc<Expr> },
    /// Shape literal: a list of symbolic dimensions as a first-class value.
    ShapeExpr(Vec<PrimExpr>),
}

/// Dataflow expression node.
#[derive(derive_more::Debug)]
pub struct Expr {
    /// Unique stable ID for this node.
    pub id: u64,
    pub(crate) kind: ExprKind,
    /// Checked type annotation, when type checking has run.
    pub(crate) checked_type: Option<Type>,
    /// Shape annotation, when shape deduction has run.
    pub(crate) shape: Option<ShapeInfo>,
}

impl Expr {
    pub(crate) fn with_kind(kind: ExprKind) -> Arc<Self> {
        Arc::new(Self { id: next_expr_id(), kind, checked_type: None, shape: None })
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn checked_type(&self) -> Option<&Type> {
        self.checked_type.as_ref()
    }

    pub fn shape_annotation(&self) -> Option<&ShapeInfo> {
        self.shape.as_ref()
    }

    /// Copy of this node with a checked type annotation.
    ///
    /// The copy is a new node with a new id; variables keep their [`VarId`].
    pub fn with_type(self: &Arc<Self>, ty: Type) -> Arc<Self> {
        Arc::new(Self { id: next_expr_id(), kind: self.kind.clone(), checked_type: Some(ty), shape: self.shape.clone() })
    }

    /// Copy of this node with a shape annotation.
    pub fn with_shape(self: &Arc<Self>, shape: ShapeInfo) -> Arc<Self> {
        Arc::new(Self {
            id: next_expr_id(),
            kind: self.kind.clone(),
            checked_type: self.checked_type.clone(),
            shape: Some(shape),
        })
    }

    pub fn as_var(&self) -> Option<&Var> {
        match &self.kind {
            ExprKind::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<&Arc<Operator>> {
        match &self.kind {
            ExprKind::Op(op) => Some(op),
            _ => None,
        }
    }

    /// The primitive operator this node calls, if it is a call to one.
    pub fn called_operator(&self) -> Option<&Arc<Operator>> {
        match &self.kind {
            ExprKind::Call { op, .. } => op.as_operator(),
            _ => None,
        }
    }

    /// Whether this node is a call to the operator named `name`.
    pub fn is_call_to(&self, name: &str) -> bool {
        self.called_operator().is_some_and(|op| op.name() == name)
    }

    /// Direct inputs in evaluation order.
    ///
    /// A call lists its callee first, then its arguments; a function lists its
    /// parameters, then its body.
    pub fn children(&self) -> SmallVec<[&Arc<Expr>; 4]> {
        match &self.kind {
            ExprKind::Constant(_)
            | ExprKind::Var(_)
            | ExprKind::ExternFunc { .. }
            | ExprKind::Op(_)
            | ExprKind::ShapeExpr(_) => SmallVec::new(),
            ExprKind::Call { op, args, .. } => std::iter::once(op).chain(args.iter()).collect(),
            ExprKind::Tuple(fields) => fields.iter().collect(),
            ExprKind::TupleGetItem { tuple, .. } => smallvec::smallvec![tuple],
            ExprKind::Function { params, body, .. } => params.iter().chain(std::iter::once(body)).collect(),
            ExprKind::If { cond, then_branch, else_branch } => smallvec::smallvec![cond, then_branch, else_branch],
        }
    }

    /// Topological sort of the expression DAG.
    ///
    /// Every node appears once, after all of its inputs; `self` comes last.
    pub fn toposort(self: &Arc<Self>) -> Vec<Arc<Self>> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![(self.clone(), false)];

        while let Some((node, processed)) = stack.pop() {
            if processed {
                if visited.insert(node.id) {
                    result.push(node);
                }
                continue;
            }
            if visited.contains(&node.id) {
                continue;
            }
            stack.push((node.clone(), true));
            // Reverse so the first child is finished first.
            for child in node.children().into_iter().rev() {
                if !visited.contains(&child.id) {
                    stack.push((child.clone(), false));
                }
            }
        }

        result
    }

    /// Render this expression and its inputs as an ASCII tree.
    ///
    /// Shared nodes are printed once and referenced by id afterwards.
    pub fn tree(self: &Arc<Self>) -> String {
        crate::expr::tree::render_tree_compact(self)
    }

    /// Render this expression as an ASCII tree, expanding shared nodes every time.
    pub fn tree_full(self: &Arc<Self>) -> String {
        crate::expr::tree::render_tree_full(self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, items: &[Arc<Expr>]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match &self.kind {
            ExprKind::Constant(c) if c.shape.is_empty() && c.data.len() == 1 => write!(f, "const({})", c.data[0]),
            ExprKind::Constant(c) => write!(f, "const(<{} {:?}>)", c.dtype, c.shape.as_slice()),
            ExprKind::Var(v) => write!(f, "%{}", v.name_hint),
            ExprKind::ExternFunc { global_symbol } => write!(f, "extern({global_symbol:?})"),
            ExprKind::Op(op) => write!(f, "{op}"),
            ExprKind::Call { op, args, attrs } => {
                write!(f, "{op}(")?;
                list(f, args)?;
                if let Some(attrs) = attrs {
                    write!(f, "; {attrs}")?;
                }
                write!(f, ")")
            }
            ExprKind::Tuple(fields) => {
                write!(f, "(")?;
                list(f, fields)?;
                write!(f, ")")
            }
            ExprKind::TupleGetItem { tuple, index } => write!(f, "{tuple}.{index}"),
            ExprKind::Function { params, body, .. } => {
                write!(f, "fn(")?;
                list(f, params)?;
                write!(f, ") {{ {body} }}")
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                write!(f, "if {cond} {{ {then_branch} }} else {{ {else_branch} }}")
            }
            ExprKind::ShapeExpr(dims) => write!(f, "{}", ShapeInfo::Known(dims.clone())),
        }
    }
}
