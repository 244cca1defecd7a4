//! Dataflow patterns.
//!
//! A [`DFPattern`] is an immutable tree describing the shape an expression
//! must have. Patterns are cheap to clone (one `Arc`) and are keyed by
//! identity: two patterns built separately are different keys even when they
//! print the same, and a pattern used twice inside a larger one must bind the
//! same expression at both positions.
//!
//! # Examples
//!
//! ```rust
//! # use dfpat_matcher::pattern::{is_op, wildcard};
//! # use dfpat_ir::Expr;
//! let x = wildcard();
//! let relu_of_add = is_op("nn.relu").call(vec![is_op("add").call(vec![x.clone(), x])]);
//!
//! let a = Expr::var("a");
//! let expr = Expr::call_op("nn.relu", vec![Expr::call_op("add", vec![a.clone(), a])]);
//! assert!(relu_of_add.matches(&expr));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dfpat_dtype::DType;
use dfpat_ir::{DictAttrs, Expr, PrimExpr, Type};
use snafu::{ResultExt, ensure};

use crate::error::{InvalidTupleIndexSnafu, IrSnafu, Result};

static PATTERN_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Pattern variants.
#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Matches anything.
    Wildcard,
    /// Left, else right.
    Or(DFPattern, DFPattern),
    And(DFPattern, DFPattern),
    /// Matches when the inner pattern does not.
    Not(DFPattern),
    /// Any literal constant.
    Constant,
    /// A variable; an empty name accepts any variable.
    Var { name: String },
    /// An external function reference; an empty name accepts any symbol.
    ExternFunc { name: String },
    /// An expression structurally equal to this one.
    Expr(Arc<Expr>),
    /// A tuple; `None` accepts any arity.
    Tuple { fields: Option<Vec<DFPattern>> },
    /// A tuple projection; `None` accepts any index.
    TupleGetItem { tuple: DFPattern, index: Option<usize> },
    /// A function; `None` accepts any parameter list.
    Function { params: Option<Vec<DFPattern>>, body: DFPattern },
    If { cond: DFPattern, then_branch: DFPattern, else_branch: DFPattern },
    /// A call; `None` accepts any argument list.
    Call { op: DFPattern, args: Option<Vec<DFPattern>> },
    /// Inner pattern plus attribute constraints.
    Attr { pattern: DFPattern, attrs: DictAttrs },
    Type { ty: Type, pattern: DFPattern },
    Shape { shape: Vec<PrimExpr>, pattern: DFPattern },
    DataType { dtype: DType, pattern: DFPattern },
    /// A shape literal with these dimensions.
    PrimArr(Vec<PrimExpr>),
    /// An expression whose shape is only known at runtime.
    RuntimeDepShape,
    /// `child` is reached from `parent` only through nodes matching `path`,
    /// and `parent` is post-dominated by `child`.
    Dominator { child: DFPattern, path: DFPattern, parent: DFPattern },
}

#[derive(Debug)]
pub struct PatternNode {
    id: u64,
    kind: PatternKind,
}

/// Shared, identity-keyed pattern node.
#[derive(Clone)]
pub struct DFPattern(Arc<PatternNode>);

impl DFPattern {
    pub fn new(kind: PatternKind) -> Self {
        Self(Arc::new(PatternNode { id: PATTERN_ID_COUNTER.fetch_add(1, Ordering::Relaxed), kind }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn kind(&self) -> &PatternKind {
        &self.0.kind
    }

    /// Call pattern with this pattern as the callee.
    pub fn call(&self, args: Vec<DFPattern>) -> DFPattern {
        DFPattern::new(PatternKind::Call { op: self.clone(), args: Some(args) })
    }

    /// Call pattern with this callee and any arguments.
    pub fn call_any(&self) -> DFPattern {
        DFPattern::new(PatternKind::Call { op: self.clone(), args: None })
    }

    /// Require the matched expression to carry these attributes.
    pub fn has_attr(&self, attrs: DictAttrs) -> DFPattern {
        DFPattern::new(PatternKind::Attr { pattern: self.clone(), attrs })
    }

    pub fn has_type(&self, ty: Type) -> DFPattern {
        DFPattern::new(PatternKind::Type { ty, pattern: self.clone() })
    }

    pub fn has_shape(&self, shape: impl IntoIterator<Item = impl Into<PrimExpr>>) -> DFPattern {
        DFPattern::new(PatternKind::Shape { shape: shape.into_iter().map(Into::into).collect(), pattern: self.clone() })
    }

    pub fn has_dtype(&self, dtype: DType) -> DFPattern {
        DFPattern::new(PatternKind::DataType { dtype, pattern: self.clone() })
    }

    /// Direct sub-patterns.
    pub fn children(&self) -> Vec<&DFPattern> {
        match self.kind() {
            PatternKind::Wildcard
            | PatternKind::Constant
            | PatternKind::Var { .. }
            | PatternKind::ExternFunc { .. }
            | PatternKind::Expr(_)
            | PatternKind::PrimArr(_)
            | PatternKind::RuntimeDepShape => Vec::new(),
            PatternKind::Or(l, r) | PatternKind::And(l, r) => vec![l, r],
            PatternKind::Not(p) => vec![p],
            PatternKind::Tuple { fields } => fields.iter().flatten().collect(),
            PatternKind::TupleGetItem { tuple, .. } => vec![tuple],
            PatternKind::Function { params, body } => params.iter().flatten().chain(std::iter::once(body)).collect(),
            PatternKind::If { cond, then_branch, else_branch } => vec![cond, then_branch, else_branch],
            PatternKind::Call { op, args } => std::iter::once(op).chain(args.iter().flatten()).collect(),
            PatternKind::Attr { pattern, .. }
            | PatternKind::Type { pattern, .. }
            | PatternKind::Shape { pattern, .. }
            | PatternKind::DataType { pattern, .. } => vec![pattern],
            PatternKind::Dominator { child, path, parent } => vec![child, path, parent],
        }
    }

    /// Whether a dominator pattern occurs anywhere in this pattern.
    pub fn contains_dominator(&self) -> bool {
        let mut stack = vec![self];
        while let Some(p) = stack.pop() {
            if matches!(p.kind(), PatternKind::Dominator { .. }) {
                return true;
            }
            stack.extend(p.children());
        }
        false
    }

    /// Name of the primitive operator this pattern calls, for call patterns
    /// whose callee is a literal operator reference.
    pub fn called_op_name(&self) -> Option<&str> {
        match self.kind() {
            PatternKind::Call { op, .. } => match op.kind() {
                PatternKind::Expr(expr) => expr.as_operator().map(|o| o.name()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Match against `expr` without variable substitution.
    pub fn matches(&self, expr: &Arc<Expr>) -> bool {
        crate::match_pattern(self, expr)
    }

    /// Match against `expr`, following variables through `bindings`.
    pub fn matches_with_bindings(&self, expr: &Arc<Expr>, bindings: &crate::VarBindings) -> bool {
        crate::match_with_bindings(self, expr, bindings)
    }
}

impl PartialEq for DFPattern {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for DFPattern {}

impl Hash for DFPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for DFPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DFPattern(id={}, {self})", self.0.id)
    }
}

impl BitOr for DFPattern {
    type Output = DFPattern;

    fn bitor(self, rhs: DFPattern) -> DFPattern {
        DFPattern::new(PatternKind::Or(self, rhs))
    }
}

impl BitAnd for DFPattern {
    type Output = DFPattern;

    fn bitand(self, rhs: DFPattern) -> DFPattern {
        DFPattern::new(PatternKind::And(self, rhs))
    }
}

impl Not for DFPattern {
    type Output = DFPattern;

    fn not(self) -> DFPattern {
        DFPattern::new(PatternKind::Not(self))
    }
}

// ============================================================================
// Constructors
// ============================================================================

pub fn wildcard() -> DFPattern {
    DFPattern::new(PatternKind::Wildcard)
}

/// Pattern for the registered operator `name`.
pub fn try_is_op(name: &str) -> Result<DFPattern> {
    let op = Expr::try_op(name).context(IrSnafu)?;
    Ok(DFPattern::new(PatternKind::Expr(op)))
}

/// Pattern for the registered operator `name`; panics if it is unknown.
pub fn is_op(name: &str) -> DFPattern {
    try_is_op(name).unwrap_or_else(|e| panic!("{e}"))
}

pub fn is_const() -> DFPattern {
    DFPattern::new(PatternKind::Constant)
}

/// Variable pattern; `""` accepts any variable.
pub fn is_var(name: impl Into<String>) -> DFPattern {
    DFPattern::new(PatternKind::Var { name: name.into() })
}

/// External function pattern; `""` accepts any symbol.
pub fn is_extern(name: impl Into<String>) -> DFPattern {
    DFPattern::new(PatternKind::ExternFunc { name: name.into() })
}

pub fn is_expr(expr: Arc<Expr>) -> DFPattern {
    DFPattern::new(PatternKind::Expr(expr))
}

pub fn is_tuple(fields: Vec<DFPattern>) -> DFPattern {
    DFPattern::new(PatternKind::Tuple { fields: Some(fields) })
}

/// Tuple of any arity.
pub fn is_tuple_any() -> DFPattern {
    DFPattern::new(PatternKind::Tuple { fields: None })
}

/// Projection of field `index` out of a tuple matching `tuple`; `-1` accepts any index.
pub fn try_is_tuple_get_item(tuple: DFPattern, index: i64) -> Result<DFPattern> {
    ensure!(index >= -1, InvalidTupleIndexSnafu { index });
    let index = usize::try_from(index).ok();
    Ok(DFPattern::new(PatternKind::TupleGetItem { tuple, index }))
}

pub fn is_tuple_get_item(tuple: DFPattern, index: i64) -> DFPattern {
    try_is_tuple_get_item(tuple, index).unwrap_or_else(|e| panic!("{e}"))
}

pub fn is_function(params: Vec<DFPattern>, body: DFPattern) -> DFPattern {
    DFPattern::new(PatternKind::Function { params: Some(params), body })
}

/// Function with any parameter list.
pub fn is_function_any(body: DFPattern) -> DFPattern {
    DFPattern::new(PatternKind::Function { params: None, body })
}

pub fn is_if(cond: DFPattern, then_branch: DFPattern, else_branch: DFPattern) -> DFPattern {
    DFPattern::new(PatternKind::If { cond, then_branch, else_branch })
}

/// Shape literal pattern.
pub fn is_shape(dims: impl IntoIterator<Item = impl Into<PrimExpr>>) -> DFPattern {
    DFPattern::new(PatternKind::PrimArr(dims.into_iter().map(Into::into).collect()))
}

pub fn is_runtime_dep_shape() -> DFPattern {
    DFPattern::new(PatternKind::RuntimeDepShape)
}

/// Dominator pattern: every input path from a `child` match reaches a
/// `parent` match through nodes matching `path`.
pub fn dominates(parent: DFPattern, path: DFPattern, child: DFPattern) -> DFPattern {
    DFPattern::new(PatternKind::Dominator { child, path, parent })
}

// ============================================================================
// Display
// ============================================================================

fn write_list(f: &mut fmt::Formatter<'_>, items: &[DFPattern]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_dims(f: &mut fmt::Formatter<'_>, dims: &[PrimExpr]) -> fmt::Result {
    write!(f, "[")?;
    for (i, dim) in dims.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{dim}")?;
    }
    write!(f, "]")
}

impl fmt::Display for DFPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            PatternKind::Wildcard => write!(f, "*"),
            PatternKind::Or(l, r) => write!(f, "({l} | {r})"),
            PatternKind::And(l, r) => write!(f, "({l} & {r})"),
            PatternKind::Not(p) => write!(f, "!{p}"),
            PatternKind::Constant => write!(f, "const"),
            PatternKind::Var { name } if name.is_empty() => write!(f, "var"),
            PatternKind::Var { name } => write!(f, "var({name})"),
            PatternKind::ExternFunc { name } if name.is_empty() => write!(f, "extern"),
            PatternKind::ExternFunc { name } => write!(f, "extern({name})"),
            PatternKind::Expr(expr) => write!(f, "{expr}"),
            PatternKind::Tuple { fields: Some(fields) } => {
                write!(f, "(")?;
                write_list(f, fields)?;
                write!(f, ")")
            }
            PatternKind::Tuple { fields: None } => write!(f, "(..)"),
            PatternKind::TupleGetItem { tuple, index: Some(index) } => write!(f, "{tuple}.{index}"),
            PatternKind::TupleGetItem { tuple, index: None } => write!(f, "{tuple}.*"),
            PatternKind::Function { params, body } => {
                write!(f, "fn(")?;
                match params {
                    Some(params) => write_list(f, params)?,
                    None => write!(f, "..")?,
                }
                write!(f, ") {{ {body} }}")
            }
            PatternKind::If { cond, then_branch, else_branch } => {
                write!(f, "if {cond} {{ {then_branch} }} else {{ {else_branch} }}")
            }
            PatternKind::Call { op, args } => {
                write!(f, "{op}(")?;
                match args {
                    Some(args) => write_list(f, args)?,
                    None => write!(f, "..")?,
                }
                write!(f, ")")
            }
            PatternKind::Attr { pattern, attrs } => {
                write!(f, "{pattern}[")?;
                for (i, (name, value)) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                write!(f, "]")
            }
            PatternKind::Type { ty, pattern } => write!(f, "{pattern} : {ty}"),
            PatternKind::Shape { shape, pattern } => {
                write!(f, "{pattern} shape=")?;
                write_dims(f, shape)
            }
            PatternKind::DataType { dtype, pattern } => write!(f, "{pattern} dtype={dtype}"),
            PatternKind::PrimArr(dims) => {
                write!(f, "shape")?;
                write_dims(f, dims)
            }
            PatternKind::RuntimeDepShape => write!(f, "shape[runtime]"),
            PatternKind::Dominator { child, path, parent } => write!(f, "dominates({parent}, {path}, {child})"),
        }
    }
}
