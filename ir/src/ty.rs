//! Types of dataflow expressions and the type deduction oracle.
//!
//! Type checking proper happens outside this crate. Expressions either carry
//! a checked type annotation or get one deduced here from structurally
//! obvious cases (constants, tuples, projections, shape literals, functions).

use std::fmt;
use std::sync::Arc;

use dfpat_dtype::DType;

use crate::{Expr, ExprKind};

/// Type of a dataflow expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Opaque runtime object.
    Object,
    /// Shape value (result of a shape literal).
    Shape,
    /// Tensor with optionally known rank and element type.
    DynTensor { ndim: Option<usize>, dtype: Option<DType> },
    Tuple(Vec<Type>),
    Func { params: Vec<Type>, ret: Box<Type> },
}

impl Type {
    pub fn tensor(ndim: usize, dtype: DType) -> Self {
        Type::DynTensor { ndim: Some(ndim), dtype: Some(dtype) }
    }

    /// Element dtype if this is a tensor type with known dtype.
    pub fn dtype(&self) -> Option<DType> {
        match self {
            Type::DynTensor { dtype, .. } => *dtype,
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Object => write!(f, "Object"),
            Type::Shape => write!(f, "Shape"),
            Type::DynTensor { ndim, dtype } => {
                let ndim = ndim.map_or_else(|| "?".to_string(), |n| n.to_string());
                let dtype = dtype.map_or_else(|| "?".to_string(), |d| d.to_string());
                write!(f, "Tensor[ndim={ndim}, {dtype}]")
            }
            Type::Tuple(fields) => {
                write!(f, "(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")
            }
            Type::Func { params, ret } => {
                write!(f, "fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {ret}")
            }
        }
    }
}

/// Type of an expression: its annotation, or a structural deduction.
///
/// Returns `None` when nothing is known (un-annotated calls and variables).
pub fn infer_type(expr: &Arc<Expr>) -> Option<Type> {
    if let Some(ty) = expr.checked_type() {
        return Some(ty.clone());
    }

    match expr.kind() {
        ExprKind::Constant(c) => Some(Type::tensor(c.shape.len(), c.dtype)),
        ExprKind::ShapeExpr(_) => Some(Type::Shape),
        ExprKind::ExternFunc { .. } => Some(Type::Object),
        ExprKind::Tuple(fields) => fields.iter().map(infer_type).collect::<Option<Vec<_>>>().map(Type::Tuple),
        ExprKind::TupleGetItem { tuple, index } => match infer_type(tuple)? {
            Type::Tuple(mut fields) if *index < fields.len() => Some(fields.swap_remove(*index)),
            _ => None,
        },
        ExprKind::Function { params, body, .. } => {
            let params = params.iter().map(|p| infer_type(p).unwrap_or(Type::Object)).collect();
            Some(Type::Func { params, ret: Box::new(infer_type(body)?) })
        }
        ExprKind::If { then_branch, else_branch, .. } => {
            let then_ty = infer_type(then_branch)?;
            let else_ty = infer_type(else_branch)?;
            if then_ty == else_ty { Some(then_ty) } else { None }
        }
        ExprKind::Call { op, .. } => match infer_type(op)? {
            Type::Func { ret, .. } => Some(*ret),
            _ => None,
        },
        ExprKind::Var(_) | ExprKind::Op(_) => None,
    }
}
