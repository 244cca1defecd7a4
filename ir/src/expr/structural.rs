//! Deep structural equality.
//!
//! Two expressions are structurally equal when they have the same kind and
//! their payloads and inputs are pairwise structurally equal, in order.
//! Node identity plays no role except for variables: a variable only equals
//! itself, or the variable it is paired with as a parameter of two functions
//! being compared. Type and shape annotations are not compared.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::attrs::{Attrs, DictAttrs};
use crate::expr::core::{Expr, ExprKind, VarId};
use crate::prim::PrimExpr;
use crate::ty::Type;
use crate::types::{Object, RetValue};

/// Structural (content) equality, as opposed to identity.
pub trait StructuralEq {
    fn structural_eq(&self, other: &Self) -> bool;
}

/// Whether `a` and `b` are structurally equal expressions.
pub fn structural_equal(a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
    ExprEqualizer::default().equal(a, b)
}

impl StructuralEq for Arc<Expr> {
    fn structural_eq(&self, other: &Self) -> bool {
        structural_equal(self, other)
    }
}

impl StructuralEq for Type {
    fn structural_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl StructuralEq for PrimExpr {
    fn structural_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl StructuralEq for Object {
    fn structural_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::IntImm(a), Object::IntImm(b)) => a == b,
            (Object::FloatImm(a), Object::FloatImm(b)) => a.to_bits() == b.to_bits(),
            (Object::StringImm(a), Object::StringImm(b)) | (Object::Str(a), Object::Str(b)) => a == b,
            (Object::DType(a), Object::DType(b)) => a == b,
            (Object::Prim(a), Object::Prim(b)) => a.structural_eq(b),
            (Object::Type(a), Object::Type(b)) => a.structural_eq(b),
            (Object::Expr(a), Object::Expr(b)) => structural_equal(a, b),
            (Object::Array(a), Object::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structural_eq(y))
            }
            _ => false,
        }
    }
}

impl StructuralEq for RetValue {
    fn structural_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RetValue::Null, RetValue::Null) => true,
            (RetValue::Int(a), RetValue::Int(b)) => a == b,
            (RetValue::Float(a), RetValue::Float(b)) => a.to_bits() == b.to_bits(),
            (RetValue::Str(a), RetValue::Str(b)) => a == b,
            (RetValue::DataType(a), RetValue::DataType(b)) => a == b,
            (RetValue::Object(a), RetValue::Object(b)) => a.structural_eq(b),
            (RetValue::Handle(a), RetValue::Handle(b)) => a == b,
            _ => false,
        }
    }
}

impl StructuralEq for Attrs {
    fn structural_eq(&self, other: &Self) -> bool {
        self.type_key() == other.type_key()
            && self.len() == other.len()
            && self.fields().zip(other.fields()).all(|((na, va), (nb, vb))| na == nb && va.structural_eq(vb))
    }
}

impl StructuralEq for DictAttrs {
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|((ka, va), (kb, vb))| ka == kb && va.structural_eq(vb))
    }
}

#[derive(Default)]
struct ExprEqualizer {
    /// Parameters of `a`-side functions paired with their `b`-side counterparts.
    var_map: HashMap<VarId, VarId>,
    /// Node pairs already shown equal outside any function scope.
    proven: HashSet<(u64, u64)>,
}

impl ExprEqualizer {
    fn equal(&mut self, a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
        if Arc::ptr_eq(a, b) && self.var_map.is_empty() {
            return true;
        }
        if self.proven.contains(&(a.id, b.id)) {
            return true;
        }

        let equal = self.equal_kind(a, b);
        // A pair shown equal under a parameter pairing may not be equal without it.
        if equal && self.var_map.is_empty() {
            self.proven.insert((a.id, b.id));
        }
        equal
    }

    fn equal_all(&mut self, a: &[Arc<Expr>], b: &[Arc<Expr>]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.equal(x, y))
    }

    fn equal_kind(&mut self, a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
        match (a.kind(), b.kind()) {
            (ExprKind::Constant(ca), ExprKind::Constant(cb)) => {
                ca.dtype == cb.dtype
                    && ca.shape == cb.shape
                    && ca.data.len() == cb.data.len()
                    && ca.data.iter().zip(cb.data.iter()).all(|(x, y)| x.bit_eq(y))
            }
            (ExprKind::Var(va), ExprKind::Var(vb)) => match self.var_map.get(&va.id) {
                Some(mapped) => *mapped == vb.id,
                None => va.id == vb.id,
            },
            (ExprKind::ExternFunc { global_symbol: sa }, ExprKind::ExternFunc { global_symbol: sb }) => sa == sb,
            (ExprKind::Op(oa), ExprKind::Op(ob)) => Arc::ptr_eq(oa, ob) || oa.name() == ob.name(),
            (
                ExprKind::Call { op: opa, args: aa, attrs: ta },
                ExprKind::Call { op: opb, args: ab, attrs: tb },
            ) => {
                let attrs_equal = match (ta, tb) {
                    (None, None) => true,
                    (Some(x), Some(y)) => x.structural_eq(y),
                    _ => false,
                };
                attrs_equal && self.equal(opa, opb) && self.equal_all(aa, ab)
            }
            (ExprKind::Tuple(fa), ExprKind::Tuple(fb)) => self.equal_all(fa, fb),
            (ExprKind::TupleGetItem { tuple: ta, index: ia }, ExprKind::TupleGetItem { tuple: tb, index: ib }) => {
                ia == ib && self.equal(ta, tb)
            }
            (
                ExprKind::Function { params: pa, body: ba, attrs: aa },
                ExprKind::Function { params: pb, body: bb, attrs: ab },
            ) => {
                if pa.len() != pb.len() || !aa.structural_eq(ab) {
                    return false;
                }
                let mut added = Vec::with_capacity(pa.len());
                for (x, y) in pa.iter().zip(pb) {
                    if let (Some(vx), Some(vy)) = (x.as_var(), y.as_var())
                        && !self.var_map.contains_key(&vx.id)
                    {
                        self.var_map.insert(vx.id, vy.id);
                        added.push(vx.id);
                    }
                }
                let equal = self.equal_all(pa, pb) && self.equal(ba, bb);
                for id in added {
                    self.var_map.remove(&id);
                }
                equal
            }
            (
                ExprKind::If { cond: ca, then_branch: ta, else_branch: ea },
                ExprKind::If { cond: cb, then_branch: tb, else_branch: eb },
            ) => self.equal(ca, cb) && self.equal(ta, tb) && self.equal(ea, eb),
            (ExprKind::ShapeExpr(da), ExprKind::ShapeExpr(db)) => da == db,
            _ => false,
        }
    }
}
