//! Expression constructors.
//!
//! Constructors that can reject their input come in two forms: `try_*` returns
//! a [`Result`], the plain form panics with the error message. The panicking
//! forms are meant for hand-written graphs in tests and builders.

use std::sync::Arc;

use dfpat_dtype::DType;
use dfpat_dtype::ext::HasDType;
use smallvec::SmallVec;
use snafu::ensure;

use crate::attrs::{Attrs, DictAttrs};
use crate::error::{
    CallArityMismatchSnafu, ConstantSizeMismatchSnafu, FunctionParamNotVarSnafu, Result, TupleIndexOutOfBoundsSnafu,
};
use crate::expr::core::{Constant, Expr, ExprKind, Var, next_var_id};
use crate::operator::{OPERATORS, Operator};
use crate::prim::PrimExpr;
use crate::ty::{Type, infer_type};
use crate::types::ConstValue;

fn or_panic<T>(result: Result<T>) -> T {
    result.unwrap_or_else(|e| panic!("{e}"))
}

impl Expr {
    /// Fresh variable with a new [`VarId`](crate::VarId).
    pub fn var(name_hint: impl Into<String>) -> Arc<Self> {
        Self::with_kind(ExprKind::Var(Var { id: next_var_id(), name_hint: name_hint.into() }))
    }

    /// Fresh variable annotated with a checked type.
    pub fn typed_var(name_hint: impl Into<String>, ty: Type) -> Arc<Self> {
        Self::var(name_hint).with_type(ty)
    }

    /// Rank-0 constant holding one value of `T`'s dtype.
    pub fn scalar<T: HasDType + Into<ConstValue>>(value: T) -> Arc<Self> {
        Self::with_kind(ExprKind::Constant(Constant {
            dtype: T::DTYPE,
            shape: SmallVec::new(),
            data: Arc::from([value.into()]),
        }))
    }

    /// Dense constant tensor.
    pub fn try_constant(
        dtype: DType,
        shape: impl IntoIterator<Item = usize>,
        data: impl IntoIterator<Item = impl Into<ConstValue>>,
    ) -> Result<Arc<Self>> {
        let shape: SmallVec<[usize; 4]> = shape.into_iter().collect();
        let data: Arc<[ConstValue]> = data.into_iter().map(Into::into).collect();
        let expected = shape.iter().product::<usize>();
        ensure!(
            data.len() == expected,
            ConstantSizeMismatchSnafu { shape: shape.to_vec(), expected, actual: data.len() }
        );
        Ok(Self::with_kind(ExprKind::Constant(Constant { dtype, shape, data })))
    }

    pub fn constant(
        dtype: DType,
        shape: impl IntoIterator<Item = usize>,
        data: impl IntoIterator<Item = impl Into<ConstValue>>,
    ) -> Arc<Self> {
        or_panic(Self::try_constant(dtype, shape, data))
    }

    /// Reference to the registered operator `name`.
    ///
    /// The node is interned: repeated calls return the same `Arc`.
    pub fn try_op(name: &str) -> Result<Arc<Self>> {
        Ok(OPERATORS.op_expr(&Operator::get(name)?))
    }

    pub fn op(name: &str) -> Arc<Self> {
        or_panic(Self::try_op(name))
    }

    pub fn extern_func(global_symbol: impl Into<String>) -> Arc<Self> {
        Self::with_kind(ExprKind::ExternFunc { global_symbol: global_symbol.into() })
    }

    /// Call `op` with `args`.
    ///
    /// When `op` is a primitive operator with a declared arity, the argument
    /// count must agree with it.
    pub fn try_call(op: Arc<Self>, args: Vec<Arc<Self>>) -> Result<Arc<Self>> {
        Self::try_call_with_attrs(op, args, None)
    }

    pub fn call(op: Arc<Self>, args: Vec<Arc<Self>>) -> Arc<Self> {
        or_panic(Self::try_call(op, args))
    }

    pub fn try_call_with_attrs(op: Arc<Self>, args: Vec<Arc<Self>>, attrs: Option<Attrs>) -> Result<Arc<Self>> {
        if let Some(operator) = op.as_operator()
            && let Some(expected) = operator.num_inputs()
        {
            ensure!(
                args.len() == expected,
                CallArityMismatchSnafu { op: operator.name(), expected, actual: args.len() }
            );
        }
        Ok(Self::with_kind(ExprKind::Call { op, args, attrs }))
    }

    pub fn call_with_attrs(op: Arc<Self>, args: Vec<Arc<Self>>, attrs: Attrs) -> Arc<Self> {
        or_panic(Self::try_call_with_attrs(op, args, Some(attrs)))
    }

    /// Call the registered operator `name`.
    pub fn try_call_op(name: &str, args: Vec<Arc<Self>>) -> Result<Arc<Self>> {
        Self::try_call(Self::try_op(name)?, args)
    }

    pub fn call_op(name: &str, args: Vec<Arc<Self>>) -> Arc<Self> {
        or_panic(Self::try_call_op(name, args))
    }

    pub fn tuple(fields: Vec<Arc<Self>>) -> Arc<Self> {
        Self::with_kind(ExprKind::Tuple(fields))
    }

    /// Project field `index` out of `tuple`.
    ///
    /// The index is checked when the tuple's arity is known, either from a
    /// tuple literal or from a tuple type.
    pub fn try_tuple_get_item(tuple: Arc<Self>, index: usize) -> Result<Arc<Self>> {
        let arity = match tuple.kind() {
            ExprKind::Tuple(fields) => Some(fields.len()),
            _ => match infer_type(&tuple) {
                Some(Type::Tuple(fields)) => Some(fields.len()),
                _ => None,
            },
        };
        if let Some(arity) = arity {
            ensure!(index < arity, TupleIndexOutOfBoundsSnafu { index, arity });
        }
        Ok(Self::with_kind(ExprKind::TupleGetItem { tuple, index }))
    }

    pub fn tuple_get_item(tuple: Arc<Self>, index: usize) -> Arc<Self> {
        or_panic(Self::try_tuple_get_item(tuple, index))
    }

    /// Function over `params`, all of which must be variables.
    pub fn try_function(params: Vec<Arc<Self>>, body: Arc<Self>, attrs: DictAttrs) -> Result<Arc<Self>> {
        for (position, param) in params.iter().enumerate() {
            ensure!(param.as_var().is_some(), FunctionParamNotVarSnafu { position, param: param.to_string() });
        }
        Ok(Self::with_kind(ExprKind::Function { params, body, attrs }))
    }

    pub fn function(params: Vec<Arc<Self>>, body: Arc<Self>) -> Arc<Self> {
        or_panic(Self::try_function(params, body, DictAttrs::new()))
    }

    pub fn function_with_attrs(params: Vec<Arc<Self>>, body: Arc<Self>, attrs: DictAttrs) -> Arc<Self> {
        or_panic(Self::try_function(params, body, attrs))
    }

    pub fn if_(cond: Arc<Self>, then_branch: Arc<Self>, else_branch: Arc<Self>) -> Arc<Self> {
        Self::with_kind(ExprKind::If { cond, then_branch, else_branch })
    }

    /// Shape literal.
    pub fn shape_expr(dims: impl IntoIterator<Item = impl Into<PrimExpr>>) -> Arc<Self> {
        Self::with_kind(ExprKind::ShapeExpr(dims.into_iter().map(Into::into).collect()))
    }
}
