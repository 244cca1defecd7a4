//! Operator registry.
//!
//! Operators are interned by name: `Operator::get("add")` always returns the
//! same `Arc`, so callers may compare operators by pointer. Per-operator
//! metadata lives in named attribute maps (`TOpPattern`, ...), each a table
//! from operator name to a runtime value. An attribute map exists once any
//! operator has been given a value for it.
//!
//! The expression node referring to an operator is interned alongside it, so
//! every `Expr::op("add")` is the same node with the same id.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use snafu::OptionExt;

use crate::error::{Result, UnknownOperatorSnafu};
use crate::expr::{Expr, ExprKind};
use crate::types::RetValue;

/// Fusion category of an operator, stored in the `TOpPattern` attribute map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpPattern {
    ElemWise = 0,
    Broadcast = 1,
    Injective = 2,
    CommReduce = 3,
    OutElemWiseFusable = 4,
    Tuple = 7,
    Opaque = 8,
}

/// Attribute map holding each operator's [`OpPattern`] as an integer.
pub const TOP_PATTERN: &str = "TOpPattern";

/// A registered primitive operator.
#[derive(Debug)]
pub struct Operator {
    name: String,
    /// Declared argument count; `None` for variadic operators.
    num_inputs: Option<usize>,
}

impl Operator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_inputs(&self) -> Option<usize> {
        self.num_inputs
    }

    /// Whether swapping the two arguments preserves the result.
    ///
    /// Only `add` and `multiply` are treated as commutative.
    pub fn is_commutative(&self) -> bool {
        matches!(self.name.as_str(), "add" | "multiply")
    }

    /// Look up a registered operator.
    pub fn get(name: &str) -> Result<Arc<Operator>> {
        OPERATORS.get(name).context(UnknownOperatorSnafu { name })
    }

    /// Register an operator, or return the existing one with this name.
    pub fn register(name: &str, num_inputs: Option<usize>) -> Arc<Operator> {
        OPERATORS.register(name, num_inputs)
    }

    /// Whether any operator carries a value in the attribute map `attr`.
    pub fn has_attr_map(attr: &str) -> bool {
        OPERATORS.attr_maps.read().contains_key(attr)
    }

    /// Value of attribute map `attr` for this operator.
    pub fn get_attr(&self, attr: &str) -> Option<RetValue> {
        OPERATORS.attr_maps.read().get(attr)?.get(&self.name).cloned()
    }

    /// Set this operator's entry in attribute map `attr`.
    pub fn set_attr(&self, attr: &str, value: impl Into<RetValue>) {
        OPERATORS.set_attr(&self.name, attr, value.into());
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Process-wide operator table.
///
/// Read-mostly: lookups take a shared lock, registration an exclusive one.
pub struct OperatorRegistry {
    ops: RwLock<HashMap<String, Arc<Operator>>>,
    /// Attribute name -> (operator name -> value).
    attr_maps: RwLock<HashMap<String, HashMap<String, RetValue>>>,
    /// Operator name -> the shared `Op` expression node.
    exprs: RwLock<HashMap<String, Arc<Expr>>>,
}

impl OperatorRegistry {
    /// Create a registry seeded with the built-in numeric operators.
    pub fn new() -> Self {
        let registry = Self {
            ops: RwLock::new(HashMap::new()),
            attr_maps: RwLock::new(HashMap::new()),
            exprs: RwLock::new(HashMap::new()),
        };

        use OpPattern::*;
        #[rustfmt::skip]
        let builtins: &[(&str, Option<usize>, OpPattern)] = &[
            ("add", Some(2), Broadcast), ("subtract", Some(2), Broadcast),
            ("multiply", Some(2), Broadcast), ("divide", Some(2), Broadcast),
            ("floor_divide", Some(2), Broadcast), ("power", Some(2), Broadcast),
            ("maximum", Some(2), Broadcast), ("minimum", Some(2), Broadcast),
            ("negative", Some(1), ElemWise), ("exp", Some(1), ElemWise),
            ("log", Some(1), ElemWise), ("sqrt", Some(1), ElemWise),
            ("sigmoid", Some(1), ElemWise), ("tanh", Some(1), ElemWise),
            ("nn.relu", Some(1), ElemWise), ("nn.leaky_relu", Some(1), ElemWise),
            ("nn.conv2d", Some(2), OutElemWiseFusable), ("nn.dense", Some(2), OutElemWiseFusable),
            ("nn.matmul", Some(2), OutElemWiseFusable), ("nn.bias_add", Some(2), Broadcast),
            ("nn.softmax", Some(1), Opaque), ("reshape", Some(2), Injective),
            ("transpose", Some(1), Injective), ("sum", Some(1), CommReduce),
            ("mean", Some(1), CommReduce), ("concatenate", Some(1), Injective),
            ("split", Some(1), Injective),
        ];
        for &(name, num_inputs, pattern) in builtins {
            registry.register(name, num_inputs);
            registry.set_attr(name, TOP_PATTERN, RetValue::Int(pattern as i64));
        }

        registry
    }

    pub fn get(&self, name: &str) -> Option<Arc<Operator>> {
        self.ops.read().get(name).cloned()
    }

    pub fn register(&self, name: &str, num_inputs: Option<usize>) -> Arc<Operator> {
        if let Some(op) = self.ops.read().get(name) {
            return op.clone();
        }
        // Re-check under the write lock: another thread may have registered it.
        self.ops
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Operator { name: name.to_string(), num_inputs }))
            .clone()
    }

    /// The interned expression node for `op`.
    pub fn op_expr(&self, op: &Arc<Operator>) -> Arc<Expr> {
        if let Some(expr) = self.exprs.read().get(op.name()) {
            return expr.clone();
        }
        self.exprs
            .write()
            .entry(op.name().to_string())
            .or_insert_with(|| Expr::with_kind(ExprKind::Op(op.clone())))
            .clone()
    }

    pub fn set_attr(&self, op_name: &str, attr: &str, value: RetValue) {
        self.attr_maps.write().entry(attr.to_string()).or_default().insert(op_name.to_string(), value);
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global operator registry.
pub static OPERATORS: Lazy<OperatorRegistry> = Lazy::new(OperatorRegistry::new);
