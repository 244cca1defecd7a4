//! Symbolic integer equality prover.
//!
//! [`ArithAnalyzer`] decides equality of [`PrimExpr`]s by rewriting both sides
//! into a polynomial normal form: a sum of integer-weighted products of atoms.
//! Atoms are symbolic variables, or sub-expressions the normal form cannot
//! look into (a `floordiv` by a symbolic divisor, say), which are keyed by
//! their own normalized rendering. Two expressions are provably equal when
//! they share a normal form.
//!
//! The prover is sound but incomplete: `false` means "not provable", not
//! "different". Normalization gives up on any expression whose folding
//! leaves the `i64` range, so such expressions are never provably equal to
//! anything.
//!
//! # Examples
//!
//! ```rust
//! # use dfpat_ir::arith::{Analyzer, ArithAnalyzer};
//! # use dfpat_ir::prim::{PrimExpr, SymVar};
//! let n = SymVar::new("n");
//! let analyzer = ArithAnalyzer::new();
//! let lhs = (PrimExpr::from(&n) + 1) * 2;
//! let rhs = PrimExpr::from(&n) * 2 + 2;
//! assert!(analyzer.can_prove_equal(&lhs, &rhs));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use snafu::ensure;
use tracing::trace;

use crate::error::{CyclicBindingSnafu, Result};
use crate::prim::{PrimBinOp, PrimExpr, SymVar};

/// Decision procedure for symbolic integer facts.
pub trait Analyzer {
    /// Whether `a == b` holds for every assignment of the free variables.
    fn can_prove_equal(&self, a: &PrimExpr, b: &PrimExpr) -> bool;

    /// Value `var` is known to be equal to, if any.
    fn bound_value(&self, var: &SymVar) -> Option<PrimExpr>;

    /// Dimension-wise equality of two shapes of the same rank.
    fn shapes_equal(&self, a: &[PrimExpr], b: &[PrimExpr]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.can_prove_equal(x, y))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Atom {
    Var(u64),
    Opaque(String),
}

/// Product of atoms, sorted; empty for the constant term.
type Monomial = Vec<Atom>;

/// Sum of monomials with non-zero coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Poly(BTreeMap<Monomial, i64>);

impl Poly {
    fn constant(value: i64) -> Self {
        let mut terms = BTreeMap::new();
        if value != 0 {
            terms.insert(Vec::new(), value);
        }
        Poly(terms)
    }

    fn atom(atom: Atom) -> Self {
        Poly(BTreeMap::from([(vec![atom], 1)]))
    }

    fn as_const(&self) -> Option<i64> {
        match self.0.len() {
            0 => Some(0),
            1 => self.0.get(&Vec::new()).copied(),
            _ => None,
        }
    }

    /// Adds `coeff * monomial`; `None` once a coefficient leaves the `i64` range.
    fn add_term(&mut self, monomial: Monomial, coeff: i64) -> Option<()> {
        let slot = self.0.entry(monomial).or_insert(0);
        *slot = slot.checked_add(coeff)?;
        if *slot == 0 {
            self.0.retain(|_, c| *c != 0);
        }
        Some(())
    }

    fn add(mut self, rhs: &Poly) -> Option<Poly> {
        for (monomial, coeff) in &rhs.0 {
            self.add_term(monomial.clone(), *coeff)?;
        }
        Some(self)
    }

    fn sub(mut self, rhs: &Poly) -> Option<Poly> {
        for (monomial, coeff) in &rhs.0 {
            self.add_term(monomial.clone(), coeff.checked_neg()?)?;
        }
        Some(self)
    }

    fn mul(&self, rhs: &Poly) -> Option<Poly> {
        let mut out = Poly::default();
        for (ma, ca) in &self.0 {
            for (mb, cb) in &rhs.0 {
                let mut monomial: Monomial = ma.iter().chain(mb).cloned().collect();
                monomial.sort();
                out.add_term(monomial, ca.checked_mul(*cb)?)?;
            }
        }
        Some(out)
    }

    /// Stable textual key, used to name opaque atoms.
    fn render(&self) -> String {
        if self.0.is_empty() {
            return "0".to_string();
        }
        let mut out = String::new();
        for (i, (monomial, coeff)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('+');
            }
            let _ = write!(out, "{coeff}");
            for atom in monomial {
                match atom {
                    Atom::Var(id) => {
                        let _ = write!(out, "*v{id}");
                    }
                    Atom::Opaque(key) => {
                        let _ = write!(out, "*[{key}]");
                    }
                }
            }
        }
        out
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a.checked_rem(b)? != 0 && ((a < 0) != (b < 0)) { q.checked_sub(1) } else { Some(q) }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    a.checked_sub(floor_div(a, b)?.checked_mul(b)?)
}

/// Polynomial normal-form prover with optional variable bindings.
#[derive(Debug, Clone, Default)]
pub struct ArithAnalyzer {
    bindings: HashMap<SymVar, PrimExpr>,
}

impl ArithAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `var` equals `value` for every later query.
    ///
    /// Fails if `value`, after resolving existing bindings, refers to `var`.
    pub fn bind(&mut self, var: &SymVar, value: impl Into<PrimExpr>) -> Result<()> {
        let value = value.into();
        ensure!(
            !self.substitute(&value).mentions(var),
            CyclicBindingSnafu { var: var.to_string(), value: value.to_string() }
        );
        trace!(var = %var, value = %value, "bind symbolic variable");
        self.bindings.insert(var.clone(), value);
        Ok(())
    }

    /// Concrete value of `expr`, if it folds to a constant without overflow.
    pub fn const_value(&self, expr: &PrimExpr) -> Option<i64> {
        self.normalize(expr)?.as_const()
    }

    fn substitute(&self, expr: &PrimExpr) -> PrimExpr {
        match expr {
            PrimExpr::Int(_) => expr.clone(),
            PrimExpr::Var(v) => match self.bindings.get(v) {
                Some(value) => self.substitute(value),
                None => expr.clone(),
            },
            PrimExpr::Binary(op, lhs, rhs) => PrimExpr::binary(*op, self.substitute(lhs), self.substitute(rhs)),
        }
    }

    fn normalize(&self, expr: &PrimExpr) -> Option<Poly> {
        match expr {
            PrimExpr::Int(v) => Some(Poly::constant(*v)),
            PrimExpr::Var(v) => match self.bindings.get(v) {
                Some(value) => self.normalize(value),
                None => Some(Poly::atom(Atom::Var(v.id))),
            },
            PrimExpr::Binary(op, lhs, rhs) => {
                let lhs = self.normalize(lhs)?;
                let rhs = self.normalize(rhs)?;
                match op {
                    PrimBinOp::Add => lhs.add(&rhs),
                    PrimBinOp::Sub => lhs.sub(&rhs),
                    PrimBinOp::Mul => lhs.mul(&rhs),
                    PrimBinOp::FloorDiv | PrimBinOp::FloorMod | PrimBinOp::Min | PrimBinOp::Max => {
                        Self::fold_nonlinear(*op, lhs, rhs)
                    }
                }
            }
        }
    }

    fn fold_nonlinear(op: PrimBinOp, lhs: Poly, rhs: Poly) -> Option<Poly> {
        match (op, lhs.as_const(), rhs.as_const()) {
            (PrimBinOp::FloorDiv, Some(a), Some(b)) if b != 0 => return floor_div(a, b).map(Poly::constant),
            (PrimBinOp::FloorMod, Some(a), Some(b)) if b != 0 => return floor_mod(a, b).map(Poly::constant),
            (PrimBinOp::Min, Some(a), Some(b)) => return Some(Poly::constant(a.min(b))),
            (PrimBinOp::Max, Some(a), Some(b)) => return Some(Poly::constant(a.max(b))),
            (PrimBinOp::FloorDiv, _, Some(1)) => return Some(lhs),
            (PrimBinOp::FloorMod, _, Some(1)) => return Some(Poly::default()),
            _ => {}
        }
        if matches!(op, PrimBinOp::Min | PrimBinOp::Max) && lhs == rhs {
            return Some(lhs);
        }
        let name = match op {
            PrimBinOp::FloorDiv => "floordiv",
            PrimBinOp::FloorMod => "floormod",
            PrimBinOp::Min => "min",
            _ => "max",
        };
        Some(Poly::atom(Atom::Opaque(format!("{name}({},{})", lhs.render(), rhs.render()))))
    }
}

impl Analyzer for ArithAnalyzer {
    fn can_prove_equal(&self, a: &PrimExpr, b: &PrimExpr) -> bool {
        match (self.normalize(a), self.normalize(b)) {
            (Some(a), Some(b)) => a == b,
            _ => {
                trace!(lhs = %a, rhs = %b, "normalization overflowed");
                false
            }
        }
    }

    fn bound_value(&self, var: &SymVar) -> Option<PrimExpr> {
        self.bindings.get(var).map(|value| self.substitute(value))
    }
}
