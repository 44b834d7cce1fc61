//! Time- and state-dependent scalar coefficients.
//!
//! A [`ScalarCoefficient`] is a boxed number with an optional update rule
//! `(old, u, p, t) -> new`. It is the only mutable quantity inside a
//! [`ScaledOperator`](crate::operator::ScaledOperator), and it changes only
//! through [`ScalarCoefficient::refresh`]; apply and solve never touch it.
//!
//! Arithmetic between coefficients keeps both operands' update rules: the
//! result remembers the operation and recombines the refreshed operands on
//! every refresh. Only when both operands are constant does the result
//! collapse to a plain constant.

use crate::core::traits::Scalar;
use crate::error::OpError;
use log::trace;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

/// Update rule signature: `(old value, state u, parameters p, time t) -> new value`.
pub type UpdateFn<T> = Arc<dyn Fn(T, &[T], &[T], T) -> T + Send + Sync>;

/// Binary operation recorded by a combined coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl CoefficientOp {
    fn eval<T: Scalar>(self, lhs: T, rhs: T) -> T {
        match self {
            CoefficientOp::Add => lhs + rhs,
            CoefficientOp::Sub => lhs - rhs,
            CoefficientOp::Mul => lhs * rhs,
            CoefficientOp::Div => lhs / rhs,
        }
    }
}

/// How a coefficient's value evolves on refresh.
#[derive(Clone)]
pub enum UpdateRule<T> {
    /// Never changes.
    Constant,
    /// User-supplied rule.
    Func(UpdateFn<T>),
    /// Result of arithmetic between two coefficients.
    Combined {
        op: CoefficientOp,
        lhs: Box<ScalarCoefficient<T>>,
        rhs: Box<ScalarCoefficient<T>>,
    },
}

impl<T> fmt::Debug for UpdateRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateRule::Constant => f.write_str("Constant"),
            UpdateRule::Func(_) => f.write_str("Func(..)"),
            UpdateRule::Combined { op, .. } => write!(f, "Combined({:?})", op),
        }
    }
}

/// A scalar value with an optional update rule.
#[derive(Clone)]
pub struct ScalarCoefficient<T> {
    value: T,
    rule: UpdateRule<T>,
}

impl<T: fmt::Debug> fmt::Debug for ScalarCoefficient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarCoefficient")
            .field("value", &self.value)
            .field("rule", &self.rule)
            .finish()
    }
}

impl<T: Scalar> ScalarCoefficient<T> {
    /// A constant coefficient.
    pub fn new(value: T) -> Self {
        Self { value, rule: UpdateRule::Constant }
    }

    /// A coefficient re-evaluated by `update` on every refresh.
    pub fn with_update<F>(value: T, update: F) -> Self
    where
        F: Fn(T, &[T], &[T], T) -> T + Send + Sync + 'static,
    {
        Self { value, rule: UpdateRule::Func(Arc::new(update)) }
    }

    /// Current value.
    pub fn value(&self) -> T {
        self.value
    }

    pub fn rule(&self) -> &UpdateRule<T> {
        &self.rule
    }

    /// True iff no update rule is attached.
    pub fn is_constant(&self) -> bool {
        matches!(self.rule, UpdateRule::Constant)
    }

    pub fn is_zero(&self) -> bool {
        self.value == T::zero()
    }

    pub fn abs(&self) -> T {
        self.value.abs()
    }

    /// Conjugated value; the update rule is kept.
    pub fn conj(&self) -> Self {
        Self { value: self.value.conj(), rule: self.rule.clone() }
    }

    /// Re-evaluate the value from state `u`, parameters `p` and time `t`.
    pub fn refresh(&mut self, u: &[T], p: &[T], t: T) {
        match &mut self.rule {
            UpdateRule::Constant => {}
            UpdateRule::Func(update) => {
                self.value = update(self.value, u, p, t);
                trace!("coefficient refreshed to {:?} at t = {:?}", self.value, t);
            }
            UpdateRule::Combined { op, lhs, rhs } => {
                lhs.refresh(u, p, t);
                rhs.refresh(u, p, t);
                self.value = op.eval(lhs.value, rhs.value);
            }
        }
    }

    /// `value * x`.
    pub fn apply(&self, x: &[T]) -> Vec<T> {
        x.iter().map(|&xi| self.value * xi).collect()
    }

    /// Scale `y` by `value` in place.
    pub fn apply_in_place(&self, y: &mut [T]) {
        for yi in y.iter_mut() {
            *yi = self.value * *yi;
        }
    }

    /// `x / value`.
    pub fn solve(&self, x: &[T]) -> Result<Vec<T>, OpError> {
        if self.is_zero() {
            return Err(OpError::Singular);
        }
        Ok(x.iter().map(|&xi| xi / self.value).collect())
    }

    /// Divide `y` by `value` in place.
    pub fn solve_in_place(&self, y: &mut [T]) -> Result<(), OpError> {
        if self.is_zero() {
            return Err(OpError::Singular);
        }
        for yi in y.iter_mut() {
            *yi = *yi / self.value;
        }
        Ok(())
    }

    fn combine(op: CoefficientOp, lhs: Self, rhs: Self) -> Self {
        let value = op.eval(lhs.value, rhs.value);
        if lhs.is_constant() && rhs.is_constant() {
            Self::new(value)
        } else {
            Self {
                value,
                rule: UpdateRule::Combined { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
            }
        }
    }
}

impl<T: Scalar> From<T> for ScalarCoefficient<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

macro_rules! coefficient_binop {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Scalar> $trait for ScalarCoefficient<T> {
            type Output = ScalarCoefficient<T>;
            fn $method(self, rhs: Self) -> Self::Output {
                ScalarCoefficient::combine($op, self, rhs)
            }
        }

        impl<T: Scalar> $trait<T> for ScalarCoefficient<T> {
            type Output = ScalarCoefficient<T>;
            fn $method(self, rhs: T) -> Self::Output {
                ScalarCoefficient::combine($op, self, ScalarCoefficient::new(rhs))
            }
        }
    };
}

coefficient_binop!(Add, add, CoefficientOp::Add);
coefficient_binop!(Sub, sub, CoefficientOp::Sub);
coefficient_binop!(Mul, mul, CoefficientOp::Mul);
coefficient_binop!(Div, div, CoefficientOp::Div);

impl<T: Scalar> Neg for ScalarCoefficient<T> {
    type Output = ScalarCoefficient<T>;
    fn neg(self) -> Self::Output {
        self * (-T::one())
    }
}

macro_rules! number_times_coefficient {
    ($($t:ty),*) => {$(
        impl Mul<ScalarCoefficient<$t>> for $t {
            type Output = ScalarCoefficient<$t>;
            fn mul(self, rhs: ScalarCoefficient<$t>) -> Self::Output {
                ScalarCoefficient::combine(CoefficientOp::Mul, ScalarCoefficient::new(self), rhs)
            }
        }
    )*};
}

number_times_coefficient!(f32, f64);
