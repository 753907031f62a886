//! Compile-time shape classes.
//!
//! Every [`Expr`] carries a class in its type: a scalar, an array of rank
//! `D`, or a row vector (a transposed vector). The traits in this module
//! compute the class of a result from the classes of the operands, the way
//! array shapes would be computed at run time, but with no run-time cost. An
//! operator whose classes have no result simply does not type-check, and an
//! expression can only be assigned to an [`Array`] of its own class.
//!
//! ```compile_fail
//! use exprarray::Array;
//! let x: Array<f64, 1> = Array::zeros([3]);
//! let y: Array<f64, 1> = Array::zeros([3]);
//! // A column vector times a column vector is not defined.
//! let _ = &x * &y;
//! ```
//!
//! ```compile_fail
//! use exprarray::{Array, transpose};
//! let x: Array<f64, 1> = Array::zeros([3]);
//! // `transpose(x) * x` is a scalar, not a vector.
//! let _: Array<f64, 1> = Array::from(transpose(&x) * &x);
//! ```
//!
//! [`Expr`]: super::Expr
//! [`Array`]: super::Array

use std::fmt::{self, Formatter};

use super::{fmt::print_row, Array, Element, Value};

/// The class of a scalar-valued expression.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scalar {}

/// The class of an expression whose value is a rank-`D` array.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rank<const D: usize> {}

/// The class of a transposed vector, i.e. a `1 x n` matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Row {}

/// A shape class.
pub trait Class {
    /// The type an expression of this class evaluates to.
    type Materialized<T: Element>;

    /// Converts the value computed by the evaluator.
    ///
    /// Panics if the value is of the wrong kind, which means a rule computed
    /// something other than what the class promised.
    fn materialize<T: Element>(value: Value<T>) -> Self::Materialized<T>;

    /// Prints a value of this class.
    fn print<T: Element>(value: Value<T>, f: &mut Formatter) -> fmt::Result;
}

impl Class for Scalar {
    type Materialized<T: Element> = T;

    fn materialize<T: Element>(value: Value<T>) -> T {
        match value.as_scalar() {
            Some(x) => x,
            None => panic!("Expected a scalar, got {}", value),
        }
    }

    fn print<T: Element>(value: Value<T>, f: &mut Formatter) -> fmt::Result {
        let x = Self::materialize(value);
        match f.precision() {
            Some(p) => writeln!(f, "{:.*}", p, x),
            None => writeln!(f, "{}", x),
        }
    }
}

impl<const D: usize> Class for Rank<D> {
    type Materialized<T: Element> = Array<T, D>;

    fn materialize<T: Element>(value: Value<T>) -> Array<T, D> {
        match value {
            Value::Dense(dense) => dense.into_array(),
            // A row times a column computed without knowing its class.
            Value::Scalar(x) => Array::filled([1; D], x),
        }
    }

    fn print<T: Element>(value: Value<T>, f: &mut Formatter) -> fmt::Result {
        fmt::Display::fmt(&Self::materialize(value), f)
    }
}

impl Class for Row {
    type Materialized<T: Element> = Array<T, 2>;

    fn materialize<T: Element>(value: Value<T>) -> Array<T, 2> {
        match value {
            Value::Dense(dense) => {
                let n = dense.items().len();
                assert!(
                    dense.shape().iter().filter(|&&s| s != 1).count() <= 1,
                    "Expected a row vector, got shape {:?}", dense.shape(),
                );
                dense.reshape([1, n]).into_array()
            },
            // A one-row matrix times a vector, transposed.
            Value::Scalar(x) => Array::filled([1, 1], x),
        }
    }

    /// A row prints on one line.
    fn print<T: Element>(value: Value<T>, f: &mut Formatter) -> fmt::Result {
        print_row(f, Self::materialize(value).as_ref())
    }
}

// ----------------------------------------------------------------------------

/// `Self` implements `Sum<Rhs>` if a `Self` can be added to or subtracted
/// from an `Rhs`. Both must have the same class.
pub trait Sum<Rhs: Class>: Class {
    type Output: Class;
}

impl<C: Class> Sum<C> for C {
    type Output = C;
}

/// `Self` implements `Product<Rhs>` if a `Self` can be multiplied by an
/// `Rhs`.
pub trait Product<Rhs: Class>: Class {
    type Output: Class;
}

macro_rules! product {
    ($l:ty, $r:ty => $o:ty) => {
        impl Product<$r> for $l { type Output = $o; }
    };
}

product!(Scalar, Scalar => Scalar);
product!(Scalar, Row => Row);
product!(Row, Scalar => Row);
product!(Rank<2>, Rank<2> => Rank<2>);
product!(Rank<2>, Rank<1> => Rank<1>);
product!(Rank<1>, Rank<2> => Rank<2>);
product!(Rank<2>, Row => Rank<2>);
product!(Rank<1>, Row => Rank<2>);
product!(Row, Rank<1> => Scalar);
product!(Row, Rank<2> => Row);

impl<const D: usize> Product<Rank<D>> for Scalar {
    type Output = Rank<D>;
}

impl<const D: usize> Product<Scalar> for Rank<D> {
    type Output = Rank<D>;
}

/// `Self` implements `Quotient<Rhs>` if a `Self` can be divided by an `Rhs`.
/// Only division by a scalar is defined.
pub trait Quotient<Rhs: Class>: Class {
    type Output: Class;
}

impl<C: Class> Quotient<Scalar> for C {
    type Output = C;
}

/// `Self` implements `Transposed` if it can be transposed.
pub trait Transposed: Class {
    type Output: Class;
}

impl Transposed for Scalar { type Output = Scalar; }
impl Transposed for Rank<1> { type Output = Row; }
impl Transposed for Row { type Output = Rank<1>; }
impl Transposed for Rank<2> { type Output = Rank<2>; }

// ----------------------------------------------------------------------------
