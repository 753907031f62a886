//! Forcing an expression tree to a value.
//!
//! There are two kinds of evaluation. [`evaluate()`] produces a new value.
//! [`accumulate()`] adds the value of a tree into an existing buffer, which
//! is what `+=` and `-=` do. Each dispatches on the shape of the tree to an
//! operator tag in [`ops`], which tries its rules in order and falls back to
//! evaluating the operands first.
//!
//! [`ops`]: super::ops

use std::fmt::{self, Display, Formatter};

use log::{trace};

use super::{ops, Dense, DenseMut, Element, Kernel, Node, Op};
use ops::{Operator};

/// The result of evaluating a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value<T> {
    Scalar(T),
    Dense(Dense<T>),
}

impl<T: Element> Value<T> {
    /// The value as a scalar, if it is one or is a one-element array.
    pub fn as_scalar(&self) -> Option<T> {
        match self {
            &Value::Scalar(x) => Some(x),
            Value::Dense(dense) if dense.items().len() == 1 => Some(dense.items()[0]),
            Value::Dense(_) => None,
        }
    }

    /// The value as an array. A scalar becomes a one-element vector.
    pub fn into_dense(self) -> Dense<T> {
        match self {
            Value::Dense(dense) => dense,
            Value::Scalar(x) => Dense::new([1], [x]),
        }
    }
}

/// Describes the value without its contents.
impl<T: Element> Display for Value<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Scalar(x) => write!(f, "the scalar {}", x),
            Value::Dense(dense) => write!(f, "an array of shape {:?}", dense.shape()),
        }
    }
}

// ----------------------------------------------------------------------------

/// Computes the value of `node` using `kernel`.
///
/// ```
/// use exprarray::{Array, Node, Reference, Value, evaluate};
/// let a: Array<f64, 1> = Array::new([2], [1.0, 2.0]);
/// let node = Node::scale(3.0, Node::leaf(a.view()));
/// let value = evaluate(&node, &Reference).unwrap();
/// assert_eq!(value.into_dense().items(), [3.0, 6.0]);
/// ```
pub fn evaluate<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
    trace!("Evaluating {}", node);
    match node {
        &Node::Literal(x) => Ok(Value::Scalar(x)),
        Node::Leaf(leaf) => Ok(Value::Dense(leaf.view().to_owned())),
        Node::Transpose(_) => ops::Transpose::apply(node, kernel),
        Node::Binary(op, _, _) => match op {
            Op::Add => ops::Add::apply(node, kernel),
            Op::Sub => ops::Sub::apply(node, kernel),
            Op::Mul => ops::Mul::apply(node, kernel),
            Op::Div => ops::Div::apply(node, kernel),
        },
    }
}

/// Adds the value of `node` into `target` using `kernel`.
///
/// Panics if the value does not have the shape of `target`.
pub fn accumulate<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Result<(), K::Error> {
    trace!("Accumulating {} into {:?}", node, target.shape());
    ops::Accumulate::apply(target, node, kernel)
}

/// Whether a value of shape `a` can be combined elementwise with one of
/// shape `b`. Shapes must be equal, except that a vector conforms with an
/// `n x 1` or `1 x n` matrix of the same length.
pub(crate) fn conformable(a: &[usize], b: &[usize]) -> bool {
    fn is_vector(s: &[usize]) -> bool { s.iter().filter(|&&n| n != 1).count() <= 1 }
    a == b || (
        (a.len() == 1 || b.len() == 1) &&
        is_vector(a) && is_vector(b) &&
        a.iter().product::<usize>() == b.iter().product::<usize>()
    )
}

// ----------------------------------------------------------------------------
