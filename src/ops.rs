//! Operator tags.
//!
//! For each operator that can appear in an expression tree this module
//! contains a type of the same name that cannot be instantiated and that
//! implements [`Operator`]. Each has an ordered [`Catalog`] of rules, tried
//! first, and a generic fallback that evaluates the operands and then
//! combines the values. The fallback is always correct; the rules are
//! cheaper.
//!
//! [`Accumulate`] is the tag of `+=`. It works like the others, but writes
//! into an existing buffer instead of producing a value.

use log::{debug};

use super::{
    eval::conformable, rules::{self, level1, level2, level3, fused, Catalog, FuseCatalog},
    evaluate, Dense, DenseMut, Element, Kernel, Node, Trans, Value,
};

/// An operator of the expression tree.
///
/// Implementors are tags: every method is an associated function that takes
/// the node it applies to.
pub trait Operator {
    const NAME: &'static str;

    /// The rules to try, in priority order.
    type Rules: Catalog;

    /// Computes `node` with no knowledge of its shape beyond its operator.
    fn fallback<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error>;

    /// Computes `node` with the first matching rule, or the fallback.
    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
        match Self::Rules::apply(node, kernel) {
            Some((rule, result)) => {
                debug!("{}: {}", Self::NAME, rule);
                result
            },
            None => {
                debug!("{}: fallback for {}", Self::NAME, node);
                Self::fallback(node, kernel)
            },
        }
    }
}

/// Evaluates both operands of a binary node.
fn operands<T: Element, K: Kernel<T>>(name: &str, node: &Node<'_, T>, kernel: &K) -> Result<(Value<T>, Value<T>), K::Error> {
    let Some((l, r)) = node.operands() else { unreachable!("{} applied to {}", name, node) };
    Ok((evaluate(l, kernel)?, evaluate(r, kernel)?))
}

/// `l + sign * r`, elementwise.
fn elementwise<T: Element, K: Kernel<T>>(l: Value<T>, sign: T, r: Value<T>, kernel: &K) -> Result<Value<T>, K::Error> {
    match (l, r) {
        (Value::Dense(mut a), Value::Dense(b)) => {
            assert!(
                conformable(a.shape(), b.shape()),
                "Shape mismatch: cannot combine {:?} with {:?}", a.shape(), b.shape(),
            );
            let n = a.items().len();
            kernel.axpy(n, sign, b.items(), 1, a.items_mut(), 1)?;
            Ok(Value::Dense(a))
        },
        (l, r) => match (l.as_scalar(), r.as_scalar()) {
            (Some(a), Some(b)) => Ok(Value::Scalar(a + sign * b)),
            _ => panic!("Cannot combine {} with {}", l, r),
        },
    }
}

/// The product of two arrays. A vector counts as a column.
fn product<T: Element, K: Kernel<T>>(a: Dense<T>, b: Dense<T>, kernel: &K) -> Result<Value<T>, K::Error> {
    assert!(a.rank() <= 2 && b.rank() <= 2, "Cannot multiply {:?} by {:?}", a.shape(), b.shape());
    let (m, k) = (a.shape()[0], a.shape().get(1).copied().unwrap_or(1));
    let (k2, n) = (b.shape()[0], b.shape().get(1).copied().unwrap_or(1));
    assert_eq!(k, k2, "Shape mismatch: cannot multiply {:?} by {:?}", a.shape(), b.shape());
    if b.rank() == 1 {
        assert!(a.rank() == 2, "Cannot multiply two column vectors {:?} and {:?}", a.shape(), b.shape());
        let mut y = Dense::zeros([m]);
        kernel.gemv(Trans::N, m, k, T::one(), a.items(), m, b.items(), 1, T::zero(), y.items_mut(), 1)?;
        // A row times a column is a scalar.
        if m == 1 { return Ok(Value::Scalar(y.items()[0])); }
        return Ok(Value::Dense(y));
    }
    let mut c = Dense::zeros([m, n]);
    kernel.gemm(Trans::N, Trans::N, m, n, k, T::one(), a.items(), m, b.items(), k, T::zero(), c.items_mut(), m)?;
    Ok(Value::Dense(c))
}

// ----------------------------------------------------------------------------

pub enum Add {}

impl Operator for Add {
    const NAME: &'static str = "add";
    type Rules = (level1::ScaledSum,);

    fn fallback<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
        let (l, r) = operands(Self::NAME, node, kernel)?;
        elementwise(l, T::one(), r, kernel)
    }
}

// ----------------------------------------------------------------------------

pub enum Sub {}

impl Operator for Sub {
    const NAME: &'static str = "sub";
    type Rules = (level1::ScaledDifference,);

    fn fallback<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
        let (l, r) = operands(Self::NAME, node, kernel)?;
        elementwise(l, -T::one(), r, kernel)
    }
}

// ----------------------------------------------------------------------------

pub enum Mul {}

impl Operator for Mul {
    const NAME: &'static str = "mul";
    type Rules = (
        level1::Scal,
        level1::TransposedScal,
        level1::Dot,
        level2::Outer,
        level2::Gemv,
        level2::RowGemv,
        level3::Gemm,
    );

    fn fallback<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
        match operands(Self::NAME, node, kernel)? {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(a * b)),
            (Value::Scalar(alpha), Value::Dense(mut a)) | (Value::Dense(mut a), Value::Scalar(alpha)) => {
                let n = a.items().len();
                kernel.scale(n, alpha, a.items_mut(), 1)?;
                Ok(Value::Dense(a))
            },
            (Value::Dense(a), Value::Dense(b)) => product(a, b, kernel),
        }
    }
}

// ----------------------------------------------------------------------------

pub enum Div {}

impl Operator for Div {
    const NAME: &'static str = "div";
    type Rules = (level1::ScaledQuotient,);

    fn fallback<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
        let (l, r) = operands(Self::NAME, node, kernel)?;
        let s = match r.as_scalar() {
            Some(s) => s,
            None => panic!("Cannot divide by {}", r),
        };
        match l {
            Value::Scalar(x) => Ok(Value::Scalar(x / s)),
            Value::Dense(mut a) => {
                let n = a.items().len();
                kernel.scale(n, T::one() / s, a.items_mut(), 1)?;
                Ok(Value::Dense(a))
            },
        }
    }
}

// ----------------------------------------------------------------------------

/// `transpose(A)` for a leaf `A`: swaps indices straight from the borrowed
/// buffer.
pub enum TransposedLeaf {}

impl rules::Rule for TransposedLeaf {
    const NAME: &'static str = "transposed leaf";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, _: &K) -> Option<Result<Value<T>, K::Error>> {
        match node {
            Node::Transpose(x) => match &**x {
                Node::Leaf(leaf) => Some(Ok(Value::Dense(rules::transposed(leaf.view())))),
                _ => None,
            },
            _ => None,
        }
    }
}

pub enum Transpose {}

impl Operator for Transpose {
    const NAME: &'static str = "transpose";
    type Rules = (TransposedLeaf,);

    fn fallback<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
        let Node::Transpose(x) = node else { unreachable!("{} applied to {}", Self::NAME, node) };
        Ok(match evaluate(x, kernel)? {
            Value::Scalar(x) => Value::Scalar(x),
            Value::Dense(a) => Value::Dense(rules::transposed(a.view())),
        })
    }
}

// ----------------------------------------------------------------------------

/// The tag of `+=`.
pub enum Accumulate {}

impl Accumulate {
    pub const NAME: &'static str = "accumulate";

    /// Adds the value of `node` into `target` with the first matching rule,
    /// or evaluates `node` and adds the result with one `axpy`.
    pub fn apply<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Result<(), K::Error> {
        type Rules = (fused::FusedAxpy, fused::FusedOuter, fused::FusedGemv, fused::FusedGemm);
        if let Some((rule, result)) = <Rules as FuseCatalog>::apply(target, node, kernel) {
            debug!("{}: {}", Self::NAME, rule);
            return result;
        }
        debug!("{}: fallback for {}", Self::NAME, node);
        let value = evaluate(node, kernel)?.into_dense();
        assert!(
            conformable(target.shape(), value.shape()),
            "Shape mismatch: cannot accumulate {:?} into {:?}", value.shape(), target.shape(),
        );
        kernel.axpy(value.items().len(), T::one(), value.items(), 1, target.items_mut(), 1)
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Array, Reference};

    fn x() -> Array<f64, 1> { Array::new([3], [0.0, 1.0, 2.0]) }

    #[test]
    fn nested_sum_uses_fallback() {
        let x = x();
        let sum = Node::sum(Node::operand(x.view()), Node::operand(x.view()));
        let node = Node::sum(sum.clone(), sum);
        assert_eq!(Add::apply(&node, &Reference).unwrap().into_dense().items(), [0.0, 4.0, 8.0]);
    }

    #[test]
    fn scalar_times_sum() {
        let x = x();
        let node = Node::scale(3.0, Node::difference(Node::operand(x.view()), Node::scale(2.0, Node::leaf(x.view()))));
        assert_eq!(Mul::apply(&node, &Reference).unwrap().into_dense().items(), [0.0, -3.0, -6.0]);
    }

    #[test]
    fn row_times_column_is_scalar() {
        let x = x();
        let a: Array<f64, 2> = Array::filled([3, 3], 1.0);
        // (transpose(x) * a) * x
        let row = Node::product(Node::transpose(Node::operand(x.view())), Node::operand(a.view()));
        let node = Node::product(row, Node::operand(x.view()));
        assert_eq!(Mul::apply(&node, &Reference).unwrap(), Value::Scalar(9.0));
    }

    #[test]
    fn transpose_of_product() {
        // [[1, 2], [3, 4]]
        let a: Array<f64, 2> = Array::new([2, 2], [1.0, 3.0, 2.0, 4.0]);
        let node = Node::transpose(Node::product(Node::operand(a.view()), Node::operand(a.view())));
        // transpose([[7, 10], [15, 22]])
        assert_eq!(evaluate(&node, &Reference).unwrap().into_dense().items(), [7.0, 10.0, 15.0, 22.0]);
    }

    #[test]
    fn transposed_leaf() {
        let a: Array<f64, 2> = Array::new([2, 2], [1.0, 3.0, 2.0, 4.0]);
        let node = Node::Transpose(Box::new(Node::leaf(a.view())));
        assert_eq!(Transpose::apply(&node, &Reference).unwrap().into_dense().items(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn division_by_expression() {
        let x = x();
        let dot = Node::product(Node::transpose(Node::operand(x.view())), Node::operand(x.view()));
        let node = Node::quotient(Node::sum(Node::operand(x.view()), Node::operand(x.view())), dot.clone());
        assert_eq!(Div::apply(&node, &Reference).unwrap().into_dense().items(), [0.0, 0.4, 0.8]);
        let node = Node::quotient(dot.clone(), dot);
        assert_eq!(Div::apply(&node, &Reference).unwrap(), Value::Scalar(1.0));
    }

    #[test]
    fn accumulate_fallback() {
        let x = x();
        let mut c: Array<f64, 1> = Array::filled([3], 1.0);
        let node = Node::sum(Node::operand(x.view()), Node::operand(x.view()));
        Accumulate::apply(&mut c.view_mut(), &node, &Reference).unwrap();
        assert_eq!(c.as_ref(), [1.0, 3.0, 5.0]);
    }

    #[test]
    #[should_panic(expected = "Shape mismatch")]
    fn mismatched_matrices() {
        let a: Array<f64, 2> = Array::zeros([3, 3]);
        let b: Array<f64, 2> = Array::zeros([2, 2]);
        let node = Node::sum(Node::operand(a.view()), Node::scale(2.0, Node::sum(Node::operand(b.view()), Node::operand(b.view()))));
        let _ = Add::apply(&node, &Reference);
    }
}
