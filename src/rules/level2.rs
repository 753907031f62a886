//! Rules that end in level 2 routines: `outer` and `gemv`.

use super::{op_shape, Rule};
use crate::{Dense, DenseRef, Element, Kernel, Node, Trans, Value};

/// Matches `α·x * β·transpose(y)` for vectors `x` and `y`.
pub(crate) fn outer_operands<'n, T: Element>(node: &'n Node<'_, T>) -> Option<(T, DenseRef<'n, T>, DenseRef<'n, T>)> {
    let (l, r) = node.factors()?;
    let (alpha, x) = l.as_scaled()?;
    let (beta, y) = r.as_scaled_transposed()?;
    if x.rank() != 1 || y.rank() != 1 { return None; }
    Some((alpha * beta, x, y))
}

/// Matches `α·op(A) * β·x` for a matrix `A` and a vector `x`. Checks that the
/// sizes agree.
pub(crate) fn gemv_operands<'n, T: Element>(node: &'n Node<'_, T>) -> Option<(T, Trans, DenseRef<'n, T>, DenseRef<'n, T>)> {
    let (l, r) = node.factors()?;
    let (alpha, trans, a) = l.as_scaled_op()?;
    let (beta, x) = r.as_scaled()?;
    if a.rank() != 2 || x.rank() != 1 { return None; }
    let (_, n) = op_shape(trans, a);
    assert_eq!(n, x.len(), "Shape mismatch: cannot multiply {:?} (trans {}) by {:?}", a.shape(), trans, x.shape());
    Some((alpha * beta, trans, a, x))
}

// ----------------------------------------------------------------------------

/// `α·x * β·transpose(y)`: one `outer` into a zeroed matrix.
pub enum Outer {}

impl Rule for Outer {
    const NAME: &'static str = "outer";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        let (alpha, x, y) = outer_operands(node)?;
        let (m, n) = (x.len(), y.len());
        let mut result = Dense::zeros([m, n]);
        Some(
            kernel.outer(m, n, alpha, x.items(), 1, y.items(), 1, result.items_mut(), m)
            .map(|()| Value::Dense(result))
        )
    }
}

// ----------------------------------------------------------------------------

/// `α·op(A) * β·x`: one `gemv`.
pub enum Gemv {}

impl Rule for Gemv {
    const NAME: &'static str = "gemv";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        let (alpha, trans, a, x) = gemv_operands(node)?;
        let (rows, _) = op_shape(trans, a);
        let mut result = Dense::zeros([rows]);
        Some(
            kernel.gemv(trans, a.rows(), a.columns(), alpha, a.items(), a.rows(), x.items(), 1, T::zero(), result.items_mut(), 1)
            .map(|()| Value::Dense(result))
        )
    }
}

// ----------------------------------------------------------------------------

/// `α·transpose(x) * β·op(A)`, which is `transpose(op(A)ᵀ·x)`: one `gemv`
/// with the opposite transpose, giving a row vector.
pub enum RowGemv {}

impl Rule for RowGemv {
    const NAME: &'static str = "row gemv";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        let (l, r) = node.factors()?;
        let (alpha, x) = l.as_scaled_transposed()?;
        let (beta, trans, a) = r.as_scaled_op()?;
        if x.rank() != 1 || a.rank() != 2 { return None; }
        let (rows, columns) = op_shape(trans, a);
        assert_eq!(x.len(), rows, "Shape mismatch: cannot multiply transpose of {:?} by {:?} (trans {})", x.shape(), a.shape(), trans);
        let flipped = match trans { Trans::N => Trans::T, Trans::T => Trans::N };
        let mut result = Dense::zeros([1, columns]);
        Some(
            kernel.gemv(flipped, a.rows(), a.columns(), alpha * beta, a.items(), a.rows(), x.items(), 1, T::zero(), result.items_mut(), 1)
            .map(|()| Value::Dense(result))
        )
    }
}

// ----------------------------------------------------------------------------
