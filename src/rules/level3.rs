//! Rules that end in the level 3 routine `gemm`.

use super::{op_shape, Rule};
use crate::{Dense, DenseRef, Element, Kernel, Node, Trans, Value};

/// The operands of `α·op(A) * β·op(B)`, with `alpha` already multiplied by
/// `beta`.
pub(crate) struct GemmOperands<'n, T> {
    pub alpha: T,
    pub transa: Trans,
    pub a: DenseRef<'n, T>,
    pub transb: Trans,
    pub b: DenseRef<'n, T>,
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

/// Matches `α·op(A) * β·op(B)` where `A` and `B` have rank at most 2 and at
/// least one is a matrix. A vector counts as a column. Checks that the sizes
/// agree.
pub(crate) fn gemm_operands<'n, T: Element>(node: &'n Node<'_, T>) -> Option<GemmOperands<'n, T>> {
    let (l, r) = node.factors()?;
    let (alpha, transa, a) = l.as_scaled_op()?;
    let (beta, transb, b) = r.as_scaled_op()?;
    if a.rank() > 2 || b.rank() > 2 || (a.rank() == 1 && b.rank() == 1) { return None; }
    let (m, k) = op_shape(transa, a);
    let (k2, n) = op_shape(transb, b);
    assert_eq!(
        k, k2,
        "Shape mismatch: cannot multiply {:?} (trans {}) by {:?} (trans {})", a.shape(), transa, b.shape(), transb,
    );
    Some(GemmOperands {alpha: alpha * beta, transa, a, transb, b, m, n, k})
}

// ----------------------------------------------------------------------------

/// `α·op(A) * β·op(B)`, in any of the four transpose combinations: one
/// `gemm`.
pub enum Gemm {}

impl Rule for Gemm {
    const NAME: &'static str = "gemm";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        let GemmOperands {alpha, transa, a, transb, b, m, n, k} = gemm_operands(node)?;
        let mut result = Dense::zeros([m, n]);
        Some(
            kernel.gemm(transa, transb, m, n, k, alpha, a.items(), a.rows(), b.items(), b.rows(), T::zero(), result.items_mut(), m)
            .map(|()| Value::Dense(result))
        )
    }
}

// ----------------------------------------------------------------------------
