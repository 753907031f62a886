//! Rules for `+=`, which add straight into the target buffer.
//!
//! `-=` needs no rules of its own: `C -= X` is `C += (-1)·X`, and the `-1`
//! folds into the leading scalar of `X`.

use super::{Fuse, level2::{gemv_operands, outer_operands}, level3::{gemm_operands, GemmOperands}};
use crate::{eval::conformable, DenseMut, Element, Kernel, Node};

fn check_shape<T: Element>(target: &DenseMut<'_, T>, shape: &[usize]) {
    assert!(
        conformable(target.shape(), shape),
        "Shape mismatch: cannot accumulate {:?} into {:?}", shape, target.shape(),
    );
}

/// `C += α·A`: one `axpy`.
pub enum FusedAxpy {}

impl Fuse for FusedAxpy {
    const NAME: &'static str = "fused axpy";

    fn apply<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Option<Result<(), K::Error>> {
        let (alpha, a) = node.as_scaled()?;
        check_shape(target, a.shape());
        Some(kernel.axpy(a.len(), alpha, a.items(), 1, target.items_mut(), 1))
    }
}

/// `C += α·x * β·transpose(y)`: one `outer`.
pub enum FusedOuter {}

impl Fuse for FusedOuter {
    const NAME: &'static str = "fused outer";

    fn apply<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Option<Result<(), K::Error>> {
        let (alpha, x, y) = outer_operands(node)?;
        let (m, n) = (x.len(), y.len());
        check_shape(target, &[m, n]);
        Some(kernel.outer(m, n, alpha, x.items(), 1, y.items(), 1, target.items_mut(), m))
    }
}

/// `C += α·op(A) * β·x`: one `gemv` with `beta = 1`.
pub enum FusedGemv {}

impl Fuse for FusedGemv {
    const NAME: &'static str = "fused gemv";

    fn apply<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Option<Result<(), K::Error>> {
        let (alpha, trans, a, x) = gemv_operands(node)?;
        let (rows, _) = trans.stored(a.rows(), a.columns());
        check_shape(target, &[rows]);
        Some(kernel.gemv(trans, a.rows(), a.columns(), alpha, a.items(), a.rows(), x.items(), 1, T::one(), target.items_mut(), 1))
    }
}

/// `C += α·op(A) * β·op(B)`: one `gemm` with `beta = 1`.
pub enum FusedGemm {}

impl Fuse for FusedGemm {
    const NAME: &'static str = "fused gemm";

    fn apply<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Option<Result<(), K::Error>> {
        let GemmOperands {alpha, transa, a, transb, b, m, n, k} = gemm_operands(node)?;
        check_shape(target, &[m, n]);
        Some(kernel.gemm(transa, transb, m, n, k, alpha, a.items(), a.rows(), b.items(), b.rows(), T::one(), target.items_mut(), m))
    }
}

// ----------------------------------------------------------------------------
