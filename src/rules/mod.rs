//! Shape-specific evaluation rules.
//!
//! A rule recognises one algebraic shape of expression tree, such as
//! `α·transpose(x) * β·y`, and computes it with the kernel calls that
//! realise exactly that shape. Rules are grouped by the level of the kernel
//! routine they end in. A rule returns `None` if the tree does not have its
//! shape, in which case the next rule is tried.
//!
//! Rules are stateless types collected into static tuples (a [`Catalog`]).
//! A catalog tries its rules from left to right, so the position of a rule
//! in the tuple is its priority and two rules can never tie. Adding a rule
//! to a catalog can only make evaluation cheaper, never change its result.

use super::{Dense, DenseMut, DenseRef, Element, Kernel, Node, Trans, Value};

pub mod level1;
pub mod level2;
pub mod level3;
pub mod fused;

/// A rule that produces a new value.
pub trait Rule {
    const NAME: &'static str;

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>>;
}

/// A rule that adds a value into an existing buffer.
pub trait Fuse {
    const NAME: &'static str;

    fn apply<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Option<Result<(), K::Error>>;
}

/// An ordered collection of [`Rule`]s.
pub trait Catalog {
    /// Applies the first rule that matches, and returns its name.
    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<(&'static str, Result<Value<T>, K::Error>)>;
}

/// An ordered collection of [`Fuse`]s.
pub trait FuseCatalog {
    fn apply<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Option<(&'static str, Result<(), K::Error>)>;
}

macro_rules! catalog {
    ($($r:ident),*) => {
        #[allow(unused_variables)]
        impl<$($r: Rule),*> Catalog for ($($r,)*) {
            fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<(&'static str, Result<Value<T>, K::Error>)> {
                $(
                    if let Some(result) = $r::apply(node, kernel) { return Some(($r::NAME, result)); }
                )*
                None
            }
        }

        #[allow(unused_variables)]
        impl<$($r: Fuse),*> FuseCatalog for ($($r,)*) {
            fn apply<T: Element, K: Kernel<T>>(target: &mut DenseMut<'_, T>, node: &Node<'_, T>, kernel: &K) -> Option<(&'static str, Result<(), K::Error>)> {
                $(
                    if let Some(result) = $r::apply(target, node, kernel) { return Some(($r::NAME, result)); }
                )*
                None
            }
        }
    };
}

catalog!();
catalog!(A);
catalog!(A, B);
catalog!(A, B, C);
catalog!(A, B, C, D);
catalog!(A, B, C, D, E);
catalog!(A, B, C, D, E, F);
catalog!(A, B, C, D, E, F, G);
catalog!(A, B, C, D, E, F, G, H);

// ----------------------------------------------------------------------------

/// Copies `a` and multiplies the copy by `alpha`. Multiplication by one is
/// skipped.
pub(crate) fn copy_scaled<T: Element, K: Kernel<T>>(alpha: T, a: DenseRef<'_, T>, kernel: &K) -> Result<Dense<T>, K::Error> {
    let mut result = a.to_owned();
    if alpha != T::one() {
        kernel.scale(result.items().len(), alpha, result.items_mut(), 1)?;
    }
    Ok(result)
}

/// Physically transposes `a`. A vector becomes a `1 x n` matrix.
pub(crate) fn transposed<T: Element>(a: DenseRef<'_, T>) -> Dense<T> {
    match a.rank() {
        1 => a.to_owned().reshape([1, a.len()]),
        2 => {
            let (m, n) = (a.rows(), a.columns());
            let items = a.items();
            let mut result = Vec::with_capacity(items.len());
            for i in 0..m {
                for j in 0..n { result.push(items[i + j * m]); }
            }
            Dense::new([n, m], result)
        },
        d => panic!("Cannot transpose an array of rank {}", d),
    }
}

/// The shape `rows x columns` of `op(a)`, treating a vector as a column.
pub(crate) fn op_shape<T: Element>(trans: Trans, a: DenseRef<'_, T>) -> (usize, usize) {
    assert!(a.rank() <= 2, "Cannot multiply an array of rank {}", a.rank());
    trans.stored(a.rows(), a.columns())
}

// ----------------------------------------------------------------------------
