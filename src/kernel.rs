//! The linear-algebra primitives that expressions are evaluated with.
//!
//! The six operations follow the level 1, 2 and 3 BLAS routines of the same
//! purpose: buffers are column-major, vectors are addressed with an
//! increment, and matrices with a leading dimension. An implementation may
//! run on the host ([`Reference`]) or forward to an accelerator.
//!
//! [`Reference`]: super::Reference

use std::error::Error;

use strum::Display;

use super::Element;

/// Whether a matrix operand is used as stored or transposed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum Trans {
    N,
    T,
}

impl Trans {
    /// The stored shape of an operand that is `rows x columns` after `self`.
    pub fn stored(self, rows: usize, columns: usize) -> (usize, usize) {
        match self {
            Trans::N => (rows, columns),
            Trans::T => (columns, rows),
        }
    }
}

/// Names one operation of [`Kernel`], for errors and call records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Routine {
    Scale,
    Axpy,
    Dot,
    Outer,
    Gemv,
    Gemm,
}

/// A provider of BLAS-style primitives over `T`.
///
/// All increments and leading dimensions are in elements. Unless documented
/// otherwise, an implementation may assume that every buffer is long enough
/// for the sizes it is given; [`Context`] checks that for any provider.
///
/// [`Context`]: super::Context
#[allow(clippy::too_many_arguments)]
pub trait Kernel<T: Element> {
    type Error: Error + 'static;

    /// `x <- alpha * x`
    fn scale(&self, n: usize, alpha: T, x: &mut [T], incx: usize) -> Result<(), Self::Error>;

    /// `y <- alpha * x + y`
    fn axpy(&self, n: usize, alpha: T, x: &[T], incx: usize, y: &mut [T], incy: usize) -> Result<(), Self::Error>;

    /// Returns `sum(x[i] * y[i])`.
    fn dot(&self, n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> Result<T, Self::Error>;

    /// `a <- alpha * x * transpose(y) + a`, where `a` is `m x n`.
    fn outer(
        &self, m: usize, n: usize, alpha: T,
        x: &[T], incx: usize, y: &[T], incy: usize,
        a: &mut [T], lda: usize,
    ) -> Result<(), Self::Error>;

    /// `y <- alpha * op(a) * x + beta * y`, where `a` is stored `m x n`.
    ///
    /// If `beta` is zero `y` need not be initialised.
    fn gemv(
        &self, trans: Trans, m: usize, n: usize, alpha: T,
        a: &[T], lda: usize, x: &[T], incx: usize,
        beta: T, y: &mut [T], incy: usize,
    ) -> Result<(), Self::Error>;

    /// `c <- alpha * op(a) * op(b) + beta * c`, where `op(a)` is `m x k`,
    /// `op(b)` is `k x n` and `c` is `m x n`.
    ///
    /// If `beta` is zero `c` need not be initialised.
    fn gemm(
        &self, transa: Trans, transb: Trans, m: usize, n: usize, k: usize, alpha: T,
        a: &[T], lda: usize, b: &[T], ldb: usize,
        beta: T, c: &mut [T], ldc: usize,
    ) -> Result<(), Self::Error>;
}

// ----------------------------------------------------------------------------
