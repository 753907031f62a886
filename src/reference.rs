//! A portable host implementation of [`Kernel`].

use std::convert::Infallible;

use super::{Element, Kernel, Trans};

/// Straightforward loops over column-major buffers. It cannot fail.
///
/// ```
/// use exprarray::{Kernel, Reference, Trans};
/// // [[1, 2], [3, 4]] stored column-major.
/// let a = [1.0, 3.0, 2.0, 4.0];
/// let mut y = [0.0; 2];
/// Reference.gemv(Trans::N, 2, 2, 1.0, &a, 2, &[1.0, 1.0], 1, 0.0, &mut y, 1).unwrap();
/// assert_eq!(y, [3.0, 7.0]);
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Reference;

fn scale_or_zero<T: Element>(n: usize, beta: T, y: &mut [T], incy: usize) {
    if beta == T::one() { return; }
    for i in 0..n {
        let yi = &mut y[i * incy];
        *yi = if beta.is_zero() { T::zero() } else { beta * *yi };
    }
}

#[allow(clippy::too_many_arguments)]
impl<T: Element> Kernel<T> for Reference {
    type Error = Infallible;

    fn scale(&self, n: usize, alpha: T, x: &mut [T], incx: usize) -> Result<(), Infallible> {
        for i in 0..n { x[i * incx] = alpha * x[i * incx]; }
        Ok(())
    }

    fn axpy(&self, n: usize, alpha: T, x: &[T], incx: usize, y: &mut [T], incy: usize) -> Result<(), Infallible> {
        if alpha.is_zero() { return Ok(()); }
        for i in 0..n { y[i * incy] = alpha * x[i * incx] + y[i * incy]; }
        Ok(())
    }

    fn dot(&self, n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> Result<T, Infallible> {
        Ok((0..n).fold(T::zero(), |sum, i| sum + x[i * incx] * y[i * incy]))
    }

    fn outer(
        &self, m: usize, n: usize, alpha: T,
        x: &[T], incx: usize, y: &[T], incy: usize,
        a: &mut [T], lda: usize,
    ) -> Result<(), Infallible> {
        for j in 0..n {
            let t = alpha * y[j * incy];
            for i in 0..m { a[i + j * lda] = a[i + j * lda] + x[i * incx] * t; }
        }
        Ok(())
    }

    fn gemv(
        &self, trans: Trans, m: usize, n: usize, alpha: T,
        a: &[T], lda: usize, x: &[T], incx: usize,
        beta: T, y: &mut [T], incy: usize,
    ) -> Result<(), Infallible> {
        match trans {
            Trans::N => {
                scale_or_zero(m, beta, y, incy);
                for j in 0..n {
                    let t = alpha * x[j * incx];
                    for i in 0..m { y[i * incy] = y[i * incy] + t * a[i + j * lda]; }
                }
            },
            Trans::T => {
                scale_or_zero(n, beta, y, incy);
                for j in 0..n {
                    let sum = (0..m).fold(T::zero(), |sum, i| sum + a[i + j * lda] * x[i * incx]);
                    y[j * incy] = y[j * incy] + alpha * sum;
                }
            },
        }
        Ok(())
    }

    fn gemm(
        &self, transa: Trans, transb: Trans, m: usize, n: usize, k: usize, alpha: T,
        a: &[T], lda: usize, b: &[T], ldb: usize,
        beta: T, c: &mut [T], ldc: usize,
    ) -> Result<(), Infallible> {
        let at = |i: usize, l: usize| match transa { Trans::N => a[i + l * lda], Trans::T => a[l + i * lda] };
        let bt = |l: usize, j: usize| match transb { Trans::N => b[l + j * ldb], Trans::T => b[j + l * ldb] };
        for j in 0..n {
            scale_or_zero(m, beta, &mut c[j * ldc..], 1);
            for l in 0..k {
                let t = alpha * bt(l, j);
                if t.is_zero() { continue; }
                for i in 0..m { c[i + j * ldc] = c[i + j * ldc] + at(i, l) * t; }
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
