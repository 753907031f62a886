//! An explicit device context wrapping a [`Kernel`].
//!
//! A `Context` is opened with [`Context::init()`] and closed with
//! [`Context::teardown()`]. While open, it checks each call's arguments the
//! way a BLAS library reports an illegal parameter, then forwards the call.
//! It can also record every call, which is how callers observe which kernel
//! calls an expression turned into.

use std::cell::{Cell, RefCell};

use log::{info, trace, warn};
use num_traits::ToPrimitive;
use thiserror::Error;

use super::{Element, Kernel, Routine, Trans};

/// Configuration of a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Names the context in log messages.
    pub label: String,
    /// Whether to check arguments before forwarding them.
    pub validate: bool,
    /// Whether to record every call.
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self { Self {label: "host".into(), validate: true, trace: false} }
}

/// The ways in which a call through a [`Context`] can fail.
#[derive(Debug, Error)]
pub enum ContextError<E: std::error::Error + 'static> {
    /// The context has been torn down.
    #[error("Context `{0}` has been torn down")]
    Closed(String),

    /// An argument is out of range. `position` counts from 1, as in BLAS.
    #[error("Parameter number {position} had an illegal value on entry to {routine}")]
    IllegalArgument { routine: Routine, position: usize },

    /// A buffer is too short for the sizes and increments given.
    #[error("Buffer `{operand}` of {routine} has {len} elements but {needed} are needed")]
    BufferTooShort { routine: Routine, operand: &'static str, needed: usize, len: usize },

    /// The wrapped kernel failed.
    #[error("Kernel failed: {0}")]
    Kernel(#[source] E),
}

/// One call made through a tracing [`Context`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub routine: Routine,
    /// `m`, `n` and `k`, where meaningful. Unused sizes are zero.
    pub sizes: [usize; 3],
    pub trans: [Trans; 2],
    pub alpha: f64,
    pub beta: f64,
}

impl Call {
    fn new(routine: Routine, sizes: [usize; 3], trans: [Trans; 2], alpha: impl ToPrimitive, beta: impl ToPrimitive) -> Self {
        let alpha = alpha.to_f64().unwrap_or(f64::NAN);
        let beta = beta.to_f64().unwrap_or(f64::NAN);
        Self {routine, sizes, trans, alpha, beta}
    }
}

// ----------------------------------------------------------------------------

/// The number of elements spanned by `n` elements `inc` apart.
fn span(n: usize, inc: usize) -> usize { if n == 0 { 0 } else { 1 + (n - 1) * inc } }

/// The number of elements spanned by a `rows x columns` matrix.
fn span2(rows: usize, columns: usize, ld: usize) -> usize { if columns == 0 { 0 } else { ld * (columns - 1) + rows } }

/// Wraps a [`Kernel`] with an explicit lifecycle, argument checks, and
/// optional call recording.
///
/// ```
/// use exprarray::{Array, Context, Config, Routine};
/// let ctx = Context::init(exprarray::Reference, Config {trace: true, ..Config::default()});
/// let x: Array<f64, 1> = Array::new([3], [0.0, 1.0, 2.0]);
/// let y: Array<f64, 1> = Array::new([3], [3.0, 2.0, 1.0]);
/// assert_eq!((x.t() * &y).eval_with(&ctx).unwrap(), 4.0);
/// assert_eq!(ctx.calls()[0].routine, Routine::Dot);
/// ctx.teardown();
/// assert!((x.t() * &y).eval_with(&ctx).is_err());
/// ```
#[derive(Debug)]
pub struct Context<K> {
    kernel: K,
    config: Config,
    open: Cell<bool>,
    count: Cell<usize>,
    calls: RefCell<Vec<Call>>,
}

impl<K> Context<K> {
    /// Opens a context over `kernel`.
    pub fn init(kernel: K, config: Config) -> Self {
        info!("Opening context `{}` (validate: {}, trace: {})", config.label, config.validate, config.trace);
        Self {kernel, config, open: Cell::new(true), count: Cell::new(0), calls: RefCell::new(Vec::new())}
    }

    /// Closes the context. Later calls fail with [`ContextError::Closed`].
    /// Closing twice has no further effect.
    pub fn teardown(&self) {
        if self.open.replace(false) {
            info!("Closing context `{}` after {} calls", self.config.label, self.count.get());
        }
    }

    pub fn is_open(&self) -> bool { self.open.get() }

    pub fn config(&self) -> &Config { &self.config }

    pub fn kernel(&self) -> &K { &self.kernel }

    /// The number of calls forwarded to the kernel.
    pub fn count(&self) -> usize { self.count.get() }

    /// The calls recorded so far. Empty unless [`Config::trace`] is set.
    pub fn calls(&self) -> Vec<Call> { self.calls.borrow().clone() }

    /// The routines of the calls recorded so far, in order.
    pub fn routines(&self) -> Vec<Routine> { self.calls.borrow().iter().map(|c| c.routine).collect() }

    /// Forgets the recorded calls and resets the count.
    pub fn clear(&self) {
        self.count.set(0);
        self.calls.borrow_mut().clear();
    }

    fn enter<E: std::error::Error + 'static>(&self, call: impl FnOnce() -> Call) -> Result<(), ContextError<E>> {
        if !self.open.get() { return Err(ContextError::Closed(self.config.label.clone())); }
        self.count.set(self.count.get() + 1);
        if self.config.trace {
            let call = call();
            trace!("{}: {:?}", self.config.label, call);
            self.calls.borrow_mut().push(call);
        }
        Ok(())
    }

    fn check<E: std::error::Error + 'static>(&self, routine: Routine, illegal: &[(bool, usize)], buffers: &[(&'static str, usize, usize)]) -> Result<(), ContextError<E>> {
        if !self.config.validate { return Ok(()); }
        if let Some(&(_, position)) = illegal.iter().find(|&&(bad, _)| bad) {
            return Err(ContextError::IllegalArgument {routine, position});
        }
        if let Some(&(operand, needed, len)) = buffers.iter().find(|&&(_, needed, len)| needed > len) {
            return Err(ContextError::BufferTooShort {routine, operand, needed, len});
        }
        Ok(())
    }
}

impl<K> Drop for Context<K> {
    fn drop(&mut self) {
        if self.open.get() {
            warn!("Context `{}` dropped without teardown", self.config.label);
        }
    }
}

#[allow(clippy::too_many_arguments)]
impl<T: Element, K: Kernel<T>> Kernel<T> for Context<K> {
    type Error = ContextError<K::Error>;

    fn scale(&self, n: usize, alpha: T, x: &mut [T], incx: usize) -> Result<(), Self::Error> {
        self.check::<K::Error>(Routine::Scale, &[(incx == 0, 4)], &[("x", span(n, incx), x.len())])?;
        self.enter::<K::Error>(|| Call::new(Routine::Scale, [n, 0, 0], [Trans::N; 2], alpha, 0))?;
        self.kernel.scale(n, alpha, x, incx).map_err(ContextError::Kernel)
    }

    fn axpy(&self, n: usize, alpha: T, x: &[T], incx: usize, y: &mut [T], incy: usize) -> Result<(), Self::Error> {
        self.check::<K::Error>(
            Routine::Axpy,
            &[(incx == 0, 4), (incy == 0, 6)],
            &[("x", span(n, incx), x.len()), ("y", span(n, incy), y.len())],
        )?;
        self.enter::<K::Error>(|| Call::new(Routine::Axpy, [n, 0, 0], [Trans::N; 2], alpha, 1))?;
        self.kernel.axpy(n, alpha, x, incx, y, incy).map_err(ContextError::Kernel)
    }

    fn dot(&self, n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> Result<T, Self::Error> {
        self.check::<K::Error>(
            Routine::Dot,
            &[(incx == 0, 3), (incy == 0, 5)],
            &[("x", span(n, incx), x.len()), ("y", span(n, incy), y.len())],
        )?;
        self.enter::<K::Error>(|| Call::new(Routine::Dot, [n, 0, 0], [Trans::N; 2], 1, 0))?;
        self.kernel.dot(n, x, incx, y, incy).map_err(ContextError::Kernel)
    }

    fn outer(
        &self, m: usize, n: usize, alpha: T,
        x: &[T], incx: usize, y: &[T], incy: usize,
        a: &mut [T], lda: usize,
    ) -> Result<(), Self::Error> {
        self.check::<K::Error>(
            Routine::Outer,
            &[(incx == 0, 5), (incy == 0, 7), (lda < m.max(1), 9)],
            &[("x", span(m, incx), x.len()), ("y", span(n, incy), y.len()), ("a", span2(m, n, lda), a.len())],
        )?;
        self.enter::<K::Error>(|| Call::new(Routine::Outer, [m, n, 0], [Trans::N; 2], alpha, 1))?;
        self.kernel.outer(m, n, alpha, x, incx, y, incy, a, lda).map_err(ContextError::Kernel)
    }

    fn gemv(
        &self, trans: Trans, m: usize, n: usize, alpha: T,
        a: &[T], lda: usize, x: &[T], incx: usize,
        beta: T, y: &mut [T], incy: usize,
    ) -> Result<(), Self::Error> {
        let (lenx, leny) = match trans { Trans::N => (n, m), Trans::T => (m, n) };
        self.check::<K::Error>(
            Routine::Gemv,
            &[(lda < m.max(1), 6), (incx == 0, 8), (incy == 0, 11)],
            &[("a", span2(m, n, lda), a.len()), ("x", span(lenx, incx), x.len()), ("y", span(leny, incy), y.len())],
        )?;
        self.enter::<K::Error>(|| Call::new(Routine::Gemv, [m, n, 0], [trans, Trans::N], alpha, beta))?;
        self.kernel.gemv(trans, m, n, alpha, a, lda, x, incx, beta, y, incy).map_err(ContextError::Kernel)
    }

    fn gemm(
        &self, transa: Trans, transb: Trans, m: usize, n: usize, k: usize, alpha: T,
        a: &[T], lda: usize, b: &[T], ldb: usize,
        beta: T, c: &mut [T], ldc: usize,
    ) -> Result<(), Self::Error> {
        let (ra, ca) = transa.stored(m, k);
        let (rb, cb) = transb.stored(k, n);
        self.check::<K::Error>(
            Routine::Gemm,
            &[(lda < ra.max(1), 8), (ldb < rb.max(1), 10), (ldc < m.max(1), 13)],
            &[("a", span2(ra, ca, lda), a.len()), ("b", span2(rb, cb, ldb), b.len()), ("c", span2(m, n, ldc), c.len())],
        )?;
        self.enter::<K::Error>(|| Call::new(Routine::Gemm, [m, n, k], [transa, transb], alpha, beta))?;
        self.kernel.gemm(transa, transb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc).map_err(ContextError::Kernel)
    }
}

// ----------------------------------------------------------------------------
