//! Dense multi-dimensional arrays whose algebra is evaluated lazily and
//! routed to BLAS-style kernels.
//!
//! [`Array<T, D>`] is a rank-`D` array of `T`, stored column-major in a
//! [`Box<[T]>`]. Arithmetic on `&Array`s does not compute anything. Instead
//! it builds an [`Expr`], which records the operation in an expression tree
//! and records the class of the result (scalar, rank-`D` array, or row
//! vector) in its type. Adding a vector to a matrix, or assigning a scalar
//! expression to a vector, is a compile error.
//!
//! When an `Expr` is converted back into an `Array`, the evaluator looks at
//! the shape of the tree and picks the cheapest way to compute it. For
//! example `2.0 * &a * &x` with a matrix `a` becomes one call to [`gemv`],
//! `transpose(&x) * &y` becomes one call to [`dot`], and `c += &a * &b`
//! becomes one call to [`gemm`] that accumulates straight into `c`. Trees
//! that no rule recognises are still computed correctly, one operation at a
//! time.
//!
//! ```
//! use exprarray::{Array, transpose};
//! let x: Array<f64, 1> = Array::new([3], [0.0, 1.0, 2.0]);
//! let y: Array<f64, 1> = Array::new([3], [3.0, 2.0, 1.0]);
//! assert_eq!(Array::from(&x + &y).as_ref(), [3.0, 3.0, 3.0]);
//! assert_eq!(Array::from(2.0 * &x).as_ref(), [0.0, 2.0, 4.0]);
//! assert_eq!((transpose(&x) * &y).eval(), 4.0);
//! ```
//!
//! The primitives are provided by a [`Kernel`]. [`Reference`] is a portable
//! host implementation, and is what the operators use. To use another
//! provider, or to observe which calls an expression turns into, evaluate
//! with [`Expr::eval_with()`] through a [`Context`].
//!
//! [`gemv`]: Kernel::gemv
//! [`dot`]: Kernel::dot
//! [`gemm`]: Kernel::gemm

mod element;
pub use element::{Element, Promote, Promoted, Widen};

pub mod shape;
pub use shape::{Shape};

mod array;
pub use array::{Array, Dense, DenseRef, DenseMut};

mod proxy;
pub use proxy::{Proxy, ProxyMut};

mod fmt;

pub mod class;
pub use class::{Class, Scalar, Rank, Row, Sum, Product, Quotient, Transposed};

mod node;
pub use node::{Node, Leaf, Op};

mod expr;
pub use expr::{Expr, Operand, transpose};

pub mod ops;

pub mod rules;

mod eval;
pub use eval::{Value, evaluate, accumulate};

mod kernel;
pub use kernel::{Kernel, Trans, Routine};

mod reference;
pub use reference::{Reference};

mod context;
pub use context::{Context, Config, ContextError, Call};
