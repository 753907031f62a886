//! The typed expression wrapper and the operators that build it.
//!
//! Arithmetic on `&Array`s, on [`Expr`]s, and on scalar literals returns a
//! new `Expr` and computes nothing. The element type of the result comes
//! from the [`Promote`] table, and its class from the traits in
//! [`class`](super::class). Nothing is computed until the `Expr` is
//! converted into an [`Array`], evaluated with [`Expr::eval()`], printed, or
//! added into an existing array with `+=`.
//!
//! ```
//! use exprarray::{Array, transpose};
//! let a: Array<f64, 2> = Array::new([2, 2], [1.0, 3.0, 2.0, 4.0]);
//! let x: Array<f64, 1> = Array::new([2], [1.0, 1.0]);
//! let y = Array::from(2.0 * &a * &x);
//! assert_eq!(y.as_ref(), [6.0, 14.0]);
//! assert_eq!((transpose(&y) * &x).eval(), 20.0);
//! ```

use std::fmt::{self, Debug, Display, Formatter};
use std::marker::{PhantomData};
use std::ops::{Add, Sub, Mul, Div, Neg, AddAssign, SubAssign};

use super::{
    accumulate, evaluate, Array, Class, Element, Kernel, Node, Product, Promote, Promoted,
    Quotient, Rank, Reference, Scalar, Sum, Transposed,
};

/// An unevaluated expression with elements of type `T` and shape class `C`.
///
/// An `Expr` borrows the arrays it was built from, so it cannot outlive
/// them, and they cannot be modified while it exists.
pub struct Expr<'a, T, C> {
    node: Node<'a, T>,
    class: PhantomData<C>,
}

impl<'a, T: Element, C: Class> Expr<'a, T, C> {
    pub(crate) fn new(node: Node<'a, T>) -> Self { Self {node, class: PhantomData} }

    /// The untyped tree.
    pub fn node(&self) -> &Node<'a, T> { &self.node }

    pub fn into_node(self) -> Node<'a, T> { self.node }

    /// Computes the value on the host.
    pub fn eval(&self) -> C::Materialized<T> {
        match self.eval_with(&Reference) {
            Ok(value) => value,
            Err(e) => match e {},
        }
    }

    /// Computes the value using `kernel`.
    pub fn eval_with<K: Kernel<T>>(&self, kernel: &K) -> Result<C::Materialized<T>, K::Error> {
        Ok(C::materialize(evaluate(&self.node, kernel)?))
    }

    /// Same as [`transpose(self)`](transpose).
    pub fn t(self) -> Expr<'a, T, C::Output> where C: Transposed {
        Expr::new(Node::transpose(self.node))
    }
}

impl<'a, T: Element, C> Clone for Expr<'a, T, C> {
    fn clone(&self) -> Self { Self {node: self.node.clone(), class: PhantomData} }
}

impl<'a, T: Element, C> Debug for Expr<'a, T, C> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Expr")
            .field("class", &std::any::type_name::<C>())
            .field("node", &self.node)
            .finish()
    }
}

/// Evaluates on the host, then prints the value.
impl<'a, T: Element, C: Class> Display for Expr<'a, T, C> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match evaluate(&self.node, &Reference) {
            Ok(value) => C::print(value, f),
            Err(e) => match e {},
        }
    }
}

impl<'a, T: Element, const D: usize> From<Expr<'a, T, Rank<D>>> for Array<T, D> {
    fn from(expr: Expr<'a, T, Rank<D>>) -> Self { expr.eval() }
}

// ----------------------------------------------------------------------------

/// An array or expression operand. Scalar literals are handled separately,
/// so that their type can be inferred from the other operand.
pub trait Operand<'a> {
    type Elem: Element;
    type Class: Class;

    fn into_node(self) -> Node<'a, Self::Elem>;
}

impl<'a, T: Element, const D: usize> Operand<'a> for &'a Array<T, D> {
    type Elem = T;
    type Class = Rank<D>;

    fn into_node(self) -> Node<'a, T> { Node::operand(self.view()) }
}

impl<'a, T: Element, C: Class> Operand<'a> for Expr<'a, T, C> {
    type Elem = T;
    type Class = C;

    fn into_node(self) -> Node<'a, T> { self.node }
}

/// Converts both operands to their common element type and combines them.
fn binary<'a, L, R, C>(
    l: L,
    r: R,
    build: fn(Node<'a, Promoted<L::Elem, R::Elem>>, Node<'a, Promoted<L::Elem, R::Elem>>) -> Node<'a, Promoted<L::Elem, R::Elem>>,
) -> Expr<'a, Promoted<L::Elem, R::Elem>, C> where
    L: Operand<'a>,
    R: Operand<'a>,
    L::Elem: Promote<R::Elem>,
    C: Class,
{
    let l = <L::Elem as Promote<R::Elem>>::left(l.into_node());
    let r = <L::Elem as Promote<R::Elem>>::right(r.into_node());
    Expr::new(build(l, r))
}

/// Builds `transpose(o)`. Nothing is moved until the result is needed.
///
/// ```
/// use exprarray::{Array, transpose};
/// // [[1, 2], [3, 4]]
/// let a: Array<f64, 2> = Array::new([2, 2], [1.0, 3.0, 2.0, 4.0]);
/// let at = Array::from(transpose(&a));
/// assert_eq!(at.as_ref(), [1.0, 2.0, 3.0, 4.0]);
/// assert_eq!(Array::from(transpose(transpose(&a))), a);
/// ```
pub fn transpose<'a, O>(o: O) -> Expr<'a, O::Elem, <O::Class as Transposed>::Output> where
    O: Operand<'a>,
    O::Class: Transposed,
{
    Expr::new(Node::transpose(o.into_node()))
}

impl<T: Element, const D: usize> Array<T, D> {
    /// Same as [`transpose(self)`](transpose).
    pub fn t(&self) -> Expr<'_, T, <Rank<D> as Transposed>::Output> where Rank<D>: Transposed {
        transpose(self)
    }

    /// `self += rhs`, using `kernel`.
    ///
    /// Panics if the value of `rhs` does not have the shape of `self`.
    pub fn add_assign_with<'a, R, K>(&mut self, rhs: R, kernel: &K) -> Result<(), K::Error> where
        R: Operand<'a, Class = Rank<D>>,
        R::Elem: Promote<T, Output = T>,
        K: Kernel<T>,
    {
        let node = <R::Elem as Promote<T>>::left(rhs.into_node());
        accumulate(&mut self.view_mut(), &node, kernel)
    }

    /// `self -= rhs`, using `kernel`. This is `self += (-1)·rhs`.
    pub fn sub_assign_with<'a, R, K>(&mut self, rhs: R, kernel: &K) -> Result<(), K::Error> where
        R: Operand<'a, Class = Rank<D>>,
        R::Elem: Promote<T, Output = T>,
        K: Kernel<T>,
    {
        let node = Node::negate(<R::Elem as Promote<T>>::left(rhs.into_node()));
        accumulate(&mut self.view_mut(), &node, kernel)
    }
}

impl<'a, T: Element, const D: usize, R> AddAssign<R> for Array<T, D> where
    R: Operand<'a, Class = Rank<D>>,
    R::Elem: Promote<T, Output = T>,
{
    fn add_assign(&mut self, rhs: R) {
        match self.add_assign_with(rhs, &Reference) {
            Ok(()) => {},
            Err(e) => match e {},
        }
    }
}

impl<'a, T: Element, const D: usize, R> SubAssign<R> for Array<T, D> where
    R: Operand<'a, Class = Rank<D>>,
    R::Elem: Promote<T, Output = T>,
{
    fn sub_assign(&mut self, rhs: R) {
        match self.sub_assign_with(rhs, &Reference) {
            Ok(()) => {},
            Err(e) => match e {},
        }
    }
}

// ----------------------------------------------------------------------------

macro_rules! binary_op {
    ($trait:ident, $method:ident, $class:ident, $build:path) => {
        impl<'a, T: Element, const D: usize, R> $trait<R> for &'a Array<T, D> where
            R: Operand<'a>,
            T: Promote<R::Elem>,
            Rank<D>: $class<R::Class>,
        {
            type Output = Expr<'a, Promoted<T, R::Elem>, <Rank<D> as $class<R::Class>>::Output>;

            fn $method(self, rhs: R) -> Self::Output { binary(self, rhs, $build) }
        }

        impl<'a, T: Element, C: Class, R> $trait<R> for Expr<'a, T, C> where
            R: Operand<'a>,
            T: Promote<R::Elem>,
            C: $class<R::Class>,
        {
            type Output = Expr<'a, Promoted<T, R::Elem>, <C as $class<R::Class>>::Output>;

            fn $method(self, rhs: R) -> Self::Output { binary(self, rhs, $build) }
        }

        binary_op!(@scalar f32, $trait, $method, $class, $build);
        binary_op!(@scalar f64, $trait, $method, $class, $build);
    };

    // A literal takes the element type of the other operand.
    (@scalar $s:ty, $trait:ident, $method:ident, $class:ident, $build:path) => {
        impl<'a, const D: usize> $trait<$s> for &'a Array<$s, D> where
            Rank<D>: $class<Scalar>,
        {
            type Output = Expr<'a, $s, <Rank<D> as $class<Scalar>>::Output>;

            fn $method(self, rhs: $s) -> Self::Output { Expr::new($build(self.into_node(), Node::Literal(rhs))) }
        }

        impl<'a, C: Class> $trait<$s> for Expr<'a, $s, C> where
            C: $class<Scalar>,
        {
            type Output = Expr<'a, $s, <C as $class<Scalar>>::Output>;

            fn $method(self, rhs: $s) -> Self::Output { Expr::new($build(self.node, Node::Literal(rhs))) }
        }

        impl<'a, const D: usize> $trait<&'a Array<$s, D>> for $s where
            Scalar: $class<Rank<D>>,
        {
            type Output = Expr<'a, $s, <Scalar as $class<Rank<D>>>::Output>;

            fn $method(self, rhs: &'a Array<$s, D>) -> Self::Output { Expr::new($build(Node::Literal(self), rhs.into_node())) }
        }

        impl<'a, C: Class> $trait<Expr<'a, $s, C>> for $s where
            Scalar: $class<C>,
        {
            type Output = Expr<'a, $s, <Scalar as $class<C>>::Output>;

            fn $method(self, rhs: Expr<'a, $s, C>) -> Self::Output { Expr::new($build(Node::Literal(self), rhs.node)) }
        }
    };
}

binary_op!(Add, add, Sum, Node::sum);
binary_op!(Sub, sub, Sum, Node::difference);
binary_op!(Mul, mul, Product, Node::product);
binary_op!(Div, div, Quotient, Node::quotient);

impl<'a, T: Element, const D: usize> Neg for &'a Array<T, D> {
    type Output = Expr<'a, T, Rank<D>>;

    fn neg(self) -> Self::Output { Expr::new(Node::negate(self.into_node())) }
}

impl<'a, T: Element, C: Class> Neg for Expr<'a, T, C> {
    type Output = Self;

    fn neg(self) -> Self { Expr::new(Node::negate(self.node)) }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Context, Routine};

    fn x() -> Array<f64, 1> { Array::new([3], [0.0, 1.0, 2.0]) }
    fn y() -> Array<f64, 1> { Array::new([3], [3.0, 2.0, 1.0]) }

    #[test]
    fn literals_fold() {
        let x = x();
        assert_eq!((2.0 * (3.0 * &x)).node().to_string(), "(6 * [3])");
        assert_eq!((&x / 4.0 * 2.0).node().to_string(), "(0.5 * [3])");
        assert_eq!((-&x).node().to_string(), "(-1 * [3])");
        assert_eq!(Array::from(&x / 2.0).as_ref(), [0.0, 0.5, 1.0]);
    }

    #[test]
    fn sums_and_differences() {
        let (x, y) = (x(), y());
        assert_eq!(Array::from(&x + &y).as_ref(), [3.0, 3.0, 3.0]);
        assert_eq!(Array::from(&x - 2.0 * &y).as_ref(), [-6.0, -3.0, 0.0]);
        assert_eq!(Array::from((&x + &y) - &x).as_ref(), y.as_ref());
    }

    #[test]
    fn scalar_class_arithmetic() {
        let (x, y) = (x(), y());
        let dot = || x.t() * &y;
        assert_eq!((dot() + 1.0).eval(), 5.0);
        assert_eq!((1.0 - dot()).eval(), -3.0);
        assert_eq!((dot() / dot()).eval(), 1.0);
        assert_eq!(Array::from(&x / dot()).as_ref(), [0.0, 0.25, 0.5]);
        assert_eq!(Array::from(dot() * &x).as_ref(), [0.0, 4.0, 8.0]);
    }

    #[test]
    fn mixed_precision() {
        let a: Array<f32, 1> = Array::new([2], [0.5, 1.5]);
        let b: Array<f64, 1> = Array::new([2], [1.0, 2.0]);
        let c: Array<f64, 1> = Array::from(&a + &b);
        assert_eq!(c.as_ref(), [1.5, 3.5]);
        let d: Array<f64, 1> = Array::from(2.0 * &a - &b);
        assert_eq!(d.as_ref(), [0.0, 1.0]);
        let e = Array::from(2.0 * &a);
        assert_eq!(e.as_ref(), [1.0f32, 3.0]);
    }

    #[test]
    fn row_vectors() {
        let (x, y) = (x(), y());
        let row = x.t().eval();
        assert_eq!(row.shape(), [1, 3]);
        let a: Array<f64, 2> = Array::filled([3, 2], 1.0);
        let r = (y.t() * &a).eval();
        assert_eq!(r.shape(), [1, 2]);
        assert_eq!(r.as_ref(), [6.0, 6.0]);
        let back: Array<f64, 2> = Array::from(r.t().t().t());
        assert_eq!(back.shape(), [2, 1]);
    }

    #[test]
    fn outer_product() {
        let (x, y) = (x(), y());
        let r = Array::from(2.0 * &x * y.t());
        assert_eq!(r.shape(), [3, 3]);
        assert_eq!(r[[2, 0]], 12.0);
        assert_eq!(r[[1, 2]], 2.0);
    }

    #[test]
    fn compound_assignment() {
        let (x, y) = (x(), y());
        let mut z = x.clone();
        z += &y;
        assert_eq!(z.as_ref(), [3.0, 3.0, 3.0]);
        z -= 2.0 * &x;
        assert_eq!(z.as_ref(), [3.0, 1.0, -1.0]);
        z += &x + &y;
        assert_eq!(z.as_ref(), [6.0, 4.0, 2.0]);
        let narrow: Array<f32, 1> = Array::new([3], [1.0, 1.0, 1.0]);
        z += &narrow;
        assert_eq!(z.as_ref(), [7.0, 5.0, 3.0]);
    }

    #[test]
    fn fused_subtraction_is_one_call() {
        let a: Array<f64, 2> = Array::new([2, 2], [1.0, 3.0, 2.0, 4.0]);
        let mut c: Array<f64, 2> = Array::filled([2, 2], 10.0);
        let ctx = Context::init(Reference, Config {trace: true, ..Config::default()});
        c.sub_assign_with(&a * &a, &ctx).unwrap();
        assert_eq!(ctx.routines(), [Routine::Gemm]);
        assert_eq!(ctx.calls()[0].beta, 1.0);
        assert_eq!(ctx.calls()[0].alpha, -1.0);
        assert_eq!(c.as_ref(), [3.0, -5.0, 0.0, -12.0]);
        ctx.teardown();
    }

    #[test]
    fn display() {
        let (x, y) = (x(), y());
        assert_eq!(format!("{}", &x + &y), "Array<1> (3)\n 3\n 3\n 3\n");
        assert_eq!(format!("{}", x.t()), " 0 1 2\n");
        assert_eq!(format!("{:.1}", x.t() * &y), "4.0\n");
    }

    #[test]
    #[should_panic(expected = "Shape mismatch")]
    fn mismatched_assignment() {
        let mut z: Array<f64, 1> = Array::zeros([2]);
        z += &x();
    }
}
