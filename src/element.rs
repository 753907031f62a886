//! Element types and the promotion table for mixed-type expressions.
//!
//! Only `f32` and `f64` implement [`Element`], since those are the types a
//! BLAS-style kernel provides. When an expression combines the two, the
//! narrower operand is widened at the moment the expression node is built.
//! The table is explicit: see [`Promote`].

use std::fmt::{Debug, Display};

use num_traits::Float;

use super::Node;

/// A type that can be stored in an [`Array`] and passed to a [`Kernel`].
///
/// [`Array`]: super::Array
/// [`Kernel`]: super::Kernel
pub trait Element: Float + Default + Debug + Display + Send + Sync + 'static {}

impl Element for f32 {}
impl Element for f64 {}

// ----------------------------------------------------------------------------

/// Converts an expression tree over `Self` into one over `P`.
///
/// The only conversions are the identity, which keeps borrowed leaves
/// borrowed, and `f32` to `f64`, which copies them.
pub trait Widen<P: Element>: Element {
    fn widen(node: Node<'_, Self>) -> Node<'_, P>;
}

impl<T: Element> Widen<T> for T {
    #[inline(always)]
    fn widen(node: Node<'_, T>) -> Node<'_, T> { node }
}

impl Widen<f64> for f32 {
    fn widen(node: Node<'_, f32>) -> Node<'_, f64> { node.map(&|x| x as f64) }
}

// ----------------------------------------------------------------------------

/// `Self` implements `Promote<U>` to say what element type results from
/// combining a `Self` operand with a `U` operand.
///
/// ```
/// use exprarray::{Element, Promoted};
/// fn result_name<T: Element>(_: T) -> &'static str { std::any::type_name::<T>() }
/// let x: Promoted<f32, f64> = 1.0;
/// assert_eq!(result_name(x), "f64");
/// ```
pub trait Promote<U: Element>: Element {
    /// The wider of `Self` and `U`.
    type Output: Element;

    /// Converts the left operand of a binary node.
    fn left(node: Node<'_, Self>) -> Node<'_, <Self as Promote<U>>::Output>;

    /// Converts the right operand of a binary node.
    fn right(node: Node<'_, U>) -> Node<'_, <Self as Promote<U>>::Output>;
}

/// The element type of an expression combining a `T` with a `U`.
pub type Promoted<T, U> = <T as Promote<U>>::Output;

macro_rules! promote {
    ($t:ty, $u:ty => $o:ty) => {
        impl Promote<$u> for $t {
            type Output = $o;
            #[inline(always)]
            fn left(node: Node<'_, $t>) -> Node<'_, $o> { <$t as Widen<$o>>::widen(node) }
            #[inline(always)]
            fn right(node: Node<'_, $u>) -> Node<'_, $o> { <$u as Widen<$o>>::widen(node) }
        }
    };
}

promote!(f32, f32 => f32);
promote!(f64, f64 => f64);
promote!(f32, f64 => f64);
promote!(f64, f32 => f64);

// ----------------------------------------------------------------------------
