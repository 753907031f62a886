//! The untyped expression tree.
//!
//! A [`Node`] is what the operators build and what the evaluator walks. It
//! carries no compile-time shape information; that lives in the [`Expr`]
//! wrapper. The constructors normalise as they build, so that a plain array
//! and a scaled array have the same structure, `α·A`, and leading scalars
//! are folded together. The evaluator's rules rely on that.
//!
//! [`Expr`]: super::Expr

use std::fmt::{self, Display, Formatter};

use strum::Display;

use super::{Dense, DenseRef, Element, Trans};

/// A binary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum Op {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
}

/// An array operand of an expression.
///
/// Operands of the expression's element type are borrowed. Operands that had
/// to be converted to a wider element type are owned copies.
#[derive(Debug, Clone)]
pub enum Leaf<'a, T> {
    Borrowed(DenseRef<'a, T>),
    Owned(Dense<T>),
}

impl<'a, T: Element> Leaf<'a, T> {
    pub fn view(&self) -> DenseRef<'_, T> {
        match self {
            Leaf::Borrowed(view) => *view,
            Leaf::Owned(dense) => dense.view(),
        }
    }
}

/// One node of an expression tree.
#[derive(Debug, Clone)]
pub enum Node<'a, T> {
    Literal(T),
    Leaf(Leaf<'a, T>),
    Transpose(Box<Node<'a, T>>),
    Binary(Op, Box<Node<'a, T>>, Box<Node<'a, T>>),
}

impl<'a, T: Element> Node<'a, T> {
    /// A bare leaf. The operators use [`operand()`] instead.
    ///
    /// [`operand()`]: Self::operand
    pub fn leaf(view: DenseRef<'a, T>) -> Self { Node::Leaf(Leaf::Borrowed(view)) }

    /// The normal form of an array operand: `1·A`.
    pub fn operand(view: DenseRef<'a, T>) -> Self { Self::scale(T::one(), Self::leaf(view)) }

    fn binary(op: Op, l: Self, r: Self) -> Self { Node::Binary(op, Box::new(l), Box::new(r)) }

    /// Builds `alpha·node`, folding `alpha` into a leading scalar if there
    /// is one.
    ///
    /// ```
    /// use exprarray::{Array, Node};
    /// let a: Array<f64, 1> = Array::new([2], [1.0, 2.0]);
    /// let node = Node::scale(3.0, Node::scale(2.0, Node::leaf(a.view())));
    /// assert_eq!(node.to_string(), "(6 * [2])");
    /// ```
    pub fn scale(alpha: T, node: Self) -> Self {
        match node {
            Node::Literal(b) => Node::Literal(alpha * b),
            Node::Binary(Op::Mul, l, r) => match *l {
                Node::Literal(b) => Node::Binary(Op::Mul, Box::new(Node::Literal(alpha * b)), r),
                l @ Node::Binary(Op::Mul, ..) if l.as_literal_factor().is_some() => {
                    Node::Binary(Op::Mul, Box::new(Self::scale(alpha, l)), r)
                },
                l => Node::Binary(Op::Mul, Box::new(Node::Literal(alpha)), Box::new(Node::Binary(Op::Mul, Box::new(l), r))),
            },
            node => Self::binary(Op::Mul, Node::Literal(alpha), node),
        }
    }

    pub fn sum(l: Self, r: Self) -> Self { Self::binary(Op::Add, l, r) }

    pub fn difference(l: Self, r: Self) -> Self { Self::binary(Op::Sub, l, r) }

    /// Builds `l * r`. A literal on either side becomes a leading scalar.
    pub fn product(l: Self, r: Self) -> Self {
        match (l, r) {
            (Node::Literal(a), r) => Self::scale(a, r),
            (l, Node::Literal(b)) => Self::scale(b, l),
            (l, r) => Self::binary(Op::Mul, l, r),
        }
    }

    /// Builds `l / r`. Division by a literal becomes a leading scalar.
    pub fn quotient(l: Self, r: Self) -> Self {
        match r {
            Node::Literal(b) => Self::scale(T::one() / b, l),
            r => Self::binary(Op::Div, l, r),
        }
    }

    pub fn negate(node: Self) -> Self { Self::scale(-T::one(), node) }

    /// Builds `transpose(node)`, moving the transpose inside a leading scalar
    /// and cancelling double transposes.
    ///
    /// ```
    /// use exprarray::{Array, Node};
    /// let a: Array<f64, 2> = Array::zeros([2, 3]);
    /// let t = Node::transpose(Node::operand(a.view()));
    /// assert_eq!(t.to_string(), "(1 * t([2x3]))");
    /// assert_eq!(Node::transpose(t).to_string(), "(1 * [2x3])");
    /// ```
    pub fn transpose(node: Self) -> Self {
        match node {
            Node::Literal(a) => Node::Literal(a),
            Node::Transpose(x) => *x,
            Node::Binary(Op::Mul, l, r) if matches!(*l, Node::Literal(_)) => match *r {
                Node::Transpose(x) => Node::Binary(Op::Mul, l, x),
                r => Node::Binary(Op::Mul, l, Box::new(Node::Transpose(Box::new(r)))),
            },
            node => Self::binary(Op::Mul, Node::Literal(T::one()), Node::Transpose(Box::new(node))),
        }
    }

    /// Converts every element in the tree, copying borrowed leaves.
    pub fn map<U: Element>(self, f: &impl Fn(T) -> U) -> Node<'a, U> {
        match self {
            Node::Literal(x) => Node::Literal(f(x)),
            Node::Leaf(leaf) => Node::Leaf(Leaf::Owned(leaf.view().map(f))),
            Node::Transpose(x) => Node::Transpose(Box::new(x.map(f))),
            Node::Binary(op, l, r) => Node::Binary(op, Box::new(l.map(f)), Box::new(r.map(f))),
        }
    }

    // ------------------------------------------------------------------------

    /// The operands of a binary node.
    pub fn operands(&self) -> Option<(&Self, &Self)> {
        match self {
            Node::Binary(_, l, r) => Some((l, r)),
            _ => None,
        }
    }

    /// The operands of a product node.
    pub fn factors(&self) -> Option<(&Self, &Self)> {
        match self {
            Node::Binary(Op::Mul, l, r) => Some((l, r)),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<T> {
        match *self {
            Node::Literal(x) => Some(x),
            _ => None,
        }
    }

    fn as_literal_factor(&self) -> Option<T> {
        match self {
            Node::Binary(Op::Mul, l, _) => l.as_literal(),
            _ => None,
        }
    }

    /// Matches `α·A` where `A` is a leaf.
    pub fn as_scaled(&self) -> Option<(T, DenseRef<'_, T>)> {
        match self {
            Node::Binary(Op::Mul, l, r) => match (&**l, &**r) {
                (&Node::Literal(alpha), Node::Leaf(leaf)) => Some((alpha, leaf.view())),
                _ => None,
            },
            _ => None,
        }
    }

    /// Matches `α·transpose(A)` where `A` is a leaf.
    pub fn as_scaled_transposed(&self) -> Option<(T, DenseRef<'_, T>)> {
        match self {
            Node::Binary(Op::Mul, l, r) => match (&**l, &**r) {
                (&Node::Literal(alpha), Node::Transpose(x)) => match &**x {
                    Node::Leaf(leaf) => Some((alpha, leaf.view())),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    }

    /// Matches `α·op(A)` where `A` is a leaf and `op` is either the identity
    /// or a transpose.
    pub fn as_scaled_op(&self) -> Option<(T, Trans, DenseRef<'_, T>)> {
        if let Some((alpha, a)) = self.as_scaled() { return Some((alpha, Trans::N, a)); }
        self.as_scaled_transposed().map(|(alpha, a)| (alpha, Trans::T, a))
    }
}

// ----------------------------------------------------------------------------

fn write_shape(f: &mut Formatter, shape: &[usize]) -> fmt::Result {
    write!(f, "[")?;
    for (i, n) in shape.iter().enumerate() {
        if i > 0 { write!(f, "x")?; }
        write!(f, "{}", n)?;
    }
    write!(f, "]")
}

/// Prints the structure of the tree. Leaves print as their shape.
impl<'a, T: Element> Display for Node<'a, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Node::Literal(x) => write!(f, "{}", x),
            Node::Leaf(leaf) => write_shape(f, leaf.view().shape()),
            Node::Transpose(x) => write!(f, "t({})", x),
            Node::Binary(op, l, r) => write!(f, "({} {} {})", l, op, r),
        }
    }
}

// ----------------------------------------------------------------------------
