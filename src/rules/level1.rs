//! Rules that end in level 1 routines: `scale`, `axpy` and `dot`.

use super::{copy_scaled, transposed, Rule};
use crate::{DenseRef, Element, Kernel, Node, Value, evaluate, eval::conformable};

/// `α·A`: one copy and one `scale`.
pub enum Scal {}

impl Rule for Scal {
    const NAME: &'static str = "scal";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        let (alpha, a) = node.as_scaled()?;
        Some(copy_scaled(alpha, a, kernel).map(Value::Dense))
    }
}

// ----------------------------------------------------------------------------

/// `α·transpose(A)`: one transposed copy and one `scale`.
pub enum TransposedScal {}

impl Rule for TransposedScal {
    const NAME: &'static str = "transposed scal";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        let (alpha, a) = node.as_scaled_transposed()?;
        let t = transposed(a);
        Some(copy_scaled(alpha, t.view(), kernel).map(Value::Dense))
    }
}

// ----------------------------------------------------------------------------

fn combine<T: Element, K: Kernel<T>>(node: &Node<'_, T>, sign: T, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
    let (l, r) = node.operands()?;
    let (alpha, a) = l.as_scaled()?;
    let (beta, b) = r.as_scaled()?;
    assert!(
        conformable(a.shape(), b.shape()),
        "Shape mismatch: cannot combine {:?} with {:?}", a.shape(), b.shape(),
    );
    Some(axpby(alpha, a, sign * beta, b, kernel))
}

/// `alpha * a + beta * b` in a new buffer shaped like `a`.
fn axpby<T: Element, K: Kernel<T>>(alpha: T, a: DenseRef<'_, T>, beta: T, b: DenseRef<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
    let mut result = copy_scaled(alpha, a, kernel)?;
    let n = result.items().len();
    kernel.axpy(n, beta, b.items(), 1, result.items_mut(), 1)?;
    Ok(Value::Dense(result))
}

/// `α·A + β·B`: one copy, one `scale` and one `axpy`.
pub enum ScaledSum {}

impl Rule for ScaledSum {
    const NAME: &'static str = "scaled sum";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        combine(node, T::one(), kernel)
    }
}

/// `α·A - β·B`: one copy, one `scale` and one `axpy` by `-β`.
pub enum ScaledDifference {}

impl Rule for ScaledDifference {
    const NAME: &'static str = "scaled difference";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        combine(node, -T::one(), kernel)
    }
}

// ----------------------------------------------------------------------------

/// `α·transpose(x) * β·y` for vectors `x` and `y`: one `dot`.
pub enum Dot {}

impl Rule for Dot {
    const NAME: &'static str = "dot";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        let (l, r) = node.factors()?;
        let (alpha, x) = l.as_scaled_transposed()?;
        let (beta, y) = r.as_scaled()?;
        if x.rank() != 1 || y.rank() != 1 { return None; }
        assert_eq!(x.len(), y.len(), "Shape mismatch: cannot take the dot product of {:?} and {:?}", x.shape(), y.shape());
        Some(kernel.dot(x.len(), x.items(), 1, y.items(), 1).map(|d| Value::Scalar(alpha * beta * d)))
    }
}

// ----------------------------------------------------------------------------

/// `α·A / s` where `s` evaluates to a scalar: one copy and one `scale` by
/// `α / s`.
pub enum ScaledQuotient {}

impl Rule for ScaledQuotient {
    const NAME: &'static str = "scaled quotient";

    fn apply<T: Element, K: Kernel<T>>(node: &Node<'_, T>, kernel: &K) -> Option<Result<Value<T>, K::Error>> {
        let (l, r) = node.operands()?;
        let (alpha, a) = l.as_scaled()?;
        Some(divide(alpha, a, r, kernel))
    }
}

fn divide<T: Element, K: Kernel<T>>(alpha: T, a: DenseRef<'_, T>, divisor: &Node<'_, T>, kernel: &K) -> Result<Value<T>, K::Error> {
    let divisor = evaluate(divisor, kernel)?;
    let s = match divisor.as_scalar() {
        Some(s) => s,
        None => panic!("Cannot divide by {}", divisor),
    };
    Ok(Value::Dense(copy_scaled(alpha / s, a, kernel)?))
}

// ----------------------------------------------------------------------------
