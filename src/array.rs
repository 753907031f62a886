use std::ops::{Index, IndexMut};

use super::{shape, Shape, Element, Proxy, ProxyMut};

/// A dense rank-erased buffer, owned. This is what the evaluator produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense<T> {
    shape: Shape,
    items: Vec<T>,
}

impl<T: Element> Dense<T> {
    /// Constructs a `Dense` given its elements in column-major order.
    pub fn new(shape: impl Into<Shape>, items: impl Into<Vec<T>>) -> Self {
        let shape = shape.into();
        let items = items.into();
        assert_eq!(shape.length(), items.len(), "Shape {:?} does not match {} items", &*shape, items.len());
        Self {shape, items}
    }

    /// Constructs a zero-filled `Dense`.
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        let items = vec![T::zero(); shape.length()];
        Self {shape, items}
    }

    pub fn shape(&self) -> &[usize] { &self.shape }

    pub fn rank(&self) -> usize { self.shape.rank() }

    pub fn items(&self) -> &[T] { &self.items }

    pub fn items_mut(&mut self) -> &mut [T] { &mut self.items }

    pub fn view(&self) -> DenseRef<'_, T> { DenseRef {shape: &self.shape, items: &self.items} }

    pub fn view_mut(&mut self) -> DenseMut<'_, T> { DenseMut {shape: &self.shape, items: &mut self.items} }

    /// Reinterprets the buffer with a different shape of the same length.
    pub fn reshape(self, shape: impl Into<Shape>) -> Self { Self::new(shape, self.items) }

    /// Converts `self` into an [`Array`] of rank `D`.
    ///
    /// A vector-shaped buffer (at most one axis longer than 1) converts to
    /// rank 1 whatever its rank.
    ///
    /// # Panics
    ///
    /// Panics if the rank does not match.
    pub fn into_array<const D: usize>(self) -> Array<T, D> {
        if D == 1 && self.rank() != 1 && self.shape.iter().filter(|&&n| n != 1).count() <= 1 {
            let n = self.items.len();
            return self.reshape([n]).into_array();
        }
        let shape: [usize; D] = match <[usize; D]>::try_from(&*self.shape) {
            Ok(shape) => shape,
            Err(_) => panic!("Cannot convert shape {:?} to rank {}", &*self.shape, D),
        };
        Array::new_inner(shape, self.items.into())
    }
}

// ----------------------------------------------------------------------------

/// A borrowed [`Dense`] buffer. Expression leaves hold these.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DenseRef<'a, T> {
    shape: &'a [usize],
    items: &'a [T],
}

impl<'a, T: Element> DenseRef<'a, T> {
    pub fn shape(&self) -> &'a [usize] { self.shape }

    pub fn rank(&self) -> usize { self.shape.len() }

    pub fn items(&self) -> &'a [T] { self.items }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// The first dimension. A vector counts as a column.
    pub fn rows(&self) -> usize { self.shape[0] }

    /// The second dimension, or `1` for a vector.
    pub fn columns(&self) -> usize { self.shape.get(1).copied().unwrap_or(1) }

    pub fn to_owned(&self) -> Dense<T> { Dense::new(self.shape, self.items) }

    /// Copies and converts the elements.
    pub fn map<U: Element>(&self, f: impl Fn(T) -> U) -> Dense<U> {
        Dense::new(self.shape, self.items.iter().map(|&x| f(x)).collect::<Vec<_>>())
    }
}

/// A mutably borrowed [`Dense`] buffer. Compound assignment writes into one.
#[derive(Debug)]
pub struct DenseMut<'a, T> {
    shape: &'a [usize],
    items: &'a mut [T],
}

impl<'a, T: Element> DenseMut<'a, T> {
    pub fn shape(&self) -> &[usize] { self.shape }

    pub fn rank(&self) -> usize { self.shape.len() }

    pub fn items(&self) -> &[T] { self.items }

    pub fn items_mut(&mut self) -> &mut [T] { self.items }
}

// ----------------------------------------------------------------------------

/// A dense rank-`D` array of `T`s, stored column-major.
///
/// Arithmetic on `&Array`s builds an [`Expr`] instead of computing anything.
/// The result is computed when the `Expr` is converted back into an `Array`.
///
/// ```
/// use exprarray::{Array, transpose};
/// let x: Array<f64, 1> = Array::new([3], [0.0, 1.0, 2.0]);
/// let y: Array<f64, 1> = Array::new([3], [3.0, 2.0, 1.0]);
/// let sum = Array::from(&x + &y);
/// assert_eq!(sum.as_ref(), [3.0, 3.0, 3.0]);
/// assert_eq!((transpose(&x) * &y).eval(), 4.0);
/// ```
///
/// [`Expr`]: super::Expr
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T, const D: usize> {
    shape: [usize; D],
    items: Box<[T]>,
}

impl<T: Element, const D: usize> Array<T, D> {
    fn new_inner(shape: [usize; D], items: Box<[T]>) -> Self {
        assert!(D > 0, "An Array must have at least one axis");
        shape::check(&shape);
        assert_eq!(shape::length(&shape), items.len(), "Shape {:?} does not match {} items", shape, items.len());
        Self {shape, items}
    }

    /// Constructs an `Array` of shape `shape` given its elements in
    /// column-major order.
    ///
    /// ```
    /// use exprarray::Array;
    /// let a: Array<f64, 2> = Array::new([2, 3], [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    /// assert_eq!(a[[0, 0]], 1.0);
    /// assert_eq!(a[[1, 0]], 4.0);
    /// assert_eq!(a[[0, 2]], 3.0);
    /// ```
    pub fn new(shape: [usize; D], items: impl Into<Box<[T]>>) -> Self {
        Self::new_inner(shape, items.into())
    }

    /// Constructs a zero-filled `Array` of shape `shape`.
    pub fn zeros(shape: [usize; D]) -> Self { Self::filled(shape, T::zero()) }

    /// Constructs an `Array` of shape `shape` with every element `value`.
    pub fn filled(shape: [usize; D], value: T) -> Self {
        shape::check(&shape);
        Self::new_inner(shape, vec![value; shape::length(&shape)].into())
    }

    /// Constructs a zero-filled `Array` from fewer than `D` sizes, repeating
    /// the last size for the remaining axes.
    ///
    /// ```
    /// use exprarray::Array;
    /// let a: Array<f32, 3> = Array::broadcast(&[2, 3]);
    /// assert_eq!(a.shape(), [2, 3, 3]);
    /// ```
    pub fn broadcast(sizes: &[usize]) -> Self { Self::zeros(shape::broadcast(sizes)) }

    /// Constructs an `Array` of shape `shape` from a function of the index.
    ///
    /// ```
    /// use exprarray::Array;
    /// let a: Array<f64, 2> = Array::from_fn([2, 2], |[i, j]| (10 * i + j) as f64);
    /// assert_eq!(a.as_ref(), [0.0, 10.0, 1.0, 11.0]);
    /// ```
    pub fn from_fn(shape: [usize; D], mut f: impl FnMut([usize; D]) -> T) -> Self {
        shape::check(&shape);
        let items: Vec<T> = (0..shape::length(&shape)).map(|o| f(shape::unravel(&shape, o))).collect();
        Self::new_inner(shape, items.into())
    }

    /// The size of each axis.
    pub fn shape(&self) -> [usize; D] { self.shape }

    /// The size of axis `axis`.
    pub fn dim(&self, axis: usize) -> usize { self.shape[axis] }

    /// The number of elements, i.e. the product of the sizes.
    pub fn size(&self) -> usize { self.items.len() }

    /// Returns the raw array elements.
    pub fn to_raw(self) -> Box<[T]> { self.items }

    /// Returns the element at `index`, if it is in bounds.
    pub fn get(&self, index: [usize; D]) -> Option<&T> {
        if index.iter().zip(&self.shape).all(|(&i, &n)| i < n) {
            Some(&self.items[shape::offset(&self.shape, &index)])
        } else {
            None
        }
    }

    /// Starts a chained single-index access. See [`Proxy`].
    pub fn proxy(&self, i: usize) -> Proxy<'_, T> { Proxy::new(&self.shape, &self.items).at(i) }

    /// Starts a chained single-index access that can write. See [`ProxyMut`].
    pub fn proxy_mut(&mut self, i: usize) -> ProxyMut<'_, T> { ProxyMut::new(&self.shape, &mut self.items).at(i) }

    pub fn view(&self) -> DenseRef<'_, T> { DenseRef {shape: &self.shape, items: &self.items} }

    pub fn view_mut(&mut self) -> DenseMut<'_, T> { DenseMut {shape: &self.shape, items: &mut self.items} }

    /// Converts `self` into a rank-erased buffer.
    pub fn into_dense(self) -> Dense<T> { Dense::new(self.shape, self.items.into_vec()) }
}

impl<T: Element> Array<T, 2> {
    pub fn rows(&self) -> usize { self.shape[0] }

    pub fn columns(&self) -> usize { self.shape[1] }
}

impl<T, const D: usize> AsRef<[T]> for Array<T, D> {
    fn as_ref(&self) -> &[T] { &self.items }
}

impl<T, const D: usize> AsMut<[T]> for Array<T, D> {
    fn as_mut(&mut self) -> &mut [T] { &mut self.items }
}

impl<T: Element, const D: usize> Index<[usize; D]> for Array<T, D> {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: [usize; D]) -> &T { &self.items[shape::offset(&self.shape, &index)] }
}

impl<T: Element, const D: usize> IndexMut<[usize; D]> for Array<T, D> {
    #[inline(always)]
    fn index_mut(&mut self, index: [usize; D]) -> &mut T { &mut self.items[shape::offset(&self.shape, &index)] }
}

impl<T: Element> Index<usize> for Array<T, 1> {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: usize) -> &T { &self[[index]] }
}

impl<T: Element> IndexMut<usize> for Array<T, 1> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T { &mut self[[index]] }
}

// ----------------------------------------------------------------------------
