//! Chained single-index access.
//!
//! `a.proxy(i).at(j).at(k)` names the same element as `a[[i, j, k]]`. Each
//! step consumes one axis and folds its index into a running column-major
//! offset. The element can be reached only once every axis is consumed.

use std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};

use super::Element;

/// A partially indexed read-only [`Array`].
///
/// ```
/// use exprarray::Array;
/// let a: Array<f64, 2> = Array::from_fn([2, 3], |[i, j]| (10 * i + j) as f64);
/// assert_eq!(a.proxy(1).at(2).get(), 12.0);
/// assert_eq!(a.proxy(1).remaining(), 1);
/// ```
///
/// [`Array`]: super::Array
#[derive(Debug, Copy, Clone)]
pub struct Proxy<'a, T> {
    shape: &'a [usize],
    items: &'a [T],
    offset: usize,
    stride: usize,
    axis: usize,
}

impl<'a, T: Element> Proxy<'a, T> {
    pub(crate) fn new(shape: &'a [usize], items: &'a [T]) -> Self {
        Self {shape, items, offset: 0, stride: 1, axis: 0}
    }

    /// The number of indices still to be supplied.
    pub fn remaining(&self) -> usize { self.shape.len() - self.axis }

    /// Supplies the index for the next axis.
    pub fn at(mut self, i: usize) -> Self {
        (self.offset, self.stride) = step(self.shape, self.axis, self.offset, self.stride, i);
        self.axis += 1;
        self
    }

    /// Returns the element. Panics if indices remain to be supplied.
    pub fn get(self) -> T {
        done(self.shape, self.axis);
        self.items[self.offset]
    }
}

// ----------------------------------------------------------------------------

/// A partially indexed mutable [`Array`].
///
/// ```
/// use exprarray::Array;
/// let mut a: Array<f64, 2> = Array::zeros([2, 2]);
/// a.proxy_mut(0).at(1).set(3.0);
/// let mut p = a.proxy_mut(0).at(1);
/// p += 1.0;
/// assert_eq!(a[[0, 1]], 4.0);
/// ```
///
/// [`Array`]: super::Array
#[derive(Debug)]
pub struct ProxyMut<'a, T> {
    shape: &'a [usize],
    items: &'a mut [T],
    offset: usize,
    stride: usize,
    axis: usize,
}

impl<'a, T: Element> ProxyMut<'a, T> {
    pub(crate) fn new(shape: &'a [usize], items: &'a mut [T]) -> Self {
        Self {shape, items, offset: 0, stride: 1, axis: 0}
    }

    pub fn remaining(&self) -> usize { self.shape.len() - self.axis }

    pub fn at(mut self, i: usize) -> Self {
        (self.offset, self.stride) = step(self.shape, self.axis, self.offset, self.stride, i);
        self.axis += 1;
        self
    }

    pub fn get(&self) -> T {
        done(self.shape, self.axis);
        self.items[self.offset]
    }

    pub fn set(self, value: T) { *self.into_mut() = value; }

    /// Converts `self` into a reference to the element.
    pub fn into_mut(self) -> &'a mut T {
        done(self.shape, self.axis);
        let Self {items, offset, ..} = self;
        &mut items[offset]
    }
}

macro_rules! impl_assign_for_proxy {
    ($trait:ident { $method:ident } $op:tt) => {
        impl<'a, T: Element> $trait<T> for ProxyMut<'a, T> {
            fn $method(&mut self, other: T) {
                done(self.shape, self.axis);
                let x = &mut self.items[self.offset];
                *x = *x $op other;
            }
        }
    };
}

impl_assign_for_proxy!(AddAssign { add_assign } +);
impl_assign_for_proxy!(SubAssign { sub_assign } -);
impl_assign_for_proxy!(MulAssign { mul_assign } *);
impl_assign_for_proxy!(DivAssign { div_assign } /);

// ----------------------------------------------------------------------------

fn step(shape: &[usize], axis: usize, offset: usize, stride: usize, i: usize) -> (usize, usize) {
    assert!(axis < shape.len(), "Too many indices for shape {:?}", shape);
    let n = shape[axis];
    assert!(i < n, "Index {} is out of bounds for axis {} of size {}", i, axis, n);
    (offset + i * stride, stride * n)
}

fn done(shape: &[usize], axis: usize) {
    assert_eq!(axis, shape.len(), "Expected {} indices for shape {:?}, got {}", shape.len(), shape, axis);
}

// ----------------------------------------------------------------------------
