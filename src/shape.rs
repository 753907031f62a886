//! Shape descriptors and column-major offset arithmetic.
//!
//! A shape is an ordered sequence of non-zero dimension sizes. Elements are
//! stored column-major: the first index varies fastest, so
//! `stride[0] = 1` and `stride[i] = stride[i - 1] * shape[i - 1]`.

use std::ops::{Deref};

use smallvec::{SmallVec};

/// The rank-erased shape of a [`Dense`] buffer.
///
/// [`Dense`]: super::Dense
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape {
    /// Panics if any size is zero.
    pub fn new(sizes: &[usize]) -> Self {
        check(sizes);
        Self(SmallVec::from_slice(sizes))
    }

    /// The number of axes.
    pub fn rank(&self) -> usize { self.0.len() }

    /// The number of elements.
    pub fn length(&self) -> usize { length(&self.0) }
}

impl Deref for Shape {
    type Target = [usize];
    fn deref(&self) -> &[usize] { &self.0 }
}

impl<const D: usize> From<[usize; D]> for Shape {
    fn from(sizes: [usize; D]) -> Self { Self::new(&sizes) }
}

impl From<&[usize]> for Shape {
    fn from(sizes: &[usize]) -> Self { Self::new(sizes) }
}

// ----------------------------------------------------------------------------

/// Returns the number of elements of an array of shape `shape`.
pub fn length(shape: &[usize]) -> usize { shape.iter().product() }

/// Panics if any size in `shape` is zero.
pub fn check(shape: &[usize]) {
    for (axis, &n) in shape.iter().enumerate() {
        assert!(n != 0, "Axis {} of shape {:?} has size zero", axis, shape);
    }
}

/// Returns the position in a column-major buffer of the element at `index`.
///
/// Panics if the number of indices differs from the rank of `shape`, or if
/// any index is out of bounds.
///
/// ```
/// use exprarray::shape::offset;
/// assert_eq!(offset(&[2, 3], &[1, 2]), 5);
/// assert_eq!(offset(&[2, 3, 4], &[1, 0, 1]), 7);
/// ```
pub fn offset(shape: &[usize], index: &[usize]) -> usize {
    assert_eq!(
        index.len(), shape.len(),
        "Expected {} indices for shape {:?}, got {}", shape.len(), shape, index.len(),
    );
    let mut offset = 0;
    let mut stride = 1;
    for (axis, (&i, &n)) in index.iter().zip(shape).enumerate() {
        assert!(i < n, "Index {} is out of bounds for axis {} of size {}", i, axis, n);
        offset += i * stride;
        stride *= n;
    }
    offset
}

/// The inverse of [`offset()`].
pub fn unravel<const D: usize>(shape: &[usize; D], mut offset: usize) -> [usize; D] {
    let mut index = [0; D];
    for (i, &n) in index.iter_mut().zip(shape) {
        *i = offset % n;
        offset /= n;
    }
    assert_eq!(offset, 0, "Offset is out of bounds for shape {:?}", shape);
    index
}

/// Extends `sizes` to exactly `D` sizes by repeating its last size.
///
/// This is the only place where an under-specified shape is accepted. The
/// array constructors themselves always take exactly `D` sizes.
///
/// ```
/// use exprarray::shape::broadcast;
/// assert_eq!(broadcast::<3>(&[4]), [4, 4, 4]);
/// assert_eq!(broadcast::<3>(&[2, 5]), [2, 5, 5]);
/// assert_eq!(broadcast::<2>(&[2, 5]), [2, 5]);
/// ```
pub fn broadcast<const D: usize>(sizes: &[usize]) -> [usize; D] {
    assert!(
        !sizes.is_empty() && sizes.len() <= D,
        "Cannot broadcast {} sizes to rank {}", sizes.len(), D,
    );
    let last = sizes[sizes.len() - 1];
    let shape = std::array::from_fn(|axis| sizes.get(axis).copied().unwrap_or(last));
    check(&shape);
    shape
}

// ----------------------------------------------------------------------------
