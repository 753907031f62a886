//! Printing, one dimension at a time.
//!
//! A vector prints one element per line. A matrix prints in its visual
//! row-by-row layout even though it is stored column-major. Higher ranks
//! print one labelled block per index of the last axis, recursively. The
//! formatter's precision, if any, applies to every element.

use std::fmt::{self, Display, Formatter};

use super::{Array, Dense, Element};

fn element<T: Element>(f: &mut Formatter, x: T) -> fmt::Result {
    match f.precision() {
        Some(p) => write!(f, " {:.*}", p, x),
        None => write!(f, " {}", x),
    }
}

/// Prints a column-major buffer of shape `shape`.
pub(crate) fn print<T: Element>(f: &mut Formatter, shape: &[usize], items: &[T]) -> fmt::Result {
    match shape.len() {
        1 => {
            writeln!(f, "Array<1> ({})", shape[0])?;
            for &x in items {
                element(f, x)?;
                writeln!(f)?;
            }
        },
        2 => {
            let (m, n) = (shape[0], shape[1]);
            writeln!(f, "Array<2> ({}x{})", m, n)?;
            for i in 0..m {
                for j in 0..n { element(f, items[i + j * m])?; }
                writeln!(f)?;
            }
        },
        d => {
            let (outer, last) = shape.split_at(d - 1);
            let stride = items.len() / last[0];
            for (i, block) in items.chunks(stride).enumerate() {
                write!(f, "Dim {}: {}, ", d, i)?;
                print(f, outer, block)?;
            }
        },
    }
    Ok(())
}

/// Prints a row vector on a single line.
pub(crate) fn print_row<T: Element>(f: &mut Formatter, items: &[T]) -> fmt::Result {
    for &x in items { element(f, x)?; }
    writeln!(f)
}

impl<T: Element, const D: usize> Display for Array<T, D> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result { print(f, &self.shape(), self.as_ref()) }
}

impl<T: Element> Display for Dense<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result { print(f, self.shape(), self.items()) }
}

// ----------------------------------------------------------------------------
