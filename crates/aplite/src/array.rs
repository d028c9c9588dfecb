//! Multi-dimensional arrays.
//!
//! An array is a triple of shape, cells, and fill. The shape is a packed
//! vector of axis lengths; its length is the rank. The cell storage may be
//! logically shorter than the product of the shape, in which case reads past
//! the stored cells yield the fill — this one rule carries fill extension
//! uniformly through the primitives.

use crate::{
    data::{Data, Format},
    intern::Interner,
    value::Value,
};

/// Immutable array value: `(shape, cells, fill)`.
#[derive(Debug, Clone)]
pub struct Array {
    shape: Data,
    cells: Data,
    fill: Value,
}

impl Array {
    /// Builds an array from parts. The shape must be a natural-format
    /// vector; this is an internal invariant, not a thrown error.
    #[must_use]
    pub fn new(shape: Data, cells: Data, fill: Value) -> Self {
        debug_assert!(
            matches!(shape.format(), Format::Bit | Format::Natural8 | Format::Natural16 | Format::Natural32),
            "array shape must use a natural format"
        );
        Self { shape, cells, fill }
    }

    /// Builds an array with the given axis lengths, auto-narrowing the shape
    /// storage to the widest axis.
    #[must_use]
    pub fn with_shape(axes: &[u32], cells: Data, fill: Value) -> Self {
        Self::new(Data::shape(axes), cells, fill)
    }

    /// A rank-1 array covering all of `cells`.
    #[must_use]
    pub fn list(cells: Data, fill: Value) -> Self {
        let len = u32::try_from(cells.len()).expect("cell count overflow");
        Self::with_shape(&[len], cells, fill)
    }

    /// A rank-1, length-1 array holding one boxed cell.
    #[must_use]
    pub fn singleton(cell: Value, fill: Value) -> Self {
        Self::with_shape(&[1], Data::from_values(vec![cell]), fill)
    }

    /// A rank-1 boxed array of `cells` with the `nil` fill.
    #[must_use]
    pub fn from_values(cells: Vec<Value>) -> Self {
        Self::list(Data::from_values(cells), Value::nil())
    }

    /// The canonical empty array: shape `[0]`, no cells, fill `0`.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_shape(&[0], Data::empty(Format::Box), Value::zero())
    }

    /// A character array holding `text`, filled with spaces.
    #[must_use]
    pub fn string(text: &str) -> Self {
        Self::list(Data::from_text(text), Value::Character(' '))
    }

    /// Number of axes.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Length of axis `k`.
    #[must_use]
    pub fn axis_len(&self, k: usize) -> usize {
        usize::try_from(self.shape.get_natural(k)).expect("negative axis length")
    }

    /// Product of the axis lengths — the logical cell count, which may
    /// exceed the stored cell count.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        (0..self.rank()).fold(1usize, |acc, k| {
            acc.checked_mul(self.axis_len(k)).expect("array bound overflow")
        })
    }

    /// Reads the cell at `index`, extending with the fill beyond the stored
    /// cells.
    #[must_use]
    pub fn get_cell(&self, index: usize) -> Value {
        if index < self.cells.len() {
            self.cells.get_cell(index)
        } else {
            self.fill.clone()
        }
    }

    /// Reads an integer-valued cell, with fill extension. Panics when the
    /// cell does not hold an integer.
    #[must_use]
    pub fn get_natural(&self, index: usize) -> i64 {
        if index < self.cells.len() {
            self.cells.get_natural(index)
        } else {
            match &self.fill {
                Value::Number(n) if n.fract() == 0.0 && n.is_finite() => *n as i64,
                other => panic!("array fill is not an integer: {other:?}"),
            }
        }
    }

    /// The extension element.
    #[must_use]
    pub fn fill(&self) -> &Value {
        &self.fill
    }

    /// The packed shape vector. Cloning it shares the storage.
    #[must_use]
    pub fn shape(&self) -> &Data {
        &self.shape
    }

    /// The packed cell storage. Cloning it shares the storage, which is how
    /// reshape avoids copying.
    #[must_use]
    pub fn cells(&self) -> &Data {
        &self.cells
    }

    pub(crate) fn render(&self, interner: &Interner) -> String {
        if self.cells.format() == Format::Character && self.rank() == 1 {
            let text: String =
                (0..self.num_cells()).map(|i| self.get_cell(i).unpack_character()).collect();
            return format!("\"{text}\"");
        }
        let cells: Vec<String> =
            (0..self.num_cells()).map(|i| self.get_cell(i).render(interner)).collect();
        if self.rank() == 1 {
            format!("⟨{}⟩", cells.join(", "))
        } else {
            let axes: Vec<String> = (0..self.rank()).map(|k| self.axis_len(k).to_string()).collect();
            format!("⟨{}⥊{}⟩", axes.join("‿"), cells.join(", "))
        }
    }
}
