//! Sparse keyed tables of precomputed probabilities and critical values.
//!
//! A [`SparseKeyedTable`] is a dense store addressed by 1 to 3 integer
//! keys, each with its own declared inclusive range. Cells start out
//! undefined; an external loader (or a generator) populates them once and
//! the table is read-only afterwards.
//!
//! The last axis may be labelled by a [`Header`] of monotonic thresholds
//! (for example significance levels). In that case the last key is the
//! header column index and [`SparseKeyedTable::add_row`] fills every
//! column for one leading key tuple.
//!
//! Keys outside the declared range are errors; they are never clamped or
//! wrapped.
//!
//! # Examples
//! ```
//! use u_nonparam::table::{Header, SparseKeyedTable};
//!
//! let header = Header::new(vec![0.01, 0.05, 0.10]).unwrap();
//! let mut table = SparseKeyedTable::<2>::with_header(&[5..=10], header).unwrap();
//! table.add_row(&[6], &[0.0, 2.0, 3.0]).unwrap();
//! assert_eq!(table.get([6, 1]).unwrap(), Some(2.0));
//! assert_eq!(table.get([7, 1]).unwrap(), None);
//! assert!(table.get([11, 0]).is_err());
//! ```

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Numeric marker for an undefined cell, for callers that need a plain
/// `f64`. No probability or critical value can equal it.
pub const UNDEFINED: f64 = -1.0;

/// Ordering of header thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderOrder {
    /// Strictly increasing thresholds.
    Ascending,
    /// Strictly decreasing thresholds.
    Descending,
}

/// Ordered thresholds labelling the last axis of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    values: Vec<f64>,
    order: HeaderOrder,
}

impl Header {
    /// Creates a header from strictly monotonic, finite thresholds.
    ///
    /// # Errors
    /// [`Error::Header`] if the sequence is empty, contains non-finite
    /// values, or is not strictly monotonic.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::Header("header must not be empty".into()));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::Header("header values must be finite".into()));
        }
        let order = if values.len() == 1 || values[1] > values[0] {
            HeaderOrder::Ascending
        } else {
            HeaderOrder::Descending
        };
        let monotonic = values.windows(2).all(|w| match order {
            HeaderOrder::Ascending => w[1] > w[0],
            HeaderOrder::Descending => w[1] < w[0],
        });
        if !monotonic {
            return Err(Error::Header(format!(
                "header must be strictly monotonic, got {values:?}"
            )));
        }
        Ok(Self { values, order })
    }

    /// Number of thresholds.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed header.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ascending or descending.
    pub fn order(&self) -> HeaderOrder {
        self.order
    }

    /// Thresholds in column order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The i-th threshold, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied()
    }

    /// Column holding exactly `threshold` (within 1e-12).
    pub fn position(&self, threshold: f64) -> Option<usize> {
        self.values
            .iter()
            .position(|&v| (v - threshold).abs() < 1e-12)
    }
}

/// Direction of a fallback scan along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards larger keys.
    Ascending,
    /// Towards smaller keys.
    Descending,
}

/// Dense table of optional values addressed by `D` integer keys.
#[derive(Debug, Clone)]
pub struct SparseKeyedTable<const D: usize> {
    starts: [usize; D],
    extents: [usize; D],
    header: Option<Header>,
    cells: Vec<Option<f64>>,
}

impl<const D: usize> SparseKeyedTable<D> {
    /// Creates a table whose axes are raw integer key ranges.
    ///
    /// # Errors
    /// [`Error::InvalidShape`] if `D` is not 1, 2 or 3, or any range is
    /// empty.
    pub fn new(ranges: [RangeInclusive<usize>; D]) -> Result<Self> {
        Self::build(&ranges, None)
    }

    /// Creates a table whose last axis is a header column.
    ///
    /// `leading` declares the ranges of the first `D − 1` axes; the last
    /// axis spans `0..header.len()`.
    ///
    /// # Errors
    /// [`Error::Arity`] if `leading.len() != D − 1`;
    /// [`Error::InvalidShape`] as for [`SparseKeyedTable::new`].
    pub fn with_header(leading: &[RangeInclusive<usize>], header: Header) -> Result<Self> {
        if D == 0 || leading.len() + 1 != D {
            return Err(Error::Arity {
                expected: D.saturating_sub(1),
                found: leading.len(),
            });
        }
        let mut ranges: Vec<RangeInclusive<usize>> = leading.to_vec();
        ranges.push(0..=header.len() - 1);
        Self::build(&ranges, Some(header))
    }

    fn build(ranges: &[RangeInclusive<usize>], header: Option<Header>) -> Result<Self> {
        if !(1..=3).contains(&D) {
            return Err(Error::InvalidShape(format!(
                "tables have 1 to 3 key axes, got {D}"
            )));
        }
        let mut starts = [0usize; D];
        let mut extents = [0usize; D];
        for (axis, range) in ranges.iter().enumerate() {
            if range.is_empty() {
                return Err(Error::InvalidShape(format!(
                    "axis {axis} has empty range {range:?}"
                )));
            }
            starts[axis] = *range.start();
            extents[axis] = range.end() - range.start() + 1;
        }
        let size = extents.iter().product();
        Ok(Self {
            starts,
            extents,
            header,
            cells: vec![None; size],
        })
    }

    fn offset(&self, keys: &[usize; D]) -> Result<usize> {
        let mut offset = 0;
        for axis in 0..D {
            let key = keys[axis];
            let start = self.starts[axis];
            let end = start + self.extents[axis] - 1;
            if key < start || key > end {
                return Err(Error::KeyOutOfRange {
                    axis,
                    key,
                    min: start,
                    max: end,
                });
            }
            offset = offset * self.extents[axis] + (key - start);
        }
        Ok(offset)
    }

    /// Inclusive key range of `axis`, or `None` if the axis does not exist.
    pub fn key_range(&self, axis: usize) -> Option<RangeInclusive<usize>> {
        if axis >= D {
            return None;
        }
        let start = self.starts[axis];
        Some(start..=start + self.extents[axis] - 1)
    }

    /// True when `keys` lies inside every declared range.
    pub fn contains(&self, keys: [usize; D]) -> bool {
        self.offset(&keys).is_ok()
    }

    /// Value at `keys`, `None` if the cell was never written.
    ///
    /// # Errors
    /// [`Error::KeyOutOfRange`] for keys outside the declared ranges.
    pub fn get(&self, keys: [usize; D]) -> Result<Option<f64>> {
        let i = self.offset(&keys)?;
        Ok(self.cells[i])
    }

    /// Value at `keys`, or [`UNDEFINED`] for an unwritten cell.
    pub fn get_or_undefined(&self, keys: [usize; D]) -> Result<f64> {
        Ok(self.get(keys)?.unwrap_or(UNDEFINED))
    }

    /// True when the cell at `keys` has been written.
    pub fn is_defined(&self, keys: [usize; D]) -> Result<bool> {
        Ok(self.get(keys)?.is_some())
    }

    /// Writes `value` at `keys`.
    ///
    /// # Errors
    /// [`Error::KeyOutOfRange`] for bad keys, [`Error::Domain`] for NaN.
    pub fn set(&mut self, keys: [usize; D], value: f64) -> Result<()> {
        if value.is_nan() {
            return Err(Error::Domain(format!("NaN stored at {keys:?}")));
        }
        let i = self.offset(&keys)?;
        self.cells[i] = Some(value);
        Ok(())
    }

    /// Adds `delta` to the cell at `keys`, treating an undefined cell as 0.
    pub fn add(&mut self, keys: [usize; D], delta: f64) -> Result<()> {
        if delta.is_nan() {
            return Err(Error::Domain(format!("NaN added at {keys:?}")));
        }
        let i = self.offset(&keys)?;
        self.cells[i] = Some(self.cells[i].unwrap_or(0.0) + delta);
        Ok(())
    }

    /// Sets every cell of the last axis for the leading keys `prefix`.
    ///
    /// # Errors
    /// [`Error::Arity`] if `prefix.len() != D − 1` or `values` does not
    /// cover the last axis exactly.
    pub fn add_row(&mut self, prefix: &[usize], values: &[f64]) -> Result<()> {
        let row: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        self.add_row_partial(prefix, &row)
    }

    /// Like [`SparseKeyedTable::add_row`], with `None` leaving a column
    /// undefined.
    pub fn add_row_partial(&mut self, prefix: &[usize], values: &[Option<f64>]) -> Result<()> {
        if prefix.len() + 1 != D {
            return Err(Error::Arity {
                expected: D - 1,
                found: prefix.len(),
            });
        }
        let last = D - 1;
        if values.len() != self.extents[last] {
            return Err(Error::Arity {
                expected: self.extents[last],
                found: values.len(),
            });
        }
        let mut keys = [0usize; D];
        keys[..last].copy_from_slice(prefix);
        keys[last] = self.starts[last];
        let first = self.offset(&keys)?;
        if let Some(column) = values.iter().position(|v| v.is_some_and(f64::is_nan)) {
            keys[last] += column;
            return Err(Error::Domain(format!("NaN stored at {keys:?}")));
        }
        // the last axis is innermost, so a row is one contiguous run
        self.cells[first..first + values.len()].copy_from_slice(values);
        Ok(())
    }

    /// Header of the last axis, if the table has one.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// The i-th header threshold.
    ///
    /// # Errors
    /// [`Error::Header`] if the table has no header;
    /// [`Error::KeyOutOfRange`] past the last column.
    pub fn get_header(&self, i: usize) -> Result<f64> {
        let header = self
            .header
            .as_ref()
            .ok_or_else(|| Error::Header("table has no header".into()))?;
        header.get(i).ok_or(Error::KeyOutOfRange {
            axis: D - 1,
            key: i,
            min: 0,
            max: header.len() - 1,
        })
    }

    /// Column index holding `threshold`.
    ///
    /// # Errors
    /// [`Error::Header`] if there is no header or the threshold is absent.
    pub fn column_of(&self, threshold: f64) -> Result<usize> {
        self.header
            .as_ref()
            .and_then(|h| h.position(threshold))
            .ok_or_else(|| Error::Header(format!("threshold {threshold} not in header")))
    }

    /// Walks `axis` from `start` (inclusive) in `direction` and returns
    /// the first defined cell, or `None` when the axis is exhausted.
    ///
    /// # Errors
    /// [`Error::KeyOutOfRange`] if `start` is outside the table;
    /// [`Error::Arity`] if `axis >= D`.
    pub fn scan(
        &self,
        start: [usize; D],
        axis: usize,
        direction: Direction,
    ) -> Result<Option<([usize; D], f64)>> {
        if axis >= D {
            return Err(Error::Arity {
                expected: D,
                found: axis + 1,
            });
        }
        self.offset(&start)?;
        let lo = self.starts[axis];
        let hi = lo + self.extents[axis] - 1;
        let mut keys = start;
        loop {
            if let Some(v) = self.get(keys)? {
                return Ok(Some((keys, v)));
            }
            match direction {
                Direction::Ascending if keys[axis] < hi => keys[axis] += 1,
                Direction::Descending if keys[axis] > lo => keys[axis] -= 1,
                _ => return Ok(None),
            }
        }
    }

    /// Number of defined cells.
    pub fn defined_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn set_then_get(
            a in 3_usize..12,
            b in 0_usize..20,
            value in 0.0_f64..1.0,
        ) {
            let mut table = SparseKeyedTable::<2>::new([3..=11, 0..=19]).unwrap();
            table.set([a.min(11), b], value).unwrap();
            prop_assert_eq!(table.get([a.min(11), b]).unwrap(), Some(value));
            prop_assert_eq!(table.defined_cells(), 1);
        }

        #[test]
        fn out_of_range_never_clamps(key in 21_usize..1000) {
            let table = SparseKeyedTable::<1>::new([0..=20]).unwrap();
            prop_assert!(table.get([key]).is_err());
        }
    }
}
