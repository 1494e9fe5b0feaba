//! JSON documents for precomputed tables.
//!
//! A document declares the key ranges of a [`SparseKeyedTable`], an
//! optional header for the last axis, and the rows to store:
//!
//! ```json
//! {
//!   "axes": [[5, 6]],
//!   "header": { "values": [0.05, 0.025, 0.01] },
//!   "rows": [
//!     { "keys": [5], "values": [0, null, null] },
//!     { "keys": [6], "values": [2, 0, null] }
//!   ]
//! }
//! ```
//!
//! With a header, `axes` lists the `D − 1` leading ranges and each row is
//! a leading-key prefix followed by one value per header column (`null`
//! leaves the cell undefined). Without one, `axes` lists all `D` ranges and
//! each row carries a full key tuple and a single value.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::{Header, SparseKeyedTable};

/// Header column values as stored in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderDocument {
    pub values: Vec<f64>,
}

/// One row of a table document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDocument {
    pub keys: Vec<usize>,
    pub values: Vec<Option<f64>>,
}

/// Serialized form of a [`SparseKeyedTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDocument {
    /// Inclusive `[lo, hi]` key range per declared axis.
    pub axes: Vec<[usize; 2]>,
    #[serde(default)]
    pub header: Option<HeaderDocument>,
    #[serde(default)]
    pub rows: Vec<RowDocument>,
}

impl TableDocument {
    /// Parses a document.
    ///
    /// # Errors
    /// [`Error::Load`] on malformed JSON or a missing `axes` field.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn ranges(&self) -> Vec<RangeInclusive<usize>> {
        self.axes.iter().map(|[lo, hi]| *lo..=*hi).collect()
    }

    /// Builds a `D`-key table from the document.
    ///
    /// # Errors
    /// [`Error::Arity`] when the axis count or a row does not fit `D`;
    /// [`Error::Header`] for a non-monotonic header; any key error raised
    /// while storing the rows.
    ///
    /// # Examples
    /// ```
    /// use u_nonparam::loader::TableDocument;
    ///
    /// let doc = TableDocument::from_json(
    ///     r#"{ "axes": [[1, 2], [0, 3]], "rows": [{ "keys": [2, 3], "values": [0.5] }] }"#,
    /// ).unwrap();
    /// let table = doc.into_table::<2>().unwrap();
    /// assert_eq!(table.get([2, 3]).unwrap(), Some(0.5));
    /// assert_eq!(table.get([1, 3]).unwrap(), None);
    /// ```
    pub fn into_table<const D: usize>(self) -> Result<SparseKeyedTable<D>> {
        match &self.header {
            Some(header) => {
                let header = Header::new(header.values.clone())?;
                let mut table = SparseKeyedTable::with_header(&self.ranges(), header)?;
                for row in &self.rows {
                    table.add_row_partial(&row.keys, &row.values)?;
                }
                Ok(table)
            }
            None => {
                let found = self.axes.len();
                let ranges: [RangeInclusive<usize>; D] = self
                    .ranges()
                    .try_into()
                    .map_err(|_| Error::Arity { expected: D, found })?;
                let mut table = SparseKeyedTable::new(ranges)?;
                for row in &self.rows {
                    let keys: [usize; D] =
                        row.keys.as_slice().try_into().map_err(|_| Error::Arity {
                            expected: D,
                            found: row.keys.len(),
                        })?;
                    match row.values.as_slice() {
                        [Some(v)] => table.set(keys, *v)?,
                        [None] => {}
                        other => {
                            return Err(Error::Arity {
                                expected: 1,
                                found: other.len(),
                            })
                        }
                    }
                }
                Ok(table)
            }
        }
    }
}

/// Parses `json` and builds the table in one step.
pub fn load_table<const D: usize>(json: &str) -> Result<SparseKeyedTable<D>> {
    TableDocument::from_json(json)?.into_table()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Direction, HeaderOrder};

    const CRITICAL: &str = r#"{
        "axes": [[5, 6]],
        "header": { "values": [0.05, 0.025, 0.01] },
        "rows": [
            { "keys": [5], "values": [0, null, null] },
            { "keys": [6], "values": [2, 0, null] }
        ]
    }"#;

    #[test]
    fn test_header_table() {
        let table: SparseKeyedTable<2> = load_table(CRITICAL).unwrap();
        assert_eq!(table.header().unwrap().order(), HeaderOrder::Descending);
        assert_eq!(table.get([6, 1]).unwrap(), Some(0.0));
        assert_eq!(table.get([5, 1]).unwrap(), None);
        assert_eq!(table.column_of(0.025).unwrap(), 1);
        // n = 5 has nothing at 0.01; scanning toward larger alpha finds 0.05
        let found = table.scan([5, 2], 1, Direction::Descending).unwrap();
        assert_eq!(found, Some(([5, 0], 0.0)));
    }

    #[test]
    fn test_raw_table() {
        let json = r#"{
            "axes": [[1, 3], [0, 4], [0, 1]],
            "rows": [
                { "keys": [1, 0, 0], "values": [0.25] },
                { "keys": [3, 4, 1], "values": [0.75] },
                { "keys": [2, 2, 0], "values": [null] }
            ]
        }"#;
        let table: SparseKeyedTable<3> = load_table(json).unwrap();
        assert_eq!(table.defined_cells(), 2);
        assert_eq!(table.get([3, 4, 1]).unwrap(), Some(0.75));
        assert!(!table.is_defined([2, 2, 0]).unwrap());
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(matches!(
            load_table::<3>(CRITICAL),
            Err(Error::Arity { .. })
        ));
        let json = r#"{ "axes": [[0, 3]], "rows": [{ "keys": [1, 2], "values": [0.5] }] }"#;
        assert!(matches!(
            load_table::<1>(json),
            Err(Error::Arity { expected: 1, found: 2 })
        ));
        let json = r#"{ "axes": [[0, 3]], "rows": [{ "keys": [1], "values": [0.5, 0.1] }] }"#;
        assert!(matches!(load_table::<1>(json), Err(Error::Arity { .. })));
    }

    #[test]
    fn test_bad_documents() {
        assert!(matches!(load_table::<1>("{ not json"), Err(Error::Load(_))));
        assert!(matches!(load_table::<1>(r#"{ "rows": [] }"#), Err(Error::Load(_))));
        let out_of_range = r#"{ "axes": [[0, 3]], "rows": [{ "keys": [9], "values": [0.5] }] }"#;
        assert!(matches!(
            load_table::<1>(out_of_range),
            Err(Error::KeyOutOfRange { key: 9, .. })
        ));
        let flat_header = r#"{ "axes": [[1, 2]], "header": { "values": [0.1, 0.1] } }"#;
        assert!(matches!(load_table::<2>(flat_header), Err(Error::Header(_))));
        let empty_axis = r#"{ "axes": [[4, 2]] }"#;
        assert!(matches!(load_table::<1>(empty_axis), Err(Error::InvalidShape(_))));
    }

    #[test]
    fn test_document_survives_json() {
        let doc = TableDocument::from_json(CRITICAL).unwrap();
        let again = TableDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(doc, again);
    }
}
