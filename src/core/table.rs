use crate::error::Error;
use std::str::FromStr;

/// A single numeric sample exchanged with a testbench.
///
/// Complex samples are carried as two `f64` components because the on-disk
/// format stores them as adjacent real/imaginary columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Real(f64),
    Complex(f64, f64),
}

impl Value {
    pub fn is_complex(&self) -> bool {
        match self {
            Self::Real(_) => false,
            Self::Complex(_, _) => true,
        }
    }

    /// Accesses the real component.
    pub fn re(&self) -> f64 {
        match self {
            Self::Real(r) => *r,
            Self::Complex(r, _) => *r,
        }
    }

    /// Accesses the imaginary component (0 for a purely real value).
    pub fn im(&self) -> f64 {
        match self {
            Self::Real(_) => 0.0,
            Self::Complex(_, i) => *i,
        }
    }
}

impl FromStr for Value {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::Real(f64::from_str(s.trim())?))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(r) => write!(f, "{}", r),
            Self::Complex(r, i) => match *i < 0.0 {
                true => write!(f, "{}{}j", r, i),
                false => write!(f, "{}+{}j", r, i),
            },
        }
    }
}

/// A rectangular block of samples: one row per simulated timestep.
///
/// Storage is row-major; column structure only matters at (de)serialization,
/// where a column holding any complex value is split into two file columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Vec<Value>>,
    num_cols: usize,
}

impl Table {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            num_cols: 0,
        }
    }

    /// Builds a table from row data, verifying every row has the same width.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Result<Self, Error> {
        let num_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != num_cols {
                return Err(Error::RaggedTable(i, row.len(), num_cols));
            }
        }
        Ok(Self { rows, num_cols })
    }

    pub fn get_num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn get_num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn get_rows(&self) -> &Vec<Vec<Value>> {
        &self.rows
    }

    /// Checks if any sample in column `col` is complex.
    pub fn column_is_complex(&self, col: usize) -> bool {
        self.rows
            .iter()
            .find(|row| row[col].is_complex() == true)
            .is_some()
    }

    /// Finds the first row index holding a complex sample in column `col`.
    pub fn first_complex_in_column(&self, col: usize) -> Option<usize> {
        self.rows.iter().position(|row| row[col].is_complex() == true)
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ut_rectangular_table() {
        let table = Table::from_rows(vec![
            vec![Value::Real(1.0), Value::Complex(0.5, -0.5)],
            vec![Value::Real(2.0), Value::Real(3.0)],
        ])
        .unwrap();
        assert_eq!(table.get_num_rows(), 2);
        assert_eq!(table.get_num_cols(), 2);
        assert_eq!(table.column_is_complex(0), false);
        assert_eq!(table.column_is_complex(1), true);
        assert_eq!(table.first_complex_in_column(1), Some(0));
    }

    #[test]
    fn ut_ragged_table() {
        let result = Table::from_rows(vec![
            vec![Value::Real(1.0), Value::Real(2.0)],
            vec![Value::Real(3.0)],
        ]);
        assert_eq!(result, Err(Error::RaggedTable(1, 1, 2)));
    }

    #[test]
    fn ut_empty_table() {
        let table = Table::from_rows(vec![]).unwrap();
        assert_eq!(table.get_num_rows(), 0);
        assert_eq!(table.get_num_cols(), 0);
    }

    #[test]
    fn ut_value_display_drops_trailing_zero() {
        // the exchange format writes whole floats without a fraction
        assert_eq!(Value::Real(1.0).to_string(), "1");
        assert_eq!(Value::Real(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn ut_value_from_str() {
        assert_eq!(Value::from_str(" 4.25 ").unwrap(), Value::Real(4.25));
        assert_eq!(Value::from_str("abc").is_err(), true);
    }
}
