//! Programmed fuse matrix of a logic array.
//!
//! Text form: a `rows,cols` header line followed by one line of `0`/`1`
//! characters per row, lines separated by `\n`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FuseMapError;

/// Fixed-size matrix of fuses; only the intact ("1") fuses are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FuseMap {
    rows: usize,
    cols: usize,
    fuses: BTreeSet<(usize, usize)>,
}

impl FuseMap {
    /// All fuses blown
    pub fn new(rows: usize, cols: usize) -> Self {
        FuseMap {
            rows,
            cols,
            fuses: BTreeSet::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Fuse state; anything outside the map reads as blown
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.fuses.contains(&(row, col))
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<(), FuseMapError> {
        if row >= self.rows || col >= self.cols {
            return Err(FuseMapError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }

        if value {
            self.fuses.insert((row, col));
        } else {
            self.fuses.remove(&(row, col));
        }
        Ok(())
    }

    /// Rows with an intact fuse in `col`
    pub fn rows_in_col(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        self.fuses
            .iter()
            .filter(move |&&(_, c)| c == col)
            .map(|&(r, _)| r)
    }

    pub fn parse(text: &str) -> Result<Self, FuseMapError> {
        let mut lines = text.split('\n');
        let header = lines.next().ok_or(FuseMapError::MissingHeader)?;
        if header.trim().is_empty() {
            return Err(FuseMapError::MissingHeader);
        }

        let (rows, cols) = parse_header(header)?;
        let body: Vec<&str> = lines.collect();
        // A single trailing newline is tolerated
        let body = match body.split_last() {
            Some((last, rest)) if last.is_empty() && rest.len() == rows => rest,
            _ => &body[..],
        };

        if body.len() != rows {
            return Err(FuseMapError::RowCount {
                expected: rows,
                found: body.len(),
            });
        }

        let mut map = FuseMap::new(rows, cols);
        for (row, &line) in body.iter().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let found = line.chars().count();
            if found != cols {
                return Err(FuseMapError::ColumnCount {
                    row,
                    expected: cols,
                    found,
                });
            }

            for (col, c) in line.chars().enumerate() {
                match c {
                    '0' => {}
                    '1' => {
                        map.fuses.insert((row, col));
                    }
                    found => return Err(FuseMapError::InvalidCharacter { row, found }),
                }
            }
        }

        Ok(map)
    }
}

fn parse_header(header: &str) -> Result<(usize, usize), FuseMapError> {
    let invalid = || FuseMapError::InvalidHeader(header.to_string());
    let (rows, cols) = header.split_once(',').ok_or_else(invalid)?;
    let rows = rows.trim().parse().map_err(|_| invalid())?;
    let cols = cols.trim().parse().map_err(|_| invalid())?;
    Ok((rows, cols))
}

impl fmt::Display for FuseMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.rows, self.cols)?;
        for row in 0..self.rows {
            writeln!(f)?;
            for col in 0..self.cols {
                f.write_str(if self.get(row, col) { "1" } else { "0" })?;
            }
        }
        Ok(())
    }
}

impl FromStr for FuseMap {
    type Err = FuseMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuseMap::parse(s)
    }
}

impl TryFrom<String> for FuseMap {
    type Error = FuseMapError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        FuseMap::parse(&text)
    }
}

impl From<FuseMap> for String {
    fn from(map: FuseMap) -> Self {
        map.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set() {
        let mut map = FuseMap::new(2, 3);
        assert!(!map.get(1, 2));

        map.set(1, 2, true).unwrap();
        assert!(map.get(1, 2));
        assert!(!map.get(2, 2));
        assert!(!map.get(7, 9));

        map.set(1, 2, false).unwrap();
        assert!(!map.get(1, 2));
    }

    #[test]
    fn test_set_out_of_range_is_rejected() {
        let mut map = FuseMap::new(2, 3);
        assert_eq!(
            map.set(0, 3, true),
            Err(FuseMapError::OutOfRange {
                row: 0,
                col: 3,
                rows: 2,
                cols: 3
            })
        );
        assert_eq!(map, FuseMap::new(2, 3));
    }

    #[test]
    fn test_text_form() {
        let mut map = FuseMap::new(2, 3);
        map.set(0, 0, true).unwrap();
        map.set(1, 2, true).unwrap();

        assert_eq!(map.to_string(), "2,3\n100\n001");
        assert_eq!("2,3\n100\n001".parse::<FuseMap>(), Ok(map.clone()));
        assert_eq!(FuseMap::parse("2,3\n100\n001\n"), Ok(map));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(FuseMap::parse(""), Err(FuseMapError::MissingHeader));
        assert_eq!(
            FuseMap::parse("2x3\n000"),
            Err(FuseMapError::InvalidHeader("2x3".to_string()))
        );
        assert_eq!(
            FuseMap::parse("2,3\n000"),
            Err(FuseMapError::RowCount {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            FuseMap::parse("1,3\n0000"),
            Err(FuseMapError::ColumnCount {
                row: 0,
                expected: 3,
                found: 4
            })
        );
        assert_eq!(
            FuseMap::parse("1,3\n0x0"),
            Err(FuseMapError::InvalidCharacter { row: 0, found: 'x' })
        );
    }

    #[test]
    fn test_empty_map() {
        let map = FuseMap::new(0, 0);
        assert_eq!(map.to_string(), "0,0");
        assert_eq!(FuseMap::parse("0,0"), Ok(map));
    }

    #[test]
    fn test_column_queries() {
        let map = FuseMap::parse("3,2\n11\n01\n10").unwrap();
        assert_eq!(map.rows_in_col(1).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(map.rows_in_col(0).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let map = FuseMap::parse("1,2\n10").unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "\"1,2\\n10\"");
        assert_eq!(serde_json::from_str::<FuseMap>(&json).unwrap(), map);
    }
}
