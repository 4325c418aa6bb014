//! Text dump and load.
//!
//! The persistence format is whitespace separated:
//!
//! ```text
//! <rows> <cols>
//! <len> <col> <val> <col> <val> ...      one line per row
//! ```
//!
//! Values are written with Rust's shortest round-trip formatting, so loading
//! a dump reproduces every finite value bit for bit. Blank lines and lines
//! starting with `#` are ignored on load.
//!
//! The `Display` impl gives a human-oriented listing instead, and
//! [`SparseMatrix::dump_debug`] shows storage internals.

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use spx_core::GrowthPolicy;
use tracing::debug;

use crate::error::{reserve_to, SparseError, SparseResult};
use crate::matrix::SparseMatrix;
use crate::row::{RowEntry, SparseRow};

impl SparseMatrix {
    /// Write the persistence format.
    pub fn write_text<W: Write>(&self, mut w: W) -> SparseResult<()> {
        write!(w, "{}", TextFormat(self))?;
        w.flush()?;
        Ok(())
    }

    /// Read the persistence format.
    pub fn read_text<R: BufRead>(r: R) -> SparseResult<SparseMatrix> {
        let mut lines = r
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| match line {
                Ok(text) => {
                    let t = text.trim();
                    !t.is_empty() && !t.starts_with('#')
                }
                Err(_) => true,
            });

        let (line_no, header) = match lines.next() {
            Some((n, line)) => (n, line?),
            None => return Err(SparseError::parse(0, "missing header")),
        };
        let mut last_line = line_no;
        let dims = parse_numbers::<usize>(line_no, &header)?;
        let &[n_rows, n_cols] = dims.as_slice() else {
            return Err(SparseError::parse(line_no, "header must be `<rows> <cols>`"));
        };

        let mut rows = Vec::new();
        reserve_to(&mut rows, n_rows)?;
        for i in 0..n_rows {
            let (line_no, text) = match lines.next() {
                Some((n, line)) => (n, line?),
                None => {
                    return Err(SparseError::parse(
                        last_line + 1,
                        format!("expected {n_rows} rows, found {i}"),
                    ))
                }
            };
            last_line = line_no;
            rows.push(parse_row(line_no, &text, n_cols)?);
        }
        if let Some((line_no, _)) = lines.next() {
            return Err(SparseError::parse(line_no, "trailing data after last row"));
        }

        Ok(SparseMatrix::from_rows(rows, n_cols, GrowthPolicy::default()))
    }

    pub fn to_text(&self) -> String {
        TextFormat(self).to_string()
    }

    pub fn from_text(text: &str) -> SparseResult<SparseMatrix> {
        Self::read_text(text.as_bytes())
    }

    pub fn save(&self, path: &Path) -> SparseResult<()> {
        let file = File::create(path)?;
        self.write_text(BufWriter::new(file))?;
        debug!(path = %path.display(), nnz = self.nnz(), "saved sparse matrix");
        Ok(())
    }

    pub fn load(path: &Path) -> SparseResult<SparseMatrix> {
        let file = File::open(path)?;
        let matrix = Self::read_text(BufReader::new(file))?;
        debug!(path = %path.display(), shape = ?matrix.shape(), "loaded sparse matrix");
        Ok(matrix)
    }

    /// Storage internals: lengths, capacities, diagonal cache and chain heads.
    pub fn dump_debug(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "SparseMatrix dump: m = {}, n = {}, max_m = {}, max_n = {}",
            self.rows(),
            self.cols(),
            self.max_rows(),
            self.max_cols()
        );
        let _ = writeln!(
            out,
            "flag_col = {}, flag_diag = {}",
            self.has_column_access(),
            self.has_diag_access()
        );
        if let Some(chains) = self.column_chains() {
            let heads: Vec<String> = (0..chains.n_cols())
                .map(|j| match chains.head(j) {
                    Some(link) => format!("{}:{}", link.row, link.slot),
                    None => "-".to_string(),
                })
                .collect();
            let _ = writeln!(out, "column heads: {}", heads.join(" "));
        }
        for (i, row) in self.rows.iter().enumerate() {
            let diag = match (self.has_diag_access(), row.cached_diag()) {
                (true, Some(d)) => d.to_string(),
                (true, None) => "none".to_string(),
                (false, _) => "?".to_string(),
            };
            let _ = writeln!(
                out,
                "row {}: len = {}, maxlen = {}, diag = {}",
                i,
                row.len(),
                row.capacity(),
                diag
            );
            for e in row.entries() {
                let _ = writeln!(out, "  {:>6}: {:e}", e.col, e.val);
            }
        }
        out
    }
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SparseMatrix: {} by {}", self.rows(), self.cols())?;
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "row {}:", i)?;
            for (col, val) in row.iter() {
                write!(f, " {}:{:<12e}", col, val)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Persistence format rendering shared by `write_text` and `to_text`.
struct TextFormat<'a>(&'a SparseMatrix);

impl fmt::Display for TextFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.0.rows(), self.0.cols())?;
        for row in &self.0.rows {
            write!(f, "{}", row.len())?;
            for (col, val) in row.iter() {
                write!(f, " {} {}", col, val)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn parse_numbers<T: std::str::FromStr>(line_no: usize, text: &str) -> SparseResult<Vec<T>> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<T>()
                .map_err(|_| SparseError::parse(line_no, format!("invalid number `{tok}`")))
        })
        .collect()
}

fn parse_row(line_no: usize, text: &str, n_cols: usize) -> SparseResult<SparseRow> {
    let mut tokens = text.split_whitespace();
    let len: usize = tokens
        .next()
        .ok_or_else(|| SparseError::parse(line_no, "missing entry count"))?
        .parse()
        .map_err(|_| SparseError::parse(line_no, "invalid entry count"))?;

    let mut entries: Vec<RowEntry> = Vec::new();
    for _ in 0..len {
        let (Some(col), Some(val)) = (tokens.next(), tokens.next()) else {
            return Err(SparseError::parse(
                line_no,
                format!("expected {len} (column, value) pairs"),
            ));
        };
        let col: usize = col
            .parse()
            .map_err(|_| SparseError::parse(line_no, format!("invalid column `{col}`")))?;
        let val: f64 = val
            .parse()
            .map_err(|_| SparseError::parse(line_no, format!("invalid value `{val}`")))?;
        if col >= n_cols {
            return Err(SparseError::parse(
                line_no,
                format!("column {col} out of range for {n_cols} columns"),
            ));
        }
        if entries.last().is_some_and(|prev| prev.col >= col) {
            return Err(SparseError::parse(line_no, "columns must be strictly increasing"));
        }
        entries.push(RowEntry::new(col, val));
    }
    if tokens.next().is_some() {
        return Err(SparseError::parse(line_no, "more tokens than the entry count"));
    }
    Ok(SparseRow::from_pairs(entries.into_iter().map(|e| (e.col, e.val))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_format() {
        let a = SparseMatrix::from_triplets(2, 3, [(0, 0, 1.0), (0, 2, 0.5)]).unwrap();
        assert_eq!(a.to_text(), "2 3\n2 0 1 2 0.5\n0\n");
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let a = SparseMatrix::from_triplets(
            3,
            3,
            [(0, 1, 0.1), (1, 0, -1.0 / 3.0), (2, 2, 1e-300), (2, 0, 0.0)],
        )
        .unwrap();
        let b = SparseMatrix::from_text(&a.to_text()).unwrap();
        assert_eq!(a, b);
        assert_eq!(b.get(1, 0).unwrap().to_bits(), (-1.0f64 / 3.0).to_bits());
        // Explicit zero survives
        assert_eq!(b.row_len(2), 2);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "# saved jacobian\n2 2\n\n1 1 4\n# second row\n0\n";
        let a = SparseMatrix::from_text(text).unwrap();
        assert_eq!(a.shape(), (2, 2));
        assert_eq!(a.get(0, 1).unwrap(), 4.0);
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("", "missing header"),
            ("2\n", "header"),
            ("1 2\n1 5 1.0\n", "out of range"),
            ("1 3\n2 1 1.0 0 1.0\n", "strictly increasing"),
            ("1 3\n2 1 1.0\n", "pairs"),
            ("1 3\n1 1 x\n", "invalid value"),
            ("2 3\n0\n", "expected 2 rows"),
            ("1 3\n0\n0\n", "trailing"),
        ];
        for (text, needle) in cases {
            let err = SparseMatrix::from_text(text).unwrap_err();
            assert!(
                err.to_string().contains(needle),
                "{:?}: `{}` does not mention `{}`",
                text,
                err,
                needle
            );
        }
    }

    #[test]
    fn test_missing_rows_report_next_line() {
        let err = SparseMatrix::from_text("3 2\n1 0 1.0\n# note\n0\n").unwrap_err();
        assert!(matches!(err, SparseError::Parse { line: 5, .. }), "{err}");

        let err = SparseMatrix::from_text("2 2\n").unwrap_err();
        assert!(matches!(err, SparseError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_write_text_matches_to_text() {
        let a = SparseMatrix::from_triplets(2, 2, [(0, 1, -0.25), (1, 0, 3.0)]).unwrap();
        let mut buf = Vec::new();
        a.write_text(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), a.to_text());
    }

    #[test]
    fn test_display() {
        let a = SparseMatrix::from_triplets(2, 2, [(1, 0, 2.0)]).unwrap();
        let shown = a.to_string();
        assert!(shown.starts_with("SparseMatrix: 2 by 2\n"));
        assert!(shown.contains("row 1: 0:2e0"));
    }

    #[test]
    fn test_dump_debug() {
        let mut a = SparseMatrix::from_triplets(2, 2, [(0, 0, 1.0), (1, 0, 2.0)]).unwrap();
        a.build_column_access().unwrap();
        a.build_diag_access();
        let dump = a.dump_debug();
        assert!(dump.contains("flag_col = true, flag_diag = true"));
        assert!(dump.contains("column heads: 0:0 -"));
        assert!(dump.contains("row 1: len = 1"));
        assert!(dump.contains("diag = none"));
    }
}
