//! Row-level merge algebra.
//!
//! Every binary row operation walks both operands in column order and emits
//! the combined entries into a scratch buffer in one linear pass. The buffer
//! is then committed to the destination, so the destination may be one of
//! the operands (the `*_assign` forms).
//!
//! [`PatternPolicy`] decides what the commit does with the buffer:
//!
//! - `Union` replaces the destination's entries with the merged pattern.
//! - `Restricted` keeps the destination's existing pattern and only refreshes
//!   its values; merged columns outside that pattern are dropped.
//!
//! Only columns `>= start_col` take part; destination entries left of
//! `start_col` are never touched.

use spx_core::GrowthPolicy;

use crate::error::SparseResult;
use crate::row::{RowEntry, SparseRow};

/// Output pattern of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternPolicy {
    /// Result pattern is the union of the operand patterns.
    #[default]
    Union,
    /// Result pattern is the destination's existing pattern.
    Restricted,
}

/// Parameters shared by the row merge operations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MergeOptions {
    pub policy: PatternPolicy,
    /// First column affected by the operation.
    pub start_col: usize,
    /// Growth used if the destination needs more room.
    pub growth: GrowthPolicy,
}

impl MergeOptions {
    pub fn union() -> Self {
        Self::default()
    }

    pub fn restricted() -> Self {
        Self {
            policy: PatternPolicy::Restricted,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: PatternPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn starting_at(mut self, start_col: usize) -> Self {
        self.start_col = start_col;
        self
    }

    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }
}

/// Entries of `row` with column `>= start_col`.
fn tail_from(row: &SparseRow, start_col: usize) -> &[RowEntry] {
    let start = row.find_column(start_col).position().unwrap_or(row.len());
    &row.entries()[start..]
}

/// Two-way merge of sorted entry slices. `combine` receives the value from
/// each side, or `None` where that side has no entry.
fn merge_sorted<F>(a: &[RowEntry], b: &[RowEntry], combine: F) -> Vec<RowEntry>
where
    F: Fn(Option<f64>, Option<f64>) -> f64,
{
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (ea, eb) = (a[i], b[j]);
        if ea.col == eb.col {
            out.push(RowEntry::new(ea.col, combine(Some(ea.val), Some(eb.val))));
            i += 1;
            j += 1;
        } else if ea.col < eb.col {
            out.push(RowEntry::new(ea.col, combine(Some(ea.val), None)));
            i += 1;
        } else {
            out.push(RowEntry::new(eb.col, combine(None, Some(eb.val))));
            j += 1;
        }
    }
    for e in &a[i..] {
        out.push(RowEntry::new(e.col, combine(Some(e.val), None)));
    }
    for e in &b[j..] {
        out.push(RowEntry::new(e.col, combine(None, Some(e.val))));
    }
    out
}

/// Write a merged buffer into `out` according to `opts`.
fn commit(out: &mut SparseRow, merged: &[RowEntry], opts: MergeOptions) -> SparseResult<()> {
    let start = out
        .find_column(opts.start_col)
        .position()
        .unwrap_or(out.len());
    match opts.policy {
        PatternPolicy::Union => out.replace_tail(start, merged, opts.growth),
        PatternPolicy::Restricted => {
            let mut k = 0;
            for e in &mut out.entries_mut()[start..] {
                while k < merged.len() && merged[k].col < e.col {
                    k += 1;
                }
                e.val = match merged.get(k) {
                    Some(m) if m.col == e.col => m.val,
                    _ => 0.0,
                };
            }
            Ok(())
        }
    }
}

impl SparseRow {
    /// `out <- r1 + alpha * r2`.
    pub fn scaled_add_into(
        r1: &SparseRow,
        r2: &SparseRow,
        alpha: f64,
        opts: MergeOptions,
        out: &mut SparseRow,
    ) -> SparseResult<()> {
        let merged = merge_sorted(
            tail_from(r1, opts.start_col),
            tail_from(r2, opts.start_col),
            |a, b| a.unwrap_or(0.0) + alpha * b.unwrap_or(0.0),
        );
        commit(out, &merged, opts)
    }

    /// `out <- r1 + r2`.
    pub fn add_into(
        r1: &SparseRow,
        r2: &SparseRow,
        opts: MergeOptions,
        out: &mut SparseRow,
    ) -> SparseResult<()> {
        let merged = merge_sorted(
            tail_from(r1, opts.start_col),
            tail_from(r2, opts.start_col),
            |a, b| a.unwrap_or(0.0) + b.unwrap_or(0.0),
        );
        commit(out, &merged, opts)
    }

    /// `out <- r1 - r2`.
    pub fn sub_into(
        r1: &SparseRow,
        r2: &SparseRow,
        opts: MergeOptions,
        out: &mut SparseRow,
    ) -> SparseResult<()> {
        let merged = merge_sorted(
            tail_from(r1, opts.start_col),
            tail_from(r2, opts.start_col),
            |a, b| a.unwrap_or(0.0) - b.unwrap_or(0.0),
        );
        commit(out, &merged, opts)
    }

    /// `out <- alpha * r1`.
    pub fn scale_into(
        r1: &SparseRow,
        alpha: f64,
        opts: MergeOptions,
        out: &mut SparseRow,
    ) -> SparseResult<()> {
        let merged: Vec<RowEntry> = tail_from(r1, opts.start_col)
            .iter()
            .map(|e| RowEntry::new(e.col, alpha * e.val))
            .collect();
        commit(out, &merged, opts)
    }

    /// Union of both patterns; where both rows store a column, `r1` wins.
    pub fn merge_into(
        r1: &SparseRow,
        r2: &SparseRow,
        opts: MergeOptions,
        out: &mut SparseRow,
    ) -> SparseResult<()> {
        let merged = merge_sorted(
            tail_from(r1, opts.start_col),
            tail_from(r2, opts.start_col),
            |a, b| a.or(b).unwrap_or(0.0),
        );
        commit(out, &merged, opts)
    }

    /// `self <- self + alpha * other`.
    pub fn scaled_add_assign(
        &mut self,
        other: &SparseRow,
        alpha: f64,
        opts: MergeOptions,
    ) -> SparseResult<()> {
        let merged = merge_sorted(
            tail_from(self, opts.start_col),
            tail_from(other, opts.start_col),
            |a, b| a.unwrap_or(0.0) + alpha * b.unwrap_or(0.0),
        );
        commit(self, &merged, opts)
    }

    /// `self <- self + other`.
    pub fn add_assign(&mut self, other: &SparseRow, opts: MergeOptions) -> SparseResult<()> {
        self.scaled_add_assign(other, 1.0, opts)
    }

    /// `self <- self - other`.
    pub fn sub_assign(&mut self, other: &SparseRow, opts: MergeOptions) -> SparseResult<()> {
        self.scaled_add_assign(other, -1.0, opts)
    }

    /// Multiply entries with column `>= start_col` by `alpha`.
    pub fn scale(&mut self, alpha: f64, start_col: usize) {
        let start = self.find_column(start_col).position().unwrap_or(self.len());
        for e in &mut self.entries_mut()[start..] {
            e.val *= alpha;
        }
    }
}
