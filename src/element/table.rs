use std::collections::BTreeSet;

use egui::{Pos2, Rect, Vec2, pos2};
use serde::{Deserialize, Serialize};

/// Smallest multiplier a row or column can be squeezed to
pub const MIN_CELL_MULTIPLIER: f32 = 0.1;

pub const DEFAULT_TABLE_BORDER: &str = "1px solid #ccc";
pub const DEFAULT_HEADER_BG: &str = "#e5e7eb";
pub const DEFAULT_CELL_BG: &str = "#ffffff";

/// (row, column)
pub type CellIndex = (usize, usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub content: String,
    pub row_span: usize,
    pub col_span: usize,
    /// Hidden under another cell's span
    pub covered: bool,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            content: String::new(),
            row_span: 1,
            col_span: 1,
            covered: false,
        }
    }
}

impl TableCell {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Which cell edge is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    /// Right edge: changes column widths
    Horizontal,
    /// Bottom edge: changes row heights
    Vertical,
}

/// Row/column grid table.
///
/// `row_heights` and `col_widths` are multipliers of the even share of the
/// element's size; their sums always equal `rows` and `cols` respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<TableCell>>,
    row_heights: Vec<f32>,
    col_widths: Vec<f32>,
    pub border: String,
    pub header_bg: String,
    pub cell_bg: String,
}

impl Table {
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            cells: vec![vec![TableCell::default(); cols]; rows],
            row_heights: vec![1.0; rows],
            col_widths: vec![1.0; cols],
            border: DEFAULT_TABLE_BORDER.to_owned(),
            header_bg: DEFAULT_HEADER_BG.to_owned(),
            cell_bg: DEFAULT_CELL_BG.to_owned(),
        }
    }

    /// Build a table from row-major contents. Short rows are padded.
    pub fn from_contents(contents: &[&[&str]]) -> Self {
        let rows = contents.len();
        let cols = contents.iter().map(|row| row.len()).max().unwrap_or(1);
        let mut table = Self::new(rows, cols);
        for (r, row) in contents.iter().enumerate() {
            for (c, content) in row.iter().enumerate() {
                table.set_cell(r, c, content);
            }
        }
        table
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.cells.get(row)?.get(col)
    }

    pub fn cells(&self) -> &[Vec<TableCell>] {
        &self.cells
    }

    pub fn row_heights(&self) -> &[f32] {
        &self.row_heights
    }

    pub fn col_widths(&self) -> &[f32] {
        &self.col_widths
    }

    pub fn set_cell(&mut self, row: usize, col: usize, content: &str) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            cell.content = content.to_owned();
        }
    }

    /// Apply `f` to every cell's content
    pub fn map_contents(&mut self, mut f: impl FnMut(&str) -> String) {
        for cell in self.cells.iter_mut().flatten() {
            cell.content = f(&cell.content);
        }
    }

    /// Change the grid size, padding or truncating cells and multipliers.
    /// Spans that would cross the new bounds are clipped.
    pub fn set_dimensions(&mut self, rows: usize, cols: usize) {
        let rows = rows.max(1);
        let cols = cols.max(1);

        self.cells.resize_with(rows, Vec::new);
        for row in &mut self.cells {
            row.resize_with(cols, TableCell::default);
        }
        self.row_heights.resize(rows, 1.0);
        self.col_widths.resize(cols, 1.0);
        self.rows = rows;
        self.cols = cols;

        for r in 0..rows {
            for c in 0..cols {
                let cell = &mut self.cells[r][c];
                cell.row_span = cell.row_span.clamp(1, rows - r);
                cell.col_span = cell.col_span.clamp(1, cols - c);
            }
        }
        self.refresh_coverage();
        normalize(&mut self.row_heights);
        normalize(&mut self.col_widths);
    }

    /// x offsets of the column boundaries, `cols + 1` entries
    pub fn column_bounds(&self, width: f32) -> Vec<f32> {
        bounds(&self.col_widths, width)
    }

    /// y offsets of the row boundaries, `rows + 1` entries
    pub fn row_bounds(&self, height: f32) -> Vec<f32> {
        bounds(&self.row_heights, height)
    }

    /// Cell rect relative to the table's top-left corner, including spans.
    /// `None` for covered or out-of-range cells.
    pub fn cell_rect(&self, row: usize, col: usize, size: Vec2) -> Option<Rect> {
        let cell = self.cell(row, col)?;
        if cell.covered {
            return None;
        }
        let xs = self.column_bounds(size.x);
        let ys = self.row_bounds(size.y);
        Some(Rect::from_min_max(
            pos2(*xs.get(col)?, *ys.get(row)?),
            pos2(*xs.get(col + cell.col_span)?, *ys.get(row + cell.row_span)?),
        ))
    }

    /// Whether the grid, multipliers and spans agree with each other.
    /// Always true for tables built through this API; loaded data may not be.
    pub fn is_consistent(&self) -> bool {
        let weights_ok = |weights: &[f32], count: usize| {
            weights.len() == count && weights.iter().all(|w| w.is_finite() && *w > 0.0)
        };
        self.rows >= 1
            && self.cols >= 1
            && self.cells.len() == self.rows
            && self.cells.iter().all(|row| row.len() == self.cols)
            && weights_ok(&self.row_heights, self.rows)
            && weights_ok(&self.col_widths, self.cols)
            && self.cells.iter().enumerate().all(|(r, row)| {
                row.iter().enumerate().all(|(c, cell)| {
                    cell.row_span >= 1
                        && cell.col_span >= 1
                        && r + cell.row_span <= self.rows
                        && c + cell.col_span <= self.cols
                })
            })
    }

    /// Pad, clip and renormalize until [`Self::is_consistent`] holds
    pub fn repair(&mut self) {
        for weight in self.row_heights.iter_mut().chain(self.col_widths.iter_mut()) {
            if !weight.is_finite() || *weight <= 0.0 {
                *weight = 1.0;
            }
        }
        self.set_dimensions(self.rows, self.cols);
    }

    /// The visible cell that owns (row, col); itself unless covered by a span
    pub fn anchor_of(&self, row: usize, col: usize) -> CellIndex {
        if !self.cell(row, col).is_some_and(|cell| cell.covered) {
            return (row, col);
        }
        for r in 0..=row {
            for c in 0..=col {
                let cell = &self.cells[r][c];
                if !cell.covered && r + cell.row_span > row && c + cell.col_span > col {
                    return (r, c);
                }
            }
        }
        (row, col)
    }

    /// Cell under a point relative to the table's top-left corner
    pub fn cell_at(&self, local: Pos2, size: Vec2) -> Option<CellIndex> {
        if local.x < 0.0 || local.y < 0.0 || local.x > size.x || local.y > size.y {
            return None;
        }
        let col = find_band(&self.column_bounds(size.x), local.x)?;
        let row = find_band(&self.row_bounds(size.y), local.y)?;
        Some(self.anchor_of(row, col))
    }

    /// A cell's right or bottom edge strip under a point, if any
    pub fn edge_at(
        &self,
        local: Pos2,
        size: Vec2,
        tolerance: f32,
    ) -> Option<(ResizeDirection, CellIndex)> {
        let (row, col) = self.cell_at(local, size)?;
        let rect = self.cell_rect(row, col, size)?;
        if (local.x - rect.max.x).abs() <= tolerance {
            Some((ResizeDirection::Horizontal, (row, col)))
        } else if (local.y - rect.max.y).abs() <= tolerance {
            Some((ResizeDirection::Vertical, (row, col)))
        } else {
            None
        }
    }

    /// Grow or shrink the columns (rows) owning the selected cells' right
    /// (bottom) edges by `delta` px, then renormalize so the table keeps its size.
    pub fn resize_cells(
        &mut self,
        selection: &BTreeSet<CellIndex>,
        direction: ResizeDirection,
        delta: f32,
        size: Vec2,
    ) {
        let (weights, share) = match direction {
            ResizeDirection::Horizontal => (&mut self.col_widths, size.x / self.cols as f32),
            ResizeDirection::Vertical => (&mut self.row_heights, size.y / self.rows as f32),
        };
        if share <= 0.0 {
            return;
        }

        let mut edges = BTreeSet::new();
        for &(row, col) in selection {
            let Some(cell) = self.cells.get(row).and_then(|r| r.get(col)) else {
                continue;
            };
            edges.insert(match direction {
                ResizeDirection::Horizontal => col + cell.col_span - 1,
                ResizeDirection::Vertical => row + cell.row_span - 1,
            });
        }

        for index in edges {
            if let Some(weight) = weights.get_mut(index) {
                let px = *weight * share + delta;
                *weight = (px / share).max(MIN_CELL_MULTIPLIER);
            }
        }
        normalize(weights);
    }

    /// Merge the bounding rectangle of the selected cells into its top-left
    /// cell. Spans are summed like HTML rowspan/colspan; contents are joined.
    ///
    /// Returns false when there is nothing to merge.
    pub fn merge(&mut self, selection: &BTreeSet<CellIndex>) -> bool {
        let mut anchors = selection
            .iter()
            .filter(|(r, c)| *r < self.rows && *c < self.cols)
            .map(|&(r, c)| self.anchor_of(r, c))
            .collect::<BTreeSet<_>>();
        if anchors.len() < 2 {
            return false;
        }

        let (mut top, mut left) = (usize::MAX, usize::MAX);
        let (mut bottom, mut right) = (0, 0);
        // Grow until no merged region straddles the border
        loop {
            for &(r, c) in &anchors {
                let cell = &self.cells[r][c];
                top = top.min(r);
                left = left.min(c);
                bottom = bottom.max(r + cell.row_span - 1);
                right = right.max(c + cell.col_span - 1);
            }
            let mut grown = anchors.clone();
            for r in top..=bottom {
                for c in left..=right {
                    grown.insert(self.anchor_of(r, c));
                }
            }
            if grown == anchors {
                break;
            }
            anchors = grown;
        }

        let joined = anchors
            .iter()
            .map(|&(r, c)| self.cells[r][c].content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        for &(r, c) in &anchors {
            let cell = &mut self.cells[r][c];
            cell.row_span = 1;
            cell.col_span = 1;
            cell.content.clear();
        }
        let anchor = &mut self.cells[top][left];
        anchor.content = joined;
        anchor.row_span = bottom - top + 1;
        anchor.col_span = right - left + 1;
        self.refresh_coverage();
        true
    }

    /// Split the merged cell owning (row, col) back into single cells.
    /// The joined content stays in the top-left cell.
    pub fn unmerge(&mut self, row: usize, col: usize) {
        if row >= self.rows || col >= self.cols {
            return;
        }
        let (r, c) = self.anchor_of(row, col);
        let cell = &mut self.cells[r][c];
        cell.row_span = 1;
        cell.col_span = 1;
        self.refresh_coverage();
    }

    fn refresh_coverage(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.covered = false;
        }
        for r in 0..self.rows {
            for c in 0..self.cols {
                if self.cells[r][c].covered {
                    continue;
                }
                let (row_span, col_span) = (self.cells[r][c].row_span, self.cells[r][c].col_span);
                for rr in r..r + row_span {
                    for cc in c..c + col_span {
                        if (rr, cc) != (r, c) {
                            let covered = &mut self.cells[rr][cc];
                            covered.covered = true;
                            covered.row_span = 1;
                            covered.col_span = 1;
                        }
                    }
                }
            }
        }
    }
}

/// Scale multipliers so they sum to their count
fn normalize(weights: &mut [f32]) {
    let sum: f32 = weights.iter().sum();
    if sum <= 0.0 {
        weights.fill(1.0);
        return;
    }
    let factor = weights.len() as f32 / sum;
    for weight in weights {
        *weight *= factor;
    }
}

fn bounds(weights: &[f32], extent: f32) -> Vec<f32> {
    let share = extent / weights.len().max(1) as f32;
    let mut offsets = Vec::with_capacity(weights.len() + 1);
    let mut offset = 0.0;
    offsets.push(offset);
    for weight in weights {
        offset += weight * share;
        offsets.push(offset);
    }
    offsets
}

fn find_band(bounds: &[f32], value: f32) -> Option<usize> {
    let last = bounds.len().checked_sub(2)?;
    Some(
        bounds
            .windows(2)
            .position(|band| value < band[1])
            .unwrap_or(last),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(values: &[f32]) -> f32 {
        values.iter().sum()
    }

    #[test]
    fn test_corrupt_spans_are_repaired() {
        let json = r##"{
            "rows": 2, "cols": 2,
            "cells": [
                [{"content": "a", "row_span": 5, "col_span": 9, "covered": false},
                 {"content": "b", "row_span": 0, "col_span": 1, "covered": false}],
                [{"content": "c", "row_span": 1, "col_span": 1, "covered": false}]
            ],
            "row_heights": [1.0],
            "col_widths": [1.0, -3.0, 2.0],
            "border": "1px solid #ccc", "header_bg": "#e5e7eb", "cell_bg": "#ffffff"
        }"##;
        let mut table: Table = serde_json::from_str(json).unwrap();
        assert!(!table.is_consistent());
        // bounds checked even before repair
        let size = Vec2::new(200.0, 100.0);
        assert!(table.cell_rect(0, 0, size).is_none());

        table.repair();
        assert!(table.is_consistent());
        assert_eq!(table.cells()[1].len(), 2);
        assert_eq!(table.cell(0, 0).unwrap().row_span, 2);
        assert_eq!(table.cell(0, 0).unwrap().col_span, 2);
        assert!(table.cell(1, 1).unwrap().covered);
        assert!((sum(table.col_widths()) - 2.0).abs() < 1e-3);
        assert_eq!(
            table.cell_rect(0, 0, size),
            Some(Rect::from_min_size(Pos2::ZERO, size))
        );
    }

    #[test]
    fn test_fresh_tables_are_consistent() {
        let mut table = Table::from_contents(&[&["a", "b", "c"], &["d"]]);
        assert!(table.is_consistent());
        table.merge(&BTreeSet::from([(0, 0), (1, 1)]));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_set_dimensions_pads_and_truncates() {
        let mut table = Table::from_contents(&[&["a", "b"], &["c", "d"]]);
        table.set_dimensions(3, 4);
        assert_eq!(table.cells().len(), 3);
        assert!(table.cells().iter().all(|row| row.len() == 4));
        assert_eq!(table.cell(1, 1).unwrap().content, "d");
        assert_eq!(table.row_heights().len(), 3);
        assert!((sum(table.col_widths()) - 4.0).abs() < 1e-3);

        table.set_dimensions(1, 1);
        assert_eq!(table.cells().len(), 1);
        assert_eq!(table.cells()[0].len(), 1);
        assert_eq!(table.cell(0, 0).unwrap().content, "a");

        table.set_dimensions(0, 0);
        assert_eq!((table.rows(), table.cols()), (1, 1));
    }

    #[test]
    fn test_resize_keeps_total_size() {
        let mut table = Table::new(3, 3);
        let size = Vec2::new(300.0, 120.0);
        let selection = BTreeSet::from([(1, 0)]);

        table.resize_cells(&selection, ResizeDirection::Horizontal, 50.0, size);

        assert!((sum(table.col_widths()) - 3.0).abs() < 1e-3);
        assert!(table.col_widths()[0] > table.col_widths()[1]);
        let xs = table.column_bounds(size.x);
        assert!((xs[3] - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_resize_floors_multiplier() {
        let mut table = Table::new(2, 2);
        let size = Vec2::new(200.0, 100.0);
        let selection = BTreeSet::from([(0, 0)]);

        table.resize_cells(&selection, ResizeDirection::Vertical, -500.0, size);

        assert!(table.row_heights()[0] > 0.0);
        assert!((sum(table.row_heights()) - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_merge_sums_spans() {
        let mut table = Table::from_contents(&[&["a", "b", "c"], &["d", "", "f"], &["g", "h", "i"]]);
        let selection = BTreeSet::from([(0, 0), (1, 1)]);

        assert!(table.merge(&selection));

        let anchor = table.cell(0, 0).unwrap();
        assert_eq!((anchor.row_span, anchor.col_span), (2, 2));
        assert_eq!(anchor.content, "a b d");
        assert!(table.cell(0, 1).unwrap().covered);
        assert!(table.cell(1, 1).unwrap().covered);
        assert!(!table.cell(0, 2).unwrap().covered);
        assert_eq!(table.anchor_of(1, 1), (0, 0));

        let size = Vec2::new(300.0, 300.0);
        let rect = table.cell_rect(0, 0, size).unwrap();
        assert!((rect.width() - 200.0).abs() < 1e-3);
        assert!((rect.height() - 200.0).abs() < 1e-3);
        assert!(table.cell_rect(1, 1, size).is_none());
    }

    #[test]
    fn test_merge_grows_over_straddling_region() {
        let mut table = Table::new(3, 3);
        assert!(table.merge(&BTreeSet::from([(1, 1), (2, 1)])));
        assert!(table.merge(&BTreeSet::from([(0, 0), (1, 0)])));
        assert!(table.merge(&BTreeSet::from([(0, 0), (1, 1)])));

        let anchor = table.cell(0, 0).unwrap();
        assert_eq!((anchor.row_span, anchor.col_span), (3, 2));
    }

    #[test]
    fn test_merge_single_cell_is_noop() {
        let mut table = Table::new(2, 2);
        assert!(!table.merge(&BTreeSet::from([(0, 0)])));
        assert!(!table.merge(&BTreeSet::new()));
    }

    #[test]
    fn test_unmerge_restores_cells() {
        let mut table = Table::from_contents(&[&["a", "b"], &["c", "d"]]);
        table.merge(&BTreeSet::from([(0, 0), (0, 1)]));
        table.unmerge(0, 1);

        assert!(table.cells().iter().flatten().all(|cell| !cell.covered));
        assert_eq!(table.cell(0, 0).unwrap().content, "a b");
        assert_eq!(table.cell(0, 1).unwrap().content, "");
    }

    #[test]
    fn test_shrinking_clips_spans() {
        let mut table = Table::new(3, 3);
        table.merge(&BTreeSet::from([(1, 1), (2, 2)]));
        table.set_dimensions(2, 3);

        let anchor = table.cell(1, 1).unwrap();
        assert_eq!((anchor.row_span, anchor.col_span), (1, 2));
        assert!(table.cell(1, 2).unwrap().covered);
    }

    #[test]
    fn test_cell_and_edge_lookup() {
        let table = Table::new(2, 2);
        let size = Vec2::new(100.0, 60.0);

        assert_eq!(table.cell_at(pos2(10.0, 10.0), size), Some((0, 0)));
        assert_eq!(table.cell_at(pos2(75.0, 45.0), size), Some((1, 1)));
        assert_eq!(table.cell_at(pos2(100.0, 60.0), size), Some((1, 1)));
        assert_eq!(table.cell_at(pos2(-1.0, 10.0), size), None);

        assert_eq!(
            table.edge_at(pos2(49.0, 10.0), size, 4.0),
            Some((ResizeDirection::Horizontal, (0, 0)))
        );
        assert_eq!(
            table.edge_at(pos2(20.0, 28.0), size, 4.0),
            Some((ResizeDirection::Vertical, (0, 0)))
        );
        assert_eq!(table.edge_at(pos2(20.0, 10.0), size, 4.0), None);
    }
}
