//! Grid folding
//!
//! Two adjacent columns hold identical content exactly when no placed control
//! starts or ends on the line between them. Such lines are removed, summing
//! the widths on either side and shifting every placement. Rows are handled
//! the same way. One scan per axis reaches the fixed point since merging never
//! moves a control edge onto a different line.

use crate::control::{GridCell, LayoutGrid};

/// Which grid axis to fold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Columns,
    Rows,
}

impl Axis {
    fn span(self, cell: &mut GridCell) -> (&mut usize, &mut usize) {
        match self {
            Self::Columns => (&mut cell.column, &mut cell.column_span),
            Self::Rows => (&mut cell.row, &mut cell.row_span),
        }
    }
}

/// Fold both axes; returns the number of `(columns, rows)` removed
pub fn fold_grid(grid: &mut LayoutGrid, cells: &mut [GridCell]) -> (usize, usize) {
    let columns = fold_axis(&mut grid.column_widths, cells, Axis::Columns);
    let rows = fold_axis(&mut grid.row_heights, cells, Axis::Rows);
    (columns, rows)
}

fn fold_axis(sizes: &mut Vec<i32>, cells: &mut [GridCell], axis: Axis) -> usize {
    let mut removed = 0;

    // line k separates index k-1 from index k
    for line in (1..sizes.len()).rev() {
        let edge_on_line = cells.iter_mut().any(|cell| {
            let (start, span) = axis.span(cell);
            *start == line || *start + *span == line
        });
        if edge_on_line {
            continue;
        }

        sizes[line - 1] += sizes[line];
        sizes.remove(line);
        removed += 1;

        for cell in cells.iter_mut() {
            let (start, span) = axis.span(cell);
            if *start > line {
                *start -= 1;
            } else if *start < line && line < *start + *span {
                *span -= 1;
            }
        }
    }

    removed
}

/// Whether adjacent columns `c` and `c + 1` have identical occupancy
///
/// Cell-by-cell comparison, used to check the folding result independently.
#[must_use]
pub fn columns_identical(grid: &LayoutGrid, cells: &[GridCell], c: usize) -> bool {
    (0..grid.rows()).all(|row| occupant(cells, c, row) == occupant(cells, c + 1, row))
}

/// Whether adjacent rows `r` and `r + 1` have identical occupancy
#[must_use]
pub fn rows_identical(grid: &LayoutGrid, cells: &[GridCell], r: usize) -> bool {
    (0..grid.columns()).all(|column| occupant(cells, column, r) == occupant(cells, column, r + 1))
}

fn occupant(cells: &[GridCell], column: usize, row: usize) -> Option<usize> {
    cells.iter().position(|c| {
        (c.column..c.column_end()).contains(&column) && (c.row..c.row_end()).contains(&row)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(column: usize, row: usize, column_span: usize, row_span: usize) -> GridCell {
        GridCell {
            column,
            row,
            column_span,
            row_span,
        }
    }

    #[test]
    fn single_control_folds_to_one_cell() {
        let mut grid = LayoutGrid::uniform(50, 20);
        let mut cells = [cell(0, 0, 50, 20)];
        assert_eq!(fold_grid(&mut grid, &mut cells), (49, 19));
        assert_eq!(grid.column_widths, vec![50]);
        assert_eq!(grid.row_heights, vec![20]);
        assert_eq!(cells[0], cell(0, 0, 1, 1));
    }

    #[test]
    fn two_controls_side_by_side() {
        // 0..40 and 50..150 wide, same rows
        let mut grid = LayoutGrid::uniform(150, 20);
        let mut cells = [cell(0, 0, 40, 20), cell(50, 0, 100, 20)];
        fold_grid(&mut grid, &mut cells);

        assert_eq!(grid.column_widths, vec![40, 10, 100]);
        assert_eq!(grid.row_heights, vec![20]);
        assert_eq!(cells, [cell(0, 0, 1, 1), cell(2, 0, 1, 1)]);
    }

    #[test]
    fn staggered_rows_keep_distinct_lines() {
        let mut grid = LayoutGrid::uniform(10, 30);
        let mut cells = [cell(0, 0, 10, 20), cell(0, 20, 5, 10)];
        fold_grid(&mut grid, &mut cells);

        assert_eq!(grid.column_widths, vec![5, 5]);
        assert_eq!(grid.row_heights, vec![20, 10]);
        assert_eq!(cells, [cell(0, 0, 2, 1), cell(0, 1, 1, 1)]);
        assert!(!columns_identical(&grid, &cells, 0));
        assert!(!rows_identical(&grid, &cells, 0));
    }

    #[test]
    fn total_size_is_preserved() {
        let mut grid = LayoutGrid::uniform(120, 80);
        let mut cells = [cell(3, 4, 30, 10), cell(40, 4, 20, 50), cell(3, 60, 100, 20)];
        fold_grid(&mut grid, &mut cells);
        assert_eq!(grid.width(), 120);
        assert_eq!(grid.height(), 80);
    }
}
