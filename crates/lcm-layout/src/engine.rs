//! Control layout engine
//!
//! Converts absolute pixel geometry into a minimal row/column grid per
//! surface.
//!
//! # Steps
//! 1. One-pixel grid over the placed controls' extents
//! 2. Overlap detection and resolution ([`crate::overlap`])
//! 3. Label merging ([`crate::labels`])
//! 4. Auto-size labels
//! 5. Grid folding ([`crate::fold`])
//! 6. Recursion into nested surfaces
//!
//! Deterministic: the same form always yields the same grid.

use crate::control::{ControlArena, ControlId, Form, GridCell, LayoutGrid, Surface};
use crate::fold::fold_grid;
use crate::geometry::{bounding_box, Rect};
use crate::labels::{auto_size_labels, merge_labels, LabelMerge};
use crate::overlap::{resolve_overlaps, OverlapCost};
use crate::warning::LayoutWarning;
use serde::{Deserialize, Serialize};

/// Layout settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Absorb caption labels into the control to their right
    pub merge_labels: bool,
    /// Maximum top-edge difference for a label merge, in pixels
    pub label_row_tolerance: i32,
    /// Maximum gap between a label and its control, in pixels
    pub max_label_gap: i32,
    /// Grow auto-size labels to the right
    pub auto_size_labels: bool,
    /// Try to separate partially overlapping controls
    pub resolve_overlaps: bool,
    /// Cost per square pixel of area change
    pub area_weight: f64,
    /// Cost per pixel of origin movement
    pub position_weight: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            merge_labels: true,
            label_row_tolerance: 4,
            max_label_gap: 48,
            auto_size_labels: true,
            resolve_overlaps: true,
            area_weight: 1.0,
            position_weight: 4.0,
        }
    }
}

/// Outcome of laying out one form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutReport {
    /// Surfaces laid out, nested ones included
    pub surfaces: usize,
    /// Controls given a grid cell
    pub placed: usize,
    /// Labels merged into their controls
    pub merged_labels: usize,
    /// Overlap and containment warnings
    pub warnings: Vec<LayoutWarning>,
}

/// Grid layout engine
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Settings in use
    #[inline]
    #[must_use]
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out every surface of `form`
    pub fn layout_form(&self, form: &mut Form) -> LayoutReport {
        let _span = tracing::info_span!("form", name = %form.name).entered();
        let mut report = LayoutReport::default();
        self.layout_surface(&mut form.arena, &mut form.root, &mut report);
        tracing::info!(
            surfaces = report.surfaces,
            placed = report.placed,
            warnings = report.warnings.len(),
            "layout finished"
        );
        report
    }

    /// Lay out one surface and everything nested in it
    pub fn layout_surface(&self, arena: &mut ControlArena, surface: &mut Surface, report: &mut LayoutReport) {
        let _span = tracing::debug_span!("surface", name = %surface.name).entered();
        report.surfaces += 1;

        for &id in &surface.children {
            arena.get_mut(id).cell = None;
        }
        let ids: Vec<ControlId> = surface
            .children
            .iter()
            .copied()
            .filter(|&id| arena.get(id).is_placeable())
            .collect();

        // 1. one-pixel grid over the extents
        let pixels: Vec<Rect> = ids
            .iter()
            .map(|&id| arena.get(id).bounds.at_least_one_pixel())
            .collect();
        let Some(extent) = bounding_box(&pixels) else {
            surface.grid = LayoutGrid::default();
            return;
        };
        let mut rects: Vec<Rect> = pixels
            .iter()
            .map(|r| r.translate(-extent.left, -extent.top))
            .collect();
        let bounds = Rect::new(0, 0, extent.width, extent.height);
        let mut grid = LayoutGrid::uniform(extent.width, extent.height);

        // 2. overlaps
        let cost = OverlapCost {
            area_weight: self.options.area_weight,
            position_weight: self.options.position_weight,
        };
        resolve_overlaps(
            &ids,
            &mut rects,
            &bounds,
            cost,
            self.options.resolve_overlaps,
            &mut report.warnings,
        );

        // 3. label merging
        if self.options.merge_labels {
            let limits = LabelMerge {
                row_tolerance: self.options.label_row_tolerance,
                max_gap: self.options.max_label_gap,
            };
            report.merged_labels += merge_labels(arena, &ids, &mut rects, limits);
        }

        // 4. auto-size labels
        if self.options.auto_size_labels {
            auto_size_labels(arena, &ids, &mut rects, bounds.width);
        }

        let mut kept = Vec::with_capacity(ids.len());
        let mut cells = Vec::with_capacity(ids.len());
        for (&id, rect) in ids.iter().zip(&rects) {
            let info = arena.get_mut(id);
            if info.excluded {
                continue;
            }
            info.bounds = rect.translate(extent.left, extent.top);
            kept.push(id);
            cells.push(pixel_cell(rect));
        }

        // 5. folding
        let (columns, rows) = fold_grid(&mut grid, &mut cells);
        tracing::debug!(
            columns = grid.columns(),
            rows = grid.rows(),
            folded_columns = columns,
            folded_rows = rows,
            "folded grid"
        );
        for (&id, cell) in kept.iter().zip(cells) {
            arena.get_mut(id).cell = Some(cell);
        }
        report.placed += kept.len();
        surface.grid = grid;

        // 6. nested surfaces
        for id in kept {
            let mut nested = std::mem::take(&mut arena.get_mut(id).surfaces);
            for child in &mut nested {
                self.layout_surface(arena, child, report);
            }
            arena.get_mut(id).surfaces = nested;
        }
    }
}

/// Cell of a rectangle on a one-pixel grid anchored at the origin
fn pixel_cell(rect: &Rect) -> GridCell {
    let index = |v: i32| usize::try_from(v).unwrap_or(0);
    GridCell {
        column: index(rect.left),
        row: index(rect.top),
        column_span: index(rect.width).max(1),
        row_span: index(rect.height).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlInfo, ControlKind};

    fn standard(name: &str, rect: Rect) -> ControlInfo {
        ControlInfo::new(name, ControlKind::Standard, rect)
    }

    #[test]
    fn empty_surface_has_empty_grid() {
        let mut form = Form::new("Empty");
        form.add_control(ControlInfo::new("timer", ControlKind::Tool, Rect::new(0, 0, 24, 24)));
        let report = LayoutEngine::default().layout_form(&mut form);
        assert_eq!(report.placed, 0);
        assert_eq!(form.root.grid, LayoutGrid::default());
    }

    #[test]
    fn overlapping_pair_is_shrunk_and_warned() {
        let mut form = Form::new("Overlap");
        let a = form.add_control(standard("a", Rect::new(10, 10, 50, 20)));
        let b = form.add_control(standard("b", Rect::new(15, 15, 50, 20)));

        let report = LayoutEngine::default().layout_form(&mut form);

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].controls(), [a, b]);
        let ra = form.arena.get(a).bounds;
        let rb = form.arena.get(b).bounds;
        assert!(!ra.intersects(&rb));
        assert_eq!(ra, Rect::new(10, 10, 50, 5));
    }

    #[test]
    fn form_with_label_and_edits() {
        let mut form = Form::new("Contact");
        let lbl = form.add_control(
            ControlInfo::new("lblName", ControlKind::Label { auto_size: false }, Rect::new(8, 10, 40, 16))
                .with_caption("Name"),
        );
        let name = form.add_control(standard("edName", Rect::new(56, 8, 120, 21)));
        let phone = form.add_control(standard("edPhone", Rect::new(56, 40, 120, 21)));

        let report = LayoutEngine::default().layout_form(&mut form);

        assert_eq!(report.merged_labels, 1);
        assert!(form.arena.get(lbl).excluded);
        assert_eq!(form.arena.get(lbl).cell, None);
        assert_eq!(form.arena.get(name).caption.as_deref(), Some("Name"));

        let name_cell = form.arena.get(name).cell.unwrap();
        let phone_cell = form.arena.get(phone).cell.unwrap();
        assert_eq!(name_cell.column, 0);
        assert_eq!(name_cell.column_span, 2);
        assert_eq!(phone_cell.column, 1);
        assert_eq!(form.root.grid.column_widths, vec![48, 120]);
        assert_eq!(form.root.grid.width(), 168);
    }

    #[test]
    fn nested_surfaces_get_their_own_grid() {
        let mut form = Form::new("Tabs");
        let pages = form.add_control(ControlInfo::new("Pages", ControlKind::Container, Rect::new(0, 0, 300, 200)));
        let inner = form.add_child(pages, 0, standard("edCity", Rect::new(10, 10, 100, 20)));

        let report = LayoutEngine::default().layout_form(&mut form);

        assert_eq!(report.surfaces, 2);
        assert_eq!(report.placed, 2);
        let surface = &form.arena.get(pages).surfaces[0];
        assert_eq!(surface.grid.column_widths, vec![100]);
        assert_eq!(
            form.arena.get(inner).cell,
            Some(GridCell {
                column: 0,
                row: 0,
                column_span: 1,
                row_span: 1
            })
        );
    }

    #[test]
    fn layout_is_deterministic() {
        let build = || {
            let mut form = Form::new("F");
            form.add_control(standard("a", Rect::new(0, 0, 30, 10)));
            form.add_control(standard("b", Rect::new(20, 5, 30, 10)));
            form.add_control(standard("c", Rect::new(0, 40, 80, 10)));
            form
        };
        let mut first = build();
        let mut second = build();
        let engine = LayoutEngine::default();
        assert_eq!(engine.layout_form(&mut first), engine.layout_form(&mut second));
        assert_eq!(first, second);
    }
}
