//! Label merging and auto-sized labels

use crate::control::{ControlArena, ControlId, ControlKind};
use crate::geometry::Rect;

/// Limits for pairing a label with the control to its right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMerge {
    /// Maximum difference between the label's and the control's top edge
    pub row_tolerance: i32,
    /// Maximum horizontal gap between the label and the control
    pub max_gap: i32,
}

/// Absorb each control's caption label into the control
///
/// For every non-label control, the nearest placed control to its left that
/// shares a row is examined. If it is a label within tolerance and nothing
/// else sits between them, the control takes the label's caption and cells
/// and the label is excluded. Returns the number of merged labels.
pub fn merge_labels(
    arena: &mut ControlArena,
    ids: &[ControlId],
    rects: &mut [Rect],
    limits: LabelMerge,
) -> usize {
    let mut merged = 0;

    for target in 0..ids.len() {
        let kind = arena.get(ids[target]).kind;
        if kind.is_label() || kind == ControlKind::Container || arena.get(ids[target]).excluded {
            continue;
        }
        let control = rects[target];

        let nearest = (0..ids.len())
            .filter(|&k| k != target && !arena.get(ids[k]).excluded)
            .filter(|&k| rects[k].right() <= control.left && rects[k].rows_overlap(&control))
            .max_by_key(|&k| (rects[k].right(), std::cmp::Reverse(k)));
        let Some(label) = nearest else { continue };

        let candidate = rects[label];
        if !arena.get(ids[label]).kind.is_label()
            || (candidate.top - control.top).abs() > limits.row_tolerance
            || control.left - candidate.right() > limits.max_gap
        {
            continue;
        }

        let widened = Rect::new(
            candidate.left,
            control.top,
            control.right() - candidate.left,
            control.height,
        );
        let blocked = (0..ids.len()).any(|k| {
            k != target && k != label && !arena.get(ids[k]).excluded && rects[k].intersects(&widened)
        });
        if blocked {
            continue;
        }

        let caption = arena.get(ids[label]).caption.clone();
        arena.get_mut(ids[label]).excluded = true;
        let info = arena.get_mut(ids[target]);
        if caption.is_some() {
            info.caption = caption;
        }
        rects[target] = widened;
        merged += 1;
        tracing::debug!(control = %info.name, label = %ids[label], "merged caption label");
    }

    merged
}

/// Extend auto-size labels rightward to the nearest obstacle or the surface edge
pub fn auto_size_labels(arena: &ControlArena, ids: &[ControlId], rects: &mut [Rect], surface_width: i32) {
    for i in 0..ids.len() {
        let info = arena.get(ids[i]);
        if info.excluded || !matches!(info.kind, ControlKind::Label { auto_size: true }) {
            continue;
        }
        let label = rects[i];
        let limit = (0..ids.len())
            .filter(|&k| k != i && !arena.get(ids[k]).excluded)
            .map(|k| rects[k])
            .filter(|r| r.left >= label.right() && r.rows_overlap(&label))
            .map(|r| r.left)
            .min()
            .unwrap_or(surface_width);
        if limit > label.right() {
            rects[i].width = limit - label.left;
        }
    }
}
