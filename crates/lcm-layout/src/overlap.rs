//! Overlap detection and resolution
//!
//! Every pair of placed controls is checked in id order. Full containment is
//! reported and kept. A partial overlap is resolved by the cheapest single
//! shrink or shift of either control that separates the pair while staying
//! inside the surface and without touching a control it was clear of.

use crate::control::ControlId;
use crate::geometry::Rect;
use crate::warning::LayoutWarning;

/// Cost weights for candidate adjustments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapCost {
    /// Weight of the absolute area change
    pub area_weight: f64,
    /// Weight of the Manhattan distance the origin moves
    pub position_weight: f64,
}

impl OverlapCost {
    fn of(&self, from: &Rect, to: &Rect) -> f64 {
        let area = (from.area() - to.area()).abs() as f64;
        let moved = (from.left - to.left).abs() + (from.top - to.top).abs();
        self.area_weight * area + self.position_weight * f64::from(moved)
    }
}

/// Candidate geometries for `mover` that no longer intersect `fixed`
///
/// Shrinks come first (right, left, bottom, top edge), then shifts
/// (left, right, up, down).
#[must_use]
pub fn candidates(mover: &Rect, fixed: &Rect, bounds: &Rect) -> Vec<Rect> {
    let mut out = Vec::with_capacity(8);

    if mover.left < fixed.left {
        out.push(Rect::new(mover.left, mover.top, fixed.left - mover.left, mover.height));
    }
    if mover.right() > fixed.right() {
        out.push(Rect::new(fixed.right(), mover.top, mover.right() - fixed.right(), mover.height));
    }
    if mover.top < fixed.top {
        out.push(Rect::new(mover.left, mover.top, mover.width, fixed.top - mover.top));
    }
    if mover.bottom() > fixed.bottom() {
        out.push(Rect::new(mover.left, fixed.bottom(), mover.width, mover.bottom() - fixed.bottom()));
    }

    out.push(Rect::new(fixed.left - mover.width, mover.top, mover.width, mover.height));
    out.push(Rect::new(fixed.right(), mover.top, mover.width, mover.height));
    out.push(Rect::new(mover.left, fixed.top - mover.height, mover.width, mover.height));
    out.push(Rect::new(mover.left, fixed.bottom(), mover.width, mover.height));

    out.retain(|r| r.width > 0 && r.height > 0 && bounds.contains(r) && !r.intersects(fixed));
    out
}

/// Whether moving `rects[k]` to `to` overlaps no control it was clear of
///
/// `pair` is skipped; the candidate already separates it.
fn keeps_clear(rects: &[Rect], k: usize, to: &Rect, pair: (usize, usize)) -> bool {
    rects.iter().enumerate().all(|(m, other)| {
        m == pair.0 || m == pair.1 || !to.intersects(other) || rects[k].intersects(other)
    })
}

/// Detect and, when `resolve` is set, separate overlapping controls
///
/// `rects[i]` is the geometry of `ids[i]` and is updated in place.
pub fn resolve_overlaps(
    ids: &[ControlId],
    rects: &mut [Rect],
    bounds: &Rect,
    cost: OverlapCost,
    resolve: bool,
    warnings: &mut Vec<LayoutWarning>,
) {
    for i in 0..rects.len() {
        for j in i + 1..rects.len() {
            let (a, b) = (rects[i], rects[j]);
            if !a.intersects(&b) {
                continue;
            }

            if a.contains(&b) || b.contains(&a) {
                let (outer, inner) = if a.contains(&b) { (ids[i], ids[j]) } else { (ids[j], ids[i]) };
                tracing::warn!(%outer, %inner, "control fully contains another");
                warnings.push(LayoutWarning::Contained { outer, inner });
                continue;
            }

            let best = if resolve {
                let current: &[Rect] = rects;
                let moves_a = candidates(&a, &b, bounds).into_iter().map(|r| (i, r));
                let moves_b = candidates(&b, &a, bounds).into_iter().map(|r| (j, r));
                moves_a
                    .chain(moves_b)
                    .filter(|(k, r)| keeps_clear(current, *k, r, (i, j)))
                    .fold(None, |best: Option<(f64, usize, Rect)>, (k, r)| {
                        let c = cost.of(&current[k], &r);
                        match best {
                            Some((bc, _, _)) if bc <= c => best,
                            _ => Some((c, k, r)),
                        }
                    })
            } else {
                None
            };

            match best {
                Some((_, k, to)) => {
                    let from = rects[k];
                    rects[k] = to;
                    tracing::warn!(first = %ids[i], second = %ids[j], adjusted = %ids[k], %from, %to, "overlap resolved");
                    warnings.push(LayoutWarning::Overlap {
                        first: ids[i],
                        second: ids[j],
                        adjusted: ids[k],
                        from,
                        to,
                    });
                }
                None => {
                    tracing::warn!(first = %ids[i], second = %ids[j], "overlap left in place");
                    warnings.push(LayoutWarning::Unresolved {
                        first: ids[i],
                        second: ids[j],
                    });
                }
            }
        }
    }
}
