//! Alignment pre-pass
//!
//! Snaps control origins to a coarse pixel grid before layout so that legacy
//! near-misses collapse onto shared lines. Candidate snap sizes are tried in a
//! diagonal sweep from `(max_snap, max_snap)` down to `(1, 1)`; the first
//! size whose overlapping pairs are a subset of the unsnapped ones wins.

use crate::control::{ControlArena, ControlId, Form, Surface};
use crate::geometry::{overlapping_pairs, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Alignment settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentOptions {
    /// Run the pre-pass
    pub enabled: bool,
    /// Largest snap size tried on either axis, in pixels
    pub max_snap: i32,
}

impl Default for AlignmentOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_snap: 8,
        }
    }
}

/// Snap size chosen for one surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapChoice {
    /// Surface name
    pub surface: String,
    /// Horizontal snap in pixels
    pub x: i32,
    /// Vertical snap in pixels
    pub y: i32,
}

/// `value` rounded to the nearest multiple of `step`; halves round up
#[inline]
#[must_use]
pub fn snap(value: i32, step: i32) -> i32 {
    if step <= 1 {
        return value;
    }
    (value + step / 2).div_euclid(step) * step
}

/// Copy of `rect` with its origin snapped
#[inline]
#[must_use]
pub fn snap_rect(rect: &Rect, x: i32, y: i32) -> Rect {
    Rect::new(snap(rect.left, x), snap(rect.top, y), rect.width, rect.height)
}

/// Snap sizes in sweep order: by descending `x + y`, then descending `x`
#[must_use]
pub fn sweep(max_snap: i32) -> Vec<(i32, i32)> {
    let max = max_snap.max(1);
    let mut out = Vec::new();
    for sum in (2..=2 * max).rev() {
        for x in (1..=max).rev() {
            let y = sum - x;
            if (1..=max).contains(&y) {
                out.push((x, y));
            }
        }
    }
    out
}

/// Coarsest snap size that introduces no new overlapping pair
#[must_use]
pub fn choose_snap(rects: &[Rect], max_snap: i32) -> (i32, i32) {
    let baseline: HashSet<(usize, usize)> = overlapping_pairs(rects).into_iter().collect();

    sweep(max_snap)
        .into_iter()
        .find(|&(x, y)| {
            let snapped: Vec<Rect> = rects.iter().map(|r| snap_rect(r, x, y)).collect();
            overlapping_pairs(&snapped)
                .iter()
                .all(|pair| baseline.contains(pair))
        })
        .unwrap_or((1, 1))
}

/// Alignment pre-pass over every surface of a form
#[derive(Debug, Clone, Copy, Default)]
pub struct Aligner {
    options: AlignmentOptions,
}

impl Aligner {
    /// Create aligner
    #[inline]
    #[must_use]
    pub fn new(options: AlignmentOptions) -> Self {
        Self { options }
    }

    /// Snap every surface of `form`, returning the choice per surface
    pub fn align_form(&self, form: &mut Form) -> Vec<SnapChoice> {
        let mut choices = Vec::new();
        if self.options.enabled {
            self.align_surface(&mut form.arena, &form.root, &mut choices);
        }
        choices
    }

    fn align_surface(&self, arena: &mut ControlArena, surface: &Surface, choices: &mut Vec<SnapChoice>) {
        let placed: Vec<ControlId> = surface
            .children
            .iter()
            .copied()
            .filter(|&id| arena.get(id).is_placeable())
            .collect();
        let rects: Vec<Rect> = placed.iter().map(|&id| arena.get(id).bounds).collect();

        let (x, y) = choose_snap(&rects, self.options.max_snap);
        for (&id, rect) in placed.iter().zip(&rects) {
            arena.get_mut(id).bounds = snap_rect(rect, x, y);
        }
        tracing::debug!(surface = %surface.name, x, y, "aligned surface");
        choices.push(SnapChoice {
            surface: surface.name.clone(),
            x,
            y,
        });

        for id in placed {
            let nested = std::mem::take(&mut arena.get_mut(id).surfaces);
            for child in &nested {
                self.align_surface(arena, child, choices);
            }
            arena.get_mut(id).surfaces = nested;
        }
    }
}
