//! LCM Layout
//!
//! Reconstructs row/column grids from the absolute pixel geometry of legacy
//! forms.
//!
//! # Overview
//!
//! - **ControlArena**: index-addressed controls of one form, with nested surfaces
//! - **Aligner**: snaps origins to the coarsest grid that adds no overlap
//! - **LayoutEngine**: overlap repair, label merging, auto-size labels and
//!   grid folding, per surface
//!
//! # Example
//!
//! ```rust
//! use lcm_layout::{ControlInfo, ControlKind, Form, LayoutEngine, Rect};
//!
//! let mut form = Form::new("Contact");
//! let a = form.add_control(ControlInfo::new("edA", ControlKind::Standard, Rect::new(10, 10, 50, 20)));
//! let b = form.add_control(ControlInfo::new("edB", ControlKind::Standard, Rect::new(15, 15, 50, 20)));
//!
//! let report = LayoutEngine::default().layout_form(&mut form);
//! assert_eq!(report.warnings[0].controls(), [a, b]);
//! assert!(!form.arena.get(a).bounds.intersects(&form.arena.get(b).bounds));
//! ```

pub mod align;
pub mod control;
pub mod engine;
pub mod fold;
pub mod geometry;
pub mod labels;
pub mod overlap;
pub mod warning;

// Re-exports
pub use align::{choose_snap, snap, Aligner, AlignmentOptions, SnapChoice};
pub use control::{ControlArena, ControlId, ControlInfo, ControlKind, Form, GridCell, LayoutGrid, Surface};
pub use engine::{LayoutEngine, LayoutOptions, LayoutReport};
pub use geometry::{overlapping_pairs, Rect};
pub use warning::LayoutWarning;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
