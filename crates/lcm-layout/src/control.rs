//! Control arena
//!
//! Controls live in a per-form [`ControlArena`] and are referenced by
//! [`ControlId`]. Containers own nested [`Surface`]s listing their children
//! by id, so there are no parent pointers.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Index of a control in its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(pub usize);

impl Display for ControlId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Layout role of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    /// Static caption
    Label {
        /// Grows rightward to fill free space
        #[serde(default)]
        auto_size: bool,
    },
    /// Non-visual component; never placed
    Tool,
    /// Ordinary input or display control
    Standard,
    /// Control hosting nested surfaces
    Container,
}

impl ControlKind {
    /// Whether this is a label
    #[inline]
    #[must_use]
    pub fn is_label(self) -> bool {
        matches!(self, Self::Label { .. })
    }
}

/// Position in a layout grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// First column
    pub column: usize,
    /// First row
    pub row: usize,
    /// Columns covered, at least one
    pub column_span: usize,
    /// Rows covered, at least one
    pub row_span: usize,
}

impl GridCell {
    /// One past the last column
    #[inline]
    #[must_use]
    pub fn column_end(&self) -> usize {
        self.column + self.column_span
    }

    /// One past the last row
    #[inline]
    #[must_use]
    pub fn row_end(&self) -> usize {
        self.row + self.row_span
    }
}

/// Column widths and row heights of one surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGrid {
    /// Pixel width of each column
    pub column_widths: Vec<i32>,
    /// Pixel height of each row
    pub row_heights: Vec<i32>,
}

impl LayoutGrid {
    /// One-pixel lines covering `width` × `height`
    #[must_use]
    pub fn uniform(width: i32, height: i32) -> Self {
        Self {
            column_widths: vec![1; usize::try_from(width).unwrap_or(0)],
            row_heights: vec![1; usize::try_from(height).unwrap_or(0)],
        }
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn columns(&self) -> usize {
        self.column_widths.len()
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.row_heights.len()
    }

    /// Total pixel width
    #[must_use]
    pub fn width(&self) -> i32 {
        self.column_widths.iter().sum()
    }

    /// Total pixel height
    #[must_use]
    pub fn height(&self) -> i32 {
        self.row_heights.iter().sum()
    }
}

/// Nested layout area: a form body, tab page or panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    /// Surface name
    pub name: String,
    /// Direct children, in creation order
    pub children: Vec<ControlId>,
    /// Grid computed by the layout engine
    #[serde(default)]
    pub grid: LayoutGrid,
}

impl Surface {
    /// Create empty surface
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            grid: LayoutGrid::default(),
        }
    }
}

/// One control with its geometry and layout state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInfo {
    /// Legacy component name
    pub name: String,
    /// Layout role
    pub kind: ControlKind,
    /// Geometry as read from the legacy form
    pub original: Rect,
    /// Current geometry, relative to the owning surface
    pub bounds: Rect,
    /// Visible at runtime
    pub visible: bool,
    /// Caption text
    #[serde(default)]
    pub caption: Option<String>,
    /// Dropped from output (merged labels)
    #[serde(default)]
    pub excluded: bool,
    /// Placement assigned by the layout engine
    #[serde(default)]
    pub cell: Option<GridCell>,
    /// Nested surfaces (containers only)
    #[serde(default)]
    pub surfaces: Vec<Surface>,
}

impl ControlInfo {
    /// Create visible control at `bounds`
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ControlKind, bounds: Rect) -> Self {
        Self {
            name: name.into(),
            kind,
            original: bounds,
            bounds,
            visible: true,
            caption: None,
            excluded: false,
            cell: None,
            surfaces: Vec::new(),
        }
    }

    /// Set caption
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Whether the control takes part in overlap checks and grid placement
    #[inline]
    #[must_use]
    pub fn is_placeable(&self) -> bool {
        self.visible && !self.excluded && self.kind != ControlKind::Tool
    }
}

/// Index-addressed store of a form's controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlArena {
    controls: Vec<ControlInfo>,
}

impl ControlArena {
    /// Create empty arena
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add control, returning its id
    pub fn add(&mut self, control: ControlInfo) -> ControlId {
        self.controls.push(control);
        ControlId(self.controls.len() - 1)
    }

    /// Control by id
    ///
    /// # Panics
    /// Panics if the id did not come from this arena
    #[inline]
    #[must_use]
    pub fn get(&self, id: ControlId) -> &ControlInfo {
        &self.controls[id.0]
    }

    /// Mutable control by id
    #[inline]
    pub fn get_mut(&mut self, id: ControlId) -> &mut ControlInfo {
        &mut self.controls[id.0]
    }

    /// All controls with their ids
    pub fn iter(&self) -> impl Iterator<Item = (ControlId, &ControlInfo)> {
        self.controls.iter().enumerate().map(|(i, c)| (ControlId(i), c))
    }

    /// Number of controls
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Check if arena is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

/// A legacy form: its controls and top-level surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    /// Form name
    pub name: String,
    /// Every control on the form, nested ones included
    pub arena: ControlArena,
    /// Top-level surface
    pub root: Surface,
}

impl Form {
    /// Create empty form
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            root: Surface::new(name.clone()),
            name,
            arena: ControlArena::new(),
        }
    }

    /// Add a control to the top-level surface
    pub fn add_control(&mut self, control: ControlInfo) -> ControlId {
        let id = self.arena.add(control);
        self.root.children.push(id);
        id
    }

    /// Add a control to `parent`'s surface at `surface` index, creating
    /// surfaces up to that index as needed
    pub fn add_child(&mut self, parent: ControlId, surface: usize, control: ControlInfo) -> ControlId {
        let id = self.arena.add(control);
        let parent = self.arena.get_mut(parent);
        while parent.surfaces.len() <= surface {
            let name = format!("{}[{}]", parent.name, parent.surfaces.len());
            parent.surfaces.push(Surface::new(name));
        }
        parent.surfaces[surface].children.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_and_hidden_controls_are_not_placeable() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(ControlInfo::new("a", ControlKind::Standard, rect).is_placeable());
        assert!(!ControlInfo::new("t", ControlKind::Tool, rect).is_placeable());
        assert!(!ControlInfo::new("h", ControlKind::Standard, rect)
            .with_visible(false)
            .is_placeable());
    }

    #[test]
    fn add_child_creates_surfaces() {
        let mut form = Form::new("Main");
        let tabs = form.add_control(ControlInfo::new(
            "Pages",
            ControlKind::Container,
            Rect::new(0, 0, 200, 100),
        ));
        let edit = form.add_child(
            tabs,
            1,
            ControlInfo::new("Edit", ControlKind::Standard, Rect::new(5, 5, 50, 20)),
        );

        let pages = form.arena.get(tabs);
        assert_eq!(pages.surfaces.len(), 2);
        assert_eq!(pages.surfaces[1].children, vec![edit]);
        assert_eq!(pages.surfaces[0].name, "Pages[0]");
        assert_eq!(form.root.children, vec![tabs]);
    }

    #[test]
    fn uniform_grid_has_one_pixel_lines() {
        let grid = LayoutGrid::uniform(3, 2);
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.width(), 3);
    }
}
