//! Layout warnings
//!
//! Nothing in the layout engine is fatal; every anomaly becomes a warning.

use crate::control::ControlId;
use crate::geometry::Rect;
use serde::Serialize;

/// Non-fatal layout anomaly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// One control lies entirely inside another; left as is
    #[error("control {inner} is fully contained in control {outer}")]
    Contained {
        /// Enclosing control
        outer: ControlId,
        /// Enclosed control
        inner: ControlId,
    },

    /// Partial overlap removed by adjusting one control
    #[error("controls {first} and {second} overlap; moved {adjusted} from {from} to {to}")]
    Overlap {
        /// Lower id of the pair
        first: ControlId,
        /// Higher id of the pair
        second: ControlId,
        /// Control that was shrunk or shifted
        adjusted: ControlId,
        /// Geometry before adjustment (grid units)
        from: Rect,
        /// Geometry after adjustment (grid units)
        to: Rect,
    },

    /// Partial overlap left in place
    #[error("controls {first} and {second} overlap and could not be separated")]
    Unresolved {
        /// Lower id of the pair
        first: ControlId,
        /// Higher id of the pair
        second: ControlId,
    },
}

impl LayoutWarning {
    /// Controls the warning refers to
    #[must_use]
    pub fn controls(&self) -> [ControlId; 2] {
        match *self {
            Self::Contained { outer, inner } => [outer, inner],
            Self::Overlap { first, second, .. } | Self::Unresolved { first, second } => {
                [first, second]
            }
        }
    }
}
