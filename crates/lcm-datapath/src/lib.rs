//! LCM Data Paths
//!
//! Legacy data bindings expressed as chains of table joins terminating at a field.
//!
//! # Core Concepts
//!
//! - [`DataPath`]: Immutable `Table:Join1!Join2!...!Field` binding
//! - [`DataPathJoin`]: Directed equi-join edge `FromTable.FromField = ToTable.ToField`
//! - [`PathError`]: Parse and construction failures
//!
//! All names compare case-insensitively, mirroring the legacy database.
//!
//! # Example
//!
//! ```rust
//! use lcm_datapath::DataPath;
//!
//! let path: DataPath = "ACCOUNT:ACCOUNTID=ADDRESS.ACCOUNTID!@CITY".parse().unwrap();
//! assert_eq!(path.root_table(), "ACCOUNT");
//! assert_eq!(path.target_table(), "ADDRESS");
//! assert_eq!(path.target_field(), "@CITY");
//! assert!(path.is_calculated());
//! ```

#![warn(unreachable_pub)]

mod join;
mod names;
mod path;

pub use join::DataPathJoin;
pub use names::{eq_ignore_case, hash_ignore_case, NameKey};
pub use path::{DataPath, PathError};

/// Marker prefix for calculated (non-column) fields
pub const CALCULATED_PREFIX: char = '@';

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
