//! Case-insensitive name handling
//!
//! Legacy table and column names are case-insensitive. [`NameKey`] is the
//! normalized form used as a map key throughout the workspace.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::hash::Hasher;

/// Compare two names ignoring ASCII case
#[inline]
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Feed a name into a hasher ignoring ASCII case
///
/// A terminator byte keeps adjacent names from running together.
#[inline]
pub fn hash_ignore_case<H: Hasher>(name: &str, state: &mut H) {
    for b in name.bytes() {
        state.write_u8(b.to_ascii_uppercase());
    }
    state.write_u8(0xff);
}

/// Upper-cased name usable as a case-insensitive map key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameKey(String);

impl NameKey {
    /// Normalize a name into a key
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_uppercase())
    }

    /// Normalized text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NameKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for NameKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for NameKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
