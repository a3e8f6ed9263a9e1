//! Control classification registry
//!
//! Maps a legacy component class plus its property bag to a
//! [`ControlTemplate`]. Built once, then shared by reference across forms.
//!
//! Entries with a predicate are evaluated before generic entries for the same
//! class; within a tier, registration order wins. Unknown classes become
//! standard controls with no binding.

use crate::document::PropertyBag;
use lcm_datapath::NameKey;
use lcm_layout::ControlKind;
use serde::Serialize;

/// How a component's children are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nesting {
    /// Children are ignored
    #[default]
    None,
    /// All children share one nested surface
    Single,
    /// Each child is itself a surface (tab sheets)
    PerChild,
}

/// What a component binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Unbound
    #[default]
    None,
    /// Scalar field through `DataPath`
    Field,
    /// Single-valued reference through `LookupPath`
    Lookup,
    /// One-to-many collection through `DataPath`
    Collection,
}

/// Layout and binding shape of a classified component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTemplate {
    /// Layout role
    pub kind: ControlKind,
    /// Child handling
    pub nesting: Nesting,
    /// Binding shape
    pub binding: BindingKind,
}

impl ControlTemplate {
    /// Standard control bound as `binding`
    #[inline]
    #[must_use]
    pub fn standard(binding: BindingKind) -> Self {
        Self {
            kind: ControlKind::Standard,
            nesting: Nesting::None,
            binding,
        }
    }

    /// Container hosting nested surfaces
    #[inline]
    #[must_use]
    pub fn container(nesting: Nesting) -> Self {
        Self {
            kind: ControlKind::Container,
            nesting,
            binding: BindingKind::None,
        }
    }

    /// Non-visual component
    #[inline]
    #[must_use]
    pub fn tool() -> Self {
        Self {
            kind: ControlKind::Tool,
            nesting: Nesting::None,
            binding: BindingKind::None,
        }
    }

    /// Label, auto-sized if the bag says so
    #[must_use]
    pub fn label(props: &PropertyBag) -> Self {
        Self {
            kind: ControlKind::Label {
                auto_size: props.bool("AutoSize").unwrap_or(false),
            },
            nesting: Nesting::None,
            binding: BindingKind::None,
        }
    }
}

/// Predicate refining an entry
pub type Predicate = fn(&PropertyBag) -> bool;

/// Template constructor
pub type Constructor = fn(&PropertyBag) -> ControlTemplate;

#[derive(Debug, Clone)]
struct Entry {
    type_name: NameKey,
    build: Constructor,
}

/// Registry of component classes
#[derive(Debug, Clone, Default)]
pub struct ControlRegistry {
    specific: Vec<(Entry, Predicate)>,
    generic: Vec<Entry>,
}

impl ControlRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with the stock legacy component classes
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();

        for name in ["TEdit", "TDBEdit", "TMemo", "TDBMemo", "TCheckBox", "TDBCheckBox", "TComboBox", "TDateTimePicker"] {
            registry.register(name, |_| ControlTemplate::standard(BindingKind::Field));
        }
        registry.register_when("TEdit", |p| p.contains("LookupPath"), |_| {
            ControlTemplate::standard(BindingKind::Lookup)
        });
        for name in ["TLookupEdit", "TDBLookupComboBox"] {
            registry.register(name, |_| ControlTemplate::standard(BindingKind::Lookup));
        }
        registry.register("TDBGrid", |_| ControlTemplate::standard(BindingKind::Collection));

        for name in ["TLabel", "TStaticText"] {
            registry.register(name, ControlTemplate::label);
        }
        registry.register_when("TLabel", |p| p.contains("DataPath"), |_| {
            ControlTemplate::standard(BindingKind::Field)
        });
        for name in ["TButton", "TBitBtn", "TSpeedButton"] {
            registry.register(name, |_| ControlTemplate::standard(BindingKind::None));
        }

        for name in ["TPanel", "TGroupBox", "TScrollBox"] {
            registry.register(name, |_| ControlTemplate::container(Nesting::Single));
        }
        registry.register("TPageControl", |_| ControlTemplate::container(Nesting::PerChild));

        for name in [
            "TTimer",
            "TImageList",
            "TPopupMenu",
            "TMainMenu",
            "TOpenDialog",
            "TSaveDialog",
            "TDataSource",
            "TActionList",
        ] {
            registry.register(name, |_| ControlTemplate::tool());
        }
        registry
    }

    /// Register a generic entry for `type_name`
    pub fn register(&mut self, type_name: &str, build: Constructor) {
        self.generic.push(Entry {
            type_name: NameKey::new(type_name),
            build,
        });
    }

    /// Register an entry for `type_name` that only applies when `predicate` holds
    pub fn register_when(&mut self, type_name: &str, predicate: Predicate, build: Constructor) {
        self.specific.push((
            Entry {
                type_name: NameKey::new(type_name),
                build,
            },
            predicate,
        ));
    }

    /// Check if any entry exists for `type_name`
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        let key = NameKey::new(type_name);
        self.specific.iter().any(|(e, _)| e.type_name == key)
            || self.generic.iter().any(|e| e.type_name == key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.specific.len() + self.generic.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Template for a component
    #[must_use]
    pub fn classify(&self, type_name: &str, props: &PropertyBag) -> ControlTemplate {
        let key = NameKey::new(type_name);
        let specific = self
            .specific
            .iter()
            .find(|(entry, predicate)| entry.type_name == key && predicate(props))
            .map(|(entry, _)| entry);
        let entry = specific.or_else(|| self.generic.iter().find(|e| e.type_name == key));

        match entry {
            Some(entry) => (entry.build)(props),
            None => {
                tracing::debug!(type_name, "unknown component class; treating as standard");
                ControlTemplate::standard(BindingKind::None)
            }
        }
    }
}
