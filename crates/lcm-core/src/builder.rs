//! Legacy form builder
//!
//! Turns a [`LegacyComponent`] tree into a [`Form`] and registers every data
//! binding with the translation service. Bindings are translated later, once
//! entities and relationships have been persisted.

use crate::classify::{BindingKind, ControlRegistry, Nesting};
use crate::document::LegacyComponent;
use crate::report::Diagnostic;
use lcm_datapath::DataPath;
use lcm_entity::{DataPathTranslationService, MigrationError, Translator};
use lcm_layout::{ControlId, ControlInfo, Form, Rect, Surface};
use serde::Serialize;

/// Data binding of one control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Bound control
    pub control: ControlId,
    /// Bound control's name
    pub control_name: String,
    /// Binding shape
    pub kind: BindingKind,
    /// Legacy path
    pub path: DataPath,
    /// Parent binding `path` is relative to, for grid and lookup columns
    pub prefix: Option<DataPath>,
    /// Translated property path, once resolved
    pub property: Option<String>,
}

impl Binding {
    /// Property path for this binding
    ///
    /// # Errors
    /// Whatever the translator reports for the path
    pub fn translate(&self, translator: &Translator<'_>) -> Result<String, MigrationError> {
        if let Some(prefix) = &self.prefix {
            return translator.translate_field_with_prefix(prefix, &self.path);
        }
        let last = self.path.joins().last();
        match (self.kind, last) {
            (BindingKind::Lookup, Some(last)) => {
                translator.translate_reference(&self.path, last.to_table(), last.to_field())
            }
            (BindingKind::Collection, _) => {
                let (table, field) = last.map_or(
                    (self.path.target_table(), self.path.target_field()),
                    |j| (j.to_table(), j.to_field()),
                );
                translator.translate_collection(&self.path, table, field)
            }
            _ => translator.translate_field(&self.path),
        }
    }
}

/// A form ready for translation and layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltForm {
    /// Originating plugin
    pub plugin: String,
    /// Controls and surfaces
    pub form: Form,
    /// Registered bindings in control order
    pub bindings: Vec<Binding>,
}

impl BuiltForm {
    /// Translate every binding; failures lose their binding and become
    /// diagnostics
    pub fn translate_bindings(&mut self, translator: &Translator<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for binding in &mut self.bindings {
            match binding.translate(translator) {
                Ok(property) => {
                    tracing::debug!(control = %binding.control_name, %property, "binding translated");
                    binding.property = Some(property);
                }
                Err(err) => {
                    tracing::warn!(
                        plugin = %self.plugin,
                        control = %binding.control_name,
                        path = %binding.path,
                        error = %err,
                        "binding dropped"
                    );
                    binding.property = None;
                    diagnostics.push(Diagnostic::warning(
                        Some(self.plugin.as_str()),
                        binding.control_name.clone(),
                        err.to_string(),
                    ));
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Root,
    Nested(ControlId, usize),
}

/// Builds forms using a shared classification registry
#[derive(Debug, Clone, Copy)]
pub struct FormBuilder<'r> {
    registry: &'r ControlRegistry,
}

struct BuildContext<'a> {
    plugin: &'a str,
    form: Form,
    bindings: Vec<Binding>,
    service: &'a mut DataPathTranslationService,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'r> FormBuilder<'r> {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new(registry: &'r ControlRegistry) -> Self {
        Self { registry }
    }

    /// Build `root` and register its bindings with `service`
    pub fn build(
        &self,
        plugin: &str,
        root: &LegacyComponent,
        service: &mut DataPathTranslationService,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> BuiltForm {
        let mut ctx = BuildContext {
            plugin,
            form: Form::new(root.name.clone()),
            bindings: Vec::new(),
            service,
            diagnostics,
        };
        for child in &root.children {
            self.add_component(&mut ctx, child, Target::Root);
        }
        tracing::debug!(
            form = %root.name,
            controls = ctx.form.arena.len(),
            bindings = ctx.bindings.len(),
            "form built"
        );
        BuiltForm {
            plugin: plugin.to_string(),
            form: ctx.form,
            bindings: ctx.bindings,
        }
    }

    fn add_component(&self, ctx: &mut BuildContext<'_>, component: &LegacyComponent, target: Target) {
        let props = &component.properties;
        let template = self.registry.classify(&component.type_name, props);
        let bounds = Rect::new(
            props.int("Left").unwrap_or(0),
            props.int("Top").unwrap_or(0),
            props.int("Width").unwrap_or(0),
            props.int("Height").unwrap_or(0),
        );
        let mut info = ControlInfo::new(component.name.clone(), template.kind, bounds)
            .with_visible(props.bool("Visible").unwrap_or(true));
        if let Some(caption) = props.str("Caption") {
            info = info.with_caption(caption);
        }

        let id = match target {
            Target::Root => ctx.form.add_control(info),
            Target::Nested(parent, surface) => ctx.form.add_child(parent, surface, info),
        };
        let path = self.register_binding(ctx, id, component, template.binding);

        match template.nesting {
            Nesting::None => match column_prefix(template.binding, path.as_ref()) {
                Some(prefix) => {
                    for column in &component.children {
                        register_column(ctx, id, column, &prefix);
                    }
                }
                None if !component.children.is_empty() => {
                    tracing::debug!(control = %component.name, "children of a non-container ignored");
                }
                None => {}
            },
            Nesting::Single => {
                ctx.form
                    .arena
                    .get_mut(id)
                    .surfaces
                    .push(Surface::new(component.name.clone()));
                for child in &component.children {
                    self.add_component(ctx, child, Target::Nested(id, 0));
                }
            }
            Nesting::PerChild => {
                for (index, sheet) in component.children.iter().enumerate() {
                    ctx.form
                        .arena
                        .get_mut(id)
                        .surfaces
                        .push(Surface::new(sheet.name.clone()));
                    for child in &sheet.children {
                        self.add_component(ctx, child, Target::Nested(id, index));
                    }
                }
            }
        }
    }

    fn register_binding(
        &self,
        ctx: &mut BuildContext<'_>,
        control: ControlId,
        component: &LegacyComponent,
        kind: BindingKind,
    ) -> Option<DataPath> {
        let key = match kind {
            BindingKind::None => return None,
            BindingKind::Field | BindingKind::Collection => "DataPath",
            BindingKind::Lookup => "LookupPath",
        };
        let path = parse_property(ctx, component, key)?;

        ctx.service.register_field(&path);
        if kind == BindingKind::Lookup {
            if let Some(text_path) = parse_property(ctx, component, "TextPath") {
                ctx.service.register_join(&text_path, &path);
            }
        }

        ctx.bindings.push(Binding {
            control,
            control_name: component.name.clone(),
            kind,
            path: path.clone(),
            prefix: None,
            property: None,
        });
        Some(path)
    }
}

/// Path that column children of a bound control are relative to
///
/// Lookup columns continue the lookup path. Grid columns start at the row
/// entity, the table the collection lands on.
fn column_prefix(kind: BindingKind, path: Option<&DataPath>) -> Option<DataPath> {
    let path = path?;
    match kind {
        BindingKind::Lookup => Some(path.clone()),
        BindingKind::Collection => Some(match path.joins().last() {
            Some(last) => DataPath::field(last.to_table(), last.to_field()),
            None => DataPath::field(path.target_table(), path.target_field()),
        }),
        BindingKind::None | BindingKind::Field => None,
    }
}

/// Register one grid or lookup column of `control`
fn register_column(ctx: &mut BuildContext<'_>, control: ControlId, column: &LegacyComponent, prefix: &DataPath) {
    let Some(path) = parse_property(ctx, column, "DataPath") else {
        return;
    };
    match path.with_prefix(prefix) {
        Ok(full) => {
            ctx.service.register_field(&full);
            ctx.bindings.push(Binding {
                control,
                control_name: column.name.clone(),
                kind: BindingKind::Field,
                path,
                prefix: Some(prefix.clone()),
                property: None,
            });
        }
        Err(err) => {
            tracing::warn!(plugin = ctx.plugin, column = %column.name, error = %err, "column outside its parent binding");
            ctx.diagnostics.push(Diagnostic::warning(
                Some(ctx.plugin),
                column.name.clone(),
                format!("column '{path}' does not start at {}: {err}", prefix.target_table()),
            ));
        }
    }
}

fn parse_property(ctx: &mut BuildContext<'_>, component: &LegacyComponent, key: &str) -> Option<DataPath> {
    let text = component.properties.str(key)?;
    match DataPath::parse(text) {
        Ok(path) => Some(path),
        Err(err) => {
            tracing::warn!(plugin = ctx.plugin, control = %component.name, key, error = %err, "unparseable binding");
            ctx.diagnostics.push(Diagnostic::warning(
                Some(ctx.plugin),
                component.name.clone(),
                format!("invalid {key} '{text}': {err}"),
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcm_entity::{InMemorySchema, TableSchema};
    use lcm_layout::ControlKind;

    fn contact_form() -> LegacyComponent {
        LegacyComponent::new("ContactForm", "TForm")
            .child(
                LegacyComponent::new("lblName", "TLabel")
                    .at(8, 10, 40, 16)
                    .with("Caption", "Name"),
            )
            .child(
                LegacyComponent::new("edName", "TEdit")
                    .at(56, 8, 120, 21)
                    .with("DataPath", "CONTACT:LASTNAME"),
            )
            .child(
                LegacyComponent::new("edAccount", "TEdit")
                    .at(56, 40, 120, 21)
                    .with("LookupPath", "CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT")
                    .with("TextPath", "CONTACT:ACCOUNTNAME"),
            )
            .child(LegacyComponent::new("tmr", "TTimer").at(0, 0, 24, 24))
    }

    #[test]
    fn controls_are_classified_and_placed() {
        let registry = ControlRegistry::standard();
        let mut service = DataPathTranslationService::default();
        let mut diagnostics = Vec::new();

        let built = FormBuilder::new(&registry).build("Contacts", &contact_form(), &mut service, &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(built.form.name, "ContactForm");
        assert_eq!(built.form.root.children.len(), 4);
        let label = built.form.arena.get(ControlId(0));
        assert_eq!(label.kind, ControlKind::Label { auto_size: false });
        assert_eq!(label.caption.as_deref(), Some("Name"));
        assert_eq!(label.bounds, Rect::new(8, 10, 40, 16));
        assert_eq!(built.form.arena.get(ControlId(3)).kind, ControlKind::Tool);
    }

    #[test]
    fn bindings_are_registered() {
        let registry = ControlRegistry::standard();
        let mut service = DataPathTranslationService::default();
        let mut diagnostics = Vec::new();

        let built = FormBuilder::new(&registry).build("Contacts", &contact_form(), &mut service, &mut diagnostics);

        let kinds: Vec<_> = built.bindings.iter().map(|b| (b.control_name.as_str(), b.kind)).collect();
        assert_eq!(kinds, vec![("edName", BindingKind::Field), ("edAccount", BindingKind::Lookup)]);

        let contact = service.registry().find("contact").unwrap();
        let info = service.registry().get(contact);
        assert!(info.has_column("LASTNAME"));
        assert!(info.has_column("ACCOUNTID"));
        assert!(info.has_column("ACCOUNTNAME"));
        assert_eq!(info.secondary_joins().len(), 1);
        assert!(service.registry().find("ACCOUNT").is_some());
    }

    #[test]
    fn bad_path_becomes_diagnostic() {
        let registry = ControlRegistry::standard();
        let mut service = DataPathTranslationService::default();
        let mut diagnostics = Vec::new();
        let root = LegacyComponent::new("F", "TForm")
            .child(LegacyComponent::new("edBroken", "TEdit").with("DataPath", "NOSEPARATOR"));

        let built = FormBuilder::new(&registry).build("P", &root, &mut service, &mut diagnostics);

        assert!(built.bindings.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].subject, "edBroken");
        assert_eq!(diagnostics[0].plugin.as_deref(), Some("P"));
        assert!(service.registry().is_empty());
    }

    #[test]
    fn page_control_sheets_become_surfaces() {
        let registry = ControlRegistry::standard();
        let mut service = DataPathTranslationService::default();
        let mut diagnostics = Vec::new();
        let root = LegacyComponent::new("F", "TForm").child(
            LegacyComponent::new("Pages", "TPageControl")
                .at(0, 0, 300, 200)
                .child(
                    LegacyComponent::new("tsGeneral", "TTabSheet")
                        .child(LegacyComponent::new("edCity", "TEdit").at(8, 8, 100, 21)),
                )
                .child(LegacyComponent::new("tsNotes", "TTabSheet")),
        );

        let built = FormBuilder::new(&registry).build("P", &root, &mut service, &mut diagnostics);

        let pages = built.form.arena.get(ControlId(0));
        assert_eq!(pages.kind, ControlKind::Container);
        let names: Vec<_> = pages.surfaces.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["tsGeneral", "tsNotes"]);
        assert_eq!(pages.surfaces[0].children, vec![ControlId(1)]);
        assert!(pages.surfaces[1].children.is_empty());
        assert_eq!(built.form.root.children, vec![ControlId(0)]);
    }

    #[test]
    fn panel_children_share_one_surface() {
        let registry = ControlRegistry::standard();
        let mut service = DataPathTranslationService::default();
        let mut diagnostics = Vec::new();
        let root = LegacyComponent::new("F", "TForm").child(
            LegacyComponent::new("pnl", "TPanel")
                .child(LegacyComponent::new("a", "TEdit"))
                .child(LegacyComponent::new("b", "TCheckBox").with("Visible", false)),
        );

        let built = FormBuilder::new(&registry).build("P", &root, &mut service, &mut diagnostics);

        let panel = built.form.arena.get(ControlId(0));
        assert_eq!(panel.surfaces.len(), 1);
        assert_eq!(panel.surfaces[0].name, "pnl");
        assert_eq!(panel.surfaces[0].children, vec![ControlId(1), ControlId(2)]);
        assert!(!built.form.arena.get(ControlId(2)).visible);
    }

    #[test]
    fn columns_translate_relative_to_their_parent() {
        let registry = ControlRegistry::standard();
        let mut service = DataPathTranslationService::default();
        let mut diagnostics = Vec::new();
        let column = |name: &str, path: &str| LegacyComponent::new(name, "TColumn").with("DataPath", path);
        let root = LegacyComponent::new("F", "TForm")
            .child(
                LegacyComponent::new("grdContacts", "TDBGrid")
                    .with("DataPath", "ACCOUNT:ACCOUNTID=CONTACT.ACCOUNTID!LASTNAME")
                    .child(column("colName", "CONTACT:LASTNAME"))
                    .child(column("colCity", "CONTACT:ADDRESSID=ADDRESS.ADDRESSID!CITY"))
                    .child(column("colWrongRoot", "ACCOUNT:TYPE")),
            )
            .child(
                LegacyComponent::new("edAccount", "TLookupEdit")
                    .with("LookupPath", "CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT")
                    .child(column("colType", "ACCOUNT:TYPE")),
            );

        let mut built = FormBuilder::new(&registry).build("P", &root, &mut service, &mut diagnostics);

        // columns are bindings, not controls
        assert_eq!(built.form.arena.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].subject, "colWrongRoot");

        let schema = InMemorySchema::new()
            .with_table(TableSchema::new("ACCOUNT", "ACCOUNTID", &["ACCOUNT", "TYPE"]))
            .with_table(TableSchema::new(
                "CONTACT",
                "CONTACTID",
                &["ACCOUNTID", "ADDRESSID", "LASTNAME"],
            ))
            .with_table(TableSchema::new("ADDRESS", "ADDRESSID", &["CITY"]));
        assert!(service.persist(&schema).is_clean());

        built.translate_bindings(&service.translator(), &mut diagnostics);
        let translated: Vec<(&str, Option<&str>)> = built
            .bindings
            .iter()
            .map(|b| (b.control_name.as_str(), b.property.as_deref()))
            .collect();
        assert_eq!(
            translated,
            vec![
                ("grdContacts", Some("Contacts")),
                ("colName", Some("Lastname")),
                ("colCity", Some("Address.City")),
                ("edAccount", Some("Account")),
                ("colType", Some("Account.Type")),
            ]
        );
        assert_eq!(built.bindings[4].control, ControlId(1));
        assert_eq!(diagnostics.len(), 1);
    }
}
