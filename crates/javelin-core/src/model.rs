//! Read-only program model consumed by the build pipeline.
//!
//! The model is produced by the upstream front end (bytecode reader); this
//! layer only queries it. Classes keep their declaration order, which matters
//! for subtarget resolution (last declaration wins) and deterministic name
//! assignment.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Fully-qualified dotted class name, e.g. `java.lang.String`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(fqname: impl Into<String>) -> Self {
        Self(fqname.into())
    }

    /// The full dotted name.
    pub fn fqname(&self) -> &str {
        &self.0
    }

    /// Package segments, excluding the simple name.
    pub fn package(&self) -> impl Iterator<Item = &str> {
        let count = self.0.split('.').count();
        self.0.split('.').take(count.saturating_sub(1))
    }

    /// The last segment of the dotted name.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A method with its erased JVM signature, e.g. `(II)V`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub signature: String,
    pub is_static: bool,
}

impl Method {
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            is_static: false,
        }
    }

    pub fn new_static(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::new(name, signature)
        }
    }
}

/// A field. Fields are not overloaded, so the name alone identifies one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub is_static: bool,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
        }
    }
}

/// A declared build variant: name, aliases, compiler switch, and the
/// interpreter used to run the produced artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtargetSpec {
    pub name: String,
    pub aliases: Vec<String>,
    pub cmd_switch: String,
    pub interpreter: String,
    pub interpreter_suffix: String,
}

impl SubtargetSpec {
    pub fn new(
        name: impl Into<String>,
        cmd_switch: impl Into<String>,
        interpreter: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            cmd_switch: cmd_switch.into(),
            interpreter: interpreter.into(),
            interpreter_suffix: String::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| (*a).to_string()).collect();
        self
    }

    pub fn with_interpreter_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.interpreter_suffix = suffix.into();
        self
    }
}

/// Declarative metadata attached to a class by the front end.
///
/// These mirror the source-level annotations the pipeline consumes; anything
/// the front end attaches beyond these kinds is invisible to this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    /// Declare one build variant.
    Subtarget(SubtargetSpec),
    /// Declare several build variants in one entry.
    Subtargets(Vec<SubtargetSpec>),
    /// Libraries required at build time, as `name@version` strings.
    Libraries(Vec<String>),
    /// Resource files to stage next to the build.
    Assets(Vec<String>),
    /// Resource files copied through the template renderer into the source
    /// tree before the toolchain runs.
    TemplateFiles(Vec<String>),
    /// Build command override, one template line per argument.
    CustomBuildCommand(Vec<String>),
}

/// A class in the program model.
#[derive(Debug, Clone)]
pub struct Class {
    pub name: ClassName,
    methods: Vec<Method>,
    fields: Vec<Field>,
    metadata: Vec<Metadata>,
}

impl Class {
    pub fn new(name: impl Into<ClassName>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            fields: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata.push(metadata);
        self
    }

    /// All methods, in declaration order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// All overloads sharing the given name, in declaration order.
    pub fn methods_by_name(&self, name: &str) -> Vec<&Method> {
        self.methods.iter().filter(|m| m.name == name).collect()
    }

    /// The single method with the given name and signature, if present.
    pub fn method(&self, name: &str, signature: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.signature == signature)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }
}

/// Logical resource store standing in for the front end's resources VFS.
///
/// Maps logical paths to file contents. Populated by the front end from the
/// input jar/classpath; read-only here.
#[derive(Debug, Default, Clone)]
pub struct ResourceStore {
    entries: FxHashMap<String, Vec<u8>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), content.into());
    }

    pub fn read(&self, path: &str) -> Result<&[u8]> {
        self.entries
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingResource(path.to_string()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }
}

/// The complete program model: ordered classes plus the resource store.
#[derive(Debug, Default)]
pub struct ProgramModel {
    classes: Vec<Class>,
    index: FxHashMap<String, usize>,
    resources: ResourceStore,
}

impl ProgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: Class) {
        self.index
            .insert(class.name.fqname().to_string(), self.classes.len());
        self.classes.push(class);
    }

    /// All classes in declaration order.
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Look up a class by fully-qualified name.
    pub fn class(&self, fqname: &str) -> Option<&Class> {
        self.index.get(fqname).map(|&i| &self.classes[i])
    }

    /// All metadata entries across all classes, in declaration order.
    pub fn all_metadata(&self) -> impl Iterator<Item = &Metadata> {
        self.classes.iter().flat_map(|c| c.metadata.iter())
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceStore {
        &mut self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_name_parts() {
        let name = ClassName::new("java.lang.String");
        assert_eq!(name.simple_name(), "String");
        assert_eq!(name.package().collect::<Vec<_>>(), vec!["java", "lang"]);

        let unpackaged = ClassName::new("Main");
        assert_eq!(unpackaged.simple_name(), "Main");
        assert_eq!(unpackaged.package().count(), 0);
    }

    #[test]
    fn methods_by_name_keeps_declaration_order() {
        let class = Class::new("app.Main")
            .with_method(Method::new("run", "(I)V"))
            .with_method(Method::new("run", "(II)V"))
            .with_method(Method::new("stop", "()V"));

        let overloads = class.methods_by_name("run");
        assert_eq!(overloads.len(), 2);
        assert_eq!(overloads[0].signature, "(I)V");
        assert_eq!(overloads[1].signature, "(II)V");
    }

    #[test]
    fn model_lookup_and_metadata_order() {
        let mut model = ProgramModel::new();
        model.add_class(
            Class::new("a.First").with_metadata(Metadata::Libraries(vec!["lime@7.0".into()])),
        );
        model.add_class(
            Class::new("a.Second").with_metadata(Metadata::Assets(vec!["logo.png".into()])),
        );

        assert!(model.class("a.First").is_some());
        assert!(model.class("a.Missing").is_none());

        let kinds: Vec<_> = model.all_metadata().collect();
        assert!(matches!(kinds[0], Metadata::Libraries(_)));
        assert!(matches!(kinds[1], Metadata::Assets(_)));
    }

    #[test]
    fn resource_store_read() {
        let mut store = ResourceStore::new();
        store.insert("assets/logo.png", b"png".to_vec());
        assert_eq!(store.read("assets/logo.png").unwrap(), b"png");
        assert!(matches!(
            store.read("missing"),
            Err(Error::MissingResource(_))
        ));
    }
}
