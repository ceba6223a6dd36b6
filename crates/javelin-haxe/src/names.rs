//! Mapping from program-model elements to Haxe symbol names.
//!
//! All assignments are computed once from the model in declaration order, so
//! resolution is deterministic: the same model always yields the same names.

use javelin_core::model::{ClassName, ProgramModel};
use rustc_hash::FxHashMap;

/// Haxe reserved words that must not appear verbatim as identifiers.
const RESERVED: &[&str] = &[
    "break", "callback", "case", "cast", "catch", "class", "continue", "default", "do", "dynamic",
    "else", "enum", "extends", "extern", "false", "for", "function", "if", "implements", "import",
    "in", "inline", "interface", "never", "new", "null", "override", "package", "private",
    "public", "return", "static", "super", "switch", "this", "throw", "true", "try", "typedef",
    "untyped", "using", "var", "while",
];

/// Deterministic symbol naming for one program model.
pub struct HaxeNames {
    methods: FxHashMap<(String, String, String), String>,
    fields: FxHashMap<(String, String), String>,
}

impl HaxeNames {
    /// Precompute member accessors for every class in the model.
    ///
    /// With `minimize`, member accessors become short generated names
    /// assigned in declaration order; class names are never minimized since
    /// build scripts and the entry point reference them.
    pub fn new(model: &ProgramModel, minimize: bool) -> Self {
        let mut methods = FxHashMap::default();
        let mut fields = FxHashMap::default();

        for class in model.classes() {
            let owner = class.name.fqname().to_string();

            for (index, method) in class.methods().iter().enumerate() {
                let accessor = if minimize {
                    format!("m{index}")
                } else {
                    let escaped = escape_member(&method.name);
                    if class.methods_by_name(&method.name).len() > 1 {
                        format!("{}_{}", escaped, mangle_signature(&method.signature))
                    } else {
                        escaped
                    }
                };
                methods.insert(
                    (owner.clone(), method.name.clone(), method.signature.clone()),
                    accessor,
                );
            }

            for (index, field) in class.fields().iter().enumerate() {
                let accessor = if minimize {
                    format!("f{index}")
                } else {
                    escape_member(&field.name)
                };
                fields.insert((owner.clone(), field.name.clone()), accessor);
            }
        }

        Self { methods, fields }
    }

    /// Fully-qualified Haxe name for a class: reserved-word-escaped package
    /// segments plus the capitalized simple name.
    pub fn class_fq_name(&self, name: &ClassName) -> String {
        let mut out = String::new();
        for segment in name.package() {
            out.push_str(&escape_segment(segment));
            out.push('.');
        }
        out.push_str(&capitalize(&escape_segment(name.simple_name())));
        out
    }

    /// Accessor name for a method identified by owner, name and signature.
    pub fn method_accessor(&self, owner: &ClassName, name: &str, signature: &str) -> Option<&str> {
        self.methods
            .get(&(
                owner.fqname().to_string(),
                name.to_string(),
                signature.to_string(),
            ))
            .map(String::as_str)
    }

    /// Accessor name for a field.
    pub fn field_accessor(&self, owner: &ClassName, name: &str) -> Option<&str> {
        self.fields
            .get(&(owner.fqname().to_string(), name.to_string()))
            .map(String::as_str)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_segment(segment: &str) -> String {
    if RESERVED.contains(&segment) {
        format!("{segment}_")
    } else {
        segment.to_string()
    }
}

/// Escape a member name into a valid Haxe identifier. The JVM's special
/// names `<init>`/`<clinit>` get fixed spellings.
fn escape_member(name: &str) -> String {
    match name {
        "<init>" => "init".to_string(),
        "<clinit>" => "clinit".to_string(),
        _ => {
            let cleaned: String = name
                .chars()
                .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
                .collect();
            escape_segment(&cleaned)
        }
    }
}

/// Flatten an erased signature into identifier characters: `(II)V` → `_II_V`.
fn mangle_signature(signature: &str) -> String {
    signature
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
