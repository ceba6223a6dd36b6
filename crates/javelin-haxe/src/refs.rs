//! Symbolic program references inside build-script templates.
//!
//! Templates refer to program elements with colon-delimited descriptors
//! (`KIND:owner[:member[:signature]]`); the resolver translates them into the
//! exact Haxe symbol the rendered script must mention. Resolution failures
//! abort the render of that template; they are never silently defaulted.

use javelin_core::error::{Error, Result};
use javelin_core::model::{Class, ClassName, ProgramModel};
use javelin_core::template::TagHandler;

use crate::names::HaxeNames;

/// Static-initializer accessor appended to the owner's qualified name.
const STATIC_INIT_SUFFIX: &str = ".SI()";

/// The kind of program element a descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    StaticInit,
    Constructor,
    StaticMethod,
    InstanceMethod,
    StaticField,
    InstanceField,
    ClassRef,
}

impl RefKind {
    /// Wire tokens, also used as template-tag aliases.
    pub const TOKENS: &'static [&'static str] = &[
        "SINIT",
        "CONSTRUCTOR",
        "SMETHOD",
        "METHOD",
        "SFIELD",
        "FIELD",
        "CLASS",
    ];

    /// Parse a kind token, case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "SINIT" => Some(Self::StaticInit),
            "CONSTRUCTOR" => Some(Self::Constructor),
            "SMETHOD" => Some(Self::StaticMethod),
            "METHOD" => Some(Self::InstanceMethod),
            "SFIELD" => Some(Self::StaticField),
            "FIELD" => Some(Self::InstanceField),
            "CLASS" => Some(Self::ClassRef),
            _ => None,
        }
    }
}

/// A parsed reference descriptor. Transient: exists only while a template is
/// being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDescriptor {
    pub kind: RefKind,
    pub owner: ClassName,
    pub member: Option<String>,
    pub signature: Option<String>,
}

impl ReferenceDescriptor {
    /// Parse a descriptor from its kind token and colon-delimited payload,
    /// validating the payload arity for the kind.
    pub fn parse(kind_token: &str, payload: &str) -> Result<Self> {
        let full = || format!("{kind_token}:{payload}");

        let Some(kind) = RefKind::parse(kind_token) else {
            return Err(Error::MalformedDescriptor(format!(
                "unknown kind '{kind_token}' in '{}'",
                full()
            )));
        };

        let parts: Vec<&str> = payload.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::MalformedDescriptor(full()));
        }

        let descriptor = match (kind, parts.as_slice()) {
            (RefKind::ClassRef | RefKind::StaticInit, [owner]) => Self {
                kind,
                owner: ClassName::new(*owner),
                member: None,
                signature: None,
            },
            // Constructors always carry an explicit signature; there is no
            // ambiguity-fallback path for them.
            (RefKind::Constructor, [owner, signature]) => Self {
                kind,
                owner: ClassName::new(*owner),
                member: None,
                signature: Some((*signature).to_string()),
            },
            (RefKind::StaticMethod | RefKind::InstanceMethod, [owner, member]) => Self {
                kind,
                owner: ClassName::new(*owner),
                member: Some((*member).to_string()),
                signature: None,
            },
            (RefKind::StaticMethod | RefKind::InstanceMethod, [owner, member, signature]) => {
                Self {
                    kind,
                    owner: ClassName::new(*owner),
                    member: Some((*member).to_string()),
                    signature: Some((*signature).to_string()),
                }
            }
            (RefKind::StaticField | RefKind::InstanceField, [owner, member]) => Self {
                kind,
                owner: ClassName::new(*owner),
                member: Some((*member).to_string()),
                signature: None,
            },
            _ => return Err(Error::MalformedDescriptor(full())),
        };

        Ok(descriptor)
    }
}

/// Resolves descriptors against the program model.
pub struct Resolver<'a> {
    model: &'a ProgramModel,
    names: &'a HaxeNames,
}

impl<'a> Resolver<'a> {
    pub fn new(model: &'a ProgramModel, names: &'a HaxeNames) -> Self {
        Self { model, names }
    }

    /// Translate a descriptor into the fully-qualified Haxe symbol name.
    pub fn resolve(&self, descriptor: &ReferenceDescriptor) -> Result<String> {
        let owner = &descriptor.owner;
        let class = self
            .model
            .class(owner.fqname())
            .ok_or_else(|| Error::UnknownClass(owner.fqname().to_string()))?;
        let class_fq = self.names.class_fq_name(owner);

        match descriptor.kind {
            RefKind::ClassRef => Ok(class_fq),
            RefKind::StaticInit => Ok(format!("{class_fq}{STATIC_INIT_SUFFIX}")),
            RefKind::Constructor => {
                let signature = descriptor.signature.as_deref().unwrap_or_default();
                let accessor = self.method_accessor(class, "<init>", Some(signature))?;
                Ok(format!("new {class_fq}().{accessor}"))
            }
            RefKind::StaticMethod | RefKind::InstanceMethod => {
                let member = descriptor.member.as_deref().unwrap_or_default();
                let accessor =
                    self.method_accessor(class, member, descriptor.signature.as_deref())?;
                if descriptor.kind == RefKind::StaticMethod {
                    Ok(format!("{class_fq}.{accessor}"))
                } else {
                    Ok(accessor)
                }
            }
            RefKind::StaticField | RefKind::InstanceField => {
                let member = descriptor.member.as_deref().unwrap_or_default();
                let field = class.field(member).ok_or_else(|| Error::UnknownMember {
                    class: owner.fqname().to_string(),
                    member: member.to_string(),
                })?;
                let accessor = self
                    .names
                    .field_accessor(owner, &field.name)
                    .unwrap_or(&field.name);
                if descriptor.kind == RefKind::StaticField {
                    Ok(format!("{class_fq}.{accessor}"))
                } else {
                    Ok(accessor.to_string())
                }
            }
        }
    }

    /// Resolve a method accessor: exact overload when a signature is given,
    /// otherwise only if the name is unambiguous on the class.
    fn method_accessor(
        &self,
        class: &Class,
        member: &str,
        signature: Option<&str>,
    ) -> Result<String> {
        let unknown = || Error::UnknownMember {
            class: class.name.fqname().to_string(),
            member: member.to_string(),
        };

        let signature = match signature {
            Some(signature) => {
                class.method(member, signature).ok_or_else(unknown)?;
                signature.to_string()
            }
            None => {
                let overloads = class.methods_by_name(member);
                match overloads.as_slice() {
                    [] => return Err(unknown()),
                    [only] => only.signature.clone(),
                    _ => {
                        return Err(Error::AmbiguousMember {
                            class: class.name.fqname().to_string(),
                            member: member.to_string(),
                        });
                    }
                }
            }
        };

        self.names
            .method_accessor(&class.name, member, &signature)
            .map(str::to_string)
            .ok_or_else(unknown)
    }
}

/// Template tag resolving `:programref:` descriptors in place.
///
/// The resolved symbol is written directly into the output stream; the tag
/// has no value usable elsewhere in the template.
pub struct ProgramRefTag<'a> {
    resolver: Resolver<'a>,
}

impl<'a> ProgramRefTag<'a> {
    pub fn new(model: &'a ProgramModel, names: &'a HaxeNames) -> Self {
        Self {
            resolver: Resolver::new(model, names),
        }
    }
}

impl TagHandler for ProgramRefTag<'_> {
    fn token(&self) -> &str {
        ":programref:"
    }

    fn aliases(&self) -> &[&'static str] {
        RefKind::TOKENS
    }

    fn render(&self, kind: &str, payload: &str, out: &mut String) -> Result<()> {
        let descriptor = ReferenceDescriptor::parse(kind, payload)?;
        out.push_str(&self.resolver.resolve(&descriptor)?);
        Ok(())
    }
}
