//! Descriptions of documented symbols.
//!
//! A target is immutable once built. Its outgoing edges (namespace, containing
//! type, parameter types, ...) are references, resolved by id at render time.

use serde::{Deserialize, Serialize};

use crate::reference::{MemberReference, NamespaceReference, Parameter, SimpleTypeReference, TypeReference};

/// A constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorTarget {
    /// Shared member data.
    pub member: MemberTarget,
    /// Ordered constructor parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

/// An enumeration type and the names of its elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationTarget {
    /// Ordered element names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<String>,
    /// The enumeration as a type.
    pub type_target: TypeTarget,
}

/// An event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTarget {
    /// Shared procedure data.
    pub procedure: ProcedureTarget,
}

/// Data every member target carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTarget {
    /// The type that owns the member.
    pub containing_type: TypeReference,
    /// Globally unique member id.
    pub id: String,
    /// Member name as declared.
    pub name: String,
}

/// A method, including operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodTarget {
    /// Whether the method is an implicit or explicit conversion operator.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub conversion_operator: bool,
    /// Ordered method parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Shared procedure data.
    pub procedure: ProcedureTarget,
    /// Return type; absent for `void`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeReference>,
    /// Template arguments, when the method is a specialized generic instance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_args: Vec<TypeReference>,
    /// Ordered template-parameter names of a generic method.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<String>,
}

/// A namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceTarget {
    /// Namespace id, e.g. `N:System`.
    pub id: String,
    /// Namespace name; empty for the global namespace.
    pub name: String,
}

/// Data shared by methods, properties, and events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureTarget {
    /// The interface member this procedure explicitly implements, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicitly_implements: Option<MemberReference>,
    /// Shared member data.
    pub member: MemberTarget,
}

/// A property or indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTarget {
    /// Ordered index parameters; empty for plain properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Shared procedure data.
    pub procedure: ProcedureTarget,
    /// Property type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeReference>,
}

/// Any documented symbol. Closed set: the renderer matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Target {
    /// Constructor.
    Constructor(ConstructorTarget),
    /// Enumeration type.
    Enumeration(EnumerationTarget),
    /// Event.
    Event(EventTarget),
    /// Field, or any member without procedure data.
    Field(MemberTarget),
    /// Method.
    Method(MethodTarget),
    /// Namespace.
    Namespace(NamespaceTarget),
    /// Property or indexer.
    Property(PropertyTarget),
    /// Class, structure, interface, or delegate.
    Type(TypeTarget),
}

impl Target {
    /// The globally unique identifier of the target.
    pub fn id(&self) -> &str {
        return match self {
            Self::Namespace(namespace) => &namespace.id,
            Self::Enumeration(enumeration) => &enumeration.type_target.id,
            Self::Type(type_target) => &type_target.id,
            Self::Constructor(_) | Self::Event(_) | Self::Field(_) | Self::Method(_) | Self::Property(_) => {
                self.as_member().map_or("", |member| return member.id.as_str())
            },
        };
    }

    /// The member data, for member targets.
    pub const fn as_member(&self) -> Option<&MemberTarget> {
        return match self {
            Self::Constructor(constructor) => Some(&constructor.member),
            Self::Event(event) => Some(&event.procedure.member),
            Self::Field(member) => Some(member),
            Self::Method(method) => Some(&method.procedure.member),
            Self::Property(property) => Some(&property.procedure.member),
            Self::Enumeration(_) | Self::Namespace(_) | Self::Type(_) => None,
        };
    }

    /// The type data, for type and enumeration targets.
    pub const fn as_type(&self) -> Option<&TypeTarget> {
        return match self {
            Self::Enumeration(enumeration) => Some(&enumeration.type_target),
            Self::Type(type_target) => Some(type_target),
            Self::Constructor(_)
            | Self::Event(_)
            | Self::Field(_)
            | Self::Method(_)
            | Self::Namespace(_)
            | Self::Property(_) => None,
        };
    }

    /// The declared name of the target.
    pub fn name(&self) -> &str {
        if let Self::Namespace(namespace) = self {
            return &namespace.name;
        }
        if let Some(type_target) = self.as_type() {
            return &type_target.name;
        }
        return self.as_member().map_or("", |member| return member.name.as_str());
    }

    /// The variant tag of the target.
    pub const fn target_type(&self) -> TargetType {
        return match self {
            Self::Constructor(_) => TargetType::Constructor,
            Self::Enumeration(_) => TargetType::Enumeration,
            Self::Event(_) => TargetType::Event,
            Self::Field(_) => TargetType::Field,
            Self::Method(_) => TargetType::Method,
            Self::Namespace(_) => TargetType::Namespace,
            Self::Property(_) => TargetType::Property,
            Self::Type(_) => TargetType::Type,
        };
    }
}

/// Variant tag of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// Constructor.
    Constructor,
    /// Enumeration type.
    Enumeration,
    /// Event.
    Event,
    /// Field.
    Field,
    /// Method.
    Method,
    /// Namespace.
    Namespace,
    /// Property or indexer.
    Property,
    /// Other type.
    Type,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Constructor => "constructor",
            Self::Enumeration => "enumeration",
            Self::Event => "event",
            Self::Field => "field",
            Self::Method => "method",
            Self::Namespace => "namespace",
            Self::Property => "property",
            Self::Type => "type",
        };
        return f.write_str(label);
    }
}

/// A class, structure, interface, delegate, or (inside `EnumerationTarget`) enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTarget {
    /// Globally unique type id, e.g. ``T:System.Collections.Generic.List`1``.
    pub id: String,
    /// Type name without generic arity.
    pub name: String,
    /// The namespace containing the type.
    pub namespace: NamespaceReference,
    /// The enclosing type, for nested types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_type: Option<SimpleTypeReference>,
    /// Ordered template-parameter names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<String>,
}
