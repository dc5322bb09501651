//! Unresolved, typed pointers to targets.
//!
//! References never own the targets they point at. Every edge in the graph is an
//! identifier resolved through a `TargetCollection` at render time, so cyclic
//! generic signatures never form ownership cycles.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Mapping from a generic slot to the type substituted into it.
pub type Substitutions = FxHashMap<IndexedTemplateTypeReference, TypeReference>;

/// An array of `element_type` with the given rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayTypeReference {
    /// The array element type.
    pub element_type: Box<TypeReference>,
    /// Number of dimensions, at least 1.
    pub rank: u32,
}

/// A method reached through an extension-method import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionMethodReference {
    /// Method name as written at the call site.
    pub name: String,
    /// Ordered parameters, excluding the extended `this` parameter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Ordered template arguments of a specialized generic method.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_args: Vec<TypeReference>,
}

/// A generic parameter identified by its owner and position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexedTemplateTypeReference {
    /// Zero-based position in the owner's template-parameter list.
    pub index: u32,
    /// Id of the generic type or method that declares the parameter.
    pub template_id: String,
}

/// An identifier that could not be classified; rendered as a bracketed literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvalidReference {
    /// The original identifier text.
    pub id: String,
}

/// References to members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum MemberReference {
    /// Member looked up by exact id.
    Simple(SimpleMemberReference),
    /// Member of a generic type, seen through a specialization of that type.
    Specialized(SpecializedMemberReference),
    /// Member of a specialized type known only by name and parameter types.
    SpecializedWithParameters(SpecializedMemberWithParametersReference),
}

/// A generic parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodTemplateTypeReference {
    /// Zero-based position in the method's template-parameter list.
    pub position: u32,
    /// The generic method declaring the parameter.
    pub template_method: Box<MemberReference>,
}

/// A generic parameter whose name is known directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedTemplateTypeReference {
    /// The parameter name, e.g. `T`.
    pub name: String,
}

/// Reference to a namespace by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceReference {
    /// Namespace id, e.g. `N:System.Collections`.
    pub id: String,
}

/// A named, typed parameter of a method, constructor, or indexer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Declared parameter type.
    pub parameter_type: TypeReference,
}

/// An unmanaged pointer to `pointed_to_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerTypeReference {
    /// The pointee type.
    pub pointed_to_type: Box<TypeReference>,
}

/// Any reference. Reducible to a target through a store lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "ref", rename_all = "snake_case")]
pub enum Reference {
    /// Extension method reached through an import.
    ExtensionMethod(ExtensionMethodReference),
    /// Unclassifiable identifier.
    Invalid(InvalidReference),
    /// Member reference.
    Member(MemberReference),
    /// Namespace reference.
    Namespace(NamespaceReference),
    /// Type reference.
    Type(TypeReference),
}

/// A by-reference wrapper around `referred_to_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceTypeReference {
    /// The wrapped type.
    pub referred_to_type: Box<TypeReference>,
}

/// Member looked up by exact id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleMemberReference {
    /// Member id, e.g. `M:System.String.Trim`.
    pub id: String,
}

/// Type looked up by exact id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleTypeReference {
    /// Type id, e.g. `T:System.String`.
    pub id: String,
}

/// One link of a specialized type chain: a generic type and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specialization {
    /// Ordered type arguments substituted into the template's parameters.
    pub arguments: Vec<TypeReference>,
    /// The generic type definition.
    pub template_type: SimpleTypeReference,
}

/// Member of a generic type, seen through a specialization of that type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecializedMemberReference {
    /// The specialization the member is accessed through.
    pub specialized_type: SpecializedTypeReference,
    /// The member as declared on the generic definition.
    pub template_member: SimpleMemberReference,
}

/// Member of a specialized type identified by name and parameter types,
/// used when no exact id exists for the member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecializedMemberWithParametersReference {
    /// Member name.
    pub member_name: String,
    /// Ordered parameter types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter_types: Vec<TypeReference>,
    /// Id prefix of the member kind (`M`, `P`, `E`, `F`).
    pub prefix: String,
    /// The specialized containing type.
    pub specialized_type: SpecializedTypeReference,
}

/// A generic type with its arguments substituted, possibly through a nested
/// outer/inner chain (`Outer<A>.Inner<B>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecializedTypeReference {
    /// Ordered outermost-first specializations.
    pub specializations: Vec<Specialization>,
}

impl SpecializedTypeReference {
    /// Build the substitution dictionary mapping every generic slot in the
    /// chain to the argument that fills it.
    pub fn specialization_dictionary(&self) -> Substitutions {
        let mut dictionary = Substitutions::default();
        for specialization in &self.specializations {
            for (index, argument) in (0_u32..).zip(&specialization.arguments) {
                let slot = IndexedTemplateTypeReference {
                    index,
                    template_id: specialization.template_type.id.clone(),
                };
                dictionary.insert(slot, argument.clone());
            }
        }
        return dictionary;
    }
}

/// References to types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeReference {
    /// Array of an element type.
    Array(ArrayTypeReference),
    /// Generic parameter by owner and position.
    IndexedTemplate(IndexedTemplateTypeReference),
    /// Generic parameter of a method.
    MethodTemplate(MethodTemplateTypeReference),
    /// Generic parameter known by name.
    NamedTemplate(NamedTemplateTypeReference),
    /// Unmanaged pointer.
    Pointer(PointerTypeReference),
    /// By-reference wrapper.
    Reference(ReferenceTypeReference),
    /// Type by exact id.
    Simple(SimpleTypeReference),
    /// Specialized generic type.
    Specialized(SpecializedTypeReference),
    /// Generic parameter of a type, by position relative to that type.
    TypeTemplate(TypeTemplateTypeReference),
}

impl TypeReference {
    /// Shorthand for a simple type reference.
    pub fn simple(id: impl Into<String>) -> Self {
        return Self::Simple(SimpleTypeReference { id: id.into() });
    }
}

/// A generic parameter of a type, by position. The position is resolved
/// against `template_type` and, past its own parameters, its outer types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeTemplateTypeReference {
    /// Zero-based position of the parameter.
    pub position: u32,
    /// The generic type the position is relative to.
    pub template_type: SimpleTypeReference,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(argument: TypeReference) -> SpecializedTypeReference {
        SpecializedTypeReference {
            specializations: vec![Specialization {
                arguments: vec![argument],
                template_type: SimpleTypeReference { id: "T:Ns.List`1".to_string() },
            }],
        }
    }

    #[test]
    fn dictionary_maps_each_slot() {
        let dictionary = list_of(TypeReference::simple("T:System.String")).specialization_dictionary();
        let slot = IndexedTemplateTypeReference { index: 0, template_id: "T:Ns.List`1".to_string() };
        assert_eq!(dictionary.get(&slot), Some(&TypeReference::simple("T:System.String")));
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn dictionary_spans_nested_chain() {
        let chain = SpecializedTypeReference {
            specializations: vec![
                Specialization {
                    arguments: vec![TypeReference::simple("T:A"), TypeReference::simple("T:B")],
                    template_type: SimpleTypeReference { id: "T:Ns.Outer`2".to_string() },
                },
                Specialization {
                    arguments: vec![TypeReference::simple("T:C")],
                    template_type: SimpleTypeReference { id: "T:Ns.Outer`2.Inner`1".to_string() },
                },
            ],
        };
        let dictionary = chain.specialization_dictionary();
        assert_eq!(dictionary.len(), 3);
        let inner = IndexedTemplateTypeReference { index: 0, template_id: "T:Ns.Outer`2.Inner`1".to_string() };
        assert_eq!(dictionary.get(&inner), Some(&TypeReference::simple("T:C")));
    }
}
