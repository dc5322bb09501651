//! Multi-syntax signature rendering.
//!
//! The renderer walks a target or reference, resolving ids through a
//! [`TargetCollection`], and writes the signature text into a [`MarkupSink`].
//! Every punctuation point where the configured profiles disagree becomes a
//! `languageSpecificText` wrapper holding one alternative per profile; text
//! every profile shares is written once.

pub mod markup;
pub mod syntax;

use std::ops::BitOr;

use crate::collection::TargetCollection;
use crate::error::Error;
use crate::reference::{
    ExtensionMethodReference, IndexedTemplateTypeReference, MemberReference, NamespaceReference, Reference,
    SimpleMemberReference, SimpleTypeReference, Specialization, SpecializedTypeReference, Substitutions,
    TypeReference,
};
use crate::target::{MethodTarget, ProcedureTarget, Target, TypeTarget};

pub use markup::{LANGUAGE_SPECIFIC_TEXT, MarkupSink, ProfileText, XmlMarkup};
pub use syntax::SyntaxProfile;

/// Deepest id-resolution chain followed before falling back to the raw id.
/// Only cyclic outer-type or explicit-implementation data gets this deep.
const MAX_DEPTH: usize = 64;

/// Placeholder for a template name that cannot be looked up.
pub const UNRESOLVED_TEMPLATE: &str = "UTT";

/// Bit-set of rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayOptions(u8);

impl DisplayOptions {
    /// Template lists and parameter lists, no container.
    pub const DEFAULT: Self = Self(0b110);
    /// Nothing but names.
    pub const NONE: Self = Self(0);
    /// Prefix with the owning namespace or type.
    pub const SHOW_CONTAINER: Self = Self(0b001);
    /// Render method and indexer parameter lists.
    pub const SHOW_PARAMETERS: Self = Self(0b100);
    /// Render template-parameter and template-argument lists.
    pub const SHOW_TEMPLATES: Self = Self(0b010);

    /// Whether every option in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        return self.0 & other.0 == other.0;
    }

    /// These options with everything in `other` cleared.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        return Self(self.0 & !other.0);
    }
}

impl BitOr for DisplayOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        return Self(self.0 | rhs.0);
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        return Self::DEFAULT;
    }
}

/// Writes signatures of targets and references for a set of syntax profiles.
pub struct Renderer<'c> {
    /// Where ids are resolved.
    collection: &'c TargetCollection,
    /// Profiles emitted, in output order.
    profiles: Vec<SyntaxProfile>,
}

impl<'c> Renderer<'c> {
    /// Write the name of a constructor, method, property, event, or field,
    /// with the container prefix when requested.
    fn member_target(
        &self,
        target: &Target,
        options: DisplayOptions,
        sink: &mut dyn MarkupSink,
        substitutions: Option<&Substitutions>,
        depth: usize,
    ) -> Result<(), Error> {
        let Some(member) = target.as_member() else {
            return Err(Error::InvalidOperation {
                reason: format!("`{}` is not a member target", target.id()),
            });
        };
        let conversion = match target {
            Target::Method(method) => conversion_operands(method),
            _ => None,
        };

        if options.contains(DisplayOptions::SHOW_CONTAINER) {
            let container_options = options.without(DisplayOptions::SHOW_CONTAINER);
            self.type_reference(&member.containing_type, container_options, sink, None, depth)?;
            if conversion.is_some() {
                sink.text(" ")?;
            } else {
                self.separator(sink)?;
            }
        }

        return match target {
            Target::Constructor(constructor) => {
                let name_options = options.without(DisplayOptions::SHOW_CONTAINER);
                self.type_reference(&member.containing_type, name_options, sink, None, depth)?;
                if options.contains(DisplayOptions::SHOW_PARAMETERS) {
                    let types = constructor.parameters.iter().map(|parameter| return &parameter.parameter_type);
                    self.parameter_list(types, sink, substitutions, depth)?;
                }
                Ok(())
            },
            Target::Event(event) => self.procedure_name(&event.procedure, sink, depth),
            Target::Method(method) => self.method(method, conversion, options, sink, substitutions, depth),
            Target::Property(property) => {
                self.procedure_name(&property.procedure, sink, depth)?;
                if options.contains(DisplayOptions::SHOW_PARAMETERS) && !property.parameters.is_empty() {
                    self.punctuate(sink, |profile| return profile.indexer_open.to_string())?;
                    let types = property.parameters.iter().map(|parameter| return &parameter.parameter_type);
                    self.type_list(types, sink, substitutions, depth)?;
                    self.punctuate(sink, |profile| return profile.indexer_close.to_string())?;
                }
                Ok(())
            },
            Target::Enumeration(_) | Target::Field(_) | Target::Namespace(_) | Target::Type(_) => {
                sink.text(&member.name)
            },
        };
    }

    /// Write a member reference.
    fn member_reference(
        &self,
        reference: &MemberReference,
        options: DisplayOptions,
        sink: &mut dyn MarkupSink,
        substitutions: Option<&Substitutions>,
        depth: usize,
    ) -> Result<(), Error> {
        match reference {
            MemberReference::Simple(simple) => {
                return self.simple_member(simple, options, sink, substitutions, depth);
            },
            MemberReference::Specialized(specialized) => {
                if options.contains(DisplayOptions::SHOW_CONTAINER) {
                    let container_options = options.without(DisplayOptions::SHOW_CONTAINER);
                    self.specialized_type(&specialized.specialized_type, container_options, sink, depth)?;
                    self.separator(sink)?;
                }
                let dictionary = specialized.specialized_type.specialization_dictionary();
                let member_options = options.without(DisplayOptions::SHOW_CONTAINER);
                return self.simple_member(&specialized.template_member, member_options, sink, Some(&dictionary), depth);
            },
            MemberReference::SpecializedWithParameters(by_name) => {
                if options.contains(DisplayOptions::SHOW_CONTAINER) {
                    let container_options = options.without(DisplayOptions::SHOW_CONTAINER);
                    self.specialized_type(&by_name.specialized_type, container_options, sink, depth)?;
                    self.separator(sink)?;
                }
                sink.text(&by_name.member_name)?;
                if options.contains(DisplayOptions::SHOW_PARAMETERS) {
                    let dictionary = by_name.specialized_type.specialization_dictionary();
                    self.parameter_list(by_name.parameter_types.iter(), sink, Some(&dictionary), depth)?;
                }
                return Ok(());
            },
        }
    }

    /// Write a method: conversion operands, or name, templates, and parameters.
    fn method(
        &self,
        method: &MethodTarget,
        conversion: Option<(&TypeReference, &TypeReference)>,
        options: DisplayOptions,
        sink: &mut dyn MarkupSink,
        substitutions: Option<&Substitutions>,
        depth: usize,
    ) -> Result<(), Error> {
        if let Some((source, result)) = conversion {
            self.type_reference(source, DisplayOptions::DEFAULT, sink, substitutions, depth)?;
            sink.text(" to ")?;
            return self.type_reference(result, DisplayOptions::DEFAULT, sink, substitutions, depth);
        }

        self.procedure_name(&method.procedure, sink, depth)?;
        if options.contains(DisplayOptions::SHOW_TEMPLATES) {
            if method.template_args.is_empty() {
                self.template_names(&method.templates, sink)?;
            } else {
                self.template_arguments(&method.template_args, sink, depth)?;
            }
        }
        if options.contains(DisplayOptions::SHOW_PARAMETERS) {
            let types = method.parameters.iter().map(|parameter| return &parameter.parameter_type);
            self.parameter_list(types, sink, substitutions, depth)?;
        }
        return Ok(());
    }

    /// Name of template slot `position` of a generic method.
    fn method_template_name(&self, method: &MemberReference, position: u32) -> String {
        let id = match method {
            MemberReference::Simple(simple) => &simple.id,
            MemberReference::Specialized(specialized) => &specialized.template_member.id,
            MemberReference::SpecializedWithParameters(_) => return UNRESOLVED_TEMPLATE.to_string(),
        };
        let target = self.collection.get(id);
        let templates = match target.as_deref() {
            Some(Target::Method(method)) => &method.templates,
            _ => return UNRESOLVED_TEMPLATE.to_string(),
        };
        return nth_name(templates, position);
    }

    /// Write a namespace name.
    fn namespace(&self, namespace: &NamespaceReference, sink: &mut dyn MarkupSink) -> Result<(), Error> {
        return match self.collection.get(&namespace.id).as_deref() {
            Some(Target::Namespace(target)) => sink.text(&target.name),
            _ => unresolved(&namespace.id, sink),
        };
    }

    /// Whether `namespace` is the global namespace, which never prefixes a type.
    fn is_global_namespace(&self, namespace: &NamespaceReference) -> bool {
        if namespace.id.is_empty() || namespace.id == "N:" {
            return true;
        }
        return matches!(
            self.collection.get(&namespace.id).as_deref(),
            Some(Target::Namespace(target)) if target.name.is_empty()
        );
    }

    /// Create a renderer emitting `profiles` in the given order.
    pub const fn new(collection: &'c TargetCollection, profiles: Vec<SyntaxProfile>) -> Self {
        return Self { collection, profiles };
    }

    /// Write a parenthesized parameter-type list, or the empty-list convention
    /// of each profile when there are no parameters.
    fn parameter_list<'t>(
        &self,
        types: impl IntoIterator<Item = &'t TypeReference>,
        sink: &mut dyn MarkupSink,
        substitutions: Option<&Substitutions>,
        depth: usize,
    ) -> Result<(), Error> {
        let mut types = types.into_iter().peekable();
        if types.peek().is_none() {
            return self.punctuate(sink, |profile| return profile.empty_parameters.to_string());
        }
        sink.text("(")?;
        self.type_list(types, sink, substitutions, depth)?;
        return sink.text(")");
    }

    /// Write the name of a method, property, or event; an explicit interface
    /// implementation is written as the interface member it implements.
    fn procedure_name(&self, procedure: &ProcedureTarget, sink: &mut dyn MarkupSink, depth: usize) -> Result<(), Error> {
        return match &procedure.explicitly_implements {
            Some(implemented) => {
                self.member_reference(implemented, DisplayOptions::SHOW_CONTAINER, sink, None, depth)
            },
            None => sink.text(&procedure.member.name),
        };
    }

    /// The configured profiles.
    pub fn profiles(&self) -> &[SyntaxProfile] {
        return &self.profiles;
    }

    /// Write one punctuation point. Text every profile agrees on is written
    /// plainly; otherwise each non-empty alternative is wrapped in a span
    /// tagged with its profile's class.
    fn punctuate(&self, sink: &mut dyn MarkupSink, token: impl Fn(&SyntaxProfile) -> String) -> Result<(), Error> {
        let alternatives: Vec<(&str, String)> = self
            .profiles
            .iter()
            .map(|profile| return (profile.class, token(profile)))
            .collect();
        let Some((_, first)) = alternatives.first() else {
            return Ok(());
        };
        if alternatives.iter().all(|(_, text)| return text == first) {
            if first.is_empty() {
                return Ok(());
            }
            return sink.text(first);
        }

        sink.start_element("span", &[("class", LANGUAGE_SPECIFIC_TEXT)])?;
        for (class, text) in alternatives.iter().filter(|(_, text)| return !text.is_empty()) {
            sink.start_element("span", &[("class", *class)])?;
            sink.text(text)?;
            sink.end_element()?;
        }
        return sink.end_element();
    }

    /// Write the member-access separator.
    fn separator(&self, sink: &mut dyn MarkupSink) -> Result<(), Error> {
        return self.punctuate(sink, |profile| return profile.separator.to_string());
    }

    /// Resolve and write a simple member reference.
    fn simple_member(
        &self,
        reference: &SimpleMemberReference,
        options: DisplayOptions,
        sink: &mut dyn MarkupSink,
        substitutions: Option<&Substitutions>,
        depth: usize,
    ) -> Result<(), Error> {
        if depth >= MAX_DEPTH {
            return too_deep(&reference.id, sink);
        }
        let target = self.collection.get(&reference.id);
        return match target.as_deref() {
            Some(member) if member.as_member().is_some() => {
                self.member_target(member, options, sink, substitutions, depth.saturating_add(1))
            },
            _ => unresolved(&reference.id, sink),
        };
    }

    /// Resolve and write a simple type reference.
    fn simple_type(
        &self,
        reference: &SimpleTypeReference,
        options: DisplayOptions,
        show_outer: bool,
        sink: &mut dyn MarkupSink,
        depth: usize,
    ) -> Result<(), Error> {
        if depth >= MAX_DEPTH {
            return too_deep(&reference.id, sink);
        }
        let target = self.collection.get(&reference.id);
        return match target.as_deref().and_then(Target::as_type) {
            Some(type_target) => self.type_target(type_target, options, show_outer, sink, depth.saturating_add(1)),
            None => unresolved(&reference.id, sink),
        };
    }

    /// Write one specialization: the generic type without its template names,
    /// then its arguments. Outer types are written only for the first link,
    /// since later links follow their outer link in the chain.
    fn specialization(
        &self,
        specialization: &Specialization,
        options: DisplayOptions,
        show_outer: bool,
        sink: &mut dyn MarkupSink,
        depth: usize,
    ) -> Result<(), Error> {
        let type_options = options.without(DisplayOptions::SHOW_TEMPLATES);
        self.simple_type(&specialization.template_type, type_options, show_outer, sink, depth)?;
        return self.template_arguments(&specialization.arguments, sink, depth);
    }

    /// Write a specialization chain, outermost first.
    fn specialized_type(
        &self,
        reference: &SpecializedTypeReference,
        options: DisplayOptions,
        sink: &mut dyn MarkupSink,
        depth: usize,
    ) -> Result<(), Error> {
        let Some((first, rest)) = reference.specializations.split_first() else {
            return Err(Error::InvalidOperation {
                reason: "specialized type reference without specializations".to_string(),
            });
        };
        self.specialization(first, options, true, sink, depth)?;
        let rest_options = options.without(DisplayOptions::SHOW_CONTAINER);
        for specialization in rest {
            self.separator(sink)?;
            self.specialization(specialization, rest_options, false, sink, depth)?;
        }
        return Ok(());
    }

    /// Write a list of type arguments between template brackets.
    fn template_arguments(&self, arguments: &[TypeReference], sink: &mut dyn MarkupSink, depth: usize) -> Result<(), Error> {
        if arguments.is_empty() {
            return Ok(());
        }
        self.punctuate(sink, |profile| return profile.template_open.to_string())?;
        self.type_list(arguments, sink, None, depth)?;
        return self.punctuate(sink, |profile| return profile.template_close.to_string());
    }

    /// Name of template slot `index` of the generic type or method `template_id`.
    fn template_name(&self, template_id: &str, index: u32) -> String {
        let target = self.collection.get(template_id);
        return match target.as_deref() {
            Some(Target::Method(method)) => nth_name(&method.templates, index),
            Some(other) => other
                .as_type()
                .map_or_else(|| return UNRESOLVED_TEMPLATE.to_string(), |t| return nth_name(&t.templates, index)),
            None => UNRESOLVED_TEMPLATE.to_string(),
        };
    }

    /// Write a list of template-parameter names between template brackets.
    fn template_names(&self, names: &[String], sink: &mut dyn MarkupSink) -> Result<(), Error> {
        if names.is_empty() {
            return Ok(());
        }
        self.punctuate(sink, |profile| return profile.template_open.to_string())?;
        sink.text(&names.join(", "))?;
        return self.punctuate(sink, |profile| return profile.template_close.to_string());
    }

    /// Write comma-separated types, each with default options.
    fn type_list<'t>(
        &self,
        types: impl IntoIterator<Item = &'t TypeReference>,
        sink: &mut dyn MarkupSink,
        substitutions: Option<&Substitutions>,
        depth: usize,
    ) -> Result<(), Error> {
        for (position, type_reference) in types.into_iter().enumerate() {
            if position > 0 {
                sink.text(", ")?;
            }
            self.type_reference(type_reference, DisplayOptions::DEFAULT, sink, substitutions, depth)?;
        }
        return Ok(());
    }

    /// Write any type reference. A template slot found in `substitutions` is
    /// replaced by its argument, which is itself written without substitutions.
    fn type_reference(
        &self,
        reference: &TypeReference,
        options: DisplayOptions,
        sink: &mut dyn MarkupSink,
        substitutions: Option<&Substitutions>,
        depth: usize,
    ) -> Result<(), Error> {
        match reference {
            TypeReference::Array(array) => {
                self.punctuate(sink, |profile| return profile.array_prefix().to_string())?;
                self.type_reference(&array.element_type, options, sink, substitutions, depth)?;
                return self.punctuate(sink, |profile| return profile.array_suffix(array.rank));
            },
            TypeReference::IndexedTemplate(template) => {
                return match substitutions.and_then(|dictionary| return dictionary.get(template)) {
                    Some(argument) => self.type_reference(argument, options, sink, None, depth),
                    None => sink.text(&self.template_name(&template.template_id, template.index)),
                };
            },
            TypeReference::MethodTemplate(template) => {
                return sink.text(&self.method_template_name(&template.template_method, template.position));
            },
            TypeReference::NamedTemplate(template) => return sink.text(&template.name),
            TypeReference::Pointer(pointer) => {
                self.type_reference(&pointer.pointed_to_type, options, sink, substitutions, depth)?;
                return sink.text("*");
            },
            TypeReference::Reference(by_ref) => {
                self.punctuate(sink, |profile| return profile.by_ref_prefix().to_string())?;
                self.type_reference(&by_ref.referred_to_type, options, sink, substitutions, depth)?;
                return self.punctuate(sink, |profile| return profile.by_ref_suffix().to_string());
            },
            TypeReference::Simple(simple) => return self.simple_type(simple, options, true, sink, depth),
            TypeReference::Specialized(specialized) => return self.specialized_type(specialized, options, sink, depth),
            TypeReference::TypeTemplate(template) => {
                let slot = IndexedTemplateTypeReference {
                    index: template.position,
                    template_id: template.template_type.id.clone(),
                };
                return match substitutions.and_then(|dictionary| return dictionary.get(&slot)) {
                    Some(argument) => self.type_reference(argument, options, sink, None, depth),
                    None => sink.text(&self.type_template_name(&template.template_type, template.position)),
                };
            },
        }
    }

    /// Write a type target: namespace, outer type, name, template names.
    fn type_target(
        &self,
        target: &TypeTarget,
        options: DisplayOptions,
        show_outer: bool,
        sink: &mut dyn MarkupSink,
        depth: usize,
    ) -> Result<(), Error> {
        if options.contains(DisplayOptions::SHOW_CONTAINER) && !self.is_global_namespace(&target.namespace) {
            self.namespace(&target.namespace, sink)?;
            self.separator(sink)?;
        }
        if show_outer && let Some(outer) = &target.outer_type {
            self.simple_type(outer, DisplayOptions::DEFAULT, true, sink, depth)?;
            self.separator(sink)?;
        }
        sink.text(&target.name)?;
        if options.contains(DisplayOptions::SHOW_TEMPLATES) {
            self.template_names(&target.templates, sink)?;
        }
        return Ok(());
    }

    /// Name of template slot `position` of a type, counting into enclosing
    /// types when the type itself declares fewer templates.
    fn type_template_name(&self, template_type: &SimpleTypeReference, position: u32) -> String {
        let mut current = template_type.id.clone();
        for _ in 0..MAX_DEPTH {
            let target = self.collection.get(&current);
            let Some(type_target) = target.as_deref().and_then(Target::as_type) else {
                break;
            };
            let slot = usize::try_from(position).ok();
            if let Some(name) = slot.and_then(|slot| return type_target.templates.get(slot)) {
                return name.clone();
            }
            let Some(outer) = &type_target.outer_type else {
                break;
            };
            current.clone_from(&outer.id);
        }
        return UNRESOLVED_TEMPLATE.to_string();
    }

    /// Render an extension method: name, template arguments, parameters.
    fn extension_method(
        &self,
        method: &ExtensionMethodReference,
        options: DisplayOptions,
        sink: &mut dyn MarkupSink,
    ) -> Result<(), Error> {
        sink.text(&method.name)?;
        if options.contains(DisplayOptions::SHOW_TEMPLATES) {
            self.template_arguments(&method.template_args, sink, 0)?;
        }
        if options.contains(DisplayOptions::SHOW_PARAMETERS) {
            let types = method.parameters.iter().map(|parameter| return &parameter.parameter_type);
            self.parameter_list(types, sink, None, 0)?;
        }
        return Ok(());
    }

    /// Write the signature of `reference`. Ids that resolve to no target are
    /// written verbatim; an invalid reference is written as `[id]`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperation` for impossible reference shapes, or
    /// `Error::Markup` if the sink rejects a write.
    pub fn write_reference(
        &self,
        reference: &Reference,
        options: DisplayOptions,
        sink: &mut dyn MarkupSink,
    ) -> Result<(), Error> {
        return match reference {
            Reference::ExtensionMethod(method) => self.extension_method(method, options, sink),
            Reference::Invalid(invalid) => sink.text(&format!("[{}]", invalid.id)),
            Reference::Member(member) => self.member_reference(member, options, sink, None, 0),
            Reference::Namespace(namespace) => self.namespace(namespace, sink),
            Reference::Type(type_reference) => self.type_reference(type_reference, options, sink, None, 0),
        };
    }

    /// Write the signature of `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperation` for impossible reference shapes inside
    /// the target, or `Error::Markup` if the sink rejects a write.
    pub fn write_target(&self, target: &Target, options: DisplayOptions, sink: &mut dyn MarkupSink) -> Result<(), Error> {
        if let Target::Namespace(namespace) = target {
            return sink.text(&namespace.name);
        }
        if let Some(type_target) = target.as_type() {
            return self.type_target(type_target, options, true, sink, 0);
        }
        return self.member_target(target, options, sink, None, 0);
    }
}

/// Source and result types of a conversion operator, when both are known.
fn conversion_operands(method: &MethodTarget) -> Option<(&TypeReference, &TypeReference)> {
    if !method.conversion_operator {
        return None;
    }
    let source = &method.parameters.first()?.parameter_type;
    let result = method.return_type.as_ref()?;
    return Some((source, result));
}

/// Template name at `position`, or the placeholder when out of range.
fn nth_name(templates: &[String], position: u32) -> String {
    return usize::try_from(position)
        .ok()
        .and_then(|slot| return templates.get(slot))
        .map_or_else(|| return UNRESOLVED_TEMPLATE.to_string(), Clone::clone);
}

/// Fallback once the resolution chain is too deep to be anything but a cycle.
fn too_deep(id: &str, sink: &mut dyn MarkupSink) -> Result<(), Error> {
    tracing::warn!(id, depth = MAX_DEPTH, "reference chain too deep, writing raw id");
    return sink.text(id);
}

/// Fallback for an id no store resolves: the raw id, verbatim.
fn unresolved(id: &str, sink: &mut dyn MarkupSink) -> Result<(), Error> {
    tracing::warn!(id, "unresolved reference, writing raw id");
    return sink.text(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::create_reference;
    use crate::reference::{
        ArrayTypeReference, ExtensionMethodReference, InvalidReference, MethodTemplateTypeReference, Parameter,
        PointerTypeReference, ReferenceTypeReference, SpecializedMemberReference, TypeTemplateTypeReference,
    };
    use crate::target::{ConstructorTarget, MemberTarget, NamespaceTarget, PropertyTarget};

    fn type_target(id: &str, name: &str, namespace: &str, outer: Option<&str>, templates: &[&str]) -> Target {
        Target::Type(TypeTarget {
            id: id.to_string(),
            name: name.to_string(),
            namespace: NamespaceReference { id: namespace.to_string() },
            outer_type: outer.map(|id| SimpleTypeReference { id: id.to_string() }),
            templates: templates.iter().map(|t| t.to_string()).collect(),
        })
    }

    fn member(id: &str, name: &str, containing: &str) -> MemberTarget {
        MemberTarget { containing_type: TypeReference::simple(containing), id: id.to_string(), name: name.to_string() }
    }

    fn method(id: &str, name: &str, containing: &str, parameters: Vec<TypeReference>) -> MethodTarget {
        MethodTarget {
            conversion_operator: false,
            parameters: parameters
                .into_iter()
                .map(|parameter_type| Parameter { name: "p".to_string(), parameter_type })
                .collect(),
            procedure: ProcedureTarget { explicitly_implements: None, member: member(id, name, containing) },
            return_type: None,
            template_args: vec![],
            templates: vec![],
        }
    }

    fn list_template() -> TypeReference {
        TypeReference::TypeTemplate(TypeTemplateTypeReference {
            position: 0,
            template_type: SimpleTypeReference { id: "T:Ns.List`1".to_string() },
        })
    }

    fn collection() -> TargetCollection {
        let mut collection = TargetCollection::new();
        let store = collection.local_mut();
        for (id, name) in [("N:Ns", "Ns"), ("N:System", "System"), ("N:", "")] {
            store.add(Target::Namespace(NamespaceTarget { id: id.to_string(), name: name.to_string() })).unwrap();
        }
        store.add(type_target("T:Ns.Map`2", "Map", "N:Ns", None, &["T1", "T2"])).unwrap();
        store.add(type_target("T:Ns.Map`2.Entry", "Entry", "N:Ns", Some("T:Ns.Map`2"), &[])).unwrap();
        store.add(type_target("T:Ns.Widget", "Widget", "N:Ns", None, &[])).unwrap();
        store.add(type_target("T:Ns.IRunnable", "IRunnable", "N:Ns", None, &[])).unwrap();
        store.add(type_target("T:Ns.List`1", "List", "N:Ns", None, &["T"])).unwrap();
        store.add(type_target("T:System.Int32", "Int32", "N:System", None, &[])).unwrap();
        store.add(type_target("T:System.String", "String", "N:System", None, &[])).unwrap();
        store.add(type_target("T:Global", "Global", "N:", None, &[])).unwrap();
        store.add(type_target("T:Ns.Outer`1", "Outer", "N:Ns", None, &["TOuter"])).unwrap();
        store.add(type_target("T:Ns.Outer`1.Inner`1", "Inner", "N:Ns", Some("T:Ns.Outer`1"), &["TInner"])).unwrap();
        store.add(type_target("T:Ns.Plain", "Plain", "N:Ns", None, &[])).unwrap();
        store.add(type_target("T:Ns.Plain.Nested`1", "Nested", "N:Ns", Some("T:Ns.Plain"), &["TItem"])).unwrap();
        store.add(type_target("T:Ns.A", "A", "N:Ns", Some("T:Ns.B"), &[])).unwrap();
        store.add(type_target("T:Ns.B", "B", "N:Ns", Some("T:Ns.A"), &[])).unwrap();

        store.add(Target::Method(method("M:Ns.Widget.Spin", "Spin", "T:Ns.Widget", vec![]))).unwrap();
        store.add(Target::Method(method("M:Ns.IRunnable.Run", "Run", "T:Ns.IRunnable", vec![]))).unwrap();
        store.add(Target::Method(method("M:Ns.List`1.Add(`0)", "Add", "T:Ns.List`1", vec![list_template()]))).unwrap();

        let convert_all_id = "M:Ns.List`1.ConvertAll``1(``0)";
        let output = TypeReference::MethodTemplate(MethodTemplateTypeReference {
            position: 0,
            template_method: Box::new(MemberReference::Simple(SimpleMemberReference { id: convert_all_id.to_string() })),
        });
        let mut convert_all = method(convert_all_id, "ConvertAll", "T:Ns.List`1", vec![output]);
        convert_all.templates = vec!["TOut".to_string()];
        store.add(Target::Method(convert_all)).unwrap();

        let mut make = method("M:Ns.Widget.Make{System.String}", "Make", "T:Ns.Widget", vec![]);
        make.templates = vec!["TItem".to_string()];
        make.template_args = vec![TypeReference::simple("T:System.String")];
        store.add(Target::Method(make)).unwrap();

        let mut run = method("M:Ns.Widget.Ns#IRunnable#Run", "Ns#IRunnable#Run", "T:Ns.Widget", vec![]);
        run.procedure.explicitly_implements =
            Some(MemberReference::Simple(SimpleMemberReference { id: "M:Ns.IRunnable.Run".to_string() }));
        store.add(Target::Method(run)).unwrap();

        let mut convert = method(
            "M:Ns.Widget.op_Explicit(Ns.Widget)~System.Int32",
            "op_Explicit",
            "T:Ns.Widget",
            vec![TypeReference::simple("T:Ns.Widget")],
        );
        convert.conversion_operator = true;
        convert.return_type = Some(TypeReference::simple("T:System.Int32"));
        store.add(Target::Method(convert)).unwrap();

        store
            .add(Target::Constructor(ConstructorTarget {
                member: member("M:Ns.Widget.#ctor(System.Int32)", "#ctor", "T:Ns.Widget"),
                parameters: vec![Parameter { name: "size".to_string(), parameter_type: TypeReference::simple("T:System.Int32") }],
            }))
            .unwrap();
        for (id, name, parameters) in [
            ("P:Ns.Widget.Item(System.Int32)", "Item", vec![TypeReference::simple("T:System.Int32")]),
            ("P:Ns.Widget.Size", "Size", vec![]),
        ] {
            store
                .add(Target::Property(PropertyTarget {
                    parameters: parameters
                        .into_iter()
                        .map(|parameter_type| Parameter { name: "index".to_string(), parameter_type })
                        .collect(),
                    procedure: ProcedureTarget { explicitly_implements: None, member: member(id, name, "T:Ns.Widget") },
                    return_type: Some(TypeReference::simple("T:System.Int32")),
                }))
                .unwrap();
        }
        collection
    }

    fn text(collection: &TargetCollection, class: &str, reference: &Reference, options: DisplayOptions) -> String {
        let renderer = Renderer::new(collection, syntax::ALL.to_vec());
        let mut sink = ProfileText::new(class);
        renderer.write_reference(reference, options, &mut sink).unwrap();
        sink.into_string()
    }

    fn xml(collection: &TargetCollection, reference: &Reference, options: DisplayOptions) -> String {
        let renderer = Renderer::new(collection, syntax::ALL.to_vec());
        let mut sink = XmlMarkup::new();
        renderer.write_reference(reference, options, &mut sink).unwrap();
        sink.into_string().unwrap()
    }

    fn type_ref(id: &str) -> Reference {
        Reference::Type(TypeReference::simple(id))
    }

    fn member_ref(id: &str) -> Reference {
        Reference::Member(MemberReference::Simple(SimpleMemberReference { id: id.to_string() }))
    }

    fn all_profiles(collection: &TargetCollection, reference: &Reference, options: DisplayOptions) -> [String; 4] {
        ["cs", "vb", "cpp", "fs"].map(|class| text(collection, class, reference, options))
    }

    #[test]
    fn generic_type_with_container_and_templates() {
        let collection = collection();
        let reference = type_ref("T:Ns.Map`2");
        let options = DisplayOptions::SHOW_CONTAINER | DisplayOptions::SHOW_TEMPLATES;

        assert_eq!(
            all_profiles(&collection, &reference, options),
            ["Ns.Map<T1, T2>", "Ns.Map(Of T1, T2)", "Ns::Map<T1, T2>", "Ns.Map<T1, T2>"]
        );
        let markup = xml(&collection, &reference, options);
        assert!(markup.starts_with(
            r#"Ns<span class="languageSpecificText"><span class="cs">.</span><span class="vb">.</span><span class="cpp">::</span><span class="fs">.</span></span>Map"#
        ), "{markup}");
        assert!(markup.contains("T1, T2"), "{markup}");
    }

    #[test]
    fn empty_parameter_list_per_profile() {
        let collection = collection();
        let reference = member_ref("M:Ns.Widget.Spin");

        assert_eq!(
            all_profiles(&collection, &reference, DisplayOptions::SHOW_PARAMETERS),
            ["Spin()", "Spin", "Spin()", "Spin()"]
        );
        assert_eq!(
            all_profiles(&collection, &reference, DisplayOptions::DEFAULT | DisplayOptions::SHOW_CONTAINER),
            ["Widget.Spin()", "Widget.Spin", "Widget::Spin()", "Widget.Spin()"]
        );
        assert_eq!(text(&collection, "vb", &reference, DisplayOptions::NONE), "Spin");
    }

    #[test]
    fn invalid_reference_is_bracketed() {
        let collection = collection();
        let reference = Reference::Invalid(InvalidReference { id: "Foo.Bar".to_string() });
        assert_eq!(xml(&collection, &reference, DisplayOptions::DEFAULT), "[Foo.Bar]");
    }

    #[test]
    fn rendering_is_deterministic() {
        let collection = collection();
        let reference = member_ref("M:Ns.List`1.Add(`0)");
        let options = DisplayOptions::DEFAULT | DisplayOptions::SHOW_CONTAINER;
        assert_eq!(xml(&collection, &reference, options), xml(&collection, &reference, options));
    }

    #[test]
    fn specialized_member_substitutes_template_slots() {
        let collection = collection();
        let reference = Reference::Member(MemberReference::Specialized(SpecializedMemberReference {
            specialized_type: SpecializedTypeReference {
                specializations: vec![Specialization {
                    arguments: vec![TypeReference::simple("T:System.String")],
                    template_type: SimpleTypeReference { id: "T:Ns.List`1".to_string() },
                }],
            },
            template_member: SimpleMemberReference { id: "M:Ns.List`1.Add(`0)".to_string() },
        }));
        let options = DisplayOptions::DEFAULT | DisplayOptions::SHOW_CONTAINER;

        assert_eq!(text(&collection, "cs", &reference, options), "List<String>.Add(String)");
        assert_eq!(text(&collection, "vb", &reference, options), "List(Of String).Add(String)");
        assert_eq!(
            text(&collection, "cs", &member_ref("M:Ns.List`1.Add(`0)"), DisplayOptions::DEFAULT),
            "Add(T)"
        );
    }

    #[test]
    fn unknown_template_slots_render_placeholder() {
        let collection = collection();
        let indexed = |template_id: &str, index: u32| {
            Reference::Type(TypeReference::IndexedTemplate(IndexedTemplateTypeReference {
                index,
                template_id: template_id.to_string(),
            }))
        };

        assert_eq!(text(&collection, "cs", &indexed("T:Ns.Map`2", 1), DisplayOptions::DEFAULT), "T2");
        assert_eq!(text(&collection, "cs", &indexed("T:Ns.Map`2", 5), DisplayOptions::DEFAULT), UNRESOLVED_TEMPLATE);
        assert_eq!(text(&collection, "cs", &indexed("T:Nope", 0), DisplayOptions::DEFAULT), UNRESOLVED_TEMPLATE);

        let through_outer = Reference::Type(TypeReference::TypeTemplate(TypeTemplateTypeReference {
            position: 1,
            template_type: SimpleTypeReference { id: "T:Ns.Map`2.Entry".to_string() },
        }));
        assert_eq!(text(&collection, "cs", &through_outer, DisplayOptions::DEFAULT), "T2");
    }

    #[test]
    fn nested_type_is_prefixed_by_its_outer_type() {
        let collection = collection();
        let reference = type_ref("T:Ns.Map`2.Entry");
        assert_eq!(text(&collection, "cs", &reference, DisplayOptions::SHOW_CONTAINER), "Ns.Map<T1, T2>.Entry");
        assert_eq!(text(&collection, "cpp", &reference, DisplayOptions::NONE), "Map<T1, T2>::Entry");
    }

    #[test]
    fn array_pointer_and_by_ref_notation() {
        let collection = collection();
        let int32 = TypeReference::simple("T:System.Int32");
        let array = Reference::Type(TypeReference::Array(ArrayTypeReference {
            element_type: Box::new(int32.clone()),
            rank: 2,
        }));
        assert_eq!(
            all_profiles(&collection, &array, DisplayOptions::NONE),
            ["Int32[,]", "Int32(,)", "array<Int32, 2>^", "Int32[,]"]
        );

        let pointer = Reference::Type(TypeReference::Pointer(PointerTypeReference {
            pointed_to_type: Box::new(int32.clone()),
        }));
        assert_eq!(all_profiles(&collection, &pointer, DisplayOptions::NONE), ["Int32*", "Int32*", "Int32*", "Int32*"]);

        let by_ref = Reference::Type(TypeReference::Reference(ReferenceTypeReference {
            referred_to_type: Box::new(int32),
        }));
        assert_eq!(
            all_profiles(&collection, &by_ref, DisplayOptions::NONE),
            ["Int32", "Int32", "Int32%", "byref<Int32>"]
        );
    }

    #[test]
    fn unresolved_ids_are_written_verbatim() {
        let collection = collection();
        assert_eq!(text(&collection, "cs", &type_ref("T:Missing.Type"), DisplayOptions::SHOW_CONTAINER), "T:Missing.Type");
        assert_eq!(text(&collection, "cs", &member_ref("M:Missing.Run"), DisplayOptions::DEFAULT), "M:Missing.Run");
    }

    #[test]
    fn indexer_brackets_and_plain_properties() {
        let collection = collection();
        let indexer = member_ref("P:Ns.Widget.Item(System.Int32)");
        assert_eq!(
            all_profiles(&collection, &indexer, DisplayOptions::SHOW_PARAMETERS),
            ["Item[Int32]", "Item(Int32)", "Item[Int32]", "Item(Int32)"]
        );
        let plain = member_ref("P:Ns.Widget.Size");
        assert_eq!(all_profiles(&collection, &plain, DisplayOptions::DEFAULT), ["Size", "Size", "Size", "Size"]);
    }

    #[test]
    fn conversion_operator_joins_types_with_to() {
        let collection = collection();
        let reference = member_ref("M:Ns.Widget.op_Explicit(Ns.Widget)~System.Int32");
        assert_eq!(
            text(&collection, "cs", &reference, DisplayOptions::DEFAULT | DisplayOptions::SHOW_CONTAINER),
            "Widget Widget to Int32"
        );
        assert_eq!(text(&collection, "cs", &reference, DisplayOptions::DEFAULT), "Widget to Int32");
    }

    #[test]
    fn explicit_implementation_renders_interface_member() {
        let collection = collection();
        let reference = member_ref("M:Ns.Widget.Ns#IRunnable#Run");
        assert_eq!(
            all_profiles(&collection, &reference, DisplayOptions::DEFAULT),
            ["IRunnable.Run()", "IRunnable.Run", "IRunnable::Run()", "IRunnable.Run()"]
        );
    }

    #[test]
    fn constructor_is_named_after_its_type() {
        let collection = collection();
        let reference = member_ref("M:Ns.Widget.#ctor(System.Int32)");
        assert_eq!(
            text(&collection, "cs", &reference, DisplayOptions::DEFAULT | DisplayOptions::SHOW_CONTAINER),
            "Widget.Widget(Int32)"
        );
    }

    #[test]
    fn global_namespace_adds_no_prefix() {
        let collection = collection();
        assert_eq!(text(&collection, "cs", &type_ref("T:Global"), DisplayOptions::SHOW_CONTAINER), "Global");
    }

    #[test]
    fn cyclic_outer_types_terminate() {
        let collection = collection();
        let rendered = text(&collection, "cs", &type_ref("T:Ns.A"), DisplayOptions::NONE);
        assert!(rendered.ends_with(".A"), "{rendered}");
        assert!(rendered.starts_with("T:Ns."), "{rendered}");
    }

    #[test]
    fn empty_specialization_chain_is_invalid() {
        let collection = collection();
        let renderer = Renderer::new(&collection, syntax::ALL.to_vec());
        let reference = Reference::Type(TypeReference::Specialized(SpecializedTypeReference { specializations: vec![] }));
        let result = renderer.write_reference(&reference, DisplayOptions::DEFAULT, &mut XmlMarkup::new());
        assert!(matches!(result, Err(Error::InvalidOperation { .. })));
    }

    #[test]
    fn single_profile_writes_plain_text() {
        let collection = collection();
        let renderer = Renderer::new(&collection, vec![syntax::VB]);
        let mut sink = XmlMarkup::new();
        let target = collection.get("T:Ns.Map`2").unwrap();
        renderer.write_target(&target, DisplayOptions::SHOW_CONTAINER | DisplayOptions::SHOW_TEMPLATES, &mut sink).unwrap();
        assert_eq!(sink.into_string().unwrap(), "Ns.Map(Of T1, T2)");
    }

    #[test]
    fn nested_chain_substitutes_every_slot() {
        let collection = collection();
        let reference = create_reference("M:Ns.Outer{System.Int32}.Inner{System.String}.Go(`0,`1)");
        let options = DisplayOptions::DEFAULT | DisplayOptions::SHOW_CONTAINER;

        assert_eq!(
            text(&collection, "cs", &reference, options),
            "Outer<Int32>.Inner<String>.Go(Int32, String)"
        );
        assert_eq!(
            text(&collection, "vb", &reference, options),
            "Outer(Of Int32).Inner(Of String).Go(Int32, String)"
        );
        assert_eq!(text(&collection, "cs", &reference, DisplayOptions::DEFAULT), "Go(Int32, String)");
    }

    #[test]
    fn specialized_member_by_name_renders_parameters() {
        let collection = collection();
        let reference = create_reference("M:Ns.List{System.String}.Insert(System.Int32,`0)");
        assert!(matches!(reference, Reference::Member(MemberReference::SpecializedWithParameters(_))));

        assert_eq!(
            all_profiles(&collection, &reference, DisplayOptions::DEFAULT | DisplayOptions::SHOW_CONTAINER),
            [
                "List<String>.Insert(Int32, String)",
                "List(Of String).Insert(Int32, String)",
                "List<String>::Insert(Int32, String)",
                "List<String>.Insert(Int32, String)",
            ]
        );
        assert_eq!(text(&collection, "cs", &reference, DisplayOptions::NONE), "Insert");
    }

    #[test]
    fn generic_type_nested_in_plain_type_keeps_outer_prefix() {
        let collection = collection();
        let reference = create_reference("T:Ns.Plain.Nested{System.String}");
        let options = DisplayOptions::SHOW_CONTAINER | DisplayOptions::SHOW_TEMPLATES | DisplayOptions::SHOW_PARAMETERS;

        assert_eq!(text(&collection, "cs", &reference, options), "Ns.Plain.Nested<String>");
        assert_eq!(text(&collection, "cpp", &reference, options), "Ns::Plain::Nested<String>");
        assert_eq!(text(&collection, "cs", &reference, DisplayOptions::NONE), "Plain.Nested<String>");
    }

    #[test]
    fn method_template_slot_resolves_through_generic_definition() {
        let collection = collection();
        let specialized = create_reference("M:Ns.List{System.String}.ConvertAll``1(``0)");
        let options = DisplayOptions::DEFAULT | DisplayOptions::SHOW_CONTAINER;

        assert_eq!(text(&collection, "cs", &specialized, options), "List<String>.ConvertAll(TOut)");
        assert_eq!(
            text(&collection, "cs", &member_ref("M:Ns.List`1.ConvertAll``1(``0)"), DisplayOptions::DEFAULT),
            "ConvertAll<TOut>(TOut)"
        );
    }

    #[test]
    fn method_template_arguments_replace_template_names() {
        let collection = collection();
        let reference = create_reference("M:Ns.Widget.Make{System.String}");
        assert_eq!(
            all_profiles(&collection, &reference, DisplayOptions::DEFAULT),
            ["Make<String>()", "Make(Of String)", "Make<String>()", "Make<String>()"]
        );
        assert_eq!(text(&collection, "cs", &reference, DisplayOptions::SHOW_PARAMETERS), "Make()");
    }

    #[test]
    fn extension_method_renders_arguments_and_parameters() {
        let collection = collection();
        let reference = Reference::ExtensionMethod(ExtensionMethodReference {
            name: "Shuffle".to_string(),
            parameters: vec![Parameter { name: "seed".to_string(), parameter_type: TypeReference::simple("T:System.Int32") }],
            template_args: vec![TypeReference::simple("T:System.String")],
        });

        assert_eq!(
            all_profiles(&collection, &reference, DisplayOptions::DEFAULT),
            ["Shuffle<String>(Int32)", "Shuffle(Of String)(Int32)", "Shuffle<String>(Int32)", "Shuffle<String>(Int32)"]
        );
        assert_eq!(text(&collection, "cs", &reference, DisplayOptions::NONE), "Shuffle");
    }
}
