//! Classify documentation ids into references.
//!
//! Ids follow the documentation-comment id grammar: a one-letter prefix
//! (`N`, `T`, `M`, `P`, `E`, `F`), a colon, and a dotted name. Type arguments
//! appear in braces, array dimensions in brackets, `*` marks a pointer and `@`
//! a by-reference type. Inside parameter lists `` `n `` is a type template
//! slot and ``` ``n ``` a method template slot.

use crate::reference::{
    ArrayTypeReference, InvalidReference, MemberReference, MethodTemplateTypeReference, NamespaceReference,
    PointerTypeReference, Reference, ReferenceTypeReference, SimpleMemberReference, SimpleTypeReference,
    Specialization, SpecializedMemberWithParametersReference, SpecializedTypeReference, TypeReference,
    TypeTemplateTypeReference,
};

/// Build a reference from a documentation id. Anything that does not parse
/// becomes an [`InvalidReference`] carrying the original text.
pub fn create_reference(api: &str) -> Reference {
    let parsed = match api.split_once(':') {
        Some(("N", name)) if name.chars().all(|c| return c == '.' || !is_delimiter(c)) => {
            Some(Reference::Namespace(NamespaceReference { id: api.to_string() }))
        },
        Some(("T", body)) => type_reference(body).map(Reference::Type),
        Some((prefix @ ("E" | "F" | "M" | "P"), body)) => member_reference(api, prefix, body).map(Reference::Member),
        _ => None,
    };
    return parsed.unwrap_or_else(|| {
        tracing::debug!(api, "unclassifiable id");
        return Reference::Invalid(InvalidReference { id: api.to_string() });
    });
}

/// Characters that end a name segment.
fn is_delimiter(c: char) -> bool {
    return matches!(c, '.' | '{' | '}' | '[' | ']' | '*' | '@' | ',' | '(' | ')' | '~' | ':') || c.is_whitespace();
}

/// Byte offset of the last `.` outside braces.
fn last_top_level_dot(text: &str) -> Option<usize> {
    let mut depth = 0_usize;
    let mut found = None;
    for (offset, c) in text.char_indices() {
        match c {
            '{' => depth = depth.saturating_add(1),
            '}' => depth = depth.checked_sub(1)?,
            '.' if depth == 0 => found = Some(offset),
            _ => {},
        }
    }
    return found;
}

/// Generic definition name of a possibly specialized type name:
/// `Ns.Map{A,B[0:,0:]}.Entry` becomes ``Ns.Map`2.Entry``.
fn generic_name(text: &str) -> Option<String> {
    let mut name = String::with_capacity(text.len());
    let mut arity = 0_usize;
    let mut braces = 0_usize;
    let mut brackets = 0_usize;
    for c in text.chars() {
        match c {
            '{' => {
                if braces == 0 {
                    arity = 1;
                }
                braces = braces.saturating_add(1);
            },
            '}' => {
                braces = braces.checked_sub(1)?;
                if braces == 0 {
                    name.push('`');
                    name.push_str(&arity.to_string());
                }
            },
            '[' if braces > 0 => brackets = brackets.saturating_add(1),
            ']' if braces > 0 => brackets = brackets.checked_sub(1)?,
            ',' if braces == 1 && brackets == 0 => arity = arity.saturating_add(1),
            _ if braces == 0 => name.push(c),
            _ => {},
        }
    }
    return (braces == 0).then_some(name);
}

/// Parse the body of an `M:`/`P:`/`E:`/`F:` id.
fn member_reference(api: &str, prefix: &str, body: &str) -> Option<MemberReference> {
    let (head, parameters) = split_parameters(body)?;
    let dot = last_top_level_dot(head)?;
    let type_text = head.get(..dot)?;
    let name = head.get(dot.saturating_add(1)..)?;
    if name.is_empty() {
        return None;
    }

    let generic = format!(
        "{prefix}:{}.{name}{}",
        generic_name(type_text)?,
        parameters.map_or_else(String::new, |text| return format!("({text}")),
    );
    let mut parser = Parser::new(type_text, Some(&generic), Vec::new());
    let containing = parser.named_type()?;
    if !parser.is_finished() {
        return None;
    }
    let owners = match &containing {
        TypeReference::Simple(simple) => vec![TemplateOwner { arity: None, id: simple.id.clone() }],
        TypeReference::Specialized(specialized) => specialized
            .specializations
            .iter()
            .map(|specialization| {
                return TemplateOwner {
                    arity: Some(specialization.arguments.len()),
                    id: specialization.template_type.id.clone(),
                };
            })
            .collect(),
        _ => return None,
    };

    let parameter_types = match parameters {
        Some(text) => {
            let mut parser = Parser::new(text, Some(&generic), owners);
            let types = parser.list(')')?;
            if parser.eat('~') {
                parser.type_expression()?;
            }
            if !parser.is_finished() {
                return None;
            }
            types
        },
        None => Vec::new(),
    };

    return Some(match containing {
        TypeReference::Specialized(specialized_type) => {
            MemberReference::SpecializedWithParameters(SpecializedMemberWithParametersReference {
                member_name: strip_arity(name).to_string(),
                parameter_types,
                prefix: prefix.to_string(),
                specialized_type,
            })
        },
        _ => MemberReference::Simple(SimpleMemberReference { id: api.to_string() }),
    });
}

/// Split a member body at its parameter list: `(head, text after "(")`.
fn split_parameters(body: &str) -> Option<(&str, Option<&str>)> {
    let mut depth = 0_usize;
    for (offset, c) in body.char_indices() {
        match c {
            '{' => depth = depth.saturating_add(1),
            '}' => depth = depth.checked_sub(1)?,
            '(' if depth == 0 => {
                let head = body.get(..offset)?;
                let rest = body.get(offset.saturating_add(1)..)?;
                return Some((head, Some(rest)));
            },
            _ => {},
        }
    }
    return Some((body, None));
}

/// Drop a generic-method arity suffix: ``Map``1`` becomes `Map`.
fn strip_arity(name: &str) -> &str {
    return match name.rsplit_once("``") {
        Some((base, arity)) if !arity.is_empty() && arity.chars().all(|c| return c.is_ascii_digit()) => base,
        _ => name,
    };
}

/// Parse the body of a `T:` id.
fn type_reference(body: &str) -> Option<TypeReference> {
    let mut parser = Parser::new(body, None, Vec::new());
    let parsed = parser.type_expression()?;
    return parser.is_finished().then_some(parsed);
}

/// A generic type that `` `n `` slots of a member id may refer to.
struct TemplateOwner {
    /// Template arguments supplied for this link of a specialization chain.
    /// `None` for an unspecialized generic type, which takes every slot.
    arity: Option<usize>,
    /// Generic definition id.
    id: String,
}

/// Recursive-descent parser over one type expression.
struct Parser<'a> {
    /// Generic member id that ``` ``n ``` slots refer to.
    method: Option<&'a str>,
    /// Types that `` `n `` slots refer to, outermost first.
    owners: Vec<TemplateOwner>,
    /// Unconsumed input.
    rest: &'a str,
}

impl<'a> Parser<'a> {
    /// Consume `expected` if it is next.
    fn eat(&mut self, expected: char) -> bool {
        return match self.rest.strip_prefix(expected) {
            Some(rest) => {
                self.rest = rest;
                true
            },
            None => false,
        };
    }

    /// Whether all input was consumed.
    const fn is_finished(&self) -> bool {
        return self.rest.is_empty();
    }

    /// Types separated by `,` up to and including `close`.
    fn list(&mut self, close: char) -> Option<Vec<TypeReference>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Some(items);
        }
        loop {
            items.push(self.type_expression()?);
            if self.eat(close) {
                return Some(items);
            }
            if !self.eat(',') {
                return None;
            }
        }
    }

    /// One name segment.
    fn name(&mut self) -> Option<&'a str> {
        let end = self.rest.find(is_delimiter).unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (name, rest) = self.rest.split_at_checked(end)?;
        self.rest = rest;
        return Some(name);
    }

    /// A dotted type name whose segments may carry `{…}` argument lists.
    fn named_type(&mut self) -> Option<TypeReference> {
        let mut path = String::new();
        let mut specializations = Vec::new();
        let trailing = loop {
            let name = self.name()?;
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(name);
            let specialized = self.eat('{');
            if specialized {
                let arguments = self.list('}')?;
                if arguments.is_empty() {
                    return None;
                }
                path.push('`');
                path.push_str(&arguments.len().to_string());
                specializations.push(Specialization {
                    arguments,
                    template_type: SimpleTypeReference { id: format!("T:{path}") },
                });
            }
            if !self.eat('.') {
                break !specialized;
            }
        };

        if specializations.is_empty() {
            return Some(TypeReference::simple(format!("T:{path}")));
        }
        if trailing {
            specializations.push(Specialization {
                arguments: Vec::new(),
                template_type: SimpleTypeReference { id: format!("T:{path}") },
            });
        }
        return Some(TypeReference::Specialized(SpecializedTypeReference { specializations }));
    }

    /// Create a parser over `text`.
    const fn new(text: &'a str, method: Option<&'a str>, owners: Vec<TemplateOwner>) -> Self {
        return Self { method, owners, rest: text };
    }

    /// A decimal template position.
    fn position(&mut self) -> Option<u32> {
        let end = self.rest.find(|c: char| return !c.is_ascii_digit()).unwrap_or(self.rest.len());
        let (digits, rest) = self.rest.split_at_checked(end)?;
        let position = digits.parse().ok()?;
        self.rest = rest;
        return Some(position);
    }

    /// Array, pointer, and by-reference suffixes applied to `base`.
    fn suffixes(&mut self, mut base: TypeReference) -> Option<TypeReference> {
        loop {
            if self.eat('[') {
                let end = self.rest.find(']')?;
                let (dimensions, rest) = self.rest.split_at_checked(end)?;
                if !dimensions.chars().all(|c| return c.is_ascii_digit() || c == ':' || c == ',') {
                    return None;
                }
                self.rest = rest.strip_prefix(']')?;
                let rank = u32::try_from(dimensions.matches(',').count()).ok()?.saturating_add(1);
                base = TypeReference::Array(ArrayTypeReference { element_type: Box::new(base), rank });
            } else if self.eat('*') {
                base = TypeReference::Pointer(PointerTypeReference { pointed_to_type: Box::new(base) });
            } else if self.eat('@') {
                base = TypeReference::Reference(ReferenceTypeReference { referred_to_type: Box::new(base) });
            } else {
                return Some(base);
            }
        }
    }

    /// A template slot or named type, followed by its suffixes.
    fn type_expression(&mut self) -> Option<TypeReference> {
        let base = if let Some(rest) = self.rest.strip_prefix("``") {
            self.rest = rest;
            let position = self.position()?;
            let method = SimpleMemberReference { id: self.method?.to_string() };
            TypeReference::MethodTemplate(MethodTemplateTypeReference {
                position,
                template_method: Box::new(MemberReference::Simple(method)),
            })
        } else if let Some(rest) = self.rest.strip_prefix('`') {
            self.rest = rest;
            let position = self.position()?;
            TypeReference::TypeTemplate(self.type_template(position)?)
        } else {
            self.named_type()?
        };
        return self.suffixes(base);
    }

    /// Bind type slot `position` to its owning link. Slots are numbered across
    /// the whole nesting, outermost first, so earlier links consume theirs.
    fn type_template(&self, position: u32) -> Option<TypeTemplateTypeReference> {
        let mut remaining = usize::try_from(position).ok()?;
        for owner in &self.owners {
            match owner.arity {
                Some(arity) if remaining >= arity => remaining = remaining.saturating_sub(arity),
                _ => {
                    return Some(TypeTemplateTypeReference {
                        position: u32::try_from(remaining).ok()?,
                        template_type: SimpleTypeReference { id: owner.id.clone() },
                    });
                },
            }
        }
        let innermost = self.owners.last()?;
        return Some(TypeTemplateTypeReference {
            position,
            template_type: SimpleTypeReference { id: innermost.id.clone() },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(id: &str) -> TypeReference {
        TypeReference::simple(id)
    }

    #[test]
    fn namespaces_and_simple_types() {
        assert_eq!(
            create_reference("N:System.Collections"),
            Reference::Namespace(NamespaceReference { id: "N:System.Collections".to_string() })
        );
        assert_eq!(create_reference("N:"), Reference::Namespace(NamespaceReference { id: "N:".to_string() }));
        assert_eq!(create_reference("T:System.String"), Reference::Type(simple("T:System.String")));
        assert_eq!(create_reference("T:Ns.List`1"), Reference::Type(simple("T:Ns.List`1")));
    }

    #[test]
    fn nested_specializations_build_generic_ids() {
        let Reference::Type(TypeReference::Specialized(specialized)) =
            create_reference("T:Ns.Outer{System.Int32}.Inner{System.String}")
        else {
            panic!("expected a specialized type");
        };
        let ids: Vec<_> = specialized.specializations.iter().map(|s| s.template_type.id.as_str()).collect();
        assert_eq!(ids, ["T:Ns.Outer`1", "T:Ns.Outer`1.Inner`1"]);
        assert_eq!(specialized.specializations[1].arguments, vec![simple("T:System.String")]);
    }

    #[test]
    fn trailing_non_generic_segment_is_kept() {
        let Reference::Type(TypeReference::Specialized(specialized)) = create_reference("T:Ns.Outer{System.Int32}.Inner")
        else {
            panic!("expected a specialized type");
        };
        assert_eq!(specialized.specializations.len(), 2);
        assert_eq!(specialized.specializations[1].template_type.id, "T:Ns.Outer`1.Inner");
        assert!(specialized.specializations[1].arguments.is_empty());
    }

    #[test]
    fn array_pointer_and_by_ref_suffixes() {
        let Reference::Type(TypeReference::Array(array)) = create_reference("T:System.Int32[0:,0:]") else {
            panic!("expected an array");
        };
        assert_eq!(array.rank, 2);
        assert_eq!(*array.element_type, simple("T:System.Int32"));

        assert_eq!(
            create_reference("T:System.Byte*"),
            Reference::Type(TypeReference::Pointer(PointerTypeReference {
                pointed_to_type: Box::new(simple("T:System.Byte")),
            }))
        );
    }

    #[test]
    fn members_of_plain_types_stay_simple() {
        for id in [
            "M:Ns.List`1.Add(`0)",
            "M:Ns.Widget.Map``1(``0[],System.Int32@)",
            "P:Ns.Widget.Item(System.Int32)",
            "F:Ns.Widget.count",
            "M:Ns.Widget.op_Explicit(Ns.Widget)~System.Int32",
            "M:Ns.Widget.#ctor",
        ] {
            assert_eq!(
                create_reference(id),
                Reference::Member(MemberReference::Simple(SimpleMemberReference { id: id.to_string() })),
                "{id}"
            );
        }
    }

    #[test]
    fn members_of_specialized_types_carry_parameters() {
        let Reference::Member(MemberReference::SpecializedWithParameters(member)) =
            create_reference("M:Ns.List{System.String}.Insert(System.Int32,`0)")
        else {
            panic!("expected a specialized member");
        };
        assert_eq!(member.member_name, "Insert");
        assert_eq!(member.prefix, "M");
        assert_eq!(member.specialized_type.specializations[0].template_type.id, "T:Ns.List`1");
        assert_eq!(
            member.parameter_types,
            vec![
                simple("T:System.Int32"),
                TypeReference::TypeTemplate(TypeTemplateTypeReference {
                    position: 0,
                    template_type: SimpleTypeReference { id: "T:Ns.List`1".to_string() },
                }),
            ]
        );
    }

    #[test]
    fn generic_method_arity_is_dropped_from_names() {
        let Reference::Member(MemberReference::SpecializedWithParameters(member)) =
            create_reference("M:Ns.List{System.String}.ConvertAll``1(``0)")
        else {
            panic!("expected a specialized member");
        };
        assert_eq!(member.member_name, "ConvertAll");
        let TypeReference::MethodTemplate(template) = &member.parameter_types[0] else {
            panic!("expected a method template slot");
        };
        assert_eq!(template.position, 0);
        assert_eq!(
            *template.template_method,
            MemberReference::Simple(SimpleMemberReference { id: "M:Ns.List`1.ConvertAll``1(``0)".to_string() })
        );
    }

    #[test]
    fn method_slots_point_at_the_generic_definition() {
        let Reference::Member(MemberReference::SpecializedWithParameters(member)) =
            create_reference("M:Ns.Map{System.Int32[0:,0:],Ns.List{System.String}}.Find``1(``0,`1)")
        else {
            panic!("expected a specialized member");
        };
        let TypeReference::MethodTemplate(template) = &member.parameter_types[0] else {
            panic!("expected a method template slot");
        };
        assert_eq!(
            *template.template_method,
            MemberReference::Simple(SimpleMemberReference { id: "M:Ns.Map`2.Find``1(``0,`1)".to_string() })
        );
        assert_eq!(
            member.parameter_types[1],
            TypeReference::TypeTemplate(TypeTemplateTypeReference {
                position: 1,
                template_type: SimpleTypeReference { id: "T:Ns.Map`2".to_string() },
            })
        );
    }

    #[test]
    fn type_slots_are_numbered_across_the_nesting() {
        let Reference::Member(MemberReference::SpecializedWithParameters(member)) =
            create_reference("M:Ns.Outer{System.Int32,System.Byte}.Inner{System.String}.Go(`0,`1,`2)")
        else {
            panic!("expected a specialized member");
        };
        let slot = |position: u32, id: &str| {
            TypeReference::TypeTemplate(TypeTemplateTypeReference {
                position,
                template_type: SimpleTypeReference { id: id.to_string() },
            })
        };
        assert_eq!(
            member.parameter_types,
            vec![slot(0, "T:Ns.Outer`2"), slot(1, "T:Ns.Outer`2"), slot(0, "T:Ns.Outer`2.Inner`1")]
        );
    }

    #[test]
    fn slots_skip_non_generic_links() {
        let Reference::Member(MemberReference::SpecializedWithParameters(member)) =
            create_reference("M:Ns.Outer{System.Int32}.Plain.Go(`0)")
        else {
            panic!("expected a specialized member");
        };
        assert_eq!(
            member.parameter_types,
            vec![TypeReference::TypeTemplate(TypeTemplateTypeReference {
                position: 0,
                template_type: SimpleTypeReference { id: "T:Ns.Outer`1".to_string() },
            })]
        );
    }

    #[test]
    fn malformed_ids_are_invalid() {
        for id in ["", "Foo.Bar", "X:Ns.Widget", "T:", "T:Ns.List{System.String", "T:Ns Widget", "M:NoDot", "T:Ns.List{}", "T:`0"] {
            assert_eq!(
                create_reference(id),
                Reference::Invalid(InvalidReference { id: id.to_string() }),
                "{id}"
            );
        }
    }
}
