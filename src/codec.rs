//! Compact text encoding of targets and references.
//!
//! The encoding is self-describing: every value carries its variant tag
//! (`target`, `ref`, `type`, `member`), so decoding dispatches on the text alone.

use crate::error::Error;
use crate::reference::{MemberReference, Reference, TypeReference};
use crate::target::Target;

/// Decode a member reference; any other reference kind is a decode failure.
///
/// # Errors
///
/// Returns `Error::Decode` if the text is malformed or not a member reference.
pub fn read_member_reference(text: &str) -> Result<MemberReference, Error> {
    return match read_reference(text)? {
        Reference::Member(member) => Ok(member),
        other => Err(Error::Decode {
            context: "member reference",
            reason: format!("found {} reference", reference_kind(&other)),
        }),
    };
}

/// Decode any reference.
///
/// # Errors
///
/// Returns `Error::Decode` if the text is malformed or truncated.
pub fn read_reference(text: &str) -> Result<Reference, Error> {
    return serde_json::from_str(text).map_err(|e| {
        return Error::Decode {
            context: "reference",
            reason: e.to_string(),
        };
    });
}

/// Decode a target.
///
/// # Errors
///
/// Returns `Error::Decode` if the text is malformed or truncated.
pub fn read_target(text: &str) -> Result<Target, Error> {
    return serde_json::from_str(text).map_err(|e| {
        return Error::Decode {
            context: "target",
            reason: e.to_string(),
        };
    });
}

/// Decode a type reference; any other reference kind is a decode failure.
///
/// # Errors
///
/// Returns `Error::Decode` if the text is malformed or not a type reference.
pub fn read_type_reference(text: &str) -> Result<TypeReference, Error> {
    return match read_reference(text)? {
        Reference::Type(type_reference) => Ok(type_reference),
        other => Err(Error::Decode {
            context: "type reference",
            reason: format!("found {} reference", reference_kind(&other)),
        }),
    };
}

/// Short name of a reference variant, for decode diagnostics.
const fn reference_kind(reference: &Reference) -> &'static str {
    return match reference {
        Reference::ExtensionMethod(_) => "extension method",
        Reference::Invalid(_) => "invalid",
        Reference::Member(_) => "member",
        Reference::Namespace(_) => "namespace",
        Reference::Type(_) => "type",
    };
}

/// Encode a reference.
///
/// # Errors
///
/// Returns `Error::Decode` only if serialization itself fails, which the
/// model's plain data never triggers.
pub fn write_reference(reference: &Reference) -> Result<String, Error> {
    return serde_json::to_string(reference).map_err(|e| {
        return Error::Decode {
            context: "reference",
            reason: e.to_string(),
        };
    });
}

/// Encode a target.
///
/// # Errors
///
/// Returns `Error::Decode` only if serialization itself fails, which the
/// model's plain data never triggers.
pub fn write_target(target: &Target) -> Result<String, Error> {
    return serde_json::to_string(target).map_err(|e| {
        return Error::Decode {
            context: "target",
            reason: e.to_string(),
        };
    });
}
