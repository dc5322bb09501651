//! Punctuation rules of each output syntax.

use crate::error::Error;

/// How an array type is written around its element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayNotation {
    /// `T[]`, `T[,]`.
    Brackets,
    /// `array<T>^`, `array<T, 2>^`.
    Managed,
    /// `T()`, `T(,)`.
    Parentheses,
}

/// How a by-reference type is written around its referred-to type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByRefNotation {
    /// Nothing; by-reference is expressed by the parameter modifier.
    Bare,
    /// `T%`.
    Tracking,
    /// `byref<T>`.
    Wrapped,
}

/// One output notation the renderer emits in parallel with the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxProfile {
    /// Array notation.
    array: ArrayNotation,
    /// By-reference notation.
    by_ref: ByRefNotation,
    /// Class attribute tagging this profile's markup, e.g. `cs`.
    pub class: &'static str,
    /// Written for an empty parameter list.
    pub empty_parameters: &'static str,
    /// Closes an indexer parameter list.
    pub indexer_close: &'static str,
    /// Opens an indexer parameter list.
    pub indexer_open: &'static str,
    /// Member-access separator.
    pub separator: &'static str,
    /// Closes a template list.
    pub template_close: &'static str,
    /// Opens a template list.
    pub template_open: &'static str,
}

/// C#.
pub const CS: SyntaxProfile = SyntaxProfile {
    array: ArrayNotation::Brackets,
    by_ref: ByRefNotation::Bare,
    class: "cs",
    empty_parameters: "()",
    indexer_close: "]",
    indexer_open: "[",
    separator: ".",
    template_close: ">",
    template_open: "<",
};

/// Visual Basic. Zero-argument calls take no parentheses.
pub const VB: SyntaxProfile = SyntaxProfile {
    array: ArrayNotation::Parentheses,
    by_ref: ByRefNotation::Bare,
    class: "vb",
    empty_parameters: "",
    indexer_close: ")",
    indexer_open: "(",
    separator: ".",
    template_close: ")",
    template_open: "(Of ",
};

/// C++/CLI.
pub const CPP: SyntaxProfile = SyntaxProfile {
    array: ArrayNotation::Managed,
    by_ref: ByRefNotation::Tracking,
    class: "cpp",
    empty_parameters: "()",
    indexer_close: "]",
    indexer_open: "[",
    separator: "::",
    template_close: ">",
    template_open: "<",
};

/// F#.
pub const FS: SyntaxProfile = SyntaxProfile {
    array: ArrayNotation::Brackets,
    by_ref: ByRefNotation::Wrapped,
    class: "fs",
    empty_parameters: "()",
    indexer_close: ")",
    indexer_open: "(",
    separator: ".",
    template_close: ">",
    template_open: "<",
};

/// Every known profile, in output order.
pub const ALL: [SyntaxProfile; 4] = [CS, VB, CPP, FS];

impl SyntaxProfile {
    /// Written before an array's element type.
    pub fn array_prefix(&self) -> &'static str {
        return match self.array {
            ArrayNotation::Managed => "array<",
            ArrayNotation::Brackets | ArrayNotation::Parentheses => "",
        };
    }

    /// Written after an array's element type.
    pub fn array_suffix(&self, rank: u32) -> String {
        let commas = ",".repeat(usize::try_from(rank.saturating_sub(1)).unwrap_or(0));
        return match self.array {
            ArrayNotation::Brackets => format!("[{commas}]"),
            ArrayNotation::Managed if rank > 1 => format!(", {rank}>^"),
            ArrayNotation::Managed => ">^".to_string(),
            ArrayNotation::Parentheses => format!("({commas})"),
        };
    }

    /// Look a profile up by its class.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownProfile` if no profile has that class.
    pub fn by_class(class: &str) -> Result<Self, Error> {
        return ALL
            .iter()
            .find(|profile| return profile.class == class)
            .copied()
            .ok_or_else(|| return Error::UnknownProfile { name: class.to_string() });
    }

    /// Written before a by-reference type.
    pub const fn by_ref_prefix(&self) -> &'static str {
        return match self.by_ref {
            ByRefNotation::Wrapped => "byref<",
            ByRefNotation::Bare | ByRefNotation::Tracking => "",
        };
    }

    /// Written after a by-reference type.
    pub const fn by_ref_suffix(&self) -> &'static str {
        return match self.by_ref {
            ByRefNotation::Bare => "",
            ByRefNotation::Tracking => "%",
            ByRefNotation::Wrapped => ">",
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_notation_per_profile() {
        assert_eq!(CS.array_suffix(1), "[]");
        assert_eq!(CS.array_suffix(3), "[,,]");
        assert_eq!(VB.array_suffix(2), "(,)");
        assert_eq!(CPP.array_prefix(), "array<");
        assert_eq!(CPP.array_suffix(1), ">^");
        assert_eq!(CPP.array_suffix(2), ", 2>^");
    }

    #[test]
    fn unknown_class_is_rejected() {
        assert_eq!(SyntaxProfile::by_class("vb").unwrap(), VB);
        assert!(matches!(SyntaxProfile::by_class("java"), Err(Error::UnknownProfile { .. })));
    }
}
