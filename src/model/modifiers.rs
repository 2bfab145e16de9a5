// Modifier parsing for C# declarations.
//
// Raw modifier tokens arrive in source order and may repeat across partial
// declarations. Parsing normalizes them into an ordered set so equal token
// sets always compare equal, whatever order the source spelled them in.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A semantic modifier. The enum order is the canonical display order:
/// visibility first, then the remaining modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    ProtectedInternal,
    Protected,
    Internal,
    Private,
    Static,
    Abstract,
    Sealed,
    Virtual,
    Override,
    New,
    Async,
    Readonly,
    Const,
    Volatile,
    Unsafe,
    Extern,
    Partial,
}

impl Modifier {
    pub fn is_visibility(self) -> bool {
        matches!(
            self,
            Modifier::Public
                | Modifier::ProtectedInternal
                | Modifier::Protected
                | Modifier::Internal
                | Modifier::Private
        )
    }

    fn from_token(token: &str) -> Option<Modifier> {
        match token {
            "public" => Some(Modifier::Public),
            "protected" => Some(Modifier::Protected),
            "internal" => Some(Modifier::Internal),
            "private" => Some(Modifier::Private),
            "static" => Some(Modifier::Static),
            "abstract" => Some(Modifier::Abstract),
            "sealed" => Some(Modifier::Sealed),
            "virtual" => Some(Modifier::Virtual),
            "override" => Some(Modifier::Override),
            "new" => Some(Modifier::New),
            "async" => Some(Modifier::Async),
            "readonly" => Some(Modifier::Readonly),
            "const" => Some(Modifier::Const),
            "volatile" => Some(Modifier::Volatile),
            "unsafe" => Some(Modifier::Unsafe),
            "extern" => Some(Modifier::Extern),
            "partial" => Some(Modifier::Partial),
            _ => None,
        }
    }

    /// Parse a visibility name as accepted on the command line.
    pub fn visibility_token(token: &str) -> Option<Modifier> {
        if token.eq_ignore_ascii_case("protected-internal")
            || token.eq_ignore_ascii_case("protected internal")
        {
            return Some(Modifier::ProtectedInternal);
        }
        Modifier::from_token(&token.to_ascii_lowercase()).filter(|m| m.is_visibility())
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Modifier::Public => "public",
            Modifier::ProtectedInternal => "protected internal",
            Modifier::Protected => "protected",
            Modifier::Internal => "internal",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Sealed => "sealed",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::New => "new",
            Modifier::Async => "async",
            Modifier::Readonly => "readonly",
            Modifier::Const => "const",
            Modifier::Volatile => "volatile",
            Modifier::Unsafe => "unsafe",
            Modifier::Extern => "extern",
            Modifier::Partial => "partial",
        };
        write!(f, "{}", text)
    }
}

/// Parse raw modifier tokens into a normalized set. Unrecognized tokens are
/// ignored. `protected` plus `internal` folds into the compound visibility.
pub fn parse_modifiers<'a, I>(tokens: I) -> BTreeSet<Modifier>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut set = BTreeSet::new();
    for token in tokens {
        if let Some(modifier) = Modifier::from_token(token.trim()) {
            set.insert(modifier);
        }
    }
    if set.contains(&Modifier::Protected) && set.contains(&Modifier::Internal) {
        set.remove(&Modifier::Protected);
        set.remove(&Modifier::Internal);
        set.insert(Modifier::ProtectedInternal);
    }
    set
}

/// Insert `default` when the set carries no explicit visibility.
pub fn with_default_visibility(
    mut set: BTreeSet<Modifier>,
    default: Modifier,
) -> BTreeSet<Modifier> {
    if !set.iter().any(|m| m.is_visibility()) {
        set.insert(default);
    }
    set
}

/// Keep at most one visibility in the set: the most visible wins. Applied
/// after a partial-type merge unions modifier sets, where one fragment may
/// have spelled the visibility out and another relied on the default.
pub fn normalize_visibility(set: &mut BTreeSet<Modifier>) {
    let visibilities: Vec<Modifier> = set.iter().copied().filter(|m| m.is_visibility()).collect();
    if visibilities.len() > 1 {
        // Enum order puts the most visible first.
        for extra in &visibilities[1..] {
            set.remove(extra);
        }
    }
}

/// Render a modifier set in canonical display order.
pub fn format_modifiers(set: &BTreeSet<Modifier>) -> String {
    set.iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_token_sets_yield_equal_output() {
        let a = parse_modifiers(["static", "public"]);
        let b = parse_modifiers(["public", "static"]);
        assert_eq!(a, b);
        assert_eq!(format_modifiers(&a), "public static");
    }

    #[test]
    fn duplicates_are_deduplicated() {
        let set = parse_modifiers(["public", "public", "sealed"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn unrecognized_tokens_are_ignored() {
        let set = parse_modifiers(["public", "frobnicate"]);
        assert_eq!(set, parse_modifiers(["public"]));
    }

    #[test]
    fn default_visibility_applies_only_without_explicit() {
        let set = with_default_visibility(parse_modifiers(["static"]), Modifier::Private);
        assert!(set.contains(&Modifier::Private));

        let set = with_default_visibility(parse_modifiers(["public"]), Modifier::Private);
        assert!(!set.contains(&Modifier::Private));
        assert!(set.contains(&Modifier::Public));
    }

    #[test]
    fn protected_internal_folds() {
        let set = parse_modifiers(["protected", "internal"]);
        assert_eq!(set, parse_modifiers(["internal", "protected"]));
        assert!(set.contains(&Modifier::ProtectedInternal));
        assert!(!set.contains(&Modifier::Protected));
        assert_eq!(format_modifiers(&set), "protected internal");
    }

    #[test]
    fn normalize_keeps_most_visible() {
        let mut set = parse_modifiers(["private", "static"]);
        set.extend(parse_modifiers(["public"]));
        normalize_visibility(&mut set);
        assert!(set.contains(&Modifier::Public));
        assert!(!set.contains(&Modifier::Private));
        assert!(set.contains(&Modifier::Static));
    }
}
