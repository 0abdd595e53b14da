//! Parsed stylesheet data model: selectors, declarations, rule sets.

// ---------------------------------------------------------------------------
// PseudoState
// ---------------------------------------------------------------------------

/// The closed set of pseudo-states a selector may test.
///
/// States are supplied by the embedding application (focus management, mouse
/// routing); the style system never infers them. An unknown pseudo-state in
/// a stylesheet rejects the whole sheet at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoState {
    Focus,
    Hover,
    Disabled,
}

impl PseudoState {
    /// Parse a pseudo-state name (without the leading `:`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "focus" => Some(Self::Focus),
            "hover" => Some(Self::Hover),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Hover => "hover",
            Self::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for PseudoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ":{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Selector components
// ---------------------------------------------------------------------------

/// One component of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorComponent {
    /// Type selector: `Button`.
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector: `.primary`.
    Class(String),
    /// Id selector: `#sidebar`.
    Id(String),
    /// Pseudo-state selector: `:focus`.
    PseudoState(PseudoState),
}

/// Combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: direct parent.
    Child,
}

/// A compound selector: components written with no whitespace between them,
/// all of which must match the same node (`Button.primary:focus`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

/// One part of a full selector: either a compound or a combinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorPart {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// A full selector: compounds joined by combinators, e.g.
/// `#sidebar > Button.primary:focus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// A single value inside a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    /// Bare identifier: `red`, `auto`, `bold`.
    Ident(String),
    /// Bare number: `3`, `2.5`.
    Number(f32),
    /// Number with unit: `1fr`, `50%`.
    Dimension(f32, String),
    /// Hex color without the `#`: `ff0000`.
    Color(String),
}

/// One `property: values` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub values: Vec<DeclarationValue>,
    pub important: bool,
}

/// A rule set: selectors plus declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// A parsed stylesheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_state_parse_known() {
        assert_eq!(PseudoState::parse("focus"), Some(PseudoState::Focus));
        assert_eq!(PseudoState::parse("hover"), Some(PseudoState::Hover));
        assert_eq!(PseudoState::parse("disabled"), Some(PseudoState::Disabled));
    }

    #[test]
    fn pseudo_state_parse_unknown() {
        assert_eq!(PseudoState::parse("active"), None);
        assert_eq!(PseudoState::parse("Focus"), None);
    }

    #[test]
    fn pseudo_state_display() {
        assert_eq!(PseudoState::Focus.to_string(), ":focus");
    }

    #[test]
    fn compound_selector_equality() {
        let a = CompoundSelector {
            components: vec![
                SelectorComponent::Type("Button".into()),
                SelectorComponent::Class("primary".into()),
            ],
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
