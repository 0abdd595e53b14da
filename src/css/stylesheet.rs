//! Compiled stylesheets and cascade resolution.
//!
//! Parsing and property application happen once, at load time. What remains
//! per node is selector matching plus an ordered merge: collect every
//! matching rule, sort ascending by [`Specificity`], and overlay — the
//! highest-priority declaration lands last and wins. Equal inputs always
//! produce equal output; there is no tie left to chance because source order
//! is part of the specificity tuple.

use crate::css::model::{
    Combinator, CompoundSelector, Selector, SelectorComponent, SelectorPart,
};
use crate::css::parser::{parse_stylesheet, ParseError};
use crate::css::properties::apply_declaration;
use crate::css::specificity::Specificity;
use crate::css::styles::Styles;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// CompiledStylesheet
// ---------------------------------------------------------------------------

/// One rule, ready to match: selectors with their specificities, plus the
/// declarations already applied into a [`Styles`] bag.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub selectors: Vec<(Selector, Specificity)>,
    pub styles: Styles,
}

/// A stylesheet compiled for the cascade.
#[derive(Debug, Clone, Default)]
pub struct CompiledStylesheet {
    pub rules: Vec<CompiledRule>,
}

impl CompiledStylesheet {
    /// Parse and compile a stylesheet source.
    ///
    /// Syntax errors and unknown pseudo-states reject the whole sheet.
    /// Unknown properties and malformed values are logged and skipped; the
    /// rest of the rule still applies. `!important` declarations are split
    /// into their own rule entry so they outrank normal declarations
    /// individually.
    pub fn parse(source: &str, is_user: bool) -> Result<Self, ConfigError> {
        let sheet = parse_stylesheet(source).map_err(config_error)?;

        let mut rules = Vec::new();
        let mut source_order: u32 = 0;
        for rule in &sheet.rules {
            let mut normal = Styles::new();
            let mut important = Styles::new();
            for decl in &rule.declarations {
                let target = if decl.important {
                    &mut important
                } else {
                    &mut normal
                };
                if let Err(err) = apply_declaration(target, &decl.property, &decl.values) {
                    tracing::warn!(property = %decl.property, %err, "skipping declaration");
                }
            }

            for (styles, is_important) in [(normal, false), (important, true)] {
                if styles.is_empty() {
                    continue;
                }
                let selectors = rule
                    .selectors
                    .iter()
                    .map(|sel| {
                        (
                            sel.clone(),
                            Specificity::from_selector(sel, source_order, is_user, is_important),
                        )
                    })
                    .collect();
                rules.push(CompiledRule { selectors, styles });
            }
            source_order += 1;
        }

        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn config_error(err: ParseError) -> ConfigError {
    let (line, column) = match &err {
        ParseError::UnexpectedToken { line, column, .. }
        | ParseError::UnknownPseudoState { line, column, .. } => (*line, *column),
        ParseError::UnexpectedEof => (0, 0),
    };
    ConfigError::Stylesheet {
        line,
        column,
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

/// Cascade all sheets for one node: collect matches, sort ascending by
/// specificity, merge in order.
pub fn compute_styles(sheets: &[CompiledStylesheet], dom: &Dom, node: NodeId) -> Styles {
    let mut matches: Vec<(Specificity, &Styles)> = Vec::new();
    for sheet in sheets {
        for rule in &sheet.rules {
            // A rule with several matching selectors matches at the highest
            // of their specificities.
            let best = rule
                .selectors
                .iter()
                .filter(|(sel, _)| matches_selector(sel, dom, node))
                .map(|(_, spec)| *spec)
                .max();
            if let Some(spec) = best {
                matches.push((spec, &rule.styles));
            }
        }
    }
    matches.sort_by(|a, b| a.0.cmp(&b.0));

    let mut styles = Styles::new();
    for (_, rule_styles) in matches {
        styles.merge(rule_styles);
    }
    styles
}

/// Match a full selector against a node, walking compounds right to left.
///
/// `Child` steps to the parent; `Descendant` scans upward to the nearest
/// matching ancestor.
pub fn matches_selector(selector: &Selector, dom: &Dom, node: NodeId) -> bool {
    let parts = &selector.parts;
    let Some(SelectorPart::Compound(last)) = parts.last() else {
        return false;
    };
    if !matches_compound(last, dom, node) {
        return false;
    }

    let mut current = node;
    let mut idx = parts.len().wrapping_sub(1);
    while idx >= 2 {
        let SelectorPart::Combinator(combinator) = &parts[idx - 1] else {
            return false;
        };
        let SelectorPart::Compound(compound) = &parts[idx - 2] else {
            return false;
        };
        match combinator {
            Combinator::Child => {
                let Some(parent) = dom.parent(current) else {
                    return false;
                };
                if !matches_compound(compound, dom, parent) {
                    return false;
                }
                current = parent;
            }
            Combinator::Descendant => {
                let Some(ancestor) = dom
                    .ancestors(current)
                    .into_iter()
                    .find(|&a| matches_compound(compound, dom, a))
                else {
                    return false;
                };
                current = ancestor;
            }
        }
        idx -= 2;
    }
    true
}

/// Match one compound selector: every component must hold for the node.
pub fn matches_compound(compound: &CompoundSelector, dom: &Dom, node: NodeId) -> bool {
    let Some(data) = dom.get(node) else {
        return false;
    };
    compound.components.iter().all(|component| match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(name) => data.widget_type == *name,
        SelectorComponent::Class(class) => data.has_class(class),
        SelectorComponent::Id(id) => data.id.as_deref() == Some(id.as_str()),
        SelectorComponent::PseudoState(state) => data.state(*state),
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::model::PseudoState;
    use crate::css::scalar::Scalar;
    use crate::dom::node::NodeData;

    /// Build a test DOM:
    /// ```text
    ///   Screen
    ///     Panel#main
    ///       Sidebar.wide
    ///         Button.primary (focusable)
    ///       Label
    /// ```
    fn build_test_dom() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("Screen"));
        let panel = dom.insert_child(root, NodeData::new("Panel").with_id("main"));
        let sidebar = dom.insert_child(panel, NodeData::new("Sidebar").with_class("wide"));
        let btn = dom.insert_child(
            sidebar,
            NodeData::new("Button").with_class("primary").focusable(true),
        );
        let lbl = dom.insert_child(panel, NodeData::new("Label"));
        (dom, root, panel, sidebar, btn, lbl)
    }

    fn sheet(css: &str) -> CompiledStylesheet {
        CompiledStylesheet::parse(css, true).unwrap()
    }

    // ── Matching ─────────────────────────────────────────────────────

    #[test]
    fn type_selector_matches() {
        let (dom, _, _, _, btn, lbl) = build_test_dom();
        let s = sheet("Button { color: red; }");
        assert_eq!(
            compute_styles(&[s.clone()], &dom, btn).color,
            Some("red".into())
        );
        assert_eq!(compute_styles(&[s], &dom, lbl).color, None);
    }

    #[test]
    fn class_selector_matches() {
        let (dom, _, _, sidebar, btn, _) = build_test_dom();
        let s = sheet(".wide { width: 30; }");
        assert!(compute_styles(&[s.clone()], &dom, sidebar).width.is_some());
        assert!(compute_styles(&[s], &dom, btn).width.is_none());
    }

    #[test]
    fn id_selector_matches() {
        let (dom, _, panel, _, btn, _) = build_test_dom();
        let s = sheet("#main { background: blue; }");
        assert!(compute_styles(&[s.clone()], &dom, panel).background.is_some());
        assert!(compute_styles(&[s], &dom, btn).background.is_none());
    }

    #[test]
    fn universal_matches_everything() {
        let (dom, root, _, _, btn, lbl) = build_test_dom();
        let s = sheet("* { color: white; }");
        for node in [root, btn, lbl] {
            assert_eq!(
                compute_styles(&[s.clone()], &dom, node).color,
                Some("white".into())
            );
        }
    }

    #[test]
    fn descendant_combinator_any_depth() {
        let (dom, _, _, _, btn, lbl) = build_test_dom();
        let s = sheet("#main Button { color: red; }");
        assert!(compute_styles(&[s.clone()], &dom, btn).color.is_some());
        assert!(compute_styles(&[s], &dom, lbl).color.is_none());
    }

    #[test]
    fn child_combinator_direct_only() {
        let (dom, _, _, sidebar, btn, _) = build_test_dom();
        // Button is a grandchild of #main, not a child.
        let s = sheet("#main > Button { color: red; }");
        assert!(compute_styles(&[s], &dom, btn).color.is_none());

        let s = sheet("#main > Sidebar { color: red; }");
        assert!(compute_styles(&[s], &dom, sidebar).color.is_some());
    }

    #[test]
    fn compound_requires_all_components() {
        let (dom, _, _, _, btn, _) = build_test_dom();
        let s = sheet("Button.primary { color: red; }");
        assert!(compute_styles(&[s], &dom, btn).color.is_some());

        let s = sheet("Button.secondary { color: red; }");
        assert!(compute_styles(&[s], &dom, btn).color.is_none());
    }

    // ── Pseudo-states ────────────────────────────────────────────────

    #[test]
    fn pseudo_state_matches_flag() {
        let (mut dom, _, _, _, btn, _) = build_test_dom();
        let s = sheet("Button:focus { background: blue; }");

        assert!(compute_styles(&[s.clone()], &dom, btn).background.is_none());

        dom.set_state(btn, PseudoState::Focus, true);
        assert_eq!(
            compute_styles(&[s.clone()], &dom, btn).background,
            Some("blue".into())
        );

        dom.set_state(btn, PseudoState::Focus, false);
        assert!(compute_styles(&[s], &dom, btn).background.is_none());
    }

    #[test]
    fn focus_rule_overrides_base_background() {
        let (mut dom, _, _, _, btn, _) = build_test_dom();
        let s = sheet("Button { background: blue; } Button:focus { background: red; }");

        assert_eq!(
            compute_styles(&[s.clone()], &dom, btn).background,
            Some("blue".into())
        );
        dom.set_state(btn, PseudoState::Focus, true);
        assert_eq!(
            compute_styles(&[s], &dom, btn).background,
            Some("red".into())
        );
    }

    #[test]
    fn disabled_state_matches() {
        let (mut dom, _, _, _, btn, _) = build_test_dom();
        let s = sheet("Button:disabled { color: grey; }");
        dom.set_state(btn, PseudoState::Disabled, true);
        assert_eq!(compute_styles(&[s], &dom, btn).color, Some("grey".into()));
    }

    // ── Cascade ordering ─────────────────────────────────────────────

    #[test]
    fn id_beats_class() {
        let (dom, _, panel, ..) = build_test_dom();
        let s = sheet("#main { color: red; } Panel { color: blue; }");
        assert_eq!(compute_styles(&[s], &dom, panel).color, Some("red".into()));
    }

    #[test]
    fn later_rule_wins_at_equal_specificity() {
        let (dom, _, _, _, btn, _) = build_test_dom();
        let s = sheet("Button { color: red; } Button { color: blue; }");
        assert_eq!(compute_styles(&[s], &dom, btn).color, Some("blue".into()));
    }

    #[test]
    fn important_beats_higher_specificity() {
        let (dom, _, _, _, btn, _) = build_test_dom();
        let s = sheet(
            "Button { color: red !important; } Button.primary { color: blue; }",
        );
        assert_eq!(compute_styles(&[s], &dom, btn).color, Some("red".into()));
    }

    #[test]
    fn important_splits_from_normal_declarations() {
        let (dom, _, _, _, btn, _) = build_test_dom();
        // width is important, color is not: a later rule overrides color only.
        let s = sheet(
            "Button { width: 10 !important; color: red; } Button { width: 20; color: blue; }",
        );
        let styles = compute_styles(&[s], &dom, btn);
        assert_eq!(styles.width, Some(Scalar::cells(10.0)));
        assert_eq!(styles.color, Some("blue".into()));
    }

    #[test]
    fn user_sheet_beats_default_sheet() {
        let (dom, _, _, _, btn, _) = build_test_dom();
        let default = CompiledStylesheet::parse("Button { color: red; }", false).unwrap();
        let user = CompiledStylesheet::parse("Button { color: blue; }", true).unwrap();
        let styles = compute_styles(&[default, user], &dom, btn);
        assert_eq!(styles.color, Some("blue".into()));
    }

    #[test]
    fn unmatched_rules_leave_no_trace() {
        let (dom, root, ..) = build_test_dom();
        let s = sheet("Button { color: red; } .wide { width: 30; }");
        assert!(compute_styles(&[s], &dom, root).is_empty());
    }

    #[test]
    fn cascade_is_deterministic() {
        let (dom, _, _, _, btn, _) = build_test_dom();
        let s = sheet("Button { color: red; } .primary { color: blue; } * { width: 5; }");
        let first = compute_styles(&[s.clone()], &dom, btn);
        for _ in 0..10 {
            assert_eq!(compute_styles(&[s.clone()], &dom, btn), first);
        }
    }

    // ── Load failure modes ───────────────────────────────────────────

    #[test]
    fn syntax_error_rejects_whole_sheet() {
        let err = CompiledStylesheet::parse("Button { color: red; } oops {", true).unwrap_err();
        assert!(matches!(err, ConfigError::Stylesheet { .. }));
    }

    #[test]
    fn unknown_pseudo_state_rejects_whole_sheet() {
        let err =
            CompiledStylesheet::parse("Button:glowing { color: red; }", true).unwrap_err();
        match err {
            ConfigError::Stylesheet { line, column, message } => {
                assert_eq!(line, 1);
                assert!(column > 1);
                assert!(message.contains("glowing"));
            }
            other => panic!("expected Stylesheet error, got: {other:?}"),
        }
    }

    #[test]
    fn unknown_property_is_skipped_not_fatal() {
        let (dom, _, _, _, btn, _) = build_test_dom();
        let s = sheet("Button { font-family: mono; color: red; }");
        let styles = compute_styles(&[s], &dom, btn);
        assert_eq!(styles.color, Some("red".into()));
    }

    #[test]
    fn rule_with_only_bad_declarations_compiles_empty() {
        let s = sheet("Button { font-family: mono; }");
        assert!(s.is_empty());
    }
}
