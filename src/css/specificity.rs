//! Cascade ordering: [`Specificity`].
//!
//! A matched rule's priority is a lexicographic tuple. Deriving `Ord` on the
//! struct gives the cascade for free: sort matches ascending and merge in
//! order, so the highest-priority declaration lands last and wins.

use crate::css::model::{Selector, SelectorComponent, SelectorPart};

// ---------------------------------------------------------------------------
// Specificity
// ---------------------------------------------------------------------------

/// Priority of a matched rule.
///
/// Field order is the comparison order:
/// 1. user stylesheet beats default stylesheet,
/// 2. `!important` beats normal,
/// 3. id selectors,
/// 4. class + pseudo-state selectors,
/// 5. type selectors (`*` counts nothing),
/// 6. source order (later wins at equal specificity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity {
    pub is_user: u8,
    pub important: u8,
    pub id_count: u16,
    pub class_count: u16,
    pub type_count: u16,
    pub source_order: u32,
}

impl Specificity {
    /// Count a selector's components into a specificity.
    pub fn from_selector(
        selector: &Selector,
        source_order: u32,
        is_user: bool,
        important: bool,
    ) -> Self {
        let mut spec = Specificity {
            is_user: u8::from(is_user),
            important: u8::from(important),
            source_order,
            ..Default::default()
        };
        for part in &selector.parts {
            let SelectorPart::Compound(compound) = part else {
                continue;
            };
            for component in &compound.components {
                match component {
                    SelectorComponent::Id(_) => spec.id_count += 1,
                    SelectorComponent::Class(_) | SelectorComponent::PseudoState(_) => {
                        spec.class_count += 1
                    }
                    SelectorComponent::Type(_) => spec.type_count += 1,
                    SelectorComponent::Universal => {}
                }
            }
        }
        spec
    }
}

// ===========================================================================
// Tests
// ===========================================================================
