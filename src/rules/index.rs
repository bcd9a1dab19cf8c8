//! Per-redraw index of decoded coloring rules.
//!
//! The index separates *local* slots (user-adjustable, keyed by paint
//! property + logical name) from *derived* bindings (keyed by the parent
//! slot they mirror). It is rebuilt from scratch on every structural
//! redraw, because the drawable keys it records only live for one redraw
//! cycle.

use std::collections::HashMap;
use std::fmt;

use super::{ColorModifier, PaintProperty, Rule};

// ============================================================================
// Keys and Bindings
// ============================================================================

/// Identity of one logical color slot: `property::logical-name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub property: PaintProperty,
    pub name: String,
}

impl SlotKey {
    pub fn new(property: PaintProperty, name: impl Into<String>) -> Self {
        Self {
            property,
            name: name.into(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.property.as_str(), self.name)
    }
}

/// One drawable bound to a local slot.
///
/// `item` is the drawable-map key the compositor resolves at paint time;
/// `tailor` disambiguates identically-named slots contributed by different
/// tailors (entries under one key are NOT merged into one user-facing
/// control across tailors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBinding {
    pub tailor: String,
    pub item: String,
    pub property: PaintProperty,
}

/// One drawable whose color is recomputed from a parent slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedBinding {
    pub tailor: String,
    pub item: String,
    pub property: PaintProperty,
    pub modifier: Option<ColorModifier>,
}

// ============================================================================
// RuleIndex
// ============================================================================

/// Accumulates rules for one redraw cycle.
///
/// Key order is significant downstream: the UI-adjustable slot table must
/// present a tailor's slots in first-seen order (slot 0 is the primary
/// color, slot 1 the secondary), so insertion order is tracked explicitly.
#[derive(Debug, Default)]
pub struct RuleIndex {
    local: HashMap<SlotKey, Vec<LocalBinding>>,
    local_order: Vec<SlotKey>,
    derived: HashMap<SlotKey, Vec<DerivedBinding>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all accumulated rules. Called before every structural redraw;
    /// bindings from the prior redraw reference drawables that no longer
    /// exist.
    pub fn clear(&mut self) {
        self.local.clear();
        self.local_order.clear();
        self.derived.clear();
    }

    /// Registers the local rules of one drawable. Rules carrying a
    /// dependency are ignored here.
    pub fn add_local(&mut self, rules: &[Rule], item: &str, tailor: &str) {
        for rule in rules.iter().filter(|r| r.is_local()) {
            let key = SlotKey::new(rule.property, rule.target.clone());
            if !self.local.contains_key(&key) {
                self.local_order.push(key.clone());
            }
            self.local.entry(key).or_default().push(LocalBinding {
                tailor: tailor.to_string(),
                item: item.to_string(),
                property: rule.property,
            });
        }
    }

    /// Registers the derived rules of one drawable, keyed by the parent
    /// slot they mirror. Local rules are ignored here.
    pub fn add_deps_on(&mut self, rules: &[Rule], item: &str, tailor: &str) {
        for rule in rules {
            let Some(dep) = &rule.depends_on else {
                continue;
            };
            let key = SlotKey::new(dep.property, dep.name.clone());
            self.derived.entry(key).or_default().push(DerivedBinding {
                tailor: tailor.to_string(),
                item: item.to_string(),
                property: rule.property,
                modifier: dep.modifier,
            });
        }
    }

    /// All drawables bound to a local slot, in registration order.
    pub fn local_bindings(&self, key: &SlotKey) -> &[LocalBinding] {
        self.local.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All drawables derived from a local slot, in registration order.
    pub fn derived_bindings(&self, key: &SlotKey) -> &[DerivedBinding] {
        self.derived.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The color slots each tailor exposes to the UI, de-duplicated, in
    /// first-seen order. Position 0 is the primary color, position 1 the
    /// secondary.
    pub fn ui_adjustable_slots(&self) -> HashMap<String, Vec<SlotKey>> {
        let mut slots: HashMap<String, Vec<SlotKey>> = HashMap::new();
        for key in &self.local_order {
            for binding in self.local_bindings(key) {
                let keys = slots.entry(binding.tailor.clone()).or_default();
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
        slots
    }
}

// ============================================================================
// Tests
// ============================================================================
