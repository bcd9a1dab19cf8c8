//! Coloring rules embedded in layer element names.
//!
//! Layer art encodes its coloring contract in the names of its groups and
//! paths. This module provides the data model for one decoded rule, the
//! parser for the naming convention ([`parser`]), and the per-redraw index
//! that separates user-facing color slots from derived ones ([`index`]).

pub mod index;
pub mod parser;

pub use index::{DerivedBinding, LocalBinding, RuleIndex, SlotKey};
pub use parser::parse;

use crate::color::Color;

// ============================================================================
// Rule Data Model
// ============================================================================

/// Which paint slot of a drawable a rule colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintProperty {
    Fill,
    Stroke,
}

impl PaintProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Stroke => "stroke",
        }
    }
}

/// Transform applied to a parent color before it reaches a derived drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModifier {
    Darker,
    Lighter,
}

impl ColorModifier {
    /// Applies the modifier's fixed-magnitude luminance shift.
    pub fn apply(self, color: Color) -> Color {
        match self {
            Self::Darker => color.darker(),
            Self::Lighter => color.lighter(),
        }
    }
}

/// The parent slot a derived rule mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Logical name of the parent slot.
    pub name: String,

    /// Which paint property of the parent to mirror. Names without an
    /// explicit `-f`/`-s` tag default to fill.
    pub property: PaintProperty,

    /// Optional luminance transform applied to the mirrored color.
    pub modifier: Option<ColorModifier>,
}

/// One decoded coloring instruction from an element name.
///
/// A rule without a [`Dependency`] is *local*: it declares a user-facing
/// color slot named `target`, and painting that slot colors the element
/// that carried the rule. A rule with a dependency is *derived*: the
/// carrying element's color is recomputed from the parent slot whenever
/// that slot changes, and it is never exposed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Paint property of the carrying element this rule colors.
    pub property: PaintProperty,

    /// Logical name of the color slot.
    pub target: String,

    /// Group id from the `name:group` suffix. Rules sharing a target fold
    /// into one logical slot; the id only serves to keep authored element
    /// names unique.
    pub group: Option<String>,

    /// Present on derived rules only.
    pub depends_on: Option<Dependency>,
}

impl Rule {
    /// True for rules that expose a user-facing color slot.
    pub fn is_local(&self) -> bool {
        self.depends_on.is_none()
    }
}
