//! One swappable layer category and the shared selection-cursor behavior.
//!
//! A `Tailor` owns the ordered list of dressings a user can cycle through
//! for one category, the currently selected index, the category's coloring
//! state, and a private surface the haberdashery composites from. Dressing
//! content arrives asynchronously; each dressing tracks its own asset
//! state so the compositor can render what is available and catch up when
//! a late asset lands.

use image::RgbaImage;
use rand::RngCore;

use crate::catalog::TailorConfig;
use crate::color::Color;
use crate::drawable::{self, DrawableRef, LayerSource};
use crate::render;

// ============================================================================
// Cursor
// ============================================================================

/// A circular selection cursor over an ordered collection, with change
/// notification through the `bool` returns.
///
/// Implemented by [`Tailor`] (over its dressings) and by the haberdashery
/// (over its tailors, for UI focus). Only the three position primitives
/// are required; the cycling behavior is shared.
pub trait Cursor {
    fn len(&self) -> usize;

    fn index(&self) -> usize;

    /// Moves the cursor. Returns true only when the position actually
    /// changed; out-of-range indices are ignored.
    fn set_index(&mut self, index: usize) -> bool;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances circularly. A one-element collection never changes.
    fn next(&mut self) -> bool {
        match self.len() {
            0 => false,
            n => self.set_index((self.index() + 1) % n),
        }
    }

    /// Retreats circularly. A one-element collection never changes.
    fn prev(&mut self) -> bool {
        match self.len() {
            0 => false,
            n => self.set_index((self.index() + n - 1) % n),
        }
    }

    /// Jumps to a random position that is guaranteed to differ from the
    /// current one whenever more than one position exists. Implemented as
    /// a random non-zero circular offset rather than rejection sampling.
    fn randomize(&mut self, rng: &mut dyn RngCore) -> bool {
        let n = self.len();
        if n < 2 {
            return false;
        }
        let offset = 1 + rng.next_u32() as usize % (n - 1);
        self.set_index((self.index() + offset) % n)
    }
}

// ============================================================================
// Color Slots
// ============================================================================

/// The two user-facing color slots a tailor can expose.
///
/// Slot order matches the UI-adjustable slot table: position 0 is the
/// primary color, position 1 the secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    Primary,
    Secondary,
}

impl ColorSlot {
    pub const ALL: [ColorSlot; 2] = [ColorSlot::Primary, ColorSlot::Secondary];

    /// Position of this slot in the adjustable slot table.
    pub fn position(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

// ============================================================================
// Dressings
// ============================================================================

/// Delivery state of one dressing's layer content.
#[derive(Debug, Clone, PartialEq)]
pub enum DressingAsset {
    /// The synthetic "nothing selected" dressing; renders empty by design.
    Blank,
    /// Catalogued, but content has not been delivered yet.
    Pending,
    /// Content delivered and renderable.
    Ready(LayerSource),
    /// Content delivery failed; renders empty.
    Missing,
}

/// One selectable option within a tailor.
#[derive(Debug, Clone, PartialEq)]
pub struct Dressing {
    name: String,
    asset: DressingAsset,
}

impl Dressing {
    /// A catalogued dressing awaiting its content.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset: DressingAsset::Pending,
        }
    }

    /// The synthetic blank dressing, named with the empty string.
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            asset: DressingAsset::Blank,
        }
    }

    /// A dressing with content already available.
    pub fn with_source(name: impl Into<String>, source: LayerSource) -> Self {
        Self {
            name: name.into(),
            asset: DressingAsset::Ready(source),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.asset, DressingAsset::Blank)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.asset, DressingAsset::Pending)
    }

    /// Renderable content, when delivered.
    pub fn source(&self) -> Option<&LayerSource> {
        match &self.asset {
            DressingAsset::Ready(source) => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// Tailor
// ============================================================================

/// One selectable layer category.
///
/// Created once per avatar session from catalog configuration; dressing
/// swaps only move the selection index. The instantiated drawable tree and
/// the rendered surface are rebuilt by the haberdashery on each structural
/// redraw.
#[derive(Debug)]
pub struct Tailor {
    name: String,
    dressings: Vec<Dressing>,
    selected: usize,
    allow_clear: bool,
    flip_x: bool,
    z_index: i32,
    ui_order: i32,
    color: Option<Color>,
    alt_color: Option<Color>,
    root: Option<DrawableRef>,
    surface: Option<RgbaImage>,
}

impl Tailor {
    /// Builds a tailor from its catalog record. Clearable tailors get the
    /// synthetic blank dressing at index 0.
    pub fn from_config(config: &TailorConfig) -> Self {
        let mut dressings = Vec::with_capacity(config.dressings.len() + 1);
        if config.allow_clear {
            dressings.push(Dressing::blank());
        }
        dressings.extend(config.dressings.iter().map(|d| Dressing::new(&d.name)));

        Self {
            name: config.name.clone(),
            dressings,
            selected: 0,
            allow_clear: config.allow_clear,
            flip_x: config.flip_x,
            z_index: config.z_index,
            ui_order: config.ui_order,
            color: None,
            alt_color: None,
            root: None,
            surface: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn ui_order(&self) -> i32 {
        self.ui_order
    }

    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    pub fn allow_clear(&self) -> bool {
        self.allow_clear
    }

    pub fn dressings(&self) -> &[Dressing] {
        &self.dressings
    }

    pub fn selected_dressing(&self) -> Option<&Dressing> {
        self.dressings.get(self.selected)
    }

    /// The active dressing's name; empty for the blank dressing (and for a
    /// tailor with no dressings at all).
    pub fn selected_dressing_name(&self) -> &str {
        self.selected_dressing().map(Dressing::name).unwrap_or("")
    }

    /// The active dressing's layer content, when it is renderable.
    pub fn selected_source(&self) -> Option<&LayerSource> {
        self.selected_dressing().and_then(Dressing::source)
    }

    /// Selects a dressing by name, falling back to index 0 when the name
    /// is unknown. Returns true when the selection changed.
    pub fn select_by_name(&mut self, name: &str) -> bool {
        let index = match self.dressings.iter().position(|d| d.name() == name) {
            Some(index) => index,
            None => {
                if !name.is_empty() {
                    tracing::warn!(
                        tailor = self.name.as_str(),
                        dressing = name,
                        "unknown dressing name, falling back to first"
                    );
                }
                0
            }
        };
        self.set_index(index)
    }

    pub fn color(&self, slot: ColorSlot) -> Option<Color> {
        match slot {
            ColorSlot::Primary => self.color,
            ColorSlot::Secondary => self.alt_color,
        }
    }

    pub fn set_color(&mut self, slot: ColorSlot, color: Color) {
        match slot {
            ColorSlot::Primary => self.color = Some(color),
            ColorSlot::Secondary => self.alt_color = Some(color),
        }
    }

    /// Drops both chosen colors, as happens when the dressing changes.
    pub fn clear_colors(&mut self) {
        self.color = None;
        self.alt_color = None;
    }

    /// Delivers layer content for a dressing. Returns true when the
    /// dressing was not renderable before, i.e. a redraw may now show more
    /// than the last one did.
    pub fn attach_asset(&mut self, dressing: &str, source: LayerSource) -> bool {
        let Some(entry) = self.dressings.iter_mut().find(|d| d.name() == dressing) else {
            tracing::warn!(
                tailor = self.name.as_str(),
                dressing,
                "ignoring asset for unknown dressing"
            );
            return false;
        };
        if entry.is_blank() {
            tracing::warn!(
                tailor = self.name.as_str(),
                "ignoring asset for the blank dressing"
            );
            return false;
        }
        let was_ready = entry.source().is_some();
        entry.asset = DressingAsset::Ready(source);
        !was_ready
    }

    /// Records that a dressing's content will not arrive. The dressing
    /// stays selectable and renders empty.
    pub fn mark_asset_missing(&mut self, dressing: &str) {
        if let Some(entry) = self
            .dressings
            .iter_mut()
            .find(|d| d.name() == dressing && !d.is_blank())
        {
            entry.asset = DressingAsset::Missing;
        }
    }

    /// True while the active dressing's content is still on its way.
    pub fn has_pending_asset(&self) -> bool {
        self.selected_dressing().is_some_and(Dressing::is_pending)
    }

    /// The rendered private surface from the last redraw, if the active
    /// dressing produced one.
    pub fn surface(&self) -> Option<&RgbaImage> {
        self.surface.as_ref()
    }

    pub(crate) fn clear_root(&mut self) {
        self.root = None;
    }

    pub(crate) fn set_root(&mut self, root: DrawableRef) {
        self.root = Some(root);
    }

    /// Rasterizes the current drawable tree onto this tailor's private
    /// surface, replacing whatever the previous redraw left there.
    pub(crate) fn render_surface(&mut self, size: u32) {
        self.surface = self.root.as_ref().and_then(|root| {
            let markup = drawable::to_svg_markup(root, size, self.flip_x);
            render::rasterize_layer(&markup, size)
        });
    }
}

impl Cursor for Tailor {
    fn len(&self) -> usize {
        self.dressings.len()
    }

    fn index(&self) -> usize {
        self.selected
    }

    fn set_index(&mut self, index: usize) -> bool {
        if index >= self.dressings.len() || index == self.selected {
            return false;
        }
        self.selected = index;
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
