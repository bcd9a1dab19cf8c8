//! The composite avatar controller.
//!
//! A `Haberdashery` owns every [`Tailor`], the rule index, the drawable
//! map, and the composite surface. Structural changes (dressing swaps,
//! clears, imports) funnel through [`update`](Haberdashery::update), which
//! compares a compact serialization of the current selections against the
//! last drawn one and rebuilds the composite only when something actually
//! changed, or when a layer asset that was still loading at the last draw
//! has since arrived.
//!
//! One full redraw is a synchronous pass: clear the rule index, rebuild
//! each tailor's drawable tree, register every decoded rule, apply colors
//! through the index, rasterize each tailor's private surface, and blend
//! them onto the composite in z order. Rule registration always completes
//! across all tailors before any color is applied, because derived colors
//! may cross tailor boundaries.

use std::collections::{BTreeMap, HashMap};

use image::RgbaImage;
use rand::RngCore;

use crate::catalog::{
    BASE_COLOR_KEY, ComponentSettings, ComponentState, SavedAvatar, TailorConfig,
};
use crate::color::Color;
use crate::drawable::{self, DrawableRef, LayerSource};
use crate::error::Result;
use crate::render;
use crate::rules::{PaintProperty, RuleIndex, SlotKey};
use crate::tailor::{ColorSlot, Cursor, Tailor};

/// Separator between tailor name and element name in drawable-map keys.
/// Chosen so it can never collide with the rule grammar's separators
/// inside an element name.
pub const ITEM_SEPARATOR: &str = "::::";

/// Default edge length of the square composite surface.
const CANVAS_SIZE: u32 = 400;

fn item_key(tailor: &str, element: &str) -> String {
    format!("{tailor}{ITEM_SEPARATOR}{element}")
}

// ============================================================================
// Color Assignments
// ============================================================================

/// Resolved colors for one (tailor, slot) pair, ready to apply.
///
/// The direct half aggregates every drawable bound to the slot into one
/// instruction, since they all take the same color. Derived entries stay
/// individual because each may carry its own modifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAssignment {
    pub direct: DirectAssignment,
    pub derived: Vec<DerivedAssignment>,
}

/// The user-chosen color applied to the slot's own drawables.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectAssignment {
    pub property: PaintProperty,
    pub color: Color,
    pub items: Vec<String>,
}

/// A mirrored (optionally transformed) color for one derived drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedAssignment {
    pub property: PaintProperty,
    pub color: Color,
    pub item: String,
}

// ============================================================================
// Haberdashery
// ============================================================================

/// The whole avatar: an ordered collection of tailors rendered into one
/// composite surface.
pub struct Haberdashery {
    /// All tailors, ascending z-index; iteration order is paint order.
    tailors: Vec<Tailor>,

    /// UI focus position (which tailor the selector buttons operate on).
    active: usize,

    base_tailor: String,
    base_color: Color,
    size: u32,

    /// Rebuilt from scratch on every structural redraw.
    rules: RuleIndex,

    /// `tailor::::element` → drawable handle, for the current redraw only.
    drawables: HashMap<String, DrawableRef>,

    /// Serialization of the last drawn state; the dirty-check key.
    serialized: String,

    /// Set when a renderable asset arrived for a currently selected
    /// dressing since the last redraw.
    asset_arrived: bool,

    /// Whether any selected dressing was still loading at the last update.
    awaiting_assets: bool,

    surface: RgbaImage,
    redraws: u64,
}

impl Haberdashery {
    /// Builds the avatar from catalog records. The records are sorted into
    /// ascending z-index order; `base_tailor` names the category that
    /// receives the default color pass and carries the base color.
    pub fn new(
        catalog: impl IntoIterator<Item = TailorConfig>,
        base_tailor: impl Into<String>,
    ) -> Self {
        let mut tailors: Vec<Tailor> = catalog.into_iter().map(|c| Tailor::from_config(&c)).collect();
        tailors.sort_by_key(Tailor::z_index);

        Self {
            tailors,
            active: 0,
            base_tailor: base_tailor.into(),
            base_color: Color::WHITE,
            size: CANVAS_SIZE,
            rules: RuleIndex::new(),
            drawables: HashMap::new(),
            serialized: String::new(),
            asset_arrived: false,
            awaiting_assets: false,
            surface: RgbaImage::new(CANVAS_SIZE, CANVAS_SIZE),
            redraws: 0,
        }
    }

    /// Changes the composite surface size. Intended for construction time;
    /// takes effect on the next redraw.
    pub fn with_canvas_size(mut self, size: u32) -> Self {
        self.size = size.max(1);
        self.surface = RgbaImage::new(self.size, self.size);
        self
    }

    pub fn canvas_size(&self) -> u32 {
        self.size
    }

    pub fn base_color(&self) -> Color {
        self.base_color
    }

    pub fn tailors(&self) -> &[Tailor] {
        &self.tailors
    }

    pub fn tailor(&self, name: &str) -> Option<&Tailor> {
        self.tailors.iter().find(|t| t.name() == name)
    }

    fn tailor_mut(&mut self, name: &str) -> Option<&mut Tailor> {
        self.tailors.iter_mut().find(|t| t.name() == name)
    }

    /// The tailor the UI focus cursor points at.
    pub fn active_tailor(&self) -> Option<&Tailor> {
        self.tailors.get(self.active)
    }

    /// Moves the UI focus to a tailor by name.
    pub fn set_active_tailor(&mut self, name: &str) -> bool {
        match self.tailors.iter().position(|t| t.name() == name) {
            Some(index) => {
                self.set_index(index);
                true
            }
            None => false,
        }
    }

    /// Tailors that should appear in a selector layout: more than one
    /// dressing to choose from, in `ui_order`.
    pub fn ui_tailors(&self) -> Vec<&Tailor> {
        let mut list: Vec<&Tailor> = self
            .tailors
            .iter()
            .filter(|t| t.dressings().len() > 1)
            .collect();
        list.sort_by_key(|t| t.ui_order());
        list
    }

    /// The color slots a tailor currently exposes, primary first. Empty
    /// until a redraw has registered the tailor's rules.
    pub fn adjustable_slots(&self, tailor: &str) -> Vec<SlotKey> {
        self.rules
            .ui_adjustable_slots()
            .remove(tailor)
            .unwrap_or_default()
    }

    /// Looks up a drawable from the current redraw by tailor and element
    /// name.
    pub fn drawable(&self, tailor: &str, element: &str) -> Option<DrawableRef> {
        self.drawables.get(&item_key(tailor, element)).cloned()
    }

    /// The composite surface as of the last redraw.
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// Number of full redraws performed so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Whether any selected dressing's content was still loading at the
    /// last update.
    pub fn awaiting_assets(&self) -> bool {
        self.awaiting_assets
    }

    // ---- Assets ----

    /// Delivers layer content for one dressing. If the dressing is
    /// currently selected, the next [`update`](Self::update) redraws even
    /// though the selections are unchanged.
    pub fn attach_asset(&mut self, tailor: &str, dressing: &str, source: LayerSource) {
        let Some(entry) = self.tailor_mut(tailor) else {
            tracing::warn!(tailor, "ignoring asset for unknown tailor");
            return;
        };
        let became_ready = entry.attach_asset(dressing, source);
        if became_ready && entry.selected_dressing_name() == dressing {
            self.asset_arrived = true;
        }
    }

    /// Delivers a whole bundle of dressing content for one tailor.
    pub fn attach_bundle(
        &mut self,
        tailor: &str,
        bundle: impl IntoIterator<Item = (String, LayerSource)>,
    ) {
        for (dressing, source) in bundle {
            self.attach_asset(tailor, &dressing, source);
        }
    }

    /// Records that a dressing's content will not arrive.
    pub fn mark_asset_missing(&mut self, tailor: &str, dressing: &str) {
        if let Some(entry) = self.tailor_mut(tailor) {
            entry.mark_asset_missing(dressing);
        }
    }

    // ---- Dirty-check and redraw ----

    /// Serializes the current selections: URL-encoded `tailor=dressing`
    /// pairs in z order plus the base color, joined with `&`.
    pub fn serialization(&self) -> String {
        let mut parts: Vec<String> = self
            .tailors
            .iter()
            .map(|t| {
                format!(
                    "{}={}",
                    urlencoding::encode(t.name()),
                    urlencoding::encode(t.selected_dressing_name())
                )
            })
            .collect();
        parts.push(format!(
            "{}={}",
            BASE_COLOR_KEY,
            urlencoding::encode(&self.base_color.to_hex())
        ));
        parts.join("&")
    }

    /// Recomputes the dirty-check state and redraws if needed. Returns
    /// whether a redraw happened.
    ///
    /// A redraw happens when the serialization differs from the last drawn
    /// one, or when an asset for a selected dressing has arrived since;
    /// the earlier draw rendered that layer blank, and this is the
    /// catch-up. Calling `update` again with nothing changed is free.
    pub fn update(&mut self) -> bool {
        let serialized = self.serialization();
        let dirty = serialized != self.serialized || self.asset_arrived;
        if dirty {
            self.redraw();
            self.serialized = serialized;
            self.asset_arrived = false;
        }
        self.awaiting_assets = self.tailors.iter().any(Tailor::has_pending_asset);
        dirty
    }

    /// Performs one full structural redraw.
    fn redraw(&mut self) {
        self.rules.clear();
        self.drawables.clear();

        // rebuild every tailor's drawable tree and register all rules
        // before any color is applied
        for tailor in &mut self.tailors {
            tailor.clear_root();
            let root = match tailor.selected_source() {
                Some(source) => source.instantiate(),
                None => continue,
            };

            for rule_node in drawable::collect_rule_nodes(&root) {
                let item = item_key(tailor.name(), &rule_node.name);
                let (local, derived): (Vec<_>, Vec<_>) =
                    rule_node.rules.into_iter().partition(|r| r.is_local());
                self.rules.add_local(&local, &item, tailor.name());
                self.rules.add_deps_on(&derived, &item, tailor.name());
                self.drawables.insert(item, rule_node.node);
            }

            tailor.set_root(root);
        }

        // color every tailor/slot pair with a chosen color; when nothing
        // is chosen anywhere, give the base tailor one default pass
        let mut assignments = Vec::new();
        for tailor in &self.tailors {
            for slot in ColorSlot::ALL {
                if tailor.color(slot).is_some() {
                    if let Some(assignment) = self.build_color_map(slot, tailor.name()) {
                        assignments.push(assignment);
                    }
                }
            }
        }
        if assignments.is_empty() {
            if let Some(assignment) =
                self.build_color_map_with(ColorSlot::Primary, &self.base_tailor, self.base_color)
            {
                assignments.push(assignment);
            }
        }
        for assignment in &assignments {
            self.apply_color_map(assignment);
        }

        self.flush_surfaces();
        self.redraws = self.redraws.wrapping_add(1);
    }

    /// Rasterizes each tailor's private surface and blends them onto the
    /// composite in z order.
    fn flush_surfaces(&mut self) {
        let size = self.size;
        for tailor in &mut self.tailors {
            tailor.render_surface(size);
        }

        let mut composite = RgbaImage::new(size, size);
        for tailor in &self.tailors {
            if let Some(layer) = tailor.surface() {
                render::composite_surface(&mut composite, layer);
            }
        }
        self.surface = composite;
    }

    // ---- Color application ----

    /// Builds the color instructions for one of a tailor's slots, using
    /// the tailor's chosen color (or the default when unset). Returns
    /// `None` when the tailor exposes no such slot.
    pub fn build_color_map(&self, slot: ColorSlot, tailor: &str) -> Option<ColorAssignment> {
        let color = self.tailor(tailor)?.color(slot).unwrap_or(Color::WHITE);
        self.build_color_map_with(slot, tailor, color)
    }

    fn build_color_map_with(
        &self,
        slot: ColorSlot,
        tailor: &str,
        color: Color,
    ) -> Option<ColorAssignment> {
        let key = self
            .rules
            .ui_adjustable_slots()
            .remove(tailor)?
            .into_iter()
            .nth(slot.position())?;

        // identically-named slots can exist in several tailors; only this
        // tailor's drawables take the direct color
        let items: Vec<String> = self
            .rules
            .local_bindings(&key)
            .iter()
            .filter(|binding| binding.tailor == tailor)
            .map(|binding| binding.item.clone())
            .collect();
        let direct = DirectAssignment {
            property: key.property,
            color,
            items,
        };

        let derived = self
            .rules
            .derived_bindings(&key)
            .iter()
            .map(|binding| DerivedAssignment {
                property: binding.property,
                color: match binding.modifier {
                    Some(modifier) => modifier.apply(color),
                    None => color,
                },
                item: binding.item.clone(),
            })
            .collect();

        Some(ColorAssignment { direct, derived })
    }

    /// Applies a built assignment, mutating the referenced drawables'
    /// paint. Does not touch any surface; callers flush when ready.
    pub fn apply_color_map(&self, assignment: &ColorAssignment) {
        for item in &assignment.direct.items {
            if let Some(node) = self.drawables.get(item) {
                node.borrow_mut()
                    .set_paint(assignment.direct.property, assignment.direct.color);
            }
        }
        for derived in &assignment.derived {
            if let Some(node) = self.drawables.get(&derived.item) {
                node.borrow_mut().set_paint(derived.property, derived.color);
            }
        }
    }

    /// Chooses a color for one of a tailor's slots and repaints the
    /// composite without a structural rebuild.
    pub fn change_color(&mut self, slot: ColorSlot, tailor: &str, color: Color) {
        if self.tailor(tailor).is_none() {
            tracing::warn!(tailor, "ignoring color change for unknown tailor");
            return;
        }
        if let Some(entry) = self.tailor_mut(tailor) {
            entry.set_color(slot, color);
        }
        if slot == ColorSlot::Primary && self.base_tailor == tailor {
            self.base_color = color;
        }
        if let Some(assignment) = self.build_color_map(slot, tailor) {
            self.apply_color_map(&assignment);
            self.flush_surfaces();
        }
        // the visible state is current; keep the dirty-check key in step
        self.serialized = self.serialization();
    }

    /// Sets the global base color (the base tailor's primary).
    pub fn set_base_color(&mut self, color: Color) {
        let base_tailor = self.base_tailor.clone();
        self.change_color(ColorSlot::Primary, &base_tailor, color);
    }

    // ---- Selection operations ----

    /// Advances the focused tailor to its next dressing.
    pub fn next_dressing(&mut self) -> bool {
        let changed = self
            .tailors
            .get_mut(self.active)
            .is_some_and(|t| t.next());
        if changed {
            self.tailors[self.active].clear_colors();
        }
        self.update();
        changed
    }

    /// Moves the focused tailor to its previous dressing.
    pub fn prev_dressing(&mut self) -> bool {
        let changed = self
            .tailors
            .get_mut(self.active)
            .is_some_and(|t| t.prev());
        if changed {
            self.tailors[self.active].clear_colors();
        }
        self.update();
        changed
    }

    /// Moves the focused tailor to a random different dressing.
    pub fn random_dressing(&mut self, rng: &mut dyn RngCore) -> bool {
        let changed = self
            .tailors
            .get_mut(self.active)
            .is_some_and(|t| t.randomize(rng));
        if changed {
            self.tailors[self.active].clear_colors();
        }
        self.update();
        changed
    }

    /// Scrambles the whole avatar: random dressing per tailor, random base
    /// color, chosen colors dropped.
    pub fn randomize_all(&mut self, rng: &mut dyn RngCore) {
        for tailor in &mut self.tailors {
            tailor.clear_colors();
            tailor.randomize(rng);
        }
        let color = Color::random(rng);
        self.base_color = color;
        let base_tailor = self.base_tailor.clone();
        if let Some(tailor) = self.tailor_mut(&base_tailor) {
            tailor.set_color(ColorSlot::Primary, color);
        }
        self.update();
    }

    /// Resets the avatar: clearable tailors go blank, the rest snap to
    /// their first dressing, all colors drop, the base color returns to
    /// the default.
    pub fn clear(&mut self) {
        for tailor in &mut self.tailors {
            tailor.clear_colors();
            tailor.set_index(0);
        }
        self.base_color = Color::WHITE;
        let base_tailor = self.base_tailor.clone();
        if let Some(tailor) = self.tailor_mut(&base_tailor) {
            tailor.set_color(ColorSlot::Primary, Color::WHITE);
        }
        self.update();
    }

    // ---- Export / import ----

    /// The current configuration as a saved state: each tailor's active
    /// dressing name and chosen colors, plus the base color.
    pub fn export(&self) -> SavedAvatar {
        let components: BTreeMap<String, ComponentState> = self
            .tailors
            .iter()
            .map(|tailor| {
                (
                    tailor.name().to_string(),
                    ComponentState::Settings(ComponentSettings {
                        dressing_name: Some(tailor.selected_dressing_name().to_string()),
                        color: tailor.color(ColorSlot::Primary),
                        alt_color: tailor.color(ColorSlot::Secondary),
                    }),
                )
            })
            .collect();

        SavedAvatar {
            components,
            base_color: Some(self.base_color),
        }
    }

    /// Restores a saved state. Unknown dressing names fall back to index 0
    /// and unknown tailors are ignored; exactly one structural redraw runs
    /// at the end, never mid-loop.
    pub fn import(&mut self, saved: &SavedAvatar) {
        let components = saved.normalized(&self.base_tailor);

        for tailor in &mut self.tailors {
            tailor.clear_colors();
            match components.get(tailor.name()) {
                Some(settings) => {
                    tailor.select_by_name(settings.dressing_name.as_deref().unwrap_or(""));
                    if let Some(color) = settings.color {
                        tailor.set_color(ColorSlot::Primary, color);
                    }
                    if let Some(color) = settings.alt_color {
                        tailor.set_color(ColorSlot::Secondary, color);
                    }
                }
                None => {
                    tailor.set_index(0);
                }
            }
        }

        let base = saved.base_color.or_else(|| {
            self.tailor(&self.base_tailor)
                .and_then(|t| t.color(ColorSlot::Primary))
        });
        if let Some(color) = base {
            self.base_color = color;
            let base_tailor = self.base_tailor.clone();
            if let Some(tailor) = self.tailor_mut(&base_tailor) {
                tailor.set_color(ColorSlot::Primary, color);
            }
        }

        self.update();
    }

    /// Restores a saved state from either text form (JSON or serialized
    /// pairs), auto-detected.
    pub fn import_str(&mut self, input: &str) -> Result<()> {
        let saved = SavedAvatar::parse(input)?;
        self.import(&saved);
        Ok(())
    }
}

impl Cursor for Haberdashery {
    fn len(&self) -> usize {
        self.tailors.len()
    }

    fn index(&self) -> usize {
        self.active
    }

    fn set_index(&mut self, index: usize) -> bool {
        if index >= self.tailors.len() || index == self.active {
            return false;
        }
        self.active = index;
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn body_source() -> LayerSource {
        LayerSource::group("").with_children([
            LayerSource::path("fill::torso", "M10 10h80v80H10z"),
            LayerSource::group("torso-f:darker::stroke::outline")
                .with_children([LayerSource::path("", "M10 90h80")]),
        ])
    }

    fn hat_source() -> LayerSource {
        LayerSource::path("fill::cap", "M20 0h60v30H20z")
    }

    fn catalog() -> Vec<TailorConfig> {
        vec![
            TailorConfig::new("body")
                .with_allow_clear(false)
                .with_z_index(10)
                .with_dressings(["a", "b"]),
            TailorConfig::new("hat")
                .with_z_index(20)
                .with_dressings(["x"]),
        ]
    }

    fn avatar() -> Haberdashery {
        let mut avatar = Haberdashery::new(catalog(), "body").with_canvas_size(64);
        avatar.attach_asset("body", "a", body_source());
        avatar.attach_asset("body", "b", body_source());
        avatar.attach_asset("hat", "x", hat_source());
        avatar
    }

    #[test]
    fn tailors_sort_into_z_order() {
        let reversed = vec![
            TailorConfig::new("hat").with_z_index(20),
            TailorConfig::new("body").with_z_index(10),
        ];
        let avatar = Haberdashery::new(reversed, "body");
        assert_eq!(avatar.tailors()[0].name(), "body");
        assert_eq!(avatar.tailors()[1].name(), "hat");
    }

    #[test]
    fn import_selects_by_name_with_blank_fallback() {
        let mut avatar = avatar();
        let mut saved = SavedAvatar::default();
        saved
            .components
            .insert("body".into(), ComponentState::Name("b".into()));
        saved
            .components
            .insert("hat".into(), ComponentState::Name("".into()));
        avatar.import(&saved);

        assert_eq!(avatar.tailor("body").unwrap().index(), 1);
        assert_eq!(avatar.tailor("hat").unwrap().index(), 0);
        assert_eq!(avatar.tailor("hat").unwrap().selected_dressing_name(), "");

        let exported = avatar.export();
        assert_eq!(exported.components["body"].dressing_name(), Some("b"));
        assert_eq!(exported.components["hat"].dressing_name(), Some(""));
    }

    #[test]
    fn import_unknown_dressing_falls_back_to_first() {
        let mut avatar = avatar();
        let mut saved = SavedAvatar::default();
        saved
            .components
            .insert("body".into(), ComponentState::Name("no-such".into()));
        avatar.import(&saved);
        assert_eq!(avatar.tailor("body").unwrap().index(), 0);
    }

    #[test]
    fn export_import_roundtrip_is_observationally_equal() {
        let mut avatar = avatar();
        avatar.set_active_tailor("body");
        avatar.next_dressing();
        avatar.change_color(ColorSlot::Primary, "hat", Color::new(9, 9, 9));
        let before = avatar.serialization();

        let mut restored = {
            let mut fresh = Haberdashery::new(catalog(), "body").with_canvas_size(64);
            fresh.attach_asset("body", "a", body_source());
            fresh.attach_asset("body", "b", body_source());
            fresh.attach_asset("hat", "x", hat_source());
            fresh
        };
        restored.import(&avatar.export());

        assert_eq!(restored.serialization(), before);
        assert_eq!(
            restored.tailor("hat").unwrap().color(ColorSlot::Primary),
            Some(Color::new(9, 9, 9))
        );
    }

    #[test]
    fn update_is_idempotent() {
        let mut avatar = avatar();
        assert!(avatar.update());
        assert_eq!(avatar.redraws(), 1);

        assert!(!avatar.update());
        assert_eq!(avatar.redraws(), 1);
    }

    #[test]
    fn noop_cursor_moves_skip_the_redraw() {
        let single = vec![
            TailorConfig::new("face")
                .with_allow_clear(false)
                .with_dressings(["only"]),
        ];
        let mut avatar = Haberdashery::new(single, "face").with_canvas_size(16);
        avatar.update();
        let drawn = avatar.redraws();

        assert!(!avatar.next_dressing());
        assert!(!avatar.prev_dressing());
        assert_eq!(avatar.redraws(), drawn);
    }

    #[test]
    fn dressing_swap_triggers_exactly_one_redraw() {
        let mut avatar = avatar();
        avatar.update();
        let drawn = avatar.redraws();

        avatar.set_active_tailor("hat");
        assert!(avatar.next_dressing());
        assert_eq!(avatar.redraws(), drawn + 1);
        assert_eq!(avatar.tailor("hat").unwrap().selected_dressing_name(), "x");
    }

    #[test]
    fn default_pass_colors_the_base_tailor() {
        let mut avatar = avatar();
        avatar.update();

        let torso = avatar.drawable("body", "fill::torso").unwrap();
        assert_eq!(torso.borrow().fill, Some(Color::WHITE));

        // the derived outline mirrors the default color, darkened
        let outline = avatar
            .drawable("body", "torso-f:darker::stroke::outline")
            .unwrap();
        assert_eq!(outline.borrow().stroke, Some(Color::new(179, 179, 179)));
    }

    #[test]
    fn change_color_propagates_to_derived_drawables() {
        let mut avatar = avatar();
        avatar.update();
        avatar.change_color(ColorSlot::Primary, "body", Color::new(128, 128, 128));

        let torso = avatar.drawable("body", "fill::torso").unwrap();
        assert_eq!(torso.borrow().fill, Some(Color::new(128, 128, 128)));

        let outline = avatar
            .drawable("body", "torso-f:darker::stroke::outline")
            .unwrap();
        assert_eq!(outline.borrow().stroke, Some(Color::new(90, 90, 90)));
    }

    #[test]
    fn identically_named_slots_stay_per_tailor() {
        let catalog = vec![
            TailorConfig::new("left")
                .with_allow_clear(false)
                .with_z_index(1)
                .with_dressings(["l"]),
            TailorConfig::new("right")
                .with_allow_clear(false)
                .with_z_index(2)
                .with_dressings(["r"]),
        ];
        let mut avatar = Haberdashery::new(catalog, "left").with_canvas_size(16);
        avatar.attach_asset("left", "l", LayerSource::path("fill::hand", "M0 0h4v4H0z"));
        avatar.attach_asset("right", "r", LayerSource::path("fill::hand", "M4 4h4v4H4z"));
        avatar.update();

        avatar.change_color(ColorSlot::Primary, "right", Color::new(5, 6, 7));

        let right = avatar.drawable("right", "fill::hand").unwrap();
        assert_eq!(right.borrow().fill, Some(Color::new(5, 6, 7)));

        // the base tailor keeps its default-pass color
        let left = avatar.drawable("left", "fill::hand").unwrap();
        assert_eq!(left.borrow().fill, Some(Color::WHITE));
    }

    #[test]
    fn late_asset_arrival_triggers_one_catchup_redraw() {
        let mut avatar = Haberdashery::new(
            vec![
                TailorConfig::new("body")
                    .with_allow_clear(false)
                    .with_dressings(["a"]),
            ],
            "body",
        )
        .with_canvas_size(16);

        avatar.update();
        assert!(avatar.awaiting_assets());
        assert!(avatar.drawable("body", "fill::torso").is_none());
        let drawn = avatar.redraws();

        // still loading: nothing changed, nothing redrawn
        assert!(!avatar.update());
        assert_eq!(avatar.redraws(), drawn);

        avatar.attach_asset("body", "a", body_source());
        assert!(avatar.update());
        assert_eq!(avatar.redraws(), drawn + 1);
        assert!(!avatar.awaiting_assets());
        assert!(avatar.drawable("body", "fill::torso").is_some());
    }

    #[test]
    fn adjustable_slots_expose_primary_then_secondary() {
        let catalog = vec![
            TailorConfig::new("coat")
                .with_allow_clear(false)
                .with_dressings(["duffel"]),
        ];
        let mut avatar = Haberdashery::new(catalog, "coat").with_canvas_size(16);
        avatar.attach_asset(
            "coat",
            "duffel",
            LayerSource::group("").with_children([
                LayerSource::path("fill::cloth", "M0 0h8v8H0z"),
                LayerSource::path("stroke::buttons", "M1 1h6"),
            ]),
        );
        avatar.update();

        let slots = avatar.adjustable_slots("coat");
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0], SlotKey::new(PaintProperty::Fill, "cloth"));
        assert_eq!(slots[1], SlotKey::new(PaintProperty::Stroke, "buttons"));

        avatar.change_color(ColorSlot::Secondary, "coat", Color::new(7, 7, 7));
        let buttons = avatar.drawable("coat", "stroke::buttons").unwrap();
        assert_eq!(buttons.borrow().stroke, Some(Color::new(7, 7, 7)));
    }

    #[test]
    fn clear_resets_selections_and_colors() {
        let mut avatar = avatar();
        let mut saved = SavedAvatar::default();
        saved
            .components
            .insert("body".into(), ComponentState::Name("b".into()));
        saved
            .components
            .insert("hat".into(), ComponentState::Name("x".into()));
        avatar.import(&saved);
        avatar.change_color(ColorSlot::Primary, "hat", Color::new(1, 2, 3));

        avatar.clear();

        assert_eq!(avatar.tailor("body").unwrap().selected_dressing_name(), "a");
        assert_eq!(avatar.tailor("hat").unwrap().selected_dressing_name(), "");
        assert_eq!(avatar.tailor("hat").unwrap().color(ColorSlot::Primary), None);
        assert_eq!(avatar.base_color(), Color::WHITE);
    }

    #[test]
    fn randomize_all_changes_every_multi_dressing_tailor() {
        let mut avatar = avatar();
        avatar.update();
        let body_before = avatar.tailor("body").unwrap().index();
        let hat_before = avatar.tailor("hat").unwrap().index();

        avatar.randomize_all(&mut StdRng::seed_from_u64(11));

        assert_ne!(avatar.tailor("body").unwrap().index(), body_before);
        assert_ne!(avatar.tailor("hat").unwrap().index(), hat_before);
    }

    #[test]
    fn serialization_is_url_encoded_pairs_in_z_order() {
        let avatar = avatar();
        assert_eq!(avatar.serialization(), "body=a&hat=&base_color=%23ffffff");
    }

    #[test]
    fn import_str_accepts_both_text_forms() {
        let mut avatar = avatar();
        avatar
            .import_str("body=b&hat=&base_color=%23336699")
            .unwrap();
        assert_eq!(avatar.tailor("body").unwrap().index(), 1);
        assert_eq!(avatar.base_color(), Color::new(0x33, 0x66, 0x99));
        let serialized = avatar.serialization();

        let mut from_json = {
            let mut fresh = Haberdashery::new(catalog(), "body").with_canvas_size(64);
            fresh.attach_asset("body", "a", body_source());
            fresh.attach_asset("body", "b", body_source());
            fresh.attach_asset("hat", "x", hat_source());
            fresh
        };
        from_json
            .import_str(r##"{"components": {"body": "b", "hat": ""}, "base_color": "#336699"}"##)
            .unwrap();
        assert_eq!(from_json.serialization(), serialized);
    }

    #[test]
    fn composite_surface_shows_the_colored_base_layer() {
        let mut avatar = avatar();
        avatar.update();

        // torso (10..90 in layer coordinates) covers the canvas center and
        // takes the default white
        let pixel = avatar.surface().get_pixel(32, 32);
        assert_eq!(pixel.0, [255, 255, 255, 255]);
    }

    #[test]
    fn ui_tailors_filter_and_sort_by_ui_order() {
        let catalog = vec![
            TailorConfig::new("body")
                .with_allow_clear(false)
                .with_z_index(1)
                .with_ui_order(5)
                .with_dressings(["a", "b"]),
            TailorConfig::new("badge")
                .with_allow_clear(false)
                .with_z_index(2)
                .with_dressings(["only"]),
            TailorConfig::new("hat")
                .with_z_index(3)
                .with_ui_order(1)
                .with_dressings(["x"]),
        ];
        let avatar = Haberdashery::new(catalog, "body");

        let ui: Vec<&str> = avatar.ui_tailors().iter().map(|t| t.name()).collect();
        // badge has a single dressing and no blank, so it offers no choice
        assert_eq!(ui, vec!["hat", "body"]);
    }

    #[test]
    fn active_tailor_focus_is_a_cursor() {
        let mut avatar = avatar();
        assert_eq!(avatar.active_tailor().unwrap().name(), "body");

        assert!(avatar.set_active_tailor("hat"));
        assert_eq!(avatar.active_tailor().unwrap().name(), "hat");
        assert!(!avatar.set_active_tailor("no-such"));

        assert!(avatar.next());
        assert_eq!(avatar.active_tailor().unwrap().name(), "body");
    }
}
