//! haberdash: composite avatar assembly from swappable vector layers.
//!
//! This crate builds a character avatar out of independently authored
//! illustration layers. Each layer category (a *tailor*, e.g. "hat") offers
//! a set of selectable *dressings*; the artwork inside a dressing names its
//! groups and paths with a small embedded convention that declares which
//! parts the user may recolor and which parts derive their color from
//! another part. The [`Haberdashery`] owns the whole stack, rebuilds its
//! rule index on structural changes, and recomposites only when its
//! serialized state actually changed.
//!
//! # Example
//!
//! ```
//! use haberdash::{Haberdashery, LayerSource, TailorConfig};
//!
//! let catalog = vec![
//!     TailorConfig::new("body")
//!         .with_allow_clear(false)
//!         .with_z_index(10)
//!         .with_dressings(["round"]),
//!     TailorConfig::new("hat")
//!         .with_z_index(20)
//!         .with_dressings(["cap"]),
//! ];
//! let mut avatar = Haberdashery::new(catalog, "body");
//!
//! // layer content arrives whenever the asset pipeline delivers it
//! avatar.attach_asset(
//!     "body",
//!     "round",
//!     LayerSource::path("fill::torso", "M10 10h380v380H10z"),
//! );
//! avatar.update();
//!
//! // cycle the focused tailor and persist the result
//! avatar.set_active_tailor("hat");
//! avatar.next_dressing();
//! let saved = avatar.export();
//!
//! // a later session restores it with one redraw
//! avatar.import(&saved);
//! ```
//!
//! # Naming convention
//!
//! Element names decode to coloring rules (see [`parse`]):
//!
//! ```
//! use haberdash::{parse, PaintProperty};
//!
//! // `hat` is a user-facing fill slot
//! let rules = parse("fill::hat");
//! assert!(rules[0].is_local());
//!
//! // this element's stroke mirrors the resolved fill of `body`
//! let rules = parse("body-f::stroke::hat");
//! assert_eq!(rules[0].property, PaintProperty::Stroke);
//! assert_eq!(rules[0].depends_on.as_ref().unwrap().name, "body");
//! ```

mod catalog;
mod color;
mod drawable;
mod error;
mod haberdashery;
mod render;
mod rules;
mod tailor;

pub use catalog::{
    ComponentSettings, ComponentState, DressingConfig, SavedAvatar, TailorConfig, load_catalog,
};
pub use color::Color;
pub use drawable::{
    Drawable, DrawableRef, LayerSource, RuleNode, collect_rule_nodes, to_svg_markup,
};
pub use error::{Error, Result};
pub use haberdashery::{
    ColorAssignment, DerivedAssignment, DirectAssignment, Haberdashery, ITEM_SEPARATOR,
};
pub use rules::{
    ColorModifier, Dependency, DerivedBinding, LocalBinding, PaintProperty, Rule, RuleIndex,
    SlotKey, parse,
};
pub use tailor::{ColorSlot, Cursor, Dressing, DressingAsset, Tailor};
