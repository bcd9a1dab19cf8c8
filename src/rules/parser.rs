//! Parser for the rule naming convention.
//!
//! Element names encode coloring rules with four nested separators, split
//! strictly outermost-in: combinator, then clause, then modifier, then
//! property tag.
//!
//! Supported forms:
//!
//! 1. **Local**: `{fill|stroke}::{name}` declares a user-adjustable color
//!    slot `{name}` and binds the element's paint property to it.
//!    Example: `fill::hand`.
//! 2. **Grouped local**: `{fill|stroke}::{name}:{group}`, as above; the
//!    group id keeps authored names unique while folding all members into
//!    the one slot. Example: `fill::military:1`, `fill::military:2`.
//! 3. **Derived**: `{parent}[-f|-s]::{fill|stroke}::{name}`: the element's
//!    paint property mirrors the parent slot's resolved color. The `-f`/`-s`
//!    tag selects the parent's fill or stroke (fill when omitted). Derived
//!    slots are never exposed to the user. Example: `body-f::stroke::hat`.
//! 4. **Derived with modifier**: `{parent}[-f|-s]:{darker|lighter}::...`,
//!    as above with a luminance shift applied to the mirrored color.
//!    Example: `hat-s:darker::fill::tie`.
//! 5. **Combined**: `{rule}&&{rule}`: each piece parses independently and
//!    all resulting rules apply to the carrying element. Authoring tools
//!    that escape `&` in element ids write the combinator as `_x26__x26_`;
//!    both spellings are accepted.
//!
//! Malformed fragments never error: they are dropped (with a debug-level
//! log) and the rest of the name still parses.

use super::{ColorModifier, Dependency, PaintProperty, Rule};

const COMBINATOR: &str = "&&";
const COMBINATOR_ESCAPED: &str = "_x26__x26_";
const CLAUSE_SEPARATOR: &str = "::";
const MODIFIER_SEPARATOR: char = ':';
const PROPERTY_SEPARATOR: char = '-';

/// Parses an element name into its list of coloring rules.
///
/// Returns an empty list for empty or entirely malformed input.
pub fn parse(name: &str) -> Vec<Rule> {
    if name.is_empty() {
        return Vec::new();
    }
    name.replace(COMBINATOR_ESCAPED, COMBINATOR)
        .split(COMBINATOR)
        .filter_map(parse_piece)
        .collect()
}

fn parse_piece(piece: &str) -> Option<Rule> {
    let rule = parse_clauses(piece);
    if rule.is_none() && !piece.is_empty() {
        tracing::debug!(fragment = piece, "dropping malformed rule fragment");
    }
    rule
}

fn parse_clauses(piece: &str) -> Option<Rule> {
    let clauses: Vec<&str> = piece.split(CLAUSE_SEPARATOR).collect();
    match clauses.as_slice() {
        // local: [property][name]
        [property, target] => {
            let property = parse_property(property)?;
            let (target, group) = parse_target(target)?;
            Some(Rule {
                property,
                target,
                group,
                depends_on: None,
            })
        }
        // derived: [parent][property][name]
        [parent, property, target] => {
            let depends_on = parse_dependency(parent)?;
            let property = parse_property(property)?;
            let (target, group) = parse_target(target)?;
            Some(Rule {
                property,
                target,
                group,
                depends_on: Some(depends_on),
            })
        }
        _ => None,
    }
}

fn parse_property(token: &str) -> Option<PaintProperty> {
    match token {
        "fill" => Some(PaintProperty::Fill),
        "stroke" => Some(PaintProperty::Stroke),
        _ => None,
    }
}

/// Splits the trailing `:group` suffix off a slot name.
fn parse_target(token: &str) -> Option<(String, Option<String>)> {
    let mut pieces = token.split(MODIFIER_SEPARATOR);
    let name = pieces.next().filter(|n| !n.is_empty())?;
    let group = pieces.next();
    if pieces.next().is_some() {
        return None;
    }
    Some((name.to_string(), group.map(str::to_string)))
}

/// Decodes the parent segment of a derived rule: logical name, optional
/// `-f`/`-s` property tag, optional `:darker`/`:lighter` modifier.
fn parse_dependency(token: &str) -> Option<Dependency> {
    let mut pieces = token.split(MODIFIER_SEPARATOR);
    let head = pieces.next()?;
    let modifier = match pieces.next() {
        Some("darker") => Some(ColorModifier::Darker),
        Some("lighter") => Some(ColorModifier::Lighter),
        Some(other) => {
            // unknown presets mirror the parent color untransformed
            tracing::debug!(modifier = other, "ignoring unknown color modifier");
            None
        }
        None => None,
    };
    if pieces.next().is_some() {
        return None;
    }

    let (name, property) = match head.rsplit_once(PROPERTY_SEPARATOR) {
        Some((name, "f")) => (name, PaintProperty::Fill),
        Some((name, "s")) => (name, PaintProperty::Stroke),
        _ => (head, PaintProperty::Fill),
    };
    if name.is_empty() {
        return None;
    }

    Some(Dependency {
        name: name.to_string(),
        property,
        modifier,
    })
}

// ============================================================================
// Tests
// ============================================================================
