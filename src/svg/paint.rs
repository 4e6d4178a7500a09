//! Paint resolution and visibility repair.
//!
//! A detached icon loses everything it used to inherit: group-level
//! `fill`/`stroke`, the `color` behind `currentColor`, and the hidden state
//! of sprite containers. This module bakes what can be recovered from the
//! source ancestors and then guarantees every primitive ends up with a
//! visible fill or stroke.

use roxmltree::Node;

use super::css::{Declaration, StyleRules, Subject};
use super::document::{NON_VISUAL, SHAPES};
use super::geom::parse_number;
use super::node::ElementNode;
use crate::config::SynthesisConfig;

/// Properties copied from source ancestors onto a detached clone.
pub const INHERITED: &[&str] = &[
    "fill",
    "stroke",
    "stroke-width",
    "color",
    "fill-rule",
    "fill-opacity",
    "stroke-opacity",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-dasharray",
    "stroke-miterlimit",
];

/// Paint state flowing from parent to child during repair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<String>,
    pub color: Option<String>,
}

// ============================================================================
// Property access
// ============================================================================

/// Find `name` in a `style="a: b; c: d"` attribute value.
pub fn style_declaration<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().trim_end_matches("!important").trim())
    })
}

/// Presentation property on a detached element. `style` wins over attributes.
fn property<'a>(element: &'a ElementNode, name: &str) -> Option<&'a str> {
    element
        .attr("style")
        .and_then(|style| style_declaration(style, name))
        .or_else(|| element.attr(name))
        .filter(|value| !value.is_empty() && *value != "inherit")
}

/// Declared value after the cascade: important rules, then the `style`
/// attribute, then normal rules, then the presentation attribute.
fn cascade<'a>(
    style: Option<&'a str>,
    rule: Option<&'a Declaration>,
    attribute: Option<&'a str>,
    name: &str,
) -> Option<&'a str> {
    let inline = style.and_then(|style| style_declaration(style, name));
    match rule {
        Some(rule) if rule.important => Some(rule.value.as_str()),
        rule => inline.or(rule.map(|d| d.value.as_str())).or(attribute),
    }
    .filter(|value| !value.is_empty() && *value != "inherit")
}

/// Cascaded property on a detached element placed under `ancestors`.
pub fn cascaded(
    element: &ElementNode,
    sheet: &StyleRules,
    ancestors: &[Subject],
    name: &str,
) -> Option<String> {
    let rule = sheet.declared(&Subject::of(element), ancestors, name);
    cascade(element.attr("style"), rule, element.attr(name), name).map(str::to_string)
}

/// Cascaded property on a source node, matched against its real ancestors.
pub fn node_cascaded(node: Node<'_, '_>, sheet: &StyleRules, name: &str) -> Option<String> {
    let rule = if sheet.is_empty() {
        None
    } else {
        sheet.declared(&Subject::of_node(node), &Subject::ancestors_of(node), name)
    };
    cascade(node.attribute("style"), rule, node.attribute(name), name).map(str::to_string)
}

/// Write a property where it wins the cascade.
///
/// When a stylesheet rule sets it, a presentation attribute would lose, so
/// the value goes into `style` (marked important if the rule is).
fn write_cascaded(element: &mut ElementNode, sheet: &StyleRules, ancestors: &[Subject], name: &str, value: &str) {
    let important = sheet
        .declared(&Subject::of(element), ancestors, name)
        .map(|rule| rule.important);
    match important {
        Some(important) => {
            let value = if important {
                format!("{value} !important")
            } else {
                value.to_string()
            };
            set_style_declaration(element, name, &value);
        }
        None => set_property(element, name, value),
    }
}

/// Set `name` inside the `style` attribute, adding the attribute if needed.
fn set_style_declaration(element: &mut ElementNode, name: &str, value: &str) {
    let style = match element.attr("style") {
        Some(style) if style_declaration(style, name).is_some() => rewrite_style(style, name, Some(value)),
        Some(style) if !style.trim().trim_end_matches(';').is_empty() => {
            format!("{};{name}:{value}", style.trim().trim_end_matches(';'))
        }
        _ => format!("{name}:{value}"),
    };
    element.set_attr("style", style);
}

/// Set a property where it will take effect: inside `style` when the style
/// already declares it, as an attribute otherwise.
pub fn set_property(element: &mut ElementNode, name: &str, value: &str) {
    if let Some(style) = element.attr("style")
        && style_declaration(style, name).is_some()
    {
        let rewritten = rewrite_style(style, name, Some(value));
        element.set_attr("style", rewritten);
    } else {
        element.set_attr(name, value);
    }
}

/// Remove a property from both the attribute and the `style` declaration.
pub fn remove_property(element: &mut ElementNode, name: &str) {
    element.remove_attr(name);
    if let Some(style) = element.attr("style")
        && style_declaration(style, name).is_some()
    {
        let rewritten = rewrite_style(style, name, None);
        if rewritten.is_empty() {
            element.remove_attr("style");
        } else {
            element.set_attr("style", rewritten);
        }
    }
}

fn rewrite_style(style: &str, name: &str, value: Option<&str>) -> String {
    style
        .split(';')
        .filter(|decl| !decl.trim().is_empty())
        .filter_map(|decl| match decl.split_once(':') {
            Some((key, _)) if key.trim().eq_ignore_ascii_case(name) => {
                value.map(|v| format!("{}:{}", key.trim(), v))
            }
            _ => Some(decl.trim().to_string()),
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[inline]
pub fn is_current_color(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("currentColor")
}

/// Anything except `none`/`transparent` paints something.
#[inline]
pub fn is_visible_paint(value: &str) -> bool {
    let value = value.trim();
    !(value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("transparent"))
}

// ============================================================================
// Context baking
// ============================================================================

/// Copy inheritable properties from `source`'s ancestors onto its clone.
///
/// Ancestor values include what `sheet` gives them. The nearest ancestor
/// wins; properties the clone already gets (inline or from `sheet`) are kept.
pub fn bake_inherited(clone: &mut ElementNode, source: Node<'_, '_>, sheet: &StyleRules) {
    let placement = [Subject::named("svg")];
    for ancestor in source.ancestors().skip(1).filter(Node::is_element) {
        for &name in INHERITED {
            if cascaded(clone, sheet, &placement, name).is_none()
                && let Some(value) = node_cascaded(ancestor, sheet, name)
            {
                clone.set_attr(name, value);
            }
        }
    }
}

/// Drop the hidden state sprite sheets put on icon containers.
pub fn unhide(clone: &mut ElementNode) {
    if property(clone, "display").is_some_and(|v| v.eq_ignore_ascii_case("none")) {
        remove_property(clone, "display");
    }
    if property(clone, "visibility")
        .is_some_and(|v| v.eq_ignore_ascii_case("hidden") || v.eq_ignore_ascii_case("collapse"))
    {
        remove_property(clone, "visibility");
    }
    if property(clone, "opacity").and_then(parse_number) == Some(0.0) {
        remove_property(clone, "opacity");
    }
}

// ============================================================================
// Visibility repair
// ============================================================================

/// Guarantee every primitive under `element` renders visibly.
///
/// - `currentColor` is baked to the nearest `color`, else `config.color`.
/// - A primitive with no fill and no visible stroke gets an explicit fill.
/// - `fill="none"` (or a bare `<line>`) without a visible stroke gets a stroke.
/// - `fill="none"` with a visible stroke is left alone.
/// - `<use>` sites count as primitives; `<defs>`/`<symbol>` content only
///   gets strokes where its own `fill="none"` would hide it.
///
/// `sheet` holds the rules the fragment carries. Paint they set is read
/// like any other declaration, and repairs they would override are written
/// into `style`. `element` is assumed to sit directly under the `<svg>` root.
///
/// Returns the number of properties changed.
pub fn repair(element: &mut ElementNode, inherited: &Paint, sheet: &StyleRules, config: &SynthesisConfig) -> usize {
    let mut ancestors = vec![Subject::named("svg")];
    repair_in(element, inherited, sheet, &mut ancestors, config)
}

fn repair_in(
    element: &mut ElementNode,
    inherited: &Paint,
    sheet: &StyleRules,
    ancestors: &mut Vec<Subject>,
    config: &SynthesisConfig,
) -> usize {
    if NON_VISUAL.contains(&element.name.as_str()) {
        return 0;
    }

    let mut fixes = 0;
    let color = cascaded(element, sheet, ancestors, "color")
        .filter(|c| !is_current_color(c))
        .or_else(|| inherited.color.clone());

    for name in ["fill", "stroke"] {
        if cascaded(element, sheet, ancestors, name).is_some_and(|v| is_current_color(&v)) {
            let baked = color.as_deref().unwrap_or(&config.color).to_string();
            write_cascaded(element, sheet, ancestors, name, &baked);
            fixes += 1;
        }
    }

    let placed: &[Subject] = ancestors;
    let mut paint = Paint {
        fill: cascaded(element, sheet, placed, "fill").or_else(|| inherited.fill.clone()),
        stroke: cascaded(element, sheet, placed, "stroke").or_else(|| inherited.stroke.clone()),
        stroke_width: cascaded(element, sheet, placed, "stroke-width")
            .or_else(|| inherited.stroke_width.clone()),
        color,
    };

    if matches!(element.name.as_str(), "defs" | "symbol") {
        // Rendered through <use>; fill comes from the use site, which is
        // repaired like a primitive.
        let from_use_site = Paint {
            fill: Some(config.color.clone()),
            ..paint
        };
        ancestors.push(Subject::of(element));
        for child in element.elements_mut() {
            fixes += repair_in(child, &from_use_site, sheet, ancestors, config);
        }
        ancestors.pop();
        return fixes;
    }

    if SHAPES.contains(&element.name.as_str()) || element.name == "use" {
        let zero_width = paint
            .stroke_width
            .as_deref()
            .and_then(parse_number)
            .is_some_and(|w| w <= 0.0);
        let stroke_visible =
            !zero_width && paint.stroke.as_deref().is_some_and(is_visible_paint);
        let fill_none = paint.fill.as_deref().is_some_and(|f| !is_visible_paint(f));

        if (fill_none || element.name == "line") && !stroke_visible {
            write_cascaded(element, sheet, ancestors, "stroke", &config.color);
            if paint.stroke_width.is_none() || zero_width {
                write_cascaded(element, sheet, ancestors, "stroke-width", &config.stroke_width);
                paint.stroke_width = Some(config.stroke_width.clone());
            }
            paint.stroke = Some(config.color.clone());
            fixes += 1;
        } else if paint.fill.is_none() && !stroke_visible {
            write_cascaded(element, sheet, ancestors, "fill", &config.color);
            paint.fill = Some(config.color.clone());
            fixes += 1;
        }
    }

    ancestors.push(Subject::of(element));
    for child in element.elements_mut() {
        fixes += repair_in(child, &paint, sheet, ancestors, config);
    }
    ancestors.pop();
    fixes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SynthesisConfig {
        SynthesisConfig::default()
    }

    fn no_rules() -> StyleRules {
        StyleRules::default()
    }

    fn path(attrs: &[(&str, &str)]) -> ElementNode {
        attrs
            .iter()
            .fold(ElementNode::new("path").with_attr("d", "M0 0 L10 10"), |e, (k, v)| {
                e.with_attr(k, *v)
            })
    }

    #[test]
    fn test_style_declaration() {
        let style = "fill: none; stroke:#333 !important;stroke-width:2";
        assert_eq!(style_declaration(style, "fill"), Some("none"));
        assert_eq!(style_declaration(style, "stroke"), Some("#333"));
        assert_eq!(style_declaration(style, "color"), None);
    }

    #[test]
    fn test_set_property_prefers_existing_style() {
        let mut e = path(&[("style", "stroke:none;opacity:1")]);
        set_property(&mut e, "stroke", "#000");
        assert_eq!(e.attr("style"), Some("stroke:#000;opacity:1"));
        assert_eq!(e.attr("stroke"), None);

        set_property(&mut e, "fill", "red");
        assert_eq!(e.attr("fill"), Some("red"));
    }

    #[test]
    fn test_fill_none_without_stroke_gets_stroke() {
        let mut e = path(&[("fill", "none")]);
        assert_eq!(repair(&mut e, &Paint::default(), &no_rules(), &config()), 1);
        assert_eq!(e.attr("fill"), Some("none"));
        assert_eq!(e.attr("stroke"), Some("#000000"));
        assert_eq!(e.attr("stroke-width"), Some("1"));
    }

    #[test]
    fn test_outline_art_is_left_alone() {
        let mut e = path(&[("fill", "none"), ("stroke", "#123456")]);
        let before = e.clone();
        assert_eq!(repair(&mut e, &Paint::default(), &no_rules(), &config()), 0);
        assert_eq!(e, before);
    }

    #[test]
    fn test_unset_paint_gets_fill() {
        let mut e = path(&[]);
        repair(&mut e, &Paint::default(), &no_rules(), &config());
        assert_eq!(e.attr("fill"), Some("#000000"));
    }

    #[test]
    fn test_inherited_fill_counts() {
        let mut g = ElementNode::new("g").with_attr("fill", "red");
        g.push(path(&[]));
        assert_eq!(repair(&mut g, &Paint::default(), &no_rules(), &config()), 0);
    }

    #[test]
    fn test_current_color_is_baked() {
        let mut g = ElementNode::new("g").with_attr("color", "#ff0000");
        g.push(path(&[("fill", "currentColor")]));
        g.push(path(&[("fill", "none"), ("style", "stroke: currentcolor")]));
        repair(&mut g, &Paint::default(), &no_rules(), &config());

        let children: Vec<_> = g.elements().collect();
        assert_eq!(children[0].attr("fill"), Some("#ff0000"));
        assert_eq!(children[1].attr("style"), Some("stroke:#ff0000"));

        let mut lone = path(&[("stroke", "currentColor"), ("fill", "none")]);
        repair(&mut lone, &Paint::default(), &no_rules(), &config());
        assert_eq!(lone.attr("stroke"), Some("#000000"));
    }

    #[test]
    fn test_zero_width_stroke_is_invisible() {
        let mut e = path(&[("fill", "none"), ("stroke", "red"), ("stroke-width", "0")]);
        repair(&mut e, &Paint::default(), &no_rules(), &config());
        assert_eq!(e.attr("stroke-width"), Some("1"));
    }

    #[test]
    fn test_line_always_gets_stroke() {
        let mut line = ElementNode::new("line").with_attr("x2", "10");
        repair(&mut line, &Paint::default(), &no_rules(), &config());
        assert_eq!(line.attr("stroke"), Some("#000000"));
    }

    #[test]
    fn test_referenced_content_inherits_from_use_site() {
        let mut g = ElementNode::new("g");
        let mut defs = ElementNode::new("defs");
        defs.push(path(&[("id", "a")]));
        defs.push(path(&[("id", "b"), ("fill", "none")]));
        g.push(defs);
        g.push(ElementNode::new("use").with_attr("href", "#a"));
        g.push(ElementNode::new("use").with_attr("href", "#b").with_attr("fill", "red"));
        repair(&mut g, &Paint::default(), &no_rules(), &config());

        let children: Vec<_> = g.elements().collect();
        let defs: Vec<_> = children[0].elements().collect();
        assert_eq!(defs[0].attr("fill"), None);
        assert_eq!(defs[1].attr("stroke"), Some("#000000"));
        assert_eq!(children[1].attr("fill"), Some("#000000"));
        assert_eq!(children[2].attr("fill"), Some("red"));
    }

    #[test]
    fn test_clip_paths_untouched() {
        let mut clip = ElementNode::new("clipPath");
        clip.push(path(&[("fill", "none")]));
        let before = clip.clone();
        repair(&mut clip, &Paint::default(), &no_rules(), &config());
        assert_eq!(clip, before);
    }

    #[test]
    fn test_bake_inherited_nearest_wins() {
        let doc = roxmltree::Document::parse(
            r#"<svg fill="none" stroke="blue"><g style="stroke: red"><path id="p" d="M0 0 L1 1"/></g></svg>"#,
        )
        .unwrap();
        let source = doc
            .descendants()
            .find(|n| n.attribute("id") == Some("p"))
            .unwrap();
        let mut clone = ElementNode::detach(source).unwrap();
        bake_inherited(&mut clone, source, &no_rules());
        assert_eq!(clone.attr("stroke"), Some("red"));
        assert_eq!(clone.attr("fill"), Some("none"));
    }

    #[test]
    fn test_class_fill_none_is_repaired_inline() {
        let sheet = StyleRules::parse(".o { fill: none } .outline { fill: none; stroke: #333333 }");
        let mut g = ElementNode::new("g");
        g.push(path(&[("class", "o")]));
        g.push(path(&[("class", "outline")]));
        g.push(path(&[]));
        repair(&mut g, &Paint::default(), &sheet, &config());

        let children: Vec<_> = g.elements().collect();
        // No rule sets stroke, so the attribute is enough.
        assert_eq!(children[0].attr("stroke"), Some("#000000"));
        assert_eq!(children[0].attr("fill"), None);
        assert_eq!(children[1].attrs.len(), 2);
        assert_eq!(children[2].attr("fill"), Some("#000000"));
    }

    #[test]
    fn test_rule_overridden_through_style() {
        let sheet = StyleRules::parse(
            ".dim { fill: currentColor; stroke: none } .hard { fill: none !important; stroke: none !important }",
        );
        let mut g = ElementNode::new("g").with_attr("color", "#ff8800");
        g.push(path(&[("class", "dim")]));
        g.push(path(&[("class", "hard")]));
        repair(&mut g, &Paint::default(), &sheet, &config());

        let children: Vec<_> = g.elements().collect();
        assert_eq!(children[0].attr("style"), Some("fill:#ff8800"));
        assert_eq!(children[1].attr("style"), Some("stroke:#000000 !important"));
        assert_eq!(children[1].attr("stroke-width"), Some("1"));
    }

    #[test]
    fn test_bake_inherited_reads_class_rules() {
        let doc = roxmltree::Document::parse(
            r#"<svg><g class="lines"><path id="p" d="M0 0 L1 1"/></g></svg>"#,
        )
        .unwrap();
        let sheet = StyleRules::parse(".lines { fill: none; stroke: blue }");
        let source = doc
            .descendants()
            .find(|n| n.attribute("id") == Some("p"))
            .unwrap();
        let mut clone = ElementNode::detach(source).unwrap();
        bake_inherited(&mut clone, source, &sheet);
        assert_eq!(clone.attr("fill"), Some("none"));
        assert!(clone.attr("stroke").is_some());
    }

    #[test]
    fn test_unhide() {
        let mut e = ElementNode::new("g")
            .with_attr("style", "display:none;fill:red")
            .with_attr("opacity", "0");
        unhide(&mut e);
        assert_eq!(e.attr("style"), Some("fill:red"));
        assert_eq!(e.attr("opacity"), None);
    }
}
