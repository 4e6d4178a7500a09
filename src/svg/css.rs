//! Stylesheet rules for paint resolution.
//!
//! `<style>` text is parsed with lightningcss. Only selectors built from
//! type, class and id parts joined by descendant combinators are kept;
//! pseudo-classes, attribute selectors and other combinators never match.
//! Rules inside `@media` blocks count as unconditional.

use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;
use roxmltree::Node;

use super::node::ElementNode;
use crate::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Specificity(u16, u16, u16);

#[derive(Debug, Clone)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

#[derive(Debug, Clone)]
struct Selector {
    parts: Vec<Compound>,
    specificity: Specificity,
}

#[derive(Debug, Clone)]
struct Rule {
    selector: Selector,
    declarations: Vec<Declaration>,
    order: usize,
}

/// One `name: value` pair from a rule body.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

/// An element as selectors see it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subject {
    pub tag: String,
    pub id: Option<String>,
    pub class: Option<String>,
}

impl Subject {
    pub fn named(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn of(element: &ElementNode) -> Self {
        Self {
            tag: element.name.clone(),
            id: element.attr("id").map(str::to_string),
            class: element.attr("class").map(str::to_string),
        }
    }

    pub fn of_node(node: Node<'_, '_>) -> Self {
        Self {
            tag: node.tag_name().name().to_string(),
            id: node.attribute("id").map(str::to_string),
            class: node.attribute("class").map(str::to_string),
        }
    }

    /// Element ancestors of `node`, outermost first.
    pub fn ancestors_of(node: Node<'_, '_>) -> Vec<Self> {
        let mut chain: Vec<Self> = node
            .ancestors()
            .skip(1)
            .filter(Node::is_element)
            .map(Self::of_node)
            .collect();
        chain.reverse();
        chain
    }
}

/// Ordered style rules of one document.
#[derive(Debug, Clone, Default)]
pub struct StyleRules {
    rules: Vec<Rule>,
}

impl StyleRules {
    pub fn parse(css: &str) -> Self {
        let mut rules = Vec::new();
        let mut order = 0;
        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };
        match StyleSheet::parse(css, options) {
            Ok(sheet) => collect_rules(sheet.rules, &mut rules, &mut order),
            Err(e) => debug!("css"; "stylesheet ignored: {}", e),
        }
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Winning declaration of `name` for `subject`.
    ///
    /// `ancestors` lists the subject's element ancestors, outermost first.
    /// Important declarations beat normal ones, then specificity, then
    /// source order.
    pub fn declared(&self, subject: &Subject, ancestors: &[Subject], name: &str) -> Option<&Declaration> {
        self.rules
            .iter()
            .filter(|rule| rule.selector.matches(subject, ancestors))
            .flat_map(|rule| {
                rule.declarations
                    .iter()
                    .filter(|d| d.name.eq_ignore_ascii_case(name))
                    .map(move |d| ((d.important, rule.selector.specificity, rule.order), d))
            })
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, d)| d)
    }
}

fn collect_rules(rules: CssRuleList, out: &mut Vec<Rule>, order: &mut usize) {
    for rule in rules.0 {
        match rule {
            CssRule::Style(style_rule) => {
                let selectors = style_rule
                    .selectors
                    .to_css_string(PrinterOptions::default())
                    .unwrap_or_default();
                let declarations = style_rule
                    .declarations
                    .to_css_string(PrinterOptions::default())
                    .map(|body| parse_declarations(&body))
                    .unwrap_or_default();
                if !declarations.is_empty() {
                    for raw in selectors.split(',') {
                        if let Some(selector) = parse_selector(raw) {
                            out.push(Rule {
                                selector,
                                declarations: declarations.clone(),
                                order: *order,
                            });
                        }
                    }
                }
                *order += 1;
            }
            CssRule::Media(media) => collect_rules(media.rules, out, order),
            _ => {}
        }
    }
}

/// Split a serialized declaration block (`fill: none; stroke: red !important`).
fn parse_declarations(body: &str) -> Vec<Declaration> {
    body.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let value = value.trim();
            let (value, important) = match value.strip_suffix("!important") {
                Some(rest) => (rest.trim_end(), true),
                None => (value, false),
            };
            let name = name.trim();
            (!name.is_empty() && !value.is_empty()).then(|| Declaration {
                name: name.to_ascii_lowercase(),
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

fn parse_selector(raw: &str) -> Option<Selector> {
    let parts = raw
        .split_whitespace()
        .map(parse_compound)
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() {
        return None;
    }

    let specificity = parts.iter().fold(Specificity::default(), |s, part| {
        Specificity(
            s.0 + u16::from(part.id.is_some()),
            s.1 + part.classes.len() as u16,
            s.2 + u16::from(part.tag.is_some()),
        )
    });
    Some(Selector { parts, specificity })
}

fn parse_compound(token: &str) -> Option<Compound> {
    if token.contains([':', '[', ']', '>', '+', '~']) {
        return None;
    }

    let mut compound = Compound {
        tag: None,
        id: None,
        classes: Vec::new(),
    };
    let tag_end = token.find(['.', '#']).unwrap_or(token.len());
    match &token[..tag_end] {
        "" | "*" => {}
        tag if tag.chars().all(is_ident_char) => compound.tag = Some(tag.to_string()),
        _ => return None,
    }

    let mut rest = &token[tag_end..];
    while let Some(marker) = rest.chars().next() {
        let body = &rest[1..];
        let end = body.find(['.', '#']).unwrap_or(body.len());
        let name = &body[..end];
        if name.is_empty() || !name.chars().all(is_ident_char) {
            return None;
        }
        if marker == '.' {
            compound.classes.push(name.to_string());
        } else if compound.id.replace(name.to_string()).is_some() {
            return None;
        }
        rest = &body[end..];
    }

    let empty = compound.tag.is_none() && compound.id.is_none() && compound.classes.is_empty();
    (!empty || token == "*").then_some(compound)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl Compound {
    fn matches(&self, subject: &Subject) -> bool {
        self.tag
            .as_ref()
            .is_none_or(|tag| tag.eq_ignore_ascii_case(&subject.tag))
            && self.id.as_ref().is_none_or(|id| subject.id.as_ref() == Some(id))
            && self.classes.iter().all(|class| {
                subject
                    .class
                    .as_deref()
                    .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
            })
    }
}

impl Selector {
    fn matches(&self, subject: &Subject, ancestors: &[Subject]) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(subject) {
            return false;
        }

        let mut remaining = ancestors;
        for part in rest.iter().rev() {
            let Some(pos) = remaining.iter().rposition(|a| part.matches(a)) else {
                return false;
            };
            remaining = &remaining[..pos];
        }
        true
    }
}
