//! Inline CSS parsing and computed-style resolution.
//!
//! Browsers answer "what is the computed color of this cell" through a live
//! rendering engine. Here that question is answered by a [`StyleResolver`]
//! which is injected into the style extractor, so the whole pipeline runs
//! against plain trees.

use crate::html::HtmlNode;
use crate::html::TAG_TABLE;
use std::cell::RefCell;
use std::collections::HashSet;
use thiserror::Error;

/// Longest ancestor chain walked while resolving inherited properties.
const MAX_ANCESTOR_DEPTH: usize = 512;

/// Properties whose computed value is taken from the parent when unset.
const INHERITED_PROPERTIES: [&str; 8] = [
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "line-height",
    "text-align",
    "visibility",
];

/// Errors raised while probing the style of an element.
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Ancestor chain deeper than {0} elements")]
    DepthExceeded(usize),

    #[error("Style of <{tag}> is unavailable: {message}")]
    Unavailable { tag: String, message: String },
}

/// Declarations of one inline `style` attribute, in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parses `property: value; ...` pairs. Property names are lowercased,
    /// `!important` is dropped and empty declarations are skipped.
    pub fn parse(style: &str) -> Self {
        let declarations = style
            .split(';')
            .filter_map(|declaration| declaration.split_once(':'))
            .map(|(property, value)| {
                let value = value.trim();
                let value = value
                    .strip_suffix("!important")
                    .map(str::trim_end)
                    .unwrap_or(value);
                (property.trim().to_ascii_lowercase(), value.to_owned())
            })
            .filter(|(property, value)| !property.is_empty() && !value.is_empty())
            .collect();
        Self { declarations }
    }

    /// Reads the `style` attribute of an element.
    pub fn of<N: HtmlNode>(node: &N) -> Self {
        node.attr("style").map(Self::parse).unwrap_or_default()
    }

    /// Returns the value of a property; the last declaration wins.
    /// Longhands fall back to the matching shorthand when absent.
    pub fn get(&self, property: &str) -> Option<&str> {
        let value = self.lookup(property);
        match property {
            "background-color" => value.or_else(|| self.lookup("background").and_then(background_color)),
            "text-decoration" => value.or_else(|| self.lookup("text-decoration-line")),
            _ => value,
        }
    }

    fn lookup(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }
}

/// Extracts the color component of a `background` shorthand.
fn background_color(value: &str) -> Option<&str> {
    if value.contains("url(") || value.contains("gradient(") {
        return None;
    }
    if let Some(start) = value.find("rgb") {
        let end = value[start..].find(')')?;
        return Some(&value[start..=start + end]);
    }
    value.split_whitespace().next()
}

/// Source of computed style values for elements of a document.
pub trait StyleResolver<N: HtmlNode> {
    /// Resolves the computed value of a CSS property, `None` when unset.
    fn computed(&self, node: &N, property: &str) -> Result<Option<String>, StyleError>;

    /// Temporarily forces a hidden element to be displayed.
    /// Returns `false` when the resolver cannot do so.
    fn reveal(&self, _node: &N) -> bool {
        false
    }

    /// Reverts a previous [`StyleResolver::reveal`].
    fn conceal(&self, _node: &N) {}
}

/// Resolver computing styles from inline declarations, presentational
/// attributes, inheritance, and user-agent defaults.
pub struct CssStyleResolver<N: HtmlNode> {
    revealed: RefCell<HashSet<N::Id>>,
}

impl<N: HtmlNode> Default for CssStyleResolver<N> {
    fn default() -> Self {
        Self { revealed: RefCell::new(HashSet::new()) }
    }
}

impl<N: HtmlNode> CssStyleResolver<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether an element is currently forced visible.
    pub fn is_revealed(&self, node: &N) -> bool {
        self.revealed.borrow().contains(&node.id())
    }

    /// Value declared on the element itself, by style, attribute, or user agent.
    fn declared(&self, node: &N, property: &str) -> Option<String> {
        InlineStyle::of(node)
            .get(property)
            .map(str::to_owned)
            .or_else(|| presentational_attribute(node, property))
            .or_else(|| user_agent_default(node.tag(), property).map(str::to_owned))
    }
}

impl<N: HtmlNode> StyleResolver<N> for CssStyleResolver<N> {
    fn computed(&self, node: &N, property: &str) -> Result<Option<String>, StyleError> {
        if property == "display" && self.is_revealed(node) {
            let display = if node.tag() == TAG_TABLE { "table" } else { "block" };
            return Ok(Some(display.to_owned()));
        }

        let inherited = INHERITED_PROPERTIES.contains(&property);
        let mut current = Some(node.clone());
        let mut depth = 0usize;
        while let Some(element) = current {
            if depth > MAX_ANCESTOR_DEPTH {
                return Err(StyleError::DepthExceeded(MAX_ANCESTOR_DEPTH));
            }
            match self.declared(&element, property) {
                Some(value) if !value.eq_ignore_ascii_case("inherit") => return Ok(Some(value)),
                Some(_) => (),
                None if property == "background-color" && depth == 0 && element.is_cell() => {
                    // Row backgrounds paint through cells without one
                    let row = element.parent();
                    return Ok(row.and_then(|row| self.declared(&row, property)));
                }
                // Cells and rows take their alignment from the row and row group
                None if property == "vertical-align" && matches!(element.tag(), "td" | "th" | "tr") => (),
                None if !inherited => return Ok(None),
                None => (),
            }
            current = element.parent();
            depth += 1;
        }
        Ok(None)
    }

    fn reveal(&self, node: &N) -> bool {
        self.revealed.borrow_mut().insert(node.id())
    }

    fn conceal(&self, node: &N) {
        self.revealed.borrow_mut().remove(&node.id());
    }
}

/// Maps legacy HTML attributes onto the CSS property they stand for.
pub(crate) fn presentational_attribute<N: HtmlNode>(node: &N, property: &str) -> Option<String> {
    let tag = node.tag();
    let cell_like = matches!(tag, "td" | "th" | "tr" | "thead" | "tbody" | "tfoot");
    let value = match property {
        "text-align" if cell_like => node.attr("align"),
        "vertical-align" if cell_like => node.attr("valign"),
        "background-color" if cell_like || tag == TAG_TABLE => node.attr("bgcolor"),
        "color" if tag == "font" => node.attr("color"),
        "font-family" if tag == "font" => node.attr("face"),
        "display" if node.attr("hidden").is_some() => Some("none"),
        "width" => {
            let width = node.attr("width")?.trim();
            return if width.chars().all(|character| character.is_ascii_digit() || character == '.') {
                Some(format!("{width}px"))
            } else {
                Some(width.to_owned())
            };
        }
        _ => None,
    };
    value.map(|value| value.trim().to_ascii_lowercase())
}

/// Defaults a browser style sheet applies to common elements.
fn user_agent_default(tag: &str, property: &str) -> Option<&'static str> {
    match (tag, property) {
        ("th", "font-weight") | ("b", "font-weight") | ("strong", "font-weight") => Some("bold"),
        ("th", "text-align") => Some("center"),
        ("thead", "vertical-align") | ("tbody", "vertical-align") | ("tfoot", "vertical-align") => Some("middle"),
        ("i", "font-style") | ("em", "font-style") => Some("italic"),
        ("u", "text-decoration") => Some("underline"),
        (TAG_TABLE, "display") => Some("table"),
        _ => None,
    }
}
