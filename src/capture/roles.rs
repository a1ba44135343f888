//! Role lookups: explicit `role` attributes, implicit roles from tag names,
//! interactive and landmark classification.

use crate::host::{NodeId, PageHost};

/// ARIA roles treated as interactive when looking for a semantic ancestor.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "link",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "tab",
    "checkbox",
    "radio",
    "switch",
    "option",
    "textbox",
    "searchbox",
    "combobox",
    "slider",
    "spinbutton",
];

/// Tags that are always interactive (anchors are handled separately: they
/// only count when they carry an `href`).
const INTERACTIVE_TAGS: &[&str] = &["BUTTON", "INPUT", "SELECT", "TEXTAREA", "SUMMARY", "LABEL"];

const LANDMARK_ROLES: &[&str] = &[
    "banner",
    "navigation",
    "main",
    "contentinfo",
    "complementary",
    "region",
    "form",
    "search",
];

/// Upper bound on ancestor walks, guarding against cyclic host answers.
pub const MAX_ANCESTOR_DEPTH: usize = 64;

/// First token of the explicit `role` attribute, lower-cased.
pub fn explicit_role(host: &dyn PageHost, node: NodeId) -> Option<String> {
    host.attribute(node, "role")
        .and_then(|r| r.split_whitespace().next().map(|t| t.to_ascii_lowercase()))
        .filter(|r| !r.is_empty())
}

/// Implicit role of an element derived from its tag (and `type`/`href`).
pub fn implicit_role(host: &dyn PageHost, node: NodeId) -> Option<&'static str> {
    let tag = host.tag_name(node);
    let role = match tag.as_str() {
        "BUTTON" => "button",
        "A" | "AREA" => {
            if host.attribute(node, "href").is_some() {
                "link"
            } else {
                return None;
            }
        }
        "INPUT" => {
            let input_type = host
                .attribute(node, "type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string());
            match input_type.as_str() {
                "button" | "submit" | "reset" | "image" => "button",
                "checkbox" => "checkbox",
                "radio" => "radio",
                "range" => "slider",
                "number" => "spinbutton",
                "search" => "searchbox",
                "hidden" => return None,
                _ => "textbox",
            }
        }
        "SELECT" => "combobox",
        "TEXTAREA" => "textbox",
        "IMG" => "img",
        "NAV" => "navigation",
        "MAIN" => "main",
        "HEADER" => "banner",
        "FOOTER" => "contentinfo",
        "ASIDE" => "complementary",
        "FORM" => "form",
        "SECTION" => {
            if has_label(host, node) {
                "region"
            } else {
                return None;
            }
        }
        "DIALOG" => "dialog",
        "UL" | "OL" => "list",
        "LI" => "listitem",
        "TABLE" => "table",
        "H1" | "H2" | "H3" | "H4" | "H5" | "H6" => "heading",
        _ => return None,
    };
    Some(role)
}

/// Explicit role first, implicit role second.
pub fn role_of(host: &dyn PageHost, node: NodeId) -> Option<String> {
    explicit_role(host, node).or_else(|| implicit_role(host, node).map(str::to_string))
}

fn has_label(host: &dyn PageHost, node: NodeId) -> bool {
    host.attribute(node, "aria-label")
        .or_else(|| host.attribute(node, "aria-labelledby"))
        .is_some_and(|v| !v.trim().is_empty())
}

/// Element qualifies as a "semantic" capture target.
pub fn is_semantic_interactive(host: &dyn PageHost, node: NodeId) -> bool {
    let tag = host.tag_name(node);
    if tag == "A" {
        return host.attribute(node, "href").is_some();
    }
    if INTERACTIVE_TAGS.contains(&tag.as_str()) {
        return true;
    }
    explicit_role(host, node).is_some_and(|role| INTERACTIVE_ROLES.contains(&role.as_str()))
}

/// Native controls that get the capture-state menu: buttons, links with an
/// href, button-like inputs and disclosure summaries.
pub fn is_native_interactive(host: &dyn PageHost, node: NodeId) -> bool {
    match host.tag_name(node).as_str() {
        "BUTTON" | "SUMMARY" => true,
        "A" => host.attribute(node, "href").is_some(),
        "INPUT" => matches!(
            host.attribute(node, "type")
                .map(|t| t.to_ascii_lowercase())
                .as_deref(),
            Some("button" | "submit" | "reset" | "image")
        ),
        _ => false,
    }
}

/// Role of the nearest enclosing landmark, the element itself included.
///
/// Headers and footers nested inside sectioning content are not page-level
/// landmarks and are skipped.
pub fn nearest_landmark(host: &dyn PageHost, node: NodeId) -> Option<String> {
    let mut current = Some(node);
    for _ in 0..MAX_ANCESTOR_DEPTH {
        let Some(el) = current else {
            break;
        };
        if let Some(role) = role_of(host, el) {
            if LANDMARK_ROLES.contains(&role.as_str()) && !is_scoped_header_footer(host, el) {
                return Some(role);
            }
        }
        current = host.parent(el);
    }
    None
}

fn is_scoped_header_footer(host: &dyn PageHost, node: NodeId) -> bool {
    let tag = host.tag_name(node);
    if explicit_role(host, node).is_some() || !matches!(tag.as_str(), "HEADER" | "FOOTER") {
        return false;
    }
    let mut current = host.parent(node);
    for _ in 0..MAX_ANCESTOR_DEPTH {
        let Some(el) = current else {
            break;
        };
        if matches!(
            host.tag_name(el).as_str(),
            "ARTICLE" | "ASIDE" | "MAIN" | "NAV" | "SECTION"
        ) {
            return true;
        }
        current = host.parent(el);
    }
    false
}
