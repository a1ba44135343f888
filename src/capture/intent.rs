//! Best-effort semantic anchors for a captured element.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::roles::role_of;
use crate::host::{NodeId, PageHost};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ElementIntent {
    pub accessible_name: Option<String>,
    pub input_type: Option<String>,
    pub href: Option<String>,
    pub disabled: bool,
    pub checked: Option<bool>,
    pub role: Option<String>,
}

type NameExtractor = fn(&dyn PageHost, NodeId, usize) -> Option<String>;

/// Accessible-name sources, highest priority first.
const NAME_CHAIN: &[NameExtractor] = &[aria_label, alt_text, title, text_preview];

fn aria_label(host: &dyn PageHost, node: NodeId, _max: usize) -> Option<String> {
    host.attribute(node, "aria-label")
}

fn alt_text(host: &dyn PageHost, node: NodeId, _max: usize) -> Option<String> {
    host.attribute(node, "alt")
}

fn title(host: &dyn PageHost, node: NodeId, _max: usize) -> Option<String> {
    host.attribute(node, "title")
}

impl ElementIntent {
    pub fn extract(host: &dyn PageHost, node: NodeId, text_max: usize) -> Self {
        let tag = host.tag_name(node);
        let input_type = (tag == "INPUT").then(|| {
            host.attribute(node, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "text".to_string())
        });
        Self {
            accessible_name: accessible_name(host, node, text_max),
            input_type,
            href: host.attribute(node, "href").filter(|h| !h.trim().is_empty()),
            disabled: host.is_disabled(node),
            checked: host.is_checked(node),
            role: role_of(host, node),
        }
    }
}

/// First non-empty answer from the name chain, trimmed and capped.
pub fn accessible_name(host: &dyn PageHost, node: NodeId, max: usize) -> Option<String> {
    NAME_CHAIN
        .iter()
        .filter_map(|extract| extract(host, node, max))
        .map(|name| truncate_chars(collapse_whitespace(&name), max))
        .find(|name| !name.is_empty())
}

/// Inner text with runs of whitespace collapsed, capped at `max` characters.
pub fn text_preview(host: &dyn PageHost, node: NodeId, max: usize) -> Option<String> {
    let text = collapse_whitespace(&host.inner_text(node)?);
    (!text.is_empty()).then(|| truncate_chars(text, max))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text,
    }
}
