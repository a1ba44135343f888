//! Shadow-root markup for each surface.

use evidence_capture_lib::{SurfaceAction, SurfaceContent, SurfaceKind};

/// Attribute carried by every surface host element.
pub const SURFACE_ATTR: &str = "data-evidence-surface";

/// Attribute carried by clickable items inside a surface.
pub const ACTION_ATTR: &str = "data-action";

const STYLE: &str = "<style>\
:host{all:initial}\
*{box-sizing:border-box;font:12px/1.4 system-ui,-apple-system,sans-serif}\
.box{border:2px solid #2563eb;background:rgba(37,99,235,.08);border-radius:2px}\
.box.frozen{border-color:#f59e0b;background:rgba(245,158,11,.10)}\
.readout{padding:3px 8px;border-radius:4px;background:#111827;color:#f9fafb;white-space:nowrap}\
.panel{min-width:200px;padding:6px;border-radius:8px;background:#fff;color:#111827;box-shadow:0 8px 24px rgba(0,0,0,.2)}\
.title{padding:4px 8px;color:#6b7280;font-weight:600}\
button{display:block;width:100%;padding:6px 8px;border:0;border-radius:4px;background:none;color:inherit;text-align:left;cursor:pointer}\
button:hover:not([disabled]){background:#eff6ff}\
button[disabled]{color:#9ca3af;cursor:default}\
.layer{position:fixed;inset:0;cursor:crosshair;background:rgba(17,24,39,.15)}\
.selection{position:fixed;border:1px dashed #2563eb;background:rgba(37,99,235,.12)}\
.row{display:flex;gap:6px;justify-content:flex-end;margin-top:8px}\
.row button{width:auto}\
.notice{padding:8px 12px;border-radius:6px;background:#111827;color:#f9fafb}\
</style>";

pub fn surface_name(kind: SurfaceKind) -> &'static str {
    match kind {
        SurfaceKind::Highlight => "highlight",
        SurfaceKind::Metadata => "metadata",
        SurfaceKind::StateMenu => "state-menu",
        SurfaceKind::OptionsMenu => "options-menu",
        SurfaceKind::RegionSelect => "region-select",
        SurfaceKind::Confirm => "confirm",
        SurfaceKind::Notice => "notice",
    }
}

pub fn parse_surface_name(name: &str) -> Option<SurfaceKind> {
    SurfaceKind::ALL
        .into_iter()
        .find(|kind| surface_name(*kind) == name)
}

/// Surfaces that take pointer input.
pub fn is_interactive(kind: SurfaceKind) -> bool {
    kind.is_menu() || matches!(kind, SurfaceKind::RegionSelect | SurfaceKind::Confirm)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn button(index: usize, label: &str, enabled: bool) -> String {
    format!(
        "<button {}=\"{}\"{}>{}</button>",
        ACTION_ATTR,
        index,
        if enabled { "" } else { " disabled" },
        escape(label)
    )
}

/// Inner HTML for `content` plus the actions its buttons map to, by index.
pub fn render(content: &SurfaceContent) -> (String, Vec<SurfaceAction>) {
    let mut actions = Vec::new();
    let body = match content {
        SurfaceContent::Highlight { rect, frozen } => format!(
            "<div class=\"box{}\" style=\"width:{:.1}px;height:{:.1}px\"></div>",
            if *frozen { " frozen" } else { "" },
            rect.width.max(0.0),
            rect.height.max(0.0)
        ),
        SurfaceContent::Metadata { text } => {
            format!("<div class=\"readout\">{}</div>", escape(text))
        }
        SurfaceContent::Menu(view) => {
            let mut html = format!("<div class=\"panel\"><div class=\"title\">{}</div>", escape(&view.title));
            for (index, item) in view.items.iter().enumerate() {
                html.push_str(&button(index, &item.label, item.enabled));
                actions.push(SurfaceAction::Menu(item.action));
            }
            html.push_str("</div>");
            html
        }
        SurfaceContent::Region { rect } => {
            let selection = rect
                .map(|r| {
                    format!(
                        "<div class=\"selection\" style=\"left:{:.1}px;top:{:.1}px;width:{:.1}px;height:{:.1}px\"></div>",
                        r.left, r.top, r.width, r.height
                    )
                })
                .unwrap_or_default();
            format!("<div class=\"layer\">{}</div>", selection)
        }
        SurfaceContent::Confirm { message } => {
            actions.push(SurfaceAction::ConfirmCancel);
            actions.push(SurfaceAction::ConfirmAccept);
            format!(
                "<div class=\"panel\"><div>{}</div><div class=\"row\">{}{}</div></div>",
                escape(message),
                button(0, "Cancel", true),
                button(1, "Capture anyway", true)
            )
        }
        SurfaceContent::Notice { message } => {
            format!("<div class=\"notice\" role=\"status\">{}</div>", escape(message))
        }
    };
    (format!("{}{}", STYLE, body), actions)
}
