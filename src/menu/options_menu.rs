//! Capture-options menu: main view and children view.

use super::{MenuAction, MenuItemView, MenuView};
use crate::geometry::Point;
use crate::host::{NodeId, PageHost};
use crate::overlay::describe_node;
use crate::target::{capturable_parent, child_candidates, semantic_ancestor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionsPage {
    #[default]
    Main,
    Children,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChildEntry {
    pub node: NodeId,
    pub label: String,
}

/// Everything the menu needs, resolved once when it opens.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsMenuSession {
    pub target: NodeId,
    /// Click point the menu was opened at.
    pub at: Point,
    pub page: OptionsPage,
    pub parent: Option<NodeId>,
    pub semantic: Option<NodeId>,
    pub children: Vec<ChildEntry>,
    /// Freeze state the menu's pin will restore to; drives the toggle label.
    pub restores_frozen: bool,
    pub title: String,
}

impl OptionsMenuSession {
    pub fn build(
        host: &dyn PageHost,
        target: NodeId,
        at: Point,
        max_children: usize,
        restores_frozen: bool,
    ) -> Self {
        let children = child_candidates(host, target, max_children)
            .into_iter()
            .map(|node| {
                let size = host
                    .bounding_rect(node)
                    .map(|r| format!(" {}×{}", r.width.round(), r.height.round()))
                    .unwrap_or_default();
                ChildEntry {
                    node,
                    label: format!("{}{}", describe_node(host, node), size),
                }
            })
            .collect();
        Self {
            target,
            at,
            page: OptionsPage::Main,
            parent: capturable_parent(host, target),
            semantic: semantic_ancestor(host, target),
            children,
            restores_frozen,
            title: describe_node(host, target),
        }
    }

    /// Node a capture action refers to, if it has one.
    pub fn node_for(&self, action: MenuAction) -> Option<NodeId> {
        match action {
            MenuAction::CaptureExact => Some(self.target),
            MenuAction::CaptureParent => self.parent,
            MenuAction::CaptureSemantic => self.semantic,
            MenuAction::CaptureChild(index) => self.children.get(index).map(|c| c.node),
            _ => None,
        }
    }
}

/// States: closed, open·main, open·children.
#[derive(Debug, Default)]
pub struct OptionsMenu {
    session: Option<OptionsMenuSession>,
}

impl OptionsMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, session: OptionsMenuSession) {
        self.session = Some(session);
    }

    pub fn close(&mut self) -> Option<OptionsMenuSession> {
        self.session.take()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&OptionsMenuSession> {
        self.session.as_ref()
    }

    pub fn page(&self) -> Option<OptionsPage> {
        self.session.as_ref().map(|s| s.page)
    }

    /// Switch to the children view. Refused when there are no children.
    pub fn show_children(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if !session.children.is_empty() => {
                session.page = OptionsPage::Children;
                true
            }
            _ => false,
        }
    }

    pub fn back(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.page == OptionsPage::Children => {
                session.page = OptionsPage::Main;
                true
            }
            _ => false,
        }
    }

    pub fn view(&self) -> Option<MenuView> {
        let session = self.session.as_ref()?;
        let items = match session.page {
            OptionsPage::Main => vec![
                MenuItemView::new(MenuAction::CaptureExact, "Capture this element", true),
                MenuItemView::new(
                    MenuAction::CaptureParent,
                    "Capture parent",
                    session.parent.is_some(),
                ),
                MenuItemView::new(
                    MenuAction::CaptureSemantic,
                    "Capture semantic element",
                    session.semantic.is_some(),
                ),
                MenuItemView::new(
                    MenuAction::ShowChildren,
                    "Capture child…",
                    !session.children.is_empty(),
                ),
                MenuItemView::new(MenuAction::StartRegion, "Capture region", true),
                MenuItemView::new(MenuAction::StartViewport, "Capture viewport", true),
                MenuItemView::new(
                    MenuAction::ToggleFreeze,
                    if session.restores_frozen {
                        "Unfreeze target"
                    } else {
                        "Freeze target"
                    },
                    true,
                ),
            ],
            OptionsPage::Children => std::iter::once(MenuItemView::new(MenuAction::Back, "← Back", true))
                .chain(session.children.iter().enumerate().map(|(index, child)| {
                    MenuItemView::new(MenuAction::CaptureChild(index), child.label.clone(), true)
                }))
                .collect(),
        };
        Some(MenuView {
            title: session.title.clone(),
            items,
        })
    }
}
