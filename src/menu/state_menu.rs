//! State-capture menu for native interactive elements.

use super::{MenuAction, MenuItemView, MenuView};
use crate::capture::record::{CaptureMode, CaptureRequest, EvidenceState};
use crate::geometry::Rect;
use crate::host::NodeId;

/// The four capture variants offered for buttons and links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariant {
    Default,
    ForceHover,
    ForceActive,
    AsIs,
}

impl StateVariant {
    pub const ALL: [StateVariant; 4] = [
        StateVariant::Default,
        StateVariant::ForceHover,
        StateVariant::ForceActive,
        StateVariant::AsIs,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "Capture default",
            Self::ForceHover => "Force hover",
            Self::ForceActive => "Force active",
            Self::AsIs => "Capture as-is",
        }
    }

    pub fn request(&self) -> CaptureRequest {
        match self {
            Self::Default => CaptureRequest::new(EvidenceState::Default, CaptureMode::Default),
            Self::ForceHover => CaptureRequest::new(EvidenceState::Hover, CaptureMode::ForceHover),
            Self::ForceActive => {
                CaptureRequest::new(EvidenceState::Active, CaptureMode::ForceActive)
            }
            Self::AsIs => CaptureRequest::new(EvidenceState::AsIs, CaptureMode::AsIs),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateMenuSession {
    pub target: NodeId,
    /// Box the menu hangs below.
    pub anchor: Rect,
    pub title: String,
}

/// States: closed (`None`) and open (`Some`).
#[derive(Debug, Default)]
pub struct StateMenu {
    session: Option<StateMenuSession>,
}

impl StateMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, session: StateMenuSession) {
        self.session = Some(session);
    }

    pub fn close(&mut self) -> Option<StateMenuSession> {
        self.session.take()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&StateMenuSession> {
        self.session.as_ref()
    }

    pub fn target(&self) -> Option<NodeId> {
        self.session.as_ref().map(|s| s.target)
    }

    pub fn view(&self) -> Option<MenuView> {
        let session = self.session.as_ref()?;
        Some(MenuView {
            title: session.title.clone(),
            items: StateVariant::ALL
                .iter()
                .map(|variant| MenuItemView::new(MenuAction::Variant(*variant), variant.label(), true))
                .collect(),
        })
    }
}
