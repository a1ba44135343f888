//! Capture-mode controller.
//!
//! One [`Controller`] per page. It owns every piece of capture-mode state
//! (target cell, overlay, both menus, the region tool, the pending
//! confirmation) behind a single `Rc<RefCell<_>>` and is driven from three
//! directions:
//!
//! - page input, routed through [`router::route`](crate::router::route)
//! - actions coming back from its own surfaces (menu items, confirm buttons)
//! - control messages from the extension
//!
//! Anything that has to wait (duplicate check, capture, region capture) is
//! handed back to the embedder as a [`Task`]. Borrows of the state never
//! span an `.await`.

mod pipeline;


use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;

use crate::capture::record::CaptureRequest;
use crate::capture::roles::is_native_interactive;
use crate::capture::Suppression;
use crate::config::controller::get_controller_config;
use crate::config::ControllerConfig;
use crate::error::{CaptureError, CaptureResult, OptionExt};
use crate::geometry::{Point, Rect};
use crate::host::{NodeId, PageHost, Scheduler, SurfaceContent, SurfaceKind};
use crate::menu::{
    show_measured, Anchor, MenuAction, OptionsMenu, OptionsMenuSession, StateMenu,
    StateMenuSession,
};
use crate::overlay::{describe_node, Overlay};
use crate::protocol::{Ack, CaptureModeState, ControlMessage, ControlReply};
use crate::region::{RegionKind, RegionRelease, RegionTool};
use crate::router::{route, Disposition, InputEvent, OpenSurfaces, Owner, PRIMARY_BUTTON};
use crate::service::EvidenceService;
use crate::target::{resolve_at, TargetCell};

/// Deferred work the embedder must drive to completion.
pub type Task = LocalBoxFuture<'static, ()>;

/// What to do with a native event, plus any work it started.
pub struct EventOutcome {
    pub disposition: Disposition,
    pub task: Option<Task>,
}

impl EventOutcome {
    fn pass() -> Self {
        Self {
            disposition: Disposition::PassThrough,
            task: None,
        }
    }

    fn block() -> Self {
        Self {
            disposition: Disposition::Block,
            task: None,
        }
    }

    fn to_surface() -> Self {
        Self {
            disposition: Disposition::ToSurface,
            task: None,
        }
    }

    fn blocked_with(task: Option<Task>) -> Self {
        Self {
            disposition: Disposition::Block,
            task,
        }
    }
}

impl std::fmt::Debug for EventOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventOutcome")
            .field("disposition", &self.disposition)
            .field("task", &self.task.is_some())
            .finish()
    }
}

/// Interaction inside one of the controller's own surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    Menu(MenuAction),
    ConfirmAccept,
    ConfirmCancel,
}

/// Capture waiting on the duplicate confirmation.
#[derive(Debug, Clone, Copy)]
struct PendingCapture {
    node: NodeId,
    request: CaptureRequest,
}

struct Shared {
    state: RefCell<State>,
    service: Box<dyn EvidenceService>,
    scheduler: Box<dyn Scheduler>,
    config: ControllerConfig,
}

struct State {
    host: Box<dyn PageHost>,
    active: bool,
    /// Bumped on every enter and leave; tasks from an older session go inert.
    session: u64,
    cell: TargetCell,
    overlay: Overlay,
    state_menu: StateMenu,
    options_menu: OptionsMenu,
    region: RegionTool,
    pending_confirm: Option<PendingCapture>,
    in_flight: bool,
    suppression: Option<Suppression>,
    /// A menu was dismissed by pointer-down; swallow the click that follows.
    dismiss_pending: bool,
    /// Marker attributes currently set on page elements, removed on leave.
    markers: Vec<(NodeId, String)>,
    notice_generation: u64,
    capture_generation: u64,
}

/// Capture-mode controller for one page.
#[derive(Clone)]
pub struct Controller {
    shared: Rc<Shared>,
}

/// Non-owning controller handle for callbacks the host registers on the page.
#[derive(Clone)]
pub struct WeakController {
    shared: Weak<Shared>,
}

impl WeakController {
    pub fn upgrade(&self) -> Option<Controller> {
        self.shared.upgrade().map(|shared| Controller { shared })
    }
}

impl Controller {
    /// Controller using the global configuration.
    pub fn new(
        host: Box<dyn PageHost>,
        service: Box<dyn EvidenceService>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self::with_config(host, service, scheduler, get_controller_config())
    }

    pub fn with_config(
        host: Box<dyn PageHost>,
        service: Box<dyn EvidenceService>,
        scheduler: Box<dyn Scheduler>,
        mut config: ControllerConfig,
    ) -> Self {
        config.validate();
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(State {
                    host,
                    active: false,
                    session: 0,
                    cell: TargetCell::new(),
                    overlay: Overlay::new(),
                    state_menu: StateMenu::new(),
                    options_menu: OptionsMenu::new(),
                    region: RegionTool::new(),
                    pending_confirm: None,
                    in_flight: false,
                    suppression: None,
                    dismiss_pending: false,
                    markers: Vec::new(),
                    notice_generation: 0,
                    capture_generation: 0,
                }),
                service,
                scheduler,
                config,
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.shared.config
    }

    pub fn downgrade(&self) -> WeakController {
        WeakController {
            shared: Rc::downgrade(&self.shared),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Attach listeners and mount every surface. Returns false if already active.
    pub fn enter(&self) -> bool {
        let Ok(mut state) = self.shared.state.try_borrow_mut() else {
            log::warn!("[CAPTURE] enter() re-entered while state was borrowed");
            return false;
        };
        state.enter()
    }

    /// Tear everything down. Returns false if already inactive.
    pub fn leave(&self) -> bool {
        let Ok(mut state) = self.shared.state.try_borrow_mut() else {
            log::warn!("[CAPTURE] leave() re-entered while state was borrowed");
            return false;
        };
        state.leave()
    }

    /// `Some(x)` sets the mode, `None` flips it. Returns the resulting mode.
    pub fn toggle(&self, enabled: Option<bool>) -> bool {
        if enabled.unwrap_or(!self.is_active()) {
            self.enter();
        } else {
            self.leave();
        }
        self.is_active()
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Route one page-level event to its owner.
    pub fn handle_event(&self, event: InputEvent) -> EventOutcome {
        let Ok(mut guard) = self.shared.state.try_borrow_mut() else {
            return EventOutcome::pass();
        };
        let state = &mut *guard;
        if !state.active {
            return EventOutcome::pass();
        }
        if let Some(point) = event.point() {
            state.overlay.record_pointer(point);
        }

        let config = &self.shared.config;
        let owner = route(&state.open_surfaces());
        log::trace!("[ROUTER] {:?} -> {:?}", event, owner);
        match owner {
            Owner::RegionSelect => state.region_event(&self.shared, &event, config),
            Owner::Confirm => state.confirm_event(&event, config),
            Owner::OptionsMenu => state.menu_event(SurfaceKind::OptionsMenu, &event, config),
            Owner::StateMenu => state.menu_event(SurfaceKind::StateMenu, &event, config),
            Owner::Overlay => state.overlay_event(&self.shared, event, config),
        }
    }

    /// Animation-frame callback requested through [`PageHost::request_frame`].
    pub fn on_frame(&self) {
        let Ok(mut guard) = self.shared.state.try_borrow_mut() else {
            return;
        };
        let state = &mut *guard;
        if !state.active || state.region.is_active() {
            return;
        }
        state
            .overlay
            .on_frame(&mut *state.host, &mut state.cell, &self.shared.config);
    }

    /// Handle a click inside one of the controller's surfaces.
    pub fn surface_action(&self, action: SurfaceAction) -> Option<Task> {
        let mut guard = self.shared.state.try_borrow_mut().ok()?;
        let state = &mut *guard;
        if !state.active {
            return None;
        }
        let config = &self.shared.config;
        match action {
            SurfaceAction::Menu(action) => state.menu_action(&self.shared, action, config),
            SurfaceAction::ConfirmAccept => {
                let pending = state.pending_confirm.take()?;
                state.host.set_surface_visible(SurfaceKind::Confirm, false);
                log::debug!("[CAPTURE] Duplicate confirmed, capturing anyway");
                Some(pipeline::resume_capture(
                    &self.shared,
                    state,
                    pending.node,
                    pending.request,
                ))
            }
            SurfaceAction::ConfirmCancel => {
                state.cancel_confirm(config);
                None
            }
        }
    }

    // ========================================================================
    // Control messages
    // ========================================================================

    pub fn handle_message(&self, message: ControlMessage) -> ControlReply {
        match message {
            ControlMessage::ToggleCaptureMode { enabled } => {
                self.toggle(enabled);
                ControlReply::Ack(Ack::OK)
            }
            ControlMessage::GetCaptureModeState => ControlReply::State(CaptureModeState {
                enabled: self.is_active(),
            }),
            ControlMessage::MarkLastTarget { marker_id } => {
                ControlReply::Ack(Self::ack("mark-last-target", self.mark_last_target(&marker_id, true)))
            }
            ControlMessage::UnmarkLastTarget { marker_id } => {
                ControlReply::Ack(Self::ack("unmark-last-target", self.mark_last_target(&marker_id, false)))
            }
        }
    }

    /// [`handle_message`](Self::handle_message) over raw JSON.
    pub fn handle_message_json(&self, message: serde_json::Value) -> CaptureResult<serde_json::Value> {
        let message: ControlMessage = serde_json::from_value(message)?;
        Ok(serde_json::to_value(self.handle_message(message))?)
    }

    fn ack(operation: &str, result: CaptureResult<()>) -> Ack {
        if let Err(e) = &result {
            log::debug!("[PROTOCOL] {} refused: {}", operation, e);
        }
        Ack { ok: result.is_ok() }
    }

    fn mark_last_target(&self, marker_id: &str, mark: bool) -> CaptureResult<()> {
        let mut guard = self
            .shared
            .state
            .try_borrow_mut()
            .map_err(|_| CaptureError::Busy)?;
        let state = &mut *guard;
        if !state.active {
            return Err(CaptureError::Inactive);
        }
        let node = state
            .cell
            .last_captured()
            .filter(|node| state.host.is_connected(*node))
            .or_invalid("no connected last capture")?;
        if mark {
            if !state.host.set_marker(node, marker_id) {
                return Err(CaptureError::InvalidTarget(format!("could not mark with {}", marker_id)));
            }
            state.markers.retain(|(marked, _)| *marked != node);
            state.markers.push((node, marker_id.to_string()));
        } else {
            if !state.host.clear_marker(node, marker_id) {
                return Err(CaptureError::InvalidTarget(format!("not marked with {}", marker_id)));
            }
            state.markers.retain(|(marked, _)| *marked != node);
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_active(&self) -> bool {
        self.shared.state.try_borrow().is_ok_and(|s| s.active)
    }

    pub fn current_target(&self) -> Option<NodeId> {
        self.shared.state.try_borrow().ok()?.cell.current()
    }

    pub fn hover_target(&self) -> Option<NodeId> {
        self.shared.state.try_borrow().ok()?.cell.hover()
    }

    pub fn is_frozen(&self) -> bool {
        self.shared.state.try_borrow().is_ok_and(|s| s.cell.is_frozen())
    }

    pub fn open_surfaces(&self) -> OpenSurfaces {
        self.shared
            .state
            .try_borrow()
            .map(|s| s.open_surfaces())
            .unwrap_or_default()
    }

    pub fn is_capture_in_flight(&self) -> bool {
        self.shared.state.try_borrow().is_ok_and(|s| s.in_flight)
    }
}

// ============================================================================
// State transitions (always called with the state borrowed)
// ============================================================================

impl State {
    fn open_surfaces(&self) -> OpenSurfaces {
        OpenSurfaces {
            region_select: self.region.is_active(),
            confirm: self.pending_confirm.is_some(),
            options_menu: self.options_menu.is_open(),
            state_menu: self.state_menu.is_open(),
        }
    }

    fn enter(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.session += 1;
        self.host.attach_listeners();
        for kind in SurfaceKind::ALL {
            self.host.mount_surface(kind);
        }
        log::info!("[CAPTURE] Capture mode on ({})", self.host.url());
        true
    }

    fn leave(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.overlay.cancel_frame(&mut *self.host);
        self.host.detach_listeners();
        for kind in SurfaceKind::ALL {
            match kind {
                SurfaceKind::StateMenu => {
                    self.state_menu.close();
                }
                SurfaceKind::OptionsMenu => {
                    self.options_menu.close();
                }
                SurfaceKind::RegionSelect => {
                    self.region.cancel();
                }
                SurfaceKind::Confirm => self.pending_confirm = None,
                _ => {}
            }
            self.host.unmount_surface(kind);
        }
        for (node, marker_id) in std::mem::take(&mut self.markers) {
            self.host.clear_marker(node, &marker_id);
        }
        self.cell.clear();
        self.overlay.reset();
        self.in_flight = false;
        self.suppression = None;
        self.dismiss_pending = false;
        self.active = false;
        self.session += 1;
        log::info!("[CAPTURE] Capture mode off");
        true
    }

    /// Refresh the hover target at `point` unless frozen, then return the
    /// authoritative target.
    fn target_at(&mut self, point: Point) -> Option<NodeId> {
        self.overlay.record_pointer(point);
        if !self.cell.is_frozen() {
            self.cell.set_hover(resolve_at(&*self.host, point));
        }
        self.cell
            .current()
            .filter(|node| self.host.is_connected(*node))
    }

    fn refresh_overlay(&mut self, config: &ControllerConfig) {
        self.overlay
            .render(&mut *self.host, &self.cell, config, true);
    }

    // ------------------------------------------------------------------
    // Hover overlay
    // ------------------------------------------------------------------

    fn overlay_event(
        &mut self,
        shared: &Rc<Shared>,
        event: InputEvent,
        config: &ControllerConfig,
    ) -> EventOutcome {
        if event.surface().is_some() {
            return EventOutcome::to_surface();
        }
        if event.is_escape() {
            log::debug!("[ROUTER] Escape with nothing open, leaving");
            self.leave();
            return EventOutcome::block();
        }
        match &event {
            InputEvent::PointerMove { .. } => {
                self.overlay.schedule_frame(&mut *self.host);
                EventOutcome::pass()
            }
            InputEvent::KeyDown { key, repeat } if *key == config.freeze_key => {
                if !*repeat && self.cell.freeze() {
                    log::debug!("[OVERLAY] Frozen on {:?}", self.cell.current());
                    self.refresh_overlay(config);
                }
                EventOutcome::block()
            }
            InputEvent::KeyUp { key } if *key == config.freeze_key => {
                if self.cell.is_frozen() && self.cell.release_key_freeze() {
                    match self.overlay.last_pointer() {
                        Some(point) => self.overlay.recompute_at(
                            &mut *self.host,
                            &mut self.cell,
                            config,
                            point,
                        ),
                        None => self.refresh_overlay(config),
                    }
                }
                EventOutcome::block()
            }
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => EventOutcome::pass(),
            InputEvent::PointerDown { .. } => {
                self.dismiss_pending = false;
                EventOutcome::block()
            }
            InputEvent::PointerUp { .. } => EventOutcome::block(),
            InputEvent::Click { point, button, .. } => {
                if std::mem::take(&mut self.dismiss_pending) || *button != PRIMARY_BUTTON {
                    return EventOutcome::block();
                }
                if self.in_flight {
                    log::debug!("[CAPTURE] Click ignored, capture in flight");
                    return EventOutcome::block();
                }
                let Some(node) = self.target_at(*point) else {
                    return EventOutcome::block();
                };
                if is_native_interactive(&*self.host, node) {
                    self.open_state_menu(node, config);
                    return EventOutcome::block();
                }
                EventOutcome::blocked_with(pipeline::begin_capture(
                    shared,
                    self,
                    node,
                    CaptureRequest::default(),
                ))
            }
            InputEvent::ContextMenu { point, .. } => {
                self.dismiss_pending = false;
                if self.in_flight {
                    log::debug!("[MENU] Context menu ignored, capture in flight");
                    return EventOutcome::block();
                }
                if let Some(node) = self.target_at(*point) {
                    self.open_options_menu(node, *point, config);
                }
                EventOutcome::block()
            }
        }
    }

    // ------------------------------------------------------------------
    // Menus
    // ------------------------------------------------------------------

    fn menu_event(
        &mut self,
        kind: SurfaceKind,
        event: &InputEvent,
        config: &ControllerConfig,
    ) -> EventOutcome {
        if event.is_escape() {
            self.close_menu(kind, config);
            return EventOutcome::block();
        }
        if event
            .surface()
            .is_some_and(|surface| surface.is_menu() && self.menu_is_open(surface))
        {
            return EventOutcome::to_surface();
        }
        if event.is_press() {
            log::debug!("[MENU] Press outside {:?}, closing", kind);
            self.close_menu(kind, config);
            if matches!(event, InputEvent::PointerDown { .. }) {
                self.dismiss_pending = true;
            }
            return EventOutcome::block();
        }
        match event {
            InputEvent::PointerMove { .. } => EventOutcome::pass(),
            _ => EventOutcome::block(),
        }
    }

    fn menu_is_open(&self, kind: SurfaceKind) -> bool {
        match kind {
            SurfaceKind::StateMenu => self.state_menu.is_open(),
            SurfaceKind::OptionsMenu => self.options_menu.is_open(),
            _ => false,
        }
    }

    /// Close a menu without touching the pin; the next menu reuses it.
    fn hand_off_menu(&mut self, kind: SurfaceKind) {
        let closed = match kind {
            SurfaceKind::StateMenu => self.state_menu.close().is_some(),
            SurfaceKind::OptionsMenu => self.options_menu.close().is_some(),
            _ => false,
        };
        if closed {
            self.host.set_surface_visible(kind, false);
        }
    }

    /// Close a menu; the last one to close restores the pre-menu freeze state.
    fn close_menu(&mut self, kind: SurfaceKind, config: &ControllerConfig) {
        self.hand_off_menu(kind);
        if !self.state_menu.is_open() && !self.options_menu.is_open() && self.cell.unpin_menu() {
            log::debug!("[MENU] Pin released, frozen={}", self.cell.is_frozen());
            self.refresh_overlay(config);
        }
    }

    fn open_state_menu(&mut self, node: NodeId, config: &ControllerConfig) {
        let Some(rect) = self.host.bounding_rect(node) else {
            return;
        };
        self.hand_off_menu(SurfaceKind::OptionsMenu);
        self.cell.pin_for_menu(node);
        self.state_menu.open(StateMenuSession {
            target: node,
            anchor: rect,
            title: describe_node(&*self.host, node),
        });
        self.show_menu(SurfaceKind::StateMenu, Anchor::Below(rect), config);
        self.refresh_overlay(config);
    }

    fn open_options_menu(&mut self, node: NodeId, at: Point, config: &ControllerConfig) {
        let restores_frozen = self
            .cell
            .menu_pin()
            .map(|pin| pin.was_frozen)
            .unwrap_or(self.cell.is_frozen());
        self.hand_off_menu(SurfaceKind::StateMenu);
        self.hand_off_menu(SurfaceKind::OptionsMenu);
        self.cell.pin_for_menu(node);
        self.options_menu.open(OptionsMenuSession::build(
            &*self.host,
            node,
            at,
            config.max_child_candidates,
            restores_frozen,
        ));
        self.show_menu(SurfaceKind::OptionsMenu, Anchor::Point(at), config);
        self.refresh_overlay(config);
    }

    fn show_menu(&mut self, kind: SurfaceKind, anchor: Anchor, config: &ControllerConfig) {
        let view = match kind {
            SurfaceKind::StateMenu => self.state_menu.view(),
            SurfaceKind::OptionsMenu => self.options_menu.view(),
            _ => None,
        };
        if let Some(view) = view {
            show_measured(
                &mut *self.host,
                kind,
                &SurfaceContent::Menu(view),
                anchor,
                config.menu_margin,
                config.menu_anchor_gap,
            );
        }
    }

    fn menu_action(
        &mut self,
        shared: &Rc<Shared>,
        action: MenuAction,
        config: &ControllerConfig,
    ) -> Option<Task> {
        log::debug!("[MENU] Action {:?}", action);
        match action {
            MenuAction::Variant(variant) => {
                let target = self.state_menu.target()?;
                self.close_menu(SurfaceKind::StateMenu, config);
                pipeline::begin_capture(shared, self, target, variant.request())
            }
            MenuAction::CaptureExact
            | MenuAction::CaptureParent
            | MenuAction::CaptureSemantic
            | MenuAction::CaptureChild(_) => {
                let view = self.options_menu.view()?;
                if !view.is_enabled(action) {
                    return None;
                }
                let node = self.options_menu.session()?.node_for(action)?;
                self.close_menu(SurfaceKind::OptionsMenu, config);
                pipeline::begin_capture(shared, self, node, CaptureRequest::default())
            }
            MenuAction::ShowChildren | MenuAction::Back => {
                let changed = match action {
                    MenuAction::ShowChildren => self.options_menu.show_children(),
                    _ => self.options_menu.back(),
                };
                if changed {
                    let at = self.options_menu.session()?.at;
                    self.show_menu(SurfaceKind::OptionsMenu, Anchor::Point(at), config);
                }
                None
            }
            MenuAction::StartRegion => {
                self.close_menu(SurfaceKind::OptionsMenu, config);
                self.arm_region();
                None
            }
            MenuAction::StartViewport => {
                self.close_menu(SurfaceKind::OptionsMenu, config);
                let viewport = Rect::from_size(self.host.viewport().size);
                pipeline::begin_region_capture(shared, self, viewport, RegionKind::Viewport)
            }
            MenuAction::ToggleFreeze => {
                let target = self.options_menu.session()?.target;
                self.close_menu(SurfaceKind::OptionsMenu, config);
                if self.cell.is_frozen() {
                    self.cell.unfreeze();
                    if let Some(point) = self.overlay.last_pointer() {
                        self.overlay
                            .recompute_at(&mut *self.host, &mut self.cell, config, point);
                        return None;
                    }
                } else {
                    self.cell.freeze_on(target);
                }
                self.refresh_overlay(config);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Confirmation
    // ------------------------------------------------------------------

    fn confirm_event(&mut self, event: &InputEvent, config: &ControllerConfig) -> EventOutcome {
        if event.is_escape() {
            self.cancel_confirm(config);
            return EventOutcome::block();
        }
        if event.surface() == Some(SurfaceKind::Confirm) {
            return EventOutcome::to_surface();
        }
        match event {
            InputEvent::PointerMove { .. } => EventOutcome::pass(),
            _ => EventOutcome::block(),
        }
    }

    fn show_confirm(&mut self, message: String) {
        let content = SurfaceContent::Confirm { message };
        self.host.render_surface(SurfaceKind::Confirm, &content);
        let size = self.host.measure_surface(SurfaceKind::Confirm);
        let viewport = self.host.viewport().size;
        let at = Point::new(
            ((viewport.width - size.width) / 2.0).max(0.0),
            ((viewport.height - size.height) / 2.0).max(0.0),
        );
        self.host.place_surface(SurfaceKind::Confirm, at);
        self.host.set_surface_visible(SurfaceKind::Confirm, true);
    }

    fn cancel_confirm(&mut self, config: &ControllerConfig) {
        if self.pending_confirm.take().is_none() {
            return;
        }
        log::debug!("[CAPTURE] Duplicate capture cancelled");
        self.host.set_surface_visible(SurfaceKind::Confirm, false);
        self.in_flight = false;
        self.cell.release();
        self.refresh_overlay(config);
    }

    // ------------------------------------------------------------------
    // Region tool
    // ------------------------------------------------------------------

    fn arm_region(&mut self) {
        self.overlay.cancel_frame(&mut *self.host);
        self.overlay.set_chrome_visible(&mut *self.host, false);
        self.region.arm();
        self.host.render_surface(
            SurfaceKind::RegionSelect,
            &SurfaceContent::Region { rect: None },
        );
        self.host.place_surface(SurfaceKind::RegionSelect, Point::default());
        self.host.set_surface_visible(SurfaceKind::RegionSelect, true);
        log::debug!("[REGION] Armed");
    }

    fn hide_region(&mut self) {
        self.host.render_surface(
            SurfaceKind::RegionSelect,
            &SurfaceContent::Region { rect: None },
        );
        self.host.set_surface_visible(SurfaceKind::RegionSelect, false);
    }

    fn region_event(
        &mut self,
        shared: &Rc<Shared>,
        event: &InputEvent,
        config: &ControllerConfig,
    ) -> EventOutcome {
        let viewport = self.host.viewport().size;
        match *event {
            InputEvent::KeyDown { .. } if event.is_escape() => {
                self.region.cancel();
                self.hide_region();
                if self.active {
                    self.refresh_overlay(config);
                }
                log::debug!("[REGION] Cancelled");
            }
            InputEvent::PointerDown {
                point,
                button: PRIMARY_BUTTON,
                ..
            } => {
                self.region.pointer_down(point);
            }
            InputEvent::PointerMove { point } => {
                if let Some(rect) = self.region.pointer_move(point, viewport) {
                    self.host.render_surface(
                        SurfaceKind::RegionSelect,
                        &SurfaceContent::Region { rect: Some(rect) },
                    );
                }
            }
            InputEvent::PointerUp {
                point,
                button: PRIMARY_BUTTON,
                ..
            } => match self
                .region
                .pointer_up(point, viewport, config.min_region_size)
            {
                RegionRelease::Selected(rect) => {
                    self.hide_region();
                    return EventOutcome::blocked_with(pipeline::begin_region_capture(
                        shared,
                        self,
                        rect,
                        RegionKind::Region,
                    ));
                }
                RegionRelease::TooSmall => {
                    self.host.render_surface(
                        SurfaceKind::RegionSelect,
                        &SurfaceContent::Region { rect: None },
                    );
                }
                RegionRelease::Ignored => {}
            },
            _ => {}
        }
        EventOutcome::block()
    }

    // ------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------

    /// Show a notice and return its generation for the matching hide.
    fn show_notice(&mut self, message: String, config: &ControllerConfig) -> u64 {
        self.notice_generation += 1;
        let content = SurfaceContent::Notice { message };
        self.host.render_surface(SurfaceKind::Notice, &content);
        let size = self.host.measure_surface(SurfaceKind::Notice);
        let viewport = self.host.viewport().size;
        let at = Point::new(
            ((viewport.width - size.width) / 2.0).max(0.0),
            (viewport.height - size.height - config.menu_margin).max(0.0),
        );
        self.host.place_surface(SurfaceKind::Notice, at);
        self.host.set_surface_visible(SurfaceKind::Notice, true);
        self.notice_generation
    }

    fn hide_notice(&mut self, generation: u64) {
        if generation == self.notice_generation {
            self.host.set_surface_visible(SurfaceKind::Notice, false);
            if let Some(suppression) = self.suppression.as_mut() {
                suppression.forget(SurfaceKind::Notice);
            }
        }
    }
}
