//! Test doubles: an in-memory page and a scripted evidence service.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::capture::conditions::Theme;
use crate::capture::record::{CaptureOptions, CaptureRecord, DuplicateCheckRequest};
use crate::error::{CaptureError, CaptureResult};
use crate::geometry::{Point, Rect, Size};
use crate::host::{FrameHandle, NodeId, PageHost, SurfaceContent, SurfaceKind, ViewportInfo};
use crate::protocol::{Ack, DuplicateCheckReply};
use crate::region::RegionCaptureRequest;
use crate::service::EvidenceService;

pub const VIEWPORT: Size = Size {
    width: 1280.0,
    height: 800.0,
};

// ============================================================================
// FakePage
// ============================================================================

#[derive(Debug, Default)]
struct FakeNode {
    tag: String,
    attrs: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Option<Rect>,
    text: Option<String>,
    computed: HashMap<String, String>,
    authored: HashMap<String, String>,
    checked: Option<bool>,
    owned: bool,
}

#[derive(Debug, Default)]
struct FakeSurface {
    mounted: bool,
    visible: bool,
    content: Option<SurfaceContent>,
    position: Option<Point>,
    renders: usize,
}

#[derive(Debug)]
struct Document {
    nodes: HashMap<NodeId, FakeNode>,
    next_id: u64,
    root: NodeId,
    body: NodeId,
    url: String,
    viewport: ViewportInfo,
    theme: Theme,
    surfaces: HashMap<SurfaceKind, FakeSurface>,
    listeners: bool,
    attach_calls: usize,
    frames_requested: usize,
    pending_frames: Vec<FrameHandle>,
    next_frame: u64,
    hit_tests: usize,
    markers: HashMap<NodeId, String>,
}

/// In-memory document implementing [`PageHost`].
///
/// Clones share the same document, so a test can hand one clone to a
/// controller and inspect the page through another.
#[derive(Debug, Clone)]
pub struct FakePage {
    doc: Rc<RefCell<Document>>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePage {
    /// `<html><body></body></html>` filling a 1280×800 viewport at 2x.
    pub fn new() -> Self {
        let root = NodeId(1);
        let body = NodeId(2);
        let viewport_rect = Rect::from_size(VIEWPORT);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            FakeNode {
                tag: "HTML".to_string(),
                children: vec![body],
                rect: Some(viewport_rect),
                ..Default::default()
            },
        );
        nodes.insert(
            body,
            FakeNode {
                tag: "BODY".to_string(),
                parent: Some(root),
                rect: Some(viewport_rect),
                ..Default::default()
            },
        );
        Self {
            doc: Rc::new(RefCell::new(Document {
                nodes,
                next_id: 3,
                root,
                body,
                url: "https://shop.example.com/checkout".to_string(),
                viewport: ViewportInfo {
                    size: VIEWPORT,
                    device_pixel_ratio: 2.0,
                    visual_scale: Some(1.0),
                },
                theme: Theme::Unknown,
                surfaces: HashMap::new(),
                listeners: false,
                attach_calls: 0,
                frames_requested: 0,
                pending_frames: Vec::new(),
                next_frame: 1,
                hit_tests: 0,
                markers: HashMap::new(),
            })),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.doc.borrow().root
    }

    pub fn body_id(&self) -> NodeId {
        self.doc.borrow().body
    }

    fn insert(&self, parent: NodeId, node: FakeNode) -> NodeId {
        let mut doc = self.doc.borrow_mut();
        let id = NodeId(doc.next_id);
        doc.next_id += 1;
        doc.nodes.insert(
            id,
            FakeNode {
                parent: Some(parent),
                ..node
            },
        );
        if let Some(p) = doc.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Element without a layout box.
    pub fn add(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.insert(
            parent,
            FakeNode {
                tag: tag.to_ascii_uppercase(),
                attrs: attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                ..Default::default()
            },
        )
    }

    pub fn add_box(&self, parent: NodeId, tag: &str, rect: Rect) -> NodeId {
        self.insert(
            parent,
            FakeNode {
                tag: tag.to_ascii_uppercase(),
                rect: Some(rect),
                ..Default::default()
            },
        )
    }

    /// A node belonging to one of the controller's surfaces.
    pub fn add_owned(&self, rect: Rect) -> NodeId {
        let body = self.body_id();
        self.insert(
            body,
            FakeNode {
                tag: "DIV".to_string(),
                rect: Some(rect),
                owned: true,
                ..Default::default()
            },
        )
    }

    fn with_node(&self, node: NodeId, f: impl FnOnce(&mut FakeNode)) {
        if let Some(n) = self.doc.borrow_mut().nodes.get_mut(&node) {
            f(n);
        }
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        self.with_node(node, |n| {
            n.attrs.insert(name.to_string(), value.to_string());
        });
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        self.with_node(node, |n| n.text = Some(text.to_string()));
    }

    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        self.with_node(node, |n| n.rect = Some(rect));
    }

    pub fn set_style(&self, node: NodeId, property: &str, value: &str) {
        self.with_node(node, |n| {
            n.computed.insert(property.to_string(), value.to_string());
        });
    }

    pub fn set_authored(&self, node: NodeId, property: &str, value: &str) {
        self.with_node(node, |n| {
            n.authored.insert(property.to_string(), value.to_string());
        });
    }

    pub fn set_checked(&self, node: NodeId, checked: bool) {
        self.with_node(node, |n| n.checked = Some(checked));
    }

    pub fn set_theme_hint(&self, theme: Theme) {
        self.doc.borrow_mut().theme = theme;
    }

    /// Remove `node` from its parent.
    pub fn detach(&self, node: NodeId) {
        let mut doc = self.doc.borrow_mut();
        let parent = doc.nodes.get_mut(&node).and_then(|n| n.parent.take());
        if let Some(p) = parent.and_then(|p| doc.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != node);
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn hit_test_count(&self) -> usize {
        self.doc.borrow().hit_tests
    }

    pub fn frames_requested(&self) -> usize {
        self.doc.borrow().frames_requested
    }

    /// Fire the oldest requested frame. The caller then runs the
    /// controller's frame callback.
    pub fn fire_frame(&self) -> bool {
        let mut doc = self.doc.borrow_mut();
        if doc.pending_frames.is_empty() {
            return false;
        }
        doc.pending_frames.remove(0);
        true
    }

    pub fn pending_frames(&self) -> usize {
        self.doc.borrow().pending_frames.len()
    }

    pub fn listeners_attached(&self) -> bool {
        self.doc.borrow().listeners
    }

    pub fn attach_calls(&self) -> usize {
        self.doc.borrow().attach_calls
    }

    pub fn mounted_surfaces(&self) -> usize {
        self.doc.borrow().surfaces.values().filter(|s| s.mounted).count()
    }

    pub fn render_count(&self, kind: SurfaceKind) -> usize {
        self.doc
            .borrow()
            .surfaces
            .get(&kind)
            .map(|s| s.renders)
            .unwrap_or(0)
    }

    pub fn surface_content(&self, kind: SurfaceKind) -> Option<SurfaceContent> {
        self.doc
            .borrow()
            .surfaces
            .get(&kind)
            .and_then(|s| s.content.clone())
    }

    pub fn surface_position(&self, kind: SurfaceKind) -> Option<Point> {
        self.doc
            .borrow()
            .surfaces
            .get(&kind)
            .and_then(|s| s.position)
    }

    pub fn metadata_text(&self) -> Option<String> {
        match self.surface_content(SurfaceKind::Metadata)? {
            SurfaceContent::Metadata { text } => Some(text),
            _ => None,
        }
    }

    pub fn marker(&self, node: NodeId) -> Option<String> {
        self.doc.borrow().markers.get(&node).cloned()
    }

    fn connected(doc: &Document, node: NodeId) -> bool {
        let mut current = Some(node);
        for _ in 0..256 {
            match current {
                Some(id) if id == doc.root => return true,
                Some(id) => current = doc.nodes.get(&id).and_then(|n| n.parent),
                None => return false,
            }
        }
        false
    }

    fn preorder(doc: &Document, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        if let Some(n) = doc.nodes.get(&node) {
            for child in &n.children {
                Self::preorder(doc, *child, out);
            }
        }
    }

    fn surface_mut(&mut self, kind: SurfaceKind) -> std::cell::RefMut<'_, FakeSurface> {
        std::cell::RefMut::map(self.doc.borrow_mut(), |doc| {
            doc.surfaces.entry(kind).or_default()
        })
    }
}

impl PageHost for FakePage {
    fn url(&self) -> String {
        self.doc.borrow().url.clone()
    }

    fn viewport(&self) -> ViewportInfo {
        self.doc.borrow().viewport
    }

    fn theme_hint(&self) -> Theme {
        self.doc.borrow().theme
    }

    fn elements_from_point(&self, point: Point) -> Vec<NodeId> {
        let mut doc = self.doc.borrow_mut();
        doc.hit_tests += 1;
        let mut order = Vec::new();
        Self::preorder(&doc, doc.root, &mut order);
        order
            .into_iter()
            .rev()
            .filter(|id| {
                doc.nodes
                    .get(id)
                    .and_then(|n| n.rect)
                    .is_some_and(|r| r.contains(point))
            })
            .collect()
    }

    fn document_element(&self) -> Option<NodeId> {
        Some(self.doc.borrow().root)
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.doc.borrow().body)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        Self::connected(&self.doc.borrow(), node)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.doc
            .borrow()
            .nodes
            .get(&node)
            .map(|n| n.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.doc.borrow().nodes.get(&node)?.attrs.get(name).cloned()
    }

    fn inner_text(&self, node: NodeId) -> Option<String> {
        let doc = self.doc.borrow();
        let n = doc.nodes.get(&node)?;
        if let Some(text) = &n.text {
            return Some(text.clone());
        }
        let children = n.children.clone();
        drop(doc);
        let parts: Vec<String> = children
            .into_iter()
            .filter_map(|c| self.inner_text(c))
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.doc.borrow().nodes.get(&node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.doc
            .borrow()
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        self.doc.borrow().nodes.get(&node)?.rect
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.doc.borrow().nodes.get(&node)?.computed.get(property).cloned()
    }

    fn authored_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.doc.borrow().nodes.get(&node)?.authored.get(property).cloned()
    }

    fn is_checked(&self, node: NodeId) -> Option<bool> {
        self.doc.borrow().nodes.get(&node)?.checked
    }

    fn owns_node(&self, node: NodeId) -> bool {
        self.doc
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.owned)
    }

    fn set_marker(&mut self, node: NodeId, marker_id: &str) -> bool {
        let mut doc = self.doc.borrow_mut();
        if !Self::connected(&doc, node) {
            return false;
        }
        doc.markers.insert(node, marker_id.to_string());
        true
    }

    fn clear_marker(&mut self, node: NodeId, marker_id: &str) -> bool {
        let mut doc = self.doc.borrow_mut();
        match doc.markers.get(&node) {
            Some(current) if current == marker_id => {
                doc.markers.remove(&node);
                true
            }
            _ => false,
        }
    }

    fn mount_surface(&mut self, kind: SurfaceKind) {
        let mut surface = self.surface_mut(kind);
        surface.mounted = true;
        surface.visible = false;
    }

    fn unmount_surface(&mut self, kind: SurfaceKind) {
        self.doc.borrow_mut().surfaces.remove(&kind);
    }

    fn is_mounted(&self, kind: SurfaceKind) -> bool {
        self.doc
            .borrow()
            .surfaces
            .get(&kind)
            .is_some_and(|s| s.mounted)
    }

    fn render_surface(&mut self, kind: SurfaceKind, content: &SurfaceContent) {
        let mut surface = self.surface_mut(kind);
        surface.content = Some(content.clone());
        surface.renders += 1;
    }

    fn measure_surface(&self, kind: SurfaceKind) -> Size {
        let doc = self.doc.borrow();
        match doc.surfaces.get(&kind).and_then(|s| s.content.as_ref()) {
            Some(SurfaceContent::Highlight { rect, .. }) => Size::new(rect.width, rect.height),
            Some(SurfaceContent::Metadata { text }) => {
                Size::new(text.chars().count() as f64 * 7.0 + 16.0, 22.0)
            }
            Some(SurfaceContent::Menu(view)) => {
                Size::new(220.0, view.items.len() as f64 * 32.0 + 28.0)
            }
            Some(SurfaceContent::Region { .. }) => doc.viewport.size,
            Some(SurfaceContent::Confirm { .. }) => Size::new(320.0, 120.0),
            Some(SurfaceContent::Notice { .. }) => Size::new(300.0, 40.0),
            None => Size::default(),
        }
    }

    fn place_surface(&mut self, kind: SurfaceKind, at: Point) {
        self.surface_mut(kind).position = Some(at);
    }

    fn set_surface_visible(&mut self, kind: SurfaceKind, visible: bool) {
        let mut surface = self.surface_mut(kind);
        surface.visible = visible && surface.mounted;
    }

    fn is_surface_visible(&self, kind: SurfaceKind) -> bool {
        self.doc
            .borrow()
            .surfaces
            .get(&kind)
            .is_some_and(|s| s.mounted && s.visible)
    }

    fn attach_listeners(&mut self) {
        let mut doc = self.doc.borrow_mut();
        doc.listeners = true;
        doc.attach_calls += 1;
    }

    fn detach_listeners(&mut self) {
        self.doc.borrow_mut().listeners = false;
    }

    fn request_frame(&mut self) -> FrameHandle {
        let mut doc = self.doc.borrow_mut();
        let handle = FrameHandle(doc.next_frame);
        doc.next_frame += 1;
        doc.frames_requested += 1;
        doc.pending_frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.doc.borrow_mut().pending_frames.retain(|h| *h != handle);
    }
}

// ============================================================================
// FakeService
// ============================================================================

/// How the fake answers one kind of call.
#[derive(Debug, Clone)]
pub enum Script<T> {
    Reply(T),
    /// Transport failure with this message
    Fail(String),
    /// Never resolves
    Hang,
    /// Resolves when the test calls the matching `resolve_*`
    Deferred,
}

#[derive(Debug)]
struct Slot<T> {
    script: Script<T>,
    waiting: Vec<oneshot::Sender<T>>,
}

impl<T: Clone + 'static> Slot<T> {
    fn new(reply: T) -> Self {
        Self {
            script: Script::Reply(reply),
            waiting: Vec::new(),
        }
    }

    fn answer(&mut self) -> LocalBoxFuture<'static, CaptureResult<T>> {
        match &self.script {
            Script::Reply(value) => futures::future::ready(Ok(value.clone())).boxed_local(),
            Script::Fail(message) => {
                futures::future::ready(Err(CaptureError::Transport(message.clone()))).boxed_local()
            }
            Script::Hang => futures::future::pending().boxed_local(),
            Script::Deferred => {
                let (tx, rx) = oneshot::channel();
                self.waiting.push(tx);
                async move {
                    rx.await
                        .map_err(|_| CaptureError::Transport("reply dropped".to_string()))
                }
                .boxed_local()
            }
        }
    }

    fn resolve(&mut self, value: T) -> bool {
        if self.waiting.is_empty() {
            return false;
        }
        self.waiting.remove(0).send(value).is_ok()
    }
}

/// One recorded boundary call.
#[derive(Debug, Clone)]
pub enum ServiceCall {
    DuplicateCheck(DuplicateCheckRequest),
    Capture {
        record: CaptureRecord,
        options: Option<CaptureOptions>,
    },
    RegionCapture(RegionCaptureRequest),
}

#[derive(Debug)]
struct ServiceState {
    calls: Vec<ServiceCall>,
    duplicate: Slot<DuplicateCheckReply>,
    capture: Slot<Ack>,
    region: Slot<Ack>,
}

/// Scripted [`EvidenceService`] recording every call.
#[derive(Debug, Clone)]
pub struct FakeService {
    state: Rc<RefCell<ServiceState>>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeService {
    /// Answers: not a duplicate, capture ok, region capture ok.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ServiceState {
                calls: Vec::new(),
                duplicate: Slot::new(DuplicateCheckReply {
                    ok: true,
                    is_duplicate: false,
                }),
                capture: Slot::new(Ack::OK),
                region: Slot::new(Ack::OK),
            })),
        }
    }

    pub fn script_duplicate(&self, script: Script<DuplicateCheckReply>) {
        self.state.borrow_mut().duplicate.script = script;
    }

    pub fn script_capture(&self, script: Script<Ack>) {
        self.state.borrow_mut().capture.script = script;
    }

    pub fn script_region(&self, script: Script<Ack>) {
        self.state.borrow_mut().region.script = script;
    }

    pub fn resolve_region(&self, ack: Ack) -> bool {
        self.state.borrow_mut().region.resolve(ack)
    }

    pub fn resolve_capture(&self, ack: Ack) -> bool {
        self.state.borrow_mut().capture.resolve(ack)
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state.borrow().calls.clone()
    }

    pub fn duplicate_checks(&self) -> Vec<DuplicateCheckRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ServiceCall::DuplicateCheck(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn captures(&self) -> Vec<(CaptureRecord, Option<CaptureOptions>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ServiceCall::Capture { record, options } => Some((record, options)),
                _ => None,
            })
            .collect()
    }

    pub fn region_captures(&self) -> Vec<RegionCaptureRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ServiceCall::RegionCapture(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}

impl EvidenceService for FakeService {
    fn duplicate_check(
        &self,
        request: DuplicateCheckRequest,
    ) -> LocalBoxFuture<'static, CaptureResult<DuplicateCheckReply>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ServiceCall::DuplicateCheck(request));
        state.duplicate.answer()
    }

    fn capture(
        &self,
        record: CaptureRecord,
        options: Option<CaptureOptions>,
    ) -> LocalBoxFuture<'static, CaptureResult<Ack>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ServiceCall::Capture { record, options });
        state.capture.answer()
    }

    fn region_capture(
        &self,
        request: RegionCaptureRequest,
    ) -> LocalBoxFuture<'static, CaptureResult<Ack>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ServiceCall::RegionCapture(request));
        state.region.answer()
    }
}
