//! [`PageHost`] over the live DOM.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use evidence_capture_lib::capture::conditions::Theme;
use evidence_capture_lib::geometry::{Point, Rect, Size};
use evidence_capture_lib::host::{FrameHandle, ViewportInfo};
use evidence_capture_lib::{
    InputEvent, NodeId, PageHost, SurfaceAction, SurfaceContent, SurfaceKind, WeakController,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, ShadowRoot, Window};

use crate::markup::{self, ACTION_ATTR, SURFACE_ATTR};
use crate::runtime::js_error;

/// Where page callbacks find the controller once it exists.
pub type ControllerSlot = Rc<RefCell<Option<WeakController>>>;

const PAGE_EVENTS: [&str; 7] = [
    "pointermove",
    "pointerdown",
    "pointerup",
    "click",
    "contextmenu",
    "keydown",
    "keyup",
];

/// Events a surface keeps from reaching page listeners further up the tree.
const SURFACE_EVENTS: [&str; 4] = ["pointerdown", "pointerup", "click", "contextmenu"];

const MARKER_ATTR: &str = "data-evidence-marker";

fn controller(slot: &ControllerSlot) -> Option<evidence_capture_lib::Controller> {
    slot.borrow().as_ref().and_then(WeakController::upgrade)
}

// ============================================================================
// Element registry
// ============================================================================

/// Stable ids for elements.
///
/// The reverse map is a `WeakMap`, so the page can still collect removed
/// elements; the forward map is pruned of disconnected elements on every
/// hit-test.
struct Registry {
    by_id: HashMap<u64, Element>,
    ids: js_sys::WeakMap,
    next: u64,
}

impl Registry {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            ids: js_sys::WeakMap::new(),
            next: 1,
        }
    }

    fn id_for(&mut self, element: &Element) -> NodeId {
        let key: &js_sys::Object = element.unchecked_ref();
        let id = match self.ids.get(key).as_f64() {
            Some(known) => known as u64,
            None => {
                let id = self.next;
                self.next += 1;
                self.ids.set(key, &JsValue::from_f64(id as f64));
                id
            }
        };
        self.by_id.entry(id).or_insert_with(|| element.clone());
        NodeId(id)
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        self.by_id.get(&node.0)
    }

    fn prune(&mut self) {
        self.by_id.retain(|_, element| element.is_connected());
    }
}

// ============================================================================
// Surfaces
// ============================================================================

struct Surface {
    host: HtmlElement,
    root: ShadowRoot,
    visible: bool,
    actions: Rc<RefCell<Vec<SurfaceAction>>>,
    _listener: Option<Closure<dyn FnMut(Event)>>,
}

impl Surface {
    fn set_style(&self, property: &str, value: &str) {
        if let Err(e) = self.host.style().set_property(property, value) {
            log::debug!("[BRIDGE] style {} rejected: {}", property, js_error(&e));
        }
    }

    fn place(&self, at: Point) {
        self.set_style("left", &format!("{:.1}px", at.x));
        self.set_style("top", &format!("{:.1}px", at.y));
    }
}

/// Handle clicks on `[data-action]` items and keep surface input away from
/// the page.
fn surface_listener(slot: ControllerSlot, actions: Rc<RefCell<Vec<SurfaceAction>>>) -> Closure<dyn FnMut(Event)> {
    Closure::new(move |event: Event| {
        event.stop_propagation();
        if event.type_() != "click" {
            return;
        }
        let item = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|element| element.closest(&format!("[{}]", ACTION_ATTR)).ok().flatten());
        let Some(item) = item else {
            return;
        };
        if item.has_attribute("disabled") {
            return;
        }
        let action = item
            .get_attribute(ACTION_ATTR)
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| actions.borrow().get(index).copied());
        let (Some(action), Some(controller)) = (action, controller(&slot)) else {
            return;
        };
        if let Some(task) = controller.surface_action(action) {
            wasm_bindgen_futures::spawn_local(task);
        }
    })
}

// ============================================================================
// Input translation
// ============================================================================

/// First controller surface on the event's composed path.
fn surface_on_path(event: &Event) -> Option<SurfaceKind> {
    event.composed_path().iter().find_map(|target| {
        target
            .dyn_ref::<Element>()
            .and_then(|element| element.get_attribute(SURFACE_ATTR))
            .and_then(|name| markup::parse_surface_name(&name))
    })
}

fn input_event(event: &Event) -> Option<InputEvent> {
    let kind = event.type_();
    if let Some(key) = event.dyn_ref::<web_sys::KeyboardEvent>() {
        return match kind.as_str() {
            "keydown" => Some(InputEvent::KeyDown {
                key: key.key(),
                repeat: key.repeat(),
            }),
            "keyup" => Some(InputEvent::KeyUp { key: key.key() }),
            _ => None,
        };
    }
    let mouse = event.dyn_ref::<web_sys::MouseEvent>()?;
    let point = Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
    let button = mouse.button();
    let surface = || surface_on_path(event);
    match kind.as_str() {
        "pointermove" => Some(InputEvent::PointerMove { point }),
        "pointerdown" => Some(InputEvent::PointerDown {
            point,
            button,
            surface: surface(),
        }),
        "pointerup" => Some(InputEvent::PointerUp {
            point,
            button,
            surface: surface(),
        }),
        "click" => Some(InputEvent::Click {
            point,
            button,
            surface: surface(),
        }),
        "contextmenu" => Some(InputEvent::ContextMenu {
            point,
            surface: surface(),
        }),
        _ => None,
    }
}

fn page_listener(slot: ControllerSlot) -> Closure<dyn FnMut(Event)> {
    Closure::new(move |event: Event| {
        let (Some(input), Some(controller)) = (input_event(&event), controller(&slot)) else {
            return;
        };
        let outcome = controller.handle_event(input);
        if outcome.disposition == evidence_capture_lib::Disposition::Block {
            event.prevent_default();
            event.stop_immediate_propagation();
        }
        if let Some(task) = outcome.task {
            wasm_bindgen_futures::spawn_local(task);
        }
    })
}

// ============================================================================
// WebPage
// ============================================================================

pub struct WebPage {
    window: Window,
    document: Document,
    registry: RefCell<Registry>,
    surfaces: HashMap<SurfaceKind, Surface>,
    listener: Closure<dyn FnMut(Event)>,
    listening: bool,
    frame: Closure<dyn FnMut()>,
    slot: ControllerSlot,
}

impl WebPage {
    pub fn new(slot: ControllerSlot) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let frame_slot = slot.clone();
        Ok(Self {
            window,
            document,
            registry: RefCell::new(Registry::new()),
            surfaces: HashMap::new(),
            listener: page_listener(slot.clone()),
            listening: false,
            frame: Closure::new(move || {
                if let Some(controller) = controller(&frame_slot) {
                    controller.on_frame();
                }
            }),
            slot,
        })
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.registry.borrow().element(node).cloned()
    }

    fn register(&self, element: &Element) -> NodeId {
        self.registry.borrow_mut().id_for(element)
    }

    fn create_surface(&self, kind: SurfaceKind) -> Result<Surface, JsValue> {
        let host: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        host.set_attribute(SURFACE_ATTR, markup::surface_name(kind))?;
        let root = host.attach_shadow(&web_sys::ShadowRootInit::new(web_sys::ShadowRootMode::Open))?;
        let actions = Rc::new(RefCell::new(Vec::new()));
        let listener = if markup::is_interactive(kind) {
            let listener = surface_listener(self.slot.clone(), Rc::clone(&actions));
            for event in SURFACE_EVENTS {
                host.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
            }
            Some(listener)
        } else {
            None
        };
        let surface = Surface {
            host,
            root,
            visible: false,
            actions,
            _listener: listener,
        };
        surface.set_style("position", "fixed");
        surface.set_style("left", "0px");
        surface.set_style("top", "0px");
        surface.set_style("z-index", "2147483647");
        surface.set_style("visibility", "hidden");
        if !markup::is_interactive(kind) {
            surface.set_style("pointer-events", "none");
        }
        self.document
            .document_element()
            .ok_or("No document element")?
            .append_child(&surface.host)?;
        Ok(surface)
    }

    fn matched_rule_value(&self, element: &Element, property: &str) -> Option<String> {
        let sheets = self.document.style_sheets();
        let mut found = None;
        for i in 0..sheets.length() {
            let Some(sheet) = sheets
                .item(i)
                .and_then(|s| s.dyn_into::<web_sys::CssStyleSheet>().ok())
            else {
                continue;
            };
            // Cross-origin sheets throw on access.
            let Ok(rules) = sheet.css_rules() else {
                continue;
            };
            for j in 0..rules.length() {
                let Some(rule) = rules
                    .item(j)
                    .and_then(|r| r.dyn_into::<web_sys::CssStyleRule>().ok())
                else {
                    continue;
                };
                if !element.matches(&rule.selector_text()).unwrap_or(false) {
                    continue;
                }
                if let Ok(value) = rule.style().get_property_value(property) {
                    if !value.is_empty() {
                        found = Some(value);
                    }
                }
            }
        }
        found
    }
}

fn non_empty(value: Result<String, JsValue>) -> Option<String> {
    value.ok().filter(|v| !v.trim().is_empty())
}

impl PageHost for WebPage {
    fn url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn viewport(&self) -> ViewportInfo {
        let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        ViewportInfo {
            size: Size::new(
                dimension(self.window.inner_width()),
                dimension(self.window.inner_height()),
            ),
            device_pixel_ratio: self.window.device_pixel_ratio(),
            visual_scale: self.window.visual_viewport().map(|v| v.scale()),
        }
    }

    fn theme_hint(&self) -> Theme {
        let scheme = self
            .document
            .document_element()
            .and_then(|root| self.window.get_computed_style(&root).ok().flatten())
            .and_then(|style| style.get_property_value("color-scheme").ok())
            .unwrap_or_default();
        let dark = scheme.contains("dark");
        let light = scheme.contains("light");
        match (dark, light) {
            (true, false) => Theme::Dark,
            (false, true) => Theme::Light,
            _ => Theme::Unknown,
        }
    }

    fn elements_from_point(&self, point: Point) -> Vec<NodeId> {
        let hits = self.document.elements_from_point(point.x as f32, point.y as f32);
        let mut registry = self.registry.borrow_mut();
        registry.prune();
        hits.iter()
            .filter_map(|hit| hit.dyn_into::<Element>().ok())
            .map(|element| registry.id_for(&element))
            .collect()
    }

    fn document_element(&self) -> Option<NodeId> {
        self.document.document_element().map(|e| self.register(&e))
    }

    fn body(&self) -> Option<NodeId> {
        self.document.body().map(|e| self.register(&e))
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.is_connected())
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node)
            .map(|e| e.tag_name().to_uppercase())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn inner_text(&self, node: NodeId) -> Option<String> {
        let element = self.element(node)?;
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => Some(html.inner_text()),
            None => element.text_content(),
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.element(node)?.parent_element()?;
        Some(self.register(&parent))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(element) = self.element(node) else {
            return Vec::new();
        };
        let children = element.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|child| self.register(&child))
            .collect()
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        let element = self.element(node).filter(|e| e.is_connected())?;
        let r = element.get_bounding_client_rect();
        Some(Rect::new(r.x(), r.y(), r.width(), r.height()))
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        let element = self.element(node)?;
        let style = self.window.get_computed_style(&element).ok().flatten()?;
        non_empty(style.get_property_value(property))
    }

    fn authored_style(&self, node: NodeId, property: &str) -> Option<String> {
        let element = self.element(node)?;
        let inline = element
            .dyn_ref::<HtmlElement>()
            .and_then(|html| non_empty(html.style().get_property_value(property)));
        inline.or_else(|| self.matched_rule_value(&element, property))
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        self.element(node)
            .is_some_and(|e| e.matches(":disabled").unwrap_or(false) || e.has_attribute("disabled"))
    }

    fn is_checked(&self, node: NodeId) -> Option<bool> {
        let element = self.element(node)?;
        let input = element.dyn_ref::<web_sys::HtmlInputElement>()?;
        matches!(input.type_().as_str(), "checkbox" | "radio").then(|| input.checked())
    }

    fn owns_node(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| {
            e.closest(&format!("[{}]", SURFACE_ATTR))
                .ok()
                .flatten()
                .is_some()
        })
    }

    fn set_marker(&mut self, node: NodeId, marker_id: &str) -> bool {
        match self.element(node).filter(|e| e.is_connected()) {
            Some(element) => element.set_attribute(MARKER_ATTR, marker_id).is_ok(),
            None => false,
        }
    }

    fn clear_marker(&mut self, node: NodeId, marker_id: &str) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        if element.get_attribute(MARKER_ATTR).as_deref() != Some(marker_id) {
            return false;
        }
        element.remove_attribute(MARKER_ATTR).is_ok()
    }

    fn mount_surface(&mut self, kind: SurfaceKind) {
        if self.surfaces.contains_key(&kind) {
            return;
        }
        match self.create_surface(kind) {
            Ok(surface) => {
                self.surfaces.insert(kind, surface);
            }
            Err(e) => log::error!("[BRIDGE] Could not mount {:?}: {}", kind, js_error(&e)),
        }
    }

    fn unmount_surface(&mut self, kind: SurfaceKind) {
        if let Some(surface) = self.surfaces.remove(&kind) {
            surface.host.remove();
        }
    }

    fn is_mounted(&self, kind: SurfaceKind) -> bool {
        self.surfaces.contains_key(&kind)
    }

    fn render_surface(&mut self, kind: SurfaceKind, content: &SurfaceContent) {
        let Some(surface) = self.surfaces.get(&kind) else {
            return;
        };
        let (html, actions) = markup::render(content);
        surface.root.set_inner_html(&html);
        *surface.actions.borrow_mut() = actions;
        match content {
            SurfaceContent::Highlight { rect, .. } => surface.place(Point::new(rect.left, rect.top)),
            SurfaceContent::Region { .. } => surface.place(Point::new(0.0, 0.0)),
            _ => {}
        }
    }

    fn measure_surface(&self, kind: SurfaceKind) -> Size {
        self.surfaces
            .get(&kind)
            .map(|surface| {
                let r = surface.host.get_bounding_client_rect();
                Size::new(r.width(), r.height())
            })
            .unwrap_or_default()
    }

    fn place_surface(&mut self, kind: SurfaceKind, at: Point) {
        if let Some(surface) = self.surfaces.get(&kind) {
            surface.place(at);
        }
    }

    fn set_surface_visible(&mut self, kind: SurfaceKind, visible: bool) {
        if let Some(surface) = self.surfaces.get_mut(&kind) {
            surface.visible = visible;
            surface.set_style("visibility", if visible { "visible" } else { "hidden" });
        }
    }

    fn is_surface_visible(&self, kind: SurfaceKind) -> bool {
        self.surfaces.get(&kind).is_some_and(|s| s.visible)
    }

    fn attach_listeners(&mut self) {
        if self.listening {
            return;
        }
        for event in PAGE_EVENTS {
            if let Err(e) = self.window.add_event_listener_with_callback_and_bool(
                event,
                self.listener.as_ref().unchecked_ref(),
                true,
            ) {
                log::error!("[BRIDGE] Could not listen for {}: {}", event, js_error(&e));
            }
        }
        self.listening = true;
    }

    fn detach_listeners(&mut self) {
        if !self.listening {
            return;
        }
        for event in PAGE_EVENTS {
            let _ = self.window.remove_event_listener_with_callback_and_bool(
                event,
                self.listener.as_ref().unchecked_ref(),
                true,
            );
        }
        self.listening = false;
    }

    fn request_frame(&mut self) -> FrameHandle {
        match self
            .window
            .request_animation_frame(self.frame.as_ref().unchecked_ref())
        {
            Ok(id) => FrameHandle(id as u64),
            Err(e) => {
                log::warn!("[BRIDGE] requestAnimationFrame failed: {}", js_error(&e));
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0 as i32);
    }
}

impl Drop for WebPage {
    fn drop(&mut self) {
        self.detach_listeners();
        for (_, surface) in self.surfaces.drain() {
            surface.host.remove();
        }
    }
}
