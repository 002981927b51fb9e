//! Headless stage and virtual clock.
//!
//! `SimStage` keeps a flat arena of fake elements and `ManualClock` advances
//! time in display-frame steps, firing due timers in order. Together they let
//! the effect layer run natively, which is how the crate's tests drive it.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use crate::error::{FxError, FxResult};
use crate::scheduler::{FrameTask, Scheduler, Task};
use crate::stage::{Point, Rect, Stage, Viewport};

/// Length of one simulated display refresh.
pub const FRAME_MS: f64 = 16.0;

enum Timer {
    Once(Task),
    Every(u32, Rc<RefCell<Box<dyn FnMut()>>>),
}

#[derive(Default)]
struct ClockState {
    now: f64,
    seq: u64,
    // (due, seq) keeps same-deadline timers in registration order.
    timers: BTreeMap<(u64, u64), Timer>,
    frames: Vec<FrameTask>,
}

/// Deterministic stand-in for the browser event loop.
#[derive(Default)]
pub struct ManualClock {
    state: RefCell<ClockState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// Move time forward by `ms`, running timers at their deadlines and
    /// frame callbacks once per `FRAME_MS` step.
    pub fn advance(&self, ms: f64) {
        let end = self.now() + ms;
        while self.now() < end {
            let step_end = (self.now() + FRAME_MS).min(end);
            self.run_timers_until(step_end);
            self.state.borrow_mut().now = step_end;
            let frames = std::mem::take(&mut self.state.borrow_mut().frames);
            for frame in frames {
                frame(step_end);
            }
        }
        self.run_timers_until(end);
    }

    fn run_timers_until(&self, limit: f64) {
        loop {
            let next = {
                let mut st = self.state.borrow_mut();
                let key = match st.timers.keys().next() {
                    Some(&key) if key.0 as f64 <= limit => key,
                    _ => break,
                };
                st.now = st.now.max(key.0 as f64);
                st.timers.remove(&key)
            };
            match next {
                Some(Timer::Once(task)) => task(),
                Some(Timer::Every(period, task)) => {
                    (*task.borrow_mut())();
                    self.push_timer(period, Timer::Every(period, task));
                }
                None => break,
            }
        }
    }

    fn push_timer(&self, delay_ms: u32, timer: Timer) {
        let mut st = self.state.borrow_mut();
        let due = st.now.ceil() as u64 + u64::from(delay_ms);
        st.seq += 1;
        let seq = st.seq;
        st.timers.insert((due, seq), timer);
    }
}

impl Scheduler for ManualClock {
    fn now(&self) -> f64 {
        self.state.borrow().now
    }

    fn set_timeout(&self, delay_ms: u32, task: Task) {
        self.push_timer(delay_ms, Timer::Once(task));
    }

    fn set_interval(&self, period_ms: u32, task: Box<dyn FnMut()>) {
        // Browsers clamp zero-period intervals; avoid spinning forever.
        let period = period_ms.max(1);
        self.push_timer(period, Timer::Every(period, Rc::new(RefCell::new(task))));
    }

    fn request_frame(&self, task: FrameTask) {
        self.state.borrow_mut().frames.push(task);
    }
}

/// Handle into the `SimStage` arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Default, Debug, Clone)]
pub struct SimNode {
    pub tag: String,
    pub classes: BTreeSet<String>,
    pub styles: HashMap<String, String>,
    pub attrs: HashMap<String, String>,
    pub text: String,
    pub attached: bool,
    pub rect: Option<Rect>,
    /// Style and attribute writes fail once attached (injects per-frame
    /// failures).
    pub poisoned: bool,
}

#[derive(Default)]
struct Dom {
    nodes: Vec<SimNode>,
    root_attrs: HashMap<String, String>,
    // (class, nth) pairs to poison at creation time.
    poison: Vec<(String, usize)>,
    created_by_class: HashMap<String, usize>,
}

pub struct SimStage {
    dom: RefCell<Dom>,
    viewport: Cell<Viewport>,
    scroll: Cell<Point>,
    detach_calls: Cell<usize>,
}

impl Default for SimStage {
    fn default() -> Self {
        Self::new(Viewport { width: 1280.0, height: 720.0 })
    }
}

impl SimStage {
    /// New document containing only an attached `<body>`.
    pub fn new(viewport: Viewport) -> Self {
        let body = SimNode { tag: "body".into(), attached: true, ..SimNode::default() };
        Self {
            dom: RefCell::new(Dom { nodes: vec![body], ..Dom::default() }),
            viewport: Cell::new(viewport),
            scroll: Cell::new(Point::default()),
            detach_calls: Cell::new(0),
        }
    }

    /// Attach a page element with an id and an optional laid-out box.
    pub fn insert_element(&self, id: &str, class: Option<&str>, rect: Option<Rect>) -> NodeId {
        let mut node = SimNode { tag: "div".into(), attached: true, rect, ..SimNode::default() };
        node.attrs.insert("id".into(), id.into());
        if let Some(class) = class {
            node.classes.insert(class.into());
        }
        let mut dom = self.dom.borrow_mut();
        dom.nodes.push(node);
        NodeId(dom.nodes.len() - 1)
    }

    pub fn set_scroll(&self, offset: Point) {
        self.scroll.set(offset);
    }

    pub fn set_rect(&self, node: NodeId, rect: Option<Rect>) {
        self.dom.borrow_mut().nodes[node.0].rect = rect;
    }

    /// Make the `nth` (0-based) element later created with `class` reject
    /// style writes once it is in the document.
    pub fn poison(&self, class: &str, nth: usize) {
        self.dom.borrow_mut().poison.push((class.into(), nth));
    }

    /// Make an existing page element reject style and attribute writes.
    pub fn poison_node(&self, node: NodeId) {
        self.dom.borrow_mut().nodes[node.0].poisoned = true;
    }

    pub fn node(&self, node: NodeId) -> SimNode {
        self.dom.borrow().nodes[node.0].clone()
    }

    pub fn created_with_class(&self, class: &str) -> usize {
        self.dom.borrow().created_by_class.get(class).copied().unwrap_or(0)
    }

    pub fn attached_with_class(&self, class: &str) -> usize {
        self.dom
            .borrow()
            .nodes
            .iter()
            .filter(|n| n.attached && n.classes.contains(class))
            .count()
    }

    pub fn nodes_with_class(&self, class: &str) -> Vec<NodeId> {
        self.dom
            .borrow()
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.classes.contains(class))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Nodes created by the effect layer (everything but body and page
    /// elements added with `insert_element`) still in the document.
    pub fn attached_created(&self) -> usize {
        self.dom
            .borrow()
            .nodes
            .iter()
            .skip(1)
            .filter(|n| n.attached && !n.attrs.contains_key("id"))
            .count()
    }

    /// Every node the effect layer created, attached or not.
    pub fn created_count(&self) -> usize {
        self.dom.borrow().nodes.iter().skip(1).filter(|n| !n.attrs.contains_key("id")).count()
    }

    pub fn detach_calls(&self) -> usize {
        self.detach_calls.get()
    }

    fn with_node<R>(&self, node: &NodeId, f: impl FnOnce(&mut SimNode) -> R) -> R {
        f(&mut self.dom.borrow_mut().nodes[node.0])
    }
}

impl Stage for SimStage {
    type Node = NodeId;

    fn body(&self) -> FxResult<NodeId> {
        Ok(NodeId(0))
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        self.dom
            .borrow()
            .nodes
            .iter()
            .position(|n| n.attached && n.attrs.get("id").is_some_and(|v| v == id))
            .map(NodeId)
    }

    fn by_class(&self, class: &str) -> Vec<NodeId> {
        self.dom
            .borrow()
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.attached && n.classes.contains(class))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn create(&self, tag: &str, class: Option<&str>) -> FxResult<NodeId> {
        let mut dom = self.dom.borrow_mut();
        let mut node = SimNode { tag: tag.into(), ..SimNode::default() };
        if let Some(class) = class {
            node.classes.insert(class.into());
            let nth = dom.created_by_class.entry(class.into()).or_insert(0);
            let index = *nth;
            *nth += 1;
            node.poisoned = dom.poison.iter().any(|(c, n)| c == class && *n == index);
        }
        dom.nodes.push(node);
        Ok(NodeId(dom.nodes.len() - 1))
    }

    fn append_to_body(&self, node: &NodeId) -> FxResult<()> {
        self.with_node(node, |n| n.attached = true);
        Ok(())
    }

    fn detach(&self, node: &NodeId) {
        self.detach_calls.set(self.detach_calls.get() + 1);
        self.with_node(node, |n| n.attached = false);
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        self.with_node(node, |n| n.attached)
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) -> FxResult<()> {
        self.with_node(node, |n| {
            if n.poisoned && n.attached {
                return Err(FxError::Js(format!("style write rejected: {property}")));
            }
            n.styles.insert(property.into(), value.into());
            Ok(())
        })
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.with_node(node, |n| n.text = text.into());
    }

    fn text(&self, node: &NodeId) -> String {
        self.with_node(node, |n| n.text.clone())
    }

    fn set_attr(&self, node: &NodeId, name: &str, value: &str) -> FxResult<()> {
        self.with_node(node, |n| {
            if n.poisoned && n.attached {
                return Err(FxError::Js(format!("attribute write rejected: {name}")));
            }
            n.attrs.insert(name.into(), value.into());
            Ok(())
        })
    }

    fn attr(&self, node: &NodeId, name: &str) -> Option<String> {
        self.with_node(node, |n| n.attrs.get(name).cloned())
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        self.with_node(node, |n| n.classes.insert(class.into()));
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.with_node(node, |n| n.classes.remove(class));
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.with_node(node, |n| n.classes.contains(class))
    }

    fn rect(&self, node: &NodeId) -> FxResult<Rect> {
        match self.with_node(node, |n| n.rect) {
            Some(r) if r.width > 0.0 || r.height > 0.0 => Ok(r),
            _ => Err(FxError::Layout),
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn scroll_offset(&self) -> Point {
        self.scroll.get()
    }

    fn root_attr(&self, name: &str) -> Option<String> {
        self.dom.borrow().root_attrs.get(name).cloned()
    }

    fn set_root_attr(&self, name: &str, value: &str) -> FxResult<()> {
        self.dom.borrow_mut().root_attrs.insert(name.into(), value.into());
        Ok(())
    }
}

/// In-memory preference store.
#[derive(Default)]
pub struct MemoryPrefs {
    values: RefCell<HashMap<String, String>>,
    pub fail_writes: Cell<bool>,
}

impl crate::theme::PreferenceStore for MemoryPrefs {
    fn get(&self, key: &str) -> FxResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> FxResult<()> {
        if self.fail_writes.get() {
            return Err(FxError::Storage("quota exceeded".into()));
        }
        self.values.borrow_mut().insert(key.into(), value.into());
        Ok(())
    }
}
