//! Browser bindings: the live DOM as a [`Stage`], the window's timers as a
//! [`Scheduler`], `localStorage` as the preference store, and the event
//! wiring that ties them to the effects.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, EventTarget, HtmlElement, Window, window};

use crate::config::FxConfig;
use crate::error::{FxError, FxResult};
use crate::fx::Fx;
use crate::mascot::{MASCOT_ID, Mascot};
use crate::particles::{ParticleFactory, ScrollWatcher};
use crate::scheduler::{FrameTask, Scheduler, Task};
use crate::sound::{AudioBoard, Cue, sound_triggers};
use crate::stage::{Point, Rect, Stage, Viewport};
use crate::theme::{PreferenceStore, TOGGLE_CLASS, ThemeSwitch};

pub struct DomStage {
    window: Window,
    document: Document,
}

impl DomStage {
    pub fn from_window() -> FxResult<Self> {
        let window = window().ok_or(FxError::NoWindow)?;
        let document = window.document().ok_or(FxError::NoDocument)?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Stage for DomStage {
    type Node = Element;

    fn body(&self) -> FxResult<Element> {
        self.document.body().map(Element::from).ok_or(FxError::NoBody)
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn by_class(&self, class: &str) -> Vec<Element> {
        let found = self.document.get_elements_by_class_name(class);
        (0..found.length()).filter_map(|i| found.item(i)).collect()
    }

    fn create(&self, tag: &str, class: Option<&str>) -> FxResult<Element> {
        let el = self.document.create_element(tag)?;
        if let Some(class) = class {
            el.set_class_name(class);
        }
        Ok(el)
    }

    fn append_to_body(&self, node: &Element) -> FxResult<()> {
        self.body()?.append_child(node)?;
        Ok(())
    }

    fn detach(&self, node: &Element) {
        node.remove();
    }

    fn is_attached(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) -> FxResult<()> {
        let html = node
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| FxError::Js(format!("<{}> has no inline style", node.tag_name())))?;
        html.style().set_property(property, value)?;
        Ok(())
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_attr(&self, node: &Element, name: &str, value: &str) -> FxResult<()> {
        node.set_attribute(name, value)?;
        Ok(())
    }

    fn attr(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn add_class(&self, node: &Element, class: &str) {
        if let Err(err) = node.class_list().add_1(class) {
            log::debug!("class {class} not added: {err:?}");
        }
    }

    fn remove_class(&self, node: &Element, class: &str) {
        if let Err(err) = node.class_list().remove_1(class) {
            log::debug!("class {class} not removed: {err:?}");
        }
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn rect(&self, node: &Element) -> FxResult<Rect> {
        let r = node.get_bounding_client_rect();
        if r.width() <= 0.0 && r.height() <= 0.0 {
            return Err(FxError::Layout);
        }
        Ok(Rect { left: r.left(), top: r.top(), width: r.width(), height: r.height() })
    }

    fn viewport(&self) -> Viewport {
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport { width: dim(self.window.inner_width()), height: dim(self.window.inner_height()) }
    }

    fn scroll_offset(&self) -> Point {
        Point::new(self.window.scroll_x().unwrap_or(0.0), self.window.scroll_y().unwrap_or(0.0))
    }

    fn root_attr(&self, name: &str) -> Option<String> {
        self.document.document_element()?.get_attribute(name)
    }

    fn set_root_attr(&self, name: &str, value: &str) -> FxResult<()> {
        let root = self.document.document_element().ok_or(FxError::NoDocument)?;
        root.set_attribute(name, value)?;
        Ok(())
    }
}

pub struct WindowScheduler {
    window: Window,
}

impl WindowScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for WindowScheduler {
    fn now(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    fn set_timeout(&self, delay_ms: u32, task: Task) {
        let cb = Closure::once_into_js(move || task());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay)
        {
            log::error!("setTimeout rejected: {err:?}");
        }
    }

    fn set_interval(&self, period_ms: u32, mut task: Box<dyn FnMut()>) {
        let closure = Closure::wrap(Box::new(move || task()) as Box<dyn FnMut()>);
        let period = i32::try_from(period_ms).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period,
            )
        {
            log::error!("setInterval rejected: {err:?}");
        }
        closure.forget();
    }

    fn request_frame(&self, task: FrameTask) {
        let cb = Closure::once_into_js(move |ts: f64| task(ts));
        if let Err(err) = self.window.request_animation_frame(cb.unchecked_ref()) {
            log::error!("requestAnimationFrame rejected: {err:?}");
        }
    }
}

/// `window.localStorage`, when the browser grants it.
pub struct LocalPrefs {
    storage: Option<web_sys::Storage>,
}

impl LocalPrefs {
    pub fn new(window: &Window) -> Self {
        Self { storage: window.local_storage().ok().flatten() }
    }

    fn storage(&self) -> FxResult<&web_sys::Storage> {
        self.storage.as_ref().ok_or_else(|| FxError::Storage("localStorage disabled".into()))
    }
}

impl PreferenceStore for LocalPrefs {
    fn get(&self, key: &str) -> FxResult<Option<String>> {
        self.storage()?.get_item(key).map_err(|e| FxError::Storage(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> FxResult<()> {
        self.storage()?.set_item(key, value).map_err(|e| FxError::Storage(format!("{e:?}")))
    }
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> FxResult<()> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Wire every effect onto the current page.
pub fn install(config: FxConfig) -> FxResult<()> {
    let stage = Rc::new(DomStage::from_window()?);
    let win = stage.window().clone();
    let clock: Rc<dyn Scheduler> = Rc::new(WindowScheduler::new(win.clone()));
    let fx = Fx::new(Rc::clone(&stage), clock, config);

    install_theme_toggle(&stage)?;
    let audio = Rc::new(AudioBoard::new(fx.config.sound_enabled));
    install_sounds(stage.as_ref(), &audio)?;

    let particles = ParticleFactory::new(Rc::clone(&fx));
    let seeded = particles.seed_ambient()?;
    particles.start_ambient_stream();

    {
        let watcher = ScrollWatcher::new(
            win.scroll_y().unwrap_or(0.0),
            fx.config.scroll_threshold_px,
        );
        let particles = particles.clone();
        let stage = Rc::clone(&stage);
        listen(&win, "scroll", move |_| {
            particles.scroll_sample(&watcher, stage.scroll_offset().y);
        })?;
    }

    match stage.by_id(MASCOT_ID) {
        Some(el) => {
            let mascot = Mascot::attach(Rc::clone(&fx), el.clone())?;
            install_mascot(mascot, &el, audio)?;
        }
        None => log::debug!("#{MASCOT_ID} not on this page; mascot effects skipped"),
    }

    log::info!("effects ready: {seeded} ambient pixels seeded");
    Ok(())
}

fn install_theme_toggle(stage: &Rc<DomStage>) -> FxResult<()> {
    let prefs = LocalPrefs::new(stage.window());
    ThemeSwitch::new(stage.as_ref(), &prefs).restore();
    let Some(button) = stage.by_class(TOGGLE_CLASS).into_iter().next() else {
        log::debug!(".{TOGGLE_CLASS} not on this page; toggle skipped");
        return Ok(());
    };
    let stage = Rc::clone(stage);
    listen(&button, "click", move |_| {
        let theme = ThemeSwitch::new(stage.as_ref(), &prefs).toggle();
        log::debug!("theme switched to {}", theme.as_str());
    })
}

fn install_sounds(stage: &DomStage, audio: &Rc<AudioBoard>) -> FxResult<()> {
    let triggers = sound_triggers(stage);
    for el in &triggers {
        let hover = Rc::clone(audio);
        listen(el, "mouseenter", move |_| hover.play(Cue::Hover))?;
        let click = Rc::clone(audio);
        listen(el, "click", move |_| click.play(Cue::Click))?;
    }
    log::debug!("{} sound triggers wired", triggers.len());
    Ok(())
}

fn install_mascot(
    mascot: Rc<Mascot<DomStage>>,
    el: &Element,
    audio: Rc<AudioBoard>,
) -> FxResult<()> {
    {
        let mascot = Rc::clone(&mascot);
        listen(el, "click", move |evt| {
            evt.prevent_default();
            evt.stop_propagation();
            audio.play(Cue::Click);
            mascot.on_click();
        })?;
    }
    {
        let mascot = Rc::clone(&mascot);
        listen(el, "mouseenter", move |_| mascot.on_hover())?;
    }
    listen(el, "mouseleave", move |_| mascot.on_leave())
}
