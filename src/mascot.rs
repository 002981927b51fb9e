//! The clickable mascot (`#creeper`) and its speech bubble.
//!
//! Mode is read from the theme attribute once per handler invocation and
//! threaded through the whole sequence; delayed reverts never re-read it.
//! Rapid clicks overlap freely: each sequence owns its own timers and the
//! bubble shows whichever write landed last.

use std::rc::Rc;

use crate::error::FxResult;
use crate::fx::Fx;
use crate::particles::{Anchor, ParticleFactory};
use crate::stage::Stage;
use crate::theme::Mode;

pub const MASCOT_ID: &str = "creeper";
pub const BUBBLE_CLASS: &str = "creeper-talk";

/// Lines Steve picks from on hover and on click.
pub const QUIET_PHRASES: [&str; 8] = [
    "Hei!",
    "Halo!",
    "Nice!",
    "Awesome!",
    "Let's build!",
    "Cool project!",
    "Keep coding!",
    "Great work!",
];
pub const IDLE_PHRASE: &str = "sssss...";
pub const ALERT_PHRASE: &str = "BOOM! 💥";
pub const HIT_PHRASE: &str = "Ouch!";

const SHOW: &str = "show";

// Page-wide and mascot state classes.
const BOUNCE: &str = "bounce";
const SHAKE: &str = "shake";
const STEVE_HIT: &str = "steve-hit";
const STEVE_DAMAGE: &str = "steve-damage";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BubbleStyle {
    Plain,
    Quiet,
    Hit,
}

impl BubbleStyle {
    fn class(self) -> Option<&'static str> {
        match self {
            BubbleStyle::Plain => None,
            BubbleStyle::Quiet => Some("steve-mode"),
            BubbleStyle::Hit => Some("steve-damage-bubble"),
        }
    }
}

/// Snapshot of what the bubble currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BubbleState {
    pub text: String,
    pub visible: bool,
    pub style: BubbleStyle,
}

/// The single `.creeper-talk` element, created once and updated in place.
pub struct Bubble<S: Stage> {
    stage: Rc<S>,
    node: S::Node,
}

impl<S: Stage> Bubble<S> {
    pub fn create(stage: Rc<S>) -> FxResult<Self> {
        let node = stage.create("div", Some(BUBBLE_CLASS))?;
        stage.set_text(&node, IDLE_PHRASE);
        stage.append_to_body(&node)?;
        Ok(Self { stage, node })
    }

    pub fn say(&self, text: &str, style: BubbleStyle) {
        self.stage.set_text(&self.node, text);
        self.stage.add_class(&self.node, SHOW);
        if let Some(class) = style.class() {
            self.stage.add_class(&self.node, class);
        }
    }

    /// Drop `show` and the given style's class.
    pub fn clear(&self, style: BubbleStyle) {
        self.stage.remove_class(&self.node, SHOW);
        if let Some(class) = style.class() {
            self.stage.remove_class(&self.node, class);
        }
    }

    fn clear_class(&self, style: BubbleStyle) {
        if let Some(class) = style.class() {
            self.stage.remove_class(&self.node, class);
        }
    }

    pub fn state(&self) -> BubbleState {
        let style = [BubbleStyle::Hit, BubbleStyle::Quiet]
            .into_iter()
            .find(|s| s.class().is_some_and(|c| self.stage.has_class(&self.node, c)))
            .unwrap_or(BubbleStyle::Plain);
        BubbleState {
            text: self.stage.text(&self.node),
            visible: self.stage.has_class(&self.node, SHOW),
            style,
        }
    }
}

pub struct Mascot<S: Stage> {
    fx: Rc<Fx<S>>,
    particles: ParticleFactory<S>,
    node: S::Node,
    bubble: Bubble<S>,
}

impl<S: Stage> Mascot<S> {
    /// Wrap the mascot element and add the bubble to the page.
    pub fn attach(fx: Rc<Fx<S>>, node: S::Node) -> FxResult<Rc<Self>> {
        let bubble = Bubble::create(Rc::clone(&fx.stage))?;
        let particles = ParticleFactory::new(Rc::clone(&fx));
        Ok(Rc::new(Self { fx, particles, node, bubble }))
    }

    pub fn bubble(&self) -> &Bubble<S> {
        &self.bubble
    }

    pub fn node(&self) -> &S::Node {
        &self.node
    }

    pub fn mode(&self) -> Mode {
        Mode::current(self.fx.stage.as_ref())
    }

    pub fn on_hover(&self) {
        match self.mode() {
            Mode::Quiet => self.bubble.say(*self.fx.pick(&QUIET_PHRASES), BubbleStyle::Quiet),
            Mode::Alert => {
                self.bubble.say(IDLE_PHRASE, BubbleStyle::Plain);
                self.bubble.clear_class(BubbleStyle::Quiet);
            }
        }
    }

    pub fn on_leave(&self) {
        self.bubble.clear(BubbleStyle::Quiet);
    }

    /// Puff, and in quiet mode follow up with a hit after `hit_delay_ms`.
    pub fn on_click(self: &Rc<Self>) -> Mode {
        let mode = self.mode();
        self.puff(mode);
        if mode == Mode::Quiet {
            let this = Rc::clone(self);
            self.fx
                .clock
                .set_timeout(self.fx.config.hit_delay_ms, Box::new(move || this.hit()));
        }
        mode
    }

    pub fn puff(self: &Rc<Self>, mode: Mode) {
        let origin = self.particles.origin_of(&self.node, Anchor::Viewport);
        let cfg = &self.fx.config;
        let (page_class, style, revert_ms) = match mode {
            Mode::Quiet => (BOUNCE, BubbleStyle::Quiet, cfg.quiet_revert_ms),
            Mode::Alert => (SHAKE, BubbleStyle::Plain, cfg.alert_revert_ms),
        };
        self.page_class(page_class, true);
        match mode {
            Mode::Quiet => {
                self.particles.sparkles(origin);
                self.bubble.say(*self.fx.pick(&QUIET_PHRASES), style);
            }
            Mode::Alert => {
                self.particles.explosion(origin);
                self.bubble.say(ALERT_PHRASE, style);
            }
        }
        let this = Rc::clone(self);
        self.fx.clock.set_timeout(
            revert_ms,
            Box::new(move || {
                this.page_class(page_class, false);
                this.bubble.clear(style);
            }),
        );
        self.particles.floating_symbols(origin);
    }

    /// Damage feedback: red flash on the mascot, page tint, particles.
    pub fn hit(self: &Rc<Self>) {
        let origin = self.particles.origin_of(&self.node, Anchor::Page);
        let stage = &self.fx.stage;
        stage.add_class(&self.node, STEVE_HIT);
        self.page_class(STEVE_DAMAGE, true);
        self.bubble.say(HIT_PHRASE, BubbleStyle::Hit);
        self.particles.damage(origin);
        let this = Rc::clone(self);
        self.fx.clock.set_timeout(
            self.fx.config.hit_revert_ms,
            Box::new(move || {
                this.fx.stage.remove_class(&this.node, STEVE_HIT);
                this.page_class(STEVE_DAMAGE, false);
                this.bubble.clear(BubbleStyle::Hit);
            }),
        );
    }

    fn page_class(&self, class: &str, on: bool) {
        match self.fx.stage.body() {
            Ok(body) if on => self.fx.stage.add_class(&body, class),
            Ok(body) => self.fx.stage.remove_class(&body, class),
            Err(err) => log::debug!("page class {class} skipped: {err}"),
        }
    }
}
