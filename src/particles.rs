//! Transient decoration elements.
//!
//! Every particle leaves the document through exactly one path: a fixed TTL
//! timer for CSS-animated particles, or the end of its frame loop for the
//! script-animated ones. Bursts never cancel each other.

use std::cell::Cell;
use std::f64::consts::TAU;
use std::rc::Rc;

use crate::error::FxResult;
use crate::fx::Fx;
use crate::scheduler::{Easing, FrameEnd, animate_frames, schedule_removal};
use crate::stage::{Point, Stage, set_styles};

/// Symbols that drift out of the mascot on every click.
pub const FLOATING_SYMBOLS: [&str; 8] = ["⭐", "✨", "💫", "🌟", "💥", "💎", "🔥", "⚡"];
/// Debris thrown by the creeper explosion.
pub const EXPLOSION_GLYPHS: [&str; 6] = ["💥", "🔥", "💨", "⚡", "🌪️", "💢"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Ambient,
    ScrollSparkle,
    Sparkle,
    Damage,
    Impact,
    Explosion,
    FloatingSymbol,
}

impl ParticleKind {
    /// Stylesheet hook; floating symbols are styled inline only.
    pub fn class(self) -> Option<&'static str> {
        match self {
            ParticleKind::Ambient => Some("pixel"),
            ParticleKind::ScrollSparkle => Some("scroll-sparkle"),
            ParticleKind::Sparkle => Some("sparkle"),
            ParticleKind::Damage => Some("damage-particle"),
            ParticleKind::Impact => Some("impact-particle"),
            ParticleKind::Explosion => Some("explosion-particle"),
            ParticleKind::FloatingSymbol => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            ParticleKind::Ambient | ParticleKind::ScrollSparkle => "span",
            _ => "div",
        }
    }

    fn glow(self) -> &'static str {
        match self {
            ParticleKind::Explosion => "0 0 10px #ff4444, 0 0 20px #ff0000",
            _ => "0 0 10px #ffff00",
        }
    }
}

/// When a burst member starts relative to the burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stagger {
    None,
    /// Element is created after this many ms.
    Spawn(u32),
    /// Element exists immediately; its frame loop starts after this many ms.
    Start(u32),
    /// CSS `animation-delay` in seconds.
    Css(f64),
}

impl Stagger {
    fn script_delay_ms(self) -> u32 {
        match self {
            Stagger::Spawn(ms) | Stagger::Start(ms) => ms,
            Stagger::None | Stagger::Css(_) => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fade {
    Linear,
    Quadratic,
}

/// Script-driven trajectory out of the burst origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flight {
    pub duration_ms: f64,
    pub easing: Easing,
    /// Upward drift reached at the end, applied linearly in time.
    pub lift_px: f64,
    /// Vertical share of the radial offset (1 = circular).
    pub spread_y: f64,
    /// Scale grows from 1 to `1 + grow`.
    pub grow: f64,
    pub spin_deg: f64,
    pub fade: Fade,
}

/// Computed look of a flying particle at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStyle {
    pub at: Point,
    pub scale: f64,
    pub rotate_deg: f64,
    pub opacity: f64,
}

impl Flight {
    pub fn at(&self, origin: Point, angle: f64, distance: f64, progress: f64) -> FrameStyle {
        let p = progress.clamp(0.0, 1.0);
        let e = self.easing.apply(p);
        FrameStyle {
            at: Point::new(
                origin.x + angle.cos() * distance * e,
                origin.y + angle.sin() * distance * e * self.spread_y - self.lift_px * p,
            ),
            scale: 1.0 + self.grow * p,
            rotate_deg: self.spin_deg * p,
            opacity: match self.fade {
                Fade::Linear => 1.0 - p,
                Fade::Quadratic => 1.0 - p * p,
            },
        }
    }

    fn transform(&self, style: &FrameStyle) -> String {
        if self.spin_deg == 0.0 {
            format!("translate(-50%, -50%) scale({})", style.scale)
        } else {
            format!("translate(-50%, -50%) scale({}) rotate({}deg)", style.scale, style.rotate_deg)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Placed once; the stylesheet animates it and a timer removes it.
    Fixed { ttl_ms: u32, angle_var: bool },
    /// Moved every frame; removed when the flight ends.
    Flight(Flight),
}

/// Per-member parameters of a radial burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    pub angle: f64,
    pub distance: f64,
    pub stagger: Stagger,
    pub glyph: Option<&'static str>,
    pub font_px: Option<f64>,
    pub motion: Motion,
}

impl Shot {
    pub fn fixed(angle: f64, distance: f64, ttl_ms: u32) -> Self {
        Self {
            angle,
            distance,
            stagger: Stagger::None,
            glyph: None,
            font_px: None,
            motion: Motion::Fixed { ttl_ms, angle_var: false },
        }
    }
}

/// Record of one spawned (or scheduled) particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub origin: Point,
    pub spawned_at: f64,
    /// Upper bound on time in the document, measured from the burst.
    pub ttl_ms: u32,
    pub shot: Option<Shot>,
}

/// Which coordinate space a burst is anchored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// `position: fixed` particles.
    Viewport,
    /// Absolutely positioned particles; scroll offset included.
    Page,
}

/// Remembers the last scroll sample and reports large jumps.
pub struct ScrollWatcher {
    last_y: Cell<f64>,
    threshold: f64,
}

impl ScrollWatcher {
    pub fn new(initial_y: f64, threshold: f64) -> Self {
        Self { last_y: Cell::new(initial_y), threshold }
    }

    /// True when `y` moved more than the threshold since the previous sample.
    pub fn observe(&self, y: f64) -> bool {
        let delta = (y - self.last_y.replace(y)).abs();
        delta > self.threshold
    }
}

pub struct ParticleFactory<S: Stage> {
    fx: Rc<Fx<S>>,
}

impl<S: Stage> Clone for ParticleFactory<S> {
    fn clone(&self) -> Self {
        Self { fx: Rc::clone(&self.fx) }
    }
}

fn px(v: f64) -> String {
    format!("{v}px")
}

impl<S: Stage> ParticleFactory<S> {
    pub fn new(fx: Rc<Fx<S>>) -> Self {
        Self { fx }
    }

    // --- Ambient field -----------------------------------------------------

    /// Pre-populate the backdrop. Seed pixels loop forever in CSS and belong
    /// to the page, so they get no removal timer.
    pub fn seed_ambient(&self) -> FxResult<usize> {
        let stage = &self.fx.stage;
        for _ in 0..self.fx.config.ambient_seed_count {
            let node = stage.create("span", ParticleKind::Ambient.class())?;
            set_styles(
                stage.as_ref(),
                &node,
                &[
                    ("left", format!("{}vw", self.fx.random() * 100.0).as_str()),
                    ("top", format!("{}vh", self.fx.random() * 100.0).as_str()),
                    ("animation-duration", format!("{}s", self.fx.between(6.0, 12.0)).as_str()),
                    ("animation-delay", format!("{}s", -self.fx.random() * 6.0).as_str()),
                ],
            )?;
            stage.append_to_body(&node)?;
        }
        Ok(self.fx.config.ambient_seed_count)
    }

    /// One pixel rising from the bottom edge, removed after the ambient TTL.
    pub fn spawn_ambient(&self) -> FxResult<Particle> {
        let stage = &self.fx.stage;
        let view = stage.viewport();
        let x = self.fx.random();
        let node = stage.create("span", ParticleKind::Ambient.class())?;
        set_styles(
            stage.as_ref(),
            &node,
            &[
                ("left", format!("{}vw", x * 100.0).as_str()),
                ("top", "100vh"),
                ("animation-duration", format!("{}s", self.fx.between(8.0, 12.0)).as_str()),
            ],
        )?;
        stage.append_to_body(&node)?;
        let ttl_ms = self.fx.config.ambient_ttl_ms;
        schedule_removal(stage, self.fx.clock.as_ref(), node, ttl_ms);
        Ok(Particle {
            kind: ParticleKind::Ambient,
            origin: Point::new(x * view.width, view.height),
            spawned_at: self.fx.clock.now(),
            ttl_ms,
            shot: None,
        })
    }

    /// Keep the field alive with one new pixel per interval.
    pub fn start_ambient_stream(&self) {
        let factory = self.clone();
        self.fx.clock.set_interval(
            self.fx.config.ambient_interval_ms,
            Box::new(move || {
                if let Err(err) = factory.spawn_ambient() {
                    log::error!("ambient pixel not created: {err}");
                }
            }),
        );
    }

    /// Short-lived sparkles scattered over the viewport.
    pub fn spawn_scroll_burst(&self, count: usize) -> Vec<Particle> {
        let stage = &self.fx.stage;
        let view = stage.viewport();
        let ttl_ms = self.fx.config.scroll_sparkle_ttl_ms;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let (x, y) = (self.fx.random(), self.fx.random());
            let made = stage.create("span", ParticleKind::ScrollSparkle.class()).and_then(|node| {
                stage.set_style(&node, "left", &format!("{}vw", x * 100.0))?;
                stage.set_style(&node, "top", &format!("{}vh", y * 100.0))?;
                stage.append_to_body(&node)?;
                Ok(node)
            });
            match made {
                Ok(node) => {
                    schedule_removal(stage, self.fx.clock.as_ref(), node, ttl_ms);
                    out.push(Particle {
                        kind: ParticleKind::ScrollSparkle,
                        origin: Point::new(x * view.width, y * view.height),
                        spawned_at: self.fx.clock.now(),
                        ttl_ms,
                        shot: None,
                    });
                }
                Err(err) => log::error!("scroll sparkle not created: {err}"),
            }
        }
        out
    }

    /// Feed one scroll sample; a large enough jump scatters a burst.
    pub fn scroll_sample(&self, watcher: &ScrollWatcher, y: f64) -> Vec<Particle> {
        if watcher.observe(y) {
            self.spawn_scroll_burst(self.fx.config.scroll_burst_count)
        } else {
            Vec::new()
        }
    }

    // --- Radial bursts -----------------------------------------------------

    /// Centre of `node` in the requested space; viewport centre when the
    /// element cannot be measured.
    pub fn origin_of(&self, node: &S::Node, anchor: Anchor) -> Point {
        let stage = &self.fx.stage;
        let center = match stage.rect(node) {
            Ok(rect) => rect.center(),
            Err(err) => {
                log::debug!("burst origin falls back to viewport centre: {err}");
                stage.viewport().center()
            }
        };
        match anchor {
            Anchor::Viewport => center,
            Anchor::Page => {
                let scroll = stage.scroll_offset();
                Point::new(center.x + scroll.x, center.y + scroll.y)
            }
        }
    }

    /// Spawn `count` particles of `kind` around `origin`, asking `shot_for`
    /// for each member's parameters.
    pub fn spawn_radial_burst(
        &self,
        origin: Point,
        count: usize,
        kind: ParticleKind,
        mut shot_for: impl FnMut(usize, &Fx<S>) -> Shot,
    ) -> Vec<Particle> {
        let now = self.fx.clock.now();
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let shot = shot_for(i, self.fx.as_ref());
            let delay = shot.stagger.script_delay_ms();
            let lifetime = match shot.motion {
                Motion::Fixed { ttl_ms, .. } => ttl_ms,
                Motion::Flight(f) => delay + f.duration_ms.ceil() as u32,
            };
            out.push(Particle {
                kind,
                origin,
                spawned_at: now + f64::from(delay),
                ttl_ms: lifetime,
                shot: Some(shot),
            });
            if let Stagger::Spawn(ms) = shot.stagger {
                let factory = self.clone();
                self.fx.clock.set_timeout(
                    ms,
                    Box::new(move || {
                        if let Err(err) = factory.launch(kind, origin, shot, i) {
                            log::error!("{kind:?} particle not created: {err}");
                        }
                    }),
                );
            } else if let Err(err) = self.launch(kind, origin, shot, i) {
                log::error!("{kind:?} particle not created: {err}");
            }
        }
        out
    }

    fn launch(&self, kind: ParticleKind, origin: Point, shot: Shot, index: usize) -> FxResult<()> {
        let stage = &self.fx.stage;
        let node = stage.create(kind.tag(), kind.class())?;
        match shot.motion {
            Motion::Fixed { ttl_ms, angle_var } => {
                let at = origin.polar(shot.angle, shot.distance);
                stage.set_style(&node, "left", &px(at.x))?;
                stage.set_style(&node, "top", &px(at.y))?;
                if angle_var {
                    stage.set_style(&node, "--angle", &format!("{}rad", shot.angle))?;
                }
                if let Stagger::Css(secs) = shot.stagger {
                    stage.set_style(&node, "animation-delay", &format!("{secs}s"))?;
                }
                stage.append_to_body(&node)?;
                schedule_removal(stage, self.fx.clock.as_ref(), node, ttl_ms);
            }
            Motion::Flight(flight) => {
                if let Some(glyph) = shot.glyph {
                    stage.set_text(&node, glyph);
                }
                let font = shot.font_px.map(px).unwrap_or_else(|| "30px".to_string());
                set_styles(
                    stage.as_ref(),
                    &node,
                    &[
                        ("position", "fixed"),
                        ("left", px(origin.x).as_str()),
                        ("top", px(origin.y).as_str()),
                        ("font-size", font.as_str()),
                        ("z-index", "999999"),
                        ("pointer-events", "none"),
                        ("transform", "translate(-50%, -50%)"),
                        ("text-shadow", kind.glow()),
                        ("user-select", "none"),
                    ],
                )?;
                stage.append_to_body(&node)?;
                match shot.stagger {
                    Stagger::Start(ms) => {
                        let factory = self.clone();
                        self.fx.clock.set_timeout(
                            ms,
                            Box::new(move || factory.fly(kind, node, origin, shot, flight, index)),
                        );
                    }
                    _ => self.fly(kind, node, origin, shot, flight, index),
                }
            }
        }
        Ok(())
    }

    fn fly(
        &self,
        kind: ParticleKind,
        node: S::Node,
        origin: Point,
        shot: Shot,
        flight: Flight,
        index: usize,
    ) {
        let stage = Rc::clone(&self.fx.stage);
        let frame_node = node.clone();
        let update = move |p: f64| -> FxResult<bool> {
            if !stage.is_attached(&frame_node) {
                return Ok(false);
            }
            let style = flight.at(origin, shot.angle, shot.distance, p);
            stage.set_style(&frame_node, "left", &px(style.at.x))?;
            stage.set_style(&frame_node, "top", &px(style.at.y))?;
            stage.set_style(&frame_node, "transform", &flight.transform(&style))?;
            stage.set_style(&frame_node, "opacity", &style.opacity.to_string())?;
            Ok(true)
        };
        let stage = Rc::clone(&self.fx.stage);
        let finish = move |end: FrameEnd| {
            if let FrameEnd::Failed(err) = end {
                log::error!("{kind:?} particle #{index} animation aborted: {err}");
            }
            if stage.is_attached(&node) {
                stage.detach(&node);
            }
        };
        animate_frames(Rc::clone(&self.fx.clock), flight.duration_ms, update, finish);
    }

    // --- Named effects -----------------------------------------------------

    /// Eight sparkles on a ring 30–50px around the origin.
    pub fn sparkles(&self, origin: Point) -> Vec<Particle> {
        self.spawn_radial_burst(origin, 8, ParticleKind::Sparkle, |i, fx| {
            Shot::fixed(TAU * i as f64 / 8.0, fx.between(30.0, 50.0), 1000)
        })
    }

    /// Eight symbols floating up and out, created 100ms apart.
    pub fn floating_symbols(&self, origin: Point) -> Vec<Particle> {
        let flight = Flight {
            duration_ms: 2000.0,
            easing: Easing::Linear,
            lift_px: 50.0,
            spread_y: 0.3,
            grow: 0.5,
            spin_deg: 0.0,
            fade: Fade::Linear,
        };
        self.spawn_radial_burst(origin, 8, ParticleKind::FloatingSymbol, |i, _| Shot {
            angle: TAU * i as f64 / 8.0,
            distance: 100.0,
            stagger: Stagger::Spawn(100 * i as u32),
            glyph: Some(FLOATING_SYMBOLS[i % FLOATING_SYMBOLS.len()]),
            font_px: Some(30.0),
            motion: Motion::Flight(flight),
        })
    }

    /// Ten damage particles on a ring plus six jittered impact flecks.
    pub fn damage(&self, origin: Point) -> Vec<Particle> {
        let mut out = self.spawn_radial_burst(origin, 10, ParticleKind::Damage, |i, _| Shot {
            stagger: Stagger::Css(0.03 * i as f64),
            motion: Motion::Fixed { ttl_ms: 800, angle_var: true },
            ..Shot::fixed(TAU * i as f64 / 10.0, 0.0, 800)
        });
        out.extend(self.spawn_radial_burst(origin, 6, ParticleKind::Impact, |i, fx| {
            let (dx, dy) = (fx.between(-10.0, 10.0), fx.between(-10.0, 10.0));
            Shot {
                stagger: Stagger::Css(0.02 * i as f64),
                ..Shot::fixed(dy.atan2(dx), dx.hypot(dy), 500)
            }
        }));
        out
    }

    /// Twelve chaotic debris glyphs and a one-shot page shake.
    pub fn explosion(&self, origin: Point) -> Vec<Particle> {
        let out = self.spawn_radial_burst(origin, 12, ParticleKind::Explosion, |i, fx| Shot {
            angle: fx.random() * TAU,
            distance: fx.between(40.0, 100.0),
            stagger: Stagger::Start(30 * i as u32),
            glyph: Some(*fx.pick(&EXPLOSION_GLYPHS)),
            font_px: Some(fx.between(20.0, 35.0)),
            motion: Motion::Flight(Flight {
                duration_ms: fx.between(800.0, 1200.0),
                easing: Easing::CubicOut,
                lift_px: 30.0,
                spread_y: 1.0,
                grow: 0.8,
                spin_deg: if fx.coin() { 360.0 } else { -360.0 },
                fade: Fade::Quadratic,
            }),
        });
        self.screen_shake();
        out
    }

    /// Run the `explosionShake` keyframes on the body once.
    pub fn screen_shake(&self) {
        let stage = &self.fx.stage;
        let Ok(body) = stage.body() else {
            return;
        };
        let ms = self.fx.config.shake_ms;
        let anim = format!("explosionShake {}s ease-out", f64::from(ms) / 1000.0);
        if let Err(err) = stage.set_style(&body, "animation", &anim) {
            log::debug!("screen shake skipped: {err}");
            return;
        }
        let stage = Rc::clone(stage);
        self.fx.clock.set_timeout(
            ms,
            Box::new(move || {
                if let Err(err) = stage.set_style(&body, "animation", "") {
                    log::debug!("screen shake not reset: {err}");
                }
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FxConfig;
    use crate::sim::{ManualClock, SimStage};
    use crate::stage::Rect;

    fn factory() -> (Rc<SimStage>, Rc<ManualClock>, ParticleFactory<SimStage>) {
        let stage = Rc::new(SimStage::default());
        let clock = Rc::new(ManualClock::new());
        let cfg = FxConfig { rng_seed: Some(7), ..FxConfig::default() };
        let fx = Fx::new(stage.clone(), clock.clone(), cfg);
        (stage, clock, ParticleFactory::new(fx))
    }

    #[test]
    fn scroll_watcher_needs_more_than_threshold() {
        let w = ScrollWatcher::new(0.0, 50.0);
        assert!(!w.observe(50.0));
        assert!(!w.observe(0.0));
        assert!(w.observe(51.0));
        assert!(w.observe(0.0));
    }

    #[test]
    fn explosion_flight_eases_out_and_fades() {
        let f = Flight {
            duration_ms: 1000.0,
            easing: Easing::CubicOut,
            lift_px: 30.0,
            spread_y: 1.0,
            grow: 0.8,
            spin_deg: -360.0,
            fade: Fade::Quadratic,
        };
        let o = Point::new(100.0, 100.0);
        let start = f.at(o, 0.0, 80.0, 0.0);
        assert_eq!(start.at, o);
        assert_eq!(start.opacity, 1.0);
        let end = f.at(o, 0.0, 80.0, 1.0);
        assert!((end.at.x - 180.0).abs() < 1e-9);
        assert!((end.at.y - 70.0).abs() < 1e-9);
        assert!((end.scale - 1.8).abs() < 1e-9);
        assert_eq!(end.rotate_deg, -360.0);
        assert_eq!(end.opacity, 0.0);
        let half = f.at(o, 0.0, 80.0, 0.5);
        assert!((half.at.x - 170.0).abs() < 1e-9);
        assert!((half.opacity - 0.75).abs() < 1e-9);
    }

    #[test]
    fn sparkles_ring_the_origin_and_expire() {
        let (stage, clock, f) = factory();
        let origin = Point::new(200.0, 200.0);
        let made = f.sparkles(origin);
        assert_eq!(made.len(), 8);
        for p in &made {
            let shot = p.shot.unwrap();
            assert!((30.0..50.0).contains(&shot.distance));
        }
        assert_eq!(stage.attached_with_class("sparkle"), 8);
        clock.advance(999.0);
        assert_eq!(stage.attached_with_class("sparkle"), 8);
        clock.advance(1.0);
        assert_eq!(stage.attached_with_class("sparkle"), 0);
    }

    #[test]
    fn damage_particles_carry_angle_and_delay() {
        let (stage, clock, f) = factory();
        f.damage(Point::new(10.0, 10.0));
        let damage = stage.nodes_with_class("damage-particle");
        assert_eq!(damage.len(), 10);
        let third = stage.node(damage[3]);
        assert_eq!(third.styles.get("left").map(String::as_str), Some("10px"));
        assert!(third.styles.get("--angle").unwrap().ends_with("rad"));
        assert_eq!(stage.nodes_with_class("impact-particle").len(), 6);
        clock.advance(500.0);
        assert_eq!(stage.attached_with_class("impact-particle"), 0);
        assert_eq!(stage.attached_with_class("damage-particle"), 10);
        clock.advance(300.0);
        assert_eq!(stage.attached_with_class("damage-particle"), 0);
    }

    #[test]
    fn floating_symbols_are_created_with_stagger() {
        let (stage, clock, f) = factory();
        let made = f.floating_symbols(Point::new(50.0, 50.0));
        assert_eq!(made.len(), 8);
        assert_eq!(made[7].shot.unwrap().glyph, Some("⚡"));
        assert_eq!(stage.attached_created(), 0);
        clock.advance(350.0);
        assert_eq!(stage.attached_created(), 4);
        clock.advance(2700.0);
        assert_eq!(stage.attached_created(), 0);
    }

    #[test]
    fn poisoned_explosion_particle_leaves_siblings_running() {
        let (stage, clock, f) = factory();
        stage.poison("explosion-particle", 3);
        f.explosion(Point::new(300.0, 300.0));
        assert_eq!(stage.attached_with_class("explosion-particle"), 12);
        // Particle #3 starts at 90ms and fails on its first frame.
        clock.advance(120.0);
        assert_eq!(stage.attached_with_class("explosion-particle"), 11);
        let poisoned = stage.nodes_with_class("explosion-particle")[3];
        assert!(!stage.node(poisoned).attached);
        clock.advance(400.0);
        assert_eq!(stage.attached_with_class("explosion-particle"), 11);
        clock.advance(30.0 * 11.0 + 1200.0);
        assert_eq!(stage.attached_with_class("explosion-particle"), 0);
    }

    #[test]
    fn screen_shake_resets_after_its_duration() {
        let (stage, clock, f) = factory();
        f.screen_shake();
        let body = stage.body().unwrap();
        assert_eq!(
            stage.node(body).styles.get("animation").map(String::as_str),
            Some("explosionShake 0.5s ease-out")
        );
        clock.advance(500.0);
        assert_eq!(stage.node(body).styles.get("animation").map(String::as_str), Some(""));
    }

    #[test]
    fn screen_shake_on_a_locked_body_is_skipped() {
        let (stage, clock, f) = factory();
        let body = stage.body().unwrap();
        stage.poison_node(body);
        f.screen_shake();
        assert_eq!(stage.node(body).styles.get("animation"), None);
        assert_eq!(clock.pending_timers(), 0);
    }

    #[test]
    fn failed_shake_reset_leaves_the_page_running() {
        let (stage, clock, f) = factory();
        f.screen_shake();
        let body = stage.body().unwrap();
        stage.poison_node(body);
        clock.advance(500.0);
        assert_eq!(
            stage.node(body).styles.get("animation").map(String::as_str),
            Some("explosionShake 0.5s ease-out")
        );
        assert_eq!(clock.pending_timers(), 0);
    }

    #[test]
    fn unmeasurable_origin_uses_viewport_centre() {
        let (stage, _clock, f) = factory();
        let mascot = stage.insert_element("creeper", None, None);
        assert_eq!(f.origin_of(&mascot, Anchor::Viewport), Point::new(640.0, 360.0));
        stage.set_rect(mascot, Some(Rect { left: 10.0, top: 20.0, width: 100.0, height: 60.0 }));
        stage.set_scroll(Point::new(0.0, 500.0));
        assert_eq!(f.origin_of(&mascot, Anchor::Page), Point::new(60.0, 550.0));
    }

    #[test]
    fn rising_pixels_live_for_the_ambient_ttl() {
        let (stage, clock, f) = factory();
        f.start_ambient_stream();
        clock.advance(2000.0);
        assert_eq!(stage.attached_with_class("pixel"), 1);
        clock.advance(11_999.0);
        assert_eq!(stage.attached_with_class("pixel"), 6);
        clock.advance(1.0);
        assert_eq!(stage.attached_with_class("pixel"), 6);
        assert_eq!(stage.created_with_class("pixel"), 7);
    }
}
