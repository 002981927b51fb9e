// Particle lifecycle and preference invariants, checked natively against the
// headless stage.

use std::rc::Rc;

use creeper_fx::fx::Fx;
use creeper_fx::mascot::{MASCOT_ID, Mascot};
use creeper_fx::particles::{ParticleFactory, ScrollWatcher};
use creeper_fx::sim::{ManualClock, MemoryPrefs, SimStage};
use creeper_fx::stage::{Rect, Stage};
use creeper_fx::theme::{PreferenceStore, THEME_ATTR, THEME_KEY, TOGGLE_CLASS, Theme, ThemeSwitch};
use creeper_fx::FxConfig;

fn setup(seed: u64) -> (Rc<SimStage>, Rc<ManualClock>, Rc<Fx<SimStage>>) {
    let stage = Rc::new(SimStage::default());
    let clock = Rc::new(ManualClock::new());
    let cfg = FxConfig { rng_seed: Some(seed), ..FxConfig::default() };
    let fx = Fx::new(stage.clone(), clock.clone(), cfg);
    (stage, clock, fx)
}

#[test]
fn every_transient_particle_is_removed_exactly_once() {
    for seed in [1, 2, 3] {
        let (stage, clock, fx) = setup(seed);
        let rect = Rect { left: 0.0, top: 0.0, width: 50.0, height: 50.0 };
        let el = stage.insert_element(MASCOT_ID, None, Some(rect));
        let mascot = Mascot::attach(fx.clone(), el).unwrap();
        let particles = ParticleFactory::new(fx.clone());
        let watcher = ScrollWatcher::new(0.0, fx.config.scroll_threshold_px);

        for (i, theme) in ["light", "dark", "light", "auto"].iter().enumerate() {
            stage.set_root_attr(THEME_ATTR, theme).unwrap();
            mascot.on_click();
            particles.scroll_sample(&watcher, 200.0 * (i + 1) as f64);
            particles.spawn_ambient().unwrap();
            clock.advance(37.0 * i as f64);
        }
        // A poisoned flight must still be cleaned up.
        stage.poison("explosion-particle", stage.created_with_class("explosion-particle") + 5);
        stage.set_root_attr(THEME_ATTR, "dark").unwrap();
        mascot.on_click();

        clock.advance(20_000.0);
        // Only the speech bubble stays.
        assert_eq!(stage.attached_created(), 1, "seed {seed}");
        assert_eq!(stage.detach_calls(), stage.created_count() - 1, "seed {seed}");
        assert_eq!(clock.pending_timers(), 0);
        assert_eq!(clock.pending_frames(), 0);
    }
}

#[test]
fn removing_an_already_removed_particle_is_a_no_op() {
    let (stage, clock, fx) = setup(9);
    let particles = ParticleFactory::new(fx);
    particles.spawn_scroll_burst(3);
    for node in stage.nodes_with_class("scroll-sparkle") {
        stage.detach(&node);
    }
    let before = stage.detach_calls();
    clock.advance(1000.0);
    assert_eq!(stage.detach_calls(), before);
    assert_eq!(stage.attached_with_class("scroll-sparkle"), 0);
}

#[test]
fn small_scroll_steps_spawn_nothing() {
    let (stage, _clock, fx) = setup(4);
    let particles = ParticleFactory::new(fx);
    let watcher = ScrollWatcher::new(100.0, 50.0);
    for y in [120.0, 170.0, 220.0, 200.0, 150.0] {
        assert!(particles.scroll_sample(&watcher, y).is_empty());
    }
    assert_eq!(stage.created_with_class("scroll-sparkle"), 0);
}

#[test]
fn large_scroll_jump_spawns_three_short_lived_sparkles() {
    let (stage, clock, fx) = setup(4);
    let particles = ParticleFactory::new(fx);
    let watcher = ScrollWatcher::new(0.0, 50.0);
    assert_eq!(particles.scroll_sample(&watcher, 51.0).len(), 3);
    assert_eq!(stage.attached_with_class("scroll-sparkle"), 3);
    clock.advance(1000.0);
    assert_eq!(stage.attached_with_class("scroll-sparkle"), 0);
}

#[test]
fn seeded_backdrop_stays_put() {
    let (stage, clock, fx) = setup(5);
    let particles = ParticleFactory::new(fx);
    assert_eq!(particles.seed_ambient().unwrap(), 30);
    let seeds = stage.nodes_with_class("pixel");
    assert_eq!(seeds.len(), 30);
    for id in &seeds {
        let node = stage.node(*id);
        let delay: f64 = node.styles["animation-delay"].trim_end_matches('s').parse().unwrap();
        let duration: f64 = node.styles["animation-duration"]
            .trim_end_matches('s')
            .parse()
            .unwrap();
        assert!((-6.0..=0.0).contains(&delay));
        assert!((6.0..12.0).contains(&duration));
    }
    clock.advance(60_000.0);
    assert_eq!(stage.attached_with_class("pixel"), 30);
}

#[test]
fn toggling_twice_restores_preference_and_pressed_state() {
    for saved in ["light", "dark"] {
        let stage = SimStage::default();
        let button = stage.insert_element("themeToggle", Some(TOGGLE_CLASS), None);
        let prefs = MemoryPrefs::default();
        prefs.set(THEME_KEY, saved).unwrap();

        let switch = ThemeSwitch::new(&stage, &prefs);
        switch.restore();
        let pressed = stage.attr(&button, "aria-pressed");

        let first = switch.toggle();
        assert_ne!(first.as_str(), saved);
        assert_eq!(switch.toggle(), Theme::parse(saved).unwrap());

        assert_eq!(prefs.get(THEME_KEY).unwrap().as_deref(), Some(saved));
        assert_eq!(stage.attr(&button, "aria-pressed"), pressed);
        assert_eq!(stage.root_attr(THEME_ATTR).as_deref(), Some(saved));
    }
}
