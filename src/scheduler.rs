//! Timer / frame scheduling.
//!
//! A thin trait over `setTimeout`, `setInterval` and `requestAnimationFrame`
//! plus the two helpers every effect is built from: delayed removal and a
//! per-frame progress loop. There is no cancellation; each handle runs to
//! completion independently of any later burst.

use std::rc::Rc;

use crate::error::FxError;
use crate::stage::Stage;

pub type Task = Box<dyn FnOnce()>;
pub type FrameTask = Box<dyn FnOnce(f64)>;

pub trait Scheduler {
    /// Monotonic milliseconds (`performance.now()` in the browser).
    fn now(&self) -> f64;
    fn set_timeout(&self, delay_ms: u32, task: Task);
    fn set_interval(&self, period_ms: u32, task: Box<dyn FnMut()>);
    /// Run `task` at the next display refresh with the frame timestamp.
    fn request_frame(&self, task: FrameTask);
}

/// Detach `node` after `delay_ms`. Already-removed nodes are left alone.
pub fn schedule_removal<S: Stage>(
    stage: &Rc<S>,
    clock: &dyn Scheduler,
    node: S::Node,
    delay_ms: u32,
) {
    let stage = Rc::clone(stage);
    clock.set_timeout(
        delay_ms,
        Box::new(move || {
            if stage.is_attached(&node) {
                stage.detach(&node);
            }
        }),
    );
}

/// Time-shaping curves for particle motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    CubicOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// How a frame loop ended. The caller owns cleanup in every case.
#[derive(Debug, PartialEq)]
pub enum FrameEnd {
    Completed,
    Stopped,
    Failed(FxError),
}

pub type FrameUpdate = Box<dyn FnMut(f64) -> Result<bool, FxError>>;

struct FrameLoop {
    start: f64,
    duration_ms: f64,
    update: FrameUpdate,
    finish: Box<dyn FnOnce(FrameEnd)>,
}

/// Drive `update` once per refresh with the elapsed fraction of
/// `duration_ms`, clamped to `[0, 1]`.
///
/// The loop ends when `update` returns `Ok(false)`, when the fraction reaches
/// 1, or when `update` fails; an error only ends this loop.
pub fn animate_frames(
    clock: Rc<dyn Scheduler>,
    duration_ms: f64,
    update: impl FnMut(f64) -> Result<bool, FxError> + 'static,
    finish: impl FnOnce(FrameEnd) + 'static,
) {
    let run = FrameLoop {
        start: clock.now(),
        duration_ms,
        update: Box::new(update),
        finish: Box::new(finish),
    };
    pump(clock, run);
}

fn pump(clock: Rc<dyn Scheduler>, mut run: FrameLoop) {
    let next = Rc::clone(&clock);
    clock.request_frame(Box::new(move |ts: f64| {
        let fraction = if run.duration_ms <= 0.0 {
            1.0
        } else {
            ((ts - run.start) / run.duration_ms).clamp(0.0, 1.0)
        };
        match (run.update)(fraction) {
            Ok(true) if fraction < 1.0 => pump(next, run),
            Ok(true) => (run.finish)(FrameEnd::Completed),
            Ok(false) => (run.finish)(FrameEnd::Stopped),
            Err(err) => (run.finish)(FrameEnd::Failed(err)),
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ManualClock;
    use std::cell::RefCell;

    #[test]
    fn cubic_out_is_front_loaded() {
        assert_eq!(Easing::CubicOut.apply(0.0), 0.0);
        assert_eq!(Easing::CubicOut.apply(1.0), 1.0);
        assert!((Easing::CubicOut.apply(0.5) - 0.875).abs() < 1e-12);
        assert_eq!(Easing::Linear.apply(1.7), 1.0);
    }

    #[test]
    fn fractions_are_monotonic_and_end_at_one() {
        let clock = Rc::new(ManualClock::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let ended = Rc::new(RefCell::new(None));
        {
            let seen = Rc::clone(&seen);
            let ended = Rc::clone(&ended);
            animate_frames(
                clock.clone(),
                100.0,
                move |p| {
                    seen.borrow_mut().push(p);
                    Ok(true)
                },
                move |end| *ended.borrow_mut() = Some(end),
            );
        }
        clock.advance(200.0);
        let seen = seen.borrow();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
        assert!(seen.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(*ended.borrow(), Some(FrameEnd::Completed));
    }

    #[test]
    fn update_returning_false_stops_early() {
        let clock = Rc::new(ManualClock::new());
        let calls = Rc::new(RefCell::new(0));
        let ended = Rc::new(RefCell::new(None));
        {
            let calls = Rc::clone(&calls);
            let ended = Rc::clone(&ended);
            animate_frames(
                clock.clone(),
                1000.0,
                move |_| {
                    *calls.borrow_mut() += 1;
                    Ok(*calls.borrow() < 3)
                },
                move |end| *ended.borrow_mut() = Some(end),
            );
        }
        clock.advance(1000.0);
        assert_eq!(*calls.borrow(), 3);
        assert_eq!(*ended.borrow(), Some(FrameEnd::Stopped));
    }

    #[test]
    fn failing_update_ends_only_its_own_loop() {
        let clock = Rc::new(ManualClock::new());
        let ends = Rc::new(RefCell::new(Vec::new()));
        for fail in [true, false] {
            let ends = Rc::clone(&ends);
            animate_frames(
                clock.clone(),
                50.0,
                move |p| if fail && p > 0.0 { Err(FxError::Js("boom".into())) } else { Ok(true) },
                move |end| ends.borrow_mut().push(end),
            );
        }
        clock.advance(100.0);
        let ends = ends.borrow();
        assert_eq!(ends.len(), 2);
        assert!(ends.contains(&FrameEnd::Failed(FxError::Js("boom".into()))));
        assert!(ends.contains(&FrameEnd::Completed));
    }
}
