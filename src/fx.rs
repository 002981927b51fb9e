//! Shared context handed to every effect: the page, the clock, tunables and
//! a single random source.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::FxConfig;
use crate::scheduler::Scheduler;
use crate::stage::Stage;

pub struct Fx<S: Stage> {
    pub stage: Rc<S>,
    pub clock: Rc<dyn Scheduler>,
    pub config: FxConfig,
    rng: RefCell<fastrand::Rng>,
}

impl<S: Stage> Fx<S> {
    pub fn new(stage: Rc<S>, clock: Rc<dyn Scheduler>, config: FxConfig) -> Rc<Self> {
        let rng = RefCell::new(config.rng());
        Rc::new(Self { stage, clock, config, rng })
    }

    /// Uniform in `[0, 1)`.
    pub fn random(&self) -> f64 {
        self.rng.borrow_mut().f64()
    }

    /// Uniform in `[lo, hi)`.
    pub fn between(&self, lo: f64, hi: f64) -> f64 {
        lo + self.random() * (hi - lo)
    }

    pub fn pick<'a, T>(&self, items: &'a [T]) -> &'a T {
        &items[self.rng.borrow_mut().usize(..items.len())]
    }

    pub fn coin(&self) -> bool {
        self.rng.borrow_mut().bool()
    }
}
