//! Named value animations
//!
//! An [`Animator`] owns a set of animations keyed by name. Each one eases a
//! scalar from `from` to `to` over `duration_ms`, and is sampled on demand
//! with [`Animator::get`], typically once per frame.
//!
//! Completion is observed lazily: an animation only becomes
//! [`AnimationState::Finished`] when `get` samples it at or past its end.
//! [`Animator::finished`] reports the recorded states and never consults the
//! clock, so an animation nobody has polled since it ran out still counts as
//! running.

use rustc_hash::FxHashMap;

use crate::clock::{Clock, SystemClock};
use crate::easing::Easing;

/// Lifecycle of a single animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    Running,
    Finished,
}

/// A single eased transition
#[derive(Clone, Debug)]
pub struct Animation {
    from: f32,
    to: f32,
    duration_ms: f32,
    start_ms: f64,
    easing: Easing,
    state: AnimationState,
}

impl Animation {
    fn new(from: f32, to: f32, duration_ms: f32, start_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            start_ms,
            easing,
            state: AnimationState::Running,
        }
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn to(&self) -> f32 {
        self.to
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == AnimationState::Finished
    }

    /// Value at time `now_ms`. Reaching the end marks the animation finished
    /// and yields `to` exactly.
    fn sample(&mut self, now_ms: f64) -> f32 {
        let elapsed = now_ms - self.start_ms;

        if self.duration_ms <= 0.0 || elapsed >= self.duration_ms as f64 {
            self.state = AnimationState::Finished;
            return self.to;
        }

        let t = (elapsed / self.duration_ms as f64).max(0.0) as f32;
        self.from + self.easing.apply(t) * (self.to - self.from)
    }
}

/// Registry of named animations sampled against a clock
pub struct Animator<C: Clock = SystemClock> {
    animations: FxHashMap<String, Animation>,
    clock: C,
}

impl Animator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for Animator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Animator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            animations: FxHashMap::default(),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start (or restart) `name` easing from `from` to `to` over `duration_ms`.
    ///
    /// Any previous animation under the same name is discarded.
    pub fn start(&mut self, name: impl Into<String>, from: f32, to: f32, duration_ms: f32) {
        self.start_with_easing(name, from, to, duration_ms, Easing::default());
    }

    pub fn start_with_easing(
        &mut self,
        name: impl Into<String>,
        from: f32,
        to: f32,
        duration_ms: f32,
        easing: Easing,
    ) {
        let name = name.into();
        let now = self.clock.now_ms();
        tracing::trace!(
            "animation '{}' start: {} -> {} over {}ms ({})",
            name,
            from,
            to,
            duration_ms,
            easing.name()
        );
        self.animations
            .insert(name, Animation::new(from, to, duration_ms, now, easing));
    }

    /// Pin `name` to `value` with a zero-length animation
    pub fn set(&mut self, name: impl Into<String>, value: f32) {
        self.start(name, value, value, 0.0);
    }

    /// Current value of `name`, or `0.0` if nothing is registered under it
    pub fn get(&mut self, name: &str) -> f32 {
        let now = self.clock.now_ms();
        match self.animations.get_mut(name) {
            Some(animation) => {
                let was_running = animation.state == AnimationState::Running;
                let value = animation.sample(now);
                if was_running && animation.is_finished() {
                    tracing::trace!("animation '{}' finished at {}", name, value);
                }
                value
            }
            None => 0.0,
        }
    }

    /// Whether every registered animation has been observed finished.
    ///
    /// True for an empty animator.
    pub fn finished(&self) -> bool {
        self.animations.values().all(Animation::is_finished)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.animations
            .get(name)
            .is_some_and(|a| a.state == AnimationState::Running)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Animation> {
        self.animations.remove(name)
    }

    pub fn clear(&mut self) {
        self.animations.clear();
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
