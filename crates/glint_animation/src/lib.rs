//! Glint Animation System
//!
//! Time-based value transitions for frame loops.
//!
//! # Features
//!
//! - **Animator**: registry of named animations, each easing a scalar from one
//!   value to another over a duration
//! - **Easing**: polynomial easing curves (quartic ease-out by default)
//! - **Clocks**: wall-clock time by default, manually stepped clocks for
//!   deterministic playback
//!
//! # Example
//!
//! ```rust
//! use glint_animation::{Animator, ManualClock};
//!
//! let clock = ManualClock::new();
//! let mut animator = Animator::with_clock(clock.clone());
//!
//! animator.start("opacity", 0.0, 1.0, 200.0);
//! assert_eq!(animator.get("opacity"), 0.0);
//!
//! clock.advance(200.0);
//! assert_eq!(animator.get("opacity"), 1.0);
//! assert!(animator.finished());
//! ```

pub mod animator;
pub mod clock;
pub mod easing;

pub use animator::{Animation, AnimationState, Animator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use easing::Easing;
