//! Motion system: eased value interpolation and staggered scheduling
//!
//! # Layers
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing functions (linear, quartic ease-out)
//! - `timing` - Time calculation utilities (progress, interpolation)
//! - `tick` - Tick source abstraction driven by host timestamps
//! - `stagger` - Per-element delay offsets
//!
//! ## L3 Molecular Layer
//! - `interpolator` - Counter jobs combining the atoms
//!
//! # Usage
//!
//! ```ignore
//! use std::time::Duration;
//! use healthbridge_core::format::Notation;
//! use healthbridge_core::motion::{EasingKind, InterpolationJob, Interpolator, TickSource};
//!
//! let mut interpolator = Interpolator::new(Duration::from_millis(16));
//! let job = InterpolationJob::new(0.0, 15_000.0, Duration::from_millis(2000))
//!     .with_easing(EasingKind::EaseOutQuartic)
//!     .with_formatter(Notation::Grouped);
//! let effects = interpolator.start("stat".into(), job, &mut tokens);
//!
//! // On every host tick
//! let mut out = Vec::new();
//! let more = interpolator.on_tick(now, &mut out);
//! ```

// L4 Atomic Layer
pub mod easing;
pub mod stagger;
pub mod tick;
pub mod timing;

// L3 Molecular Layer
pub mod interpolator;

pub use easing::EasingKind;
pub use interpolator::{InterpolationJob, Interpolator, JobState};
pub use stagger::{stagger_delay, stagger_offsets, StaggerPolicy};
pub use tick::{run_until_idle, TickSource};
