pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod host;
pub mod motion;
pub mod navbar;
pub mod random;
pub mod rate_limit;
pub mod scan;
pub mod validate;
pub mod visibility;

pub use config::AppConfig;
pub use context::SchedulerContext;
pub use error::{Error, Result};
pub use host::{Effect, ElementId, HostEvent, MemoryPage, Page};
pub use random::{RandomSource, XorShift64};
