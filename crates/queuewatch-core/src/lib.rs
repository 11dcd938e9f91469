pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod render;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::WatchConfig;
pub use error::{Result, WatchError};
pub use fetch::Fetcher;
pub use model::{Job, Stats};
pub use render::Renderer;
pub use view::{DisplayZone, JobRow, StatsView};
