pub mod http;
pub mod page;
pub mod poller;
pub mod terminal;

pub use http::HttpFetcher;
pub use page::{Page, PageSnapshot};
pub use poller::{CycleReport, Poller, PollerConfig, PollerStats};
pub use terminal::TerminalView;
