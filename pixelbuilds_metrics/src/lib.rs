pub mod aggregator;
pub mod exporters;
pub mod registry;

pub use aggregator::{AggregateSummary, Aggregator, DeviceReleases};
pub use exporters::{render_text, scrape_router, serve_scrape};
pub use registry::{DownloadGauges, LabelTuple, Rollup, DEFAULT_NAMESPACE};
