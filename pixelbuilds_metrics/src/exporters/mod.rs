pub mod http;
pub mod prometheus;

pub use self::http::{scrape_router, serve_scrape};
pub use self::prometheus::{render_text, TEXT_CONTENT_TYPE};
