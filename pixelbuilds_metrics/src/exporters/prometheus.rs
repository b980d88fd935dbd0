use crate::registry::DownloadGauges;
use pixelbuilds_core::{ExporterError, Result};
use prometheus::{Encoder, TextEncoder};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Renders every registered collector in the text exposition format.
pub fn render_text(gauges: &DownloadGauges) -> Result<String> {
    let encoder = TextEncoder::new();
    let families = gauges.registry().gather();

    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;

    String::from_utf8(buffer).map_err(|e| ExporterError::Other(e.into()))
}
