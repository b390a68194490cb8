// core/src/counters.rs
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

/// Prometheus-tellere for én pipeline (eget register, ingen global tilstand).
#[derive(Clone)]
pub struct PipelineCounters {
    registry: Registry,
    pub records_ingested: IntCounter,
    pub records_skipped: IntCounter,
    pub samples_paused: IntCounter,
    pub elevation_requests: IntCounter,
    pub elevation_failures: IntCounter,
    pub elevation_cache_hits: IntCounter,
    pub elevation_cache_misses: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let c = IntCounter::new(name, help)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

impl PipelineCounters {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("cycledata".into()), None)?;
        Ok(Self {
            records_ingested: counter(&registry, "records_ingested_total", "Raw records read")?,
            records_skipped: counter(&registry, "records_skipped_total", "Raw records without time or distance")?,
            samples_paused: counter(&registry, "samples_paused_total", "Samples removed by the pause filter")?,
            elevation_requests: counter(&registry, "elevation_requests_total", "Batches sent to the elevation service")?,
            elevation_failures: counter(&registry, "elevation_failures_total", "Altitude corrections that fell back to recorded altitude")?,
            elevation_cache_hits: counter(&registry, "elevation_cache_hits_total", "Elevation lookups served from cache")?,
            elevation_cache_misses: counter(&registry, "elevation_cache_misses_total", "Elevation lookups sent upstream")?,
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prometheus tekstformat.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        if TextEncoder::new().encode(&self.registry.gather(), &mut buf).is_err() {
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_render_with_prefix() {
        let c = PipelineCounters::new().unwrap();
        c.records_ingested.inc_by(3);
        let text = c.render();
        assert!(text.contains("cycledata_records_ingested_total 3"), "{text}");
    }
}
