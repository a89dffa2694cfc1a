use prometheus_client::metrics::{
    counter::Counter,
    family::Family,
    histogram::{Histogram, exponential_buckets},
};
use prometheus_client::registry::Registry;
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Status {
    Success,
    Error,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct MethodLabels {
    pub method: Method,
    pub status: Status,
}

type DurationFamily = Family<MethodLabels, Histogram, fn() -> Histogram>;

#[derive(Debug, Clone)]
pub struct Metrics {
    pub request_counter: Family<MethodLabels, Counter>,
    pub request_duration: DurationFamily,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            request_counter: Family::default(),
            request_duration: Family::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 14))
            }),
        }
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "http_requests",
            "Total number of HTTP requests handled",
            self.request_counter.clone(),
        );
        registry.register(
            "http_request_duration_seconds",
            "Histogram of HTTP request durations",
            self.request_duration.clone(),
        );
    }

    pub fn record(&self, method: Method, status: Status, elapsed_secs: f64) {
        let labels = MethodLabels { method, status };
        self.request_counter.get_or_create(&labels).inc();
        self.request_duration
            .get_or_create(&labels)
            .observe(elapsed_secs);
    }
}
