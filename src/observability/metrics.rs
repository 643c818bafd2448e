//! Prometheus metrics for the GraphQL resolvers.
//!
//! Recording is a no-op until `init` installs the recorder, so library code
//! and tests can call these functions unconditionally.

use std::fmt;
use std::sync::OnceLock;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    QueriesServed,
    MutationsSucceeded,
    MutationsFailed,
    DanglingReferences,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::QueriesServed => "social_queries_total",
            MetricName::MutationsSucceeded => "social_mutations_total",
            MetricName::MutationsFailed => "social_mutation_errors_total",
            MetricName::DanglingReferences => "social_dangling_references_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        [
            MetricName::QueriesServed,
            MetricName::MutationsSucceeded,
            MetricName::MutationsFailed,
            MetricName::DanglingReferences,
        ]
        .into_iter()
    }

    pub fn description(&self) -> &'static str {
        match self {
            MetricName::QueriesServed => "Top-level queries resolved, by operation",
            MetricName::MutationsSucceeded => "Mutations that completed, by operation",
            MetricName::MutationsFailed => "Mutations rejected, by operation and error code",
            MetricName::DanglingReferences => "Reference fields pointing at deleted documents",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is an error.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;

    for metric in MetricName::all_metrics() {
        ::metrics::describe_counter!(metric.as_str(), metric.description());
    }

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| "Prometheus recorder already initialized")?;
    info!("Metrics system initialized");
    Ok(())
}

/// Render the current metrics in Prometheus text format.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

pub mod queries {
    use super::MetricName;

    pub fn served(operation: &'static str) {
        ::metrics::counter!(MetricName::QueriesServed.as_str(), "op" => operation).increment(1);
    }
}

pub mod mutations {
    use super::MetricName;

    pub fn succeeded(operation: &'static str) {
        ::metrics::counter!(MetricName::MutationsSucceeded.as_str(), "op" => operation).increment(1);
    }

    pub fn failed(operation: &'static str, code: &'static str) {
        ::metrics::counter!(
            MetricName::MutationsFailed.as_str(),
            "op" => operation,
            "code" => code
        )
        .increment(1);
    }
}

pub mod references {
    use super::MetricName;

    pub fn dangling(entity: &'static str, field: &'static str) {
        ::metrics::counter!(
            MetricName::DanglingReferences.as_str(),
            "entity" => entity,
            "field" => field
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_follow_prometheus_conventions() {
        for metric in MetricName::all_metrics() {
            assert!(metric.as_str().starts_with("social_"));
            assert!(metric.as_str().ends_with("_total"));
        }
    }

    #[test]
    fn recording_without_recorder_is_harmless() {
        queries::served("users");
        mutations::succeeded("createPost");
        mutations::failed("createUser", "CONFLICT");
        references::dangling("Post", "author");
    }
}
