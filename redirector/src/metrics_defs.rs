//! Metrics definitions for the redirector.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REDIRECTS: MetricDef = MetricDef {
    name: "redirects",
    metric_type: MetricType::Counter,
    description: "Number of requests answered with a redirect to a template",
};

pub const TEMPLATES_NOT_FOUND: MetricDef = MetricDef {
    name: "templates.not_found",
    metric_type: MetricType::Counter,
    description: "Number of requests for a template missing from the listing",
};

pub const REQUEST_ERRORS: MetricDef = MetricDef {
    name: "requests.errors",
    metric_type: MetricType::Counter,
    description: "Number of requests that failed with a client or internal error",
};

pub const UPSTREAM_REQUESTS: MetricDef = MetricDef {
    name: "upstream.requests",
    metric_type: MetricType::Counter,
    description: "Number of requests sent to the upstream API",
};

pub const UPSTREAM_REQUEST_DURATION: MetricDef = MetricDef {
    name: "upstream.request.duration",
    metric_type: MetricType::Histogram,
    description: "Upstream API request duration in seconds",
};

pub const RELEASE_CACHE_MISS: MetricDef = MetricDef {
    name: "release_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of release lookups that were not cached",
};

pub const LISTING_CACHE_MISS: MetricDef = MetricDef {
    name: "listing_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of template listings that were not cached",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REDIRECTS,
    TEMPLATES_NOT_FOUND,
    REQUEST_ERRORS,
    UPSTREAM_REQUESTS,
    UPSTREAM_REQUEST_DURATION,
    RELEASE_CACHE_MISS,
    LISTING_CACHE_MISS,
];
