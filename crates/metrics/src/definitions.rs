//! Metric name and label definitions.
//!
//! Every metric quandary records is named here so dashboards have a single
//! place to look.

/// Inbound event routing
pub mod dispatch {
    /// Total inbound events routed, labelled by `kind` (message/postback)
    pub const EVENTS_TOTAL: &str = "quandary_dispatch_events_total";
    /// Handler executions, labelled by `command`
    pub const COMMANDS_EXECUTED_TOTAL: &str = "quandary_dispatch_commands_executed_total";
    /// Events that fired a rule, labelled by `rule`
    pub const RULES_MATCHED_TOTAL: &str = "quandary_dispatch_rules_matched_total";
    /// Events that matched no rule and had no default
    pub const UNMATCHED_TOTAL: &str = "quandary_dispatch_unmatched_total";
    /// Dispatches that ended in an error
    pub const ERRORS_TOTAL: &str = "quandary_dispatch_errors_total";
    /// Replies the channel failed to deliver
    pub const SEND_ERRORS_TOTAL: &str = "quandary_dispatch_send_errors_total";
    /// Wall time of one dispatch in seconds
    pub const DURATION_SECONDS: &str = "quandary_dispatch_duration_seconds";
}

/// Natural-language-understanding service
pub mod nlu {
    /// Classification requests sent to the service
    pub const REQUESTS_TOTAL: &str = "quandary_nlu_requests_total";
    /// Classification lookups answered from the memo cache
    pub const CACHE_HITS_TOTAL: &str = "quandary_nlu_cache_hits_total";
    /// Failed classification requests
    pub const ERRORS_TOTAL: &str = "quandary_nlu_errors_total";
    /// Classification request latency in seconds
    pub const REQUEST_DURATION_SECONDS: &str = "quandary_nlu_request_duration_seconds";
    /// Training samples submitted
    pub const TRAINING_SUBMITTED_TOTAL: &str = "quandary_nlu_training_submitted_total";
    /// Training samples the service rejected or never received
    pub const TRAINING_FAILED_TOTAL: &str = "quandary_nlu_training_failed_total";
}

/// Session store
pub mod sessions {
    /// Users seen for the first time
    pub const CREATED_TOTAL: &str = "quandary_sessions_created_total";
    /// Users with a dispatch in flight or queued
    pub const ACTIVE: &str = "quandary_sessions_active";
}

/// Messenger webhook
pub mod webhook {
    /// Webhook deliveries received
    pub const REQUESTS_TOTAL: &str = "quandary_webhook_requests_total";
    /// Deliveries rejected because of a bad signature
    pub const SIGNATURE_FAILURES_TOTAL: &str = "quandary_webhook_signature_failures_total";
}

/// Common label keys
pub mod labels {
    pub const KIND: &str = "kind";
    pub const COMMAND: &str = "command";
    pub const RULE: &str = "rule";
}

/// Histogram buckets
pub mod buckets {
    /// NLU round trips: 10ms to 30s
    pub const NLU_DURATION: &[f64] = &[
        0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    ];

    /// Whole dispatches: 1ms to 60s
    pub const DISPATCH_DURATION: &[f64] = &[
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ];
}
