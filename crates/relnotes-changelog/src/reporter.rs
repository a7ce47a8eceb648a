//! Pipeline progress reporting
//!
//! The pipeline never logs degraded outcomes through ambient state alone;
//! it hands every notable event to the reporter it was built with.

use std::sync::{Arc, Mutex};

/// Events emitted during a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Explicit `since` reference is used as the range start
    SinceResolved {
        reference: String,
        via_tag: bool,
    },
    /// Explicit `since` reference could not be resolved
    SinceFallback {
        reference: String,
        error: Option<String>,
    },
    /// Commit range has been decided
    RangeResolved {
        tag: String,
        tag_exists: bool,
        since: Option<String>,
        until: Option<String>,
    },
    /// Commits were listed for the range
    CommitsListed {
        count: usize,
    },
    /// Boundary commit belonging to the previous release was dropped
    BoundaryCommitDropped {
        commit_id: String,
    },
    /// A commit carried no merge request trailer
    CommitWithoutMergeRequest {
        commit_id: String,
    },
    /// Merge request does not exist on the forge
    MergeRequestMissing {
        iid: u64,
    },
    /// Merge request could not be fetched
    MergeRequestFailed {
        iid: u64,
        error: String,
    },
    /// Merge request was opted out of release notes
    MergeRequestExcluded {
        iid: u64,
    },
    /// Notes have been rendered
    Rendered {
        item_count: usize,
    },
}

/// Trait for reporting pipeline progress
pub trait PipelineReporter: Send + Sync {
    /// Handle a pipeline event
    fn report(&self, event: &PipelineEvent);
}

/// Reporter that forwards events to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl PipelineReporter for TracingReporter {
    fn report(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::SinceResolved { reference, via_tag } => {
                tracing::info!(reference = %reference, via_tag, "using explicit starting position");
            }
            PipelineEvent::SinceFallback { reference, error } => match error {
                Some(error) => tracing::warn!(
                    reference = %reference,
                    error = %error,
                    "error retrieving since reference, falling back to auto-detection"
                ),
                None => tracing::warn!(
                    reference = %reference,
                    "could not find since reference, falling back to auto-detection"
                ),
            },
            PipelineEvent::RangeResolved {
                tag,
                tag_exists,
                since,
                until,
            } => {
                tracing::info!(
                    tag = %tag,
                    tag_exists,
                    since = since.as_deref().unwrap_or("-"),
                    until = until.as_deref().unwrap_or("-"),
                    "commit range resolved"
                );
            }
            PipelineEvent::CommitsListed { count } => {
                tracing::debug!(count, "commits listed");
            }
            PipelineEvent::BoundaryCommitDropped { commit_id } => {
                tracing::debug!(commit = %commit_id, "dropped boundary commit");
            }
            PipelineEvent::CommitWithoutMergeRequest { commit_id } => {
                tracing::debug!(commit = %commit_id, "commit has no merge request trailer");
            }
            PipelineEvent::MergeRequestMissing { iid } => {
                tracing::warn!(iid, "could not fetch merge request");
            }
            PipelineEvent::MergeRequestFailed { iid, error } => {
                tracing::warn!(iid, error = %error, "error fetching merge request");
            }
            PipelineEvent::MergeRequestExcluded { iid } => {
                tracing::debug!(iid, "merge request excluded from release notes");
            }
            PipelineEvent::Rendered { item_count } => {
                tracing::info!(item_count, "release notes rendered");
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PipelineReporter for CollectingReporter {
    fn report(&self, event: &PipelineEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

/// Broadcasts events to several reporters
pub struct PipelineReporterRegistry {
    reporters: Vec<Arc<dyn PipelineReporter>>,
}

impl PipelineReporterRegistry {
    /// Registry that already forwards to tracing
    pub fn new() -> Self {
        Self {
            reporters: vec![Arc::new(TracingReporter)],
        }
    }

    /// Add a reporter that receives every event
    pub fn register(&mut self, reporter: Arc<dyn PipelineReporter>) {
        self.reporters.push(reporter);
    }
}

impl Default for PipelineReporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineReporter for PipelineReporterRegistry {
    fn report(&self, event: &PipelineEvent) {
        for reporter in &self.reporters {
            reporter.report(event);
        }
    }
}
