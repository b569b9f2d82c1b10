//! Action lookup, classification and content retrieval.

use crate::error::{ProbeError, Result};
use crate::model::{ActionRecord, ContentLink, RunActionsDocument};
use crate::status::ActionStatus;
use crate::transport::{ApiTransport, Endpoint};
use serde_json::Value;
use tracing::debug;

/// Converts a human action name to the name stored in run history.
///
/// The runtime replaces every space with an underscore. Pass
/// `format = false` when the name should be matched exactly as given.
pub fn normalize_name(raw: &str, format: bool) -> String {
    if format {
        raw.replace(' ', "_")
    } else {
        raw.to_string()
    }
}

/// Answers action queries against one loaded run document.
#[derive(Debug, Clone, Copy)]
pub struct ActionResolver<'a> {
    document: &'a RunActionsDocument,
}

impl<'a> ActionResolver<'a> {
    /// Creates a resolver over a run document.
    pub fn new(document: &'a RunActionsDocument) -> Self {
        Self { document }
    }

    /// Finds an action by canonical name.
    pub fn lookup(&self, canonical: &str) -> Option<&'a ActionRecord> {
        self.document.actions.iter().find(|a| a.name == canonical)
    }

    /// Classifies a record's provider status.
    pub fn classify(record: &ActionRecord) -> ActionStatus {
        record.action_status()
    }

    /// Status of the named action.
    ///
    /// A name missing from the run yields
    /// [`ActionStatus::ActionDoesntExistInRunHistory`] rather than an error.
    pub fn status(&self, name: &str, format: bool) -> ActionStatus {
        let canonical = normalize_name(name, format);
        match self.lookup(&canonical) {
            Some(record) => Self::classify(record),
            None => {
                debug!(action = %canonical, "action not in run history");
                ActionStatus::ActionDoesntExistInRunHistory
            }
        }
    }

    /// Returns the named action or fails with [`ProbeError::ActionNotFound`].
    pub fn require(&self, name: &str, format: bool) -> Result<&'a ActionRecord> {
        let canonical = normalize_name(name, format);
        self.lookup(&canonical)
            .ok_or(ProbeError::ActionNotFound(canonical))
    }

    /// Raw JSON of the named action.
    pub fn action_json(&self, name: &str, format: bool) -> Result<&'a Value> {
        self.require(name, format).map(|record| &record.raw)
    }

    /// Every action with its status, in document order.
    pub fn statuses(&self) -> Vec<(&'a str, ActionStatus)> {
        self.document
            .actions
            .iter()
            .map(|a| (a.name.as_str(), Self::classify(a)))
            .collect()
    }

    /// Fetches the body behind a content link.
    pub fn fetch_content(transport: &dyn ApiTransport, link: &ContentLink) -> Result<String> {
        debug!(size = ?link.content_size, "fetching content link");
        transport.get(&Endpoint::External(link.uri.clone()))
    }

    /// Fetches the inputs of the named action.
    pub fn input_message(&self, transport: &dyn ApiTransport, name: &str, format: bool) -> Result<String> {
        let record = self.require(name, format)?;
        let link = record
            .inputs_link
            .as_ref()
            .ok_or_else(|| ProbeError::ContentLinkMissing {
                subject: record.name.clone(),
                link: "inputs",
            })?;
        Self::fetch_content(transport, link)
    }

    /// Fetches the outputs of the named action.
    pub fn output_message(&self, transport: &dyn ApiTransport, name: &str, format: bool) -> Result<String> {
        let record = self.require(name, format)?;
        let link = record
            .outputs_link
            .as_ref()
            .ok_or_else(|| ProbeError::ContentLinkMissing {
                subject: record.name.clone(),
                link: "outputs",
            })?;
        Self::fetch_content(transport, link)
    }
}
