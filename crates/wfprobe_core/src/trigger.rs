//! Trigger queries for a loaded run.

use crate::actions::ActionResolver;
use crate::error::{ProbeError, Result};
use crate::model::{RunActionsDocument, TriggerRecord};
use crate::status::TriggerStatus;
use crate::transport::ApiTransport;

/// Answers trigger queries against one loaded run document.
///
/// A run has exactly one trigger, so no name resolution is involved.
#[derive(Debug, Clone, Copy)]
pub struct TriggerResolver<'a> {
    document: &'a RunActionsDocument,
}

impl<'a> TriggerResolver<'a> {
    /// Creates a resolver over a run document.
    pub fn new(document: &'a RunActionsDocument) -> Self {
        Self { document }
    }

    /// Classified trigger status.
    pub fn status(&self) -> TriggerStatus {
        self.document.trigger.trigger_status()
    }

    /// The trigger record.
    pub fn details(&self) -> &'a TriggerRecord {
        &self.document.trigger
    }

    /// Fetches the raw message that started the run.
    pub fn message(&self, transport: &dyn ApiTransport) -> Result<String> {
        let trigger = self.details();
        let link = trigger
            .outputs_link
            .as_ref()
            .ok_or_else(|| ProbeError::ContentLinkMissing {
                subject: format!("trigger {}", trigger.name),
                link: "outputs",
            })?;
        ActionResolver::fetch_content(transport, link)
    }

    /// Fetches the trigger inputs.
    pub fn input_message(&self, transport: &dyn ApiTransport) -> Result<String> {
        let trigger = self.details();
        let link = trigger
            .inputs_link
            .as_ref()
            .ok_or_else(|| ProbeError::ContentLinkMissing {
                subject: format!("trigger {}", trigger.name),
                link: "inputs",
            })?;
        ActionResolver::fetch_content(transport, link)
    }
}
