//! Feature requests collected alongside content edits.

use chrono::{DateTime, NaiveDate, Utc};

use crate::content::{FeatureRequest, Priority, RequestKind};

/// Form input for a new request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRequest {
    /// Category; required
    pub kind: Option<RequestKind>,
    /// Short title; required
    pub title: String,
    /// Details; required
    pub description: String,
    /// Urgency
    pub priority: Priority,
}

impl NewRequest {
    /// Whether every required field is filled in.
    pub fn is_complete(&self) -> bool {
        self.kind.is_some() && !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }
}

/// The editor's list of pending requests, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestList {
    items: Vec<FeatureRequest>,
}

impl RequestList {
    /// Starts from requests stored in a loaded document.
    pub fn from_items(items: Vec<FeatureRequest>) -> Self {
        Self { items }
    }

    /// Requests in submission order.
    pub fn items(&self) -> &[FeatureRequest] {
        &self.items
    }

    /// Number of requests.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no requests.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a request stamped with `now`.
    ///
    /// Returns `None` (and leaves the list alone) when a required field is
    /// missing. The id is the timestamp in milliseconds, bumped past any id
    /// already in the list.
    pub fn add(&mut self, input: NewRequest, now: DateTime<Utc>) -> Option<&FeatureRequest> {
        if !input.is_complete() {
            return None;
        }
        let kind = input.kind?;

        let mut id = now.timestamp_millis();
        while self.items.iter().any(|r| r.id == id.to_string()) {
            id += 1;
        }

        self.items.push(FeatureRequest {
            id: id.to_string(),
            kind,
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            priority: input.priority,
            date: now,
        });
        self.items.last()
    }

    /// Removes the request with `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|r| r.id != id);
        self.items.len() != before
    }

    /// Pretty-printed JSON array of all requests.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.items)
    }

    /// Download name for an export made on `date`.
    pub fn export_filename(date: NaiveDate) -> String {
        format!("feature-requests-{}.json", date.format("%Y-%m-%d"))
    }

    /// Consumes the list.
    pub fn into_items(self) -> Vec<FeatureRequest> {
        self.items
    }
}
