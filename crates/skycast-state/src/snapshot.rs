//! Per-kind fetch state: payload, error flag, and a request-generation
//! guard so a stale response never overwrites a newer one.

use serde::Serialize;

/// The phase a kind is in, as derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPhase {
    Loading,
    Ready,
    Failed,
}

/// Fetch state for one weather kind.
///
/// A failed refresh sets the error flag but keeps any previously
/// stored payload, so the display can keep showing stale data next to
/// the error.
#[derive(Debug)]
pub struct FetchState<T> {
    data: Option<T>,
    error: bool,
    error_message: Option<String>,
    issued: u64,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: false,
            error_message: None,
            issued: 0,
        }
    }
}

impl<T> FetchState<T> {
    /// Start a new request: clears the error state and returns the
    /// generation token the eventual completion must present.
    pub fn begin(&mut self) -> u64 {
        self.error = false;
        self.error_message = None;
        self.issued += 1;
        self.issued
    }

    /// Record the outcome of a request. Returns false (and changes
    /// nothing) when a newer request has been issued since.
    pub fn complete(&mut self, generation: u64, outcome: Result<T, Option<String>>) -> bool {
        if generation != self.issued {
            tracing::debug!(
                "Discarding stale completion (generation {} < {})",
                generation,
                self.issued
            );
            return false;
        }

        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = false;
                self.error_message = None;
            }
            Err(message) => {
                self.error = true;
                self.error_message = message;
            }
        }
        true
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> bool {
        self.error
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn phase(&self) -> FetchPhase {
        if self.error {
            FetchPhase::Failed
        } else if self.data.is_some() {
            FetchPhase::Ready
        } else {
            FetchPhase::Loading
        }
    }
}

impl<T: Clone> FetchState<T> {
    /// Snapshot for serving over the status API.
    pub fn view(&self) -> FetchView<T> {
        FetchView {
            data: self.data.clone(),
            error: self.error,
            error_message: self.error_message.clone(),
            phase: self.phase(),
        }
    }
}

/// Serializable snapshot of a kind's fetch state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchView<T> {
    pub data: Option<T>,
    pub error: bool,
    pub error_message: Option<String>,
    pub phase: FetchPhase,
}
