//! Process-local session state for the current patent
//!
//! Holds the uploaded document, its extracted text, the generated summary,
//! and the manually entered metadata. State changes go through
//! [`SessionState::apply`] so every transition is testable without a UI.
//! Nothing is persisted; the session is discarded when the app closes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Manually entered patent metadata. No validation, no uniqueness —
/// these are plain echo-back form fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatentDetails {
    #[serde(default)]
    pub patent_number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub inventors: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub filing_date: Option<NaiveDate>,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
}

/// One uploaded PDF. Immutable once received; a new upload replaces it
/// wholesale. Identity is the per-upload id, not the content, so uploading
/// the same file twice re-extracts.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub id: Uuid,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Lifecycle of the current document within the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentPhase {
    NoDocument,
    TextPending,
    TextReady,
    ExtractionFailed,
    SummaryPending,
    SummaryReady,
    SummaryFailed,
}

/// Derived configuration status, recomputed at the start of every
/// interaction cycle so a credential edited externally takes effect on the
/// next cycle without a restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfigStatus {
    pub configured: bool,
    pub error: Option<String>,
    pub masked_key: Option<String>,
}

/// Events the UI can raise. Extraction and summary outcomes carry the
/// document id they were computed for; outcomes for a superseded document
/// are dropped instead of corrupting the current one.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    DocumentUploaded {
        id: Uuid,
        file_name: String,
        bytes: Vec<u8>,
    },
    DocumentRemoved,
    ExtractionSucceeded {
        document_id: Uuid,
        text: String,
    },
    ExtractionFailed {
        document_id: Uuid,
        message: String,
    },
    SummaryRequested,
    SummaryReceived {
        document_id: Uuid,
        text: String,
        truncated: bool,
    },
    SummaryFailed {
        document_id: Uuid,
        message: String,
    },
    DetailsEdited(PatentDetails),
    NotesEdited(String),
}

/// Snapshot handed to the presentation layer. Rendering is a stateless
/// function of this value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub patent_details: PatentDetails,
    pub user_notes: String,
    pub document_id: Option<Uuid>,
    pub file_name: Option<String>,
    pub extracted_chars: Option<usize>,
    pub summary: Option<String>,
    pub summary_truncated: bool,
    pub phase: DocumentPhase,
    pub last_error: Option<String>,
    pub api_status: ApiConfigStatus,
    pub can_summarize: bool,
}

pub struct SessionState {
    pub patent_details: PatentDetails,
    pub user_notes: String,
    pub document: Option<UploadedDocument>,
    pub extracted_text: Option<String>,
    pub summary: Option<String>,
    pub summary_truncated: bool,
    pub phase: DocumentPhase,
    pub last_error: Option<String>,
    pub api_status: ApiConfigStatus,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            patent_details: PatentDetails::default(),
            user_notes: String::new(),
            document: None,
            extracted_text: None,
            summary: None,
            summary_truncated: false,
            phase: DocumentPhase::NoDocument,
            last_error: None,
            api_status: ApiConfigStatus::default(),
        }
    }

    /// Re-derive the API configuration status from the credential source.
    /// Called at the start of every interaction cycle.
    pub fn refresh_api_status(&mut self) {
        self.api_status = crate::settings::api_status();
    }

    fn current_document_id(&self) -> Option<Uuid> {
        self.document.as_ref().map(|d| d.id)
    }

    /// The summarize action is only offered when the API is configured and
    /// text has been extracted.
    pub fn can_summarize(&self) -> bool {
        self.api_status.configured && self.extracted_text.is_some()
    }

    /// Apply one event. Last-write-wins for field edits; document lifecycle
    /// transitions follow the phase machine.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::DocumentUploaded { id, file_name, bytes } => {
                // A new document id invalidates derived state before any
                // extraction starts.
                self.document = Some(UploadedDocument { id, file_name, bytes });
                self.extracted_text = None;
                self.summary = None;
                self.summary_truncated = false;
                self.last_error = None;
                self.phase = DocumentPhase::TextPending;
            }
            SessionEvent::DocumentRemoved => {
                self.document = None;
                self.extracted_text = None;
                self.summary = None;
                self.summary_truncated = false;
                self.last_error = None;
                self.phase = DocumentPhase::NoDocument;
            }
            SessionEvent::ExtractionSucceeded { document_id, text } => {
                if self.current_document_id() != Some(document_id) {
                    eprintln!("[Session] Dropping stale extraction result for {}", document_id);
                    return;
                }
                self.extracted_text = Some(text);
                self.last_error = None;
                self.phase = DocumentPhase::TextReady;
            }
            SessionEvent::ExtractionFailed { document_id, message } => {
                if self.current_document_id() != Some(document_id) {
                    eprintln!("[Session] Dropping stale extraction error for {}", document_id);
                    return;
                }
                self.extracted_text = None;
                self.last_error = Some(message);
                self.phase = DocumentPhase::ExtractionFailed;
            }
            SessionEvent::SummaryRequested => {
                // Retry from a failed or completed summary is allowed.
                if matches!(
                    self.phase,
                    DocumentPhase::TextReady
                        | DocumentPhase::SummaryReady
                        | DocumentPhase::SummaryFailed
                ) {
                    self.phase = DocumentPhase::SummaryPending;
                }
            }
            SessionEvent::SummaryReceived { document_id, text, truncated } => {
                if self.current_document_id() != Some(document_id) {
                    eprintln!("[Session] Dropping stale summary for {}", document_id);
                    return;
                }
                self.summary = Some(text);
                self.summary_truncated = truncated;
                self.last_error = None;
                self.phase = DocumentPhase::SummaryReady;
            }
            SessionEvent::SummaryFailed { document_id, message } => {
                if self.current_document_id() != Some(document_id) {
                    eprintln!("[Session] Dropping stale summary error for {}", document_id);
                    return;
                }
                self.last_error = Some(message);
                self.phase = DocumentPhase::SummaryFailed;
            }
            SessionEvent::DetailsEdited(details) => {
                self.patent_details = details;
            }
            SessionEvent::NotesEdited(notes) => {
                self.user_notes = notes;
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            patent_details: self.patent_details.clone(),
            user_notes: self.user_notes.clone(),
            document_id: self.current_document_id(),
            file_name: self.document.as_ref().map(|d| d.file_name.clone()),
            extracted_chars: self.extracted_text.as_ref().map(|t| t.chars().count()),
            summary: self.summary.clone(),
            summary_truncated: self.summary_truncated,
            phase: self.phase,
            last_error: self.last_error.clone(),
            api_status: self.api_status.clone(),
            can_summarize: self.can_summarize(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured_status() -> ApiConfigStatus {
        ApiConfigStatus {
            configured: true,
            error: None,
            masked_key: Some("AIzaSyAB...wxyz".to_string()),
        }
    }

    fn upload(state: &mut SessionState, id: Uuid) {
        state.apply(SessionEvent::DocumentUploaded {
            id,
            file_name: "patent.pdf".to_string(),
            bytes: b"%PDF-1.4 fake".to_vec(),
        });
    }

    #[test]
    fn test_upload_clears_text_and_summary() {
        let mut state = SessionState::new();
        let doc_a = Uuid::new_v4();
        upload(&mut state, doc_a);
        state.apply(SessionEvent::ExtractionSucceeded {
            document_id: doc_a,
            text: "ABC".repeat(200),
        });
        state.apply(SessionEvent::SummaryReceived {
            document_id: doc_a,
            text: "A summary".to_string(),
            truncated: false,
        });
        assert!(state.summary.is_some());

        let doc_b = Uuid::new_v4();
        upload(&mut state, doc_b);
        assert_eq!(state.phase, DocumentPhase::TextPending);
        assert!(state.extracted_text.is_none());
        assert!(state.summary.is_none());
        assert!(!state.summary_truncated);
    }

    #[test]
    fn test_remove_returns_to_no_document() {
        let mut state = SessionState::new();
        upload(&mut state, Uuid::new_v4());
        state.apply(SessionEvent::DocumentRemoved);
        assert_eq!(state.phase, DocumentPhase::NoDocument);
        assert!(state.document.is_none());
    }

    #[test]
    fn test_summarize_gated_on_config_and_text() {
        let mut state = SessionState::new();
        assert!(!state.can_summarize());

        let doc = Uuid::new_v4();
        upload(&mut state, doc);
        state.apply(SessionEvent::ExtractionSucceeded {
            document_id: doc,
            text: "text ".repeat(100),
        });
        // Text present but API not configured
        assert!(!state.can_summarize());

        state.api_status = configured_status();
        assert!(state.can_summarize());
    }

    #[test]
    fn test_extraction_failure_is_terminal_for_document() {
        let mut state = SessionState::new();
        let doc = Uuid::new_v4();
        upload(&mut state, doc);
        state.apply(SessionEvent::ExtractionFailed {
            document_id: doc,
            message: "not a PDF".to_string(),
        });
        assert_eq!(state.phase, DocumentPhase::ExtractionFailed);
        assert!(!state.can_summarize());
        // Request in this phase is a no-op
        state.apply(SessionEvent::SummaryRequested);
        assert_eq!(state.phase, DocumentPhase::ExtractionFailed);
    }

    #[test]
    fn test_blocked_summary_leaves_summary_absent() {
        let mut state = SessionState::new();
        state.api_status = configured_status();
        let doc = Uuid::new_v4();
        upload(&mut state, doc);
        state.apply(SessionEvent::ExtractionSucceeded {
            document_id: doc,
            text: "x".repeat(500),
        });
        state.apply(SessionEvent::SummaryRequested);
        assert_eq!(state.phase, DocumentPhase::SummaryPending);

        state.apply(SessionEvent::SummaryFailed {
            document_id: doc,
            message: "Summary generation was blocked. Reason: SAFETY. Safety ratings: N/A"
                .to_string(),
        });
        assert_eq!(state.phase, DocumentPhase::SummaryFailed);
        assert!(state.summary.is_none());
        assert!(state.last_error.as_deref().unwrap().contains("SAFETY"));
        // Retry stays available
        assert!(state.can_summarize());
        state.apply(SessionEvent::SummaryRequested);
        assert_eq!(state.phase, DocumentPhase::SummaryPending);
    }

    #[test]
    fn test_successful_summary_stored_verbatim() {
        let mut state = SessionState::new();
        state.api_status = configured_status();
        let doc = Uuid::new_v4();
        upload(&mut state, doc);
        state.apply(SessionEvent::ExtractionSucceeded {
            document_id: doc,
            text: "claims ".repeat(1000),
        });
        state.apply(SessionEvent::SummaryRequested);
        state.apply(SessionEvent::SummaryReceived {
            document_id: doc,
            text: "Problem: ... Solution: ...".to_string(),
            truncated: false,
        });
        assert_eq!(state.phase, DocumentPhase::SummaryReady);
        assert_eq!(state.summary.as_deref(), Some("Problem: ... Solution: ..."));
    }

    #[test]
    fn test_new_upload_supersedes_pending_results() {
        let mut state = SessionState::new();
        let doc_a = Uuid::new_v4();
        upload(&mut state, doc_a);

        let doc_b = Uuid::new_v4();
        upload(&mut state, doc_b);

        // Late results for document A are dropped
        state.apply(SessionEvent::ExtractionSucceeded {
            document_id: doc_a,
            text: "stale text".to_string(),
        });
        assert!(state.extracted_text.is_none());
        assert_eq!(state.phase, DocumentPhase::TextPending);

        state.apply(SessionEvent::SummaryReceived {
            document_id: doc_a,
            text: "stale summary".to_string(),
            truncated: false,
        });
        assert!(state.summary.is_none());
    }

    #[test]
    fn test_field_edits_are_last_write_wins() {
        let mut state = SessionState::new();
        state.apply(SessionEvent::NotesEdited("first".to_string()));
        state.apply(SessionEvent::NotesEdited("second".to_string()));
        assert_eq!(state.user_notes, "second");

        let details = PatentDetails {
            patent_number: "US1234567B2".to_string(),
            title: "Widget".to_string(),
            ..Default::default()
        };
        state.apply(SessionEvent::DetailsEdited(details));
        assert_eq!(state.patent_details.patent_number, "US1234567B2");
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = SessionState::new();
        let doc = Uuid::new_v4();
        upload(&mut state, doc);
        state.apply(SessionEvent::ExtractionSucceeded {
            document_id: doc,
            text: "abcde".to_string(),
        });
        let snap = state.snapshot();
        assert_eq!(snap.document_id, Some(doc));
        assert_eq!(snap.file_name.as_deref(), Some("patent.pdf"));
        assert_eq!(snap.extracted_chars, Some(5));
        assert_eq!(snap.phase, DocumentPhase::TextReady);
        assert!(!snap.can_summarize); // not configured
    }
}
