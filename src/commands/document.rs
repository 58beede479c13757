//! Document lifecycle commands: upload, render, summarize, form edits

use base64::Engine;
use tauri::State;
use uuid::Uuid;

use super::AppState;
use crate::error::AppError;
use crate::extractor;
use crate::session::{PatentDetails, SessionEvent, SessionSnapshot};
use crate::summarizer;

/// Render snapshot of the current session
#[tauri::command]
pub fn get_session(state: State<AppState>) -> Result<SessionSnapshot, String> {
    let mut session = state.session.write().map_err(|_| "Session lock poisoned")?;
    session.refresh_api_status();
    Ok(session.snapshot())
}

/// Receive an uploaded PDF and extract its text.
///
/// A fresh document id is assigned per upload, so the session always clears
/// the previous text and summary before extraction starts — even when the
/// same file is uploaded twice.
#[tauri::command]
pub fn upload_document(
    state: State<AppState>,
    file_name: String,
    bytes: Vec<u8>,
) -> Result<SessionSnapshot, String> {
    let id = Uuid::new_v4();
    println!("[Upload] {} ({} bytes) as {}", file_name, bytes.len(), id);

    let mut session = state.session.write().map_err(|_| "Session lock poisoned")?;
    session.refresh_api_status();

    session.apply(SessionEvent::DocumentUploaded {
        id,
        file_name,
        bytes,
    });

    // Prior text and summary are cleared before extraction starts; the
    // buffer now lives in the session, so extract from there instead of
    // keeping a second copy.
    let extraction = match session.document.as_ref() {
        Some(doc) => extractor::extract_text(&doc.bytes),
        None => Err(AppError::Extraction(
            "document missing after upload".to_string(),
        )),
    };

    match extraction {
        Ok(text) => {
            println!("[Upload] Extracted {} chars", text.chars().count());
            session.apply(SessionEvent::ExtractionSucceeded {
                document_id: id,
                text,
            });
        }
        Err(e) => {
            eprintln!("[Upload] Extraction failed: {}", e);
            session.apply(SessionEvent::ExtractionFailed {
                document_id: id,
                message: e.to_string(),
            });
        }
    }

    Ok(session.snapshot())
}

/// Remove the current document and all derived state
#[tauri::command]
pub fn remove_document(state: State<AppState>) -> Result<SessionSnapshot, String> {
    let mut session = state.session.write().map_err(|_| "Session lock poisoned")?;
    session.refresh_api_status();
    session.apply(SessionEvent::DocumentRemoved);
    Ok(session.snapshot())
}

/// Base64 payload for the embedded PDF viewer
#[tauri::command]
pub fn render_document(state: State<AppState>) -> Result<String, String> {
    let session = state.session.read().map_err(|_| "Session lock poisoned")?;
    let document = session
        .document
        .as_ref()
        .ok_or_else(|| AppError::Render("no document uploaded".to_string()).to_string())?;

    if document.bytes.is_empty() {
        return Err(AppError::Render("uploaded document is empty".to_string()).to_string());
    }

    Ok(base64::engine::general_purpose::STANDARD.encode(&document.bytes))
}

/// Generate the AI summary for the current document.
///
/// Gated on "configured AND text extracted"; both are re-checked here right
/// before the call, matching the UI-side button gating. The call blocks this
/// interaction cycle until the API responds or errors.
#[tauri::command]
pub async fn generate_summary(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    let (document_id, text) = {
        let mut session = state.session.write().map_err(|_| "Session lock poisoned")?;
        session.refresh_api_status();

        if !session.api_status.configured {
            return Err(AppError::Configuration(
                session
                    .api_status
                    .error
                    .clone()
                    .unwrap_or_else(|| "GEMINI_API_KEY not set".to_string()),
            )
            .to_string());
        }

        let document_id = session
            .document
            .as_ref()
            .map(|d| d.id)
            .ok_or("Cannot generate summary - no document uploaded")?;
        let text = session
            .extracted_text
            .clone()
            .ok_or("Cannot generate summary - PDF text missing")?;

        session.apply(SessionEvent::SummaryRequested);
        (document_id, text)
    };

    // Lock released while the request is in flight
    let outcome = summarizer::summarize_patent(&text).await;

    let mut session = state.session.write().map_err(|_| "Session lock poisoned")?;
    match outcome {
        Ok(summary) => {
            if summary.truncated {
                println!(
                    "[Summarize] Summarized first {} chars of {}",
                    summarizer::MAX_TEXT_CHARS,
                    document_id
                );
            }
            session.apply(SessionEvent::SummaryReceived {
                document_id,
                text: summary.text,
                truncated: summary.truncated,
            });
        }
        Err(e) => {
            eprintln!("[Summarize] {}", e);
            session.apply(SessionEvent::SummaryFailed {
                document_id,
                message: e.to_string(),
            });
        }
    }

    Ok(session.snapshot())
}

/// Overwrite the manually entered patent details (last write wins)
#[tauri::command]
pub fn update_patent_details(
    state: State<AppState>,
    details: PatentDetails,
) -> Result<(), String> {
    let mut session = state.session.write().map_err(|_| "Session lock poisoned")?;
    session.apply(SessionEvent::DetailsEdited(details));
    Ok(())
}

/// Overwrite the free-form notes field
#[tauri::command]
pub fn update_user_notes(state: State<AppState>, notes: String) -> Result<(), String> {
    let mut session = state.session.write().map_err(|_| "Session lock poisoned")?;
    session.apply(SessionEvent::NotesEdited(notes));
    Ok(())
}
