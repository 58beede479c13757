pub mod error;
pub mod extractor;
pub mod session;
pub mod settings;
pub mod summarizer;

#[cfg(feature = "gui")]
mod commands;

#[cfg(feature = "gui")]
use commands::*;

#[cfg(feature = "gui")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            // Get app data directory for settings
            let app_data_dir = app
                .path()
                .app_data_dir()
                .unwrap_or_else(|_| std::path::PathBuf::from("."));
            std::fs::create_dir_all(&app_data_dir).ok();

            settings::init(app_data_dir);

            app.manage(AppState::new());

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_session,
            upload_document,
            remove_document,
            render_document,
            generate_summary,
            update_patent_details,
            update_user_notes,
            // Settings
            get_api_key_status,
            save_api_key,
            clear_api_key,
            get_usage_stats,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
