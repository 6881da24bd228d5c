use dioxus::prelude::*;
use promptdrop_core::{Constraints, SubmitConfig, UploadedFile};
use promptdrop_gemini::GeminiConfig;
use promptdrop_io::FileUpload;

fn main() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);
    dioxus::launch(app);
}

/// Model connection baked in at build time.
///
/// `GEMINI_API_KEY` and `GEMINI_MODEL` are read from the build
/// environment. Without a key the widget still works, but every
/// submission fails with a visible message.
fn gemini_config() -> GeminiConfig {
    let mut config = GeminiConfig::with_api_key(option_env!("GEMINI_API_KEY").unwrap_or_default());
    if let Some(model) = option_env!("GEMINI_MODEL") {
        config.model = model.to_owned();
    }
    config
}

/// Root application component.
///
/// Hosts a single [`FileUpload`] widget with the default limits: one
/// file of at most 20 MB, images or PDF.
fn app() -> Element {
    let gemini = use_hook(gemini_config);

    let on_change = move |files: Vec<UploadedFile>| {
        log::debug!("file list changed: {} file(s)", files.len());
    };
    let on_remove = move |file: UploadedFile| {
        log::info!("removed {} ({})", file.file.name(), file.id);
    };

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/promptdrop.css") }

        main { class: "pd-page",
            h1 { class: "pd-page__title", "Drag and Drop File Upload" }
            FileUpload {
                constraints: Constraints::default(),
                submit: SubmitConfig::default(),
                gemini,
                on_change,
                on_remove,
            }
        }
    }
}
