use extractor_core::{AppViewModel, PhaseKind, StatusView};

const BAR_WIDTH: usize = 20;

/// Terminal lines for a changed view.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(status) = &view.status {
        lines.push(status_line(status));
    }
    if let Some(error) = &view.error {
        lines.push(format!("error: {error}"));
    }
    if view.download_enabled {
        lines.push("Extraction complete; download available.".to_string());
    }
    if view.phase == PhaseKind::Failed && view.submit_enabled {
        lines.push("Ready for a new extraction.".to_string());
    }
    lines
}

fn status_line(status: &StatusView) -> String {
    let filled = usize::from(status.progress) * BAR_WIDTH / 100;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));
    let marker = if status.pulsing { "…" } else { " " };
    if status.message.is_empty() {
        format!("[{bar}] {:>3}%{marker} {}", status.progress, status.label)
    } else {
        format!(
            "[{bar}] {:>3}%{marker} {}: {}",
            status.progress, status.label, status.message
        )
    }
}
