use std::{sync::Mutex, time::Duration};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use reelnotes_core::{
    GalleryImage, SegmentPanel, View,
    format::{GENERATING, NO_KEYWORDS_YET},
};

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Renders every viewer region as lines on the terminal.
#[derive(Default)]
pub struct TerminalView {
    overlay: Mutex<Option<ProgressBar>>,
    last_panel: Mutex<Option<SegmentPanel>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, line: String) {
        match self.overlay.lock().expect("overlay poisoned").as_ref() {
            Some(spinner) => spinner.println(line),
            None => println!("{}", line),
        }
    }

    fn section(&self, title: &str, body: &str) {
        self.emit(format!(
            "\n{}\n{}",
            style(title).cyan().bold(),
            body
        ));
    }
}

pub fn panel_line(panel: &SegmentPanel) -> String {
    match panel {
        SegmentPanel::Placeholder => style(NO_KEYWORDS_YET).dim().to_string(),
        SegmentPanel::Active { label, image_url } => match image_url {
            Some(url) => format!("{} {}", style(label).yellow(), style(url).dim()),
            None => style(label).yellow().to_string(),
        },
    }
}

impl View for TerminalView {
    fn show_input_error(&self, message: &str) {
        eprintln!("{} {}", style("Error:").red().bold(), message);
    }

    fn show_transcript(&self, text: &str) {
        self.section("Transcript", text);
    }

    fn show_keywords(&self, text: &str) {
        if !text.is_empty() {
            self.section("Segments", text);
        }
    }

    fn show_gallery(&self, images: &[GalleryImage]) {
        if images.is_empty() {
            return;
        }
        let body = images
            .iter()
            .map(|image| format!("{} {}", image.title, style(&image.url).dim()))
            .collect::<Vec<_>>()
            .join("\n");
        self.section("Images", &body);
    }

    fn show_current_segment(&self, panel: &SegmentPanel) {
        let mut last = self.last_panel.lock().expect("panel poisoned");
        if last.as_ref() == Some(panel) {
            return;
        }
        *last = Some(panel.clone());
        drop(last);

        self.emit(format!("{} {}", style("▶").green().bold(), panel_line(panel)));
    }

    fn show_player_time(&self, text: &str) {
        debug!("{}", text);
    }

    fn show_player_status(&self, text: &str) {
        self.emit(format!("{} {}", style("!").yellow().bold(), text));
    }

    fn set_generation_overlay(&self, visible: bool) {
        let mut overlay = self.overlay.lock().expect("overlay poisoned");
        match (visible, overlay.take()) {
            (true, None) => *overlay = Some(create_spinner(GENERATING)),
            (true, Some(spinner)) => *overlay = Some(spinner),
            (false, Some(spinner)) => spinner.finish_and_clear(),
            (false, None) => {}
        }
    }

    fn set_player_visible(&self, visible: bool) {
        debug!("player visible: {}", visible);
    }
}
