/// What the "current segment" side panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentPanel {
    Placeholder,
    Active {
        label: String,
        image_url: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
    pub title: String,
}

/// Presentation sinks, one per region of the viewer.
pub trait View: Send + Sync + 'static {
    fn show_input_error(&self, message: &str);
    fn show_transcript(&self, text: &str);
    fn show_keywords(&self, text: &str);
    fn show_gallery(&self, images: &[GalleryImage]);
    fn show_current_segment(&self, panel: &SegmentPanel);
    fn show_player_time(&self, text: &str);
    fn show_player_status(&self, text: &str);
    fn set_generation_overlay(&self, visible: bool);
    fn set_player_visible(&self, visible: bool);
}
