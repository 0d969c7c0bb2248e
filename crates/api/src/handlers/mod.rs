pub mod progress;
pub mod short_form_progress;
pub mod video_progress;
