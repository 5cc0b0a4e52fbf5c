pub mod recording;
pub mod reporting;
pub mod selection;

pub use recording::RecordingService;
pub use reporting::ReportingService;
pub use selection::SelectionService;
