pub mod fs;
pub mod migrations;
pub mod platform;
pub mod presenters;
pub mod sqlite;

pub use fs::{FsObjectStore, JsonFileSessionStore, SystemClock};
pub use platform::PlatformClient;
pub use presenters::{
    present_notice, present_photo, present_problem, present_progress, present_sync_report,
    present_view,
};
pub use sqlite::SqliteSurveyStore;
