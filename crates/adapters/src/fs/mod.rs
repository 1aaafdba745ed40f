mod bucket;
mod clock;
mod session_file;

pub use bucket::FsObjectStore;
pub use clock::SystemClock;
pub use session_file::JsonFileSessionStore;
