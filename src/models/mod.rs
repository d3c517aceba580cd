pub mod history;
pub mod time;
pub mod vocabulary;
pub mod window;

pub use history::*;
pub use vocabulary::{normalize_status, StatusVocabulary, VocabularyError};
pub use window::{TimeWindow, WindowError};
