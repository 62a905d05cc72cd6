pub mod store;
pub mod update;

pub use store::ProgressStore;
pub use update::{apply_juz_change, load_progress, set_juz_completion, JuzUpdate, UpdateOutcome};
