mod keys;
mod store;

pub use keys::{ProgressKind, THEME_KEY};
pub use store::{ProgressStore, SubjectProgress};
