pub mod load;
pub mod save;
pub mod types;

pub use load::{SETTINGS_FILE, load_settings};
pub use save::{add_recent_path, save_settings, save_settings_to};
pub use types::{Config, FileTypeTable, MAX_RECENT_PATHS, PosterSettings, UserSettings};
