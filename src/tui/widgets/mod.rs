pub mod community;
pub mod completed;
pub mod header;
pub mod juz_grid;
pub mod progress;
pub mod statusbar;
