pub mod profile;
pub mod shooting_mode;
