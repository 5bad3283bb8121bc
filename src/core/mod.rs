pub mod capture_shell;
pub mod scheduler;
pub mod sequencer;
