pub mod announcer;
pub mod festival;
