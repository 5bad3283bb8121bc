use async_trait::async_trait;
use log::info;

/// Spoken status sink. Announcements are strictly best-effort: an
/// implementation must swallow its own failures and never delay or abort the
/// capture sequence.
#[async_trait]
pub trait Announcer: Send {
    async fn say(&mut self, text: &str);
}

/// Announcer used with `--no-speech`: the text still reaches the log so the
/// session transcript is complete.
pub struct NullAnnouncer;

#[async_trait]
impl Announcer for NullAnnouncer {
    async fn say(&mut self, text: &str) {
        info!("🔇 (speech disabled) {}", text);
    }
}
