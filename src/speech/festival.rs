use crate::speech::announcer::Announcer;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

/// Text-to-speech through a persistent `festival --pipe` subprocess.
///
/// The child is spawned lazily on the first announcement and kept alive for
/// the whole session so repeated cues do not pay synthesis startup cost. Any
/// pipe or spawn failure is logged and swallowed; the child handle is dropped
/// so the next announcement retries with a fresh process.
pub struct FestivalAnnouncer {
    command: String,
    child: Option<Child>,
}

impl FestivalAnnouncer {
    pub fn new(command: &str) -> Self {
        FestivalAnnouncer {
            command: command.to_string(),
            child: None,
        }
    }

    fn ensure_child(&mut self) -> std::io::Result<&mut Child> {
        if self.child.is_none() {
            debug!("🗣️ Spawning speech process: {} --pipe", self.command);
            let child = Command::new(&self.command)
                .arg("--pipe")
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()?;
            self.child = Some(child);
        }
        self.child.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "speech process unavailable")
        })
    }

    async fn try_say(&mut self, text: &str) -> std::io::Result<()> {
        let line = say_line(text);
        let child = self.ensure_child()?;
        let stdin = child.stdin.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "speech stdin not piped")
        })?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Announcer for FestivalAnnouncer {
    async fn say(&mut self, text: &str) {
        info!("📢 {}", text);
        if let Err(e) = self.try_say(text).await {
            warn!(
                "⚠️ Speech announcement failed ('{}'): {}. Continuing without speech; will respawn on next cue.",
                text, e
            );
            if let Some(mut child) = self.child.take() {
                // Best-effort reap so a half-dead speech process cannot
                // linger as an orphan.
                let _ = child.start_kill();
            }
        }
    }
}

/// Scheme expression the speech tool reads from its pipe. Double quotes
/// would terminate the string literal early, so they are stripped.
fn say_line(text: &str) -> String {
    format!("(SayText \"{}\")\n", text.replace('"', ""))
}
