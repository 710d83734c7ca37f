//! External transcoder invocation.

use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::TranscodeSettings;
use crate::error::SyncError;

/// How a transcode ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TranscodeStatus {
    /// The process exited; `None` when it was terminated by a signal.
    Exited(Option<i32>),
    /// The process was killed after running longer than allowed.
    TimedOut(Duration),
}

impl TranscodeStatus {
    pub fn is_success(self) -> bool {
        self == TranscodeStatus::Exited(Some(0))
    }
}

/// Produces `target` from `source`. `Err` means the transcoder could not be run at all.
pub trait Transcoder {
    fn transcode(&self, source: &Path, target: &Path) -> Result<TranscodeStatus, SyncError>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs an external program built from an argument template.
#[derive(Debug, Clone)]
pub struct CommandTranscoder {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandTranscoder {
    pub fn new(settings: &TranscodeSettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// Substitute `{input}` / `{output}` in the argument template.
    pub(crate) fn render_args(&self, source: &Path, target: &Path) -> Vec<String> {
        let input = source.to_string_lossy();
        let output = target.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }
}

impl Transcoder for CommandTranscoder {
    fn transcode(&self, source: &Path, target: &Path) -> Result<TranscodeStatus, SyncError> {
        let args = self.render_args(source, target);
        debug!("{} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SyncError::io(&self.program, e))?;

        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(TranscodeStatus::Exited(status.code())),
                Ok(None) if started.elapsed() >= self.timeout => {
                    if let Err(e) = child.kill() {
                        warn!("failed to kill {} for {}: {e}", self.program, source.display());
                    }
                    // Reap it so no zombie outlives the run.
                    let _ = child.wait();
                    return Ok(TranscodeStatus::TimedOut(self.timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(SyncError::io(source, e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn transcoder(program: &str, args: &[&str], timeout_secs: u64) -> CommandTranscoder {
        CommandTranscoder::new(&TranscodeSettings {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            target_extension: "mp3".to_string(),
            timeout_secs,
        })
    }

    #[test]
    fn default_template_places_input_and_output() {
        let t = CommandTranscoder::new(&TranscodeSettings::default());
        let args = t.render_args(Path::new("/src/a b.m4a"), Path::new("/dst/a b.mp3"));
        assert_eq!(
            args,
            vec![
                "-y",
                "-loglevel",
                "quiet",
                "-i",
                "/src/a b.m4a",
                "-id3v2_version",
                "3",
                "/dst/a b.mp3"
            ]
        );
    }

    #[test]
    fn missing_program_is_an_error() {
        let t = transcoder("/nonexistent/tagmirror-transcoder", &["{input}", "{output}"], 5);
        let err = t
            .transcode(&PathBuf::from("/a.m4a"), &PathBuf::from("/a.mp3"))
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_observed() {
        let ok = transcoder("sh", &["-c", "exit 0", "{input}", "{output}"], 5);
        assert!(ok.transcode(Path::new("a"), Path::new("b")).unwrap().is_success());

        let failing = transcoder("sh", &["-c", "exit 3", "{input}", "{output}"], 5);
        assert_eq!(
            failing.transcode(Path::new("a"), Path::new("b")).unwrap(),
            TranscodeStatus::Exited(Some(3))
        );
    }

    #[cfg(unix)]
    #[test]
    fn hung_transcoder_is_killed_after_the_timeout() {
        let t = transcoder("sh", &["-c", "sleep 30", "{input}", "{output}"], 1);
        let started = Instant::now();
        let status = t.transcode(Path::new("a"), Path::new("b")).unwrap();
        assert_eq!(status, TranscodeStatus::TimedOut(Duration::from_secs(1)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
