//! OCR through an external program such as `tesseract`.

use std::io::{ErrorKind, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use belge_core::models::config::OcrConfig;
use belge_core::{CancellationToken, OcrError, OcrProvider};

/// How often a running OCR program is checked for exit, timeout or cancel.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs an external program that reads an image on stdin and prints text.
///
/// The program is killed once `timeout` elapses or the cancel token fires,
/// so a hung OCR run never outlives the command that started it.
pub struct CommandOcr {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    cancel: Option<CancellationToken>,
}

impl CommandOcr {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: OcrConfig::default().timeout(),
            cancel: None,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.command.clone(), config.command_args()).with_timeout(config.timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kill the running program when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    fn kill(&self, child: &mut Child) {
        if let Err(e) = child.kill() {
            warn!("Failed to kill {}: {}", self.command, e);
        }
        // Reap the child. Reader threads are left detached: a grandchild may
        // still hold the pipes open.
        let _ = child.wait();
    }
}

fn read_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl OcrProvider for CommandOcr {
    fn name(&self) -> &str {
        &self.command
    }

    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let format = image::guess_format(image)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        debug!(
            "Sending {:?} image ({} bytes) to {} {}",
            format,
            image.len(),
            self.command,
            self.args.join(" ")
        );

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    OcrError::Unavailable(format!("{} is not installed", self.command))
                }
                _ => OcrError::Unavailable(format!("failed to start {}: {}", self.command, e)),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Recognition("stdin not captured".to_string()))?;

        // Pipes are serviced from their own threads so neither side can fill up and stall.
        let bytes = image.to_vec();
        let writer = thread::spawn(move || stdin.write_all(&bytes));
        let stdout = read_pipe(child.stdout.take());
        let stderr = read_pipe(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    self.kill(&mut child);
                    return Err(OcrError::Recognition(format!("{}: {}", self.command, e)));
                }
            }

            if self.is_cancelled() {
                debug!("Cancelled, killing {}", self.command);
                self.kill(&mut child);
                return Err(OcrError::Recognition(format!("{} cancelled", self.command)));
            }

            if Instant::now() >= deadline {
                debug!("{} still running after {:?}, killing it", self.command, self.timeout);
                self.kill(&mut child);
                return Err(OcrError::Timeout(self.timeout.as_secs()));
            }

            thread::sleep(POLL_INTERVAL);
        };

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("{} closed stdin early: {}", self.command, e),
            Err(_) => return Err(OcrError::Recognition("stdin writer panicked".to_string())),
        }

        let stdout = stdout
            .join()
            .map_err(|_| OcrError::Recognition("stdout reader panicked".to_string()))?;
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(OcrError::Recognition(format!(
                "{} exited with {}: {}",
                self.command,
                status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }
}
