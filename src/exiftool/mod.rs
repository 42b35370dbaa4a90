//! Client for a long-lived `exiftool -stay_open` child process.
//!
//! One process is shared across a whole batch of files to amortize the
//! (considerable) interpreter startup cost. A request is a newline-separated
//! argument list terminated by `-execute`; the response is everything up to
//! the `{ready}` sentinel, parsed as a JSON array of grouped tag objects.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde_json::{Map, Value};

use crate::types::errors::{ScanError, ScanResult};


/// Terminator exiftool prints after every `-execute`.
const SENTINEL: &[u8] = b"{ready}\n";

/// Grouped tag names, JSON output, numeric values.
const COMMON_ARGS: &[&str] = &["-G1", "-j", "-n"];

/// Handle to a running exiftool process. Dropping the handle asks the
/// process to shut down and reaps it, so a batch scope can never leak the
/// subprocess, error or not.
#[derive(Debug)]
pub struct ExifTool {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: ChildStdout,
}

impl ExifTool {
    /// Start the stay-open process. Failure here means the executable is
    /// missing or not runnable; callers degrade the whole batch.
    pub fn spawn(executable: &Path) -> ScanResult<Self> {
        let mut child = Command::new(executable)
            .args(["-stay_open", "True", "-@", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ScanError::ExternalProcessUnavailable(format!(
                    "failed to start {}: {e}",
                    executable.display()
                ))
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            ScanError::ExternalProcessUnavailable("no stdin pipe to exiftool".into())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ScanError::ExternalProcessUnavailable("no stdout pipe to exiftool".into())
        })?;

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout,
        })
    }

    /// Send one request and read the raw response up to (excluding) the
    /// sentinel. There is no timeout: a hung process blocks the pipeline,
    /// which is an accepted limitation of the stay-open protocol.
    pub fn execute(&mut self, args: &[&str]) -> ScanResult<Vec<u8>> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ScanError::ExternalProcessUnavailable(
                "exiftool stdin already closed".into(),
            ));
        };

        let mut request = args.join("\n");
        request.push_str("\n-execute\n");
        stdin
            .write_all(request.as_bytes())
            .map_err(|e| ScanError::ExternalProcessUnavailable(format!("request write: {e}")))?;
        stdin
            .flush()
            .map_err(|e| ScanError::ExternalProcessUnavailable(format!("request flush: {e}")))?;

        let mut output = Vec::new();
        let mut chunk = [0u8; 4096];
        while !output.ends_with(SENTINEL) {
            let n = self
                .stdout
                .read(&mut chunk)
                .map_err(|e| ScanError::ExternalProcessUnavailable(format!("response read: {e}")))?;
            if n == 0 {
                return Err(ScanError::ExternalProcessUnavailable(
                    "exiftool closed its output before the ready sentinel".into(),
                ));
            }
            output.extend_from_slice(&chunk[..n]);
        }
        output.truncate(output.len() - SENTINEL.len());
        Ok(output)
    }

    /// Grouped key → value metadata for one file (first response element).
    pub fn get_metadata(&mut self, path: &Path) -> ScanResult<Map<String, Value>> {
        let path_arg = path.to_string_lossy();
        let mut args = COMMON_ARGS.to_vec();
        args.push(path_arg.as_ref());
        let response = self.execute(&args)?;
        parse_response(&response)
    }
}

impl Drop for ExifTool {
    fn drop(&mut self) {
        if let Some(mut stdin) = self.stdin.take() {
            let _ = stdin.write_all(b"-stay_open\nFalse\n");
            let _ = stdin.flush();
            // Closing the pipe here doubles as EOF for processes that never
            // understood the stay-open command.
        }
        let _ = self.child.wait();
    }
}

/// Parse a sentinel-stripped response body: a JSON array of per-file tag
/// objects, of which the first is the requested file.
pub(crate) fn parse_response(body: &[u8]) -> ScanResult<Map<String, Value>> {
    let parsed: Vec<Map<String, Value>> = serde_json::from_slice(body)
        .map_err(|e| ScanError::ExternalProcessUnavailable(format!("garbled response: {e}")))?;
    parsed
        .into_iter()
        .next()
        .ok_or_else(|| ScanError::PartialMetadata("empty exiftool response".into()))
}
