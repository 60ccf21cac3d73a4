use crate::types::CaseError;
use crate::{t, t_args};
use anyhow::{Result, anyhow};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// 30 seconds per spec file
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw result of one compiler run.
#[derive(Debug, Clone, Default)]
pub struct CompilerOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
}

pub trait Compiler {
    /// Run the compiler on one spec file and capture its output.
    fn run(&self, spec: &Path) -> Result<CompilerOutput, CaseError>;
    /// Check that the compiler can be started at all.
    fn validate(&self) -> Result<()>;
}

/// The compiler as an external executable, invoked as `<executable> <spec>`.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    pub executable: String,
    pub timeout: Option<Duration>,
    pub quiet: bool, // do not log compiler stderr
}

impl ExternalCompiler {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            timeout: Some(DEFAULT_TIMEOUT),
            quiet: false,
        }
    }

    /// Full path of the executable, looked up in PATH for bare names.
    pub fn resolve(&self) -> Option<PathBuf> {
        let path = Path::new(&self.executable);
        if path.components().count() > 1 {
            return path.is_file().then(|| path.to_path_buf());
        }
        which::which(&self.executable).ok()
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>, CaseError> {
    handle
        .join()
        .map_err(|_| CaseError::Io(t!("backend-reader-panicked")))?
        .map_err(|e| CaseError::Io(e.to_string()))
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl Compiler for ExternalCompiler {
    fn run(&self, spec: &Path) -> Result<CompilerOutput, CaseError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let mut child = Command::new(&self.executable)
            .arg(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CaseError::Spawn {
                cmd: self.executable.clone(),
                reason: e.to_string(),
            })?;

        // Drain both pipes while waiting so a chatty compiler cannot block on a full pipe
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                reap(&mut child);
                let _ = (stdout.join(), stderr.join());
                return Err(CaseError::Timeout(timeout));
            }
            Err(e) => {
                reap(&mut child);
                return Err(CaseError::Io(e.to_string()));
            }
        };

        let output = CompilerOutput {
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
            exit_code: status.code(),
        };

        if !status.success() {
            debug!(spec = %spec.display(), %status, "compiler exited unsuccessfully");
        }
        if !self.quiet && !output.stderr.is_empty() {
            debug!(
                spec = %spec.display(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "compiler stderr"
            );
        }
        Ok(output)
    }

    fn validate(&self) -> Result<()> {
        match self.resolve() {
            Some(path) => {
                debug!(path = %path.display(), "resolved compiler");
                Ok(())
            }
            None => Err(anyhow!(t_args!("backend-compiler-not-found", "cmd" => &self.executable))),
        }
    }
}
