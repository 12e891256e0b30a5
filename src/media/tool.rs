use std::io::Read as _;
use std::path::Path;
use std::process::{ChildStderr, Command, Stdio};
use std::thread::JoinHandle;

/// Handle to a thread collecting a child's stderr.
pub(crate) type StderrDrain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Return `true` when `program -version` runs successfully.
pub fn is_tool_available(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Drain stderr concurrently so the child never blocks on a full pipe.
pub(crate) fn spawn_stderr_drain(mut stderr: ChildStderr) -> StderrDrain {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stderr.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

/// Join a drain thread and return the captured text (lossy, trimmed).
pub(crate) fn join_stderr(drain: Option<StderrDrain>) -> String {
    let Some(handle) = drain else {
        return String::new();
    };
    match handle.join() {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Ok(Err(e)) => format!("<failed to read stderr: {e}>"),
        Err(_) => "<stderr drain thread panicked>".to_string(),
    }
}
