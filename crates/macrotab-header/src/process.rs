//! Child process execution with a bounded timeout

use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use macrotab_core::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `cmd` to completion, killing it once `timeout` elapses.
///
/// A command that cannot be spawned or does not finish in time is reported
/// as [`Error::ToolchainUnavailable`]. A non-zero exit is not an error here;
/// callers inspect `status` themselves.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    debug!("Running {:?}", cmd);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::ToolchainUnavailable(format!("cannot run {}: {}", program, e)))?;

    // Drain both pipes so a chatty child never blocks on a full buffer.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                reap(&mut child);
                return Err(e.into());
            }
        }
        if Instant::now() >= deadline {
            warn!("{} did not finish within {:?}, killing it", program, timeout);
            reap(&mut child);
            return Err(Error::ToolchainUnavailable(format!(
                "{} timed out after {:?}",
                program, timeout
            )));
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

/// Kill `child` and wait for it so no zombie is left behind.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill failed: {}", e);
    }
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
