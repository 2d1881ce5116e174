//! Runs external tools with a piped stdin and a wall-clock limit.
use std::{
    io::{Read, Write},
    path::Path,
    process::{Command, Stdio},
    thread,
    time::Duration,
};

use crossbeam_channel::{after, bounded, select};

/// What a finished process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Finished {
    pub(crate) stdout: String,
    pub(crate) stderr: String,
    pub(crate) code: Option<i32>,
}

#[derive(Debug)]
pub(crate) enum RunError {
    /// The executable could not be started.
    Spawn(std::io::Error),
    /// The limit elapsed and the process was killed.
    Timeout,
    /// Reading from or writing to the process failed.
    Io(std::io::Error),
}

fn drain(mut source: impl Read) -> std::io::Result<String> {
    let mut buffer = String::new();
    source.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Starts `program`, feeds `input` to its stdin and collects its output.
/// The process is killed if it does not finish within `timeout`.
pub(crate) fn run(
    program: &Path,
    args: &[String],
    input: String,
    timeout: Duration,
) -> Result<Finished, RunError> {
    log::debug!("[Start] {} {}", program.display(), args.join(" "));
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(RunError::Spawn)?;

    let stdin = child.stdin.take();
    let writer = thread::spawn(move || -> std::io::Result<()> {
        if let Some(mut stdin) = stdin {
            stdin.write_all(input.as_bytes())?;
        }
        Ok(())
    });
    let stderr = child.stderr.take();
    let errors = thread::spawn(move || stderr.map(drain).transpose());
    let (sender, receiver) = bounded(1);
    let stdout = child.stdout.take();
    thread::spawn(move || {
        // the receiver is gone after a timeout
        let _ = sender.send(stdout.map(drain).transpose());
    });

    let stdout = select! {
        recv(receiver) -> message => message
            .map_err(|_| RunError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "output reader vanished")))?
            .map_err(RunError::Io)?
            .unwrap_or_default(),
        recv(after(timeout)) -> _ => {
            log::info!("{} exceeded {:?}, killing it", program.display(), timeout);
            let _ = child.kill();
            let _ = child.wait();
            return Err(RunError::Timeout);
        }
    };
    let status = child.wait().map_err(RunError::Io)?;
    match writer.join() {
        Ok(Err(err)) if err.kind() != std::io::ErrorKind::BrokenPipe => return Err(RunError::Io(err)),
        _ => {}
    }
    let stderr = errors
        .join()
        .ok()
        .and_then(Result::ok)
        .flatten()
        .unwrap_or_default();
    log::debug!("[Done] {} exited with {:?}", program.display(), status.code());
    Ok(Finished {
        stdout,
        stderr,
        code: status.code(),
    })
}

#[cfg(all(test, unix))]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn echo() {
        let finished = run(Path::new("cat"), &[], "hello".into(), Duration::from_secs(10)).unwrap();
        assert_eq!(finished.stdout, "hello");
        assert_eq!(finished.code, Some(0));
    }

    #[test]
    fn missing() {
        assert!(matches!(
            run(
                Path::new("surely-not-an-installed-tool"),
                &[],
                String::new(),
                Duration::from_secs(1)
            ),
            Err(RunError::Spawn(_))
        ));
    }

    #[test]
    fn timeout() {
        assert!(matches!(
            run(
                Path::new("sleep"),
                &["5".to_string()],
                String::new(),
                Duration::from_millis(50)
            ),
            Err(RunError::Timeout)
        ));
    }
}
