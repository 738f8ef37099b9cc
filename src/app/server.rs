// McWatch - app/server.rs
//
// Supervised server process. The command runs through the platform shell
// with stdin and stdout piped; stderr is inherited so the server's own
// error output stays visible.
//
// `ServerInput` is the write side of the console. It is cloneable so the
// Ctrl-C handler can send the stop command while the main thread is busy
// consuming output.

use crate::util::error::ServerError;
use std::io::Write;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};

/// Thread-safe writer for console commands.
#[derive(Clone)]
pub struct ServerInput {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ServerInput {
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write `text` followed by a newline and flush.
    pub fn send(&self, text: &str) -> Result<(), ServerError> {
        let mut writer = self.writer.lock().map_err(|_| ServerError::StdinPoisoned)?;
        writer
            .write_all(format!("{text}\n").as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| ServerError::Write {
                text: text.to_string(),
                source,
            })?;
        tracing::debug!(command = text, "Sent console command");
        Ok(())
    }
}

/// A running server child process.
pub struct ServerProcess {
    child: Child,
    input: ServerInput,
    command: String,
}

impl ServerProcess {
    /// Launch `command` through the platform shell.
    ///
    /// Returns the process together with its stdout, which the caller hands
    /// to a `LineFeed`.
    pub fn spawn(command: &str) -> Result<(Self, ChildStdout), ServerError> {
        let mut child = shell_command(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ServerError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or(ServerError::MissingPipe { pipe: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(ServerError::MissingPipe { pipe: "stdout" })?;

        tracing::info!(command, pid = child.id(), "Server process started");

        Ok((
            Self {
                child,
                input: ServerInput::new(stdin),
                command: command.to_string(),
            },
            stdout,
        ))
    }

    pub fn input(&self) -> ServerInput {
        self.input.clone()
    }

    /// Block until the server exits.
    pub fn wait(&mut self) -> Result<ExitStatus, ServerError> {
        let status = self
            .child
            .wait()
            .map_err(|source| ServerError::Wait { source })?;
        tracing::info!(command = %self.command, status = %status, "Server process exited");
        Ok(status)
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write sink whose contents the test can read back.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_appends_newline() {
        let buf = SharedBuf::default();
        let input = ServerInput::new(buf.clone());
        input.send("stop").unwrap();
        input.clone().send("say hi").unwrap();
        assert_eq!(&*buf.0.lock().unwrap(), b"stop\nsay hi\n");
    }

    #[test]
    fn test_send_reports_write_failure() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let input = ServerInput::new(Broken);
        assert!(matches!(
            input.send("stop"),
            Err(ServerError::Write { ref text, .. }) if text == "stop"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_pipes_stdout() {
        use std::io::Read;
        let (mut server, mut stdout) =
            ServerProcess::spawn("echo '[10:00:00] [Server thread/INFO]: Done (0.1s)!'").unwrap();
        let mut out = String::new();
        stdout.read_to_string(&mut out).unwrap();
        assert_eq!(out, "[10:00:00] [Server thread/INFO]: Done (0.1s)!\n");
        assert!(server.wait().unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn test_console_commands_reach_the_server() {
        use std::io::Read;
        let (mut server, mut stdout) = ServerProcess::spawn("read line; echo \"got $line\"").unwrap();
        server.input().send("stop").unwrap();
        let mut out = String::new();
        stdout.read_to_string(&mut out).unwrap();
        assert_eq!(out, "got stop\n");
        assert!(server.wait().unwrap().success());
    }
}
