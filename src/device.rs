//! Serial-device input: a background reader that decodes text lines into
//! [`Command`]s and queues them for the frame loop.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::command::Command;
use crate::error::DeviceError;

pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout on the port; bounds how long cancellation takes to notice.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

pub struct DeviceReader {
    name: String,
    rx: Receiver<Command>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DeviceReader {
    /// Opens a serial port and starts reading from it.
    pub fn connect(path: &str, baud_rate: u32) -> Result<Self, DeviceError> {
        let port = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| DeviceError::Open {
                path: path.to_string(),
                source,
            })?;
        info!(path, baud_rate, "serial device connected");
        Self::spawn(path, port)
    }

    /// Starts a reader thread over any byte stream.
    pub fn spawn<R>(name: &str, source: R) -> Result<Self, DeviceError>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let thread_cancel = Arc::clone(&cancel);
        let thread_name = name.to_string();

        let handle = thread::Builder::new()
            .name("serial-reader".into())
            .spawn(move || read_loop(&thread_name, source, tx, thread_cancel))?;

        Ok(Self {
            name: name.to_string(),
            rx,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drains every command queued since the last call.
    pub fn poll_commands(&mut self) -> Vec<Command> {
        self.rx.try_iter().collect()
    }

    /// Blocks up to `timeout` for the next command.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Command> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// False once the reader thread has exited (EOF, I/O error or cancel).
    pub fn is_connected(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the reader to stop and waits for it.
    pub fn stop(mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DeviceReader {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

fn read_loop<R: Read>(name: &str, source: R, tx: Sender<Command>, cancel: Arc<AtomicBool>) {
    let mut reader = BufReader::new(source);
    let mut line = Vec::new();

    while !cancel.load(Ordering::Relaxed) {
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                if !line.is_empty() && !dispatch(&line, &tx) {
                    break;
                }
                info!(device = name, "serial device closed");
                break;
            }
            Ok(_) => {
                if line.ends_with(b"\n") {
                    let delivered = dispatch(&line, &tx);
                    line.clear();
                    if !delivered {
                        break;
                    }
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                warn!(device = name, error = %e, "serial read failed");
                break;
            }
        }
    }

    debug!(device = name, "serial reader stopped");
}

/// Sends the decoded command, if any. Returns false when the receiver is gone.
fn dispatch(line: &[u8], tx: &Sender<Command>) -> bool {
    let text = String::from_utf8_lossy(line);
    match Command::from_device_token(&text) {
        Some(command) => {
            trace!(%command, "device command");
            tx.send(command).is_ok()
        }
        None => {
            trace!(token = %text.trim(), "ignored device token");
            true
        }
    }
}
