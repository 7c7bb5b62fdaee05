//! Background draining of a single byte stream.
//!
//! A [`StreamDrain`] owns a reader and copies it into memory on its own
//! thread, starting the moment it is constructed. Child pipes must be drained
//! while the parent waits for exit; otherwise a child that fills the pipe
//! buffer blocks forever and so does the parent.

use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Size of the read buffer used by each drain thread.
pub const DRAIN_BUFFER_SIZE: usize = 10 * 1024;

struct Drained {
    bytes: Vec<u8>,
    error: Option<io::Error>,
}

/// Drains one readable stream into an in-memory buffer.
pub struct StreamDrain {
    name: &'static str,
    handle: Option<JoinHandle<Drained>>,
    done: Receiver<()>,
    data: Vec<u8>,
}

impl StreamDrain {
    /// Starts draining `reader` on a new thread.
    ///
    /// `name` identifies the stream ("stdout", "stderr") in diagnostics.
    pub fn spawn<R>(name: &'static str, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, done) = mpsc::channel();
        // The sender drops on return or panic, which also wakes the receiver.
        let handle = thread::spawn(move || {
            let drained = drain(reader);
            let _ = tx.send(());
            drained
        });
        Self {
            name,
            handle: Some(handle),
            done,
            data: Vec::new(),
        }
    }

    /// Returns the name of the drained stream.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true once the drain thread has stopped reading.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Waits until the stream reaches end of file or `deadline` passes.
    ///
    /// Returns true if the drain finished. A finished drain can be read with
    /// [`StreamDrain::data`] without blocking.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        if self.handle.is_none() {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.done.recv_timeout(remaining) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }

    /// Blocks until the stream is fully drained and returns its contents.
    ///
    /// A read failure does not surface as an error: its text is appended to
    /// the bytes read before the failure. Later calls return the same bytes.
    pub fn data(&mut self) -> &[u8] {
        if let Some(handle) = self.handle.take() {
            self.data = match handle.join() {
                Ok(Drained { mut bytes, error }) => {
                    if let Some(err) = error {
                        tracing::warn!(stream = self.name, error = %err, "stream drain failed");
                        append_failure(&mut bytes, self.name, &err.to_string());
                    }
                    bytes
                }
                Err(_) => {
                    let mut bytes = Vec::new();
                    append_failure(&mut bytes, self.name, "drain thread panicked");
                    bytes
                }
            };
        }
        &self.data
    }

    /// Consumes the drain, blocking until it finishes, and returns its contents.
    pub fn into_data(mut self) -> Vec<u8> {
        self.data();
        std::mem::take(&mut self.data)
    }
}

impl std::fmt::Debug for StreamDrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDrain")
            .field("name", &self.name)
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn drain<R: Read>(mut reader: R) -> Drained {
    let mut bytes = Vec::new();
    let mut buf = [0u8; DRAIN_BUFFER_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Drained { bytes, error: None },
            Ok(n) => bytes.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Drained {
                    bytes,
                    error: Some(e),
                }
            }
        }
    }
}

fn append_failure(bytes: &mut Vec<u8>, stream: &str, message: &str) {
    if !bytes.is_empty() && !bytes.ends_with(b"\n") {
        bytes.push(b'\n');
    }
    bytes.extend_from_slice(format!("[{} drain failed: {}]\n", stream, message).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    /// Yields a fixed prefix, then fails.
    struct FailingReader {
        prefix: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.prefix.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe went away"))
        }
    }

    /// Reports `Interrupted` once before every real read.
    struct InterruptingReader {
        inner: Cursor<Vec<u8>>,
        interrupt_next: bool,
    }

    impl Read for InterruptingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt_next = !self.interrupt_next;
            if self.interrupt_next {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_drains_empty_stream() {
        let mut drain = StreamDrain::spawn("stdout", io::empty());
        assert!(drain.data().is_empty());
        assert!(drain.is_finished());
    }

    #[test]
    fn test_drains_more_than_one_buffer() {
        let input: Vec<u8> = (0..DRAIN_BUFFER_SIZE * 3 + 17)
            .map(|i| (i % 251) as u8)
            .collect();
        let drain = StreamDrain::spawn("stdout", Cursor::new(input.clone()));
        assert_eq!(drain.into_data(), input);
    }

    #[test]
    fn test_data_is_idempotent() {
        let mut drain = StreamDrain::spawn("stderr", Cursor::new(b"warning: x\n".to_vec()));
        let first = drain.data().to_vec();
        let second = drain.data().to_vec();
        assert_eq!(first, b"warning: x\n");
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_failure_is_rendered_into_data() {
        let reader = FailingReader {
            prefix: Cursor::new(b"partial".to_vec()),
        };
        let mut drain = StreamDrain::spawn("stderr", reader);
        let text = String::from_utf8_lossy(drain.data()).into_owned();
        assert!(text.starts_with("partial\n"));
        assert!(text.contains("[stderr drain failed: pipe went away]"));

        // Rendering happens once.
        let again = String::from_utf8_lossy(drain.data()).into_owned();
        assert_eq!(text, again);
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let reader = InterruptingReader {
            inner: Cursor::new(b"abc".to_vec()),
            interrupt_next: false,
        };
        let drain = StreamDrain::spawn("stdout", reader);
        assert_eq!(drain.into_data(), b"abc");
    }

    /// Blocks in `read` until the paired sender is dropped.
    struct BlockingReader {
        release: mpsc::Receiver<()>,
    }

    impl Read for BlockingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.release.recv();
            Ok(0)
        }
    }

    #[test]
    fn test_wait_until_times_out_on_open_stream() {
        let (release, rx) = mpsc::channel::<()>();
        let mut drain = StreamDrain::spawn("stdout", BlockingReader { release: rx });

        let start = Instant::now();
        assert!(!drain.wait_until(start + Duration::from_millis(100)));
        assert!(start.elapsed() < Duration::from_secs(2));

        drop(release);
        assert!(drain.wait_until(Instant::now() + Duration::from_secs(5)));
        assert!(drain.data().is_empty());
    }

    #[test]
    fn test_wait_until_after_data_returns_immediately() {
        let mut drain = StreamDrain::spawn("stdout", Cursor::new(b"x".to_vec()));
        assert_eq!(drain.data(), b"x");
        assert!(drain.wait_until(Instant::now()));
    }

    #[test]
    fn test_wait_until_reports_panicked_drain_as_finished() {
        struct PanickingReader;
        impl Read for PanickingReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                panic!("reader exploded");
            }
        }

        let mut drain = StreamDrain::spawn("stderr", PanickingReader);
        assert!(drain.wait_until(Instant::now() + Duration::from_secs(5)));
        let text = String::from_utf8_lossy(drain.data()).into_owned();
        assert!(text.contains("[stderr drain failed: drain thread panicked]"));
    }

    #[test]
    fn test_debug_includes_name() {
        let drain = StreamDrain::spawn("stdout", io::empty());
        assert!(format!("{:?}", drain).contains("stdout"));
    }
}
