//! Tracing subscriber setup for the harness server and sandbox client.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use ansi_term::Colour;
pub use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::MakeWriter;

const LOG_FILTER: &str = "RUST_LOG";

pub fn println_red(txt: &str) {
    tracing::info!("{}", Colour::Red.paint(txt));
}

pub fn println_green(txt: &str) {
    tracing::info!("{}", Colour::Green.paint(txt));
}

pub fn println_yellow_err(txt: &str) {
    tracing::error!("{}", Colour::Yellow.paint(txt));
}

pub fn println_red_err(txt: &str) {
    tracing::error!("{}", Colour::Red.paint(txt));
}

/// Where formatted log lines are written.
enum Destination {
    Stdout,
    File(Arc<File>),
}

/// `MakeWriter` impl routing every log line to stdout, or to a single
/// append-only file when `Config.log_location` is set.
struct HarnessTracingWriter {
    destination: Destination,
}

impl HarnessTracingWriter {
    fn new(log_location: Option<&PathBuf>) -> io::Result<Self> {
        let destination = match log_location {
            None => Destination::Stdout,
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Destination::File(Arc::new(file))
            }
        };
        Ok(Self { destination })
    }
}

/// A `Write` handle sharing the underlying file descriptor across calls,
/// since `tracing_subscriber` asks for a fresh writer on every event.
struct SharedFile(Arc<File>);

impl io::Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self.0).flush()
    }
}

impl<'a> MakeWriter<'a> for HarnessTracingWriter {
    type Writer = Box<dyn io::Write>;

    fn make_writer(&'a self) -> Self::Writer {
        match &self.destination {
            Destination::Stdout => Box::new(io::stdout()),
            Destination::File(file) => Box::new(SharedFile(Arc::clone(file))),
        }
    }
}

/// Configures the global `tracing` subscriber for the lifetime of the
/// process. Honors `RUST_LOG` for level filtering, defaulting to `info`.
/// Logs human-readable lines to stdout, or to `log_location` when given.
pub fn init_tracing(log_location: Option<&PathBuf>) -> io::Result<()> {
    let writer = HarnessTracingWriter::new(log_location)?;
    let is_file = matches!(writer.destination, Destination::File(_));

    let env_filter = match std::env::var_os(LOG_FILTER) {
        Some(_) => EnvFilter::try_from_default_env().expect("invalid RUST_LOG value"),
        None => EnvFilter::new("info"),
    };

    tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_ansi(!is_file)
        .with_target(false)
        .with_writer(writer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn println_red_logs_the_message() {
        println_red("teardown failed");
        assert!(logs_contain("teardown failed"));
    }

    #[test]
    fn writer_for_missing_log_location_falls_back_to_stdout() {
        let writer = HarnessTracingWriter::new(None).unwrap();
        assert!(matches!(writer.destination, Destination::Stdout));
    }

    #[test]
    fn writer_for_log_location_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("harness.log");
        let writer = HarnessTracingWriter::new(Some(&path)).unwrap();
        assert!(matches!(writer.destination, Destination::File(_)));
        assert!(path.parent().unwrap().exists());
    }
}
