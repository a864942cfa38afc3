//! Output sinks for `PRINT`.
//!
//! The machine borrows a sink for the length of a run and never owns the
//! underlying stream. `Vec<u8>` works everywhere; the `std` feature adds
//! [`IoSink`] for anything implementing `std::io::Write`.

use crate::{String, Vec, format};

use super::instruction_set::Value;

/// Error reported by a sink that could not accept output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError(pub String);

/// Destination for bytes written by `PRINT`.
pub trait OutputSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError>;
}

impl OutputSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).write_bytes(bytes)
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write_bytes(&mut self, _bytes: &[u8]) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Adapter from `std::io::Write` to [`OutputSink`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSink<W>(pub W);

#[cfg(feature = "std")]
impl<W: std::io::Write> OutputSink for IoSink<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.0
            .write_all(bytes)
            .map_err(|e| SinkError(e.to_string()))
    }
}

/// Writes `value` the way `PRINT` does: ASCII values (printable or control,
/// `0..=127`) as that single byte, anything else as decimal text. No
/// separator is added.
pub fn write_value<S: OutputSink + ?Sized>(sink: &mut S, value: Value) -> Result<(), SinkError> {
    match u8::try_from(value) {
        Ok(byte) if byte.is_ascii() => sink.write_bytes(&[byte]),
        _ => sink.write_bytes(format!("{}", value).as_bytes()),
    }
}
