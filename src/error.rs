//! The single error type shared by every fallible operation in the
//! crate.  Everything that can go wrong does so before the first
//! worker starts, with the exception of writing the finished image.

use std::io;

/// Things that can stop a render from starting, or stop a finished
/// render from reaching the disk.
#[derive(Debug, Fail)]
pub enum FractalError {
    /// A render parameter is out of range.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfig(String),

    /// The bounds of a plane are inverted or empty.
    #[fail(display = "invalid plane: {}", _0)]
    InvalidPlane(String),

    /// The gradient specification could not be parsed.
    #[fail(display = "invalid gradient: {}", _0)]
    InvalidGradient(String),

    /// No fractal family goes by this name.
    #[fail(display = "unknown fractal: {}", _0)]
    UnknownFractal(String),

    /// No colouring mode goes by this name.
    #[fail(display = "unknown colour mode: {}", _0)]
    UnknownColourMode(String),

    /// A worker thread died before the grid was complete.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,

    /// The finished image could not be written.
    #[fail(display = "could not write image: {}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for FractalError {
    fn from(err: io::Error) -> FractalError {
        FractalError::Io(err)
    }
}
