//! Text and binary codecs for tabulated functions.
//!
//! Two on-disk layouts for the same data:
//!
//! - **Text**: `count x0 y0 x1 y1 ...`, whitespace separated. Human readable
//!   and hand editable, at the cost of size and parse time.
//! - **Binary**: big-endian `u32` point count followed by `f64` `(x, y)`
//!   pairs. Compact and lossless (no decimal round-trip).
//!
//! Both readers validate the point count and reuse
//! [`TabulatedFunction::from_points`], so a corrupt stream surfaces as a
//! [`CodecError`] rather than a malformed function.

use std::fmt;
use std::io::{self, Read, Write};

use super::tabulated::{FunctionPoint, TabulateError, TabulatedFunction};

/// Errors from reading or writing tabulated-function streams.
#[derive(Debug)]
#[non_exhaustive]
pub enum CodecError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// Stream ended before the declared number of points.
    UnexpectedEof { expected: usize, got: usize },
    /// Point count field is not a valid function size.
    InvalidPointCount { count: i64 },
    /// A token in the text format failed to parse as a number.
    MalformedNumber { token: String },
    /// Decoded points do not form a valid tabulated function.
    InvalidFunction(TabulateError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::UnexpectedEof { expected, got } => {
                write!(f, "stream ended after {got} of {expected} points")
            }
            Self::InvalidPointCount { count } => write!(f, "invalid point count: {count}"),
            Self::MalformedNumber { token } => write!(f, "malformed number: {token:?}"),
            Self::InvalidFunction(err) => write!(f, "decoded points invalid: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidFunction(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Write `function` in the text format.
pub fn write_text<W: Write>(function: &TabulatedFunction, out: &mut W) -> Result<(), CodecError> {
    write!(out, "{}", function.points_count())?;
    for p in function.points() {
        write!(out, " {} {}", p.x, p.y)?;
    }
    out.flush()?;
    Ok(())
}

/// Read a function in the text format.
pub fn read_text<R: Read>(input: &mut R) -> Result<TabulatedFunction, CodecError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    let mut tokens = text.split_whitespace();

    let count_token = tokens.next().ok_or(CodecError::UnexpectedEof {
        expected: 1,
        got: 0,
    })?;
    let count: i64 = count_token
        .parse()
        .map_err(|_| CodecError::MalformedNumber {
            token: count_token.to_string(),
        })?;
    if count < 2 || count > u32::MAX as i64 {
        return Err(CodecError::InvalidPointCount { count });
    }
    let count = count as usize;

    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let x = next_f64(&mut tokens, count, i)?;
        let y = next_f64(&mut tokens, count, i)?;
        points.push(FunctionPoint { x, y });
    }
    TabulatedFunction::from_points(points).map_err(CodecError::InvalidFunction)
}

fn next_f64<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut I,
    expected: usize,
    got: usize,
) -> Result<f64, CodecError> {
    let token = tokens
        .next()
        .ok_or(CodecError::UnexpectedEof { expected, got })?;
    token.parse().map_err(|_| CodecError::MalformedNumber {
        token: token.to_string(),
    })
}

/// Write `function` in the binary format (big-endian, fixed width).
pub fn write_binary<W: Write>(
    function: &TabulatedFunction,
    out: &mut W,
) -> Result<(), CodecError> {
    out.write_all(&(function.points_count() as u32).to_be_bytes())?;
    for p in function.points() {
        out.write_all(&p.x.to_be_bytes())?;
        out.write_all(&p.y.to_be_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Read a function in the binary format.
pub fn read_binary<R: Read>(input: &mut R) -> Result<TabulatedFunction, CodecError> {
    let mut count_buf = [0u8; 4];
    input.read_exact(&mut count_buf)?;
    let count = u32::from_be_bytes(count_buf);
    if count < 2 {
        return Err(CodecError::InvalidPointCount {
            count: count as i64,
        });
    }

    let mut points = Vec::with_capacity(count as usize);
    let mut buf = [0u8; 8];
    for _ in 0..count {
        input.read_exact(&mut buf)?;
        let x = f64::from_be_bytes(buf);
        input.read_exact(&mut buf)?;
        let y = f64::from_be_bytes(buf);
        points.push(FunctionPoint { x, y });
    }
    TabulatedFunction::from_points(points).map_err(CodecError::InvalidFunction)
}
