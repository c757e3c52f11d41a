// https://github.com/redis/redis-specifications/blob/master/protocol/RESP3.md
//
// The dialect spoken here terminates every unit with a single line feed. A carriage return right
// before the line feed is tolerated on input, so stock RESP clients can talk to the server too.

use std::fmt;
use std::io::{self, Cursor};
use std::str::{self, FromStr};

use bytes::{Buf, Bytes};
use num_bigint::BigInt;
use thiserror::Error as ThisError;

static LF: &[u8; 1] = b"\n";
static CRLF: &[u8; 2] = b"\r\n";

// Upper bound for aggregate preallocation, a client announcing a huge array must still send it.
const MAX_PREALLOCATED_ELEMENTS: usize = 1024;

/// Aggregates nested deeper than this are rejected instead of parsed.
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("invalid length")]
    InvalidLength,
    #[error("invalid integer")]
    InvalidInteger,
    #[error("invalid double")]
    InvalidDouble,
    #[error("invalid big number")]
    InvalidBigNumber,
    #[error("invalid boolean")]
    InvalidBoolean,
    #[error("invalid null")]
    InvalidNull,
    #[error("expected line terminator")]
    UnexpectedLineEnd,
    #[error("buffer exceeded, length {length} is bigger than {max}")]
    BufferExceeded { length: usize, max: usize },
    #[error("unbalanced quotes in request")]
    UnbalancedQuotes,
    #[error("invalid UTF-8 string")]
    InvalidUtf8,
    #[error("stream ended in the middle of a frame")]
    Truncated,
    #[error("aggregates nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the connection can keep serving requests after this error. Only transport failures
    /// end a connection; malformed input is reported back to the client.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

/// The terminator written after every unit of a serialized frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineEnding::Lf => LF,
            LineEnding::CrLf => CRLF,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Bulk(Bytes),
    Error(String),
    BulkError(Bytes),
    Integer(i64),
    Double(f64),
    BigNumber(BigInt),
    Null,
    Boolean(bool),
    Array(Vec<Frame>),
    Map(Vec<(Frame, Frame)>),
    Set(Vec<Frame>),
}

impl Frame {
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Self::parse_bounded(src, usize::MAX)
    }

    /// Parses a single frame, rejecting blob payloads longer than `max_bulk_len` bytes.
    pub fn parse_bounded(src: &mut Cursor<&[u8]>, max_bulk_len: usize) -> Result<Self, Error> {
        Self::parse_tracked(src, max_bulk_len, &mut Vec::new())
    }

    /// Like [`Frame::parse_bounded`], keeping in `open` one entry per aggregate being parsed: the
    /// number of its elements not parsed yet, the one in progress included.
    ///
    /// After a parse error `open` tells how much of the failed frame is still to come, so the
    /// caller can skip the rest of it. It is left empty on success.
    pub fn parse_tracked(
        src: &mut Cursor<&[u8]>,
        max_bulk_len: usize,
        open: &mut Vec<usize>,
    ) -> Result<Self, Error> {
        // The first byte always identifies the type, subsequent bytes are the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let line = get_line(src)?;
                Ok(Frame::Simple(to_string(line)?))
            }
            DataType::SimpleError => {
                let line = get_line(src)?;
                Ok(Frame::Error(to_string(line)?))
            }
            // $<length>\n<data>\n
            DataType::BulkString => {
                let data = get_blob(src, max_bulk_len)?;
                Ok(Frame::Bulk(Bytes::copy_from_slice(data)))
            }
            // !<length>\n<error>\n
            DataType::BulkError => {
                let data = get_blob(src, max_bulk_len)?;
                Ok(Frame::BulkError(Bytes::copy_from_slice(data)))
            }
            DataType::Integer => {
                let line = get_line(src)?;
                let integer = str::from_utf8(line)
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or(Error::InvalidInteger)?;
                Ok(Frame::Integer(integer))
            }
            DataType::Double => {
                let line = get_line(src)?;
                let double = str::from_utf8(line)
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                    .ok_or(Error::InvalidDouble)?;
                Ok(Frame::Double(double))
            }
            DataType::BigNumber => {
                let line = get_line(src)?;
                let digits = match line.first() {
                    Some(b'+') | Some(b'-') => &line[1..],
                    _ => line,
                };
                if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
                    return Err(Error::InvalidBigNumber);
                }
                let number = str::from_utf8(line)
                    .ok()
                    .and_then(|s| BigInt::from_str(s).ok())
                    .ok_or(Error::InvalidBigNumber)?;
                Ok(Frame::BigNumber(number))
            }
            DataType::Null => {
                if !get_line(src)?.is_empty() {
                    return Err(Error::InvalidNull);
                }
                Ok(Frame::Null)
            }
            DataType::Boolean => match get_line(src)? {
                b"t" => Ok(Frame::Boolean(true)),
                b"f" => Ok(Frame::Boolean(false)),
                _ => Err(Error::InvalidBoolean),
            },
            // *<number-of-elements>\n<element-1>...<element-n>
            DataType::Array => {
                let frames = parse_elements(src, max_bulk_len, open)?;
                Ok(Frame::Array(frames))
            }
            DataType::Set => {
                let frames = parse_elements(src, max_bulk_len, open)?;
                Ok(Frame::Set(frames))
            }
            // %<number-of-entries>\n<key-1><value-1>...<key-n><value-n>
            DataType::Map => {
                let length = parse_length(get_line(src)?)?;
                let elements = length.checked_mul(2).ok_or(Error::InvalidLength)?;
                enter_aggregate(open, elements)?;

                let mut entries = Vec::with_capacity(length.min(MAX_PREALLOCATED_ELEMENTS));
                for _ in 0..length {
                    let key = parse_element(src, max_bulk_len, open)?;
                    let value = parse_element(src, max_bulk_len, open)?;
                    entries.push((key, value));
                }
                open.pop();
                Ok(Frame::Map(entries))
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_with(LineEnding::Lf)
    }

    pub fn serialize_with(&self, ending: LineEnding) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes, ending);
        bytes
    }

    fn write_to(&self, dst: &mut Vec<u8>, ending: LineEnding) {
        let terminator = ending.as_bytes();
        match self {
            Frame::Simple(s) => write_line(dst, DataType::SimpleString, s.as_bytes(), terminator),
            Frame::Error(s) => write_line(dst, DataType::SimpleError, s.as_bytes(), terminator),
            Frame::Bulk(bytes) => write_blob(dst, DataType::BulkString, bytes, terminator),
            Frame::BulkError(bytes) => write_blob(dst, DataType::BulkError, bytes, terminator),
            Frame::Integer(i) => {
                write_line(dst, DataType::Integer, i.to_string().as_bytes(), terminator)
            }
            Frame::Double(d) => {
                write_line(dst, DataType::Double, format_double(*d).as_bytes(), terminator)
            }
            Frame::BigNumber(n) => {
                write_line(dst, DataType::BigNumber, n.to_string().as_bytes(), terminator)
            }
            Frame::Null => write_line(dst, DataType::Null, b"", terminator),
            Frame::Boolean(b) => {
                let payload: &[u8] = if *b { b"t" } else { b"f" };
                write_line(dst, DataType::Boolean, payload, terminator)
            }
            Frame::Array(frames) => {
                write_line(dst, DataType::Array, frames.len().to_string().as_bytes(), terminator);
                for frame in frames {
                    frame.write_to(dst, ending);
                }
            }
            Frame::Set(frames) => {
                write_line(dst, DataType::Set, frames.len().to_string().as_bytes(), terminator);
                for frame in frames {
                    frame.write_to(dst, ending);
                }
            }
            Frame::Map(entries) => {
                write_line(dst, DataType::Map, entries.len().to_string().as_bytes(), terminator);
                for (key, value) in entries {
                    key.write_to(dst, ending);
                    value.write_to(dst, ending);
                }
            }
        }
    }

    /// A short name of the frame type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Simple(_) => "simple string",
            Frame::Bulk(_) => "bulk string",
            Frame::Error(_) => "simple error",
            Frame::BulkError(_) => "bulk error",
            Frame::Integer(_) => "integer",
            Frame::Double(_) => "double",
            Frame::BigNumber(_) => "big number",
            Frame::Null => "null",
            Frame::Boolean(_) => "boolean",
            Frame::Array(_) => "array",
            Frame::Map(_) => "map",
            Frame::Set(_) => "set",
        }
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

/// Human readable rendering, the way an interactive client prints replies.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "{:?}", s),
            Frame::Bulk(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Frame::Error(s) => write!(f, "(error) {}", s),
            Frame::BulkError(bytes) => write!(f, "(error) {}", String::from_utf8_lossy(bytes)),
            Frame::Integer(i) => write!(f, "(integer) {}", i),
            Frame::Double(d) => write!(f, "(double) {}", format_double(*d)),
            Frame::BigNumber(n) => write!(f, "(big number) {}", n),
            Frame::Null => write!(f, "(null)"),
            Frame::Boolean(b) => write!(f, "(boolean) {}", b),
            Frame::Array(frames) => {
                write!(f, "(array)")?;
                for frame in frames {
                    write!(f, "\n\t{}", indent(frame.to_string()))?;
                }
                Ok(())
            }
            Frame::Set(frames) => {
                write!(f, "(set)")?;
                for frame in frames {
                    write!(f, "\n\t{}", indent(frame.to_string()))?;
                }
                Ok(())
            }
            Frame::Map(entries) => {
                write!(f, "(map)")?;
                for (key, value) in entries {
                    write!(
                        f,
                        "\n\t{} => {}",
                        indent(key.to_string()),
                        indent(value.to_string())
                    )?;
                }
                Ok(())
            }
        }
    }
}

fn indent(rendered: String) -> String {
    rendered.replace('\n', "\n\t")
}

fn format_double(d: f64) -> String {
    if d.is_nan() {
        "nan".to_string()
    } else if d.is_infinite() && d.is_sign_positive() {
        "inf".to_string()
    } else if d.is_infinite() {
        "-inf".to_string()
    } else {
        d.to_string()
    }
}

fn write_line(dst: &mut Vec<u8>, data_type: DataType, payload: &[u8], terminator: &[u8]) {
    dst.reserve(1 + payload.len() + terminator.len());
    dst.push(u8::from(data_type));
    dst.extend_from_slice(payload);
    dst.extend_from_slice(terminator);
}

fn write_blob(dst: &mut Vec<u8>, data_type: DataType, payload: &[u8], terminator: &[u8]) {
    write_line(dst, data_type, payload.len().to_string().as_bytes(), terminator);
    dst.extend_from_slice(payload);
    dst.extend_from_slice(terminator);
}

fn parse_elements(
    src: &mut Cursor<&[u8]>,
    max_bulk_len: usize,
    open: &mut Vec<usize>,
) -> Result<Vec<Frame>, Error> {
    let length = parse_length(get_line(src)?)?;
    enter_aggregate(open, length)?;

    let mut frames = Vec::with_capacity(length.min(MAX_PREALLOCATED_ELEMENTS));
    for _ in 0..length {
        frames.push(parse_element(src, max_bulk_len, open)?);
    }
    open.pop();
    Ok(frames)
}

fn parse_element(
    src: &mut Cursor<&[u8]>,
    max_bulk_len: usize,
    open: &mut Vec<usize>,
) -> Result<Frame, Error> {
    let frame = Frame::parse_tracked(src, max_bulk_len, open)?;
    element_done(open);
    Ok(frame)
}

// The aggregate is tracked even when too deep, its elements are still on the wire.
fn enter_aggregate(open: &mut Vec<usize>, elements: usize) -> Result<(), Error> {
    let too_deep = open.len() >= MAX_NESTING_DEPTH;
    open.push(elements);
    if too_deep {
        return Err(Error::NestingTooDeep(MAX_NESTING_DEPTH));
    }
    Ok(())
}

/// Marks the element in progress of the innermost open aggregate as consumed.
pub fn element_done(open: &mut [usize]) {
    if let Some(remaining) = open.last_mut() {
        *remaining = remaining.saturating_sub(1);
    }
}

/// How to step over one element without parsing it, decided from its first line.
#[derive(Debug, PartialEq, Eq)]
pub enum Skip {
    /// The element is the line itself.
    Line,
    /// The line announces a payload of that many bytes, terminator excluded.
    Blob(usize),
    /// The line opens an aggregate of that many elements.
    Elements(usize),
}

impl Skip {
    /// Anything that does not look like a well-formed header counts as a single line.
    pub fn from_line(line: &[u8]) -> Skip {
        let Some((first_byte, rest)) = line.split_first() else {
            return Skip::Line;
        };
        let Ok(length) = parse_length(rest) else {
            return Skip::Line;
        };

        match DataType::try_from(*first_byte) {
            Ok(DataType::BulkString | DataType::BulkError) => Skip::Blob(length),
            Ok(DataType::Array | DataType::Set) => Skip::Elements(length),
            Ok(DataType::Map) => length.checked_mul(2).map_or(Skip::Line, Skip::Elements),
            _ => Skip::Line,
        }
    }
}

fn parse_length(line: &[u8]) -> Result<usize, Error> {
    str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or(Error::InvalidLength)
}

fn to_string(line: &[u8]) -> Result<String, Error> {
    String::from_utf8(line.to_vec()).map_err(|_| Error::InvalidUtf8)
}

/// Reads a line up to the next line feed, leaving the cursor right after it. A carriage return
/// preceding the line feed is not part of the returned line.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();

    let end = buf[start..]
        .iter()
        .position(|byte| *byte == b'\n')
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((end + 1) as u64);

    let line = &buf[start..end];
    Ok(line.strip_suffix(b"\r").unwrap_or(line))
}

fn get_blob<'a>(src: &mut Cursor<&'a [u8]>, max: usize) -> Result<&'a [u8], Error> {
    let length = parse_length(get_line(src)?)?;
    if length > max {
        return Err(Error::BufferExceeded { length, max });
    }

    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();

    // Declared payload plus at least the line feed.
    if buf.len() < start + length + 1 {
        return Err(Error::Incomplete);
    }

    let data = &buf[start..start + length];
    let consumed = match &buf[start + length..] {
        [b'\n', ..] => 1,
        [b'\r'] => return Err(Error::Incomplete),
        [b'\r', b'\n', ..] => 2,
        _ => return Err(Error::UnexpectedLineEnd),
    };

    src.set_position((start + length + consumed) as u64);
    Ok(data)
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

/// Whether `byte` starts a typed frame.
pub fn is_data_type(byte: u8) -> bool {
    DataType::try_from(byte).is_ok()
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    BulkString,   // '$'
    SimpleError,  // '-'
    BulkError,    // '!'
    Integer,      // ':'
    Double,       // ','
    BigNumber,    // '('
    Null,         // '_'
    Boolean,      // '#'
    Array,        // '*'
    Map,          // '%'
    Set,          // '~'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'$' => Ok(Self::BulkString),
            b'-' => Ok(Self::SimpleError),
            b'!' => Ok(Self::BulkError),
            b':' => Ok(Self::Integer),
            b',' => Ok(Self::Double),
            b'(' => Ok(Self::BigNumber),
            b'_' => Ok(Self::Null),
            b'#' => Ok(Self::Boolean),
            b'*' => Ok(Self::Array),
            b'%' => Ok(Self::Map),
            b'~' => Ok(Self::Set),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::BulkString => b'$',
            DataType::SimpleError => b'-',
            DataType::BulkError => b'!',
            DataType::Integer => b':',
            DataType::Double => b',',
            DataType::BigNumber => b'(',
            DataType::Null => b'_',
            DataType::Boolean => b'#',
            DataType::Array => b'*',
            DataType::Map => b'%',
            DataType::Set => b'~',
        }
    }
}
