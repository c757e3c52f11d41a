use bytes::{Buf, Bytes, BytesMut};
use std::io::Cursor;
use tokio_util::codec::{Decoder, Encoder};

use crate::config::DEFAULT_MAX_MULTI_BULK_LENGTH;
use crate::frame::{self, element_done, Error, Frame, LineEnding, Skip};
use crate::utils::split_quoted;

/// The wire format a client speaks, detected from the first byte it sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    /// Typed frames, each starting with a data type tag.
    Resp,
    /// Plain text lines, one command per line.
    Inline,
}

/// Turns the bytes sent by a client into frames and replies into bytes.
///
/// A decoding error never poisons the codec: the rest of the offending request is skipped, so the
/// next frame handed out is the following request and every request gets exactly one reply.
#[derive(Debug)]
pub struct FrameCodec {
    max_bulk_len: usize,
    protocol: Option<Protocol>,
    line_ending: Option<LineEnding>,
    // Bytes of an oversize blob still to be thrown away.
    discard: usize,
    // Elements still to be thrown away per aggregate left open by a failed request, innermost last.
    pending: Vec<usize>,
    // Set while throwing away an oversize inline line.
    skip_line: bool,
}

impl FrameCodec {
    pub fn new(max_bulk_len: usize) -> FrameCodec {
        FrameCodec {
            max_bulk_len,
            protocol: None,
            line_ending: None,
            discard: 0,
            pending: Vec::new(),
            skip_line: false,
        }
    }

    pub fn protocol(&self) -> Option<Protocol> {
        self.protocol
    }

    /// Replies mirror the terminator of the first request, line feeds until one is seen.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending.unwrap_or_default()
    }

    fn detect_line_ending(&mut self, consumed: &[u8]) {
        if self.line_ending.is_some() {
            return;
        }
        if let Some(lf) = consumed.iter().position(|byte| *byte == b'\n') {
            let ending = match lf.checked_sub(1).map(|cr| consumed[cr]) {
                Some(b'\r') => LineEnding::CrLf,
                _ => LineEnding::Lf,
            };
            self.line_ending = Some(ending);
        }
    }

    /// Throws away what is left of an oversize blob. Returns whether it is gone.
    fn discard(&mut self, src: &mut BytesMut) -> bool {
        let skipped = self.discard.min(src.len());
        src.advance(skipped);
        self.discard -= skipped;
        self.discard == 0
    }

    /// Steps over the elements of a failed request that are still on the wire, without parsing
    /// them. Returns whether the whole request is gone.
    fn skip_pending(&mut self, src: &mut BytesMut) -> bool {
        loop {
            if !self.discard(src) {
                return false;
            }

            match self.pending.last().copied() {
                None => return true,
                Some(0) => {
                    // An aggregate is complete, so is the element it was in its parent.
                    self.pending.pop();
                    element_done(&mut self.pending);
                    continue;
                }
                Some(_) => {}
            }

            let Some(lf) = src.iter().position(|byte| *byte == b'\n') else {
                return false;
            };
            let line = src.split_to(lf + 1);

            match Skip::from_line(strip_terminator(&line)) {
                Skip::Line => element_done(&mut self.pending),
                Skip::Blob(length) => {
                    self.discard = length + terminator_len(&line);
                    element_done(&mut self.pending);
                }
                Skip::Elements(elements) => self.pending.push(elements),
            }
        }
    }

    fn decode_frame(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Error> {
        let mut open = Vec::new();
        let mut cursor = Cursor::new(&src[..]);
        let result = Frame::parse_tracked(&mut cursor, self.max_bulk_len, &mut open);
        let position = cursor.position() as usize;

        match result {
            Ok(frame) => {
                self.detect_line_ending(&src[..position]);
                src.advance(position);
                Ok(Some(frame))
            }
            // Not enough data to parse a frame.
            Err(Error::Incomplete) => Ok(None),
            Err(Error::BufferExceeded { length, max }) => {
                self.discard = length + terminator_len(&src[..position]);
                src.advance(position);
                element_done(&mut open);
                self.pending = open;
                Err(Error::BufferExceeded { length, max })
            }
            // The too deep aggregate itself is still open, only its header was consumed.
            Err(err @ Error::NestingTooDeep(_)) => {
                src.advance(position);
                self.pending = open;
                Err(err)
            }
            Err(err) => {
                let resume = match err {
                    // The tag byte was a stray line feed, skipping it is enough.
                    Error::InvalidDataType(b'\n') => position,
                    Error::InvalidDataType(_) | Error::UnexpectedLineEnd => src[position..]
                        .iter()
                        .position(|byte| *byte == b'\n')
                        .map_or(src.len(), |lf| position + lf + 1),
                    // Everything else consumed the offending line already.
                    _ => position,
                };
                src.advance(resume);
                element_done(&mut open);
                self.pending = open;
                Err(err)
            }
        }
    }

    fn decode_inline(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Error> {
        loop {
            let Some(lf) = src.iter().position(|byte| *byte == b'\n') else {
                if src.len() > self.max_bulk_len {
                    let length = src.len();
                    src.clear();
                    self.skip_line = true;
                    return Err(Error::BufferExceeded {
                        length,
                        max: self.max_bulk_len,
                    });
                }
                return Ok(None);
            };

            let line = src.split_to(lf + 1);
            if self.skip_line {
                self.skip_line = false;
                continue;
            }
            self.detect_line_ending(&line);

            let line = strip_terminator(&line);
            if line.len() > self.max_bulk_len {
                return Err(Error::BufferExceeded {
                    length: line.len(),
                    max: self.max_bulk_len,
                });
            }

            // Blank lines are not requests.
            if let Some(frame) = inline_frame(line)? {
                return Ok(Some(frame));
            }
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        FrameCodec::new(DEFAULT_MAX_MULTI_BULK_LENGTH)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = frame::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !self.skip_pending(src) {
            return Ok(None);
        }

        let Some(first_byte) = src.first().copied() else {
            return Ok(None);
        };

        let protocol = *self.protocol.get_or_insert(if frame::is_data_type(first_byte) {
            Protocol::Resp
        } else {
            Protocol::Inline
        });

        match protocol {
            Protocol::Resp => self.decode_frame(src),
            Protocol::Inline => self.decode_inline(src),
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }

        if buf.is_empty() {
            return Ok(None);
        }

        let rest = buf.split();
        match self.protocol {
            // A last line without terminator is still a request.
            Some(Protocol::Inline) if !self.skip_line => inline_frame(strip_terminator(&rest)),
            Some(Protocol::Inline) => Ok(None),
            _ => Err(Error::Truncated),
        }
    }
}

impl Encoder<&Frame> for FrameCodec {
    type Error = frame::Error;

    fn encode(&mut self, item: &Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.serialize_with(self.line_ending()));
        Ok(())
    }
}

fn terminator_len(line: &[u8]) -> usize {
    if line.ends_with(b"\r\n") {
        2
    } else {
        1
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn inline_frame(line: &[u8]) -> Result<Option<Frame>, Error> {
    let args = split_quoted(line).ok_or(Error::UnbalancedQuotes)?;
    if args.is_empty() {
        return Ok(None);
    }

    let frames = args
        .into_iter()
        .map(|arg| Frame::Bulk(Bytes::from(arg)))
        .collect();

    Ok(Some(Frame::Array(frames)))
}
