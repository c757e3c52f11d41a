use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use uuid::Uuid;

use crate::codec::{FrameCodec, Protocol};
use crate::frame::{self, Frame};

pub struct Connection {
    pub id: Uuid,
    stream: BufWriter<TcpStream>,
    // Data is read from the socket into the read buffer. When a frame is parsed, the corresponding
    // data is removed from the buffer.
    buffer: BytesMut,
    codec: FrameCodec,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection::with_codec(stream, FrameCodec::default())
    }

    pub fn with_codec(stream: TcpStream, codec: FrameCodec) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            stream: BufWriter::new(stream),
            // Allocate the buffer with 4kb of capacity.
            buffer: BytesMut::with_capacity(4096),
            codec,
        }
    }

    /// The protocol the client speaks, known once it sent its first byte.
    pub fn protocol(&self) -> Option<Protocol> {
        self.codec.protocol()
    }

    /// Reads the next frame. Returns `None` once the client closed the connection.
    ///
    /// A recoverable error leaves the connection usable: the offending input has been skipped and
    /// the next call continues with the following request.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, frame::Error> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return self.codec.decode_eof(&mut self.buffer);
            }
        }
    }

    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), frame::Error> {
        let mut buf = BytesMut::new();
        self.codec.encode(frame, &mut buf)?;

        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
