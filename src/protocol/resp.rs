use atoi::FromRadix10SignedChecked;
use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Largest bulk string accepted from a client
const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Deepest array nesting accepted; requests are flat, replies nest one level
const MAX_DEPTH: usize = 8;

/// RESP (REdis Serialization Protocol) frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Simple strings, used for short status replies like "OK"
    Simple(String),
    /// Errors
    Error(String),
    /// Integers
    Integer(i64),
    /// Binary-safe strings (can be null)
    Bulk(Option<Bytes>),
    /// Arrays of other frames (can be null)
    Array(Option<Vec<Frame>>),
}

/// Why a buffer could not be decoded into a frame
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    /// More bytes are needed
    #[error("incomplete frame")]
    Incomplete,
    /// The bytes can never form a valid frame
    #[error("protocol error: {0}")]
    Invalid(String),
}

impl Frame {
    pub fn error(msg: impl Into<String>) -> Self {
        Frame::Error(msg.into())
    }

    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Frame::Bulk(Some(data.into()))
    }

    pub fn null() -> Self {
        Frame::Bulk(None)
    }

    /// `:1` / `:0` reply for a store outcome
    pub fn boolean(flag: bool) -> Self {
        Frame::Integer(i64::from(flag))
    }

    /// Encode to RESP bytes
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf);
        buf.freeze()
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        match self {
            Frame::Simple(s) => {
                buf.put_u8(b'+');
                buf.put_slice(s.as_bytes());
                buf.put_slice(b"\r\n");
            }
            Frame::Error(e) => {
                buf.put_u8(b'-');
                buf.put_slice(e.as_bytes());
                buf.put_slice(b"\r\n");
            }
            Frame::Integer(i) => {
                buf.put_u8(b':');
                buf.put_slice(i.to_string().as_bytes());
                buf.put_slice(b"\r\n");
            }
            Frame::Bulk(None) => buf.put_slice(b"$-1\r\n"),
            Frame::Bulk(Some(data)) => {
                buf.put_u8(b'$');
                buf.put_slice(data.len().to_string().as_bytes());
                buf.put_slice(b"\r\n");
                buf.put_slice(data);
                buf.put_slice(b"\r\n");
            }
            Frame::Array(None) => buf.put_slice(b"*-1\r\n"),
            Frame::Array(Some(items)) => {
                buf.put_u8(b'*');
                buf.put_slice(items.len().to_string().as_bytes());
                buf.put_slice(b"\r\n");
                for item in items {
                    item.encode_into(buf);
                }
            }
        }
    }
}

/// Incremental RESP decoder over a borrowed buffer
pub struct Parser<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Decode one frame from the front of `buf`, returning it with the
    /// number of bytes consumed
    pub fn parse(buf: &'a [u8]) -> Result<(Frame, usize), FrameError> {
        let mut parser = Parser { buf, pos: 0 };
        let frame = parser.frame(0)?;
        Ok((frame, parser.pos))
    }

    fn frame(&mut self, depth: usize) -> Result<Frame, FrameError> {
        match self.byte()? {
            b'+' => Ok(Frame::Simple(self.text()?)),
            b'-' => Ok(Frame::Error(self.text()?)),
            b':' => Ok(Frame::Integer(self.integer()?)),
            b'$' => self.bulk(),
            b'*' => self.array(depth),
            other => Err(FrameError::Invalid(format!(
                "unexpected type byte '{}'",
                other.escape_ascii()
            ))),
        }
    }

    fn bulk(&mut self) -> Result<Frame, FrameError> {
        let len = match self.length()? {
            Some(len) => len,
            None => return Ok(Frame::Bulk(None)),
        };
        if len > MAX_BULK_LEN {
            return Err(FrameError::Invalid("bulk string too large".to_string()));
        }

        let end = self.pos + len;
        if self.buf.len() < end + 2 {
            return Err(FrameError::Incomplete);
        }
        if &self.buf[end..end + 2] != b"\r\n" {
            return Err(FrameError::Invalid("bulk string not terminated".to_string()));
        }

        let data = Bytes::copy_from_slice(&self.buf[self.pos..end]);
        self.pos = end + 2;
        Ok(Frame::Bulk(Some(data)))
    }

    fn array(&mut self, depth: usize) -> Result<Frame, FrameError> {
        if depth >= MAX_DEPTH {
            return Err(FrameError::Invalid("arrays nested too deeply".to_string()));
        }
        let count = match self.length()? {
            Some(count) => count,
            None => return Ok(Frame::Array(None)),
        };

        // Each element needs at least 3 bytes, cap the allocation by what is buffered
        let mut items = Vec::with_capacity(count.min(self.buf.len() / 3));
        for _ in 0..count {
            items.push(self.frame(depth + 1)?);
        }
        Ok(Frame::Array(Some(items)))
    }

    /// Length prefix, `None` for the `-1` null marker
    fn length(&mut self) -> Result<Option<usize>, FrameError> {
        match self.integer()? {
            -1 => Ok(None),
            n if n < 0 => Err(FrameError::Invalid(format!("invalid length {}", n))),
            n => Ok(Some(n as usize)),
        }
    }

    fn integer(&mut self) -> Result<i64, FrameError> {
        let line = self.line()?;
        let (value, used) = i64::from_radix_10_signed_checked(line);
        match value {
            Some(n) if used == line.len() && line.iter().any(u8::is_ascii_digit) => Ok(n),
            _ => Err(FrameError::Invalid(format!(
                "invalid integer '{}'",
                line.escape_ascii()
            ))),
        }
    }

    fn text(&mut self) -> Result<String, FrameError> {
        let line = self.line()?;
        Ok(String::from_utf8_lossy(line).into_owned())
    }

    fn byte(&mut self) -> Result<u8, FrameError> {
        let b = *self.buf.get(self.pos).ok_or(FrameError::Incomplete)?;
        self.pos += 1;
        Ok(b)
    }

    /// Bytes up to the next CRLF, which is consumed
    fn line(&mut self) -> Result<&'a [u8], FrameError> {
        let rest = &self.buf[self.pos..];
        let end = rest
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or(FrameError::Incomplete)?;
        self.pos += end + 2;
        Ok(&rest[..end])
    }
}
