//! Forward-only, bounds-checked byte reading and the matching writer.
//!
//! [`ByteCursor`] is the only way the decoders touch a payload. It never
//! panics on short input: every read checks the remaining length first and
//! reports [`DecodeError::UnexpectedEof`] instead.
//!
//! Integer encodings follow the Bedrock network protocol:
//!
//! | Method            | Encoding                                   |
//! |-------------------|--------------------------------------------|
//! | `read_u32_le`     | 4 bytes, little-endian                     |
//! | `read_var_u32`    | LEB128, 7 bits per byte, at most 5 bytes   |
//! | `read_var_i32`    | zig-zag over `read_var_u32`                |

use crate::error::DecodeError;

/// Maximum encoded length of a 32-bit var-int.
pub const VAR_INT_MAX_SIZE: usize = 5;

/// Sequential read position over a borrowed byte buffer.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current read offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Returns the next byte without consuming it, or `None` at the end.
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Consumes `n` bytes and returns them as a slice of the original buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                position: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Advances past `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads an unsigned LEB128 var-int of at most [`VAR_INT_MAX_SIZE`] bytes.
    pub fn read_var_u32(&mut self) -> Result<u32, DecodeError> {
        let start = self.pos;
        let mut value: u32 = 0;
        for i in 0..VAR_INT_MAX_SIZE {
            let byte = self.read_u8()?;
            value |= u32::from(byte & 0x7f) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::VarIntTooLong(start))
    }

    /// Reads a zig-zag encoded signed var-int.
    pub fn read_var_i32(&mut self) -> Result<i32, DecodeError> {
        let raw = self.read_var_u32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }
}

/// Append-only byte sink producing the encodings [`ByteCursor`] reads.
///
/// Used for outbound packets and for building payload fixtures.
#[derive(Clone, Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn write_i8(&mut self, v: i8) -> &mut Self {
        self.write_u8(v as u8)
    }

    pub fn write_bool(&mut self, v: bool) -> &mut Self {
        self.write_u8(u8::from(v))
    }

    pub fn write_u16_le(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn write_u32_le(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn write_var_u32(&mut self, mut v: u32) -> &mut Self {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.buf.push(byte);
                return self;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub fn write_var_i32(&mut self, v: i32) -> &mut Self {
        self.write_var_u32(((v << 1) ^ (v >> 31)) as u32)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let cursor = ByteCursor::new(&[7, 8]);
        assert_eq!(cursor.peek_u8(), Some(7));
        assert_eq!(cursor.peek_u8(), Some(7));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_peek_at_end_is_none() {
        let mut cursor = ByteCursor::new(&[1]);
        cursor.read_u8().unwrap();
        assert_eq!(cursor.peek_u8(), None);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_read_past_end_is_eof() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        let err = cursor.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedEof {
                position: 0,
                needed: 4,
                remaining: 3,
            }
        );
        // A failed read leaves the cursor where it was.
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_u32_is_little_endian() {
        let mut cursor = ByteCursor::new(&[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(cursor.read_u32_le().unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_var_u32_known_encodings() {
        let mut cursor = ByteCursor::new(&[0x00, 0x7f, 0x80, 0x01, 0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(cursor.read_var_u32().unwrap(), 0);
        assert_eq!(cursor.read_var_u32().unwrap(), 127);
        assert_eq!(cursor.read_var_u32().unwrap(), 128);
        assert_eq!(cursor.read_var_u32().unwrap(), u32::MAX);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_var_u32_too_long() {
        let mut cursor = ByteCursor::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert_eq!(cursor.read_var_u32(), Err(DecodeError::VarIntTooLong(0)));
    }

    #[test]
    fn test_var_u32_truncated() {
        let mut cursor = ByteCursor::new(&[0x80, 0x80]);
        assert!(matches!(
            cursor.read_var_u32(),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_zigzag_matches_writer() {
        let mut w = ByteWriter::new();
        for v in [0, -1, 1, -64, 64, i32::MIN, i32::MAX] {
            w.write_var_i32(v);
        }
        let bytes = w.into_inner();
        let mut cursor = ByteCursor::new(&bytes);
        for v in [0, -1, 1, -64, 64, i32::MIN, i32::MAX] {
            assert_eq!(cursor.read_var_i32().unwrap(), v);
        }
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_zigzag_small_values_are_single_byte() {
        let mut w = ByteWriter::new();
        w.write_var_i32(-1);
        assert_eq!(w.as_slice(), &[0x01]);
        let mut w = ByteWriter::new();
        w.write_var_i32(3);
        assert_eq!(w.as_slice(), &[0x06]);
    }

    #[test]
    fn test_read_bytes_borrows_from_buffer() {
        let data = [1, 2, 3, 4, 5];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(1).unwrap();
        assert_eq!(cursor.read_bytes(3).unwrap(), &[2, 3, 4]);
        assert_eq!(cursor.rest(), &[5]);
        assert_eq!(cursor.remaining(), 1);
    }
}
