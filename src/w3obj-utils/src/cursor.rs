use byteorder::{ByteOrder, LE};
use thiserror::Error;

/// Signal that a read needed more bytes than the input had left.
///
/// Nothing is consumed from the cursor when this is returned, so
/// callers are free to decide whether to stop or carry on.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("needed {needed} bytes at offset {offset}, but only {remaining} remain")]
pub struct Truncated {
    /// The cursor position at which the read was attempted.
    pub offset: usize,
    /// The number of bytes the read required.
    pub needed: usize,
    /// The number of bytes that were left in the input.
    pub remaining: usize,
}

/// A forward-only reader over an in-memory byte buffer.
///
/// Every read checks the remaining length first and fails with
/// [`Truncated`] instead of reading partially.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a new cursor at the start of `data`.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Gets the current offset into the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Gets the number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether all input has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Checks that at least `needed` more bytes can be read.
    #[inline]
    pub fn ensure(&self, needed: usize) -> Result<(), Truncated> {
        let remaining = self.remaining();
        if remaining < needed {
            Err(Truncated {
                offset: self.pos,
                needed,
                remaining,
            })
        } else {
            Ok(())
        }
    }

    /// Reads the next `len` bytes.
    #[inline]
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], Truncated> {
        self.ensure(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads a fixed-size array of `N` bytes.
    #[inline]
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], Truncated> {
        let mut out = [0; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Reads a little-endian [`i32`].
    #[inline]
    pub fn int32(&mut self) -> Result<i32, Truncated> {
        self.bytes(4).map(LE::read_i32)
    }

    /// Reads a little-endian IEEE-754 [`f32`].
    #[inline]
    pub fn float32(&mut self) -> Result<f32, Truncated> {
        self.bytes(4).map(LE::read_f32)
    }

    /// Reads bytes up to the next null terminator.
    ///
    /// The terminator is consumed but not part of the returned slice.
    /// When the input ends before a terminator is found, nothing is
    /// consumed and the whole remainder plus the missing terminator
    /// is reported as needed.
    pub fn cstr(&mut self) -> Result<&'a [u8], Truncated> {
        let rest = &self.data[self.pos..];
        match rest.iter().position(|&b| b == 0) {
            Some(len) => {
                self.pos += len + 1;
                Ok(&rest[..len])
            }
            None => Err(Truncated {
                offset: self.pos,
                needed: rest.len() + 1,
                remaining: rest.len(),
            }),
        }
    }
}
