//! Utilities for writing structured little-endian binary data.
//!
//! Reading goes through [`ByteCursor`][crate::ByteCursor] instead, which
//! reports exhausted input without consuming anything.

use std::io::{self, Write};

use byteorder::{WriteBytesExt, LE};

/// Writes a fixed-size identifier of `N` raw bytes to the stream.
#[inline]
pub fn write_tag<W: Write, const N: usize>(out: &mut W, tag: [u8; N]) -> io::Result<()> {
    out.write_all(&tag)
}

macro_rules! int_write_impl {
    ($($fn:ident($ty:ty) => $method:ident),* $(,)*) => {
        $(
            #[doc = concat!("Writes a [`", stringify!($ty), "`] value to the data stream.")]
            #[inline]
            pub fn $fn<W: Write>(out: &mut W, v: $ty) -> io::Result<()> {
                out.$method::<LE>(v)
            }
        )*
    };
}

int_write_impl! {
    write_int32(i32) => write_i32,
    write_float32(f32) => write_f32,
}

/// Writes a string as raw bytes followed by a single null terminator.
///
/// No length prefix is emitted. The bytes must not contain a null
/// byte themselves or readers will cut the string short.
#[inline]
pub fn write_cstr<W: Write>(out: &mut W, v: &[u8]) -> io::Result<()> {
    out.write_all(v)?;
    out.write_u8(0)
}

/// Writes a sequence of elements using the given writer function.
///
/// When `prefixed` is set, the element count is written upfront as
/// a signed 32-bit integer.
#[inline]
pub fn write_seq<F, T, W>(out: &mut W, prefixed: bool, seq: &[T], mut f: F) -> io::Result<()>
where
    F: FnMut(&mut W, &T) -> io::Result<()>,
    W: Write,
{
    if prefixed {
        let len = i32::try_from(seq.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "sequence too long"))?;
        write_int32(out, len)?;
    }
    for v in seq {
        f(out, v)?;
    }

    Ok(())
}
