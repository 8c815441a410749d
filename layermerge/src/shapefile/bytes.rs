//! Bounds-checked cursor over a byte slice.
//!
//! Shapefiles mix byte orders: the main header and record headers are
//! big-endian, everything else little-endian.

use super::error::ShapefileError;

pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8], context: &'static str) -> Self {
        Self {
            bytes,
            pos: 0,
            context,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub fn seek(&mut self, pos: usize) -> Result<(), ShapefileError> {
        if pos > self.bytes.len() {
            return Err(self.truncated());
        }
        self.pos = pos;
        Ok(())
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], ShapefileError> {
        let end = self.pos.checked_add(len).ok_or_else(|| self.truncated())?;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| self.truncated())?;
        self.pos = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ShapefileError> {
        self.take(len).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, ShapefileError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16_le(&mut self) -> Result<u16, ShapefileError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32_le(&mut self) -> Result<u32, ShapefileError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32_le(&mut self) -> Result<i32, ShapefileError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn i32_be(&mut self) -> Result<i32, ShapefileError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    pub fn f64_le(&mut self) -> Result<f64, ShapefileError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ShapefileError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn truncated(&self) -> ShapefileError {
        ShapefileError::Truncated {
            context: self.context,
            offset: self.pos,
        }
    }
}
