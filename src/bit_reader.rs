//! Bit reader for the uncompressed frame header
//!
//! VP9 uncompressed headers are plain big-endian bit packing, not
//! arithmetic coding. The reader keeps a single bit cursor over the frame
//! buffer; byte-aligned multi-byte reads are layered on top of it.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// MSB-first bit reader over a frame buffer
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Cursor in bits from the start of `data`
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader over a frame buffer
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data, position: 0 }
    }

    /// Read a single bit
    #[inline]
    pub fn read_bit(&mut self) -> Result<u8> {
        if self.position >= self.data.len() * 8 {
            return Err(Error::EndOfStream {
                position: self.position,
            });
        }
        let byte = self.data[self.position >> 3];
        let bit = (byte >> (7 - (self.position & 7))) & 1;
        self.position += 1;
        Ok(bit)
    }

    /// Read a single bit as a flag
    #[inline]
    pub fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read_bit()? != 0)
    }

    /// Read n bits as an unsigned value, MSB first (n <= 32)
    #[inline]
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        debug_assert!(n <= 32);
        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Read an n-bit magnitude followed by a sign bit
    ///
    /// This is the su(n) encoding VP9 uses for loop-filter deltas and
    /// quantizer deltas; it is not two's complement.
    #[inline]
    pub fn read_signed_bits(&mut self, n: u8) -> Result<i32> {
        let magnitude = self.read_bits(n)? as i32;
        if self.read_flag()? {
            Ok(-magnitude)
        } else {
            Ok(magnitude)
        }
    }

    /// Read one byte; the cursor must be byte aligned
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        debug_assert!(self.is_byte_aligned(), "unaligned byte read");
        let byte_pos = self.position >> 3;
        if byte_pos >= self.data.len() {
            return Err(Error::EndOfStream {
                position: self.position,
            });
        }
        self.position += 8;
        Ok(self.data[byte_pos])
    }

    /// Read a big-endian u16; the cursor must be byte aligned
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        debug_assert!(self.is_byte_aligned(), "unaligned u16 read");
        let byte_pos = self.position >> 3;
        if byte_pos + 2 > self.data.len() {
            return Err(Error::EndOfStream {
                position: self.position,
            });
        }
        self.position += 16;
        Ok(BigEndian::read_u16(&self.data[byte_pos..]))
    }

    /// Read a big-endian u32; the cursor must be byte aligned
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        debug_assert!(self.is_byte_aligned(), "unaligned u32 read");
        let byte_pos = self.position >> 3;
        if byte_pos + 4 > self.data.len() {
            return Err(Error::EndOfStream {
                position: self.position,
            });
        }
        self.position += 32;
        Ok(BigEndian::read_u32(&self.data[byte_pos..]))
    }

    /// Absolute cursor position in bits
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the cursor sits on a byte boundary
    #[inline]
    pub fn is_byte_aligned(&self) -> bool {
        self.position & 7 == 0
    }

    /// Whole bytes left after the cursor
    #[inline]
    pub fn bytes_remaining(&self) -> usize {
        (self.data.len() * 8 - self.position) / 8
    }

    /// Bits left after the cursor
    #[inline]
    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    /// Consume zero padding up to the next byte boundary
    ///
    /// With `strict` set, a non-zero padding bit is a corrupt stream;
    /// otherwise the bits are consumed without the equality check.
    pub fn trailing_bits(&mut self, strict: bool) -> Result<()> {
        while !self.is_byte_aligned() {
            let position = self.position;
            if self.read_bit()? != 0 && strict {
                return Err(Error::corrupt(position, "non-zero trailing bit"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bit() {
        // 0b10110100
        let data = [0xB4];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bit().unwrap(), 1);
        assert_eq!(reader.read_bit().unwrap(), 0);
        assert_eq!(reader.read_bit().unwrap(), 1);
        assert_eq!(reader.read_bit().unwrap(), 1);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_read_bits_msb_first() {
        let data = [0xB4, 0xCA]; // 10110100 11001010
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1011);
        assert_eq!(reader.read_bits(4).unwrap(), 0b0100);
        assert_eq!(reader.read_bits(8).unwrap(), 0xCA);
    }

    #[test]
    fn test_read_signed_bits() {
        // magnitude 5 (0101), sign 1 -> -5; magnitude 3 (011), sign 0 -> 3
        let data = [0b0101_1011, 0b0000_0000];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_signed_bits(4).unwrap(), -5);
        assert_eq!(reader.read_signed_bits(3).unwrap(), 3);
    }

    #[test]
    fn test_aligned_reads() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 0x12);
        assert_eq!(reader.read_u16().unwrap(), 0x3456);
        assert_eq!(reader.read_u32().unwrap(), 0x789A_BCDE);
        assert_eq!(reader.bytes_remaining(), 0);
    }

    #[test]
    fn test_end_of_stream() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        reader.read_bits(8).unwrap();
        assert_eq!(
            reader.read_bit(),
            Err(Error::EndOfStream { position: 8 })
        );
    }

    #[test]
    fn test_trailing_bits_strict() {
        let data = [0b1010_0000];
        let mut reader = BitReader::new(&data);
        reader.read_bits(3).unwrap();
        assert!(reader.trailing_bits(true).is_ok());
        assert!(reader.is_byte_aligned());

        let data = [0b1011_0000];
        let mut reader = BitReader::new(&data);
        reader.read_bits(3).unwrap();
        assert!(reader.trailing_bits(true).is_err());

        let data = [0b1011_0000];
        let mut reader = BitReader::new(&data);
        reader.read_bits(3).unwrap();
        assert!(reader.trailing_bits(false).is_ok());
        assert_eq!(reader.position(), 8);
    }
}
