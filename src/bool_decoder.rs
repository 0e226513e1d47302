//! VP9 boolean arithmetic decoder
//!
//! VP9 entropy-codes the compressed header and every tile payload with a
//! binary arithmetic coder driven by 8-bit probabilities. The decoder is
//! layered on the outer [`BitReader`]: it is opened over the next `len`
//! bytes of the stream and must be closed with [`BoolDecoder::exit`], which
//! leaves the outer reader positioned exactly past the payload. Past the
//! end of the payload, renormalization clocks in zero bits.

use crate::bit_reader::BitReader;
use crate::error::{Error, Result};

/// Boolean decoder over one arithmetic-coded section of the stream
pub struct BoolDecoder<'r, 'a> {
    reader: &'r mut BitReader<'a>,
    /// Current decode window value
    value: u32,
    /// Current range, in 128..=255 between symbol reads
    range: u32,
    /// Payload bits not yet pulled into the window
    bits_left: u64,
}

impl<'r, 'a> BoolDecoder<'r, 'a> {
    /// Open a decoder over the next `len` bytes of the stream
    ///
    /// The outer cursor must be byte aligned; a zero-length payload is a
    /// corrupt stream.
    pub fn new(reader: &'r mut BitReader<'a>, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::corrupt(
                reader.position(),
                "empty arithmetic payload",
            ));
        }
        if !reader.is_byte_aligned() {
            return Err(Error::corrupt(
                reader.position(),
                "arithmetic payload not byte aligned",
            ));
        }
        if len > reader.bytes_remaining() {
            return Err(Error::EndOfStream {
                position: reader.position(),
            });
        }
        let value = reader.read_u8()? as u32;
        Ok(BoolDecoder {
            reader,
            value,
            range: 255,
            bits_left: len as u64 * 8 - 8,
        })
    }

    /// Absolute bit position of the outer reader
    #[inline]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Read one boolean with the given probability of a 0-bit (p/256)
    #[inline]
    pub fn read_bool(&mut self, prob: u8) -> Result<bool> {
        let split = 1 + (((self.range - 1) * prob as u32) >> 8);
        let bit = if self.value < split {
            self.range = split;
            false
        } else {
            self.range -= split;
            self.value -= split;
            true
        };

        while self.range < 128 {
            let new_bit = if self.bits_left > 0 {
                self.bits_left -= 1;
                self.reader.read_bit()? as u32
            } else {
                0
            };
            self.range <<= 1;
            self.value = (self.value << 1) | new_bit;
        }
        Ok(bit)
    }

    /// Read one boolean with probability 128 (uniform)
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        self.read_bool(128)
    }

    /// Read n uniform bits as an unsigned value, MSB first
    #[inline]
    pub fn read_literal(&mut self, n: u8) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Walk a symbol tree until a leaf is reached
    ///
    /// Trees are arrays of signed children: a positive entry is the index
    /// of the next node pair, an entry <= 0 encodes the leaf value as its
    /// negation. Node `i` uses `probs[i >> 1]`.
    #[inline]
    pub fn read_tree(&mut self, tree: &[i8], probs: &[u8]) -> Result<u8> {
        let mut node = 0i16;
        loop {
            let prob = probs[(node >> 1) as usize];
            let bit = self.read_bool(prob)?;
            node = tree[node as usize + bit as usize] as i16;
            if node <= 0 {
                return Ok((-node) as u8);
            }
        }
    }

    /// Close the section: consume the remaining payload as zero padding
    ///
    /// With `strict` set, a non-zero padding bit is a corrupt stream. On
    /// return the outer reader sits exactly at the end of the payload.
    pub fn exit(self, strict: bool) -> Result<()> {
        let mut padding = 0u32;
        let mut bits_left = self.bits_left;
        while bits_left > 0 {
            if self.reader.is_byte_aligned() && bits_left >= 8 {
                padding |= self.reader.read_u8()? as u32;
                bits_left -= 8;
            } else {
                padding |= self.reader.read_bit()? as u32;
                bits_left -= 1;
            }
        }
        if padding != 0 && strict {
            return Err(Error::corrupt(
                self.reader.position(),
                "non-zero arithmetic padding",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_payload() {
        let data = [0u8; 4];
        let mut reader = BitReader::new(&data);
        assert!(BoolDecoder::new(&mut reader, 0).is_err());
    }

    #[test]
    fn test_rejects_short_buffer() {
        let data = [0u8; 2];
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            BoolDecoder::new(&mut reader, 3),
            Err(Error::EndOfStream { .. })
        ));
    }

    #[test]
    fn test_all_zero_payload_reads_zero_bits() {
        // With value 0 every split comparison lands in the lower interval.
        let data = [0u8; 8];
        let mut reader = BitReader::new(&data);
        let mut bool_dec = BoolDecoder::new(&mut reader, 8).unwrap();
        for _ in 0..32 {
            assert!(!bool_dec.read_bit().unwrap());
        }
        bool_dec.exit(true).unwrap();
        assert_eq!(reader.position(), 64);
    }

    #[test]
    fn test_exit_advances_past_payload() {
        let data = [0x00, 0x00, 0x00, 0x00, 0xAB];
        let mut reader = BitReader::new(&data);
        let bool_dec = BoolDecoder::new(&mut reader, 4).unwrap();
        bool_dec.exit(true).unwrap();
        assert_eq!(reader.position(), 32);
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
    }

    #[test]
    fn test_exit_strictness() {
        let data = [0x00, 0x01];
        let mut reader = BitReader::new(&data);
        let bool_dec = BoolDecoder::new(&mut reader, 2).unwrap();
        assert!(bool_dec.exit(true).is_err());

        let mut reader = BitReader::new(&data);
        let bool_dec = BoolDecoder::new(&mut reader, 2).unwrap();
        assert!(bool_dec.exit(false).is_ok());
        assert_eq!(reader.position(), 16);
    }

    #[test]
    fn test_padding_with_zeros_past_end() {
        // A one-byte payload leaves no renorm bits; reads still succeed by
        // clocking in zeros.
        let data = [0x80];
        let mut reader = BitReader::new(&data);
        let mut bool_dec = BoolDecoder::new(&mut reader, 1).unwrap();
        for _ in 0..64 {
            bool_dec.read_bit().unwrap();
        }
        bool_dec.exit(true).unwrap();
    }

    #[test]
    fn test_read_tree_walks_to_leaf() {
        // Partition-shaped tree; value 0 keeps taking the 0-branch, which
        // is the first leaf.
        const TREE: [i8; 6] = [0, 2, -1, 4, -2, -3];
        let data = [0u8; 4];
        let mut reader = BitReader::new(&data);
        let mut bool_dec = BoolDecoder::new(&mut reader, 4).unwrap();
        assert_eq!(bool_dec.read_tree(&TREE, &[128, 128, 128]).unwrap(), 0);
    }
}
