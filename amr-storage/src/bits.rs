//! MSB-first bit cursors over fixed byte regions.
//!
//! Running off the end is not an error: reads yield zero bits and writes are
//! dropped, while a sticky `truncated` flag records that it happened.

use bitvec::prelude::*;

pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
    truncated: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            bits: data.view_bits::<Msb0>(),
            pos: 0,
            truncated: false,
        }
    }

    /// Cursor position in bits from the start of the region
    pub fn bit_pos(&self) -> usize {
        self.pos
    }

    /// Index of the byte holding the next bit
    pub fn byte_pos(&self) -> usize {
        self.pos / 8
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.pos % 8 == 0
    }

    pub fn bits_left(&self) -> usize {
        self.bits.len() - self.pos
    }

    /// Whole bytes left after the cursor
    pub fn bytes_left(&self) -> usize {
        self.bits_left() / 8
    }

    pub fn is_empty(&self) -> bool {
        self.bits_left() == 0
    }

    /// Whether any read so far wanted more bits than the region had.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn read_bit(&mut self) -> bool {
        self.read_bits(1) == 1
    }

    /// Read `n` bits, most significant first.
    ///
    /// Bits past the end of the region read as zero.
    ///
    /// # Panics
    ///
    /// Panics if `n` is larger than 32.
    pub fn read_bits(&mut self, n: u32) -> u32 {
        assert!(n <= 32, "cannot read {} bits into a u32", n);
        if n == 0 {
            return 0;
        }

        let n = n as usize;
        let avail = n.min(self.bits_left());
        if avail < n {
            self.truncated = true;
        }
        if avail == 0 {
            return 0;
        }

        let value = self.bits[self.pos..self.pos + avail].load_be::<u32>() << (n - avail);
        self.pos += avail;
        value
    }

    pub fn skip_bits(&mut self, n: usize) {
        if n > self.bits_left() {
            self.truncated = true;
        }
        self.pos += n.min(self.bits_left());
    }

    pub fn skip_bytes(&mut self, n: usize) {
        self.skip_bits(n.saturating_mul(8));
    }

    /// Fill `buf` with bytes starting at the cursor, whatever its bit offset.
    ///
    /// A trailing partial byte lands in the high bits of its destination;
    /// destination bytes past the end of the region are zeroed. Returns the
    /// number of (possibly partial) bytes copied.
    pub fn read_bytes_unaligned(&mut self, buf: &mut [u8]) -> usize {
        let mut copied = 0;
        for byte in buf.iter_mut() {
            let take = self.bits_left().min(8);
            if take < 8 {
                self.truncated = true;
            }
            if take == 0 {
                *byte = 0;
                continue;
            }

            *byte = self.bits[self.pos..self.pos + take].load_be::<u8>() << (8 - take);
            self.pos += take;
            copied += 1;
        }
        copied
    }
}

pub struct BitWriter<'a> {
    bits: &'a mut BitSlice<u8, Msb0>,
    pos: usize,
    truncated: bool,
}

impl<'a> BitWriter<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            bits: data.view_bits_mut::<Msb0>(),
            pos: 0,
            truncated: false,
        }
    }

    pub fn bit_pos(&self) -> usize {
        self.pos
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.pos % 8 == 0
    }

    pub fn bits_left(&self) -> usize {
        self.bits.len() - self.pos
    }

    /// Bytes touched so far, counting a partially written one
    pub fn bytes_written(&self) -> usize {
        (self.pos + 7) / 8
    }

    /// Whether any write so far was cut short by the end of the region.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(1, bit as u32);
    }

    /// Write the low `n` bits of `value`, most significant first.
    ///
    /// Destination bits are overwritten, so the region does not need to be
    /// zeroed beforehand. Bits that do not fit are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `n` is larger than 32.
    pub fn write_bits(&mut self, n: u32, value: u32) {
        assert!(n <= 32, "cannot write {} bits from a u32", n);
        if n == 0 {
            return;
        }

        let n = n as usize;
        let value = if n == 32 {
            value
        } else {
            value & ((1 << n) - 1)
        };
        let avail = n.min(self.bits_left());
        if avail < n {
            self.truncated = true;
        }
        if avail == 0 {
            return;
        }

        self.bits[self.pos..self.pos + avail].store_be::<u32>(value >> (n - avail));
        self.pos += avail;
    }

    /// Copy `buf` to the cursor, whatever its bit offset.
    ///
    /// Returns the number of (possibly partial) bytes written.
    pub fn write_bytes_unaligned(&mut self, buf: &[u8]) -> usize {
        let mut written = 0;
        for byte in buf {
            let take = self.bits_left().min(8);
            if take < 8 {
                self.truncated = true;
            }
            if take == 0 {
                break;
            }

            self.bits[self.pos..self.pos + take].store_be::<u8>(*byte >> (8 - take));
            self.pos += take;
            written += 1;
        }
        written
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn test_read_bits_msb_first() {
        let data = [0xa5, 0xc3];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bit());
        assert!(!reader.read_bit());
        assert_eq!(reader.read_bits(4), 0b1001);
        assert_eq!(reader.read_bits(6), 0b01_1100);
        assert!(!reader.is_byte_aligned());
        assert_eq!(reader.read_bits(4), 0b0011);
        assert!(reader.is_empty());
        assert!(!reader.truncated());
    }

    #[test]
    fn test_read_past_end_is_zero_padded() {
        let data = [0xff];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(4);
        assert_eq!(reader.read_bits(8), 0xf0);
        assert!(reader.truncated());
        assert_eq!(reader.read_bits(32), 0);
        assert_eq!(reader.bit_pos(), 8);
    }

    #[test]
    fn test_read_bytes_unaligned() {
        let data = [0b1010_1111, 0b0000_1111, 0xff];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(2);

        let mut buf = [0; 2];
        assert_eq!(reader.read_bytes_unaligned(&mut buf), 2);
        assert_eq!(buf, [0xbc, 0x3f]);
        assert_eq!(reader.bit_pos(), 18);
        assert_eq!(reader.read_bits(6), 0b11_1111);
        assert!(!reader.truncated());
    }

    #[test]
    fn test_read_bytes_unaligned_short_copy() {
        let data = [0xff, 0x80];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(4);

        let mut buf = [0xaa; 3];
        assert_eq!(reader.read_bytes_unaligned(&mut buf), 2);
        assert_eq!(buf, [0xf8, 0x00, 0x00]);
        assert!(reader.truncated());
        assert!(reader.is_empty());
    }

    #[test]
    fn test_zero_length_copy() {
        let data = [0x12];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bytes_unaligned(&mut []), 0);
        assert_eq!(reader.bit_pos(), 0);

        let mut out = [0u8; 1];
        let mut writer = BitWriter::new(&mut out);
        assert_eq!(writer.write_bytes_unaligned(&[]), 0);
        assert_eq!(writer.bit_pos(), 0);
    }

    #[test]
    fn test_write_overwrites_dirty_buffer() {
        let mut out = [0xff; 2];
        let mut writer = BitWriter::new(&mut out);
        writer.write_bits(3, 0b010);
        writer.write_bytes_unaligned(&[0x00]);
        assert_eq!(writer.bytes_written(), 2);
        assert_eq!(out, [0b0100_0000, 0b0001_1111]);
    }

    #[test]
    fn test_write_past_end_is_dropped() {
        let mut out = [0u8; 1];
        let mut writer = BitWriter::new(&mut out);
        writer.write_bits(4, 0xf);
        writer.write_bits(8, 0xa5);
        assert!(writer.truncated());
        assert_eq!(writer.write_bytes_unaligned(&[0xff]), 0);
        assert_eq!(out, [0xfa]);
    }

    #[test]
    fn test_bits_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x414d52);
        for offset in 0..8u32 {
            let fields: Vec<(u32, u32)> = (0..64)
                .map(|_| {
                    let n = rng.gen_range(1..=32u32);
                    let v = if n == 32 {
                        rng.gen::<u32>()
                    } else {
                        rng.gen::<u32>() & ((1 << n) - 1)
                    };
                    (n, v)
                })
                .collect();
            let total: u32 = offset + fields.iter().map(|(n, _)| n).sum::<u32>();

            let mut buf = vec![0x5a; (total as usize + 7) / 8];
            let mut writer = BitWriter::new(&mut buf);
            writer.write_bits(offset, 0);
            for (n, v) in &fields {
                writer.write_bits(*n, *v);
            }
            assert!(!writer.truncated());

            let mut reader = BitReader::new(&buf);
            assert_eq!(reader.read_bits(offset), 0);
            for (n, v) in &fields {
                assert_eq!(reader.read_bits(*n), *v, "width {} at offset {}", n, offset);
            }
            assert!(!reader.truncated());
        }
    }

    #[test]
    fn test_bytes_round_trip_unaligned() {
        let payload = [0x00, 0xff, 0x3c, 0x81, 0x7e];
        for offset in 0..8u32 {
            let mut buf = [0xcc; 6];
            let mut writer = BitWriter::new(&mut buf);
            writer.write_bits(offset, 0);
            assert_eq!(writer.write_bytes_unaligned(&payload), payload.len());

            let mut reader = BitReader::new(&buf);
            reader.skip_bits(offset as usize);
            let mut out = [0; 5];
            assert_eq!(reader.read_bytes_unaligned(&mut out), payload.len());
            assert_eq!(out, payload);
        }
    }
}
