use crate::bits::{BitReader, BitWriter};
use crate::consts::MAX_TOC_ENTRIES;
use crate::error::{Error, Result};
use crate::sniff::ContainerKind;

/// Bits taken by one octet-aligned TOC entry
pub const TOC_ENTRY_BITS: usize = 8;

/// One octet-aligned TOC entry, see RFC 4867 section 4.4.2.
///
/// ```text
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// |F|  FT   |Q|P|P|
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TocEntry {
    /// F, another entry follows this one
    pub continuation: bool,
    /// FT, frame type index
    pub frame_type: u8,
    /// Q, frame quality indicator
    pub quality: bool,
}

impl TocEntry {
    pub fn new(frame_type: u8, quality: bool) -> Self {
        Self {
            continuation: false,
            frame_type: frame_type & 0x0f,
            quality,
        }
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            continuation: (byte >> 7) == 1,
            frame_type: (byte >> 3) & 0x0f,
            quality: ((byte >> 2) & 0x01) == 1,
        }
    }

    /// Serialised entry, padding bits zero
    pub fn to_byte(&self) -> u8 {
        ((self.continuation as u8) << 7) | ((self.frame_type & 0x0f) << 3) | ((self.quality as u8) << 2)
    }

    /// Header byte of the packed single-frame record the codec engine speaks:
    /// the entry with F cleared.
    pub fn frame_header(&self) -> u8 {
        self.to_byte() & 0b0111_1100
    }

    /// Packed record length (header byte included), `None` for frame types
    /// the container variant does not define.
    pub fn record_len(&self, kind: ContainerKind) -> Option<usize> {
        kind.frame_sizes().get(self.frame_type as usize).copied()
    }

    /// Payload bytes that follow the TOC for this entry
    pub fn payload_len(&self, kind: ContainerKind) -> Option<usize> {
        self.record_len(kind).map(|len| len - 1)
    }

    pub fn read(reader: &mut BitReader) -> Self {
        let continuation = reader.read_bit();
        let frame_type = reader.read_bits(4) as u8;
        let quality = reader.read_bit();
        // octet-aligned mode, two padding bits
        reader.read_bits(2);
        Self {
            continuation,
            frame_type,
            quality,
        }
    }

    pub fn write(&self, writer: &mut BitWriter) {
        writer.write_bit(self.continuation);
        writer.write_bits(4, self.frame_type as u32);
        writer.write_bit(self.quality);
        writer.write_bits(2, 0);
    }
}

/// Read one TOC chain, up to and including the first entry with F cleared.
///
/// Frame types are not validated here; that is up to the caller, which knows
/// how far into the chain it can trust the payload layout.
pub fn decode_chain(reader: &mut BitReader) -> Result<Vec<TocEntry>> {
    let mut chain = Vec::with_capacity(4);
    loop {
        if chain.len() == MAX_TOC_ENTRIES {
            return Err(Error::MalformedToc {
                limit: MAX_TOC_ENTRIES,
            });
        }
        if reader.bits_left() < TOC_ENTRY_BITS {
            return Err(Error::TruncatedToc {
                entries: chain.len(),
            });
        }

        let entry = TocEntry::read(reader);
        chain.push(entry);
        if !entry.continuation {
            return Ok(chain);
        }
    }
}

/// Write `entries` as one chain. F is set on every entry but the last,
/// whatever the entries carry.
pub fn encode_chain(writer: &mut BitWriter, entries: &[TocEntry]) -> Result<()> {
    if entries.is_empty() || entries.len() > MAX_TOC_ENTRIES {
        return Err(Error::InvalidChainLength(entries.len()));
    }

    let last = entries.len() - 1;
    for (idx, entry) in entries.iter().enumerate() {
        let entry = TocEntry {
            continuation: idx != last,
            ..*entry
        };
        entry.write(writer);
    }
    Ok(())
}
