use std::fmt;

use crate::consts::{AMRWB_FRAME_SIZES, AMR_FRAME_SIZES};
use crate::{AMRWB_SAMPLE_RATE, AMR_SAMPLE_RATE};

pub const AMR_MIME_MAGIC: &[u8] = b"#!AMR\n";
pub const AMRWB_MIME_MAGIC: &[u8] = b"#!AMR-WB\n";

/// Storage format variant, decided once from the magic header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Narrowband,
    Wideband,
    Unknown,
}

impl ContainerKind {
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(AMR_MIME_MAGIC) {
            Self::Narrowband
        } else if data.starts_with(AMRWB_MIME_MAGIC) {
            Self::Wideband
        } else {
            Self::Unknown
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }

    /// Magic header, empty for `Unknown`
    pub fn magic(&self) -> &'static [u8] {
        match self {
            Self::Narrowband => AMR_MIME_MAGIC,
            Self::Wideband => AMRWB_MIME_MAGIC,
            Self::Unknown => &[],
        }
    }

    /// Packed record sizes indexed by frame type, TOC byte included.
    ///
    /// `Unknown` has no valid frame types at all.
    pub fn frame_sizes(&self) -> &'static [usize] {
        match self {
            Self::Narrowband => AMR_FRAME_SIZES,
            Self::Wideband => AMRWB_FRAME_SIZES,
            Self::Unknown => &[],
        }
    }

    /// Highest valid frame type index
    pub fn max_frame_type(&self) -> Option<u8> {
        self.frame_sizes().len().checked_sub(1).map(|ft| ft as u8)
    }

    /// Largest record the codec engine may hand back for one frame
    pub fn max_record_len(&self) -> usize {
        self.frame_sizes().iter().copied().max().unwrap_or(0)
    }

    /// Sample rate the codec runs at, 0 for `Unknown`
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::Narrowband => AMR_SAMPLE_RATE,
            Self::Wideband => AMRWB_SAMPLE_RATE,
            Self::Unknown => 0,
        }
    }

    /// Samples in one 20 ms frame
    pub fn samples_per_frame(&self) -> usize {
        self.sample_rate() as usize / 50
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Narrowband => f.write_str("AMR"),
            Self::Wideband => f.write_str("AMR-WB"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(ContainerKind::detect(b"#!AMR\n"), ContainerKind::Narrowband);
        assert_eq!(
            ContainerKind::detect(b"#!AMR\n\x3c\x00\x01"),
            ContainerKind::Narrowband
        );
        assert_eq!(
            ContainerKind::detect(b"#!AMR-WB\n\x04"),
            ContainerKind::Wideband
        );
        assert_eq!(ContainerKind::detect(b""), ContainerKind::Unknown);
        assert_eq!(ContainerKind::detect(b"#!AMR"), ContainerKind::Unknown);
        assert_eq!(ContainerKind::detect(b"#!AMR-WB"), ContainerKind::Unknown);
        assert_eq!(
            ContainerKind::detect(b"#!AMR_MC1.0\n"),
            ContainerKind::Unknown
        );
        assert_eq!(ContainerKind::detect(b"RIFF\0\0\0\0WAVE"), ContainerKind::Unknown);
    }

    #[test]
    fn test_geometry() {
        assert_eq!(ContainerKind::Narrowband.samples_per_frame(), 160);
        assert_eq!(ContainerKind::Wideband.samples_per_frame(), 320);
        assert_eq!(ContainerKind::Narrowband.max_frame_type(), Some(8));
        assert_eq!(ContainerKind::Wideband.max_frame_type(), Some(9));
        assert_eq!(ContainerKind::Unknown.max_frame_type(), None);
        assert_eq!(ContainerKind::Narrowband.max_record_len(), 32);
        assert_eq!(ContainerKind::Wideband.max_record_len(), 61);
    }
}
