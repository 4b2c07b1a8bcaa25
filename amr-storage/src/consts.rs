use std::fmt;
use std::str::FromStr;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::Error;
use crate::sniff::ContainerKind;

/// Packed AMR record sizes (frame header byte included), 3GPP TS 26.101 table 1a.
pub(crate) const AMR_FRAME_SIZES: &[usize] = &[13, 14, 16, 18, 20, 21, 27, 32, 6];
/// Packed AMR-WB record sizes (frame header byte included), 3GPP TS 26.201 table 1a.
pub(crate) const AMRWB_FRAME_SIZES: &[usize] = &[18, 24, 33, 37, 41, 47, 51, 59, 61, 6];

/// Upper bound on the entries of one TOC chain
pub const MAX_TOC_ENTRIES: usize = 20;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, FromPrimitive, PartialEq, Eq, Hash)]
pub enum AmrMode {
    Amr4750 = 0,
    Amr5150 = 1,
    Amr5900 = 2,
    Amr6700 = 3,
    Amr7400 = 4,
    Amr7950 = 5,
    Amr10200 = 6,
    #[default]
    Amr12200 = 7,
}

impl AmrMode {
    pub const ALL: [AmrMode; 8] = [
        Self::Amr4750,
        Self::Amr5150,
        Self::Amr5900,
        Self::Amr6700,
        Self::Amr7400,
        Self::Amr7950,
        Self::Amr10200,
        Self::Amr12200,
    ];

    pub fn bit_rate(self) -> u32 {
        match self {
            Self::Amr4750 => 4750,
            Self::Amr5150 => 5150,
            Self::Amr5900 => 5900,
            Self::Amr6700 => 6700,
            Self::Amr7400 => 7400,
            Self::Amr7950 => 7950,
            Self::Amr10200 => 10200,
            Self::Amr12200 => 12200,
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, FromPrimitive, PartialEq, Eq, Hash)]
pub enum AmrwbMode {
    Amrwb6600 = 0,
    Amrwb8850 = 1,
    Amrwb12650 = 2,
    Amrwb14250 = 3,
    Amrwb15850 = 4,
    Amrwb18250 = 5,
    Amrwb19850 = 6,
    Amrwb23050 = 7,
    #[default]
    Amrwb23850 = 8,
}

impl AmrwbMode {
    pub const ALL: [AmrwbMode; 9] = [
        Self::Amrwb6600,
        Self::Amrwb8850,
        Self::Amrwb12650,
        Self::Amrwb14250,
        Self::Amrwb15850,
        Self::Amrwb18250,
        Self::Amrwb19850,
        Self::Amrwb23050,
        Self::Amrwb23850,
    ];

    pub fn bit_rate(self) -> u32 {
        match self {
            Self::Amrwb6600 => 6600,
            Self::Amrwb8850 => 8850,
            Self::Amrwb12650 => 12650,
            Self::Amrwb14250 => 14250,
            Self::Amrwb15850 => 15850,
            Self::Amrwb18250 => 18250,
            Self::Amrwb19850 => 19850,
            Self::Amrwb23050 => 23050,
            Self::Amrwb23850 => 23850,
        }
    }
}

/// Speech bitrate requested from the codec engine.
///
/// The mode also fixes the container variant: every rate label is unique
/// across AMR and AMR-WB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Amr(AmrMode),
    Amrwb(AmrwbMode),
}

impl Default for Mode {
    fn default() -> Self {
        Self::Amr(AmrMode::default())
    }
}

impl Mode {
    /// Mode from its frame type index, e.g. `0` to `7` for AMR.
    pub fn from_index(kind: ContainerKind, index: u8) -> Option<Self> {
        match kind {
            ContainerKind::Narrowband => AmrMode::from_u8(index).map(Self::Amr),
            ContainerKind::Wideband => AmrwbMode::from_u8(index).map(Self::Amrwb),
            ContainerKind::Unknown => None,
        }
    }

    pub fn kind(self) -> ContainerKind {
        match self {
            Self::Amr(_) => ContainerKind::Narrowband,
            Self::Amrwb(_) => ContainerKind::Wideband,
        }
    }

    /// Frame type index the engine writes for this mode
    pub fn frame_type(self) -> u8 {
        match self {
            Self::Amr(m) => m as u8,
            Self::Amrwb(m) => m as u8,
        }
    }

    pub fn bit_rate(self) -> u32 {
        match self {
            Self::Amr(m) => m.bit_rate(),
            Self::Amrwb(m) => m.bit_rate(),
        }
    }

    fn all() -> impl Iterator<Item = Mode> {
        AmrMode::ALL
            .into_iter()
            .map(Self::Amr)
            .chain(AmrwbMode::ALL.into_iter().map(Self::Amrwb))
    }
}

impl fmt::Display for Mode {
    /// Rate label in kbit/s, e.g. `12.2k` or `23.85k`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let br = self.bit_rate();
        let mut frac = format!("{:03}", br % 1000);
        while frac.len() > 1 && frac.ends_with('0') {
            frac.pop();
        }
        write!(f, "{}.{}k", br / 1000, frac)
    }
}

impl FromStr for Mode {
    type Err = Error;

    /// Accepts rate labels such as `12.2k`, `12.2`, `5.90k` or `23.85K`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let number = label
            .strip_suffix(|c: char| c == 'k' || c == 'K')
            .unwrap_or(label);
        let kbps: f64 = number
            .parse()
            .map_err(|_| Error::InvalidMode(s.to_string()))?;
        let bps = (kbps * 1000.0).round() as i64;
        Self::all()
            .find(|m| m.bit_rate() as i64 == bps)
            .ok_or_else(|| Error::InvalidMode(s.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_labels() {
        assert_eq!(Mode::Amr(AmrMode::Amr12200).to_string(), "12.2k");
        assert_eq!(Mode::Amr(AmrMode::Amr5900).to_string(), "5.9k");
        assert_eq!(Mode::Amr(AmrMode::Amr7950).to_string(), "7.95k");
        assert_eq!(Mode::Amrwb(AmrwbMode::Amrwb23850).to_string(), "23.85k");
        assert_eq!(Mode::Amrwb(AmrwbMode::Amrwb6600).to_string(), "6.6k");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("12.2k".parse::<Mode>(), Ok(Mode::Amr(AmrMode::Amr12200)));
        assert_eq!("12.2".parse::<Mode>(), Ok(Mode::Amr(AmrMode::Amr12200)));
        assert_eq!("5.90k".parse::<Mode>(), Ok(Mode::Amr(AmrMode::Amr5900)));
        assert_eq!(" 23.85K ".parse::<Mode>(), Ok(Mode::Amrwb(AmrwbMode::Amrwb23850)));
        assert_eq!("6.6k".parse::<Mode>(), Ok(Mode::Amrwb(AmrwbMode::Amrwb6600)));
        assert!("12.3k".parse::<Mode>().is_err());
        assert!("fast".parse::<Mode>().is_err());

        for mode in Mode::all() {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
    }

    #[test]
    fn test_mode_from_index() {
        assert_eq!(
            Mode::from_index(ContainerKind::Narrowband, 7),
            Some(Mode::Amr(AmrMode::Amr12200))
        );
        assert_eq!(Mode::from_index(ContainerKind::Narrowband, 8), None);
        assert_eq!(
            Mode::from_index(ContainerKind::Wideband, 8),
            Some(Mode::Amrwb(AmrwbMode::Amrwb23850))
        );
        assert_eq!(Mode::from_index(ContainerKind::Unknown, 0), None);
    }

    #[test]
    fn test_mode_frame_fits_table() {
        for mode in Mode::all() {
            let kind = mode.kind();
            let size = kind.frame_sizes()[mode.frame_type() as usize];
            // payload bits = rate * 20 ms, rounded up to octets
            assert_eq!(size - 1, (mode.bit_rate() as usize / 50 + 7) / 8, "{}", mode);
        }
    }
}
