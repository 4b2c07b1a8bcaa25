//! Canonical 44 byte RIFF/WAVE files, 16 bit PCM only.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};
use crate::Pcm;

pub const WAV_HEADER_LEN: usize = 44;

/// `fmt ` chunk compression code of linear PCM
const WAVE_FORMAT_PCM: u16 = 0x0001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Length of the data chunk as declared
    pub data_len: u32,
}

fn read_tag<R: Read>(reader: &mut R, tag: &[u8; 4], what: &'static str) -> Result<()> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    if &buf != tag {
        return Err(Error::Wav(what));
    }
    Ok(())
}

impl WavHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < WAV_HEADER_LEN {
            return Err(Error::Wav("shorter than a canonical header"));
        }

        let mut reader = Cursor::new(&data[..WAV_HEADER_LEN]);
        read_tag(&mut reader, b"RIFF", "missing RIFF tag")?;
        let _riff_len = reader.read_u32::<LittleEndian>()?;
        read_tag(&mut reader, b"WAVE", "missing WAVE tag")?;
        read_tag(&mut reader, b"fmt ", "fmt chunk is not first")?;
        let fmt_len = reader.read_u32::<LittleEndian>()?;
        if fmt_len != 16 {
            return Err(Error::UnsupportedWav(format!("fmt chunk of {} bytes", fmt_len)));
        }

        let compression = reader.read_u16::<LittleEndian>()?;
        if compression != WAVE_FORMAT_PCM {
            return Err(Error::UnsupportedWav(format!(
                "compression code {:#06x}",
                compression
            )));
        }
        let channels = reader.read_u16::<LittleEndian>()?;
        let sample_rate = reader.read_u32::<LittleEndian>()?;
        let _byte_rate = reader.read_u32::<LittleEndian>()?;
        let _block_align = reader.read_u16::<LittleEndian>()?;
        let bits_per_sample = reader.read_u16::<LittleEndian>()?;
        read_tag(&mut reader, b"data", "data chunk does not follow fmt")?;
        let data_len = reader.read_u32::<LittleEndian>()?;

        if channels == 0 {
            return Err(Error::Wav("zero channels"));
        }
        if bits_per_sample != 16 {
            return Err(Error::UnsupportedWav(format!(
                "{} bits per sample",
                bits_per_sample
            )));
        }

        Ok(Self {
            channels,
            sample_rate,
            bits_per_sample,
            data_len,
        })
    }
}

/// Read the first channel of a canonical 16 bit PCM file.
///
/// A data chunk longer than the file is read up to the end of the file.
pub fn read_wav(data: &[u8]) -> Result<Pcm> {
    let header = WavHeader::parse(data)?;
    let body = &data[WAV_HEADER_LEN..];
    let body = &body[..body.len().min(header.data_len as usize)];

    let frame_len = header.channels as usize * 2;
    let samples = body
        .chunks_exact(frame_len)
        .map(|frame| i16::from_le_bytes([frame[0], frame[1]]))
        .collect();

    Ok(Pcm {
        samples,
        sample_rate: header.sample_rate,
    })
}

/// Write mono 16 bit PCM as a canonical WAV file.
pub fn write_wav<W: Write>(mut writer: W, pcm: &[i16], sample_rate: u32) -> Result<()> {
    let data_len = (pcm.len() * 2) as u32;
    let riff_len = 4 + 8 + 16 + 8 + data_len;

    // file header
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(riff_len)?;
    writer.write_all(b"WAVE")?;

    // format chunk
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(WAVE_FORMAT_PCM)?;
    // mono
    writer.write_u16::<LittleEndian>(1)?;
    writer.write_u32::<LittleEndian>(sample_rate)?;
    // avg bytes per second
    writer.write_u32::<LittleEndian>(sample_rate * 2)?;
    // block align
    writer.write_u16::<LittleEndian>(2)?;
    writer.write_u16::<LittleEndian>(16)?;

    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_len)?;
    for sample in pcm {
        writer.write_i16::<LittleEndian>(*sample)?;
    }
    Ok(())
}
