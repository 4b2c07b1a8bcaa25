//! Sample format helpers.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::Result;

/// Full scale of a 16 bit sample
const FULL_SCALE: f32 = 32768.0;

pub fn sample_to_f32(sample: i16) -> f32 {
    sample as f32 / FULL_SCALE
}

/// Scale to 16 bit, clamping anything outside `[-1.0, 1.0)`.
pub fn sample_from_f32(sample: f32) -> i16 {
    (sample * FULL_SCALE).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

pub fn i16_to_f32(pcm: &[i16]) -> Vec<f32> {
    pcm.iter().copied().map(sample_to_f32).collect()
}

pub fn f32_to_i16(pcm: &[f32]) -> Vec<i16> {
    pcm.iter().copied().map(sample_from_f32).collect()
}

/// Headerless little-endian 16 bit PCM. A trailing odd byte is ignored.
pub fn read_raw(data: &[u8]) -> Vec<i16> {
    let mut pcm = vec![0i16; data.len() / 2];
    LittleEndian::read_i16_into(&data[..pcm.len() * 2], &mut pcm);
    pcm
}

pub fn write_raw<W: Write>(mut writer: W, pcm: &[i16]) -> Result<()> {
    for sample in pcm {
        writer.write_i16::<LittleEndian>(*sample)?;
    }
    Ok(())
}
