use log::debug;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::{Error, Result};
use crate::pcm::{f32_to_i16, i16_to_f32};

const CHUNK_SIZE: usize = 1024;

/// Convert mono PCM from `from` Hz to `to` Hz.
///
/// The output holds `len * to / from` samples (rounded down) and is aligned
/// with the input, the filter delay is trimmed off.
pub fn resample(pcm: &[i16], from: u32, to: u32) -> Result<Vec<i16>> {
    if from == 0 {
        return Err(Error::InvalidSampleRate(from));
    }
    if to == 0 {
        return Err(Error::InvalidSampleRate(to));
    }
    if from == to {
        return Ok(pcm.to_vec());
    }

    let expected = (pcm.len() as u64 * to as u64 / from as u64) as usize;
    if expected == 0 {
        return Ok(Vec::new());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(to as f64 / from as f64, 1.0, params, CHUNK_SIZE, 1)
        .map_err(|e| Error::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let input = i16_to_f32(pcm);
    let mut output = Vec::with_capacity(delay + expected + CHUNK_SIZE);

    let mut chunks = input.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let out = resampler
            .process(&[chunk], None)
            .map_err(|e| Error::Resample(e.to_string()))?;
        output.extend_from_slice(&out[0]);
    }
    let rest = [chunks.remainder()];
    if !rest[0].is_empty() {
        let out = resampler
            .process_partial(Some(&rest[..]), None)
            .map_err(|e| Error::Resample(e.to_string()))?;
        output.extend_from_slice(&out[0]);
    }

    // push silence through until the delayed tail is out
    while output.len() < delay + expected {
        let out = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| Error::Resample(e.to_string()))?;
        if out[0].is_empty() {
            break;
        }
        output.extend_from_slice(&out[0]);
    }

    debug!(
        "resampled {} samples at {} Hz to {} at {} Hz",
        pcm.len(),
        from,
        expected,
        to
    );
    let mut out = f32_to_i16(output.get(delay..).unwrap_or_default());
    out.resize(expected, 0);
    Ok(out)
}
