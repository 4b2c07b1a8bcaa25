//! PCM, WAV and MP3 to AMR storage format and back.
//!
//! Input is brought to the codec's sample rate (8 kHz for AMR, 16 kHz for
//! AMR-WB) before it is handed to the frame multiplexer.

use std::borrow::Cow;

use amr_storage::{
    decode_stream, encode_stream, DecodeOptions, DecodeReport, EncodeOptions, EncodeReport,
    Engine, Mode,
};
use log::debug;

pub mod error;
pub mod mp3;
pub mod pcm;
pub mod resample;
pub mod wav;

pub use error::{Error, Result};
pub use mp3::decode_mp3;
pub use resample::resample;
pub use wav::{read_wav, write_wav, WavHeader};

/// Mono 16 bit PCM.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pcm {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl Pcm {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// PCM from float samples in `[-1.0, 1.0)`.
    pub fn from_f32(samples: &[f32], sample_rate: u32) -> Self {
        Self::new(pcm::f32_to_i16(samples), sample_rate)
    }

    pub fn to_f32(&self) -> Vec<f32> {
        pcm::i16_to_f32(&self.samples)
    }
}

impl From<DecodeReport> for Pcm {
    fn from(report: DecodeReport) -> Self {
        let sample_rate = report.sample_rate();
        Self::new(report.pcm, sample_rate)
    }
}

/// Encode PCM at any sample rate into the container variant of `mode`.
pub fn pcm_to_container<E>(
    pcm: &Pcm,
    mode: Mode,
    engine: &E,
    options: &EncodeOptions,
) -> Result<EncodeReport>
where
    E: Engine + ?Sized,
{
    let rate = mode.kind().sample_rate();
    let samples = if pcm.sample_rate == rate {
        Cow::Borrowed(&pcm.samples[..])
    } else {
        debug!("resampling from {} Hz to {} Hz", pcm.sample_rate, rate);
        Cow::Owned(resample(&pcm.samples, pcm.sample_rate, rate)?)
    };

    Ok(encode_stream(&samples, mode, engine, options)?)
}

/// Same as [`pcm_to_container`] for float samples in `[-1.0, 1.0)`.
pub fn pcm_f32_to_container<E>(
    samples: &[f32],
    sample_rate: u32,
    mode: Mode,
    engine: &E,
    options: &EncodeOptions,
) -> Result<EncodeReport>
where
    E: Engine + ?Sized,
{
    pcm_to_container(&Pcm::from_f32(samples, sample_rate), mode, engine, options)
}

/// Decode a storage-format file. The report carries the PCM, its sample rate
/// and any diagnostics met on the way.
pub fn container_to_pcm<E>(data: &[u8], engine: &E, options: &DecodeOptions) -> Result<DecodeReport>
where
    E: Engine + ?Sized,
{
    Ok(decode_stream(data, engine, options)?)
}

/// Encode the first channel of a canonical 16 bit WAV file.
pub fn wav_to_container<E>(
    data: &[u8],
    mode: Mode,
    engine: &E,
    options: &EncodeOptions,
) -> Result<EncodeReport>
where
    E: Engine + ?Sized,
{
    pcm_to_container(&read_wav(data)?, mode, engine, options)
}

/// Encode the first channel of an MP3 file.
pub fn mp3_to_container<E>(
    data: &[u8],
    mode: Mode,
    engine: &E,
    options: &EncodeOptions,
) -> Result<EncodeReport>
where
    E: Engine + ?Sized,
{
    pcm_to_container(&decode_mp3(data)?, mode, engine, options)
}

#[cfg(test)]
mod test {
    use amr_storage::engine::MockEngine;
    use amr_storage::{AmrMode, AmrwbMode, ContainerKind};

    use super::*;

    const MR122: Mode = Mode::Amr(AmrMode::Amr12200);

    #[test]
    fn test_pcm_to_container_resamples() {
        let engine = MockEngine::new();
        let pcm = Pcm::new(vec![0; 44100], 44100);
        let encoded = pcm_to_container(&pcm, MR122, &engine, &EncodeOptions::new()).unwrap();
        assert!(encoded.bytes.starts_with(b"#!AMR\n"));
        assert_eq!(encoded.frames, 50);

        let decoded = container_to_pcm(&encoded.bytes, &engine, &DecodeOptions::new()).unwrap();
        let decoded = Pcm::from(decoded);
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples.len(), 8000);
        assert_eq!(engine.live_handles(), 0);
    }

    #[test]
    fn test_native_rate_is_not_resampled() {
        let engine = MockEngine::new();
        let pcm = Pcm::new((0..320).map(|s| s as i16).collect(), 16000);
        let wb = Mode::Amrwb(AmrwbMode::Amrwb23850);
        let encoded = pcm_to_container(&pcm, wb, &engine, &EncodeOptions::new()).unwrap();
        let direct = encode_stream(&pcm.samples, wb, &engine, &EncodeOptions::new()).unwrap();
        assert_eq!(encoded, direct);
    }

    #[test]
    fn test_float_input() {
        let engine = MockEngine::new();
        let samples = vec![0.25f32; 1600];
        let encoded =
            pcm_f32_to_container(&samples, 8000, MR122, &engine, &EncodeOptions::new()).unwrap();
        assert_eq!(encoded.frames, 10);
        assert_eq!(encoded.bytes.len(), 6 + 10 * 32);
    }

    #[test]
    fn test_wav_to_container() {
        let engine = MockEngine::new();
        let mut data = Vec::new();
        write_wav(&mut data, &[100; 480], 8000).unwrap();

        let encoded = wav_to_container(&data, MR122, &engine, &EncodeOptions::new()).unwrap();
        assert_eq!(encoded.frames, 3);

        let wb = Mode::Amrwb(AmrwbMode::Amrwb12650);
        let encoded = wav_to_container(&data, wb, &engine, &EncodeOptions::new()).unwrap();
        let decoded = container_to_pcm(&encoded.bytes, &engine, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.kind, ContainerKind::Wideband);
        assert_eq!(decoded.pcm.len(), 960);
    }

    #[test]
    fn test_mp3_to_container() {
        let engine = MockEngine::new();
        let encoded =
            mp3_to_container(mp3::test::SILENCE_MP3, MR122, &engine, &EncodeOptions::new())
                .unwrap();
        assert!(encoded.bytes.starts_with(b"#!AMR\n"));
        // 11520 samples at 48 kHz are 1920 at 8 kHz
        assert_eq!(encoded.frames, 12);
        assert_eq!(encoded.bytes.len(), 6 + 12 * 32);
        assert!(encoded.diagnostics.is_empty());
    }

    #[test]
    fn test_errors_propagate() {
        let engine = MockEngine::new();
        assert!(matches!(
            container_to_pcm(b"ID3", &engine, &DecodeOptions::new()),
            Err(Error::Storage(amr_storage::Error::UnknownFormat))
        ));
        assert!(matches!(
            wav_to_container(b"RIFF", MR122, &engine, &EncodeOptions::new()),
            Err(Error::Wav(_))
        ));
        assert!(mp3_to_container(b"", MR122, &engine, &EncodeOptions::new()).is_err());
    }
}
