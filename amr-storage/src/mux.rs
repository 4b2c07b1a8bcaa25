//! PCM to storage-format.

use std::borrow::Cow;

use log::{debug, warn};

use crate::bits::BitWriter;
use crate::consts::{Mode, MAX_TOC_ENTRIES};
use crate::engine::{Engine, FrameEncoder};
use crate::error::{Diagnostic, Error, Result};
use crate::sniff::ContainerKind;
use crate::toc::{encode_chain, TocEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Frames sharing one TOC chain, 1 to 20
    pub frames_per_group: usize,
    /// Zero-pad a trailing partial block instead of dropping it
    pub pad_partial_block: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            frames_per_group: 1,
            pad_partial_block: true,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames_per_group(mut self, frames: usize) -> Self {
        self.frames_per_group = frames;
        self
    }

    pub fn pad_partial_block(mut self, pad: bool) -> Self {
        self.pad_partial_block = pad;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedGroup {
    pub entries: Vec<TocEntry>,
    /// TOC chain followed by the payloads, empty when every block was skipped
    pub bytes: Vec<u8>,
    /// Skipped blocks, `at` counts blocks from the start of the group
    pub diagnostics: Vec<Diagnostic>,
}

/// Encode up to 20 PCM blocks into one TOC group.
///
/// The frame type and quality bit are taken from the header byte of each
/// record the engine hands back. A record whose size or frame type does not
/// fit the container is dropped with an `EngineEncodeFailure` diagnostic.
pub fn encode_group<C>(
    pcm: &[i16],
    kind: ContainerKind,
    mode: Mode,
    encoder: &mut C,
) -> Result<EncodedGroup>
where
    C: FrameEncoder + ?Sized,
{
    if mode.kind() != kind {
        return Err(Error::ModeMismatch { mode, kind });
    }
    let spf = kind.samples_per_frame();
    if pcm.len() % spf != 0 {
        return Err(Error::InvalidBlockLength {
            frame: spf,
            got: pcm.len(),
        });
    }
    let blocks = pcm.len() / spf;
    if blocks == 0 || blocks > MAX_TOC_ENTRIES {
        return Err(Error::InvalidChainLength(blocks));
    }

    let max_len = kind.max_record_len();
    let mut record = vec![0u8; max_len];
    let mut group = EncodedGroup::default();
    let mut payloads = Vec::with_capacity(blocks * max_len);

    for (idx, block) in pcm.chunks_exact(spf).enumerate() {
        let size = encoder.encode_frame(block, mode, &mut record)?;
        let entry = TocEntry::from_byte(record[0]);
        match entry.record_len(kind) {
            Some(len) if size > 0 && size <= max_len && len <= size => {
                group.entries.push(TocEntry::new(entry.frame_type, entry.quality));
                payloads.extend_from_slice(&record[1..len]);
            }
            _ => group.diagnostics.push(Diagnostic {
                at: idx,
                error: Error::EngineEncodeFailure { size },
            }),
        }
    }

    if group.entries.is_empty() {
        return Ok(group);
    }

    group.bytes = vec![0u8; group.entries.len() + payloads.len()];
    let mut writer = BitWriter::new(&mut group.bytes);
    encode_chain(&mut writer, &group.entries)?;
    writer.write_bytes_unaligned(&payloads);
    Ok(group)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeReport {
    pub kind: ContainerKind,
    /// Complete file, magic header included
    pub bytes: Vec<u8>,
    pub groups: usize,
    pub frames: usize,
    /// Skipped blocks, `at` counts blocks from the start of the input
    pub diagnostics: Vec<Diagnostic>,
}

/// Encode PCM at the codec's sample rate into a storage-format file of the
/// variant `mode` belongs to.
pub fn encode_stream<E>(
    pcm: &[i16],
    mode: Mode,
    engine: &E,
    options: &EncodeOptions,
) -> Result<EncodeReport>
where
    E: Engine + ?Sized,
{
    if options.frames_per_group == 0 || options.frames_per_group > MAX_TOC_ENTRIES {
        return Err(Error::InvalidChainLength(options.frames_per_group));
    }

    let kind = mode.kind();
    let spf = kind.samples_per_frame();
    let tail = pcm.len() % spf;
    let pcm: Cow<[i16]> = if tail == 0 {
        Cow::Borrowed(pcm)
    } else if options.pad_partial_block {
        let mut padded = pcm.to_vec();
        padded.resize(pcm.len() + spf - tail, 0);
        Cow::Owned(padded)
    } else {
        debug!("dropping {} trailing samples", tail);
        Cow::Borrowed(&pcm[..pcm.len() - tail])
    };

    let mut encoder = engine.encoder(kind)?;
    let mut report = EncodeReport {
        kind,
        bytes: kind.magic().to_vec(),
        groups: 0,
        frames: 0,
        diagnostics: Vec::new(),
    };

    let group_len = spf * options.frames_per_group;
    for (idx, chunk) in pcm.chunks(group_len).enumerate() {
        let first_block = idx * options.frames_per_group;
        let group = encode_group(chunk, kind, mode, &mut encoder)?;

        for diag in group.diagnostics {
            let diag = Diagnostic {
                at: first_block + diag.at,
                error: diag.error,
            };
            warn!("skipped block: {}", diag);
            report.diagnostics.push(diag);
        }
        if group.entries.is_empty() {
            continue;
        }

        debug!(
            "group {}: {} frames, {} bytes",
            report.groups,
            group.entries.len(),
            group.bytes.len()
        );
        report.groups += 1;
        report.frames += group.entries.len();
        report.bytes.extend_from_slice(&group.bytes);
    }

    Ok(report)
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::consts::{AmrMode, AmrwbMode};
    use crate::demux::{decode_stream, scan, DecodeOptions};
    use crate::engine::MockEngine;

    const MR122: Mode = Mode::Amr(AmrMode::Amr12200);

    #[test]
    fn test_single_zero_block() {
        let engine = MockEngine::new();
        let mode: Mode = "12.2k".parse().unwrap();
        let report = encode_stream(&[0; 160], mode, &engine, &EncodeOptions::new()).unwrap();

        assert_eq!(&report.bytes[..6], b"#!AMR\n");
        assert_eq!(report.bytes[6], 0x3c);
        assert_eq!(report.bytes.len(), 6 + 1 + 31);
        assert_eq!(report.frames, 1);
        assert!(report.diagnostics.is_empty());
        assert_eq!(engine.live_handles(), 0);
    }

    #[test]
    fn test_grouped_frames_chain_toc() {
        let engine = MockEngine::new();
        let options = EncodeOptions::new().with_frames_per_group(3);
        let report = encode_stream(&[0; 7 * 160], MR122, &engine, &options).unwrap();

        assert_eq!(report.groups, 3);
        assert_eq!(report.frames, 7);
        assert_eq!(&report.bytes[6..9], &[0xbc, 0xbc, 0x3c]);
        // second group starts after 3 TOC bytes and 3 payloads
        assert_eq!(&report.bytes[6 + 3 + 93..6 + 3 + 93 + 3], &[0xbc, 0xbc, 0x3c]);
        assert_eq!(report.bytes[6 + 2 * (3 + 93)], 0x3c);
        assert_eq!(report.bytes.len(), 6 + 7 * 32);

        let decoded = decode_stream(&report.bytes, &engine, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.groups, 3);
        assert_eq!(decoded.frames, 7);
    }

    #[test]
    fn test_engine_failures_are_skipped() {
        let engine = MockEngine::new().failing_every(2);
        let report = encode_stream(&[0; 4 * 160], MR122, &engine, &EncodeOptions::new()).unwrap();

        assert_eq!(report.frames, 2);
        assert_eq!(report.groups, 2);
        assert_eq!(report.bytes.len(), 6 + 2 * 32);
        assert_eq!(
            report.diagnostics,
            vec![
                Diagnostic {
                    at: 1,
                    error: Error::EngineEncodeFailure { size: 0 }
                },
                Diagnostic {
                    at: 3,
                    error: Error::EngineEncodeFailure { size: 0 }
                },
            ]
        );
    }

    #[test]
    fn test_engine_error_codes_skip_one_block() {
        let options = EncodeOptions::new().with_frames_per_group(2);

        // negative return, blocks 2 and 5 are lost
        let engine = MockEngine::new().failing_with(3, -1);
        let report = encode_stream(&[0; 6 * 160], MR122, &engine, &options).unwrap();
        assert_eq!(report.groups, 3);
        assert_eq!(report.frames, 4);
        assert_eq!(&report.bytes[6..8], &[0xbc, 0x3c]);
        assert_eq!(report.bytes[6 + 2 * 32], 0x3c);
        assert_eq!(report.bytes.len(), 6 + 4 * 32);
        assert_eq!(
            report.diagnostics,
            vec![
                Diagnostic {
                    at: 2,
                    error: Error::EngineEncodeFailure { size: 0 }
                },
                Diagnostic {
                    at: 5,
                    error: Error::EngineEncodeFailure { size: 0 }
                },
            ]
        );
        assert_eq!(engine.live_handles(), 0);

        // larger than any record
        let engine = MockEngine::new().failing_with(2, 99);
        let report = encode_stream(&[0; 4 * 160], MR122, &engine, &options).unwrap();
        assert_eq!(report.frames, 2);
        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(
            report.diagnostics[0].error,
            Error::EngineEncodeFailure { size: 99 }
        );

        let decoded = decode_stream(&report.bytes, &engine, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.pcm.len(), 2 * 160);
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_bad_engine_frame_type() {
        // frame type 15 is not a storage-format frame
        let engine = MockEngine::new().with_record_header(0x7c);
        let report = encode_stream(&[0; 320], MR122, &engine, &EncodeOptions::new()).unwrap();
        assert_eq!(report.bytes, b"#!AMR\n");
        assert_eq!(report.frames, 0);
        assert_eq!(report.diagnostics.len(), 2);

        // the engine's frame type wins over the requested mode
        let engine = MockEngine::new().with_record_header(0x44);
        let report = encode_stream(&[0; 160], MR122, &engine, &EncodeOptions::new()).unwrap();
        assert_eq!(report.bytes[6], 0x44);
        assert_eq!(report.bytes.len(), 6 + 6);
    }

    #[test]
    fn test_group_preconditions() {
        let engine = MockEngine::new();
        let mut encoder = engine.encoder(ContainerKind::Narrowband).unwrap();
        let wb = Mode::Amrwb(AmrwbMode::Amrwb23850);
        assert_eq!(
            encode_group(&[0; 160], ContainerKind::Narrowband, wb, &mut encoder),
            Err(Error::ModeMismatch {
                mode: wb,
                kind: ContainerKind::Narrowband
            })
        );
        assert_eq!(
            encode_group(&[0; 100], ContainerKind::Narrowband, MR122, &mut encoder),
            Err(Error::InvalidBlockLength {
                frame: 160,
                got: 100
            })
        );
        assert_eq!(
            encode_group(&[0; 21 * 160], ContainerKind::Narrowband, MR122, &mut encoder),
            Err(Error::InvalidChainLength(21))
        );
        drop(encoder);

        let options = EncodeOptions::new().with_frames_per_group(0);
        assert_eq!(
            encode_stream(&[0; 160], MR122, &engine, &options),
            Err(Error::InvalidChainLength(0))
        );
        assert_eq!(engine.live_handles(), 0);
    }

    #[test]
    fn test_round_trip_keeps_geometry() {
        let mut rng = StdRng::seed_from_u64(0x4d52);
        let pcm: Vec<i16> = (0..1000).map(|_| rng.gen()).collect();
        let engine = MockEngine::new();

        for mode in [MR122, Mode::Amr(AmrMode::Amr4750)] {
            let encoded = encode_stream(&pcm, mode, &engine, &EncodeOptions::new()).unwrap();
            let decoded = decode_stream(&encoded.bytes, &engine, &DecodeOptions::new()).unwrap();
            assert_eq!(decoded.kind, ContainerKind::Narrowband);
            assert_eq!(decoded.pcm.len(), 7 * 160);
            assert!(decoded.diagnostics.is_empty());

            let options = EncodeOptions::new().pad_partial_block(false);
            let encoded = encode_stream(&pcm, mode, &engine, &options).unwrap();
            assert_eq!(scan(&encoded.bytes).unwrap().sample_count(), 6 * 160);
        }

        let wb = Mode::Amrwb(AmrwbMode::Amrwb12650);
        let options = EncodeOptions::new().with_frames_per_group(20);
        let encoded = encode_stream(&pcm, wb, &engine, &options).unwrap();
        assert!(encoded.bytes.starts_with(b"#!AMR-WB\n"));
        let decoded = decode_stream(&encoded.bytes, &engine, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.kind, ContainerKind::Wideband);
        assert_eq!(decoded.pcm.len(), 4 * 320);
        assert_eq!(engine.live_handles(), 0);
    }
}
