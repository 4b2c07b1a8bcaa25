//! Storage-format to PCM.

use std::time::Duration;

use log::{debug, warn};

use crate::bits::BitReader;
use crate::engine::{Engine, FrameDecoder};
use crate::error::{Diagnostic, Error, Result};
use crate::sniff::ContainerKind;
use crate::toc::{decode_chain, TocEntry};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail on the first diagnostic instead of decoding best-effort
    pub strict: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// TOC chain of one group, with the payload it declares.
struct GroupLayout {
    entries: Vec<TocEntry>,
    /// Leading entries whose frame type is valid for the container
    valid: usize,
    /// Payload bytes declared by the valid entries
    declared: usize,
    /// Whole bytes left after the chain
    available: usize,
}

impl GroupLayout {
    fn read(reader: &mut BitReader, kind: ContainerKind) -> Result<Self> {
        let entries = decode_chain(reader)?;
        let valid = entries
            .iter()
            .take_while(|e| e.payload_len(kind).is_some())
            .count();
        let declared = entries[..valid]
            .iter()
            .filter_map(|e| e.payload_len(kind))
            .sum();
        Ok(Self {
            entries,
            valid,
            declared,
            available: reader.bytes_left(),
        })
    }

    fn diagnostics(&self, kind: ContainerKind) -> Vec<Error> {
        let mut diags = Vec::new();
        if self.available < self.declared {
            diags.push(Error::PayloadLengthMismatch {
                declared: self.declared,
                available: self.available,
            });
        }
        if let Some(bad) = self.entries.get(self.valid) {
            diags.push(Error::InvalidFrameType {
                kind,
                index: bad.frame_type,
            });
        }
        diags
    }

    fn is_complete(&self) -> bool {
        self.valid == self.entries.len()
    }
}

/// Output of one TOC group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedGroup {
    pub entries: Vec<TocEntry>,
    pub pcm: Vec<i16>,
    /// Frames handed to the decoder
    pub frames: usize,
    pub diagnostics: Vec<Error>,
    /// False when an invalid frame type cut the chain short. The position of
    /// the next group is unknown in that case.
    pub complete: bool,
}

/// Decode the TOC group at the cursor.
///
/// The cursor ends up after the group's TOC chain and the payload of every
/// decoded frame. Short payloads are decoded as if zero-padded and reported in
/// `diagnostics`, so is a frame type outside the container's table; frames
/// before it are still decoded. TOC chain and engine failures are errors.
pub fn decode_group<D>(
    reader: &mut BitReader,
    kind: ContainerKind,
    decoder: &mut D,
) -> Result<DecodedGroup>
where
    D: FrameDecoder + ?Sized,
{
    if !kind.is_known() {
        return Err(Error::UnknownFormat);
    }

    let layout = GroupLayout::read(reader, kind)?;
    let spf = kind.samples_per_frame();
    let mut pcm = vec![0i16; layout.valid * spf];
    let mut record = vec![0u8; kind.max_record_len()];

    for (entry, block) in layout.entries[..layout.valid]
        .iter()
        .zip(pcm.chunks_exact_mut(spf))
    {
        let len = entry.record_len(kind).unwrap_or(1);
        record[0] = entry.frame_header();
        reader.read_bytes_unaligned(&mut record[1..len]);
        decoder.decode_frame(&record[..len], block)?;
    }

    Ok(DecodedGroup {
        diagnostics: layout.diagnostics(kind),
        complete: layout.is_complete(),
        frames: layout.valid,
        entries: layout.entries,
        pcm,
    })
}

/// Decoded stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeReport {
    pub kind: ContainerKind,
    pub pcm: Vec<i16>,
    pub groups: usize,
    pub frames: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodeReport {
    pub fn sample_rate(&self) -> u32 {
        self.kind.sample_rate()
    }

    pub fn duration(&self) -> Duration {
        samples_to_duration(self.pcm.len(), self.kind)
    }
}

fn samples_to_duration(samples: usize, kind: ContainerKind) -> Duration {
    match kind.sample_rate() {
        0 => Duration::ZERO,
        rate => Duration::from_nanos(samples as u64 * 1_000_000_000 / rate as u64),
    }
}

fn push_diagnostic(
    diagnostics: &mut Vec<Diagnostic>,
    at: usize,
    error: Error,
    options: &DecodeOptions,
) -> Result<()> {
    if options.strict {
        return Err(error);
    }
    let diag = Diagnostic { at, error };
    warn!("{}", diag);
    diagnostics.push(diag);
    Ok(())
}

/// Decode a whole storage-format file.
///
/// The decoder is created once for the stream and released before returning,
/// on success as well as on error.
pub fn decode_stream<E>(data: &[u8], engine: &E, options: &DecodeOptions) -> Result<DecodeReport>
where
    E: Engine + ?Sized,
{
    let kind = ContainerKind::detect(data);
    if !kind.is_known() {
        return Err(Error::UnknownFormat);
    }

    let mut decoder = engine.decoder(kind)?;
    let header = kind.magic().len();
    let mut reader = BitReader::new(&data[header..]);
    let mut report = DecodeReport {
        kind,
        pcm: Vec::new(),
        groups: 0,
        frames: 0,
        diagnostics: Vec::new(),
    };

    while !reader.is_empty() {
        let at = header + reader.byte_pos();
        let group = match decode_group(&mut reader, kind, &mut decoder) {
            Ok(group) => group,
            Err(err @ (Error::MalformedToc { .. } | Error::TruncatedToc { .. })) => {
                push_diagnostic(&mut report.diagnostics, at, err, options)?;
                break;
            }
            Err(err) => return Err(err),
        };

        debug!(
            "group at {}: {} entries, {} frames decoded",
            at,
            group.entries.len(),
            group.frames
        );
        for err in group.diagnostics {
            push_diagnostic(&mut report.diagnostics, at, err, options)?;
        }

        report.groups += 1;
        report.frames += group.frames;
        report.pcm.extend_from_slice(&group.pcm);

        if !group.complete {
            break;
        }
    }

    Ok(report)
}

/// Frame layout of a stream, gathered without decoding anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    pub kind: ContainerKind,
    pub groups: usize,
    pub frames: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl StreamInfo {
    /// PCM samples a full decode yields
    pub fn sample_count(&self) -> usize {
        self.frames * self.kind.samples_per_frame()
    }

    pub fn duration(&self) -> Duration {
        samples_to_duration(self.sample_count(), self.kind)
    }
}

/// Walk the TOC chains of a stream the way `decode_stream` does.
pub fn scan(data: &[u8]) -> Result<StreamInfo> {
    let kind = ContainerKind::detect(data);
    if !kind.is_known() {
        return Err(Error::UnknownFormat);
    }

    let header = kind.magic().len();
    let mut reader = BitReader::new(&data[header..]);
    let mut info = StreamInfo {
        kind,
        groups: 0,
        frames: 0,
        diagnostics: Vec::new(),
    };
    let options = DecodeOptions::default();

    while !reader.is_empty() {
        let at = header + reader.byte_pos();
        let layout = match GroupLayout::read(&mut reader, kind) {
            Ok(layout) => layout,
            Err(err) => {
                push_diagnostic(&mut info.diagnostics, at, err, &options)?;
                break;
            }
        };

        for err in layout.diagnostics(kind) {
            push_diagnostic(&mut info.diagnostics, at, err, &options)?;
        }
        reader.skip_bytes(layout.declared);
        info.groups += 1;
        info.frames += layout.valid;

        if !layout.is_complete() {
            break;
        }
    }

    Ok(info)
}
