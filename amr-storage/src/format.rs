use std::io::{ErrorKind, Seek, SeekFrom};

use symphonia_core::audio::Channels;
use symphonia_core::codecs::CodecParameters;
use symphonia_core::errors::{
    decode_error, seek_error, unsupported_error, Error, Result, SeekErrorKind,
};
use symphonia_core::formats::{
    Cue, FormatOptions, FormatReader, Packet, SeekMode, SeekTo, SeekedTo, Track,
};
use symphonia_core::io::{MediaSource, MediaSourceStream, ReadBytes};
use symphonia_core::meta::{Metadata, MetadataLog};
use symphonia_core::probe::{Descriptor, Instantiate, QueryDescriptor};
use symphonia_core::support_format;
use symphonia_core::units::TimeBase;

use crate::consts::MAX_TOC_ENTRIES;
use crate::dec::{CODEC_TYPE_AMR, CODEC_TYPE_AMRWB};
use crate::sniff::{ContainerKind, AMRWB_MIME_MAGIC, AMR_MIME_MAGIC};
use crate::toc::TocEntry;

/// AMR and AMR-WB storage format reader, RFC 4867 section 5.
///
/// Every packet is one TOC group: the chain followed by its payloads, as
/// `decode_group` expects them. Packet timestamps count samples.
pub struct AmrReader {
    reader: MediaSourceStream,
    kind: ContainerKind,
    tracks: Vec<Track>,
    cues: Vec<Cue>,
    metadata: MetadataLog,
    data_start: u64,
    next_ts: u64,
}

impl AmrReader {
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Read one TOC group, returning it with the number of frames it holds.
    fn read_group(&mut self) -> Result<(Box<[u8]>, usize)> {
        let mut chain = Vec::with_capacity(1);
        loop {
            if chain.len() == MAX_TOC_ENTRIES {
                return decode_error("amr: toc chain too long");
            }
            let entry = TocEntry::from_byte(self.reader.read_byte()?);
            chain.push(entry);
            if !entry.continuation {
                break;
            }
        }

        let mut payload_len = 0;
        for entry in &chain {
            match entry.payload_len(self.kind) {
                Some(len) => payload_len += len,
                None => return decode_error("amr: invalid frame type"),
            }
        }

        let mut data = vec![0u8; chain.len() + payload_len];
        for (byte, entry) in data.iter_mut().zip(&chain) {
            *byte = entry.to_byte();
        }
        self.reader.read_buf_exact(&mut data[chain.len()..])?;
        Ok((data.into_boxed_slice(), chain.len()))
    }
}

impl QueryDescriptor for AmrReader {
    fn query() -> &'static [Descriptor] {
        &[
            support_format!(
                "amr",
                "Adaptive Multi-Rate Storage Format",
                &["amr"],
                &["audio/AMR"],
                &[AMR_MIME_MAGIC]
            ),
            support_format!(
                "amrwb",
                "Adaptive Multi-Rate Wideband Storage Format",
                &["awb"],
                &["audio/AMR-WB"],
                &[AMRWB_MIME_MAGIC]
            ),
        ]
    }

    fn score(_context: &[u8]) -> u8 {
        255
    }
}

impl FormatReader for AmrReader {
    fn try_new(mut source: MediaSourceStream, _options: &FormatOptions) -> Result<Self> {
        let mut magic = [0u8; 9];
        source.read_buf_exact(&mut magic[..AMR_MIME_MAGIC.len()])?;
        if magic[..AMR_MIME_MAGIC.len()] != *AMR_MIME_MAGIC {
            source.read_buf_exact(&mut magic[AMR_MIME_MAGIC.len()..])?;
        }
        let kind = ContainerKind::detect(&magic);
        if !kind.is_known() {
            return unsupported_error("amr: missing storage format magic");
        }

        let codec = match kind {
            ContainerKind::Narrowband => CODEC_TYPE_AMR,
            _ => CODEC_TYPE_AMRWB,
        };
        let sample_rate = kind.sample_rate();
        let mut codec_params = CodecParameters::new();
        codec_params
            .for_codec(codec)
            .with_sample_rate(sample_rate)
            .with_time_base(TimeBase::new(1, sample_rate))
            .with_channels(Channels::FRONT_CENTRE)
            .with_bits_per_sample(16)
            .with_max_frames_per_packet((MAX_TOC_ENTRIES * kind.samples_per_frame()) as u64);

        Ok(Self {
            data_start: source.pos(),
            reader: source,
            kind,
            tracks: vec![Track::new(0, codec_params)],
            cues: Default::default(),
            metadata: Default::default(),
            next_ts: 0,
        })
    }

    fn next_packet(&mut self) -> Result<Packet> {
        let (data, frames) = self.read_group()?;
        let dur = (frames * self.kind.samples_per_frame()) as u64;
        let pkt = Packet::new_from_boxed_slice(0, self.next_ts, dur, data);
        self.next_ts += dur;
        Ok(pkt)
    }

    fn metadata(&mut self) -> Metadata<'_> {
        self.metadata.metadata()
    }

    fn cues(&self) -> &[Cue] {
        &self.cues
    }

    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Groups carry no index, so seeking walks the TOC chains from the first
    /// group and stops on the one holding the required timestamp.
    fn seek(&mut self, _mode: SeekMode, to: SeekTo) -> Result<SeekedTo> {
        if self.tracks.is_empty() || !self.reader.is_seekable() {
            return seek_error(SeekErrorKind::Unseekable);
        }

        let required_ts = match to {
            SeekTo::TimeStamp { ts, .. } => ts,
            SeekTo::Time { time, .. } => {
                TimeBase::new(1, self.kind.sample_rate()).calc_timestamp(time)
            }
        };

        self.reader.seek(SeekFrom::Start(self.data_start))?;
        self.next_ts = 0;
        loop {
            let pos = self.reader.pos();
            let frames = match self.read_group() {
                Ok((_, frames)) => frames,
                Err(Error::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                    return seek_error(SeekErrorKind::OutOfRange)
                }
                Err(err) => return Err(err),
            };

            let dur = (frames * self.kind.samples_per_frame()) as u64;
            if self.next_ts + dur > required_ts {
                self.reader.seek(SeekFrom::Start(pos))?;
                break;
            }
            self.next_ts += dur;
        }

        Ok(SeekedTo {
            track_id: 0,
            required_ts,
            actual_ts: self.next_ts,
        })
    }

    fn into_inner(self: Box<Self>) -> MediaSourceStream {
        self.reader
    }
}
