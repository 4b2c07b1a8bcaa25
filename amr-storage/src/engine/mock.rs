//! Deterministic stand-in codec.
//!
//! Records carry the requested mode's frame type with Q set and a payload
//! derived from the PCM block; decoding fills the block with the first payload
//! byte. Every handle counts itself live until dropped.

use std::ffi::c_int;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::consts::Mode;
use crate::engine::{record_size, Engine, FrameDecoder, FrameEncoder};
use crate::error::{Error, Result};
use crate::sniff::ContainerKind;
use crate::toc::TocEntry;

#[derive(Clone, Debug, Default)]
pub struct MockEngine {
    fail_every: Option<usize>,
    fail_code: c_int,
    record_header: Option<u8>,
    live: Arc<AtomicUsize>,
    decoded: Arc<AtomicUsize>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an empty record for every `n`th block, counting from 1.
    pub fn failing_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    /// Like [`MockEngine::failing_every`], with `code` as the raw engine
    /// return value of the failing blocks.
    pub fn failing_with(mut self, n: usize, code: c_int) -> Self {
        self.fail_code = code;
        self.failing_every(n)
    }

    /// Use `header` as the first record byte instead of the mode's frame type.
    pub fn with_record_header(mut self, header: u8) -> Self {
        self.record_header = Some(header);
        self
    }

    /// Handles created and not dropped yet
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Frames decoded by all decoders of this engine
    pub fn decoded_frames(&self) -> usize {
        self.decoded.load(Ordering::SeqCst)
    }

    fn check_kind(kind: ContainerKind) -> Result<()> {
        match kind {
            ContainerKind::Unknown => Err(Error::UnknownFormat),
            _ => Ok(()),
        }
    }
}

impl Engine for MockEngine {
    type Encoder = MockEncoder;
    type Decoder = MockDecoder;

    fn encoder(&self, kind: ContainerKind) -> Result<MockEncoder> {
        Self::check_kind(kind)?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(MockEncoder {
            kind,
            blocks: 0,
            fail_every: self.fail_every,
            fail_code: self.fail_code,
            record_header: self.record_header,
            live: self.live.clone(),
        })
    }

    fn decoder(&self, kind: ContainerKind) -> Result<MockDecoder> {
        Self::check_kind(kind)?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(MockDecoder {
            kind,
            live: self.live.clone(),
            decoded: self.decoded.clone(),
        })
    }
}

pub struct MockEncoder {
    kind: ContainerKind,
    blocks: usize,
    fail_every: Option<usize>,
    fail_code: c_int,
    record_header: Option<u8>,
    live: Arc<AtomicUsize>,
}

impl FrameEncoder for MockEncoder {
    fn encode_frame(&mut self, pcm: &[i16], mode: Mode, record: &mut [u8]) -> Result<usize> {
        if mode.kind() != self.kind {
            return Err(Error::ModeMismatch {
                mode,
                kind: self.kind,
            });
        }
        if pcm.len() != self.kind.samples_per_frame() {
            return Err(Error::InvalidBlockLength {
                frame: self.kind.samples_per_frame(),
                got: pcm.len(),
            });
        }

        self.blocks += 1;
        if matches!(self.fail_every, Some(n) if self.blocks % n == 0) {
            return Ok(record_size(self.fail_code));
        }

        let header = self
            .record_header
            .unwrap_or_else(|| TocEntry::new(mode.frame_type(), true).frame_header());
        let len = TocEntry::from_byte(header)
            .record_len(self.kind)
            .unwrap_or(1);
        if record.len() < len {
            return Err(Error::Engine(format!(
                "mock: record buffer of {} bytes, need {}",
                record.len(),
                len
            )));
        }

        record[0] = header;
        let seed = pcm.iter().fold(0u8, |acc, s| acc.wrapping_add(*s as u8));
        for (idx, byte) in record[1..len].iter_mut().enumerate() {
            *byte = seed.wrapping_add(idx as u8);
        }
        Ok(len)
    }
}

impl Drop for MockEncoder {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MockDecoder {
    kind: ContainerKind,
    live: Arc<AtomicUsize>,
    decoded: Arc<AtomicUsize>,
}

impl FrameDecoder for MockDecoder {
    fn decode_frame(&mut self, record: &[u8], pcm: &mut [i16]) -> Result<()> {
        let header = record
            .first()
            .ok_or_else(|| Error::Engine("mock: empty record".into()))?;
        let entry = TocEntry::from_byte(*header);
        if entry.record_len(self.kind) != Some(record.len()) {
            return Err(Error::Engine(format!(
                "mock: {} byte record for frame type {}",
                record.len(),
                entry.frame_type
            )));
        }
        if pcm.len() != self.kind.samples_per_frame() {
            return Err(Error::InvalidBlockLength {
                frame: self.kind.samples_per_frame(),
                got: pcm.len(),
            });
        }

        pcm.fill(record.get(1).copied().unwrap_or(0) as i16);
        self.decoded.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockDecoder {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
