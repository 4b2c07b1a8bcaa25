use std::ffi::{c_int, c_short, c_void};
use std::ptr::NonNull;

use log::warn;
use opencore_amr_sys::{
    D_IF_decode, D_IF_exit, D_IF_init, Decoder_Interface_Decode, Decoder_Interface_exit,
    Decoder_Interface_init, E_IF_encode, E_IF_exit, E_IF_init, Encoder_Interface_Encode,
    Encoder_Interface_exit, Encoder_Interface_init, Mode as RawMode,
};

use crate::consts::Mode;
use crate::engine::{record_size, Engine, FrameDecoder, FrameEncoder};
use crate::error::{Error, Result};
use crate::sniff::ContainerKind;
use crate::toc::TocEntry;

/// opencore-amr for AMR encode/decode and AMR-WB decode, vo-amrwbenc for
/// AMR-WB encode.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpencoreEngine;

impl Engine for OpencoreEngine {
    type Encoder = OpencoreEncoder;
    type Decoder = OpencoreDecoder;

    fn encoder(&self, kind: ContainerKind) -> Result<OpencoreEncoder> {
        OpencoreEncoder::new(kind)
    }

    fn decoder(&self, kind: ContainerKind) -> Result<OpencoreDecoder> {
        OpencoreDecoder::new(kind)
    }
}

fn check_block(kind: ContainerKind, pcm: &[i16]) -> Result<()> {
    if pcm.len() != kind.samples_per_frame() {
        return Err(Error::InvalidBlockLength {
            frame: kind.samples_per_frame(),
            got: pcm.len(),
        });
    }
    Ok(())
}

pub struct OpencoreEncoder {
    kind: ContainerKind,
    st: NonNull<c_void>,
}

unsafe impl Send for OpencoreEncoder {}
unsafe impl Sync for OpencoreEncoder {}

impl OpencoreEncoder {
    pub fn new(kind: ContainerKind) -> Result<Self> {
        let st = unsafe {
            match kind {
                // no DTX, the container never carries NO_DATA frames
                ContainerKind::Narrowband => Encoder_Interface_init(0),
                ContainerKind::Wideband => E_IF_init(),
                ContainerKind::Unknown => return Err(Error::UnknownFormat),
            }
        };
        let st = NonNull::new(st)
            .ok_or_else(|| Error::Engine(format!("{} encoder init failed", kind)))?;
        Ok(Self { kind, st })
    }
}

impl FrameEncoder for OpencoreEncoder {
    fn encode_frame(&mut self, pcm: &[i16], mode: Mode, record: &mut [u8]) -> Result<usize> {
        check_block(self.kind, pcm)?;
        if mode.kind() != self.kind {
            return Err(Error::ModeMismatch {
                mode,
                kind: self.kind,
            });
        }
        if record.len() < self.kind.max_record_len() {
            return Err(Error::Engine(format!(
                "record buffer of {} bytes is too small",
                record.len()
            )));
        }

        let ret = unsafe {
            match self.kind {
                ContainerKind::Narrowband => Encoder_Interface_Encode(
                    self.st.as_ptr(),
                    mode.frame_type() as RawMode,
                    pcm.as_ptr() as *const c_short,
                    record.as_mut_ptr(),
                    0,
                ),
                _ => E_IF_encode(
                    self.st.as_ptr(),
                    mode.frame_type() as c_int,
                    pcm.as_ptr() as *const c_short,
                    record.as_mut_ptr(),
                    0,
                ),
            }
        };

        if ret < 0 {
            warn!("encoder returned {}", ret);
        }
        Ok(record_size(ret))
    }
}

impl Drop for OpencoreEncoder {
    fn drop(&mut self) {
        unsafe {
            match self.kind {
                ContainerKind::Narrowband => Encoder_Interface_exit(self.st.as_ptr()),
                _ => E_IF_exit(self.st.as_ptr()),
            }
        }
    }
}

pub struct OpencoreDecoder {
    kind: ContainerKind,
    st: NonNull<c_void>,
}

unsafe impl Send for OpencoreDecoder {}
unsafe impl Sync for OpencoreDecoder {}

impl OpencoreDecoder {
    pub fn new(kind: ContainerKind) -> Result<Self> {
        let st = unsafe {
            match kind {
                ContainerKind::Narrowband => Decoder_Interface_init(),
                ContainerKind::Wideband => D_IF_init(),
                ContainerKind::Unknown => return Err(Error::UnknownFormat),
            }
        };
        let st = NonNull::new(st)
            .ok_or_else(|| Error::Engine(format!("{} decoder init failed", kind)))?;
        Ok(Self { kind, st })
    }
}

impl FrameDecoder for OpencoreDecoder {
    fn decode_frame(&mut self, record: &[u8], pcm: &mut [i16]) -> Result<()> {
        check_block(self.kind, pcm)?;
        let header = record
            .first()
            .ok_or_else(|| Error::Engine("empty record".into()))?;
        let entry = TocEntry::from_byte(*header);
        // the library sizes its read from the header, never hand it less
        match entry.record_len(self.kind) {
            Some(len) if len <= record.len() => {}
            _ => {
                return Err(Error::InvalidFrameType {
                    kind: self.kind,
                    index: entry.frame_type,
                })
            }
        }

        let bfi = !entry.quality as c_int;
        unsafe {
            match self.kind {
                ContainerKind::Narrowband => Decoder_Interface_Decode(
                    self.st.as_ptr(),
                    record.as_ptr(),
                    pcm.as_mut_ptr() as *mut c_short,
                    bfi,
                ),
                _ => D_IF_decode(
                    self.st.as_ptr(),
                    record.as_ptr(),
                    pcm.as_mut_ptr() as *mut c_short,
                    bfi,
                ),
            }
        }
        Ok(())
    }
}

impl Drop for OpencoreDecoder {
    fn drop(&mut self) {
        unsafe {
            match self.kind {
                ContainerKind::Narrowband => Decoder_Interface_exit(self.st.as_ptr()),
                _ => D_IF_exit(self.st.as_ptr()),
            }
        }
    }
}
