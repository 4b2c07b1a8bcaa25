use log::warn;
use symphonia_core::audio::{
    AsAudioBufferRef, AudioBuffer, AudioBufferRef, Channels, Signal, SignalSpec,
};
use symphonia_core::codecs::{
    decl_codec_type, CodecDescriptor, CodecParameters, CodecType, Decoder as D, DecoderOptions,
    FinalizeResult,
};
use symphonia_core::errors::{unsupported_error, Result};
use symphonia_core::formats::Packet;
use symphonia_core::support_codec;

use crate::bits::BitReader;
use crate::consts::MAX_TOC_ENTRIES;
use crate::demux::decode_group;
use crate::engine::{Engine, FrameDecoder};
use crate::sniff::ContainerKind;

pub const CODEC_TYPE_AMR: CodecType = decl_codec_type(b"amr");
pub const CODEC_TYPE_AMRWB: CodecType = decl_codec_type(b"amrwb");

type BoxedDecoder = Box<dyn FrameDecoder + Send + Sync>;
type DecoderFactory = Box<dyn Fn(ContainerKind) -> crate::Result<BoxedDecoder> + Send + Sync>;

/// Decoder for packets produced by [`AmrReader`](crate::AmrReader), one TOC
/// group per packet.
pub struct AmrDecoder {
    params: CodecParameters,
    kind: ContainerKind,
    factory: DecoderFactory,
    st: BoxedDecoder,
    decoded_data: AudioBuffer<i16>,
}

impl AmrDecoder {
    /// Build a decoder that takes its codec handles from `engine`.
    pub fn with_engine<E>(engine: E, params: &CodecParameters) -> Result<Self>
    where
        E: Engine + Send + Sync + 'static,
        E::Decoder: Send + Sync + 'static,
    {
        let kind = if params.codec == CODEC_TYPE_AMR {
            ContainerKind::Narrowband
        } else if params.codec == CODEC_TYPE_AMRWB {
            ContainerKind::Wideband
        } else {
            return unsupported_error("amr: unsupported codec");
        };

        let factory: DecoderFactory = Box::new(move |kind| {
            engine
                .decoder(kind)
                .map(|st| Box::new(st) as BoxedDecoder)
        });
        let st = factory(kind)?;
        let spec = SignalSpec::new(kind.sample_rate(), Channels::FRONT_CENTRE);

        Ok(Self {
            params: params.clone(),
            kind,
            factory,
            st,
            decoded_data: AudioBuffer::new((MAX_TOC_ENTRIES * kind.samples_per_frame()) as u64, spec),
        })
    }
}

impl D for AmrDecoder {
    #[cfg(feature = "opencore")]
    fn try_new(params: &CodecParameters, _options: &DecoderOptions) -> Result<Self> {
        Self::with_engine(crate::engine::OpencoreEngine, params)
    }

    #[cfg(not(feature = "opencore"))]
    fn try_new(_params: &CodecParameters, _options: &DecoderOptions) -> Result<Self> {
        unsupported_error("amr: built without a codec engine")
    }

    fn supported_codecs() -> &'static [CodecDescriptor] {
        &[
            support_codec!(CODEC_TYPE_AMR, "amr", "AMR"),
            support_codec!(CODEC_TYPE_AMRWB, "amrwb", "AMR-WB"),
        ]
    }

    fn reset(&mut self) {
        // codec state carries over between frames, start from a fresh handle
        match (self.factory)(self.kind) {
            Ok(st) => self.st = st,
            Err(err) => warn!("amr: keeping decoder state, reset failed: {}", err),
        }
        self.decoded_data.clear();
    }

    fn codec_params(&self) -> &CodecParameters {
        &self.params
    }

    fn decode(&mut self, packet: &Packet) -> Result<AudioBufferRef> {
        self.decoded_data.clear();

        let mut reader = BitReader::new(packet.buf());
        let group = decode_group(&mut reader, self.kind, &mut self.st)?;
        for err in &group.diagnostics {
            warn!("amr: packet at {}: {}", packet.ts, err);
        }

        self.decoded_data.render_reserved(Some(group.pcm.len()));
        self.decoded_data.chan_mut(0).copy_from_slice(&group.pcm);
        Ok(self.decoded_data.as_audio_buffer_ref())
    }

    fn finalize(&mut self) -> FinalizeResult {
        Default::default()
    }

    fn last_decoded(&self) -> AudioBufferRef {
        self.decoded_data.as_audio_buffer_ref()
    }
}

#[cfg(test)]
mod test {
    use std::io::{Cursor, ErrorKind};

    use symphonia_core::errors::Error;
    use symphonia_core::formats::{FormatOptions, FormatReader};
    use symphonia_core::io::MediaSourceStream;

    use super::*;
    use crate::consts::{AmrMode, Mode};
    use crate::engine::MockEngine;
    use crate::format::AmrReader;
    use crate::mux::{encode_stream, EncodeOptions};

    #[test]
    fn test_decode_packets() {
        let engine = MockEngine::new();
        let options = EncodeOptions::new().with_frames_per_group(3);
        let mode = Mode::Amr(AmrMode::Amr12200);
        let data = encode_stream(&[1; 8 * 160], mode, &engine, &options)
            .unwrap()
            .bytes;

        let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());
        let mut reader = AmrReader::try_new(mss, &FormatOptions::default()).unwrap();
        let mut decoder =
            AmrDecoder::with_engine(engine.clone(), &reader.tracks()[0].codec_params).unwrap();
        assert_eq!(engine.live_handles(), 1);

        let mut samples = 0;
        loop {
            let pkt = match reader.next_packet() {
                Ok(pkt) => pkt,
                Err(Error::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => break,
                Err(err) => panic!("{}", err),
            };
            let buf = decoder.decode(&pkt).unwrap();
            assert_eq!(buf.frames() as u64, pkt.dur);
            samples += buf.frames();
        }
        assert_eq!(samples, 8 * 160);
        assert_eq!(engine.decoded_frames(), 8);

        decoder.reset();
        assert_eq!(engine.live_handles(), 1);
        drop(decoder);
        assert_eq!(engine.live_handles(), 0);
    }

    #[test]
    fn test_reject_other_codecs() {
        let mut params = CodecParameters::new();
        params.for_codec(decl_codec_type(b"evs"));
        assert!(AmrDecoder::with_engine(MockEngine::new(), &params).is_err());
    }
}
