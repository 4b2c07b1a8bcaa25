//! Declarations matching what bindgen emits for `src/wrapper.h`.

use std::os::raw::{c_int, c_short, c_uchar, c_uint, c_void};

pub type Mode = c_uint;
pub const Mode_MR475: Mode = 0;
pub const Mode_MR515: Mode = 1;
pub const Mode_MR59: Mode = 2;
pub const Mode_MR67: Mode = 3;
pub const Mode_MR74: Mode = 4;
pub const Mode_MR795: Mode = 5;
pub const Mode_MR102: Mode = 6;
pub const Mode_MR122: Mode = 7;
pub const Mode_MRDTX: Mode = 8;

extern "C" {
    /* opencore-amrnb/interf_enc.h */
    pub fn Encoder_Interface_init(dtx: c_int) -> *mut c_void;
    pub fn Encoder_Interface_exit(state: *mut c_void);
    pub fn Encoder_Interface_Encode(
        state: *mut c_void,
        mode: Mode,
        speech: *const c_short,
        out: *mut c_uchar,
        forceSpeech: c_int,
    ) -> c_int;

    /* opencore-amrnb/interf_dec.h */
    pub fn Decoder_Interface_init() -> *mut c_void;
    pub fn Decoder_Interface_exit(state: *mut c_void);
    pub fn Decoder_Interface_Decode(
        state: *mut c_void,
        in_: *const c_uchar,
        out: *mut c_short,
        bfi: c_int,
    );

    /* opencore-amrwb/dec_if.h */
    pub fn D_IF_init() -> *mut c_void;
    pub fn D_IF_decode(state: *mut c_void, bits: *const c_uchar, synth: *mut c_short, bfi: c_int);
    pub fn D_IF_exit(state: *mut c_void);

    /* vo-amrwbenc/enc_if.h */
    pub fn E_IF_init() -> *mut c_void;
    pub fn E_IF_encode(
        state: *mut c_void,
        mode: c_int,
        speech: *const c_short,
        out: *mut c_uchar,
        dtx: c_int,
    ) -> c_int;
    pub fn E_IF_exit(state: *mut c_void);
}
