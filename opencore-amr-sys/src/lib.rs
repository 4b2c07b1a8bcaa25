#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals)]

#[cfg(feature = "gen")]
include!(concat!(env!("OUT_DIR"), "/opencore_amr_sys.rs"));

#[cfg(not(feature = "gen"))]
mod bindings;
#[cfg(not(feature = "gen"))]
pub use bindings::*;
