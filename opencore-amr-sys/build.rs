use anyhow::Result;

fn main() -> Result<()> {
    cargo_emit::rerun_if_changed!("src/wrapper.h");
    cargo_emit::rerun_if_env_changed!("OPENCORE_AMR_LIB_DIR");

    #[cfg(feature = "gen")]
    {
        use std::env;
        use std::path::Path;
        let out_dir = env::var("OUT_DIR")?;
        let out_path = Path::new(&out_dir).join("opencore_amr_sys.rs");

        let mut bindings = bindgen::builder()
            .default_macro_constant_type(bindgen::MacroTypeVariation::Signed)
            .disable_nested_struct_naming()
            .trust_clang_mangling(false)
            .allowlist_function("Encoder_Interface_.*|Decoder_Interface_.*|E_IF_.*|D_IF_.*")
            .allowlist_type("Mode")
            .derive_default(true);
        if let Ok(cpath_dir) = env::var("CPATH") {
            bindings = bindings.clang_arg(format!("-I{}", cpath_dir));
        }

        bindings
            .header("src/wrapper.h")
            .layout_tests(false)
            .generate()
            .unwrap_or_else(|e| panic!("could not run bindgen on header src/wrapper.h, {}", e))
            .write_to_file(&out_path)
            .unwrap_or_else(|e| panic!("Could not write to {:?}, {}", out_path, e));
    }

    if let Ok(lib_dir) = std::env::var("OPENCORE_AMR_LIB_DIR") {
        cargo_emit::rustc_link_search!(lib_dir);
    }
    cargo_emit::rustc_link_lib!("opencore-amrnb");
    cargo_emit::rustc_link_lib!("opencore-amrwb");
    cargo_emit::rustc_link_lib!("vo-amrwbenc");

    Ok(())
}
