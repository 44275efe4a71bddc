//! Put `memory.x` where the linker can find it and rebuild when it changes.
use std::{env, fs::File, io::Write, path::PathBuf};

fn main() {
    let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR should be set by cargo"));
    File::create(out.join("memory.x"))
        .expect("memory.x should be writable in OUT_DIR")
        .write_all(include_bytes!("memory.x"))
        .expect("memory.x should be written");
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");
}
