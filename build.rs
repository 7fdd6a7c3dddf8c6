//! Build script
//!
//! - Exposes the stored robot identity (`ROBOT_ID`, default 0) to the crate.
//! - For firmware builds, places `memory.x` where `cortex-m-rt` finds it and adds the
//!   linker scripts for the binaries.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    // Robot identity. Each robot of the pair is flashed with its own value.
    let robot_id = env::var("ROBOT_ID").unwrap_or_else(|_| String::from("0"));
    println!("cargo:rustc-env=ROBOT_ID={}", robot_id);
    println!("cargo:rerun-if-env-changed=ROBOT_ID");

    if env::var_os("CARGO_FEATURE_FIRMWARE").is_some() {
        let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
        fs::write(out.join("memory.x"), include_bytes!("memory.x")).unwrap();
        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rerun-if-changed=memory.x");

        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}
