use std::path::PathBuf;
use std::{env, fs, process};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Linker setup is only for the on-target build; host builds (tests,
    // emulator) must not see cortex-m link scripts.
    let on_target = env::var("TARGET").is_ok_and(|t| t.starts_with("thumbv"));
    if !on_target {
        return;
    }

    // Stage `memory.x` into OUT_DIR so the cortex-m-rt `INCLUDE` resolves
    // regardless of the directory cargo was invoked from.
    let Some(out) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        eprintln!("OUT_DIR not set by cargo");
        process::exit(1);
    };
    if let Err(err) = fs::copy("../../memory.x", out.join("memory.x")) {
        eprintln!("failed to stage memory.x: {err}");
        process::exit(1);
    }
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=../../memory.x");

    // `--nmagic` is required if memory section addresses are not aligned
    // to 0x10000; see https://github.com/rust-embedded/cortex-m-quickstart/pull/95
    println!("cargo:rustc-link-arg=--nmagic");
    println!("cargo:rustc-link-arg=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
