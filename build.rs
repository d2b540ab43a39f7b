use rustc_version::{version_meta, Channel};

// Benchmarks in the test modules need `#![feature(test)]`,
// so flag nightly toolchains for conditional compilation.
fn main() {
    let meta = version_meta().expect("unable to query rustc version");
    assert!(meta.semver.major >= 1);

    if let Channel::Nightly = meta.channel {
        println!("cargo:rustc-cfg=rustc_nightly");
    }
}
