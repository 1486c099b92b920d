//! Build script for mamdani
//!
//! Embeds version and target information for the command-line front end.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=MAMDANI_VERSION={}", version);

    if let Ok(target) = env::var("TARGET") {
        println!("cargo:rustc-env=MAMDANI_TARGET={}", target);
    }
}
