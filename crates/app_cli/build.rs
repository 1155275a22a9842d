use std::env;

fn main() {
    let version =
        env::var("PLANTVIEW_VERSION").unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap());
    println!("cargo:rerun-if-env-changed=PLANTVIEW_VERSION");
    println!("cargo:rustc-env=PLANTVIEW_VERSION={version}");
}
