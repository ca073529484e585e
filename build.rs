// build.rs - stamps the build date into the binary

use chrono::Utc;
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
    let stamp = Utc::now().format("%Y-%m-%d %H:%M UTC");

    // main.rs include!s this and logs it next to the version
    fs::write(
        out.join("build_info.rs"),
        format!("pub const BUILD_DATE: &str = \"{}\";\n", stamp),
    )
    .expect("writing build_info.rs");

    println!("cargo:rerun-if-changed=build.rs");
}
