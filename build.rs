use chrono::Utc;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn main() {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("cargo sets OUT_DIR"));

    let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let hash = git_short_hash().unwrap_or_else(|| "unknown".to_string());
    let generated = format!(
        "pub const BUILD_TIME: &str = {:?};\npub const GIT_HASH: &str = {:?};\n",
        stamp.to_string(),
        hash
    );

    // Leave the file alone when nothing changed so dependents are not rebuilt
    let dest = out_dir.join("version.rs");
    if fs::read_to_string(&dest).ok().as_deref() != Some(generated.as_str()) {
        fs::write(&dest, generated).expect("write version.rs");
    }

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
