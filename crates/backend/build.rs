use std::env;
use std::fs;
use std::path::Path;

/// Copies the workspace `config.toml` next to the built binary, where
/// `load_config` looks for it at runtime.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let (Ok(out_dir), Ok(profile)) = (env::var("OUT_DIR"), env::var("PROFILE")) else {
        println!("cargo:warning=OUT_DIR/PROFILE not set, config.toml not copied");
        return;
    };

    // OUT_DIR is target/<profile>/build/backend-xxx/out
    let Some(target_dir) = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
    else {
        println!("cargo:warning=target/{} not found above OUT_DIR", profile);
        return;
    };

    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config.toml");
    if !source.exists() {
        println!("cargo:warning=config.toml not found, embedded defaults will be used");
        return;
    }

    let dest = target_dir.join("config.toml");
    if let Err(e) = fs::copy(&source, &dest) {
        println!("cargo:warning=failed to copy config.toml to {:?}: {}", dest, e);
    }
}
