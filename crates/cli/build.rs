//! Build script for the docscan CLI
//!
//! Writes `built.rs` and exports the values shown by `docscan --version`.

fn env_or_unknown(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| "unknown".to_string())
}

fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    println!("cargo:rerun-if-env-changed=GIT_COMMIT_HASH");
    println!("cargo:rustc-env=BUILT_HOST={}", env_or_unknown("HOST"));
    println!(
        "cargo:rustc-env=BUILT_GIT_COMMIT_HASH={}",
        env_or_unknown("GIT_COMMIT_HASH")
    );
    println!(
        "cargo:rustc-env=BUILT_TIME_UTC={}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
}
