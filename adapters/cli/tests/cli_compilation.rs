use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "replay-director"])
        .status()
        .expect("failed to invoke cargo check for replay-director CLI binary");

    assert!(status.success(), "cargo check --bin replay-director should succeed");
}
