//! Build script that reports the native libraries the bridge links against.
//!
//! OpenCV is located through pkg-config; ONNX Runtime is downloaded by `ort`
//! unless `ORT_DYLIB_PATH` points at a local build.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");
    println!("cargo:rerun-if-env-changed=ORT_DYLIB_PATH");

    report_opencv();
    report_onnxruntime();

    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
}

fn pkg_config_version(package: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", package]).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn report_opencv() {
    match ["opencv4", "opencv"].into_iter().find_map(pkg_config_version) {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev pkg-config");
            println!("cargo:warning=On macOS: brew install opencv pkg-config");
        }
    }
}

fn report_onnxruntime() {
    if let Ok(path) = env::var("ORT_DYLIB_PATH") {
        println!("cargo:warning=Using ONNX Runtime from {path}");
    }
}
