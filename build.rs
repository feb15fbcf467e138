//! Build script that reports the native libraries the crate links against.
//!
//! `OpenCV` is located through pkg-config; ONNX Runtime is either downloaded
//! by the `ort` crate or taken from `ORT_LIB_LOCATION`.

use std::env;
use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=models");

    if !pkg_config_available() {
        println!("cargo:warning=pkg-config not found; it is needed to locate OpenCV.");
        println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
        println!("cargo:warning=On macOS: brew install pkg-config");
    }

    report_opencv();
    report_onnx_runtime();
    report_models();
}

fn pkg_config_available() -> bool {
    Command::new("pkg-config")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn pkg_config_version(package: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", package]).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn report_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    match pkg_config_version("opencv4").or_else(|| pkg_config_version("opencv")) {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. Camera capture and drawing need it.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
            println!("cargo:warning=On macOS: brew install opencv");
        }
    }
}

fn report_onnx_runtime() {
    println!("cargo:rerun-if-env-changed=ORT_LIB_LOCATION");
    println!("cargo:rerun-if-env-changed=ORT_STRATEGY");

    match env::var("ORT_LIB_LOCATION") {
        Ok(location) => println!("cargo:warning=Using ONNX Runtime from {location}"),
        Err(_) => println!("cargo:warning=ONNX Runtime will be fetched by the ort crate (set ORT_LIB_LOCATION to override)"),
    }
}

fn report_models() {
    let models = Path::new(&env::var("CARGO_MANIFEST_DIR").unwrap_or_default()).join("models");
    let count = std::fs::read_dir(&models)
        .map(|entries| {
            entries
                .filter_map(std::result::Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "onnx"))
                .count()
        })
        .unwrap_or(0);

    if count < 3 {
        println!(
            "cargo:warning=Found {count} ONNX model(s) in {}; the face detector, head pose and landmark models are needed at runtime",
            models.display()
        );
    }
}
