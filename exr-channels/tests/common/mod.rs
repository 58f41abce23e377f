//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use exr_channels::SampleArray;
use tempfile::TempDir;

/// Initialize test logging, ignoring repeated initialization.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Temporary directory plus a path to `name` inside it.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_exr(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join(name);
    (dir, path)
}

/// Channel `index` of an (H, W, C) image as f64 values, row-major.
pub fn channel_values(image: &SampleArray, index: usize) -> Vec<f64> {
    let shape = image.shape();
    let (height, width) = (shape[0], shape[1]);
    let mut values = Vec::with_capacity(height * width);
    for y in 0..height {
        for x in 0..width {
            values.push(value_at(image, &[y, x, index]));
        }
    }
    values
}

fn value_at(image: &SampleArray, index: &[usize]) -> f64 {
    match image {
        SampleArray::F16(a) => a[index].to_f64(),
        SampleArray::F32(a) => a[index] as f64,
        SampleArray::U32(a) => a[index] as f64,
        SampleArray::U8(a) => a[index] as f64,
        SampleArray::U16(a) => a[index] as f64,
        SampleArray::I32(a) => a[index] as f64,
        SampleArray::F64(a) => a[index],
    }
}
