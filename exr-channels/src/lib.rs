//! Named-channel image I/O for OpenEXR files.
//!
//! An EXR file stores any number of named 2D channels. This crate moves them
//! between disk and three in-memory forms: a [`ChannelMap`] of per-channel
//! arrays, a stacked (H, W, C) [`SampleArray`], and a record-per-pixel
//! [`StructuredImage`]. Stacked images get their channel names from a
//! process-wide [`ChannelNameConvention`] keyed by channel count.
//!
//! ```no_run
//! use exr_channels::{imread, imwrite, SampleArray};
//! use ndarray::Array3;
//!
//! let image: SampleArray = Array3::<f32>::zeros((12, 30, 4)).into();
//! imwrite("rgba.exr", &image, None)?;
//! let bgr = imread("rgba.exr", Some(&["B", "G", "R"]))?;
//! assert_eq!(bgr.shape(), &[12, 30, 3]);
//! # Ok::<(), exr_channels::ChannelError>(())
//! ```

pub mod channel_map;
mod codec;
pub mod convert;
pub mod error;
pub mod io;
pub mod naming;
pub mod sample;
pub mod structured;
pub mod test_patterns;

pub use channel_map::ChannelMap;
pub use convert::{merge, merge_with, shape_of, split, split_with};
pub use error::{ChannelError, ErrorKind, Result};
pub use io::{
    imread, imread_with, imwrite, imwrite_with, read, read_dict, read_structured_array, write,
    write_dict, write_dict_with_options, write_structured_array, ExrData, WriteOptions,
};
pub use naming::{
    default_convention, get_default_channel_names, install_default_convention,
    reset_default_channel_names, set_default_channel_names, ChannelNameConvention,
};
pub use sample::{Sample, SampleArray, SampleKind, SampleValue};
pub use structured::{from_structured, to_structured, FieldDescriptor, StructuredImage};

pub use exr::compression::Compression;
pub use half::f16;
