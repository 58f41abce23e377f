//! EXR read/write entry points.
//!
//! Three in-memory forms are supported:
//!
//! - **Channel maps**: `read_dict` / `write_dict`, one 2D array per channel
//! - **Stacked images**: `imread` / `imwrite`, one (H, W, C) array with channel
//!   names resolved from the naming convention when omitted
//! - **Structured images**: `read_structured_array` / `write_structured_array`,
//!   one record per pixel
//!
//! `read` and `write` dispatch between them through [`ExrData`].
//!
//! Every call opens the file once and releases it before returning. Writes
//! validate their input before the file is created.

use exr::compression::Compression;
use log::debug;
use std::path::Path;

use crate::channel_map::ChannelMap;
use crate::codec;
use crate::convert::{merge_with, shape_of, split_with};
use crate::error::{ChannelError, Result};
use crate::naming::{default_convention, ChannelNameConvention};
use crate::sample::SampleArray;
use crate::structured::{from_structured, to_structured, StructuredImage};

/// Encoding settings for written files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Codec compression. Lossy methods do not round-trip exactly.
    pub compression: Compression,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::ZIP16,
        }
    }
}

/// Any of the in-memory forms an EXR file can be read into or written from.
#[derive(Debug, Clone, PartialEq)]
pub enum ExrData {
    Channels(ChannelMap),
    Structured(StructuredImage),
    /// (H, W) or (H, W, C) image named by the process-wide convention.
    Image(SampleArray),
}

impl From<ChannelMap> for ExrData {
    fn from(channels: ChannelMap) -> Self {
        ExrData::Channels(channels)
    }
}

impl From<StructuredImage> for ExrData {
    fn from(image: StructuredImage) -> Self {
        ExrData::Structured(image)
    }
}

impl From<SampleArray> for ExrData {
    fn from(image: SampleArray) -> Self {
        ExrData::Image(image)
    }
}

/// Read every channel of an EXR file, in the file's channel order.
pub fn read_dict<P: AsRef<Path>>(path: P) -> Result<ChannelMap> {
    codec::read_layer(path.as_ref())
}

/// Write a channel map with the default [`WriteOptions`].
pub fn write_dict<P: AsRef<Path>>(path: P, channels: &ChannelMap) -> Result<()> {
    write_dict_with_options(path, channels, &WriteOptions::default())
}

/// Write a channel map as one EXR layer.
///
/// All channels must share one (height, width) shape and hold f16, f32 or
/// u32 samples. Nothing is written if validation fails.
pub fn write_dict_with_options<P: AsRef<Path>>(
    path: P,
    channels: &ChannelMap,
    options: &WriteOptions,
) -> Result<()> {
    let shape = shape_of(channels)?;
    for (name, data) in channels.iter() {
        let kind = data.kind();
        if !kind.is_storable() {
            return Err(ChannelError::UnsupportedSampleType {
                channel: name.to_string(),
                kind,
            });
        }
    }
    codec::write_layer(path.as_ref(), shape, channels, options.compression.clone())
}

/// Read an EXR file as a structured image.
///
/// Fields follow the file's channel order, which the codec keeps sorted
/// alphabetically.
pub fn read_structured_array<P: AsRef<Path>>(path: P) -> Result<StructuredImage> {
    to_structured(&read_dict(path)?)
}

/// Write a structured image.
///
/// Field names must already be sorted alphabetically. The codec stores
/// channels sorted, so any other order would come back permuted from
/// [`read_structured_array`]. The fields are not reordered here.
pub fn write_structured_array<P: AsRef<Path>>(path: P, image: &StructuredImage) -> Result<()> {
    if !image.has_sorted_fields() {
        return Err(ChannelError::UnsortedFields {
            names: image.field_names().iter().map(|name| name.to_string()).collect(),
        });
    }
    write_dict(path, &from_structured(image))
}

/// Read an EXR file as a channel map, or as a structured image when
/// `structured` is set.
pub fn read<P: AsRef<Path>>(path: P, structured: bool) -> Result<ExrData> {
    if structured {
        read_structured_array(path).map(ExrData::Structured)
    } else {
        read_dict(path).map(ExrData::Channels)
    }
}

/// Write any supported in-memory form.
pub fn write<P: AsRef<Path>>(path: P, data: impl Into<ExrData>) -> Result<()> {
    match data.into() {
        ExrData::Channels(channels) => write_dict(path, &channels),
        ExrData::Structured(image) => write_structured_array(path, &image),
        ExrData::Image(image) => imwrite(path, &image, None),
    }
}

/// Read an EXR file as one stacked image.
///
/// Without `names`, the process-wide convention for the file's channel count
/// picks the channels. Explicit names may select any subset or order, e.g.
/// `["B", "G", "R"]` to reverse an RGB file or `["R"]` for a single 2D plane.
pub fn imread<P: AsRef<Path>>(path: P, names: Option<&[&str]>) -> Result<SampleArray> {
    imread_with(path, names, &default_convention())
}

/// [`imread`] with an explicit naming convention.
pub fn imread_with<P: AsRef<Path>>(
    path: P,
    names: Option<&[&str]>,
    convention: &ChannelNameConvention,
) -> Result<SampleArray> {
    let channels = read_dict(path)?;
    merge_with(&channels, names, convention)
}

/// Write an (H, W) or (H, W, C) image.
///
/// Without `names`, the process-wide convention for C channels names them.
pub fn imwrite<P: AsRef<Path>>(path: P, image: &SampleArray, names: Option<&[&str]>) -> Result<()> {
    imwrite_with(path, image, names, &default_convention())
}

/// [`imwrite`] with an explicit naming convention.
pub fn imwrite_with<P: AsRef<Path>>(
    path: P,
    image: &SampleArray,
    names: Option<&[&str]>,
    convention: &ChannelNameConvention,
) -> Result<()> {
    let channels = split_with(image, names, convention)?;
    debug!(
        "writing {:?} image of {} as channels {:?}",
        image.shape(),
        image.kind(),
        channels.names()
    );
    write_dict(path, &channels)
}
