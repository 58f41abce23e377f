//! Glue between channel maps and the `exr` codec.
//!
//! This is the only module that touches `exr`. Reading decodes the first
//! valid layer at its largest resolution level. Writing produces a single
//! scan-line layer with one channel per map entry.

use exr::compression::Compression;
use exr::math::Vec2;
use exr::meta::attribute::Text;
use exr::prelude::*;
use log::debug;
use ndarray::{ArrayD, IxDyn};
use smallvec::SmallVec;
use std::path::Path;

use crate::channel_map::ChannelMap;
use crate::error::{ChannelError, Result};
use crate::sample::{SampleArray, SampleKind};

/// Decode every channel of the first layer, in file order.
pub(crate) fn read_layer(path: &Path) -> Result<ChannelMap> {
    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .first_valid_layer()
        .all_attributes()
        .from_file(path)?;

    let layer = image.layer_data;
    let (width, height) = (layer.size.0, layer.size.1);
    let shape = IxDyn(&[height, width]);

    let mut channels = ChannelMap::with_capacity(layer.channel_data.list.len());
    for channel in layer.channel_data.list {
        let name = channel.name.to_string();
        if channel.sampling != Vec2(1, 1) {
            return Err(ChannelError::SubsampledChannel {
                channel: name,
                sampling: (channel.sampling.0, channel.sampling.1),
            });
        }
        let data: SampleArray = match channel.sample_data {
            FlatSamples::F16(samples) => ArrayD::from_shape_vec(shape.clone(), samples)?.into(),
            FlatSamples::F32(samples) => ArrayD::from_shape_vec(shape.clone(), samples)?.into(),
            FlatSamples::U32(samples) => ArrayD::from_shape_vec(shape.clone(), samples)?.into(),
        };
        channels.insert(name, data);
    }

    debug!(
        "read {}x{} EXR with channels {:?} from {}",
        width,
        height,
        channels.names(),
        path.display()
    );
    Ok(channels)
}

/// Flatten one channel into codec samples, row-major.
fn to_flat_samples(name: &str, data: &SampleArray) -> Result<FlatSamples> {
    let samples = match data {
        SampleArray::F16(array) => FlatSamples::F16(array.iter().copied().collect()),
        SampleArray::F32(array) => FlatSamples::F32(array.iter().copied().collect()),
        SampleArray::U32(array) => FlatSamples::U32(array.iter().copied().collect()),
        other => {
            return Err(ChannelError::UnsupportedSampleType {
                channel: name.to_string(),
                kind: other.kind(),
            })
        }
    };
    Ok(samples)
}

/// Kind the codec reports for a decoded channel.
pub(crate) fn sample_kind(samples: &FlatSamples) -> SampleKind {
    match samples {
        FlatSamples::F16(_) => SampleKind::F16,
        FlatSamples::F32(_) => SampleKind::F32,
        FlatSamples::U32(_) => SampleKind::U32,
    }
}

/// Encode `channels` as one layer of `shape` = (height, width).
///
/// The shape and all channels are checked before the file is created, so a
/// rejected layer leaves nothing on disk.
pub(crate) fn write_layer(
    path: &Path,
    shape: (usize, usize),
    channels: &ChannelMap,
    compression: Compression,
) -> Result<()> {
    let (height, width) = shape;
    if height == 0 || width == 0 {
        return Err(ChannelError::EmptyImage { shape });
    }

    let mut list: SmallVec<[AnyChannel<FlatSamples>; 4]> = SmallVec::new();
    for (name, data) in channels.iter() {
        if name.is_empty() {
            return Err(ChannelError::InvalidChannelName(String::new()));
        }
        let text = Text::new_or_none(name)
            .ok_or_else(|| ChannelError::InvalidChannelName(name.to_string()))?;
        let samples = to_flat_samples(name, data)?;
        debug!(
            "encoding channel {name:?} as {} ({} samples)",
            sample_kind(&samples),
            data.len()
        );
        list.push(AnyChannel::new(text, samples));
    }

    let layer = Layer::new(
        (width, height),
        LayerAttributes::default(),
        Encoding {
            compression,
            ..Encoding::FAST_LOSSLESS
        },
        AnyChannels::sort(list),
    );

    Image::from_layer(layer).write().to_file(path)?;
    debug!(
        "wrote {}x{} EXR with channels {:?} to {}",
        width,
        height,
        channels.names(),
        path.display()
    );
    Ok(())
}
