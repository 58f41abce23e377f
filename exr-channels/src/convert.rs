//! Conversion between stacked (H, W, C) images and channel maps.
//!
//! `split` cuts an image along its last axis into one 2D array per channel
//! name and `merge` stacks named channels back into one image. When no names
//! are given they are resolved from a [`ChannelNameConvention`] using the
//! channel count. The plain functions consult the process-wide convention,
//! the `*_with` variants take one explicitly.

use ndarray::{ArrayViewD, Axis};

use crate::channel_map::ChannelMap;
use crate::error::{ChannelError, Result};
use crate::naming::{default_convention, ChannelNameConvention};
use crate::sample::{dispatch_kind, Sample, SampleArray};

/// Common (height, width) of every channel in `channels`.
///
/// Fails if the map is empty, if any channel is not 2D, or if shapes differ.
pub fn shape_of(channels: &ChannelMap) -> Result<(usize, usize)> {
    common_shape(channels.iter())
}

fn common_shape<'a>(
    channels: impl IntoIterator<Item = (&'a str, &'a SampleArray)>,
) -> Result<(usize, usize)> {
    let mut shape: Option<(usize, usize)> = None;
    for (name, data) in channels {
        if data.ndim() != 2 {
            return Err(ChannelError::NotTwoDimensional {
                channel: name.to_string(),
                ndim: data.ndim(),
            });
        }
        let dims = (data.shape()[0], data.shape()[1]);
        match shape {
            None => shape = Some(dims),
            Some(expected) if expected != dims => {
                return Err(ChannelError::ShapeMismatch {
                    channel: name.to_string(),
                    expected,
                    found: dims,
                });
            }
            Some(_) => {}
        }
    }
    shape.ok_or(ChannelError::EmptyChannelMap)
}

/// Split an (H, W) or (H, W, C) image into named channels using the
/// process-wide naming convention for omitted names.
pub fn split(image: &SampleArray, names: Option<&[&str]>) -> Result<ChannelMap> {
    split_with(image, names, &default_convention())
}

/// Split an image into named channels, resolving omitted names from `convention`.
///
/// A 2D image is a single channel. The position of each name selects the
/// slice along the last axis.
pub fn split_with(
    image: &SampleArray,
    names: Option<&[&str]>,
    convention: &ChannelNameConvention,
) -> Result<ChannelMap> {
    let kind = image.kind();
    if !kind.is_storable() {
        return Err(ChannelError::UnsupportedImageType { kind });
    }

    let count = match image.ndim() {
        2 => 1,
        3 => image.shape()[2],
        ndim => return Err(ChannelError::UnsupportedDimensions { ndim }),
    };
    let names = convention.resolve(count, names)?;

    let mut channels = ChannelMap::with_capacity(count);
    for (index, name) in names.into_iter().enumerate() {
        channels.insert(name, image.channel(index));
    }
    Ok(channels)
}

/// Stack named channels into one image using the process-wide naming
/// convention when `names` is omitted.
pub fn merge(channels: &ChannelMap, names: Option<&[&str]>) -> Result<SampleArray> {
    merge_with(channels, names, &default_convention())
}

/// Stack named channels into one image along a new last axis.
///
/// Without `names`, the convention for `channels.len()` decides which
/// channels are stacked and in which order. Any subset or reordering of the
/// stored channels may be requested. A single requested channel yields a 2D
/// image.
pub fn merge_with(
    channels: &ChannelMap,
    names: Option<&[&str]>,
    convention: &ChannelNameConvention,
) -> Result<SampleArray> {
    let requested: Vec<String> = match names {
        Some(names) => names.iter().map(|name| name.to_string()).collect(),
        None => convention.get(channels.len())?.to_vec(),
    };

    let missing: Vec<String> = requested
        .iter()
        .filter(|name| !channels.contains(name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ChannelError::MissingChannels {
            missing,
            available: channels.names(),
            requested,
        });
    }

    let selected: Vec<(&str, &SampleArray)> = requested
        .iter()
        .filter_map(|name| channels.get(name).map(|data| (name.as_str(), data)))
        .collect();
    common_shape(selected.iter().copied())?;

    let kind = selected[0].1.kind();
    if selected.iter().any(|(_, data)| data.kind() != kind) {
        let kinds = selected.iter().map(|(_, data)| data.kind()).collect();
        return Err(ChannelError::MixedSampleTypes {
            channels: requested.clone(),
            kinds,
        });
    }

    if let [(_, only)] = selected.as_slice() {
        return Ok((*only).clone());
    }

    let arrays: Vec<&SampleArray> = selected.iter().map(|(_, data)| *data).collect();
    dispatch_kind!(kind, T => stack_channels::<T>(&arrays))
}

fn stack_channels<T: Sample>(arrays: &[&SampleArray]) -> Result<SampleArray> {
    let views: Vec<ArrayViewD<'_, T>> = arrays
        .iter()
        .filter_map(|data| data.downcast_ref::<T>())
        .map(|data| data.view())
        .collect();
    let stacked = ndarray::stack(Axis(2), &views)?;
    Ok(T::wrap(stacked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sample::SampleKind;
    use half::f16;
    use ndarray::{Array2, Array3, Array4};

    fn numbered_image(height: usize, width: usize, channels: usize) -> Array3<f32> {
        Array3::from_shape_fn((height, width, channels), |(y, x, c)| {
            (c * 1000 + y * width + x) as f32
        })
    }

    #[test]
    fn test_shape_of_common_shape() {
        let mut map = ChannelMap::new();
        map.insert("R", Array2::<f32>::zeros((12, 30)));
        map.insert("G", Array2::<f16>::zeros((12, 30)));
        assert_eq!(shape_of(&map).unwrap(), (12, 30));
    }

    #[test]
    fn test_shape_of_empty() {
        let err = shape_of(&ChannelMap::new()).unwrap_err();
        assert!(matches!(err, ChannelError::EmptyChannelMap));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_shape_of_rank_mismatch_names_channel() {
        let mut map = ChannelMap::new();
        map.insert("R", Array2::<f32>::zeros((2, 2)));
        map.insert("depth", Array3::<f32>::zeros((2, 2, 2)));
        match shape_of(&map) {
            Err(ChannelError::NotTwoDimensional { channel, ndim }) => {
                assert_eq!(channel, "depth");
                assert_eq!(ndim, 3);
            }
            other => panic!("expected NotTwoDimensional, got {other:?}"),
        }
    }

    #[test]
    fn test_shape_of_shape_mismatch() {
        let mut map = ChannelMap::new();
        map.insert("R", Array2::<f32>::zeros((2, 3)));
        map.insert("G", Array2::<f32>::zeros((3, 2)));
        match shape_of(&map) {
            Err(ChannelError::ShapeMismatch {
                channel,
                expected,
                found,
            }) => {
                assert_eq!(channel, "G");
                assert_eq!(expected, (2, 3));
                assert_eq!(found, (3, 2));
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_split_default_names() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = numbered_image(4, 5, 3).into();
        let channels = split_with(&image, None, &convention).unwrap();

        assert_eq!(channels.names(), vec!["R", "G", "B"]);
        let blue = channels.get("B").unwrap().as_array2::<f32>().unwrap();
        assert_eq!(blue.dim(), (4, 5));
        assert_eq!(blue[[0, 0]], 2000.0);
        assert_eq!(blue[[3, 4]], 2019.0);
    }

    #[test]
    fn test_split_2d_is_single_channel() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = Array2::<u32>::from_elem((3, 3), 7).into();
        let channels = split_with(&image, None, &convention).unwrap();
        assert_eq!(channels.names(), vec!["Y"]);
        assert_eq!(channels.get("Y").unwrap(), &image);
    }

    #[test]
    fn test_split_rejects_4d() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = Array4::<f32>::zeros((2, 2, 2, 2)).into_dyn().into();
        let err = split_with(&image, None, &convention).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::UnsupportedDimensions { ndim: 4 }
        ));
    }

    #[test]
    fn test_split_rejects_unstorable_kind() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = Array3::<f64>::zeros((2, 2, 3)).into();
        let err = split_with(&image, None, &convention).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::UnsupportedImageType {
                kind: SampleKind::F64
            }
        ));
        assert_eq!(err.kind(), ErrorKind::TypeKind);
    }

    #[test]
    fn test_split_name_count_mismatch() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = numbered_image(2, 2, 3).into();
        let err = split_with(&image, Some(&["R", "G"]), &convention).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::NameCountMismatch { expected: 3, .. }
        ));
    }

    #[test]
    fn test_split_unknown_count() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = numbered_image(2, 2, 5).into();
        let err = split_with(&image, None, &convention).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_merge_inverts_split() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = numbered_image(6, 7, 4).into();
        let names = ["Z", "X", "W", "V"];

        let channels = split_with(&image, Some(&names), &convention).unwrap();
        let merged = merge_with(&channels, Some(&names), &convention).unwrap();
        assert_eq!(merged, image);

        let channels = split_with(&image, None, &convention).unwrap();
        let merged = merge_with(&channels, None, &convention).unwrap();
        assert_eq!(merged, image);
    }

    #[test]
    fn test_merge_reorders_channels() {
        let convention = ChannelNameConvention::new();
        let original = numbered_image(3, 4, 3);
        let image: SampleArray = original.clone().into();
        let channels = split_with(&image, None, &convention).unwrap();

        let bgr = merge_with(&channels, Some(&["B", "G", "R"]), &convention).unwrap();
        let bgr = bgr.downcast::<f32>().unwrap();
        assert_eq!(bgr.shape(), &[3, 4, 3]);
        for c in 0..3 {
            assert_eq!(
                bgr.index_axis(Axis(2), c),
                original.index_axis(Axis(2), 2 - c).into_dyn()
            );
        }
    }

    #[test]
    fn test_merge_single_channel_is_2d() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = numbered_image(3, 4, 4).into();
        let channels = split_with(&image, None, &convention).unwrap();

        let red = merge_with(&channels, Some(&["R"]), &convention).unwrap();
        assert_eq!(red.shape(), &[3, 4]);
        assert_eq!(&red, channels.get("R").unwrap());
    }

    #[test]
    fn test_merge_missing_channel_lists_it() {
        let convention = ChannelNameConvention::new();
        let image: SampleArray = numbered_image(2, 2, 3).into();
        let channels = split_with(&image, None, &convention).unwrap();

        match merge_with(&channels, Some(&["R", "G", "B", "A"]), &convention) {
            Err(ChannelError::MissingChannels {
                missing,
                available,
                requested,
            }) => {
                assert_eq!(missing, vec!["A"]);
                assert_eq!(available, vec!["R", "G", "B"]);
                assert_eq!(requested.len(), 4);
            }
            other => panic!("expected MissingChannels, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_unknown_implicit_count() {
        let convention = ChannelNameConvention::new();
        let mut channels = ChannelMap::new();
        channels.insert("U", Array2::<f32>::zeros((2, 2)));
        channels.insert("V", Array2::<f32>::zeros((2, 2)));

        let err = merge_with(&channels, None, &convention).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::UnknownChannelCount { count: 2, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_merge_mixed_kinds() {
        let convention = ChannelNameConvention::new();
        let mut channels = ChannelMap::new();
        channels.insert("R", Array2::<f32>::zeros((2, 2)));
        channels.insert("G", Array2::<f16>::zeros((2, 2)));
        channels.insert("B", Array2::<f32>::zeros((2, 2)));

        let err = merge_with(&channels, None, &convention).unwrap_err();
        assert!(matches!(err, ChannelError::MixedSampleTypes { .. }));

        // a homogeneous subset is fine
        let rb = merge_with(&channels, Some(&["R", "B"]), &convention).unwrap();
        assert_eq!(rb.shape(), &[2, 2, 2]);
    }

    #[test]
    fn test_merge_empty_request() {
        let convention = ChannelNameConvention::new();
        let mut channels = ChannelMap::new();
        channels.insert("R", Array2::<f32>::zeros((2, 2)));
        let err = merge_with(&channels, Some(&[]), &convention).unwrap_err();
        assert!(matches!(err, ChannelError::EmptyChannelMap));
    }
}
