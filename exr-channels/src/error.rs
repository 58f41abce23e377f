use thiserror::Error;

use crate::sample::SampleKind;

/// Broad classification of a [`ChannelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Shapes, lengths or orderings that violate an invariant.
    Validation,
    /// An element type that cannot be stored in or read from an EXR channel.
    TypeKind,
    /// A channel count or channel name that is not known.
    Lookup,
    /// Failure reported by the EXR codec or while decoding its samples.
    Codec,
    /// Failure loading or saving a naming convention file.
    Config,
}

/// Errors produced while converting between arrays and EXR channels.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Explicit channel name list does not match the channel count.
    #[error("channel names {names:?} should be of length {expected}, got {}", .names.len())]
    NameCountMismatch {
        /// Number of channels the names must describe.
        expected: usize,
        /// Names supplied by the caller.
        names: Vec<String>,
    },

    /// A naming convention was requested for zero channels.
    #[error("channel count must be positive")]
    ZeroChannelCount,

    /// The same channel name appears twice in one name list.
    #[error("duplicate channel name {name:?} in {names:?}")]
    DuplicateChannelName {
        /// Repeated name.
        name: String,
        /// Full list the name was found in.
        names: Vec<String>,
    },

    /// No default names are registered for this channel count.
    #[error(
        "undefined default channel names for {count} channels; defaults are currently \
         only defined for channel counts {known:?}, new defaults can be added with \
         set_default_channel_names"
    )]
    UnknownChannelCount {
        /// Requested channel count.
        count: usize,
        /// Counts that currently have a convention, ascending.
        known: Vec<usize>,
    },

    /// Requested channels are absent from the channel map.
    #[error("missing channels {missing:?}, got {available:?}, expected {requested:?}")]
    MissingChannels {
        /// Requested names that were not found.
        missing: Vec<String>,
        /// Names present in the channel map.
        available: Vec<String>,
        /// Full requested name list.
        requested: Vec<String>,
    },

    /// Nothing to write or stack.
    #[error("no channel data")]
    EmptyChannelMap,

    /// A channel array is not of shape (height, width).
    #[error("channel data must be of shape (height, width), channel {channel:?} has {ndim} dimensions")]
    NotTwoDimensional {
        /// Offending channel.
        channel: String,
        /// Its number of dimensions.
        ndim: usize,
    },

    /// Channels disagree on their shape.
    #[error("all channels must have the same shape, channel {channel:?} is {found:?} but expected {expected:?}")]
    ShapeMismatch {
        /// First channel whose shape differs.
        channel: String,
        /// Shape established by the earlier channels.
        expected: (usize, usize),
        /// Shape of the offending channel.
        found: (usize, usize),
    },

    /// The image has no pixels, which the EXR codec cannot encode.
    #[error("cannot write an image of shape {shape:?}, height and width must be positive")]
    EmptyImage {
        /// (height, width) of the rejected image.
        shape: (usize, usize),
    },

    /// An image array is neither (H, W) nor (H, W, C).
    #[error("unsupported number of dimensions {ndim}, must be 2 or 3")]
    UnsupportedDimensions {
        /// Number of dimensions of the image.
        ndim: usize,
    },

    /// Structured image fields are not in strict alphabetical order.
    #[error(
        "field names {names:?} of the structured image must be sorted alphabetically \
         for the data to be loaded in the same order from the EXR file"
    )]
    UnsortedFields {
        /// Declared field order.
        names: Vec<String>,
    },

    /// A channel holds samples of a type EXR cannot store.
    #[error("channel {channel:?} has sample type {kind}, must be f16, f32 or u32")]
    UnsupportedSampleType {
        /// Offending channel.
        channel: String,
        /// Its sample type.
        kind: SampleKind,
    },

    /// An image array holds samples of a type EXR cannot store.
    #[error("image has sample type {kind}, must be f16, f32 or u32")]
    UnsupportedImageType {
        /// Sample type of the image.
        kind: SampleKind,
    },

    /// Channels requested for stacking have different sample types.
    #[error("channels {channels:?} have sample types {kinds:?} and cannot be stacked into one array")]
    MixedSampleTypes {
        /// Requested channel names.
        channels: Vec<String>,
        /// Their sample types, in the same order.
        kinds: Vec<SampleKind>,
    },

    /// A channel name the EXR header cannot represent.
    #[error("channel name {0:?} cannot be stored in an EXR header")]
    InvalidChannelName(String),

    /// The file stores a channel at a reduced sampling rate.
    #[error("channel {channel:?} is subsampled by {sampling:?}, only full resolution channels are supported")]
    SubsampledChannel {
        /// Offending channel.
        channel: String,
        /// Horizontal and vertical sampling period.
        sampling: (usize, usize),
    },

    #[error("EXR codec error: {0}")]
    Exr(#[from] exr::error::Error),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChannelError {
    /// Classify this error into validation, type, lookup, codec or config failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::NameCountMismatch { .. }
            | ChannelError::ZeroChannelCount
            | ChannelError::DuplicateChannelName { .. }
            | ChannelError::EmptyChannelMap
            | ChannelError::NotTwoDimensional { .. }
            | ChannelError::ShapeMismatch { .. }
            | ChannelError::EmptyImage { .. }
            | ChannelError::UnsupportedDimensions { .. }
            | ChannelError::UnsortedFields { .. }
            | ChannelError::InvalidChannelName(_) => ErrorKind::Validation,
            ChannelError::UnsupportedSampleType { .. }
            | ChannelError::UnsupportedImageType { .. }
            | ChannelError::MixedSampleTypes { .. } => ErrorKind::TypeKind,
            ChannelError::UnknownChannelCount { .. } | ChannelError::MissingChannels { .. } => {
                ErrorKind::Lookup
            }
            ChannelError::SubsampledChannel { .. }
            | ChannelError::Exr(_)
            | ChannelError::Shape(_) => ErrorKind::Codec,
            ChannelError::Io(_) | ChannelError::Json(_) => ErrorKind::Config,
        }
    }
}

/// Result type for channel conversions and EXR I/O.
pub type Result<T> = std::result::Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ChannelError::UnknownChannelCount {
            count: 2,
            known: vec![1, 3, 4],
        };
        let message = error.to_string();
        assert!(message.contains("2 channels"));
        assert!(message.contains("[1, 3, 4]"));
        assert!(message.contains("set_default_channel_names"));

        let error = ChannelError::MissingChannels {
            missing: vec!["A".to_string()],
            available: vec!["B".to_string(), "G".to_string(), "R".to_string()],
            requested: vec!["R".into(), "G".into(), "B".into(), "A".into()],
        };
        assert!(error.to_string().contains("missing channels [\"A\"]"));

        let error = ChannelError::NameCountMismatch {
            expected: 3,
            names: vec!["R".to_string(), "G".to_string()],
        };
        assert!(error.to_string().contains("should be of length 3, got 2"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ChannelError::EmptyChannelMap.kind(), ErrorKind::Validation);
        assert_eq!(
            ChannelError::EmptyImage { shape: (0, 5) }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ChannelError::UnsortedFields { names: vec![] }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ChannelError::UnsupportedImageType {
                kind: SampleKind::F64
            }
            .kind(),
            ErrorKind::TypeKind
        );
        assert_eq!(
            ChannelError::UnknownChannelCount {
                count: 7,
                known: vec![]
            }
            .kind(),
            ErrorKind::Lookup
        );
    }
}
