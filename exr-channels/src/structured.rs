//! Record-per-pixel images.
//!
//! A [`StructuredImage`] stores one packed record per pixel, row-major, with
//! one named field per channel. Records are little-endian with no padding,
//! the layout of a record array such as `[("B", f16), ("G", f32), ("R", u32)]`.

use ndarray::{Array2, ArrayD};

use crate::channel_map::ChannelMap;
use crate::convert::shape_of;
use crate::error::{ChannelError, Result};
use crate::naming::check_distinct;
use crate::sample::{dispatch_array, dispatch_kind, Sample, SampleArray, SampleKind, SampleValue};

/// Name, type and byte offset of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: SampleKind,
    pub offset: usize,
}

/// An (H, W) image whose elements are records with one field per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredImage {
    shape: (usize, usize),
    fields: Vec<FieldDescriptor>,
    record_size: usize,
    data: Vec<u8>,
}

impl StructuredImage {
    /// Zero-filled image with fields declared in the given order.
    ///
    /// Every field must have a storable kind (f16, f32, u32) and a unique name.
    pub fn zeros(shape: (usize, usize), dtype: &[(&str, SampleKind)]) -> Result<Self> {
        if dtype.is_empty() {
            return Err(ChannelError::EmptyChannelMap);
        }
        let names: Vec<String> = dtype.iter().map(|(name, _)| name.to_string()).collect();
        check_distinct(&names)?;

        let mut fields = Vec::with_capacity(dtype.len());
        let mut offset = 0;
        for (name, kind) in dtype {
            if !kind.is_storable() {
                return Err(ChannelError::UnsupportedSampleType {
                    channel: name.to_string(),
                    kind: *kind,
                });
            }
            fields.push(FieldDescriptor {
                name: name.to_string(),
                kind: *kind,
                offset,
            });
            offset += kind.size();
        }

        let record_size = offset;
        Ok(Self {
            shape,
            fields,
            record_size,
            data: vec![0; shape.0 * shape.1 * record_size],
        })
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Field layout in declaration order.
    pub fn dtype(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// Bytes per record.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Packed record buffer, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// True when field names are in strictly ascending lexicographic order.
    pub fn has_sorted_fields(&self) -> bool {
        self.fields
            .windows(2)
            .all(|pair| pair[0].name < pair[1].name)
    }

    fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Copy one field out as a 2D array.
    pub fn field(&self, name: &str) -> Option<SampleArray> {
        let field = self.descriptor(name)?;
        Some(self.gather(field))
    }

    /// Overwrite one field from a 2D array of the field's shape and kind.
    pub fn set_field(&mut self, name: &str, values: &SampleArray) -> Result<()> {
        let (offset, kind) = match self.descriptor(name) {
            Some(field) => (field.offset, field.kind),
            None => {
                return Err(ChannelError::MissingChannels {
                    missing: vec![name.to_string()],
                    available: self.field_names().iter().map(|n| n.to_string()).collect(),
                    requested: vec![name.to_string()],
                })
            }
        };
        if values.kind() != kind {
            return Err(ChannelError::MixedSampleTypes {
                channels: vec![name.to_string()],
                kinds: vec![kind, values.kind()],
            });
        }
        let found = match values.shape() {
            [height, width] => (*height, *width),
            _ => {
                return Err(ChannelError::NotTwoDimensional {
                    channel: name.to_string(),
                    ndim: values.ndim(),
                })
            }
        };
        if found != self.shape {
            return Err(ChannelError::ShapeMismatch {
                channel: name.to_string(),
                expected: self.shape,
                found,
            });
        }
        let record_size = self.record_size;
        dispatch_array!(values, array => scatter(&mut self.data, record_size, offset, array));
        Ok(())
    }

    /// Value of one field at pixel (y, x).
    pub fn get<T: Sample>(&self, y: usize, x: usize, name: &str) -> Option<T> {
        let field = self.descriptor(name)?;
        if field.kind != T::KIND {
            return None;
        }
        let start = self.record_start(y, x)? + field.offset;
        Some(T::read_le(&self.data[start..start + T::KIND.size()]))
    }

    /// All field values of the record at pixel (y, x), in field order.
    pub fn record(&self, y: usize, x: usize) -> Option<Vec<SampleValue>> {
        let start = self.record_start(y, x)?;
        let record = &self.data[start..start + self.record_size];
        let values = self
            .fields
            .iter()
            .map(|field| {
                let bytes = &record[field.offset..field.offset + field.kind.size()];
                dispatch_kind!(field.kind, T => T::read_le(bytes).into_value())
            })
            .collect();
        Some(values)
    }

    fn record_start(&self, y: usize, x: usize) -> Option<usize> {
        let (height, width) = self.shape;
        (y < height && x < width).then(|| (y * width + x) * self.record_size)
    }

    fn gather(&self, field: &FieldDescriptor) -> SampleArray {
        dispatch_kind!(field.kind, T => self.gather_typed::<T>(field.offset))
    }

    fn gather_typed<T: Sample>(&self, offset: usize) -> SampleArray {
        let size = T::KIND.size();
        let width = self.shape.1;
        let values = Array2::from_shape_fn(self.shape, |(y, x)| {
            let start = (y * width + x) * self.record_size + offset;
            T::read_le(&self.data[start..start + size])
        });
        T::wrap(values.into_dyn())
    }
}

fn scatter<T: Sample>(data: &mut [u8], record_size: usize, offset: usize, values: &ArrayD<T>) {
    let size = T::KIND.size();
    for (record, value) in data.chunks_exact_mut(record_size).zip(values.iter()) {
        value.write_le(&mut record[offset..offset + size]);
    }
}

/// Pack a channel map into a structured image.
///
/// Fields follow the map's insertion order and take each channel's kind.
pub fn to_structured(channels: &ChannelMap) -> Result<StructuredImage> {
    let shape = shape_of(channels)?;
    let dtype: Vec<(&str, SampleKind)> = channels
        .iter()
        .map(|(name, data)| (name, data.kind()))
        .collect();
    let mut image = StructuredImage::zeros(shape, &dtype)?;
    for (name, data) in channels.iter() {
        image.set_field(name, data)?;
    }
    Ok(image)
}

/// Unpack a structured image into one channel per field, in field order.
pub fn from_structured(image: &StructuredImage) -> ChannelMap {
    image
        .fields
        .iter()
        .map(|field| (field.name.clone(), image.gather(field)))
        .collect()
}
