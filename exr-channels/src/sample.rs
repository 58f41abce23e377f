//! Sample types and dynamically typed arrays.
//!
//! EXR channels store one of three sample types: 16-bit float, 32-bit float
//! and 32-bit unsigned integer. [`SampleArray`] additionally carries the
//! other element types an `ndarray` user is likely to hold so that the
//! conversion layer can reject them with a precise error instead of casting
//! silently.

use half::f16;
use ndarray::{Array2, Array3, ArrayD, Axis};
use std::fmt;

/// Element type of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    U8,
    U16,
    U32,
    I32,
    F16,
    F32,
    F64,
}

impl SampleKind {
    /// True for the kinds an EXR channel can store (f16, f32, u32).
    pub fn is_storable(self) -> bool {
        matches!(self, SampleKind::F16 | SampleKind::F32 | SampleKind::U32)
    }

    /// Size of one sample in bytes.
    pub fn size(self) -> usize {
        match self {
            SampleKind::U8 => 1,
            SampleKind::U16 | SampleKind::F16 => 2,
            SampleKind::U32 | SampleKind::I32 | SampleKind::F32 => 4,
            SampleKind::F64 => 8,
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleKind::U8 => "u8",
            SampleKind::U16 => "u16",
            SampleKind::U32 => "u32",
            SampleKind::I32 => "i32",
            SampleKind::F16 => "f16",
            SampleKind::F32 => "f32",
            SampleKind::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// A single sample value tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    F16(f16),
    F32(f32),
    F64(f64),
}

impl SampleValue {
    pub fn kind(&self) -> SampleKind {
        match self {
            SampleValue::U8(_) => SampleKind::U8,
            SampleValue::U16(_) => SampleKind::U16,
            SampleValue::U32(_) => SampleKind::U32,
            SampleValue::I32(_) => SampleKind::I32,
            SampleValue::F16(_) => SampleKind::F16,
            SampleValue::F32(_) => SampleKind::F32,
            SampleValue::F64(_) => SampleKind::F64,
        }
    }

    /// Widen to f64 for comparisons and display.
    pub fn to_f64(self) -> f64 {
        match self {
            SampleValue::U8(v) => v as f64,
            SampleValue::U16(v) => v as f64,
            SampleValue::U32(v) => v as f64,
            SampleValue::I32(v) => v as f64,
            SampleValue::F16(v) => v.to_f64(),
            SampleValue::F32(v) => v as f64,
            SampleValue::F64(v) => v,
        }
    }
}

/// Element types that can live in a [`SampleArray`].
pub trait Sample: Copy + fmt::Debug + PartialEq + Default + 'static {
    const KIND: SampleKind;

    /// Wrap a typed array into its [`SampleArray`] variant.
    fn wrap(array: ArrayD<Self>) -> SampleArray;

    /// Borrow the typed array if `array` holds this sample type.
    fn peek(array: &SampleArray) -> Option<&ArrayD<Self>>;

    /// Take the typed array if `array` holds this sample type.
    fn take(array: SampleArray) -> Result<ArrayD<Self>, SampleArray>;

    fn into_value(self) -> SampleValue;

    /// Lossy conversion used by test pattern generators.
    fn from_f64(value: f64) -> Self;

    /// Little-endian encoding into `out`, which must be `KIND.size()` bytes.
    fn write_le(self, out: &mut [u8]);

    /// Little-endian decoding from `bytes`, which must be `KIND.size()` bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

/// An n-dimensional array whose element type is only known at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleArray {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
    F16(ArrayD<f16>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

macro_rules! impl_sample {
    ($t:ty, $variant:ident, $from_f64:expr) => {
        impl Sample for $t {
            const KIND: SampleKind = SampleKind::$variant;

            fn wrap(array: ArrayD<Self>) -> SampleArray {
                SampleArray::$variant(array)
            }

            fn peek(array: &SampleArray) -> Option<&ArrayD<Self>> {
                match array {
                    SampleArray::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn take(array: SampleArray) -> Result<ArrayD<Self>, SampleArray> {
                match array {
                    SampleArray::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }

            fn into_value(self) -> SampleValue {
                SampleValue::$variant(self)
            }

            fn from_f64(value: f64) -> Self {
                let convert: fn(f64) -> $t = $from_f64;
                convert(value)
            }

            fn write_le(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf)
            }
        }

        impl From<ArrayD<$t>> for SampleArray {
            fn from(array: ArrayD<$t>) -> Self {
                SampleArray::$variant(array)
            }
        }

        impl From<Array2<$t>> for SampleArray {
            fn from(array: Array2<$t>) -> Self {
                SampleArray::$variant(array.into_dyn())
            }
        }

        impl From<Array3<$t>> for SampleArray {
            fn from(array: Array3<$t>) -> Self {
                SampleArray::$variant(array.into_dyn())
            }
        }
    };
}

impl_sample!(u8, U8, |v| v as u8);
impl_sample!(u16, U16, |v| v as u16);
impl_sample!(u32, U32, |v| v as u32);
impl_sample!(i32, I32, |v| v as i32);
impl_sample!(f16, F16, f16::from_f64);
impl_sample!(f32, F32, |v| v as f32);
impl_sample!(f64, F64, |v| v);

/// Run `$body` with `$a` bound to the typed array inside a [`SampleArray`].
macro_rules! dispatch_array {
    ($array:expr, $a:ident => $body:expr) => {
        match $array {
            $crate::sample::SampleArray::U8($a) => $body,
            $crate::sample::SampleArray::U16($a) => $body,
            $crate::sample::SampleArray::U32($a) => $body,
            $crate::sample::SampleArray::I32($a) => $body,
            $crate::sample::SampleArray::F16($a) => $body,
            $crate::sample::SampleArray::F32($a) => $body,
            $crate::sample::SampleArray::F64($a) => $body,
        }
    };
}

/// Run `$body` with the type alias `$t` set to the Rust type of a [`SampleKind`].
macro_rules! dispatch_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            $crate::sample::SampleKind::U8 => {
                type $t = u8;
                $body
            }
            $crate::sample::SampleKind::U16 => {
                type $t = u16;
                $body
            }
            $crate::sample::SampleKind::U32 => {
                type $t = u32;
                $body
            }
            $crate::sample::SampleKind::I32 => {
                type $t = i32;
                $body
            }
            $crate::sample::SampleKind::F16 => {
                type $t = ::half::f16;
                $body
            }
            $crate::sample::SampleKind::F32 => {
                type $t = f32;
                $body
            }
            $crate::sample::SampleKind::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}

pub(crate) use dispatch_array;
pub(crate) use dispatch_kind;

impl SampleArray {
    pub fn kind(&self) -> SampleKind {
        match self {
            SampleArray::U8(_) => SampleKind::U8,
            SampleArray::U16(_) => SampleKind::U16,
            SampleArray::U32(_) => SampleKind::U32,
            SampleArray::I32(_) => SampleKind::I32,
            SampleArray::F16(_) => SampleKind::F16,
            SampleArray::F32(_) => SampleKind::F32,
            SampleArray::F64(_) => SampleKind::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        dispatch_array!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        dispatch_array!(self, a => a.ndim())
    }

    pub fn len(&self) -> usize {
        dispatch_array!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow as `ArrayD<T>` if the element type matches.
    pub fn downcast_ref<T: Sample>(&self) -> Option<&ArrayD<T>> {
        T::peek(self)
    }

    /// Convert into `ArrayD<T>`, handing the array back unchanged on a type mismatch.
    pub fn downcast<T: Sample>(self) -> Result<ArrayD<T>, SampleArray> {
        T::take(self)
    }

    /// Typed 2D view, if the element type matches and the array has rank 2.
    pub fn as_array2<T: Sample>(&self) -> Option<ndarray::ArrayView2<'_, T>> {
        T::peek(self).and_then(|a| a.view().into_dimensionality().ok())
    }

    /// Copy of the slice at `index` along the last axis of an (H, W, C) array.
    ///
    /// A rank-2 array is treated as a single channel, so index 0 returns a
    /// copy of the whole array.
    pub(crate) fn channel(&self, index: usize) -> SampleArray {
        dispatch_array!(self, a => {
            if a.ndim() == 2 {
                Sample::wrap(a.clone())
            } else {
                Sample::wrap(a.index_axis(Axis(a.ndim() - 1), index).to_owned())
            }
        })
    }
}
