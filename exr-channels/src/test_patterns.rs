//! Test pattern generation for EXR round-trip validation
//!
//! Patterns are generated in f64 and converted to the requested sample type,
//! so the same pattern can be produced as f16, f32 or u32 planes.

use ndarray::{Array2, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sample::Sample;

/// Generate a checkerboard pattern with specified block size
///
/// # Arguments
/// * `blocks_x` - Number of blocks in X direction
/// * `blocks_y` - Number of blocks in Y direction
/// * `block_size` - Size of each square block in pixels
/// * `black_value` - Value for black squares
/// * `white_value` - Value for white squares
/// * `top_left_black` - If true, top-left corner starts with black
pub fn generate_checkerboard<T: Sample>(
    blocks_x: usize,
    blocks_y: usize,
    block_size: usize,
    black_value: T,
    white_value: T,
    top_left_black: bool,
) -> Array2<T> {
    let width = blocks_x * block_size;
    let height = blocks_y * block_size;

    Array2::from_shape_fn((height, width), |(y, x)| {
        let parity = (x / block_size + y / block_size) % 2;
        let is_white = if top_left_black {
            parity == 1
        } else {
            parity == 0
        };
        if is_white {
            white_value
        } else {
            black_value
        }
    })
}

/// Generate a horizontal gradient from `min_value` (left edge) to `max_value` (right edge)
pub fn generate_horizontal_gradient<T: Sample>(
    width: usize,
    height: usize,
    min_value: f64,
    max_value: f64,
) -> Array2<T> {
    Array2::from_shape_fn((height, width), |(_, x)| {
        T::from_f64(lerp(min_value, max_value, x, width))
    })
}

/// Generate a vertical gradient from `min_value` (top edge) to `max_value` (bottom edge)
pub fn generate_vertical_gradient<T: Sample>(
    width: usize,
    height: usize,
    min_value: f64,
    max_value: f64,
) -> Array2<T> {
    Array2::from_shape_fn((height, width), |(y, _)| {
        T::from_f64(lerp(min_value, max_value, y, height))
    })
}

fn lerp(min_value: f64, max_value: f64, index: usize, len: usize) -> f64 {
    if len <= 1 {
        return min_value;
    }
    let t = index as f64 / (len - 1) as f64;
    min_value + t * (max_value - min_value)
}

/// Generate an (H, W, C) image whose value encodes its position.
///
/// Pixel (y, x) of channel c holds `c * height * width + y * width + x`, so
/// any channel permutation or transposition is detectable. Values stay exact
/// in f16 for images of up to 2048 samples in total.
pub fn generate_indexed_image<T: Sample>(height: usize, width: usize, channels: usize) -> Array3<T> {
    Array3::from_shape_fn((height, width, channels), |(y, x, c)| {
        T::from_f64((c * height * width + y * width + x) as f64)
    })
}

/// Generate an (H, W, C) image of uniform random values in `[0, scale)`.
pub fn generate_random_image<T: Sample>(
    height: usize,
    width: usize,
    channels: usize,
    scale: f64,
    seed: u64,
) -> Array3<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array3::from_shape_simple_fn((height, width, channels), || {
        T::from_f64(rng.gen::<f64>() * scale)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    #[test]
    fn test_checkerboard_blocks() {
        let board = generate_checkerboard::<u32>(3, 2, 4, 0, 255, true);
        assert_eq!(board.dim(), (8, 12));
        assert_eq!(board[[0, 0]], 0);
        assert_eq!(board[[0, 4]], 255);
        assert_eq!(board[[4, 0]], 255);
        assert_eq!(board[[7, 11]], 255);
        assert_eq!(board[[4, 4]], 0);
    }

    #[test]
    fn test_gradients() {
        let horizontal = generate_horizontal_gradient::<f32>(5, 2, 0.0, 1.0);
        assert_eq!(horizontal[[0, 0]], 0.0);
        assert_eq!(horizontal[[1, 4]], 1.0);
        assert_eq!(horizontal[[1, 2]], 0.5);

        let vertical = generate_vertical_gradient::<f16>(2, 3, 1.0, 0.0);
        assert_eq!(vertical[[0, 1]], f16::from_f32(1.0));
        assert_eq!(vertical[[2, 0]], f16::from_f32(0.0));

        let single = generate_horizontal_gradient::<u32>(1, 1, 7.0, 9.0);
        assert_eq!(single[[0, 0]], 7);
    }

    #[test]
    fn test_indexed_image_values() {
        let image = generate_indexed_image::<u32>(2, 3, 2);
        assert_eq!(image[[0, 0, 0]], 0);
        assert_eq!(image[[1, 2, 0]], 5);
        assert_eq!(image[[1, 2, 1]], 11);
    }

    #[test]
    fn test_random_image_is_seeded() {
        let a = generate_random_image::<f32>(4, 4, 3, 1.0, 7);
        let b = generate_random_image::<f32>(4, 4, 3, 1.0, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (0.0..1.0).contains(&v)));
    }
}
