//! Procedural sand background

use super::vertex::colors;

/// Noise frequency in surface units
const NOISE_SCALE: f32 = 0.01;
/// Maximum darkening per channel
const NOISE_STRENGTH: f32 = 10.0;

/// Smooth grain pattern in [0, 1]
#[inline]
pub fn sand_noise(x: f32, y: f32) -> f32 {
    (x * 0.1).sin() * (y * 0.1).sin() * 0.5 + 0.5
}

/// Row-major RGBA8 sand texture
pub fn sand_texture(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let n = sand_noise(x as f32 * NOISE_SCALE, y as f32 * NOISE_SCALE);
            let shade = (n * NOISE_STRENGTH) as u8;
            let [r, g, b] = colors::SAND;
            pixels.extend_from_slice(&[
                r.saturating_sub(shade),
                g.saturating_sub(shade),
                b.saturating_sub(shade),
                255,
            ]);
        }
    }
    pixels
}
