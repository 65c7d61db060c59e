//! Audio device abstraction
//!
//! The engine hands PCM data to an [`AudioDevice`] and addresses the result by
//! an opaque [`BufferHandle`]. Volume is expressed as attenuation in
//! hundredths of a decibel, from [`SILENT_MILLIBELS`] up to [`FULL_MILLIBELS`].

pub mod headless;

use crate::assets::wav::WaveFormat;
use thiserror::Error;

/// Attenuation that mutes a buffer
pub const SILENT_MILLIBELS: i32 = -10_000;

/// No attenuation
pub const FULL_MILLIBELS: i32 = 0;

/// Opaque device-side sound buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Audio errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The device is unavailable
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The buffer does not exist
    #[error("Unknown sound buffer {0:?}")]
    UnknownBuffer(BufferHandle),

    /// Data does not fit the buffer
    #[error("Buffer {handle:?} holds {capacity} bytes, got {len}")]
    BufferOverflow {
        /// Target buffer
        handle: BufferHandle,
        /// Buffer size in bytes
        capacity: usize,
        /// Bytes offered
        len: usize,
    },
}

/// Map a linear 0..=1 volume setting to attenuation
pub fn volume_to_millibels(volume: f32) -> i32 {
    // the clamp keeps the value inside the i32 range
    #[allow(clippy::cast_possible_truncation)]
    let attenuation = (volume.clamp(0.0, 1.0) * 10_000.0) as i32;
    SILENT_MILLIBELS + attenuation
}

/// Sound output device
pub trait AudioDevice {
    /// Allocate a buffer for `size_bytes` of PCM in `format`
    fn create_buffer(&mut self, format: &WaveFormat, size_bytes: usize) -> Result<BufferHandle, AudioError>;

    /// Copy PCM data into a buffer
    fn write_buffer(&mut self, handle: BufferHandle, pcm: &[u8]) -> Result<(), AudioError>;

    /// Start playback from the beginning
    fn play(&mut self, handle: BufferHandle, looping: bool) -> Result<(), AudioError>;

    /// Set attenuation in millibels
    fn set_volume(&mut self, handle: BufferHandle, millibels: i32) -> Result<(), AudioError>;

    /// Free a buffer
    fn release_buffer(&mut self, handle: BufferHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_mapping() {
        assert_eq!(volume_to_millibels(0.0), SILENT_MILLIBELS);
        assert_eq!(volume_to_millibels(1.0), FULL_MILLIBELS);
        assert_eq!(volume_to_millibels(0.5), -5_000);
        assert_eq!(volume_to_millibels(7.0), FULL_MILLIBELS);
    }
}
