//! Audio device that keeps buffers in memory and records playback requests

use super::{AudioDevice, AudioError, BufferHandle};
use crate::assets::wav::WaveFormat;
use std::collections::HashMap;

#[derive(Debug)]
struct Buffer {
    capacity: usize,
    data: Vec<u8>,
    volume: i32,
    looping: Option<bool>,
}

/// Silent audio device
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    buffers: HashMap<BufferHandle, Buffer>,
    next_handle: u32,
    plays: Vec<BufferHandle>,
}

impl HeadlessAudio {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers started so far, in order
    pub fn plays(&self) -> &[BufferHandle] {
        &self.plays
    }

    /// Current attenuation of a buffer
    pub fn volume(&self, handle: BufferHandle) -> Option<i32> {
        self.buffers.get(&handle).map(|buffer| buffer.volume)
    }

    /// Whether a buffer was last started looping
    pub fn is_looping(&self, handle: BufferHandle) -> Option<bool> {
        self.buffers.get(&handle).and_then(|buffer| buffer.looping)
    }

    /// Bytes written to a buffer
    pub fn data(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(|buffer| buffer.data.as_slice())
    }

    /// Number of live buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn buffer_mut(&mut self, handle: BufferHandle) -> Result<&mut Buffer, AudioError> {
        self.buffers.get_mut(&handle).ok_or(AudioError::UnknownBuffer(handle))
    }
}

impl AudioDevice for HeadlessAudio {
    fn create_buffer(&mut self, format: &WaveFormat, size_bytes: usize) -> Result<BufferHandle, AudioError> {
        self.next_handle += 1;
        let handle = BufferHandle(self.next_handle);
        log::trace!("Created {size_bytes} byte buffer {handle:?} ({} Hz)", format.samples_per_sec);
        self.buffers.insert(
            handle,
            Buffer {
                capacity: size_bytes,
                data: Vec::new(),
                volume: super::FULL_MILLIBELS,
                looping: None,
            },
        );
        Ok(handle)
    }

    fn write_buffer(&mut self, handle: BufferHandle, pcm: &[u8]) -> Result<(), AudioError> {
        let buffer = self.buffer_mut(handle)?;
        if pcm.len() > buffer.capacity {
            return Err(AudioError::BufferOverflow {
                handle,
                capacity: buffer.capacity,
                len: pcm.len(),
            });
        }
        buffer.data = pcm.to_vec();
        Ok(())
    }

    fn play(&mut self, handle: BufferHandle, looping: bool) -> Result<(), AudioError> {
        self.buffer_mut(handle)?.looping = Some(looping);
        self.plays.push(handle);
        Ok(())
    }

    fn set_volume(&mut self, handle: BufferHandle, millibels: i32) -> Result<(), AudioError> {
        self.buffer_mut(handle)?.volume = millibels.clamp(super::SILENT_MILLIBELS, super::FULL_MILLIBELS);
        Ok(())
    }

    fn release_buffer(&mut self, handle: BufferHandle) {
        self.buffers.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_lifecycle() {
        let mut audio = HeadlessAudio::new();
        let handle = audio.create_buffer(&WaveFormat::pcm16(1, 22_050), 4).unwrap();
        audio.write_buffer(handle, &[1, 2, 3, 4]).unwrap();
        audio.play(handle, true).unwrap();
        audio.set_volume(handle, -2_500).unwrap();

        assert_eq!(audio.data(handle), Some(&[1, 2, 3, 4][..]));
        assert_eq!(audio.is_looping(handle), Some(true));
        assert_eq!(audio.volume(handle), Some(-2_500));

        audio.release_buffer(handle);
        assert_eq!(audio.play(handle, false), Err(AudioError::UnknownBuffer(handle)));
    }

    #[test]
    fn test_overflow_rejected() {
        let mut audio = HeadlessAudio::new();
        let handle = audio.create_buffer(&WaveFormat::pcm16(1, 22_050), 2).unwrap();
        assert!(matches!(
            audio.write_buffer(handle, &[0; 3]),
            Err(AudioError::BufferOverflow { .. })
        ));
    }
}
