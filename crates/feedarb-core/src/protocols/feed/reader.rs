use super::error::FrameError;

/// Bounds-checked view over one captured frame.
///
/// Offsets are absolute within the capture; every read verifies the span
/// against the captured length before touching a byte.
pub struct FrameReader<'a> {
    frame: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(frame: &'a [u8]) -> Self {
        Self { frame }
    }

    pub fn captured_len(&self) -> usize {
        self.frame.len()
    }

    pub fn require_len(&self, needed: usize) -> Result<(), FrameError> {
        if self.frame.len() < needed {
            return Err(FrameError::TooShort {
                needed,
                actual: self.frame.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, FrameError> {
        self.frame
            .get(offset)
            .copied()
            .ok_or(FrameError::TooShort {
                needed: offset + 1,
                actual: self.frame.len(),
            })
    }

    pub fn read_u16_be(&self, offset: usize) -> Result<u16, FrameError> {
        Ok(u16::from_be_bytes(self.read_array::<2>(offset)?))
    }

    pub fn read_u32_be(&self, offset: usize) -> Result<u32, FrameError> {
        Ok(u32::from_be_bytes(self.read_array::<4>(offset)?))
    }

    pub fn read_u32_le(&self, offset: usize) -> Result<u32, FrameError> {
        Ok(u32::from_le_bytes(self.read_array::<4>(offset)?))
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], FrameError> {
        let needed = offset.checked_add(N).ok_or(FrameError::TooShort {
            needed: usize::MAX,
            actual: self.frame.len(),
        })?;
        let bytes = self.frame.get(offset..needed).ok_or(FrameError::TooShort {
            needed,
            actual: self.frame.len(),
        })?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }
}
