/// Stream parameters handed to a [`VideoWriter`](crate::video::domain::video_writer::VideoWriter)
/// when it is opened.
///
/// `width` and `height` are the canonical frame size and are always exact
/// multiples of `block_size`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub block_size: u32,
}

impl VideoMetadata {
    pub fn is_block_aligned(&self) -> bool {
        self.block_size > 0
            && self.width % self.block_size == 0
            && self.height % self.block_size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let meta = VideoMetadata {
            width: 1920,
            height: 1088,
            fps: 30.0,
            block_size: 16,
        };
        assert_eq!(meta.width, 1920);
        assert_eq!(meta.height, 1088);
        assert_eq!(meta.fps, 30.0);
        assert_eq!(meta.block_size, 16);
    }

    #[test]
    fn test_block_aligned() {
        let meta = VideoMetadata {
            width: 112,
            height: 64,
            fps: 5.0,
            block_size: 16,
        };
        assert!(meta.is_block_aligned());
    }

    #[test]
    fn test_not_block_aligned() {
        let meta = VideoMetadata {
            width: 101,
            height: 64,
            fps: 5.0,
            block_size: 16,
        };
        assert!(!meta.is_block_aligned());
    }

    #[test]
    fn test_zero_block_size_is_never_aligned() {
        let meta = VideoMetadata {
            width: 16,
            height: 16,
            fps: 5.0,
            block_size: 0,
        };
        assert!(!meta.is_block_aligned());
    }
}
