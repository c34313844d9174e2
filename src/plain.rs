/// Marker for `#[repr(C)]` types that can be handed to the gpu as raw bytes.
///
/// # Safety
/// Implementors must be `#[repr(C)]` (or a primitive), contain no pointers or
/// references, and have no uninitialised padding bytes.
pub unsafe trait Plain: Sized {
    fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(self as *const Self as *const u8, std::mem::size_of::<Self>())
        }
    }
}

/// Byte view over a contiguous run of [Plain] values, e.g. a vertex array.
pub trait PlainSlice {
    fn as_bytes(&self) -> &[u8];
}

impl<T: Plain> PlainSlice for [T] {
    fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.as_ptr() as *const u8, std::mem::size_of_val(self)) }
    }
}

unsafe impl Plain for u16 {}
unsafe impl Plain for u32 {}
unsafe impl Plain for f32 {}

#[cfg(test)]
mod tests {
    use super::{Plain, PlainSlice};

    #[repr(C)]
    struct Pair {
        a: u32,
        b: f32,
    }

    unsafe impl Plain for Pair {}

    #[test]
    fn struct_bytes_cover_the_whole_value() {
        let pair = Pair { a: 1, b: 2.0 };
        let bytes = pair.as_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &1u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &2.0f32.to_ne_bytes());
    }

    #[test]
    fn slice_bytes_are_contiguous() {
        let indices: [u16; 3] = [0, 2, 1];
        let bytes = indices[..].as_bytes();
        assert_eq!(bytes.len(), 6);
        assert_eq!(&bytes[2..4], &2u16.to_ne_bytes());
    }
}
