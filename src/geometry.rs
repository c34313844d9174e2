use std::fmt::Debug;

pub trait Geometry: Debug {
    fn contents(&self) -> &[u8];

    fn length(&self) -> u32;

    fn indices(&self) -> Option<&[u8]>;

    fn index_count(&self) -> u32 {
        self.indices()
            .map(|indices| (indices.len() / std::mem::size_of::<u16>()) as u32)
            .unwrap_or(0)
    }
}

impl Geometry for Box<dyn Geometry> {
    fn contents(&self) -> &[u8] {
        self.as_ref().contents()
    }

    fn length(&self) -> u32 {
        self.as_ref().length()
    }

    fn indices(&self) -> Option<&[u8]> {
        self.as_ref().indices()
    }
}
