use std::fmt::Debug;

pub trait InstanceData: Debug {
    fn data(&self) -> &[u8];
}

impl InstanceData for Box<dyn InstanceData> {
    fn data(&self) -> &[u8] {
        self.as_ref().data()
    }
}
