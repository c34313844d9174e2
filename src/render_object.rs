use crate::{instance::InstanceData, pipeline::PipelineHandle, render::MeshHandle};

// A RenderObject is one thing drawn this frame: which mesh, through which pipeline,
// and the per-instance data that places it.
pub trait RenderObject {
    type InstanceType: InstanceData;

    fn instance(&self) -> Self::InstanceType;

    fn pipeline_handle(&self) -> PipelineHandle;

    fn mesh_handle(&self) -> MeshHandle;
}
