pub mod container_runtime;
pub mod mock_runtime;

pub use container_runtime::{
    ContainerId, ContainerRuntime, ContainerSpec, ExecCompletion, FrameSender, OutputFrame,
    StreamKind,
};
pub use mock_runtime::MockRuntime;

#[cfg(test)]
pub use container_runtime::MockContainerRuntime;
