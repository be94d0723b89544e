//! Checkpoints: snapshot del estado resoluble, registro serializado,
//! contrato de almacenamiento y máquina de estados de replay.

pub mod mode;
pub mod record;
pub mod snapshot;
pub mod store;

pub use mode::{CheckpointState, ExecutionMode, MarkerAction};
pub use record::CheckpointRecord;
pub use snapshot::{SingletonState, Snapshot};
pub use store::{latest_checkpoint, CheckpointEntry, CheckpointStore, InMemoryCheckpointStore};
