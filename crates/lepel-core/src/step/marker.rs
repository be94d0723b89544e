use super::definition::PipelineStep;

/// Marca un punto del pipeline donde se guarda (o se busca, al reanudar)
/// un snapshot. Sólo lleva nombre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointMarker {
    pub name: String,
}

impl CheckpointMarker {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Elemento de un pipeline declarado como lista (`Pipeline::run_all`).
pub enum PipelineItem {
    Step(Box<dyn PipelineStep>),
    Checkpoint(CheckpointMarker),
}

impl PipelineItem {
    pub fn step<S: PipelineStep + 'static>(step: S) -> Self {
        PipelineItem::Step(Box::new(step))
    }

    pub fn checkpoint(name: impl Into<String>) -> Self {
        PipelineItem::Checkpoint(CheckpointMarker::new(name))
    }

    pub fn name(&self) -> &str {
        match self {
            PipelineItem::Step(step) => step.name(),
            PipelineItem::Checkpoint(marker) => &marker.name,
        }
    }
}

impl std::fmt::Debug for PipelineItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineItem::Step(step) => f.debug_tuple("Step").field(&step.name()).finish(),
            PipelineItem::Checkpoint(marker) => f.debug_tuple("Checkpoint").field(&marker.name).finish(),
        }
    }
}
