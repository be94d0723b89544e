//! Máquina de estados del checkpoint: `Replaying` -> `Live`, nunca al revés.

use super::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Live,
    Replaying,
}

/// Qué debe hacer el sequencer al encontrar un marcador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAction {
    /// Era el objetivo de la reanudación: pasar a `Live` sin guardar.
    Resume,
    /// Modo `Live`: capturar y guardar un snapshot.
    Save,
    /// Replay de un marcador anterior al objetivo.
    Skip,
}

#[derive(Debug, Clone)]
pub struct CheckpointState {
    target: Option<String>,
    /// Steps ejecutados cuando se tomó el snapshot objetivo.
    resume_at: usize,
    mode: ExecutionMode,
    pending: Option<Snapshot>,
}

impl CheckpointState {
    pub fn live() -> Self {
        Self { target: None,
               resume_at: 0,
               mode: ExecutionMode::Live,
               pending: None }
    }

    /// Reanudación hacia `target` con el snapshot a restaurar en el primer step.
    ///
    /// Un mismo nombre puede repetirse (p.ej. dentro de un bucle); el
    /// objetivo es la aparición que llega con tantos steps iniciados como
    /// resultados grabados tiene el snapshot.
    pub fn resume(target: impl Into<String>, snapshot: Snapshot) -> Self {
        Self { target: Some(target.into()),
               resume_at: snapshot.recorded_results().len(),
               mode: ExecutionMode::Replaying,
               pending: Some(snapshot) }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn is_replaying(&self) -> bool {
        self.mode == ExecutionMode::Replaying
    }

    /// Entrega el snapshot pendiente una sola vez.
    pub fn take_pending(&mut self) -> Option<Snapshot> {
        self.pending.take()
    }

    pub fn resume_at(&self) -> usize {
        self.resume_at
    }

    /// `steps_started`: steps regulares iniciados hasta este marcador.
    pub fn on_marker(&mut self, name: &str, steps_started: usize) -> MarkerAction {
        match self.mode {
            ExecutionMode::Replaying if self.target.as_deref() == Some(name) && steps_started == self.resume_at => {
                self.mode = ExecutionMode::Live;
                MarkerAction::Resume
            }
            ExecutionMode::Replaying => MarkerAction::Skip,
            ExecutionMode::Live => MarkerAction::Save,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_after(steps: usize) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for i in 0..steps {
            snapshot.variables.push_result(json!(i));
        }
        snapshot
    }

    #[test]
    fn live_always_saves() {
        let mut state = CheckpointState::live();
        assert_eq!(state.on_marker("c1", 1), MarkerAction::Save);
        assert_eq!(state.on_marker("c1", 2), MarkerAction::Save);
        assert!(state.take_pending().is_none());
    }

    #[test]
    fn replay_switches_once_at_target() {
        let mut state = CheckpointState::resume("c2", snapshot_after(2));
        assert_eq!(state.resume_at(), 2);
        assert_eq!(state.on_marker("c1", 1), MarkerAction::Skip);
        assert!(state.is_replaying());
        assert_eq!(state.on_marker("c2", 2), MarkerAction::Resume);
        assert_eq!(state.mode(), ExecutionMode::Live);
        // A second marker with the same name is a regular live checkpoint.
        assert_eq!(state.on_marker("c2", 3), MarkerAction::Save);
        assert!(state.take_pending().is_some());
        assert!(state.take_pending().is_none());
    }

    #[test]
    fn repeated_name_resumes_at_the_recorded_occurrence() {
        let mut state = CheckpointState::resume("epoch", snapshot_after(3));
        assert_eq!(state.on_marker("epoch", 1), MarkerAction::Skip);
        assert_eq!(state.on_marker("epoch", 2), MarkerAction::Skip);
        assert!(state.is_replaying());
        assert_eq!(state.on_marker("epoch", 3), MarkerAction::Resume);
        assert!(!state.is_replaying());
    }
}
