//! Sequencer: ejecuta steps en orden, inyecta sus argumentos y decide entre
//! replay y ejecución en vivo antes de invocar cada uno.
//!
//! Algoritmo por step:
//! 1. Primer step (o marcador): validación previa de dependencias, sólo
//!    warnings; si hay un snapshot pendiente se restaura aquí.
//! 2. Marcador de checkpoint: ver `CheckpointState::on_marker`. No avanza el
//!    contador de steps.
//! 3. Step regular en vivo: contador += 1, resolver argumentos, `run`,
//!    registrar el resultado en `pipeline_results`.
//! 4. Step regular en replay: contador += 1 y devolver el resultado grabado
//!    en esa posición (`InsufficientReplayData` si no existe).

use serde_json::Value;
use uuid::Uuid;

use super::builder::PipelineBuilder;
use crate::checkpoint::{CheckpointRecord, CheckpointState, CheckpointStore, ExecutionMode, MarkerAction, Snapshot};
use crate::config::{merge_config, ConfigMap};
use crate::errors::{PipelineError, Result};
use crate::injection::{Args, DependencyManager, Param};
use crate::step::{AsyncPipelineStep, PipelineItem, PipelineStep, TypedStep};
use crate::variables::{Variables, PIPELINE_STEP, RUN_ID};

enum Plan {
    Replay(Value),
    Live(Args),
}

pub struct Pipeline {
    deps: DependencyManager,
    store: Box<dyn CheckpointStore>,
    state: CheckpointState,
    run_id: Uuid,
    /// Se reaplican sobre la configuración restaurada de un snapshot.
    overrides: ConfigMap,
    /// Variables de esta ejecución que sobreviven a la restauración.
    pinned: Variables,
    steps_started: usize,
    started: bool,
}

impl Pipeline {
    #[inline]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub(crate) fn new(deps: DependencyManager,
                      store: Box<dyn CheckpointStore>,
                      state: CheckpointState,
                      run_id: Uuid,
                      overrides: ConfigMap,
                      pinned: Variables)
                      -> Self {
        Self { deps,
               store,
               state,
               run_id,
               overrides,
               pinned,
               steps_started: 0,
               started: false }
    }

    pub fn dependencies(&self) -> &DependencyManager {
        &self.deps
    }

    pub fn dependencies_mut(&mut self) -> &mut DependencyManager {
        &mut self.deps
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn mode(&self) -> ExecutionMode {
        self.state.mode()
    }

    /// Steps regulares iniciados (en vivo o en replay).
    pub fn steps_started(&self) -> usize {
        self.steps_started
    }

    pub fn store(&self) -> &dyn CheckpointStore {
        self.store.as_ref()
    }

    /// Consume el pipeline devolviendo su store (p.ej. para reanudar otra
    /// ejecución sobre los mismos checkpoints).
    pub fn into_store(self) -> Box<dyn CheckpointStore> {
        self.store
    }

    /// Ejecuta (o reproduce) un step y devuelve su resultado.
    pub fn run_step(&mut self, step: &mut dyn PipelineStep) -> Result<Value> {
        let name = step.name().to_string();
        let params = step.params();
        self.start(&[(name.clone(), params.clone())])?;

        match self.plan(&name, &params)? {
            Plan::Replay(value) => Ok(value),
            Plan::Live(args) => {
                let result = step.run(&args, &mut self.deps)?;
                Ok(self.finish(&name, result))
            }
        }
    }

    /// Como `run_step`, deserializando el resultado (vivo o grabado).
    pub fn run_typed<S: TypedStep>(&mut self, step: &mut S) -> Result<S::Output> {
        let value = self.run_step(step)?;
        serde_json::from_value(value).map_err(|e| PipelineError::step(TypedStep::name(&*step), e))
    }

    /// Variante asíncrona; los steps se esperan de uno en uno.
    pub async fn arun_step(&mut self, step: &mut dyn AsyncPipelineStep) -> Result<Value> {
        let name = step.name().to_string();
        let params = step.params();
        self.start(&[(name.clone(), params.clone())])?;

        match self.plan(&name, &params)? {
            Plan::Replay(value) => Ok(value),
            Plan::Live(args) => {
                let result = step.arun(args, &mut self.deps).await?;
                Ok(self.finish(&name, result))
            }
        }
    }

    /// Marcador de checkpoint.
    pub fn checkpoint(&mut self, name: &str) -> Result<()> {
        self.start(&[])?;

        match self.state.on_marker(name, self.steps_started) {
            MarkerAction::Resume => {
                log::info!("Reached checkpoint \"{name}\" after {} replayed steps; continuing live",
                           self.steps_started);
            }
            MarkerAction::Skip => log::debug!("Skipping checkpoint \"{name}\" while replaying"),
            MarkerAction::Save => {
                let record = CheckpointRecord::new(name, self.run_id, Snapshot::capture(&self.deps))?;
                self.store.save(name, &record.encode()?)?;
                log::info!("Saved checkpoint \"{name}\" after {} steps", self.steps_started);
            }
        }
        Ok(())
    }

    /// Ejecuta una lista declarada de steps y marcadores. La validación
    /// previa cubre todos los steps de la lista.
    pub fn run_all(&mut self, items: Vec<PipelineItem>) -> Result<Vec<Value>> {
        let probes: Vec<(String, Vec<Param>)> = items.iter()
                                                     .filter_map(|item| match item {
                                                         PipelineItem::Step(step) => {
                                                             Some((step.name().to_string(), step.params()))
                                                         }
                                                         PipelineItem::Checkpoint(_) => None,
                                                     })
                                                     .collect();
        self.start(&probes)?;

        let mut results = Vec::new();
        for item in items {
            match item {
                PipelineItem::Step(mut step) => results.push(self.run_step(step.as_mut())?),
                PipelineItem::Checkpoint(marker) => self.checkpoint(&marker.name)?,
            }
        }
        Ok(results)
    }

    fn start(&mut self, probes: &[(String, Vec<Param>)]) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        for problem in self.deps.validate_dependencies() {
            log::warn!("{problem}");
        }
        for (name, params) in probes {
            if let Err(problem) = self.deps.throw_if_uninjectable(params, Some(name), "run") {
                log::warn!("{problem}");
            }
        }

        if let Some(snapshot) = self.state.take_pending() {
            snapshot.restore(&mut self.deps)?;
            self.reapply_run_scope();
            log::info!("Restored checkpoint \"{}\" ({} singleton states, {} recorded results)",
                       self.state.target().unwrap_or_default(),
                       snapshot.states.len(),
                       snapshot.recorded_results().len());
        }
        Ok(())
    }

    fn reapply_run_scope(&mut self) {
        merge_config(self.deps.config_mut(), &self.overrides);
        let pinned: Vec<(String, Value)> = self.pinned
                                               .iter()
                                               .map(|(k, v)| (k.clone(), v.clone()))
                                               .collect();
        let vars = self.deps.variables_mut();
        vars.update(pinned);
        vars.set(RUN_ID, self.run_id.to_string());
    }

    fn plan(&mut self, name: &str, params: &[Param]) -> Result<Plan> {
        self.steps_started += 1;

        if self.state.is_replaying() {
            let recorded = self.deps.variables().results();
            return match recorded.get(self.steps_started - 1) {
                Some(value) => {
                    log::debug!("Replaying pipeline step {}: {}", self.steps_started, name);
                    Ok(Plan::Replay(value.clone()))
                }
                None => Err(PipelineError::InsufficientReplayData { step_index: self.steps_started,
                                                                    recorded: recorded.len() }),
            };
        }

        log::info!("Starting pipeline step {}: {}", self.steps_started, name);
        self.deps.variables_mut().set(PIPELINE_STEP, name);
        let args = self.deps.prepare_injection(params, Some(name), Some("run"))?;
        Ok(Plan::Live(args))
    }

    fn finish(&mut self, name: &str, result: Value) -> Value {
        self.deps.variables_mut().push_result(result.clone());
        log::info!("Finished pipeline step {}: {}", self.steps_started, name);
        result
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
         .field("run_id", &self.run_id)
         .field("mode", &self.state.mode())
         .field("steps_started", &self.steps_started)
         .field("deps", &self.deps)
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::InMemoryCheckpointStore;
    use serde_json::json;

    struct Echo;

    impl PipelineStep for Echo {
        fn params(&self) -> Vec<Param> {
            vec![Param::untyped("message")]
        }

        fn run(&mut self, args: &Args, _deps: &mut DependencyManager) -> Result<Value> {
            Ok(args.value::<Value>("message")?)
        }
    }

    fn config(v: Value) -> ConfigMap {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn live_step_sets_bookkeeping_variables() {
        let mut pipeline = Pipeline::builder().config(config(json!({"message": "hi"})))
                                              .build()
                                              .unwrap();
        assert_eq!(pipeline.run_step(&mut Echo).unwrap(), json!("hi"));

        let vars = pipeline.dependencies().variables();
        assert_eq!(vars.pipeline_step(), Some("Echo"));
        assert_eq!(vars.results(), &[json!("hi")]);
        assert_eq!(vars.get(RUN_ID).unwrap(), &json!(pipeline.run_id().to_string()));
        assert_eq!(pipeline.steps_started(), 1);
        assert_eq!(pipeline.mode(), ExecutionMode::Live);
    }

    #[test]
    fn step_parameters_are_scoped_by_step_name() {
        let mut pipeline = Pipeline::builder().config(config(json!({"message": "bare", "Echo": {"message": "scoped"}})))
                                              .build()
                                              .unwrap();
        assert_eq!(pipeline.run_step(&mut Echo).unwrap(), json!("scoped"));
    }

    #[test]
    fn missing_parameter_aborts_with_qualified_name() {
        let mut pipeline = Pipeline::builder().build().unwrap();
        let err = pipeline.run_step(&mut Echo).unwrap_err();
        assert_eq!(err, PipelineError::lookup("Echo.run.message"));
    }

    #[test]
    fn live_checkpoint_is_saved_in_store() {
        let mut pipeline = Pipeline::builder().config(config(json!({"message": 1})))
                                              .store(InMemoryCheckpointStore::new())
                                              .build()
                                              .unwrap();
        pipeline.run_step(&mut Echo).unwrap();
        pipeline.checkpoint("after-echo").unwrap();

        let blob = pipeline.store().load("after-echo").unwrap();
        let record = CheckpointRecord::decode(&blob).unwrap();
        assert_eq!(record.run_id, pipeline.run_id());
        assert_eq!(record.snapshot.recorded_results(), &[json!(1)]);
        assert_eq!(pipeline.steps_started(), 1);
    }

    #[test]
    fn step_logger_tracks_current_step() {
        struct UsesLogger;
        impl PipelineStep for UsesLogger {
            fn params(&self) -> Vec<Param> {
                vec![Param::provided::<crate::engine::StepLogger>("logger")]
            }

            fn run(&mut self, args: &Args, _deps: &mut DependencyManager) -> Result<Value> {
                let logger = args.get::<crate::engine::StepLogger>("logger")?;
                logger.info("running");
                Ok(json!(logger.target()))
            }
        }

        let mut pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.run_step(&mut UsesLogger).unwrap(), json!("UsesLogger"));
    }

    /// Fija `message` en variables para los steps siguientes.
    struct BindMessage;

    impl PipelineStep for BindMessage {
        fn run(&mut self, _args: &Args, deps: &mut DependencyManager) -> Result<Value> {
            deps.variables_mut().set("message", "bound at runtime");
            Ok(Value::Null)
        }
    }

    #[test]
    fn uninjectable_at_start_only_warns() {
        let mut pipeline = Pipeline::builder().build().unwrap();
        let params = Echo.params();
        assert!(pipeline.dependencies()
                        .throw_if_uninjectable(&params, Some("Echo"), "run")
                        .is_err());

        let results = pipeline.run_all(vec![PipelineItem::step(BindMessage), PipelineItem::step(Echo)])
                              .unwrap();
        assert_eq!(results, vec![Value::Null, json!("bound at runtime")]);
        assert_eq!(pipeline.steps_started(), 2);
    }
}
