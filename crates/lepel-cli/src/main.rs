use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use lepel_adapters::env::EnvDefaults;
use lepel_adapters::{cli_args_to_config, run_pipeline, RunOptions};
use lepel_core::injection::{Args, DependencyManager, Param, Stateful};
use lepel_core::{Pipeline, PipelineError, PipelineStep, Result, StepLogger};
use serde_json::{json, Value};

/// CLI mínima: `lepel [-o DIR] [-c FILE] [-k CHECKPOINT] [--clave valor ...]`.
/// Los tokens no reconocidos se convierten en overrides de configuración.
#[derive(Debug, Parser)]
#[command(name = "lepel", about = "Lepel experiment pipeline")]
struct Cli {
    /// Path to the output directory.
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,
    /// Optional, path to a configuration file (supported extensions: *.json, *.yaml/yml, *.toml)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
    /// Optional, name of the starting checkpoint, or "latest".
    #[arg(short = 'k', long = "checkpoint")]
    checkpoint: Option<String>,
    /// Skip recording the git status in the output directory.
    #[arg(long = "no-git")]
    no_git: bool,
    /// Config overrides: `--key value`, `--key=value` or `--flag`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

impl Cli {
    fn into_options(self, env: EnvDefaults) -> RunOptions {
        RunOptions { output_dir: self.output_dir
                                     .or(env.output_dir)
                                     .unwrap_or_else(|| PathBuf::from(".")),
                     config_file: self.config.or(env.config_file),
                     checkpoint: self.checkpoint.or(env.checkpoint),
                     overrides: cli_args_to_config(&self.rest),
                     capture_git: !self.no_git }
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Acumulador con estado que sobrevive a checkpoints.
#[derive(Default)]
struct RunningTotal {
    total: Mutex<i64>,
}

impl RunningTotal {
    fn add(&self, n: i64) -> i64 {
        let mut total = self.total.lock().unwrap_or_else(|p| p.into_inner());
        *total += n;
        *total
    }
}

impl Stateful for RunningTotal {
    fn state_dict(&self) -> Value {
        json!({"total": *self.total.lock().unwrap_or_else(|p| p.into_inner())})
    }

    fn load_state_dict(&self, state: Value) -> Result<()> {
        let total = state["total"].as_i64()
                                  .ok_or_else(|| PipelineError::Snapshot("RunningTotal: missing total".into()))?;
        *self.total.lock().unwrap_or_else(|p| p.into_inner()) = total;
        Ok(())
    }
}

struct FooStep {
    name: String,
}

impl PipelineStep for FooStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::of::<i64>("foo"),
             Param::provided::<StepLogger>("logger"),
             Param::provided::<RunningTotal>("total"),]
    }

    fn run(&mut self, args: &Args, _deps: &mut DependencyManager) -> Result<Value> {
        let foo: i64 = args.value("foo")?;
        let total = args.get::<RunningTotal>("total")?.add(foo);
        args.get::<StepLogger>("logger")?
            .info(&format!("{} foo: {foo}, running total: {total}", self.name));
        Ok(json!({"foo": foo, "total": total}))
    }
}

fn demo(pipeline: &mut Pipeline) -> Result<()> {
    let deps = pipeline.dependencies_mut();
    if !deps.contains_name("foo") {
        deps.variables_mut().set("foo", 42);
    }
    deps.register_stateful(Arc::new(RunningTotal::default()))?;

    pipeline.run_step(&mut FooStep { name: "Foo".into() })?;
    pipeline.checkpoint("foo")?;
    pipeline.run_step(&mut FooStep { name: "Bar".into() })?;
    pipeline.checkpoint("bar")?;
    pipeline.run_step(&mut FooStep { name: "Baz".into() })?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let env = EnvDefaults::from_env();
    let options = Cli::parse().into_options(env);

    match run_pipeline(options, demo) {
        Ok(pipeline) => {
            log::info!("Finished run {} ({} steps)", pipeline.run_id(), pipeline.steps_started());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
