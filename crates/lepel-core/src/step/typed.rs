use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::definition::PipelineStep;
use crate::errors::{PipelineError, Result};
use crate::injection::{Args, DependencyManager, Param};
use crate::key::short_type_name;

/// Interfaz de alto nivel para steps con resultado tipado.
///
/// Implementadores escriben `run_typed` con un `Output` concreto; el
/// adaptador de abajo lo serializa a la representación neutra (`Value`) que
/// el sequencer registra en `pipeline_results`. En replay el valor grabado se
/// deserializa de vuelta a `Output` (`Pipeline::run_typed`).
pub trait TypedStep {
    type Output: Serialize + DeserializeOwned;

    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn params(&self) -> Vec<Param> {
        Vec::new()
    }

    fn run_typed(&mut self, args: &Args, deps: &mut DependencyManager) -> Result<Self::Output>;
}

// -------------------------------------------------------------
// Adaptador: cualquier `TypedStep` implementa `PipelineStep` neutro.
// -------------------------------------------------------------
impl<T> PipelineStep for T where T: TypedStep
{
    fn name(&self) -> &str {
        <Self as TypedStep>::name(self)
    }

    fn params(&self) -> Vec<Param> {
        <Self as TypedStep>::params(self)
    }

    fn run(&mut self, args: &Args, deps: &mut DependencyManager) -> Result<Value> {
        let output = self.run_typed(args, deps)?;
        serde_json::to_value(output).map_err(|e| PipelineError::step(<Self as TypedStep>::name(self), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Summary {
        total: i64,
    }

    struct Sum;

    impl TypedStep for Sum {
        type Output = Summary;

        fn params(&self) -> Vec<Param> {
            vec![Param::of::<Vec<i64>>("values")]
        }

        fn run_typed(&mut self, args: &Args, _deps: &mut DependencyManager) -> Result<Summary> {
            let values: Vec<i64> = args.value("values")?;
            Ok(Summary { total: values.iter().sum() })
        }
    }

    #[test]
    fn typed_output_becomes_neutral_value() {
        let mut deps = DependencyManager::default();
        let mut step = Sum;
        deps.variables_mut().set("values", json!([1, 2, 3]));
        let params = PipelineStep::params(&step);
        let args = deps.prepare_injection(&params, None, None).unwrap();
        let out = PipelineStep::run(&mut step, &args, &mut deps).unwrap();
        assert_eq!(out, json!({"total": 6}));
        assert_eq!(PipelineStep::name(&step), "Sum");
    }
}
