// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Integration tests that load configuration files and run the pipelines they describe
#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::{Builder, NamedTempFile};

    use crate::config::{load_config, FunctionRegistry, PipelineFactory};
    use crate::engine::integration_tests::drain;
    use crate::engine::{SetupFunction, TargetFunction};
    use crate::errors::ConfigError;
    use crate::models::SetupArgs;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct AddInput {
        x: i64,
        y: i64,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct AddOutput {
        result: i64,
    }

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry
            .register_function(
                "add",
                TargetFunction::transform(|input: &AddInput, _: &SetupArgs| {
                    Ok(AddOutput {
                        result: input.x + input.y,
                    })
                }),
            )
            .register_function(
                "square",
                TargetFunction::transform(|input: &AddOutput, _: &SetupArgs| {
                    Ok(input.result * input.result)
                }),
            )
            .register_function(
                "sqrt",
                TargetFunction::transform(|input: &AddOutput, _: &SetupArgs| {
                    Ok((input.result as f64).sqrt())
                }),
            )
            .register_function(
                "scale",
                TargetFunction::transform(|x: &i64, args: &SetupArgs| {
                    Ok(x * args.require::<i64>("factor")?)
                }),
            )
            .register_setup(
                "factor_ten",
                SetupFunction::new(|| Ok(SetupArgs::new().with("factor", 10i64))),
            )
            .register_model::<AddInput>("AddInput")
            .register_model::<AddOutput>("AddOutput");
        registry
    }

    fn write_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_graph_from_yaml_file() {
        let file = write_config(
            ".yaml",
            r#"
graph:
  processors:
    - add:
        target_function: add
        input_model: AddInput
        output_model: AddOutput
        instances: 2
        processors:
          - square:
              target_function: square
              input_model: AddOutput
          - sqrt:
              target_function: sqrt
              input_model: AddOutput
"#,
        );

        let registry = registry();
        let mut pipeline = PipelineFactory::new(&registry)
            .from_file(file.path())
            .unwrap();
        assert_eq!(pipeline.kind(), "graph");
        pipeline.start().unwrap();

        for (x, y) in [(2, 2), (3, 4), (123, 456)] {
            pipeline
                .push_payload(crate::models::Payload::new(AddInput { x, y }))
                .unwrap();
        }

        let results = drain(pipeline.as_mut(), 6).await;
        let mut squares: Vec<i64> = results
            .iter()
            .filter_map(|r| r.output_as::<i64>().copied())
            .collect();
        squares.sort();
        assert_eq!(squares, vec![16, 49, 335241]);
        assert_eq!(
            results.iter().filter(|r| r.processor() == "sqrt").count(),
            3
        );

        pipeline.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_chain_from_toml_file_with_setup() {
        let file = write_config(
            ".toml",
            r#"
[[chain.processors]]
[chain.processors.add]
target_function = "add"

[[chain.processors]]
[chain.processors.square]
target_function = "square"

[[chain.processors]]
[chain.processors.scale]
target_function = "scale"
setup_function = "factor_ten"
instances = 2
"#,
        );

        let registry = registry();
        let mut pipeline = PipelineFactory::new(&registry)
            .from_file(file.path())
            .unwrap();
        assert_eq!(pipeline.kind(), "chain");
        pipeline.start().unwrap();

        pipeline
            .push_payload(crate::models::Payload::new(AddInput { x: 1, y: 2 }))
            .unwrap();

        let results = drain(pipeline.as_mut(), 1).await;
        assert_eq!(results[0].processor(), "scale");
        assert_eq!(results[0].output_as::<i64>(), Some(&90));

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_mismatched_chain_config_fails_at_start() {
        let file = write_config(
            ".yml",
            r#"
chain:
  processors:
    - add:
        target_function: add
    - scale:
        target_function: scale
        setup_function: factor_ten
"#,
        );

        let registry = registry();
        let mut pipeline = PipelineFactory::new(&registry)
            .from_file(file.path())
            .unwrap();

        let err = pipeline.start().unwrap_err();
        assert!(err.to_string().contains("does not match the input type"));
    }

    #[test]
    fn test_unknown_model_in_file() {
        let file = write_config(
            ".yaml",
            r#"
chain:
  processors:
    - add:
        target_function: add
        input_model: Coordinates
"#,
        );

        let registry = registry();
        let err = PipelineFactory::new(&registry)
            .from_file(file.path())
            .err()
            .expect("unknown model should fail");
        assert!(matches!(err, ConfigError::UnknownModel { model, .. } if model == "Coordinates"));
    }

    #[test]
    fn test_unknown_setup_in_file() {
        let file = write_config(
            ".yaml",
            r#"
chain:
  processors:
    - scale:
        target_function: scale
        setup_function: factor_eleven
"#,
        );

        let registry = registry();
        let err = PipelineFactory::new(&registry)
            .from_file(file.path())
            .err()
            .expect("unknown setup should fail");
        assert!(matches!(err, ConfigError::UnknownSetup { .. }));
    }

    #[test]
    fn test_invalid_yaml_file() {
        let file = write_config(".yaml", "graph: [unclosed");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_setup_runs_only_when_started() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = registry();
        {
            let calls = calls.clone();
            registry.register_setup(
                "counted",
                SetupFunction::new(move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(SetupArgs::new().with("factor", 1i64))
                }),
            );
        }
        let file = write_config(
            ".yaml",
            r#"
chain:
  processors:
    - scale:
        target_function: scale
        setup_function: counted
        instances: 4
"#,
        );

        let pipeline = PipelineFactory::new(&registry)
            .from_file(file.path())
            .unwrap();
        assert_eq!(pipeline.kind(), "chain");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
