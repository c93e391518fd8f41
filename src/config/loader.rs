// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::consts::DEFAULT_INSTANCES;
use crate::errors::ConfigError;
use crate::observability::messages::config::ConfigLoaded;
use crate::observability::messages::StructuredLog;

/// Top-level pipeline configuration: a chain or a graph of processors.
///
/// The container type is the single top-level key of the file.
///
/// # Example
/// ```yaml
/// graph:
///   processors:
///     - add:
///         target_function: add
///         input_model: AddInput
///         output_model: AddOutput
///         instances: 2
///         processors:
///           - square:
///               target_function: square
///           - sqrt:
///               target_function: sqrt
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineConfig {
    Chain(ContainerConfig),
    Graph(ContainerConfig),
}

impl PipelineConfig {
    /// YAML has no native form for an enum variant holding a map, so the
    /// container is read as a single-key map (`graph: ...`) rather than a
    /// `!graph` tag.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let deserializer = serde_yaml::Deserializer::from_str(content);
        Ok(serde_yaml::with::singleton_map::deserialize(deserializer)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// "chain" or "graph"
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineConfig::Chain(_) => "chain",
            PipelineConfig::Graph(_) => "graph",
        }
    }

    pub fn container(&self) -> &ContainerConfig {
        match self {
            PipelineConfig::Chain(container) | PipelineConfig::Graph(container) => container,
        }
    }

    /// Every configured processor, nested children included.
    pub fn processor_count(&self) -> usize {
        fn count(entries: &[NamedProcessorConfig]) -> usize {
            entries
                .iter()
                .map(|entry| 1 + count(&entry.config.processors))
                .sum()
        }
        count(&self.container().processors)
    }
}

/// The processors of a chain, or the root of a graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContainerConfig {
    pub processors: Vec<NamedProcessorConfig>,
}

/// One list entry: a map from the processor's name to its settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, ProcessorConfig>")]
pub struct NamedProcessorConfig {
    pub name: String,
    pub config: ProcessorConfig,
}

impl TryFrom<BTreeMap<String, ProcessorConfig>> for NamedProcessorConfig {
    type Error = ConfigError;

    fn try_from(entry: BTreeMap<String, ProcessorConfig>) -> Result<Self, Self::Error> {
        let count = entry.len();
        match entry.into_iter().next() {
            Some((name, config)) if count == 1 => Ok(Self { name, config }),
            _ => Err(ConfigError::InvalidEntry {
                reason: format!(
                    "each processor entry must name exactly one processor, found {}",
                    count
                ),
            }),
        }
    }
}

/// Settings for a single processor.
///
/// Models are optional: when given they must name a registered model that
/// matches the type the target function declares.
///
/// # Fields
/// * `target_function` - Registered name of the function to run
/// * `input_model` / `output_model` - Registered model names, checked against the function
/// * `setup_function` - Registered name of a per-instance setup function
/// * `instances` - Worker count (defaults to 1)
/// * `delay_ms` - Pause after each item, per worker
/// * `processors` - Children of this processor (graphs only)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    pub target_function: String,
    pub input_model: Option<String>,
    pub output_model: Option<String>,
    pub setup_function: Option<String>,
    pub instances: Option<usize>,
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub processors: Vec<NamedProcessorConfig>,
}

impl ProcessorConfig {
    pub fn instances(&self) -> usize {
        self.instances.unwrap_or(DEFAULT_INSTANCES)
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(Duration::from_millis)
    }
}

/// Load a pipeline config from a `.yaml`/`.yml` or `.toml` file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|ext| ext.to_str());
    let parse: fn(&str) -> Result<PipelineConfig, ConfigError> = match extension {
        Some("yaml") | Some("yml") => PipelineConfig::from_yaml_str,
        Some("toml") => PipelineConfig::from_toml_str,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&content)?;

    ConfigLoaded {
        path,
        kind: config.kind(),
        processor_count: config.processor_count(),
    }
    .log();

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chain_config() {
        let yaml = r#"
chain:
  processors:
    - add:
        target_function: add
        input_model: AddInput
        output_model: AddOutput
        instances: 3
    - square:
        target_function: square
        delay_ms: 25
"#;

        let cfg = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.kind(), "chain");
        let processors = &cfg.container().processors;
        assert_eq!(processors.len(), 2);
        assert_eq!(processors[0].name, "add");
        assert_eq!(processors[0].config.instances(), 3);
        assert_eq!(processors[0].config.input_model.as_deref(), Some("AddInput"));
        assert_eq!(processors[1].config.instances(), DEFAULT_INSTANCES);
        assert_eq!(processors[1].config.delay(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn parse_nested_graph_config() {
        let yaml = r#"
graph:
  processors:
    - add:
        target_function: add
        processors:
          - square:
              target_function: square
              processors:
                - print:
                    target_function: print
          - sqrt:
              target_function: sqrt
"#;

        let cfg = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.kind(), "graph");
        assert_eq!(cfg.processor_count(), 4);
        let root = &cfg.container().processors[0];
        let children: Vec<&str> = root.config.processors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(children, vec!["square", "sqrt"]);
    }

    #[test]
    fn parse_toml_config() {
        let toml = r#"
[[chain.processors]]
[chain.processors.add]
target_function = "add"
instances = 2

[[chain.processors]]
[chain.processors.square]
target_function = "square"
"#;

        let cfg = PipelineConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.kind(), "chain");
        let names: Vec<&str> = cfg
            .container()
            .processors
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["add", "square"]);
        assert_eq!(cfg.container().processors[0].config.instances(), 2);
    }

    #[test]
    fn entry_with_two_names_is_rejected() {
        let yaml = r#"
chain:
  processors:
    - add:
        target_function: add
      square:
        target_function: square
"#;

        let err = PipelineConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("exactly one processor"));
    }

    #[test]
    fn unknown_container_is_rejected() {
        let yaml = r#"
pipeline:
  processors: []
"#;
        assert!(matches!(
            PipelineConfig::from_yaml_str(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn unknown_processor_field_is_rejected() {
        let yaml = r#"
chain:
  processors:
    - add:
        target_function: add
        workers: 4
"#;
        assert!(PipelineConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn two_containers_are_rejected() {
        let yaml = r#"
chain:
  processors: []
graph:
  processors: []
"#;
        assert!(matches!(
            PipelineConfig::from_yaml_str(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn load_shipped_demo_configs() {
        let configs = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/configs");

        let graph = load_config(configs.join("graph-config.yaml")).unwrap();
        assert_eq!(graph.kind(), "graph");
        assert_eq!(graph.processor_count(), 3);

        let chain = load_config(configs.join("chain-config.toml")).unwrap();
        assert_eq!(chain.kind(), "chain");
        assert_eq!(chain.processor_count(), 2);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_config("pipeline.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
