// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named functions and models that configuration files refer to.

use std::any::Any;
use std::collections::HashMap;

use crate::engine::{SetupFunction, TargetFunction};
use crate::errors::ConfigError;
use crate::models::TypeTag;

/// Maps the names used in configuration to code.
///
/// # Example
/// ```
/// use bowline::config::FunctionRegistry;
/// use bowline::engine::TargetFunction;
/// use bowline::models::SetupArgs;
///
/// let mut registry = FunctionRegistry::new();
/// registry
///     .register_function("double", TargetFunction::transform(|x: &i64, _: &SetupArgs| Ok(x * 2)))
///     .register_model::<i64>("Number");
///
/// assert!(registry.function("double").is_some());
/// assert!(registry.model("Number").is_some());
/// ```
#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, TargetFunction>,
    setups: HashMap<String, SetupFunction>,
    models: HashMap<String, TypeTag>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_function(&mut self, name: impl Into<String>, function: TargetFunction) -> &mut Self {
        self.functions.insert(name.into(), function);
        self
    }

    pub fn register_setup(&mut self, name: impl Into<String>, setup: SetupFunction) -> &mut Self {
        self.setups.insert(name.into(), setup);
        self
    }

    pub fn register_model<T: Any>(&mut self, name: impl Into<String>) -> &mut Self {
        self.models.insert(name.into(), TypeTag::of::<T>());
        self
    }

    pub fn function(&self, name: &str) -> Option<&TargetFunction> {
        self.functions.get(name)
    }

    pub fn setup(&self, name: &str) -> Option<&SetupFunction> {
        self.setups.get(name)
    }

    pub fn model(&self, name: &str) -> Option<TypeTag> {
        self.models.get(name).copied()
    }

    pub(crate) fn resolve_function(&self, processor: &str, name: &str) -> Result<TargetFunction, ConfigError> {
        self.function(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownFunction {
                processor: processor.to_string(),
                function: name.to_string(),
            })
    }

    pub(crate) fn resolve_setup(&self, processor: &str, name: &str) -> Result<SetupFunction, ConfigError> {
        self.setup(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownSetup {
                processor: processor.to_string(),
                function: name.to_string(),
            })
    }

    pub(crate) fn resolve_model(&self, processor: &str, name: &str) -> Result<TypeTag, ConfigError> {
        self.model(name).ok_or_else(|| ConfigError::UnknownModel {
            processor: processor.to_string(),
            model: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SetupArgs;

    #[test]
    fn test_unknown_names_are_reported_with_processor() {
        let registry = FunctionRegistry::new();

        let err = registry.resolve_function("adder", "add").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Processor 'adder' references unknown target function 'add'"
        );
        assert!(matches!(
            registry.resolve_setup("adder", "connect"),
            Err(ConfigError::UnknownSetup { .. })
        ));
        assert!(matches!(
            registry.resolve_model("adder", "AddInput"),
            Err(ConfigError::UnknownModel { .. })
        ));
    }

    #[test]
    fn test_later_registration_replaces_earlier() {
        let mut registry = FunctionRegistry::new();
        registry.register_function("f", TargetFunction::transform(|x: &u8, _: &SetupArgs| Ok(*x)));
        registry.register_function("f", TargetFunction::transform(|x: &u16, _: &SetupArgs| Ok(*x)));

        let f = registry.resolve_function("p", "f").unwrap();
        assert_eq!(f.input_type(), Some(TypeTag::of::<u16>()));
    }
}
