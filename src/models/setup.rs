// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named values produced once per worker instance by a setup function and
//! handed to every target-function call of that instance.
//!
//! # Examples
//!
//! ```
//! use bowline::models::SetupArgs;
//!
//! let args = SetupArgs::new()
//!     .with("offset", 10_i64)
//!     .with("label", String::from("adder"));
//!
//! assert_eq!(args.get::<i64>("offset"), Some(&10));
//! assert!(args.get::<u8>("offset").is_none());
//! assert!(args.require::<String>("missing").is_err());
//! ```

use std::any::{type_name, Any};
use std::collections::HashMap;

use anyhow::anyhow;

use crate::models::Payload;

#[derive(Debug, Clone, Default)]
pub struct SetupArgs(HashMap<String, Payload>);

impl SetupArgs {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insert
    pub fn with<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.0.insert(key.into(), Payload::new(value));
    }

    /// The value under `key`, if present and of type `T`
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.0.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    /// Like [`SetupArgs::get`], but explains what was wrong so target
    /// functions can propagate it with `?`
    pub fn require<T: Any>(&self, key: &str) -> anyhow::Result<&T> {
        let value = self
            .0
            .get(key)
            .ok_or_else(|| anyhow!("setup argument '{}' is missing", key))?;
        value.downcast_ref::<T>().ok_or_else(|| {
            anyhow!(
                "setup argument '{}' is {}, not {}",
                key,
                value.type_tag(),
                type_name::<T>()
            )
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_type_mismatch() {
        let args = SetupArgs::new().with("offset", 10_i64);

        let error = args.require::<String>("offset").unwrap_err().to_string();
        assert!(error.contains("setup argument 'offset' is i64"));
        assert!(error.contains("String"));
    }

    #[test]
    fn test_insert_replaces_existing_value() {
        let mut args = SetupArgs::new();
        args.insert("offset", 1_i64);
        args.insert("offset", 2_i64);

        assert_eq!(args.len(), 1);
        assert_eq!(args.require::<i64>("offset").unwrap(), &2);
        assert!(args.contains_key("offset"));
        assert!(!SetupArgs::default().contains_key("offset"));
        assert!(SetupArgs::default().is_empty());
    }
}
