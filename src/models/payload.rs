// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Type-erased values carried by queues, and the tags used to check that
//! connected processors agree on those values' types.
//!
//! Processors in one chain or graph exchange different types, so queues carry
//! a [`Payload`] rather than a concrete `T`. Each payload remembers its
//! [`TypeTag`], which is what wiring-time validation compares.
//!
//! # Examples
//!
//! ```
//! use bowline::models::{Payload, TypeTag};
//!
//! #[derive(Debug, PartialEq)]
//! struct Sum { result: i64 }
//!
//! let payload = Payload::new(Sum { result: 4 });
//! assert_eq!(payload.type_tag(), TypeTag::of::<Sum>());
//! assert_eq!(payload.downcast_ref::<Sum>(), Some(&Sum { result: 4 }));
//! assert!(payload.downcast_ref::<i64>().is_none());
//! ```

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime descriptor of a Rust type: its `TypeId` plus a readable name.
///
/// Two tags are equal when they describe the same type; the name is only used
/// in logs and error messages.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Readable form of an optional tag, as used in error messages
    pub fn describe(tag: Option<TypeTag>) -> String {
        match tag {
            Some(tag) => tag.name.to_string(),
            None => "<none>".to_string(),
        }
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An immutable, shareable value of any `Send + Sync` type.
///
/// Cloning a payload clones the `Arc`, so broadcasting one result onto several
/// output queues never copies the underlying value.
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    tag: TypeTag,
}

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            tag: TypeTag::of::<T>(),
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload").field("type", &self.tag.name).finish()
    }
}
