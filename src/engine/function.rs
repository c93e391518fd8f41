// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Type-erased references to user code run by processor workers.
//!
//! A [`TargetFunction`] is built from a typed closure and remembers the input
//! and output types it was built with. Those tags are what chains and graphs
//! compare when wiring processors together, so a mismatch is caught before
//! any worker starts.
//!
//! | Constructor | Input | Output | Stage kind |
//! |---|---|---|---|
//! | [`TargetFunction::transform`] | `I` | `O` | one result per input |
//! | [`TargetFunction::filter_map`] | `I` | `O` | zero or one result per input |
//! | [`TargetFunction::source`] | none | `O` | called in a loop, no input |
//! | [`TargetFunction::sink`] | `I` | none | results discarded |

use anyhow::anyhow;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::models::{Payload, SetupArgs, TypeTag};

type Invoke =
    dyn Fn(Option<&Payload>, &SetupArgs) -> anyhow::Result<Option<Payload>> + Send + Sync;

/// The function a processor's workers apply to each item.
#[derive(Clone)]
pub struct TargetFunction {
    input: Option<TypeTag>,
    output: Option<TypeTag>,
    invoke: Arc<Invoke>,
}

impl TargetFunction {
    /// Map every input to exactly one output.
    ///
    /// ```rust
    /// use bowline::engine::TargetFunction;
    /// use bowline::models::{SetupArgs, TypeTag};
    ///
    /// let double = TargetFunction::transform(|x: &i64, _: &SetupArgs| Ok(x * 2));
    /// assert_eq!(double.input_type(), Some(TypeTag::of::<i64>()));
    /// assert_eq!(double.output_type(), Some(TypeTag::of::<i64>()));
    /// ```
    pub fn transform<I, O, F>(f: F) -> Self
    where
        I: Any + Send + Sync,
        O: Any + Send + Sync,
        F: Fn(&I, &SetupArgs) -> anyhow::Result<O> + Send + Sync + 'static,
    {
        Self {
            input: Some(TypeTag::of::<I>()),
            output: Some(TypeTag::of::<O>()),
            invoke: Arc::new(move |item: Option<&Payload>, args: &SetupArgs| {
                let input = downcast_input::<I>(item)?;
                f(input, args).map(|output| Some(Payload::new(output)))
            }),
        }
    }

    /// Map every input to at most one output; `Ok(None)` drops the item.
    pub fn filter_map<I, O, F>(f: F) -> Self
    where
        I: Any + Send + Sync,
        O: Any + Send + Sync,
        F: Fn(&I, &SetupArgs) -> anyhow::Result<Option<O>> + Send + Sync + 'static,
    {
        Self {
            input: Some(TypeTag::of::<I>()),
            output: Some(TypeTag::of::<O>()),
            invoke: Arc::new(move |item: Option<&Payload>, args: &SetupArgs| {
                let input = downcast_input::<I>(item)?;
                f(input, args).map(|output| output.map(Payload::new))
            }),
        }
    }

    /// A stage with no input, invoked repeatedly; `Ok(None)` produces nothing this round.
    pub fn source<O, F>(f: F) -> Self
    where
        O: Any + Send + Sync,
        F: Fn(&SetupArgs) -> anyhow::Result<Option<O>> + Send + Sync + 'static,
    {
        Self {
            input: None,
            output: Some(TypeTag::of::<O>()),
            invoke: Arc::new(move |_item: Option<&Payload>, args: &SetupArgs| {
                f(args).map(|output| output.map(Payload::new))
            }),
        }
    }

    /// A stage whose results are discarded.
    pub fn sink<I, F>(f: F) -> Self
    where
        I: Any + Send + Sync,
        F: Fn(&I, &SetupArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            input: Some(TypeTag::of::<I>()),
            output: None,
            invoke: Arc::new(move |item: Option<&Payload>, args: &SetupArgs| {
                let input = downcast_input::<I>(item)?;
                f(input, args).map(|()| None)
            }),
        }
    }

    pub fn input_type(&self) -> Option<TypeTag> {
        self.input
    }

    pub fn output_type(&self) -> Option<TypeTag> {
        self.output
    }

    pub(crate) fn call(
        &self,
        item: Option<&Payload>,
        args: &SetupArgs,
    ) -> anyhow::Result<Option<Payload>> {
        (self.invoke)(item, args)
    }
}

impl fmt::Debug for TargetFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetFunction")
            .field("input", &TypeTag::describe(self.input))
            .field("output", &TypeTag::describe(self.output))
            .finish()
    }
}

fn downcast_input<I: Any>(item: Option<&Payload>) -> anyhow::Result<&I> {
    let payload =
        item.ok_or_else(|| anyhow!("expected an input of type {}, got none", type_name::<I>()))?;
    payload.downcast_ref::<I>().ok_or_else(|| {
        anyhow!(
            "expected an input of type {}, got {}",
            type_name::<I>(),
            payload.type_tag()
        )
    })
}

/// Runs once per worker instance before its first item; the returned
/// arguments are passed to every invocation of that instance.
#[derive(Clone)]
pub struct SetupFunction(Arc<dyn Fn() -> anyhow::Result<SetupArgs> + Send + Sync>);

impl SetupFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<SetupArgs> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self) -> anyhow::Result<SetupArgs> {
        (self.0)()
    }
}

impl fmt::Debug for SetupFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SetupFunction")
    }
}
