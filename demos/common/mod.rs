// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Models and target functions shared by the demos.

#![allow(dead_code)]

use std::time::Duration;

use bowline::models::SetupArgs;
use bowline::{Pipeline, ProcessorResult, TargetFunction};

#[derive(Debug, Clone, Copy)]
pub struct AddInput {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct AddOutput {
    pub result: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct SquareOutput {
    pub result: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct SqrtOutput {
    pub result: f64,
}

pub fn add_two_numbers() -> TargetFunction {
    TargetFunction::transform(|input: &AddInput, _: &SetupArgs| {
        let result = input.x + input.y;
        println!("{} + {} = {}", input.x, input.y, result);
        Ok(AddOutput { result })
    })
}

pub fn square_number() -> TargetFunction {
    TargetFunction::transform(|input: &AddOutput, _: &SetupArgs| {
        let result = input.result * input.result;
        println!("{} squared is {}", input.result, result);
        Ok(SquareOutput { result })
    })
}

pub fn square_root() -> TargetFunction {
    TargetFunction::transform(|input: &AddOutput, _: &SetupArgs| {
        let result = (input.result as f64).sqrt();
        println!("The square root of {} is {}", input.result, result);
        Ok(SqrtOutput { result })
    })
}

pub const INPUTS: [AddInput; 3] = [
    AddInput { x: 2, y: 2 },
    AddInput { x: 3, y: 4 },
    AddInput { x: 123, y: 456 },
];

/// Poll until a result is ready.
pub async fn next_output(pipeline: &mut dyn Pipeline) -> ProcessorResult {
    loop {
        if let Some(result) = pipeline.get_output() {
            return result;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn describe(result: &ProcessorResult) -> String {
    let output = result.output();
    if let Some(sum) = output.downcast_ref::<AddOutput>() {
        format!("{:?}", sum)
    } else if let Some(square) = output.downcast_ref::<SquareOutput>() {
        format!("{:?}", square)
    } else if let Some(root) = output.downcast_ref::<SqrtOutput>() {
        format!("{:?}", root)
    } else {
        format!("{:?}", output)
    }
}
