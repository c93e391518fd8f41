// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Build the add/square/sqrt graph from `demos/configs/graph-config.yaml`.

mod common;

use bowline::config::{load_config, FunctionRegistry, PipelineFactory};
use bowline::observability::init_logging;
use bowline::Payload;
use common::{
    add_two_numbers, describe, next_output, square_number, square_root, AddInput, AddOutput,
    SqrtOutput, SquareOutput, INPUTS,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging("bowline=info")?;
    println!("=== Bowline Graph From Config Demo ===\n");

    let mut registry = FunctionRegistry::new();
    registry
        .register_function("add_two_numbers", add_two_numbers())
        .register_function("square_number", square_number())
        .register_function("square_root", square_root())
        .register_model::<AddInput>("AddInput")
        .register_model::<AddOutput>("AddOutput")
        .register_model::<SquareOutput>("SquareOutput")
        .register_model::<SqrtOutput>("SqrtOutput");

    let config = load_config("demos/configs/graph-config.yaml")?;
    let expected = INPUTS.len() * 2;
    let mut pipeline = PipelineFactory::new(&registry).build(&config)?;
    pipeline.start()?;

    for input in INPUTS {
        pipeline.push_payload(Payload::new(input))?;
    }

    for _ in 0..expected {
        let result = next_output(pipeline.as_mut()).await;
        println!("Received output {} from processor {}", describe(&result), result.processor());
    }

    pipeline.shutdown().await;
    Ok(())
}
