// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Build the add/square chain from `demos/configs/chain-config.toml`.

mod common;

use bowline::config::{FunctionRegistry, PipelineFactory};
use bowline::observability::init_logging;
use bowline::Payload;
use common::{add_two_numbers, describe, next_output, square_number, AddInput, AddOutput, SquareOutput, INPUTS};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging("bowline=info")?;
    println!("=== Bowline Chain From Config Demo ===\n");

    let mut registry = FunctionRegistry::new();
    registry
        .register_function("add_two_numbers", add_two_numbers())
        .register_function("square_number", square_number())
        .register_model::<AddInput>("AddInput")
        .register_model::<AddOutput>("AddOutput")
        .register_model::<SquareOutput>("SquareOutput");

    let mut chain = PipelineFactory::new(&registry).from_file("demos/configs/chain-config.toml")?;
    chain.start()?;

    for input in INPUTS {
        chain.push_payload(Payload::new(input))?;
    }

    println!("Results:");
    for _ in 0..INPUTS.len() {
        let result = next_output(chain.as_mut()).await;
        println!("  {} from {}", describe(&result), result.processor());
    }

    chain.shutdown().await;
    Ok(())
}
