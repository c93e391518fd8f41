// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Add two numbers, then square the sum and take its square root in parallel.

mod common;

use bowline::observability::init_logging;
use bowline::{Processor, ProcessorGraph};
use common::{add_two_numbers, describe, next_output, square_number, square_root, INPUTS};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging("bowline=info")?;
    println!("=== Bowline Graph Demo ===\n");

    let mut graph = ProcessorGraph::new();
    graph.add_processor(Processor::builder("addition").target(add_two_numbers()).build()?, None)?;
    graph.add_processor(Processor::builder("square").target(square_number()).build()?, Some("addition"))?;
    graph.add_processor(Processor::builder("sqrt").target(square_root()).build()?, Some("addition"))?;
    graph.start()?;

    for input in INPUTS {
        graph.push_input(input)?;
    }

    // Every input reaches both terminal processors
    let expected = INPUTS.len() * graph.terminal_processors().len();
    for _ in 0..expected {
        let result = next_output(&mut graph).await;
        println!("Received output {} from processor {}", describe(&result), result.processor());
    }

    graph.shutdown().await;
    Ok(())
}
