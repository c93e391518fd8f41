// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Add two numbers, then square the sum.

mod common;

use bowline::observability::init_logging;
use bowline::{Processor, ProcessorChain};
use common::{add_two_numbers, describe, next_output, square_number, INPUTS};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging("bowline=info")?;
    println!("=== Bowline Chain Demo ===\n");

    let mut chain = ProcessorChain::new();
    chain.add_processor(Processor::builder("addition").target(add_two_numbers()).build()?);
    chain.add_processor(Processor::builder("square").target(square_number()).build()?);
    chain.start()?;

    for input in INPUTS {
        chain.push_input(input)?;
    }

    println!("Results:");
    for _ in 0..INPUTS.len() {
        let result = next_output(&mut chain).await;
        println!("  {} from {}", describe(&result), result.processor());
    }

    chain.shutdown().await;
    Ok(())
}
