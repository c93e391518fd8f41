// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A single processor with several worker instances.

mod common;

use bowline::observability::init_logging;
use bowline::Processor;
use common::{add_two_numbers, describe, next_output, INPUTS};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging("bowline=info")?;
    println!("=== Bowline Processor Demo ===\n");

    let mut processor = Processor::builder("addition")
        .target(add_two_numbers())
        .instances(3)
        .build()?;
    processor.start()?;

    for input in INPUTS {
        processor.push_input(input)?;
    }

    for _ in 0..INPUTS.len() {
        let result = next_output(&mut processor).await;
        println!("Received output {} from processor {}", describe(&result), result.processor());
    }

    for stats in processor.get_stats() {
        println!("Instance {} processed {} input(s)", stats.instance, stats.inputs_processed);
    }

    processor.shutdown().await;
    Ok(())
}
