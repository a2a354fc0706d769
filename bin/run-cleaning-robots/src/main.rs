/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Runs one cleaning robot simulation and prints the outcome as JSON.
//!
//! Set `RUST_LOG=cleaning_robots=debug` to follow individual robots.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cleaning_robots::{Simulation, SimulationConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "run-cleaning-robots", about = "Run a cleaning robot simulation once")]
struct Cli {
    /// JSON file with simulation settings. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Number of robots, each starting on its own charging station.
    #[arg(long)]
    agents: Option<usize>,

    /// Share of interior cells that start dirty, 0 to 100.
    #[arg(long)]
    dirty: Option<u32>,

    /// Share of interior cells that hold obstacles, 0 to 100.
    #[arg(long)]
    obstacles: Option<u32>,

    #[arg(long)]
    max_ticks: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Wrap the grid edges.
    #[arg(long)]
    torus: bool,

    /// Leave the outer ring of cells open.
    #[arg(long)]
    no_border_walls: bool,

    /// Print every robot alongside the final metrics.
    #[arg(long)]
    snapshot: bool,

    /// Print the final grid to stderr.
    #[arg(long)]
    show_grid: bool,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(agents) = self.agents {
            config.num_agents = agents;
        }
        if let Some(dirty) = self.dirty {
            config.percentage_dirty = dirty;
        }
        if let Some(obstacles) = self.obstacles {
            config.percentage_obstacles = obstacles;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = max_ticks;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.torus {
            config.torus = true;
        }
        if self.no_border_walls {
            config.border_walls = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.simulation_config()?;

    let mut simulation = Simulation::new(config).context("setting up the simulation")?;
    let last = simulation.run();
    info!(
        tick = last.tick,
        cleaned = last.total_cleaned,
        debris_remaining = last.debris_remaining,
        robots_alive = last.robots_alive,
        "simulation finished"
    );

    if cli.show_grid {
        eprintln!("{}", simulation.grid());
    }
    let output = if cli.snapshot {
        serde_json::to_string_pretty(&simulation.snapshot())?
    } else {
        serde_json::to_string_pretty(&last)?
    };
    println!("{}", output);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
