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

//! Evaluates the cleaning robots over many seeds.
//!
//! Every seed gets its own random layout with the same settings. Runs are independent, so they
//! are spread across threads with rayon. The report lists each run and the averages over all of
//! them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cleaning_robots::{Simulation, SimulationConfig, TickMetrics};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "evaluate-cleaning-robots",
    about = "Average cleaning robot performance over many seeds"
)]
struct Cli {
    /// JSON file with simulation settings. Flags below override its values; its seed is
    /// replaced by each evaluated seed.
    #[arg(long)]
    config: Option<PathBuf>,

    /// First seed to evaluate.
    #[arg(long, default_value_t = 0)]
    first_seed: u64,

    /// How many consecutive seeds to evaluate.
    #[arg(long, default_value_t = 100)]
    runs: u64,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

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

    /// Wrap the grid edges.
    #[arg(long)]
    torus: bool,

    /// Leave the outer ring of cells open.
    #[arg(long)]
    no_border_walls: bool,

    /// Leave out the per-seed results.
    #[arg(long)]
    summary_only: bool,
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
        if self.torus {
            config.torus = true;
        }
        if self.no_border_walls {
            config.border_walls = false;
        }
        config.seed = self.first_seed;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct RunResult {
    seed: u64,
    ticks: u32,
    finished_clean: bool,
    metrics: TickMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Summary {
    runs: usize,
    finished_clean: usize,
    average_ticks: f64,
    average_percentage_clean: f64,
    average_battery: f64,
    average_robots_alive: f64,
    average_movements: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    config: SimulationConfig,
    summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<RunResult>>,
}

fn evaluate(config: &SimulationConfig, seed: u64) -> Result<RunResult> {
    let mut simulation = Simulation::new(SimulationConfig {
        seed,
        ..config.clone()
    })
    .with_context(|| format!("setting up seed {}", seed))?;
    let metrics = simulation.run();
    Ok(RunResult {
        seed,
        ticks: metrics.tick,
        finished_clean: metrics.debris_remaining == 0,
        metrics,
    })
}

fn summarize(results: &[RunResult]) -> Summary {
    let runs = results.len();
    let average = |value: fn(&RunResult) -> f64| -> f64 {
        if runs == 0 {
            return 0.0;
        }
        results.iter().map(value).sum::<f64>() / runs as f64
    };
    Summary {
        runs,
        finished_clean: results.iter().filter(|result| result.finished_clean).count(),
        average_ticks: average(|result| f64::from(result.ticks)),
        average_percentage_clean: average(|result| result.metrics.percentage_clean),
        average_battery: average(|result| result.metrics.average_battery),
        average_robots_alive: average(|result| result.metrics.robots_alive as f64),
        average_movements: average(|result| f64::from(result.metrics.total_movements)),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.simulation_config()?;

    let last_seed = cli.first_seed.saturating_add(cli.runs);
    let results = (cli.first_seed..last_seed)
        .into_par_iter()
        .map(|seed| evaluate(&config, seed))
        .collect::<Result<Vec<_>>>()?;
    let summary = summarize(&results);
    info!(
        runs = summary.runs,
        finished_clean = summary.finished_clean,
        average_ticks = summary.average_ticks,
        "evaluation finished"
    );

    let report = Report {
        config,
        summary,
        results: (!cli.summary_only).then_some(results),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
