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

//! Cleaning robots on a grid.
//!
//! Several robots share a bounded grid with obstacles, debris and charging stations. Each robot
//! runs its own decision loop every tick: clean the debris it is standing on, charge when it sits
//! on a station, head for the nearest station when the battery runs low, or otherwise look for
//! debris nearby and wander towards unvisited cells. The simulation presents the robots in a
//! seeded random order each tick and stops once the grid is clean, every robot is dead, or the
//! tick limit is reached.
//!
//! ```no_run
//! use cleaning_robots::{Simulation, SimulationConfig};
//!
//! let mut simulation = Simulation::new(SimulationConfig::default()).unwrap();
//! simulation.run();
//! println!("{:?}", simulation.metrics());
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod markers;
pub mod metrics;
pub mod pathfinder;
pub mod robot;
pub mod simulation;

pub use config::SimulationConfig;
pub use error::ConfigError;
pub use grid::{Coordinate, Grid, Occupant};
pub use markers::Marker;
pub use metrics::{RobotSnapshot, Snapshot, TickMetrics};
pub use robot::{Action, Robot, RobotId, RobotState};
pub use simulation::{Scenario, Simulation};

/// The single pseudorandom stream shared by setup, tick ordering and tie-breaks.
pub type Rng = rand_pcg::Pcg64;
pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<K> = rustc_hash::FxHashSet<K>;
