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

//! Turn ordering, termination and metrics.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::grid::{Coordinate, Grid};
use crate::markers::Marker;
use crate::metrics::{RobotSnapshot, Snapshot, TickMetrics};
use crate::pathfinder;
use crate::robot::{Action, Peers, Robot, RobotId, MAX_BATTERY};
use crate::Rng;

/// Where the station and robot go when a random layout has a single robot.
pub const SINGLE_AGENT_START: Coordinate = Coordinate::new(1, 1);

#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    robots: Vec<Robot>,
    rng: Rng,
    tick: u32,
    max_ticks: u32,
    running: bool,
    history: Vec<TickMetrics>,
}

fn place_random(
    grid: &mut Grid,
    candidates: &[Coordinate],
    count: usize,
    marker: Marker,
    rng: &mut Rng,
) -> Vec<Coordinate> {
    let chosen: Vec<Coordinate> = candidates.choose_multiple(rng, count).copied().collect();
    for coordinate in &chosen {
        grid.place_marker(*coordinate, marker);
    }
    chosen
}

impl Simulation {
    /// Lays out a random grid from `config`: border walls, then obstacles, debris and stations,
    /// with one robot starting on each station. Every random draw comes from one stream seeded
    /// with `config.seed`, which the simulation keeps using for turn order and tie-breaks.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Rng::seed_from_u64(config.seed);
        let mut grid = Grid::try_new(config.width, config.height, config.torus)?;
        if config.border_walls {
            grid.add_border_walls();
        }

        let reserved = (config.num_agents == 1).then_some(SINGLE_AGENT_START);
        let free_cells = |grid: &Grid| -> Vec<Coordinate> {
            grid.empty_cells()
                .into_iter()
                .filter(|c| Some(*c) != reserved)
                .collect()
        };

        let candidates = free_cells(&grid);
        let obstacles = config.obstacle_count().min(candidates.len());
        place_random(&mut grid, &candidates, obstacles, Marker::Obstacle, &mut rng);

        let candidates = free_cells(&grid);
        let debris = config.debris_count().min(candidates.len());
        place_random(&mut grid, &candidates, debris, Marker::Debris, &mut rng);

        let stations = match reserved {
            Some(start) => {
                grid.place_marker(start, Marker::ChargingStation);
                vec![start]
            }
            None => {
                let candidates = grid.empty_cells();
                let count = config.num_agents.min(candidates.len());
                if count < config.num_agents {
                    warn!(
                        requested = config.num_agents,
                        placed = count,
                        "not enough free cells for every robot"
                    );
                }
                place_random(
                    &mut grid,
                    &candidates,
                    count,
                    Marker::ChargingStation,
                    &mut rng,
                )
            }
        };
        if stations.is_empty() {
            return Err(ConfigError::NoChargingStations);
        }

        let robots = stations
            .iter()
            .enumerate()
            .map(|(index, station)| {
                let id = RobotId(index);
                grid.place_robot(*station, id);
                Robot::new(id, *station)
            })
            .collect();

        info!(
            width = config.width,
            height = config.height,
            robots = stations.len(),
            obstacles = grid.count_markers(Marker::Obstacle),
            debris = grid.count_markers(Marker::Debris),
            seed = config.seed,
            "simulation ready"
        );
        Ok(Self::assemble(grid, robots, rng, config.max_ticks))
    }

    fn assemble(grid: Grid, robots: Vec<Robot>, rng: Rng, max_ticks: u32) -> Self {
        let mut simulation = Self {
            grid,
            robots,
            rng,
            tick: 0,
            max_ticks,
            running: true,
            history: Vec::new(),
        };
        simulation.history.push(simulation.metrics());
        simulation
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(id.0)
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn debris_remaining(&self) -> usize {
        self.grid.count_markers(Marker::Debris)
    }

    /// Metrics for every tick so far, starting with the layout before the first tick.
    pub fn history(&self) -> &[TickMetrics] {
        &self.history
    }

    pub fn metrics(&self) -> TickMetrics {
        TickMetrics::collect(
            &self.grid,
            &self.robots,
            self.tick,
            self.max_ticks,
            self.running,
        )
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            metrics: self.metrics(),
            robots: self.robots.iter().map(RobotSnapshot::from).collect(),
        }
    }

    /// Advances exactly one tick. Once the simulation has finished this does nothing.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }
        self.tick += 1;
        for robot in &mut self.robots {
            robot.begin_tick();
        }

        let mut order: Vec<usize> = (0..self.robots.len()).collect();
        order.shuffle(&mut self.rng);
        for index in order {
            let Some((robot, peers)) = Peers::split(&mut self.robots, index) else {
                continue;
            };
            let action = robot.step(&mut self.grid, &peers, &mut self.rng);
            if action == Action::Died && peers.alive_count() == 0 {
                info!(tick = self.tick, "every robot is dead");
                self.running = false;
            }
        }

        if self.tick >= self.max_ticks {
            info!(tick = self.tick, "reached the tick limit");
            self.running = false;
        } else if self.debris_remaining() == 0 {
            info!(tick = self.tick, "grid is clean");
            self.running = false;
        }
        self.history.push(self.metrics());
    }

    /// Steps until the simulation finishes and returns the final metrics.
    pub fn run(&mut self) -> TickMetrics {
        while self.running {
            self.step();
        }
        self.metrics()
    }
}

/// A hand-built starting layout.
///
/// ```
/// use cleaning_robots::{Coordinate, Grid, Marker, Scenario};
///
/// let mut grid = Grid::new(8, 8, false);
/// grid.add_border_walls();
/// grid.place_marker(Coordinate::new(1, 1), Marker::ChargingStation);
/// grid.place_marker(Coordinate::new(3, 1), Marker::Debris);
///
/// let mut simulation = Scenario::new(grid)
///     .robot(Coordinate::new(1, 1))
///     .max_ticks(50)
///     .build()
///     .unwrap();
/// simulation.run();
/// assert_eq!(simulation.debris_remaining(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Scenario {
    grid: Grid,
    robots: Vec<(Coordinate, u8)>,
    max_ticks: u32,
    seed: u64,
}

impl Scenario {
    pub fn new(grid: Grid) -> Self {
        let defaults = SimulationConfig::default();
        Self {
            grid,
            robots: Vec::new(),
            max_ticks: defaults.max_ticks,
            seed: defaults.seed,
        }
    }

    pub fn robot(self, at: Coordinate) -> Self {
        self.robot_with_battery(at, MAX_BATTERY)
    }

    pub fn robot_with_battery(mut self, at: Coordinate, battery: u8) -> Self {
        self.robots.push((at, battery));
        self
    }

    pub fn max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<Simulation, ConfigError> {
        let Scenario {
            mut grid,
            robots,
            max_ticks,
            seed,
        } = self;
        if max_ticks == 0 {
            return Err(ConfigError::NoTicks);
        }
        if robots.is_empty() {
            return Err(ConfigError::NoAgents);
        }
        if grid.count_markers(Marker::ChargingStation) == 0 {
            return Err(ConfigError::NoChargingStations);
        }

        for (index, (at, battery)) in robots.iter().enumerate() {
            if !grid.contains(*at) {
                return Err(ConfigError::OffGrid(*at));
            }
            if !pathfinder::is_passable(&grid, *at) {
                return Err(ConfigError::Impassable(*at));
            }
            if *battery > MAX_BATTERY {
                return Err(ConfigError::BatteryOutOfRange(*battery));
            }
            let shared = robots[..index].iter().any(|(other, _)| other == at);
            if shared && !grid.has_marker(*at, Marker::ChargingStation) {
                return Err(ConfigError::Crowded(*at));
            }
        }

        let robots = robots
            .into_iter()
            .enumerate()
            .map(|(index, (at, battery))| {
                let id = RobotId(index);
                grid.place_robot(at, id);
                Robot::with_battery(id, at, battery)
            })
            .collect();
        Ok(Simulation::assemble(
            grid,
            robots,
            Rng::seed_from_u64(seed),
            max_ticks,
        ))
    }
}
