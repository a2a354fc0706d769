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

//! Per-tick measurements handed to whatever drives the simulation.

use serde::{Deserialize, Serialize};

use crate::grid::{Coordinate, Grid};
use crate::markers::Marker;
use crate::robot::{Robot, RobotId, RobotState};

/// Aggregates recorded once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMetrics {
    pub tick: u32,
    pub running: bool,
    pub average_battery: f64,
    pub percentage_clean: f64,
    pub time_remaining: u32,
    pub total_movements: u32,
    pub debris_remaining: usize,
    pub robots_alive: usize,
    pub total_cleaned: u32,
    pub total_recharges: u32,
}

impl TickMetrics {
    pub fn collect(
        grid: &Grid,
        robots: &[Robot],
        tick: u32,
        max_ticks: u32,
        running: bool,
    ) -> Self {
        let debris_remaining = grid.count_markers(Marker::Debris);
        Self {
            tick,
            running,
            average_battery: average_battery(robots),
            percentage_clean: percentage_clean(grid, debris_remaining),
            time_remaining: max_ticks.saturating_sub(tick),
            total_movements: robots.iter().map(Robot::steps_taken).sum(),
            debris_remaining,
            robots_alive: robots.iter().filter(|robot| robot.is_alive()).count(),
            total_cleaned: robots.iter().map(Robot::cleaned).sum(),
            total_recharges: robots.iter().map(Robot::recharges).sum(),
        }
    }
}

fn average_battery(robots: &[Robot]) -> f64 {
    if robots.is_empty() {
        return 0.0;
    }
    let total: f64 = robots.iter().map(|robot| f64::from(robot.battery())).sum();
    total / robots.len() as f64
}

// Obstacle cells can never be dirty, so they are left out of both sides.
fn percentage_clean(grid: &Grid, debris_remaining: usize) -> f64 {
    let cleanable = grid.width() * grid.height() - grid.count_markers(Marker::Obstacle);
    if cleanable == 0 {
        return 100.0;
    }
    let clean = cleanable.saturating_sub(debris_remaining);
    clean as f64 / cleanable as f64 * 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotSnapshot {
    pub id: RobotId,
    pub position: Coordinate,
    pub battery: u8,
    pub state: RobotState,
    pub in_crisis: bool,
    pub alive: bool,
    pub cleaned: u32,
    pub recharges: u32,
    pub steps_taken: u32,
}

impl From<&Robot> for RobotSnapshot {
    fn from(robot: &Robot) -> Self {
        Self {
            id: robot.id(),
            position: robot.position(),
            battery: robot.battery(),
            state: robot.state(),
            in_crisis: robot.in_crisis(),
            alive: robot.is_alive(),
            cleaned: robot.cleaned(),
            recharges: robot.recharges(),
            steps_taken: robot.steps_taken(),
        }
    }
}

/// Everything a reporting layer needs to draw or log one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metrics: TickMetrics,
    pub robots: Vec<RobotSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_for_fresh_grid() {
        let mut grid = Grid::new(4, 4, false);
        grid.add_border_walls();
        grid.place_marker(Coordinate::new(1, 1), Marker::Debris);
        let robots = vec![
            Robot::with_battery(RobotId(0), Coordinate::new(2, 2), 100),
            Robot::with_battery(RobotId(1), Coordinate::new(2, 1), 50),
        ];

        let metrics = TickMetrics::collect(&grid, &robots, 3, 10, true);

        assert_eq!(metrics.tick, 3);
        assert_eq!(metrics.time_remaining, 7);
        assert_eq!(metrics.average_battery, 75.0);
        assert_eq!(metrics.percentage_clean, 75.0);
        assert_eq!(metrics.debris_remaining, 1);
        assert_eq!(metrics.robots_alive, 2);
        assert_eq!(metrics.total_movements, 0);
    }

    #[test]
    fn test_all_obstacles_counts_as_clean() {
        let mut grid = Grid::new(3, 3, false);
        for c in grid.coordinates().collect::<Vec<_>>() {
            grid.place_marker(c, Marker::Obstacle);
        }
        let metrics = TickMetrics::collect(&grid, &[], 0, 5, true);
        assert_eq!(metrics.percentage_clean, 100.0);
        assert_eq!(metrics.average_battery, 0.0);
    }
}
