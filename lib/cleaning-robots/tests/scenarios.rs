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

use cleaning_robots::robot::{CRISIS_THRESHOLD, MAX_BATTERY, RECHARGE_RATE};
use cleaning_robots::{Coordinate, Grid, Marker, RobotId, RobotState, Scenario, Simulation};

fn walled(width: usize, height: usize) -> Grid {
    let mut grid = Grid::new(width, height, false);
    grid.add_border_walls();
    grid
}

// Debris no robot can ever reach, so the simulation keeps running.
fn enclose_debris(grid: &mut Grid, at: Coordinate) {
    grid.place_marker(at, Marker::Debris);
    for neighbor in grid.neighbors(at) {
        grid.place_marker(neighbor, Marker::Obstacle);
    }
}

#[test]
fn test_clean_grid_finishes_on_first_tick() {
    let start = Coordinate::new(1, 1);
    let mut grid = walled(8, 8);
    grid.place_marker(start, Marker::ChargingStation);
    let mut simulation = Scenario::new(grid).robot(start).build().unwrap();
    assert!(simulation.is_running());

    simulation.step();

    assert!(!simulation.is_running());
    assert_eq!(simulation.tick(), 1);
    let metrics = simulation.metrics();
    assert_eq!(metrics.total_cleaned, 0);
    assert_eq!(metrics.debris_remaining, 0);
    assert_eq!(metrics.percentage_clean, 100.0);
}

#[test]
fn test_robot_walks_to_debris_and_cleans_it() {
    let start = Coordinate::new(1, 1);
    let debris = Coordinate::new(3, 1);
    let mut grid = walled(8, 8);
    grid.place_marker(start, Marker::ChargingStation);
    grid.place_marker(debris, Marker::Debris);
    let mut simulation = Scenario::new(grid).robot(start).build().unwrap();
    let robot = RobotId(0);

    simulation.step();
    simulation.step();
    assert!(simulation.is_running());
    assert_eq!(simulation.robot(robot).unwrap().position(), debris);

    simulation.step();

    assert!(!simulation.is_running());
    assert_eq!(simulation.tick(), 3);
    assert_eq!(simulation.debris_remaining(), 0);
    let robot = simulation.robot(robot).unwrap();
    assert_eq!(robot.battery(), MAX_BATTERY - 3);
    assert_eq!(robot.cleaned(), 1);
    assert_eq!(robot.steps_taken(), 3);
    assert_eq!(robot.state(), RobotState::Cleaning);
}

#[test]
fn test_low_battery_robot_recharges_to_full() {
    let start = Coordinate::new(1, 1);
    let station = Coordinate::new(3, 1);
    let mut grid = walled(12, 12);
    grid.place_marker(station, Marker::ChargingStation);
    enclose_debris(&mut grid, Coordinate::new(9, 9));
    let mut simulation = Scenario::new(grid)
        .robot_with_battery(start, CRISIS_THRESHOLD)
        .build()
        .unwrap();
    let id = RobotId(0);

    simulation.step();
    let robot = simulation.robot(id).unwrap();
    assert!(robot.in_crisis());
    assert_eq!(robot.state(), RobotState::Seeking);
    assert_ne!(robot.position(), start);

    simulation.step();
    let robot = simulation.robot(id).unwrap();
    assert_eq!(robot.position(), station);
    let arrived_with = robot.battery();
    assert_eq!(arrived_with, CRISIS_THRESHOLD - 2);

    let missing = MAX_BATTERY - arrived_with;
    let charges = (missing + RECHARGE_RATE - 1) / RECHARGE_RATE;
    for _ in 1..charges {
        simulation.step();
        let robot = simulation.robot(id).unwrap();
        assert!(robot.in_crisis());
        assert_eq!(robot.state(), RobotState::Charging);
        assert_eq!(robot.position(), station);
    }
    simulation.step();

    let robot = simulation.robot(id).unwrap();
    assert_eq!(robot.battery(), MAX_BATTERY);
    assert!(!robot.in_crisis());
    assert_eq!(robot.recharges(), u32::from(charges));
    assert_eq!(robot.steps_taken(), 2);
    assert_eq!(simulation.tick(), 2 + u32::from(charges));
}

#[test]
fn test_shared_station_charges_one_robot_per_tick() {
    let station = Coordinate::new(2, 2);
    let mut grid = walled(10, 10);
    grid.place_marker(station, Marker::ChargingStation);
    enclose_debris(&mut grid, Coordinate::new(6, 6));

    for seed in 0..8 {
        let mut simulation = Scenario::new(grid.clone())
            .robot_with_battery(station, 50)
            .robot_with_battery(station, 60)
            .seed(seed)
            .build()
            .unwrap();

        for _ in 0..10 {
            let before: Vec<(u8, RobotId)> = simulation
                .robots()
                .iter()
                .map(|robot| (robot.battery(), robot.id()))
                .collect();
            simulation.step();
            let charged: Vec<RobotId> = simulation
                .robots()
                .iter()
                .zip(&before)
                .filter(|(robot, (battery, _))| robot.battery() > *battery)
                .map(|(robot, _)| robot.id())
                .collect();
            let lowest = before.iter().min().unwrap().1;
            assert_eq!(charged, vec![lowest], "seed {}", seed);
        }
        assert!(simulation
            .robots()
            .iter()
            .all(|robot| robot.position() == station && robot.steps_taken() == 0));
    }
}

#[test]
fn test_stranded_robot_dies_on_first_tick() {
    let start = Coordinate::new(1, 1);
    let mut grid = walled(8, 8);
    grid.place_marker(Coordinate::new(5, 5), Marker::ChargingStation);
    grid.place_marker(Coordinate::new(5, 2), Marker::Debris);
    for c in [
        Coordinate::new(1, 2),
        Coordinate::new(2, 1),
        Coordinate::new(2, 2),
    ] {
        grid.place_marker(c, Marker::Obstacle);
    }
    let mut simulation = Scenario::new(grid)
        .robot_with_battery(start, CRISIS_THRESHOLD)
        .build()
        .unwrap();

    simulation.step();

    let robot = simulation.robot(RobotId(0)).unwrap();
    assert!(!robot.is_alive());
    assert_eq!(robot.state(), RobotState::Dead);
    assert_eq!(robot.position(), start);
    assert!(simulation.grid().has_robot(start));
    assert!(!simulation.is_running());
}

#[test]
fn test_default_layout_runs_to_completion() {
    let mut simulation = Simulation::new(Default::default()).unwrap();
    let last = simulation.run();

    assert!(!last.running);
    assert!(last.tick <= 500);
    assert!(last.debris_remaining == 0 || last.tick == 500 || last.robots_alive == 0);
    assert_eq!(simulation.history().last(), Some(&last));

    let json = serde_json::to_string(&simulation.snapshot()).unwrap();
    assert!(json.contains("\"robots\""));
}
