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

//! The per-robot decision loop.
//!
//! Each tick a robot commits at most one action, chosen in this priority order:
//!
//! 1. dead robots do nothing;
//! 2. an empty battery kills the robot;
//! 3. debris under the robot is cleaned;
//! 4. a station under the robot is used to charge, unless the robot is full and not in crisis;
//! 5. a battery at or below [`CRISIS_THRESHOLD`] sends the robot to the nearest station;
//! 6. otherwise the robot explores: follow the route to known debris, look for debris nearby, or
//!    wander towards unvisited neighbors.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::grid::{Coordinate, Grid};
use crate::markers::Marker;
use crate::pathfinder::{self, Goal};
use crate::{HashSet, Rng};

pub const MAX_BATTERY: u8 = 100;
pub const CRISIS_THRESHOLD: u8 = 35;
pub const RECHARGE_RATE: u8 = 5;

/// Robots are numbered by their position in the simulation's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RobotId(pub usize);

impl std::fmt::Display for RobotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "robot-{}", self.0)
    }
}

/// What the robot was doing on its last turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotState {
    Exploring,
    Cleaning,
    Seeking,
    Charging,
    Dead,
}

/// The single action a robot committed on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The robot was already dead.
    Inert,

    /// The robot died this turn.
    Died,

    Cleaned(Coordinate),

    Moved { from: Coordinate, to: Coordinate },

    /// The robot spent the turn without moving, either blocked or waiting for a route to clear.
    Stayed,

    /// No neighbor was worth considering. Nothing was spent.
    Idle,

    /// Charge gained this turn. Zero when the robot was already full and only left its crisis.
    Charged(u8),

    /// Another robot on the same station has priority.
    WaitedToCharge,
}

/// The other robots in the roster, seen while one robot takes its turn.
pub struct Peers<'a> {
    before: &'a [Robot],
    after: &'a [Robot],
}

impl<'a> Peers<'a> {
    /// Splits the roster into the robot at `index` and everyone else.
    pub fn split(robots: &'a mut [Robot], index: usize) -> Option<(&'a mut Robot, Peers<'a>)> {
        if index >= robots.len() {
            return None;
        }
        let (before, rest) = robots.split_at_mut(index);
        let (robot, after) = rest.split_first_mut()?;
        Some((robot, Peers { before, after }))
    }

    pub fn get(&self, id: RobotId) -> Option<&Robot> {
        let index = id.0;
        let split = self.before.len();
        match index.cmp(&split) {
            std::cmp::Ordering::Less => self.before.get(index),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => self.after.get(index - split - 1),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Robot> {
        self.before.iter().chain(self.after.iter())
    }

    pub fn alive_count(&self) -> usize {
        self.iter().filter(|robot| robot.is_alive()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Robot {
    id: RobotId,
    battery: u8,
    battery_at_tick_start: u8,
    position: Coordinate,
    path_to_debris: VecDeque<Coordinate>,
    path_to_station: VecDeque<Coordinate>,
    visited: HashSet<Coordinate>,
    in_crisis: bool,
    alive: bool,
    state: RobotState,
    cleaned: u32,
    recharges: u32,
    steps_taken: u32,
}

impl Robot {
    pub fn new(id: RobotId, position: Coordinate) -> Self {
        Self::with_battery(id, position, MAX_BATTERY)
    }

    pub fn with_battery(id: RobotId, position: Coordinate, battery: u8) -> Self {
        let battery = battery.min(MAX_BATTERY);
        Self {
            id,
            battery,
            battery_at_tick_start: battery,
            position,
            path_to_debris: VecDeque::new(),
            path_to_station: VecDeque::new(),
            visited: HashSet::default(),
            in_crisis: false,
            alive: true,
            state: RobotState::Exploring,
            cleaned: 0,
            recharges: 0,
            steps_taken: 0,
        }
    }

    pub fn id(&self) -> RobotId {
        self.id
    }

    pub fn battery(&self) -> u8 {
        self.battery
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn in_crisis(&self) -> bool {
        self.in_crisis
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    pub fn cleaned(&self) -> u32 {
        self.cleaned
    }

    pub fn recharges(&self) -> u32 {
        self.recharges
    }

    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    pub fn path_to_debris(&self) -> &VecDeque<Coordinate> {
        &self.path_to_debris
    }

    pub fn path_to_station(&self) -> &VecDeque<Coordinate> {
        &self.path_to_station
    }

    pub fn has_visited(&self, coordinate: Coordinate) -> bool {
        self.visited.contains(&coordinate)
    }

    /// Remembers the battery level that decides who charges first at a shared station during
    /// the coming tick.
    pub fn begin_tick(&mut self) {
        self.battery_at_tick_start = self.battery;
    }

    /// Takes this robot's turn. Only this robot and the grid cells it reads or moves through are
    /// touched.
    pub fn step(&mut self, grid: &mut Grid, peers: &Peers<'_>, rng: &mut Rng) -> Action {
        if !self.alive {
            return Action::Inert;
        }
        let action = if self.battery == 0 {
            self.die(grid)
        } else if grid.has_marker(self.position, Marker::Debris) {
            self.clean(grid)
        } else if grid.has_marker(self.position, Marker::ChargingStation)
            && (self.in_crisis || self.battery < MAX_BATTERY)
        {
            self.recharge(grid, peers)
        } else if self.battery <= CRISIS_THRESHOLD {
            self.in_crisis = true;
            self.seek_station(grid)
        } else {
            self.explore(grid, rng)
        };
        trace!(robot = %self.id, battery = self.battery, ?action, "turn");
        action
    }

    fn spend(&mut self) {
        self.battery = self.battery.saturating_sub(1);
        self.steps_taken += 1;
    }

    fn move_to(&mut self, grid: &mut Grid, to: Coordinate) -> Action {
        let from = self.position;
        if !grid.move_robot(self.id, from, to) {
            return Action::Stayed;
        }
        self.position = to;
        Action::Moved { from, to }
    }

    fn die(&mut self, grid: &mut Grid) -> Action {
        debug!(robot = %self.id, position = %self.position, "robot died");
        self.alive = false;
        self.battery = 0;
        self.in_crisis = false;
        self.state = RobotState::Dead;
        self.path_to_debris.clear();
        self.path_to_station.clear();
        grid.retire_robot(self.id, self.position);
        Action::Died
    }

    fn clean(&mut self, grid: &mut Grid) -> Action {
        self.state = RobotState::Cleaning;
        if !grid.remove_marker(self.position, Marker::Debris) {
            return Action::Stayed;
        }
        self.spend();
        self.cleaned += 1;
        self.path_to_debris.clear();
        Action::Cleaned(self.position)
    }

    fn finish_charging(&mut self) {
        self.in_crisis = false;
        self.path_to_station.clear();
        self.path_to_debris.clear();
    }

    /// Robots sharing a station take turns: only the one with the lowest battery charges, with
    /// ties going to the lower id. Batteries are compared as they were when the tick began, so
    /// at most one robot per station charges in a tick. Waiting costs nothing.
    fn recharge(&mut self, grid: &Grid, peers: &Peers<'_>) -> Action {
        self.state = RobotState::Charging;
        if self.battery >= MAX_BATTERY {
            self.finish_charging();
            return Action::Charged(0);
        }

        let outranked = grid
            .living_robots_at(self.position)
            .filter(|id| *id != self.id)
            .filter_map(|id| peers.get(id))
            .filter(|other| other.is_alive())
            .any(|other| {
                (other.battery_at_tick_start, other.id) < (self.battery_at_tick_start, self.id)
            });
        if outranked {
            debug!(robot = %self.id, station = %self.position, "waiting for shared station");
            return Action::WaitedToCharge;
        }

        let before = self.battery;
        self.battery = (self.battery + RECHARGE_RATE).min(MAX_BATTERY);
        self.recharges += 1;
        if self.battery >= MAX_BATTERY {
            self.finish_charging();
        }
        Action::Charged(self.battery - before)
    }

    fn seek_station(&mut self, grid: &mut Grid) -> Action {
        self.state = RobotState::Seeking;
        if self.path_to_station.is_empty() {
            self.path_to_station =
                pathfinder::shortest_path(grid, self.position, Goal::Station).into();
            if let Some(station) = self.path_to_station.back() {
                debug!(
                    robot = %self.id,
                    %station,
                    steps = self.path_to_station.len(),
                    "heading to station"
                );
            }
        }

        let Some(next) = self.path_to_station.front().copied() else {
            debug!(
                robot = %self.id,
                position = %self.position,
                "stranded without a reachable station"
            );
            return self.die(grid);
        };

        if !is_blocked(grid, next) {
            self.path_to_station.pop_front();
            let action = self.move_to(grid, next);
            self.spend();
            return action;
        }

        if !grid.has_living_robot(next) {
            // a wreck now sits on the route and will never move; plan again next tick
            debug!(robot = %self.id, blocked = %next, "station route blocked");
            self.path_to_station.clear();
            self.spend();
            return Action::Stayed;
        }

        // The next step is taken. Only look elsewhere if the station itself is taken too;
        // otherwise wait for the step to clear.
        let mut action = Action::Stayed;
        let destination_taken = self
            .path_to_station
            .back()
            .map_or(false, |station| grid.has_living_robot(*station));
        if destination_taken {
            let alternative = pathfinder::shortest_path(grid, self.position, Goal::FreeStation);
            match alternative.first() {
                Some(&first) => {
                    debug!(
                        robot = %self.id,
                        station = ?alternative.last(),
                        "switching to free station"
                    );
                    self.path_to_station = alternative.into();
                    self.path_to_station.pop_front();
                    action = self.move_to(grid, first);
                }
                None => self.path_to_station.clear(),
            }
        }
        self.spend();
        action
    }

    fn explore(&mut self, grid: &mut Grid, rng: &mut Rng) -> Action {
        self.state = RobotState::Exploring;

        if self.path_to_debris.is_empty() {
            if let Some(path) = pathfinder::nearest_debris(grid, self.position) {
                debug!(
                    robot = %self.id,
                    debris = ?path.last(),
                    steps = path.len(),
                    "found debris"
                );
                self.path_to_debris = path.into();
            }
        }

        if let Some(next) = self.path_to_debris.pop_front() {
            let action = if is_blocked(grid, next) {
                // taken or wrecked; give up the route rather than wait
                self.path_to_debris.clear();
                Action::Stayed
            } else {
                self.visit(grid, next)
            };
            self.spend();
            return action;
        }

        match self.choose_neighbor(grid, rng) {
            Some(next) => {
                let action = self.visit(grid, next);
                self.spend();
                action
            }
            None => Action::Idle,
        }
    }

    fn visit(&mut self, grid: &mut Grid, to: Coordinate) -> Action {
        let action = self.move_to(grid, to);
        if let Action::Moved { to, .. } = action {
            self.visited.insert(to);
        }
        action
    }

    /// Prefers open neighbors this robot has not stood on yet, then any open neighbor.
    fn choose_neighbor(&self, grid: &Grid, rng: &mut Rng) -> Option<Coordinate> {
        let open: Vec<Coordinate> = grid
            .neighbors(self.position)
            .into_iter()
            .filter(|c| !is_blocked(grid, *c))
            .collect();
        let unvisited: Vec<Coordinate> = open
            .iter()
            .copied()
            .filter(|c| !self.visited.contains(c))
            .collect();
        if unvisited.is_empty() {
            grid.sample_random(&open, rng)
        } else {
            grid.sample_random(&unvisited, rng)
        }
    }
}

/// A cell a robot cannot step onto: impassable, or holding a living robot. Wrecks block plain
/// floor cells through passability.
fn is_blocked(grid: &Grid, at: Coordinate) -> bool {
    !pathfinder::is_passable(grid, at) || grid.has_living_robot(at)
}
