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

//! Path searches over the grid.
//!
//! There are two searches:
//!
//! - [`nearest_debris`] is a breadth-first search bounded by [`DEBRIS_SEARCH_RADIUS`]. It only
//!   discovers the target; the route handed back always comes from [`shortest_path`] so that
//!   every committed route uses the same tie-breaking.
//! - [`shortest_path`] is a uniform-cost search with unit edge weights towards the first cell
//!   satisfying a [`Goal`]. The frontier is ordered by (distance, insertion order), which together
//!   with the grid's fixed neighbor order makes the result identical for identical grids.
//!
//! Neither search fails loudly. No reachable target is an empty route or `None`, and callers treat
//! that as "nothing to do this tick".

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::grid::{Coordinate, Grid};
use crate::markers::Marker;
use crate::{HashMap, HashSet};

/// How far, in steps, a robot looks for debris before wandering.
pub const DEBRIS_SEARCH_RADIUS: usize = 5;

/// What a [`shortest_path`] search is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Any charging station.
    Station,

    /// A charging station no living robot is standing on. The search also refuses to route
    /// through cells holding a living robot.
    FreeStation,

    /// One specific cell.
    Cell(Coordinate),
}

impl Goal {
    fn is_reached(&self, grid: &Grid, coordinate: Coordinate) -> bool {
        match self {
            Goal::Station => grid.has_marker(coordinate, Marker::ChargingStation),
            Goal::FreeStation => {
                grid.has_marker(coordinate, Marker::ChargingStation)
                    && !grid.has_living_robot(coordinate)
            }
            Goal::Cell(target) => *target == coordinate,
        }
    }

    fn can_enter(&self, grid: &Grid, coordinate: Coordinate) -> bool {
        match self {
            Goal::FreeStation => {
                is_passable(grid, coordinate) && !grid.has_living_robot(coordinate)
            }
            Goal::Station | Goal::Cell(_) => is_passable(grid, coordinate),
        }
    }
}

/// A cell can be routed through when it holds no obstacle and is either empty or holds debris or
/// a charging station. A robot standing on plain floor therefore blocks the cell, while a robot on
/// a station or on debris does not.
pub fn is_passable(grid: &Grid, coordinate: Coordinate) -> bool {
    if !grid.contains(coordinate) || grid.has_marker(coordinate, Marker::Obstacle) {
        return false;
    }
    grid.is_empty(coordinate)
        || grid.has_marker(coordinate, Marker::Debris)
        || grid.has_marker(coordinate, Marker::ChargingStation)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    distance: usize,
    order: usize,
    coordinate: Coordinate,
}

// BinaryHeap is a max-heap, so reverse to pop the smallest (distance, order) first.
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.distance, other.order).cmp(&(self.distance, self.order))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest route from `start` to the nearest cell satisfying `goal`.
///
/// The returned route excludes `start` and ends on the goal cell. It is empty when no goal cell is
/// reachable, and also when `start` itself satisfies the goal.
pub fn shortest_path(grid: &Grid, start: Coordinate, goal: Goal) -> Vec<Coordinate> {
    let mut order = 0;
    let mut frontier = BinaryHeap::new();
    frontier.push(FrontierEntry {
        distance: 0,
        order,
        coordinate: start,
    });
    let mut distances: HashMap<Coordinate, usize> = HashMap::default();
    distances.insert(start, 0);
    let mut previous: HashMap<Coordinate, Coordinate> = HashMap::default();
    let mut visited: HashSet<Coordinate> = HashSet::default();

    while let Some(FrontierEntry {
        distance,
        coordinate,
        ..
    }) = frontier.pop()
    {
        if !visited.insert(coordinate) {
            continue;
        }

        if goal.is_reached(grid, coordinate) {
            return reconstruct_path(&previous, start, coordinate);
        }

        for neighbor in grid.neighbors(coordinate) {
            if visited.contains(&neighbor) || !goal.can_enter(grid, neighbor) {
                continue;
            }
            let next_distance = distance + 1;
            let improves = distances
                .get(&neighbor)
                .map_or(true, |known| next_distance < *known);
            if improves {
                distances.insert(neighbor, next_distance);
                previous.insert(neighbor, coordinate);
                order += 1;
                frontier.push(FrontierEntry {
                    distance: next_distance,
                    order,
                    coordinate: neighbor,
                });
            }
        }
    }

    Vec::new()
}

fn reconstruct_path(
    previous: &HashMap<Coordinate, Coordinate>,
    start: Coordinate,
    end: Coordinate,
) -> Vec<Coordinate> {
    let mut path = Vec::new();
    let mut current = end;
    while current != start {
        path.push(current);
        match previous.get(&current) {
            Some(parent) => current = *parent,
            None => break,
        }
    }
    path.reverse();
    path
}

/// Looks for debris within [`DEBRIS_SEARCH_RADIUS`] steps of `start`, expanding neighbors in grid
/// order so the first debris reached wins. Returns the committed route to it.
pub fn nearest_debris(grid: &Grid, start: Coordinate) -> Option<Vec<Coordinate>> {
    let mut queue = VecDeque::from([(start, 0)]);
    let mut visited: HashSet<Coordinate> = HashSet::default();
    visited.insert(start);

    while let Some((coordinate, distance)) = queue.pop_front() {
        if distance > DEBRIS_SEARCH_RADIUS {
            continue;
        }

        if grid.has_marker(coordinate, Marker::Debris) {
            let path = shortest_path(grid, start, Goal::Cell(coordinate));
            return if path.is_empty() { None } else { Some(path) };
        }

        for neighbor in grid.neighbors(coordinate) {
            if !visited.contains(&neighbor) && is_passable(grid, neighbor) {
                visited.insert(neighbor);
                queue.push_back((neighbor, distance + 1));
            }
        }
    }

    None
}
