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

//! The grid world: an arena of cells indexed by coordinate, each holding zero or more occupants.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::markers::Marker;
use crate::robot::RobotId;
use crate::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Anything that can sit in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Marker(Marker),

    /// A robot that is still acting.
    Robot(RobotId),

    /// A robot that ran out of battery. It stays where it died.
    Wreck(RobotId),
}

// Neighbor order is part of the search tie-breaking, so it must never change.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    torus: bool,
    cells: Vec<Vec<Occupant>>,
}

impl Grid {
    /// # Panics
    ///
    /// If a side does not fit in an `i32` or the cell count overflows. Sizes read from outside
    /// the program should go through [`Grid::try_new`].
    pub fn new(width: usize, height: usize, torus: bool) -> Self {
        match Self::try_new(width, height, torus) {
            Ok(grid) => grid,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_new(width: usize, height: usize, torus: bool) -> Result<Self, ConfigError> {
        let too_large = ConfigError::GridTooLarge { width, height };
        let cells = width.checked_mul(height).ok_or(too_large.clone())?;
        Ok(Self {
            width: i32::try_from(width).map_err(|_| too_large.clone())?,
            height: i32::try_from(height).map_err(|_| too_large)?,
            torus,
            cells: vec![Vec::new(); cells],
        })
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    pub fn is_torus(&self) -> bool {
        self.torus
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (0..self.width).contains(&coordinate.x) && (0..self.height).contains(&coordinate.y)
    }

    pub fn is_border(&self, coordinate: Coordinate) -> bool {
        coordinate.x == 0
            || coordinate.y == 0
            || coordinate.x == self.width - 1
            || coordinate.y == self.height - 1
    }

    fn index(&self, coordinate: Coordinate) -> Option<usize> {
        if self.contains(coordinate) {
            Some((coordinate.y * self.width + coordinate.x) as usize)
        } else {
            None
        }
    }

    /// All coordinates in row-major order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Coordinate::new(x, y)))
    }

    /// The 8-connected neighbors of a cell, always in the same order. On a torus the edges wrap
    /// around, otherwise neighbors that would fall off the grid are dropped.
    pub fn neighbors(&self, coordinate: Coordinate) -> Vec<Coordinate> {
        let mut neighbors = Vec::with_capacity(NEIGHBOR_OFFSETS.len());
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let mut neighbor = Coordinate::new(coordinate.x + dx, coordinate.y + dy);
            if self.torus {
                neighbor.x = neighbor.x.rem_euclid(self.width);
                neighbor.y = neighbor.y.rem_euclid(self.height);
            }
            // tiny tori wrap onto themselves
            if !self.contains(neighbor) || neighbor == coordinate || neighbors.contains(&neighbor)
            {
                continue;
            }
            neighbors.push(neighbor);
        }
        neighbors
    }

    /// Occupants of a cell. Cells outside the grid have none.
    pub fn occupants(&self, coordinate: Coordinate) -> &[Occupant] {
        match self.index(coordinate) {
            Some(index) => &self.cells[index],
            None => &[],
        }
    }

    pub fn is_empty(&self, coordinate: Coordinate) -> bool {
        self.occupants(coordinate).is_empty()
    }

    pub fn has_marker(&self, coordinate: Coordinate, marker: Marker) -> bool {
        self.occupants(coordinate).contains(&Occupant::Marker(marker))
    }

    /// Whether any robot, living or dead, is in the cell.
    pub fn has_robot(&self, coordinate: Coordinate) -> bool {
        self.occupants(coordinate)
            .iter()
            .any(|occupant| matches!(occupant, Occupant::Robot(_) | Occupant::Wreck(_)))
    }

    pub fn has_living_robot(&self, coordinate: Coordinate) -> bool {
        self.living_robots_at(coordinate).next().is_some()
    }

    pub fn living_robots_at(&self, coordinate: Coordinate) -> impl Iterator<Item = RobotId> + '_ {
        self.occupants(coordinate)
            .iter()
            .filter_map(|occupant| match occupant {
                Occupant::Robot(id) => Some(*id),
                _ => None,
            })
    }

    /// Returns false if the cell is off the grid or already holds the marker.
    pub fn place_marker(&mut self, coordinate: Coordinate, marker: Marker) -> bool {
        if self.has_marker(coordinate, marker) {
            return false;
        }
        match self.index(coordinate) {
            Some(index) => {
                self.cells[index].push(Occupant::Marker(marker));
                true
            }
            None => false,
        }
    }

    /// Returns whether the marker was there to remove.
    pub fn remove_marker(&mut self, coordinate: Coordinate, marker: Marker) -> bool {
        self.remove_occupant(coordinate, Occupant::Marker(marker))
    }

    pub fn place_robot(&mut self, coordinate: Coordinate, id: RobotId) -> bool {
        match self.index(coordinate) {
            Some(index) => {
                self.cells[index].push(Occupant::Robot(id));
                true
            }
            None => false,
        }
    }

    pub fn move_robot(&mut self, id: RobotId, from: Coordinate, to: Coordinate) -> bool {
        if !self.contains(to) || !self.remove_occupant(from, Occupant::Robot(id)) {
            return false;
        }
        self.place_robot(to, id)
    }

    /// Turns a living robot into a wreck in place.
    pub fn retire_robot(&mut self, id: RobotId, at: Coordinate) -> bool {
        let Some(index) = self.index(at) else {
            return false;
        };
        match self.cells[index]
            .iter_mut()
            .find(|occupant| **occupant == Occupant::Robot(id))
        {
            Some(occupant) => {
                *occupant = Occupant::Wreck(id);
                true
            }
            None => false,
        }
    }

    fn remove_occupant(&mut self, coordinate: Coordinate, target: Occupant) -> bool {
        let Some(index) = self.index(coordinate) else {
            return false;
        };
        let cell = &mut self.cells[index];
        match cell.iter().position(|occupant| *occupant == target) {
            Some(position) => {
                cell.remove(position);
                true
            }
            None => false,
        }
    }

    /// Puts an obstacle on every border cell. Returns how many were placed.
    pub fn add_border_walls(&mut self) -> usize {
        let border: Vec<Coordinate> = self.coordinates().filter(|c| self.is_border(*c)).collect();
        border
            .into_iter()
            .filter(|c| self.place_marker(*c, Marker::Obstacle))
            .count()
    }

    pub fn empty_cells(&self) -> Vec<Coordinate> {
        self.coordinates().filter(|c| self.is_empty(*c)).collect()
    }

    pub fn count_markers(&self, marker: Marker) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|occupant| **occupant == Occupant::Marker(marker))
            .count()
    }

    /// Uniform choice among candidate cells, drawn from the shared stream.
    pub fn sample_random(&self, candidates: &[Coordinate], rng: &mut Rng) -> Option<Coordinate> {
        candidates.choose(rng).copied()
    }
}

// Robots are drawn over stations, stations over debris.
impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let occupants = self.occupants(Coordinate::new(x, y));
                let c = if occupants.iter().any(|o| matches!(o, Occupant::Robot(_))) {
                    'R'
                } else if occupants.iter().any(|o| matches!(o, Occupant::Wreck(_))) {
                    'x'
                } else if occupants.contains(&Occupant::Marker(Marker::ChargingStation)) {
                    Marker::ChargingStation.symbol()
                } else if occupants.contains(&Occupant::Marker(Marker::Debris)) {
                    Marker::Debris.symbol()
                } else if occupants.contains(&Occupant::Marker(Marker::Obstacle)) {
                    Marker::Obstacle.symbol()
                } else {
                    '.'
                };
                s.push(c);
            }
            if y < self.height - 1 {
                s.push('\n');
            }
        }
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_oversized_grid_is_rejected() {
        let wide = i32::MAX as usize + 1;
        assert_eq!(
            Grid::try_new(wide, 3, false),
            Err(ConfigError::GridTooLarge {
                width: wide,
                height: 3
            })
        );
        assert_eq!(
            Grid::try_new(usize::MAX, 2, false),
            Err(ConfigError::GridTooLarge {
                width: usize::MAX,
                height: 2
            })
        );
        let grid = Grid::try_new(4, 3, true).unwrap();
        assert_eq!((grid.width(), grid.height()), (4, 3));
    }

    #[test]
    fn test_corner_has_three_neighbors() {
        let grid = Grid::new(4, 4, false);
        assert_eq!(
            grid.neighbors(Coordinate::new(0, 0)),
            vec![
                Coordinate::new(0, 1),
                Coordinate::new(1, 0),
                Coordinate::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_interior_neighbor_order_is_fixed() {
        let grid = Grid::new(5, 5, false);
        assert_eq!(
            grid.neighbors(Coordinate::new(2, 2)),
            vec![
                Coordinate::new(1, 1),
                Coordinate::new(1, 2),
                Coordinate::new(1, 3),
                Coordinate::new(2, 1),
                Coordinate::new(2, 3),
                Coordinate::new(3, 1),
                Coordinate::new(3, 2),
                Coordinate::new(3, 3),
            ]
        );
    }

    #[test]
    fn test_torus_wraps_corner() {
        let grid = Grid::new(4, 4, true);
        let neighbors = grid.neighbors(Coordinate::new(0, 0));
        assert_eq!(neighbors.len(), 8);
        assert_eq!(neighbors[0], Coordinate::new(3, 3));
        assert!(neighbors.contains(&Coordinate::new(3, 0)));
        assert!(neighbors.contains(&Coordinate::new(0, 3)));
    }

    #[test]
    fn test_tiny_torus_has_no_duplicate_neighbors() {
        let grid = Grid::new(2, 1, true);
        assert_eq!(
            grid.neighbors(Coordinate::new(0, 0)),
            vec![Coordinate::new(1, 0)]
        );
    }

    #[test]
    fn test_border_walls_cover_edges_only() {
        let mut grid = Grid::new(5, 4, false);
        assert_eq!(grid.add_border_walls(), 14);
        assert!(grid.has_marker(Coordinate::new(0, 0), Marker::Obstacle));
        assert!(grid.has_marker(Coordinate::new(4, 3), Marker::Obstacle));
        assert!(grid.is_empty(Coordinate::new(2, 2)));
        assert_eq!(grid.empty_cells().len(), 6);
        assert_eq!(grid.add_border_walls(), 0);
    }

    #[test]
    fn test_robot_moves_and_retires() {
        let mut grid = Grid::new(3, 3, false);
        let id = RobotId(0);
        let start = Coordinate::new(0, 0);
        let end = Coordinate::new(1, 1);
        assert!(grid.place_robot(start, id));
        assert!(grid.move_robot(id, start, end));
        assert!(grid.is_empty(start));
        assert!(grid.has_living_robot(end));

        assert!(grid.retire_robot(id, end));
        assert!(!grid.has_living_robot(end));
        assert!(grid.has_robot(end));
        assert_eq!(grid.occupants(end), &[Occupant::Wreck(id)]);
        assert!(!grid.move_robot(id, end, start));
    }

    #[test]
    fn test_remove_marker_only_once() {
        let mut grid = Grid::new(3, 3, false);
        let c = Coordinate::new(1, 2);
        assert!(grid.place_marker(c, Marker::Debris));
        assert!(!grid.place_marker(c, Marker::Debris));
        assert_eq!(grid.count_markers(Marker::Debris), 1);
        assert!(grid.remove_marker(c, Marker::Debris));
        assert!(!grid.remove_marker(c, Marker::Debris));
        assert_eq!(grid.count_markers(Marker::Debris), 0);
    }

    #[test]
    fn test_off_grid_queries_are_empty() {
        let mut grid = Grid::new(3, 3, false);
        let outside = Coordinate::new(-1, 5);
        assert!(grid.occupants(outside).is_empty());
        assert!(!grid.place_marker(outside, Marker::Obstacle));
        assert!(!grid.place_robot(outside, RobotId(1)));
    }

    #[test]
    fn test_sample_random_is_reproducible() {
        let grid = Grid::new(3, 3, false);
        let candidates = grid.empty_cells();
        let mut rng1 = Rng::seed_from_u64(7);
        let mut rng2 = Rng::seed_from_u64(7);
        for _ in 0..10 {
            let a = grid.sample_random(&candidates, &mut rng1);
            let b = grid.sample_random(&candidates, &mut rng2);
            assert_eq!(a, b);
            assert!(candidates.contains(&a.unwrap()));
        }
        assert_eq!(grid.sample_random(&[], &mut rng1), None);
    }

    #[test]
    fn test_display() {
        let mut grid = Grid::new(4, 3, false);
        grid.add_border_walls();
        grid.place_marker(Coordinate::new(1, 1), Marker::ChargingStation);
        grid.place_robot(Coordinate::new(1, 1), RobotId(0));
        grid.place_marker(Coordinate::new(2, 1), Marker::Debris);
        assert_eq!(format!("{}", grid), "####\n#R*#\n####");
    }
}
