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

use serde::{Deserialize, Serialize};

/// Inert entities placed on the grid at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    /// Permanent and impassable.
    Obstacle,

    /// Removed when a robot cleans its cell. Robots may path through it.
    Debris,

    /// Permanent. Robots may path through it and several may share it.
    ChargingStation,
}

impl Marker {
    /// Whether a robot may route through a cell holding this marker.
    pub fn is_passable(self) -> bool {
        !matches!(self, Marker::Obstacle)
    }

    /// Whether the marker stays for the lifetime of the simulation.
    pub fn is_permanent(self) -> bool {
        !matches!(self, Marker::Debris)
    }

    pub fn symbol(self) -> char {
        match self {
            Marker::Obstacle => '#',
            Marker::Debris => '*',
            Marker::ChargingStation => 'C',
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::Obstacle => write!(f, "obstacle"),
            Marker::Debris => write!(f, "debris"),
            Marker::ChargingStation => write!(f, "charging station"),
        }
    }
}
