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

use crate::grid::Coordinate;

/// Reasons a simulation refuses to start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The grid has no interior cells.
    #[error("grid must be at least 3x3, got {width}x{height}")]
    GridTooSmall { width: usize, height: usize },

    /// A side does not fit a signed 32-bit coordinate, or the cell count overflows.
    #[error("grid of {width}x{height} is too large")]
    GridTooLarge { width: usize, height: usize },

    #[error("at least one robot is required")]
    NoAgents,

    /// A percentage outside 0..=100.
    #[error("{name} must be between 0 and 100, got {value}")]
    PercentageOutOfRange { name: &'static str, value: u32 },

    #[error("max ticks must be positive")]
    NoTicks,

    #[error("the grid has no charging station")]
    NoChargingStations,

    #[error("robot start {0} is outside the grid")]
    OffGrid(Coordinate),

    #[error("robot start {0} is not passable")]
    Impassable(Coordinate),

    /// Two robots can only share a cell when it is a charging station.
    #[error("more than one robot starts on {0}, which is not a charging station")]
    Crowded(Coordinate),

    #[error("battery must be at most 100, got {0}")]
    BatteryOutOfRange(u8),
}
