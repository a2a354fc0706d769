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

use crate::error::ConfigError;

/// Parameters for a randomly laid out simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub width: usize,
    pub height: usize,
    pub num_agents: usize,

    /// Share of interior cells that start with debris.
    pub percentage_dirty: u32,

    /// Share of interior cells that get an obstacle, on top of the border walls.
    pub percentage_obstacles: u32,

    pub max_ticks: u32,
    pub seed: u64,
    pub torus: bool,
    pub border_walls: bool,
}

impl SimulationConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: usize,
        height: usize,
        num_agents: usize,
        percentage_dirty: u32,
        percentage_obstacles: u32,
        max_ticks: u32,
        seed: u64,
    ) -> Self {
        Self {
            width,
            height,
            num_agents,
            percentage_dirty,
            percentage_obstacles,
            max_ticks,
            seed,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 3 || self.height < 3 {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        let cells = self
            .width
            .checked_mul(self.height)
            .and_then(|cells| cells.checked_mul(100));
        let fits = i32::try_from(self.width).is_ok() && i32::try_from(self.height).is_ok();
        if !fits || cells.is_none() {
            return Err(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if self.num_agents == 0 {
            return Err(ConfigError::NoAgents);
        }
        for (name, value) in [
            ("percentage_dirty", self.percentage_dirty),
            ("percentage_obstacles", self.percentage_obstacles),
        ] {
            if value > 100 {
                return Err(ConfigError::PercentageOutOfRange { name, value });
            }
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::NoTicks);
        }
        Ok(())
    }

    pub fn border_cells(&self) -> usize {
        if self.border_walls {
            self.width
                .saturating_add(self.height)
                .saturating_mul(2)
                .saturating_sub(4)
                .min(self.width.saturating_mul(self.height))
        } else {
            0
        }
    }

    /// Cells that are not border walls. Obstacle and debris counts are shares of this.
    pub fn interior_cells(&self) -> usize {
        self.width.saturating_mul(self.height) - self.border_cells()
    }

    pub fn obstacle_count(&self) -> usize {
        self.interior_cells().saturating_mul(self.percentage_obstacles as usize) / 100
    }

    pub fn debris_count(&self) -> usize {
        self.interior_cells().saturating_mul(self.percentage_dirty as usize) / 100
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            num_agents: 10,
            percentage_dirty: 20,
            percentage_obstacles: 10,
            max_ticks: 500,
            seed: 42,
            torus: false,
            border_walls: true,
        }
    }
}
