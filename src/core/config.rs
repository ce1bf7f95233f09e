// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core configuration
//!
//! Describes what is plugged into the controller ports, which EEPROM board
//! layout the cartridge uses and how many Z80 T-states make up a frame.
//! Stored as TOML:
//!
//! ```toml
//! cycles_per_line = 228
//! lines_per_frame = 262
//! eeprom_type = 0
//!
//! [ports]
//! port1 = "six_button"
//! port2 = "team_player"
//! ext = "none"
//!
//! [team_player]
//! devices = ["three_button", "six_button"]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::eeprom::{Eeprom, MAPPER_DB};
use crate::core::error::{ConfigError, Result};
use crate::core::io::{DeviceKind, IoManager, Port, TEAM_PLAYER_PORTS};

/// Z80 T-states per NTSC scanline (3.58 MHz / 15.7 kHz)
pub const DEFAULT_CYCLES_PER_LINE: u32 = 228;

/// NTSC scanlines per frame
pub const DEFAULT_LINES_PER_FRAME: u32 = 262;

/// Largest frame budget accepted
///
/// Leaves room below `i32::MAX` for the instruction that overruns the
/// budget.
const MAX_FRAME_CYCLES: u64 = i32::MAX as u64 - 64;

/// Device kind per physical port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortsConfig {
    pub port1: DeviceKind,
    pub port2: DeviceKind,
    pub ext: DeviceKind,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            port1: DeviceKind::ThreeButton,
            port2: DeviceKind::ThreeButton,
            ext: DeviceKind::None,
        }
    }
}

impl PortsConfig {
    pub fn kind(&self, port: Port) -> DeviceKind {
        match port {
            Port::Port1 => self.port1,
            Port::Port2 => self.port2,
            Port::Ext => self.ext,
        }
    }
}

/// Controllers chained behind a Team Player, virtual ports A-D in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeamPlayerConfig {
    pub devices: Vec<DeviceKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub cycles_per_line: u32,
    pub lines_per_frame: u32,
    /// Index into the EEPROM board database; absent for no EEPROM
    pub eeprom_type: Option<usize>,
    pub ports: PortsConfig,
    pub team_player: TeamPlayerConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cycles_per_line: DEFAULT_CYCLES_PER_LINE,
            lines_per_frame: DEFAULT_LINES_PER_FRAME,
            eeprom_type: None,
            ports: PortsConfig::default(),
            team_player: TeamPlayerConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Load and validate a TOML configuration file
    ///
    /// # Errors
    ///
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` for malformed TOML or unknown keys
    /// - `ConfigError::InvalidValue` if validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Config: loaded {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CoreConfig = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self).map_err(ConfigError::Serialize)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.to_toml_string()?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.cycles_per_line == 0 {
            return Err(invalid("cycles_per_line", "must be non-zero"));
        }
        if self.lines_per_frame == 0 {
            return Err(invalid("lines_per_frame", "must be non-zero"));
        }
        let frame = self.cycles_per_line as u64 * self.lines_per_frame as u64;
        if frame > MAX_FRAME_CYCLES {
            return Err(invalid(
                "lines_per_frame",
                format!("frame of {frame} T-states does not fit a cycle budget"),
            ));
        }

        if let Some(index) = self.eeprom_type {
            if index >= MAPPER_DB.len() {
                return Err(invalid(
                    "eeprom_type",
                    format!("{index} out of range 0-{}", MAPPER_DB.len() - 1),
                ));
            }
        }

        let chained = &self.team_player.devices;
        if chained.len() > TEAM_PLAYER_PORTS {
            return Err(invalid(
                "team_player.devices",
                format!("{} devices for {TEAM_PLAYER_PORTS} ports", chained.len()),
            ));
        }
        if chained.contains(&DeviceKind::TeamPlayer) {
            return Err(invalid("team_player.devices", "multitaps cannot be chained"));
        }
        Ok(())
    }

    /// T-states in one frame
    pub fn cycles_per_frame(&self) -> i32 {
        let frame = self.cycles_per_line as u64 * self.lines_per_frame as u64;
        frame.min(i32::MAX as u64) as i32
    }

    /// Build a controller bus with the configured devices connected
    ///
    /// Every Team Player port gets its own set of chained controllers.
    pub fn build_io(&self) -> Result<IoManager> {
        self.validate()?;

        let mut io = IoManager::new();
        for port in Port::ALL {
            let kind = self.ports.kind(port);
            let id = io.connect_new(port, kind);
            if kind != DeviceKind::TeamPlayer {
                continue;
            }
            for (virtual_port, &sub_kind) in self.team_player.devices.iter().enumerate() {
                let sub = io.add_device(sub_kind.create());
                io.attach_sub_device(id, virtual_port, Some(sub))?;
            }
        }
        log::info!(
            "I/O: port 1 {:?}, port 2 {:?}, EXT {:?}",
            self.ports.port1,
            self.ports.port2,
            self.ports.ext
        );
        Ok(io)
    }

    /// Build an EEPROM with the configured board layout selected
    pub fn build_eeprom(&self) -> Result<Eeprom> {
        let mut eeprom = Eeprom::new();
        eeprom.set_eeprom_type(self.eeprom_type)?;
        Ok(eeprom)
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> crate::core::error::EmulatorError {
    ConfigError::InvalidValue {
        key,
        reason: reason.into(),
    }
    .into()
}
