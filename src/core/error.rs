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

/// Emulator error types
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
///
/// Only configuration calls return errors. Bus traffic never fails: unmapped
/// reads return the open-bus value and desynchronised protocols fall back to
/// their idle state.
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("CPU error: {0}")]
    Cpu(#[from] CpuError),

    #[error("EEPROM error: {0}")]
    Eeprom(#[from] EepromError),

    #[error("I/O device error: {0}")]
    Io(#[from] IoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),
}

/// Z80-specific error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CpuError {
    #[error("Invalid fetch window 0x{low:04X}-0x{high:04X}: {reason}")]
    InvalidFetchWindow { low: u16, high: u16, reason: String },
}

/// Serial EEPROM error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EepromError {
    #[error("Invalid EEPROM type: {index} (valid range: 0-{max})")]
    InvalidType { index: usize, max: usize },

    #[error("Invalid EEPROM geometry for {chip}: {reason}")]
    InvalidGeometry { chip: &'static str, reason: String },
}

/// Controller bus error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IoError {
    #[error("Invalid physical port: {0}")]
    InvalidPort(usize),

    #[error("Invalid device id: {0}")]
    InvalidDevice(usize),

    #[error("Multitap port {port} out of range (device has {count} ports)")]
    MultitapPortOutOfRange { port: usize, count: usize },

    #[error("Device {0} cannot be chained to itself")]
    SelfReference(usize),
}

/// Configuration loading error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
