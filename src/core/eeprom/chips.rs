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

//! Chip geometries and board wirings
//!
//! A cartridge is described by the chip it carries plus the way the board
//! routes SCL/SDA to the 68000 address space. Only the wiring decides which
//! addresses belong to the EEPROM; the protocol engine never hardcodes one.

/// How the word address reaches the chip after START
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// X24C01: 7-bit word address and R/W bit in a single byte
    Single,
    /// 24C01-24C16: device address byte, then one word address byte
    Device,
    /// 24C32 and up: device address byte, then two word address bytes
    TwoByte,
}

/// Geometry of an EEPROM part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSpec {
    pub name: &'static str,
    /// Highest valid byte address (size - 1)
    pub size_mask: u16,
    /// Low address bits that wrap during page writes
    pub page_mask: u16,
    pub mode: AddressingMode,
}

impl ChipSpec {
    /// Storage size in bytes
    pub const fn size(&self) -> usize {
        self.size_mask as usize + 1
    }
}

pub const X24C01: ChipSpec = ChipSpec {
    name: "X24C01",
    size_mask: 0x007F,
    page_mask: 0x03,
    mode: AddressingMode::Single,
};

pub const C24C01: ChipSpec = ChipSpec {
    name: "24C01",
    size_mask: 0x007F,
    page_mask: 0x07,
    mode: AddressingMode::Device,
};

pub const C24C02: ChipSpec = ChipSpec {
    name: "24C02",
    size_mask: 0x00FF,
    page_mask: 0x07,
    mode: AddressingMode::Device,
};

pub const C24C04: ChipSpec = ChipSpec {
    name: "24C04",
    size_mask: 0x01FF,
    page_mask: 0x0F,
    mode: AddressingMode::Device,
};

pub const C24C08: ChipSpec = ChipSpec {
    name: "24C08",
    size_mask: 0x03FF,
    page_mask: 0x0F,
    mode: AddressingMode::Device,
};

pub const C24C16: ChipSpec = ChipSpec {
    name: "24C16",
    size_mask: 0x07FF,
    page_mask: 0x0F,
    mode: AddressingMode::Device,
};

pub const C24C32: ChipSpec = ChipSpec {
    name: "24C32",
    size_mask: 0x0FFF,
    page_mask: 0x1F,
    mode: AddressingMode::TwoByte,
};

pub const C24C64: ChipSpec = ChipSpec {
    name: "24C64",
    size_mask: 0x1FFF,
    page_mask: 0x1F,
    mode: AddressingMode::TwoByte,
};

/// Largest supported part, in bytes
pub const MAX_EEPROM_SIZE: usize = 0x4000;

/// One line of the bus: byte address and bit within that byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWiring {
    pub address: u32,
    pub bit: u8,
}

impl LineWiring {
    pub const fn new(address: u32, bit: u8) -> Self {
        Self { address, bit }
    }
}

/// Chip plus board wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromMapper {
    pub chip: ChipSpec,
    /// Clock, driven by the CPU
    pub scl: LineWiring,
    /// Data written by the CPU
    pub sda_in: LineWiring,
    /// Data driven by the chip
    pub sda_out: LineWiring,
}

/// Known board layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperEntry {
    pub name: &'static str,
    pub mapper: EepromMapper,
}

/// Built-in board layouts, selected by index
pub const MAPPER_DB: &[MapperEntry] = &[
    // Sega: both lines on the odd byte at 0x200001
    MapperEntry {
        name: "Sega X24C01",
        mapper: EepromMapper {
            chip: X24C01,
            scl: LineWiring::new(0x200001, 1),
            sda_in: LineWiring::new(0x200001, 0),
            sda_out: LineWiring::new(0x200001, 0),
        },
    },
    MapperEntry {
        name: "Sega 24C02",
        mapper: EepromMapper {
            chip: C24C02,
            scl: LineWiring::new(0x200001, 1),
            sda_in: LineWiring::new(0x200001, 0),
            sda_out: LineWiring::new(0x200001, 0),
        },
    },
    // Electronic Arts: even byte, SDA shared on bit 7
    MapperEntry {
        name: "EA X24C01",
        mapper: EepromMapper {
            chip: X24C01,
            scl: LineWiring::new(0x200000, 6),
            sda_in: LineWiring::new(0x200000, 7),
            sda_out: LineWiring::new(0x200000, 7),
        },
    },
    // Acclaim: SDA out shares bit 1 with SCL
    MapperEntry {
        name: "Acclaim 24C02",
        mapper: EepromMapper {
            chip: C24C02,
            scl: LineWiring::new(0x200000, 1),
            sda_in: LineWiring::new(0x200000, 0),
            sda_out: LineWiring::new(0x200000, 1),
        },
    },
    MapperEntry {
        name: "Acclaim 24C16",
        mapper: EepromMapper {
            chip: C24C16,
            scl: LineWiring::new(0x200000, 1),
            sda_in: LineWiring::new(0x200000, 0),
            sda_out: LineWiring::new(0x200000, 1),
        },
    },
    // Codemasters: SDA out on a separate address
    MapperEntry {
        name: "Codemasters 24C08",
        mapper: EepromMapper {
            chip: C24C08,
            scl: LineWiring::new(0x300000, 1),
            sda_in: LineWiring::new(0x300000, 0),
            sda_out: LineWiring::new(0x380001, 7),
        },
    },
    MapperEntry {
        name: "Codemasters 24C16",
        mapper: EepromMapper {
            chip: C24C16,
            scl: LineWiring::new(0x300000, 1),
            sda_in: LineWiring::new(0x300000, 0),
            sda_out: LineWiring::new(0x380001, 7),
        },
    },
    MapperEntry {
        name: "Codemasters 24C64",
        mapper: EepromMapper {
            chip: C24C64,
            scl: LineWiring::new(0x300000, 1),
            sda_in: LineWiring::new(0x300000, 0),
            sda_out: LineWiring::new(0x380001, 7),
        },
    },
];

/// Look up a board layout by name (case-insensitive)
pub fn find_mapper(name: &str) -> Option<usize> {
    MAPPER_DB
        .iter()
        .position(|entry| entry.name.eq_ignore_ascii_case(name))
}
