//! Bus protocol programs
//!
//! The SSD1963 bus is driven by four fixed micro-sequences, each owning the
//! data lane and the control lines while it is enabled. A program is a short
//! table of [`Instruction`]s: every instruction performs one queue/shift
//! operation and drives the side-set control lines, optionally followed by
//! idle delay cycles.
//!
//! ## Programs
//!
//! | Program | Unit | Side-set lines | Use |
//! |---------|------|----------------|-----|
//! | [`Program::CommandWrite`] | 9 bits (D/C in bit 8) | /WR, /RD | commands and short parameter runs |
//! | [`Program::DataWriteByte`] | 8 bits | D/C, /WR, /RD | byte payloads, bulk pixel writes |
//! | [`Program::DataWriteTriple`] | 24 bits | D/C, /WR, /RD | bulk fills, one RGB triple per word |
//! | [`Program::CommandDataRead`] | count, command, bytes | D/C, /WR, /RD | memory and register reads |
//!
//! The tables are written for an RP2040-style PIO block; [`Program::assemble`]
//! produces the opcodes a HAL loads into instruction memory. The
//! [`Sequencer`](crate::sequencer::Sequencer) interprets the same tables in
//! software.
//!
//! ## Example
//!
//! ```
//! use ssd1963::program::{command_word, data_word, Program};
//!
//! // Column range 0..=479: one command word, four parameter words
//! let words = [
//!     command_word(0x2A),
//!     data_word(0x00),
//!     data_word(0x00),
//!     data_word(0x01),
//!     data_word(0xDF),
//! ];
//! assert_eq!(words[1] & 0x100, 0x100);
//!
//! let opcodes: Vec<u16> = Program::CommandWrite.assemble(0).collect();
//! assert_eq!(opcodes, [0x7009, 0x7867]);
//! ```

/// Bit of a CommandWrite word that drives the D/C line
pub const DATA_SELECT_BIT: u32 = 1 << 8;

/// Word pushed after a read to turn the data lane back into outputs
pub const RESTORE_OUTPUT_WORD: u32 = 0xFF;

/// Word for a command byte on the CommandWrite engine (D/C low)
pub const fn command_word(cmd: u8) -> u32 {
    cmd as u32
}

/// Word for a parameter or data byte on the CommandWrite engine (D/C high)
pub const fn data_word(byte: u8) -> u32 {
    byte as u32 | DATA_SELECT_BIT
}

/// Count word for CommandDataRead: the loop runs one more time than `x`
pub const fn read_count_word(bytes: u32) -> u32 {
    bytes.saturating_sub(1)
}

/// Command word for CommandDataRead
///
/// The zero upper byte is shifted into the data lane directions after the
/// command strobe, switching the lane to input.
pub const fn read_command_word(cmd: u8) -> u32 {
    cmd as u32
}

/// A bus control line driven by side-set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    /// Command/data select (low = command)
    CommandSelect,
    /// Write strobe, active low, latched on the rising edge
    WriteStrobe,
    /// Read strobe, active low
    ReadStrobe,
}

/// Target of an `out` instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutDestination {
    /// Drive the output pins
    Pins,
    /// Discard the bits
    Null,
    /// Set the data lane directions (1 = output)
    PinDirs,
}

impl OutDestination {
    const fn code(self) -> u16 {
        match self {
            Self::Pins => 0b000,
            Self::Null => 0b011,
            Self::PinDirs => 0b100,
        }
    }
}

/// Operation of one instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Blocking pull from the input queue into the shift register
    Pull,
    /// Copy the shift register into the loop counter
    MovXOsr,
    /// Shift `bits` out of the shift register
    Out {
        /// Where the bits go
        destination: OutDestination,
        /// Number of bits
        bits: u8,
    },
    /// Shift `bits` from the data lane into the input shift register
    InPins {
        /// Number of bits
        bits: u8,
    },
    /// Drive side-set only
    Nop,
    /// Jump to `target` while the counter is non-zero, post-decrementing it
    JmpXDec {
        /// Instruction index inside the program
        target: u8,
    },
}

/// One program step: operation, side-set value and delay cycles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Operation
    pub op: Op,
    /// Side-set value, bit 0 on the first side-set line
    pub side: u8,
    /// Extra idle cycles after the operation
    pub delay: u8,
}

impl Instruction {
    const fn new(op: Op, side: u8) -> Self {
        Self { op, side, delay: 0 }
    }

    const fn delayed(op: Op, side: u8, delay: u8) -> Self {
        Self { op, side, delay }
    }

    /// Encode as a PIO opcode for a program loaded at `origin`
    ///
    /// `side_bits` is the number of side-set bits of the owning program.
    pub const fn encode(self, side_bits: u8, origin: u8) -> u16 {
        let delay_side = ((self.side as u16) << (5 - side_bits)) | self.delay as u16;
        let body = match self.op {
            Op::JmpXDec { target } => 0x0040 | ((origin + target) as u16 & 0x1F),
            Op::InPins { bits } => 0x4000 | (bits as u16 & 0x1F),
            Op::Out { destination, bits } => {
                0x6000 | (destination.code() << 5) | (bits as u16 & 0x1F)
            }
            Op::Pull => 0x80A0,
            // mov x, osr
            Op::MovXOsr => 0xA027,
            // mov y, y
            Op::Nop => 0xA042,
        };
        body | (delay_side << 8)
    }
}

const COMMAND_WRITE: [Instruction; 2] = [
    Instruction::new(
        Op::Out {
            destination: OutDestination::Pins,
            bits: 9,
        },
        0b10,
    ),
    Instruction::new(
        Op::Out {
            destination: OutDestination::Null,
            bits: 7,
        },
        0b11,
    ),
];

const DATA_WRITE: [Instruction; 2] = [
    Instruction::new(
        Op::Out {
            destination: OutDestination::Pins,
            bits: 8,
        },
        0b101,
    ),
    Instruction::new(Op::Nop, 0b111),
];

const READ_LOOP: u8 = 7;

const COMMAND_DATA_READ: [Instruction; 12] = [
    Instruction::new(Op::Pull, 0b111),
    Instruction::new(Op::MovXOsr, 0b111),
    Instruction::new(Op::Pull, 0b100),
    Instruction::new(
        Op::Out {
            destination: OutDestination::Pins,
            bits: 8,
        },
        0b100,
    ),
    Instruction::new(Op::Nop, 0b110),
    Instruction::delayed(
        Op::Out {
            destination: OutDestination::PinDirs,
            bits: 8,
        },
        0b011,
        3,
    ),
    // First read after the direction change needs extra settling
    Instruction::delayed(Op::Nop, 0b011, 3),
    Instruction::new(Op::Nop, 0b111),
    Instruction::new(Op::InPins { bits: 8 }, 0b111),
    Instruction::new(Op::JmpXDec { target: READ_LOOP }, 0b011),
    Instruction::new(Op::Pull, 0b111),
    Instruction::new(
        Op::Out {
            destination: OutDestination::PinDirs,
            bits: 8,
        },
        0b111,
    ),
];

/// One of the four bus protocol programs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Program {
    /// 9-bit words: data byte plus D/C in bit 8, strobing /WR
    CommandWrite,
    /// Data bytes with D/C high, one byte per queue word
    DataWriteByte,
    /// Data bytes with D/C high, three bytes per queue word
    DataWriteTriple,
    /// Count and command in, `count` bytes captured out
    CommandDataRead,
}

impl Program {
    /// Every program, in engine slot order
    pub const ALL: [Self; 4] = [
        Self::DataWriteTriple,
        Self::DataWriteByte,
        Self::CommandWrite,
        Self::CommandDataRead,
    ];

    /// Engine (state machine) slot the program is installed on
    pub const fn slot(self) -> u8 {
        match self {
            Self::DataWriteTriple => 0,
            Self::DataWriteByte => 1,
            Self::CommandWrite => 2,
            Self::CommandDataRead => 3,
        }
    }

    /// Instruction table
    pub const fn instructions(self) -> &'static [Instruction] {
        match self {
            Self::CommandWrite => &COMMAND_WRITE,
            Self::DataWriteByte | Self::DataWriteTriple => &DATA_WRITE,
            Self::CommandDataRead => &COMMAND_DATA_READ,
        }
    }

    /// Control lines driven by side-set, in bit order
    pub const fn side_set_lines(self) -> &'static [Line] {
        match self {
            Self::CommandWrite => &[Line::WriteStrobe, Line::ReadStrobe],
            _ => &[Line::CommandSelect, Line::WriteStrobe, Line::ReadStrobe],
        }
    }

    /// Number of side-set bits
    pub const fn side_set_bits(self) -> u8 {
        self.side_set_lines().len() as u8
    }

    /// Offset of the first side-set pin from the data lane base
    pub const fn side_set_offset(self) -> u8 {
        match self {
            Self::CommandWrite => 9,
            _ => 8,
        }
    }

    /// Number of pins written by `out pins`
    ///
    /// CommandWrite also drives D/C as the ninth output pin.
    pub const fn out_pin_count(self) -> u8 {
        match self {
            Self::CommandWrite => 9,
            _ => 8,
        }
    }

    /// Bits consumed from the shift register before it is refilled
    pub const fn pull_threshold(self) -> u8 {
        match self {
            Self::CommandWrite | Self::CommandDataRead => 16,
            Self::DataWriteByte => 8,
            Self::DataWriteTriple => 24,
        }
    }

    /// Whether the shift register refills from the queue on its own
    pub const fn autopull(self) -> bool {
        !matches!(self, Self::CommandDataRead)
    }

    /// Bits captured before the input shift register is pushed to the queue
    pub const fn push_threshold(self) -> u8 {
        match self {
            Self::CommandDataRead => 8,
            _ => 32,
        }
    }

    /// Whether captured bits are pushed to the output queue on their own
    pub const fn autopush(self) -> bool {
        matches!(self, Self::CommandDataRead)
    }

    /// Whether the program drives the data lane as input at some point
    pub const fn is_bidirectional(self) -> bool {
        matches!(self, Self::CommandDataRead)
    }

    /// Program length in instructions
    pub const fn instruction_count(self) -> u8 {
        self.instructions().len() as u8
    }

    /// Encode the program as PIO opcodes for loading at `origin`
    ///
    /// Jump targets are relocated by `origin`; the program wraps from its
    /// last instruction back to its first.
    pub fn assemble(self, origin: u8) -> impl Iterator<Item = u16> {
        let side_bits = self.side_set_bits();
        self.instructions()
            .iter()
            .map(move |instruction| instruction.encode(side_bits, origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_command_word_keeps_select_low() {
        assert_eq!(command_word(0x2C), 0x2C);
        assert_eq!(command_word(0x2C) & DATA_SELECT_BIT, 0);
    }

    #[test]
    fn test_data_word_sets_select() {
        assert_eq!(data_word(0x01), 0x101);
        assert_eq!(data_word(0xFF), 0x1FF);
    }

    #[test]
    fn test_read_count_word() {
        assert_eq!(read_count_word(3), 2);
        assert_eq!(read_count_word(0), 0);
    }

    #[test]
    fn test_assemble_command_write() {
        let opcodes: Vec<u16> = Program::CommandWrite.assemble(0).collect();
        assert_eq!(opcodes, [0x7009, 0x7867]);
    }

    #[test]
    fn test_assemble_data_write() {
        let opcodes: Vec<u16> = Program::DataWriteByte.assemble(0).collect();
        // out pins, 8 side 0b101 ; mov y, y side 0b111
        assert_eq!(opcodes, [0x7408, 0xBC42]);
        let triple: Vec<u16> = Program::DataWriteTriple.assemble(4).collect();
        assert_eq!(triple, opcodes);
    }

    #[test]
    fn test_assemble_read_relocates_jump() {
        let at_zero: Vec<u16> = Program::CommandDataRead.assemble(0).collect();
        let at_ten: Vec<u16> = Program::CommandDataRead.assemble(10).collect();
        assert_eq!(at_zero.len(), 12);
        // jmp x--, 7 side 0b011
        assert_eq!(at_zero[9], 0x0C47);
        assert_eq!(at_ten[9], 0x0C51);
        // out pindirs, 8 side 0b011 [3]
        assert_eq!(at_zero[5], 0x6F88);
        assert_eq!(at_zero[0], 0x9CA0);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(Program::CommandWrite.pull_threshold(), 16);
        assert_eq!(Program::DataWriteByte.pull_threshold(), 8);
        assert_eq!(Program::DataWriteTriple.pull_threshold(), 24);
        assert!(!Program::CommandDataRead.autopull());
        assert!(Program::CommandDataRead.autopush());
        assert_eq!(Program::CommandDataRead.push_threshold(), 8);
    }

    #[test]
    fn test_slots_are_distinct() {
        let slots: Vec<u8> = Program::ALL.iter().map(|p| p.slot()).collect();
        assert_eq!(slots, [0, 1, 2, 3]);
    }

    #[test]
    fn test_side_set_layout() {
        assert_eq!(Program::CommandWrite.side_set_bits(), 2);
        assert_eq!(Program::CommandWrite.side_set_offset(), 9);
        assert_eq!(Program::DataWriteByte.side_set_bits(), 3);
        assert_eq!(Program::DataWriteByte.side_set_offset(), 8);
    }
}
