//! Bulk transfer engine
//!
//! Large pixel moves never go through the CPU byte by byte: a
//! [`TransferDescriptor`] describes one block move between memory and an
//! engine queue, a [`BulkTransfer`] implementation submits it, and the
//! caller polls for completion with a bounded budget.
//!
//! [`DmaChannel`] implements [`BulkTransfer`] for one RP2040 DMA channel.
//! All register offsets stay inside this module; the raw register file is
//! reached through the caller-supplied [`RegisterAccess`] trait, so the
//! driver itself needs no `unsafe`.
//!
//! ## Example
//!
//! ```
//! use ssd1963::dma::{ControlWord, DataSize, TransferDescriptor};
//!
//! // Stream 960 bytes into PIO0 TX1, paced by its transfer request line
//! let descriptor = TransferDescriptor::write(0x2000_0000, 0x5020_0014, 960, 1);
//! assert_eq!(descriptor.control.size, DataSize::Byte);
//! assert!(descriptor.control.increment_read);
//! assert_eq!(descriptor.control.encode(0), 0x0020_8013);
//! ```

use core::sync::atomic::{compiler_fence, Ordering};

use embedded_hal::delay::DelayNs;

/// Base address of the RP2040 DMA block
pub const DMA_BASE: u32 = 0x5000_0000;

/// Number of DMA channels
pub const CHANNEL_COUNT: u8 = 12;

/// Abort acknowledgement polls before giving up (10 µs each)
pub const ABORT_POLL_LIMIT: u32 = 1_000;

/// First completion poll interval in µs; grows by one per poll
pub const INITIAL_POLL_US: u32 = 5;

const ABORT_POLL_US: u32 = 10;

// Word offsets from DMA_BASE
const READ_ADDR: usize = 0;
const WRITE_ADDR: usize = 1;
const TRANS_COUNT: usize = 2;
const CTRL_TRIG: usize = 3;
const CHANNEL_STRIDE: usize = 16;
const CHAN_ABORT: usize = 0x111;

// CTRL bit positions
const EN: u32 = 1 << 0;
const HIGH_PRIORITY: u32 = 1 << 1;
const DATA_SIZE_SHIFT: u32 = 2;
const INCR_READ: u32 = 1 << 4;
const INCR_WRITE: u32 = 1 << 5;
const CHAIN_TO_SHIFT: u32 = 11;
const TREQ_SEL_SHIFT: u32 = 15;
const IRQ_QUIET: u32 = 1 << 21;

/// Size of one transfer unit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSize {
    /// 8 bits
    Byte = 0,
    /// 16 bits
    HalfWord = 1,
    /// 32 bits
    Word = 2,
}

/// Channel control: direction, unit width and pacing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlWord {
    /// Transfer request line that paces the transfer
    pub request: u8,
    /// Unit width
    pub size: DataSize,
    /// Advance the source address after each unit
    pub increment_read: bool,
    /// Advance the destination address after each unit
    pub increment_write: bool,
    /// Schedule ahead of normal priority channels
    pub high_priority: bool,
    /// Suppress the completion interrupt
    pub quiet: bool,
    /// Channel to trigger on completion, `None` for no chaining
    pub chain_to: Option<u8>,
}

impl ControlWord {
    /// Quiet, high priority, unchained control for `request` and `size`
    pub const fn new(request: u8, size: DataSize) -> Self {
        Self {
            request,
            size,
            increment_read: false,
            increment_write: false,
            high_priority: true,
            quiet: true,
            chain_to: None,
        }
    }

    /// Pack into the CTRL register layout of `channel`
    ///
    /// Chaining a channel to itself disables chaining, so `None` encodes as
    /// `channel`.
    pub const fn encode(&self, channel: u8) -> u32 {
        let chain_to = match self.chain_to {
            Some(target) => target,
            None => channel,
        };
        let mut word = EN
            | ((self.size as u32) << DATA_SIZE_SHIFT)
            | (((chain_to & 0x0F) as u32) << CHAIN_TO_SHIFT)
            | (((self.request & 0x3F) as u32) << TREQ_SEL_SHIFT);
        if self.high_priority {
            word |= HIGH_PRIORITY;
        }
        if self.increment_read {
            word |= INCR_READ;
        }
        if self.increment_write {
            word |= INCR_WRITE;
        }
        if self.quiet {
            word |= IRQ_QUIET;
        }
        word
    }
}

/// One block move between memory and an engine queue
///
/// Built per bulk operation, submitted once and discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferDescriptor {
    /// Source bus address
    pub source: u32,
    /// Destination bus address
    pub destination: u32,
    /// Number of units to move
    pub unit_count: u32,
    /// Channel control
    pub control: ControlWord,
}

impl TransferDescriptor {
    /// Repeat one 32-bit word into a queue `units` times
    pub const fn fill(word_address: u32, queue: u32, units: u32, request: u8) -> Self {
        Self {
            source: word_address,
            destination: queue,
            unit_count: units,
            control: ControlWord::new(request, DataSize::Word),
        }
    }

    /// Stream `bytes` bytes from memory into a queue
    pub const fn write(buffer: u32, queue: u32, bytes: u32, request: u8) -> Self {
        let mut control = ControlWord::new(request, DataSize::Byte);
        control.increment_read = true;
        Self {
            source: buffer,
            destination: queue,
            unit_count: bytes,
            control,
        }
    }

    /// Drain `bytes` bytes from a queue into memory
    pub const fn read(queue: u32, buffer: u32, bytes: u32, request: u8) -> Self {
        let mut control = ControlWord::new(request, DataSize::Byte);
        control.increment_write = true;
        Self {
            source: queue,
            destination: buffer,
            unit_count: bytes,
            control,
        }
    }
}

/// A submitted transfer
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferHandle {
    channel: u8,
    unit_count: u32,
}

impl TransferHandle {
    /// Handle for `unit_count` units in flight on `channel`
    pub const fn new(channel: u8, unit_count: u32) -> Self {
        Self {
            channel,
            unit_count,
        }
    }

    /// Channel carrying the transfer
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Units submitted
    pub const fn unit_count(&self) -> u32 {
        self.unit_count
    }
}

/// Outcome of waiting for a transfer
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Every unit moved
    Complete,
    /// The poll budget ran out first; the transfer is still in flight
    TimedOut {
        /// Units outstanding at the last poll
        remaining: u32,
    },
}

/// Errors raised by the bulk transfer unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// The abort request was never acknowledged
    AbortTimeout {
        /// Channel that kept running
        channel: u8,
    },
    /// Channel number outside the DMA block
    InvalidChannel {
        /// The rejected channel
        channel: u8,
    },
}

impl core::fmt::Display for TransferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AbortTimeout { channel } => {
                write!(f, "DMA channel {channel} did not acknowledge abort")
            }
            Self::InvalidChannel { channel } => write!(f, "DMA channel {channel} does not exist"),
        }
    }
}

impl core::error::Error for TransferError {}

/// Word access to the DMA register block
///
/// Offsets are in 32-bit words from [`DMA_BASE`]. On target this is a pair
/// of volatile accesses; tests substitute a recording register file.
pub trait RegisterAccess {
    /// Read the register at word `offset`
    fn read(&mut self, offset: usize) -> u32;
    /// Write `value` to the register at word `offset`
    fn write(&mut self, offset: usize, value: u32);
}

/// Narrow submit/await/abort interface to a bulk transfer unit
pub trait BulkTransfer {
    /// Program and trigger a transfer; does not block
    fn submit(&mut self, descriptor: &TransferDescriptor) -> TransferHandle;

    /// Poll until the transfer finishes or `limit` polls have been spent
    ///
    /// Returns [`Completion::TimedOut`] rather than failing; whether a
    /// timeout is fatal is the caller's decision. A handle with no units
    /// completes without polling.
    fn await_completion<D: DelayNs>(
        &mut self,
        handle: &TransferHandle,
        limit: u32,
        delay: &mut D,
    ) -> Completion;

    /// Stop the transfer and wait for the unit to acknowledge
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::AbortTimeout`] if the acknowledgement never
    /// arrives.
    fn abort<D: DelayNs>(
        &mut self,
        handle: &TransferHandle,
        delay: &mut D,
    ) -> Result<(), TransferError>;

    /// Abort whatever may still be running from before
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::AbortTimeout`] if the acknowledgement never
    /// arrives.
    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), TransferError>;
}

/// One RP2040 DMA channel
pub struct DmaChannel<R> {
    registers: R,
    channel: u8,
}

impl<R: RegisterAccess> DmaChannel<R> {
    /// Drive `channel` through `registers`
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidChannel`] for channels past the block.
    pub fn new(registers: R, channel: u8) -> Result<Self, TransferError> {
        if channel >= CHANNEL_COUNT {
            return Err(TransferError::InvalidChannel { channel });
        }
        Ok(Self { registers, channel })
    }

    /// The channel number
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Release the register access
    pub fn release(self) -> R {
        self.registers
    }

    const fn offset(channel: u8, register: usize) -> usize {
        channel as usize * CHANNEL_STRIDE + register
    }
}

impl<R: RegisterAccess> BulkTransfer for DmaChannel<R> {
    fn submit(&mut self, descriptor: &TransferDescriptor) -> TransferHandle {
        let channel = self.channel;
        // Buffer writes must land before the channel reads them
        compiler_fence(Ordering::SeqCst);
        self.registers
            .write(Self::offset(channel, READ_ADDR), descriptor.source);
        self.registers
            .write(Self::offset(channel, WRITE_ADDR), descriptor.destination);
        self.registers
            .write(Self::offset(channel, TRANS_COUNT), descriptor.unit_count);
        // Writing CTRL_TRIG starts the channel
        self.registers.write(
            Self::offset(channel, CTRL_TRIG),
            descriptor.control.encode(channel),
        );
        TransferHandle::new(channel, descriptor.unit_count)
    }

    fn await_completion<D: DelayNs>(
        &mut self,
        handle: &TransferHandle,
        limit: u32,
        delay: &mut D,
    ) -> Completion {
        if handle.unit_count == 0 {
            return Completion::Complete;
        }
        let mut limit = limit;
        let mut wait_us = INITIAL_POLL_US;
        loop {
            let remaining = self
                .registers
                .read(Self::offset(handle.channel, TRANS_COUNT));
            if remaining == 0 {
                compiler_fence(Ordering::SeqCst);
                return Completion::Complete;
            }
            if limit == 0 {
                return Completion::TimedOut { remaining };
            }
            delay.delay_us(wait_us);
            limit -= 1;
            wait_us += 1;
        }
    }

    fn abort<D: DelayNs>(
        &mut self,
        handle: &TransferHandle,
        delay: &mut D,
    ) -> Result<(), TransferError> {
        let bit = 1u32 << handle.channel;
        self.registers.write(CHAN_ABORT, bit);
        for _ in 0..ABORT_POLL_LIMIT {
            if self.registers.read(CHAN_ABORT) & bit == 0 {
                return Ok(());
            }
            delay.delay_us(ABORT_POLL_US);
        }
        log::warn!("dma: channel {} ignored abort", handle.channel);
        Err(TransferError::AbortTimeout {
            channel: handle.channel,
        })
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), TransferError> {
        self.abort(&TransferHandle::new(self.channel, 0), delay)
    }
}
