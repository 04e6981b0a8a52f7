//! Engine host abstraction
//!
//! This module provides the [`EngineHost`] trait, the downward interface to
//! whatever runs the four bus [`Program`]s, and the [`ActiveEngine`] guard
//! that owns the bus while one of them is enabled.
//!
//! ## Hardware Requirements
//!
//! The SSD1963 8-bit parallel bus needs:
//! - 8 consecutive GPIOs for D0..D7
//! - **D/C**: command/data select (output, low = command)
//! - **/WR**: write strobe (output, active low)
//! - **/RD**: read strobe (output, active low)
//!
//! On an RP2040 the host is a PIO block with the four programs installed on
//! state machines 0..=3. The [`Sequencer`](crate::sequencer::Sequencer)
//! implements the same trait by bit-banging GPIOs.
//!
//! ## Bus ownership
//!
//! Two programs driving the same pins is bus contention. An [`ActiveEngine`]
//! mutably borrows the host, so only one can exist at a time, and it
//! disables its program when dropped, on error paths as well.
//!
//! ## Example
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use ssd1963::interface::{ActiveEngine, EngineHost, QueueDirection};
//! use ssd1963::program::{command_word, Program};
//! use ssd1963::Pins;
//! # struct MockHost;
//! # impl EngineHost for MockHost {
//! #     type Error = Infallible;
//! #     fn install(&mut self, _: Program, _: &Pins, _: u32) -> Result<(), Infallible> { Ok(()) }
//! #     fn set_enabled(&mut self, _: Program, _: bool) -> Result<(), Infallible> { Ok(()) }
//! #     fn push(&mut self, _: Program, _: u32) -> Result<(), Infallible> { Ok(()) }
//! #     fn pull(&mut self, _: Program) -> Result<u32, Infallible> { Ok(0) }
//! #     fn restart(&mut self, _: Program) -> Result<(), Infallible> { Ok(()) }
//! #     fn queue_address(&self, _: Program, _: QueueDirection) -> u32 { 0 }
//! #     fn transfer_request(&self, _: Program, _: QueueDirection) -> u8 { 0 }
//! # }
//! let mut host = MockHost;
//!
//! // Software reset through the command engine
//! let mut engine = ActiveEngine::enable(&mut host, Program::CommandWrite)?;
//! engine.push(command_word(0x01))?;
//! engine.finish()?;
//! # Ok::<(), Infallible>(())
//! ```

use core::fmt::Debug;

use crate::config::Pins;
use crate::program::{Program, RESTORE_OUTPUT_WORD};

/// PIO0 transmit queue base (TXF0); queue `n` is 4 bytes further
pub const PIO0_TXF_BASE: u32 = 0x5020_0010;

/// PIO0 receive queue base (RXF0)
pub const PIO0_RXF_BASE: u32 = 0x5020_0020;

/// Direction of an engine queue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueDirection {
    /// Words flowing into the program
    Transmit,
    /// Words captured by the program
    Receive,
}

/// Queue register address of a program's engine on PIO0
pub const fn pio0_queue_address(program: Program, direction: QueueDirection) -> u32 {
    let base = match direction {
        QueueDirection::Transmit => PIO0_TXF_BASE,
        QueueDirection::Receive => PIO0_RXF_BASE,
    };
    base + 4 * program.slot() as u32
}

/// Transfer request line of a program's engine queue on PIO0
///
/// Transmit requests are numbered 0..=3 and receive requests 4..=7.
pub const fn pio0_transfer_request(program: Program, direction: QueueDirection) -> u8 {
    match direction {
        QueueDirection::Transmit => program.slot(),
        QueueDirection::Receive => 4 + program.slot(),
    }
}

/// Trait for whatever executes the bus protocol programs
///
/// This trait abstracts over a hardware PIO block, a software
/// [`Sequencer`](crate::sequencer::Sequencer), or a test double, allowing
/// the [`Display`](crate::display::Display) to work with any of them.
///
/// ## Implementing
///
/// `push` and `pull` must block until the queue accepts or yields a word.
/// `queue_address` and `transfer_request` describe where a bulk transfer
/// must read or write to feed the program; software hosts without a bulk
/// path may return any value and never see those descriptors executed.
pub trait EngineHost {
    /// Error type for host operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Load `program`, bind it to `pins` and set its clock
    ///
    /// The program must be left disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be placed or clocked.
    fn install(&mut self, program: Program, pins: &Pins, clock_hz: u32)
    -> Result<(), Self::Error>;

    /// Enable or disable `program`
    ///
    /// # Errors
    ///
    /// Returns an error if the engine state cannot be changed.
    fn set_enabled(&mut self, program: Program, enabled: bool) -> Result<(), Self::Error>;

    /// Push one word into the program's input queue
    ///
    /// # Errors
    ///
    /// Returns an error if the word cannot be queued.
    fn push(&mut self, program: Program, word: u32) -> Result<(), Self::Error>;

    /// Pull one captured word from the program's output queue
    ///
    /// # Errors
    ///
    /// Returns an error if no word can be produced.
    fn pull(&mut self, program: Program) -> Result<u32, Self::Error>;

    /// Stop `program`, reset it to its first instruction, empty both of
    /// its queues and drive the data lane as outputs
    ///
    /// Used when a read ends before its capture loop has run out, so that
    /// no direction word can be delivered through the program itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine or the pins cannot be reset.
    fn restart(&mut self, program: Program) -> Result<(), Self::Error>;

    /// Bus address of the program's queue register
    fn queue_address(&self, program: Program, direction: QueueDirection) -> u32;

    /// Transfer request line raised when the queue is ready
    fn transfer_request(&self, program: Program, direction: QueueDirection) -> u8;

    /// Push a run of words
    ///
    /// # Errors
    ///
    /// Stops at and returns the first push error.
    fn push_words(&mut self, program: Program, words: &[u32]) -> Result<(), Self::Error> {
        for &word in words {
            self.push(program, word)?;
        }
        Ok(())
    }
}

/// Scoped ownership of the bus by one program
///
/// Created by [`ActiveEngine::enable`]. Call [`finish`](Self::finish) to
/// release the bus and observe errors; dropping the guard releases it
/// silently.
///
/// For [`Program::CommandDataRead`], `finish` pushes the word that turns the
/// data lane back into outputs, which the program only consumes once every
/// requested byte has been captured. A read guard dropped without `finish`
/// disables the program and then [restarts](EngineHost::restart) it, so an
/// early exit never leaves the lane as inputs or stale words in the queues.
pub struct ActiveEngine<'a, H: EngineHost> {
    host: &'a mut H,
    program: Program,
    active: bool,
}

impl<'a, H: EngineHost> ActiveEngine<'a, H> {
    /// Enable `program` and take the bus
    ///
    /// # Errors
    ///
    /// Returns the host error if the program cannot be enabled.
    pub fn enable(host: &'a mut H, program: Program) -> Result<Self, H::Error> {
        host.set_enabled(program, true)?;
        Ok(Self {
            host,
            program,
            active: true,
        })
    }

    /// The program owning the bus
    pub const fn program(&self) -> Program {
        self.program
    }

    /// Push one word into the program's input queue
    ///
    /// # Errors
    ///
    /// Returns the host error if the word cannot be queued.
    pub fn push(&mut self, word: u32) -> Result<(), H::Error> {
        self.host.push(self.program, word)
    }

    /// Push a run of words
    ///
    /// # Errors
    ///
    /// Returns the first host error.
    pub fn push_words(&mut self, words: &[u32]) -> Result<(), H::Error> {
        self.host.push_words(self.program, words)
    }

    /// Pull one captured word
    ///
    /// # Errors
    ///
    /// Returns the host error if no word can be produced.
    pub fn pull(&mut self) -> Result<u32, H::Error> {
        self.host.pull(self.program)
    }

    /// Bus address of this program's queue
    pub fn queue_address(&self, direction: QueueDirection) -> u32 {
        self.host.queue_address(self.program, direction)
    }

    /// Transfer request line of this program's queue
    pub fn transfer_request(&self, direction: QueueDirection) -> u8 {
        self.host.transfer_request(self.program, direction)
    }

    /// Release the bus, reporting any host error
    ///
    /// For a read, call this only after every requested byte has been
    /// pulled; otherwise drop the guard.
    ///
    /// # Errors
    ///
    /// Returns the first host error. The program is disabled even when the
    /// data lane restore fails.
    pub fn finish(mut self) -> Result<(), H::Error> {
        self.active = false;
        let restored = self.restore();
        let disabled = self.host.set_enabled(self.program, false);
        restored.and(disabled)
    }

    fn restore(&mut self) -> Result<(), H::Error> {
        if self.program.is_bidirectional() {
            self.host.push(self.program, RESTORE_OUTPUT_WORD)?;
        }
        Ok(())
    }
}

impl<H: EngineHost> Drop for ActiveEngine<'_, H> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.host.set_enabled(self.program, false);
            if self.program.is_bidirectional() {
                let _ = self.host.restart(self.program);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::convert::Infallible;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Event {
        Install(Program, u32),
        Enable(Program),
        Disable(Program),
        Push(Program, u32),
        Restart(Program),
    }

    /// Recording engine host
    ///
    /// Flags contention if a program is enabled while another is active.
    /// `pull` answers from `rx`, front first.
    #[derive(Default)]
    pub struct MockHost {
        pub events: Vec<Event>,
        pub active: Option<Program>,
        pub contention: bool,
        pub rx: Vec<u32>,
    }

    impl MockHost {
        pub fn pushed(&self, program: Program) -> Vec<u32> {
            self.events
                .iter()
                .filter_map(|event| match *event {
                    Event::Push(p, word) if p == program => Some(word),
                    _ => None,
                })
                .collect()
        }
    }

    impl EngineHost for MockHost {
        type Error = Infallible;

        fn install(&mut self, program: Program, _pins: &Pins, clock_hz: u32) -> Result<(), Infallible> {
            self.events.push(Event::Install(program, clock_hz));
            Ok(())
        }

        fn set_enabled(&mut self, program: Program, enabled: bool) -> Result<(), Infallible> {
            if enabled {
                if self.active.is_some() {
                    self.contention = true;
                }
                self.active = Some(program);
                self.events.push(Event::Enable(program));
            } else {
                if self.active == Some(program) {
                    self.active = None;
                }
                self.events.push(Event::Disable(program));
            }
            Ok(())
        }

        fn push(&mut self, program: Program, word: u32) -> Result<(), Infallible> {
            self.events.push(Event::Push(program, word));
            Ok(())
        }

        fn pull(&mut self, _program: Program) -> Result<u32, Infallible> {
            if self.rx.is_empty() {
                Ok(0)
            } else {
                Ok(self.rx.remove(0))
            }
        }

        fn restart(&mut self, program: Program) -> Result<(), Infallible> {
            self.rx.clear();
            self.events.push(Event::Restart(program));
            Ok(())
        }

        fn queue_address(&self, program: Program, direction: QueueDirection) -> u32 {
            pio0_queue_address(program, direction)
        }

        fn transfer_request(&self, program: Program, direction: QueueDirection) -> u8 {
            pio0_transfer_request(program, direction)
        }
    }

    #[test]
    fn test_guard_disables_on_drop() {
        let mut host = MockHost::default();
        {
            let mut engine = ActiveEngine::enable(&mut host, Program::DataWriteByte).unwrap();
            engine.push(0xAB).unwrap();
        }
        assert_eq!(
            host.events,
            [
                Event::Enable(Program::DataWriteByte),
                Event::Push(Program::DataWriteByte, 0xAB),
                Event::Disable(Program::DataWriteByte),
            ]
        );
        assert_eq!(host.active, None);
    }

    #[test]
    fn test_read_guard_restores_outputs_on_early_exit() {
        fn bail(host: &mut MockHost) -> Result<(), ()> {
            let _engine = ActiveEngine::enable(host, Program::CommandDataRead).map_err(|_| ())?;
            Err(())
        }
        let mut host = MockHost::default();
        assert!(bail(&mut host).is_err());
        assert_eq!(
            host.events[1..],
            [
                Event::Disable(Program::CommandDataRead),
                Event::Restart(Program::CommandDataRead),
            ]
        );
        assert!(host.pushed(Program::CommandDataRead).is_empty());
    }

    #[test]
    fn test_finished_read_pushes_restore_word() {
        let mut host = MockHost::default();
        let mut engine = ActiveEngine::enable(&mut host, Program::CommandDataRead).unwrap();
        engine.push(0).unwrap();
        engine.finish().unwrap();
        assert_eq!(
            host.events[1..],
            [
                Event::Push(Program::CommandDataRead, 0),
                Event::Push(Program::CommandDataRead, RESTORE_OUTPUT_WORD),
                Event::Disable(Program::CommandDataRead),
            ]
        );
    }

    #[test]
    fn test_write_guard_drop_does_not_restart() {
        let mut host = MockHost::default();
        drop(ActiveEngine::enable(&mut host, Program::DataWriteTriple).unwrap());
        assert!(!host
            .events
            .iter()
            .any(|event| matches!(event, Event::Restart(_))));
    }

    #[test]
    fn test_finish_releases_once() {
        let mut host = MockHost::default();
        let engine = ActiveEngine::enable(&mut host, Program::CommandWrite).unwrap();
        engine.finish().unwrap();
        let disables = host
            .events
            .iter()
            .filter(|e| matches!(e, Event::Disable(_)))
            .count();
        assert_eq!(disables, 1);
    }

    #[test]
    fn test_sequential_guards_do_not_contend() {
        let mut host = MockHost::default();
        for program in Program::ALL {
            ActiveEngine::enable(&mut host, program).unwrap().finish().unwrap();
        }
        assert!(!host.contention);
    }

    #[test]
    fn test_pio0_queue_mapping() {
        assert_eq!(
            pio0_queue_address(Program::DataWriteTriple, QueueDirection::Transmit),
            0x5020_0010
        );
        assert_eq!(
            pio0_queue_address(Program::DataWriteByte, QueueDirection::Transmit),
            0x5020_0014
        );
        assert_eq!(
            pio0_queue_address(Program::CommandDataRead, QueueDirection::Receive),
            0x5020_002C
        );
        assert_eq!(
            pio0_transfer_request(Program::CommandDataRead, QueueDirection::Receive),
            7
        );
        assert_eq!(
            pio0_transfer_request(Program::DataWriteByte, QueueDirection::Transmit),
            1
        );
    }
}
