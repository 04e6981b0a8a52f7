//! Software engine host
//!
//! [`Sequencer`] runs the [`Program`] instruction tables on plain GPIOs
//! through the [`BusPins`] trait, with strobe timing from an
//! [`embedded_hal::delay::DelayNs`]. It produces the same waveforms as the
//! PIO programs at a fraction of the speed, so it suits bring-up, MCUs
//! without a PIO block, and waveform tests.
//!
//! Each program keeps its own shift registers, loop counter and 8-word
//! input/output queues. A program runs whenever it is enabled and has work,
//! until it stalls on an empty input queue or a full output queue.
//!
//! Only the polled paths of the [`Display`](crate::display::Display) work
//! on top of a sequencer; there is no bulk transfer unit to feed it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use ssd1963::interface::EngineHost;
//! use ssd1963::program::{command_word, data_word, Line, Program};
//! use ssd1963::sequencer::{BusPins, Sequencer};
//! use ssd1963::Pins;
//! # struct Gpio;
//! # impl BusPins for Gpio {
//! #     type Error = Infallible;
//! #     fn set_data(&mut self, _: u8) -> Result<(), Infallible> { Ok(()) }
//! #     fn data(&mut self) -> Result<u8, Infallible> { Ok(0) }
//! #     fn set_data_directions(&mut self, _: u8) -> Result<(), Infallible> { Ok(()) }
//! #     fn set_line(&mut self, _: Line, _: bool) -> Result<(), Infallible> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! let mut sequencer = Sequencer::new(Gpio, MockDelay);
//! sequencer.install(Program::CommandWrite, &Pins::default(), 1_000_000)?;
//! sequencer.set_enabled(Program::CommandWrite, true)?;
//! sequencer.push(Program::CommandWrite, command_word(0x36))?;
//! sequencer.push(Program::CommandWrite, data_word(0x00))?;
//! sequencer.set_enabled(Program::CommandWrite, false)?;
//! # Ok::<(), ssd1963::sequencer::SequencerError<Infallible>>(())
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use heapless::Deque;

use crate::config::Pins;
use crate::interface::{pio0_transfer_request, EngineHost, QueueDirection};
use crate::program::{Line, Op, OutDestination, Program};

/// Depth of each program queue, matching the PIO FIFOs
pub const QUEUE_DEPTH: usize = 8;

/// GPIO access needed to bit-bang the bus
pub trait BusPins {
    /// Error type for pin operations
    type Error: Debug;

    /// Drive D0..D7
    ///
    /// # Errors
    ///
    /// Returns an error if the pins cannot be driven.
    fn set_data(&mut self, value: u8) -> Result<(), Self::Error>;

    /// Sample D0..D7
    ///
    /// # Errors
    ///
    /// Returns an error if the pins cannot be read.
    fn data(&mut self) -> Result<u8, Self::Error>;

    /// Set D0..D7 directions, one bit per pin, 1 = output
    ///
    /// # Errors
    ///
    /// Returns an error if the directions cannot be changed.
    fn set_data_directions(&mut self, outputs: u8) -> Result<(), Self::Error>;

    /// Drive a control line
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be driven.
    fn set_line(&mut self, line: Line, high: bool) -> Result<(), Self::Error>;
}

/// Errors raised by the [`Sequencer`]
#[derive(Debug, PartialEq, Eq)]
pub enum SequencerError<E> {
    /// GPIO error
    Pins(E),
    /// A program was enabled while another one owns the bus
    BusContention {
        /// Program currently enabled
        active: Program,
        /// Program that was refused
        requested: Program,
    },
    /// The program was never installed
    NotInstalled(Program),
    /// The input queue is full and the program cannot drain it
    QueueFull(Program),
    /// The output queue is empty and the program cannot fill it
    QueueEmpty(Program),
}

impl<E: Debug> core::fmt::Display for SequencerError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Pins(e) => write!(f, "Pin error: {e:?}"),
            Self::BusContention { active, requested } => {
                write!(f, "Cannot enable {requested:?} while {active:?} owns the bus")
            }
            Self::NotInstalled(p) => write!(f, "{p:?} is not installed"),
            Self::QueueFull(p) => write!(f, "{p:?} input queue is full"),
            Self::QueueEmpty(p) => write!(f, "{p:?} output queue is empty"),
        }
    }
}

impl<E: Debug> core::error::Error for SequencerError<E> {}

#[derive(Default)]
struct Engine {
    installed: bool,
    period_ns: u32,
    pc: u8,
    osr: u32,
    osr_shifted: u8,
    isr: u32,
    isr_shifted: u8,
    x: u32,
    tx: Deque<u32, QUEUE_DEPTH>,
    rx: Deque<u32, QUEUE_DEPTH>,
}

/// What a single step did
enum Step {
    Ran,
    Stalled,
}

/// Software host for the bus programs
pub struct Sequencer<P, D> {
    pins: P,
    delay: D,
    engines: [Engine; 4],
    active: Option<Program>,
    lines: [Option<bool>; 3],
}

impl<P: BusPins, D: DelayNs> Sequencer<P, D> {
    /// Create a sequencer with nothing installed
    pub fn new(pins: P, delay: D) -> Self {
        Self {
            pins,
            delay,
            engines: Default::default(),
            active: None,
            lines: [None; 3],
        }
    }

    /// The program currently owning the bus
    pub const fn active(&self) -> Option<Program> {
        self.active
    }

    /// Borrow the bus pins
    pub const fn pins(&self) -> &P {
        &self.pins
    }

    /// Mutably borrow the bus pins
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Release the pins and delay
    pub fn release(self) -> (P, D) {
        (self.pins, self.delay)
    }

    fn engine(&mut self, program: Program) -> Result<&mut Engine, SequencerError<P::Error>> {
        let engine = &mut self.engines[usize::from(program.slot())];
        if engine.installed {
            Ok(engine)
        } else {
            Err(SequencerError::NotInstalled(program))
        }
    }

    fn drive(&mut self, line: Line, high: bool) -> Result<(), SequencerError<P::Error>> {
        let index = match line {
            Line::CommandSelect => 0,
            Line::WriteStrobe => 1,
            Line::ReadStrobe => 2,
        };
        if self.lines[index] != Some(high) {
            self.pins.set_line(line, high).map_err(SequencerError::Pins)?;
            self.lines[index] = Some(high);
        }
        Ok(())
    }

    /// Run `program` until it stalls
    fn run(&mut self, program: Program) -> Result<(), SequencerError<P::Error>> {
        if self.active != Some(program) {
            return Ok(());
        }
        while let Step::Ran = self.step(program)? {}
        Ok(())
    }

    fn step(&mut self, program: Program) -> Result<Step, SequencerError<P::Error>> {
        let instructions = program.instructions();
        let engine = self.engine(program)?;
        let instruction = instructions[usize::from(engine.pc)];
        let mut next = engine.pc + 1;

        match instruction.op {
            Op::Pull => match engine.tx.pop_front() {
                Some(word) => {
                    engine.osr = word;
                    engine.osr_shifted = 0;
                }
                None => return Ok(Step::Stalled),
            },
            Op::MovXOsr => engine.x = engine.osr,
            Op::Out { destination, bits } => {
                if program.autopull() && engine.osr_shifted >= program.pull_threshold() {
                    match engine.tx.pop_front() {
                        Some(word) => {
                            engine.osr = word;
                            engine.osr_shifted = 0;
                        }
                        None => return Ok(Step::Stalled),
                    }
                }
                let value = engine.osr & ((1u32 << bits) - 1);
                engine.osr >>= bits;
                engine.osr_shifted += bits;
                match destination {
                    OutDestination::Pins => {
                        self.pins
                            .set_data(value as u8)
                            .map_err(SequencerError::Pins)?;
                        if program.out_pin_count() > 8 {
                            self.drive(Line::CommandSelect, value & 0x100 != 0)?;
                        }
                    }
                    OutDestination::PinDirs => self
                        .pins
                        .set_data_directions(value as u8)
                        .map_err(SequencerError::Pins)?,
                    OutDestination::Null => {}
                }
            }
            Op::InPins { bits } => {
                if program.autopush() && engine.rx.is_full() {
                    return Ok(Step::Stalled);
                }
                let sample = self.pins.data().map_err(SequencerError::Pins)?;
                let engine = self.engine(program)?;
                engine.isr = (engine.isr << bits) | (u32::from(sample) & ((1u32 << bits) - 1));
                engine.isr_shifted += bits;
                if program.autopush() && engine.isr_shifted >= program.push_threshold() {
                    // Checked for room above
                    let _ = engine.rx.push_back(engine.isr);
                    engine.isr = 0;
                    engine.isr_shifted = 0;
                }
            }
            Op::Nop => {}
            Op::JmpXDec { target } => {
                if engine.x != 0 {
                    next = target;
                }
                engine.x = engine.x.wrapping_sub(1);
            }
        }

        for (bit, &line) in program.side_set_lines().iter().enumerate() {
            self.drive(line, (instruction.side >> bit) & 1 != 0)?;
        }

        let engine = self.engine(program)?;
        engine.pc = if usize::from(next) >= instructions.len() { 0 } else { next };
        let cycles = 1 + u32::from(instruction.delay);
        let period = engine.period_ns;
        self.delay.delay_ns(cycles.saturating_mul(period));
        Ok(Step::Ran)
    }
}

impl<P: BusPins, D: DelayNs> EngineHost for Sequencer<P, D> {
    type Error = SequencerError<P::Error>;

    fn install(&mut self, program: Program, _pins: &Pins, clock_hz: u32) -> Result<(), Self::Error> {
        let engine = &mut self.engines[usize::from(program.slot())];
        *engine = Engine {
            installed: true,
            period_ns: (1_000_000_000 / clock_hz.max(1)).max(1),
            // Empty shift register, so the first `out` pulls
            osr_shifted: 32,
            ..Engine::default()
        };
        self.pins
            .set_data_directions(0xFF)
            .map_err(SequencerError::Pins)?;
        for line in [Line::CommandSelect, Line::WriteStrobe, Line::ReadStrobe] {
            self.drive(line, true)?;
        }
        log::debug!("sequencer: installed {program:?} at {clock_hz} Hz");
        Ok(())
    }

    fn set_enabled(&mut self, program: Program, enabled: bool) -> Result<(), Self::Error> {
        self.engine(program)?;
        if enabled {
            match self.active {
                Some(active) if active != program => {
                    return Err(SequencerError::BusContention {
                        active,
                        requested: program,
                    });
                }
                _ => self.active = Some(program),
            }
            self.run(program)
        } else {
            if self.active == Some(program) {
                self.active = None;
            }
            Ok(())
        }
    }

    fn push(&mut self, program: Program, word: u32) -> Result<(), Self::Error> {
        if self.engine(program)?.tx.is_full() {
            self.run(program)?;
        }
        self.engine(program)?
            .tx
            .push_back(word)
            .map_err(|_| SequencerError::QueueFull(program))?;
        self.run(program)
    }

    fn pull(&mut self, program: Program) -> Result<u32, Self::Error> {
        if self.engine(program)?.rx.is_empty() {
            self.run(program)?;
        }
        let word = self
            .engine(program)?
            .rx
            .pop_front()
            .ok_or(SequencerError::QueueEmpty(program))?;
        // Room in the output queue may unblock the read loop
        self.run(program)?;
        Ok(word)
    }

    fn restart(&mut self, program: Program) -> Result<(), Self::Error> {
        let engine = self.engine(program)?;
        *engine = Engine {
            installed: true,
            period_ns: engine.period_ns,
            osr_shifted: 32,
            ..Engine::default()
        };
        if self.active == Some(program) {
            self.active = None;
        }
        self.pins
            .set_data_directions(0xFF)
            .map_err(SequencerError::Pins)?;
        for line in [Line::CommandSelect, Line::WriteStrobe, Line::ReadStrobe] {
            self.drive(line, true)?;
        }
        log::debug!("sequencer: restarted {program:?}");
        Ok(())
    }

    fn queue_address(&self, _program: Program, _direction: QueueDirection) -> u32 {
        0
    }

    fn transfer_request(&self, program: Program, direction: QueueDirection) -> u8 {
        pio0_transfer_request(program, direction)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::program::{command_word, data_word, read_command_word, read_count_word, RESTORE_OUTPUT_WORD};
    use alloc::vec::Vec;
    use core::convert::Infallible;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Wire {
        Data(u8),
        Dirs(u8),
        Line(Line, bool),
    }

    /// Recording pins; `data()` answers from `incoming`
    #[derive(Default)]
    pub struct MockPins {
        pub log: Vec<Wire>,
        pub incoming: Vec<u8>,
        command_select: bool,
        pub latched: Vec<(bool, u8)>,
        last_data: u8,
    }

    impl MockPins {
        /// Last data lane direction mask written
        pub fn directions(&self) -> Option<u8> {
            self.log.iter().rev().find_map(|wire| match *wire {
                Wire::Dirs(outputs) => Some(outputs),
                _ => None,
            })
        }
    }

    impl BusPins for MockPins {
        type Error = Infallible;

        fn set_data(&mut self, value: u8) -> Result<(), Infallible> {
            self.last_data = value;
            self.log.push(Wire::Data(value));
            Ok(())
        }

        fn data(&mut self) -> Result<u8, Infallible> {
            if self.incoming.is_empty() {
                Ok(0)
            } else {
                Ok(self.incoming.remove(0))
            }
        }

        fn set_data_directions(&mut self, outputs: u8) -> Result<(), Infallible> {
            self.log.push(Wire::Dirs(outputs));
            Ok(())
        }

        fn set_line(&mut self, line: Line, high: bool) -> Result<(), Infallible> {
            if line == Line::CommandSelect {
                self.command_select = high;
            }
            // The controller latches on the rising edge of /WR
            if line == Line::WriteStrobe && high {
                self.latched.push((self.command_select, self.last_data));
            }
            self.log.push(Wire::Line(line, high));
            Ok(())
        }
    }

    struct MockDelay;

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn sequencer() -> Sequencer<MockPins, MockDelay> {
        let mut sequencer = Sequencer::new(MockPins::default(), MockDelay);
        for program in Program::ALL {
            sequencer
                .install(program, &Pins::default(), 25_000_000)
                .unwrap();
        }
        sequencer.pins.latched.clear();
        sequencer
    }

    #[test]
    fn test_command_then_two_data_bytes() {
        let mut seq = sequencer();
        seq.set_enabled(Program::CommandWrite, true).unwrap();
        seq.push_words(
            Program::CommandWrite,
            &[command_word(0x37), data_word(0x01), data_word(0x10)],
        )
        .unwrap();
        seq.set_enabled(Program::CommandWrite, false).unwrap();

        // One strobe with D/C low, then exactly two with D/C high
        assert_eq!(
            seq.pins().latched,
            [(false, 0x37), (true, 0x01), (true, 0x10)]
        );
    }

    #[test]
    fn test_data_byte_holds_select_high() {
        let mut seq = sequencer();
        seq.set_enabled(Program::DataWriteByte, true).unwrap();
        seq.push_words(Program::DataWriteByte, &[0xAA, 0x55]).unwrap();
        assert_eq!(seq.pins().latched, [(true, 0xAA), (true, 0x55)]);
    }

    #[test]
    fn test_triple_sends_three_bytes_per_word() {
        let mut seq = sequencer();
        seq.set_enabled(Program::DataWriteTriple, true).unwrap();
        seq.push(Program::DataWriteTriple, 0x0033_2211).unwrap();
        assert_eq!(
            seq.pins().latched,
            [(true, 0x11), (true, 0x22), (true, 0x33)]
        );
    }

    #[test]
    fn test_second_engine_is_contention() {
        let mut seq = sequencer();
        seq.set_enabled(Program::CommandWrite, true).unwrap();
        let err = seq.set_enabled(Program::DataWriteByte, true).unwrap_err();
        assert_eq!(
            err,
            SequencerError::BusContention {
                active: Program::CommandWrite,
                requested: Program::DataWriteByte,
            }
        );
        assert_eq!(seq.active(), Some(Program::CommandWrite));
    }

    #[test]
    fn test_not_installed() {
        let mut seq = Sequencer::new(MockPins::default(), MockDelay);
        assert_eq!(
            seq.set_enabled(Program::CommandWrite, true),
            Err(SequencerError::NotInstalled(Program::CommandWrite))
        );
    }

    #[test]
    fn test_disabled_engine_queues_without_running() {
        let mut seq = sequencer();
        seq.push(Program::DataWriteByte, 0x42).unwrap();
        assert!(seq.pins().latched.is_empty());
        seq.set_enabled(Program::DataWriteByte, true).unwrap();
        assert_eq!(seq.pins().latched, [(true, 0x42)]);
    }

    #[test]
    fn test_read_captures_count_bytes() {
        let mut seq = sequencer();
        seq.pins.incoming = Vec::from([0xDE, 0xAD, 0xBE]);
        seq.set_enabled(Program::CommandDataRead, true).unwrap();
        seq.push(Program::CommandDataRead, read_count_word(3)).unwrap();
        seq.push(Program::CommandDataRead, read_command_word(0x2E))
            .unwrap();

        let bytes: Vec<u32> = (0..3)
            .map(|_| seq.pull(Program::CommandDataRead).unwrap())
            .collect();
        assert_eq!(bytes, [0xDE, 0xAD, 0xBE]);
        assert_eq!(
            seq.pull(Program::CommandDataRead),
            Err(SequencerError::QueueEmpty(Program::CommandDataRead))
        );

        seq.push(Program::CommandDataRead, RESTORE_OUTPUT_WORD)
            .unwrap();
        seq.set_enabled(Program::CommandDataRead, false).unwrap();

        let log = &seq.pins().log;
        // Command strobed with D/C low, lane flipped to input, then back
        assert_eq!(seq.pins().latched, [(false, 0x2E)]);
        let dirs: Vec<&Wire> = log.iter().filter(|w| matches!(w, Wire::Dirs(_))).collect();
        assert_eq!(dirs[dirs.len() - 2..], [&Wire::Dirs(0x00), &Wire::Dirs(0xFF)]);
    }

    #[test]
    fn test_restart_abandons_stalled_read() {
        let mut seq = sequencer();
        seq.pins.incoming = Vec::from([0x11; 16]);
        seq.set_enabled(Program::CommandDataRead, true).unwrap();
        seq.push(Program::CommandDataRead, read_count_word(12)).unwrap();
        seq.push(Program::CommandDataRead, read_command_word(0x2E))
            .unwrap();
        // Stalled inside the capture loop with the lane as inputs
        assert_eq!(seq.pins().directions(), Some(0x00));

        seq.set_enabled(Program::CommandDataRead, false).unwrap();
        seq.restart(Program::CommandDataRead).unwrap();
        assert_eq!(seq.pins().directions(), Some(0xFF));
        assert_eq!(seq.active(), None);

        // The next read starts from its count word
        seq.pins.incoming = Vec::from([0x01, 0x02]);
        seq.pins.latched.clear();
        seq.set_enabled(Program::CommandDataRead, true).unwrap();
        seq.push(Program::CommandDataRead, read_count_word(2)).unwrap();
        seq.push(Program::CommandDataRead, read_command_word(0x0A))
            .unwrap();
        assert_eq!(seq.pull(Program::CommandDataRead).unwrap(), 0x01);
        assert_eq!(seq.pull(Program::CommandDataRead).unwrap(), 0x02);
        assert_eq!(seq.pins().latched, [(false, 0x0A)]);
    }

    #[test]
    fn test_restart_requires_install() {
        let mut seq = Sequencer::new(MockPins::default(), MockDelay);
        assert_eq!(
            seq.restart(Program::CommandDataRead),
            Err(SequencerError::NotInstalled(Program::CommandDataRead))
        );
    }

    #[test]
    fn test_read_longer_than_queue() {
        let mut seq = sequencer();
        seq.pins.incoming = (0..20).collect();
        seq.set_enabled(Program::CommandDataRead, true).unwrap();
        seq.push(Program::CommandDataRead, read_count_word(20)).unwrap();
        seq.push(Program::CommandDataRead, read_command_word(0x2E))
            .unwrap();
        for expected in 0..20 {
            assert_eq!(seq.pull(Program::CommandDataRead).unwrap(), expected);
        }
    }
}
