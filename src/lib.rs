//! SSD1963 TFT Display Driver
//!
//! A driver for the SSD1963 LCD controller on an 8-bit 8080-style parallel
//! bus, driven by PIO-style bus programs with DMA offload for bulk pixel
//! traffic.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Four bus programs: command write, byte write, triple write, read
//! - RP2040 PIO opcodes for every program, plus a software [`Sequencer`](sequencer::Sequencer)
//! - Bounded DMA completion polling with abort on timeout
//! - RGB565, indexed and 1-bit glyph pixel encoding
//! - Panel presets for 4.3" and 7" modules
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use ssd1963::dma::{DmaChannel, RegisterAccess};
//! use ssd1963::interface::{EngineHost, QueueDirection};
//! use ssd1963::program::Program;
//! use ssd1963::{Builder, Display, Orientation, Panel, Pins, Rgb};
//!
//! # struct Pio;
//! # impl EngineHost for Pio {
//! #     type Error = Infallible;
//! #     fn install(&mut self, _: Program, _: &Pins, _: u32) -> Result<(), Infallible> { Ok(()) }
//! #     fn set_enabled(&mut self, _: Program, _: bool) -> Result<(), Infallible> { Ok(()) }
//! #     fn push(&mut self, _: Program, _: u32) -> Result<(), Infallible> { Ok(()) }
//! #     fn pull(&mut self, _: Program) -> Result<u32, Infallible> { Ok(0) }
//! #     fn restart(&mut self, _: Program) -> Result<(), Infallible> { Ok(()) }
//! #     fn queue_address(&self, _: Program, _: QueueDirection) -> u32 { 0 }
//! #     fn transfer_request(&self, _: Program, _: QueueDirection) -> u8 { 0 }
//! # }
//! # struct Registers;
//! # impl RegisterAccess for Registers {
//! #     fn read(&mut self, _offset: usize) -> u32 { 0 }
//! #     fn write(&mut self, _offset: usize, _value: u32) {}
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let config = match Builder::new()
//!     .pins(Pins::contiguous(2, 14).with_backlight(15))
//!     .panel(Panel::At070tn92)
//!     .orientation(Orientation::Landscape)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let channel = match DmaChannel::new(Registers, 0) {
//!     Ok(channel) => channel,
//!     Err(_) => return,
//! };
//!
//! let mut display = match Display::new(Pio, channel, MockPin, MockPin, config, &mut delay) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//! let _ = display.init(&mut delay);
//! let _ = display.fill_rect(10, 10, 109, 59, Rgb::new(0xFF, 0, 0), &mut delay);
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// RGB colors and glyph transparency
pub mod color;
/// SSD1963 command definitions
pub mod command;
/// Bus configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Bulk transfer engine
pub mod dma;
/// Pixel encoding pipeline
pub mod encode;
/// Error types for the driver
pub mod error;
/// Packed bitmap fonts
pub mod font;
/// Engine host abstraction
pub mod interface;
/// Bus protocol programs
pub mod program;
/// Software engine host
pub mod sequencer;
/// Address window encoding
pub mod window;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use color::{Rgb, Transparency};
pub use config::{Builder, Config, Orientation, Panel, Pins};
pub use display::{Display, DisplayResult};
pub use dma::{BulkTransfer, DmaChannel, RegisterAccess};
pub use encode::{EncodeError, PixelFormat};
pub use error::{BuilderError, Error};
pub use font::PackedFont;
pub use interface::{ActiveEngine, EngineHost};
pub use program::Program;
pub use window::AddressWindow;

#[cfg(feature = "graphics")]
pub use graphics::GraphicDisplay;
