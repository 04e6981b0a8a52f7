//! SSD1963 command definitions
//!
//! This module defines the command bytes used to drive the SSD1963 TFT
//! controller over its 8-bit 8080-style parallel bus. A command byte is
//! strobed with the D/C line low; its parameters follow with D/C high.
//!
//! ## Command Structure
//!
//! All commands follow the pattern:
//! 1. Put the command byte on D0..D7
//! 2. Pull D/C low (command phase) and pulse /WR low→high
//! 3. For each parameter byte: put it on D0..D7 with D/C high and pulse /WR
//!
//! Multi-byte coordinates are sent most-significant byte first.
//!
//! ## Example
//!
//! ```
//! use ssd1963::command;
//! use ssd1963::program::{command_word, data_word};
//!
//! // Set column range 0..=479 as a CommandWrite word sequence
//! let words = [
//!     command_word(command::SET_COLUMN_ADDRESS),
//!     data_word(0x00),
//!     data_word(0x00),
//!     data_word(0x01),
//!     data_word(0xDF),
//! ];
//! assert_eq!(words[0], 0x2A);
//! assert_eq!(words[4], 0x1DF);
//! ```

// System control commands

/// Software reset command (0x01)
///
/// Resets the command and parameter registers. Wait at least 5ms before
/// issuing the next command.
pub const SOFT_RESET: u8 = 0x01;

/// Enter sleep mode command (0x10)
pub const ENTER_SLEEP_MODE: u8 = 0x10;

/// Exit sleep mode command (0x11)
pub const EXIT_SLEEP_MODE: u8 = 0x11;

/// Set display off command (0x28)
///
/// Blanks the panel output without touching frame memory.
pub const SET_DISPLAY_OFF: u8 = 0x28;

/// Set display on command (0x29)
pub const SET_DISPLAY_ON: u8 = 0x29;

// Frame memory access commands

/// Set column address command (0x2A)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB]
pub const SET_COLUMN_ADDRESS: u8 = 0x2A;

/// Set page (row) address command (0x2B)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB]
pub const SET_PAGE_ADDRESS: u8 = 0x2B;

/// Write memory start command (0x2C)
///
/// Following data bytes are written into the current address window,
/// one R,G,B triple per pixel, auto-incrementing through the window.
pub const WRITE_MEMORY_START: u8 = 0x2C;

/// Read memory start command (0x2E)
///
/// Following read strobes return pixels of the current address window.
pub const READ_MEMORY_START: u8 = 0x2E;

/// Set scroll area command (0x33)
///
/// Requires 6 bytes: top fixed area, vertical scroll area, bottom fixed
/// area, each as [MSB, LSB].
pub const SET_SCROLL_AREA: u8 = 0x33;

/// Set address mode command (0x36)
///
/// Requires 1 byte. Bit 0 flips vertically, bit 1 flips horizontally.
pub const SET_ADDRESS_MODE: u8 = 0x36;

/// Set scroll start command (0x37)
///
/// Requires 2 bytes: [line_MSB, line_LSB]
pub const SET_SCROLL_START: u8 = 0x37;

// Panel and timing commands

/// Set LCD mode command (0xB0)
///
/// Requires 7 bytes: [mode, tft type, HDP_MSB, HDP_LSB, VDP_MSB, VDP_LSB, serial RGB order]
pub const SET_LCD_MODE: u8 = 0xB0;

/// Set horizontal period command (0xB4)
///
/// Requires 8 bytes: HT, HPS, HPW, LPS and LPSPP.
pub const SET_HORIZONTAL_PERIOD: u8 = 0xB4;

/// Set vertical period command (0xB6)
///
/// Requires 7 bytes: VT, VPS, VPW and FPS.
pub const SET_VERTICAL_PERIOD: u8 = 0xB6;

/// Set GPIO configuration command (0xB8)
pub const SET_GPIO_CONF: u8 = 0xB8;

/// Set GPIO value command (0xBA)
pub const SET_GPIO_VALUE: u8 = 0xBA;

/// Set PWM configuration command (0xBE)
///
/// Requires 6 bytes: [PWM frequency, duty, control, DBC manual, DBC minimum, prescaler]
pub const SET_PWM_CONF: u8 = 0xBE;

/// Set dynamic backlight configuration command (0xD0)
pub const SET_DBC_CONF: u8 = 0xD0;

// Clock commands

/// Set PLL command (0xE0)
///
/// Requires 1 byte: 0x01 = enable PLL, 0x03 = lock (use PLL as system clock)
pub const SET_PLL: u8 = 0xE0;

/// Set PLL multiplier/divider command (0xE2)
///
/// Requires 3 bytes: [M, N, validate]
pub const SET_PLL_MN: u8 = 0xE2;

/// Set pixel clock (LSHIFT) frequency command (0xE6)
///
/// Requires 3 bytes of the 20-bit LCDC_FPR value, most significant first.
pub const SET_LSHIFT_FREQ: u8 = 0xE6;

/// Set pixel data interface command (0xF0)
///
/// Requires 1 byte: 0x00 = 8-bit bus.
pub const SET_PIXEL_DATA_INTERFACE: u8 = 0xF0;

/// PLL enable parameter for [`SET_PLL`]
pub const PLL_ENABLE: u8 = 0x01;

/// PLL lock parameter for [`SET_PLL`]
pub const PLL_LOCK: u8 = 0x03;

/// 8-bit pixel interface parameter for [`SET_PIXEL_DATA_INTERFACE`]
pub const PIXEL_INTERFACE_8BIT: u8 = 0x00;
