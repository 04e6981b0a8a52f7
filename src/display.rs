//! Core display operations
//!
//! [`Display`] owns the engine host, the bulk transfer channel and the
//! reset and backlight pins. Every primitive takes the bus through an
//! [`ActiveEngine`] guard, so at most one protocol program drives the pins
//! at a time and the bus is released on every exit path.
//!
//! Primitives that move more than a handful of bytes go through the bulk
//! transfer channel and take a `delay` for completion polling.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::color::{Rgb, Transparency};
use crate::command::{
    ENTER_SLEEP_MODE, EXIT_SLEEP_MODE, PIXEL_INTERFACE_8BIT, PLL_ENABLE, PLL_LOCK,
    READ_MEMORY_START, SET_ADDRESS_MODE, SET_DBC_CONF, SET_DISPLAY_OFF, SET_DISPLAY_ON,
    SET_GPIO_CONF, SET_GPIO_VALUE, SET_HORIZONTAL_PERIOD, SET_LCD_MODE, SET_LSHIFT_FREQ,
    SET_PIXEL_DATA_INTERFACE, SET_PLL, SET_PLL_MN, SET_PWM_CONF, SET_SCROLL_AREA,
    SET_SCROLL_START, SET_VERTICAL_PERIOD, SOFT_RESET,
};
use crate::config::Config;
use crate::dma::{BulkTransfer, Completion, TransferDescriptor};
use crate::encode::{encode, expand_glyph, EncodeError, PixelFormat, WIRE_BYTES_PER_PIXEL};
use crate::error::Error;
use crate::font::PackedFont;
use crate::interface::{ActiveEngine, EngineHost, QueueDirection};
use crate::program::{command_word, data_word, read_command_word, read_count_word, Program};
use crate::window::AddressWindow;

/// Result of a display operation
pub type DisplayResult<T, H, RST> =
    core::result::Result<T, Error<<H as EngineHost>::Error, <RST as ErrorType>::Error>>;

/// Pixels encoded per bulk write
///
/// A multiple of 8 so every chunk starts on a source byte for all
/// supported depths.
pub const CHUNK_PIXELS: usize = 128;

const CHUNK_BYTES: usize = CHUNK_PIXELS * WIRE_BYTES_PER_PIXEL;

/// PWM duty programmed by [`Display::init`]
pub const DEFAULT_PWM_DUTY: u8 = 0xF0;

/// `SET_PWM_CONF` parameters for `duty` out of 255
const fn pwm_payload(duty: u8) -> [u8; 6] {
    [0x06, duty, 0x01, 0xF0, 0x00, 0x00]
}

/// Bus address of a buffer as seen by the transfer channel
fn bus_address(bytes: &[u8]) -> u32 {
    bytes.as_ptr() as usize as u32
}

/// Core display driver for the SSD1963
///
/// For embedded-graphics support, use `GraphicDisplay` (requires the
/// `graphics` feature).
pub struct Display<H, T, RST, BL> {
    /// Protocol engines
    host: H,
    /// Bulk transfer channel
    transfer: T,
    /// Controller reset line
    reset: RST,
    /// Backlight enable line
    backlight: BL,
    /// Bus configuration
    config: Config,
}

impl<H, T, RST, BL> Display<H, T, RST, BL>
where
    H: EngineHost,
    T: BulkTransfer,
    RST: OutputPin,
    BL: OutputPin<Error = RST::Error>,
{
    /// Bring up the bus and reset the controller
    ///
    /// Installs the four protocol programs, aborts whatever the transfer
    /// channel was doing, switches the backlight off and pulses reset.
    /// No engine is active on return.
    ///
    /// # Errors
    ///
    /// Returns the first engine, transfer or pin error.
    pub fn new<D: DelayNs>(
        host: H,
        transfer: T,
        reset: RST,
        backlight: BL,
        config: Config,
        delay: &mut D,
    ) -> DisplayResult<Self, H, RST> {
        let mut display = Self {
            host,
            transfer,
            reset,
            backlight,
            config,
        };
        display.install()?;
        display.transfer.reset(delay)?;
        display.backlight.set_low().map_err(Error::Pin)?;
        display.hardware_reset(delay)?;
        Ok(display)
    }

    fn install(&mut self) -> DisplayResult<(), H, RST> {
        for program in Program::ALL {
            let clock_hz = if program.is_bidirectional() {
                self.config.read_clock_hz
            } else {
                self.config.write_clock_hz
            };
            self.host
                .install(program, &self.config.pins, clock_hz)
                .map_err(Error::Engine)?;
        }
        log::debug!(
            "Installed bus programs on GPIO {}..{}",
            self.config.pins.data_base,
            self.config.pins.read_strobe
        );
        Ok(())
    }

    /// Pulse the reset line: high 10 ms, low 20 ms, high 20 ms
    ///
    /// # Errors
    ///
    /// Returns the pin error if the reset line cannot be driven.
    pub fn hardware_reset<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<(), H, RST> {
        self.reset.set_high().map_err(Error::Pin)?;
        delay.delay_ms(10);
        self.reset.set_low().map_err(Error::Pin)?;
        delay.delay_ms(20);
        self.reset.set_high().map_err(Error::Pin)?;
        delay.delay_ms(20);
        log::debug!("Controller reset");
        Ok(())
    }

    /// Run the controller bring-up sequence
    ///
    /// Locks the PLL, programs the panel timing and the flips, switches the
    /// display on, clears the screen to black and turns the backlight on.
    ///
    /// # Errors
    ///
    /// Returns the first bus or pin error.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<(), H, RST> {
        let panel = self.config.panel;

        self.send_command(SET_PLL_MN, &[0x1D, 0x02, 0x54])?;
        self.send_command(SET_PLL, &[PLL_ENABLE])?;
        delay.delay_ms(10);
        self.send_command(SET_PLL, &[PLL_LOCK])?;
        delay.delay_ms(10);
        self.send_command(SOFT_RESET, &[])?;
        delay.delay_ms(10);

        self.send_command(SET_LSHIFT_FREQ, &panel.lshift_freq())?;
        self.send_command(SET_LCD_MODE, &panel.lcd_mode())?;
        self.send_command(SET_HORIZONTAL_PERIOD, &panel.horizontal_period())?;
        self.send_command(SET_VERTICAL_PERIOD, &panel.vertical_period())?;
        self.send_command(SET_ADDRESS_MODE, &[self.config.address_mode()])?;

        self.send_command(SET_GPIO_VALUE, &[0x0F])?;
        self.send_command(SET_GPIO_CONF, &[0x07, 0x01])?;
        self.send_command(SET_PIXEL_DATA_INTERFACE, &[PIXEL_INTERFACE_8BIT])?;
        self.display_on()?;
        self.send_command(SET_PWM_CONF, &pwm_payload(DEFAULT_PWM_DUTY))?;
        self.send_command(SET_DBC_CONF, &[0x0D])?;
        log::debug!(
            "Controller initialized for {}x{} panel",
            panel.width(),
            panel.height()
        );

        self.clear(Rgb::BLACK, delay)?;
        self.set_backlight(true)
    }

    /// Bus configuration
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Screen size as (width, height) seen through the orientation
    pub fn screen_size(&self) -> (u16, u16) {
        self.config.screen_size()
    }

    /// Push words through the command engine in one bus ownership
    fn command_words(&mut self, words: &[u32]) -> DisplayResult<(), H, RST> {
        let mut engine =
            ActiveEngine::enable(&mut self.host, Program::CommandWrite).map_err(Error::Engine)?;
        engine.push_words(words).map_err(Error::Engine)?;
        engine.finish().map_err(Error::Engine)
    }

    /// Send a command followed by its parameters
    ///
    /// The whole sequence is written by the command engine, parameters
    /// with the data select line high.
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn send_command(&mut self, command: u8, parameters: &[u8]) -> DisplayResult<(), H, RST> {
        let mut engine =
            ActiveEngine::enable(&mut self.host, Program::CommandWrite).map_err(Error::Engine)?;
        engine.push(command_word(command)).map_err(Error::Engine)?;
        for &byte in parameters {
            engine.push(data_word(byte)).map_err(Error::Engine)?;
        }
        engine.finish().map_err(Error::Engine)
    }

    /// Write data bytes one at a time through the byte engine
    ///
    /// # Errors
    ///
    /// Returns the engine error if a byte cannot be queued.
    pub fn write_data(&mut self, data: &[u8]) -> DisplayResult<(), H, RST> {
        if data.is_empty() {
            return Ok(());
        }
        let mut engine =
            ActiveEngine::enable(&mut self.host, Program::DataWriteByte).map_err(Error::Engine)?;
        for &byte in data {
            engine.push(u32::from(byte)).map_err(Error::Engine)?;
        }
        engine.finish().map_err(Error::Engine)
    }

    /// Submit one descriptor and wait for it within `limit` polls
    ///
    /// A transfer that outlives its budget is aborted before the timeout
    /// is returned.
    fn run_transfer<D: DelayNs>(
        transfer: &mut T,
        descriptor: &TransferDescriptor,
        limit: u32,
        delay: &mut D,
    ) -> DisplayResult<(), H, RST> {
        let handle = transfer.submit(descriptor);
        match transfer.await_completion(&handle, limit, delay) {
            Completion::Complete => Ok(()),
            Completion::TimedOut { remaining } => {
                log::warn!(
                    "Transfer on channel {} timed out, {} of {} units left",
                    handle.channel(),
                    remaining,
                    handle.unit_count()
                );
                transfer.abort(&handle, delay)?;
                log::warn!("Transfer on channel {} aborted", handle.channel());
                Err(Error::BusTimeout { remaining })
            }
        }
    }

    /// Window of `width` by `height` pixels at (`x`, `y`)
    ///
    /// Callers exclude empty sizes. A rectangle past `u16` coordinates
    /// reports its far corner saturated.
    fn sized_window(x: u16, y: u16, width: u16, height: u16) -> DisplayResult<AddressWindow, H, RST> {
        AddressWindow::from_size(x, y, width, height).ok_or(Error::InvalidWindow {
            x1: x,
            y1: y,
            x2: x.saturating_add(width.saturating_sub(1)),
            y2: y.saturating_add(height.saturating_sub(1)),
        })
    }

    fn open_window(&mut self, window: &AddressWindow) -> DisplayResult<(), H, RST> {
        log::trace!("Window {:?}", window.corners());
        self.command_words(&window.register_writes(self.config.orientation))
    }

    /// Set the address window and open memory writes
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] for an inverted range, before
    /// anything reaches the bus.
    pub fn set_window(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> DisplayResult<(), H, RST> {
        let window = AddressWindow::new(x1, y1, x2, y2)?;
        self.open_window(&window)
    }

    /// Write one pixel in a single command engine session
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn draw_pixel(&mut self, x: u16, y: u16, color: Rgb) -> DisplayResult<(), H, RST> {
        let words = AddressWindow::point(x, y).pixel_writes(self.config.orientation, color);
        self.command_words(&words)
    }

    /// Stream bytes to the open window through the byte engine
    fn bulk_write<D: DelayNs>(&mut self, bytes: &[u8], delay: &mut D) -> DisplayResult<(), H, RST> {
        if bytes.is_empty() {
            return Ok(());
        }
        let engine =
            ActiveEngine::enable(&mut self.host, Program::DataWriteByte).map_err(Error::Engine)?;
        let descriptor = TransferDescriptor::write(
            bus_address(bytes),
            engine.queue_address(QueueDirection::Transmit),
            bytes.len() as u32,
            engine.transfer_request(QueueDirection::Transmit),
        );
        Self::run_transfer(&mut self.transfer, &descriptor, self.config.tx_limit, delay)?;
        engine.finish().map_err(Error::Engine)
    }

    /// Encode `pixels` pixels of `source` and stream them to the open window
    ///
    /// [`PixelFormat::Rgb888`] is streamed straight from `source`. Other
    /// formats are encoded in chunks of [`CHUNK_PIXELS`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPixelFormat`] for a glyph with
    /// [`Transparency::Dim`] or [`Transparency::Keep`], which need the
    /// pixels behind them (see [`draw_glyph`](Self::draw_glyph)). Returns
    /// an encode error if `source` is short, and [`Error::BusTimeout`] if a
    /// chunk does not drain.
    pub fn write_pixels<D: DelayNs>(
        &mut self,
        source: &[u8],
        pixels: usize,
        format: &PixelFormat<'_>,
        delay: &mut D,
    ) -> DisplayResult<(), H, RST> {
        if let PixelFormat::MonoGlyph { transparency, .. } = *format {
            if transparency.needs_background() {
                return Err(Error::UnsupportedPixelFormat);
            }
        }
        let required = format.source_len(pixels);
        if source.len() < required {
            return Err(EncodeError::SourceTooShort {
                required,
                provided: source.len(),
            }
            .into());
        }

        if matches!(format, PixelFormat::Rgb888) {
            return self.bulk_write(&source[..required], delay);
        }

        let mut chunk = [0u8; CHUNK_BYTES];
        let mut start = 0;
        while start < pixels {
            let count = (pixels - start).min(CHUNK_PIXELS);
            let offset = format.source_len(start);
            let written = encode(&source[offset..required], count, format, &mut chunk)?;
            self.bulk_write(&chunk[..written], delay)?;
            start += count;
        }
        Ok(())
    }

    /// Repeat `color` for `pixels` pixels into the open window
    ///
    /// # Errors
    ///
    /// Returns [`Error::BusTimeout`] if the fill does not drain.
    pub fn fill<D: DelayNs>(
        &mut self,
        color: Rgb,
        pixels: u32,
        delay: &mut D,
    ) -> DisplayResult<(), H, RST> {
        if pixels == 0 {
            return Ok(());
        }
        let word = color.fill_word();
        let engine = ActiveEngine::enable(&mut self.host, Program::DataWriteTriple)
            .map_err(Error::Engine)?;
        let descriptor = TransferDescriptor::fill(
            core::ptr::from_ref(&word) as usize as u32,
            engine.queue_address(QueueDirection::Transmit),
            pixels,
            engine.transfer_request(QueueDirection::Transmit),
        );
        Self::run_transfer(&mut self.transfer, &descriptor, self.config.tx_limit, delay)?;
        engine.finish().map_err(Error::Engine)
    }

    /// Fill the rectangle between two inclusive corners
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] for an inverted range.
    pub fn fill_rect<D: DelayNs>(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: Rgb,
        delay: &mut D,
    ) -> DisplayResult<(), H, RST> {
        let window = AddressWindow::new(x1, y1, x2, y2)?;
        self.open_window(&window)?;
        self.fill(color, window.pixel_count(), delay)
    }

    /// Fill the whole screen with `color`
    ///
    /// # Errors
    ///
    /// Returns the first bus error.
    pub fn clear<D: DelayNs>(&mut self, color: Rgb, delay: &mut D) -> DisplayResult<(), H, RST> {
        let (width, height) = self.screen_size();
        self.fill_rect(
            0,
            0,
            width.saturating_sub(1),
            height.saturating_sub(1),
            color,
            delay,
        )
    }

    /// Send `command` and read `buffer.len()` bytes back through the
    /// transfer channel
    ///
    /// The data lane is turned back into outputs before this returns, on
    /// every path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BusTimeout`] if the read does not complete.
    pub fn read_pixels<D: DelayNs>(
        &mut self,
        command: u8,
        buffer: &mut [u8],
        delay: &mut D,
    ) -> DisplayResult<(), H, RST> {
        if buffer.is_empty() {
            return Ok(());
        }
        let count = buffer.len() as u32;
        let mut engine = ActiveEngine::enable(&mut self.host, Program::CommandDataRead)
            .map_err(Error::Engine)?;
        engine.push(read_count_word(count)).map_err(Error::Engine)?;
        engine
            .push(read_command_word(command))
            .map_err(Error::Engine)?;
        let descriptor = TransferDescriptor::read(
            engine.queue_address(QueueDirection::Receive),
            buffer.as_mut_ptr() as usize as u32,
            count,
            engine.transfer_request(QueueDirection::Receive),
        );
        Self::run_transfer(&mut self.transfer, &descriptor, self.config.rx_limit, delay)?;
        engine.finish().map_err(Error::Engine)
    }

    /// Send `command` and pull `buffer.len()` bytes back one at a time
    ///
    /// # Errors
    ///
    /// Returns the engine error if a byte cannot be pulled.
    pub fn read_pixels_polled(&mut self, command: u8, buffer: &mut [u8]) -> DisplayResult<(), H, RST> {
        if buffer.is_empty() {
            return Ok(());
        }
        let mut engine = ActiveEngine::enable(&mut self.host, Program::CommandDataRead)
            .map_err(Error::Engine)?;
        engine
            .push(read_count_word(buffer.len() as u32))
            .map_err(Error::Engine)?;
        engine
            .push(read_command_word(command))
            .map_err(Error::Engine)?;
        for byte in buffer.iter_mut() {
            *byte = engine.pull().map_err(Error::Engine)? as u8;
        }
        engine.finish().map_err(Error::Engine)
    }

    /// Read the pixels of a rectangle as wire triples
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] for an inverted range and
    /// [`Error::BufferTooSmall`] if `buffer` cannot hold the rectangle.
    pub fn read_window<D: DelayNs>(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        buffer: &mut [u8],
        delay: &mut D,
    ) -> DisplayResult<(), H, RST> {
        let window = AddressWindow::new(x1, y1, x2, y2)?;
        let required = window.pixel_count() as usize * WIRE_BYTES_PER_PIXEL;
        if buffer.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                provided: buffer.len(),
            });
        }
        self.open_window(&window)?;
        self.read_pixels(READ_MEMORY_START, &mut buffer[..required], delay)
    }

    /// Draw a 1-bit bitmap of `width` by `height` pixels
    ///
    /// Rows are padded to whole bytes, most significant bit first. With
    /// [`Transparency::Dim`] or [`Transparency::Keep`] each row segment is
    /// read back from the controller and blended before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `bitmap` is short and
    /// [`Error::InvalidWindow`] if the glyph runs past `u16` coordinates.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_glyph<D: DelayNs>(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        bitmap: &[u8],
        foreground: Rgb,
        background: Rgb,
        transparency: Transparency,
        delay: &mut D,
    ) -> DisplayResult<(), H, RST> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let row_bytes = usize::from(width).div_ceil(8);
        let required = row_bytes * usize::from(height);
        if bitmap.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                provided: bitmap.len(),
            });
        }
        let rows = bitmap[..required].chunks_exact(row_bytes);

        if !transparency.needs_background() {
            let window = Self::sized_window(x, y, width, height)?;
            let format = PixelFormat::glyph(foreground, background, transparency);
            self.open_window(&window)?;
            for row in rows {
                self.write_pixels(row, usize::from(width), &format, delay)?;
            }
            return Ok(());
        }

        let mut pixels = [0u8; CHUNK_BYTES];
        for (row_y, row) in (y..).zip(rows) {
            let mut start = 0;
            while start < usize::from(width) {
                let count = (usize::from(width) - start).min(CHUNK_PIXELS);
                let segment = Self::sized_window(x.saturating_add(start as u16), row_y, count as u16, 1)?;
                let segment_bytes = &mut pixels[..count * WIRE_BYTES_PER_PIXEL];

                self.open_window(&segment)?;
                self.read_pixels(READ_MEMORY_START, segment_bytes, delay)?;
                expand_glyph(
                    &row[start / 8..],
                    count,
                    foreground,
                    background,
                    transparency,
                    segment_bytes,
                )?;
                self.open_window(&segment)?;
                self.bulk_write(segment_bytes, delay)?;
                start += count;
            }
        }
        Ok(())
    }

    /// Draw `text` in `font` starting at (`x`, `y`)
    ///
    /// Characters outside the font draw its first glyph. Drawing stops at
    /// the first character that would cross the right screen edge.
    /// Returns the x coordinate after the last drawn character.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`draw_glyph`](Self::draw_glyph).
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text<D: DelayNs>(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        font: &PackedFont<'_>,
        foreground: Rgb,
        background: Rgb,
        transparency: Transparency,
        delay: &mut D,
    ) -> DisplayResult<u16, H, RST> {
        let (screen_width, _) = self.screen_size();
        let width = u16::from(font.width());
        let mut cursor = x;
        for c in text.chars() {
            if u32::from(cursor) + u32::from(width) > u32::from(screen_width) {
                break;
            }
            self.draw_glyph(
                cursor,
                y,
                width,
                u16::from(font.height()),
                font.glyph(c),
                foreground,
                background,
                transparency,
                delay,
            )?;
            cursor += width;
        }
        Ok(cursor)
    }

    /// Define the vertical scroll area
    ///
    /// `top` and `bottom` are fixed bands, `scroll` the lines between.
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn set_scroll_area(&mut self, top: u16, scroll: u16, bottom: u16) -> DisplayResult<(), H, RST> {
        let [top_hi, top_lo] = top.to_be_bytes();
        let [scroll_hi, scroll_lo] = scroll.to_be_bytes();
        let [bottom_hi, bottom_lo] = bottom.to_be_bytes();
        self.send_command(
            SET_SCROLL_AREA,
            &[top_hi, top_lo, scroll_hi, scroll_lo, bottom_hi, bottom_lo],
        )
    }

    /// Start the scroll area at `line`
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn scroll_to(&mut self, line: u16) -> DisplayResult<(), H, RST> {
        self.send_command(SET_SCROLL_START, &line.to_be_bytes())
    }

    /// Set the backlight PWM duty, 0 to 100 percent
    ///
    /// Values above 100 are treated as 100.
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn set_brightness(&mut self, percent: u8) -> DisplayResult<(), H, RST> {
        let duty = (u16::from(percent.min(100)) * 255 / 100) as u8;
        self.send_command(SET_PWM_CONF, &pwm_payload(duty))
    }

    /// Drive the backlight enable pin
    ///
    /// # Errors
    ///
    /// Returns the pin error.
    pub fn set_backlight(&mut self, on: bool) -> DisplayResult<(), H, RST> {
        if on {
            self.backlight.set_high().map_err(Error::Pin)
        } else {
            self.backlight.set_low().map_err(Error::Pin)
        }
    }

    /// Show the frame memory on the panel
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn display_on(&mut self) -> DisplayResult<(), H, RST> {
        self.send_command(SET_DISPLAY_ON, &[])
    }

    /// Blank the panel, keeping the frame memory
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn display_off(&mut self) -> DisplayResult<(), H, RST> {
        self.send_command(SET_DISPLAY_OFF, &[])
    }

    /// Put the controller to sleep
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn enter_sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<(), H, RST> {
        self.send_command(ENTER_SLEEP_MODE, &[])?;
        delay.delay_ms(5);
        Ok(())
    }

    /// Wake the controller
    ///
    /// # Errors
    ///
    /// Returns the engine error if a word cannot be queued.
    pub fn exit_sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<(), H, RST> {
        self.send_command(EXIT_SLEEP_MODE, &[])?;
        delay.delay_ms(5);
        Ok(())
    }

    /// Hand back the engine host, transfer channel and pins
    pub fn release(self) -> (H, T, RST, BL) {
        (self.host, self.transfer, self.reset, self.backlight)
    }
}
