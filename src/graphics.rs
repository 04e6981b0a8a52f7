//! Graphics support via embedded-graphics
//!
//! This module provides the [`GraphicDisplay`] struct which wraps [`Display`]
//! and implements the [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait from
//! the embedded-graphics ecosystem.
//!
//! There is no frame buffer: every primitive goes straight to controller
//! memory. Solid fills become one window plus a bulk fill, contiguous
//! fills one window plus chunked pixel streaming, and anything else is
//! drawn pixel by pixel.
//!
//! ## Example
//!
//! ```rust,ignore
//! use embedded_graphics::{
//!     pixelcolor::Rgb888,
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle, Rectangle},
//! };
//! use ssd1963::GraphicDisplay;
//!
//! let mut display = GraphicDisplay::new(display_driver, delay);
//! display.clear(Rgb888::BLACK)?;
//!
//! Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!     .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
//!     .draw(&mut display)?;
//!
//! Circle::new(Point::new(100, 50), 40)
//!     .into_styled(PrimitiveStyle::with_stroke(Rgb888::WHITE, 2))
//!     .draw(&mut display)?;
//! ```

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Point, Size},
    pixelcolor::Rgb888,
    prelude::Pixel,
    primitives::{PointsIter, Rectangle},
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::color::Rgb;
use crate::display::{Display, CHUNK_PIXELS};
use crate::dma::BulkTransfer;
use crate::encode::{PixelFormat, WIRE_BYTES_PER_PIXEL};
use crate::error::Error;
use crate::interface::EngineHost;
use crate::window::AddressWindow;

type GraphicsError<H, RST> = Error<<H as EngineHost>::Error, <RST as ErrorType>::Error>;

/// Display with embedded-graphics support
///
/// Owns the [`Display`] and the delay its bulk transfers poll with.
///
/// ## Type Parameters
///
/// * `H` - Engine host implementing [`EngineHost`]
/// * `T` - Transfer channel implementing [`BulkTransfer`]
/// * `RST`, `BL` - Reset and backlight pins
/// * `D` - Delay used for completion polling
pub struct GraphicDisplay<H, T, RST, BL, D> {
    display: Display<H, T, RST, BL>,
    delay: D,
}

impl<H, T, RST, BL, D> GraphicDisplay<H, T, RST, BL, D>
where
    H: EngineHost,
    T: BulkTransfer,
    RST: OutputPin,
    BL: OutputPin<Error = RST::Error>,
    D: DelayNs,
{
    /// Wrap an initialized display
    pub const fn new(display: Display<H, T, RST, BL>, delay: D) -> Self {
        Self { display, delay }
    }

    /// Get a reference to the underlying display
    pub const fn display(&self) -> &Display<H, T, RST, BL> {
        &self.display
    }

    /// Get a mutable reference to the underlying display
    ///
    /// Use this for operations without a graphics counterpart, such as
    /// scrolling or brightness.
    pub fn display_mut(&mut self) -> &mut Display<H, T, RST, BL> {
        &mut self.display
    }

    /// Hand back the display and the delay
    pub fn release(self) -> (Display<H, T, RST, BL>, D) {
        (self.display, self.delay)
    }

    /// Window covering `area`, if it lies entirely on screen
    fn window_of(&self, area: &Rectangle) -> Option<AddressWindow> {
        if area.is_zero_sized() || area.intersection(&self.bounding_box()) != *area {
            return None;
        }
        let bottom_right = area.bottom_right()?;
        AddressWindow::new(
            u16::try_from(area.top_left.x).ok()?,
            u16::try_from(area.top_left.y).ok()?,
            u16::try_from(bottom_right.x).ok()?,
            u16::try_from(bottom_right.y).ok()?,
        )
        .ok()
    }
}

impl<H, T, RST, BL, D> DrawTarget for GraphicDisplay<H, T, RST, BL, D>
where
    H: EngineHost,
    T: BulkTransfer,
    RST: OutputPin,
    BL: OutputPin<Error = RST::Error>,
    D: DelayNs,
{
    type Color = Rgb888;
    type Error = GraphicsError<H, RST>;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let sz = self.size();

        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }

            let x = x as u32;
            let y = y as u32;

            if x >= sz.width || y >= sz.height {
                continue;
            }

            self.display.draw_pixel(x as u16, y as u16, color.into())?;
        }

        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let Some(window) = self.window_of(area) else {
            let pixels = area
                .points()
                .zip(colors)
                .map(|(point, color)| Pixel(point, color));
            return self.draw_iter(pixels);
        };

        let (x1, y1, x2, y2) = window.corners();
        self.display.set_window(x1, y1, x2, y2)?;

        let mut colors = colors.into_iter().take(window.pixel_count() as usize);
        let mut chunk = [0u8; CHUNK_PIXELS * WIRE_BYTES_PER_PIXEL];
        loop {
            let mut filled = 0;
            for (triple, color) in chunk
                .chunks_exact_mut(WIRE_BYTES_PER_PIXEL)
                .zip(colors.by_ref())
            {
                triple.copy_from_slice(&Rgb::from(color).bytes());
                filled += 1;
            }
            if filled == 0 {
                return Ok(());
            }
            self.display.write_pixels(
                &chunk[..filled * WIRE_BYTES_PER_PIXEL],
                filled,
                &PixelFormat::Rgb888,
                &mut self.delay,
            )?;
        }
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        match self.window_of(&area) {
            Some(window) => {
                let (x1, y1, x2, y2) = window.corners();
                self.display
                    .fill_rect(x1, y1, x2, y2, color.into(), &mut self.delay)
            }
            None => Ok(()),
        }
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.display.clear(color.into(), &mut self.delay)
    }
}

impl<H, T, RST, BL, D> OriginDimensions for GraphicDisplay<H, T, RST, BL, D>
where
    H: EngineHost,
    T: BulkTransfer,
    RST: OutputPin,
    BL: OutputPin<Error = RST::Error>,
    D: DelayNs,
{
    fn size(&self) -> Size {
        let (width, height) = self.display.screen_size();
        Size::new(u32::from(width), u32::from(height))
    }
}
