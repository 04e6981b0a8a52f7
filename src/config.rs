//! Bus configuration types and builder

pub use crate::error::BuilderError;

/// Number of GPIOs addressable by a pin index
pub const GPIO_COUNT: u8 = 32;

/// Default write (and read) engine clock in Hz
pub const DEFAULT_CLOCK_HZ: u32 = 25_000_000;

/// Worst-case pixel count of a single bulk read, used to size `rx_limit`
pub const READ_WORST_CASE_PIXELS: u64 = 100 * 100;

/// GPIO assignment of the parallel bus
///
/// The data lane is always eight consecutive GPIOs starting at `data_base`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pins {
    /// First GPIO of the 8-bit data lane (D0)
    pub data_base: u8,
    /// Command/data select (low = command)
    pub command_select: u8,
    /// Write strobe (active low)
    pub write_strobe: u8,
    /// Read strobe (active low)
    pub read_strobe: u8,
    /// Reset line (active low)
    pub reset: u8,
    /// Backlight enable, if wired to a GPIO
    pub backlight: Option<u8>,
}

impl Pins {
    /// Layout expected by the side-set programs
    ///
    /// Data on `base..base + 8`, D/C on `base + 8`, /WR on `base + 9`,
    /// /RD on `base + 10`.
    pub const fn contiguous(data_base: u8, reset: u8) -> Self {
        Self {
            data_base,
            command_select: data_base.wrapping_add(8),
            write_strobe: data_base.wrapping_add(9),
            read_strobe: data_base.wrapping_add(10),
            reset,
            backlight: None,
        }
    }

    /// Set the backlight GPIO
    pub const fn with_backlight(mut self, pin: u8) -> Self {
        self.backlight = Some(pin);
        self
    }

    /// Whether control lines follow the data lane in side-set order
    pub const fn is_contiguous(&self) -> bool {
        self.command_select as u16 == self.data_base as u16 + 8
            && self.write_strobe as u16 == self.data_base as u16 + 9
            && self.read_strobe as u16 == self.data_base as u16 + 10
    }

    /// Check that every bus function has its own GPIO
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::PinOutOfRange` if the data lane or any control
    /// line falls outside the GPIO numbering, `BuilderError::PinConflict`
    /// naming the first GPIO claimed twice, and
    /// `BuilderError::MisplacedControl` if D/C, /WR or /RD is not on the GPIO
    /// the side-set programs drive for it.
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.data_base > GPIO_COUNT - 8 {
            return Err(BuilderError::PinOutOfRange {
                pin: self.data_base,
            });
        }
        let mut used: u32 = 0xFF << self.data_base;
        let controls = [
            Some(self.command_select),
            Some(self.write_strobe),
            Some(self.read_strobe),
            Some(self.reset),
            self.backlight,
        ];
        for pin in controls.into_iter().flatten() {
            if pin >= GPIO_COUNT {
                return Err(BuilderError::PinOutOfRange { pin });
            }
            let bit = 1u32 << pin;
            if used & bit != 0 {
                return Err(BuilderError::PinConflict { pin });
            }
            used |= bit;
        }
        let strobes = [self.command_select, self.write_strobe, self.read_strobe];
        for (offset, pin) in (8..).zip(strobes) {
            let expected = self.data_base + offset;
            if pin != expected {
                return Err(BuilderError::MisplacedControl { pin, expected });
            }
        }
        Ok(())
    }
}

impl Default for Pins {
    fn default() -> Self {
        Self::contiguous(2, 14)
    }
}

/// Display orientation
///
/// Selects which controller register receives the x range of a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Panel-native: x selects columns
    #[default]
    Landscape,
    /// Rotated: x selects pages (rows)
    Portrait,
}

/// Supported TFT panels and their SSD1963 timing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Panel {
    /// 4.3" 480x272, 24 color bits
    #[default]
    Lb04301,
    /// 7" 800x480, 18 color bits (lower bits ignored)
    At070tn92,
}

impl Panel {
    /// Native width in pixels
    pub const fn width(self) -> u16 {
        match self {
            Self::Lb04301 => 480,
            Self::At070tn92 => 800,
        }
    }

    /// Native height in pixels
    pub const fn height(self) -> u16 {
        match self {
            Self::Lb04301 => 272,
            Self::At070tn92 => 480,
        }
    }

    /// Total pixel count
    pub const fn pixel_count(self) -> u32 {
        self.width() as u32 * self.height() as u32
    }

    /// LCDC_FPR for the pixel clock: `DCLK * 2^20 / PLL - 1`, MSB first
    pub const fn lshift_freq(self) -> [u8; 3] {
        match self {
            // 9MHz at 100MHz PLL
            Self::Lb04301 => [0x01, 0x70, 0xA3],
            // 33.3MHz at 100MHz PLL
            Self::At070tn92 => [0x05, 0x53, 0xF6],
        }
    }

    /// Parameters of `SET_LCD_MODE`
    pub const fn lcd_mode(self) -> [u8; 7] {
        let mode = match self {
            Self::Lb04301 => 0x20,
            Self::At070tn92 => 0x00,
        };
        let hdp = self.width() - 1;
        let vdp = self.height() - 1;
        [
            mode,
            0x00,
            (hdp >> 8) as u8,
            hdp as u8,
            (vdp >> 8) as u8,
            vdp as u8,
            0x00,
        ]
    }

    /// Parameters of `SET_HORIZONTAL_PERIOD`
    pub const fn horizontal_period(self) -> [u8; 8] {
        match self {
            // HT 531, HPS 43, HPW 8, LPS 0
            Self::Lb04301 => [0x02, 0x13, 0x00, 0x2B, 0x08, 0x00, 0x00, 0x00],
            // HT 1056, HPS 46, HPW 8, LPS 0
            Self::At070tn92 => [0x04, 0x1F, 0x00, 0x2E, 0x08, 0x00, 0x00, 0x00],
        }
    }

    /// Parameters of `SET_VERTICAL_PERIOD`
    pub const fn vertical_period(self) -> [u8; 7] {
        match self {
            // VT 288, VPS 14, VPW 10, FPS 0
            Self::Lb04301 => [0x01, 0x20, 0x00, 0x0E, 0x0A, 0x00, 0x00],
            // VT 525, VPS 23, VPW 8, FPS 0
            Self::At070tn92 => [0x02, 0x0C, 0x00, 0x17, 0x08, 0x00, 0x00],
        }
    }
}

/// Bus configuration
///
/// Immutable once the driver is built. Use [`Builder`] to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// GPIO assignment
    pub pins: Pins,
    /// Clock of the write engines in Hz
    pub write_clock_hz: u32,
    /// Clock of the read engine in Hz
    pub read_clock_hz: u32,
    /// Display orientation
    pub orientation: Orientation,
    /// Attached panel
    pub panel: Panel,
    /// Mirror horizontally
    pub h_flip: bool,
    /// Mirror vertically
    pub v_flip: bool,
    /// Poll budget for bulk writes
    pub tx_limit: u32,
    /// Poll budget for bulk reads
    pub rx_limit: u32,
}

impl Config {
    /// Screen size as (width, height) seen through the orientation
    pub fn screen_size(&self) -> (u16, u16) {
        match self.orientation {
            Orientation::Landscape => (self.panel.width(), self.panel.height()),
            Orientation::Portrait => (self.panel.height(), self.panel.width()),
        }
    }

    /// Parameter of `SET_ADDRESS_MODE` for the configured flips
    pub fn address_mode(&self) -> u8 {
        (u8::from(self.h_flip) << 1) | u8::from(self.v_flip)
    }
}

/// Poll budget for a transfer of `bytes` at `clock_hz`
///
/// Heuristic upper bound on poll iterations, not a real-time guarantee.
pub fn poll_limit(scale: u64, bytes: u64, clock_hz: u32) -> u32 {
    let limit = scale * bytes / u64::from(clock_hz.max(1));
    limit.clamp(1, u64::from(u32::MAX)) as u32
}

/// Builder for constructing bus configuration
///
/// # Example
///
/// ```
/// use ssd1963::{Builder, Orientation, Panel, Pins};
///
/// let config = Builder::new()
///     .pins(Pins::contiguous(2, 14))
///     .panel(Panel::At070tn92)
///     .orientation(Orientation::Portrait)
///     .build();
/// assert!(config.is_ok());
/// ```
#[must_use]
pub struct Builder {
    pins: Pins,
    write_clock_hz: u32,
    read_clock_hz: u32,
    orientation: Orientation,
    panel: Panel,
    h_flip: bool,
    v_flip: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            pins: Pins::default(),
            write_clock_hz: DEFAULT_CLOCK_HZ,
            // Reads are unreliable above 25MHz
            read_clock_hz: DEFAULT_CLOCK_HZ,
            orientation: Orientation::Landscape,
            panel: Panel::Lb04301,
            h_flip: false,
            v_flip: false,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the GPIO assignment
    pub fn pins(mut self, pins: Pins) -> Self {
        self.pins = pins;
        self
    }

    /// Set the write engine clock in Hz
    pub fn write_clock_hz(mut self, hz: u32) -> Self {
        self.write_clock_hz = hz;
        self
    }

    /// Set the read engine clock in Hz
    pub fn read_clock_hz(mut self, hz: u32) -> Self {
        self.read_clock_hz = hz;
        self
    }

    /// Set the display orientation
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the attached panel
    pub fn panel(mut self, panel: Panel) -> Self {
        self.panel = panel;
        self
    }

    /// Mirror the image horizontally
    pub fn h_flip(mut self, value: bool) -> Self {
        self.h_flip = value;
        self
    }

    /// Mirror the image vertically
    pub fn v_flip(mut self, value: bool) -> Self {
        self.v_flip = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::PinConflict` if any GPIO is assigned twice,
    /// `BuilderError::PinOutOfRange` for GPIOs past the numbering,
    /// `BuilderError::MisplacedControl` for control lines off the
    /// contiguous layout, and
    /// `BuilderError::InvalidClock` for a zero clock rate.
    pub fn build(self) -> Result<Config, BuilderError> {
        self.pins.validate()?;
        if self.write_clock_hz == 0 || self.read_clock_hz == 0 {
            return Err(BuilderError::InvalidClock);
        }
        let fill_bytes = u64::from(self.panel.pixel_count()) * 3;
        Ok(Config {
            pins: self.pins,
            write_clock_hz: self.write_clock_hz,
            read_clock_hz: self.read_clock_hz,
            orientation: self.orientation,
            panel: self.panel,
            h_flip: self.h_flip,
            v_flip: self.v_flip,
            tx_limit: poll_limit(20_000, fill_bytes, self.read_clock_hz),
            rx_limit: poll_limit(30_000, READ_WORST_CASE_PIXELS * 3, self.read_clock_hz),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_layout() {
        let pins = Pins::contiguous(2, 14);
        assert_eq!(pins.command_select, 10);
        assert_eq!(pins.write_strobe, 11);
        assert_eq!(pins.read_strobe, 12);
        assert!(pins.is_contiguous());
        assert!(pins.validate().is_ok());
    }

    #[test]
    fn test_reset_inside_data_lane_conflicts() {
        let pins = Pins::contiguous(2, 9);
        assert_eq!(pins.validate(), Err(BuilderError::PinConflict { pin: 9 }));
    }

    #[test]
    fn test_backlight_on_strobe_conflicts() {
        let pins = Pins::contiguous(2, 14).with_backlight(11);
        assert_eq!(pins.validate(), Err(BuilderError::PinConflict { pin: 11 }));
    }

    #[test]
    fn test_control_lines_sharing_a_pin_conflict() {
        let mut pins = Pins::contiguous(2, 14);
        pins.read_strobe = pins.write_strobe;
        assert_eq!(pins.validate(), Err(BuilderError::PinConflict { pin: 11 }));
    }

    #[test]
    fn test_detached_control_lines_rejected() {
        // The programs would drive GPIO 10 as D/C, which is the reset line
        let pins = Pins {
            data_base: 2,
            command_select: 20,
            write_strobe: 21,
            read_strobe: 22,
            reset: 10,
            backlight: None,
        };
        assert!(!pins.is_contiguous());
        assert_eq!(
            Builder::new().pins(pins).build().unwrap_err(),
            BuilderError::MisplacedControl {
                pin: 20,
                expected: 10,
            }
        );
    }

    #[test]
    fn test_swapped_strobes_rejected() {
        let mut pins = Pins::contiguous(2, 14);
        core::mem::swap(&mut pins.write_strobe, &mut pins.read_strobe);
        assert_eq!(
            pins.validate(),
            Err(BuilderError::MisplacedControl {
                pin: 12,
                expected: 11,
            })
        );
    }

    #[test]
    fn test_data_lane_past_gpio_range() {
        let pins = Pins::contiguous(25, 0);
        assert_eq!(
            pins.validate(),
            Err(BuilderError::PinOutOfRange { pin: 25 })
        );
    }

    #[test]
    fn test_zero_clock_rejected() {
        let result = Builder::new().read_clock_hz(0).build();
        assert!(matches!(result, Err(BuilderError::InvalidClock)));
    }

    #[test]
    fn test_poll_limits_at_default_clock() {
        let config = Builder::new().panel(Panel::At070tn92).build().unwrap();
        // 20000 * 800 * 480 * 3 / 25MHz
        assert_eq!(config.tx_limit, 921);
        // 30000 * 100 * 100 * 3 / 25MHz
        assert_eq!(config.rx_limit, 36);
    }

    #[test]
    fn test_poll_limit_never_zero() {
        assert_eq!(poll_limit(1, 1, u32::MAX), 1);
    }

    #[test]
    fn test_screen_size_follows_orientation() {
        let landscape = Builder::new().build().unwrap();
        assert_eq!(landscape.screen_size(), (480, 272));
        let portrait = Builder::new()
            .orientation(Orientation::Portrait)
            .build()
            .unwrap();
        assert_eq!(portrait.screen_size(), (272, 480));
    }

    #[test]
    fn test_lcd_mode_encodes_last_pixel_index() {
        assert_eq!(
            Panel::Lb04301.lcd_mode(),
            [0x20, 0x00, 0x01, 0xDF, 0x01, 0x0F, 0x00]
        );
    }

    #[test]
    fn test_address_mode_flips() {
        let config = Builder::new().h_flip(true).build().unwrap();
        assert_eq!(config.address_mode(), 0x02);
        let config = Builder::new().v_flip(true).build().unwrap();
        assert_eq!(config.address_mode(), 0x01);
    }
}
