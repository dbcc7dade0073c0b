//! Visually distinct colors for consecutive quad groups.

use crate::coords::ColorRgba;

const BLUE_STRIDE: u32 = 33;
const GREEN_STRIDE: u32 = 65;
const RED_STRIDE: u32 = 129;

const BLUE_BIT: u32 = 0b001;
const GREEN_BIT: u32 = 0b010;
const RED_BIT: u32 = 0b100;

/// Derives an RGBA8 color from a group counter.
///
/// `(counter % 7) + 1` selects one of the seven non-empty subsets of
/// `{R, G, B}` (bit 2 = red, bit 1 = green, bit 0 = blue). Each selected
/// channel counts down from 255 by its own stride, wrapping in 8 bits, so the
/// channels drift out of phase with each other. Unselected channels are 0 and
/// alpha is always 255.
pub fn derive_group_color(counter: u32) -> [u8; 4] {
    let components = (counter % 7) + 1;

    let channel = |bit: u32, stride: u32| -> u8 {
        if components & bit != 0 {
            255 - counter.wrapping_mul(stride) as u8
        } else {
            0
        }
    };

    [
        channel(RED_BIT, RED_STRIDE),
        channel(GREEN_BIT, GREEN_STRIDE),
        channel(BLUE_BIT, BLUE_STRIDE),
        255,
    ]
}

/// Running group counter and the color of the current group.
///
/// Reset at the start of every frame; advanced only by quads that start a
/// new group.
#[derive(Debug, Clone)]
pub struct GroupColorState {
    counter: u32,
    current: ColorRgba,
    initial: ColorRgba,
}

impl GroupColorState {
    pub fn new(initial: ColorRgba) -> Self {
        Self {
            counter: 0,
            current: initial,
            initial,
        }
    }

    /// Restores the counter to 0 and the color to the initial color.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.current = self.initial;
    }

    /// Starts a new group and returns its color.
    pub fn advance(&mut self) -> ColorRgba {
        self.counter = self.counter.wrapping_add(1);
        self.current = ColorRgba::from_rgba8(derive_group_color(self.counter));
        self.current
    }

    #[inline]
    pub fn current(&self) -> ColorRgba {
        self.current
    }

    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }
}

impl Default for GroupColorState {
    fn default() -> Self {
        Self::new(ColorRgba::red())
    }
}
