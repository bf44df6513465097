use crate::consts::{SCREEN_HEIGHT, SCREEN_SIZE, SCREEN_WIDTH};

/// 64x32 monochrome framebuffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pixels: [bool; SCREEN_SIZE as usize],
    draw: bool,
    wrap: bool,
    width: u8,
    height: u8,
    size: u16,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl Display {
    pub fn new() -> Self {
        Display {
            pixels: [false; SCREEN_SIZE as usize],
            draw: false,
            wrap: false,
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            size: SCREEN_SIZE,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn wraps(&self) -> bool {
        self.wrap
    }

    pub fn set_wrap(&mut self, enabled: bool) {
        self.wrap = enabled;
    }

    pub fn is_draw_pending(&self) -> bool {
        self.draw
    }

    pub fn set_draw_pending(&mut self, pending: bool) {
        self.draw = pending;
    }

    /// Blank the screen and reset geometry. The wrap policy is kept.
    pub fn reset(&mut self) {
        *self = Display {
            wrap: self.wrap,
            ..Display::new()
        };
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
        self.draw = true;
    }

    pub fn pixel(&self, x: u8, y: u8) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[x as usize + self.width as usize * y as usize]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub(crate) fn load_pixels(&mut self, data: &[u8]) {
        for (px, &byte) in self.pixels.iter_mut().zip(data) {
            *px = byte != 0;
        }
    }

    /// XOR a sprite onto the screen with its top-left corner at (`reg_x`, `reg_y`).
    ///
    /// The origin itself always wraps onto the screen. Returns true if any lit
    /// pixel was switched off. Pixels past an edge either wrap to the opposite
    /// side or are dropped, depending on the wrap policy.
    pub fn draw(&mut self, reg_x: u8, reg_y: u8, sprite: &[u8]) -> bool {
        let (w, h) = (self.width as usize, self.height as usize);
        let (x0, y0) = (reg_x as usize % w, reg_y as usize % h);
        let mut collision = false;

        for (yo, data) in sprite.iter().enumerate() {
            for (xo, bit) in byte_to_bits(*data).iter().enumerate() {
                if *bit == 0 {
                    continue;
                }

                let mut col = x0 + xo;
                let mut row = y0 + yo;
                if col >= w || row >= h {
                    if !self.wrap {
                        continue;
                    }
                    col %= w;
                    row %= h;
                }

                let px = &mut self.pixels[col + row * w];
                collision |= *px;
                *px ^= true;
            }
        }

        self.draw = true;
        collision
    }

    /// Render the framebuffer as text, one line per row.
    pub fn render_text(&self) -> String {
        let mut res = String::with_capacity((self.width as usize + 1) * self.height as usize * 3);

        for row in self.pixels.chunks(self.width as usize) {
            for &pixel in row {
                res.push(if pixel { '█' } else { '░' });
            }
            res.push('\n');
        }

        res
    }
}

/// Bits as 0 or 1 u8 from the most to least significant
fn byte_to_bits(b: u8) -> [u8; 8] {
    std::array::from_fn(|i| (b >> (7 - i)) & 1)
}
