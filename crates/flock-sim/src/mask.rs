//! Opaque-pixel masks for exact silhouette collision.
//!
//! Rows are packed into 64-bit words so an overlap test touches one word per
//! 64 columns instead of one byte per pixel. Bits past `width` are always zero.

/// Alpha values above this count as opaque, matching the usual sprite-mask default.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 127;

/// Radius of the rounded corners on obstacle caps.
const CAP_CORNER_RADIUS: f32 = 6.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    SizeMismatch { expected: usize, actual: usize },
    NoAgentFrames,
}

impl std::fmt::Display for MaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "alpha buffer has {actual} bytes, expected {expected}")
            },
            Self::NoAgentFrames => write!(f, "sprite set needs at least one agent frame"),
        }
    }
}

impl std::error::Error for MaskError {}

/// A `width` x `height` bitmap of opaque pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    /// An all-transparent mask.
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(64);
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    /// Build a mask by evaluating `opaque(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut opaque: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if opaque(x, y) {
                    mask.set(x, y);
                }
            }
        }
        mask
    }

    /// Build a mask from a row-major alpha channel.
    pub fn from_alpha(
        width: u32,
        height: u32,
        alpha: &[u8],
        threshold: u8,
    ) -> Result<Self, MaskError> {
        let expected = width as usize * height as usize;
        if alpha.len() != expected {
            return Err(MaskError::SizeMismatch {
                expected,
                actual: alpha.len(),
            });
        }
        Ok(Self::from_fn(width, height, |x, y| {
            alpha[y as usize * width as usize + x as usize] > threshold
        }))
    }

    /// Default agent silhouette: an elliptical body with a beak on the right.
    pub fn agent_silhouette(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let (cx, cy) = (w * 0.45, h * 0.5);
        let (rx, ry) = (w * 0.45, h * 0.5);
        Self::from_fn(width, height, |x, y| {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            let dx = (px - cx) / rx;
            let dy = (py - cy) / ry;
            let body = dx * dx + dy * dy <= 1.0;
            let beak = px >= w * 0.75 && py >= h * 0.5 && py < h * 0.75;
            body || beak
        })
    }

    /// Default obstacle silhouette with its opening at the top: a full-width
    /// cap with rounded corners over a slightly narrower shaft.
    pub fn obstacle_silhouette(width: u32, height: u32, cap_height: u32) -> Self {
        let w = width as f32;
        let cap = cap_height.min(height) as f32;
        let inset = (w / 26.0).round();
        let r = CAP_CORNER_RADIUS.min(w / 2.0).min(cap / 2.0);
        Self::from_fn(width, height, |x, y| {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            if py < cap {
                let corner_x = if px < r {
                    Some(r)
                } else if px > w - r {
                    Some(w - r)
                } else {
                    None
                };
                let corner_y = if py < r {
                    Some(r)
                } else if py > cap - r {
                    Some(cap - r)
                } else {
                    None
                };
                match (corner_x, corner_y) {
                    (Some(ccx), Some(ccy)) => {
                        let (dx, dy) = (px - ccx, py - ccy);
                        dx * dx + dy * dy <= r * r
                    },
                    _ => true,
                }
            } else {
                px >= inset && px <= w - inset
            }
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let word = self.row(y)[x as usize / 64];
        (word >> (x % 64)) & 1 == 1
    }

    pub fn set(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * self.words_per_row + x as usize / 64;
        self.bits[idx] |= 1 << (x % 64);
    }

    /// Number of opaque pixels.
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// The mask mirrored top to bottom.
    pub fn flipped_vertical(&self) -> Self {
        let mut bits = Vec::with_capacity(self.bits.len());
        for y in (0..self.height).rev() {
            bits.extend_from_slice(self.row(y));
        }
        Self {
            width: self.width,
            height: self.height,
            words_per_row: self.words_per_row,
            bits,
        }
    }

    /// First pixel (in this mask's coordinates) where this mask and `other`,
    /// placed with its top-left corner at `offset`, are both opaque.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> Option<(i32, i32)> {
        let (dx, dy) = (i64::from(offset.0), i64::from(offset.1));
        let y_start = dy.max(0);
        let y_end = (dy + i64::from(other.height)).min(i64::from(self.height));
        let x_start = dx.max(0);
        let x_end = (dx + i64::from(other.width)).min(i64::from(self.width));
        if y_start >= y_end || x_start >= x_end {
            return None;
        }

        let first_word = (x_start / 64) as usize;
        let last_word = ((x_end - 1) / 64) as usize;

        for y in y_start..y_end {
            let own = self.row(y as u32);
            let theirs = other.row((y - dy) as u32);
            for (i, &word) in own.iter().enumerate().take(last_word + 1).skip(first_word) {
                let hit = word & bits_at(theirs, i as i64 * 64 - dx);
                if hit != 0 {
                    let x = i as i64 * 64 + i64::from(hit.trailing_zeros());
                    return Some((x as i32, y as i32));
                }
            }
        }
        None
    }

    /// Whether any opaque pixel of `other` at `offset` lands on an opaque pixel of this mask.
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        self.overlap(other, offset).is_some()
    }

    fn row(&self, y: u32) -> &[u64] {
        let start = y as usize * self.words_per_row;
        &self.bits[start..start + self.words_per_row]
    }
}

/// 64 bits of `row` starting at bit `start` (which may be negative or past
/// the end); bit `k` of the result is bit `start + k` of the row.
fn bits_at(row: &[u64], start: i64) -> u64 {
    let word = |i: i64| -> u64 {
        if i < 0 {
            0
        } else {
            row.get(i as usize).copied().unwrap_or(0)
        }
    };
    if start <= -64 {
        return 0;
    }
    if start < 0 {
        return word(0) << (-start);
    }
    let (w, b) = (start / 64, start % 64);
    if b == 0 {
        word(w)
    } else {
        (word(w) >> b) | (word(w + 1) << (64 - b))
    }
}

/// Wing frames in the procedural sprite set.
pub const AGENT_FRAMES: usize = 3;

/// The silhouettes a generation collides with, built once.
#[derive(Debug, Clone)]
pub struct SpriteSet {
    /// Never empty; indexed by `Agent::frame`.
    agent_frames: Vec<Mask>,
    pub obstacle_top: Mask,
    pub obstacle_bottom: Mask,
}

impl SpriteSet {
    pub fn new(agent_frames: Vec<Mask>, obstacle_bottom: Mask) -> Result<Self, MaskError> {
        if agent_frames.is_empty() {
            return Err(MaskError::NoAgentFrames);
        }
        let obstacle_top = obstacle_bottom.flipped_vertical();
        Ok(Self {
            agent_frames,
            obstacle_top,
            obstacle_bottom,
        })
    }

    /// Procedural silhouettes sized from the config. Every wing frame shares
    /// one silhouette.
    pub fn from_config(config: &crate::config::SimConfig) -> Self {
        let agent = Mask::agent_silhouette(config.agent.width, config.agent.height);
        let obstacle_bottom = Mask::obstacle_silhouette(
            config.obstacles.width,
            config.obstacles.height,
            config.obstacles.cap_height,
        );
        Self {
            agent_frames: vec![agent; AGENT_FRAMES],
            obstacle_top: obstacle_bottom.flipped_vertical(),
            obstacle_bottom,
        }
    }

    /// Mask for a wing frame; frames past the end wrap around.
    pub fn agent_frame(&self, frame: usize) -> &Mask {
        &self.agent_frames[frame % self.agent_frames.len()]
    }

    pub fn agent_frames(&self) -> &[Mask] {
        &self.agent_frames
    }
}
