use crate::shared::frame::{Frame, CHANNELS};

// Fixed-point BT.601 coefficients with 14 fractional bits.
const SHIFT: u32 = 14;
const R_TO_Y: i32 = 4899;
const G_TO_Y: i32 = 9617;
const B_TO_Y: i32 = 1868;
const CR_SCALE: i32 = 11682;
const CB_SCALE: i32 = 9241;
const CHROMA_OFFSET: i32 = 128 << SHIFT;

fn descale(value: i32) -> i32 {
    (value + (1 << (SHIFT - 1))) >> SHIFT
}

/// Converts one RGB pixel to `[Y, Cr, Cb]`.
pub fn rgb_to_ycrcb(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = descale(r * R_TO_Y + g * G_TO_Y + b * B_TO_Y);
    let cr = descale((r - y) * CR_SCALE + CHROMA_OFFSET);
    let cb = descale((b - y) * CB_SCALE + CHROMA_OFFSET);
    [
        y.clamp(0, 255) as u8,
        cr.clamp(0, 255) as u8,
        cb.clamp(0, 255) as u8,
    ]
}

/// Returns a copy of an RGB frame with channels `[Y, Cr, Cb]`.
pub fn frame_to_ycrcb(frame: &Frame) -> Frame {
    let mut data = Vec::with_capacity(frame.data().len());
    for px in frame.data().chunks_exact(CHANNELS) {
        data.extend_from_slice(&rgb_to_ycrcb(px[0], px[1], px[2]));
    }
    Frame::new(data, frame.width(), frame.height(), frame.index())
}
