//! Keyframe selection by grayscale frame differencing.
//!
//! The first decoded frame is always a keyframe. Every later frame is
//! compared against the most recently *selected* frame (not the previous
//! frame), so slow drifts still trigger a new keyframe once the accumulated
//! change exceeds the threshold.

use image::{GrayImage, RgbImage};

use crate::cancellation::CancellationToken;
use crate::external::VideoHandle;

/// Luma in BT.601 weights (0.299, 0.587, 0.114), 14-bit fixed point with
/// rounding: the same integer result OpenCV's RGB-to-gray conversion gives.
pub fn bt601_gray(frame: &RgbImage) -> GrayImage {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    const ROUND: u32 = 1 << 13;

    let (width, height) = frame.dimensions();
    let luma = frame
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            ((u32::from(r) * R + u32::from(g) * G + u32::from(b) * B + ROUND) >> 14) as u8
        })
        .collect();
    // One luma byte per pixel, so the buffer always matches the dimensions.
    GrayImage::from_raw(width, height, luma).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Mean absolute difference between two equally sized grayscale frames.
///
/// Returns `None` when the dimensions differ.
pub fn mean_abs_diff(a: &GrayImage, b: &GrayImage) -> Option<f64> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    let len = a.as_raw().len();
    if len == 0 {
        return Some(0.0);
    }
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    Some(total as f64 / len as f64)
}

/// Stateful keyframe decision for one video.
#[derive(Debug, Clone)]
pub struct KeyframeSelector {
    threshold: f64,
    last_selected: Option<GrayImage>,
}

impl KeyframeSelector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_selected: None,
        }
    }

    /// Decides whether `frame` is a keyframe, remembering it if so.
    ///
    /// A frame whose size differs from the last keyframe is always selected.
    pub fn offer(&mut self, frame: &RgbImage) -> bool {
        let gray = bt601_gray(frame);
        let selected = match &self.last_selected {
            None => true,
            Some(last) => mean_abs_diff(&gray, last).is_none_or(|diff| diff > self.threshold),
        };
        if selected {
            self.last_selected = Some(gray);
        }
        selected
    }
}

/// Lazy keyframe sequence over an opened video.
///
/// Yields each selected frame in decode order together with the number of
/// frames decoded so far. The sequence ends at end of stream, on the first
/// decode error, or when the token is cancelled; it cannot be restarted.
pub struct Keyframes<'a, H: VideoHandle> {
    handle: &'a mut H,
    selector: KeyframeSelector,
    cancel: Option<&'a CancellationToken>,
    decoded: u64,
    done: bool,
    on_frame: Option<&'a mut dyn FnMut(u64)>,
}

impl<'a, H: VideoHandle> Keyframes<'a, H> {
    pub fn new(handle: &'a mut H, diff_threshold: f64) -> Self {
        Self {
            handle,
            selector: KeyframeSelector::new(diff_threshold),
            cancel: None,
            decoded: 0,
            done: false,
            on_frame: None,
        }
    }

    /// Stops the sequence once `cancel` is set; checked before every frame.
    pub fn with_cancellation(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Calls `on_frame` with the running decode count after every decoded
    /// frame, selected or not.
    pub fn on_frame(mut self, on_frame: &'a mut dyn FnMut(u64)) -> Self {
        self.on_frame = Some(on_frame);
        self
    }

    /// Frames decoded so far.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }
}

impl<H: VideoHandle> Iterator for Keyframes<'_, H> {
    type Item = RgbImage;

    fn next(&mut self) -> Option<RgbImage> {
        while !self.done {
            if self.cancel.is_some_and(CancellationToken::is_cancelled) {
                self.done = true;
                break;
            }

            let frame = match self.handle.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    log::warn!("Decoding stopped after {} frames: {e}", self.decoded);
                    self.done = true;
                    break;
                }
            };

            self.decoded += 1;
            if let Some(on_frame) = self.on_frame.as_mut() {
                on_frame(self.decoded);
            }

            if self.selector.offer(&frame) {
                return Some(frame);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn gray(value: u8) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([value, value, value]))
    }

    #[test]
    fn test_mean_abs_diff() {
        let a = GrayImage::from_pixel(2, 2, Luma([10]));
        let b = GrayImage::from_pixel(2, 2, Luma([40]));
        assert_eq!(mean_abs_diff(&a, &b), Some(30.0));
        assert_eq!(mean_abs_diff(&b, &a), Some(30.0));
        assert_eq!(mean_abs_diff(&a, &GrayImage::new(3, 2)), None);
    }

    #[test]
    fn test_first_frame_always_selected() {
        let mut selector = KeyframeSelector::new(1000.0);
        assert!(selector.offer(&gray(0)));
        assert!(!selector.offer(&gray(255)));
    }

    #[test]
    fn test_compares_against_last_selected() {
        let mut selector = KeyframeSelector::new(20.0);
        assert!(selector.offer(&gray(0)));
        // Each step is small, but the drift from the last keyframe grows.
        assert!(!selector.offer(&gray(10)));
        assert!(!selector.offer(&gray(20)));
        assert!(selector.offer(&gray(30)));
        assert!(!selector.offer(&gray(45)));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut selector = KeyframeSelector::new(20.0);
        assert!(selector.offer(&gray(0)));
        assert!(!selector.offer(&gray(20)));
        assert!(selector.offer(&gray(21)));
    }

    #[test]
    fn test_bt601_gray_levels() {
        let frame = RgbImage::from_fn(4, 1, |x, _| match x {
            0 => Rgb([0, 0, 255]),
            1 => Rgb([255, 0, 0]),
            2 => Rgb([0, 255, 0]),
            _ => Rgb([255, 255, 255]),
        });
        let luma = bt601_gray(&frame);
        assert_eq!(luma.as_raw(), &vec![29, 76, 150, 255]);
        // Equal channels keep their value.
        assert_eq!(bt601_gray(&gray(77)).get_pixel(0, 0), &Luma([77]));
    }

    #[test]
    fn test_blue_after_black_is_selected() {
        let mut selector = KeyframeSelector::new(20.0);
        assert!(selector.offer(&RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]))));
        assert!(selector.offer(&RgbImage::from_pixel(4, 4, Rgb([0, 0, 255]))));
    }

    #[test]
    fn test_higher_threshold_never_selects_more() {
        let levels = [0u8, 12, 30, 31, 90, 60, 200, 180, 255, 10, 10, 140, 141, 40];
        let stream: Vec<RgbImage> = levels
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                RgbImage::from_pixel(4, 4, Rgb([v, v.wrapping_add(i as u8 * 17), 255 - v]))
            })
            .collect();

        let counts: Vec<usize> = [0.0, 1.0, 5.0, 10.0, 20.0, 35.0, 60.0, 100.0, 255.0]
            .iter()
            .map(|&threshold| {
                let mut selector = KeyframeSelector::new(threshold);
                stream.iter().filter(|frame| selector.offer(frame)).count()
            })
            .collect();

        assert!(counts.windows(2).all(|w| w[1] <= w[0]), "counts: {counts:?}");
        assert_eq!(counts.last(), Some(&1));
    }

    #[test]
    fn test_size_change_selects() {
        let mut selector = KeyframeSelector::new(20.0);
        assert!(selector.offer(&gray(0)));
        assert!(selector.offer(&RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]))));
    }
}
