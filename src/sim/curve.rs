//! Heart curve sampling
//!
//! The heart is the closed parametric curve
//! `(16 sin³t, -(13 cos t - 5 cos 2t - 2 cos 3t - cos 4t))`, with y pointing
//! down as in screen space. Sampling is a pure function of its inputs so a
//! resize can regenerate every target without distorting the shape.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::consts::{HEART_SCALE_FACTOR, HEART_VERTICAL_OFFSET};
use crate::{Error, Point, Result};

/// Evaluate the raw (unscaled, uncentered) heart curve at parameter `t`
#[inline]
pub fn heart_point(t: f32) -> Vec2 {
    let x = 16.0 * t.sin().powi(3);
    let y = -(13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos());
    Vec2::new(x, y)
}

/// Produce `n` evenly spaced points on the heart, centered at
/// `(center_x, center_y)` and scaled by `scale`.
///
/// Point `i` sits at `t = i / n * 2π`, so the sequence starts at the top
/// notch and never repeats it.
pub fn heart_points(
    n: usize,
    center_x: f32,
    center_y: f32,
    scale: f32,
    vertical_offset: f32,
) -> Result<Vec<Point>> {
    if n < 1 {
        return Err(Error::invalid_argument("point count must be at least 1"));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::invalid_argument(format!(
            "scale must be finite and > 0, got {scale}"
        )));
    }

    let center = Vec2::new(center_x, center_y + vertical_offset);
    Ok((0..n)
        .map(|i| {
            let t = i as f32 / n as f32 * TAU;
            center + heart_point(t) * scale
        })
        .collect())
}

/// Viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Heart layout with the default policy
    pub fn heart_layout(&self) -> HeartLayout {
        self.heart_layout_with(HEART_SCALE_FACTOR, HEART_VERTICAL_OFFSET)
    }

    /// Heart layout: centered, scaled to `min(w, h) * scale_factor`
    pub fn heart_layout_with(&self, scale_factor: f32, vertical_offset: f32) -> HeartLayout {
        HeartLayout {
            center: self.center(),
            scale: self.width.min(self.height) * scale_factor,
            vertical_offset,
        }
    }
}

/// Where and how large the heart is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartLayout {
    pub center: Vec2,
    pub scale: f32,
    pub vertical_offset: f32,
}

impl HeartLayout {
    pub fn sample(&self, n: usize) -> Result<Vec<Point>> {
        heart_points(n, self.center.x, self.center.y, self.scale, self.vertical_offset)
    }
}
