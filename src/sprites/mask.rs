//! Collision masks traced from a sprite's alpha channel.
//!
//! A mask is a list of closed outlines around the non-transparent regions of
//! one frame. Outlines are traced by following the boundary through its eight
//! neighbours, nudged sub-pixel by edge alpha, smoothed, simplified, centered
//! on the frame and stored at half scale (sprites are drawn at 50%).

use std::f64::consts::FRAC_1_SQRT_2;
use std::ops::{Add, Mul, Sub};

use super::ImageBuffer;

/// 2-D point in mask space (sprite center at the origin).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    fn unit(self) -> Point {
        let length = self.length();
        if length == 0.0 {
            Point::default()
        } else {
            self * (1.0 / length)
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, scale: f64) -> Point {
        Point::new(self.x * scale, self.y * scale)
    }
}

/// Neighbour steps, clockwise from north.
const STEP: [[i64; 2]; 8] = [
    [0, -1],
    [1, -1],
    [1, 0],
    [1, 1],
    [0, 1],
    [-1, 1],
    [-1, 0],
    [-1, -1],
];

/// Outline of one frame's opaque regions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mask {
    outlines: Vec<Vec<Point>>,
    radius: f64,
}

impl Mask {
    /// Trace a mask from `frame` of `image`. `name` is only used in warnings.
    ///
    /// A frame with no opaque pixels yields an empty mask.
    pub fn create(image: &ImageBuffer, frame: usize, name: &str) -> Self {
        let mut mask = Mask::default();
        let size = Point::new(f64::from(image.width()), f64::from(image.height()));

        for mut edge in trace(image, frame, name) {
            smooth_and_center(&mut edge, size);
            let outline = simplify(&edge);
            // Outlines with no area are useless for collision.
            if outline.len() <= 2 {
                continue;
            }
            mask.radius = mask.radius.max(compute_radius(&outline));
            mask.outlines.push(outline);
        }
        mask
    }

    /// Whether any outline was produced.
    pub fn is_loaded(&self) -> bool {
        !self.outlines.is_empty()
    }

    pub fn outlines(&self) -> &[Vec<Point>] {
        &self.outlines
    }

    /// Distance from the center to the farthest outline point.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `point` (relative to the sprite center) lies inside the mask.
    ///
    /// Counts crossings of a ray cast straight down across every outline, so
    /// holes and separate islands are handled.
    pub fn contains(&self, point: Point) -> bool {
        if !self.is_loaded() || point.length() > self.radius {
            return false;
        }

        let mut crossings = 0;
        for outline in &self.outlines {
            let Some(&last) = outline.last() else {
                continue;
            };
            let mut prev = last;
            for &next in outline {
                if prev.x != next.x && (prev.x <= point.x) == (point.x < next.x) {
                    let y = prev.y + (next.y - prev.y) * (point.x - prev.x) / (next.x - prev.x);
                    if y >= point.y {
                        crossings += 1;
                    }
                }
                prev = next;
            }
        }
        crossings % 2 == 1
    }
}

fn trace(image: &ImageBuffer, frame: usize, name: &str) -> Vec<Vec<Point>> {
    let mut raw = Vec::new();
    let Some(pixels) = image.frame_pixels(frame) else {
        return raw;
    };
    let width = i64::from(image.width());
    let height = i64::from(image.height());
    let pixel_count = pixels.len() / 4;
    let alpha = |index: usize| pixels[index * 4 + 3];
    let opaque = |index: usize| alpha(index) != 0;
    let offset = [
        -width,
        -width + 1,
        1,
        width + 1,
        width,
        width - 1,
        -1,
        -width - 1,
    ];
    let warn = |reason: &str| {
        log::warn!(
            "Unable to create mask for {}x{} px image \"{}\": {}",
            width,
            height,
            name,
            reason
        );
    };

    let mut has_outline = vec![false; pixel_count];
    let mut start = 0usize;
    loop {
        // Next opaque pixel that is not already on an outline. Pixels inside
        // a traced region are skipped up to the next transparent one.
        while start < pixel_count {
            if opaque(start) {
                if !has_outline[start] {
                    break;
                }
                start += 1;
                while start < pixel_count && opaque(start) {
                    start += 1;
                }
            } else {
                start += 1;
            }
        }
        if start >= pixel_count {
            if raw.is_empty() {
                warn("all pixels were transparent");
            }
            return raw;
        }

        let start_xy = [start as i64 % width, start as i64 / width];
        let mut directions: Vec<usize> = Vec::new();
        let mut d = 7usize;
        let mut pos = start;
        let mut p = start_xy;
        loop {
            has_outline[pos] = true;
            let first_d = d;
            let mut alone = false;
            let mut next;
            loop {
                next = [p[0] + STEP[d][0], p[1] + STEP[d][1]];
                if (0..width).contains(&next[0])
                    && (0..height).contains(&next[1])
                    && opaque((pos as i64 + offset[d]) as usize)
                {
                    break;
                }
                d = (d + 1) & 7;
                if d == first_d {
                    alone = true;
                    warn(&format!("lone point found at ({}, {})", p[0], p[1]));
                    break;
                }
            }
            if alone {
                break;
            }

            p = next;
            pos = (pos as i64 + offset[d]) as usize;
            directions.push(d);
            // Turn back ninety degrees before searching again.
            d = (d + 6) & 7;
            if pos == start {
                break;
            }
        }

        if directions.len() < 4 {
            continue;
        }

        let scale = |d: usize| if d & 1 == 1 { FRAC_1_SQRT_2 } else { 1.0 };
        let step = |d: usize| Point::new(STEP[d][0] as f64, STEP[d][1] as f64) * scale(d);

        let mut points = Vec::with_capacity(directions.len());
        let mut pos = start;
        let mut p = start_xy;
        let mut prev = directions[directions.len() - 1];
        for &next in &directions {
            let outward = (step((prev + 6) & 7) + step((next + 6) & 7)).unit();
            let shift = outward * (f64::from(alpha(pos)) / 255.0 - 0.5);
            points.push(shift + Point::new(p[0] as f64, p[1] as f64));

            p = [p[0] + STEP[next][0], p[1] + STEP[next][1]];
            pos = (pos as i64 + offset[next]) as usize;
            prev = next;
        }
        raw.push(points);
    }
}

/// Average neighbouring points, move the origin to the frame center and
/// halve the scale.
fn smooth_and_center(raw: &mut [Point], size: Point) {
    let Some(&last) = raw.last() else {
        return;
    };
    let mut prev = last;
    for p in raw.iter_mut() {
        let smoothed = (prev + *p - size) * 0.25;
        prev = *p;
        *p = smoothed;
    }
}

/// Squared distance from `p` to the segment `a`-`b`.
fn distance_squared(p: Point, a: Point, b: Point) -> f64 {
    let p = p - a;
    let b = b - a;
    let length = b.length_squared();
    if length == 0.0 {
        return p.length_squared();
    }
    let u = (b.dot(p) / length).clamp(0.0, 1.0);
    (p - b * u).length_squared()
}

/// Ramer-Douglas-Peucker over the closed outline from `first` to `last`,
/// wrapping around the end of the list.
fn simplify_span(points: &[Point], first: usize, last: usize, result: &mut Vec<Point>) {
    let mut dmax = 0.0;
    let mut imax = 0;
    let mut i = first + 1;
    loop {
        if i == points.len() {
            i = 0;
        }
        if i == last {
            break;
        }
        let d = distance_squared(points[i], points[first], points[last]);
        // Ties go to the lower point so the result is symmetric.
        if d > dmax || (d == dmax && points[i].y > points[imax].y) {
            dmax = d;
            imax = i;
        }
        i += 1;
    }

    if dmax < 1.0 {
        return;
    }

    simplify_span(points, first, imax, result);
    result.push(points[imax]);
    simplify_span(points, imax, last, result);
}

fn simplify(raw: &[Point]) -> Vec<Point> {
    let mut top: Option<usize> = None;
    let mut bottom: Option<usize> = None;
    for (i, point) in raw.iter().enumerate() {
        let (Some(t), Some(b)) = (top, bottom) else {
            top = Some(i);
            bottom = Some(i);
            continue;
        };
        let ax = point.x.abs();
        if point.y > raw[b].y || (point.y == raw[b].y && ax < raw[b].x.abs()) {
            bottom = Some(i);
        } else if point.y < raw[t].y || (point.y == raw[t].y && ax < raw[t].x.abs()) {
            top = Some(i);
        }
    }

    let mut result = Vec::new();
    if let (Some(top), Some(bottom)) = (top, bottom) {
        if top != bottom {
            result.push(raw[top]);
            simplify_span(raw, top, bottom, &mut result);
            result.push(raw[bottom]);
            simplify_span(raw, bottom, top, &mut result);
        }
    }
    result
}

fn compute_radius(outline: &[Point]) -> f64 {
    outline
        .iter()
        .map(|p| p.length_squared())
        .fold(0.0, f64::max)
        .sqrt()
}
