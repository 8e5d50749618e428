//! CPU-side geometry for the three render families.
//!
//! Buffers are rebuilt only when the active family changes; per-frame
//! motion is applied by displacing the `y` coordinates in place.

use bytemuck::{Pod, Zeroable};

use crate::features::WAVEFORM_LEN;
use crate::modes::{bar_heights, GeometryFamily, BAR_COUNT};
use crate::params::DomainConfig;

pub const BAR_WIDTH: f32 = 2.5;
pub const BAR_GAP: f32 = 0.5;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Square height-field grid centered on the origin in the XZ plane.
pub struct SurfaceGrid {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    row: usize,
}

impl SurfaceGrid {
    pub fn new(domain: &DomainConfig) -> Self {
        let segments = domain.segments;
        let row = segments + 1;
        let half = domain.half_extent();
        let step = domain.extent / segments as f32;

        let mut vertices = Vec::with_capacity(row * row);
        for zi in 0..row {
            for xi in 0..row {
                let x = -half + xi as f32 * step;
                let z = -half + zi as f32 * step;
                vertices.push(Vertex {
                    position: [x, 0.0, z],
                    uv: [xi as f32 / segments as f32, zi as f32 / segments as f32],
                });
            }
        }

        let mut indices = Vec::with_capacity(segments * segments * 6);
        for zi in 0..segments {
            for xi in 0..segments {
                let a = (zi * row + xi) as u32;
                let b = a + 1;
                let c = a + row as u32;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Self {
            vertices,
            indices,
            row,
        }
    }

    pub fn row_len(&self) -> usize {
        self.row
    }

    /// Rewrite every vertex height from `f(x, z)`.
    pub fn apply_heights<F: FnMut(f32, f32) -> f32>(&mut self, mut f: F) {
        for v in &mut self.vertices {
            v.position[1] = f(v.position[0], v.position[2]);
        }
    }
}

/// Polyline along the X axis for the vibrating string.
pub struct CurveStrip {
    pub vertices: Vec<Vertex>,
}

impl CurveStrip {
    pub fn new(domain: &DomainConfig) -> Self {
        let samples = domain.string_samples;
        let half = domain.string_length / 2.0;
        let vertices = (0..samples)
            .map(|i| {
                let u = i as f32 / (samples - 1) as f32;
                Vertex {
                    position: [-half + u * domain.string_length, 0.0, 0.0],
                    uv: [u, 0.0],
                }
            })
            .collect();
        Self { vertices }
    }

    /// Rewrite displacements from `f(u)` with u in 0..1 along the string.
    pub fn apply_displacement<F: FnMut(f32) -> f32>(&mut self, mut f: F) {
        for v in &mut self.vertices {
            v.position[1] = f(v.uv[0]);
        }
    }
}

/// One spectrum bar: center position and current scale.
#[derive(Debug, Clone, Copy)]
pub struct Bar {
    pub x: f32,
    pub height: f32,
}

/// Evenly spaced row of bars centered on the origin.
pub struct BarSet {
    pub bars: [Bar; BAR_COUNT],
}

impl BarSet {
    pub fn new() -> Self {
        let pitch = BAR_WIDTH + BAR_GAP;
        let total = BAR_COUNT as f32 * pitch;
        let mut bars = [Bar { x: 0.0, height: 0.5 }; BAR_COUNT];
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.x = i as f32 * pitch - total / 2.0 + BAR_WIDTH / 2.0;
        }
        Self { bars }
    }

    pub fn update(&mut self, waveform: &[f32; WAVEFORM_LEN], amplitude: f32, beat: f32) {
        let heights = bar_heights(waveform, amplitude, beat);
        for (bar, h) in self.bars.iter_mut().zip(heights) {
            bar.height = h;
        }
    }
}

impl Default for BarSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Live geometry for whichever family the active mode renders.
pub enum GeometryBuffers {
    Surface(SurfaceGrid),
    Curve(CurveStrip),
    Histogram(BarSet),
}

impl GeometryBuffers {
    pub fn for_family(family: GeometryFamily, domain: &DomainConfig) -> Self {
        match family {
            GeometryFamily::Surface => GeometryBuffers::Surface(SurfaceGrid::new(domain)),
            GeometryFamily::Curve => GeometryBuffers::Curve(CurveStrip::new(domain)),
            GeometryFamily::Histogram => GeometryBuffers::Histogram(BarSet::new()),
        }
    }

    pub fn family(&self) -> GeometryFamily {
        match self {
            GeometryBuffers::Surface(_) => GeometryFamily::Surface,
            GeometryBuffers::Curve(_) => GeometryFamily::Curve,
            GeometryBuffers::Histogram(_) => GeometryFamily::Histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_grid_counts() {
        let domain = DomainConfig::default();
        let grid = SurfaceGrid::new(&domain);
        assert_eq!(grid.vertices.len(), 201 * 201);
        assert_eq!(grid.indices.len(), 200 * 200 * 6);
        assert_eq!(grid.row_len(), 201);
    }

    #[test]
    fn test_surface_grid_spans_domain() {
        let domain = DomainConfig::default();
        let grid = SurfaceGrid::new(&domain);
        let first = grid.vertices.first().unwrap().position;
        let last = grid.vertices.last().unwrap().position;
        assert_eq!([first[0], first[2]], [-125.0, -125.0]);
        assert_eq!([last[0], last[2]], [125.0, 125.0]);
        assert_eq!(grid.vertices.last().unwrap().uv, [1.0, 1.0]);
    }

    #[test]
    fn test_apply_heights_writes_through() {
        let mut grid = SurfaceGrid::new(&DomainConfig::default());
        grid.apply_heights(|x, z| x + z);
        let v = &grid.vertices[0];
        assert_eq!(v.position[1], v.position[0] + v.position[2]);
    }

    #[test]
    fn test_curve_endpoints() {
        let domain = DomainConfig::default();
        let strip = CurveStrip::new(&domain);
        assert_eq!(strip.vertices.len(), 256);
        assert_eq!(strip.vertices.first().unwrap().position[0], -100.0);
        assert_eq!(strip.vertices.last().unwrap().position[0], 100.0);
    }

    #[test]
    fn test_bar_row_is_centered() {
        let bars = BarSet::new();
        let first = bars.bars[0].x;
        let last = bars.bars[BAR_COUNT - 1].x;
        assert!((first + last).abs() < 1e-4);
    }

    #[test]
    fn test_bar_update_applies_minimum() {
        let mut bars = BarSet::new();
        bars.update(&[0.0; WAVEFORM_LEN], 0.0, 0.0);
        assert!(bars.bars.iter().all(|b| (b.height - 0.5).abs() < 1e-6));
    }
}
