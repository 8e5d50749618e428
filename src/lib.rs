//! Wavefield library - audio-reactive wave visualization engine

pub mod audio;
pub mod beat;
pub mod camera;
pub mod cli;
pub mod colors;
pub mod effects;
pub mod error;
pub mod features;
pub mod geometry;
pub mod modes;
pub mod params;
pub mod scene;
