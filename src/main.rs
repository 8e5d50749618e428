//! Wavefield - audio-reactive wave visualization engine
//!
//! Mixes live, file, and generated audio sources, extracts band features
//! and beats, and drives a blendable catalog of wave surfaces, a
//! vibrating string, and a spectrum histogram. Runs headless: each frame
//! produces the full render parameter set and a periodic digest is
//! printed so the pipeline can be watched without a window.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use wavefield::audio::SourceRegistry;
use wavefield::cli::Args;
use wavefield::colors::COLOR_SCHEMES;
use wavefield::params::AnalyzerConfig;
use wavefield::scene::{GeometryParams, SceneSystem};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mode = args.parse_mode();
    let scheme = args.parse_scheme();
    println!("Mode: {}", mode.label());
    println!("Colors: {}", COLOR_SCHEMES[scheme].name);

    let mut registry = SourceRegistry::new(AnalyzerConfig::default());

    if let Some(path) = &args.file {
        let data = std::fs::read(path).with_context(|| format!("reading {path}"))?;
        registry
            .add_file(&data, path)
            .with_context(|| format!("decoding {path}"))?;
    }
    if args.mic {
        match registry.add_microphone() {
            Ok(_) => println!("Source: microphone"),
            Err(err) => eprintln!("Warning: microphone unavailable ({err})"),
        }
    }
    if let Some((waveform, freq, amp)) = args.parse_preset() {
        registry.add_tone(waveform, freq, amp)?;
    }
    if let Some(freq) = args.tone {
        registry.add_tone(args.parse_tone_waveform(), freq, args.tone_amplitude)?;
    }
    if registry.is_empty() {
        println!("No source given, using a 440Hz sine tone");
        registry.add_tone(wavefield::audio::ToneWaveform::Sine, 440.0, 0.5)?;
    }
    for (id, kind, label) in registry.sources() {
        println!("Source {id}: {} ({label})", kind.label());
    }

    let mut scene = SceneSystem::new(mode, scheme);

    let frame_dt = 1.0 / args.fps.max(1) as f32;
    let frame_budget = Duration::from_secs_f32(frame_dt);
    let total_frames = (args.duration * args.fps as f32).ceil() as u64;
    let digest_every = args.fps.max(1) as u64;

    let mut last_frame = Instant::now();
    for frame in 0..total_frames {
        let features = registry.combined_features();
        let params = scene.update(frame_dt, &features, false, args.time_scale);

        if frame % digest_every == 0 {
            let geometry = match params.geometry {
                GeometryParams::Surface { mode_blend, .. } => {
                    format!("surface blend {mode_blend:.2}")
                }
                GeometryParams::Curve { .. } => "string".to_string(),
                GeometryParams::Histogram { bar_heights, .. } => {
                    let peak = bar_heights.iter().cloned().fold(0.0f32, f32::max);
                    format!("bars peak {peak:.1}")
                }
            };
            println!(
                "t={:6.2}s amp={:.2} bass={:.2} mid={:.2} treble={:.2} beat={:.2} glow={:.2} rings={} cam=({:.0},{:.0},{:.0}) {}",
                params.time,
                params.amplitude,
                params.bass,
                params.mid,
                params.treble,
                params.beat,
                params.glow,
                scene.effects().rings().len(),
                params.camera.position.x,
                params.camera.position.y,
                params.camera.position.z,
                geometry,
            );
        }

        let elapsed = last_frame.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
        last_frame = Instant::now();
    }

    registry.dispose();
    Ok(())
}
