// backdrop-preview - Render the backdrop headless to a PNG
//
// Pipeline:
//   1. Build the engine for the requested surface
//   2. Paint the field layer once
//   3. Run N frames at 60 Hz with a scripted pointer
//   4. Composite layers over the field and write the PNG
//
// Usage: cargo run --bin backdrop-preview -- <out.png> [--width N] [--height N]
//        [--dpr F] [--frames N] [--seed N] [--config FILE]

mod path;

use std::env;
use std::error::Error;
use std::fs;

use backdrop_engine::clock::FRAME_MS;
use backdrop_engine::{Backdrop, EngineConfig, Raster, Surface, Viewport};
use image::RgbaImage;

use path::PointerPath;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <out.png> [--width N] [--height N] [--dpr F] [--frames N] [--seed N] [--config FILE]", args[0]);
        std::process::exit(1);
    }

    // Parse arguments
    let out_path = &args[1];
    let mut width = 1280.0f32;
    let mut height = 720.0f32;
    let mut dpr = 1.0f32;
    let mut frames = 180u32;
    let mut seed = 1u64;
    let mut config_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--width" => { width = value.and_then(|s| s.parse().ok()).unwrap_or(width); i += 2; }
            "--height" => { height = value.and_then(|s| s.parse().ok()).unwrap_or(height); i += 2; }
            "--dpr" => { dpr = value.and_then(|s| s.parse().ok()).unwrap_or(dpr); i += 2; }
            "--frames" => { frames = value.and_then(|s| s.parse().ok()).unwrap_or(frames); i += 2; }
            "--seed" => { seed = value.and_then(|s| s.parse().ok()).unwrap_or(seed); i += 2; }
            "--config" => { config_path = value.cloned(); i += 2; }
            _ => i += 1,
        }
    }

    let cfg = match &config_path {
        Some(p) => EngineConfig::from_json(&fs::read_to_string(p)?)?,
        None => EngineConfig::default(),
    };

    let viewport = Viewport::new(width, height, dpr);
    viewport.ensure_drawable()?;
    println!("Rendering {}x{} @{}x, {} frames...", width, height, viewport.dpr, frames);

    let mut engine = Backdrop::new(cfg, seed);
    engine.resize(viewport);
    for (kind, n) in engine.populations() {
        println!("  {:?}: {}", kind, n);
    }

    // Field
    println!("  Painting field...");
    let mut field = Raster::new(&viewport);
    engine.paint_field(&mut field);

    // Frames
    println!("  Simulating...");
    let pointer = PointerPath::new(width, height);
    let mut layers = Raster::new(&viewport);
    for n in 0..frames {
        let t = n as f32 * FRAME_MS / 1000.0;
        let (x, y) = pointer.at(t);
        engine.pointer_moved(x, y);
        engine.frame(n as f64 * FRAME_MS as f64, &mut layers);
    }

    // Composite + export
    let mut out = Raster::new(&viewport);
    out.clear();
    out.composite(&field);
    out.composite(&layers);

    let (w, h) = (out.width(), out.height());
    let img = RgbaImage::from_raw(w, h, out.into_pixels()).ok_or("pixel buffer size mismatch")?;
    img.save(out_path)?;

    println!("Wrote {}", out_path);
    Ok(())
}
