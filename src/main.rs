//! Streamlines CLI - Advect particle trails through a JSON velocity field.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use streamlines::{
    compute::{EngineStats, StreamlineEngine},
    schema::{Bounds, FieldFile, StreamlineConfig},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() < 2 {
        eprintln!("Usage: {} <field.json> [ticks]", args[0]);
        eprintln!();
        eprintln!("Advect streamline particles through a velocity field.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  field.json  Path to velocity field file");
        eprintln!("  ticks       Number of frames to simulate (default: 600)");
        eprintln!();
        eprintln!("Engine settings are read from <field>.config.json when present.");
        eprintln!("Example files are printed with the --example flag.");
        std::process::exit(1);
    }

    let field_path = PathBuf::from(&args[1]);
    let ticks: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(600);

    // Load field
    let file = FieldFile::from_path(&field_path).unwrap_or_else(|e| {
        eprintln!("Error loading field: {}", e);
        std::process::exit(1);
    });

    // Load or default engine configuration
    let config_path = field_path.with_extension("config.json");
    let config: StreamlineConfig = if config_path.exists() {
        let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
            eprintln!("Error reading config file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&config_str).unwrap_or_else(|e| {
            eprintln!("Error parsing config: {}", e);
            std::process::exit(1);
        })
    } else {
        StreamlineConfig::default()
    };

    let mut engine = StreamlineEngine::from_file(&file, config).unwrap_or_else(|e| {
        eprintln!("Error creating engine: {}", e);
        std::process::exit(1);
    });

    let config = engine.config();
    let (y_len, x_len, z_len) = engine.field().dims();
    println!("Streamlines");
    println!("===========");
    println!(
        "Field: {}x{}x{} ({} valid cells)",
        x_len,
        y_len,
        z_len,
        engine.field().valid_cells().len()
    );
    println!("Particles: {}", config.particle_count);
    println!(
        "Max age: {} (fade-out {} frames)",
        config.max_age_limit,
        engine.fade_out_frames()
    );
    println!("Velocity factor: {}", config.velocity_factor);
    println!(
        "Magnitude range: [{}, {}]",
        config.magnitude_min, config.magnitude_max
    );
    println!("Ticks: {}", ticks);
    println!();

    println!("Running...");
    let start = Instant::now();

    for i in 0..ticks {
        engine.tick();

        // Print progress every 10%
        if (i + 1) % (ticks / 10).max(1) == 0 {
            let stats = EngineStats::from_engine(&engine);
            let elapsed = start.elapsed().as_secs_f32();
            let ticks_per_sec = (i + 1) as f32 / elapsed;
            println!(
                "  Tick {}/{}: advecting={}, fading={}, vertices={}, mean age={:.1}, {:.1} ticks/s",
                i + 1,
                ticks,
                stats.advecting,
                stats.fading_out,
                stats.live_vertices,
                stats.mean_age,
                ticks_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    let stats = EngineStats::from_engine(&engine);

    println!();
    println!("Final pool:");
    println!("  Seeding: {}", stats.seeding);
    println!("  Advecting: {}", stats.advecting);
    println!("  Fading out: {}", stats.fading_out);
    println!("  Expired: {}", stats.expired);
    println!("  Live vertices: {}", stats.live_vertices);
    println!("  Mean lifetime: {:.1}", stats.mean_lifetime);
    if let Some(head) = engine.render_positions(0).and_then(|p| p.last().copied()) {
        println!(
            "  Trail 0 head ({:?} axes): [{:.3}, {:.3}, {:.3}]",
            engine.config().render_axes, head[0], head[1], head[2]
        );
    }
    println!();
    println!(
        "Time: {:.2}s ({:.1} ticks/s)",
        elapsed.as_secs_f32(),
        ticks as f32 / elapsed.as_secs_f32()
    );

    engine.dispose();
}

fn print_example_config() {
    let config = StreamlineConfig::default();

    // Two-layer shear flow on a 2x3x2 grid with one absent cell.
    let cell = |u: f32, v: f32, w: f32| Some([Some(u), Some(v), Some(w)]);
    let file = FieldFile {
        grid: vec![
            vec![
                vec![cell(0.2, 0.0, 0.0), cell(0.4, 0.0, 0.1)],
                vec![cell(0.2, 0.1, 0.0), None],
                vec![cell(0.3, 0.0, 0.0), cell(0.5, 0.0, 0.1)],
            ],
            vec![
                vec![cell(0.1, 0.0, 0.0), cell(0.3, 0.0, 0.0)],
                vec![cell(0.1, -0.1, 0.0), cell(0.3, 0.0, -0.1)],
                vec![cell(0.2, 0.0, 0.0), cell(0.4, 0.0, 0.0)],
            ],
        ],
        bounds: Bounds {
            x_min: 0.0,
            x_max: 3.0,
            y_min: 0.0,
            y_max: 2.0,
            z_min: 0.0,
            z_max: 1.0,
        },
        min: Some(0.0),
        max: Some(0.5),
    };

    println!("Example configuration (field.config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
    println!();
    println!("Example field (field.json):");
    println!("{}", serde_json::to_string(&file).unwrap());
}
