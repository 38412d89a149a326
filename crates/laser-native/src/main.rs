use anyhow::{bail, Context};
use glam::{Quat, Vec3};
use laser_core::constants::DEFAULT_NAMESPACE;
use laser_core::factory::{self, LaserFactory};
use laser_core::{mesh, Camera, ConfigStore, FrameClock, HeadlessScene, Pointer, Resolver};
use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

mod file_store;

use file_store::FileStore;

const DEFAULT_STORE_PATH: &str = "laser-store.json";
const DEFAULT_RUN_SECONDS: f32 = 6.0;
const DEFAULT_SEED: u64 = 42;
const FIXED_DT: f32 = 1.0 / 60.0;

// Orbit pattern: turn for a while, then hold still long enough for jumps.
const ORBIT_RADIUS: f32 = 15.0;
const ORBIT_SPEED: f32 = 0.6; // rad/s
const ORBIT_MOVE_SECS: f32 = 1.5;
const ORBIT_REST_SECS: f32 = 1.0;

const MODEL_HALF_EXTENT: f32 = 2.0;

enum Command {
    Run,
    LoadBehavior(String),
    LoadBank(String),
    SaveBank(String, Vec<String>),
    SetDefault(Pointer),
    QuickTest(String),
    List,
    Export,
    Import(String),
    ClearAll,
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let rest = || args.iter().skip(2).cloned().collect::<Vec<_>>();
    let name = || {
        args.get(2)
            .cloned()
            .with_context(|| format!("`{}` needs a name", args[1]))
    };
    let cmd = match args.get(1).map(String::as_str) {
        None | Some("run") => Command::Run,
        Some("load-behavior") => Command::LoadBehavior(name()?),
        Some("load-bank") => Command::LoadBank(name()?),
        Some("save-bank") => {
            let mut parts = rest();
            if parts.len() < 2 {
                bail!("usage: save-bank <name> <behavior>...");
            }
            let bank = parts.remove(0);
            Command::SaveBank(bank, parts)
        }
        Some("default-behavior") => Command::SetDefault(Pointer::behavior(name()?)),
        Some("default-bank") => Command::SetDefault(Pointer::bank(name()?)),
        Some("quick-test") => Command::QuickTest(name()?),
        Some("list") => Command::List,
        Some("export") => Command::Export,
        Some("import") => Command::Import(name()?),
        Some("clear-all") => Command::ClearAll,
        Some(other) => bail!("unknown command `{other}`"),
    };
    Ok(cmd)
}

fn orbit_camera(camera: &mut Camera, elapsed: f32) {
    let cycle = ORBIT_MOVE_SECS + ORBIT_REST_SECS;
    let cycles = (elapsed / cycle).floor();
    let within = (elapsed - cycles * cycle).min(ORBIT_MOVE_SECS);
    let angle = (cycles * ORBIT_MOVE_SECS + within) * ORBIT_SPEED;
    camera.eye = Quat::from_rotation_y(angle) * Vec3::new(0.0, 2.0, ORBIT_RADIUS);
}

fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let command = parse_args(&args)?;

    let path = env::var("LASER_STORE").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());
    let seconds = env::var("LASER_SECONDS")
        .ok()
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(DEFAULT_RUN_SECONDS);

    let backend = FileStore::open(&path).with_context(|| format!("opening store {path}"))?;
    let store = ConfigStore::open(backend, DEFAULT_NAMESPACE);
    let mut resolver = Resolver::new(store, DEFAULT_SEED);
    log::info!(
        "{} saved behaviors in {}",
        resolver.list_behaviors().len(),
        resolver.store().backend().path().display()
    );

    let model = mesh::box_model(Vec3::ZERO, Vec3::splat(MODEL_HALF_EXTENT));
    let mut scene = HeadlessScene::new(Some(Camera::default()), Some(model));

    let resolution = resolver.startup(&mut scene);
    log::info!("startup resolved to {resolution:?}");

    let mut factory = LaserFactory::new();
    match command {
        Command::Run => {}
        Command::LoadBehavior(name) => {
            if !resolver.load_behavior(&name, &mut scene) {
                bail!("no saved behavior `{name}`");
            }
        }
        Command::LoadBank(name) => {
            if !resolver.load_bank(&name, &mut scene) {
                bail!("no saved bank `{name}`");
            }
        }
        Command::SaveBank(name, members) => {
            if !resolver.save_bank(&name, &members) {
                bail!("could not save bank `{name}`");
            }
            return Ok(());
        }
        Command::SetDefault(pointer) => {
            if !resolver.set_default(&pointer) {
                bail!("could not make {pointer} the default");
            }
            return Ok(());
        }
        Command::QuickTest(preset) => {
            factory.quick_test(&mut resolver, &mut scene, &preset)?;
        }
        Command::List => {
            println!("behaviors: {}", resolver.list_behaviors().join(", "));
            println!("banks: {}", resolver.list_banks().join(", "));
            println!("default: {:?}", resolver.get_default());
            println!("scene default: {:?}", resolver.get_scene_default());
            println!("quick tests: {}", factory::QUICK_PRESETS.join(", "));
            return Ok(());
        }
        Command::Export => {
            println!("{}", resolver.export_json(&unix_timestamp())?);
            return Ok(());
        }
        Command::Import(file) => {
            let text = std::fs::read_to_string(&file).with_context(|| format!("reading {file}"))?;
            let (behaviors, banks) = resolver.import_json(&text)?;
            println!("imported {behaviors} behaviors, {banks} banks");
            return Ok(());
        }
        Command::ClearAll => {
            resolver.clear_all(&mut scene);
            return Ok(());
        }
    }

    let mut clock = FrameClock::new();
    let steps = (seconds / FIXED_DT).ceil() as u32;
    let mut next_report = 0.0;
    for _ in 0..steps {
        let (dt, elapsed) = clock.advance(FIXED_DT);
        if let Some(camera) = scene.camera_mut() {
            orbit_camera(camera, elapsed);
        }
        resolver.tick(dt, elapsed, &mut scene);

        if elapsed >= next_report {
            next_report += 1.0;
            let ids = resolver.engine().ids().join(", ");
            let points: usize = scene.beams().map(|b| b.path().len()).sum();
            log::info!(
                "t={elapsed:.1}s [{ids}] beams={} path points={points}",
                scene.beam_count()
            );
        }
    }

    if let Some(test) = factory.active_test() {
        log::info!("quick test `{test}` ran unsaved");
    }
    Ok(())
}
