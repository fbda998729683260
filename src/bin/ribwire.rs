use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ribwire::{ExportConfig, Exporter, RibAsciiEmitter, SceneInput};

#[derive(Parser, Debug)]
#[command(name = "ribwire", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report the static/animated decision for every object in a scene.
    Inspect(InspectArgs),
    /// Emit a RIB ASCII parameter dump for the scene.
    Dump(DumpArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input scene-sample JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Motion/deformation samples per object.
    #[arg(long, default_value_t = 1)]
    motion_samples: usize,

    /// Float comparison tolerance.
    #[arg(long, default_value_t = ribwire::DEFAULT_EPSILON)]
    epsilon: f32,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Input scene-sample JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Only dump the object with this path.
    #[arg(long)]
    object: Option<String>,

    /// Motion/deformation samples per object.
    #[arg(long, default_value_t = 1)]
    motion_samples: usize,

    /// Float comparison tolerance.
    #[arg(long, default_value_t = ribwire::DEFAULT_EPSILON)]
    epsilon: f32,

    /// Re-declare default texture coordinates facevarying.
    #[arg(long)]
    face_varying_uvs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Dump(args) => cmd_dump(args),
    }
}

fn read_scene(path: &Path) -> anyhow::Result<SceneInput> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let scene = SceneInput::from_json_reader(BufReader::new(f))
        .with_context(|| format!("parse scene '{}'", path.display()))?;
    Ok(scene)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let mut exporter = Exporter::new(ExportConfig {
        motion_samples: args.motion_samples,
        epsilon: args.epsilon,
        ..ExportConfig::default()
    })?;
    let handles = exporter.ingest(&scene)?;
    for handle in handles {
        let record = exporter
            .registry()
            .record(handle)
            .context("stale record handle")?;
        let plan = exporter.motion_plan(handle)?;
        println!(
            "{}\t{}\t{}",
            record.identity(),
            record.kind().kind_name(),
            if plan.is_animated() { "animated" } else { "static" }
        );
    }
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let config = ExportConfig {
        motion_samples: args.motion_samples,
        epsilon: args.epsilon,
        face_varying_uvs: args.face_varying_uvs,
        ..ExportConfig::default()
    };
    let escape = config.escape_strings;
    let mut exporter = Exporter::new(config)?;
    let handles = exporter.ingest(&scene)?;

    let mut emitter = RibAsciiEmitter::new(escape);
    for handle in handles {
        let record = exporter
            .registry()
            .record(handle)
            .context("stale record handle")?;
        if let Some(filter) = &args.object
            && &record.identity().path != filter
        {
            continue;
        }
        exporter.emit_object(handle, &mut emitter)?;
    }
    print!("{}", emitter.into_string());
    Ok(())
}
