use std::env;
use std::path::PathBuf;

use bogle::file_format;
use bogle::{ExportConfig, SceneDump};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "usage:
  bake_scene <scene.json> <out.bgl> [--config <config.json>]
  bake_scene inspect <file.bgl>";

#[derive(Debug, PartialEq)]
enum Command {
    Bake {
        scene: PathBuf,
        output: PathBuf,
        config: Option<PathBuf>,
    },
    Inspect(PathBuf),
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    match args {
        [cmd, file] if cmd == "inspect" => Ok(Command::Inspect(file.into())),
        [scene, output, rest @ ..] => {
            let config = match rest {
                [] => None,
                [flag, path] if flag == "--config" => Some(path.into()),
                _ => return Err(USAGE.to_string()),
            };
            Ok(Command::Bake {
                scene: scene.into(),
                output: output.into(),
                config,
            })
        }
        _ => Err(USAGE.to_string()),
    }
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Inspect(path) => {
            let summary = file_format::read_scene(&path)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Bake {
            scene,
            output,
            config,
        } => {
            let config = match config {
                Some(path) => ExportConfig::from_json_file(&path)?,
                None => ExportConfig::default(),
            };
            info!("baking {} -> {}", scene.display(), output.display());
            let dump = SceneDump::from_json_file(&scene)?;
            bogle::bake_to_file(&dump, &config, &output)?;
        }
    }
    Ok(())
}
