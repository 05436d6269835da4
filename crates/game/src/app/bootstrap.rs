use std::env;
use std::fs;
use std::path::PathBuf;

use engine::{resolve_app_paths, AssetCatalog, InputSource, LoopConfig, GAME_REQUIRED_KEYS};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::GameplayScene;
use super::script::{parse_script, IdleInput, ScriptedInput};

const START_LEVEL_ENV_VAR: &str = "PYNINJA_START_LEVEL";
/// Run length when neither a script nor `--max-ticks` bounds the session.
const DEFAULT_IDLE_TICKS: u64 = 600;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GameOptions {
    pub(crate) script: Option<PathBuf>,
    pub(crate) level: Option<usize>,
    pub(crate) max_ticks: Option<u64>,
    pub(crate) realtime: bool,
    pub(crate) seed: u64,
    pub(crate) no_assets: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    Help,
    Run(GameOptions),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: GameplayScene,
    pub(crate) input: Box<dyn InputSource>,
}

pub(crate) fn parse_args(args: &[String]) -> Result<CliCommand, String> {
    let mut options = GameOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--script" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --script".to_string())?;
                options.script = Some(PathBuf::from(value));
                index += 2;
            }
            "--level" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --level".to_string())?;
                options.level = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("invalid --level value '{value}' (expected usize)"))?,
                );
                index += 2;
            }
            "--max-ticks" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --max-ticks".to_string())?;
                options.max_ticks = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid --max-ticks value '{value}' (expected u64)"))?,
                );
                index += 2;
            }
            "--seed" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --seed".to_string())?;
                options.seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid --seed value '{value}' (expected u64)"))?;
                index += 2;
            }
            "--realtime" => {
                options.realtime = true;
                index += 1;
            }
            "--no-assets" => {
                options.no_assets = true;
                index += 1;
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(CliCommand::Run(options))
}

pub(crate) fn usage_text() -> String {
    [
        "pyninja - platformer runner",
        "",
        "Usage:",
        "  pyninja [--script <file>] [--level <n>] [--max-ticks <u64>] [--seed <u64>] [--realtime] [--no-assets]",
        "",
        "Script lines:",
        "  <action>[+<action>...] [ticks]    actions: left right jump dash quit wait",
        "",
        "Environment:",
        "  PYNINJA_ROOT          project root (Cargo.toml plus crates/ or assets/)",
        "  PYNINJA_START_LEVEL   first level when --level is absent",
        "  RUST_LOG              log filter, default info",
    ]
    .join("\n")
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

pub(crate) fn build_app(options: GameOptions) -> Result<AppWiring, String> {
    info!("=== PyNinja Startup ===");

    let paths = resolve_app_paths().map_err(|err| err.to_string())?;
    info!(root = %paths.root.display(), "project_root_resolved");

    let assets = if options.no_assets {
        info!("asset_loading_skipped");
        AssetCatalog::default()
    } else {
        let assets = AssetCatalog::load_from_dir(&paths.images_dir).map_err(|err| err.to_string())?;
        assets
            .require(GAME_REQUIRED_KEYS)
            .map_err(|err| err.to_string())?;
        assets
    };

    let mut max_ticks = options.max_ticks;
    let input: Box<dyn InputSource> = match &options.script {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|err| format!("failed to read script {}: {err}", path.display()))?;
            let steps = parse_script(&content)
                .map_err(|err| format!("invalid script {}: {err}", path.display()))?;
            let scripted = ScriptedInput::new(steps);
            info!(
                path = %path.display(),
                ticks = scripted.total_ticks(),
                "script_loaded"
            );
            Box::new(scripted)
        }
        None => {
            max_ticks = Some(max_ticks.unwrap_or(DEFAULT_IDLE_TICKS));
            Box::new(IdleInput)
        }
    };

    let start_level = resolve_start_level(options.level, env::var(START_LEVEL_ENV_VAR).ok());
    let scene = GameplayScene::new(paths, assets, start_level, options.seed);
    let config = LoopConfig {
        max_ticks,
        realtime: options.realtime,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene,
        input,
    })
}

fn resolve_start_level(cli: Option<usize>, env_value: Option<String>) -> usize {
    if let Some(level) = cli {
        return level;
    }
    let Some(raw) = env_value else {
        return 0;
    };
    match raw.trim().parse::<usize>() {
        Ok(level) => level,
        Err(_) => {
            warn!(
                env_var = START_LEVEL_ENV_VAR,
                value = %raw,
                "invalid_start_level_ignored"
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parse_args_reads_every_flag() {
        let parsed = parse_args(&args(&[
            "--script",
            "runs/intro.txt",
            "--level",
            "2",
            "--max-ticks",
            "900",
            "--seed",
            "42",
            "--realtime",
            "--no-assets",
        ]))
        .expect("parse");

        assert_eq!(
            parsed,
            CliCommand::Run(GameOptions {
                script: Some(PathBuf::from("runs/intro.txt")),
                level: Some(2),
                max_ticks: Some(900),
                realtime: true,
                seed: 42,
                no_assets: true,
            })
        );
    }

    #[test]
    fn parse_args_defaults_and_help() {
        assert_eq!(
            parse_args(&[]).expect("parse"),
            CliCommand::Run(GameOptions::default())
        );
        assert_eq!(
            parse_args(&args(&["--seed", "1", "--help"])).expect("parse"),
            CliCommand::Help
        );
    }

    #[test]
    fn parse_args_rejects_bad_input() {
        assert_eq!(
            parse_args(&args(&["--level"])),
            Err("missing value for --level".to_string())
        );
        assert_eq!(
            parse_args(&args(&["--max-ticks", "-1"])),
            Err("invalid --max-ticks value '-1' (expected u64)".to_string())
        );
        assert_eq!(
            parse_args(&args(&["--fullscreen"])),
            Err("unknown argument '--fullscreen'".to_string())
        );
    }

    #[test]
    fn start_level_prefers_cli_then_env() {
        assert_eq!(resolve_start_level(Some(3), Some("1".to_string())), 3);
        assert_eq!(resolve_start_level(None, Some(" 1 ".to_string())), 1);
        assert_eq!(resolve_start_level(None, Some("first".to_string())), 0);
        assert_eq!(resolve_start_level(None, None), 0);
    }

    #[test]
    fn usage_lists_flags() {
        let usage = usage_text();
        for flag in ["--script", "--level", "--max-ticks", "--seed", "--realtime", "--no-assets"] {
            assert!(usage.contains(flag), "usage is missing {flag}");
        }
    }
}
