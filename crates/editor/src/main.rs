use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use editor::{parse_command, read_script, run_commands, Command, Session};
use engine::{resolve_app_paths, AssetCatalog, EDITOR_REQUIRED_KEYS};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct EditorOptions {
    map: Option<PathBuf>,
    no_assets: bool,
}

fn main() -> ExitCode {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        eprintln!("{}", usage_text());
        return ExitCode::from(2);
    }
    if args[0] == "-h" || args[0] == "--help" {
        println!("{}", usage_text());
        return ExitCode::SUCCESS;
    }

    init_tracing();
    match run_cli(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(error = %message, "editor_failed");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(args: &[String]) -> Result<(), String> {
    let mut options = EditorOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--map" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --map".to_string())?;
                options.map = Some(PathBuf::from(value));
                index += 2;
            }
            "--no-assets" => {
                options.no_assets = true;
                index += 1;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];
    let commands: Vec<Command> = match command {
        "script" => {
            let [path] = command_args else {
                return Err("script requires exactly one file path".to_string());
            };
            read_script(&PathBuf::from(path)).map_err(|err| err.to_string())?
        }
        _ => {
            let line = args[index..].join(" ");
            vec![parse_command(&line)?]
        }
    };

    let (map_path, assets) = open_project(&options)?;
    info!(map = %map_path.display(), commands = commands.len(), "editor_started");
    let mut session = Session::open(map_path, assets, options.no_assets);
    run_commands(&mut session, &commands, &mut io::stdout()).map_err(|err| err.to_string())
}

fn open_project(options: &EditorOptions) -> Result<(PathBuf, AssetCatalog), String> {
    if options.no_assets {
        if let Some(map) = &options.map {
            return Ok((map.clone(), AssetCatalog::default()));
        }
    }

    let paths = resolve_app_paths().map_err(|err| err.to_string())?;
    let map_path = options.map.clone().unwrap_or_else(|| paths.level_map(0));
    if options.no_assets {
        return Ok((map_path, AssetCatalog::default()));
    }

    let assets = AssetCatalog::load_from_dir(&paths.images_dir).map_err(|err| err.to_string())?;
    assets
        .require(EDITOR_REQUIRED_KEYS)
        .map_err(|err| err.to_string())?;
    Ok((map_path, assets))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn usage_text() -> String {
    [
        "pyeditor - command-line map editor",
        "",
        "Usage:",
        "  pyeditor [--map <file>] [--no-assets] <command...>",
        "  pyeditor [--map <file>] [--no-assets] script <file>",
        "",
        "Commands:",
        "  select <type> <variant>    pick a palette entry (grass, stone, decor, large_decor, spawners)",
        "  group next|prev            cycle tile group",
        "  variant next|prev          cycle variant within the group",
        "  grid [on|off|toggle]       grid or free placement",
        "  place <x> <y>              place the selection at a world pixel",
        "  remove <x> <y>             remove tiles under a world pixel",
        "  autotile                   fix grass and stone variants",
        "  draw [<x> <y>]             print draw calls, with a placement ghost",
        "  info                       print map summary",
        "  save                       write the map now",
        "",
        "Defaults:",
        "  --map maps/0.json under the project root",
        "  pending changes are saved when the commands finish",
    ]
    .join("\n")
}
