use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine::{
    AssetCatalog, DrawCommand, DrawList, EditorState, MapError, Palette, TileKind, Tilemap, Vec2,
};
use thiserror::Error;
use tracing::{info, warn};

/// Variant counts of the stock tile sheets, used when the editor runs without assets.
pub const FALLBACK_VARIANTS: [(TileKind, usize); 5] = [
    (TileKind::Grass, 9),
    (TileKind::Stone, 9),
    (TileKind::Decor, 4),
    (TileKind::LargeDecor, 3),
    (TileKind::Spawners, 2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    On,
    Off,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Select { kind: TileKind, variant: u32 },
    NextGroup,
    PrevGroup,
    NextVariant,
    PrevVariant,
    Grid(GridMode),
    Place(Vec2),
    Remove(Vec2),
    AutoTile,
    Draw(Option<Vec2>),
    Info,
    Save,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("failed to read script {}: {source}", path.display())]
    ReadScript {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("palette has nothing selected; load tile assets or run with --no-assets")]
    EmptyPalette,
    #[error(
        "{} could not be loaded, so pending edits were not written over it; fix the file or add an explicit save",
        path.display()
    )]
    UnsavedOverUnreadableMap { path: PathBuf },
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let parts = line.split_whitespace().collect::<Vec<_>>();
    let Some((name, args)) = parts.split_first() else {
        return Err("empty command".to_string());
    };

    let command = match *name {
        "select" => {
            let [kind, variant] = args else {
                return Err("select takes <type> <variant>".to_string());
            };
            let kind = TileKind::from_asset_key(kind)
                .ok_or_else(|| format!("unknown tile type '{kind}'"))?;
            let variant = variant
                .parse::<u32>()
                .map_err(|_| format!("invalid variant '{variant}' (expected u32)"))?;
            Command::Select { kind, variant }
        }
        "group" => match args {
            ["next"] => Command::NextGroup,
            ["prev"] => Command::PrevGroup,
            _ => return Err("group takes next or prev".to_string()),
        },
        "variant" => match args {
            ["next"] => Command::NextVariant,
            ["prev"] => Command::PrevVariant,
            _ => return Err("variant takes next or prev".to_string()),
        },
        "grid" => match args {
            ["on"] => Command::Grid(GridMode::On),
            ["off"] => Command::Grid(GridMode::Off),
            [] | ["toggle"] => Command::Grid(GridMode::Toggle),
            _ => return Err("grid takes on, off or toggle".to_string()),
        },
        "place" => Command::Place(parse_point(name, args)?),
        "remove" => Command::Remove(parse_point(name, args)?),
        "draw" => match args {
            [] => Command::Draw(None),
            _ => Command::Draw(Some(parse_point(name, args)?)),
        },
        "autotile" => no_args(name, args, Command::AutoTile)?,
        "info" => no_args(name, args, Command::Info)?,
        "save" => no_args(name, args, Command::Save)?,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

fn no_args(name: &str, args: &[&str], command: Command) -> Result<Command, String> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(format!("{name} takes no arguments"))
    }
}

fn parse_point(name: &str, args: &[&str]) -> Result<Vec2, String> {
    let [x, y] = args else {
        return Err(format!("{name} takes <x> <y> in world pixels"));
    };
    let x = parse_coordinate("x", x)?;
    let y = parse_coordinate("y", y)?;
    Ok(Vec2::new(x, y))
}

fn parse_coordinate(axis: &str, raw: &str) -> Result<f32, String> {
    raw.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid {axis} '{raw}' (expected finite number)"))
}

/// One command per line; blank lines and `#` comments are skipped.
pub fn parse_script_commands(content: &str) -> Result<Vec<Command>, CommandError> {
    let mut commands = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let command = parse_command(trimmed).map_err(|message| CommandError::Parse {
            line: index + 1,
            message,
        })?;
        commands.push(command);
    }
    Ok(commands)
}

pub fn read_script(path: &Path) -> Result<Vec<Command>, CommandError> {
    let content = fs::read_to_string(path).map_err(|source| CommandError::ReadScript {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script_commands(&content)
}

/// An editor bound to one map file.
pub struct Session {
    state: EditorState,
    map_path: PathBuf,
    /// The file exists but did not load. Only an explicit `save` may replace it.
    unreadable_map: bool,
}

impl Session {
    /// Opens `map_path`, or starts an empty map when it cannot be loaded.
    pub fn open(map_path: PathBuf, assets: AssetCatalog, no_assets: bool) -> Self {
        let mut state = if no_assets {
            EditorState::with_palette(Tilemap::default(), assets, Palette::new(FALLBACK_VARIANTS))
        } else {
            EditorState::new(Tilemap::default(), assets)
        };
        let unreadable_map = match state.load_or_keep(&map_path) {
            Ok(()) => {
                info!(
                    path = %map_path.display(),
                    grid_tiles = state.tilemap().grid_tile_count(),
                    offgrid_tiles = state.tilemap().offgrid_tiles().len(),
                    "map_opened"
                );
                false
            }
            Err(err) => !err.is_not_found(),
        };
        Self {
            state,
            map_path,
            unreadable_map,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn map_path(&self) -> &Path {
        &self.map_path
    }

    pub fn apply(&mut self, command: &Command, out: &mut dyn Write) -> Result<(), CommandError> {
        match *command {
            Command::Select { kind, variant } => {
                if !self.state.palette_mut().select(kind, variant) {
                    warn!(kind = %kind, variant, "palette_selection_rejected");
                }
            }
            Command::NextGroup => self.state.palette_mut().next_group(),
            Command::PrevGroup => self.state.palette_mut().prev_group(),
            Command::NextVariant => self.state.palette_mut().next_variant(),
            Command::PrevVariant => self.state.palette_mut().prev_variant(),
            Command::Grid(GridMode::On) => self.state.set_on_grid(true),
            Command::Grid(GridMode::Off) => self.state.set_on_grid(false),
            Command::Grid(GridMode::Toggle) => {
                self.state.toggle_grid();
            }
            Command::Place(pointer) => {
                if !self.state.place(pointer) {
                    return Err(CommandError::EmptyPalette);
                }
            }
            Command::Remove(pointer) => {
                let removed = self.state.remove(pointer);
                writeln!(out, "removed {removed}")?;
            }
            Command::AutoTile => {
                let updated = self.state.auto_tile();
                writeln!(out, "autotiled {updated}")?;
            }
            Command::Draw(pointer) => {
                let mut draw = DrawList::default();
                self.state.render(&mut draw, Vec2::ZERO, pointer);
                for command in draw.commands() {
                    writeln!(out, "{}", describe_draw(command))?;
                }
            }
            Command::Info => writeln!(out, "{}", self.summary())?,
            Command::Save => {
                self.state.save(&self.map_path)?;
                self.unreadable_map = false;
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        let tilemap = self.state.tilemap();
        let selection = self
            .state
            .palette()
            .selection()
            .map_or_else(|| "none".to_string(), |(kind, variant)| format!("{kind}:{variant}"));
        format!(
            "map={} tile_size={} grid_tiles={} offgrid_tiles={} selection={} mode={} changed={}",
            self.map_path.display(),
            tilemap.tile_size(),
            tilemap.grid_tile_count(),
            tilemap.offgrid_tiles().len(),
            selection,
            if self.state.is_on_grid() { "grid" } else { "offgrid" },
            self.state.is_changed(),
        )
    }

    /// Saves if anything changed since the last save. Returns whether a write happened.
    pub fn finish(&mut self) -> Result<bool, CommandError> {
        if !self.state.is_changed() {
            return Ok(false);
        }
        if self.unreadable_map {
            warn!(path = %self.map_path.display(), "implicit_save_refused");
            return Err(CommandError::UnsavedOverUnreadableMap {
                path: self.map_path.clone(),
            });
        }
        self.state.save(&self.map_path)?;
        Ok(true)
    }
}

fn describe_draw(command: &DrawCommand) -> String {
    match command {
        DrawCommand::Sprite {
            key,
            index,
            screen_pos,
            flip_x,
        } => format!(
            "sprite {key} {index} at {} {}{}",
            screen_pos.x,
            screen_pos.y,
            if *flip_x { " flipped" } else { "" }
        ),
        DrawCommand::RectOutline { rect, color } => format!(
            "rect {} {} {} {} rgb({},{},{})",
            rect.x, rect.y, rect.w, rect.h, color.0, color.1, color.2
        ),
    }
}

/// Applies every command, then saves pending changes.
pub fn run_commands(
    session: &mut Session,
    commands: &[Command],
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    for command in commands {
        session.apply(command, out)?;
    }
    if session.finish()? {
        info!(path = %session.map_path().display(), "editor_changes_saved");
    }
    Ok(())
}
