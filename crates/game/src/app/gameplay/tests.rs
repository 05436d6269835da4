use std::fs;

use engine::{DrawList, GridPos, GridTile, TileKind, Tilemap};

use super::*;

fn grid(kind: TileKind, variant: u32, x: i32, y: i32) -> GridTile {
    GridTile {
        kind,
        variant,
        pos: GridPos::new(x, y),
    }
}

fn floor_with(extra: Vec<GridTile>) -> Tilemap {
    let floor = (0..10).map(|x| grid(TileKind::Grass, 1, x, 1));
    Tilemap::from_parts(16, floor.chain(extra), Vec::new()).expect("tilemap")
}

fn project_with(maps: Vec<Tilemap>) -> (tempfile::TempDir, AppPaths) {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::under(dir.path().to_path_buf());
    fs::create_dir_all(&paths.maps_dir).expect("maps dir");
    for (index, map) in maps.iter().enumerate() {
        map.save(&paths.level_map(index)).expect("save map");
    }
    (dir, paths)
}

fn one_enemy_map() -> Tilemap {
    floor_with(vec![
        grid(TileKind::Spawners, 0, 1, 0),
        grid(TileKind::Spawners, 1, 3, 0),
    ])
}

fn dash() -> InputSnapshot {
    InputSnapshot::empty().with_action_down(InputAction::Dash, true)
}

#[test]
fn load_without_maps_fails() {
    let (_dir, paths) = project_with(Vec::new());
    let mut scene = GameplayScene::new(paths, AssetCatalog::default(), 0, 0);

    let err = scene.load().expect_err("no maps");
    assert!(matches!(err, SceneError::NoLevels { .. }));
}

#[test]
fn level_count_stops_at_first_gap() {
    let (_dir, paths) = project_with(vec![floor_with(Vec::new()), floor_with(Vec::new())]);
    floor_with(Vec::new())
        .save(&paths.level_map(3))
        .expect("save detached map");
    assert_eq!(count_levels(&paths), 2);
}

#[test]
fn out_of_range_start_level_clamps_to_last_map() {
    let (_dir, paths) = project_with(vec![floor_with(Vec::new()), floor_with(Vec::new())]);
    let mut scene = GameplayScene::new(paths, AssetCatalog::default(), 9, 0);

    scene.load().expect("load");
    assert_eq!(scene.level_index(), 1);
    assert_eq!(scene.debug_title().as_deref(), Some("PyNinja | level 2/2"));
}

#[test]
fn clearing_a_level_advances_to_the_next_map() {
    let (_dir, paths) = project_with(vec![
        one_enemy_map(),
        floor_with(vec![grid(TileKind::Spawners, 0, 5, 0)]),
    ]);
    let mut scene = GameplayScene::new(paths, AssetCatalog::default(), 0, 11);
    scene.load().expect("load");

    scene.update(&dash());
    let mut ticks = 1;
    while scene.level_index() == 0 {
        assert_eq!(scene.update(&InputSnapshot::empty()), SceneCommand::None);
        ticks += 1;
        assert!(ticks < 120, "level never advanced");
    }

    let level = scene.level().expect("level");
    assert_eq!(level.player().body.pos, Vec2::new(80.0, 0.0));
    assert!(level.enemies().is_empty());
    assert!(scene.sounds().played() >= 2);

    for _ in 0..100 {
        scene.update(&InputSnapshot::empty());
    }
    assert_eq!(scene.level_index(), 1);
}

#[test]
fn clearing_the_last_level_replays_it() {
    let (_dir, paths) = project_with(vec![one_enemy_map()]);
    let mut scene = GameplayScene::new(paths, AssetCatalog::default(), 0, 11);
    scene.load().expect("load");

    scene.update(&dash());
    let mut saw_clear = false;
    for _ in 0..120 {
        scene.update(&InputSnapshot::empty());
        let enemies = scene.level().expect("level").enemies().len();
        if enemies == 0 {
            saw_clear = true;
        } else if saw_clear {
            break;
        }
    }

    assert!(saw_clear);
    assert_eq!(scene.level_index(), 0);
    assert_eq!(scene.level().expect("level").enemies().len(), 1);
}

#[test]
fn death_reloads_the_current_map() {
    let empty = Tilemap::from_parts(16, [grid(TileKind::Spawners, 0, 0, 0)], Vec::new())
        .expect("tilemap");
    let (_dir, paths) = project_with(vec![empty]);
    let mut scene = GameplayScene::new(paths, AssetCatalog::default(), 0, 0);
    scene.load().expect("load");

    let mut ticks = 0;
    while scene.reloads() == 0 {
        scene.update(&InputSnapshot::empty());
        ticks += 1;
        assert!(ticks < 400, "level never reloaded");
    }

    assert_eq!(ticks, 120 + 41);
    let level = scene.level().expect("level");
    assert!(!level.is_player_dead());
    assert_eq!(level.player().body.pos, Vec2::ZERO);
}

#[test]
fn camera_follows_player_and_render_uses_its_offset() {
    let (_dir, paths) = project_with(vec![floor_with(vec![grid(TileKind::Spawners, 0, 1, 0)])]);
    let mut scene = GameplayScene::new(paths, AssetCatalog::default(), 0, 0);
    scene.load().expect("load");

    let center = scene.level().expect("level").player().rect().center();
    assert_eq!(
        scene.camera().position,
        Vec2::new(center.x - 160.0, center.y - 120.0)
    );

    let mut draw = DrawList::default();
    scene.render(&mut draw);
    assert_eq!(draw.len(), 10 + 1);

    scene.unload();
    assert!(scene.level().is_none());
    assert_eq!(scene.update(&InputSnapshot::empty()), SceneCommand::Quit);
}
