use crawl_core::{
    Actor, Command, Difficulty, Direction, Event, ItemId, ItemStats, Position, RejectionReason,
};
use crawl_world::{apply, level::Level, loader::WorldSource, query, World, WorldConfig};

const HALL: &str = "#########\n#@ps|...#\n#.t.#####\n#########";
const DEN: &str = "######\n#.R..#\n######";
const LINKS: &str = "hall\nhall, 7, 1, den, 1, 1\n";

fn world() -> World {
    let blueprint = WorldSource::from_parts([("hall", HALL), ("den", DEN)], LINKS)
        .parse()
        .expect("valid world");
    World::new(
        blueprint,
        WorldConfig {
            difficulty: Difficulty::NORMAL,
            seed: Some(7),
        },
    )
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn walk(world: &mut World, direction: Direction) -> Vec<Event> {
    run(world, Command::MovePlayer { direction })
}

fn level(world: &World) -> &Level {
    query::current_level(world).expect("current level")
}

fn player_position(world: &World) -> Position {
    query::player(world).character().position()
}

fn first_item(world: &World, at: Position) -> ItemId {
    level(world).items_at(at)[0].id()
}

fn rejected(reason: RejectionReason) -> Vec<Event> {
    vec![Event::CommandRejected { reason }]
}

#[test]
fn walls_block_movement() {
    let mut world = world();

    let events = walk(&mut world, Direction::North);

    assert!(events.is_empty());
    assert_eq!(player_position(&world), Position::new(1, 1));
    assert_eq!(query::player(&world).facing(), Direction::North);
}

#[test]
fn closed_doors_block_sight_and_seen_tiles_persist() {
    let mut world = world();
    let beyond = Position::new(5, 1);
    assert!(level(&world).tile(Position::new(1, 1)).expect("tile").is_visible());
    assert!(!level(&world).tile(beyond).expect("tile").is_seen());

    let _ = walk(&mut world, Direction::East);
    let _ = walk(&mut world, Direction::East);
    assert_eq!(
        run(&mut world, Command::Interact { item: None }),
        vec![Event::DoorOpened {
            at: Position::new(4, 1)
        }]
    );
    let door = level(&world).tile(Position::new(4, 1)).expect("door");
    assert!(door.is_walkable());
    assert!(door.is_actionable());
    assert!(level(&world).tile(beyond).expect("tile").is_visible());

    assert_eq!(
        run(&mut world, Command::Interact { item: None }),
        vec![Event::DoorClosed {
            at: Position::new(4, 1)
        }]
    );
    let _ = walk(&mut world, Direction::West);

    let tile = level(&world).tile(beyond).expect("tile");
    assert!(!tile.is_visible());
    assert!(tile.is_seen());
    assert!(level(&world)
        .tiles()
        .all(|(_, tile)| !tile.is_visible() || tile.is_seen()));
}

#[test]
fn potions_are_picked_up_and_consumed() {
    let mut world = world();
    let _ = walk(&mut world, Direction::East);
    let at = player_position(&world);
    let potion = first_item(&world, at);

    assert_eq!(
        run(&mut world, Command::TakeItem { item: potion }),
        vec![Event::ItemPickedUp { item: potion }]
    );
    assert!(level(&world).items_at(at).is_empty());
    assert_eq!(
        run(&mut world, Command::ToggleEquip { item: potion }),
        rejected(RejectionReason::NotEquipable)
    );

    assert_eq!(
        run(&mut world, Command::Interact { item: Some(potion) }),
        vec![Event::PotionConsumed {
            item: potion,
            healed: 0
        }]
    );
    assert!(query::player(&world).character().inventory().is_empty());
    let log: Vec<&str> = level(&world).events().chronological().collect();
    assert_eq!(
        log,
        vec!["Wizard picked up: Small Potion", "Wizard consumed Small Potion"]
    );
}

#[test]
fn items_move_between_ground_and_inventory() {
    let mut world = world();
    let _ = walk(&mut world, Direction::East);
    let at = player_position(&world);
    let potion = first_item(&world, at);

    assert_eq!(
        run(&mut world, Command::TakeAll),
        vec![Event::ItemPickedUp { item: potion }]
    );
    assert_eq!(
        run(&mut world, Command::TakeItem { item: potion }),
        rejected(RejectionReason::ItemNotOnTile)
    );
    assert_eq!(
        run(&mut world, Command::Drop { item: potion }),
        vec![Event::ItemDropped { item: potion, at }]
    );
    assert_eq!(
        run(&mut world, Command::Drop { item: potion }),
        rejected(RejectionReason::ItemNotHeld)
    );
    assert_eq!(level(&world).items_at(at)[0].position(), at);
}

#[test]
fn equipping_adds_and_removes_stats() {
    let mut world = world();
    let _ = walk(&mut world, Direction::East);
    let _ = walk(&mut world, Direction::East);
    let at = player_position(&world);
    let sword = first_item(&world, at);
    let bonus = level(&world).items_at(at)[0]
        .as_equipable()
        .expect("equipable")
        .stats();
    let _ = run(&mut world, Command::TakeItem { item: sword });

    assert_eq!(
        run(&mut world, Command::ToggleEquip { item: sword }),
        vec![Event::ItemEquipped { item: sword }]
    );
    let base = ItemStats::new(1, 4, 0, 5.0);
    assert_eq!(query::player(&world).character().stats(), base.combined(bonus));
    assert_eq!(query::player(&world).character().equipped().len(), 1);

    assert_eq!(
        run(&mut world, Command::ToggleEquip { item: sword }),
        vec![Event::ItemUnequipped { item: sword }]
    );
    assert_eq!(query::player(&world).character().stats(), base);
    assert_eq!(query::player(&world).character().inventory().len(), 1);
}

#[test]
fn chest_contents_spill_onto_its_tile() {
    let mut world = world();
    let _ = walk(&mut world, Direction::South);
    assert!(walk(&mut world, Direction::East).is_empty());

    let at = Position::new(2, 2);
    let chest = first_item(&world, at);
    let count = level(&world).items_at(at)[0]
        .as_openable()
        .expect("openable")
        .contents()
        .len();
    assert!(count <= 3);

    assert_eq!(
        run(&mut world, Command::Interact { item: None }),
        vec![Event::ChestOpened {
            chest,
            at,
            spilled: count
        }]
    );
    let stack = level(&world).items_at(at);
    assert_eq!(stack.len(), count + 1);
    let opened = stack[0].as_openable().expect("openable");
    assert!(opened.is_opened());
    assert!(opened.contents().is_empty());
    let tile = level(&world).tile(at).expect("tile");
    assert!(tile.is_walkable());
    assert!(!tile.is_actionable());

    assert_eq!(
        run(&mut world, Command::Interact { item: Some(chest) }),
        rejected(RejectionReason::NoAction)
    );
    let _ = walk(&mut world, Direction::East);
    assert_eq!(player_position(&world), at);
    assert_eq!(
        run(&mut world, Command::TakeItem { item: chest }),
        rejected(RejectionReason::NotPortable)
    );
    let picked = run(&mut world, Command::TakeAll);
    assert_eq!(picked.len(), count);
    assert_eq!(level(&world).items_at(at).len(), 1);
}

fn enter_den(world: &mut World) -> Vec<Event> {
    let _ = walk(world, Direction::East);
    let _ = walk(world, Direction::East);
    let _ = run(world, Command::TakeAll);
    let _ = run(world, Command::Interact { item: None });
    for _ in 0..3 {
        let _ = walk(world, Direction::East);
    }
    walk(world, Direction::East)
}

#[test]
fn portals_move_the_player_and_carry_the_log() {
    let mut world = world();

    let events = enter_den(&mut world);

    assert_eq!(
        events,
        vec![Event::PortalTraversed {
            from_level: "hall".to_owned(),
            to_level: "den".to_owned(),
            to: Position::new(1, 1),
        }]
    );
    assert_eq!(query::level_name(&world), "den");
    assert_eq!(player_position(&world), Position::new(1, 1));
    let log: Vec<&str> = level(&world).events().chronological().collect();
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with("Wizard picked up: "));
    assert!(level(&world).tile(Position::new(1, 1)).expect("tile").is_visible());
}

#[test]
fn bumping_a_monster_attacks_until_it_dies() {
    let mut world = world();
    let _ = enter_den(&mut world);
    let rat_tile = Position::new(2, 1);
    let rat = level(&world).monster_at(rat_tile).expect("rat").id();

    let mut killed = None;
    for _ in 0..10 {
        let events = walk(&mut world, Direction::East);
        assert!(matches!(
            events.first(),
            Some(Event::Attacked {
                attacker: Actor::Player,
                defender: Actor::Monster(id),
                ..
            }) if *id == rat
        ));
        if let Some(Event::MonsterKilled { dropped, .. }) = events.get(1) {
            killed = Some(*dropped);
            break;
        }
    }

    let dropped = killed.expect("rat dies within ten blows");
    assert!(level(&world).monster_at(rat_tile).is_none());
    assert_eq!(level(&world).items_at(rat_tile).len(), dropped);
    assert_eq!(player_position(&world), Position::new(1, 1));
    assert_eq!(
        level(&world).events().chronological().last(),
        Some("Wizard killed Rat")
    );
}

#[test]
fn monster_commands_respect_action_points() {
    let mut world = world();
    let _ = enter_den(&mut world);
    let rat = level(&world)
        .monster_at(Position::new(2, 1))
        .expect("rat")
        .id();

    assert_eq!(
        run(&mut world, Command::StepMonster {
            monster: rat,
            to: Position::new(3, 1)
        }),
        rejected(RejectionReason::StepBlocked)
    );
    assert_eq!(
        run(&mut world, Command::Tick),
        vec![Event::TimeAdvanced { turn: 1 }]
    );

    let events = run(&mut world, Command::MonsterAttack { monster: rat });
    let Some(Event::Attacked { damage, .. }) = events.first() else {
        panic!("expected an attack, got {events:?}");
    };
    assert_eq!(query::player(&world).character().health(), 50 - damage);

    assert_eq!(
        run(&mut world, Command::StepMonster {
            monster: rat,
            to: Position::new(1, 1)
        }),
        rejected(RejectionReason::StepBlocked)
    );
    assert_eq!(
        run(&mut world, Command::StepMonster {
            monster: rat,
            to: Position::new(3, 1)
        }),
        vec![Event::MonsterMoved {
            monster: rat,
            from: Position::new(2, 1),
            to: Position::new(3, 1)
        }]
    );
    assert_eq!(
        run(&mut world, Command::MonsterAttack { monster: rat }),
        rejected(RejectionReason::StepBlocked)
    );
}

#[test]
fn player_death_rebuilds_the_world() {
    let mut world = world();
    let _ = enter_den(&mut world);
    let rat = level(&world)
        .monster_at(Position::new(2, 1))
        .expect("rat")
        .id();

    let mut died = false;
    'turns: for _ in 0..60 {
        let _ = run(&mut world, Command::Tick);
        for _ in 0..2 {
            let events = run(&mut world, Command::MonsterAttack { monster: rat });
            if events.contains(&Event::PlayerDied) {
                assert_eq!(events.last(), Some(&Event::WorldRestarted));
                died = true;
                break 'turns;
            }
        }
    }

    assert!(died);
    assert_eq!(query::level_name(&world), "hall");
    assert_eq!(player_position(&world), Position::new(1, 1));
    assert_eq!(query::player(&world).character().health(), 50);
}

#[test]
fn difficulty_applies_on_restart() {
    let mut world = world();
    let before = level(&world).items().len();

    assert_eq!(
        run(&mut world, Command::SetDifficulty {
            difficulty: Difficulty::new(100)
        }),
        vec![Event::DifficultyChanged {
            difficulty: Difficulty::new(100)
        }]
    );
    assert_eq!(level(&world).items().len(), before);

    let _ = walk(&mut world, Direction::East);
    assert_eq!(run(&mut world, Command::Restart), vec![Event::WorldRestarted]);

    assert_eq!(player_position(&world), Position::new(1, 1));
    assert!(level(&world).items().len() > before);
    assert!(level(&world).items_at(Position::new(1, 1)).is_empty());
}

#[test]
fn crowded_levels_keep_portal_tiles_clear() {
    const CORRIDOR: &str = "#######\n#@....#\n#######";
    const CAVE: &str = "########\n#......#\n########";
    let arrival = Position::new(1, 1);

    for seed in 0..200 {
        let blueprint = WorldSource::from_parts(
            [("corridor", CORRIDOR), ("cave", CAVE)],
            "corridor\ncorridor, 2, 1, cave, 1, 1\n",
        )
        .parse()
        .expect("valid world");
        let mut world = World::new(
            blueprint,
            WorldConfig {
                difficulty: Difficulty::new(50),
                seed: Some(seed),
            },
        );

        let events = walk(&mut world, Direction::East);

        assert!(
            matches!(events.as_slice(), [Event::PortalTraversed { .. }]),
            "seed {seed}: {events:?}"
        );
        assert_eq!(query::level_name(&world), "cave");
        assert_eq!(player_position(&world), arrival);
        assert!(level(&world).is_walkable(arrival), "seed {seed}");
        assert!(level(&world).monster_at(arrival).is_none(), "seed {seed}");
        assert!(level(&world).items_at(arrival).is_empty(), "seed {seed}");
    }
}
