use std::thread;

use crawl_core::{Actor, Command, Difficulty, Direction, Event, MonsterTurn, Position};
use crawl_session::{Input, Session, SessionExit, TurnDriver};
use crawl_world::{loader::WorldSource, query, World, WorldConfig};

fn world(map: &str) -> World {
    let blueprint = WorldSource::from_parts([("crypt", map)], "crypt")
        .parse()
        .expect("valid world");
    World::new(
        blueprint,
        WorldConfig {
            difficulty: Difficulty::NORMAL,
            seed: Some(11),
        },
    )
}

fn only_monster(world: &World) -> MonsterTurn {
    let turns = query::monster_turns(world);
    assert_eq!(turns.len(), 1);
    turns[0]
}

#[test]
fn rat_closes_in_then_attacks() {
    let mut world = world("#########\n#@..R...#\n#########");
    let mut driver = TurnDriver::new();
    let player = query::player(&world).character().position();
    let rat = only_monster(&world).monster;
    let mut distance = only_monster(&world).position.manhattan_distance(player);
    assert_eq!(distance, 3);

    let mut attacked = false;
    let mut events = Vec::new();
    for _ in 0..5 {
        events.clear();
        driver.tick(&mut world, &mut events);

        attacked = events.iter().any(|event| {
            matches!(
                event,
                Event::Attacked {
                    attacker: Actor::Monster(id),
                    defender: Actor::Player,
                    ..
                } if *id == rat
            )
        });
        if attacked {
            break;
        }

        let now = only_monster(&world).position.manhattan_distance(player);
        assert!(now < distance, "rat must get closer every tick");
        distance = now;
    }

    assert!(attacked);
    assert_eq!(distance, 1);
    assert_eq!(query::player(&world).character().position(), player);
    let last = query::current_level(&world)
        .expect("current level")
        .events()
        .chronological()
        .last();
    assert!(
        last.is_some_and(|entry| entry.starts_with("Rat attacked Wizard for ")),
        "{last:?}"
    );
}

#[test]
fn closed_door_leaves_monsters_idle() {
    let mut world = world("#######\n#@.|.B#\n#######");
    let mut driver = TurnDriver::new();
    let start = only_monster(&world).position;

    let mut events = Vec::new();
    for _ in 0..3 {
        driver.tick(&mut world, &mut events);
    }

    let bat = only_monster(&world);
    assert_eq!(bat.position, start);
    assert_eq!(bat.action_points, 4.5);
    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced { turn: 1 },
            Event::TimeAdvanced { turn: 2 },
            Event::TimeAdvanced { turn: 3 },
        ]
    );
}

#[test]
fn monsters_never_leave_walkable_tiles() {
    let mut world = world("##########\n#@.......#\n#.##.##..#\n#....S..R#\n##########");
    let mut driver = TurnDriver::new();

    let mut events = Vec::new();
    for _ in 0..20 {
        driver.tick(&mut world, &mut events);
        let level = query::current_level(&world).expect("level");
        for (position, _) in level.monsters() {
            assert!(level.is_walkable(*position));
        }
        let player = query::player(&world).character().position();
        assert!(level.is_walkable(player));
        assert!(level.monster_at(player).is_none());
    }
}

#[test]
fn session_thread_broadcasts_until_quit() {
    let (mut session, input) = Session::new(world("#####\n#@..#\n#####"), 8);
    let (_, snapshots) = session.register_viewer();
    let handle = thread::spawn(move || session.run());

    for _ in 0..2 {
        input
            .send(Input::Command(Command::MovePlayer {
                direction: Direction::East,
            }))
            .expect("session is running");
    }
    input.send(Input::Quit).expect("session is running");

    let received: Vec<_> = snapshots.iter().collect();
    let exit = handle.join().expect("session thread");

    assert_eq!(exit, SessionExit::Quit);
    assert_eq!(received.len(), 3);
    let last = received.last().expect("final snapshot");
    assert_eq!(last.turn, 2);
    assert_eq!(last.player.character().position(), Position::new(3, 1));
}
