use crawl_core::{Command, Event};
use crawl_system_monster_ai::MonsterAi;
use crawl_system_pathfinding::Pathfinder;
use crawl_world::{apply, query, World};
use tracing::debug;

/// Runs a player command followed by one round of monster turns.
#[derive(Debug, Default)]
pub struct TurnDriver {
    pathfinder: Pathfinder,
    ai: MonsterAi,
    commands: Vec<Command>,
}

impl TurnDriver {
    /// Creates a driver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `command`, then advances the clock and lets every monster act.
    pub fn process(&mut self, world: &mut World, command: Command, out_events: &mut Vec<Event>) {
        apply(world, command, out_events);
        self.tick(world, out_events);
    }

    /// Grants action points and plays each monster of the current level in
    /// spawn order. The round ends early when a monster kills the player.
    pub fn tick(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        apply(world, Command::Tick, out_events);

        let player = query::player(world).character().position();
        for turn in query::monster_turns(world) {
            let path = self.pathfinder.find_path(turn.position, player, |position| {
                position == player || query::is_open(world, position)
            });
            if path.is_empty() {
                debug!(monster = turn.monster.get(), "no route to the player");
                continue;
            }

            self.commands.clear();
            self.ai.handle(
                &turn,
                player,
                &path,
                |position| query::is_occupied(world, position),
                &mut self.commands,
            );

            for command in self.commands.drain(..) {
                let first = out_events.len();
                apply(world, command, out_events);
                if out_events[first..].contains(&Event::PlayerDied) {
                    return;
                }
            }
        }
    }
}
