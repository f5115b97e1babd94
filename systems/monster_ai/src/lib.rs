#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns a monster's action points and path into commands.

use crawl_core::{Command, MonsterTurn, Position};

/// Monster AI system that plans the steps a monster may take this tick.
#[derive(Debug, Default)]
pub struct MonsterAi {
    scratch: Vec<Command>,
}

impl MonsterAi {
    /// Creates a new monster AI system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::StepMonster` entries along `path` followed, when the
    /// player is reached, by a single `Command::MonsterAttack`.
    ///
    /// `path` must start at the monster's tile and end at the player. One
    /// command is planned per whole action point. Planning stops early at
    /// the first tile for which `is_occupied` returns true.
    pub fn handle<F>(
        &mut self,
        turn: &MonsterTurn,
        player: Position,
        path: &[Position],
        is_occupied: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(Position) -> bool,
    {
        if path.len() < 2 || path.first() != Some(&turn.position) {
            return;
        }

        let budget = whole_action_points(turn.action_points);
        if budget == 0 {
            return;
        }

        self.scratch.clear();

        for next in path.iter().skip(1).take(budget) {
            if *next == player {
                self.scratch.push(Command::MonsterAttack {
                    monster: turn.monster,
                });
                break;
            }
            if is_occupied(*next) {
                break;
            }
            self.scratch.push(Command::StepMonster {
                monster: turn.monster,
                to: *next,
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn whole_action_points(action_points: f64) -> usize {
    if action_points.is_nan() || action_points < 1.0 {
        return 0;
    }
    action_points.floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawl_core::MonsterId;
    use crawl_system_pathfinding::Pathfinder;

    fn turn_at(position: Position, action_points: f64) -> MonsterTurn {
        MonsterTurn {
            monster: MonsterId::new(3),
            position,
            action_points,
        }
    }

    fn corridor(from: i32, to: i32) -> Vec<Position> {
        (from..=to).map(|x| Position::new(x, 0)).collect()
    }

    #[test]
    fn steps_are_limited_by_whole_action_points() {
        let mut ai = MonsterAi::new();
        let path = corridor(0, 5);
        let mut out = Vec::new();

        ai.handle(
            &turn_at(Position::new(0, 0), 2.5),
            Position::new(5, 0),
            &path,
            |_| false,
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::StepMonster {
                    monster: MonsterId::new(3),
                    to: Position::new(1, 0),
                },
                Command::StepMonster {
                    monster: MonsterId::new(3),
                    to: Position::new(2, 0),
                },
            ],
        );
    }

    #[test]
    fn reaching_the_player_attacks_and_discards_remaining_steps() {
        let mut ai = MonsterAi::new();
        let path = corridor(0, 2);
        let mut out = Vec::new();

        ai.handle(
            &turn_at(Position::new(0, 0), 4.0),
            Position::new(2, 0),
            &path,
            |_| false,
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::StepMonster {
                    monster: MonsterId::new(3),
                    to: Position::new(1, 0),
                },
                Command::MonsterAttack {
                    monster: MonsterId::new(3),
                },
            ],
        );
    }

    #[test]
    fn occupied_tile_halts_the_plan() {
        let mut ai = MonsterAi::new();
        let path = corridor(0, 4);
        let blocker = Position::new(2, 0);
        let mut out = Vec::new();

        ai.handle(
            &turn_at(Position::new(0, 0), 3.0),
            Position::new(4, 0),
            &path,
            |position| position == blocker,
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::StepMonster {
                monster: MonsterId::new(3),
                to: Position::new(1, 0),
            }],
        );
    }

    #[test]
    fn fractional_budget_and_missing_path_are_idle() {
        let mut ai = MonsterAi::new();
        let mut out = Vec::new();

        ai.handle(
            &turn_at(Position::new(0, 0), 0.75),
            Position::new(3, 0),
            &corridor(0, 3),
            |_| false,
            &mut out,
        );
        ai.handle(
            &turn_at(Position::new(0, 0), 5.0),
            Position::new(3, 0),
            &[],
            |_| false,
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn plans_follow_pathfinder_output() {
        let mut pathfinder = Pathfinder::new();
        let wall = Position::new(1, 0);
        let path = pathfinder.find_path(Position::new(0, 0), Position::new(2, 0), |position| {
            (0..3).contains(&position.x()) && (0..2).contains(&position.y()) && position != wall
        });
        let mut ai = MonsterAi::new();
        let mut out = Vec::new();

        ai.handle(
            &turn_at(Position::new(0, 0), 1.0),
            Position::new(2, 0),
            &path,
            |_| false,
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::StepMonster {
                monster: MonsterId::new(3),
                to: Position::new(0, 1),
            }],
        );
    }
}
