//! Line-oriented keyboard input.

use std::{io::BufRead, sync::mpsc::SyncSender};

use anyhow::{bail, Context, Result};
use crawl_core::{Command, Difficulty, Direction, ItemId};
use crawl_session::{Input, ViewerId};
use tracing::{debug, warn};

/// Text printed by the `help` command.
pub(crate) const HELP: &str = "\
commands:
  n | s | e | w        move or attack (also north, south, east, west)
  use [item]           open the door or chest ahead, or use an inventory item
  take [item]          pick up one item, or everything on the tile
  equip <item>         equip or unequip an inventory item
  drop <item>          drop an inventory item
  difficulty <n>       set the density used by the next restart
  restart              rebuild every level
  close                close this viewer
  quit                 leave the game";

/// Parsed line of user input.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Line {
    /// Input forwarded to the session.
    Input(Input),
    /// Request to print [`HELP`].
    Help,
    /// Blank line.
    Empty,
}

/// Parses one line typed by the player on behalf of `viewer`.
pub(crate) fn parse_line(line: &str, viewer: ViewerId) -> Result<Line> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Line::Empty);
    };
    let argument = words.next();
    if let Some(extra) = words.next() {
        bail!("unexpected argument `{extra}`");
    }

    let command = match verb.to_ascii_lowercase().as_str() {
        "n" | "north" => Command::MovePlayer {
            direction: Direction::North,
        },
        "s" | "south" => Command::MovePlayer {
            direction: Direction::South,
        },
        "e" | "east" => Command::MovePlayer {
            direction: Direction::East,
        },
        "w" | "west" => Command::MovePlayer {
            direction: Direction::West,
        },
        "use" => Command::Interact {
            item: argument.map(item_id).transpose()?,
        },
        "take" => match argument {
            Some(item) => Command::TakeItem {
                item: item_id(item)?,
            },
            None => Command::TakeAll,
        },
        "equip" => Command::ToggleEquip {
            item: item_id(required(argument, verb)?)?,
        },
        "drop" => Command::Drop {
            item: item_id(required(argument, verb)?)?,
        },
        "difficulty" => {
            let value = required(argument, verb)?;
            let value = value
                .parse::<u32>()
                .with_context(|| format!("`{value}` is not a difficulty"))?;
            Command::SetDifficulty {
                difficulty: Difficulty::new(value),
            }
        }
        "restart" => Command::Restart,
        "close" => return Ok(Line::Input(Input::CloseViewer(viewer))),
        "q" | "quit" => return Ok(Line::Input(Input::Quit)),
        "?" | "help" => return Ok(Line::Help),
        other => bail!("unknown command `{other}`"),
    };
    Ok(Line::Input(Input::Command(command)))
}

fn required<'a>(argument: Option<&'a str>, verb: &str) -> Result<&'a str> {
    argument.with_context(|| format!("`{verb}` needs an item number"))
}

fn item_id(text: &str) -> Result<ItemId> {
    let value = text
        .trim_start_matches('#')
        .parse::<u32>()
        .with_context(|| format!("`{text}` is not an item number"))?;
    Ok(ItemId::new(value))
}

/// Forwards parsed lines to the session until input ends or the session
/// stops listening. End of input is reported as [`Input::Quit`].
pub(crate) fn forward_lines<R>(reader: R, inputs: &SyncSender<Input>, viewer: ViewerId)
where
    R: BufRead,
{
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!(%error, "failed to read input");
                break;
            }
        };
        match parse_line(&line, viewer) {
            Ok(Line::Input(input)) => {
                let stop = matches!(input, Input::Quit | Input::CloseViewer(_));
                if inputs.send(input).is_err() || stop {
                    return;
                }
            }
            Ok(Line::Help) => println!("{HELP}"),
            Ok(Line::Empty) => {}
            Err(error) => {
                debug!(%line, "rejected input");
                eprintln!("{error:#}");
            }
        }
    }
    let _ = inputs.send(Input::Quit);
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, sync::mpsc};

    use super::*;

    fn viewer() -> ViewerId {
        ViewerId::new(0)
    }

    fn command(line: &str) -> Command {
        match parse_line(line, viewer()).expect("valid line") {
            Line::Input(Input::Command(command)) => command,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn movement_and_item_commands_parse() {
        assert_eq!(
            command("E"),
            Command::MovePlayer {
                direction: Direction::East
            }
        );
        assert_eq!(command("use"), Command::Interact { item: None });
        assert_eq!(
            command("use #4"),
            Command::Interact {
                item: Some(ItemId::new(4))
            }
        );
        assert_eq!(command("take"), Command::TakeAll);
        assert_eq!(
            command("take 2"),
            Command::TakeItem {
                item: ItemId::new(2)
            }
        );
        assert_eq!(
            command("  drop 7 "),
            Command::Drop {
                item: ItemId::new(7)
            }
        );
        assert_eq!(
            command("difficulty 5"),
            Command::SetDifficulty {
                difficulty: Difficulty::new(5)
            }
        );
    }

    #[test]
    fn session_controls_parse() {
        let viewer = viewer();
        assert_eq!(
            parse_line("close", viewer).expect("valid"),
            Line::Input(Input::CloseViewer(viewer))
        );
        assert_eq!(parse_line("q", viewer).expect("valid"), Line::Input(Input::Quit));
        assert_eq!(parse_line("", viewer).expect("valid"), Line::Empty);
        assert_eq!(parse_line("help", viewer).expect("valid"), Line::Help);
    }

    #[test]
    fn malformed_lines_are_errors() {
        let viewer = viewer();
        for line in ["jump", "equip", "drop x", "take 1 2", "difficulty hard"] {
            assert!(parse_line(line, viewer).is_err(), "{line} should fail");
        }
    }

    #[test]
    fn end_of_input_quits() {
        let (sender, receiver) = mpsc::sync_channel(8);
        let reader = Cursor::new("e\nbogus\ntake\n");

        forward_lines(reader, &sender, viewer());

        let received: Vec<Input> = receiver.try_iter().collect();
        assert_eq!(
            received,
            vec![
                Input::Command(Command::MovePlayer {
                    direction: Direction::East
                }),
                Input::Command(Command::TakeAll),
                Input::Quit,
            ]
        );
    }
}
