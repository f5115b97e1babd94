//! Command handlers behind [`crate::apply`].

use crawl_core::{
    Actor, Direction, Event, ItemId, LastEvent, MonsterId, Position, RejectionReason,
};
use crawl_system_combat::{resolve_attack, AttackOutcome, AttackProfile};
use crawl_system_visibility::Visibility;
use rand::Rng;
use tracing::{debug, error, info};

use crate::{
    character::{Character, EquipOutcome, Player},
    level::{LastAttack, Level, Portal},
    tile::Overlay,
    World,
};

enum Step {
    Attack,
    Blocked,
    Portal(Portal),
    Walk,
}

pub(crate) fn move_player(world: &mut World, direction: Direction, out: &mut Vec<Event>) {
    world.player.face(direction);
    let from = world.player.character().position();
    let target = from.step(direction);

    let step = {
        let Some(level) = world.levels.get(&world.current) else {
            return;
        };
        if level.monster_at(target).is_some() {
            Step::Attack
        } else if !level.can_walk(target) {
            Step::Blocked
        } else if let Some(portal) = level.portal_at(target) {
            Step::Portal(portal.clone())
        } else {
            Step::Walk
        }
    };

    match step {
        Step::Attack => player_attack(world, target, out),
        Step::Blocked => debug!(?direction, "player bumped into an obstacle"),
        Step::Portal(portal) => traverse(world, &portal, out),
        Step::Walk => {
            let World {
                levels,
                current,
                player,
                visibility,
                ..
            } = world;
            let Some(level) = levels.get_mut(current.as_str()) else {
                return;
            };
            player.character_mut().set_position(target);
            level.set_last_event(LastEvent::Move);
            refresh_view(level, player, visibility, true);
            out.push(Event::PlayerMoved { from, to: target });
        }
    }
}

fn traverse(world: &mut World, portal: &Portal, out: &mut Vec<Event>) {
    let Some(events) = world
        .levels
        .get(&world.current)
        .map(|level| level.events().clone())
    else {
        return;
    };
    let World {
        levels,
        current,
        player,
        visibility,
        ..
    } = world;
    let Some(destination) = levels.get_mut(portal.level()) else {
        error!(level = portal.level(), "portal leads to a missing level");
        return;
    };

    if !destination.can_walk(portal.position()) {
        debug!(level = portal.level(), "portal exit is blocked");
        return;
    }

    destination.adopt_events(events);
    player.character_mut().set_position(portal.position());
    refresh_view(destination, player, visibility, false);

    let from_level = std::mem::replace(current, portal.level().to_owned());
    info!(from = %from_level, to = portal.level(), "portal traversed");
    out.push(Event::PortalTraversed {
        from_level,
        to_level: portal.level().to_owned(),
        to: portal.position(),
    });
}

fn player_attack(world: &mut World, target: Position, out: &mut Vec<Event>) {
    let World {
        levels,
        current,
        player,
        rng,
        ..
    } = world;
    let Some(level) = levels.get_mut(current.as_str()) else {
        return;
    };
    let Some(monster) = level.monsters_mut().get_mut(&target) else {
        return;
    };

    let outcome = strike(player.character_mut(), monster.character_mut(), rng);
    let defender = Actor::Monster(monster.id());
    let defender_name = monster.character().name().to_owned();
    let killed = !monster.character().is_alive();

    record_attack(
        level,
        player.character().name(),
        &defender_name,
        defender,
        outcome,
        killed,
    );
    out.push(Event::Attacked {
        attacker: Actor::Player,
        defender,
        damage: outcome.damage,
        critical: outcome.critical,
    });

    if killed {
        kill_monster(level, target, out);
    }
}

pub(crate) fn monster_attack(world: &mut World, monster: MonsterId, out: &mut Vec<Event>) {
    let player_died = {
        let World {
            levels,
            current,
            player,
            rng,
            ..
        } = world;
        let Some(level) = levels.get_mut(current.as_str()) else {
            return;
        };
        let player_position = player.character().position();
        let Some((&position, attacker)) = level
            .monsters_mut()
            .iter_mut()
            .find(|(_, candidate)| candidate.id() == monster)
        else {
            reject(out, RejectionReason::MissingMonster);
            return;
        };
        if position.manhattan_distance(player_position) != 1
            || attacker.character().action_points() < 1.0
        {
            reject(out, RejectionReason::StepBlocked);
            return;
        }

        let outcome = strike(attacker.character_mut(), player.character_mut(), rng);
        let attacker_name = attacker.character().name().to_owned();
        let killed = !player.character().is_alive();

        record_attack(
            level,
            &attacker_name,
            player.character().name(),
            Actor::Player,
            outcome,
            killed,
        );
        out.push(Event::Attacked {
            attacker: Actor::Monster(monster),
            defender: Actor::Player,
            damage: outcome.damage,
            critical: outcome.critical,
        });
        killed
    };

    if player_died {
        info!(turn = world.turn, "player died, rebuilding the world");
        out.push(Event::PlayerDied);
        world.rebuild();
        out.push(Event::WorldRestarted);
    }
}

fn strike<R>(attacker: &mut Character, defender: &mut Character, rng: &mut R) -> AttackOutcome
where
    R: Rng + ?Sized,
{
    attacker.spend_action_point();
    let profile = AttackProfile::from(attacker.stats());
    let outcome = resolve_attack(&profile, defender.stats().armor, rng);
    defender.take_damage(outcome.damage);
    outcome
}

fn record_attack(
    level: &mut Level,
    attacker: &str,
    defender_name: &str,
    defender: Actor,
    outcome: AttackOutcome,
    killed: bool,
) {
    let entry = if killed {
        format!("{attacker} killed {defender_name}")
    } else {
        format!("{attacker} attacked {defender_name} for {}", outcome.damage)
    };
    debug!(%entry, critical = outcome.critical, "attack resolved");
    level.record(entry);
    level.set_last_event(LastEvent::Attack);
    level.set_last_attack(LastAttack {
        damage: outcome.damage,
        critical: outcome.critical,
        defender,
    });
}

fn kill_monster(level: &mut Level, at: Position, out: &mut Vec<Event>) {
    let Some(mut monster) = level.monsters_mut().remove(&at) else {
        return;
    };
    let loot = monster.character_mut().drain_inventory();
    let dropped = loot.len();
    if dropped > 0 {
        let stack = level.stack_mut(at);
        for mut item in loot {
            item.set_position(at);
            stack.push(item);
        }
    }
    info!(monster = monster.id().get(), dropped, "monster killed");
    out.push(Event::MonsterKilled {
        monster: monster.id(),
        at,
        dropped,
    });
}

pub(crate) fn step_monster(
    world: &mut World,
    monster: MonsterId,
    to: Position,
    out: &mut Vec<Event>,
) {
    let player_position = world.player.character().position();
    let Some(level) = world.levels.get_mut(&world.current) else {
        return;
    };
    let Some(from) = level
        .monsters()
        .iter()
        .find(|(_, candidate)| candidate.id() == monster)
        .map(|(position, _)| *position)
    else {
        reject(out, RejectionReason::MissingMonster);
        return;
    };

    let ready = level
        .monster_at(from)
        .is_some_and(|walker| walker.character().action_points() >= 1.0);
    if !ready
        || from.manhattan_distance(to) != 1
        || to == player_position
        || !level.can_walk(to)
    {
        reject(out, RejectionReason::StepBlocked);
        return;
    }

    let Some(mut walker) = level.monsters_mut().remove(&from) else {
        return;
    };
    let character = walker.character_mut();
    character.set_position(to);
    character.spend_action_point();
    let _ = level.monsters_mut().insert(to, walker);
    out.push(Event::MonsterMoved { monster, from, to });
}

pub(crate) fn tick(world: &mut World, out: &mut Vec<Event>) {
    world.turn = world.turn.saturating_add(1);
    if let Some(level) = world.levels.get_mut(&world.current) {
        for monster in level.monsters_mut().values_mut() {
            monster.character_mut().gain_action_points();
        }
    }
    world.player.character_mut().gain_action_points();
    out.push(Event::TimeAdvanced { turn: world.turn });
}

pub(crate) fn interact(world: &mut World, item: Option<ItemId>, out: &mut Vec<Event>) {
    let front = world.player.front();
    let own = world.player.character().position();

    match item {
        None => {
            let Some(level) = world.levels.get(&world.current) else {
                return;
            };
            let overlay = level.tile(front).and_then(|tile| tile.overlay());
            if matches!(overlay, Some(Overlay::ClosedDoor | Overlay::OpenDoor)) {
                toggle_door(world, front, out);
            } else if let Some(chest) = unopened_chest(level, front) {
                open_chest(world, front, chest, out);
            } else {
                debug!(?front, "nothing to interact with");
            }
        }
        Some(item) => {
            if world.player.character().holds(item).is_some() {
                consume_potion(world, item, out);
                return;
            }
            let Some(level) = world.levels.get(&world.current) else {
                return;
            };
            let location = [front, own].into_iter().find(|position| {
                level
                    .items_at(*position)
                    .iter()
                    .any(|candidate| candidate.id() == item)
            });
            match location {
                Some(at) => open_chest(world, at, item, out),
                None => reject(out, RejectionReason::ItemNotHeld),
            }
        }
    }
}

fn unopened_chest(level: &Level, at: Position) -> Option<ItemId> {
    level.items_at(at).iter().find_map(|item| {
        item.as_openable()
            .filter(|openable| !openable.is_opened())
            .map(|_| item.id())
    })
}

fn toggle_door(world: &mut World, at: Position, out: &mut Vec<Event>) {
    let World {
        levels,
        current,
        player,
        visibility,
        ..
    } = world;
    let Some(level) = levels.get_mut(current.as_str()) else {
        return;
    };
    let occupied = level.monster_at(at).is_some();
    let Some(tile) = level.tile_mut(at) else {
        return;
    };

    let (tag, event) = match tile.overlay() {
        Some(Overlay::ClosedDoor) => {
            tile.set_overlay(Overlay::OpenDoor);
            tile.set_walkable(true);
            (LastEvent::DoorOpen, Event::DoorOpened { at })
        }
        Some(Overlay::OpenDoor) if !occupied => {
            tile.set_overlay(Overlay::ClosedDoor);
            tile.set_walkable(false);
            (LastEvent::DoorClose, Event::DoorClosed { at })
        }
        Some(Overlay::OpenDoor) => {
            debug!(?at, "doorway is blocked by a monster");
            return;
        }
        _ => return,
    };

    level.set_last_event(tag);
    refresh_view(level, player, visibility, false);
    out.push(event);
}

fn open_chest(world: &mut World, at: Position, chest: ItemId, out: &mut Vec<Event>) {
    let World {
        levels,
        current,
        player,
        visibility,
        ..
    } = world;
    let Some(level) = levels.get_mut(current.as_str()) else {
        return;
    };

    if !level.items_at(at).iter().any(|candidate| candidate.id() == chest) {
        reject(out, RejectionReason::NoAction);
        return;
    }
    let contents = {
        let Some(openable) = level
            .stack_mut(at)
            .iter_mut()
            .find(|candidate| candidate.id() == chest)
            .and_then(|candidate| candidate.as_openable_mut())
        else {
            reject(out, RejectionReason::NoAction);
            return;
        };
        if openable.is_opened() {
            reject(out, RejectionReason::NoAction);
            return;
        }
        openable.open()
    };

    let spilled = contents.len();
    let stack = level.stack_mut(at);
    for mut item in contents {
        item.set_position(at);
        stack.push(item);
    }
    if let Some(tile) = level.tile_mut(at) {
        tile.set_walkable(true);
        tile.set_actionable(false);
    }

    level.record(format!("{} opened Treasure Chest", player.character().name()));
    level.set_last_event(LastEvent::OpenChest);
    refresh_view(level, player, visibility, false);
    info!(?at, spilled, "chest opened");
    out.push(Event::ChestOpened { chest, at, spilled });
}

fn consume_potion(world: &mut World, item: ItemId, out: &mut Vec<Event>) {
    let World {
        levels,
        current,
        player,
        ..
    } = world;
    let Some(level) = levels.get_mut(current.as_str()) else {
        return;
    };
    let Some(size) = player
        .character()
        .holds(item)
        .and_then(|held| held.as_consumable())
        .map(|consumable| consumable.potion_size())
    else {
        reject(out, RejectionReason::NoAction);
        return;
    };

    let character = player.character_mut();
    let amount = (f64::from(character.max_health()) * size.heal_fraction()) as i32;
    let healed = character.heal(amount);
    let _ = character.remove_from_inventory(item);

    level.record(format!(
        "{} consumed {} Potion",
        character.name(),
        size.label()
    ));
    level.set_last_event(LastEvent::ConsumePotion);
    out.push(Event::PotionConsumed { item, healed });
}

pub(crate) fn take_item(world: &mut World, item: ItemId, out: &mut Vec<Event>) {
    let World {
        levels,
        current,
        player,
        ..
    } = world;
    let Some(level) = levels.get_mut(current.as_str()) else {
        return;
    };
    let at = player.character().position();
    let Some(index) = level
        .items_at(at)
        .iter()
        .position(|candidate| candidate.id() == item)
    else {
        reject(out, RejectionReason::ItemNotOnTile);
        return;
    };
    if level.items_at(at).get(index).is_some_and(|candidate| !candidate.is_portable()) {
        reject(out, RejectionReason::NotPortable);
        return;
    }
    pick_up(level, player, at, index, out);
}

pub(crate) fn take_all(world: &mut World, out: &mut Vec<Event>) {
    let World {
        levels,
        current,
        player,
        ..
    } = world;
    let Some(level) = levels.get_mut(current.as_str()) else {
        return;
    };
    let at = player.character().position();
    for index in (0..level.items_at(at).len()).rev() {
        if level.items_at(at).get(index).is_some_and(|item| item.is_portable()) {
            pick_up(level, player, at, index, out);
        }
    }
}

fn pick_up(
    level: &mut Level,
    player: &mut Player,
    at: Position,
    index: usize,
    out: &mut Vec<Event>,
) {
    let Some(id) = level.items_at(at).get(index).map(|item| item.id()) else {
        return;
    };
    if player.character().inventory_full() {
        level.record("Inventory full".to_owned());
        out.push(Event::InventoryFull { item: id });
        return;
    }
    let Some(item) = level.take_from_stack(at, index) else {
        return;
    };

    let entry = format!(
        "{} picked up: {}",
        player.character().name(),
        item.display_name()
    );
    player.character_mut().carry(item);
    level.record(entry);
    level.set_last_event(LastEvent::Pickup);
    out.push(Event::ItemPickedUp { item: id });
}

pub(crate) fn drop_item(world: &mut World, item: ItemId, out: &mut Vec<Event>) {
    let World {
        levels,
        current,
        player,
        ..
    } = world;
    let Some(level) = levels.get_mut(current.as_str()) else {
        return;
    };
    let at = player.character().position();
    let Some(mut dropped) = player.character_mut().remove_from_inventory(item) else {
        reject(out, RejectionReason::ItemNotHeld);
        return;
    };

    dropped.set_position(at);
    let entry = format!(
        "{} dropped {}",
        player.character().name(),
        dropped.display_name()
    );
    level.stack_mut(at).push(dropped);
    level.record(entry);
    level.set_last_event(LastEvent::DropItem);
    out.push(Event::ItemDropped { item, at });
}

pub(crate) fn toggle_equip(world: &mut World, item: ItemId, out: &mut Vec<Event>) {
    match world.player.character_mut().toggle_equip(item) {
        EquipOutcome::Equipped => out.push(Event::ItemEquipped { item }),
        EquipOutcome::Unequipped => out.push(Event::ItemUnequipped { item }),
        EquipOutcome::InventoryFull => {
            if let Some(level) = world.levels.get_mut(world.current.as_str()) {
                level.record("Inventory full".to_owned());
            }
            out.push(Event::InventoryFull { item });
        }
        EquipOutcome::SlotOccupied(location) => {
            debug!(?location, "equipment slot already taken");
            out.push(Event::SlotOccupied { item, location });
        }
        EquipOutcome::NotEquipable => reject(out, RejectionReason::NotEquipable),
        EquipOutcome::NotHeld => reject(out, RejectionReason::ItemNotHeld),
    }
}

fn reject(out: &mut Vec<Event>, reason: RejectionReason) {
    error!(?reason, "command rejected");
    out.push(Event::CommandRejected { reason });
}

/// Recomputes the field of view, optionally clearing visibility first.
pub(crate) fn refresh_view(
    level: &mut Level,
    player: &Player,
    visibility: &mut Visibility,
    clear: bool,
) {
    if clear {
        for tile in level.tiles_mut() {
            tile.hide();
        }
    }

    let character = player.character();
    let revealed = visibility.compute(
        character.position(),
        character.sight_range(),
        level.width(),
        level.height(),
        |position| level.is_walkable(position),
    );
    for position in revealed {
        if let Some(tile) = level.tile_mut(*position) {
            tile.reveal();
        }
    }
}
