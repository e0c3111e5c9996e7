//! Executable actions.
//!
//! A [`Command`] knows which units it may target and how it resolves.
//! Only [`Command::Attack`] exists today; new actions are new variants.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::log::{HitRecord, StatSnapshot, TurnLog};
use crate::team::{find_unit, find_unit_mut, Team};
use crate::unit::{Unit, UnitKey};

/// How many units a command affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetScope {
    /// A single unit.
    Unit,
    /// A group of units.
    Group,
    /// A whole team.
    Team,
    /// Every unit.
    All,
}

/// Command tag written into logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Plain attack.
    Attack,
}

/// An action a unit can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Hit one enemy.
    Attack,
}

/// Expected damage of an attack: `max((attack - defence / 2) / 2, 0)`.
///
/// Integer floor division throughout.
#[must_use]
pub const fn estimate_damage(attack: u32, defence: u32) -> u32 {
    attack.saturating_sub(defence / 2) / 2
}

/// Inclusive bounds of a damage roll around `base`.
#[must_use]
pub const fn damage_bounds(base: u32) -> (u32, u32) {
    let base = base as u64;
    ((base * 7 / 8) as u32, (base * 9 / 8) as u32)
}

/// Roll damage uniformly in [`damage_bounds`] of the estimate.
pub fn sample_damage<R: Rng + ?Sized>(attack: u32, defence: u32, rng: &mut R) -> u32 {
    let (low, high) = damage_bounds(estimate_damage(attack, defence));
    rng.gen_range(low..=high)
}

impl Command {
    /// Commands every unit may use.
    #[must_use]
    pub fn available() -> Vec<Command> {
        vec![Command::Attack]
    }

    /// Log tag.
    #[must_use]
    pub const fn kind(self) -> CommandKind {
        match self {
            Command::Attack => CommandKind::Attack,
        }
    }

    /// Target scope.
    #[must_use]
    pub const fn target_scope(self) -> TargetScope {
        match self {
            Command::Attack => TargetScope::Unit,
        }
    }

    /// Legal targets among `units`, in input order.
    #[must_use]
    pub fn targets<'a>(self, source: &Unit, units: &[&'a Unit]) -> Vec<&'a Unit> {
        match self {
            Command::Attack => units
                .iter()
                .copied()
                .filter(|u| source.can_attack(u))
                .collect(),
        }
    }

    /// Resolve the command against `targets` and append one log per hit.
    ///
    /// The caller narrows `targets` to the intended count.
    pub fn execute<R: Rng + ?Sized>(
        self,
        turn_id: u32,
        order: u32,
        source: UnitKey,
        targets: &[UnitKey],
        teams: &mut [Team],
        logs: &mut Vec<TurnLog>,
        rng: &mut R,
    ) -> Result<()> {
        match self {
            Command::Attack => attack(turn_id, order, source, targets, teams, logs, rng),
        }
    }
}

fn attack<R: Rng + ?Sized>(
    turn_id: u32,
    order: u32,
    source_key: UnitKey,
    targets: &[UnitKey],
    teams: &mut [Team],
    logs: &mut Vec<TurnLog>,
    rng: &mut R,
) -> Result<()> {
    let source = find_unit(teams, source_key)?.clone();
    let source_snapshot = StatSnapshot::observe(&source);

    for &target_key in targets {
        let target = find_unit_mut(teams, target_key)?;

        let damage = sample_damage(source.attack(), target.defence(), rng);
        let damage_cumsum = target.damage_taken() + damage;
        target.apply_damage(damage);
        let defeated = !target.is_alive();

        debug!(
            source = %source,
            target = %target,
            damage,
            defeated,
            "Attack"
        );

        let hit = HitRecord {
            turn_id,
            order,
            command: CommandKind::Attack,
            source_id: source.id(),
            source_side: source.side(),
            target_id: target.id(),
            target_side: target.side(),
            damage,
            damage_cumsum,
            defeated,
        };
        logs.push(TurnLog::new(
            hit,
            source_snapshot,
            StatSnapshot::observe(target),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use crate::status::{Side, Status};
    use crate::team::TeamId;
    use std::sync::Arc;

    fn team(id: u32, side: Side, stats: &[(u32, u32, u32)]) -> Team {
        let units = stats
            .iter()
            .enumerate()
            .map(|(i, &(life, attack, defence))| {
                Unit::new(Arc::new(Status::new(
                    side, i as u32, "u", life, attack, defence, 10,
                )))
            })
            .collect();
        Team::new(TeamId(id), units).unwrap()
    }

    fn key(team: u32, slot: usize) -> UnitKey {
        UnitKey {
            team: TeamId(team),
            slot,
        }
    }

    #[test]
    fn test_estimate_damage() {
        assert_eq!(estimate_damage(50, 0), 25);
        assert_eq!(estimate_damage(65, 24), 26); // (65 - 12) / 2
        assert_eq!(estimate_damage(10, 40), 0);
        assert_eq!(estimate_damage(0, 0), 0);
        assert_eq!(estimate_damage(21, 1), 10); // defence 1 halves to 0
    }

    #[test]
    fn test_damage_bounds() {
        assert_eq!(damage_bounds(0), (0, 0));
        assert_eq!(damage_bounds(8), (7, 9));
        assert_eq!(damage_bounds(26), (22, 29));
    }

    #[test]
    fn test_sample_damage_in_bounds() {
        let mut rng = seeded(11);
        for _ in 0..500 {
            let d = sample_damage(122, 37, &mut rng);
            assert!((45..=58).contains(&d)); // base 52
        }
    }

    #[test]
    fn test_attack_scope() {
        assert_eq!(Command::Attack.target_scope(), TargetScope::Unit);
        assert_eq!(Command::Attack.kind(), CommandKind::Attack);
    }

    #[test]
    fn test_targets_only_living_enemies() {
        let mut teams = vec![
            team(0, Side::Player, &[(10, 5, 5), (10, 5, 5)]),
            team(1, Side::Monster, &[(10, 5, 5), (10, 5, 5), (10, 5, 5)]),
        ];
        teams[1].unit_mut(1).unwrap().apply_damage(10);

        let units: Vec<&Unit> = crate::team::all_units(&teams).collect();
        let source = teams[0].unit(0).unwrap();
        let targets = Command::Attack.targets(source, &units);

        let keys: Vec<UnitKey> = targets.iter().map(|u| u.key()).collect();
        assert_eq!(keys, vec![key(1, 0), key(1, 2)]);
    }

    #[test]
    fn test_execute_logs_and_damages() {
        let mut teams = vec![
            team(0, Side::Player, &[(100, 50, 0)]),
            team(1, Side::Monster, &[(100, 0, 0)]),
        ];
        let mut logs = Vec::new();
        let mut rng = seeded(5);

        Command::Attack
            .execute(1, 0, key(0, 0), &[key(1, 0)], &mut teams, &mut logs, &mut rng)
            .unwrap();
        Command::Attack
            .execute(1, 1, key(0, 0), &[key(1, 0)], &mut teams, &mut logs, &mut rng)
            .unwrap();

        assert_eq!(logs.len(), 2);
        let first = &logs[0];
        assert!((21..=28).contains(&first.damage)); // base 25
        assert_eq!(first.damage_cumsum, first.damage);
        assert_eq!(first.source_atk, Some(50));
        assert_eq!(first.source_hp, Some(100));
        assert_eq!(first.target_hp, None);

        let second = &logs[1];
        assert_eq!(second.damage_cumsum, first.damage + second.damage);
        let target = teams[1].unit(0).unwrap();
        assert_eq!(target.current_life(), 100 - second.damage_cumsum);
    }

    #[test]
    fn test_execute_marks_defeat() {
        let mut teams = vec![
            team(0, Side::Monster, &[(100, 200, 0)]),
            team(1, Side::Player, &[(5, 0, 0)]),
        ];
        let mut logs = Vec::new();

        Command::Attack
            .execute(
                2,
                3,
                key(0, 0),
                &[key(1, 0)],
                &mut teams,
                &mut logs,
                &mut seeded(0),
            )
            .unwrap();

        let log = &logs[0];
        assert!(log.defeated);
        assert_eq!(log.target_hp, Some(0));
        assert_eq!(log.source_hp, None);
        assert_eq!((log.turn_id, log.order), (2, 3));
        assert!(!teams[1].alive());
    }

    #[test]
    fn test_execute_unknown_target() {
        let mut teams = vec![team(0, Side::Player, &[(10, 10, 10)])];
        let result = Command::Attack.execute(
            1,
            0,
            key(0, 0),
            &[key(3, 0)],
            &mut teams,
            &mut Vec::new(),
            &mut seeded(0),
        );
        assert!(result.is_err());
    }
}
