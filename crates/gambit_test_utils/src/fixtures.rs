//! Test fixtures and helpers.
//!
//! Pre-built rosters, teams and gambits for consistent testing.

use std::sync::Arc;

use gambit_core::gambit::Gambit;
use gambit_core::status::{Roster, Side, Status};
use gambit_core::team::{Team, TeamId};
use gambit_core::unit::Unit;

/// Build a team from templates of `side` in `roster`.
///
/// # Panics
///
/// Panics if an id is missing from the roster or `ids` is empty.
#[must_use]
pub fn team_from_roster(roster: &Roster, id: u32, side: Side, ids: &[u32]) -> Team {
    let units = ids
        .iter()
        .map(|&status| Unit::new(roster.get(side, status).expect("status in roster")))
        .collect();
    Team::new(TeamId(id), units).expect("non-empty team")
}

/// The standard three players against the standard three monsters.
#[must_use]
pub fn standard_teams() -> Vec<Team> {
    let roster = Roster::standard();
    vec![
        team_from_roster(&roster, 0, Side::Player, &[0, 1, 2]),
        team_from_roster(&roster, 1, Side::Monster, &[0, 1, 2]),
    ]
}

/// One gambit per standard team: cunning players, naive monsters.
#[must_use]
pub fn standard_gambits() -> Vec<Gambit> {
    vec![Gambit::Cunning, Gambit::Naive]
}

/// A single-unit template with speed 10.
#[must_use]
pub fn unit(side: Side, life: u32, attack: u32, defence: u32) -> Unit {
    Unit::new(Arc::new(Status::new(side, 0, "fixture", life, attack, defence, 10)))
}

/// Two one-unit teams with ids 0 and 1.
///
/// # Panics
///
/// Never; both teams hold exactly one unit.
#[must_use]
pub fn duel(a: Unit, b: Unit) -> Vec<Team> {
    vec![
        Team::new(TeamId(0), vec![a]).expect("one unit"),
        Team::new(TeamId(1), vec![b]).expect("one unit"),
    ]
}

/// A player team of `size` identical units facing a monster team of the same size.
///
/// # Panics
///
/// Panics if `size` is zero.
#[must_use]
pub fn mirror_match(size: usize, life: u32, attack: u32, defence: u32) -> Vec<Team> {
    let side = |side| {
        (0..size)
            .map(|_| unit(side, life, attack, defence))
            .collect::<Vec<_>>()
    };
    vec![
        Team::new(TeamId(0), side(Side::Player)).expect("non-empty team"),
        Team::new(TeamId(1), side(Side::Monster)).expect("non-empty team"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_teams() {
        let teams = standard_teams();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].len(), 3);
        assert_eq!(teams[1].units()[2].status().name, "ogre");
        assert_eq!(standard_gambits().len(), teams.len());
    }

    #[test]
    fn test_mirror_match() {
        let teams = mirror_match(4, 10, 5, 5);
        assert_eq!(teams[0].len(), 4);
        assert_eq!(teams[1].units()[3].side(), Side::Monster);
    }
}
