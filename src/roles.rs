//! Role assignment: pick the impostor(s) uniformly at random.
//!
//! Uses sampling without replacement so the selected set is uniform over all
//! C(n, k) subsets. A comparator-based shuffle on random keys is not uniform
//! on every sort implementation, so it is deliberately not used here.

use crate::error::{SessionError, SessionResult};
use crate::types::{Player, PlayerId, PlayerRole};
use rand::Rng;
use std::collections::HashSet;

/// Minimum roster sizes per impostor count.
pub const MIN_PLAYERS_ONE_IMPOSTOR: usize = 3;
pub const MIN_PLAYERS_TWO_IMPOSTORS: usize = 5;

/// Result of a role assignment. Pure value; the caller persists it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAssignment {
    pub impostor_ids: HashSet<PlayerId>,
    pub players: Vec<Player>,
}

/// Roster minimum for the given impostor count.
pub fn required_players(impostor_count: u8) -> SessionResult<usize> {
    match impostor_count {
        1 => Ok(MIN_PLAYERS_ONE_IMPOSTOR),
        2 => Ok(MIN_PLAYERS_TWO_IMPOSTORS),
        other => Err(SessionError::Validation(format!(
            "impostor count must be 1 or 2, got {other}"
        ))),
    }
}

/// Assign `impostor_count` impostors over `players`, everyone else civilian.
///
/// Every size-`impostor_count` subset of the roster is equally likely.
pub fn assign<R: Rng + ?Sized>(
    players: &[Player],
    impostor_count: u8,
    rng: &mut R,
) -> SessionResult<RoleAssignment> {
    let required = required_players(impostor_count)?;
    if players.len() < required {
        return Err(SessionError::InsufficientPlayers {
            required,
            actual: players.len(),
        });
    }

    let picked: HashSet<usize> = rand::seq::index::sample(rng, players.len(), impostor_count as usize)
        .into_iter()
        .collect();

    let mut impostor_ids = HashSet::with_capacity(picked.len());
    let players = players
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut p = p.clone();
            if picked.contains(&i) {
                p.role = PlayerRole::Impostor;
                impostor_ids.insert(p.id.clone());
            } else {
                p.role = PlayerRole::Civilian;
            }
            p
        })
        .collect();

    Ok(RoleAssignment {
        impostor_ids,
        players,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn roster(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(format!("player{i}"), i == 0))
            .collect()
    }

    #[test]
    fn test_assign_counts_and_roles() {
        let players = roster(6);
        let mut rng = rand::rng();

        for count in [1u8, 2] {
            let assignment = assign(&players, count, &mut rng).unwrap();
            assert_eq!(assignment.impostor_ids.len(), count as usize);
            assert_eq!(assignment.players.len(), players.len());

            let impostors = assignment
                .players
                .iter()
                .filter(|p| p.role == PlayerRole::Impostor)
                .count();
            let civilians = assignment
                .players
                .iter()
                .filter(|p| p.role == PlayerRole::Civilian)
                .count();
            assert_eq!(impostors, count as usize);
            assert_eq!(civilians, players.len() - count as usize);

            for p in &assignment.players {
                assert_eq!(
                    assignment.impostor_ids.contains(&p.id),
                    p.role == PlayerRole::Impostor
                );
            }
        }
    }

    #[test]
    fn test_assign_preserves_roster_order_and_identity() {
        let players = roster(5);
        let mut rng = rand::rng();
        let assignment = assign(&players, 2, &mut rng).unwrap();

        for (before, after) in players.iter().zip(&assignment.players) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.name, after.name);
            assert_eq!(before.is_host, after.is_host);
        }
        // Input is untouched
        assert!(players.iter().all(|p| p.role == PlayerRole::Unassigned));
    }

    #[test]
    fn test_assign_too_few_players() {
        let mut rng = rand::rng();
        assert_eq!(
            assign(&roster(2), 1, &mut rng),
            Err(SessionError::InsufficientPlayers {
                required: 3,
                actual: 2
            })
        );
        assert_eq!(
            assign(&roster(4), 2, &mut rng),
            Err(SessionError::InsufficientPlayers {
                required: 5,
                actual: 4
            })
        );
        assert!(assign(&roster(5), 2, &mut rng).is_ok());
    }

    #[test]
    fn test_assign_rejects_bad_impostor_count() {
        let mut rng = rand::rng();
        for bad in [0u8, 3, 7] {
            assert!(matches!(
                assign(&roster(8), bad, &mut rng),
                Err(SessionError::Validation(_))
            ));
        }
    }

    /// Chi-square goodness-of-fit over all single-impostor outcomes.
    #[test]
    fn test_single_impostor_is_uniform() {
        let players = roster(4);
        let mut rng = rand::rng();
        let trials = 8000usize;

        let mut counts: HashMap<PlayerId, usize> = HashMap::new();
        for _ in 0..trials {
            let assignment = assign(&players, 1, &mut rng).unwrap();
            let id = assignment.impostor_ids.into_iter().next().unwrap();
            *counts.entry(id).or_default() += 1;
        }

        assert_eq!(counts.len(), players.len());
        let expected = trials as f64 / players.len() as f64;
        let chi2: f64 = counts
            .values()
            .map(|&observed| {
                let d = observed as f64 - expected;
                d * d / expected
            })
            .sum();

        // df = 3, p = 0.001 critical value is 16.27; generous headroom
        assert!(chi2 < 25.0, "chi-square too high: {chi2}");
    }

    /// Chi-square over all C(5,2) = 10 impostor pairs.
    #[test]
    fn test_impostor_pairs_are_uniform() {
        let players = roster(5);
        let mut rng = rand::rng();
        let trials = 10_000usize;

        let mut counts: HashMap<Vec<PlayerId>, usize> = HashMap::new();
        for _ in 0..trials {
            let assignment = assign(&players, 2, &mut rng).unwrap();
            let mut pair: Vec<_> = assignment.impostor_ids.into_iter().collect();
            pair.sort();
            *counts.entry(pair).or_default() += 1;
        }

        assert_eq!(counts.len(), 10);
        let expected = trials as f64 / 10.0;
        let chi2: f64 = counts
            .values()
            .map(|&observed| {
                let d = observed as f64 - expected;
                d * d / expected
            })
            .sum();

        // df = 9, p = 0.001 critical value is 27.88
        assert!(chi2 < 40.0, "chi-square too high: {chi2}");
    }
}
