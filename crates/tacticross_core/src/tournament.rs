//! Single-elimination tournament progression.

use crate::error::TournamentError;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Largest supported field.
pub const MAX_ENTRANTS: usize = 8;

/// A tournament participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    /// Stable id, the entrant's seed order.
    pub id: usize,
    /// Display name.
    pub name: String,
    /// True for padding bots.
    pub is_ai: bool,
}

/// One bracket match. `second` is `None` for a bye.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    /// Match id, unique across the tournament.
    pub id: usize,
    /// Bracket round, 1-based.
    pub round: usize,
    /// First entrant id.
    pub first: usize,
    /// Second entrant id, absent for a bye.
    pub second: Option<usize>,
    /// Winning entrant id once decided.
    pub winner: Option<usize>,
}

impl BracketMatch {
    /// True when this match still needs a result.
    pub fn is_pending(&self) -> bool {
        self.winner.is_none()
    }

    fn involves(&self, entrant: usize) -> bool {
        self.first == entrant || self.second == Some(entrant)
    }
}

/// A single-elimination bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    entrants: Vec<Entrant>,
    matches: Vec<BracketMatch>,
    round: usize,
}

impl Tournament {
    /// Builds a bracket from up to [`MAX_ENTRANTS`] names.
    ///
    /// Blank names become `Player N`. An odd field gains an `AI Bot`, and a
    /// field smaller than two is filled with numbered bots.
    #[instrument(skip(names))]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entrants: Vec<Entrant> = names
            .into_iter()
            .take(MAX_ENTRANTS)
            .enumerate()
            .map(|(id, name)| {
                let name: String = name.into();
                let name = if name.trim().is_empty() {
                    format!("Player {}", id + 1)
                } else {
                    name
                };
                Entrant {
                    id,
                    name,
                    is_ai: false,
                }
            })
            .collect();

        if entrants.len() % 2 == 1 {
            entrants.push(Entrant {
                id: entrants.len(),
                name: "AI Bot".to_string(),
                is_ai: true,
            });
        }
        while entrants.len() < 2 {
            entrants.push(Entrant {
                id: entrants.len(),
                name: format!("AI Bot {}", entrants.len()),
                is_ai: true,
            });
        }

        let mut tournament = Self {
            entrants,
            matches: Vec::new(),
            round: 0,
        };
        let field: Vec<usize> = tournament.entrants.iter().map(|e| e.id).collect();
        tournament.open_round(&field);
        info!(entrants = tournament.entrants.len(), "Tournament created");
        tournament
    }

    /// Every entrant in seed order.
    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    /// Entrant by id.
    pub fn entrant(&self, id: usize) -> Option<&Entrant> {
        self.entrants.get(id)
    }

    /// Every match created so far.
    pub fn matches(&self) -> &[BracketMatch] {
        &self.matches
    }

    /// Current bracket round, 1-based.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Matches awaiting a result.
    pub fn pending_matches(&self) -> Vec<&BracketMatch> {
        self.matches.iter().filter(|m| m.is_pending()).collect()
    }

    /// Records `winner` as the victor of `match_id`, opening the next round
    /// once the current one is complete.
    ///
    /// # Errors
    ///
    /// [`TournamentError`] for unknown or decided matches and for winners
    /// not playing in the match.
    #[instrument(skip(self))]
    pub fn record_result(&mut self, match_id: usize, winner: usize) -> Result<(), TournamentError> {
        let slot = self
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or(TournamentError::UnknownMatch(match_id))?;
        if !slot.is_pending() {
            return Err(TournamentError::AlreadyDecided(match_id));
        }
        if !slot.involves(winner) {
            return Err(TournamentError::NotInMatch {
                match_id,
                entrant: winner,
            });
        }
        slot.winner = Some(winner);

        if self.pending_matches().is_empty() {
            let survivors: Vec<usize> = self
                .matches
                .iter()
                .filter(|m| m.round == self.round)
                .filter_map(|m| m.winner)
                .collect();
            if survivors.len() > 1 {
                self.open_round(&survivors);
            } else if let Some(champion) = self.champion() {
                info!(champion = %champion.name, "Tournament decided");
            }
        }
        Ok(())
    }

    /// The tournament winner, once only one entrant remains.
    pub fn champion(&self) -> Option<&Entrant> {
        let last_round: Vec<&BracketMatch> =
            self.matches.iter().filter(|m| m.round == self.round).collect();
        match last_round.as_slice() {
            [only] if only.second.is_some() => only.winner.and_then(|id| self.entrant(id)),
            _ => None,
        }
    }

    fn open_round(&mut self, field: &[usize]) {
        self.round += 1;
        for pair in field.chunks(2) {
            let id = self.matches.len();
            let (second, winner) = match pair {
                [_, b] => (Some(*b), None),
                [a] => (None, Some(*a)),
                _ => continue,
            };
            self.matches.push(BracketMatch {
                id,
                round: self.round,
                first: pair[0],
                second,
                winner,
            });
        }
        info!(round = self.round, matches = field.len() / 2, "Bracket round opened");
    }
}
