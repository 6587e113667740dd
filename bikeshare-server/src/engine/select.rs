//! Station selection over cached tables.
//!
//! A challenge picks a "from" station with the most bikes and a "to"
//! station with the most free docks. When the caller supplies a point, only
//! the stations nearest it are considered, and a tight cluster is preferred
//! over one far outlier that happens to have an extra bike or dock.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{CircularArea, Coordinate, StationId, StationInformation, StationStatus};

use super::config::SelectionConfig;
use super::error::SelectionError;

/// Station information keyed by station id.
pub type InformationTable = HashMap<StationId, StationInformation>;

/// Station status keyed by station id.
pub type StatusTable = HashMap<StationId, StationStatus>;

/// An operational station inside the area, joined with its status.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub information: &'a StationInformation,
    pub status: &'a StationStatus,
}

impl Candidate<'_> {
    pub fn id(&self) -> &StationId {
        &self.information.station_id
    }

    fn distance_to(&self, point: &Coordinate) -> f64 {
        self.information.location.distance_to(point)
    }
}

/// Inputs of a challenge query.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeRequest {
    pub area: CircularArea,
    pub from: Option<Coordinate>,
    pub to: Option<Coordinate>,
}

impl ChallengeRequest {
    pub fn anywhere_in(area: CircularArea) -> Self {
        Self {
            area,
            from: None,
            to: None,
        }
    }

    pub fn with_from(mut self, from: Coordinate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: Coordinate) -> Self {
        self.to = Some(to);
        self
    }
}

/// The selected pair, borrowing from the tables.
#[derive(Debug, Clone, Copy)]
pub struct ChallengePick<'a> {
    pub from: Candidate<'a>,
    pub to: Candidate<'a>,
}

/// Fleet availability over an area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilitySummary {
    pub bikes_available: u64,
    pub docks_available: u64,
    pub station_count: usize,
}

/// Operational stations inside `area`, in station id order.
///
/// A station must be renting, returning and installed, and must appear in
/// both tables.
pub fn eligible_stations<'a>(
    information: &'a InformationTable,
    status: &'a StatusTable,
    area: &CircularArea,
) -> Vec<Candidate<'a>> {
    let mut candidates: Vec<Candidate<'a>> = status
        .values()
        .filter(|s| s.is_operational())
        .filter_map(|s| {
            information.get(&s.station_id).map(|information| Candidate {
                information,
                status: s,
            })
        })
        .filter(|c| area.contains(&c.information.location))
        .collect();

    candidates.sort_by(|a, b| a.id().cmp(b.id()));
    candidates
}

/// Narrow `candidates` to those nearest `point`.
///
/// Keeps the `nearest_count` closest stations (equal distances ordered by
/// id). If the farthest of those is more than `cluster_spread_m` beyond the
/// closest, everything beyond `closest + cluster_spread_m` is dropped.
pub fn nearby<'a>(
    candidates: &[Candidate<'a>],
    point: &Coordinate,
    config: &SelectionConfig,
) -> Vec<Candidate<'a>> {
    let mut ranked: Vec<(f64, Candidate<'a>)> = candidates
        .iter()
        .map(|c| (c.distance_to(point), *c))
        .collect();

    ranked.sort_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.id().cmp(b.id())));
    ranked.truncate(config.nearest_count);

    if let (Some(&(min, _)), Some(&(max, _))) = (ranked.first(), ranked.last())
        && max - min > config.cluster_spread_m
    {
        let limit = min + config.cluster_spread_m;
        ranked.retain(|(d, _)| *d <= limit);
    }

    ranked.into_iter().map(|(_, c)| c).collect()
}

/// The candidate with the greatest `key`; ties go to the smallest id.
fn best_by<'a>(
    candidates: impl IntoIterator<Item = Candidate<'a>>,
    key: impl Fn(&Candidate<'a>) -> u32,
) -> Option<Candidate<'a>> {
    candidates.into_iter().max_by(|a, b| match key(a).cmp(&key(b)) {
        Ordering::Equal => b.id().cmp(a.id()),
        other => other,
    })
}

/// Select a challenge pair.
///
/// "From" maximises bikes available, "to" maximises docks available and is
/// never the same station as "from".
pub fn select_challenge<'a>(
    information: &'a InformationTable,
    status: &'a StatusTable,
    request: &ChallengeRequest,
    config: &SelectionConfig,
) -> Result<ChallengePick<'a>, SelectionError> {
    let eligible = eligible_stations(information, status, &request.area);
    if eligible.is_empty() {
        return Err(SelectionError::EmptyEligibleSet);
    }

    let from_pool = match &request.from {
        Some(point) => nearby(&eligible, point, config),
        None => eligible.clone(),
    };
    let from = best_by(from_pool, |c| c.status.bikes_available)
        .ok_or(SelectionError::EmptyEligibleSet)?;

    let remaining: Vec<Candidate<'a>> = eligible
        .into_iter()
        .filter(|c| c.id() != from.id())
        .collect();
    let to_pool = match &request.to {
        Some(point) => nearby(&remaining, point, config),
        None => remaining,
    };
    let to = best_by(to_pool, |c| c.status.docks_available)
        .ok_or(SelectionError::EmptyEligibleSet)?;

    Ok(ChallengePick { from, to })
}

/// Total availability over every eligible station in `area`.
pub fn summarize(
    information: &InformationTable,
    status: &StatusTable,
    area: &CircularArea,
) -> AvailabilitySummary {
    eligible_stations(information, status, area)
        .iter()
        .fold(AvailabilitySummary::default(), |acc, c| AvailabilitySummary {
            bikes_available: acc.bikes_available + u64::from(c.status.bikes_available),
            docks_available: acc.docks_available + u64::from(c.status.docks_available),
            station_count: acc.station_count + 1,
        })
}
