//! Conversion from GBFS wire types to domain types.
//!
//! Malformed rows are dropped rather than failing the whole document.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Coordinate, StationId, StationInformation, StationStatus};

use super::feed::{InformationDocument, LanguageFeeds, Manifest, StatusDocument};
use super::types::{Envelope, ManifestData, StationInformationDto, StationList, StationStatusDto};

const STATION_INFORMATION: &str = "station_information";
const STATION_STATUS: &str = "station_status";

fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

/// Convert a manifest, keeping only languages that publish both station feeds.
pub fn convert_manifest(envelope: Envelope<ManifestData>) -> Manifest {
    let mut languages = BTreeMap::new();

    for (language, entry) in envelope.data {
        let url_of = |name: &str| {
            entry
                .feeds
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.url.clone())
        };

        match (url_of(STATION_INFORMATION), url_of(STATION_STATUS)) {
            (Some(station_information), Some(station_status)) => {
                languages.insert(
                    language,
                    LanguageFeeds {
                        station_information,
                        station_status,
                    },
                );
            }
            _ => warn!(%language, "manifest language lacks station feeds, skipping"),
        }
    }

    Manifest {
        ttl: Duration::from_secs(envelope.ttl),
        last_updated: timestamp(envelope.last_updated),
        languages,
    }
}

pub fn convert_information(
    envelope: Envelope<StationList<StationInformationDto>>,
) -> InformationDocument {
    let stations = envelope
        .data
        .stations
        .into_iter()
        .filter_map(|dto| {
            let station_id = StationId::new(dto.station_id.into_string());
            match Coordinate::new(dto.lat, dto.lon) {
                Ok(location) => Some(StationInformation {
                    station_id,
                    name: dto.name,
                    location,
                }),
                Err(e) => {
                    debug!(%station_id, error = %e, "dropping station with bad location");
                    None
                }
            }
        })
        .collect();

    InformationDocument {
        ttl: Duration::from_secs(envelope.ttl),
        last_updated: timestamp(envelope.last_updated),
        data: stations,
    }
}

pub fn convert_status(envelope: Envelope<StationList<StationStatusDto>>) -> StatusDocument {
    let stations = envelope
        .data
        .stations
        .into_iter()
        .filter_map(|dto| {
            let station_id = StationId::new(dto.station_id.into_string());
            let (Ok(bikes_available), Ok(docks_available)) = (
                u32::try_from(dto.num_bikes_available),
                u32::try_from(dto.num_docks_available),
            ) else {
                debug!(%station_id, "dropping station with negative availability");
                return None;
            };

            Some(StationStatus {
                station_id,
                bikes_available,
                docks_available,
                is_renting: dto.is_renting.is_set(),
                is_returning: dto.is_returning.is_set(),
                is_installed: dto.is_installed.is_set(),
            })
        })
        .collect();

    StatusDocument {
        ttl: Duration::from_secs(envelope.ttl),
        last_updated: timestamp(envelope.last_updated),
        data: stations,
    }
}
