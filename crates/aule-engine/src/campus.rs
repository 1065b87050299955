//! Building catalog: coordinates and opening hours for every known building.
//!
//! The catalog is the only place a building name becomes "known". Lessons or
//! registry rows naming a building outside the catalog are configuration errors.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AuleError, Result};
use crate::hours::{self, ClockTime, HoursRule, MON_FRI, MON_SAT, SATURDAY, SUNDAY};

/// Civil time zone of the University of Pisa campus.
pub const CAMPUS_TIMEZONE: Tz = chrono_tz::Europe::Rome;

/// Geographic position of a building entrance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

/// Static description of one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInfo {
    pub coordinates: Coordinates,
    #[serde(default)]
    pub hours: Vec<HoursRule>,
}

/// The set of buildings the engine is allowed to report on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Campus {
    buildings: BTreeMap<String, BuildingInfo>,
}

impl Campus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a building. Builder-style.
    pub fn with_building(
        mut self,
        name: impl Into<String>,
        coordinates: Coordinates,
        hours: Vec<HoursRule>,
    ) -> Self {
        self.buildings
            .insert(name.into(), BuildingInfo { coordinates, hours });
        self
    }

    /// Parse a catalog from its JSON form (building name -> `{coordinates, hours}`).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// Returns `AuleError::UnknownBuilding` if `name` is not in the catalog.
    pub fn building(&self, name: &str) -> Result<&BuildingInfo> {
        self.buildings
            .get(name)
            .ok_or_else(|| AuleError::UnknownBuilding(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.buildings.contains_key(name)
    }

    /// Whether `name` is closed at civil time `at`.
    ///
    /// # Errors
    /// Returns `AuleError::UnknownBuilding` if `name` is not in the catalog.
    pub fn is_closed(&self, name: &str, at: NaiveDateTime) -> Result<bool> {
        Ok(hours::is_closed(&self.building(name)?.hours, at))
    }

    pub fn buildings(&self) -> impl Iterator<Item = (&str, &BuildingInfo)> {
        self.buildings.iter().map(|(name, info)| (name.as_str(), info))
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// The University of Pisa teaching buildings with their published opening hours.
    pub fn pisa() -> Self {
        let hm = ClockTime::hm;
        let midnight = ClockTime::END_OF_DAY;

        // Monday-Friday 08:00-19:30, closed Sunday.
        let standard = || {
            vec![
                HoursRule::open(MON_FRI, hm(8, 0), hm(19, 30)),
                HoursRule::closed(SUNDAY),
            ]
        };
        let main_site = || {
            vec![
                HoursRule::open(MON_FRI, hm(7, 30), hm(20, 0)),
                HoursRule::open(SATURDAY, hm(7, 30), hm(14, 0)),
                HoursRule::closed(SUNDAY),
            ]
        };
        let late_opening = || {
            vec![
                HoursRule::open(MON_SAT, hm(8, 0), midnight),
                HoursRule::open(SUNDAY, hm(8, 30), midnight),
            ]
        };

        let at = |lon: f64, lat: f64| Coordinates { lon, lat };

        let mut campus = Campus::new()
            .with_building("poloA", at(10.389842986424895, 43.72105258709789), main_site())
            .with_building("poloB", at(10.389289766627002, 43.72208800629937), main_site())
            .with_building(
                "poloC",
                at(10.38901079266688, 43.72140114553582),
                vec![
                    HoursRule::open(MON_FRI, hm(7, 30), hm(19, 30)),
                    HoursRule::open(SATURDAY, hm(8, 0), hm(13, 0)),
                    HoursRule::closed(SUNDAY),
                ],
            )
            .with_building("poloF", at(10.388287350482187, 43.72085438583843), late_opening())
            .with_building("poloPN", at(10.391229871075552, 43.72584890979181), late_opening())
            .with_building(
                "poloFibonacci",
                at(10.408037918667361, 43.720879347333835),
                vec![
                    HoursRule::open(MON_FRI, hm(8, 0), hm(19, 0)),
                    HoursRule::closed(SUNDAY),
                ],
            )
            .with_building(
                "poloBenedettine",
                at(10.39397528101884, 43.71344829248517),
                vec![
                    HoursRule::open(MON_FRI, hm(8, 0), hm(19, 30)),
                    HoursRule::open(SATURDAY, hm(8, 30), hm(14, 0)),
                    HoursRule::closed(SUNDAY),
                ],
            )
            .with_building(
                "poloEconomia",
                at(10.410379473942072, 43.711018978876695),
                vec![
                    HoursRule::open(MON_FRI, hm(8, 0), hm(19, 30)),
                    HoursRule::open(SATURDAY, hm(8, 0), hm(13, 0)),
                    HoursRule::closed(SUNDAY),
                ],
            )
            .with_building(
                "poloPiagge",
                at(10.412023465973618, 43.710610273943814),
                vec![
                    HoursRule::open(MON_FRI, hm(8, 0), midnight),
                    HoursRule::closed(SUNDAY),
                ],
            )
            .with_building(
                "poloFarmacia",
                at(10.3889513118217, 43.71661901268172),
                vec![HoursRule::closed(SUNDAY)],
            );

        for (name, lon, lat) in [
            ("poloCarmignani", 10.40094950738802, 43.72011831490275),
            ("poloGuidotti", 10.392386095658338, 43.71741398544361),
            ("poloNobili", 10.395924531247118, 43.71849818636451),
            ("poloP.Ricci", 10.396921563725783, 43.717686512092854),
            ("poloP.Boileau", 10.397074275993532, 43.71998968935904),
            ("poloS.Rossore", 10.392641884389207, 43.717998675187204),
            ("poloSapienza", 10.399496403929106, 43.717311583201365),
        ] {
            campus = campus.with_building(name, at(lon, lat), standard());
        }

        campus
    }
}

/// Current wall-clock time in the given zone, as a civil timestamp.
pub fn civil_now(tz: Tz) -> NaiveDateTime {
    to_civil(Utc::now(), tz)
}

/// Convert a UTC instant to civil time in `tz`, truncated to the second.
pub fn to_civil(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    let civil = instant.with_timezone(&tz).naive_local();
    civil.with_nanosecond(0).unwrap_or(civil)
}
