//! # Preset Registry
//!
//! Tabella statica dei casi d'uso supportati e dei relativi parametri di default.
//!
//! | Preset      | Max W | Max H | Qualità iniziale | Budget default |
//! |-------------|------:|------:|------------------|----------------|
//! | avatar      |   400 |   400 | 0.70             | 100 KB         |
//! | community   |  1200 |  1200 | 0.60             | 250 KB         |
//! | tour        |  1400 |  1050 | 0.65             | 350 KB         |
//! | route-cover |  1600 |   900 | 0.65             | 400 KB         |
//! | route-stop  |  1000 |   750 | 0.60             | 250 KB         |
//! | thumbnail   |   300 |   300 | 0.50             | nessuno        |
//!
//! I preset sono dati costanti per tutta la vita del processo: nessuno stato
//! globale mutabile, solo un `match`.

use crate::codec::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KB: u64 = 1024;

/// Closed set of image use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UseCase {
    Avatar,
    Community,
    Tour,
    #[serde(alias = "routeCover")]
    RouteCover,
    #[serde(alias = "routeStop")]
    RouteStop,
    Thumbnail,
}

/// Default optimization parameters for a use case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub max_width: u32,
    pub max_height: u32,
    /// Starting quality factor in (0, 1]
    pub start_quality: f32,
    pub format: OutputFormat,
}

impl UseCase {
    pub const ALL: [UseCase; 6] = [
        UseCase::Avatar,
        UseCase::Community,
        UseCase::Tour,
        UseCase::RouteCover,
        UseCase::RouteStop,
        UseCase::Thumbnail,
    ];

    /// Preset lookup, total over the enumeration
    pub const fn preset(self) -> Preset {
        let (max_width, max_height, start_quality) = match self {
            UseCase::Avatar => (400, 400, 0.70),
            UseCase::Community => (1200, 1200, 0.60),
            UseCase::Tour => (1400, 1050, 0.65),
            UseCase::RouteCover => (1600, 900, 0.65),
            UseCase::RouteStop => (1000, 750, 0.60),
            UseCase::Thumbnail => (300, 300, 0.50),
        };

        Preset {
            max_width,
            max_height,
            start_quality,
            format: OutputFormat::Jpeg,
        }
    }

    /// Byte budget used by the per-use-case convenience entry points.
    ///
    /// Thumbnails have no budget and are always encoded in a single pass.
    pub const fn target_size_bytes(self) -> Option<u64> {
        match self {
            UseCase::Avatar => Some(100 * KB),
            UseCase::Community => Some(250 * KB),
            UseCase::Tour => Some(350 * KB),
            UseCase::RouteCover => Some(400 * KB),
            UseCase::RouteStop => Some(250 * KB),
            UseCase::Thumbnail => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UseCase::Avatar => "avatar",
            UseCase::Community => "community",
            UseCase::Tour => "tour",
            UseCase::RouteCover => "route-cover",
            UseCase::RouteStop => "route-stop",
            UseCase::Thumbnail => "thumbnail",
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UseCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "avatar" => Ok(UseCase::Avatar),
            "community" => Ok(UseCase::Community),
            "tour" => Ok(UseCase::Tour),
            "route-cover" | "routecover" => Ok(UseCase::RouteCover),
            "route-stop" | "routestop" => Ok(UseCase::RouteStop),
            "thumbnail" => Ok(UseCase::Thumbnail),
            other => Err(format!(
                "unknown preset '{}' (expected one of: avatar, community, tour, route-cover, route-stop, thumbnail)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_table() {
        let avatar = UseCase::Avatar.preset();
        assert_eq!((avatar.max_width, avatar.max_height), (400, 400));
        assert_eq!(avatar.start_quality, 0.70);

        let tour = UseCase::Tour.preset();
        assert_eq!((tour.max_width, tour.max_height), (1400, 1050));
        assert_eq!(tour.start_quality, 0.65);

        let cover = UseCase::RouteCover.preset();
        assert_eq!((cover.max_width, cover.max_height), (1600, 900));

        let stop = UseCase::RouteStop.preset();
        assert_eq!((stop.max_width, stop.max_height), (1000, 750));
        assert_eq!(stop.start_quality, 0.60);

        let thumb = UseCase::Thumbnail.preset();
        assert_eq!((thumb.max_width, thumb.max_height), (300, 300));
        assert_eq!(thumb.start_quality, 0.50);
    }

    #[test]
    fn test_all_presets_are_sane() {
        for use_case in UseCase::ALL {
            let preset = use_case.preset();
            assert!(preset.max_width > 0 && preset.max_height > 0);
            assert!(preset.start_quality > 0.0 && preset.start_quality <= 1.0);
            assert_eq!(preset.format, OutputFormat::Jpeg);
        }
    }

    #[test]
    fn test_target_budgets() {
        assert_eq!(UseCase::Avatar.target_size_bytes(), Some(102_400));
        assert_eq!(UseCase::Community.target_size_bytes(), Some(256_000));
        assert_eq!(UseCase::Tour.target_size_bytes(), Some(358_400));
        assert_eq!(UseCase::RouteCover.target_size_bytes(), Some(409_600));
        assert_eq!(UseCase::RouteStop.target_size_bytes(), Some(256_000));
        assert_eq!(UseCase::Thumbnail.target_size_bytes(), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("avatar".parse::<UseCase>(), Ok(UseCase::Avatar));
        assert_eq!("routeCover".parse::<UseCase>(), Ok(UseCase::RouteCover));
        assert_eq!("route_stop".parse::<UseCase>(), Ok(UseCase::RouteStop));
        assert!("banner".parse::<UseCase>().is_err());

        for use_case in UseCase::ALL {
            assert_eq!(use_case.to_string().parse::<UseCase>(), Ok(use_case));
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&UseCase::RouteCover).unwrap();
        assert_eq!(json, "\"route-cover\"");
        let parsed: UseCase = serde_json::from_str("\"routeStop\"").unwrap();
        assert_eq!(parsed, UseCase::RouteStop);
    }
}
