// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration, from serde or environment variables.

use crate::cache::CacheConfig;
use crate::lod::LodConfig;
use nc_lite_core::WEB_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Geometry cache limits.
    pub cache: CacheConfig,
    /// LOD distance thresholds.
    pub lod: LodConfig,
    /// Half-height of the band around the section mid-plane treated as web.
    pub web_tolerance: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            lod: LodConfig::default(),
            web_tolerance: WEB_TOLERANCE,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `NC_LITE_*` environment variables. Missing or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str, default| parse_or(lookup(name), default);

        Self {
            cache: CacheConfig {
                max_size_mb: var("NC_LITE_CACHE_MAX_SIZE_MB", defaults.cache.max_size_mb),
                max_entries: parse_or(
                    lookup("NC_LITE_CACHE_MAX_ENTRIES"),
                    defaults.cache.max_entries,
                ),
                ttl_seconds: parse_or(
                    lookup("NC_LITE_CACHE_TTL_SECS"),
                    defaults.cache.ttl_seconds,
                ),
                cleanup_interval_seconds: parse_or(
                    lookup("NC_LITE_CACHE_CLEANUP_INTERVAL_SECS"),
                    defaults.cache.cleanup_interval_seconds,
                ),
            },
            lod: LodConfig {
                near: var("NC_LITE_LOD_NEAR", defaults.lod.near),
                far: var("NC_LITE_LOD_FAR", defaults.lod.far),
            },
            web_tolerance: var("NC_LITE_WEB_TOLERANCE", defaults.web_tolerance),
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
