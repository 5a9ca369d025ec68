// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Distance-based level of detail for feature lists

use serde::{Deserialize, Serialize};

/// Distance thresholds, in model units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LodConfig {
    pub near: f64,
    pub far: f64,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            near: 500.0,
            far: 2000.0,
        }
    }
}

/// Detail level picked for a camera distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LodLevel {
    /// Every feature
    Full,
    /// Every second feature
    Decimated,
    /// Every fourth feature
    Coarse,
}

impl LodLevel {
    /// Keep one feature out of `stride`
    #[inline]
    pub fn stride(&self) -> usize {
        match self {
            Self::Full => 1,
            Self::Decimated => 2,
            Self::Coarse => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LodSelector {
    config: LodConfig,
}

impl LodSelector {
    pub fn new(config: LodConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LodConfig {
        &self.config
    }

    /// Level for a camera distance. Non-finite or negative distances are
    /// treated as close up.
    pub fn level(&self, distance: f64) -> LodLevel {
        if !distance.is_finite() || distance < self.config.near {
            LodLevel::Full
        } else if distance < self.config.far {
            LodLevel::Decimated
        } else {
            LodLevel::Coarse
        }
    }

    /// Subset of `features` kept at `distance`: indices 0, stride, 2*stride...
    pub fn simplify<T: Clone>(&self, features: &[T], distance: f64) -> Vec<T> {
        let stride = self.level(distance).stride();
        features.iter().step_by(stride).cloned().collect()
    }
}
