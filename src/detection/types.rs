use serde::{Deserialize, Serialize};

/// How aggressively separators are searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// Pick from the image dimensions. Never resolves to `Low`.
    #[default]
    Auto,
    /// Conservative: one edge pass, wide separator spacing
    Low,
    /// Two edge passes
    Medium,
    /// Three edge passes plus the brightness-valley search
    High,
}

impl Sensitivity {
    /// Resolve `Auto` against the strip dimensions.
    ///
    /// `Auto` only ever yields `Medium` or `High`. `Low` is kept for explicit opt-in on
    /// small or fragile scans where fewer, safer separators are preferred.
    pub fn resolve(self, width: u32, height: u32) -> Sensitivity {
        match self {
            Sensitivity::Auto => {
                if width < 500 && height < 1000 {
                    Sensitivity::Medium
                } else if width < 800 || height < 1500 {
                    Sensitivity::Medium
                } else {
                    Sensitivity::High
                }
            }
            explicit => explicit,
        }
    }

    /// Canny (low, high) threshold pairs, progressively more permissive
    pub fn canny_thresholds(self) -> &'static [(f32, f32)] {
        match self {
            Sensitivity::Low => &[(50.0, 150.0)],
            Sensitivity::Medium | Sensitivity::Auto => &[(50.0, 150.0), (30.0, 100.0)],
            Sensitivity::High => &[(50.0, 150.0), (30.0, 100.0), (20.0, 80.0)],
        }
    }

    /// Fraction of the strip width a Hough line must collect in votes
    pub fn hough_vote_fraction(self) -> f32 {
        match self {
            Sensitivity::Low => 0.35,
            Sensitivity::Medium | Sensitivity::Auto => 0.30,
            Sensitivity::High => 0.25,
        }
    }

    /// Minimum separator spacing derived from the strip height
    pub fn min_distance(self, height: u32) -> u32 {
        let (percent, floor) = match self {
            Sensitivity::Low => (12, 60),
            Sensitivity::Medium | Sensitivity::Auto => (10, 50),
            Sensitivity::High => (8, 40),
        };
        let scaled = (u64::from(height) * percent / 100) as u32;
        scaled.max(floor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sensitivity::Auto => "auto",
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-invocation detection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Frame height used by the uniform-grid fallback instead of an estimate
    #[serde(rename = "frame_height")]
    pub frame_height_override: Option<u32>,

    /// Minimum spacing between separators, overriding the sensitivity default
    pub min_frame_distance: Option<u32>,

    pub sensitivity: Sensitivity,
}

impl DetectionConfig {
    pub fn with_sensitivity(sensitivity: Sensitivity) -> Self {
        Self {
            sensitivity,
            ..Self::default()
        }
    }
}

/// Which strategy produced the final separators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionTier {
    EdgeLines,
    BrightnessValleys,
    UniformGrid,
}

impl DetectionTier {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionTier::EdgeLines => "edge-lines",
            DetectionTier::BrightnessValleys => "brightness-valleys",
            DetectionTier::UniformGrid => "uniform-grid",
        }
    }
}

/// Strictly increasing separator rows, always starting at 0 and ending at the strip height
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorSet {
    rows: Vec<u32>,
}

impl SeparatorSet {
    /// Build a set from arbitrary rows: out-of-range rows are dropped, duplicates
    /// removed, and both endpoints inserted.
    ///
    /// A zero-height strip has the single separator `[0]` and no bands.
    pub fn with_endpoints(rows: impl IntoIterator<Item = u32>, height: u32) -> Self {
        let mut rows: Vec<u32> = rows.into_iter().filter(|&y| y > 0 && y < height).collect();
        rows.sort_unstable();
        rows.dedup();

        rows.insert(0, 0);
        if height > 0 {
            rows.push(height);
        }
        Self { rows }
    }

    /// Like [`with_endpoints`](Self::with_endpoints), but detected rows lying within
    /// `min_distance` of either endpoint are absorbed into it.
    pub fn absorbing_near_endpoints(
        rows: impl IntoIterator<Item = u32>,
        height: u32,
        min_distance: u32,
    ) -> Self {
        Self::with_endpoints(
            rows.into_iter()
                .filter(|&y| y > min_distance && height.saturating_sub(y) > min_distance),
            height,
        )
    }

    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consecutive `(top, bottom)` pairs
    pub fn bands(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.rows.windows(2).map(|w| (w[0], w[1]))
    }

    /// Number of candidate frame bands
    pub fn band_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Rows strictly between the endpoints
    pub fn interior(&self) -> &[u32] {
        if self.rows.len() <= 2 {
            &[]
        } else {
            &self.rows[1..self.rows.len() - 1]
        }
    }
}

/// Everything `detect` learned about one strip
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub separators: SeparatorSet,

    /// Sensitivity after resolving `Auto`
    pub sensitivity: Sensitivity,

    pub min_distance: u32,

    pub tier: DetectionTier,

    /// Frame height the uniform grid derived on its own. Callers may feed it back as
    /// `frame_height_override` for later strips.
    pub derived_frame_height: Option<u32>,
}
