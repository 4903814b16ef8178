use image::{GrayImage, RgbImage};
use tracing::debug;

use crate::detection::{
    edge_lines::EdgeLineStrategy,
    grid::UniformGridStrategy,
    types::{DetectionConfig, DetectionTier, Sensitivity},
    valley::BrightnessValleyStrategy,
};

/// Read-only view of one strip shared by every strategy in a chain
pub struct DetectionContext {
    pub gray: GrayImage,
    pub width: u32,
    pub height: u32,

    /// Resolved, never `Auto`
    pub sensitivity: Sensitivity,

    pub min_distance: u32,

    pub frame_height_override: Option<u32>,
}

impl DetectionContext {
    pub fn new(image: &RgbImage, config: &DetectionConfig) -> Self {
        let (width, height) = image.dimensions();
        let sensitivity = config.sensitivity.resolve(width, height);
        let min_distance = config
            .min_frame_distance
            .unwrap_or_else(|| sensitivity.min_distance(height));

        Self {
            gray: image::imageops::grayscale(image),
            width,
            height,
            sensitivity,
            min_distance,
            frame_height_override: config.frame_height_override,
        }
    }

    /// Drop detected rows too close to the top or bottom edge to start a frame
    pub fn keep_interior(&self, rows: Vec<u32>) -> Vec<u32> {
        rows.into_iter()
            .filter(|&y| y > self.min_distance && self.height.saturating_sub(y) > self.min_distance)
            .collect()
    }
}

/// Result of running one strategy
#[derive(Debug, Clone, Default)]
pub struct StrategyOutput {
    /// Separator rows, without the synthetic 0 / height endpoints
    pub rows: Vec<u32>,

    /// Set when the strategy had to invent a frame height
    pub derived_frame_height: Option<u32>,
}

impl StrategyOutput {
    pub fn rows(rows: Vec<u32>) -> Self {
        Self {
            rows,
            derived_frame_height: None,
        }
    }
}

/// One tier of the separator search.
///
/// Tiers run in order; each looks at what earlier tiers found and decides whether it
/// has anything to add.
pub trait SeparatorStrategy: Send + Sync {
    /// Returns the unique name of this strategy
    fn name(&self) -> &str;

    fn tier(&self) -> DetectionTier;

    /// Whether the rows gathered so far are insufficient, so this tier should run
    fn should_run(&self, ctx: &DetectionContext, rows: &[u32]) -> bool;

    /// Produce the new row set. Receives ownership of the rows found so far so a tier
    /// can combine with or replace them.
    fn run(&self, ctx: &DetectionContext, rows: Vec<u32>) -> StrategyOutput;
}

/// Ordered list of strategies, tried front to back
pub struct StrategyChain {
    strategies: Vec<Box<dyn SeparatorStrategy>>,
}

/// What the chain settled on
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub rows: Vec<u32>,
    pub tier: DetectionTier,
    pub derived_frame_height: Option<u32>,
}

impl StrategyChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Edge lines, then brightness valleys, then the uniform grid
    pub fn standard() -> Self {
        let mut chain = Self::new();
        chain.push(Box::new(EdgeLineStrategy::new()));
        chain.push(Box::new(BrightnessValleyStrategy::new()));
        chain.push(Box::new(UniformGridStrategy::new()));
        chain
    }

    /// Append a strategy to the end of the chain
    pub fn push(&mut self, strategy: Box<dyn SeparatorStrategy>) {
        self.strategies.push(strategy);
    }

    /// Names of the strategies in order
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn run(&self, ctx: &DetectionContext) -> ChainOutcome {
        let mut rows = Vec::new();
        let mut tier = DetectionTier::EdgeLines;
        let mut derived_frame_height = None;

        for strategy in &self.strategies {
            if !strategy.should_run(ctx, &rows) {
                debug!("Skipping {} ({} rows already found)", strategy.name(), rows.len());
                continue;
            }

            let output = strategy.run(ctx, rows);
            debug!("{} produced {} rows", strategy.name(), output.rows.len());

            rows = output.rows;
            tier = strategy.tier();
            if output.derived_frame_height.is_some() {
                derived_frame_height = output.derived_frame_height;
            }
        }

        ChainOutcome {
            rows,
            tier,
            derived_frame_height,
        }
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::standard()
    }
}
