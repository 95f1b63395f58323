//! Strategy configuration.
//!
//! Configurations are plain serde types so they can be loaded from JSON.
//! `validate()` must pass before a strategy is built from them; the
//! strategy constructors call it themselves.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

use crate::models::Tick;

/// Default stage length of the staged strategy.
pub const DEFAULT_STAGE_LENGTH: Tick = 2995;

/// Default end of working area A.
pub const DEFAULT_BUFFER_START: usize = 15;

/// Default start of the waiting area.
pub const DEFAULT_WAITING_START: usize = 25;

/// Minimum width required by the simple strategy.
pub const SIMPLE_MIN_WIDTH: usize = 20;

/// A configuration that cannot drive a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Width must be positive.
    #[error("yard width must be greater than 0")]
    ZeroWidth,

    /// Width below what the strategy's column layout needs.
    #[error("yard width {width} is too small, at least {required} columns are needed")]
    WidthTooSmall { width: usize, required: usize },

    /// Area boundaries are not strictly increasing.
    #[error("area boundaries must satisfy s1 < s2 < s3 < s4, got {s1}, {s2}, {s3}, {s4}")]
    UnorderedBoundaries {
        s1: usize,
        s2: usize,
        s3: usize,
        s4: usize,
    },

    /// The last boundary lies beyond the yard.
    #[error("area boundary {boundary} exceeds the yard width {width}")]
    LayoutExceedsWidth { boundary: usize, width: usize },

    /// Stages must last at least one tick.
    #[error("stage length must be greater than 0")]
    ZeroStageLength,
}

/// Partition of the yard width into working areas A and B and the waiting
/// area W.
///
/// ```text
/// s1          s2          s3               s4
/// |  area A   |  area B   |  waiting area  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaLayout {
    /// `s1`: first column of area A.
    pub working_start: usize,
    /// `s2`: first column of area B.
    pub buffer_start: usize,
    /// `s3`: first column of the waiting area.
    pub waiting_start: usize,
    /// `s4`: end (exclusive) of the waiting area.
    pub waiting_end: usize,
}

impl AreaLayout {
    /// Creates a layout from the four boundaries.
    pub fn new(s1: usize, s2: usize, s3: usize, s4: usize) -> Self {
        Self {
            working_start: s1,
            buffer_start: s2,
            waiting_start: s3,
            waiting_end: s4,
        }
    }

    /// Default layout for a yard: `0, 15, 25, width`.
    pub fn for_width(width: usize) -> Self {
        Self::new(0, DEFAULT_BUFFER_START, DEFAULT_WAITING_START, width)
    }

    /// Area A, `s1..s2`.
    #[inline]
    pub fn area_a(&self) -> Range<usize> {
        self.working_start..self.buffer_start
    }

    /// Area B, `s2..s3`.
    #[inline]
    pub fn area_b(&self) -> Range<usize> {
        self.buffer_start..self.waiting_start
    }

    /// Working area A ∪ B, `s1..s3`.
    #[inline]
    pub fn working(&self) -> Range<usize> {
        self.working_start..self.waiting_start
    }

    /// Waiting area, `s3..s4`.
    #[inline]
    pub fn waiting(&self) -> Range<usize> {
        self.waiting_start..self.waiting_end
    }

    /// Whole managed span, `s1..s4`.
    #[inline]
    pub fn all(&self) -> Range<usize> {
        self.working_start..self.waiting_end
    }

    /// Checks ordering and that the layout fits a yard of `width`.
    pub fn validate(&self, width: usize) -> Result<(), ConfigError> {
        let (s1, s2, s3, s4) = (
            self.working_start,
            self.buffer_start,
            self.waiting_start,
            self.waiting_end,
        );
        if !(s1 < s2 && s2 < s3 && s3 < s4) {
            return Err(ConfigError::UnorderedBoundaries { s1, s2, s3, s4 });
        }
        if s4 > width {
            return Err(ConfigError::LayoutExceedsWidth { boundary: s4, width });
        }
        Ok(())
    }
}

/// Configuration of the time-staged strategy.
///
/// # Example
/// ```
/// use u_yard::config::{AreaLayout, StagedConfig};
///
/// let config = StagedConfig::new(35)
///     .with_layout(AreaLayout::new(0, 10, 20, 35))
///     .with_stage_length(1000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedConfig {
    /// Number of yard columns.
    pub width: usize,
    /// Area boundaries.
    pub layout: AreaLayout,
    /// Stage length `T` in ticks.
    pub stage_length: Tick,
}

impl StagedConfig {
    /// Default configuration for a yard of `width` columns.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            layout: AreaLayout::for_width(width),
            stage_length: DEFAULT_STAGE_LENGTH,
        }
    }

    /// Sets the area layout.
    pub fn with_layout(mut self, layout: AreaLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the stage length.
    pub fn with_stage_length(mut self, stage_length: Tick) -> Self {
        self.stage_length = stage_length;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.stage_length == 0 {
            return Err(ConfigError::ZeroStageLength);
        }
        self.layout.validate(self.width)
    }
}

/// Configuration of the size-keyed double-column strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleConfig {
    /// Number of yard columns.
    pub width: usize,
}

impl SimpleConfig {
    /// Configuration for a yard of `width` columns.
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.width < SIMPLE_MIN_WIDTH {
            return Err(ConfigError::WidthTooSmall {
                width: self.width,
                required: SIMPLE_MIN_WIDTH,
            });
        }
        Ok(())
    }
}
