use crate::error::{Result, TreePackError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which packer the pipeline drives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PackMode {
    /// Fixed `width x height` bin; blocks that do not fit are reported as unplaced.
    Fixed,
    /// Bin seeded from the first block and grown right or down on demand.
    Growing,
}

impl FromStr for PackMode {
    type Err = TreePackError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "growing" | "grow" => Ok(Self::Growing),
            _ => Err(TreePackError::UnknownVariant {
                kind: "pack mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Input orderings applied before packing. Every order except `None` is descending
/// on its criteria and falls back to the key, so results are deterministic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep caller order.
    None,
    /// Width, then height.
    Width,
    /// Height, then width.
    Height,
    /// Area, then height, then width.
    Area,
    /// Longer side, then shorter side, then height, then width.
    MaxSide,
    /// Key ascending.
    Name,
}

impl SortOrder {
    /// Orders tried by auto mode.
    pub const CANDIDATES: [SortOrder; 4] = [
        SortOrder::MaxSide,
        SortOrder::Area,
        SortOrder::Height,
        SortOrder::Width,
    ];
}

impl FromStr for SortOrder {
    type Err = TreePackError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "width" | "w" | "width_desc" => Ok(Self::Width),
            "height" | "h" | "height_desc" => Ok(Self::Height),
            "area" | "a" | "area_desc" => Ok(Self::Area),
            "maxside" | "max_side" | "max_side_desc" => Ok(Self::MaxSide),
            "name" | "name_asc" => Ok(Self::Name),
            _ => Err(TreePackError::UnknownVariant {
                kind: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackerConfig {
    #[serde(default = "default_mode")]
    pub mode: PackMode,
    /// Bin width in pixels (fixed mode only).
    #[serde(default = "default_dim")]
    pub width: u32,
    /// Bin height in pixels (fixed mode only).
    #[serde(default = "default_dim")]
    pub height: u32,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    /// Try every sort order in `SortOrder::CANDIDATES` and keep the best layout.
    #[serde(default)]
    pub auto: bool,
    /// Evaluate auto candidates in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            width: default_dim(),
            height: default_dim(),
            sort_order: default_sort_order(),
            auto: false,
            parallel: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// A zero-area fixed bin is accepted (every block ends up unplaced) but logged.
    /// Auto mode needs an ordering to vary, so it cannot be combined with `SortOrder::None`.
    pub fn validate(&self) -> Result<()> {
        if self.auto && self.sort_order == SortOrder::None {
            return Err(TreePackError::InvalidConfig(
                "auto mode tries every sort order; sort_order = none would be ignored".into(),
            ));
        }
        if self.mode == PackMode::Fixed && (self.width == 0 || self.height == 0) {
            tracing::warn!(
                width = self.width,
                height = self.height,
                "fixed bin has zero area; nothing will be placed"
            );
        }
        Ok(())
    }
}

fn default_mode() -> PackMode {
    PackMode::Growing
}
fn default_dim() -> u32 {
    1024
}
fn default_sort_order() -> SortOrder {
    SortOrder::MaxSide
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    /// Switches to fixed mode with the given bin size.
    pub fn fixed(mut self, w: u32, h: u32) -> Self {
        self.cfg.mode = PackMode::Fixed;
        self.cfg.width = w;
        self.cfg.height = h;
        self
    }
    pub fn growing(mut self) -> Self {
        self.cfg.mode = PackMode::Growing;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn auto(mut self, v: bool) -> Self {
        self.cfg.auto = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
