use serde::{Deserialize, Serialize};

use crate::counter::CounterConfig;

/// The metrics of the ABM pipeline tracker tile, one per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    PipelineGrowth,
    Engagement,
    InfluencedRevenue,
    DealVelocity,
}

impl Preset {
    #[cfg(test)]
    pub const ALL: [Preset; 4] = [
        Preset::PipelineGrowth,
        Preset::Engagement,
        Preset::InfluencedRevenue,
        Preset::DealVelocity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Preset::PipelineGrowth => "YoY Pipeline Growth",
            Preset::Engagement => "Engagement",
            Preset::InfluencedRevenue => "Influenced Rev",
            Preset::DealVelocity => "Deal Velocity",
        }
    }

    pub fn config(self) -> CounterConfig {
        match self {
            Preset::PipelineGrowth => CounterConfig::new(87.0).duration(2.5).suffix("%"),
            Preset::Engagement => CounterConfig::new(4.2).duration(2.0).precision(1).suffix("x"),
            Preset::InfluencedRevenue => CounterConfig::new(12.4)
                .duration(2.2)
                .precision(1)
                .prefix("$")
                .suffix("M"),
            Preset::DealVelocity => CounterConfig::new(3.4).duration(2.2).precision(1).suffix("x"),
        }
    }
}
