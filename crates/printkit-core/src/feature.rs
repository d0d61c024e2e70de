//! Print-feature tags.
//!
//! Every planned move carries a feature tag so the estimator can report time
//! per feature (walls, infill, travel, ...). The planners treat the tag as an
//! opaque bucketing key.

use serde::{Deserialize, Serialize};

/// Category of a printed move, used to bucket time totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PrintFeature {
    /// Unspecified moves; also holds externally added pause/extra time.
    None = 0,
    /// Outermost perimeter walls.
    OuterWall = 1,
    /// Inner perimeter walls.
    InnerWall = 2,
    /// Top/bottom skin surfaces.
    Skin = 3,
    /// Support structure walls.
    Support = 4,
    /// Skirt and brim adhesion lines.
    SkirtBrim = 5,
    /// Sparse infill.
    Infill = 6,
    /// Support infill.
    SupportInfill = 7,
    /// Travel moves routed by combing.
    MoveCombing = 8,
    /// Travel moves with retraction.
    MoveRetraction = 9,
    /// Support interface (roof/floor) lines.
    SupportInterface = 10,
    /// Prime tower lines.
    PrimeTower = 11,
    /// Deliberately slowed flow sections.
    SlowFlow = 12,
    /// Flow-advance compensation sections.
    FlowAdvance = 13,
}

impl PrintFeature {
    /// Number of feature categories (array size for per-feature tables).
    pub const COUNT: usize = 14;

    /// All feature categories in tag order.
    pub const ALL: [PrintFeature; Self::COUNT] = [
        PrintFeature::None,
        PrintFeature::OuterWall,
        PrintFeature::InnerWall,
        PrintFeature::Skin,
        PrintFeature::Support,
        PrintFeature::SkirtBrim,
        PrintFeature::Infill,
        PrintFeature::SupportInfill,
        PrintFeature::MoveCombing,
        PrintFeature::MoveRetraction,
        PrintFeature::SupportInterface,
        PrintFeature::PrimeTower,
        PrintFeature::SlowFlow,
        PrintFeature::FlowAdvance,
    ];

    /// The tag's index into per-feature tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for PrintFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrintFeature::None => "none",
            PrintFeature::OuterWall => "outer wall",
            PrintFeature::InnerWall => "inner wall",
            PrintFeature::Skin => "skin",
            PrintFeature::Support => "support",
            PrintFeature::SkirtBrim => "skirt/brim",
            PrintFeature::Infill => "infill",
            PrintFeature::SupportInfill => "support infill",
            PrintFeature::MoveCombing => "travel (combing)",
            PrintFeature::MoveRetraction => "travel (retraction)",
            PrintFeature::SupportInterface => "support interface",
            PrintFeature::PrimeTower => "prime tower",
            PrintFeature::SlowFlow => "slow flow",
            PrintFeature::FlowAdvance => "flow advance",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, feature) in PrintFeature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&PrintFeature::OuterWall).unwrap();
        assert_eq!(json, "\"outer_wall\"");
        let back: PrintFeature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PrintFeature::OuterWall);
    }
}
