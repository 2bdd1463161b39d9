use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// The classroom experiments that can be logged.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExperimentVariant {
    /// Plant height in sunlight vs. a dark closet.
    #[value(name = "plant")]
    #[strum(serialize = "plant")]
    #[serde(rename = "plant")]
    PlantGrowth,
    /// Time for sugar to dissolve at different water temperatures.
    Dissolving,
    /// Water left after evaporating in different spots.
    Evaporation,
    /// Water temperature under different wrappings.
    Insulation,
}

impl ExperimentVariant {
    pub fn title(self) -> &'static str {
        match self {
            Self::PlantGrowth => "🌿 식물 성장 관찰일지",
            Self::Dissolving => "🧂 용해 속도 실험",
            Self::Evaporation => "💧 증발 속도 실험",
            Self::Insulation => "🧊 보온 실험",
        }
    }

    /// Header of the measurement column, unit included.
    pub fn measurement_label(self) -> &'static str {
        match self {
            Self::PlantGrowth => "식물 키(cm)",
            Self::Dissolving => "녹는 시간(초)",
            Self::Evaporation => "남은 물의 양(mL)",
            Self::Insulation => "물 온도(°C)",
        }
    }

    /// The fixed set of groups a record may belong to, in display order.
    pub fn groups(self) -> &'static [&'static str] {
        match self {
            Self::PlantGrowth => &["☀️ 햇빛 드는 곳", "🌑 어두운 옷장"],
            Self::Dissolving => &["찬물", "따뜻한 물", "뜨거운 물"],
            Self::Evaporation => &["햇빛", "그늘", "바람"],
            Self::Insulation => &["스티로폼", "알루미늄 포일", "천", "감싸지 않음"],
        }
    }

    pub fn has_group(self, group: &str) -> bool {
        self.groups().contains(&group)
    }

    /// Accept a group by exact name, 1-based position, or the name without
    /// its emoji prefix (`"햇빛 드는 곳"`). Input matching more than one
    /// group resolves to nothing.
    pub fn resolve_group(self, input: &str) -> Option<&'static str> {
        let input = input.trim();
        if let Ok(position) = input.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|i| self.groups().get(i).copied());
        }

        let mut matches = self
            .groups()
            .iter()
            .copied()
            .filter(|group| *group == input || without_emoji(group) == Some(input));
        match (matches.next(), matches.next()) {
            (Some(group), None) => Some(group),
            _ => None,
        }
    }

    /// CSV header row: date, group, measurement, note.
    pub fn header(self) -> [&'static str; 4] {
        ["날짜", "그룹", self.measurement_label(), "메모"]
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_ref())
    }
}

/// `"☀️ 햇빛 드는 곳"` → `"햇빛 드는 곳"`; `None` when the name has no
/// leading symbol token.
fn without_emoji(group: &str) -> Option<&str> {
    let (head, rest) = group.split_once(' ')?;
    head.chars()
        .all(|c| !c.is_alphanumeric())
        .then_some(rest)
}
