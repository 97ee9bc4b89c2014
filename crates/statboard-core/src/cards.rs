//! Display payloads for the team breakdown overlay and the team grid.
//!
//! These are pure mappings from already-fetched aggregates; nothing here
//! performs I/O.

use crate::SubjectId;
use serde::{Deserialize, Serialize};

/// Fill colors for indicator bars, cycled by position.
pub const INDICATOR_COLORS: [&str; 5] = ["#95A6DD", "#F3C96B", "#84BFDB", "#D38BC3", "#F4B77E"];

const GRID_COLUMNS: usize = 3;

/// One `{type, count}` pair as served by the team stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIndicator {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
}

/// Raw per-team breakdown, before it is shaped into cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    #[serde(default)]
    pub products: Vec<RawIndicator>,
    #[serde(default)]
    pub product_types: Vec<RawIndicator>,
    #[serde(default)]
    pub components: Vec<RawIndicator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,
    pub count: u64,
}

impl From<RawIndicator> for Indicator {
    fn from(raw: RawIndicator) -> Self {
        Self {
            name: raw.kind,
            count: raw.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorsCard {
    pub title: String,
    pub indicators: Vec<Indicator>,
}

impl IndicatorsCard {
    pub fn total(&self) -> u64 {
        self.indicators.iter().map(|i| i.count).sum()
    }

    /// Bar rows as `(indicator, fill percent, color)`.
    pub fn bars(&self) -> impl Iterator<Item = (&Indicator, u32, &'static str)> {
        let total = self.total();
        self.indicators
            .iter()
            .enumerate()
            .map(move |(n, indicator)| {
                (
                    indicator,
                    fill_percent(indicator.count, total),
                    INDICATOR_COLORS[n % INDICATOR_COLORS.len()],
                )
            })
    }
}

/// A headed card: optional icon and title above an indicators card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorsCardGroup {
    pub image: Option<String>,
    pub title: Option<String>,
    pub info: IndicatorsCard,
}

impl IndicatorsCardGroup {
    /// Header text; an empty card shows `Total: ` with no number.
    pub fn total_label(&self) -> String {
        match self.info.total() {
            0 => "Total: ".to_string(),
            total => format!("Total: {total}"),
        }
    }
}

/// Share of `count` in `total`, rounded to whole percent. An empty total fills
/// the bar completely.
pub fn fill_percent(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 100;
    }
    (100.0 * count as f64 / total as f64).round() as u32
}

/// Shape a raw team breakdown into the three cards the overlay shows.
pub fn team_cards(stats: TeamStats) -> Vec<IndicatorsCardGroup> {
    let card = |title: &str, raw: Vec<RawIndicator>| IndicatorsCard {
        title: title.to_string(),
        indicators: raw.into_iter().map(Indicator::from).collect(),
    };

    vec![
        IndicatorsCardGroup {
            image: Some("thumb_up".to_string()),
            title: Some("Products".to_string()),
            info: card("Status", stats.products),
        },
        IndicatorsCardGroup {
            image: None,
            title: None,
            info: card("Type", stats.product_types),
        },
        IndicatorsCardGroup {
            image: Some("grid_view".to_string()),
            title: Some("Components".to_string()),
            info: card("Status", stats.components),
        },
    ]
}

/// A clickable team tile on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCard {
    pub team_id: SubjectId,
    pub title: String,
    pub leader: String,
    pub count: u64,
}

/// Team tiles laid out column-major into three columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamGrid {
    pub columns: Vec<Vec<TeamCard>>,
    pub total: u64,
}

impl TeamGrid {
    pub fn new(teams: &[TeamCard]) -> Self {
        let per_column = teams.len().div_ceil(GRID_COLUMNS).max(1);
        let mut columns: Vec<Vec<TeamCard>> = teams
            .chunks(per_column)
            .map(|chunk| chunk.to_vec())
            .collect();
        columns.resize(GRID_COLUMNS, Vec::new());

        Self {
            columns,
            total: teams.iter().map(|t| t.count).sum(),
        }
    }

    /// Whether `team` is the subject of the currently open overlay.
    pub fn is_active(team: &TeamCard, open_subject: Option<SubjectId>) -> bool {
        open_subject == Some(team.team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: &str, count: u64) -> RawIndicator {
        RawIndicator {
            kind: kind.to_string(),
            count,
        }
    }

    fn team(id: i64, count: u64) -> TeamCard {
        TeamCard {
            team_id: SubjectId(id),
            title: format!("Team {id}"),
            leader: "Lead".to_string(),
            count,
        }
    }

    #[test]
    fn test_team_cards_shape() {
        let cards = team_cards(TeamStats {
            products: vec![raw("Active", 3), raw("Retired", 1)],
            product_types: vec![raw("Internal", 4)],
            components: vec![],
        });

        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title.as_deref(), Some("Products"));
        assert_eq!(cards[0].image.as_deref(), Some("thumb_up"));
        assert_eq!(cards[0].info.title, "Status");
        assert_eq!(cards[0].info.indicators[1].name, "Retired");
        assert_eq!(cards[0].total_label(), "Total: 4");
        assert!(cards[1].title.is_none());
        assert_eq!(cards[1].info.title, "Type");
        assert_eq!(cards[2].image.as_deref(), Some("grid_view"));
        assert_eq!(cards[2].total_label(), "Total: ");
    }

    #[test]
    fn test_team_stats_decodes_camel_case() {
        let json = r#"{"products":[{"type":"Active","count":2}],"productTypes":[{"type":"SaaS","count":1}]}"#;
        let stats: TeamStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.products[0].kind, "Active");
        assert_eq!(stats.product_types[0].count, 1);
        assert!(stats.components.is_empty());
    }

    #[test]
    fn test_fill_percent() {
        assert_eq!(fill_percent(1, 3), 33);
        assert_eq!(fill_percent(2, 3), 67);
        assert_eq!(fill_percent(0, 0), 100);
    }

    #[test]
    fn test_bar_colors_cycle() {
        let card = IndicatorsCard {
            title: "Status".to_string(),
            indicators: (0..6)
                .map(|n| Indicator {
                    name: n.to_string(),
                    count: 1,
                })
                .collect(),
        };
        let colors: Vec<_> = card.bars().map(|(_, _, color)| color).collect();
        assert_eq!(colors[0], colors[5]);
        assert_eq!(colors[1], "#F3C96B");
    }

    #[test]
    fn test_team_grid_columns() {
        let teams: Vec<_> = (1..=7).map(|id| team(id, id as u64)).collect();
        let grid = TeamGrid::new(&teams);

        assert_eq!(grid.columns.len(), 3);
        assert_eq!(grid.columns[0].len(), 3);
        assert_eq!(grid.columns[1].len(), 3);
        assert_eq!(grid.columns[2].len(), 1);
        assert_eq!(grid.columns[1][0].team_id, SubjectId(4));
        assert_eq!(grid.total, 28);
    }

    #[test]
    fn test_team_grid_empty() {
        let grid = TeamGrid::new(&[]);
        assert_eq!(grid.columns.len(), 3);
        assert!(grid.columns.iter().all(Vec::is_empty));
        assert_eq!(grid.total, 0);
    }

    #[test]
    fn test_active_team() {
        let t = team(2, 1);
        assert!(TeamGrid::is_active(&t, Some(SubjectId(2))));
        assert!(!TeamGrid::is_active(&t, Some(SubjectId(3))));
        assert!(!TeamGrid::is_active(&t, None));
    }
}
