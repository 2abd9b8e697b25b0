use crate::charts::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    pub title: Option<String>,
    #[serde(rename = "imagePath")]
    pub image_path: Option<String>,
    pub layout: Option<String>,
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
    pub render: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataSource {
    pub provider: Option<String>,
    /// Relative to the directory of the configuration file.
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChartRules {
    #[serde(rename = "topPieParties")]
    pub top_pie_parties: Option<usize>,
    #[serde(rename = "topCandidates")]
    pub top_candidates: Option<usize>,
    #[serde(rename = "topBarParties")]
    pub top_bar_parties: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct StyleSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "fontFamily")]
    pub font_family: Option<String>,
    #[serde(rename = "hideEmptyOthers")]
    pub hide_empty_others: Option<bool>,
    /// Colors in the #RRGGBB notation.
    pub palette: Option<Vec<String>>,
    #[serde(rename = "barPalette")]
    pub bar_palette: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChartConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSource", default)]
    pub data_source: DataSource,
    #[serde(default)]
    pub rules: ChartRules,
    #[serde(default)]
    pub style: StyleSettings,
}

pub fn read_chart_config(path: &str) -> ChartResult<ChartConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

pub fn read_summary(path: &str) -> ChartResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config() {
        let config: ChartConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ChartConfig::default());
    }

    #[test]
    fn full_config() {
        let js = r##"{
            "outputSettings": {"title": "Results", "imagePath": "out/charts", "layout": "separate",
                               "summaryPath": "out/summary.json", "render": true},
            "dataSource": {"provider": "xlsx", "filePath": "results.xlsx", "excelWorksheetName": "NA"},
            "rules": {"topPieParties": 4, "topCandidates": 5, "topBarParties": 8},
            "style": {"width": 1000, "height": 800, "hideEmptyOthers": false,
                      "palette": ["#000000", "#FFFFFF"]}
        }"##;
        let config: ChartConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.layout, Some("separate".to_string()));
        assert_eq!(config.data_source.excel_worksheet_name, Some("NA".to_string()));
        assert_eq!(config.rules.top_pie_parties, Some(4));
        assert_eq!(config.style.hide_empty_others, Some(false));
        assert_eq!(config.style.palette.as_ref().map(|p| p.len()), Some(2));
        assert_eq!(config.style.bar_palette, None);
    }

    #[test]
    fn wrong_types_are_rejected() {
        let res: Result<ChartConfig, _> = serde_json::from_str(r#"{"rules": {"topCandidates": "ten"}}"#);
        assert!(res.is_err());
    }
}
