use log::{debug, info, warn};

use election_summary::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::charts::config_reader::*;
use crate::charts::io_common::LoadedRecords;
use crate::charts::render::{parse_hex_color, render_summary, ChartStyle, Layout};

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
pub mod render;

pub const DEFAULT_IMAGE_PATH: &str = "election_analysis.png";

#[derive(Debug, Snafu)]
pub enum ChartError {
    #[snafu(display("File '{path}' not found."))]
    SourceNotFound { path: String },
    #[snafu(display("File '{path}' is empty."))]
    SourceEmpty { path: String },
    #[snafu(display("Failed to parse file '{path}': {reason}. Please check its format."))]
    SourceMalformed { path: String, reason: String },
    #[snafu(display("Failed to parse CSV file '{path}'. Please check its format."))]
    CsvParse { source: csv::Error, path: String },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error while drawing the charts: {message}"))]
    Rendering { message: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ChartResult<T> = Result<T, ChartError>;

/// The input formats.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Excel,
}

impl Provider {
    pub fn from_name(name: &str) -> ChartResult<Provider> {
        match name {
            "csv" => Ok(Provider::Csv),
            "xlsx" | "excel" => Ok(Provider::Excel),
            x => whatever!("Provider not implemented {:?}", x),
        }
    }

    /// Guesses the provider from the extension of the file. Anything that is not
    /// an Excel workbook is read as CSV.
    pub fn from_path(path: &str) -> Provider {
        match Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
        {
            Some(ext) if ext == "xlsx" || ext == "xlsm" => Provider::Excel,
            _ => Provider::Csv,
        }
    }
}

/// Where and how to read the results.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceSettings {
    pub path: String,
    pub provider: Provider,
    pub excel_worksheet_name: Option<String>,
}

/// All the settings of one run, after merging the command line and the
/// configuration file.
#[derive(PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub source: SourceSettings,
    pub rules: SummaryRules,
    pub style: ChartStyle,
    /// None if no image should be drawn.
    pub image: Option<(String, Layout)>,
    pub summary_out: Option<String>,
    pub reference: Option<String>,
}

/// Reads the results and drops the incomplete rows.
pub fn load(source: &SourceSettings) -> ChartResult<LoadedRecords> {
    let path = source.path.as_str();
    if !Path::new(path).is_file() {
        return SourceNotFoundSnafu { path }.fail();
    }
    info!("Attempting to read results file {:?}", path);
    let rows = match source.provider {
        Provider::Csv => io_csv::read_csv_rows(path)?,
        Provider::Excel => io_excel::read_excel_rows(path, source.excel_worksheet_name.as_deref())?,
    };
    if rows.is_empty() {
        return SourceEmptySnafu { path }.fail();
    }
    let loaded = io_common::clean_rows(path, rows)?;
    if loaded.dropped > 0 {
        warn!(
            "Dropped {} rows due to missing critical values.",
            loaded.dropped
        );
    }
    if loaded.records.is_empty() {
        warn!("No complete row left in {:?}: the charts will be empty", path);
    }
    info!(
        "Read {} records from {}",
        loaded.records.len(),
        io_common::simplify_file_name(path)
    );
    Ok(loaded)
}

fn party_entries_to_json(entries: &[(String, u64)], count_name: &str) -> Vec<JSValue> {
    entries
        .iter()
        .map(|(party, count)| json!({"party": party, count_name: count}))
        .collect()
}

/// The JSON form of the summary, written with --out and compared with --reference.
pub fn build_summary_js(title: &str, loaded: &LoadedRecords, summary: &ElectionSummary) -> JSValue {
    let top_candidates: Vec<JSValue> = summary
        .top_candidates
        .iter()
        .map(|r| {
            json!({
                "name": r.candidate_name,
                "party": r.party,
                "votes": r.votes,
                "outcome": r.outcome,
            })
        })
        .collect();
    json!({
        "config": {
            "title": title,
            "droppedRows": loaded.dropped,
            "totalVotes": summary.party_votes.total(),
        },
        "results": {
            "partyVotes": party_entries_to_json(&summary.party_votes.entries, "votes"),
            "voteShare": party_entries_to_json(&summary.vote_share.slices(), "votes"),
            "seats": party_entries_to_json(&summary.seats.entries, "seats"),
            "topCandidates": top_candidates,
        }
    })
}

fn write_summary(pretty_js: &str, out: &str) -> ChartResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
        return Ok(());
    }
    info!("Writing the summary to {:?}", out);
    fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })
}

fn check_reference(pretty_js: &str, reference_path: &str) -> ChartResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {:?}", reference_path);
    Ok(())
}

/// Merges the command line and the optional configuration file.
/// The command line always wins.
pub fn resolve_settings(args: &Args) -> ChartResult<RunSettings> {
    let (config, root_dir) = match &args.config {
        Some(config_path) => {
            let config = read_chart_config(config_path)?;
            debug!("config: {:?}", config);
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, Some(root))
        }
        None => (ChartConfig::default(), None),
    };

    let path: String = match (&args.input, &config.data_source.file_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => match &root_dir {
            Some(root) => {
                let full: PathBuf = [root.as_path(), Path::new(p)].iter().collect();
                full.display().to_string()
            }
            None => p.clone(),
        },
        (None, None) => {
            whatever!("No input file provided: use --input or dataSource.filePath in the configuration")
        }
    };
    let provider = match args
        .input_type
        .as_ref()
        .or(config.data_source.provider.as_ref())
    {
        Some(name) => Provider::from_name(name)?,
        None => Provider::from_path(&path),
    };
    let source = SourceSettings {
        path,
        provider,
        excel_worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.data_source.excel_worksheet_name.clone()),
    };

    let defaults = SummaryRules::DEFAULT_RULES;
    let rules = SummaryRules {
        top_pie_parties: args
            .top_pie_parties
            .or(config.rules.top_pie_parties)
            .unwrap_or(defaults.top_pie_parties),
        top_candidates: args
            .top_candidates
            .or(config.rules.top_candidates)
            .unwrap_or(defaults.top_candidates),
        top_bar_parties: args
            .top_bar_parties
            .or(config.rules.top_bar_parties)
            .unwrap_or(defaults.top_bar_parties),
    };

    let style = build_style(&config)?;

    let layout = match args.layout.as_ref().or(config.output_settings.layout.as_ref()) {
        Some(name) => Layout::from_name(name)?,
        None => Layout::Combined,
    };
    let image = if args.no_render || config.output_settings.render == Some(false) {
        None
    } else {
        let image_path = args
            .image
            .clone()
            .or_else(|| config.output_settings.image_path.clone())
            .unwrap_or_else(|| DEFAULT_IMAGE_PATH.to_string());
        Some((image_path, layout))
    };

    Ok(RunSettings {
        source,
        rules,
        style,
        image,
        summary_out: args
            .out
            .clone()
            .or_else(|| config.output_settings.summary_path.clone()),
        reference: args.reference.clone(),
    })
}

fn build_style(config: &ChartConfig) -> ChartResult<ChartStyle> {
    let mut style = ChartStyle::default();
    if let Some(title) = &config.output_settings.title {
        style.title = title.clone();
    }
    let s = &config.style;
    if let Some(w) = s.width {
        style.width = w;
    }
    if let Some(h) = s.height {
        style.height = h;
    }
    if let Some(font) = &s.font_family {
        style.font_family = font.clone();
    }
    if let Some(hide) = s.hide_empty_others {
        style.hide_empty_others = hide;
    }
    if let Some(palette) = &s.palette {
        style.palette = palette
            .iter()
            .map(|c| parse_hex_color(c))
            .collect::<ChartResult<Vec<_>>>()?;
    }
    if let Some(palette) = &s.bar_palette {
        style.bar_palette = palette
            .iter()
            .map(|c| parse_hex_color(c))
            .collect::<ChartResult<Vec<_>>>()?;
    }
    Ok(style)
}

/// Loads the data and computes the summary, then writes and checks its JSON
/// form when requested. Nothing is written if the data cannot be loaded.
pub fn run_summary_stage(settings: &RunSettings) -> ChartResult<(ElectionSummary, JSValue)> {
    let loaded = load(&settings.source)?;
    let summary = run_summary(&loaded.records, &settings.rules);
    let summary_js = build_summary_js(&settings.style.title, &loaded, &summary);

    let pretty_js = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    if let Some(out) = &settings.summary_out {
        write_summary(&pretty_js, out)?;
    }
    if let Some(reference_path) = &settings.reference {
        check_reference(&pretty_js, reference_path)?;
    }
    Ok((summary, summary_js))
}

pub fn run_charts(args: &Args) -> ChartResult<()> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);

    let (summary, _) = run_summary_stage(&settings)?;

    match &settings.image {
        Some((image_path, layout)) => {
            render_summary(&summary, &settings.rules, &settings.style, *layout, image_path)?
        }
        None => info!("Image output disabled"),
    }
    Ok(())
}

#[cfg(test)]
fn test_dir() -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "data"].iter().collect()
}

/// Runs the test case `tests/data/{test_name}`: the summary computed from
/// `{test_name}_config.json` must match `{test_name}_expected_summary.json`.
#[cfg(test)]
fn test_wrapper(test_name: &str) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir: PathBuf = [test_dir(), PathBuf::from(test_name)].iter().collect();
    let args = Args {
        config: Some(
            dir.join(format!("{}_config.json", test_name))
                .display()
                .to_string(),
        ),
        reference: Some(
            dir.join(format!("{}_expected_summary.json", test_name))
                .display()
                .to_string(),
        ),
        no_render: true,
        ..Args::default()
    };
    let res = run_charts(&args);
    if let Err(e) = &res {
        eprintln!("An error occured {}", e);
        if let Some(bt) = snafu::ErrorCompat::backtrace(e) {
            eprintln!("trace: {}", bt);
        }
    }
    assert!(res.is_ok(), "test {} failed: {:?}", test_name, res);
}
