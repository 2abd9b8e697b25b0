// Drawing the summary charts.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::charts::*;

/// The "colorblind" palette, used for the vote share and the candidates.
pub const COLORBLIND_PALETTE: [RGBColor; 10] = [
    RGBColor(0x01, 0x73, 0xB2),
    RGBColor(0xDE, 0x8F, 0x05),
    RGBColor(0x02, 0x9E, 0x73),
    RGBColor(0xD5, 0x5E, 0x00),
    RGBColor(0xCC, 0x78, 0xBC),
    RGBColor(0xCA, 0x91, 0x61),
    RGBColor(0xFB, 0xAF, 0xE4),
    RGBColor(0x94, 0x94, 0x94),
    RGBColor(0xEC, 0xE1, 0x33),
    RGBColor(0x56, 0xB4, 0xE9),
];

/// The "bright" palette, used for the party bar charts.
pub const BRIGHT_PALETTE: [RGBColor; 10] = [
    RGBColor(0x02, 0x3E, 0xFF),
    RGBColor(0xFF, 0x7C, 0x00),
    RGBColor(0x1A, 0xC9, 0x38),
    RGBColor(0xE8, 0x00, 0x0B),
    RGBColor(0x8B, 0x2B, 0xE2),
    RGBColor(0x9F, 0x48, 0x00),
    RGBColor(0xF1, 0x4C, 0xC1),
    RGBColor(0xA3, 0xA3, 0xA3),
    RGBColor(0xFF, 0xC4, 0x00),
    RGBColor(0x00, 0xD7, 0xFF),
];

pub const PARTY_VOTES_FILE: &str = "party_votes.png";
pub const VOTE_SHARE_FILE: &str = "vote_share.png";
pub const SEATS_FILE: &str = "seats.png";
pub const TOP_CANDIDATES_FILE: &str = "top_candidates.png";

const PIE_START_ANGLE: f64 = 90.0;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Layout {
    /// A single figure with the four charts in a 2x2 grid.
    Combined,
    /// One file per chart, in a directory.
    Separate,
}

impl Layout {
    pub fn from_name(name: &str) -> ChartResult<Layout> {
        match name {
            "combined" => Ok(Layout::Combined),
            "separate" => Ok(Layout::Separate),
            x => whatever!("Unknown layout {:?}: expected 'combined' or 'separate'", x),
        }
    }
}

/// Everything that controls how the charts look. None of it changes the numbers.
#[derive(PartialEq, Debug, Clone)]
pub struct ChartStyle {
    pub title: String,
    /// Size of the combined figure. Separate charts are half of it in each direction.
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub figure_title_size: f64,
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
    pub annotation_size: f64,
    pub legend_size: f64,
    pub palette: Vec<RGBColor>,
    pub bar_palette: Vec<RGBColor>,
    /// Do not draw the `Others` slice when it holds no vote.
    pub hide_empty_others: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            title: "Election Results Analysis".to_string(),
            width: 2000,
            height: 1600,
            font_family: "sans-serif".to_string(),
            figure_title_size: 40.0,
            title_size: 28.0,
            label_size: 22.0,
            tick_size: 18.0,
            annotation_size: 16.0,
            legend_size: 20.0,
            palette: COLORBLIND_PALETTE.to_vec(),
            bar_palette: BRIGHT_PALETTE.to_vec(),
            hide_empty_others: true,
        }
    }
}

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Parses colors written as `#RRGGBB` (the `#` is optional).
pub fn parse_hex_color(s: &str) -> ChartResult<RGBColor> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        whatever!("Cannot read color {:?}: expected the #RRGGBB notation", s)
    }
    let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).unwrap_or(0);
    Ok(RGBColor(channel(0), channel(2), channel(4)))
}

pub fn palette_color(palette: &[RGBColor], idx: usize) -> RGBColor {
    if palette.is_empty() {
        BLACK
    } else {
        palette[idx % palette.len()]
    }
}

/// Axis tick for the vote totals: `1.5M`
pub fn format_millions(x: f64) -> String {
    format!("{:.1}M", x / 1_000_000.0)
}

/// Axis tick for the candidate votes: `120K`
pub fn format_thousands(x: f64) -> String {
    format!("{:.0}K", x / 1_000.0)
}

pub fn format_percentage(value: f64, total: f64) -> String {
    format!("{:.1}%", value * 100.0 / total)
}

/// The slices actually drawn in the vote share chart.
///
/// The summary always carries an `Others` entry. Depending on the style, an
/// empty one is left out of the drawing.
pub fn pie_slices(vote_share: &PieSummary, hide_empty_others: bool) -> Vec<(String, u64)> {
    let mut slices = vote_share.slices();
    if hide_empty_others && vote_share.others == 0 {
        slices.pop();
    }
    slices
}

// Leaves some room on the value axis for the annotations.
fn axis_upper_bound(max_value: f64) -> f64 {
    if max_value <= 0.0 {
        1.0
    } else {
        max_value * 1.15
    }
}

fn seat_axis_upper_bound(max_seats: u64) -> u64 {
    max_seats + max_seats / 8 + 1
}

// Ticks of the band axis fall on the band centers. Anything else gets no label.
fn band_label(y: f64, names: &[String]) -> String {
    let idx = y.round();
    if (y - idx).abs() > 0.01 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

fn draw_no_data<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    style: &ChartStyle,
) -> DrawResult<DB> {
    let area = area.titled(caption, title_font(style))?;
    let (w, h) = area.dim_in_pixel();
    let text_style = TextStyle::from((style.font_family.as_str(), style.label_size).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        "No data".to_string(),
        ((w / 2) as i32, (h / 2) as i32),
        text_style,
    ))
}

fn title_font(style: &ChartStyle) -> FontDesc<'_> {
    (style.font_family.as_str(), style.title_size)
        .into_font()
        .style(FontStyle::Bold)
}

/// Horizontal bars, the first entry at the top.
///
/// The names of `values` are written on the vertical axis and `inner_labels`,
/// if present, at the start of each bar.
struct HorizontalBars<'a> {
    caption: String,
    x_desc: &'a str,
    values: Vec<(String, u64)>,
    inner_labels: Option<Vec<String>>,
    tick_format: fn(f64) -> String,
    annotation_format: fn(f64) -> String,
    palette: &'a [RGBColor],
}

fn draw_horizontal_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    bars: &HorizontalBars,
    style: &ChartStyle,
) -> DrawResult<DB> {
    let n = bars.values.len();
    if n == 0 {
        return draw_no_data(area, &bars.caption, style);
    }
    let max = bars.values.iter().map(|(_, v)| *v).max().unwrap_or(0) as f64;
    let min = bars.values.iter().map(|(_, v)| *v).min().unwrap_or(0) as f64;
    let offset = max * 0.01;

    // One band of height 1 per entry, centered on `position(rank)`. The first
    // entry gets the highest position.
    let position = |rank: usize| (n - 1 - rank) as f64;
    let mut names_by_position: Vec<String> = vec![String::new(); n];
    for (rank, (name, _)) in bars.values.iter().enumerate() {
        names_by_position[n - 1 - rank] = name.clone();
    }

    let mut chart = ChartBuilder::on(area)
        .caption(&bars.caption, title_font(style))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(260)
        .build_cartesian_2d(0f64..axis_upper_bound(max), -0.5f64..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|y| band_label(*y, &names_by_position))
        .x_label_formatter(&|x| (bars.tick_format)(*x))
        .x_desc(bars.x_desc)
        .axis_desc_style((style.font_family.as_str(), style.label_size))
        .label_style((style.font_family.as_str(), style.tick_size))
        .draw()?;

    chart.draw_series(bars.values.iter().enumerate().map(|(rank, (_, v))| {
        let pos = position(rank);
        Rectangle::new(
            [(0.0, pos - 0.4), (*v as f64, pos + 0.4)],
            palette_color(bars.palette, rank).filled(),
        )
    }))?;

    let annotation_style =
        TextStyle::from((style.font_family.as_str(), style.annotation_size).into_font())
            .pos(Pos::new(HPos::Left, VPos::Center));
    chart.draw_series(bars.values.iter().enumerate().map(|(rank, (_, v))| {
        Text::new(
            (bars.annotation_format)(*v as f64),
            (*v as f64 + offset, position(rank)),
            annotation_style.clone(),
        )
    }))?;

    if let Some(inner_labels) = &bars.inner_labels {
        let label_offset = min * 0.005;
        chart.draw_series(inner_labels.iter().enumerate().map(|(rank, label)| {
            Text::new(
                label.clone(),
                (label_offset, position(rank)),
                annotation_style.clone(),
            )
        }))?;
    }
    Ok(())
}

fn draw_party_votes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    summary: &ElectionSummary,
    rules: &SummaryRules,
    style: &ChartStyle,
) -> DrawResult<DB> {
    let bars = HorizontalBars {
        caption: format!(
            "Total Votes by Top {} Political Parties",
            rules.top_bar_parties
        ),
        x_desc: "Total Votes (in millions)",
        values: summary.party_votes.head(rules.top_bar_parties).to_vec(),
        inner_labels: None,
        tick_format: format_millions,
        annotation_format: |x| format!("{:.2}M", x / 1_000_000.0),
        palette: &style.bar_palette,
    };
    draw_horizontal_bars(area, &bars, style)
}

fn draw_top_candidates<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    summary: &ElectionSummary,
    rules: &SummaryRules,
    style: &ChartStyle,
) -> DrawResult<DB> {
    let bars = HorizontalBars {
        caption: format!("Top {} Candidates by Votes", rules.top_candidates),
        x_desc: "Votes",
        values: summary
            .top_candidates
            .iter()
            .map(|r| (r.candidate_name.clone(), r.votes))
            .collect(),
        inner_labels: Some(
            summary
                .top_candidates
                .iter()
                .map(|r| format!("({})", r.party))
                .collect(),
        ),
        tick_format: format_thousands,
        annotation_format: |x| format!("{:.1}K", x / 1_000.0),
        palette: &style.palette,
    };
    draw_horizontal_bars(area, &bars, style)
}

fn draw_seats<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    summary: &ElectionSummary,
    rules: &SummaryRules,
    style: &ChartStyle,
) -> DrawResult<DB> {
    let caption = format!("Total Seats Won by Top {} Parties", rules.top_bar_parties);
    let seats = summary.seats.head(rules.top_bar_parties);
    let n = seats.len();
    if n == 0 {
        return draw_no_data(area, &caption, style);
    }
    let max = seats.iter().map(|(_, c)| *c).max().unwrap_or(0);
    // Whole seats only on the value axis.
    let y_max = seat_axis_upper_bound(max);
    let names: Vec<String> = seats.iter().map(|(name, _)| name.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(&caption, title_font(style))
        .margin(15)
        .x_label_area_size(220)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| band_label(*x, &names))
        .x_label_style(
            (style.font_family.as_str(), style.tick_size)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_labels((y_max as usize + 1).min(11))
        .y_label_formatter(&|y| format!("{}", y))
        .y_desc("Number of Seats")
        .axis_desc_style((style.font_family.as_str(), style.label_size))
        .label_style((style.font_family.as_str(), style.tick_size))
        .draw()?;

    chart.draw_series(seats.iter().enumerate().map(|(idx, (_, count))| {
        let x = idx as f64;
        Rectangle::new(
            [(x - 0.4, 0), (x + 0.4, *count)],
            palette_color(&style.bar_palette, idx).filled(),
        )
    }))?;

    let annotation_style =
        TextStyle::from((style.font_family.as_str(), style.annotation_size).into_font())
            .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(seats.iter().enumerate().map(|(idx, (_, count))| {
        Text::new(
            format!("{}", count),
            (idx as f64, *count),
            annotation_style.clone(),
        )
    }))?;
    Ok(())
}

fn draw_vote_share<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    summary: &ElectionSummary,
    rules: &SummaryRules,
    style: &ChartStyle,
) -> DrawResult<DB> {
    let caption = format!(
        "Vote Share by Party (Top {} + Others)",
        rules.top_pie_parties
    );
    let slices = pie_slices(&summary.vote_share, style.hide_empty_others);
    let total: u64 = slices.iter().map(|(_, v)| *v).sum();
    if total == 0 {
        return draw_no_data(area, &caption, style);
    }

    let area = area.titled(&caption, title_font(style))?;
    let (w, _) = area.dim_in_pixel();
    let (pie_area, legend_area) = area.split_horizontally(w - w * 3 / 10);

    let (pw, ph) = pie_area.dim_in_pixel();
    // The pie is positioned in backend pixels, the texts relative to the area.
    let (x0, y0) = pie_area.get_base_pixel();
    let pie_center = (x0 + (pw / 2) as i32, y0 + (ph / 2) as i32);
    let center = ((pw / 2) as i32, (ph / 2) as i32);
    let radius = pw.min(ph) as f64 * 0.42;
    let sizes: Vec<f64> = slices.iter().map(|(_, v)| *v as f64).collect();
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|idx| palette_color(&style.palette, idx))
        .collect();
    // The names go to the legend.
    let labels: Vec<String> = vec![String::new(); slices.len()];
    let mut pie = Pie::new(&pie_center, &radius, &sizes, &colors, &labels);
    pie.start_angle(PIE_START_ANGLE);
    pie.label_style((style.font_family.as_str(), style.annotation_size).into_font());
    pie_area.draw(&pie)?;

    // Percentages with one decimal, inside the slices. Angles grow clockwise
    // on screen, as in the pie itself.
    let percentage_style = TextStyle::from(
        (style.font_family.as_str(), style.annotation_size, FontStyle::Bold)
            .into_font()
            .color(&WHITE),
    )
    .pos(Pos::new(HPos::Center, VPos::Center));
    let mut angle = PIE_START_ANGLE.to_radians();
    for size in sizes.iter() {
        let sweep = std::f64::consts::TAU * size / total as f64;
        if *size > 0.0 {
            let mid = angle + sweep / 2.0;
            let pos = (
                center.0 + (radius * 0.65 * mid.cos()) as i32,
                center.1 + (radius * 0.65 * mid.sin()) as i32,
            );
            pie_area.draw(&Text::new(
                format_percentage(*size, total as f64),
                pos,
                percentage_style.clone(),
            ))?;
        }
        angle += sweep;
    }

    let legend_area = legend_area.titled(
        "Political Parties",
        (style.font_family.as_str(), style.legend_size).into_font(),
    )?;
    let row_height = (style.legend_size * 1.6) as i32;
    let swatch = (style.legend_size * 0.9) as i32;
    let text_style = TextStyle::from((style.font_family.as_str(), style.legend_size).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (idx, (name, _)) in slices.iter().enumerate() {
        let y = 10 + idx as i32 * row_height;
        legend_area.draw(&Rectangle::new(
            [(10, y), (10 + swatch, y + swatch)],
            colors[idx].filled(),
        ))?;
        legend_area.draw(&Text::new(
            name.clone(),
            (20 + swatch, y + swatch / 2),
            text_style.clone(),
        ))?;
    }
    Ok(())
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Panel {
    PartyVotes,
    VoteShare,
    Seats,
    TopCandidates,
}

impl Panel {
    // Reading order in the combined figure.
    const ALL: [Panel; 4] = [
        Panel::PartyVotes,
        Panel::VoteShare,
        Panel::Seats,
        Panel::TopCandidates,
    ];

    fn file_name(&self) -> &'static str {
        match self {
            Panel::PartyVotes => PARTY_VOTES_FILE,
            Panel::VoteShare => VOTE_SHARE_FILE,
            Panel::Seats => SEATS_FILE,
            Panel::TopCandidates => TOP_CANDIDATES_FILE,
        }
    }

    fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        summary: &ElectionSummary,
        rules: &SummaryRules,
        style: &ChartStyle,
    ) -> DrawResult<DB> {
        match self {
            Panel::PartyVotes => draw_party_votes(area, summary, rules, style),
            Panel::VoteShare => draw_vote_share(area, summary, rules, style),
            Panel::Seats => draw_seats(area, summary, rules, style),
            Panel::TopCandidates => draw_top_candidates(area, summary, rules, style),
        }
    }
}

fn draw_combined<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    summary: &ElectionSummary,
    rules: &SummaryRules,
    style: &ChartStyle,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let root = root.titled(
        &style.title,
        (style.font_family.as_str(), style.figure_title_size)
            .into_font()
            .style(FontStyle::Bold),
    )?;
    let areas = root.split_evenly((2, 2));
    for (panel, area) in Panel::ALL.iter().zip(areas.iter()) {
        panel.draw(area, summary, rules, style)?;
    }
    Ok(())
}

fn render_panel(
    path: &Path,
    size: (u32, u32),
    panel: Panel,
    summary: &ElectionSummary,
    rules: &SummaryRules,
    style: &ChartStyle,
) -> ChartResult<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)
        .and_then(|_| panel.draw(&root, summary, rules, style))
        .and_then(|_| root.present())
        .map_err(|e| ChartError::Rendering {
            message: format!("{}: {}", path.display(), e),
        })
}

/// Draws the charts of the summary.
///
/// With the combined layout, `path` is the image file. With the separate
/// layout, it is a directory that receives one image per chart.
pub fn render_summary(
    summary: &ElectionSummary,
    rules: &SummaryRules,
    style: &ChartStyle,
    layout: Layout,
    path: &str,
) -> ChartResult<()> {
    match layout {
        Layout::Combined => {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).context(WritingOutputSnafu { path })?;
                }
            }
            info!("Writing the charts to {:?}", path);
            let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
            draw_combined(&root, summary, rules, style)
                .and_then(|_| root.present())
                .map_err(|e| ChartError::Rendering {
                    message: format!("{}: {}", path, e),
                })
        }
        Layout::Separate => {
            fs::create_dir_all(path).context(WritingOutputSnafu { path })?;
            let size = (style.width / 2, style.height / 2);
            for panel in Panel::ALL {
                let p: PathBuf = [path, panel.file_name()].iter().collect();
                info!("Writing chart {:?}", p.display().to_string());
                render_panel(&p, size, panel, summary, rules, style)?;
            }
            Ok(())
        }
    }
}
