use clap::Parser;

/// This program draws the charts summarizing the results of an election.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the settings for the charts.
    /// All the other options override the values read from this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, elcharts will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The file containing the results, one row per candidate. It must have the columns
    /// candidate_name, candidate_party, candidate_votes and outcome.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx, default from the file extension) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, default election_analysis.png) The image to write. With the 'separate' layout,
    /// this is the directory where the four images are written.
    #[clap(long, value_parser)]
    pub image: Option<String>,

    /// (combined or separate, default combined) Draw all the charts in one figure, or one file per chart.
    #[clap(long, value_parser)]
    pub layout: Option<String>,

    /// If passed as an argument, no image is written.
    #[clap(long, takes_value = false)]
    pub no_render: bool,

    /// (default 10) The number of candidates in the top candidates chart.
    #[clap(long, value_parser)]
    pub top_candidates: Option<usize>,

    /// (default 6) The number of parties with their own slice in the vote share chart.
    #[clap(long, value_parser)]
    pub top_pie_parties: Option<usize>,

    /// (default 15) The number of parties in the votes and seats charts.
    #[clap(long, value_parser)]
    pub top_bar_parties: Option<usize>,

    // Other arguments
    /// (file path) If specified, the log is also appended to this file.
    #[clap(long, value_parser)]
    pub log_file: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
