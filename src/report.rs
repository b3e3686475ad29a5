//! Leaderboard reports over finalized aggregates.
//!
//! Joins the merge phase's output with the movie-title table, filters by a
//! minimum review count, and extracts four top-N boards: highest positive
//! percentage, lowest average, highest average, highest negative percentage.
//! The title file is legacy latin-1 text; the exported CSV leads with a BOM
//! so spreadsheet tools render non-ASCII titles.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::config::{CountOrder, ReportOptions};

/// One row of the title lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEntry {
    pub movie_id: u32,
    pub year: Option<u32>,
    pub title: String,
}

/// Movie-id → title lookup, loaded once and read-only afterwards.
#[derive(Debug, Default)]
pub struct TitleTable {
    entries: HashMap<u32, TitleEntry>,
}

impl TitleTable {
    /// Load a `movie_id,year,title` file. The file is latin-1, not UTF-8;
    /// it is decoded permissively and a bad line never fails the load.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("cannot read title file {}", path.display()))?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
        let mut entries = HashMap::new();
        for line in text.lines() {
            if let Some(entry) = parse_title_line(line) {
                entries.insert(entry.movie_id, entry);
            }
        }
        debug!(titles = entries.len(), "loaded title table");
        Self { entries }
    }

    pub fn get(&self, movie_id: u32) -> Option<&TitleEntry> {
        self.entries.get(&movie_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Titles may contain the delimiter, so only the first two commas split.
fn parse_title_line(line: &str) -> Option<TitleEntry> {
    let (id_raw, rest) = line.split_once(',')?;
    let (year_raw, title) = rest.split_once(',')?;
    let movie_id = id_raw.trim().parse().ok()?;
    let year = year_raw.trim().parse().ok();
    Some(TitleEntry {
        movie_id,
        year,
        title: title.trim().to_string(),
    })
}

/// One joined, percentage-bearing row, ready for ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieSummary {
    pub movie_id: u32,
    pub avg_rating: f64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub total: u64,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    /// Empty when the movie id has no title entry; the row is kept.
    pub title: String,
}

/// Parse the merge phase's finalized lines, mapping the three count columns
/// according to `order` and recomputing a total that disagrees with the sum
/// of its counts. Malformed lines are skipped.
pub fn load_finalized(text: &str, order: CountOrder) -> Vec<MovieSummary> {
    let mut rows = Vec::new();
    let mut skipped = 0u64;
    for line in text.lines() {
        match parse_finalized_line(line, order) {
            Some(row) => rows.push(row),
            None if line.trim().is_empty() => {}
            None => skipped += 1,
        }
    }
    debug!(rows = rows.len(), skipped, "loaded finalized aggregates");
    rows
}

fn parse_finalized_line(line: &str, order: CountOrder) -> Option<MovieSummary> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 6 {
        return None;
    }
    let movie_id: u32 = fields[0].trim().parse().ok()?;
    let avg_rating: f64 = fields[1].trim().parse().ok()?;
    let c3: u64 = fields[2].trim().parse().ok()?;
    let c4: u64 = fields[3].trim().parse().ok()?;
    let c5: u64 = fields[4].trim().parse().ok()?;
    let recorded_total: u64 = fields[5].trim().parse().ok()?;

    let (positive, negative, neutral) = match order {
        CountOrder::PosNegNeu => (c3, c4, c5),
        CountOrder::PosNeuNeg => (c3, c5, c4),
    };
    // Trust the counts over the recorded total.
    let total = positive + negative + neutral;
    if total != recorded_total {
        debug!(movie_id, recorded_total, total, "recomputed inconsistent total");
    }
    let (positive_percentage, negative_percentage) = if total == 0 {
        (0.0, 0.0)
    } else {
        (
            positive as f64 / total as f64 * 100.0,
            negative as f64 / total as f64 * 100.0,
        )
    };

    Some(MovieSummary {
        movie_id,
        avg_rating,
        positive,
        negative,
        neutral,
        total,
        positive_percentage,
        negative_percentage,
        title: String::new(),
    })
}

/// Attach titles to summaries. Ids without a title entry keep an empty title
/// rather than disappearing from the report.
pub fn join_titles(rows: &mut [MovieSummary], titles: &TitleTable) {
    for row in rows {
        if let Some(entry) = titles.get(row.movie_id) {
            row.title = entry.title.clone();
        }
    }
}

/// A ranked top-N slice of the summaries under one metric.
#[derive(Debug, Clone)]
pub struct Board {
    pub category: String,
    pub rows: Vec<MovieSummary>,
}

fn board(
    rows: &[MovieSummary],
    category: String,
    metric: impl Fn(&MovieSummary) -> f64,
    ascending: bool,
    top_n: usize,
) -> Board {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let by_metric = metric(a).total_cmp(&metric(b));
        let by_metric = if ascending { by_metric } else { by_metric.reverse() };
        by_metric
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.movie_id.cmp(&b.movie_id))
    });
    sorted.truncate(top_n);
    Board {
        category,
        rows: sorted,
    }
}

/// Build the four leaderboards from joined summaries. Rows under the review
/// threshold are excluded from every board regardless of their metrics.
pub fn build_leaderboards(rows: &[MovieSummary], opts: &ReportOptions) -> Vec<Board> {
    let eligible: Vec<MovieSummary> = rows
        .iter()
        .filter(|r| r.total >= opts.min_reviews)
        .cloned()
        .collect();
    debug!(
        eligible = eligible.len(),
        dropped = rows.len() - eligible.len(),
        min_reviews = opts.min_reviews,
        "applied review threshold"
    );

    let n = opts.top_n;
    vec![
        board(
            &eligible,
            format!("Top {n} Highest Positive %"),
            |r| r.positive_percentage,
            false,
            n,
        ),
        board(
            &eligible,
            format!("Top {n} Lowest Avg Ratings"),
            |r| r.avg_rating,
            true,
            n,
        ),
        board(
            &eligible,
            format!("Top {n} Highest Avg Ratings"),
            |r| r.avg_rating,
            false,
            n,
        ),
        board(
            &eligible,
            format!("Top {n} Highest Negative %"),
            |r| r.negative_percentage,
            false,
            n,
        ),
    ]
}

/// Quote a CSV field only when it needs it.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Write the concatenated boards as CSV. The leading BOM makes spreadsheet
/// tools pick UTF-8 for the non-ASCII titles.
pub fn write_report(boards: &[Board], mut writer: impl Write) -> Result<()> {
    write!(writer, "\u{feff}")?;
    writeln!(
        writer,
        "category,title,avg_rating,positive_percentage,negative_percentage"
    )?;
    for b in boards {
        for row in &b.rows {
            writeln!(
                writer,
                "{},{},{:.2},{:.2},{:.2}",
                csv_field(&b.category),
                csv_field(&row.title),
                row.avg_rating,
                row.positive_percentage,
                row.negative_percentage
            )?;
        }
    }
    Ok(())
}

/// Run the whole report: validate inputs, load, join, rank, export.
///
/// Missing input files are fatal before any processing begins, unlike the
/// per-line tolerance everywhere else.
pub fn generate(
    aggregates: &Path,
    titles: &Path,
    output: &Path,
    opts: &ReportOptions,
) -> Result<Vec<Board>> {
    if !aggregates.exists() {
        bail!("aggregate stream not found: {}", aggregates.display());
    }
    if !titles.exists() {
        bail!("title file not found: {}", titles.display());
    }

    let title_table = TitleTable::load(titles)?;
    let text = fs::read_to_string(aggregates)
        .with_context(|| format!("cannot read aggregate stream {}", aggregates.display()))?;
    let mut rows = load_finalized(&text, opts.count_order);
    join_titles(&mut rows, &title_table);

    let boards = build_leaderboards(&rows, opts);
    let file = fs::File::create(output)
        .with_context(|| format!("cannot create report {}", output.display()))?;
    write_report(&boards, file)?;
    info!(report = %output.display(), boards = boards.len(), "report written");
    Ok(boards)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(movie_id: u32, avg: f64, pos: u64, neg: u64, neu: u64) -> MovieSummary {
        let total = pos + neg + neu;
        MovieSummary {
            movie_id,
            avg_rating: avg,
            positive: pos,
            negative: neg,
            neutral: neu,
            total,
            positive_percentage: pos as f64 / total as f64 * 100.0,
            negative_percentage: neg as f64 / total as f64 * 100.0,
            title: String::new(),
        }
    }

    #[test]
    fn title_line_splits_on_first_two_commas_only() {
        let entry = parse_title_line("0000123,1999,Title, With Comma").unwrap();
        assert_eq!(entry.movie_id, 123);
        assert_eq!(entry.year, Some(1999));
        assert_eq!(entry.title, "Title, With Comma");
    }

    #[test]
    fn title_year_may_be_unknown() {
        let entry = parse_title_line("17,NULL,Some Film").unwrap();
        assert_eq!(entry.year, None);
        assert!(parse_title_line("no commas here").is_none());
        assert!(parse_title_line("x,1999,Bad Id").is_none());
    }

    #[test]
    fn title_table_decodes_latin1() {
        // 0xE9 is é in latin-1 and invalid UTF-8.
        let table = TitleTable::from_bytes(b"1,2003,Caf\xe9 Stories\n2,1999,Plain\n");
        assert_eq!(table.get(1).unwrap().title, "Caf\u{e9} Stories");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn finalized_lines_parse_and_self_heal() {
        let rows = load_finalized("7,3.33,2,1,0,99\nbad line\n", CountOrder::PosNegNeu);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.total, 3); // healed from 99
        assert_eq!((row.positive, row.negative, row.neutral), (2, 1, 0));
    }

    #[test]
    fn count_order_remaps_columns() {
        let rows = load_finalized("7,3.00,2,1,3,6", CountOrder::PosNeuNeg);
        let row = &rows[0];
        assert_eq!((row.positive, row.neutral, row.negative), (2, 1, 3));
    }

    #[test]
    fn percentages_count_neutral_in_denominator() {
        let rows = load_finalized("7,3.00,1,1,2,4", CountOrder::PosNegNeu);
        let row = &rows[0];
        assert_eq!(row.positive_percentage, 25.0);
        assert_eq!(row.negative_percentage, 25.0);
    }

    #[test]
    fn unmatched_ids_keep_empty_title() {
        let table = TitleTable::from_bytes(b"1,2000,Known\n");
        let mut rows = vec![summary(1, 4.0, 10, 0, 0), summary(2, 3.0, 5, 0, 0)];
        join_titles(&mut rows, &table);
        assert_eq!(rows[0].title, "Known");
        assert_eq!(rows[1].title, "");
    }

    #[test]
    fn review_threshold_excludes_small_samples_everywhere() {
        // The total=50 row has the best positive % in the dataset and still
        // may not appear on any board.
        let rows = vec![summary(1, 5.0, 50, 0, 0), summary(2, 3.0, 100, 50, 50)];
        let opts = ReportOptions {
            min_reviews: 100,
            ..Default::default()
        };
        for b in build_leaderboards(&rows, &opts) {
            assert!(b.rows.iter().all(|r| r.movie_id != 1), "{}", b.category);
        }
    }

    #[test]
    fn tie_breaks_are_deterministic() {
        // Same avg: larger total wins, then smaller id.
        let rows = vec![
            summary(30, 4.0, 200, 50, 50),
            summary(10, 4.0, 100, 25, 25),
            summary(20, 4.0, 100, 25, 25),
        ];
        let opts = ReportOptions {
            min_reviews: 1,
            ..Default::default()
        };
        let boards = build_leaderboards(&rows, &opts);
        let high_avg = &boards[2];
        let ids: Vec<u32> = high_avg.rows.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn report_starts_with_bom_and_quotes_commas() {
        let mut rows = vec![summary(1, 4.5, 9, 0, 1)];
        rows[0].title = "Title, With Comma".to_string();
        let boards = vec![Board {
            category: "Top 1 Highest Avg Ratings".to_string(),
            rows,
        }];
        let mut out = Vec::new();
        write_report(&boards, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert!(text.contains("category,title,avg_rating,positive_percentage,negative_percentage"));
        assert!(text.contains("Top 1 Highest Avg Ratings,\"Title, With Comma\",4.50,90.00,0.00"));
    }
}
