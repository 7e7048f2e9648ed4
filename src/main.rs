use std::{env, fs, process::ExitCode, time::Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tag_extractor::{ProgressSink, SelectionStrategy, TagExtractor, TermWeightMatrix};

/// indicatif-backed batch progress.
struct BatchBar(ProgressBar);

impl ProgressSink for BatchBar {
    fn batch_started(&self, batch_index: usize, batch_count: usize) {
        self.0.set_length(batch_count as u64);
        self.0.set_position(batch_index as u64);
    }
}

struct Options {
    input: String,
    n_tags: usize,
    batch_size: usize,
    strategy: SelectionStrategy,
    terms_file: Option<String>,
}

fn print_usage() {
    eprintln!("Usage: tag-extractor --input FILE [--tags N] [--batch N] [--strategy heap|sort] [--terms FILE]");
    eprintln!("Input: one 'row<TAB>col<TAB>weight' triplet per line; dimensions are inferred.");
    eprintln!("Output: one 'doc_index<TAB>tag ...' line per document.");
}

fn parse_args() -> Result<Options, String> {
    let mut input = None;
    let mut n_tags = 10usize;
    let mut batch_size = 8192usize;
    let mut strategy = SelectionStrategy::default();
    let mut terms_file = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--input" => {
                input = Some(args.next().ok_or("--input requires a path")?);
            }
            "--tags" => {
                let v = args.next().ok_or("--tags requires a number")?;
                n_tags = v.parse().map_err(|_| format!("bad --tags value: {v}"))?;
            }
            "--batch" => {
                let v = args.next().ok_or("--batch requires a number")?;
                batch_size = v.parse().map_err(|_| format!("bad --batch value: {v}"))?;
            }
            "--strategy" => match args.next().as_deref() {
                Some("heap") => strategy = SelectionStrategy::BoundedHeap,
                Some("sort") => strategy = SelectionStrategy::PartialSort,
                other => return Err(format!("bad --strategy value: {other:?}")),
            },
            "--terms" => {
                terms_file = Some(args.next().ok_or("--terms requires a path")?);
            }
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(Options {
        input: input.ok_or("--input is required")?,
        n_tags,
        batch_size,
        strategy,
        terms_file,
    })
}

/// Parse 'row<TAB>col<TAB>weight' lines; '#' lines and blanks are skipped.
fn read_triplets(path: &str) -> Result<(Vec<usize>, Vec<usize>, Vec<f32>), String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let parse = |field: Option<&str>, what: &str| -> Result<String, String> {
            field
                .map(str::to_string)
                .ok_or_else(|| format!("line {}: missing {what}", lineno + 1))
        };
        let row = parse(fields.next(), "row")?;
        let col = parse(fields.next(), "col")?;
        let val = parse(fields.next(), "weight")?;
        rows.push(row.parse().map_err(|_| format!("line {}: bad row {row}", lineno + 1))?);
        cols.push(col.parse().map_err(|_| format!("line {}: bad col {col}", lineno + 1))?);
        values.push(val.parse().map_err(|_| format!("line {}: bad weight {val}", lineno + 1))?);
    }
    Ok((rows, cols, values))
}

fn main() -> ExitCode {
    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("[error] {msg}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let load_start = Instant::now();
    let (rows, cols, values) = match read_triplets(&opts.input) {
        Ok(t) => t,
        Err(msg) => {
            eprintln!("[error] {msg}");
            return ExitCode::FAILURE;
        }
    };
    let n_docs = rows.iter().max().map_or(0, |&r| r + 1);
    let n_terms = cols.iter().max().map_or(0, |&c| c + 1);
    eprintln!(
        "[info] loaded {} triplets ({} docs x {} terms) in {:.2}ms",
        values.len(),
        n_docs,
        n_terms,
        load_start.elapsed().as_secs_f64() * 1000.0
    );

    let terms: Option<Vec<String>> = match &opts.terms_file {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => Some(content.lines().map(str::to_string).collect()),
            Err(e) => {
                eprintln!("[error] cannot read {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let bar = ProgressBar::new(1);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} batch {pos}/{len}")
            .unwrap()
            .progress_chars("##-"),
    );

    let extract_start = Instant::now();
    let result = (|| {
        let matrix = TermWeightMatrix::from_triplets(n_docs, n_terms, &rows, &cols, &values)?;
        TagExtractor::new(opts.n_tags)
            .with_batch_size(opts.batch_size)
            .with_strategy(opts.strategy)
            .extract_with_progress(&matrix, &BatchBar(bar.clone()))
    })();
    bar.finish_and_clear();

    let tags = match result {
        Ok(tags) => tags,
        Err(e) => {
            eprintln!("[error] {e}");
            return ExitCode::FAILURE;
        }
    };
    eprintln!(
        "[time] extract={:.2}ms total={:.2}ms",
        extract_start.elapsed().as_secs_f64() * 1000.0,
        load_start.elapsed().as_secs_f64() * 1000.0
    );

    for (doc, list) in tags.iter() {
        let rendered: Vec<String> = list
            .iter()
            .map(|&t| match &terms {
                Some(terms) if t < terms.len() => terms[t].clone(),
                _ => t.to_string(),
            })
            .collect();
        println!("{}\t{}", doc, rendered.join(" "));
    }
    ExitCode::SUCCESS
}
