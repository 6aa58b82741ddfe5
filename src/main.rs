// ==========================================
// 配方可生产性检查 - 命令行入口
// ==========================================
// 用法:
//   formula-feasibility <targets> <stock> <history> [--output PATH] [--db PATH]
//                       [--locale en|zh-CN] [--max-depth N] [--no-save]
//   formula-feasibility runs [--db PATH] [--limit N]
// ==========================================

use anyhow::{bail, Context, Result};
use formula_feasibility::api::{AnalysisApi, AnalysisRequest, AnalysisResponse};
use formula_feasibility::config::AnalysisConfigReader;
use formula_feasibility::db::default_db_path;
use formula_feasibility::exporter::DEFAULT_REPORT_FILE;
use formula_feasibility::{i18n, logging, DatasetPaths, APP_NAME, VERSION};
use std::path::{Path, PathBuf};

/// 控制台预览的报表行数
const PREVIEW_ROWS: usize = 10;

const USAGE: &str = "\
Usage:
  formula-feasibility <targets> <stock> <history> [options]
  formula-feasibility runs [--db PATH] [--limit N]

Options:
  --output PATH      CSV report path (default: Formula_Availability_Detailed.csv)
  --db PATH          SQLite database path (default: $FORMULA_FEASIBILITY_DB_PATH or user data dir)
  --locale LOCALE    report language: en | zh-CN
  --max-depth N      maximum BOM expansion depth
  --no-save          do not record this run
  --json-log         emit logs as JSON lines

The report is written as plain CSV (no .xlsx workbook); spreadsheet tools open it directly.
";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Analyze(AnalyzeArgs),
    Runs { db: Option<PathBuf>, limit: usize },
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq)]
struct AnalyzeArgs {
    paths: DatasetPaths,
    output: PathBuf,
    db: Option<PathBuf>,
    locale: Option<String>,
    max_depth: Option<usize>,
    save: bool,
    json_log: bool,
}

fn take_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("{} requires a value", flag))
}

fn parse_args(args: Vec<String>) -> Result<Command> {
    let mut iter = args.into_iter().peekable();

    match iter.peek().map(String::as_str) {
        None | Some("-h") | Some("--help") => return Ok(Command::Help),
        Some("-V") | Some("--version") => return Ok(Command::Version),
        Some("runs") => {
            iter.next();
            let mut db = None;
            let mut limit = 20;
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--db" => db = Some(PathBuf::from(take_value(&mut iter, "--db")?)),
                    "--limit" => {
                        limit = take_value(&mut iter, "--limit")?
                            .parse()
                            .context("--limit must be a positive integer")?
                    }
                    other => bail!("unexpected argument: {}", other),
                }
            }
            return Ok(Command::Runs { db, limit });
        }
        _ => {}
    }

    let mut positional = Vec::new();
    let mut output = PathBuf::from(DEFAULT_REPORT_FILE);
    let mut db = None;
    let mut locale = None;
    let mut max_depth = None;
    let mut save = true;
    let mut json_log = false;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--output" | "-o" => output = PathBuf::from(take_value(&mut iter, "--output")?),
            "--db" => db = Some(PathBuf::from(take_value(&mut iter, "--db")?)),
            "--locale" => locale = Some(take_value(&mut iter, "--locale")?),
            "--max-depth" => {
                let depth: usize = take_value(&mut iter, "--max-depth")?
                    .parse()
                    .context("--max-depth must be a positive integer")?;
                max_depth = Some(depth);
            }
            "--no-save" => save = false,
            "--json-log" => json_log = true,
            flag if flag.starts_with("--") => bail!("unknown option: {}", flag),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let [targets, stock, history]: [PathBuf; 3] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected exactly 3 input files\n\n{}", USAGE))?;

    Ok(Command::Analyze(AnalyzeArgs {
        paths: DatasetPaths {
            targets,
            stock,
            history,
        },
        output,
        db,
        locale,
        max_depth,
        save,
        json_log,
    }))
}

fn open_api(db: Option<PathBuf>) -> Result<AnalysisApi> {
    let db_path = db.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create database directory {}", parent.display()))?;
    }
    tracing::info!(db = %db_path.display(), "使用数据库");
    AnalysisApi::open(&db_path.to_string_lossy())
        .with_context(|| format!("cannot open database {}", db_path.display()))
}

fn tr(key: &str, pairs: &[(&str, String)]) -> String {
    let borrowed: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    i18n::t_with_args(key, &borrowed)
}

fn print_summary(response: &AnalysisResponse, output: &Path) {
    let summary = &response.summary;
    println!("{}", i18n::t("cli.summary_title"));
    println!("  {}", tr("cli.total_targets", &[("count", summary.total_targets.to_string())]));
    println!("  {}", tr("cli.fully_available", &[("count", summary.fully_available.to_string())]));
    println!(
        "  {}",
        tr("cli.partially_available", &[("count", summary.partially_available.to_string())])
    );
    println!("  {}", tr("cli.unavailable", &[("count", summary.unavailable.to_string())]));
    println!(
        "  {}",
        tr(
            "cli.dq_issues",
            &[
                ("errors", response.dq_report.error_count().to_string()),
                ("warnings", response.dq_report.warning_count().to_string()),
            ]
        )
    );
    println!();

    for row in response.rows.iter().take(PREVIEW_ROWS) {
        println!(
            "  {:<16} {:<20} {:>6.1}%  {}",
            row.product_code,
            row.formula_used,
            row.availability_ratio * 100.0,
            row.missing_list
        );
    }
    if response.rows.len() > PREVIEW_ROWS {
        println!("  ... ({} more)", response.rows.len() - PREVIEW_ROWS);
    }
    println!();

    println!("{}", tr("cli.report_written", &[("path", output.display().to_string())]));
    if let Some(run_id) = &response.run_id {
        println!("{}", tr("cli.run_saved", &[("run_id", run_id.clone())]));
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    if args.json_log {
        logging::init_json();
    } else {
        logging::init();
    }
    tracing::info!("{} v{}", APP_NAME, VERSION);

    let api = open_api(args.db)?;

    let mut request = AnalysisRequest::new(args.paths);
    request.output = Some(args.output.clone());
    request.locale = args.locale;
    request.max_depth = args.max_depth;
    request.save = args.save;

    // 控制台文案跟随报表语言
    let locale = match &request.locale {
        Some(locale) => locale.clone(),
        None => api.config().get_report_locale()?,
    };
    i18n::set_locale(&locale);

    let response = api.run_analysis_with_progress(&request, |done, total| {
        if done == total || done % 100 == 0 {
            tracing::info!(done, total, "进度");
        }
    })?;

    print_summary(&response, &args.output);
    Ok(())
}

fn run_list(db: Option<PathBuf>, limit: usize) -> Result<()> {
    logging::init();
    let api = open_api(db)?;
    let runs = api.list_runs(limit)?;

    if runs.is_empty() {
        println!("{}", i18n::t("cli.no_runs"));
        return Ok(());
    }

    for run in runs {
        println!(
            "{}  {}  targets={} full={} partial={} none={}  [{} | {} | {}]",
            run.run_id,
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
            run.summary.total_targets,
            run.summary.fully_available,
            run.summary.partially_available,
            run.summary.unavailable,
            run.targets_file,
            run.stock_file,
            run.history_file,
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    match parse_args(std::env::args().skip(1).collect())? {
        Command::Help => {
            println!("{} v{}\n\n{}", APP_NAME, VERSION, USAGE);
            Ok(())
        }
        Command::Version => {
            println!("{}", VERSION);
            Ok(())
        }
        Command::Runs { db, limit } => run_list(db, limit),
        Command::Analyze(args) => run_analyze(args),
    }
}
