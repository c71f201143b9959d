use std::{
    collections::{btree_map::Entry, BTreeMap},
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, bail, Context};
use clap::{ArgAction, Parser};
use console::style;
use medcheck_core::{
    detect_language, AnalysisResult, Analyzer, Config, Language, Normalizer, ReportFormat,
    RiskLevel,
};
use walkdir::WalkDir;

/// Pseudoscience checker entry point.
#[derive(Debug, Parser)]
#[command(
    name = "medcheck",
    about = "Scan medical texts for markers of pseudoscientific claims."
)]
struct Args {
    /// Path to config file (YAML). Used when present.
    #[arg(long, default_value = "medcheck.yml")]
    config: PathBuf,

    /// Text language: russian (ru), english (en) or auto. Overrides the config.
    /// Without either, each input is scanned in the language its script suggests.
    #[arg(long, short = 'l', value_name = "LANG")]
    language: Option<LanguageChoice>,

    /// Report format: text, json or html.
    #[arg(long, short = 'f', default_value = "text", value_name = "FORMAT")]
    format: String,

    /// Write the report to this path instead of stdout (single input only).
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Analyze this text instead of reading files or stdin.
    #[arg(long, value_name = "TEXT", conflicts_with = "paths")]
    text: Option<String>,

    /// Omit marker lists and highlighted text from the report.
    #[arg(long, action = ArgAction::SetTrue)]
    brief: bool,

    /// Exit non-zero when any input reaches this risk level.
    #[arg(long, value_name = "LEVEL")]
    fail_on: Option<RiskLevel>,

    /// Files or directories to analyze. Reads stdin when empty.
    #[arg(value_name = "PATH", num_args = 0..)]
    paths: Vec<PathBuf>,
}

struct Input {
    label: String,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LanguageChoice {
    Auto,
    Fixed(Language),
}

impl FromStr for LanguageChoice {
    type Err = medcheck_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(LanguageChoice::Auto);
        }
        s.parse().map(LanguageChoice::Fixed)
    }
}

/// Analyzers built on demand, one per language.
struct Analyzers {
    base: Config,
    choice: LanguageChoice,
    built: BTreeMap<Language, Analyzer>,
}

impl Analyzers {
    fn new(base: Config, choice: LanguageChoice) -> anyhow::Result<Self> {
        let mut analyzers = Self {
            base,
            choice,
            built: BTreeMap::new(),
        };
        // Pinned languages compile eagerly.
        if let LanguageChoice::Fixed(language) = choice {
            analyzers.get(language)?;
        }
        Ok(analyzers)
    }

    /// Unknown scripts fall back to Russian.
    fn language_for(&self, text: &str) -> Language {
        match self.choice {
            LanguageChoice::Fixed(language) => language,
            LanguageChoice::Auto => {
                let normalizer = Normalizer {
                    mask_urls: self.base.mask_urls,
                    mask_emails: self.base.mask_emails,
                };
                let detected = detect_language(&normalizer.normalize(text));
                log::debug!("detected {detected} script");
                detected.language().unwrap_or(Language::Russian)
            }
        }
    }

    fn for_text(&mut self, text: &str) -> anyhow::Result<&Analyzer> {
        let language = self.language_for(text);
        self.get(language)
    }

    fn get(&mut self, language: Language) -> anyhow::Result<&Analyzer> {
        match self.built.entry(language) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let analyzer = Analyzer::new(Config {
                    language,
                    ..self.base.clone()
                })?;
                Ok(entry.insert(analyzer))
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    let (mut cfg, language_pinned) = load_config(&args.config)?;
    if args.brief {
        cfg.detailed = false;
    }
    let choice = args.language.unwrap_or(if language_pinned {
        LanguageChoice::Fixed(cfg.language)
    } else {
        LanguageChoice::Auto
    });
    let format: ReportFormat = args.format.parse()?;
    let mut analyzers = Analyzers::new(cfg, choice)?;

    let inputs = collect_inputs(&args)?;
    if inputs.is_empty() {
        bail!("no supported input files found");
    }
    if args.output.is_some() && inputs.len() > 1 {
        bail!("--output accepts a single input, got {}", inputs.len());
    }

    let mut worst = RiskLevel::Low;
    for input in &inputs {
        let analyzer = analyzers.for_text(&input.text)?;
        let result = analyzer
            .analyze(&input.text)
            .with_context(|| format!("Failed to analyze {}", input.label))?;
        worst = worst.max(result.risk_level);
        let report = analyzer.render(&result, format)?;

        match &args.output {
            Some(path) => {
                save_report(&report, path)?;
                print_summary(&input.label, &result);
                println!("  report saved to {}", style(path.display()).cyan());
            }
            None => {
                if inputs.len() > 1 && format == ReportFormat::Text {
                    println!("{}", style(&input.label).bold());
                }
                println!("{report}");
            }
        }
    }

    if let Some(threshold) = args.fail_on {
        if worst >= threshold {
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Returns the config and whether it names a language explicitly.
fn load_config(path: &Path) -> anyhow::Result<(Config, bool)> {
    if !path.exists() {
        return Ok((Config::default(), false));
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Invalid config structure in {}", path.display()))
}

fn parse_config(text: &str) -> anyhow::Result<(Config, bool)> {
    if text.trim().is_empty() {
        return Ok((Config::default(), false));
    }
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    if value.is_null() {
        return Ok((Config::default(), false));
    }
    let pinned = value.get("language").is_some();
    let cfg: Config = serde_yaml::from_value(value)?;
    Ok((cfg, pinned))
}

fn collect_inputs(args: &Args) -> anyhow::Result<Vec<Input>> {
    if let Some(text) = &args.text {
        return Ok(vec![Input {
            label: "<text>".into(),
            text: text.clone(),
        }]);
    }
    if args.paths.is_empty() {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(vec![Input {
            label: "<stdin>".into(),
            text: decode(buf, "<stdin>"),
        }]);
    }

    let mut files = collect_files(&args.paths)?;
    files.sort();
    files
        .into_iter()
        .map(|path| {
            let bytes =
                fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            let label = path.display().to_string();
            Ok(Input {
                text: decode(bytes, &label),
                label,
            })
        })
        .collect()
}

fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry?;
                if entry.file_type().is_file() && is_supported(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if path.is_file() {
            if !is_supported(path) {
                return Err(anyhow!(
                    "unsupported file type {} (expected .txt, .md or .text)",
                    path.display()
                ));
            }
            files.push(path.clone());
        } else {
            return Err(anyhow!("file not found: {}", path.display()));
        }
    }
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "txt" | "md" | "text"),
        None => false,
    }
}

/// UTF-8 first; anything else is read as Latin-1, one byte per char.
fn decode(bytes: Vec<u8>, label: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("{label} is not valid UTF-8, reading it as Latin-1");
            err.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

fn save_report(report: &str, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, report).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_summary(label: &str, result: &AnalysisResult) {
    let level = match result.risk_level {
        RiskLevel::Low => style(result.risk_level).green(),
        RiskLevel::Medium => style(result.risk_level).yellow(),
        RiskLevel::High | RiskLevel::Critical => style(result.risk_level).red(),
    };
    println!(
        "{} ({} words, {} markers, risk {})",
        style(label).bold(),
        result.text_stats.words,
        result.markers_count,
        level.bold()
    );
    if let Some(warning) = &result.language_warning {
        println!("  {}", style(warning).yellow());
    }
}
