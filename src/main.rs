//! YaoXiang trait coherence checker - CLI

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use yaoxiang_coherence::module::ModuleId;
use yaoxiang_coherence::util::config::{self, OutputFormat};
use yaoxiang_coherence::util::diagnostic::{
    EmitterConfig, ErrorCategory, ErrorCodeDefinition, I18nRegistry, JsonEmitter, TextEmitter,
};
use yaoxiang_coherence::util::logger;
use yaoxiang_coherence::{check_graph_file, NAME, VERSION};

/// Checks that trait implementations across a module graph are coherent
#[derive(Parser, Debug)]
#[command(name = "yx-coherence")]
#[command(author = "YaoXiang Team")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check modules of a graph descriptor for orphan and overlapping implementations
    Check {
        /// Module graph descriptor (.json or .ron)
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,

        /// Module to check (repeatable); all modules when omitted
        #[arg(short, long = "module", value_name = "MODULE")]
        modules: Vec<String>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Config file, replaces the project-level coherence.toml
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Diagnostic language
        #[arg(long, value_name = "LANG")]
        lang: Option<String>,

        /// Treat duplicate implementations as errors
        #[arg(long)]
        deny_duplicates: bool,

        /// Check modules one after another instead of in parallel
        #[arg(long)]
        sequential: bool,
    },

    /// Explain an error code, or list all codes when none is given
    Explain {
        /// Error code, e.g. E4010
        #[arg(value_name = "CODE")]
        code: Option<String>,

        /// Explanation language
        #[arg(long, value_name = "LANG", default_value = "en")]
        lang: String,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Commands::Check {
            graph,
            modules,
            format,
            config: config_path,
            no_color,
            lang,
            deny_duplicates,
            sequential,
        } => {
            let mut config = config::load_config(Some(&graph), config_path.as_deref())
                .context("Failed to load configuration")?;

            // 命令行参数优先
            if let Some(format) = format {
                config.output.format = format.into();
            }
            if no_color {
                config.output.colors = false;
            }
            if let Some(lang) = lang {
                config.output.lang = lang;
            }
            if deny_duplicates {
                config.check.deny_duplicates = true;
            }
            if sequential {
                config.check.parallel = false;
            }

            logger::init_with_level(logger::level_for_verbosity(config.log.level, args.verbose));

            let modules: Vec<ModuleId> = modules.into_iter().map(ModuleId::new).collect();
            let reports = check_graph_file(&graph, &modules, &config)
                .with_context(|| format!("Failed to check: {}", graph.display()))?;

            let i18n = I18nRegistry::new(&config.output.lang);
            match config.output.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        JsonEmitter::render_reports(&reports, i18n, config.check.deny_duplicates)
                    );
                }
                OutputFormat::Text => {
                    let emitter = TextEmitter::with_config(EmitterConfig {
                        use_colors: config.output.colors,
                        ..Default::default()
                    });
                    for report in &reports {
                        print!("{}", emitter.render_report(report, i18n));
                    }
                }
            }

            let failed = reports
                .iter()
                .any(|r| r.has_errors(config.check.deny_duplicates));
            Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Explain { code, lang } => {
            logger::init_with_level(logger::level_for_verbosity(
                logger::LogLevel::Warn,
                args.verbose,
            ));
            let i18n = I18nRegistry::new(&lang);
            let Some(code) = code else {
                for category in ErrorCategory::ALL {
                    println!("{}:", category);
                    for def in ErrorCodeDefinition::by_category(category) {
                        println!("  {}  {}", def.code, i18n.get_title(def.code));
                    }
                }
                return Ok(ExitCode::SUCCESS);
            };
            let Some(def) = ErrorCodeDefinition::find(&code) else {
                bail!("Unknown error code: {}", code);
            };
            println!("{} [{}]: {}", def.code, def.category, i18n.get_title(def.code));
            println!();
            println!("{}", i18n.get_help(def.code));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
            Ok(ExitCode::SUCCESS)
        }
    }
}
