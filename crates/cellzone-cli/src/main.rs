//! Cellzone command-line interface.
//!
//! Build a region model from TOML and inspect it:
//! ```sh
//! cellzone dump model.toml --capacity
//! cellzone query model.toml 'Shield:inner' 'Shield:ZONE' all
//! cellzone check model.toml
//! ```

mod model;

use std::path::PathBuf;

use anyhow::bail;
use cellzone_core::{CellId, DumpOptions, IntervalSet};
use clap::{Parser, Subcommand};

use crate::model::ModelFile;

#[derive(Parser)]
#[command(name = "cellzone")]
#[command(about = "Cellzone: named cell-range registry for geometry models")]
#[command(version)]
struct Cli {
    /// Log registry activity at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one line per region with its committed cells.
    Dump {
        /// Path to the model file.
        model: PathBuf,
        /// Write the dump to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Append each region's reserved span.
        #[arg(long)]
        capacity: bool,
    },
    /// Resolve symbolic expressions to cell numbers.
    Query {
        /// Path to the model file.
        model: PathBuf,
        /// Expressions such as `Shield:inner:2`, `Foo:ZONE`, `100-200` or `all`.
        #[arg(required = true)]
        exprs: Vec<String>,
    },
    /// Build the model and report counts.
    Check {
        /// Path to the model file.
        model: PathBuf,
    },
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("cellzone_core=debug,cellzone=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Interval text for ascending results, the raw sequence otherwise.
fn format_cells(cells: &[CellId]) -> String {
    if cells.windows(2).all(|pair| pair[0] < pair[1]) {
        cells.iter().copied().collect::<IntervalSet>().to_string()
    } else {
        cells
            .iter()
            .map(CellId::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);
    run(cli.command)
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Dump {
            model,
            output,
            capacity,
        } => {
            let session = ModelFile::load(&model)?.build()?;
            let options = DumpOptions {
                show_capacity: capacity,
                ..Default::default()
            };
            match output {
                Some(path) => {
                    session.write_dump_with(&path, options)?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", session.dump_with(options)),
            }
            Ok(())
        }
        Commands::Query { model, exprs } => {
            let session = ModelFile::load(&model)?.build()?;
            let mut failed = 0;
            for expr in &exprs {
                match session.object_range(expr) {
                    Ok(cells) => println!("{expr}: {}", format_cells(&cells)),
                    Err(err) => {
                        eprintln!("{expr}: error: {err}");
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                bail!("{failed} of {} queries failed", exprs.len());
            }
            Ok(())
        }
        Commands::Check { model } => {
            let session = ModelFile::load(&model)?.build()?;
            let registry = session.registry();
            println!("Model is valid: {}", model.display());
            println!("  regions:     {}", registry.region_count());
            println!("  components:  {}", registry.component_count());
            println!("  active cells: {}", registry.active_count());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_args() {
        let cli = Cli::try_parse_from(["cellzone", "-v", "query", "m.toml", "Foo", "all"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Query { exprs, .. } => assert_eq!(exprs, ["Foo", "all"]),
            _ => panic!("expected query"),
        }
        assert!(Cli::try_parse_from(["cellzone", "query", "m.toml"]).is_err());
    }

    const MODEL: &str = r#"
[[region]]
name = "Foo"
size = 10
cells = [0, 1, 2, 5]
groups = { edge = [5, 0] }

[[region]]
name = "Bar"
size = 3
"#;

    fn model_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("model.toml");
        std::fs::write(&path, MODEL).unwrap();
        path
    }

    #[test]
    fn test_dump_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let model = model_file(&dir);
        let output = dir.path().join("regions.txt");
        let args: [&OsStr; 6] = [
            OsStr::new("cellzone"),
            OsStr::new("dump"),
            model.as_os_str(),
            OsStr::new("--output"),
            output.as_os_str(),
            OsStr::new("--capacity"),
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        run(cli.command).unwrap();
        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            text,
            "Bar (void) ::  [1010000, 1020000)\nFoo (fixed) :: 1000000-1000002 1000005 [1000000, 1010000)\n"
        );
    }

    #[test]
    fn test_query_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let model = model_file(&dir);

        let ok = Commands::Query {
            model: model.clone(),
            exprs: vec!["Foo:edge".into(), "all".into()],
        };
        run(ok).unwrap();

        let failing = Commands::Query {
            model,
            exprs: vec!["Foo".into(), "Nope".into(), "Foo::1".into()],
        };
        let err = run(failing).unwrap_err();
        assert_eq!(err.to_string(), "2 of 3 queries failed");
    }

    #[test]
    fn test_check_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(Commands::Check {
            model: dir.path().join("missing.toml"),
        })
        .unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_format_cells() {
        assert_eq!(format_cells(&[1, 2, 3, 7]), "1-3 7");
        assert_eq!(format_cells(&[5, 1]), "5 1");
        assert_eq!(format_cells(&[]), "");
    }
}
