use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vbdrake_core::domain::{Cause, Draw, Measure, Scenario};

use super::output::OutputFormat;

/// Rake admin-2 malaria and dengue burden estimates to admin-1 forecasts
#[derive(Parser, Debug)]
#[command(
    name = "vbdrake",
    about = "Rake admin-2 malaria and dengue burden estimates to admin-1 forecasts",
    version,
    author,
    long_about = "vbdrake scales admin-2 burden predictions so they aggregate to the \
                  admin-1 forecast totals for the same cause, scenario, measure and draw. \
                  Run a single draw with `rake`, the whole grid with `launch`, and check \
                  output completeness with `status`."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "TOML config file (defaults to VBDRAKE_CONFIG)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Rake a single draw",
        long_about = "Rakes one (cause, scenario, measure, draw) combination and writes the \
                      output file.\n\n\
                      Examples:\n  \
                      vbdrake rake --cause malaria --scenario 0 --measure death --draw 12\n  \
                      vbdrake rake --cause dengue --scenario ssp585 --measure incidence --draw 0 --format json"
    )]
    Rake(RakeArgs),

    #[command(
        about = "Rake every pending draw in the grid",
        long_about = "Expands the job grid (optionally restricted per axis), skips draws whose \
                      output already exists, and runs the rest with bounded concurrency.\n\n\
                      Examples:\n  \
                      vbdrake launch\n  \
                      vbdrake launch --cause malaria --jobs 16\n  \
                      vbdrake launch --scenario 75 --dry-run"
    )]
    Launch(LaunchArgs),

    #[command(
        about = "Report output completeness",
        long_about = "Walks the expected output grid and reports done/missing draw counts per \
                      cause, scenario and measure.\n\n\
                      Examples:\n  \
                      vbdrake status\n  \
                      vbdrake status --cause dengue --format json"
    )]
    Status(StatusArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RakeArgs {
    #[arg(long, value_enum, help = "Cause to rake")]
    pub cause: Cause,

    #[arg(
        long,
        value_parser = parse_scenario,
        help = "Climate scenario (id 0/75/76 or label ssp245/ssp126/ssp585)"
    )]
    pub scenario: Scenario,

    #[arg(long, value_enum, help = "Measure to rake")]
    pub measure: Measure,

    #[arg(long, value_parser = parse_draw, help = "Draw number (0-99)")]
    pub draw: Draw,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct LaunchArgs {
    #[arg(long, value_enum, help = "Restrict to one cause")]
    pub cause: Option<Cause>,

    #[arg(long, value_parser = parse_scenario, help = "Restrict to one scenario")]
    pub scenario: Option<Scenario>,

    #[arg(long, value_enum, help = "Restrict to one measure")]
    pub measure: Option<Measure>,

    #[arg(long, value_parser = parse_draw, help = "Restrict to one draw")]
    pub draw: Option<Draw>,

    #[arg(
        short = 'j',
        long,
        value_name = "N",
        help = "Concurrent jobs (defaults to the configured concurrency)"
    )]
    pub jobs: Option<usize>,

    #[arg(long, help = "Re-run draws whose output already exists")]
    pub force: bool,

    #[arg(long, help = "Print the plan without running anything")]
    pub dry_run: bool,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for the run manifest (defaults to the output root)"
    )]
    pub manifest_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, value_enum, help = "Restrict to one cause")]
    pub cause: Option<Cause>,

    #[arg(long, value_parser = parse_scenario, help = "Restrict to one scenario")]
    pub scenario: Option<Scenario>,

    #[arg(long, value_enum, help = "Restrict to one measure")]
    pub measure: Option<Measure>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormat,
}

/// Accept either the numeric scenario id or the SSP label.
fn parse_scenario(value: &str) -> Result<Scenario, String> {
    if let Ok(id) = value.parse::<u16>() {
        return Scenario::from_id(id).map_err(|e| e.to_string());
    }
    match value.to_lowercase().as_str() {
        "ssp245" => Ok(Scenario::Ssp245),
        "ssp126" => Ok(Scenario::Ssp126),
        "ssp585" => Ok(Scenario::Ssp585),
        other => Err(format!(
            "Unknown scenario: {}. Valid values: 0, 75, 76, ssp245, ssp126, ssp585",
            other
        )),
    }
}

fn parse_draw(value: &str) -> Result<Draw, String> {
    let parsed: u16 = value
        .parse()
        .map_err(|_| format!("Draw must be a number, got '{}'", value))?;
    Draw::new(parsed).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn scenario_parses_ids_and_labels() {
        assert_eq!(parse_scenario("0").unwrap(), Scenario::Ssp245);
        assert_eq!(parse_scenario("75").unwrap(), Scenario::Ssp126);
        assert_eq!(parse_scenario("ssp585").unwrap(), Scenario::Ssp585);
        assert!(parse_scenario("rcp45").is_err());
    }

    #[test]
    fn draw_parser_enforces_range() {
        assert!(parse_draw("42").is_ok());
        assert!(parse_draw("100").is_err());
        assert!(parse_draw("ten").is_err());
    }

    #[test]
    fn rake_args_parse() {
        let args = CliArgs::try_parse_from([
            "vbdrake", "rake", "--cause", "malaria", "--scenario", "76", "--measure", "yll",
            "--draw", "9",
        ])
        .unwrap();
        match args.command {
            Commands::Rake(rake) => {
                assert_eq!(rake.cause, Cause::Malaria);
                assert_eq!(rake.scenario, Scenario::Ssp585);
                assert_eq!(rake.measure, Measure::Yll);
                assert_eq!(rake.draw, Draw::new(9).unwrap());
            }
            other => panic!("expected rake, got {:?}", other),
        }
    }
}
