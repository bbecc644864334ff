//! IPL Score Predictor CLI
//!
//! Predicts the first-innings total from the current match situation.

use clap::{Args, Parser, Subcommand};
use ipl::features::MatchInput;
use ipl::{Config, Result, Team};

#[derive(Parser)]
#[command(name = "ipl")]
#[command(about = "Predict the first innings score of an IPL match", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// List teams in model order
    Teams,
    /// Print the feature vector for a match state
    Encode {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Predict the final score range
    Predict {
        #[command(flatten)]
        form: FormArgs,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
        /// Refuse overs with more than 5 balls after the decimal point
        #[arg(long)]
        strict: bool,
    },
    /// Enter match details at prompts, one prediction per entry
    Interactive {
        /// Refuse overs with more than 5 balls after the decimal point
        #[arg(long)]
        strict: bool,
    },
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
}

/// Match details as entered on the form
#[derive(Args, Clone, Debug)]
struct FormArgs {
    /// Batting team (name or code, e.g. "Mumbai Indians" or MI)
    #[arg(long)]
    batting: Team,
    /// Bowling team (name or code)
    #[arg(long)]
    bowling: Team,
    /// Overs completed (5.0 to 20.0, e.g. 12.4)
    #[arg(long)]
    overs: f64,
    /// Current runs
    #[arg(long)]
    runs: i64,
    /// Wickets fallen
    #[arg(long)]
    wickets: i64,
    /// Runs scored in the last 5 overs
    #[arg(long = "runs-last-5")]
    runs_last_five: i64,
    /// Wickets lost in the last 5 overs
    #[arg(long = "wickets-last-5")]
    wickets_last_five: i64,
}

impl FormArgs {
    fn into_input(self) -> MatchInput {
        MatchInput {
            batting_team: self.batting,
            bowling_team: self.bowling,
            overs: self.overs,
            runs: self.runs,
            wickets: self.wickets,
            runs_last_five: self.runs_last_five,
            wickets_last_five: self.wickets_last_five,
        }
    }
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Teams => commands::teams(),
        Commands::Encode { form } => commands::encode(form.into_input()),
        Commands::Predict {
            form,
            format,
            strict,
        } => commands::predict(&config, form.into_input(), format, strict),
        Commands::Interactive { strict } => commands::interactive(&config, strict),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use ipl::features::{check_overs, validate, FeatureVector, OversPolicy};
    use ipl::model::ModelMetadata;
    use ipl::predict::{
        format_prediction, format_prediction_csv, format_prediction_json, BurnScoreModel,
        InferenceBackend, Predictor, ScoreModel, CSV_HEADER,
    };
    use ipl::IplError;
    use std::io::{BufRead, Write};
    use std::sync::Arc;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("model")?;
        println!("Created model/ directory");

        println!("\nNext steps:");
        println!(
            "  1. Place the trained model at {}.mpk with its {}",
            config.model.path,
            ModelMetadata::sidecar_path(&config.model.path)
        );
        println!("  2. Run 'ipl model info' to check it loads");
        println!("  3. Run 'ipl interactive' or 'ipl predict --batting MI --bowling CSK ...'");

        Ok(())
    }

    pub fn teams() -> Result<()> {
        println!("Teams (model order)");
        println!("───────────────────────────────");
        for (i, team) in Team::ALL.iter().enumerate() {
            println!("  {}  {:<5} {}", i, team.code(), team.name());
        }
        Ok(())
    }

    pub fn encode(input: MatchInput) -> Result<()> {
        let state = input.into_state();
        let advisories = validate(&state, OversPolicy::Advisory)?;
        let features = FeatureVector::encode(&state)?;

        let fmt_block = |block: &[f32]| {
            block
                .iter()
                .map(|v| format!("{:.0}", v))
                .collect::<Vec<_>>()
                .join(",")
        };

        println!("Feature vector ({} values)", features.as_slice().len());
        println!("  batting:  [{}]", fmt_block(features.batting_block()));
        println!("  bowling:  [{}]", fmt_block(features.bowling_block()));
        println!("  scalars:  {:?}", features.scalars());

        for advisory in &advisories {
            println!("⚠️  {}", advisory);
        }

        Ok(())
    }

    /// Load the model once, before any prediction is attempted
    fn load_model(config: &Config) -> Result<Arc<dyn ScoreModel>> {
        let model =
            BurnScoreModel::<InferenceBackend>::load(&config.model.path, Default::default())?;
        Ok(Arc::new(model))
    }

    fn build_predictor(config: &Config, strict: bool) -> Result<Predictor> {
        let model = load_model(config)?;
        let mut predictor = Predictor::from_config(model, config);
        if strict {
            predictor = predictor.with_policy(OversPolicy::Strict);
        }
        Ok(predictor)
    }

    pub fn predict(
        config: &Config,
        input: MatchInput,
        format: OutputFormat,
        strict: bool,
    ) -> Result<()> {
        let predictor = build_predictor(config, strict)?;
        let state = input.into_state();
        let prediction = predictor.predict(&state)?;

        match format {
            OutputFormat::Table => print!("{}", format_prediction(&prediction, &state)),
            OutputFormat::Json => println!("{}", format_prediction_json(&prediction, &state)?),
            OutputFormat::Csv => {
                println!("{}", CSV_HEADER);
                println!("{}", format_prediction_csv(&prediction, &state));
            }
        }

        Ok(())
    }

    pub fn interactive(config: &Config, strict: bool) -> Result<()> {
        let predictor = build_predictor(config, strict)?;

        println!("IPL Score Predictor");
        println!("Predict the first innings score based on match progress.");
        println!("At least 5 overs should be completed. Enter 'q' to quit.\n");

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            let input = match read_form(&mut lines, predictor.policy())? {
                Some(input) => input,
                None => break,
            };
            let state = input.into_state();

            match predictor.predict(&state) {
                Ok(prediction) => print!("{}", format_prediction(&prediction, &state)),
                // Input errors are shown inline; the loop keeps going
                Err(e @ (IplError::InvalidSelection(_) | IplError::InvalidOversFormat { .. })) => {
                    println!("⚠️  {}", e)
                }
                Err(e) => return Err(e),
            }
            println!();
        }

        Ok(())
    }

    /// Prompt for every form field; `None` on EOF or quit
    fn read_form(
        lines: &mut impl Iterator<Item = std::io::Result<String>>,
        policy: OversPolicy,
    ) -> Result<Option<MatchInput>> {
        for (i, team) in Team::ALL.iter().enumerate() {
            println!("  {}. {}", i + 1, team);
        }
        let Some(batting) = ask(lines, "Batting team", |s| parse_team(s, &Team::ALL))? else {
            return Ok(None);
        };

        let options = Team::bowling_options(batting);
        for (i, team) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, team);
        }
        let Some(bowling) = ask(lines, "Bowling team", |s| parse_team(s, &options))? else {
            return Ok(None);
        };

        // Overs notation is checked as soon as it is entered; strict mode asks again
        let Some(overs) = ask(lines, "Overs completed (5.0-20.0)", |s| {
            let overs = parse_number::<f64>(s)?;
            if let Some(advisory) = check_overs(overs, policy)? {
                println!("⚠️  {}", advisory);
            }
            Ok(overs)
        })?
        else {
            return Ok(None);
        };
        let Some(runs) = ask(lines, "Current runs", parse_number::<i64>)? else {
            return Ok(None);
        };
        let Some(wickets) = ask(lines, "Wickets fallen (0-9)", parse_number::<i64>)? else {
            return Ok(None);
        };
        let Some(runs_last_five) = ask(lines, "Runs in last 5 overs", parse_number::<i64>)? else {
            return Ok(None);
        };
        let Some(wickets_last_five) =
            ask(lines, "Wickets in last 5 overs", parse_number::<i64>)?
        else {
            return Ok(None);
        };

        Ok(Some(MatchInput {
            batting_team: batting,
            bowling_team: bowling,
            overs,
            runs,
            wickets,
            runs_last_five,
            wickets_last_five,
        }))
    }

    /// Ask until `parse` accepts the answer
    fn ask<T>(
        lines: &mut impl Iterator<Item = std::io::Result<String>>,
        label: &str,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<Option<T>> {
        loop {
            print!("{}: ", label);
            std::io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => return Ok(None),
            };
            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }

            match parse(answer) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => println!("⚠️  {}", e),
            }
        }
    }

    /// Accept a list number or a team name/code from `options`
    fn parse_team(answer: &str, options: &[Team]) -> Result<Team> {
        if let Ok(n) = answer.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| options.get(i).copied())
                .ok_or_else(|| IplError::Parse(format!("choose 1 to {}", options.len())));
        }
        let team: Team = answer.parse()?;
        if !options.contains(&team) {
            return Err(IplError::InvalidSelection(team));
        }
        Ok(team)
    }

    fn parse_number<T: std::str::FromStr>(answer: &str) -> Result<T> {
        answer
            .parse()
            .map_err(|_| IplError::Parse(format!("'{}' is not a number", answer)))
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let model = BurnScoreModel::<InferenceBackend>::load(&config.model.path, Default::default())?;
        let meta = model.metadata();

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Path:           {}.mpk", config.model.path);
        println!("  Input dim:      {}", meta.input_dim);
        println!("  Hidden layers:  {:?}", meta.hidden_dims);
        if meta.teams.is_empty() {
            println!("  Teams:          (not recorded)");
        } else {
            println!("  Teams:          {}", meta.teams.join(", "));
        }
        if let Some(description) = &meta.description {
            println!("  Description:    {}", description);
        }
        println!("  Range margin:   ±{}", config.prediction.range_margin);
        println!("  Strict overs:   {}", config.prediction.strict_overs);

        Ok(())
    }

}
