use std::process::ExitCode;

use recordargs::schema::DeclaredType;
use recordargs::{ArgsError, FieldDefinition, Parser, ParserBuilder, ParserConfig, Record, RecordDefinition};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct ModelArgs {
    name: String,
    hidden_size: u32,
    dropout: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrainingArgs {
    model: ModelArgs,
    optimizer: String,
    epochs: u16,
    learning_rate: f64,
    gpus: Vec<u8>,
    run_name: Option<String>,
    seed: Option<u64>,
    resume: bool,
}

recordargs::declare_records!(ModelArgs);

impl Record for ModelArgs {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("ModelArgs")
            .field(FieldDefinition::of::<String>("name").default_value("base").help("Model preset"))
            .field(FieldDefinition::of::<u32>("hidden_size").default_value(768))
            .field(FieldDefinition::of::<f64>("dropout").default_value(0.1))
    }
}

impl Record for TrainingArgs {
    fn definition() -> RecordDefinition {
        RecordDefinition::new("TrainingArgs")
            .field(FieldDefinition::of::<ModelArgs>("model"))
            .field(
                FieldDefinition::new("optimizer", DeclaredType::literal(["adam", "sgd", "adamw"]))
                    .default_value("adamw"),
            )
            .field(FieldDefinition::of::<u16>("epochs").help("Passes over the training set"))
            .field(FieldDefinition::of::<f64>("learning_rate").default_value(3e-4))
            .field(FieldDefinition::of::<Vec<u8>>("gpus").default_value(Vec::<u8>::new()))
            .field(FieldDefinition::of::<Option<String>>("run_name"))
            .field(FieldDefinition::of::<Option<u64>>("seed"))
            .field(FieldDefinition::of::<bool>("resume").help("Continue from the last checkpoint"))
    }
}

fn run() -> Result<TrainingArgs, ArgsError> {
    let config = ParserConfig {
        program_name: "recordargs-demo".to_string(),
        about: Some("Parse a sample training configuration".to_string()),
        ..ParserConfig::default()
    };
    let mut builder = ParserBuilder::default().config(config);
    if let Ok(path) = std::env::var("RECORDARGS_DEFAULTS") {
        builder = builder.defaults_file(path)?;
    }
    Parser::<TrainingArgs>::from_builder(builder)?.parse_env()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(args) => match serde_json::to_string_pretty(&args) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        Err(ArgsError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
