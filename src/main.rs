use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use predicate_engine::datamodel::ModelLoader;
use predicate_engine::{
    DataModel, ModelRegistry, OperatorRegistry, PersistedPredicate, Predicate, PredicateState,
    TypeDescriptor, ValueKind,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a persisted predicate against data models
    Evaluate {
        /// Path to the data model YAML file (defaults to $PREDICATE_MODELS)
        #[arg(short, long)]
        models: Option<String>,

        /// Path to the persisted predicate JSON file
        #[arg(short, long)]
        predicate: String,
    },
    /// List the built-in operators
    Operators,
    /// List every path of the data models in a file
    Paths {
        /// Path to the data model YAML file (defaults to $PREDICATE_MODELS)
        #[arg(short, long)]
        models: Option<String>,
    },
}

fn models_file(arg: Option<String>) -> anyhow::Result<String> {
    arg.or_else(|| std::env::var("PREDICATE_MODELS").ok())
        .context("No model file given; pass --models or set PREDICATE_MODELS")
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Evaluate { models, predicate } => {
            let models_path = models_file(models)?;
            let registry = ModelRegistry::new();
            let count = ModelLoader::new()
                .register_models(&models_path, &registry)
                .with_context(|| format!("Failed to load data models from {}", models_path))?;
            log::info!("Registered {} data model(s) from {}", count, models_path);

            let record = PersistedPredicate::load(&predicate)
                .with_context(|| format!("Failed to load predicate record {}", predicate))?;

            let operators = OperatorRegistry::with_builtins();
            let restored = Predicate::from_record(&record, &registry, &operators);
            if restored.state() != PredicateState::Bound {
                log::warn!(
                    "Predicate is incomplete ({:?}), it always evaluates to false",
                    restored.state()
                );
            }

            println!("{}", restored.evaluate());
        }
        Commands::Operators => {
            for op in OperatorRegistry::with_builtins().all() {
                let supported: Vec<String> = ValueKind::ALL
                    .iter()
                    .filter(|kind| op.supports(&TypeDescriptor::new(**kind)))
                    .map(|kind| kind.to_string())
                    .collect();
                println!(
                    "{:<20} {:<30} {}",
                    op.kind(),
                    op.description(),
                    supported.join(", ")
                );
            }
        }
        Commands::Paths { models } => {
            let models_path = models_file(models)?;
            let loaded = ModelLoader::new()
                .load_models(&models_path)
                .with_context(|| format!("Failed to load data models from {}", models_path))?;

            for model in loaded {
                println!("{} ({})", model.name(), model.id());
                for (path, ty) in model.schema().paths() {
                    println!("  {:<30} {}", path, ty);
                }
            }
        }
    }

    Ok(())
}
