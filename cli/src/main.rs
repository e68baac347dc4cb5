mod account;
mod chat;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use larder_core::service;
use larder_core::{
    GenerationInvoker, LarderConfig, OutputForm, RawIngredient, RecipeGenerationResult,
    TransportKind,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Turn what's in the larder into a recipe, then ask about it", long_about = None)]
struct Cli {
    /// Generation transport (overrides LARDER_TRANSPORT)
    #[arg(long, global = true)]
    transport: Option<TransportKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a recipe from ingredients
    Generate {
        /// Ingredient as name or name:quantity (repeatable)
        #[arg(short, long = "ingredient", required = true)]
        ingredients: Vec<String>,
        /// Ask for the short form (name and instructions only)
        #[arg(long)]
        short: bool,
        /// Print the recipe as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a recipe, then answer questions about it read from stdin
    Chat {
        /// Ingredient as name or name:quantity (repeatable)
        #[arg(short, long = "ingredient", required = true)]
        ingredients: Vec<String>,
        /// Lift the free question limit
        #[arg(long)]
        premium: bool,
        /// Per-question timeout in seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },
    /// Serve /generate-recipe and /ask-about-recipe over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: String,
    },
    /// Log in to the account backend
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.transport {
        Some(kind) => LarderConfig::from_env_with_transport(kind)?,
        None => LarderConfig::from_env()?,
    };

    match cli.command {
        Commands::Generate {
            ingredients,
            short,
            json,
        } => {
            if short {
                config.output_form = OutputForm::Short;
            }
            let invoker = GenerationInvoker::from_config(&config)?;
            let recipe = match invoker.generate_recipe(&parse_ingredients(&ingredients)).await {
                Ok(recipe) => recipe,
                Err(e) => {
                    tracing::error!(error = %e, "Recipe generation failed");
                    anyhow::bail!(e.user_message());
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            } else {
                print_recipe(&recipe);
            }
        }
        Commands::Chat {
            ingredients,
            premium,
            timeout_secs,
        } => {
            chat::run(
                &config,
                &parse_ingredients(&ingredients),
                premium,
                std::time::Duration::from_secs(timeout_secs),
            )
            .await?;
        }
        Commands::Serve { bind } => {
            serve(&config, &bind).await?;
        }
        Commands::Login { email, password } => {
            account::login(&config.account_url, &email, &password).await?;
        }
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            account::register(&config.account_url, email, password, first_name, last_name).await?;
        }
    }

    Ok(())
}

fn parse_ingredients(args: &[String]) -> Vec<RawIngredient> {
    args.iter().map(|a| RawIngredient::parse_shorthand(a)).collect()
}

pub(crate) fn print_recipe(recipe: &RecipeGenerationResult) {
    println!("{}\n", recipe.recipe_name);

    if !recipe.ingredients.is_empty() {
        println!("Ingredients:");
        for ingredient in &recipe.ingredients {
            println!("  - {}", ingredient);
        }
        println!();
    }

    println!("Instructions:");
    for line in recipe.instructions_text().lines() {
        println!("  {}", line);
    }

    if !recipe.recommendations.is_empty() {
        println!("\nRecommendations:");
        for recommendation in &recipe.recommendations {
            println!("  - {}", recommendation);
        }
    }
}

async fn serve(config: &LarderConfig, bind: &str) -> Result<()> {
    let invoker = GenerationInvoker::from_config(config)?;
    let app = service::router(invoker);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!(
        "Generation service listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;

    Ok(())
}
