mod render;
mod screens;

use anyhow::Result;
use clap::{Parser, Subcommand};
use explorer_core::{AppConfig, FileStore, Latency, RecipeFilter, RecipesApi, SortKey};
use std::path::PathBuf;
use std::sync::Arc;

use crate::screens::{App, Category, Planner};

#[derive(Parser)]
#[command(name = "recipe-explorer")]
#[command(about = "Browse, save, and plan meals", long_about = None)]
struct Cli {
    /// Directory for favorites and the meal plan (default: ~/.recipe-explorer)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Skip the simulated network latency
    #[arg(long, global = true)]
    no_latency: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and filter recipes
    Feed {
        /// Text to search for in titles, descriptions and tags
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        cuisine: Option<String>,
        #[arg(long)]
        diet: Option<String>,
        #[arg(long)]
        meal_type: Option<String>,
        /// Only recipes that cook in at most this many minutes
        #[arg(long)]
        max_cook_time: Option<u32>,
        /// relevance, cook-time or title
        #[arg(long, default_value = "relevance")]
        sort: String,
    },
    /// Browse recipes by cuisine, diet or meal type
    Categories {
        category: Option<Category>,
        value: Option<String>,
    },
    /// Show a recipe in full
    Show { id: String },
    /// Saved recipes
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommand,
    },
    /// Weekly meal plan
    Planner {
        #[command(subcommand)]
        command: PlannerCommand,
    },
}

#[derive(Subcommand)]
enum FavoritesCommand {
    /// List favorites
    List,
    /// Save a recipe, or remove it if already saved
    Toggle { id: String },
}

#[derive(Subcommand)]
enum PlannerCommand {
    /// Print the week
    Show,
    /// Plan a recipe for a day and slot (breakfast, lunch, dinner)
    Set {
        day: String,
        slot: String,
        id: String,
    },
    /// Empty a day and slot
    Clear { day: String, slot: String },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if cli.no_latency {
        config.latency = Latency::none();
    }
    tracing::debug!(data_dir = %config.data_dir.display(), planner = config.feature_flags.planner_enabled(), "config loaded");

    let service = RecipesApi::new()
        .with_latency(config.latency)
        .with_base_url(&config.api_base_url);
    let store = FileStore::new(config.data_dir.clone());
    let app = App::new(Arc::new(service), Arc::new(store));

    let output = match cli.command {
        Commands::Feed {
            q,
            cuisine,
            diet,
            meal_type,
            max_cook_time,
            sort,
        } => {
            let filter = RecipeFilter {
                q,
                cuisine,
                diet,
                meal_type,
                max_cook_time_minutes: max_cook_time,
                sort: SortKey::parse(&sort),
            };
            app.feed(&filter).await?
        }
        Commands::Categories { category, value } => {
            app.categories(category, value.as_deref()).await?
        }
        Commands::Show { id } => app.show(&id).await?,
        Commands::Favorites { command } => match command {
            FavoritesCommand::List => app.list_favorites(),
            FavoritesCommand::Toggle { id } => app.toggle_favorite(&id).await?,
        },
        Commands::Planner { command } => {
            let planner = Planner::new(&app, config.feature_flags.planner_enabled());
            match command {
                PlannerCommand::Show => planner.show()?,
                PlannerCommand::Set { day, slot, id } => planner.set(&day, &slot, &id).await?,
                PlannerCommand::Clear { day, slot } => planner.clear(&day, &slot)?,
            }
        }
    };

    print!("{}", output);

    Ok(())
}
