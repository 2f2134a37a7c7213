//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use motodex_api::model::{MotorcycleFilters, SortBy, SortOrder};

/// Browse the Motodex motorcycle catalogue.
#[derive(Debug, Parser)]
#[command(name = "motodex", version, about)]
pub struct Cli {
    /// API base URL.
    #[arg(long, env = "MOTODEX_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory holding the local database.
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long, env = "MOTODEX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget local session data.
    Logout,
    /// List motorcycles.
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size.
        #[arg(long, default_value_t = motodex_api::model::DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    /// Show one motorcycle.
    Show {
        /// Motorcycle id.
        id: String,
    },
    /// Free-text search.
    Search {
        /// Search text.
        query: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show or clear search history.
    History {
        /// Remove all entries.
        #[arg(long)]
        clear: bool,
    },
    /// Manage saved motorcycles.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Read reviews of a motorcycle.
    Reviews {
        /// Motorcycle id.
        id: String,
        /// Page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size.
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Catalogue statistics.
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// List saved motorcycles.
    List,
    /// Save a motorcycle.
    Add {
        /// Motorcycle id.
        id: String,
        /// Personal notes.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a saved motorcycle.
    Remove {
        /// Motorcycle id.
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Price,
    Power,
    Year,
    Rating,
    Popularity,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Price => Self::Price,
            SortArg::Power => Self::Power,
            SortArg::Year => Self::Year,
            SortArg::Rating => Self::Rating,
            SortArg::Popularity => Self::Popularity,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Brand to include; repeat for several.
    #[arg(long = "brand", value_name = "BRAND")]
    pub brands: Vec<String>,

    /// Category to include; repeat for several.
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// Minimum price.
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Sort key.
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Sort descending.
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Electric motorcycles only.
    #[arg(long)]
    pub electric: bool,
}

impl FilterArgs {
    pub fn into_filters(self) -> MotorcycleFilters {
        let mut filters =
            MotorcycleFilters::new().with_price_range(self.min_price, self.max_price);
        if !self.brands.is_empty() {
            filters = filters.with_brands(self.brands);
        }
        if !self.categories.is_empty() {
            filters = filters.with_categories(self.categories);
        }
        if let Some(sort) = self.sort {
            let order = if self.desc {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            };
            filters = filters.sorted(sort.into(), order);
        }
        if self.electric {
            filters.electric = Some(true);
        }
        filters
    }
}
