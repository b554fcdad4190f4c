use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Restaurants, pizzas and restaurant menu offerings over HTTP")]
pub struct Cli {
    /// SQLite database file, or `:memory:`
    #[arg(long, env = "DATABASE_URL", default_value = "app.db", global = true)]
    pub database_url: String,

    #[arg(long, env = "POOL_SIZE", default_value_t = 8, global = true)]
    pub pool_size: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply migrations and serve the HTTP API
    Serve(ServeArgs),
    /// Apply pending migrations and exit
    Migrate,
    /// Replace the catalog with sample data
    Seed,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5555")]
    pub bind: SocketAddr,
}
