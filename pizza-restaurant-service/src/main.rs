use std::net::SocketAddr;

use clap::Parser;
use dotenvy::dotenv;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pizza_restaurant_service::catalog::Catalog;
use pizza_restaurant_service::config::{Cli, Commands};
use pizza_restaurant_service::handlers::{router, AppState};
use pizza_restaurant_service::seed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pizza_restaurant_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let catalog = Catalog::connect(&cli.database_url, cli.pool_size)?;
    catalog.run_migrations()?;

    match cli.command {
        Commands::Serve(args) => serve(catalog, args.bind).await,
        Commands::Migrate => {
            info!(database_url = %cli.database_url, "Database is up to date");
            Ok(())
        }
        Commands::Seed => {
            let summary = seed::seed(&catalog).await?;
            info!(
                restaurants = summary.restaurants,
                pizzas = summary.pizzas,
                offerings = summary.offerings,
                "Seeded catalog"
            );
            Ok(())
        }
    }
}

async fn serve(catalog: Catalog, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState { catalog })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Pizza restaurant service listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
