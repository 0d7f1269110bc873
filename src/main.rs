use std::net::SocketAddr;

use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movigo_backend::{
    config::Config, db, directions::HttpDirections, entities::driver, routes, AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movigo_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.server_addr());

    // Connect to database
    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    // Run migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    // Seed demo drivers if the roster is empty
    seed_drivers(&db).await;

    // Directions collaborator with its request timeout
    let directions =
        HttpDirections::new(&config).expect("Failed to build directions client");

    // Create app state
    let state = AppState {
        db,
        config: config.clone(),
        directions,
    };

    // Create router with middleware
    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

/// Seed a small demo roster so the map has drivers to rank on a fresh
/// database.
async fn seed_drivers(db: &sea_orm::DatabaseConnection) {
    let existing = driver::Entity::find()
        .count(db)
        .await
        .expect("Failed to check driver roster");

    if existing > 0 {
        return;
    }

    let roster = [
        ("James", "Wilson", 4, 4.8, 19.4326, -99.1332),
        ("David", "Brown", 5, 4.6, 19.4284, -99.1277),
        ("Michael", "Johnson", 4, 4.7, 19.4361, -99.1410),
    ];

    for (first, last, seats, rating, latitude, longitude) in roster {
        let entry = driver::ActiveModel {
            first_name: Set(first.to_string()),
            last_name: Set(last.to_string()),
            profile_image_url: Set(String::new()),
            car_image_url: Set(String::new()),
            car_seats: Set(seats),
            rating: Set(rating),
            latitude: Set(latitude),
            longitude: Set(longitude),
            ..Default::default()
        };
        entry.insert(db).await.expect("Failed to seed driver");
    }

    tracing::info!("Seeded demo driver roster");
}
