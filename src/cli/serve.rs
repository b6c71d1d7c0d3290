use async_graphql::dynamic::Schema;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::{routing::get, routing::post, Router};
use ormgraph::config::SeedConfig;
use ormgraph::error::{OrmGraphError, Result};
use ormgraph::schema::{RequestContext, SchemaBuilder};
use ormgraph::store::{MemoryStore, Store};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Run the serve command to start the GraphQL server
pub async fn run(config_path: String, port: Option<u16>) -> Result<()> {
    tracing::info!("📖 Loading configuration from {}", config_path);

    let config = ormgraph::config::load_config(&config_path)?;
    let server_port = port.unwrap_or(config.server.port);

    tracing::info!("🔧 Building GraphQL schema for {} entities...", config.entity.len());

    let registry = Arc::new(config.registry()?);
    let store = crate::cli::example::register_example_methods(MemoryStore::new(&registry));
    seed_store(&store, &config.seed).await?;

    let schema = SchemaBuilder::new(registry, Arc::new(store))
        .with_cursor_style(config.server.cursor)
        .build_schema()?;

    tracing::info!("✅ Schema built successfully");
    tracing::info!("🚀 GraphQL server running on http://localhost:{}", server_port);
    tracing::info!("📊 Playground: http://localhost:{}/graphql", server_port);
    tracing::info!("📡 Subscriptions: ws://localhost:{}/ws", server_port);
    tracing::info!("💡 Press Ctrl+C to stop the server");

    start_http_server(schema, &config.server.bind, server_port).await
}

/// Insert the configured seed rows
async fn seed_store(store: &dyn Store, seeds: &[SeedConfig]) -> Result<()> {
    for seed in seeds {
        for row in &seed.rows {
            store.create(&seed.entity, row.clone()).await?;
        }
        tracing::info!("   Seeded {} {} rows", seed.rows.len(), seed.entity);
    }
    Ok(())
}

async fn start_http_server(schema: Schema, bind: &str, port: u16) -> Result<()> {
    let app = Router::new()
        .route("/graphql", post(graphql_handler).get(graphql_playground))
        .route_service("/ws", GraphQLSubscription::new(schema.clone()))
        .route("/health", get(health_check))
        .with_state(Arc::new(schema))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| OrmGraphError::Config(format!("Invalid bind address '{}': {}", bind, e)))?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        OrmGraphError::Config(format!(
            "Failed to bind to port {}: {}. Port may be in use.",
            port, e
        ))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| OrmGraphError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

async fn graphql_handler(
    State(schema): State<Arc<Schema>>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let context = RequestContext::new(json!({ "authorization": authorization }));

    let request = request.into_inner().data(Arc::new(context));
    schema.execute(request).await.into()
}

async fn graphql_playground() -> axum::response::Html<String> {
    axum::response::Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql")
            .subscription_endpoint("/ws"),
    ))
}

async fn health_check() -> &'static str {
    "OK"
}
