use ormgraph::error::Result;
use ormgraph::schema::SchemaBuilder;
use ormgraph::store::MemoryStore;
use std::sync::Arc;

/// Print the generated SDL for a configuration file
pub fn run(config_path: String) -> Result<()> {
    tracing::info!("📖 Loading configuration from {}", config_path);
    let config = ormgraph::config::load_config(&config_path)?;

    let registry = Arc::new(config.registry()?);
    let store = Arc::new(MemoryStore::new(&registry));
    let generated = SchemaBuilder::new(registry, store).generate()?;

    tracing::info!(
        "✅ Generated {} types with {} resolvers",
        generated.ast.len(),
        generated.resolvers.resolver_count()
    );
    print!("{}", generated.typedefs);

    Ok(())
}
