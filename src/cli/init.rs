use ormgraph::error::Result;

/// Run the init command to generate the example configuration
pub async fn run(output: Option<String>) -> Result<()> {
    tracing::info!("🎨 Generating example model...");

    let config = crate::cli::example::create_example_config();

    tracing::info!("✨ Created {} example entities:", config.entity.len());
    for entity in &config.entity {
        tracing::info!(
            "   • {} ({} attributes, {} associations, {} methods)",
            entity.name,
            entity.attributes.len(),
            entity.associations.len(),
            entity.methods.len()
        );
        if let Some(desc) = &entity.description {
            tracing::info!("     {}", desc);
        }
    }

    // Output to stdout or file
    let wrote_to_file = if let Some(output_path) = &output {
        ormgraph::config::save_config(&config, output_path)?;
        tracing::info!("📝 Generated example configuration: {}", output_path);
        true
    } else {
        config.validate()?;
        let toml_string = toml::to_string_pretty(&config)?;
        println!("{}", toml_string);
        false
    };

    tracing::info!("");
    tracing::info!("🎯 This example showcases:");
    tracing::info!("   • belongsTo and hasMany associations");
    tracing::info!("   • A static login mutation and an instance property method");
    tracing::info!("   • Seed rows for the in-memory store");
    tracing::info!("");
    tracing::info!("💡 Next steps:");
    if wrote_to_file {
        tracing::info!("   1. Inspect the SDL with 'ormgraph print-schema --config <file>'");
        tracing::info!("   2. Start server with 'ormgraph serve --config <file>'");
    } else {
        tracing::info!("   1. Save the configuration to a file: ormgraph init --output ormgraph.toml");
        tracing::info!("   2. Start server with 'ormgraph serve'");
    }

    Ok(())
}
