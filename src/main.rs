use graphdup::config::AppConfig;
use graphdup::logic::Replicator;
use graphdup::seed;
use graphdup::store::InMemoryStore;
use itertools::Itertools;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new().filter_level(LevelFilter::Info).init();

    println!("graphdup: entity graph duplication demo");

    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: {} line(s) x {} item(s), paths [{}]",
        config.demo.lines,
        config.demo.items_per_line,
        config.demo.relation_paths.iter().join(", ")
    );

    let store = InMemoryStore::new(seed::demo_schema());
    let invoice = seed::load_demo_graph(&store, &config.demo).await?;
    println!(
        "Seeded {} entities; root invoice {}",
        store.entity_count(),
        invoice.id.as_deref().unwrap_or("?")
    );

    let replicator = Replicator::new(&store);
    let copy = replicator
        .replicate(&invoice, &config.demo.relation_paths)
        .await?;

    println!(
        "Replicated invoice {} -> {}",
        invoice.id.as_deref().unwrap_or("?"),
        copy.id.as_deref().unwrap_or("?")
    );
    println!("Store now holds {} entities:", store.entity_count());
    for entity_type in ["Invoice", "Line", "Item", "Summary", "Note", "Attachment", "Tag", "Label"]
    {
        println!(
            "  {:<10} {}",
            entity_type,
            store.entities_of_type(entity_type).len()
        );
    }

    Ok(())
}
