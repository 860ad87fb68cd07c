use anyhow::Result;

fn main() -> Result<()> {
    // Initialize logging
    skycast_core::init()?;

    let config = skycast_core::Config::load()?;
    tracing::info!("Skycast started");

    let data_dir = config.storage.data_path();
    std::fs::create_dir_all(&data_dir)?;

    let favorites = skycast_services::FavoritesStore::open(&data_dir.join("favorites.db"))?;
    let cache = skycast_weather::ForecastCache::new(&data_dir);

    println!("Skycast - weather data core");
    println!("\nConfiguration:");
    println!("  Config directory: {}", config.config_dir.display());
    println!("  Data directory:   {}", data_dir.display());
    println!("\nState:");
    println!("  Saved locations:  {}", favorites.count()?);
    match cache.get() {
        Some(slot) => println!(
            "  Forecast slot:    {} ({}, captured {})",
            slot.location_name,
            slot.category.description(),
            slot.captured_at
        ),
        None => println!("  Forecast slot:    empty"),
    }

    Ok(())
}
