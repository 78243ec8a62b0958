use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub demo: DemoConfig,
}

/// Settings for the demo binary: how large a graph to seed and which
/// relationship paths to duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    pub lines: usize,
    pub items_per_line: usize,
    pub relation_paths: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            demo: DemoConfig::default(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            lines: 2,
            items_per_line: 3,
            relation_paths: vec![
                "lines.items".to_string(),
                "note".to_string(),
                "tags".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "GRAPHDUP_"
        config = config.add_source(
            config::Environment::with_prefix("GRAPHDUP")
                .separator("_")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }
}
