//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Defaults, then .env, then the process environment, then CLI flags
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file(self.cli.debug)?;
        self.parse_with_lookup(|key| std::env::var(key).ok())
    }

    /// Same layering with an explicit environment and no .env file
    pub fn parse_with_lookup<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(ms) = cli.download_ms {
            config.download_duration_ms = ms;
        }
        if let Some(ms) = cli.upload_ms {
            config.upload_duration_ms = ms;
        }
        if let Some(ms) = cli.ping_ms {
            config.ping_duration_ms = ms;
        }
        if let Some(ms) = cli.tick_ms {
            config.tick_interval_ms = ms;
        }
        if let Some(ms) = cli.start_delay_ms {
            config.start_delay_ms = ms;
        }

        if let Some(id) = cli.server {
            config.server_id = id;
        }
        if let Some(runs) = cli.runs {
            config.runs = runs;
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }

        if cli.no_geo {
            config.geo_enabled = false;
        }
        if let Some(url) = &cli.geo_url {
            config.geo_lookup_url = url.clone();
        }

        config.share = cli.share;
        if let Some(command) = &cli.share_command {
            config.share_command = Some(command.clone());
        }
        if let Some(url) = &cli.share_url {
            config.share_url = Some(url.clone());
        }

        if cli.color_overridden() {
            config.enable_color = cli.use_colors();
        } else {
            config.enable_color = config.enable_color && cli.use_colors();
        }

        // CLI-only flags
        config.json_output = cli.json;
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", display_config_summary(config));
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let server = crate::servers::find_server(config.server_id)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("unknown ({})", config.server_id));

    let mut summary = vec![
        format!("Server: {}", server),
        format!(
            "Phases: download {}ms, upload {}ms, ping {}ms",
            config.download_duration_ms, config.upload_duration_ms, config.ping_duration_ms
        ),
        format!("Tick Interval: {}ms", config.tick_interval_ms),
        format!("Start Delay: {}ms", config.start_delay_ms),
        format!("Runs: {}", config.runs),
    ];

    if let Some(seed) = config.seed {
        summary.push(format!("Seed: {}", seed));
    }

    if config.geo_enabled {
        summary.push(format!(
            "Geolocation: {} ({}s timeout)",
            config.geo_lookup_url, config.geo_timeout_seconds
        ));
    } else {
        summary.push("Geolocation: disabled".to_string());
    }

    if config.share {
        summary.push(format!(
            "Share: {}",
            config.share_command.as_deref().unwrap_or("clipboard")
        ));
    }

    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("JSON Output: {}", config.json_output));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
