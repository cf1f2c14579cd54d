mod cli;
pub mod data_processor;
pub mod excel_parser;
pub mod extract;
pub mod format;
pub mod grid;
pub mod locator;
pub mod models;
pub mod report;
pub mod report_writer;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Cli;
use data_processor::{expand_inputs, process_batch, write_outputs};
use models::AppConfig;
use std::fs;
use std::path::PathBuf;

pub use report::generate_report;

const CONFIG_FILE: &str = "config.json";

/// 获取配置文件路径
fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plant-kpi")
        .join(CONFIG_FILE)
}

/// 加载配置
pub fn load_config() -> AppConfig {
    let config_path = get_config_path();
    if config_path.exists() {
        if let Ok(content) = fs::read_to_string(&config_path) {
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(config) => return config,
                Err(e) => log::warn!("Ignoring invalid config {:?}: {}", config_path, e),
            }
        }
    }
    AppConfig::default()
}

/// 保存配置
pub fn save_config(config: &AppConfig) -> Result<()> {
    let config_path = get_config_path();

    // 创建配置目录
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    // 序列化并保存
    let content = serde_json::to_string_pretty(config).context("Failed to serialise config")?;
    fs::write(&config_path, content).context("Failed to save config")?;

    log::info!("Saved config to {:?}", config_path);
    Ok(())
}

/// 命令行入口
pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = load_config();
    if let Some(output) = &cli.output {
        config.output_path = output.to_string_lossy().to_string();
    }
    if cli.save_config {
        save_config(&config)?;
    }

    let default_date = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let requests = expand_inputs(&cli.inputs, default_date)?;
    if requests.is_empty() {
        bail!("No Excel files found");
    }
    log::info!("Processing {} workbooks", requests.len());

    let outcome = process_batch(&requests, &config);
    let result = write_outputs(&outcome, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    log::info!("{}", result.message);

    if result.generated_count == 0 {
        bail!("{}", result.message);
    }
    Ok(())
}
