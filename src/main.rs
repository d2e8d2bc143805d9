use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use essay_lens_lib::services::{
    AppConfig, ConfigStore, EssayAnalyzer, ProviderClient, ProviderCredentials, ProviderKind,
};
use tracing::info;

const USAGE: &str = "Usage:
  essayLens [FILE] [--config-dir DIR] [--provider openai|gemini] [--local] [--compact]

Reads the essay from FILE, or from stdin when no file is given, and prints the report as JSON.

Options:
  --config-dir DIR   Directory holding config.json (default: platform config dir/essayLens)
  --provider NAME    Preferred provider when both keys are configured
  --local            Skip providers and use the local analyzers only
  --compact          Print single-line JSON

Environment:
  OPENAI_API_KEY, GEMINI_API_KEY   Override keys stored in config.json
  ESSAYLENS_DISABLE_FILE_LOG=1     Log to stderr only";

/// Options that take a value
const VALUE_OPTIONS: [&str; 2] = ["--config-dir", "--provider"];

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// First argument that is neither an option nor an option's value
fn positional(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_OPTIONS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(arg.clone());
        }
    }
    None
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some("-") | None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read essay from stdin")?;
            Ok(buf)
        }
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("failed to read {}", p)),
    }
}

fn build_client(config: &AppConfig) -> Result<ProviderClient> {
    let client = match config.proxy.as_ref().filter(|p| p.enabled) {
        Some(proxy) => match proxy.https.as_deref().or(proxy.http.as_deref()) {
            Some(url) => ProviderClient::with_proxy(url).context("invalid proxy configuration")?,
            None => ProviderClient::new(),
        },
        None => ProviderClient::new(),
    };

    let base_url = |name: &str| {
        config
            .providers
            .get(name)
            .and_then(|p| p.base_url.as_deref())
    };
    Ok(client.with_base_urls(base_url("openai"), base_url("gemini")))
}

fn build_analyzer(config: &AppConfig, provider: Option<&str>) -> Result<EssayAnalyzer> {
    let mut credentials = ProviderCredentials::resolve(config);
    if let Some(name) = provider {
        let Some(kind) = ProviderKind::parse(name) else {
            bail!("unknown provider '{}', expected openai or gemini", name);
        };
        credentials.preferred = Some(kind.as_str().to_string());
    }

    let mut analyzer =
        EssayAnalyzer::new(build_client(config)?, credentials, config.analysis.clone());
    for kind in [ProviderKind::OpenAi, ProviderKind::Gemini] {
        if let Some(model) = config.providers.get(kind.as_str()).and_then(|p| p.model.clone()) {
            analyzer = analyzer.with_model(kind, model);
        }
    }
    Ok(analyzer)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    essay_lens_lib::init_logging();

    let config_dir = parse_arg_value(&args, "--config-dir")
        .map(PathBuf::from)
        .or_else(ConfigStore::default_config_dir)
        .context("could not determine a config directory; pass --config-dir")?;
    let store = ConfigStore::new(config_dir);
    let config = store
        .load()
        .with_context(|| format!("failed to load {}", store.config_file().display()))?;

    let input_path = positional(&args);
    let text = read_input(input_path.as_deref())?;
    info!(
        "Analyzing {} ({} chars)",
        input_path.as_deref().unwrap_or("stdin"),
        text.chars().count()
    );

    let report = if has_flag(&args, "--local") {
        EssayAnalyzer::analyze_local(&text)
    } else {
        let provider = parse_arg_value(&args, "--provider");
        build_analyzer(&config, provider.as_deref())?
            .analyze(&text)
            .await
    };

    let json = if has_flag(&args, "--compact") {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_skips_option_values() {
        assert_eq!(
            positional(&args(&["--config-dir", "/tmp/x", "essay.txt", "--local"])).as_deref(),
            Some("essay.txt")
        );
        assert_eq!(positional(&args(&["--provider", "gemini", "--compact"])), None);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = build_analyzer(&AppConfig::default(), Some("deepseek")).err().unwrap();
        assert!(err.to_string().contains("unknown provider"));
    }
}
