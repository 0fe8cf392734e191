mod config;

use clap::{Parser, Subcommand};
use config::LoadScoreConfig;
use k8s_openapi::api::core::v1::Pod;
use loadscore_metrics::{collect, MetricKind, MetricsSource, PrometheusClient};
use loadscore_scheduler::framework::{missing_histogram, sort_ranked};
use loadscore_scheduler::{balanced, Framework, PluginArgs, Registry, PLUGIN_NAME};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "loadscore", about = "Load-aware balanced-allocation node scoring")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, global = true, env = "LOADSCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Prometheus base URL, overrides the configuration file
    #[arg(long, global = true, env = "LOADSCORE_PROMETHEUS_URL")]
    prometheus_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scoring cycle for a pod and print the ranked nodes
    Rank {
        /// Pod as namespace/name (namespace defaults to "default")
        #[arg(long)]
        pod: String,
        /// Candidate node, repeat for each feasible node
        #[arg(long = "node", required = true)]
        nodes: Vec<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Fetch and print the raw readings for one node
    Metrics {
        /// Node name
        #[arg(long)]
        node: String,
    },
    /// List registered score plugins
    Plugins,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = LoadScoreConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.prometheus_url {
        config.telemetry.endpoint = url;
    }

    let registry = build_registry()?;

    match cli.command {
        Commands::Rank { pod, nodes, json } => run_rank(&config, &registry, &pod, &nodes, json).await,
        Commands::Metrics { node } => run_metrics(&config, &node).await,
        Commands::Plugins => {
            for name in registry.names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

/// Register every score plugin this binary ships
fn build_registry() -> miette::Result<Registry> {
    let mut registry = Registry::new();
    balanced::register(&mut registry)?;
    Ok(registry)
}

fn create_source(config: &LoadScoreConfig) -> miette::Result<Arc<dyn MetricsSource>> {
    info!(
        "Using Prometheus at {} (timeout {:?})",
        config.telemetry.endpoint,
        config.telemetry.request_timeout()
    );
    let client = PrometheusClient::new(&config.telemetry)?;
    Ok(Arc::new(client))
}

/// Parse `namespace/name` or a bare `name` into a pod identity
fn pod_from_arg(arg: &str) -> miette::Result<Pod> {
    let (namespace, name) = match arg.split_once('/') {
        Some((ns, name)) => (ns, name),
        None => ("default", arg),
    };

    if namespace.is_empty() || name.is_empty() || name.contains('/') {
        return Err(miette::miette!(
            "Invalid pod '{}': expected namespace/name or name",
            arg
        ));
    }

    let mut pod = Pod::default();
    pod.metadata.namespace = Some(namespace.to_string());
    pod.metadata.name = Some(name.to_string());
    Ok(pod)
}

async fn run_rank(
    config: &LoadScoreConfig,
    registry: &Registry,
    pod_arg: &str,
    nodes: &[String],
    json: bool,
) -> miette::Result<()> {
    let pod = pod_from_arg(pod_arg)?;

    let args = PluginArgs {
        metrics: create_source(config)?,
        weights: config.weights.clone(),
    };
    let framework =
        Framework::from_registry(registry, &[(PLUGIN_NAME, config.plugin_weight.0)], &args)?;
    info!("Scoring {} nodes with {:?}", nodes.len(), framework.plugin_names());

    let mut ranked = framework.run_score_plugins(&pod, nodes).await?;
    sort_ranked(&mut ranked);

    for (kind, count) in missing_histogram(&ranked) {
        warn!("{} missing on {} of {} nodes", kind, count, ranked.len());
    }

    if json {
        let out = serde_json::to_string_pretty(&ranked)
            .map_err(|e| miette::miette!("Failed to serialize ranking: {}", e))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{:<32} {:>6}  MISSING", "NODE", "SCORE");
    for node in &ranked {
        let missing = if node.missing.is_empty() {
            "-".to_string()
        } else {
            node.missing
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(",")
        };
        println!("{:<32} {:>6}  {}", node.name, node.score, missing);
    }

    Ok(())
}

async fn run_metrics(config: &LoadScoreConfig, node: &str) -> miette::Result<()> {
    let source = create_source(config)?;
    let snapshot = collect(source.as_ref(), node).await;

    println!("{:<26}{}", "node", snapshot.node_name);
    for kind in MetricKind::ALL {
        match snapshot.failures.iter().find(|f| f.kind == kind) {
            Some(failure) => println!("{:<26}failed: {}", kind.as_str(), failure.error),
            None => println!("{:<26}{}", kind.as_str(), snapshot.metrics.reading(kind)),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_from_arg() {
        let pod = pod_from_arg("shop/web-0").unwrap();
        assert_eq!(pod.metadata.namespace.as_deref(), Some("shop"));
        assert_eq!(pod.metadata.name.as_deref(), Some("web-0"));

        let bare = pod_from_arg("web-0").unwrap();
        assert_eq!(bare.metadata.namespace.as_deref(), Some("default"));

        assert!(pod_from_arg("shop/").is_err());
        assert!(pod_from_arg("/web").is_err());
        assert!(pod_from_arg("a/b/c").is_err());
    }

    #[test]
    fn test_registry_contains_plugin() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.names(), vec![PLUGIN_NAME]);
    }

    #[test]
    fn test_cli_parses_rank() {
        let cli = Cli::try_parse_from([
            "loadscore",
            "--prometheus-url",
            "http://prom:9090",
            "rank",
            "--pod",
            "default/web",
            "--node",
            "n1",
            "--node",
            "n2",
        ])
        .unwrap();

        assert_eq!(cli.prometheus_url.as_deref(), Some("http://prom:9090"));
        match cli.command {
            Commands::Rank { pod, nodes, json } => {
                assert_eq!(pod, "default/web");
                assert_eq!(nodes, vec!["n1", "n2"]);
                assert!(!json);
            }
            _ => panic!("expected rank command"),
        }
    }
}
