use anyhow::Context;
use catalog_app::App;
use catalog_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book catalog service
#[derive(Debug, Parser)]
#[command(name = "catalog-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prepare the schema and serve the HTTP API (default)
    Serve,
    /// Prepare the schema and exit
    Migrate,
    /// Print the API paths and methods that `serve` would expose
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load catalog settings")?;
    catalog_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(env = ?settings.environment, "starting catalog service");
            App::build(settings).await?.serve().await
        }
        Command::Migrate => catalog_app::bootstrap::migrate(settings).await,
        Command::Routes => {
            let app = App::build(settings).await?;
            let document = catalog_http::router::openapi_document(app.registry());
            for line in route_lines(&document) {
                println!("{line}");
            }
            app.close().await;
            Ok(())
        }
    }
}

/// `METHOD path` lines from an OpenAPI document, sorted by path
fn route_lines(document: &serde_json::Value) -> Vec<String> {
    let mut routes: Vec<(&str, String)> = document["paths"]
        .as_object()
        .into_iter()
        .flatten()
        .flat_map(|(path, item)| {
            item.as_object()
                .into_iter()
                .flat_map(|methods| methods.keys())
                .map(move |method| (path.as_str(), method.to_uppercase()))
        })
        .collect();
    routes.sort();

    routes
        .into_iter()
        .map(|(path, method)| format!("{:<7} {}", method, path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_lines_are_sorted_by_path() {
        let document = serde_json::json!({
            "paths": {
                "/api/books/{id}": { "get": {}, "delete": {} },
                "/api/books": { "post": {}, "get": {} }
            }
        });

        assert_eq!(
            route_lines(&document),
            vec![
                "GET     /api/books",
                "POST    /api/books",
                "DELETE  /api/books/{id}",
                "GET     /api/books/{id}",
            ]
        );
    }

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::parse_from(["catalog-cli"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["catalog-cli", "migrate"]);
        assert!(matches!(cli.command, Some(Command::Migrate)));
    }
}
