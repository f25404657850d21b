use bookshelf::access::AdminOnly;
use bookshelf::config::Config;
use bookshelf::database::{DefaultAuthorRepository, establish_pool};
use bookshelf::http::{AppState, HttpServer, HttpServerConfig};
use bookshelf::movies::OmdbClient;
use bookshelf::services::DefaultAuthorService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    let pool = establish_pool(config.database_url()).await?;
    let author_service = DefaultAuthorService::new(DefaultAuthorRepository::new(pool));
    let movie_lookup = OmdbClient::new(config.omdb_base_url(), config.omdb_api_key())?;

    let state = AppState::new(author_service, AdminOnly, movie_lookup);
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
