use rfp_ingest::{
    api, config,
    embedding::OllamaEmbeddingClient,
    extract::PdfExtractor,
    ingest::IngestionService,
    logging,
    qdrant::{CollectionProvisioner, QdrantService},
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let config = config::init_config().expect("Failed to load config from environment");
    logging::init_tracing();

    let qdrant = Arc::new(QdrantService::new(&config).expect("Failed to build Qdrant client"));
    let provisioner = CollectionProvisioner::new(
        qdrant.clone(),
        config.qdrant_collection_name.clone(),
        config.embedding_dimension as u64,
        config.qdrant_distance_metric,
    );
    // Ingestion must not proceed against an unprovisioned collection.
    provisioner
        .ensure_ready()
        .await
        .expect("Failed to provision Qdrant collection");
    tracing::info!(collection = provisioner.collection_name(), "Collection ready");

    let embedding_client =
        OllamaEmbeddingClient::new(&config).expect("Failed to build embedding client");
    let service = IngestionService::new(
        &config,
        Box::new(PdfExtractor::new()),
        Box::new(embedding_client),
        qdrant,
    );
    let app = api::create_router(Arc::new(service));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.unwrap();
}

async fn bind_listener(configured_port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = configured_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}
