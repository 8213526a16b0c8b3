#[tokio::main]
async fn main() {
    pluribus_observability::init();

    let config = pluribus_api::ApiConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let app = pluribus_api::build_app(config).await;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
