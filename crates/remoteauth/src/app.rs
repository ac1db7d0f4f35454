use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::remote_auth::RemoteAuth;
use crate::server;
use crate::*;

/// Run the standalone server until Ctrl-C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
	let auth = RemoteAuth::new(config.remote_auth)?;
	let listener = TcpListener::bind(config.listen_addr).await?;
	info!(address = %listener.local_addr()?, "listener established");
	server::serve(
		listener,
		server::router(auth, config.failure_mode),
		shutdown_signal(),
	)
	.await?;
	info!("shutdown complete");
	Ok(())
}

async fn shutdown_signal() {
	match tokio::signal::ctrl_c().await {
		Ok(()) => info!("received shutdown signal, draining connections"),
		Err(e) => {
			error!(error = %e, "failed to listen for shutdown signal");
			std::future::pending::<()>().await
		},
	}
}
