use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use dotenvy::dotenv;

use hajj_booking_backend::config::{DatabaseConfig, EnvironmentConfig};
use hajj_booking_backend::create_app;
use hajj_booking_backend::database::{create_pool, run_migrations};
use hajj_booking_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hajj_booking_backend=debug")),
        )
        .init();

    info!("🕋 Hajj & Omra - Back office de reservas");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;

    // Inicializar base de datos
    let pool = match create_pool(&db_config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    info!("✅ Base de datos conectada");

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_app(AppState::new(pool, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🏨 Hoteles:");
    info!("   GET  /api/hotels?city= - Listar hoteles");
    info!("📋 Programas:");
    info!("   POST /api/programs - Crear programa con inventario");
    info!("   GET  /api/programs - Listar programas");
    info!("   GET  /api/programs/:id - Obtener programa con habitaciones");
    info!("   PUT  /api/programs/:id - Actualizar programa y reconciliar habitaciones");
    info!("   DELETE /api/programs/:id - Eliminar programa");
    info!("   GET  /api/programs/:id/rooms/availability - Vista previa de asignación");
    info!("   GET  /api/programs/:id/reservations - Reservas del programa");
    info!("🧳 Reservas:");
    info!("   POST /api/reservations/quote - Calcular precio");
    info!("   POST /api/reservations - Crear reserva");
    info!("   GET  /api/reservations/:id - Obtener reserva");
    info!("   DELETE /api/reservations/:id - Cancelar reserva");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                e
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
