use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use licensing_service::clients::declarative::OrganizationDeclarativeClient;
use licensing_service::clients::discovery::OrganizationDiscoveryClient;
use licensing_service::clients::registry::StaticServiceRegistry;
use licensing_service::clients::rest::OrganizationRestClient;
use licensing_service::clients::{ClientKind, OrganizationLookup};
use licensing_service::context::RequestContextMiddleware;
use licensing_service::handlers::{self, AppState};
use licensing_service::services::{LicenseListGuards, LicenseService, SlowCallInjector};
use licensing_service::store::InMemoryLicenseStore;
use licensing_service::Settings;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting licensing-service v{}", env!("CARGO_PKG_VERSION"));

    let http = reqwest::Client::new();

    // The static registry hands the configured URL out for the logical
    // name; a real discovery backend would slot in behind the same trait.
    let registry = Arc::new(
        StaticServiceRegistry::new()
            .with_service(&settings.organization.service_name, &settings.organization.url),
    );

    let lookup = OrganizationLookup::new(
        Arc::new(OrganizationRestClient::new(
            http.clone(),
            settings.organization.url.clone(),
        )),
        Arc::new(OrganizationDiscoveryClient::new(
            http.clone(),
            registry.clone(),
            settings.organization.service_name.clone(),
        )),
        Arc::new(OrganizationDeclarativeClient::new(
            http,
            registry,
            settings.organization.service_name.clone(),
        )),
    );

    let service = Arc::new(LicenseService::new(
        Arc::new(InMemoryLicenseStore::new()),
        lookup,
        LicenseListGuards::from_settings(&settings.resilience),
        Arc::new(SlowCallInjector::new(&settings.fault)),
        settings.license.comment.clone(),
    ));

    let default_client = ClientKind::from_tag(&settings.organization.default_client_tag);
    let bind_addr = (settings.server.host.clone(), settings.server.port);

    tracing::info!(
        host = %settings.server.host,
        port = settings.server.port,
        default_client = default_client.as_str(),
        "Licensing service listening"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                service: service.clone(),
                default_client,
            }))
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(RequestContextMiddleware)
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/v1/organization/{organization_id}/license")
                    .service(
                        web::resource("")
                            .route(web::get().to(handlers::get_licenses))
                            .route(web::post().to(handlers::create_license))
                            .route(web::put().to(handlers::update_license)),
                    )
                    .service(
                        web::resource("/{license_id}")
                            .route(web::get().to(handlers::get_license))
                            .route(web::delete().to(handlers::delete_license)),
                    )
                    .route(
                        "/{license_id}/{client_type}",
                        web::get().to(handlers::get_license_with_client),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
