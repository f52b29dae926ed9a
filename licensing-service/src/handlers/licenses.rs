/// License handlers - HTTP endpoints for license operations
use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::debug;

use super::AppState;
use crate::clients::ClientKind;
use crate::context::RequestContext;
use crate::error::Result;
use crate::models::License;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Liveness probe
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "UP" }))
}

/// Get a single license using the configured default transport
pub async fn get_license(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    ctx: RequestContext,
) -> Result<HttpResponse> {
    let (organization_id, license_id) = path.into_inner();

    let license = state
        .service
        .get_license(&license_id, &organization_id, state.default_client, &ctx)
        .await?;

    Ok(HttpResponse::Ok().json(license))
}

/// Get a single license, naming the transport on the path.
/// Unrecognized tags fall back to the direct REST client.
pub async fn get_license_with_client(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
    ctx: RequestContext,
) -> Result<HttpResponse> {
    let (organization_id, license_id, client_type) = path.into_inner();
    let kind = ClientKind::from_tag(&client_type);
    debug!(tag = %client_type, client = kind.as_str(), "Selected organization client");

    let license = state
        .service
        .get_license(&license_id, &organization_id, kind, &ctx)
        .await?;

    Ok(HttpResponse::Ok().json(license))
}

/// List an organization's licenses. This endpoint never errors: when the
/// guarded fetch trips, the body is the fallback list.
pub async fn get_licenses(
    state: web::Data<AppState>,
    path: web::Path<String>,
    ctx: RequestContext,
) -> HttpResponse {
    let organization_id = path.into_inner();

    let licenses = state
        .service
        .get_licenses_by_organization(&organization_id, &ctx)
        .await;

    HttpResponse::Ok().json(licenses)
}

/// Create a license under the organization on the path
pub async fn create_license(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<License>,
) -> Result<HttpResponse> {
    let organization_id = path.into_inner();
    let mut license = body.into_inner();
    license.organization_id = organization_id;

    let created = state.service.create_license(license).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Replace a license wholesale
pub async fn update_license(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<License>,
) -> Result<HttpResponse> {
    let organization_id = path.into_inner();
    let mut license = body.into_inner();
    license.organization_id = organization_id;

    let updated = state.service.update_license(license).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a license by id
pub async fn delete_license(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (organization_id, license_id) = path.into_inner();

    let message = state
        .service
        .delete_license(&license_id, &organization_id)
        .await?;

    Ok(HttpResponse::Ok().json(DeleteResponse { message }))
}
