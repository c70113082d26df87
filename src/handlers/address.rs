use crate::middlewares::require_user;
use crate::models::*;
use crate::services::AddressService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/addresses",
    tag = "address",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Saved addresses, default first", body = [AddressResponse])
    )
)]
pub async fn list_addresses(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match address_service.list(user.id).await {
        Ok(addresses) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": addresses
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/addresses",
    tag = "address",
    request_body = CreateAddressRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Address saved", body = AddressResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    request: web::Json<CreateAddressRequest>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match address_service.create(user.id, request.into_inner()).await {
        Ok(address) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": address
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/addresses/default",
    tag = "address",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Default address", body = AddressResponse),
        (status = 404, description = "No default address")
    )
)]
pub async fn get_default_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match address_service.get_default(user.id).await {
        Ok(address) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": address
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/addresses/geocode",
    tag = "address",
    request_body = GeocodeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Coordinates for the address", body = GeocodeResponse),
        (status = 404, description = "Address not found by the geocoder")
    )
)]
pub async fn geocode(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    request: web::Json<GeocodeRequest>,
) -> Result<HttpResponse> {
    require_user(&req)?;

    match address_service.geocode(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/addresses/reverse-geocode",
    tag = "address",
    request_body = ReverseGeocodeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Address at the coordinates", body = GeocodeResponse)
    )
)]
pub async fn reverse_geocode(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    request: web::Json<ReverseGeocodeRequest>,
) -> Result<HttpResponse> {
    require_user(&req)?;

    match address_service.reverse_geocode(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/addresses/{id}",
    tag = "address",
    params(
        ("id" = i64, Path, description = "Address ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Address", body = AddressResponse),
        (status = 404, description = "Address not found")
    )
)]
pub async fn get_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match address_service.get(user.id, path.into_inner()).await {
        Ok(address) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": address
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/addresses/{id}",
    tag = "address",
    params(
        ("id" = i64, Path, description = "Address ID")
    ),
    request_body = UpdateAddressRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Address updated", body = AddressResponse),
        (status = 404, description = "Address not found")
    )
)]
pub async fn update_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateAddressRequest>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match address_service
        .update(user.id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(address) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": address
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/addresses/{id}",
    tag = "address",
    params(
        ("id" = i64, Path, description = "Address ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Address deleted"),
        (status = 404, description = "Address not found")
    )
)]
pub async fn delete_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match address_service.delete(user.id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Address deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/addresses/{id}/set-default",
    tag = "address",
    params(
        ("id" = i64, Path, description = "Address ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Address is now the default", body = AddressResponse),
        (status = 404, description = "Address not found")
    )
)]
pub async fn set_default_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match address_service.set_default(user.id, path.into_inner()).await {
        Ok(address) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": address
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn address_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/addresses")
            .route("", web::get().to(list_addresses))
            .route("", web::post().to(create_address))
            .route("/default", web::get().to(get_default_address))
            .route("/geocode", web::post().to(geocode))
            .route("/reverse-geocode", web::post().to(reverse_geocode))
            .route("/{id}", web::get().to(get_address))
            .route("/{id}", web::put().to(update_address))
            .route("/{id}", web::delete().to(delete_address))
            .route("/{id}/set-default", web::post().to(set_default_address)),
    );
}
