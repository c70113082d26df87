use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;

use chopsticks_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{GeocodingService, GoogleOAuthService, PaystackService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // One JSON object per line
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    if config.paystack.secret_key.is_empty() {
        log::warn!("Paystack secret key is not set; online payments and webhooks will fail");
    }
    let paystack_service = PaystackService::new(config.paystack.clone());
    let google_service = GoogleOAuthService::new(config.google.clone());
    let geocoding_service = GeocodingService::new(config.google.maps_api_key.clone());

    let auth_service = AuthService::new(pool.clone(), jwt_service.clone(), google_service);
    let user_service = UserService::new(pool.clone());
    let address_service = AddressService::new(pool.clone(), geocoding_service);
    let settings_service = SettingsService::new(pool.clone());
    let menu_service = MenuService::new(pool.clone());
    let order_service = OrderService::new(pool.clone());
    let payment_service = PaymentService::new(
        pool.clone(),
        paystack_service.clone(),
        config.loyalty.clone(),
    );
    let loyalty_service = LoyaltyService::new(pool.clone(), config.loyalty.clone());
    let promotion_service = PromotionService::new(pool.clone());
    let admin_service = AdminService::new(pool.clone());
    let upload_service = UploadService::new(&config.server);

    tasks::spawn_all(loyalty_service.clone(), payment_service.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(address_service.clone()))
            .app_data(web::Data::new(settings_service.clone()))
            .app_data(web::Data::new(menu_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(loyalty_service.clone()))
            .app_data(web::Data::new(promotion_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(upload_service.clone()))
            .app_data(web::Data::new(paystack_service.clone()))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::address_config)
                    .configure(handlers::core_config)
                    .configure(handlers::menu_config)
                    .configure(handlers::order_config)
                    .configure(handlers::payment_config)
                    .configure(handlers::loyalty_config)
                    .configure(handlers::promotion_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
