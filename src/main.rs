use actix_web::{middleware, web, App, HttpServer};

use deckgen::config::Config;
use deckgen::handlers::search_handlers;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    log::info!("People store: {}", config.people_csv.display());
    log::info!("Products store: {}", config.products_csv.display());
    log::info!("Starting server at http://{}", config.bind);

    let bind = config.bind.clone();
    let data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(data.clone())
            .route("/", web::get().to(search_handlers::index))
            .route(
                "/general_search",
                web::post().to(search_handlers::general_search),
            )
            .route(
                "/specific_search",
                web::post().to(search_handlers::specific_search),
            )
    })
    .bind(bind.as_str())?
    .run()
    .await
}
