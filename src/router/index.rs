use actix_web::web;

use crate::post::post_index::post_routes;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(post_routes);
}
