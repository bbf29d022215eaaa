use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use super::post_controller::{
    create_comment, create_post, delete_post, get_post_comments, get_posts, like_post, unlike_post,
};
use crate::middleware::auth::verify_token;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            // read paths are public
            .route("", web::get().to(get_posts))
            .route("/{id}/comments", web::get().to(get_post_comments))
            .service(
                web::scope("")
                    .wrap(HttpAuthentication::bearer(verify_token))
                    .route("", web::post().to(create_post))
                    .route("/{id}", web::delete().to(delete_post))
                    .route("/{id}/like", web::put().to(like_post))
                    .route("/{id}/unlike", web::put().to(unlike_post))
                    .route("/{id}/comments", web::post().to(create_comment)),
            ),
    );
}
