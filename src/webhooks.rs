use rocket::{catchers, figment::Figment, routes, Build, Rocket};

use crate::relay::Relay;

pub mod github;
use github::{
    delete_webhook, get_webhook, github_webhook, options_webhook, patch_webhook, put_webhook,
};

/// Path GitHub deliveries are expected on.
pub const WEBHOOK_PATH: &str = "/webhook";

/// Builds the HTTP server answering GitHub deliveries with the given [`Relay`].
pub fn server(figment: Figment, relay: Relay) -> Rocket<Build> {
    rocket::custom(figment)
        .mount(
            "/",
            routes![
                github_webhook,
                get_webhook,
                put_webhook,
                patch_webhook,
                delete_webhook,
                options_webhook
            ],
        )
        .register("/", catchers![bad_request, not_found, payload_too_large])
        .manage(relay)
}

#[rocket::catch(400)]
fn bad_request() -> &'static str {
    "Couldn't decode payload"
}

#[rocket::catch(404)]
fn not_found() -> &'static str {
    "Not found"
}

#[rocket::catch(413)]
fn payload_too_large() -> &'static str {
    "Payload too large"
}
