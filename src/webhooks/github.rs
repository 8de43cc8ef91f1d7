use rocket::{http::Status, State};
use tracing::{debug, error};

mod events;
pub use events::*;

mod payload;
use payload::JsonPayload;

use crate::relay::Relay;

const ACKNOWLEDGEMENT: &str = "Webhook received";
const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Receives a `pull_request` delivery from GitHub.
///
/// Once the payload is decoded the delivery is always acknowledged, forwarding failures only end
/// up in the logs.
#[rocket::post("/webhook", data = "<payload>")]
pub async fn github_webhook(
    payload: JsonPayload<PullRequestEvent>,
    relay: &State<Relay>,
) -> &'static str {
    let JsonPayload(event) = payload;
    let number = event.number;
    debug!("received `{}` event for PR #{}", event.action, number);

    if let Err(e) = relay.handle_pull_request(event).await {
        error!("couldn't forward PR #{} to Discord: {}", number, e);
    }

    ACKNOWLEDGEMENT
}

// Rocket answers 404 when no route matches the method, GitHub users expect a 405. HEAD is routed
// to the GET handler by rocket.

#[rocket::get("/webhook")]
pub fn get_webhook() -> (Status, &'static str) {
    (Status::MethodNotAllowed, METHOD_NOT_ALLOWED)
}

#[rocket::put("/webhook")]
pub fn put_webhook() -> (Status, &'static str) {
    (Status::MethodNotAllowed, METHOD_NOT_ALLOWED)
}

#[rocket::patch("/webhook")]
pub fn patch_webhook() -> (Status, &'static str) {
    (Status::MethodNotAllowed, METHOD_NOT_ALLOWED)
}

#[rocket::delete("/webhook")]
pub fn delete_webhook() -> (Status, &'static str) {
    (Status::MethodNotAllowed, METHOD_NOT_ALLOWED)
}

#[rocket::options("/webhook")]
pub fn options_webhook() -> (Status, &'static str) {
    (Status::MethodNotAllowed, METHOD_NOT_ALLOWED)
}
