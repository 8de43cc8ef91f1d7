use std::io;

use anyhow::anyhow;
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::Status,
    Data, Request,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};

const LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

/// JSON request body.
///
/// Unlike [`rocket::serde::json::Json`], every decoding failure is answered with `400 Bad
/// Request` and the content type isn't checked, GitHub can be configured to send
/// `application/x-www-form-urlencoded` deliveries with a JSON body.
pub struct JsonPayload<T>(pub T);

#[rocket::async_trait]
impl<'r, T> FromData<'r> for JsonPayload<T>
where
    T: DeserializeOwned + Send,
{
    type Error = anyhow::Error;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on webhook endpoint: {:?}", request);

        let size_limit = request.limits().get("json").unwrap_or(LIMIT);
        let content = match data.open(size_limit).into_string().await {
            Ok(s) if s.is_complete() => s.into_inner(),
            Ok(_) => {
                let eof = io::ErrorKind::UnexpectedEof;
                warn!("payload was too big, limit is {}", size_limit);
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    io::Error::new(eof, "data limit exceeded").into(),
                ));
            }
            Err(e) => {
                warn!("couldn't read payload: {}", e);
                return Outcome::Error((Status::BadRequest, e.into()));
            }
        };

        match decode(&content) {
            Ok(payload) => Outcome::Success(JsonPayload(payload)),
            Err(e) => {
                warn!("couldn't decode payload: {}", e);
                Outcome::Error((Status::BadRequest, e))
            }
        }
    }
}

/// Webhook deliveries are JSON objects. Derived struct visitors would also take an array and
/// fill the fields in order, so anything else is refused up front.
fn decode<T: DeserializeOwned>(content: &str) -> anyhow::Result<T> {
    let value: Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(anyhow!("expected a JSON object, got {}", kind(&value)));
    }

    Ok(serde_json::from_value(value)?)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
