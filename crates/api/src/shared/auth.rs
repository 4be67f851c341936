use crate::error::EventHubError;
use actix_web::HttpRequest;
use eventhub_domain::{User, ID};
use eventhub_infra::EventHubContext;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub id: String, // The id of the `User` the token was issued to
}

fn parse_authtoken_header(token_header_value: &str) -> String {
    token_header_value
        .trim_start_matches("Bearer")
        .trim_start_matches("bearer")
        .trim()
        .to_string()
}

pub fn decode_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}

/// Authenticates the `User` making the request through the json web
/// token in the `Authorization` header
pub async fn protect_route(
    req: &HttpRequest,
    ctx: &EventHubContext,
) -> Result<User, EventHubError> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(parse_authtoken_header)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            EventHubError::Unauthorized("Please log in to access this resource".into())
        })?;

    let claims = decode_token(&token, &ctx.config.jwt_secret)
        .map_err(|_| EventHubError::Unauthorized("The token is invalid or has expired".into()))?;

    let user_id = claims
        .id
        .parse::<ID>()
        .map_err(|_| EventHubError::Unauthorized("The token is invalid or has expired".into()))?;

    match ctx.repos.users.find(&user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(EventHubError::Unauthorized("The user does not exist".into())),
        Err(e) => {
            error!("Unable to look up the user of a token: {:?}", e);
            Err(EventHubError::InternalError)
        }
    }
}
