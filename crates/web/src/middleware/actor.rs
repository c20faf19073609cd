use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::WebError;

/// Header carrying the authenticated user's id, set by the upstream
/// authenticator.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user performing the request. Missing header is a 401.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Uuid);

/// Anonymous callers are allowed, e.g. on public pages.
#[derive(Debug, Clone, Copy)]
pub struct MaybeActor(pub Option<Uuid>);

fn user_id(parts: &Parts) -> Result<Option<Uuid>, WebError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .map(Some)
        .ok_or_else(|| WebError::BadRequest("X-User-Id must be a UUID".to_string()))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id(parts)?
            .map(Actor)
            .ok_or_else(|| WebError::Unauthorized("Missing X-User-Id header".to_string()))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeActor {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id(parts).map(MaybeActor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut request = Request::builder().uri("/");
        if let Some(value) = header {
            request = request.header(USER_ID_HEADER, value);
        }
        request.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_actor_requires_header() {
        let id = Uuid::new_v4();

        let Actor(found) = Actor::from_request_parts(&mut parts(Some(&id.to_string())), &())
            .await
            .unwrap();
        assert_eq!(found, id);

        let missing = Actor::from_request_parts(&mut parts(None), &()).await;
        assert!(matches!(missing, Err(WebError::Unauthorized(_))));

        let malformed = Actor::from_request_parts(&mut parts(Some("judge-7")), &()).await;
        assert!(matches!(malformed, Err(WebError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_maybe_actor_allows_anonymous() {
        let MaybeActor(found) = MaybeActor::from_request_parts(&mut parts(None), &())
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
