use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, models::Session};

/// Header carrying the authenticated user's email, set by the auth front
pub const USER_EMAIL_HEADER: &str = "x-user-email";
/// Header carrying the user's numeric model id, when the user has one
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extracts the [`Session`] from the identity headers
///
/// Rejects with `Unauthorized` when no email is present. Handlers that serve
/// anonymous users take `Option<Session>` instead.
#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::Unauthorized("No user signed in".to_string()))?;

        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse().ok());

        Ok(Session {
            email: email.to_string(),
            user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Session, AppError> {
        let (mut parts, _) = request.into_parts();
        Session::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_session_from_headers() {
        let request = Request::builder()
            .header(USER_EMAIL_HEADER, "a@b.com")
            .header(USER_ID_HEADER, "42")
            .body(())
            .unwrap();

        let session = extract(request).await.unwrap();
        assert_eq!(session, Session::new("a@b.com").with_user_id(42));
    }

    #[tokio::test]
    async fn test_invalid_user_id_is_ignored() {
        let request = Request::builder()
            .header(USER_EMAIL_HEADER, "a@b.com")
            .header(USER_ID_HEADER, "not-a-number")
            .body(())
            .unwrap();

        let session = extract(request).await.unwrap();
        assert_eq!(session.user_id, None);
    }

    #[tokio::test]
    async fn test_missing_email_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));

        let request = Request::builder()
            .header(USER_EMAIL_HEADER, "  ")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
