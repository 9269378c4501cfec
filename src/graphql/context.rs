use async_graphql::{Error, ErrorExtensions};

use crate::{auth::AuthUser, db::Store, error::AppError};

/// GraphQL context carrying the caller's session token (if any)
#[derive(Debug, Clone)]
pub struct GraphQLContext {
  pub token: Option<String>,
}

impl GraphQLContext {
  pub fn new(token: Option<String>) -> Self {
    Self { token }
  }

  /// Require an authenticated user, or return an error
  pub async fn require_user(&self, store: &Store) -> Result<AuthUser, Error> {
    AuthUser::from_token(store, self.token.as_deref())
      .await
      .map_err(|e| e.extend())
  }
}

impl ErrorExtensions for AppError {
  fn extend(&self) -> Error {
    if self.status().is_server_error() {
      tracing::error!(error = %self, "GraphQL request failed");
    }

    let code = self.code();
    Error::new(self.public_message()).extend_with(|_, e| e.set("code", code))
  }
}
