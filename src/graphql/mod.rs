pub mod context;
pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{http::GraphiQLSource, EmptySubscription, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
  extract::State,
  http::HeaderMap,
  response::{Html, IntoResponse},
};

use crate::{auth::{token_from_headers, CookieSettings}, db::Store, AppState};
use context::GraphQLContext;
use mutation::MutationRoot;
use query::QueryRoot;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(store: Store, cookies: CookieSettings) -> AppSchema {
  Schema::build(QueryRoot, MutationRoot, EmptySubscription)
    .data(store)
    .data(cookies)
    .finish()
}

pub async fn graphql_handler(
  State(state): State<AppState>,
  headers: HeaderMap,
  req: GraphQLRequest,
) -> GraphQLResponse {
  let ctx = GraphQLContext::new(token_from_headers(&headers));
  state.schema.execute(req.into_inner().data(ctx)).await.into()
}

pub async fn graphiql() -> impl IntoResponse {
  Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
