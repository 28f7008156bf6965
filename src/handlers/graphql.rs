// src/handlers/graphql.rs

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{extract::State, response::Html};

use crate::{config::AppState, middleware::scope::RequestScope};

// GET /api/gql
pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/api/gql/query").finish())
}

// POST /api/gql/query (um RequestScope novo, com loaders vazios, por requisição)
pub async fn graphql_handler(
    State(app_state): State<AppState>,
    scope: RequestScope,
    request: GraphQLRequest,
) -> GraphQLResponse {
    app_state.schema.execute(request.into_inner().data(scope)).await.into()
}
