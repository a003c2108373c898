//! Swagger UI and OpenAPI document for the diagnostic routes.
//!
//! The UI is always mounted at `/swagger`; where it fetches the document
//! from depends on how the service is reached:
//! - local: `{schema}://{host}:{port}/swagger/doc.json`
//! - behind the gateway: `{schema}://{host}/direct-container-url/{app}/swagger/doc.json`

use axum::Router;
use utoipa::openapi::{OpenApi as OpenApiDoc, Server};
use utoipa::OpenApi;
use utoipa_swagger_ui::{Config, SwaggerUi};

use crate::config::ResolvedConfig;
use crate::diagnostics::handlers::{self, HealthCheck};
use crate::diagnostics::version::VersionInfo;

/// Path the OpenAPI document is served from.
pub const DOC_PATH: &str = "/swagger/doc.json";

/// Path prefix of the UI.
pub const UI_PATH: &str = "/swagger";

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::info, handlers::env),
    components(schemas(HealthCheck, VersionInfo)),
    tags(
        (name = "internal", description = "Service diagnostics")
    )
)]
pub struct ApiDoc;

/// URL the UI loads the document from.
pub fn doc_url(config: &ResolvedConfig) -> String {
    if config.local_swagger {
        format!("{}://{}:{}{}", config.schema, config.host, config.listen_port, DOC_PATH)
    } else {
        format!(
            "{}://{}/direct-container-url/{}{}",
            config.schema, config.host, config.app, DOC_PATH
        )
    }
}

/// OpenAPI document with title, version and server filled in.
pub fn openapi(config: &ResolvedConfig, version: &VersionInfo) -> OpenApiDoc {
    let mut doc = ApiDoc::openapi();
    doc.info.title = format!("Swagger {}", config.app);
    doc.info.version = version.version.clone();
    doc.info.description = Some("Service diagnostic endpoints".to_string());

    let base = if config.local_swagger {
        format!("{}://{}", config.schema, config.api_host)
    } else {
        format!("{}://{}/{}", config.schema, config.api_host, config.app)
    };
    doc.servers = Some(vec![Server::new(base)]);
    doc
}

/// Router serving the UI and the document.
pub fn routes(config: &ResolvedConfig, version: &VersionInfo) -> Router {
    let ui_config = Config::new([doc_url(config)])
        .deep_linking(true)
        .doc_expansion("none");

    SwaggerUi::new(UI_PATH)
        .url(DOC_PATH, openapi(config, version))
        .config(ui_config)
        .into()
}
