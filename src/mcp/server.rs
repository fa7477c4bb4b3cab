use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use tracing::warn;

use crate::pipeline::importer::{ImportRequest, ListingImporter};
use crate::ports::page_fetcher::FetchMode;

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ImportListingParams {
    /// Absolute URL of the listing page (e.g. "https://www.airbnb.fr/rooms/12345678")
    pub url: String,
    /// Raw Cookie header to replay, with or without the leading "Cookie:" (optional)
    pub cookie: Option<String>,
    /// Render the page in a headless browser instead of a plain HTTP fetch (default: false).
    /// Only available when the server was started with browser support enabled.
    pub rendered: Option<bool>,
}

#[derive(Clone)]
pub struct ImportMcpServer {
    importer: Arc<ListingImporter>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ImportMcpServer {
    pub fn new(importer: Arc<ListingImporter>) -> Self {
        Self {
            importer,
            tool_router: Self::tool_router(),
        }
    }

    /// Import a third-party listing page as a property draft.
    #[tool(
        name = "import_listing",
        description = "Fetch a property listing page and extract a property draft (name, description, address, amenities, check-in/out times, house rules and more) as JSON. Fields that cannot be found are filled with placeholder defaults for the host to review.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    async fn import_listing(
        &self,
        Parameters(params): Parameters<ImportListingParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = ImportRequest {
            url: params.url.clone(),
            cookie_header: params.cookie,
            mode: if params.rendered.unwrap_or(false) {
                FetchMode::Browser
            } else {
                FetchMode::Plain
            },
        };

        match self.importer.import(&request).await {
            Ok(draft) => {
                let json = serde_json::to_string_pretty(&draft)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(CallToolResult::success(vec![Content::text(json)]))
            }
            Err(e) => {
                warn!(url = %params.url, kind = %e.kind(), error = %e, "Import failed");
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "Import failed ({}): {e}",
                    e.kind()
                ))]))
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for ImportMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Listing import server.\n\
                 \n\
                 Call import_listing with the URL of a rental listing page. The result is a \
                 JSON property draft in camelCase. Every field is filled: values that could not \
                 be extracted hold placeholders such as \"Address to complete\" or the default \
                 check-in time 15:00, so review the draft before saving it.\n\
                 \n\
                 Pass `cookie` to replay a session when the site serves a consent or login wall, \
                 and `rendered: true` for pages that only render client-side."
                    .into(),
            ),
        }
    }
}
