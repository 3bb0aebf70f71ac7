use crate::catalog::{analyze_catalog, BatchWriter};
use crate::documents::flatten_extjson;
use crate::pipeline::{prepare::PRODUCT_BATCH_PREFIX, prepare_catalog, translate_catalog};
use crate::state::AppState;
use crate::translation::Language;
use crate::utils::CatalogError;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters for analyzing a catalog spreadsheet")]
pub struct AnalyzeCatalogParams {
    #[schemars(description = "Path to the .xlsx/.xls/.ods/.csv catalog; bare names resolve inside the data directory")]
    pub file_path: String,
    #[schemars(description = "Sheet name (default: first sheet)")]
    pub sheet: Option<String>,
    #[schemars(description = "Number of sample rows to return (default: 5)")]
    pub sample_rows: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters for preparing product and offer batches")]
pub struct PrepareCatalogParams {
    #[schemars(description = "Catalog file (default: catalog.input_file from config)")]
    pub file_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters for translating the prepared catalog")]
pub struct TranslateCatalogParams {
    #[schemars(description = "Target language: 'en' or 'ar'")]
    pub language: Language,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters to fetch one batch of update commands")]
pub struct GetUpdateBatchParams {
    #[schemars(description = "Target language: 'en' or 'ar'")]
    pub language: Language,
    #[schemars(description = "1-based batch number")]
    pub batch_number: usize,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters to fetch one batch of product documents")]
pub struct GetProductBatchParams {
    #[schemars(description = "1-based batch number")]
    pub batch_number: usize,
    #[schemars(description = "Replace $oid/$date wrappers with plain strings (default: false)")]
    pub plain_json: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters to get run status")]
pub struct GetRunStatusParams {
    #[schemars(description = "Run ID (default: list every run)")]
    pub run_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchPayload {
    batch_number: usize,
    total_batches: usize,
    count: usize,
    items: Vec<JsonValue>,
}

fn to_mcp_error(e: CatalogError) -> McpError {
    match e {
        CatalogError::FileNotFound(_)
        | CatalogError::BatchNotFound(_)
        | CatalogError::RunNotFound(_)
        | CatalogError::MissingColumn(_) => McpError::invalid_params(e.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[derive(Clone)]
pub struct CatalogServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CatalogServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            tool_router: Self::tool_router(),
        }
    }

    fn read_batch(&self, prefix: &str, number: usize) -> Result<BatchPayload, McpError> {
        let writer = BatchWriter::new(&self.state.layout, prefix);
        let numbers = writer.list_batches().map_err(to_mcp_error)?;
        let items: Vec<JsonValue> = writer.read_batch(number).map_err(to_mcp_error)?;
        Ok(BatchPayload {
            batch_number: number,
            total_batches: numbers.len(),
            count: items.len(),
            items,
        })
    }

    #[tool(
        name = "analyze_catalog",
        description = "Analyze a catalog spreadsheet: row count, columns with null and unique counts, sample rows, and a guess of which header holds the name, brand, price, barcode and image."
    )]
    async fn analyze_catalog(
        &self,
        params: Parameters<AnalyzeCatalogParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let path = self.state.layout.resolve(&params.file_path);
        let sheet = params.sheet.or_else(|| self.state.config.catalog.sheet.clone());
        let analysis = analyze_catalog(&path.to_string_lossy(), sheet, params.sample_rows.unwrap_or(5))
            .map_err(to_mcp_error)?;
        json_result(&analysis)
    }

    #[tool(
        name = "prepare_catalog",
        description = "Build product and pending offer documents from the catalog and write them as numbered batch files with import status summaries."
    )]
    async fn prepare_catalog(
        &self,
        params: Parameters<PrepareCatalogParams>,
    ) -> Result<CallToolResult, McpError> {
        let input = params.0.file_path.map(PathBuf::from);
        let report = prepare_catalog(
            &self.state.config,
            &self.state.layout,
            input.as_deref(),
            chrono::Utc::now(),
        )
        .map_err(to_mcp_error)?;
        json_result(&report)
    }

    #[tool(
        name = "translate_catalog",
        description = "Translate prepared product names and brands from Hebrew with the built-in dictionary and write update command batches for the language. Call prepare_catalog first."
    )]
    async fn translate_catalog(
        &self,
        params: Parameters<TranslateCatalogParams>,
    ) -> Result<CallToolResult, McpError> {
        let report = translate_catalog(&self.state.config, &self.state.layout, params.0.language)
            .map_err(to_mcp_error)?;
        json_result(&report)
    }

    #[tool(
        name = "get_update_batch",
        description = "Get one batch of update commands ({filter, update: {$set}}) for a language, ready to run as update_many calls."
    )]
    async fn get_update_batch(
        &self,
        params: Parameters<GetUpdateBatchParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let payload = self.read_batch(params.language.update_batch_prefix(), params.batch_number)?;
        json_result(&payload)
    }

    #[tool(
        name = "get_product_batch",
        description = "Get one batch of product documents in MongoDB extended JSON, or as plain JSON with plain_json = true."
    )]
    async fn get_product_batch(
        &self,
        params: Parameters<GetProductBatchParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let mut payload = self.read_batch(PRODUCT_BATCH_PREFIX, params.batch_number)?;
        if params.plain_json.unwrap_or(false) {
            payload.items = payload.items.into_iter().map(flatten_extjson).collect();
        }
        json_result(&payload)
    }

    #[tool(
        name = "get_run_status",
        description = "Get the checkpoint of an import or update run: completed and failed batches and status. Without run_id, lists every run."
    )]
    async fn get_run_status(
        &self,
        params: Parameters<GetRunStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        match params.0.run_id {
            Some(run_id) => {
                let run = self.state.checkpoints.require_run(&run_id).map_err(to_mcp_error)?;
                json_result(&run)
            }
            None => {
                let runs = self.state.checkpoints.list_runs().map_err(to_mcp_error)?;
                json_result(&runs)
            }
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }
}

#[tool_handler]
impl rmcp::handler::server::ServerHandler for CatalogServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"Grocery Catalog MCP Server

Workflow:
1. analyze_catalog - Inspect the spreadsheet and its headers
2. prepare_catalog - Build product/offer batches
3. translate_catalog - Once per language ('en', 'ar')
4. get_update_batch / get_product_batch - Pull batches to run against MongoDB
5. get_run_status - Check import and update runs

All file paths are local paths."#
                    .to_string(),
            ),
        }
    }
}
