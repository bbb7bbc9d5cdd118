//! Cravings MCP Server Implementation
//!
//! Implements the MCP server with all Cravings tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::nutrition::NutrientScaler;
use crate::tools::ingredients;
use crate::tools::inventory;
use crate::tools::recipes::{self, RecipeLineInput};
use crate::tools::status::StatusTracker;
use crate::tools::webhooks;

/// Cravings MCP Service
#[derive(Clone)]
pub struct CravingsService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    scaler: NutrientScaler,
    tool_router: ToolRouter<CravingsService>,
}

impl CravingsService {
    pub fn new(
        database_path: PathBuf,
        database: Database,
        scaler: NutrientScaler,
        edamam_configured: bool,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                database_path,
                edamam_configured,
            ))),
            database,
            scaler,
            tool_router: Self::tool_router(),
        }
    }

    /// Run a tool operation that may call out over HTTP off the async runtime
    async fn blocking<T, F>(&self, op: F) -> Result<T, McpError>
    where
        T: Send + 'static,
        F: FnOnce(Database, NutrientScaler) -> Result<T, String> + Send + 'static,
    {
        let database = self.database.clone();
        let scaler = self.scaler.clone();
        tokio::task::spawn_blocking(move || op(database, scaler))
            .await
            .map_err(|e| McpError::internal_error(format!("Task failed: {}", e), None))?
            .map_err(|e| McpError::internal_error(e, None))
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterIngredientParams {
    /// Ingredient name, stored lowercase
    pub name: String,
    /// One of: kg, g, l, dl, cl, ml, pc, tablespoon, teaspoon
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientNameParams {
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScaleIngredientParams {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertQuantityParams {
    pub quantity: f64,
    pub from_unit: String,
    pub to_unit: String,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeLineParams {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterRecipeParams {
    pub name: String,
    pub ingredients: Vec<RecipeLineParams>,
    /// Preparation steps
    #[serde(default)]
    pub description: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeNameParams {
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckRecipeInventoryParams {
    pub recipe_name: String,
    /// Pantry items as "name|quantity|unit"; quantity and unit are optional
    #[serde(default)]
    pub pantry: Vec<String>,
}

// ============================================================================
// Webhook Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWebhookParams {
    /// "ingredients" or "recipes"
    pub event: String,
    pub url: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteWebhookParams {
    pub id: i64,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl CravingsService {
    // --- Status ---

    #[tool(description = "Get the current status of the Cravings service including build info, database counts, Edamam configuration, and process information")]
    async fn cravings_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    // --- Ingredients ---

    #[tool(description = "Register an ingredient. Nutrients are looked up for one unit of the unit's basis (1 g, 1 l, 1 pc, or one spoon) and stored. Fires 'ingredients' webhooks.")]
    async fn register_ingredient(&self, Parameters(p): Parameters<RegisterIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = self
            .blocking(move |db, scaler| ingredients::register_ingredient(&db, &scaler, &p.name, &p.unit))
            .await?;
        json_result(&result)
    }

    #[tool(description = "Get a registered ingredient with its per-unit nutrients")]
    fn get_ingredient(&self, Parameters(p): Parameters<IngredientNameParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::get_ingredient(&self.database, &p.name).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(ingredient) => json_result(&ingredient),
            None => json_result(&serde_json::json!({"error": "Ingredient not found", "name": p.name})),
        }
    }

    #[tool(description = "List all registered ingredients")]
    fn list_ingredients(&self) -> Result<CallToolResult, McpError> {
        let result = ingredients::list_ingredients(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete an ingredient (only allowed if not used in any recipe)")]
    fn delete_ingredient(&self, Parameters(p): Parameters<IngredientNameParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::delete_ingredient(&self.database, &p.name).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(success) => json_result(&success),
            Err(blocked) => json_result(&blocked),
        }
    }

    #[tool(description = "Nutrient content of a quantity of a registered ingredient. Mass and volume units convert within their family; spoon amounts are looked up directly.")]
    async fn scale_ingredient(&self, Parameters(p): Parameters<ScaleIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = self
            .blocking(move |db, scaler| ingredients::scale_ingredient(&db, &scaler, &p.name, p.quantity, &p.unit))
            .await?;
        json_result(&result)
    }

    #[tool(description = "Convert a quantity between units of the same family (kg/g or l/dl/cl/ml)")]
    fn convert_quantity(&self, Parameters(p): Parameters<ConvertQuantityParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::convert_quantity(p.quantity, &p.from_unit, &p.to_unit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Register a recipe. Every ingredient must already be registered in a compatible unit. Returns per-line and total nutrients. Fires 'recipes' webhooks.")]
    async fn register_recipe(&self, Parameters(p): Parameters<RegisterRecipeParams>) -> Result<CallToolResult, McpError> {
        let lines: Vec<RecipeLineInput> = p
            .ingredients
            .into_iter()
            .map(|l| RecipeLineInput { name: l.name, quantity: l.quantity, unit: l.unit })
            .collect();
        let (name, description) = (p.name, p.description);
        let result = self
            .blocking(move |db, scaler| recipes::register_recipe(&db, &scaler, &name, &lines, description))
            .await?;
        json_result(&result)
    }

    #[tool(description = "Get a recipe with nutrients recomputed for every line and in total")]
    async fn get_recipe(&self, Parameters(p): Parameters<RecipeNameParams>) -> Result<CallToolResult, McpError> {
        let name = p.name.clone();
        let result = self
            .blocking(move |db, scaler| recipes::get_recipe(&db, &scaler, &name))
            .await?;
        match result {
            Some(recipe) => json_result(&recipe),
            None => json_result(&serde_json::json!({"error": "Recipe not found", "name": p.name})),
        }
    }

    #[tool(description = "List all recipes with their ingredient names")]
    fn list_recipes(&self) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a recipe")]
    fn delete_recipe(&self, Parameters(p): Parameters<RecipeNameParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, &p.name).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Check a pantry against a recipe: which ingredients are on hand, which are missing, and what remains after cooking (negative quantities mean not enough)")]
    async fn check_recipe_inventory(&self, Parameters(p): Parameters<CheckRecipeInventoryParams>) -> Result<CallToolResult, McpError> {
        let pantry = inventory::parse_ingredient_list(&p.pantry).map_err(|e| McpError::internal_error(e, None))?;
        let recipe_name = p.recipe_name;
        let result = self
            .blocking(move |db, scaler| inventory::check_recipe(&db, &scaler, &recipe_name, &pantry))
            .await?;
        json_result(&result)
    }

    // --- Webhooks ---

    #[tool(description = "Register a webhook URL that receives a JSON POST whenever an ingredient or recipe is saved")]
    fn add_webhook(&self, Parameters(p): Parameters<AddWebhookParams>) -> Result<CallToolResult, McpError> {
        let result = webhooks::add_webhook(&self.database, &p.event, &p.url).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List registered webhooks")]
    fn list_webhooks(&self) -> Result<CallToolResult, McpError> {
        let result = webhooks::list_webhooks(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a webhook by id")]
    fn delete_webhook(&self, Parameters(p): Parameters<DeleteWebhookParams>) -> Result<CallToolResult, McpError> {
        let result = webhooks::delete_webhook(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for CravingsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "cravings".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Cravings".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Cravings - ingredient and recipe nutrition. \
                 Units: kg, g, l, dl, cl, ml, pc, tablespoon, teaspoon. \
                 Ingredients: register/get/list/delete_ingredient, scale_ingredient, convert_quantity. \
                 Recipes: register/get/list/delete_recipe; ingredients must be registered first. \
                 Inventory: check_recipe_inventory with pantry entries like \"flour|500|g\". \
                 Webhooks: add/list/delete_webhook for 'ingredients' and 'recipes' events. \
                 Status: cravings_status."
                    .into(),
            ),
        }
    }
}
