//! Edamam nutrition-data client
//!
//! Looks up calories, weight and nutrients for one unit of an ingredient.

use reqwest::blocking::Client;

use crate::config::EdamamConfig;
use crate::models::NutritionFacts;
use crate::nutrition::{NutrientSource, NutritionError, NutritionResult, Unit};

#[derive(Debug, Clone)]
pub struct EdamamClient {
    config: EdamamConfig,
}

impl EdamamClient {
    pub fn new(config: EdamamConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/nutrition-data", self.config.base_url)
    }
}

/// The free-text `ingr` query for one unit of an ingredient, e.g.
/// `"flour g"` or `"egg piece"`
pub fn ingredient_query(name: &str, unit: Unit) -> String {
    let unit_word = match unit {
        Unit::Pc => "piece",
        other => other.as_str(),
    };
    format!("{} {}", name.trim(), unit_word)
}

impl NutrientSource for EdamamClient {
    fn fetch(&self, name: &str, unit: Unit) -> NutritionResult<NutritionFacts> {
        if !self.config.has_credentials() {
            return Err(NutritionError::NutrientLookup(
                "Edamam credentials are not configured".to_string(),
            ));
        }

        let query = ingredient_query(name, unit);
        tracing::debug!("Edamam lookup: {}", query);

        // Built per call: the blocking client owns a runtime and must not be
        // created or dropped on an async worker thread
        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| NutritionError::NutrientLookup(format!("HTTP client error: {}", e)))?;

        let response = client
            .get(self.endpoint())
            .query(&[
                ("app_id", self.config.app_id.as_str()),
                ("app_key", self.config.app_key.as_str()),
                ("ingr", query.as_str()),
            ])
            .send()
            .map_err(|e| {
                tracing::error!("Edamam request failed: {}", e);
                NutritionError::NutrientLookup(format!("Unable to reach Edamam: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!("Edamam error: {} - {}", status, body);
            return Err(NutritionError::NutrientLookup(format!(
                "Edamam returned {} for '{}'",
                status, query
            )));
        }

        let facts: NutritionFacts = response.json().map_err(|e| {
            tracing::error!("Failed to decode Edamam response: {}", e);
            NutritionError::NutrientLookup(format!("Could not decode response for '{}': {}", query, e))
        })?;

        if !facts.nutrients.is_complete() {
            return Err(NutritionError::NutrientLookup(format!(
                "Edamam has no energy data for '{}'",
                query
            )));
        }

        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_query() {
        assert_eq!(ingredient_query("flour", Unit::G), "flour g");
        assert_eq!(ingredient_query("egg", Unit::Pc), "egg piece");
        assert_eq!(ingredient_query(" olive oil ", Unit::Tablespoon), "olive oil tablespoon");
    }

    #[test]
    fn test_missing_credentials() {
        let client = EdamamClient::new(EdamamConfig::default());
        assert!(matches!(
            client.fetch("flour", Unit::G),
            Err(NutritionError::NutrientLookup(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let client = EdamamClient::new(EdamamConfig {
            base_url: "http://localhost:9999".to_string(),
            ..EdamamConfig::default()
        });
        assert_eq!(client.endpoint(), "http://localhost:9999/api/nutrition-data");
    }
}
