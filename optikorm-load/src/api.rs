//! Endpoints and bodies of the OPTIKORM REST API.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const REGISTER: &str = "api/auth/register/";
pub const LOGIN: &str = "api/auth/login/";
pub const NUTRIENTS: &str = "api/nutrients/";
pub const FISH: &str = "api/fish/";
pub const FEEDS: &str = "api/feeds/";
pub const CALCULATE: &str = "api/calculate/";
pub const ROOT: &str = "api/";

/// Weight sent for the seeded nutrient in fish and feed mappings.
pub const SEED_NUTRIENT_WEIGHT: &str = "50.0";
pub const SEED_FEED_PRICE: &str = "10.0";
/// Fish weight used by the calculation task.
pub const CALCULATE_FISH_WEIGHT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

/// Registration and login body. Login leaves `role` out.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl<'a> Credentials<'a> {
    pub fn register(username: &'a str, password: &'a str) -> Self {
        Self {
            username,
            password,
            role: Some(Role::Admin),
        }
    }

    pub fn login(&self) -> Self {
        Self {
            role: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Any creation response; only the id is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewNutrient {
    pub name: String,
    pub unit: String,
}

impl NewNutrient {
    pub fn protein() -> Self {
        Self {
            name: "Protein".to_string(),
            unit: "g/kg".to_string(),
        }
    }
}

/// Nutrient id (as a string key) to weight.
pub type NutrientWeights = BTreeMap<String, String>;

fn seed_weights(nutrient_id: i64) -> NutrientWeights {
    BTreeMap::from([(nutrient_id.to_string(), SEED_NUTRIENT_WEIGHT.to_string())])
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFish {
    pub name: String,
    pub nutrients: NutrientWeights,
}

impl NewFish {
    pub fn seeded(name: String, nutrient_id: i64) -> Self {
        Self {
            name,
            nutrients: seed_weights(nutrient_id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFeed {
    pub name: String,
    pub price: String,
    pub nutrients: NutrientWeights,
}

impl NewFeed {
    pub fn seeded(name: String, nutrient_id: i64) -> Self {
        Self {
            name,
            price: SEED_FEED_PRICE.to_string(),
            nutrients: seed_weights(nutrient_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FishSelection {
    pub fish_id: i64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateRequest {
    pub fish_selections: Vec<FishSelection>,
}

impl CalculateRequest {
    /// A valid selection of the seeded fish, or an empty selection to exercise the error path.
    pub fn for_fish(fish_id: Option<i64>) -> Self {
        Self {
            fish_selections: fish_id
                .map(|fish_id| FishSelection {
                    fish_id,
                    weight: CALCULATE_FISH_WEIGHT,
                })
                .into_iter()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_omits_role() {
        let register = Credentials::register("locust_admin_1a2b3c4d", "secret");
        assert_eq!(
            serde_json::to_value(&register).unwrap(),
            json!({"username": "locust_admin_1a2b3c4d", "password": "secret", "role": "admin"})
        );
        assert_eq!(
            serde_json::to_value(register.login()).unwrap(),
            json!({"username": "locust_admin_1a2b3c4d", "password": "secret"})
        );
    }

    #[test]
    fn seeded_bodies() {
        assert_eq!(
            serde_json::to_value(NewFish::seeded("Fish_ab12".into(), 7)).unwrap(),
            json!({"name": "Fish_ab12", "nutrients": {"7": "50.0"}})
        );
        assert_eq!(
            serde_json::to_value(NewFeed::seeded("Feed_cd34".into(), 7)).unwrap(),
            json!({"name": "Feed_cd34", "price": "10.0", "nutrients": {"7": "50.0"}})
        );
        assert_eq!(
            serde_json::to_value(NewNutrient::protein()).unwrap(),
            json!({"name": "Protein", "unit": "g/kg"})
        );
    }

    #[test]
    fn calculate_selection_follows_fish() {
        assert_eq!(
            serde_json::to_value(CalculateRequest::for_fish(Some(3))).unwrap(),
            json!({"fish_selections": [{"fish_id": 3, "weight": 100.0}]})
        );
        assert_eq!(
            serde_json::to_value(CalculateRequest::for_fish(None)).unwrap(),
            json!({"fish_selections": []})
        );
    }

    #[test]
    fn lenient_responses() {
        let token: TokenResponse = serde_json::from_str(r#"{"user": 1}"#).unwrap();
        assert_eq!(token.token, None);

        let created: Created = serde_json::from_str(r#"{"id": 12, "name": "Protein"}"#).unwrap();
        assert_eq!(created.id, Some(12));
    }
}
