//! Resource seeder
use crate::api::{Created, NewFeed, NewFish, NewNutrient};
use crate::auth::short_hex;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::requests;
use tracing::{debug, warn};

/// Ids created during startup. Unset ids mean the creation failed or was skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceIds {
    pub nutrient: Option<i64>,
    pub fish: Option<i64>,
    pub feed: Option<i64>,
}

/// Create a nutrient, then a fish and a feed referencing it.
///
/// Fish and feed are only attempted once the nutrient exists; neither depends on the other.
pub async fn seed(client: &ApiClient) -> ResourceIds {
    let mut ids = ResourceIds {
        nutrient: created_id(
            "nutrient",
            requests::create_nutrient(client, &NewNutrient::protein()).await,
        ),
        ..ResourceIds::default()
    };

    if let Some(nutrient) = ids.nutrient {
        let fish = NewFish::seeded(format!("Fish_{}", short_hex(4)), nutrient);
        ids.fish = created_id("fish", requests::create_fish(client, &fish).await);

        let feed = NewFeed::seeded(format!("Feed_{}", short_hex(4)), nutrient);
        ids.feed = created_id("feed", requests::create_feed(client, &feed).await);
    } else {
        debug!("No nutrient, skipping fish and feed.");
    }

    ids
}

fn created_id(kind: &str, response: Result<String, ApiError>) -> Option<i64> {
    match response {
        Ok(body) => match serde_json::from_str::<Created>(&body) {
            Ok(Created { id: Some(id) }) => Some(id),
            Ok(_) => {
                warn!("No id in {kind} response");
                None
            }
            Err(err) => {
                warn!("Failed to parse {kind} response: {err}");
                None
            }
        },
        Err(err) => {
            debug!("Creating {kind} failed: {err}");
            None
        }
    }
}
