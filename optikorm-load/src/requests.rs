//! One transaction per OPTIKORM endpoint.
//!
//! Each call reads the full response body. A status outside the accepted set is returned as an
//! error, so it is tallied as a failure.
use crate::api::{
    CalculateRequest, Credentials, NewFeed, NewFish, NewNutrient, CALCULATE, FEEDS, FISH, LOGIN,
    NUTRIENTS, REGISTER, ROOT,
};
use crate::client::{expect_status, expect_success, ApiClient};
use crate::error::ApiError;
use reqwest::StatusCode;
use swarm::transaction;

const CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];

#[transaction("POST api/auth/register/")]
pub async fn register(client: &ApiClient, credentials: &Credentials<'_>) -> Result<String, ApiError> {
    let response = client.post(REGISTER, credentials).await?;
    expect_status(REGISTER, response, CREATED).await
}

#[transaction("POST api/auth/login/")]
pub async fn login(client: &ApiClient, credentials: &Credentials<'_>) -> Result<String, ApiError> {
    let response = client.post(LOGIN, credentials).await?;
    expect_status(LOGIN, response, &[StatusCode::OK]).await
}

#[transaction("POST api/nutrients/")]
pub async fn create_nutrient(client: &ApiClient, nutrient: &NewNutrient) -> Result<String, ApiError> {
    let response = client.post(NUTRIENTS, nutrient).await?;
    expect_status(NUTRIENTS, response, CREATED).await
}

#[transaction("POST api/fish/")]
pub async fn create_fish(client: &ApiClient, fish: &NewFish) -> Result<String, ApiError> {
    let response = client.post(FISH, fish).await?;
    expect_status(FISH, response, CREATED).await
}

#[transaction("POST api/feeds/")]
pub async fn create_feed(client: &ApiClient, feed: &NewFeed) -> Result<String, ApiError> {
    let response = client.post(FEEDS, feed).await?;
    expect_status(FEEDS, response, CREATED).await
}

#[transaction("GET api/nutrients/")]
pub async fn list_nutrients(client: &ApiClient) -> Result<String, ApiError> {
    let response = client.get(NUTRIENTS).await?;
    expect_success(NUTRIENTS, response).await
}

#[transaction("GET api/fish/")]
pub async fn list_fish(client: &ApiClient) -> Result<String, ApiError> {
    let response = client.get(FISH).await?;
    expect_success(FISH, response).await
}

#[transaction("GET api/feeds/")]
pub async fn list_feeds(client: &ApiClient) -> Result<String, ApiError> {
    let response = client.get(FEEDS).await?;
    expect_success(FEEDS, response).await
}

#[transaction("POST api/calculate/")]
pub async fn calculate(client: &ApiClient, request: &CalculateRequest) -> Result<String, ApiError> {
    let response = client.post(CALCULATE, request).await?;
    expect_success(CALCULATE, response).await
}

#[transaction("GET api/")]
pub async fn api_root(client: &ApiClient) -> Result<String, ApiError> {
    let response = client.get(ROOT).await?;
    expect_success(ROOT, response).await
}
