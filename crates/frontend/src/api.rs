use serde::{Deserialize, Serialize};
use spotguess_shared::models::{Region, RegionDataset};
use spotguess_shared::DataLoadError;

/// Build the variables JSON for a region dataset query.
pub fn build_region_variables(file_name: &str) -> serde_json::Value {
    serde_json::json!({ "fileName": file_name })
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

fn api_url() -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| "no origin".to_string())?;
    Ok(format!("{}/graphql", origin))
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(api_url()?)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;
    unwrap_response(gql_resp)
}

/// First GraphQL error wins; otherwise the data must be present.
fn unwrap_response<T>(resp: GraphQLResponse<T>) -> Result<T, String> {
    if let Some(errors) = resp.errors {
        if let Some(first) = errors.into_iter().next() {
            return Err(first.message);
        }
    }
    resp.data.ok_or_else(|| "No data returned".to_string())
}

// API functions

#[derive(Deserialize)]
pub struct RegionsResponse {
    pub regions: Vec<Region>,
}

pub async fn fetch_regions() -> Result<Vec<Region>, String> {
    let resp: RegionsResponse = query(
        r#"query { regions(activeOnly: true) { displayName fileName active } }"#,
        None,
    )
    .await?;
    Ok(resp.regions)
}

const REGION_QUERY: &str = r#"query Region($fileName: String!) {
    region(fileName: $fileName) {
        displayName filePath imageName
        mapData { difficulty callouts { location { x y } regionName superRegionName imageFile } }
    }
}"#;

#[derive(Deserialize)]
pub struct RegionResponse {
    pub region: Option<RegionDataset>,
}

pub async fn fetch_region(file_name: &str) -> Result<Option<RegionDataset>, String> {
    let resp: RegionResponse =
        query(REGION_QUERY, Some(build_region_variables(file_name))).await?;
    Ok(resp.region)
}

/// Fetch every requested region, in order. Any failure aborts the whole load.
pub async fn fetch_datasets(
    regions: &[String],
) -> Result<Vec<(String, RegionDataset)>, DataLoadError> {
    let mut datasets = Vec::with_capacity(regions.len());
    for region in regions {
        let dataset = fetch_region(region)
            .await
            .map_err(|message| DataLoadError::Fetch {
                region: region.clone(),
                message,
            })?
            .ok_or_else(|| DataLoadError::RegionNotFound(region.clone()))?;
        datasets.push((region.clone(), dataset));
    }
    Ok(datasets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_request_serializes_with_variables() {
        let req = GraphQLRequest {
            query: REGION_QUERY.to_string(),
            variables: Some(build_region_variables("ascent")),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["variables"]["fileName"], "ascent");
    }

    #[test]
    fn test_graphql_request_omits_null_variables() {
        let req = GraphQLRequest {
            query: "{ regions { fileName } }".to_string(),
            variables: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("variables"));
    }

    #[test]
    fn test_regions_response_deserializes() {
        let json = r#"{"regions":[{"displayName":"Ascent","fileName":"ascent","active":true}]}"#;
        let resp: RegionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.regions.len(), 1);
        assert_eq!(resp.regions[0].file_name, "ascent");
        assert!(resp.regions[0].active);
    }

    #[test]
    fn test_region_response_deserializes_into_dataset() {
        let json = r#"{"region":{"displayName":"Bind","filePath":"/static/maps/bind/","imageName":"minimap.webp",
            "mapData":[{"difficulty":"hard","callouts":[{"location":{"x":0.1,"y":0.9},
            "regionName":"Lamps","superRegionName":"B","imageFile":"lamps.webp"}]}]}}"#;
        let resp: RegionResponse = serde_json::from_str(json).unwrap();
        let dataset = resp.region.unwrap();
        assert_eq!(dataset.map_image_path(), "/static/maps/bind/minimap.webp");
        assert_eq!(dataset.map_data[0].callouts[0].image_file, "lamps.webp");
    }

    #[test]
    fn test_region_null() {
        let resp: RegionResponse = serde_json::from_str(r#"{"region":null}"#).unwrap();
        assert!(resp.region.is_none());
    }

    #[test]
    fn test_graphql_error_response() {
        let json = r#"{"data":null,"errors":[{"message":"Unknown region: haven"}]}"#;
        let resp: GraphQLResponse<RegionResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(unwrap_response(resp).err().unwrap(), "Unknown region: haven");
    }

    #[test]
    fn test_missing_data_is_error() {
        let resp: GraphQLResponse<RegionResponse> =
            serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert_eq!(unwrap_response(resp).err().unwrap(), "No data returned");
    }

    #[test]
    fn test_empty_error_list_returns_data() {
        let resp: GraphQLResponse<RegionsResponse> =
            serde_json::from_str(r#"{"data":{"regions":[]},"errors":[]}"#).unwrap();
        assert!(unwrap_response(resp).unwrap().regions.is_empty());
    }
}
