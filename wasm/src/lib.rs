use mindcanvas::config::LayoutConfig;
use mindcanvas::layout::{CanvasBounds, arrange_around_detailed};
use mindcanvas::model::{CircleNode, Point};
use mindcanvas::{extract_items, nodes_collide};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrangeRequest {
    anchor: Point,
    count: f64,
    #[serde(default)]
    obstacles: Vec<CircleNode>,
    exclude_id: Option<String>,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    new_item_size: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlacedItem {
    x: f32,
    y: f32,
    center: Point,
    fallback: bool,
}

/// Upper bound on counts coming from JS.
const MAX_COUNT: usize = 256;

/// JS numbers arrive as doubles; anything that is not a positive finite
/// count becomes zero, which both core functions treat as "nothing" or
/// "default". Larger counts are capped at [`MAX_COUNT`].
fn to_count(value: f64) -> usize {
    if value.is_finite() && value >= 1.0 {
        value.floor().min(MAX_COUNT as f64) as usize
    } else {
        0
    }
}

fn extract_json(text: Option<String>, max_count: f64) -> String {
    let items = match text {
        Some(text) => extract_items(&text, to_count(max_count)),
        None => Vec::new(),
    };
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}

fn arrange_json(request_json: &str) -> Result<String, String> {
    let request: ArrangeRequest =
        serde_json::from_str(request_json).map_err(|error| error.to_string())?;
    let mut config = LayoutConfig::default();
    if let Some(size) = request.new_item_size {
        config.new_item_size = size;
    }
    let placements = arrange_around_detailed(
        request.anchor,
        to_count(request.count),
        &request.obstacles,
        request.exclude_id.as_deref(),
        CanvasBounds::new(request.width, request.height),
        &config,
    );
    let items: Vec<PlacedItem> = placements
        .into_iter()
        .map(|placement| PlacedItem {
            x: placement.position.x,
            y: placement.position.y,
            center: placement.center,
            fallback: placement.fallback,
        })
        .collect();
    serde_json::to_string(&items).map_err(|error| error.to_string())
}

fn collide_json(a_json: &str, b_json: &str) -> Result<bool, String> {
    let a: CircleNode = serde_json::from_str(a_json).map_err(|error| error.to_string())?;
    let b: CircleNode = serde_json::from_str(b_json).map_err(|error| error.to_string())?;
    Ok(nodes_collide(&a, &b))
}

#[wasm_bindgen]
pub fn extract_items_json(text: Option<String>, max_count: f64) -> String {
    extract_json(text, max_count)
}

#[wasm_bindgen]
pub fn arrange_around_json(request_json: &str) -> Result<String, JsValue> {
    arrange_json(request_json).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn nodes_collide_json(a_json: &str, b_json: &str) -> Result<bool, JsValue> {
    collide_json(a_json, b_json).map_err(|error| JsValue::from_str(&error))
}
