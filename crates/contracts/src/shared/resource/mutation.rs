use serde_json::Value;

use crate::domain::catalog::{BulkDeleteRequest, CatalogEntity, ResourceKind};
use crate::shared::metadata::FieldMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Transport-neutral request: what to send, not how
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path relative to the API root, e.g. `/api/metals/7`
    pub path: String,
    pub body: Option<Value>,
}

/// One mutation of a resource collection.
///
/// Every successful mutation is followed by a full list reload; nothing is
/// patched locally.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationRequest {
    Create(FieldMap),
    /// Full replace of every editable field
    Update { id: i64, payload: FieldMap },
    /// Only the given keys change
    Patch { id: i64, payload: FieldMap },
    Delete(i64),
    BulkDelete(Vec<i64>),
}

impl MutationRequest {
    /// Flip `is_active` without echoing the rest of the record
    pub fn toggle_active(entity: &CatalogEntity) -> Self {
        let mut payload = FieldMap::new();
        payload.insert("is_active".to_string(), Value::Bool(!entity.is_active));
        Self::Patch {
            id: entity.id,
            payload,
        }
    }

    pub fn target_id(&self) -> Option<i64> {
        match self {
            Self::Update { id, .. } | Self::Patch { id, .. } | Self::Delete(id) => Some(*id),
            Self::Create(_) | Self::BulkDelete(_) => None,
        }
    }

    /// Bulk delete consumes the selection it was built from
    pub fn clears_selection(&self) -> bool {
        matches!(self, Self::BulkDelete(_))
    }

    /// Whether a successful response carries the saved record
    pub fn returns_entity(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Update { .. } | Self::Patch { .. })
    }

    pub fn to_api_request(&self, kind: ResourceKind) -> ApiRequest {
        let base = format!("/api/{}", kind.collection_name());
        match self {
            Self::Create(payload) => ApiRequest {
                method: HttpMethod::Post,
                path: base,
                body: Some(Value::Object(payload.clone())),
            },
            Self::Update { id, payload } => ApiRequest {
                method: HttpMethod::Put,
                path: format!("{}/{}", base, id),
                body: Some(Value::Object(payload.clone())),
            },
            Self::Patch { id, payload } => ApiRequest {
                method: HttpMethod::Patch,
                path: format!("{}/{}", base, id),
                body: Some(Value::Object(payload.clone())),
            },
            Self::Delete(id) => ApiRequest {
                method: HttpMethod::Delete,
                path: format!("{}/{}", base, id),
                body: None,
            },
            Self::BulkDelete(ids) => ApiRequest {
                method: HttpMethod::Delete,
                path: format!("{}/bulk", base),
                body: serde_json::to_value(BulkDeleteRequest { ids: ids.clone() }).ok(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn toggle_active_sends_only_the_flag() {
        let entity: CatalogEntity = serde_json::from_value(json!({
            "id": 5, "name": "Серебро 925", "code": "AG925", "is_active": false, "purity": 925.0
        }))
        .unwrap();

        let request = MutationRequest::toggle_active(&entity).to_api_request(ResourceKind::Metal);
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.path, "/api/metals/5");
        assert_eq!(request.body, Some(json!({"is_active": true})));
    }

    #[test]
    fn bulk_delete_targets_bulk_route() {
        let mutation = MutationRequest::BulkDelete(vec![1, 2, 3]);
        let request = mutation.to_api_request(ResourceKind::ShapeSize);
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.path, "/api/shape-sizes/bulk");
        assert_eq!(request.body, Some(json!({"ids": [1, 2, 3]})));
        assert!(mutation.clears_selection());
        assert!(!mutation.returns_entity());
    }

    #[test]
    fn create_and_update_paths() {
        let mut payload = FieldMap::new();
        payload.insert("name".into(), json!("17"));

        let create = MutationRequest::Create(payload.clone()).to_api_request(ResourceKind::Size);
        assert_eq!((create.method, create.path.as_str()), (HttpMethod::Post, "/api/sizes"));

        let update = MutationRequest::Update { id: 9, payload };
        assert_eq!(update.target_id(), Some(9));
        let request = update.to_api_request(ResourceKind::Size);
        assert_eq!((request.method, request.path.as_str()), (HttpMethod::Put, "/api/sizes/9"));
    }
}
