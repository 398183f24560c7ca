// ABOUTME: Shared fakes for browser integration tests
// ABOUTME: In-memory Ayon API with gates that hold individual fetches until released

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ayon_api::{
    ApiError, ApiResult, AyonApi, OperationResponse, OperationType, OperationsResponse,
    VersionEntity, VersionPatch,
};
use ayon_core::{EntityType, Product, Version, VersionFields};
use tokio::sync::Notify;

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn version(id: &str, product_id: &str, folder_id: &str, status: &str) -> Version {
    Version {
        id: id.to_string(),
        name: format!("{}_name", id),
        version: 1,
        status: status.to_string(),
        author: Some("artist".to_string()),
        created_at: None,
        product_id: product_id.to_string(),
        folder_id: folder_id.to_string(),
        task_id: None,
    }
}

/// Product whose list entry points at `latest`
pub fn product(id: &str, folder_id: &str, latest: &Version) -> Product {
    Product {
        id: id.to_string(),
        name: format!("{}_name", id),
        product_type: "model".to_string(),
        folder_id: folder_id.to_string(),
        folder: format!("{}_folder", folder_id),
        task_name: None,
        latest: Some(VersionFields {
            version_id: latest.id.clone(),
            version_name: latest.name.clone(),
            status: latest.status.clone(),
            author: latest.author.clone(),
            created_at: latest.created_at,
        }),
    }
}

/// In-memory server
#[derive(Default)]
pub struct FakeApi {
    pub products: Mutex<Vec<Product>>,
    pub versions: Mutex<Vec<Version>>,
    pub version_calls: Mutex<Vec<Vec<String>>>,
    pub folder_calls: Mutex<Vec<(String, Vec<String>)>>,
    pub update_calls: Mutex<Vec<(Vec<String>, VersionPatch)>>,
    /// Canned update response; `None` applies the patch and succeeds
    pub update_response: Mutex<Option<ApiResult<OperationsResponse>>>,
    pub fail_versions: AtomicBool,
    pub fail_folders: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    started: AtomicUsize,
}

impl FakeApi {
    pub fn new(products: Vec<Product>, versions: Vec<Version>) -> Arc<Self> {
        Arc::new(Self {
            products: Mutex::new(products),
            versions: Mutex::new(versions),
            ..Default::default()
        })
    }

    /// Hold the call for `key` (`folder:<id>`, `versions:<id,id>` or
    /// `update:<status>`) until the returned handle is notified
    pub fn gate(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), notify.clone());
        notify
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Wait until `count` calls have started
    pub async fn wait_for_fetches(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.started() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("fetches never started");
    }

    pub fn set_update_response(&self, response: ApiResult<OperationsResponse>) {
        *self.update_response.lock().unwrap() = Some(response);
    }

    pub fn set_status(&self, version_id: &str, status: &str) {
        for v in self.versions.lock().unwrap().iter_mut() {
            if v.id == version_id {
                v.status = status.to_string();
            }
        }
    }

    async fn pass_gate(&self, key: String) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn find_versions(&self, ids: &[String]) -> Vec<Version> {
        let versions = self.versions.lock().unwrap();
        ids.iter()
            .filter_map(|id| versions.iter().find(|v| &v.id == id).cloned())
            .collect()
    }
}

pub fn failed_operations(details: &[&str]) -> OperationsResponse {
    OperationsResponse {
        success: false,
        operations: details
            .iter()
            .map(|detail| OperationResponse {
                id: None,
                operation_type: Some(OperationType::Update),
                entity_type: Some(EntityType::Version),
                entity_id: None,
                success: false,
                status: Some(409),
                detail: Some(detail.to_string()),
            })
            .collect(),
    }
}

#[async_trait]
impl AyonApi for FakeApi {
    async fn product_list(&self, folder_ids: &[String]) -> ApiResult<Vec<Product>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| folder_ids.contains(&p.folder_id))
            .cloned()
            .collect())
    }

    async fn versions(&self, ids: &[String]) -> ApiResult<Vec<Version>> {
        self.version_calls.lock().unwrap().push(ids.to_vec());
        self.pass_gate(format!("versions:{}", ids.join(","))).await;
        if self.fail_versions.load(Ordering::SeqCst) {
            return Err(ApiError::Network("connection reset".to_string()));
        }
        Ok(self.find_versions(ids))
    }

    async fn folder_versions(&self, folder_id: &str, ids: &[String]) -> ApiResult<Vec<Version>> {
        self.folder_calls
            .lock()
            .unwrap()
            .push((folder_id.to_string(), ids.to_vec()));
        self.pass_gate(format!("folder:{}", folder_id)).await;
        if self
            .fail_folders
            .lock()
            .unwrap()
            .iter()
            .any(|f| f == folder_id)
        {
            return Err(ApiError::Http {
                status: 500,
                message: "Folder query failed".to_string(),
            });
        }
        Ok(self
            .find_versions(ids)
            .into_iter()
            .filter(|v| v.folder_id == folder_id)
            .collect())
    }

    async fn version(&self, id: &str) -> ApiResult<VersionEntity> {
        let found = self.find_versions(&[id.to_string()]).pop();
        let v = found.ok_or_else(|| ApiError::NotFound(format!("Version {}", id)))?;
        Ok(VersionEntity {
            id: v.id,
            version: v.version,
            product_id: v.product_id,
            task_id: v.task_id,
            author: v.author,
            status: v.status,
            tags: vec!["hero".to_string()],
            attrib: serde_json::json!({ "comment": "first pass" }),
            active: true,
            created_at: v.created_at,
            updated_at: None,
        })
    }

    async fn update_versions(
        &self,
        ids: &[String],
        patch: &VersionPatch,
    ) -> ApiResult<OperationsResponse> {
        self.update_calls
            .lock()
            .unwrap()
            .push((ids.to_vec(), patch.clone()));
        self.pass_gate(format!("update:{}", patch.status.as_deref().unwrap_or_default()))
            .await;
        if let Some(response) = self.update_response.lock().unwrap().clone() {
            return response;
        }

        if let Some(status) = &patch.status {
            for id in ids {
                self.set_status(id, status);
            }
            for p in self.products.lock().unwrap().iter_mut() {
                if let Some(latest) = p.latest.as_mut() {
                    if ids.contains(&latest.version_id) {
                        latest.status = status.clone();
                    }
                }
            }
        }
        Ok(OperationsResponse {
            success: true,
            operations: ids
                .iter()
                .map(|id| OperationResponse {
                    id: None,
                    operation_type: Some(OperationType::Update),
                    entity_type: Some(EntityType::Version),
                    entity_id: Some(id.clone()),
                    success: true,
                    status: Some(204),
                    detail: None,
                })
                .collect(),
        })
    }
}
