//! Report service
//!
//! Resolves share tokens and owner requests to stored reports, normalizes
//! the payload and computes the monitoring analysis handed to the renderer.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use shared::{
    declared_id, declared_title, normalize_report, KnowledgeBase, MonitoringAnalysis,
    PaginatedResponse, Pagination, PaginationMeta, RecommendationEngine, Report,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{mock, ReportStore, ReportSummary, StoredReport};

/// What the rendering layer receives for one report
#[derive(Debug, Serialize)]
pub struct ReportView {
    pub report: Report,
    /// Present for monitoring reports only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MonitoringAnalysis>,
}

/// Link issued when an owner publishes a report
#[derive(Debug, Serialize)]
pub struct ShareLink {
    pub report_id: String,
    pub token: String,
    pub path: String,
}

/// Report service
#[derive(Clone)]
pub struct ReportService {
    store: ReportStore,
    engine: RecommendationEngine,
    mock_enabled: bool,
}

impl ReportService {
    pub fn new(store: ReportStore, knowledge: Arc<KnowledgeBase>, mock_enabled: bool) -> Self {
        Self {
            store,
            engine: RecommendationEngine::new(knowledge),
            mock_enabled,
        }
    }

    /// Resolve a public share token.
    ///
    /// A token that the store does not know, or whose sharing is disabled,
    /// falls back to the demo fixtures when enabled. A demo token is also
    /// served when the store lookup fails; other tokens surface the error.
    pub async fn get_shared(&self, token: &str) -> AppResult<ReportView> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::NotFound("Report".to_string()));
        }

        let found = match self.store.find_by_share_token(token).await {
            Ok(found) => found,
            Err(e) if self.mock_enabled && mock::is_demo_token(token) => {
                tracing::warn!("share lookup failed, serving demo fixture: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        let stored = match found {
            Some(report) if report.share_enabled => Some(report),
            Some(_) => {
                tracing::info!("share token found but sharing is disabled");
                None
            }
            None => None,
        };

        let stored = match stored {
            Some(report) => report,
            None if self.mock_enabled => mock::find_by_share_token(token)
                .ok_or_else(|| AppError::NotFound("Report".to_string()))?,
            None => return Err(AppError::NotFound("Report".to_string())),
        };

        self.render(stored)
    }

    /// Per-point metrics of a shared monitoring report as CSV
    pub async fn shared_point_metrics_csv(&self, token: &str) -> AppResult<String> {
        let view = self.get_shared(token).await?;
        let analysis = view
            .analysis
            .ok_or_else(|| AppError::UnsupportedExport(view.report.kind().to_string()))?;
        Self::export_to_csv(&analysis.points)
    }

    pub async fn list_owned(
        &self,
        owner_uid: &str,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<ReportSummary>> {
        let (data, total) = self.store.list_for_owner(owner_uid, pagination).await?;
        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(pagination, total),
        })
    }

    pub async fn get_owned(&self, id: &str, owner_uid: &str) -> AppResult<ReportView> {
        let stored = self
            .store
            .find_for_owner(id, owner_uid)
            .await?
            .ok_or_else(|| AppError::NotFound("Report".to_string()))?;
        self.render(stored)
    }

    /// Issue a fresh share token, replacing any previous one
    pub async fn share(&self, id: &str, owner_uid: &str) -> AppResult<ShareLink> {
        let token = Uuid::new_v4().simple().to_string();
        if !self.store.set_share_token(id, owner_uid, Some(&token)).await? {
            return Err(AppError::NotFound("Report".to_string()));
        }

        tracing::info!(report_id = %id, "share link issued");
        Ok(ShareLink {
            report_id: id.to_string(),
            path: format!("/api/v1/share/{}", token),
            token,
        })
    }

    pub async fn revoke_share(&self, id: &str, owner_uid: &str) -> AppResult<()> {
        if !self.store.set_share_token(id, owner_uid, None).await? {
            return Err(AppError::NotFound("Report".to_string()));
        }
        tracing::info!(report_id = %id, "share link revoked");
        Ok(())
    }

    fn render(&self, stored: StoredReport) -> AppResult<ReportView> {
        let payload = payload_with_header(&stored);
        let report = normalize_report(&payload, stored.kind)?;

        let analysis = match &report {
            Report::Monitoring(monitoring) => {
                Some(MonitoringAnalysis::compute(&monitoring.talhao, &self.engine))
            }
            _ => None,
        };

        Ok(ReportView { report, analysis })
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

/// The stored payload, with the row's id and title filled in when the
/// payload lacks them. A missing payload becomes an empty object.
pub(crate) fn payload_with_header(stored: &StoredReport) -> Value {
    let mut payload = stored
        .data
        .clone()
        .unwrap_or_else(|| Value::Object(Default::default()));

    let has_id = declared_id(&payload).is_some();
    let has_title = declared_title(&payload).is_some();

    if let Value::Object(map) = &mut payload {
        if !has_id {
            map.insert("id".to_string(), Value::String(stored.id.clone()));
        }
        if let Some(title) = stored.title.as_ref().filter(|_| !has_title) {
            map.insert("title".to_string(), Value::String(title.clone()));
        }
    }
    payload
}
