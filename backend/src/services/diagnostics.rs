//! Share-link diagnostics
//!
//! Replays the share-token lookup step by step so a 404 can be explained
//! without exposing report contents. The token itself is never echoed back,
//! only a SHA-256 fingerprint.

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::{
    detect_kind, normalize_report, validate_area_ha, validate_coordinates, validate_severity,
    Report, ReportKind,
};

use crate::store::{mock, ReportStore, SourceStatus, StoredReport};

use super::report::payload_with_header;

/// One step of the lookup trace
#[derive(Debug, Serialize)]
pub struct DiagnosticStep {
    pub step: &'static str,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct ShareDiagnostics {
    pub token_fingerprint: String,
    pub token_length: usize,
    pub source: SourceStatus,
    pub steps: Vec<DiagnosticStep>,
    pub detected_kind: Option<ReportKind>,
    pub mock_available: bool,
    /// Data quality issues that do not block rendering
    pub warnings: Vec<String>,
}

impl ShareDiagnostics {
    /// Whether the public route would serve a report for this token
    pub fn resolves(&self) -> bool {
        self.steps.iter().any(|s| s.step == "normalization" && s.ok)
    }
}

pub struct DiagnosticsService {
    store: ReportStore,
    mock_enabled: bool,
}

impl DiagnosticsService {
    pub fn new(store: ReportStore, mock_enabled: bool) -> Self {
        Self { store, mock_enabled }
    }

    pub async fn diagnose_share(&self, token: &str) -> ShareDiagnostics {
        let token = token.trim();
        let mut steps = Vec::new();
        let source = self.store.probe().await;

        steps.push(DiagnosticStep {
            step: "token_format",
            ok: !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            detail: format!("{} characters", token.chars().count()),
        });

        steps.push(DiagnosticStep {
            step: "store_connection",
            ok: source.connected,
            detail: format!("{:?}", source.source).to_lowercase(),
        });

        let mut lookup_failed = false;
        let found = match self.store.find_by_share_token(token).await {
            Ok(found) => {
                steps.push(DiagnosticStep {
                    step: "store_lookup",
                    ok: found.is_some(),
                    detail: if found.is_some() { "token found" } else { "no report with this token" }.to_string(),
                });
                found
            }
            Err(e) => {
                tracing::warn!("diagnostics lookup failed: {}", e);
                lookup_failed = true;
                steps.push(DiagnosticStep {
                    step: "store_lookup",
                    ok: false,
                    detail: e.to_string(),
                });
                None
            }
        };

        let published = match found {
            Some(report) => {
                steps.push(DiagnosticStep {
                    step: "share_enabled",
                    ok: report.share_enabled,
                    detail: if report.share_enabled { "sharing enabled" } else { "sharing disabled by owner" }.to_string(),
                });
                report.share_enabled.then_some(report)
            }
            None => None,
        };

        let mock_available = self.mock_enabled && mock::is_demo_token(token);
        let candidate = match published {
            Some(report) => Some(report),
            None if mock_available => {
                steps.push(DiagnosticStep {
                    step: "mock_fallback",
                    ok: true,
                    detail: "serving demo fixture".to_string(),
                });
                mock::find_by_share_token(token)
            }
            None => {
                let detail = if !self.mock_enabled {
                    "fallback disabled"
                } else if lookup_failed {
                    "not a demo token; the public route returns the store error"
                } else {
                    "not a demo token"
                };
                steps.push(DiagnosticStep {
                    step: "mock_fallback",
                    ok: false,
                    detail: detail.to_string(),
                });
                None
            }
        };

        let mut detected_kind = None;
        let mut warnings = Vec::new();
        if let Some(stored) = candidate {
            let (kind, step, report_warnings) = inspect(&stored);
            detected_kind = kind;
            steps.push(step);
            warnings = report_warnings;
        }

        ShareDiagnostics {
            token_fingerprint: fingerprint(token),
            token_length: token.chars().count(),
            source,
            steps,
            detected_kind,
            mock_available,
            warnings,
        }
    }
}

/// Normalize the payload and collect data quality warnings
fn inspect(stored: &StoredReport) -> (Option<ReportKind>, DiagnosticStep, Vec<String>) {
    let payload = payload_with_header(stored);
    let detected = stored.kind.or_else(|| detect_kind(&payload));

    match normalize_report(&payload, stored.kind) {
        Ok(report) => {
            let kind = report.kind();
            let step = DiagnosticStep {
                step: "normalization",
                ok: true,
                detail: format!("normalized as {}", kind),
            };
            (Some(kind), step, report_warnings(&report))
        }
        Err(e) => (
            detected,
            DiagnosticStep {
                step: "normalization",
                ok: false,
                detail: e.to_string(),
            },
            Vec::new(),
        ),
    }
}

fn report_warnings(report: &Report) -> Vec<String> {
    let mut warnings = Vec::new();
    let talhao = report.talhao();

    if let Some(area) = talhao.area_ha.to_f64() {
        if let Err(msg) = validate_area_ha(area) {
            warnings.push(format!("talhão: {}", msg));
        }
    }

    for point in &talhao.points {
        if let Err(msg) = validate_coordinates(point.latitude, point.longitude) {
            warnings.push(format!("{}: {}", point.label, msg));
        }
        for infestation in &point.infestations {
            if let Err(msg) = validate_severity(infestation.severity) {
                warnings.push(format!("{} / {}: {}", point.label, infestation.name, msg));
            }
        }
    }

    if let Report::Planting(planting) = report {
        if planting.row_spacing_m <= 0.0 {
            warnings.push("row spacing missing; population per hectare not computed".to_string());
        }
    }

    warnings
}

/// First 12 hex digits of the token's SHA-256
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().take(6).map(|b| format!("{:02x}", b)).collect()
}
