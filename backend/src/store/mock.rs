//! Demo fixtures served when no store has a report
//!
//! Each fixture is a raw payload in the loose shape the field apps produce,
//! so it exercises the same normalization path as stored reports.

use serde_json::{json, Value};
use shared::ReportKind;

use super::StoredReport;

pub const DEMO_MONITORING: &str = "demo-monitoramento";
pub const DEMO_PLANTING: &str = "demo-plantio";
pub const DEMO_VISIT: &str = "demo-visita";
pub const DEMO_SIDE_BY_SIDE: &str = "demo-lado-a-lado";

/// Every token with a fixture
pub const DEMO_TOKENS: &[&str] = &[DEMO_MONITORING, DEMO_PLANTING, DEMO_VISIT, DEMO_SIDE_BY_SIDE];

pub fn is_demo_token(token: &str) -> bool {
    DEMO_TOKENS.contains(&token)
}

pub fn find_by_share_token(token: &str) -> Option<StoredReport> {
    let (kind, data) = match token {
        DEMO_MONITORING => (ReportKind::Monitoring, monitoring_fixture()),
        DEMO_PLANTING => (ReportKind::Planting, planting_fixture()),
        DEMO_VISIT => (ReportKind::Visit, visit_fixture()),
        DEMO_SIDE_BY_SIDE => (ReportKind::SideBySide, side_by_side_fixture()),
        _ => return None,
    };

    Some(StoredReport {
        id: token.to_string(),
        owner_uid: None,
        kind: Some(kind),
        title: Some(kind.default_title().to_string()),
        share_token: Some(token.to_string()),
        share_enabled: true,
        created_at: None,
        data: Some(data),
    })
}

fn monitoring_fixture() -> Value {
    json!({
        "id": DEMO_MONITORING,
        "titulo": "Monitoramento de Pragas e Doenças - Soja",
        "data": "2025-01-14",
        "fazenda": "Fazenda Santa Helena",
        "tecnico": "Eng. Agr. Marina Costa",
        "estadio": "R3 (início de formação de vagens)",
        "talhao": {
            "id": "talhao-12",
            "nome": "Talhão 12",
            "cultura": "Soja",
            "areaHa": 86.4,
            "pontos": [
                {
                    "id": "p1", "label": "P1", "lat": -12.5461, "lng": -55.7213,
                    "infestacoes": [
                        {"tipo": "doenca", "nome": "Ferrugem Asiática", "terco": "inferior", "severidade": 32},
                        {"tipo": "praga", "nome": "Percevejo-marrom", "terco": "superior", "quantidade": 3, "severidade": 18}
                    ]
                },
                {
                    "id": "p2", "label": "P2", "lat": -12.5474, "lng": -55.7198,
                    "infestacoes": [
                        {"tipo": "doenca", "nome": "ferrugem asiática", "terco": "médio", "severidade": 28}
                    ]
                },
                {
                    "id": "p3", "label": "P3", "lat": -12.5489, "lng": -55.7225,
                    "infestacoes": [
                        {"tipo": "doenca", "nome": "Ferrugem Asiática", "terco": "inferior", "severidade": 38},
                        {"tipo": "praga", "nome": "Lagarta-falsa-medideira", "terco": "médio", "quantidade": 6, "severidade": 12},
                        {"tipo": "daninha", "nome": "Buva", "terco": "—", "severidade": 6}
                    ]
                },
                {
                    "id": "p4", "label": "P4", "lat": -12.5452, "lng": -55.7237,
                    "infestacoes": []
                },
                {
                    "id": "p5", "label": "P5", "lat": -12.5466, "lng": -55.7249,
                    "infestacoes": [
                        {"tipo": "praga", "nome": "Percevejo-marrom", "terco": "superior", "quantidade": 5, "severidade": 44, "obs": "Ninfas e adultos na bordadura"}
                    ]
                }
            ]
        },
        "observacoes": "Chuvas frequentes na última semana favorecem a ferrugem."
    })
}

fn planting_fixture() -> Value {
    json!({
        "id": DEMO_PLANTING,
        "titulo": "Qualidade de Plantio - Milho Safrinha",
        "data": "2025-02-20",
        "fazenda": "Fazenda Santa Helena",
        "talhao": {"id": "talhao-07", "nome": "Talhão 07", "cultura": "Milho", "area": "54,2"},
        "variedade": "DKB 360 PRO3",
        "espacamento": 0.5,
        "sementes_por_metro": 3.2,
        "amostras": [
            {"lat": -12.5301, "lng": -55.7102, "plantas_por_metro": 3.1, "duplas": 2.0, "falhas": 4.5, "cv": 28.0, "profundidade": 4.5},
            {"lat": -12.5312, "lng": -55.7111, "plantas_por_metro": 2.9, "duplas": 1.5, "falhas": 6.0, "cv": 32.5, "profundidade": 5.0},
            {"lat": -12.5324, "lng": -55.7096, "plantas_por_metro": 3.0, "duplas": 3.0, "falhas": 5.0, "cv": 30.0, "profundidade": 4.0}
        ]
    })
}

fn visit_fixture() -> Value {
    json!({
        "id": DEMO_VISIT,
        "meta": {
            "titulo": "Visita Técnica - Algodão",
            "data": "2025-03-05",
            "tecnico": "Eng. Agr. Rafael Lima",
            "estadio": "B1 (primeiro botão floral)"
        },
        "propriedade": {
            "nome": "Fazenda Boa Esperança",
            "proprietario": "Família Andrade",
            "municipio": "Campo Verde",
            "uf": "MT"
        },
        "talhao": {"nome": "Talhão 03", "cultura": "Algodão", "area_ha": 120},
        "observacoes": [
            "Estande uniforme, sem falhas significativas.",
            "Presença de bicudo na bordadura próxima à mata."
        ],
        "recomendacoes": [
            {"texto": "Intensificar o monitoramento de botões nas bordaduras."},
            {"texto": "Reavaliar em 5 dias."}
        ],
        "fotos": [
            {"url": "https://storage.example.com/visitas/demo/bordadura.jpg", "legenda": "Bordadura com botões atacados"}
        ]
    })
}

fn side_by_side_fixture() -> Value {
    json!({
        "id": DEMO_SIDE_BY_SIDE,
        "titulo": "Comparativo de Fungicidas - Soja",
        "data": "2025-04-02",
        "fazenda": "Fazenda Santa Helena",
        "talhao": {"nome": "Talhão 15", "cultura": "Soja"},
        "tratamentos": [
            {"id": "t1", "nome": "Testemunha"},
            {"id": "t2", "nome": "Programa A", "produto": "Protioconazol + trifloxistrobina"},
            {"id": "t3", "nome": "Programa B", "produto": "Fluxapiroxade + piraclostrobina"}
        ],
        "atributos": [
            {"nome": "Produtividade", "unidade": "sc/ha", "valores": [52.4, 63.8, 61.2]},
            {"nome": "Severidade final de ferrugem", "unidade": "%", "maior_melhor": false, "valores": [46.0, 9.5, 12.0]},
            {"nome": "Peso de mil grãos", "unidade": "g", "valores": {"t1": 148.0, "t2": 171.5, "t3": 169.0}}
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{normalize_report, Report};

    #[test]
    fn test_every_demo_token_has_a_fixture() {
        for token in DEMO_TOKENS {
            let stored = find_by_share_token(token).unwrap();
            assert!(stored.share_enabled);
            let report = normalize_report(stored.data.as_ref().unwrap(), stored.kind).unwrap();
            assert_eq!(Some(report.kind()), stored.kind);
        }
        assert!(find_by_share_token("outro").is_none());
    }

    #[test]
    fn test_fixture_shapes_are_detected_without_hint() {
        for token in DEMO_TOKENS {
            let stored = find_by_share_token(token).unwrap();
            let report = normalize_report(stored.data.as_ref().unwrap(), None).unwrap();
            assert_eq!(Some(report.kind()), stored.kind, "fixture {}", token);
        }
    }

    #[test]
    fn test_monitoring_fixture_content() {
        let stored = find_by_share_token(DEMO_MONITORING).unwrap();
        let Report::Monitoring(report) = normalize_report(stored.data.as_ref().unwrap(), None).unwrap() else {
            panic!("expected monitoring");
        };
        assert_eq!(report.talhao.points.len(), 5);
        assert_eq!(report.notes.as_deref(), Some("Chuvas frequentes na última semana favorecem a ferrugem."));
    }
}
