//! Organism → product knowledge table used by the recommendation engine
//!
//! Entries are keyed by the trimmed, lower-cased organism name. The built-in
//! table covers common pests, diseases and weeds of Brazilian row crops
//! (soybean, corn, cotton). Products are given as active ingredients; the
//! agronomist in charge confirms registration and label dose for each crop.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::InfestationKind;

/// Product, dose and field action for one organism
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductEntry {
    pub product: String,
    pub dose: String,
    pub action: String,
}

/// Immutable lookup table injected into the recommendation engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    entries: HashMap<String, ProductEntry>,
}

/// Normalize an organism name into a lookup key
pub fn organism_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// (name, product, dose, action)
const BUILTIN_ENTRIES: &[(&str, &str, &str, &str)] = &[
    // Pests
    (
        "lagarta-da-soja",
        "Diflubenzurom ou Bacillus thuringiensis",
        "60 a 100 mL/ha",
        "Aplicar quando houver 20 lagartas grandes por pano de batida ou 30% de desfolha.",
    ),
    (
        "lagarta-falsa-medideira",
        "Metoxifenozida",
        "150 a 200 mL/ha",
        "Aplicar no início da infestação, priorizando cobertura do terço inferior.",
    ),
    (
        "helicoverpa",
        "Clorantraniliprole",
        "50 a 100 mL/ha",
        "Controlar lagartas pequenas; rotacionar modos de ação para evitar resistência.",
    ),
    (
        "helicoverpa armigera",
        "Clorantraniliprole",
        "50 a 100 mL/ha",
        "Controlar lagartas pequenas; rotacionar modos de ação para evitar resistência.",
    ),
    (
        "lagarta-do-cartucho",
        "Espinetoram",
        "75 a 100 mL/ha",
        "Aplicar com 10% a 20% de plantas com folhas raspadas, direcionando o jato ao cartucho.",
    ),
    (
        "spodoptera",
        "Espinetoram",
        "75 a 100 mL/ha",
        "Aplicar com lagartas pequenas e boa cobertura do dossel.",
    ),
    (
        "percevejo-marrom",
        "Acefato + bifentrina",
        "1,0 kg/ha + 0,3 L/ha",
        "Aplicar a partir de 2 percevejos por pano de batida em lavouras de grão.",
    ),
    (
        "percevejo-verde",
        "Tiametoxam + lambda-cialotrina",
        "200 a 250 mL/ha",
        "Aplicar a partir de 2 percevejos por pano de batida no enchimento de grãos.",
    ),
    (
        "percevejo-barriga-verde",
        "Tiametoxam + lambda-cialotrina",
        "200 mL/ha",
        "Controlar na emergência do milho; avaliar tratamento de sementes na próxima safra.",
    ),
    (
        "mosca-branca",
        "Piriproxifem ou espiromesifeno",
        "300 a 500 mL/ha",
        "Aplicar ao atingir o nível de controle de ninfas; evitar aplicações sequenciais do mesmo grupo.",
    ),
    (
        "cigarrinha-do-milho",
        "Acetamiprido + bifentrina",
        "250 a 300 g/ha",
        "Aplicar nos estádios iniciais (VE a V8) e eliminar milho tiguera da área.",
    ),
    (
        "bicudo-do-algodoeiro",
        "Malationa",
        "1,0 a 1,5 L/ha",
        "Aplicar em bordaduras ao detectar 5% de botões atacados; destruir restos culturais.",
    ),
    (
        "ácaro-rajado",
        "Abamectina",
        "300 a 500 mL/ha",
        "Aplicar nas reboleiras iniciais; monitorar a face inferior das folhas.",
    ),
    (
        "tripes",
        "Espinetoram",
        "100 mL/ha",
        "Aplicar quando a população causar prateamento nas folhas novas.",
    ),
    (
        "pulgão",
        "Flonicamida",
        "100 a 140 g/ha",
        "Aplicar ao observar colônias em 10% das plantas; preservar inimigos naturais.",
    ),
    (
        "pulgão-do-algodoeiro",
        "Flonicamida",
        "100 a 140 g/ha",
        "Aplicar ao observar colônias em 10% das plantas; preservar inimigos naturais.",
    ),
    (
        "tamanduá-da-soja",
        "Tiametoxam (tratamento de sementes)",
        "200 mL/100 kg de sementes",
        "Não há controle curativo eficiente; planejar rotação com gramíneas.",
    ),
    (
        "vaquinha",
        "Tiametoxam + lambda-cialotrina",
        "150 mL/ha",
        "Aplicar quando a desfolha ultrapassar 30% no vegetativo.",
    ),
    // Diseases
    (
        "ferrugem asiática",
        "Protioconazol + trifloxistrobina + multissítio",
        "0,4 L/ha + 1,5 kg/ha",
        "Aplicar imediatamente ao primeiro sintoma e manter intervalo de 14 dias entre aplicações.",
    ),
    (
        "ferrugem-asiática",
        "Protioconazol + trifloxistrobina + multissítio",
        "0,4 L/ha + 1,5 kg/ha",
        "Aplicar imediatamente ao primeiro sintoma e manter intervalo de 14 dias entre aplicações.",
    ),
    (
        "mancha-alvo",
        "Fluxapiroxade + piraclostrobina",
        "0,3 L/ha",
        "Aplicar preventivamente a partir do fechamento das entrelinhas.",
    ),
    (
        "antracnose",
        "Azoxistrobina + difenoconazol",
        "0,3 a 0,4 L/ha",
        "Aplicar no início do florescimento em áreas com histórico da doença.",
    ),
    (
        "oídio",
        "Tebuconazol",
        "0,5 L/ha",
        "Aplicar quando a doença atingir 10% da área foliar.",
    ),
    (
        "mofo-branco",
        "Fluazinam",
        "1,0 L/ha",
        "Aplicar no início do florescimento com alta umidade; manter palhada para controle biológico.",
    ),
    (
        "cercosporiose",
        "Azoxistrobina + ciproconazol",
        "0,3 L/ha",
        "Aplicar preventivamente no pré-pendoamento do milho.",
    ),
    (
        "mancha-de-ramulária",
        "Piraclostrobina + epoxiconazol",
        "0,5 a 0,75 L/ha",
        "Aplicar ao surgirem as primeiras lesões no terço inferior do algodoeiro.",
    ),
    (
        "helmintosporiose",
        "Azoxistrobina + ciproconazol",
        "0,3 L/ha",
        "Aplicar ao detectar lesões nas folhas abaixo da espiga.",
    ),
    (
        "ferrugem-polissora",
        "Picoxistrobina + ciproconazol",
        "0,3 L/ha",
        "Aplicar nos primeiros sintomas em híbridos suscetíveis.",
    ),
    (
        "enfezamento",
        "Controle do vetor (cigarrinha-do-milho)",
        "Conforme produto para cigarrinha",
        "Não há controle curativo; controlar a cigarrinha e eliminar plantas voluntárias.",
    ),
    // Weeds
    (
        "buva",
        "Glufosinato de amônio",
        "2,0 L/ha",
        "Controlar plantas com até 10 cm; em plantas maiores, usar manejo sequencial.",
    ),
    (
        "capim-amargoso",
        "Cletodim",
        "0,45 L/ha + adjuvante",
        "Aplicar em plantas jovens; touceiras perenizadas exigem aplicação sequencial.",
    ),
    (
        "caruru",
        "Fomesafem",
        "1,0 L/ha",
        "Aplicar em pós-emergência inicial, com plantas até 4 folhas.",
    ),
    (
        "picão-preto",
        "Clorimurom-etílico",
        "60 a 80 g/ha",
        "Aplicar em pós-emergência com plantas pequenas.",
    ),
    (
        "corda-de-viola",
        "Saflufenacil",
        "35 a 70 g/ha",
        "Aplicar na dessecação pré-semeadura; evitar escapes na colheita.",
    ),
    (
        "trapoeraba",
        "Carfentrazona-etílica",
        "50 a 100 mL/ha",
        "Aplicar em plantas jovens; a espécie tolera glifosato.",
    ),
    (
        "capim-pé-de-galinha",
        "Cletodim",
        "0,35 a 0,45 L/ha + adjuvante",
        "Aplicar antes do perfilhamento.",
    ),
    (
        "milho tiguera",
        "Cletodim ou haloxifope",
        "0,35 L/ha",
        "Eliminar plantas voluntárias para quebrar a ponte verde da cigarrinha.",
    ),
];

impl KnowledgeBase {
    /// Build a table from `(name, entry)` pairs. Keys are normalized.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, ProductEntry)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, entry)| (organism_key(&name), entry))
                .collect(),
        }
    }

    /// The table shipped with the platform
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_ENTRIES.iter().map(|(name, product, dose, action)| {
            (
                name.to_string(),
                ProductEntry {
                    product: product.to_string(),
                    dose: dose.to_string(),
                    action: action.to_string(),
                },
            )
        }))
    }

    /// Load a table from a JSON object of `name -> {product, dose, action}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<String, ProductEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// Look up an organism by name, ignoring case and surrounding spaces
    pub fn lookup(&self, name: &str) -> Option<&ProductEntry> {
        self.entries.get(&organism_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generic guidance used when an organism is not in the table
    pub fn fallback(kind: InfestationKind) -> ProductEntry {
        let (product, action) = match kind {
            InfestationKind::Pest => (
                "Inseticida registrado para a cultura (consultar engenheiro agrônomo)",
                "Confirmar a identificação da praga e o nível de controle com um engenheiro agrônomo antes de aplicar.",
            ),
            InfestationKind::Disease => (
                "Fungicida registrado para a cultura (consultar engenheiro agrônomo)",
                "Confirmar o diagnóstico da doença com um engenheiro agrônomo antes de aplicar.",
            ),
            InfestationKind::Weed => (
                "Herbicida registrado para a cultura (consultar engenheiro agrônomo)",
                "Confirmar a espécie e o estádio da planta daninha com um engenheiro agrônomo antes de aplicar.",
            ),
        };
        ProductEntry {
            product: product.to_string(),
            dose: "Conforme bula e receituário agronômico".to_string(),
            action: action.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_size() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.len() >= 35);
    }

    #[test]
    fn test_lookup_ignores_case_and_spaces() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.lookup("  Ferrugem Asiática ").is_some());
        assert!(kb.lookup("BUVA").is_some());
        assert!(kb.lookup("lagarta-rosca").is_none());
    }

    #[test]
    fn test_fallback_is_never_empty() {
        for kind in [InfestationKind::Pest, InfestationKind::Disease, InfestationKind::Weed] {
            let entry = KnowledgeBase::fallback(kind);
            assert!(!entry.product.is_empty());
            assert!(!entry.dose.is_empty());
            assert!(!entry.action.is_empty());
        }
    }

    #[test]
    fn test_from_json() {
        let kb = KnowledgeBase::from_json(
            r#"{"Lagarta-Rosca": {"product": "Clorpirifós", "dose": "1 L/ha", "action": "Aplicar ao entardecer."}}"#,
        )
        .unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.lookup("lagarta-rosca").unwrap().product, "Clorpirifós");
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(KnowledgeBase::from_json("[1, 2]").is_err());
    }
}
