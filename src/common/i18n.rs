// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;

/// Idioma usado quando o cliente não manda `Accept-Language` ou manda um
/// idioma sem catálogo.
pub const DEFAULT_LANG: &str = "pt";

// Os catálogos vão embutidos no binário
const CATALOGS: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Catálogo de mensagens por idioma: `lang -> chave -> texto`.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Busca a chave no idioma pedido, depois no padrão. Sem tradução,
    /// devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Igual ao `translate`, substituindo `{nome}` pelos parâmetros.
    pub fn translate_with(&self, lang: &str, key: &str, params: &[(&str, &str)]) -> String {
        params
            .iter()
            .fold(self.translate(lang, key), |message, (name, value)| {
                message.replace(&format!("{{{}}}", name), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_share_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let pt = &store.catalogs["pt"];
        let en = &store.catalogs["en"];
        for key in pt.keys() {
            assert!(en.contains_key(key), "chave '{}' sem tradução em inglês", key);
        }
        assert_eq!(pt.len(), en.len());
    }

    #[test]
    fn falls_back_to_default_language_then_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("es", "erro.credenciais_invalidas"),
            store.translate("pt", "erro.credenciais_invalidas")
        );
        assert_eq!(store.translate("pt", "chave.inexistente"), "chave.inexistente");
    }

    #[test]
    fn replaces_parameters() {
        let store = I18nStore::load().unwrap();
        let message = store.translate_with("en", "erro.sem_permissao", &[("permissao", "filiais:write")]);
        assert!(message.contains("filiais:write"));
        assert!(!message.contains('{'));
    }
}
