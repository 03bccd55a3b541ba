// src/models/documento.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Tamanho máximo de um arquivo enviado.
pub const MAX_DOCUMENTO_BYTES: usize = 10 * 1024 * 1024;

// Metadados do documento. O conteúdo só sai no download.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Documento {
    pub id: i32,
    // Vai no link de download no lugar do id sequencial
    pub chave: Uuid,
    pub filial_id: i32,
    pub aluno_id: Option<i32>,

    #[schema(example = "Atestado médico.pdf")]
    pub nome: String,

    #[schema(example = "atestado")]
    pub tipo: Option<String>,

    pub mime_type: String,
    pub tamanho: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct DocumentoArquivo {
    pub nome: String,
    pub mime_type: String,
    pub filial_id: i32,
    pub conteudo: Vec<u8>,
}

/// Campos do formulário multipart, já extraídos.
#[derive(Debug, Default)]
pub struct NovoDocumento {
    pub nome: Option<String>,
    pub tipo: Option<String>,
    pub aluno_id: Option<i32>,
    pub filial_id: Option<i32>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub conteudo: Vec<u8>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DocumentoFiltro {
    pub busca: Option<String>,
    pub aluno_id: Option<i32>,
    pub filial_id: Option<i32>,
}
