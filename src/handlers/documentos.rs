// src/handlers/documentos.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        filial::FilialScope,
        i18n::Locale,
        rbac::{PermDocumentosWrite, RequirePermission},
    },
    models::documento::{Documento, DocumentoFiltro, NovoDocumento},
};

// Só descreve o formulário no OpenAPI; o handler lê os campos um a um
#[allow(dead_code)]
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct DocumentoUpload {
    #[schema(format = Binary, value_type = String)]
    arquivo: Vec<u8>,
    nome: Option<String>,
    tipo: Option<String>,
    aluno_id: Option<i32>,
    filial_id: Option<i32>,
}

/// `Content-Disposition` de download. O nome vai em ASCII no `filename` e
/// completo (UTF-8) no `filename*`.
pub fn content_disposition(nome: &str) -> String {
    let ascii: String = nome
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    let codificado: String = nome
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect();

    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", ascii, codificado)
}

fn campo_inteiro(nome: &str, valor: &str) -> Result<Option<i32>, AppError> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Ok(None);
    }
    valor
        .parse::<i32>()
        .map(Some)
        .map_err(|_| AppError::InvalidUpload(format!("{} inválido", nome)))
}

// Lê o formulário multipart inteiro
async fn ler_formulario(mut multipart: Multipart) -> Result<NovoDocumento, AppError> {
    let mut novo = NovoDocumento::default();
    let mut recebeu_arquivo = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.body_text()))?
    {
        let nome_campo = field.name().unwrap_or_default().to_string();
        match nome_campo.as_str() {
            "arquivo" => {
                novo.file_name = field.file_name().map(str::to_string);
                novo.mime_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.body_text()))?;
                novo.conteudo = bytes.to_vec();
                recebeu_arquivo = true;
            }
            "nome" | "tipo" | "alunoId" | "filialId" => {
                let valor = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.body_text()))?;
                match nome_campo.as_str() {
                    "nome" => novo.nome = Some(valor),
                    "tipo" => novo.tipo = Some(valor).filter(|t| !t.trim().is_empty()),
                    "alunoId" => novo.aluno_id = campo_inteiro("alunoId", &valor)?,
                    _ => novo.filial_id = campo_inteiro("filialId", &valor)?,
                }
            }
            // Campos desconhecidos são ignorados
            _ => {}
        }
    }

    if !recebeu_arquivo {
        return Err(AppError::InvalidUpload("campo 'arquivo' ausente".into()));
    }
    Ok(novo)
}

// GET /api/documentos
#[utoipa::path(
    get,
    path = "/api/documentos",
    tag = "Documentos",
    params(DocumentoFiltro),
    responses((status = 200, description = "Metadados dos documentos (sem o conteúdo)", body = Vec<Documento>)),
    security(("api_jwt" = []))
)]
pub async fn list_documentos(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<DocumentoFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let documentos = app_state
        .documento_service
        .list_documentos(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(documentos)))
}

// POST /api/documentos (multipart)
#[utoipa::path(
    post,
    path = "/api/documentos",
    tag = "Documentos",
    request_body(content = DocumentoUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Documento armazenado", body = Documento),
        (status = 400, description = "Arquivo ausente, vazio ou grande demais")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermDocumentosWrite>,
    scope: FilialScope,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let novo = ler_formulario(multipart)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let documento = app_state
        .documento_service
        .upload(&scope, novo)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(documento)))
}

// GET /api/documentos/{id}/download
#[utoipa::path(
    get,
    path = "/api/documentos/{id}/download",
    tag = "Documentos",
    params(("id" = Uuid, Path, description = "Chave pública do documento")),
    responses(
        (status = 200, description = "Conteúdo do arquivo como anexo"),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(chave): Path<Uuid>,
) -> Result<Response, ApiError> {
    let arquivo = app_state
        .documento_service
        .download(&scope, chave)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, arquivo.mime_type.clone()),
        (header::CONTENT_DISPOSITION, content_disposition(&arquivo.nome)),
    ];

    Ok((headers, arquivo.conteudo).into_response())
}

// DELETE /api/documentos/{id}
#[utoipa::path(
    delete,
    path = "/api/documentos/{id}",
    tag = "Documentos",
    params(("id" = i32, Path, description = "ID do documento")),
    responses((status = 204, description = "Documento excluído"), (status = 404, description = "Documento não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermDocumentosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .documento_service
        .delete_documento(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_com_nome_simples() {
        assert_eq!(
            content_disposition("ficha.pdf"),
            "attachment; filename=\"ficha.pdf\"; filename*=UTF-8''ficha.pdf"
        );
    }

    #[test]
    fn disposition_escapa_acentos_e_aspas() {
        let valor = content_disposition("Atestado \"João\".pdf");
        assert!(valor.starts_with("attachment; filename=\"Atestado _Jo_o_.pdf\";"));
        assert!(valor.ends_with("filename*=UTF-8''Atestado%20%22Jo%C3%A3o%22.pdf"));
        assert!(valor.is_ascii());
    }

    #[test]
    fn campo_inteiro_vazio_ou_invalido() {
        assert_eq!(campo_inteiro("alunoId", " ").unwrap(), None);
        assert_eq!(campo_inteiro("alunoId", "42").unwrap(), Some(42));
        assert!(matches!(campo_inteiro("alunoId", "x"), Err(AppError::InvalidUpload(_))));
    }
}
